use std::cmp::Ordering;

use dotdata_core::{
    Direction, Key, Operator, PathAccessor, QueryError, QueryOps, filter, filter_by, group_by,
    loose_cmp, loose_eq, pluck, sort_by,
};
use serde_json::{Value, json};

fn people() -> Vec<Value> {
    vec![
        json!({"name": "John", "age": 25}),
        json!({"name": "Jane", "age": 30}),
        json!({"name": "Bob", "age": 20}),
    ]
}

fn names(records: &[Value]) -> Vec<&str> {
    records.iter().map(|r| r["name"].as_str().unwrap_or("")).collect()
}

#[test]
fn filter_by_greater_than() {
    let out = filter_by(&people(), "age", Operator::Gt, &json!(22));
    assert_eq!(names(&out), ["John", "Jane"]);
}

#[test]
fn filter_by_each_operator() {
    let p = people();
    let run = |op: Operator, v: Value| names(&filter_by(&p, "age", op, &v)).join(",");
    assert_eq!(run(Operator::Eq, json!("25")), "John");
    assert_eq!(run(Operator::Ne, json!(25)), "Jane,Bob");
    assert_eq!(run(Operator::Ge, json!(25)), "John,Jane");
    assert_eq!(run(Operator::Lt, json!(25)), "Bob");
    assert_eq!(run(Operator::Le, json!(25.0)), "John,Bob");
    assert_eq!(run(Operator::In, json!([20, 30])), "Jane,Bob");
    assert_eq!(run(Operator::NotIn, json!([20, 30])), "John");
    // a scalar operand is a one-element set
    assert_eq!(run(Operator::In, json!(30)), "Jane");
    assert_eq!(run(Operator::In, Value::Null), "");
}

#[test]
fn filter_by_missing_path_compares_null() {
    let records = vec![
        json!({"id": 1, "email": "a@example.com"}),
        json!({"id": 2}),
        json!({"id": 3, "profile": {"email": "c@example.com"}}),
    ];
    let out = filter_by(&records, "email", Operator::Eq, &Value::Null);
    let ids: Vec<&Value> = out.iter().map(|r| &r["id"]).collect();
    assert_eq!(ids, [&json!(2), &json!(3)]);

    let nested = filter_by(&records, "profile.email", Operator::Ne, &Value::Null);
    assert_eq!(nested.len(), 1);
    assert_eq!(nested[0]["id"], json!(3));
}

#[test]
fn filter_by_compares_scalar_records_directly() {
    let records = vec![json!(1), json!(5), json!({"v": 3}), json!({"v": 9}), json!(10)];
    let out = filter_by(&records, "v", Operator::Gt, &json!(4));
    assert_eq!(out, vec![json!(5), json!({"v": 9}), json!(10)]);
}

#[test]
fn filter_with_predicate_gets_index() {
    let out = filter(&people(), |record, i| i % 2 == 0 && record["age"] != json!(20));
    assert_eq!(names(&out), ["John"]);
}

#[test]
fn operator_parsing() {
    assert_eq!("=".parse::<Operator>().unwrap(), Operator::Eq);
    assert_eq!("==".parse::<Operator>().unwrap(), Operator::Eq);
    assert_eq!("not_in".parse::<Operator>().unwrap(), Operator::NotIn);
    assert_eq!(Operator::Ge.to_string(), ">=");
    assert_eq!(
        "like".parse::<Operator>().unwrap_err(),
        QueryError::UnknownOperator("like".into())
    );
}

#[test]
fn group_by_path_keeps_first_occurrence_order() {
    let records = vec![
        json!({"category": "A", "v": 1}),
        json!({"category": "B", "v": 2}),
        json!({"category": "A", "v": 3}),
    ];
    let grouped = group_by(&records, Key::Path("category"));
    let keys: Vec<&String> = grouped.keys().collect();
    assert_eq!(keys, ["A", "B"]);
    assert_eq!(grouped["A"], vec![records[0].clone(), records[2].clone()]);
    assert_eq!(grouped["B"], vec![records[1].clone()]);
}

#[test]
fn group_by_closure_and_key_rendering() {
    let records = vec![json!({"v": 1}), json!({"v": 2}), json!({"v": 3}), json!({})];
    let even = |r: &Value| match r["v"].as_i64() {
        Some(n) => json!(n % 2 == 0),
        None => Value::Null,
    };
    let grouped = group_by(&records, Key::With(&even));
    let keys: Vec<&String> = grouped.keys().collect();
    assert_eq!(keys, ["0", "1", ""]);
    assert_eq!(grouped["0"].len(), 2);

    let floats = vec![json!({"v": 1}), json!({"v": 1.5}), json!({"v": 1.0})];
    let keys: Vec<String> = group_by(&floats, "v".into()).into_keys().collect();
    assert_eq!(keys, ["1", "1.5", "1.0"]);

    let by_number = group_by(&records, "v".into());
    let keys: Vec<&String> = by_number.keys().collect();
    assert_eq!(keys, ["1", "2", "3", ""]);
}

#[test]
fn pluck_values_and_keyed_values() {
    let records = vec![json!({"id": 1, "name": "John"}), json!({"id": 2, "name": "Jane"})];
    assert_eq!(pluck(&records, "name", None), json!(["John", "Jane"]));
    assert_eq!(pluck(&records, "name", Some("id")), json!({"1": "John", "2": "Jane"}));
}

#[test]
fn pluck_later_records_win_on_key_collision() {
    let records = vec![
        json!({"k": "x", "v": 1}),
        json!({"k": "y", "v": 2}),
        json!({"k": "x", "v": 3}),
        json!({"v": 4}),
    ];
    assert_eq!(pluck(&records, "v", Some("k")), json!({"x": 3, "y": 2, "": 4}));
    assert_eq!(pluck(&records, "k", None), json!(["x", "y", "x", null]));
}

#[test]
fn sort_by_path_both_directions() {
    let asc = sort_by(&people(), Key::Path("age"), Direction::Asc);
    assert_eq!(names(&asc), ["Bob", "John", "Jane"]);
    let desc = sort_by(&people(), Key::Path("age"), Direction::Desc);
    assert_eq!(names(&desc), ["Jane", "John", "Bob"]);
}

#[test]
fn sort_by_is_stable_in_both_directions() {
    let records = vec![
        json!({"name": "a", "rank": 2}),
        json!({"name": "b", "rank": 1}),
        json!({"name": "c", "rank": 2}),
        json!({"name": "d", "rank": 1}),
        json!({"name": "e", "rank": 2}),
    ];
    let asc = sort_by(&records, Key::Path("rank"), Direction::Asc);
    assert_eq!(names(&asc), ["b", "d", "a", "c", "e"]);
    let desc = sort_by(&records, Key::Path("rank"), Direction::Desc);
    assert_eq!(names(&desc), ["a", "c", "e", "b", "d"]);
}

#[test]
fn sort_by_closure_with_mixed_numeric_types() {
    let records = vec![json!("10"), json!(9), json!("8.5"), json!(-1)];
    let ident = |r: &Value| r.clone();
    let out = sort_by(&records, Key::With(&ident), Direction::Asc);
    assert_eq!(out, vec![json!(-1), json!("8.5"), json!(9), json!("10")]);
}

#[test]
fn sort_by_missing_key_sorts_as_null() {
    let records = vec![json!({"n": 5}), json!({}), json!({"n": -1})];
    let out = sort_by(&records, Key::Path("n"), Direction::Asc);
    assert_eq!(out, vec![json!({}), json!({"n": -1}), json!({"n": 5})]);
}

#[test]
fn missing_field_is_below_negative_numbers() {
    let records = vec![
        json!({"id": 1, "score": -5}),
        json!({"id": 2}),
        json!({"id": 3, "score": 4}),
    ];
    let ids = |rs: &[Value]| rs.iter().map(|r| r["id"].clone()).collect::<Vec<_>>();

    let below = filter_by(&records, "score", Operator::Lt, &json!(-1));
    assert_eq!(ids(&below), [json!(1), json!(2)]);

    let asc = sort_by(&records, Key::Path("score"), Direction::Asc);
    assert_eq!(ids(&asc), [json!(2), json!(1), json!(3)]);
}

#[test]
fn sort_survives_inconsistent_mixed_keys() {
    // "10" < "1a" < 2 < "10" under loose ordering
    let records = vec![json!("10"), json!("1a"), json!(2), json!(true), json!(null), json!([1])];
    let ident = |r: &Value| r.clone();
    let out = sort_by(&records, Key::With(&ident), Direction::Desc);
    assert_eq!(out.len(), records.len());
}

#[test]
fn direction_parsing() {
    assert_eq!("asc".parse::<Direction>().unwrap(), Direction::Asc);
    assert_eq!("DESC".parse::<Direction>().unwrap(), Direction::Desc);
    assert_eq!(Direction::default(), Direction::Asc);
    assert!("up".parse::<Direction>().is_err());
}

#[test]
fn query_ops_with_custom_delimiter() {
    let ops = QueryOps::new(PathAccessor::new(':'));
    let records = vec![
        json!({"meta": {"score": 3}, "id": "x"}),
        json!({"meta": {"score": 1}, "id": "y"}),
    ];
    assert_eq!(ops.pluck(&records, "meta:score", Some("id")), json!({"x": 3, "y": 1}));
    let sorted = ops.sort_by(&records, Key::Path("meta:score"), Direction::Asc);
    assert_eq!(sorted[0]["id"], json!("y"));
    assert_eq!(ops.filter_by(&records, "meta:score", Operator::Ge, &json!(2)).len(), 1);
}

#[test]
fn loose_comparison_policy() {
    assert!(loose_eq(&json!("1e3"), &json!(1000)));
    assert!(loose_eq(&json!(" 42"), &json!(42)));
    assert!(loose_eq(&json!("1.0"), &json!("1")));
    assert_eq!(loose_cmp(&json!("abc"), &json!("abd")), Ordering::Less);
    assert_eq!(loose_cmp(&json!(10), &json!("9a")), Ordering::Less);
    assert!(loose_eq(&json!(true), &json!("a")));
    assert!(loose_eq(&json!(false), &json!("0")));
    assert!(loose_eq(&Value::Null, &json!("")));
    assert!(loose_eq(&Value::Null, &json!(0)));
    assert!(loose_eq(&Value::Null, &json!([])));
    assert_eq!(loose_cmp(&Value::Null, &json!(-3)), Ordering::Less);
    assert_eq!(loose_cmp(&json!(-0.5), &Value::Null), Ordering::Greater);
    assert!(loose_eq(&Value::Null, &json!(0.0)));
    assert_eq!(loose_cmp(&json!([1]), &json!(99)), Ordering::Greater);
    assert_eq!(loose_cmp(&json!([5]), &json!([1, 2])), Ordering::Less);
    assert_eq!(loose_cmp(&json!([1, 3]), &json!([1, 2])), Ordering::Greater);
    assert!(loose_eq(&json!({"a": 1, "b": "2"}), &json!({"b": 2, "a": 1})));
    assert_eq!(loose_cmp(&json!({"a": 1}), &json!({"b": 1})), Ordering::Greater);
    assert_eq!(loose_cmp(&json!([]), &json!({})), Ordering::Less);
}
