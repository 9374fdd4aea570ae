//! Loose equality and ordering across mixed JSON types.
//!
//! Used by every relational filter operator and by `sort_by`. The rules,
//! first match wins:
//!
//! 1. A bool on either side: both sides reduce to truthiness, `false < true`.
//! 2. `null` against a string compares as `""`. Against a number or a
//!    container it compares as falsy: equal to `0` or an empty container,
//!    less than anything else (so `null < -3`).
//! 3. Numbers, and strings that parse as numbers when the other side is a
//!    number or numeric string, compare numerically.
//! 4. A number against a non-numeric string compares the number's JSON text
//!    with the string. Two strings otherwise compare bytewise.
//! 5. Arrays compare by length, then element-wise. Mappings compare by size,
//!    then by value in the left side's key order (a key missing on the right
//!    makes the left greater). Arrays sort before mappings, and any container
//!    sorts after any scalar.
//!
//! Across mixed types this relation is not transitive, so callers must not
//! feed it to algorithms that require a strict total order.

use std::cmp::Ordering;

use serde_json::{Map, Number, Value};

/// Falsy: `null`, `false`, `0`, `0.0`, `""`, `"0"`, `[]`, `{}`.
pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(m) => !m.is_empty(),
    }
}

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

fn num_of(n: &Number) -> Num {
    match n.as_i64() {
        Some(i) => Num::Int(i),
        None => Num::Float(n.as_f64().unwrap_or(0.0)),
    }
}

fn parse_numeric(s: &str) -> Option<Num> {
    let t = s.trim();
    if t.is_empty()
        || !t
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    if let Ok(i) = t.parse::<i64>() {
        return Some(Num::Int(i));
    }
    t.parse::<f64>().ok().filter(|f| f.is_finite()).map(Num::Float)
}

fn cmp_num(a: Num, b: Num) -> Ordering {
    let as_f64 = |n: Num| match n {
        Num::Int(i) => i as f64,
        Num::Float(f) => f,
    };
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => x.cmp(&y),
        _ => as_f64(a)
            .partial_cmp(&as_f64(b))
            .unwrap_or(Ordering::Equal),
    }
}

fn cmp_number_str(n: &Number, s: &str) -> Ordering {
    match parse_numeric(s) {
        Some(parsed) => cmp_num(num_of(n), parsed),
        None => n.to_string().as_str().cmp(s),
    }
}

fn cmp_null_with(other: &Value) -> Ordering {
    match other {
        Value::Null => Ordering::Equal,
        Value::String(s) => "".cmp(s.as_str()),
        non_empty if truthy(non_empty) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn cmp_maps(a: &Map<String, Value>, b: &Map<String, Value>) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| {
        for (key, av) in a {
            let Some(bv) = b.get(key) else {
                return Ordering::Greater;
            };
            let ord = loose_cmp(av, bv);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    })
}

/// Three-way loose comparison, see the module docs for the rules.
///
/// Not a total order across mixed types.
pub fn loose_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(_), _) | (_, Value::Bool(_)) => truthy(a).cmp(&truthy(b)),
        (Value::Null, other) => cmp_null_with(other),
        (other, Value::Null) => cmp_null_with(other).reverse(),
        (Value::Number(x), Value::Number(y)) => cmp_num(num_of(x), num_of(y)),
        (Value::Number(x), Value::String(s)) => cmp_number_str(x, s),
        (Value::String(s), Value::Number(y)) => cmp_number_str(y, s).reverse(),
        (Value::String(x), Value::String(y)) => match (parse_numeric(x), parse_numeric(y)) {
            (Some(p), Some(q)) => cmp_num(p, q),
            _ => x.cmp(y),
        },
        (Value::Array(x), Value::Array(y)) => x.len().cmp(&y.len()).then_with(|| {
            x.iter()
                .zip(y)
                .map(|(p, q)| loose_cmp(p, q))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        }),
        (Value::Object(x), Value::Object(y)) => cmp_maps(x, y),
        (Value::Array(_), Value::Object(_)) => Ordering::Less,
        (Value::Object(_), Value::Array(_)) => Ordering::Greater,
        (Value::Array(_) | Value::Object(_), _) => Ordering::Greater,
        (_, Value::Array(_) | Value::Object(_)) => Ordering::Less,
    }
}

pub fn loose_eq(a: &Value, b: &Value) -> bool {
    loose_cmp(a, b) == Ordering::Equal
}
