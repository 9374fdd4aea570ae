//! Filter, group, pluck and sort over collections of records.
//!
//! Records are usually mappings; per-record values are resolved with
//! [`PathAccessor::get`] (so the literal-key shortcut applies) and compared
//! with [`loose_cmp`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::compare::{loose_cmp, loose_eq};
use crate::error::QueryError;
use crate::path::PathAccessor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    In,
    NotIn,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::In => "in",
            Operator::NotIn => "not_in",
        }
    }

    /// Apply the operator with `lhs` as the record's value.
    pub fn test(self, lhs: &Value, rhs: &Value) -> bool {
        match self {
            Operator::Eq => loose_eq(lhs, rhs),
            Operator::Ne => !loose_eq(lhs, rhs),
            Operator::Gt => loose_cmp(lhs, rhs) == Ordering::Greater,
            Operator::Ge => loose_cmp(lhs, rhs) != Ordering::Less,
            Operator::Lt => loose_cmp(lhs, rhs) == Ordering::Less,
            Operator::Le => loose_cmp(lhs, rhs) != Ordering::Greater,
            Operator::In => as_members(rhs).iter().any(|m| loose_eq(lhs, m)),
            Operator::NotIn => !as_members(rhs).iter().any(|m| loose_eq(lhs, m)),
        }
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            "in" => Ok(Operator::In),
            "not_in" => Ok(Operator::NotIn),
            other => Err(QueryError::UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Operand of in/not_in seen as a sequence.
fn as_members(v: &Value) -> Vec<&Value> {
    match v {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        Value::Null => Vec::new(),
        scalar => vec![scalar],
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }
}

impl FromStr for Direction {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            _ => Err(QueryError::UnknownDirection(s.to_string())),
        }
    }
}

/// How a record's grouping or sorting value is obtained.
#[derive(Clone, Copy)]
pub enum Key<'a> {
    Path(&'a str),
    With(&'a dyn Fn(&Value) -> Value),
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(path: &'a str) -> Self {
        Key::Path(path)
    }
}

impl fmt::Debug for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Key::With(_) => f.write_str("With(<fn>)"),
        }
    }
}

impl Key<'_> {
    fn resolve(&self, accessor: &PathAccessor, record: &Value) -> Value {
        match self {
            Key::Path(path) => accessor.get(record, path, Value::Null),
            Key::With(f) => f(record),
        }
    }
}

/// Render a resolved value as a mapping key.
///
/// Strings pass through, numbers use their JSON text, `true`/`false` become
/// `"1"`/`"0"`, `null` becomes `""`, containers their compact JSON.
///
/// Floats are not truncated: `1.5` keys as `"1.5"`, distinct from `1`.
pub fn key_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Null => String::new(),
        container => container.to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryOps {
    accessor: PathAccessor,
}

impl QueryOps {
    pub fn new(accessor: PathAccessor) -> Self {
        Self { accessor }
    }

    pub fn accessor(&self) -> &PathAccessor {
        &self.accessor
    }

    /// Keep the records for which `pred(record, index)` holds.
    pub fn filter<F>(&self, collection: &[Value], pred: F) -> Vec<Value>
    where
        F: Fn(&Value, usize) -> bool,
    {
        collection
            .iter()
            .enumerate()
            .filter(|&(i, record)| pred(record, i))
            .map(|(_, record)| record.clone())
            .collect()
    }

    /// Keep the records whose value at `path` satisfies `op` against `value`.
    ///
    /// A missing path resolves to `null`. Scalar records are compared
    /// directly and the path is ignored for them.
    pub fn filter_by(
        &self,
        collection: &[Value],
        path: &str,
        op: Operator,
        value: &Value,
    ) -> Vec<Value> {
        self.filter(collection, |record, _| {
            let lhs = match record {
                Value::Object(_) | Value::Array(_) => self.accessor.get(record, path, Value::Null),
                scalar => scalar.clone(),
            };
            op.test(&lhs, value)
        })
    }

    /// Bucket records by key; groups appear in first-occurrence order.
    pub fn group_by(&self, collection: &[Value], key: Key<'_>) -> IndexMap<String, Vec<Value>> {
        let mut groups: IndexMap<String, Vec<Value>> = IndexMap::new();
        for record in collection {
            let group = key_string(&key.resolve(&self.accessor, record));
            groups.entry(group).or_default().push(record.clone());
        }
        groups
    }

    /// Values at `value_path`, as an array, or as a mapping keyed by the
    /// value at `key_path` when one is given (later records win).
    pub fn pluck(&self, collection: &[Value], value_path: &str, key_path: Option<&str>) -> Value {
        match key_path {
            None => Value::Array(
                collection
                    .iter()
                    .map(|record| self.accessor.get(record, value_path, Value::Null))
                    .collect(),
            ),
            Some(key_path) => {
                let mut out = Map::new();
                for record in collection {
                    let key = key_string(&self.accessor.get(record, key_path, Value::Null));
                    out.insert(key, self.accessor.get(record, value_path, Value::Null));
                }
                Value::Object(out)
            }
        }
    }

    /// Stable sort on the loosely compared key of each record.
    pub fn sort_by(&self, collection: &[Value], key: Key<'_>, direction: Direction) -> Vec<Value> {
        let keyed: Vec<(Value, Value)> = collection
            .iter()
            .map(|record| (key.resolve(&self.accessor, record), record.clone()))
            .collect();
        merge_sort(keyed, &|a: &(Value, Value), b: &(Value, Value)| {
            direction.apply(loose_cmp(&a.0, &b.0))
        })
        .into_iter()
        .map(|(_, record)| record)
        .collect()
    }
}

// Stable merge sort. `slice::sort_by` may panic when the comparator is not a
// total order, which loose comparison over mixed types is not.
fn merge_sort<T, F>(mut items: Vec<T>, cmp: &F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, cmp);
    let right = merge_sort(right, cmp);

    let mut out = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        // Ties take from the left run.
        if cmp(r, l) == Ordering::Less {
            out.extend(right.next());
        } else {
            out.extend(left.next());
        }
    }
    out.extend(left);
    out.extend(right);
    out
}

// Free functions over the default `.` delimiter.

pub fn filter<F>(collection: &[Value], pred: F) -> Vec<Value>
where
    F: Fn(&Value, usize) -> bool,
{
    QueryOps::default().filter(collection, pred)
}

pub fn filter_by(collection: &[Value], path: &str, op: Operator, value: &Value) -> Vec<Value> {
    QueryOps::default().filter_by(collection, path, op, value)
}

pub fn group_by(collection: &[Value], key: Key<'_>) -> IndexMap<String, Vec<Value>> {
    QueryOps::default().group_by(collection, key)
}

pub fn pluck(collection: &[Value], value_path: &str, key_path: Option<&str>) -> Value {
    QueryOps::default().pluck(collection, value_path, key_path)
}

pub fn sort_by(collection: &[Value], key: Key<'_>, direction: Direction) -> Vec<Value> {
    QueryOps::default().sort_by(collection, key, direction)
}
