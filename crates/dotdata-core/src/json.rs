use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct JsonOpts {
    pub pretty: bool,
}

impl Default for JsonOpts {
    fn default() -> Self {
        Self { pretty: true }
    }
}

pub fn read_json_file(path: &Path) -> Result<Value> {
    let data = fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

pub fn to_json_string(value: &Value, opts: JsonOpts) -> Result<String> {
    let s = if opts.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(s)
}

pub fn write_json_to_file(path: &Path, value: &Value, opts: JsonOpts) -> Result<()> {
    let mut s = to_json_string(value, opts)?;
    s.push('\n');
    fs::write(path, s)?;
    Ok(())
}

// -------- Node classification for tree browsing --------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Object,
    Array,
}

impl JsonKind {
    pub fn of(v: &Value) -> Self {
        match v {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Bool,
            Value::Number(_) => JsonKind::Number,
            Value::String(_) => JsonKind::String,
            Value::Object(_) => JsonKind::Object,
            Value::Array(_) => JsonKind::Array,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChildInfo {
    pub key_or_index: String,
    pub kind: JsonKind,
    /// Element count for arrays and mappings.
    pub len: Option<usize>,
}

impl ChildInfo {
    pub(crate) fn new(key_or_index: String, v: &Value) -> Self {
        let len = match v {
            Value::Array(a) => Some(a.len()),
            Value::Object(m) => Some(m.len()),
            _ => None,
        };
        Self {
            key_or_index,
            kind: JsonKind::of(v),
            len,
        }
    }
}
