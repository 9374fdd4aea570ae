//! Delimited-path addressing over nested `serde_json::Value` trees.
//!
//! A path like `user.address.city` is split on the accessor's delimiter and
//! each segment is looked up as a mapping key. Segments never index into
//! arrays; `items.0` means the key `"0"` of a mapping named `items`.
//!
//! Reads degrade to "not found". Writes auto-vivify: any intermediate value
//! that is not a mapping is replaced by an empty one.

use serde_json::{Map, Value};

use crate::error::PathError;
use crate::json::{ChildInfo, JsonKind};

pub const DEFAULT_DELIMITER: char = '.';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathAccessor {
    delimiter: char,
}

impl Default for PathAccessor {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl PathAccessor {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Borrowing lookup.
    ///
    /// The whole path is first tried as a single key of `root`, so
    /// `{"a.b": 5, "a": {"b": 9}}` resolves `a.b` to `5`. Only when that
    /// misses is the path split and walked segment by segment.
    pub fn lookup<'a>(&self, root: &'a Value, path: &str) -> Option<&'a Value> {
        if path.is_empty() {
            return None;
        }
        if let Some(hit) = root.as_object().and_then(|map| map.get(path)) {
            return Some(hit);
        }
        self.walk(root, path)
    }

    /// Value at `path`, or `default` when any segment fails to resolve.
    pub fn get(&self, root: &Value, path: &str, default: Value) -> Value {
        self.lookup(root, path).cloned().unwrap_or(default)
    }

    /// Segmented walk only. Unlike [`PathAccessor::lookup`] this never
    /// matches a literal key that contains the delimiter.
    pub fn has(&self, root: &Value, path: &str) -> bool {
        self.walk(root, path).is_some()
    }

    fn walk<'a>(&self, root: &'a Value, path: &str) -> Option<&'a Value> {
        if path.is_empty() {
            return None;
        }
        let mut cur = root;
        for seg in path.split(self.delimiter) {
            if seg.is_empty() {
                return None;
            }
            cur = cur.as_object()?.get(seg)?;
        }
        Some(cur)
    }

    fn checked_segments<'p>(&self, path: &'p str) -> Result<Vec<&'p str>, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        let segs: Vec<&str> = path.split(self.delimiter).collect();
        if let Some(index) = segs.iter().position(|s| s.is_empty()) {
            return Err(PathError::EmptySegment {
                path: path.to_string(),
                index,
            });
        }
        Ok(segs)
    }

    /// Write `value` at `path`, creating mappings along the way.
    ///
    /// Destructive: a scalar or array sitting where a mapping is needed
    /// (the root included) is discarded and replaced. Returns the root.
    pub fn set<'a>(
        &self,
        root: &'a mut Value,
        path: &str,
        value: Value,
    ) -> Result<&'a mut Value, PathError> {
        let segs = self.checked_segments(path)?;
        let (last, parents) = segs.split_last().ok_or(PathError::Empty)?;
        let mut cursor = &mut *root;
        for seg in parents {
            cursor = vivify(cursor, seg).entry(*seg).or_insert(Value::Null);
        }
        vivify(cursor, last).insert((*last).to_string(), value);
        Ok(root)
    }

    /// Remove the key named by the last segment from its parent mapping.
    ///
    /// Nothing is created: if a parent segment is missing or not a mapping
    /// the call does nothing. Returns the removed value, if any.
    pub fn forget(&self, root: &mut Value, path: &str) -> Result<Option<Value>, PathError> {
        let segs = self.checked_segments(path)?;
        let (last, parents) = segs.split_last().ok_or(PathError::Empty)?;
        let mut cursor = root;
        for seg in parents {
            let Some(next) = cursor.as_object_mut().and_then(|map| map.get_mut(*seg)) else {
                tracing::trace!(path, segment = *seg, "forget: parent not a mapping, nothing removed");
                return Ok(None);
            };
            cursor = next;
        }
        Ok(cursor.as_object_mut().and_then(|map| map.shift_remove(*last)))
    }

    /// Every leaf reachable through mappings, as a joined path.
    /// Arrays and empty mappings count as leaves.
    pub fn paths(&self, root: &Value) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_paths(root, None, &mut out);
        out
    }

    fn collect_paths(&self, value: &Value, prefix: Option<&str>, out: &mut Vec<String>) {
        match (value, prefix) {
            (Value::Object(map), _) if !map.is_empty() => {
                for (key, child) in map {
                    let path = match prefix {
                        Some(p) => format!("{}{}{}", p, self.delimiter, key),
                        None => key.clone(),
                    };
                    self.collect_paths(child, Some(path.as_str()), out);
                }
            }
            (_, Some(p)) => out.push(p.to_string()),
            (_, None) => {}
        }
    }

    /// Immediate children of the node at `path`; an empty path lists the root.
    pub fn children(&self, root: &Value, path: &str) -> Option<Vec<ChildInfo>> {
        let node = if path.is_empty() {
            root
        } else {
            self.lookup(root, path)?
        };
        let out = match node {
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| ChildInfo::new(k.clone(), v))
                .collect(),
            Value::Array(arr) => arr
                .iter()
                .enumerate()
                .map(|(i, v)| ChildInfo::new(i.to_string(), v))
                .collect(),
            _ => Vec::new(),
        };
        Some(out)
    }
}

fn vivify<'a>(slot: &'a mut Value, segment: &str) -> &'a mut Map<String, Value> {
    if !slot.is_object() {
        if !slot.is_null() {
            tracing::debug!(segment, replaced = ?JsonKind::of(slot), "overwriting non-mapping with an empty mapping");
        }
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just replaced with a mapping"),
    }
}

/// Scalars reachable from `root`, depth first, left to right.
///
/// Arrays and mappings are both descended into (mapping values in key
/// order). With `Some(depth)`, containers found below that many levels are
/// emitted whole; `Some(0)` returns the top-level elements unchanged.
/// A scalar root yields itself.
pub fn flatten(root: &Value, depth: Option<usize>) -> Vec<Value> {
    let mut out = Vec::new();
    if is_container(root) {
        flatten_into(root, depth, &mut out);
    } else {
        out.push(root.clone());
    }
    out
}

fn flatten_into(container: &Value, depth: Option<usize>, out: &mut Vec<Value>) {
    for item in members(container) {
        match depth {
            _ if !is_container(item) => out.push(item.clone()),
            Some(0) => out.push(item.clone()),
            Some(d) => flatten_into(item, Some(d - 1), out),
            None => flatten_into(item, None, out),
        }
    }
}

fn is_container(v: &Value) -> bool {
    matches!(v, Value::Array(_) | Value::Object(_))
}

fn members(v: &Value) -> impl Iterator<Item = &Value> {
    let (seq, map) = match v {
        Value::Array(items) => (Some(items.iter()), None),
        Value::Object(map) => (None, Some(map.values())),
        _ => (None, None),
    };
    seq.into_iter().flatten().chain(map.into_iter().flatten())
}

/// True for a mapping whose keys are anything other than `"0"`, `"1"`, ...
/// `"n-1"` in that order. Arrays, scalars and the empty mapping are
/// list-shaped and return false.
pub fn is_associative(value: &Value) -> bool {
    match value {
        Value::Object(map) => map
            .keys()
            .enumerate()
            .any(|(i, key)| *key != i.to_string()),
        _ => false,
    }
}

// Free functions over the default `.` delimiter.

pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    PathAccessor::default().lookup(root, path)
}

pub fn get(root: &Value, path: &str, default: Value) -> Value {
    PathAccessor::default().get(root, path, default)
}

pub fn has(root: &Value, path: &str) -> bool {
    PathAccessor::default().has(root, path)
}

pub fn set<'a>(root: &'a mut Value, path: &str, value: Value) -> Result<&'a mut Value, PathError> {
    PathAccessor::default().set(root, path, value)
}

pub fn forget(root: &mut Value, path: &str) -> Result<Option<Value>, PathError> {
    PathAccessor::default().forget(root, path)
}
