//! dotdata-core: dot-path access and in-memory queries over nested JSON
//!
//! This crate focuses on a small, well-factored surface:
//! - Path accessor: get/set/has/forget by delimited path, flatten, paths
//! - Query ops: filter, group, pluck and stable sort over record collections
//! - One loose comparison policy shared by filtering and sorting
//! - Response envelope (status/message/payload/meta) for wrapping results
//! - JSON file helpers used by the CLI
//!
//! Mutating calls work in place on the caller's `serde_json::Value`. Nothing
//! here locks; serialize concurrent mutation of one tree yourself.
pub mod compare;
pub mod envelope;
pub mod error;
pub mod json;
pub mod path;
pub mod query;

pub use compare::{loose_cmp, loose_eq, truthy};
pub use envelope::{DefaultMessages, Envelope, EnvelopeConfig};
pub use error::{Error, PathError, QueryError, Result};
pub use json::{ChildInfo, JsonKind, JsonOpts, read_json_file, write_json_to_file};
pub use path::{PathAccessor, flatten, forget, get, has, is_associative, lookup, set};
pub use query::{
    Direction, Key, Operator, QueryOps, filter, filter_by, group_by, key_string, pluck, sort_by,
};
