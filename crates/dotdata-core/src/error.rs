use std::io;

/// Rejected paths on the mutating side of the accessor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("path `{path}` has an empty segment at position {index}")]
    EmptySegment { path: String, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("unknown comparison operator: {0}")]
    UnknownOperator(String),

    #[error("unknown sort direction: {0} (expected asc or desc)")]
    UnknownDirection(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
