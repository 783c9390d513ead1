//! Error taxonomy for spec construction, normalization, encoding and rendering.

use crate::table::TableError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A deferred call was invoked with named arguments.
    #[error("named arguments must not be passed to {module}.{method}: {}", .names.join(", "))]
    Argument {
        module: String,
        method: String,
        names: Vec<String>,
    },

    /// Caller-supplied configuration or spec shape rejected at construction.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A value the tagged JSON tree cannot carry.
    #[error("unsupported value: {0}")]
    UnsupportedType(String),

    /// A tagged mapping whose discriminant is not one of the known kinds.
    #[error("unknown ipyobsplot-type tag: {0:?}")]
    UnknownTag(String),

    #[error("spec nesting exceeds {limit} levels")]
    TooDeep { limit: usize },

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
