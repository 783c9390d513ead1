//! Tabular values: the two recognized in-memory representations and the
//! columnar encoder they share.
//!
//! - `frame`: native column-major table (`DataFrame` / `Column`)
//! - `arrow`: conversions between Arrow `RecordBatch` and `DataFrame`
//! - `encode`: Arrow IPC stream encoding

pub mod arrow;
pub mod encode;
pub mod frame;

pub use encode::encode_table;
pub use frame::{Column, DataFrame};

use arrow_array::RecordBatch;

/// A recognized tabular value. Detection is nominal: only these two
/// representations are treated as tables by the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum Table {
    Arrow(RecordBatch),
    Frame(DataFrame),
}

impl Table {
    pub fn num_rows(&self) -> usize {
        match self {
            Table::Arrow(batch) => batch.num_rows(),
            Table::Frame(frame) => frame.height(),
        }
    }

    pub fn num_columns(&self) -> usize {
        match self {
            Table::Arrow(batch) => batch.num_columns(),
            Table::Frame(frame) => frame.width(),
        }
    }
}

impl From<RecordBatch> for Table {
    fn from(batch: RecordBatch) -> Self {
        Table::Arrow(batch)
    }
}

impl From<DataFrame> for Table {
    fn from(frame: DataFrame) -> Self {
        Table::Frame(frame)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("column {name:?} has {len} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        len: usize,
        expected: usize,
    },

    #[error("duplicate column name {0:?}")]
    DuplicateColumn(String),

    #[error("column {name:?} has unsupported type {data_type}")]
    UnsupportedColumn { name: String, data_type: String },

    #[error("column {name:?}: value {value} does not fit in a 64-bit signed integer")]
    IntegerOverflow { name: String, value: u64 },

    #[error(transparent)]
    Arrow(#[from] arrow_schema::ArrowError),
}
