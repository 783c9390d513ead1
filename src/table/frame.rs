//! Native column-major table.
//!
//! Each column is a typed vector of optional cells; `None` is a missing value.
//! Columns are kept in insertion order and names are unique.

use crate::table::TableError;
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Bool(Vec<Option<bool>>),
    Str(Vec<Option<String>>),
    Date(Vec<Option<NaiveDate>>),
    /// Instants stored as UTC wall time; `timezone` is display metadata only.
    Datetime {
        values: Vec<Option<NaiveDateTime>>,
        timezone: Option<String>,
    },
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Int(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Str(v) => v.len(),
            Column::Date(v) => v.len(),
            Column::Datetime { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        fn nulls<T>(v: &[Option<T>]) -> usize {
            v.iter().filter(|c| c.is_none()).count()
        }
        match self {
            Column::Int(v) => nulls(v),
            Column::Float(v) => nulls(v),
            Column::Bool(v) => nulls(v),
            Column::Str(v) => nulls(v),
            Column::Date(v) => nulls(v),
            Column::Datetime { values, .. } => nulls(values),
        }
    }

    pub fn datetime(values: Vec<Option<NaiveDateTime>>, timezone: Option<&str>) -> Self {
        Column::Datetime {
            values,
            timezone: timezone.map(str::to_string),
        }
    }
}

macro_rules! column_from {
    ($variant:ident, $ty:ty) => {
        impl From<Vec<$ty>> for Column {
            fn from(v: Vec<$ty>) -> Self {
                Column::$variant(v.into_iter().map(Some).collect())
            }
        }

        impl From<Vec<Option<$ty>>> for Column {
            fn from(v: Vec<Option<$ty>>) -> Self {
                Column::$variant(v)
            }
        }
    };
}

column_from!(Int, i64);
column_from!(Float, f64);
column_from!(Bool, bool);
column_from!(Str, String);
column_from!(Date, NaiveDate);

impl From<Vec<&str>> for Column {
    fn from(v: Vec<&str>) -> Self {
        Column::Str(v.into_iter().map(|s| Some(s.to_string())).collect())
    }
}

impl From<Vec<Option<&str>>> for Column {
    fn from(v: Vec<Option<&str>>) -> Self {
        Column::Str(v.into_iter().map(|s| s.map(str::to_string)).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFrame {
    columns: Vec<(String, Column)>,
    rows: usize,
}

impl DataFrame {
    /// A frame with `rows` rows and no columns yet.
    pub fn empty(rows: usize) -> Self {
        Self {
            columns: Vec::new(),
            rows,
        }
    }

    /// Build a frame, checking that names are unique and all columns have the
    /// same number of rows.
    pub fn new<S: Into<String>>(columns: Vec<(S, Column)>) -> Result<Self, TableError> {
        columns
            .into_iter()
            .try_fold(DataFrame::default(), |frame, (name, col)| {
                frame.with_column(name, col)
            })
    }

    pub fn with_column(
        mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<Self, TableError> {
        let name = name.into();
        if self.column(&name).is_some() {
            return Err(TableError::DuplicateColumn(name));
        }
        // A frame with neither rows nor columns takes its height from the
        // first column.
        if self.columns.is_empty() && self.rows == 0 {
            self.rows = column.len();
        } else if column.len() != self.rows {
            return Err(TableError::LengthMismatch {
                name,
                len: column.len(),
                expected: self.rows,
            });
        }
        self.columns.push((name, column));
        Ok(self)
    }

    /// Number of rows, also for a frame without columns.
    pub fn height(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c))
    }
}
