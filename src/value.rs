//! Input values: the closed set of kinds a plot spec can be composed from.

use crate::call::{Call, FunctionRef};
use crate::error::{Error, Result};
use crate::spec::{MAX_DEPTH, TAG_KEY, Tagged};
use crate::table::{DataFrame, Table};

use arrow_array::RecordBatch;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// A JSON number outside the `i64` range, kept exactly as ingested.
    Number(serde_json::Number),
    String(String),
    Sequence(Vec<Value>),
    Mapping(BTreeMap<String, Value>),
    Table(Table),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    ZonedDateTime(DateTime<FixedOffset>),
    /// An invoked deferred call, `module.method(args)`.
    Call(Call),
    /// An un-invoked deferred call descriptor.
    Function(FunctionRef),
    /// Already-tagged node, terminal for the normalizer.
    Tagged(Tagged),
}

impl Value {
    /// Build a mapping from key/value pairs.
    pub fn mapping<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Ingest plain JSON. Objects carrying the tag key become tagged nodes.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        use serde_json::Value as J;

        Ok(match json {
            J::Null => Value::Null,
            J::Bool(b) => Value::Bool(b),
            J::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None if n.is_u64() => Value::Number(n),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            J::String(s) => Value::String(s),
            J::Array(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(Value::from_json)
                    .collect::<Result<_>>()?,
            ),
            J::Object(map) if map.contains_key(TAG_KEY) => Value::Tagged(Tagged::from_json(map)?),
            J::Object(map) => Value::Mapping(
                map.into_iter()
                    .map(|(k, v)| Ok((k, Value::from_json(v)?)))
                    .collect::<Result<_>>()?,
            ),
        })
    }

    /// Lower to plain JSON without any tagging. Only data kinds are allowed;
    /// tables, dates and calls have no untagged form.
    pub fn to_plain_json(&self) -> Result<serde_json::Value> {
        self.plain_json_at(0)
    }

    /// Plain-JSON lowering that starts at `depth` and shares the normalizer's
    /// nesting limit.
    pub(crate) fn plain_json_at(&self, depth: usize) -> Result<serde_json::Value> {
        use serde_json::Value as J;

        if depth > MAX_DEPTH {
            return Err(Error::TooDeep { limit: MAX_DEPTH });
        }
        let depth = depth + 1;

        Ok(match self {
            Value::Null => J::Null,
            Value::Bool(b) => J::Bool(*b),
            Value::Int(i) => J::from(*i),
            Value::Float(f) => J::Number(finite(*f)?),
            Value::Number(n) => J::Number(n.clone()),
            Value::String(s) => J::String(s.clone()),
            Value::Sequence(items) => J::Array(
                items
                    .iter()
                    .map(|v| v.plain_json_at(depth))
                    .collect::<Result<_>>()?,
            ),
            Value::Mapping(map) => J::Object(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), v.plain_json_at(depth)?)))
                    .collect::<Result<_>>()?,
            ),
            Value::Tagged(t) => serde_json::to_value(t)?,
            other => {
                return Err(Error::UnsupportedType(format!(
                    "{} has no plain JSON form",
                    other.kind_name()
                )));
            }
        })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
            Value::Table(_) => "table",
            Value::Date(_) => "date",
            Value::DateTime(_) | Value::ZonedDateTime(_) => "datetime",
            Value::Call(_) => "call",
            Value::Function(_) => "function",
            Value::Tagged(_) => "tagged node",
        }
    }
}

pub(crate) fn finite(f: f64) -> Result<serde_json::Number> {
    serde_json::Number::from_f64(f)
        .ok_or_else(|| Error::UnsupportedType(format!("non-finite number {f}")))
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => String,
    &str => String,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => ZonedDateTime,
    Table => Table,
    DataFrame => Table,
    RecordBatch => Table,
    Call => Call,
    FunctionRef => Function,
    Tagged => Tagged,
}

impl From<DateTime<chrono::Utc>> for Value {
    fn from(dt: DateTime<chrono::Utc>) -> Self {
        Value::ZonedDateTime(dt.fixed_offset())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Mapping(map)
    }
}
