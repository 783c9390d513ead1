//! Conversions between Arrow `RecordBatch` and the native `DataFrame`.
//!
//! Arrow columns are lowered to the logical kinds a `Column` can hold:
//! narrower integers and floats widen to 64 bits, every string layout becomes
//! plain UTF-8 (dictionary-encoded strings are unpacked), columns of the
//! Arrow null type become all-missing string columns, and timestamps keep
//! their timezone but lose their unit.
//! Going back always produces the same canonical batch for the same content,
//! whichever representation it started from.

use crate::table::TableError;
use crate::table::frame::{Column, DataFrame};

use arrow_array::cast::AsArray;
use arrow_array::types::{
    ArrowPrimitiveType, ArrowTemporalType, Date32Type, Date64Type, Float32Type, Float64Type,
    Int8Type, Int16Type, Int32Type, Int64Type, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType, UInt8Type,
    UInt16Type, UInt32Type, UInt64Type,
};
use arrow_array::{
    AnyDictionaryArray, Array, ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array,
    PrimitiveArray, RecordBatch, RecordBatchOptions, StringArray, TimestampMillisecondArray,
};
use arrow_schema::{DataType, Field, Schema, TimeUnit};
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;

impl TryFrom<&RecordBatch> for DataFrame {
    type Error = TableError;

    fn try_from(batch: &RecordBatch) -> Result<Self, Self::Error> {
        let schema = batch.schema();
        let mut frame = DataFrame::empty(batch.num_rows());
        for (field, array) in schema.fields().iter().zip(batch.columns()) {
            let column = column_from_array(field.name(), array.as_ref())?;
            frame = frame.with_column(field.name().clone(), column)?;
        }
        Ok(frame)
    }
}

impl DataFrame {
    /// Build the canonical Arrow batch for this frame: one array per column,
    /// all fields nullable, no schema metadata.
    pub fn to_record_batch(&self) -> Result<RecordBatch, TableError> {
        let mut fields = Vec::with_capacity(self.width());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.width());

        for (name, column) in self.columns() {
            let array: ArrayRef = match column {
                Column::Int(v) => Arc::new(Int64Array::from(v.clone())),
                Column::Float(v) => Arc::new(Float64Array::from(v.clone())),
                Column::Bool(v) => Arc::new(BooleanArray::from(v.clone())),
                Column::Str(v) => Arc::new(v.iter().map(Option::as_deref).collect::<StringArray>()),
                Column::Date(v) => Arc::new(
                    v.iter()
                        .map(|d| d.map(Date32Type::from_naive_date))
                        .collect::<Date32Array>(),
                ),
                Column::Datetime { values, timezone } => Arc::new(
                    values
                        .iter()
                        .map(|d| d.map(|d| d.and_utc().timestamp_millis()))
                        .collect::<TimestampMillisecondArray>()
                        .with_timezone_opt(timezone.clone()),
                ),
            };
            fields.push(Field::new(name, array.data_type().clone(), true));
            arrays.push(array);
        }

        let schema = Arc::new(Schema::new(fields));
        let options = RecordBatchOptions::new().with_row_count(Some(self.height()));
        Ok(RecordBatch::try_new_with_options(schema, arrays, &options)?)
    }
}

fn column_from_array(name: &str, array: &dyn Array) -> Result<Column, TableError> {
    let column = match array.data_type() {
        DataType::Int8 => Column::Int(ints(array.as_primitive::<Int8Type>())),
        DataType::Int16 => Column::Int(ints(array.as_primitive::<Int16Type>())),
        DataType::Int32 => Column::Int(ints(array.as_primitive::<Int32Type>())),
        DataType::Int64 => Column::Int(ints(array.as_primitive::<Int64Type>())),
        DataType::UInt8 => Column::Int(ints(array.as_primitive::<UInt8Type>())),
        DataType::UInt16 => Column::Int(ints(array.as_primitive::<UInt16Type>())),
        DataType::UInt32 => Column::Int(ints(array.as_primitive::<UInt32Type>())),
        DataType::UInt64 => Column::Int(
            array
                .as_primitive::<UInt64Type>()
                .iter()
                .map(|v| {
                    v.map(|v| {
                        i64::try_from(v).map_err(|_| TableError::IntegerOverflow {
                            name: name.to_string(),
                            value: v,
                        })
                    })
                    .transpose()
                })
                .collect::<Result<_, _>>()?,
        ),
        DataType::Float32 => Column::Float(
            array
                .as_primitive::<Float32Type>()
                .iter()
                .map(|v| v.map(f64::from))
                .collect(),
        ),
        DataType::Float64 => Column::Float(array.as_primitive::<Float64Type>().iter().collect()),
        DataType::Boolean => Column::Bool(array.as_boolean().iter().collect()),
        DataType::Utf8 => Column::Str(strings(array.as_string::<i32>().iter())),
        DataType::LargeUtf8 => Column::Str(strings(array.as_string::<i64>().iter())),
        DataType::Utf8View => Column::Str(strings(array.as_string_view().iter())),
        DataType::Dictionary(_, values) if is_string(values) => {
            Column::Str(dictionary_strings(name, array)?)
        }
        DataType::Null => Column::Str(vec![None; array.len()]),
        DataType::Date32 => Column::Date(dates(name, array.as_primitive::<Date32Type>())?),
        DataType::Date64 => Column::Date(dates(name, array.as_primitive::<Date64Type>())?),
        DataType::Timestamp(unit, tz) => {
            let values = match unit {
                TimeUnit::Second => datetimes(name, array.as_primitive::<TimestampSecondType>()),
                TimeUnit::Millisecond => {
                    datetimes(name, array.as_primitive::<TimestampMillisecondType>())
                }
                TimeUnit::Microsecond => {
                    datetimes(name, array.as_primitive::<TimestampMicrosecondType>())
                }
                TimeUnit::Nanosecond => {
                    datetimes(name, array.as_primitive::<TimestampNanosecondType>())
                }
            }?;
            Column::Datetime {
                values,
                timezone: tz.as_deref().map(str::to_string),
            }
        }
        other => return Err(unsupported(name, other)),
    };
    Ok(column)
}

fn ints<T>(array: &PrimitiveArray<T>) -> Vec<Option<i64>>
where
    T: ArrowPrimitiveType,
    T::Native: Into<i64>,
{
    array.iter().map(|v| v.map(Into::into)).collect()
}

fn is_string(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View)
}

fn dictionary_strings(
    name: &str,
    array: &dyn Array,
) -> Result<Vec<Option<String>>, TableError> {
    let dict = array.as_any_dictionary();
    let values = match column_from_array(name, dict.values().as_ref())? {
        Column::Str(values) => values,
        _ => return Err(unsupported(name, array.data_type())),
    };
    Ok(dict
        .normalized_keys()
        .into_iter()
        .enumerate()
        .map(|(i, key)| {
            if array.is_null(i) {
                None
            } else {
                values.get(key).cloned().flatten()
            }
        })
        .collect())
}

fn strings<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<Option<String>> {
    values.map(|v| v.map(str::to_string)).collect()
}

fn dates<T>(name: &str, array: &PrimitiveArray<T>) -> Result<Vec<Option<NaiveDate>>, TableError>
where
    T: ArrowTemporalType,
    i64: From<T::Native>,
{
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                return Ok(None);
            }
            array
                .value_as_date(i)
                .map(Some)
                .ok_or_else(|| unsupported(name, array.data_type()))
        })
        .collect()
}

fn datetimes<T>(
    name: &str,
    array: &PrimitiveArray<T>,
) -> Result<Vec<Option<NaiveDateTime>>, TableError>
where
    T: ArrowTemporalType,
    i64: From<T::Native>,
{
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                return Ok(None);
            }
            array
                .value_as_datetime(i)
                .map(Some)
                .ok_or_else(|| unsupported(name, array.data_type()))
        })
        .collect()
}

fn unsupported(name: &str, data_type: &DataType) -> TableError {
    TableError::UnsupportedColumn {
        name: name.to_string(),
        data_type: data_type.to_string(),
    }
}
