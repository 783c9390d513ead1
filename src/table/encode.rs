//! Columnar encoder: tables to Arrow IPC stream bytes.

use crate::table::frame::DataFrame;
use crate::table::{Table, TableError};

use arrow_array::RecordBatch;
use arrow_ipc::reader::StreamReader;
use arrow_ipc::writer::StreamWriter;
use std::borrow::Cow;
use std::io::Cursor;
use tracing::debug;

/// Encode a table as a single-batch Arrow IPC stream.
///
/// Both representations go through the canonical `DataFrame` batch, so equal
/// logical content yields byte-identical output.
pub fn encode_table(table: &Table) -> Result<Vec<u8>, TableError> {
    let frame = match table {
        Table::Arrow(batch) => Cow::Owned(DataFrame::try_from(batch)?),
        Table::Frame(frame) => Cow::Borrowed(frame),
    };
    let batch = frame.to_record_batch()?;
    let buf = write_stream(&batch)?;
    debug!(
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        bytes = buf.len(),
        "encoded table"
    );
    Ok(buf)
}

/// Decode bytes produced by [`encode_table`].
pub fn decode_table(bytes: &[u8]) -> Result<DataFrame, TableError> {
    let mut reader = StreamReader::try_new(Cursor::new(bytes), None)?;
    match reader.next() {
        Some(batch) => DataFrame::try_from(&batch?),
        None => Ok(DataFrame::default()),
    }
}

fn write_stream(batch: &RecordBatch) -> Result<Vec<u8>, TableError> {
    let mut buf = Vec::new();
    {
        let mut writer = StreamWriter::try_new(&mut buf, batch.schema_ref())?;
        writer.write(batch)?;
        writer.finish()?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use arrow_array::{
        BooleanArray, Date32Array, Float32Array, Int16Array, RecordBatchOptions,
        StringViewArray, TimestampNanosecondArray,
    };
    use arrow_schema::{DataType, Field, Schema, TimeUnit};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn native() -> DataFrame {
        let noon = day(2024, 1, 2).and_hms_opt(12, 0, 0).unwrap();
        DataFrame::new(vec![
            ("id", Column::from(vec![Some(1i64), None, Some(3)])),
            ("score", Column::from(vec![Some(0.5f64), Some(1.5), None])),
            ("ok", Column::from(vec![Some(true), Some(false), None])),
            ("name", Column::from(vec![Some("a"), None, Some("c")])),
            ("day", Column::from(vec![Some(day(2024, 1, 1)), Some(day(2024, 1, 2)), None])),
            ("at", Column::datetime(vec![None, Some(noon), Some(noon)], Some("UTC"))),
        ])
        .unwrap()
    }

    fn arrow() -> RecordBatch {
        let noon_ns = day(2024, 1, 2)
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_nanos_opt()
            .unwrap();
        let at = TimestampNanosecondArray::from(vec![None, Some(noon_ns), Some(noon_ns)])
            .with_timezone("UTC");
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int16, true),
            Field::new("score", DataType::Float32, true),
            Field::new("ok", DataType::Boolean, true),
            Field::new("name", DataType::Utf8View, true),
            Field::new("day", DataType::Date32, true),
            Field::new(
                "at",
                DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into())),
                true,
            ),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int16Array::from(vec![Some(1), None, Some(3)])),
                Arc::new(Float32Array::from(vec![Some(0.5), Some(1.5), None])),
                Arc::new(BooleanArray::from(vec![Some(true), Some(false), None])),
                Arc::new(StringViewArray::from(vec![Some("a"), None, Some("c")])),
                Arc::new(Date32Array::from(vec![Some(19723), Some(19724), None])),
                Arc::new(at),
            ],
        )
        .unwrap()
    }

    #[test]
    fn representations_encode_identically() {
        let a = encode_table(&Table::Frame(native())).unwrap();
        let b = encode_table(&Table::Arrow(arrow())).unwrap();
        assert!(!a.is_empty());
        assert!(a == b, "frame and arrow batch must encode to the same bytes");
    }

    #[test]
    fn names_types_and_rows_survive() {
        let bytes = encode_table(&Table::Frame(native())).unwrap();
        let decoded = decode_table(&bytes).unwrap();
        assert_eq!(decoded, native());
    }

    #[test]
    fn empty_table_encodes() {
        let frame = DataFrame::new(vec![("x", Column::Int(vec![]))]).unwrap();
        let bytes = encode_table(&Table::Frame(frame.clone())).unwrap();
        assert_eq!(decode_table(&bytes).unwrap(), frame);
    }

    #[test]
    fn zero_column_table_keeps_row_count() {
        let options = RecordBatchOptions::new().with_row_count(Some(5));
        let batch =
            RecordBatch::try_new_with_options(Arc::new(Schema::empty()), vec![], &options)
                .unwrap();
        let bytes = encode_table(&Table::Arrow(batch)).unwrap();
        assert_eq!(bytes, encode_table(&Table::Frame(DataFrame::empty(5))).unwrap());
        assert_eq!(decode_table(&bytes).unwrap().height(), 5);
    }
}
