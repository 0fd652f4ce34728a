//! Conversion between Arrow record batches and grid records.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, RecordBatch, StringBuilder, UInt64Array};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Decimal128Type, Field, Float16Type, Float32Type, Float64Type, Int16Type,
    Int32Type, Int64Type, Int8Type, Schema, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};

use super::{Column, ColumnType, Data, Record};
use crate::error::{Error, Result};

impl Data {
    /// Build a dataset body from an Arrow record batch.
    ///
    /// Column ids are the field names. Cells are converted to text and
    /// nulls become empty strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] for fields with no text form
    /// (binary, nested and dictionary types).
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self> {
        let schema = batch.schema();
        let columns = schema
            .fields()
            .iter()
            .map(|f| Ok(Column::new(f.name().clone(), column_type(f.data_type())?)))
            .collect::<Result<Vec<_>>>()?;

        let mut records = Vec::with_capacity(batch.num_rows());
        for row in 0..batch.num_rows() {
            let mut record = Record::new();
            for (column, array) in columns.iter().zip(batch.columns()) {
                record.set(column.id.clone(), cell_text(array.as_ref(), row)?);
            }
            records.push(record);
        }

        Ok(Self { columns, records })
    }
}

/// Build an Arrow batch from records.
///
/// The batch has a leading non-null `UInt64` id column named `id_field`,
/// followed by one nullable `Utf8` column per schema column. Cells a
/// record does not carry are null.
///
/// # Errors
///
/// Returns [`Error::Arrow`] if the batch cannot be assembled.
pub fn records_to_batch<'a>(
    columns: &[Column],
    records: impl IntoIterator<Item = &'a Record>,
    id_field: &str,
) -> Result<RecordBatch> {
    let records: Vec<&Record> = records.into_iter().collect();

    let mut fields = Vec::with_capacity(columns.len() + 1);
    fields.push(Field::new(id_field, DataType::UInt64, false));
    fields.extend(
        columns
            .iter()
            .map(|c| Field::new(c.id.as_str(), DataType::Utf8, true)),
    );

    let ids = UInt64Array::from(
        records
            .iter()
            .map(|r| u64::try_from(r.tdp_id()).unwrap_or(u64::MAX))
            .collect::<Vec<_>>(),
    );
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len() + 1);
    arrays.push(Arc::new(ids));
    for column in columns {
        let mut builder = StringBuilder::with_capacity(records.len(), records.len() * 8);
        for record in &records {
            builder.append_option(record.get(&column.id));
        }
        arrays.push(Arc::new(builder.finish()));
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).map_err(Error::Arrow)
}

/// Domain type of an Arrow field.
fn column_type(dt: &DataType) -> Result<ColumnType> {
    let column_type = match dt {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => ColumnType::Integer,
        DataType::Float16 | DataType::Float32 => ColumnType::Float,
        DataType::Float64 => ColumnType::Double,
        DataType::Decimal128(_, _) => ColumnType::Numeric,
        DataType::Boolean => ColumnType::Boolean,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Null => ColumnType::String,
        DataType::Date32 | DataType::Date64 => ColumnType::Date,
        other => return Err(Error::unsupported_type(other.to_string())),
    };
    Ok(column_type)
}

/// Text form of one Arrow cell.
fn cell_text(array: &dyn Array, row: usize) -> Result<String> {
    if row >= array.len() || array.is_null(row) {
        return Ok(String::new());
    }

    let text = match array.data_type() {
        DataType::Utf8 => array.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => array.as_string::<i64>().value(row).to_string(),

        DataType::Int8 => array.as_primitive::<Int8Type>().value(row).to_string(),
        DataType::Int16 => array.as_primitive::<Int16Type>().value(row).to_string(),
        DataType::Int32 => array.as_primitive::<Int32Type>().value(row).to_string(),
        DataType::Int64 => array.as_primitive::<Int64Type>().value(row).to_string(),
        DataType::UInt8 => array.as_primitive::<UInt8Type>().value(row).to_string(),
        DataType::UInt16 => array.as_primitive::<UInt16Type>().value(row).to_string(),
        DataType::UInt32 => array.as_primitive::<UInt32Type>().value(row).to_string(),
        DataType::UInt64 => array.as_primitive::<UInt64Type>().value(row).to_string(),

        DataType::Float16 => array.as_primitive::<Float16Type>().value(row).to_string(),
        DataType::Float32 => array.as_primitive::<Float32Type>().value(row).to_string(),
        DataType::Float64 => array.as_primitive::<Float64Type>().value(row).to_string(),
        DataType::Decimal128(_, _) => array.as_primitive::<Decimal128Type>().value_as_string(row),

        DataType::Boolean => array.as_boolean().value(row).to_string(),

        DataType::Date32 => array
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map(|d| d.to_string())
            .unwrap_or_default(),
        DataType::Date64 => array
            .as_primitive::<Date64Type>()
            .value_as_date(row)
            .map(|d| d.to_string())
            .unwrap_or_default(),

        DataType::Null => String::new(),
        other => return Err(Error::unsupported_type(other.to_string())),
    };

    Ok(text)
}
