//! Column lookup and type coercion shared by the analysis operations

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use nexus_core::{NexusError, Result};
use rustc_hash::FxHashSet;

pub(crate) const COUNTRY: &str = "country";
pub(crate) const COUNTRY_OR_AREA: &str = "country_or_area";
pub(crate) const YEAR: &str = "year";
pub(crate) const VALUE: &str = "value";
pub(crate) const SOURCE: &str = "source";
pub(crate) const COLLECTION: &str = "collection";
pub(crate) const INDICATOR_LABEL: &str = "indicator_label";
pub(crate) const INDICATOR_CODE: &str = "indicator_code";
pub(crate) const SUB_REGION_NAME: &str = "sub_region_name";
pub(crate) const INCOME_LEVEL: &str = "income_level";

/// Look up a column, failing with a schema error when absent.
pub(crate) fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| NexusError::MissingColumn(name.to_string()))
}

fn is_text(dt: &DataType) -> bool {
    match dt {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => true,
        DataType::Dictionary(_, values) => is_text(values),
        _ => false,
    }
}

/// Text column (plain or dictionary-encoded) as a `StringArray`.
pub(crate) fn text_column(batch: &RecordBatch, name: &str) -> Result<StringArray> {
    let array = column(batch, name)?;
    if !is_text(array.data_type()) {
        return Err(NexusError::data_type(name, "text", array.data_type()));
    }
    Ok(cast(array, &DataType::Utf8)?.as_string::<i32>().clone())
}

/// Integer `year` column widened to `Int64`.
pub(crate) fn year_column(batch: &RecordBatch) -> Result<Int64Array> {
    let array = column(batch, YEAR)?;
    if !array.data_type().is_integer() {
        return Err(NexusError::data_type(YEAR, "integer", array.data_type()));
    }
    Ok(cast(array, &DataType::Int64)?.as_primitive::<Int64Type>().clone())
}

/// Numeric `value` column widened to `Float64`.
pub(crate) fn value_column(batch: &RecordBatch) -> Result<Float64Array> {
    let array = column(batch, VALUE)?;
    if !array.data_type().is_numeric() {
        return Err(NexusError::data_type(VALUE, "numeric", array.data_type()));
    }
    Ok(cast(array, &DataType::Float64)?.as_primitive::<Float64Type>().clone())
}

/// Reject a column list naming the same column twice.
pub(crate) fn ensure_unique<S: AsRef<str>>(names: &[S]) -> Result<()> {
    let mut seen = FxHashSet::default();
    for name in names {
        if !seen.insert(name.as_ref()) {
            return Err(NexusError::DuplicateColumn(name.as_ref().to_string()));
        }
    }
    Ok(())
}

/// Narrow a batch to `names`, in that order.
pub(crate) fn select<S: AsRef<str>>(batch: &RecordBatch, names: &[S]) -> Result<RecordBatch> {
    ensure_unique(names)?;
    let schema = batch.schema();
    let indices = names
        .iter()
        .map(|name| {
            schema
                .index_of(name.as_ref())
                .map_err(|_| NexusError::MissingColumn(name.as_ref().to_string()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(batch.project(&indices)?)
}

/// `Some(&str)` for a non-null text cell.
pub(crate) fn text_at(array: &StringArray, row: usize) -> Option<&str> {
    array.is_valid(row).then(|| array.value(row))
}
