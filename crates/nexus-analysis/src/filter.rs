//! Row filters applied before pivoting or summarising

use arrow::array::{Array, AsArray, BooleanArray, RecordBatch};
use arrow::compute::{cast, filter_record_batch};
use arrow::datatypes::DataType;
use nexus_core::Result;

use crate::columns;

/// Keep rows whose `column`, rendered as text, equals one of `values`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub column: String,
    pub values: Vec<String>,
}

impl RowFilter {
    pub fn new(column: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Per-row match mask. Null cells never match.
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let array = columns::column(batch, &self.column)?;
        let text = cast(array, &DataType::Utf8)?;
        let text = text.as_string::<i32>();
        Ok((0..text.len())
            .map(|i| Some(text.is_valid(i) && self.values.iter().any(|v| v == text.value(i))))
            .collect())
    }
}

/// Apply every filter (logical AND) and return the surviving rows.
pub fn apply_filters(batch: &RecordBatch, filters: &[RowFilter]) -> Result<RecordBatch> {
    let mut current = batch.clone();
    for filter in filters {
        let mask = filter.mask(&current)?;
        current = filter_record_batch(&current, &mask)?;
        log::debug!(
            "filter {} in [{}]: {} rows remain",
            filter.column,
            filter.values.join(", "),
            current.num_rows()
        );
    }
    Ok(current)
}
