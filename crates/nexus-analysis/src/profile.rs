//! Distinct-value counts per metadata column

use std::sync::Arc;

use arrow::array::{RecordBatch, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use nexus_core::Result;

use crate::columns;
use crate::config::QueryConfig;
use crate::group::group_sorted;

/// Number of distinct values in each of `cols`, null counted as one value.
///
/// Returns `column` (Utf8) and `distinct_count` (UInt32), one row per
/// requested column in the order given.
pub fn distinct_counts<S: AsRef<str>>(batch: &RecordBatch, cols: &[S]) -> Result<RecordBatch> {
    let selected = columns::select(batch, cols)?;
    let counts = selected
        .columns()
        .iter()
        .map(|col| group_sorted(std::slice::from_ref(col)).map(|g| g.len() as u32))
        .collect::<Result<Vec<u32>>>()?;

    let schema = Schema::new(vec![
        Field::new("column", DataType::Utf8, false),
        Field::new("distinct_count", DataType::UInt32, false),
    ]);
    Ok(RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(StringArray::from_iter_values(cols.iter().map(AsRef::as_ref))),
            Arc::new(UInt32Array::from(counts)),
        ],
    )?)
}

/// [`distinct_counts`] over every metadata column named by `config`.
pub fn metadata_profile(batch: &RecordBatch, config: &QueryConfig) -> Result<RecordBatch> {
    distinct_counts(batch, &config.metadata_columns())
}
