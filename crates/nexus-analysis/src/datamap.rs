//! Datamap: row counts per unique combination of metadata columns

use std::sync::Arc;

use arrow::array::{ArrayRef, RecordBatch, UInt32Array};
use arrow::compute::take;
use arrow::datatypes::{DataType, Field, Schema};
use nexus_core::Result;

use crate::columns;
use crate::group::group_sorted;

/// Count rows by source metadata, optionally refined by indicator metadata.
///
/// Groups on `source_metadata_columns` followed by
/// `indicator_metadata_columns` (pass an empty slice to skip it) and emits
/// one row per distinct combination with a `count` column. Output is
/// ordered ascending by the grouping columns, nulls first.
pub fn datamap<S: AsRef<str>>(
    batch: &RecordBatch,
    source_metadata_columns: &[S],
    indicator_metadata_columns: &[S],
) -> Result<RecordBatch> {
    let group_cols: Vec<&str> = source_metadata_columns
        .iter()
        .chain(indicator_metadata_columns)
        .map(AsRef::as_ref)
        .collect();
    let keys = columns::select(batch, &group_cols)?;

    let count_field = Field::new("count", DataType::UInt32, false);
    if group_cols.is_empty() {
        let schema = Arc::new(Schema::new(vec![count_field]));
        let total = UInt32Array::from(vec![batch.num_rows() as u32]);
        return Ok(RecordBatch::try_new(schema, vec![Arc::new(total)])?);
    }

    let groups = group_sorted(keys.columns())?;
    log::debug!(
        "datamap over [{}]: {} groups from {} rows",
        group_cols.join(", "),
        groups.len(),
        batch.num_rows()
    );

    let indices = groups.take_indices();
    let mut arrays = keys
        .columns()
        .iter()
        .map(|col| take(col.as_ref(), &indices, None))
        .collect::<std::result::Result<Vec<ArrayRef>, _>>()?;
    arrays.push(Arc::new(UInt32Array::from(groups.counts)));

    let mut fields: Vec<Field> = keys
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    fields.push(count_field);

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}
