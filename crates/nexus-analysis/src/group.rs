//! Multi-column grouping over arbitrary Arrow types via the row format

use std::collections::BTreeMap;

use arrow::array::{ArrayRef, UInt32Array};
use arrow::row::{RowConverter, Rows, SortField};
use nexus_core::Result;
use rustc_hash::FxHashMap;

/// One group per distinct key: the first member row and the member count.
#[derive(Debug, Default)]
pub(crate) struct Groups {
    pub first_rows: Vec<u32>,
    pub counts: Vec<u32>,
}

impl Groups {
    pub fn len(&self) -> usize {
        self.first_rows.len()
    }

    /// Indices for `take` that pick each group's key values.
    pub fn take_indices(&self) -> UInt32Array {
        UInt32Array::from(self.first_rows.clone())
    }
}

/// Encode key columns into comparable, hashable rows.
///
/// Row order matches an ascending sort with nulls first.
fn encode(keys: &[ArrayRef]) -> Result<Rows> {
    let fields = keys
        .iter()
        .map(|k| SortField::new(k.data_type().clone()))
        .collect();
    let converter = RowConverter::new(fields)?;
    Ok(converter.convert_columns(keys)?)
}

/// Group rows by key, groups ordered ascending by key.
pub(crate) fn group_sorted(keys: &[ArrayRef]) -> Result<Groups> {
    let rows = encode(keys)?;
    let mut map: BTreeMap<_, (u32, u32)> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        map.entry(row).or_insert((i as u32, 0)).1 += 1;
    }

    let mut groups = Groups::default();
    for (first, count) in map.into_values() {
        groups.first_rows.push(first);
        groups.counts.push(count);
    }
    Ok(groups)
}

/// Group rows by key, groups ordered by first appearance.
///
/// Returns the groups and the group index of every input row.
pub(crate) fn group_by_appearance(keys: &[ArrayRef]) -> Result<(Groups, Vec<usize>)> {
    let rows = encode(keys)?;
    let mut ids: FxHashMap<_, usize> = FxHashMap::default();
    let mut groups = Groups::default();
    let mut row_group = Vec::with_capacity(rows.num_rows());

    for (i, row) in rows.iter().enumerate() {
        let id = *ids.entry(row).or_insert_with(|| {
            groups.first_rows.push(i as u32);
            groups.counts.push(0);
            groups.first_rows.len() - 1
        });
        groups.counts[id] += 1;
        row_group.push(id);
    }
    Ok((groups, row_group))
}
