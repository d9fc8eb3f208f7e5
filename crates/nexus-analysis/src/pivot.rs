//! Filter-pivot: long observations to a wide country × year table

use std::str::FromStr;
use std::sync::Arc;

use arrow::array::{ArrayRef, RecordBatch, UInt32Array};
use arrow::compute::take;
use arrow::datatypes::{Field, FieldRef, Schema};
use nexus_core::{NexusError, Result};
use rustc_hash::FxHashMap;

use crate::columns::{self, COUNTRY, INDICATOR_CODE, INDICATOR_LABEL, VALUE, YEAR};
use crate::group::group_by_appearance;

/// Which indicator column becomes the pivot's column headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorKey {
    Code,
    #[default]
    Label,
}

impl IndicatorKey {
    pub fn column(self) -> &'static str {
        match self {
            Self::Code => INDICATOR_CODE,
            Self::Label => INDICATOR_LABEL,
        }
    }

    /// Index columns with `indicator_label` swapped for `indicator_code` when keyed by code.
    pub fn resolve_columns<S: AsRef<str>>(self, index_cols: &[S]) -> Vec<String> {
        index_cols
            .iter()
            .map(|c| match self {
                Self::Code => c.as_ref().replace(INDICATOR_LABEL, INDICATOR_CODE),
                Self::Label => c.as_ref().to_string(),
            })
            .collect()
    }
}

impl FromStr for IndicatorKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "code" => Ok(Self::Code),
            "label" => Ok(Self::Label),
            other => Err(format!("expected 'code' or 'label', got '{other}'")),
        }
    }
}

impl std::fmt::Display for IndicatorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Code => "code",
            Self::Label => "label",
        })
    }
}

/// Pivot filtered rows on (country, year), one column per indicator.
///
/// The input is first narrowed to `index_cols` (after the code/label swap),
/// which must include `country`, `year`, `value` and the indicator column.
/// Rows and indicator columns appear in first-seen order. Each cell holds
/// the `value` of the first row with that (country, year, indicator);
/// unseen combinations are null. Rows with a null indicator are skipped.
pub fn filter_pivot<S: AsRef<str>>(
    batch: &RecordBatch,
    index_cols: &[S],
    ind: IndicatorKey,
) -> Result<RecordBatch> {
    let cols = ind.resolve_columns(index_cols);
    let narrowed = columns::select(batch, &cols)?;
    let country = columns::column(&narrowed, COUNTRY)?;
    let year = columns::column(&narrowed, YEAR)?;
    let value = columns::column(&narrowed, VALUE)?;
    let indicators = columns::text_column(&narrowed, ind.column())?;

    let (groups, row_group) = group_by_appearance(&[country.clone(), year.clone()])?;

    let mut ind_ids: FxHashMap<&str, usize> = FxHashMap::default();
    let mut names: Vec<&str> = Vec::new();
    let mut cells: Vec<Vec<Option<u32>>> = Vec::new();
    for (row, group) in row_group.iter().enumerate() {
        let Some(name) = columns::text_at(&indicators, row) else {
            continue;
        };
        let id = *ind_ids.entry(name).or_insert_with(|| {
            names.push(name);
            cells.push(vec![None; groups.len()]);
            names.len() - 1
        });
        let cell = &mut cells[id][*group];
        if cell.is_none() {
            *cell = Some(row as u32);
        }
    }

    let schema = narrowed.schema();
    let key_rows = groups.take_indices();
    let mut fields: Vec<FieldRef> = vec![
        schema.field_with_name(COUNTRY)?.clone().into(),
        schema.field_with_name(YEAR)?.clone().into(),
    ];
    let mut arrays: Vec<ArrayRef> = vec![
        take(country.as_ref(), &key_rows, None)?,
        take(year.as_ref(), &key_rows, None)?,
    ];
    for (name, rows) in names.iter().zip(cells) {
        if *name == COUNTRY || *name == YEAR {
            return Err(NexusError::DuplicateColumn((*name).to_string()));
        }
        fields.push(Arc::new(Field::new(*name, value.data_type().clone(), true)));
        arrays.push(take(value.as_ref(), &UInt32Array::from(rows), None)?);
    }

    log::debug!(
        "pivot on {}: {} rows -> {} (country, year) rows x {} indicators",
        ind.column(),
        batch.num_rows(),
        groups.len(),
        names.len()
    );
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}
