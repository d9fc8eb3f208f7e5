//! Income-level classification from the four World Bank income flags

use std::collections::BTreeSet;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, DictionaryArray, RecordBatch};
use arrow::compute::{SortColumn, SortOptions, lexsort_to_indices, take_record_batch};
use arrow::datatypes::{DataType, Field, FieldRef, Int8Type, Schema};
use nexus_core::{NexusError, Result};

use crate::columns::{self, COUNTRY, COUNTRY_OR_AREA, INCOME_LEVEL};
use crate::datamap::datamap;

/// Income group of a country, in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IncomeLevel {
    High,
    UpperMiddle,
    LowerMiddle,
    Low,
    /// No flag carried its marker
    Unknown,
}

impl IncomeLevel {
    /// Classified levels, highest priority first.
    pub const PRIORITY: [IncomeLevel; 4] = [
        IncomeLevel::High,
        IncomeLevel::UpperMiddle,
        IncomeLevel::LowerMiddle,
        IncomeLevel::Low,
    ];

    /// Flag column that marks this level.
    pub fn flag_column(self) -> Option<&'static str> {
        match self {
            Self::High => Some("high_income"),
            Self::UpperMiddle => Some("upper_middle_income"),
            Self::LowerMiddle => Some("lower_middle_income"),
            Self::Low => Some("low_income"),
            Self::Unknown => None,
        }
    }

    /// Text a string flag column holds when the flag is set.
    pub fn marker(self) -> Option<&'static str> {
        match self {
            Self::High => Some("High income"),
            Self::UpperMiddle => Some("Upper middle income"),
            Self::LowerMiddle => Some("Lower middle income"),
            Self::Low => Some("Low income"),
            Self::Unknown => None,
        }
    }

    /// Value written to `income_level`; `Unknown` is written as null.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::High => Some("High Income"),
            Self::UpperMiddle => Some("Upper Middle Income"),
            Self::LowerMiddle => Some("Lower Middle Income"),
            Self::Low => Some("Low Income"),
            Self::Unknown => None,
        }
    }

    pub fn from_label(label: &str) -> Self {
        Self::PRIORITY
            .into_iter()
            .find(|level| level.label() == Some(label))
            .unwrap_or(Self::Unknown)
    }
}

impl std::fmt::Display for IncomeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label().unwrap_or("Unknown"))
    }
}

/// Per-row flag state for one level. An absent column never matches.
fn flag_set(batch: &RecordBatch, level: IncomeLevel) -> Result<Vec<bool>> {
    let (Some(name), Some(marker)) = (level.flag_column(), level.marker()) else {
        return Ok(vec![false; batch.num_rows()]);
    };
    let Some(array) = batch.column_by_name(name) else {
        log::debug!("income flag '{name}' absent, treated as unset");
        return Ok(vec![false; batch.num_rows()]);
    };

    if let DataType::Boolean = array.data_type() {
        let flags = array.as_boolean();
        return Ok((0..flags.len())
            .map(|i| flags.is_valid(i) && flags.value(i))
            .collect());
    }
    let flags = columns::text_column(batch, name)
        .map_err(|_| NexusError::data_type(name, "text or boolean", array.data_type()))?;
    Ok((0..flags.len())
        .map(|i| columns::text_at(&flags, i) == Some(marker))
        .collect())
}

/// Income level of every row, checking flags in priority order.
pub fn income_levels(batch: &RecordBatch) -> Result<Vec<IncomeLevel>> {
    let flags = IncomeLevel::PRIORITY
        .iter()
        .map(|level| flag_set(batch, *level))
        .collect::<Result<Vec<_>>>()?;

    Ok((0..batch.num_rows())
        .map(|row| {
            IncomeLevel::PRIORITY
                .iter()
                .zip(&flags)
                .find(|(_, set)| set[row])
                .map_or(IncomeLevel::Unknown, |(level, _)| *level)
        })
        .collect())
}

/// Build the enriched nexus table.
///
/// Renames `country_or_area` to `country` and appends a dictionary-encoded
/// `income_level` column (replacing one already present).
pub fn classify_income(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let has_raw = schema.index_of(COUNTRY_OR_AREA).is_ok();
    let has_country = schema.index_of(COUNTRY).is_ok();
    match (has_raw, has_country) {
        (false, false) => return Err(NexusError::MissingColumn(COUNTRY_OR_AREA.to_string())),
        (true, true) => return Err(NexusError::DuplicateColumn(COUNTRY.to_string())),
        _ => {}
    }

    let levels = income_levels(batch)?;
    let income: DictionaryArray<Int8Type> = levels.iter().map(|level| level.label()).collect();

    let mut fields: Vec<FieldRef> = Vec::with_capacity(schema.fields().len() + 1);
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len() + 1);
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        if field.name() == INCOME_LEVEL {
            continue;
        }
        if field.name() == COUNTRY_OR_AREA {
            fields.push(Arc::new(field.as_ref().clone().with_name(COUNTRY)));
        } else {
            fields.push(field.clone());
        }
        arrays.push(array.clone());
    }
    fields.push(Arc::new(Field::new(
        INCOME_LEVEL,
        income.data_type().clone(),
        true,
    )));
    arrays.push(Arc::new(income));

    let unknown = levels.iter().filter(|l| **l == IncomeLevel::Unknown).count();
    log::debug!(
        "income_level: {} of {} rows unclassified",
        unknown,
        batch.num_rows()
    );

    let schema = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));
    Ok(RecordBatch::try_new(schema, arrays)?)
}

/// Row count per `income_level`, largest first.
pub fn income_distribution(nexus: &RecordBatch) -> Result<RecordBatch> {
    let counts = datamap(nexus, &[INCOME_LEVEL], &[])?;
    let indices = lexsort_to_indices(
        &[
            SortColumn {
                values: columns::column(&counts, "count")?.clone(),
                options: Some(SortOptions {
                    descending: true,
                    nulls_first: false,
                }),
            },
            SortColumn {
                values: columns::column(&counts, INCOME_LEVEL)?.clone(),
                options: None,
            },
        ],
        None,
    )?;
    Ok(take_record_batch(&counts, &indices)?)
}

/// Distinct countries with no income classification, sorted.
pub fn unclassified_countries(nexus: &RecordBatch) -> Result<Vec<String>> {
    let countries = columns::text_column(nexus, COUNTRY)?;
    let income = columns::column(nexus, INCOME_LEVEL)?;

    let unclassified: BTreeSet<&str> = (0..nexus.num_rows())
        .filter(|&row| income.is_null(row))
        .filter_map(|row| columns::text_at(&countries, row))
        .collect();
    if !unclassified.is_empty() {
        log::warn!("{} countries have no income level", unclassified.len());
    }
    Ok(unclassified.into_iter().map(str::to_string).collect())
}
