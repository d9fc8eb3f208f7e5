//! Per-indicator descriptive statistics

use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use nexus_core::Result;
use rustc_hash::FxHashSet;

use crate::columns::{self, COLLECTION, COUNTRY, INDICATOR_LABEL, SOURCE};

/// Statistics for one (source, collection, indicator_label) group.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorStats {
    pub source: Option<String>,
    pub collection: Option<String>,
    pub indicator_label: Option<String>,
    pub count_rows: usize,
    pub count_missing_value: usize,
    /// Distinct non-null countries, with or without a value
    pub num_countries_with_data: usize,
    /// Distinct years that carry a non-null value
    pub num_years_with_data: usize,
    pub mean_value: Option<f64>,
    pub median_value: Option<f64>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub iqr_value: Option<f64>,
    pub min_year: Option<i64>,
    pub max_year: Option<i64>,
    pub pct_missing_value: f64,
}

impl IndicatorStats {
    /// Arrow fields matching [`IndicatorStats::arrays`].
    pub(crate) fn fields() -> Vec<Field> {
        let text = |name| Field::new(name, DataType::Utf8, true);
        let count = |name| Field::new(name, DataType::UInt32, false);
        let float = |name| Field::new(name, DataType::Float64, true);
        let year = |name| Field::new(name, DataType::Int64, true);
        vec![
            text(SOURCE),
            text(COLLECTION),
            text(INDICATOR_LABEL),
            count("count_rows"),
            count("count_missing_value"),
            count("num_countries_with_data"),
            count("num_years_with_data"),
            float("mean_value"),
            float("median_value"),
            float("min_value"),
            float("max_value"),
            float("iqr_value"),
            year("min_year"),
            year("max_year"),
            Field::new("pct_missing_value", DataType::Float64, false),
        ]
    }

    pub(crate) fn arrays<'a>(rows: impl Iterator<Item = &'a IndicatorStats> + Clone) -> Vec<ArrayRef> {
        let text = |f: fn(&IndicatorStats) -> Option<&str>| -> ArrayRef {
            Arc::new(rows.clone().map(f).collect::<StringArray>())
        };
        let count = |f: fn(&IndicatorStats) -> usize| -> ArrayRef {
            Arc::new(UInt32Array::from_iter_values(rows.clone().map(|r| f(r) as u32)))
        };
        let float = |f: fn(&IndicatorStats) -> Option<f64>| -> ArrayRef {
            Arc::new(rows.clone().map(f).collect::<Float64Array>())
        };
        let year = |f: fn(&IndicatorStats) -> Option<i64>| -> ArrayRef {
            Arc::new(rows.clone().map(f).collect::<Int64Array>())
        };
        vec![
            text(|r| r.source.as_deref()),
            text(|r| r.collection.as_deref()),
            text(|r| r.indicator_label.as_deref()),
            count(|r| r.count_rows),
            count(|r| r.count_missing_value),
            count(|r| r.num_countries_with_data),
            count(|r| r.num_years_with_data),
            float(|r| r.mean_value),
            float(|r| r.median_value),
            float(|r| r.min_value),
            float(|r| r.max_value),
            float(|r| r.iqr_value),
            year(|r| r.min_year),
            year(|r| r.max_year),
            Arc::new(Float64Array::from_iter_values(
                rows.clone().map(|r| r.pct_missing_value),
            )),
        ]
    }

    pub fn to_record_batch(rows: &[IndicatorStats]) -> Result<RecordBatch> {
        Ok(RecordBatch::try_new(
            Arc::new(Schema::new(Self::fields())),
            Self::arrays(rows.iter()),
        )?)
    }

    /// Temporal completeness: share of the observed year span that has data, 0 without a span.
    pub fn temporal_completeness(&self) -> f64 {
        match (self.min_year, self.max_year) {
            (Some(min), Some(max)) if max - min + 1 > 0 => {
                100.0 * self.num_years_with_data as f64 / (max - min + 1) as f64
            }
            _ => 0.0,
        }
    }
}

/// Linear-interpolation quantile of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

#[derive(Default)]
struct GroupAcc<'a> {
    rows: usize,
    missing: usize,
    countries: FxHashSet<&'a str>,
    years: FxHashSet<i64>,
    values: Vec<f64>,
}

impl GroupAcc<'_> {
    fn finish(mut self, key: (Option<&str>, Option<&str>, Option<&str>)) -> IndicatorStats {
        self.values.sort_by(f64::total_cmp);
        let n = self.values.len();
        let mean = (n > 0).then(|| self.values.iter().sum::<f64>() / n as f64);
        let iqr = quantile(&self.values, 0.75).zip(quantile(&self.values, 0.25));

        IndicatorStats {
            source: key.0.map(str::to_string),
            collection: key.1.map(str::to_string),
            indicator_label: key.2.map(str::to_string),
            count_rows: self.rows,
            count_missing_value: self.missing,
            num_countries_with_data: self.countries.len(),
            num_years_with_data: self.years.len(),
            mean_value: mean,
            median_value: quantile(&self.values, 0.5),
            min_value: self.values.first().copied(),
            max_value: self.values.last().copied(),
            iqr_value: iqr.map(|(q3, q1)| q3 - q1),
            min_year: self.years.iter().min().copied(),
            max_year: self.years.iter().max().copied(),
            pct_missing_value: self.missing as f64 / self.rows as f64 * 100.0,
        }
    }
}

/// Descriptive statistics per (source, collection, indicator_label), sorted by that key.
///
/// Value statistics ignore nulls and are null for a group with no values;
/// row and missing counts are always defined.
pub fn calculate_base_stats(nexus: &RecordBatch) -> Result<Vec<IndicatorStats>> {
    let sources = columns::text_column(nexus, SOURCE)?;
    let collections = columns::text_column(nexus, COLLECTION)?;
    let labels = columns::text_column(nexus, INDICATOR_LABEL)?;
    let countries = columns::text_column(nexus, COUNTRY)?;
    let years = columns::year_column(nexus)?;
    let values = columns::value_column(nexus)?;

    type Key<'a> = (Option<&'a str>, Option<&'a str>, Option<&'a str>);
    let mut groups: BTreeMap<Key<'_>, GroupAcc<'_>> = BTreeMap::new();
    for row in 0..nexus.num_rows() {
        let key = (
            columns::text_at(&sources, row),
            columns::text_at(&collections, row),
            columns::text_at(&labels, row),
        );
        let acc = groups.entry(key).or_default();
        acc.rows += 1;
        if let Some(country) = columns::text_at(&countries, row) {
            acc.countries.insert(country);
        }
        if values.is_null(row) {
            acc.missing += 1;
            continue;
        }
        acc.values.push(values.value(row));
        if years.is_valid(row) {
            acc.years.insert(years.value(row));
        }
    }

    log::debug!(
        "base stats: {} indicator groups from {} rows",
        groups.len(),
        nexus.num_rows()
    );
    Ok(groups
        .into_iter()
        .map(|(key, acc)| acc.finish(key))
        .collect())
}
