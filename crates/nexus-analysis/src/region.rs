//! Sub-region country totals and per-indicator geographic coverage

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Float64Array, ListBuilder, RecordBatch, StringArray, StringBuilder,
    UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use nexus_core::{NexusError, Result};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::columns::{self, COUNTRY, INDICATOR_LABEL, SUB_REGION_NAME};

/// Column-name-safe form of a sub-region name (spaces → underscores).
pub fn normalize_region(name: &str) -> String {
    name.replace(' ', "_")
}

/// Percentage rounded to 3 decimals.
fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Countries observed in one sub-region.
#[derive(Debug, Clone, PartialEq)]
pub struct SubRegion {
    pub name: String,
    pub total_countries: usize,
    /// Sorted
    pub countries: Vec<String>,
}

impl SubRegion {
    pub fn coverage_column(&self) -> String {
        format!("pct_coverage_{}", normalize_region(&self.name))
    }
}

/// Denominator population for coverage, one entry per sub-region (sorted by name).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubRegionInfo {
    pub regions: Vec<SubRegion>,
}

impl SubRegionInfo {
    pub fn from_regions(mut regions: Vec<SubRegion>) -> Self {
        regions.sort_by(|a, b| a.name.cmp(&b.name));
        Self { regions }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SubRegion> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// `sub_region_name`, `total_countries`, `countries` (list of strings).
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let names = StringArray::from_iter_values(self.regions.iter().map(|r| r.name.as_str()));
        let totals =
            UInt32Array::from_iter_values(self.regions.iter().map(|r| r.total_countries as u32));
        let mut countries = ListBuilder::new(StringBuilder::new());
        for region in &self.regions {
            for country in &region.countries {
                countries.values().append_value(country);
            }
            countries.append(true);
        }
        let countries = countries.finish();

        let schema = Arc::new(Schema::new(vec![
            Field::new(SUB_REGION_NAME, DataType::Utf8, false),
            Field::new("total_countries", DataType::UInt32, false),
            Field::new("countries", countries.data_type().clone(), false),
        ]));
        Ok(RecordBatch::try_new(
            schema,
            vec![Arc::new(names), Arc::new(totals), Arc::new(countries)],
        )?)
    }
}

/// Distinct countries per sub-region, ignoring rows where either is null.
pub fn get_sub_region_info(nexus: &RecordBatch) -> Result<SubRegionInfo> {
    let countries = columns::text_column(nexus, COUNTRY)?;
    let regions = columns::text_column(nexus, SUB_REGION_NAME)?;

    let mut members: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for row in 0..nexus.num_rows() {
        if let (Some(country), Some(region)) = (
            columns::text_at(&countries, row),
            columns::text_at(&regions, row),
        ) {
            members.entry(region).or_default().insert(country);
        }
    }

    let regions = members
        .into_iter()
        .map(|(name, countries)| SubRegion {
            name: name.to_string(),
            total_countries: countries.len(),
            countries: countries.into_iter().map(str::to_string).collect(),
        })
        .collect::<Vec<_>>();
    log::debug!("sub-region info: {} regions", regions.len());
    Ok(SubRegionInfo { regions })
}

/// Coverage percentages of one indicator, aligned with [`RegionCoverage::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorCoverage {
    pub indicator_label: String,
    /// `None` where the region has no countries to divide by
    pub pct: Vec<Option<f64>>,
}

/// Per-indicator share of each sub-region's countries reporting a value.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionCoverage {
    /// Output column names (`pct_coverage_<region>`), in `SubRegionInfo` order
    pub columns: Vec<String>,
    /// Sorted by indicator label
    pub rows: Vec<IndicatorCoverage>,
}

impl RegionCoverage {
    pub fn get(&self, indicator_label: &str) -> Option<&IndicatorCoverage> {
        self.rows
            .binary_search_by(|r| r.indicator_label.as_str().cmp(indicator_label))
            .ok()
            .map(|i| &self.rows[i])
    }

    /// `indicator_label` followed by one Float64 column per region.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = vec![Field::new(INDICATOR_LABEL, DataType::Utf8, false)];
        let mut arrays: Vec<ArrayRef> = vec![Arc::new(StringArray::from_iter_values(
            self.rows.iter().map(|r| r.indicator_label.as_str()),
        ))];
        for (i, column) in self.columns.iter().enumerate() {
            fields.push(Field::new(column, DataType::Float64, true));
            arrays.push(Arc::new(
                self.rows.iter().map(|r| r.pct[i]).collect::<Float64Array>(),
            ));
        }
        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }
}

/// Percentage of each sub-region's countries with data, per indicator.
///
/// Only rows with a non-null `value` count. For every region in
/// `sub_region_info`: `100 * countries_with_data / total_countries`,
/// rounded to 3 decimals; 0 when the indicator has no data there, null when
/// the region has no countries at all.
pub fn calculate_sub_region_coverage(
    nexus: &RecordBatch,
    sub_region_info: &SubRegionInfo,
) -> Result<RegionCoverage> {
    let labels = columns::text_column(nexus, INDICATOR_LABEL)?;
    let countries = columns::text_column(nexus, COUNTRY)?;
    let regions = columns::text_column(nexus, SUB_REGION_NAME)?;
    let values = columns::value_column(nexus)?;

    // indicator → normalized region → countries with data
    let mut seen: BTreeMap<&str, FxHashMap<String, FxHashSet<&str>>> = BTreeMap::new();
    for row in 0..nexus.num_rows() {
        if values.is_null(row) {
            continue;
        }
        let (Some(label), Some(country), Some(region)) = (
            columns::text_at(&labels, row),
            columns::text_at(&countries, row),
            columns::text_at(&regions, row),
        ) else {
            continue;
        };
        seen.entry(label)
            .or_default()
            .entry(normalize_region(region))
            .or_default()
            .insert(country);
    }

    let known: Vec<(String, usize)> = sub_region_info
        .regions
        .iter()
        .map(|r| (normalize_region(&r.name), r.total_countries))
        .collect();
    let mut names = FxHashSet::default();
    for (region, _) in &known {
        if !names.insert(region.as_str()) {
            return Err(NexusError::DuplicateColumn(format!("pct_coverage_{region}")));
        }
    }
    for (region, _) in known.iter().filter(|(_, total)| *total == 0) {
        log::warn!("sub-region '{region}' has no countries, coverage left null");
    }

    let rows = seen
        .into_iter()
        .map(|(label, by_region)| IndicatorCoverage {
            indicator_label: label.to_string(),
            pct: known
                .iter()
                .map(|(region, total)| {
                    let with_data = by_region.get(region).map_or(0, |c| c.len());
                    (*total > 0).then(|| round3(100.0 * with_data as f64 / *total as f64))
                })
                .collect(),
        })
        .collect::<Vec<_>>();

    log::debug!(
        "coverage: {} indicators x {} regions",
        rows.len(),
        known.len()
    );
    Ok(RegionCoverage {
        columns: sub_region_info
            .regions
            .iter()
            .map(SubRegion::coverage_column)
            .collect(),
        rows,
    })
}
