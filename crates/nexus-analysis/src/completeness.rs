//! Indicator completeness: base statistics joined with region coverage and scored

use std::cmp::Ordering;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use nexus_core::Result;

use crate::region::{
    IndicatorCoverage, RegionCoverage, calculate_sub_region_coverage, get_sub_region_info,
};
use crate::stats::{IndicatorStats, calculate_base_stats};

/// One base-statistics row with its coverage and completeness scores.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorMetadata {
    pub stats: IndicatorStats,
    /// Per-region coverage; `None` when the indicator had no coverage row
    pub coverage: Option<Vec<Option<f64>>>,
    pub temporal_completeness: f64,
    pub geographic_completeness: Option<f64>,
    pub completeness_score: Option<f64>,
}

impl IndicatorMetadata {
    pub fn score(stats: IndicatorStats, coverage: Option<&IndicatorCoverage>) -> Self {
        let coverage = coverage.map(|c| c.pct.clone());
        let temporal = stats.temporal_completeness();
        let geographic = coverage.as_deref().and_then(mean_coverage);
        Self {
            stats,
            coverage,
            temporal_completeness: temporal,
            geographic_completeness: geographic,
            completeness_score: geographic.map(|g| (temporal + g) / 2.0),
        }
    }
}

/// Mean of the region percentages; null if any is null or there are none.
fn mean_coverage(pct: &[Option<f64>]) -> Option<f64> {
    if pct.is_empty() {
        return None;
    }
    let values = pct.iter().copied().collect::<Option<Vec<f64>>>()?;
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Descending by score, null scores first.
fn by_score_desc(a: &IndicatorMetadata, b: &IndicatorMetadata) -> Ordering {
    match (a.completeness_score, b.completeness_score) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => y.total_cmp(&x),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorsMetadata {
    /// `pct_coverage_<region>` names, in the order of each row's coverage
    pub coverage_columns: Vec<String>,
    pub rows: Vec<IndicatorMetadata>,
}

impl IndicatorsMetadata {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Statistics columns, then coverage columns, then the three scores.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = IndicatorStats::fields();
        let mut arrays = IndicatorStats::arrays(self.rows.iter().map(|r| &r.stats));

        for (i, name) in self.coverage_columns.iter().enumerate() {
            fields.push(Field::new(name, DataType::Float64, true));
            arrays.push(Arc::new(
                self.rows
                    .iter()
                    .map(|r| r.coverage.as_ref().and_then(|c| c.get(i).copied().flatten()))
                    .collect::<Float64Array>(),
            ));
        }

        fields.push(Field::new("temporal_completeness", DataType::Float64, false));
        arrays.push(Arc::new(Float64Array::from_iter_values(
            self.rows.iter().map(|r| r.temporal_completeness),
        )));
        let scores: [(&str, fn(&IndicatorMetadata) -> Option<f64>); 2] = [
            ("geographic_completeness", |r| r.geographic_completeness),
            ("completeness_score", |r| r.completeness_score),
        ];
        for (name, get) in scores {
            fields.push(Field::new(name, DataType::Float64, true));
            let array: ArrayRef = Arc::new(self.rows.iter().map(get).collect::<Float64Array>());
            arrays.push(array);
        }

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }
}

/// Left-join `stats` with `coverage` on indicator label and score every row.
///
/// Rows are ordered by completeness score, highest first; unscored rows
/// (no coverage match, a null region percentage, or no regions) lead.
pub fn score_indicators(stats: Vec<IndicatorStats>, coverage: &RegionCoverage) -> IndicatorsMetadata {
    let mut rows: Vec<IndicatorMetadata> = stats
        .into_iter()
        .map(|s| {
            let matched = s.indicator_label.as_deref().and_then(|l| coverage.get(l));
            IndicatorMetadata::score(s, matched)
        })
        .collect();
    rows.sort_by(by_score_desc);

    let unmatched = rows.iter().filter(|r| r.coverage.is_none()).count();
    if unmatched > 0 {
        log::debug!("{unmatched} indicators have no coverage row, score left null");
    }
    IndicatorsMetadata {
        coverage_columns: coverage.columns.clone(),
        rows,
    }
}

/// Sub-region info, base statistics and coverage combined into one scored table.
pub fn create_indicators_metadata(nexus: &RecordBatch) -> Result<IndicatorsMetadata> {
    let sub_regions = get_sub_region_info(nexus)?;
    let stats = calculate_base_stats(nexus)?;
    let coverage = calculate_sub_region_coverage(nexus, &sub_regions)?;
    let metadata = score_indicators(stats, &coverage);
    log::info!(
        "scored {} indicators over {} sub-regions",
        metadata.len(),
        sub_regions.len()
    );
    Ok(metadata)
}
