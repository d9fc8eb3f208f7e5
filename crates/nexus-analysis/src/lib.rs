//! nexus-analysis: indicator coverage and reshaping over the nexus dataset
//!
//! The nexus table holds one observation per (country, year, indicator)
//! with source/collection metadata, the country's sub-region and four
//! World Bank income flags. This crate derives the income level, summarises
//! how rows are distributed across metadata (datamap), pivots filtered rows
//! to a wide country×year table, and scores each indicator by temporal and
//! geographic completeness.
//!
//! Every operation takes a `&RecordBatch` and returns new data; inputs are
//! never modified.

mod columns;
pub mod completeness;
pub mod config;
pub mod datamap;
pub mod filter;
mod group;
pub mod income;
pub mod pivot;
pub mod profile;
pub mod region;
pub mod stats;

#[cfg(test)]
mod test_support;

pub use completeness::{
    IndicatorMetadata, IndicatorsMetadata, create_indicators_metadata, score_indicators,
};
pub use config::QueryConfig;
pub use datamap::datamap;
pub use filter::{RowFilter, apply_filters};
pub use income::{IncomeLevel, classify_income, income_distribution, unclassified_countries};
pub use pivot::{IndicatorKey, filter_pivot};
pub use profile::{distinct_counts, metadata_profile};
pub use region::{
    IndicatorCoverage, RegionCoverage, SubRegion, SubRegionInfo, calculate_sub_region_coverage,
    get_sub_region_info, normalize_region,
};
pub use stats::{IndicatorStats, calculate_base_stats};
