//! `nexus stats` - descriptive statistics per indicator

use anyhow::Result;
use arrow::array::RecordBatch;
use nexus_analysis::IndicatorStats;

use super::OutputArgs;
use crate::config::Config;

pub fn run(out: OutputArgs, nexus: &RecordBatch, config: &Config) -> Result<()> {
    let stats = nexus_analysis::calculate_base_stats(nexus)?;
    super::emit(&IndicatorStats::to_record_batch(&stats)?, &out, config)
}
