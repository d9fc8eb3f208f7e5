//! `nexus regions` - countries observed in each sub-region

use anyhow::Result;
use arrow::array::RecordBatch;

use super::OutputArgs;
use crate::config::Config;

pub fn run(out: OutputArgs, nexus: &RecordBatch, config: &Config) -> Result<()> {
    let info = nexus_analysis::get_sub_region_info(nexus)?;
    if info.is_empty() {
        log::warn!("No rows carry both a country and a sub-region");
    }
    super::emit(&info.to_record_batch()?, &out, config)
}
