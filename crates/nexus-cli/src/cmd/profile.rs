//! `nexus profile` - distinct values per metadata column

use anyhow::Result;
use arrow::array::RecordBatch;

use super::OutputArgs;
use crate::config::Config;

pub fn run(out: OutputArgs, nexus: &RecordBatch, config: &Config) -> Result<()> {
    let profile = nexus_analysis::metadata_profile(nexus, &config.query)?;
    super::emit(&profile, &out, config)
}
