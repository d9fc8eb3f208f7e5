//! `nexus income` - rows per income level and the countries left unclassified

use anyhow::Result;
use arrow::array::RecordBatch;

use super::OutputArgs;
use crate::config::Config;

pub fn run(out: OutputArgs, nexus: &RecordBatch, config: &Config) -> Result<()> {
    let distribution = nexus_analysis::income_distribution(nexus)?;
    super::emit(&distribution, &out, config)?;

    let unclassified = nexus_analysis::unclassified_countries(nexus)?;
    if !unclassified.is_empty() {
        eprintln!(
            "{} countries without an income level: {}",
            unclassified.len(),
            unclassified.join(", ")
        );
    }
    Ok(())
}
