//! `nexus datamap` - row counts per metadata combination

use anyhow::Result;
use arrow::array::RecordBatch;
use clap::Args;

use super::OutputArgs;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct DatamapArgs {
    /// Also group by the indicator metadata columns
    #[arg(long)]
    pub indicators: bool,

    #[command(flatten)]
    pub out: OutputArgs,
}

pub fn run(args: DatamapArgs, nexus: &RecordBatch, config: &Config) -> Result<()> {
    let query = &config.query;
    let indicator_cols: &[String] = if args.indicators {
        &query.indicator_metadata_columns
    } else {
        &[]
    };
    let counts = nexus_analysis::datamap(nexus, &query.source_metadata_columns, indicator_cols)?;
    super::emit(&counts, &args.out, config)
}
