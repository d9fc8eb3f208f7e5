//! Subcommands and the helpers they share

pub mod coverage;
pub mod datamap;
pub mod income;
pub mod metadata;
pub mod pivot;
pub mod profile;
pub mod regions;
pub mod stats;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, RecordBatch};
use clap::Args;
use comfy_table::Color;
use nexus_core::{ProgressContext, fmt_num};

use crate::config::Config;

#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Write the result to this parquet file instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Load the nexus dataset and derive `income_level`.
pub fn load(path: &Path, progress: &ProgressContext) -> Result<RecordBatch> {
    let raw = nexus_core::load_nexus(path, progress)
        .with_context(|| format!("Failed to load nexus data from {}", path.display()))?;
    let nexus = nexus_analysis::classify_income(&raw).context("Failed to classify income levels")?;
    let classified = nexus
        .column_by_name("income_level")
        .map_or(0, |c| c.len() - c.null_count());
    log::info!(
        "Classified income level for {} of {} rows",
        fmt_num(classified),
        fmt_num(nexus.num_rows())
    );
    Ok(nexus)
}

/// Write `batch` to `--output` if given, otherwise print it as a table.
pub fn emit(batch: &RecordBatch, out: &OutputArgs, config: &Config) -> Result<()> {
    emit_styled(batch, out, config, |_, _, _| None)
}

/// [`emit`] with a per-cell background colour for the terminal table.
pub fn emit_styled(
    batch: &RecordBatch,
    out: &OutputArgs,
    config: &Config,
    style: impl Fn(&str, &ArrayRef, usize) -> Option<Color>,
) -> Result<()> {
    if let Some(path) = &out.output {
        let rows = nexus_core::write_parquet(batch, path, config.output.compression_level)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Wrote {} rows to {}", fmt_num(rows), path.display());
        return Ok(());
    }
    let table = nexus_core::render_batch_styled(batch, config.output.max_rows, style)
        .context("Failed to render table")?;
    println!("{table}");
    Ok(())
}
