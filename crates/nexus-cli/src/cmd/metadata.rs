//! `nexus metadata` - completeness scores for every indicator

use anyhow::Result;
use arrow::array::RecordBatch;
use nexus_core::{ProgressContext, fmt_num};

use super::OutputArgs;
use super::coverage::heatmap_style;
use crate::config::Config;

pub fn run(out: OutputArgs, nexus: &RecordBatch, config: &Config, progress: &ProgressContext) -> Result<()> {
    let stage = progress.stage_line("metadata");
    stage.set_message(format!("scoring indicators over {} rows", fmt_num(nexus.num_rows())));
    let metadata = nexus_analysis::create_indicators_metadata(nexus)?;
    stage.finish_and_clear();

    let unscored = metadata
        .rows
        .iter()
        .filter(|r| r.completeness_score.is_none())
        .count();
    if unscored > 0 {
        log::warn!(
            "{unscored} of {} indicators have no completeness score",
            metadata.len()
        );
    }
    super::emit_styled(&metadata.to_record_batch()?, &out, config, heatmap_style)
}
