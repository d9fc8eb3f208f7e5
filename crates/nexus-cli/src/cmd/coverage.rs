//! `nexus coverage` - share of each sub-region's countries reporting each indicator

use anyhow::Result;
use arrow::array::{Array, ArrayRef, AsArray, RecordBatch};
use arrow::datatypes::{DataType, Float64Type};
use comfy_table::Color;
use nexus_core::ProgressContext;

use super::OutputArgs;
use crate::config::Config;

const COVERAGE_PREFIX: &str = "pct_coverage_";

/// Red at 0, #ffc300 at 50, green at 100.
pub fn heatmap_color(pct: f64) -> Color {
    let v = pct.clamp(0.0, 100.0);
    let (r, g) = if v <= 50.0 {
        (255.0, 195.0 * v / 50.0)
    } else {
        let t = (v - 50.0) / 50.0;
        (255.0 * (1.0 - t), 195.0 + 60.0 * t)
    };
    Color::Rgb {
        r: r as u8,
        g: g as u8,
        b: 0,
    }
}

/// Cell style for tables carrying `pct_coverage_*` columns.
pub fn heatmap_style(name: &str, column: &ArrayRef, row: usize) -> Option<Color> {
    if !name.starts_with(COVERAGE_PREFIX) || *column.data_type() != DataType::Float64 {
        return None;
    }
    let pct = column.as_primitive::<Float64Type>();
    pct.is_valid(row).then(|| heatmap_color(pct.value(row)))
}

pub fn run(out: OutputArgs, nexus: &RecordBatch, config: &Config, progress: &ProgressContext) -> Result<()> {
    let stage = progress.stage_line("coverage");
    stage.set_message("counting countries per sub-region");
    let info = nexus_analysis::get_sub_region_info(nexus)?;
    stage.set_message(format!("{} sub-regions, scoring indicators", info.len()));
    let coverage = nexus_analysis::calculate_sub_region_coverage(nexus, &info)?;
    stage.finish_and_clear();

    super::emit_styled(&coverage.to_record_batch()?, &out, config, heatmap_style)
}
