//! nexus - explore indicator coverage in the nexus dataset
//!
//! Loads the nexus parquet data, derives income levels and runs the
//! datamap, pivot, coverage and completeness analyses from the command line.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use nexus_core::SharedProgress;

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "nexus")]
#[command(about = "Explore indicator coverage in the nexus dataset")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./nexus.toml or ~/.config/nexus/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Nexus parquet file or shard directory (overrides [data] nexus_path)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Row counts per source (and indicator) metadata combination
    Datamap(cmd::datamap::DatamapArgs),
    /// Filter rows and pivot indicators into columns per country and year
    Pivot(cmd::pivot::PivotArgs),
    /// Countries observed in each sub-region
    Regions(cmd::OutputArgs),
    /// Descriptive statistics per indicator
    Stats(cmd::OutputArgs),
    /// Percentage of each sub-region's countries with data, per indicator
    Coverage(cmd::OutputArgs),
    /// Indicator statistics, coverage and completeness scores
    Metadata(cmd::OutputArgs),
    /// Rows per income level and unclassified countries
    Income(cmd::OutputArgs),
    /// Distinct values per metadata column
    Profile(cmd::OutputArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress: SharedProgress = Arc::new(nexus_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug: progress bars show activity
    //   non-TTY: info unless --debug: logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    nexus_core::init_logging(quiet, cli.debug, multi);

    let mut config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };
    if let Some(data) = cli.data {
        config.data.nexus_path = data;
    }

    if let Command::Config = cli.command {
        show_config(&config);
        return Ok(());
    }

    let nexus = cmd::load(&config.data.nexus_path, &progress)?;
    match cli.command {
        Command::Datamap(args) => cmd::datamap::run(args, &nexus, &config),
        Command::Pivot(args) => cmd::pivot::run(args, &nexus, &config),
        Command::Regions(out) => cmd::regions::run(out, &nexus, &config),
        Command::Stats(out) => cmd::stats::run(out, &nexus, &config),
        Command::Coverage(out) => cmd::coverage::run(out, &nexus, &config, &progress),
        Command::Metadata(out) => cmd::metadata::run(out, &nexus, &config, &progress),
        Command::Income(out) => cmd::income::run(out, &nexus, &config),
        Command::Profile(out) => cmd::profile::run(out, &nexus, &config),
        Command::Config => Ok(()),
    }
}

fn show_config(config: &Config) {
    use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    let query = &config.query;
    table.add_row(vec![
        "Nexus data",
        &config.data.nexus_path.display().to_string(),
    ]);
    table.add_row(vec!["Index columns", &query.index_columns.join(", ")]);
    table.add_row(vec![
        "Source metadata",
        &query.source_metadata_columns.join(", "),
    ]);
    table.add_row(vec![
        "Indicator metadata",
        &query.indicator_metadata_columns.join(", "),
    ]);
    table.add_row(vec![
        "Country classification",
        &query.country_classification_columns.join(", "),
    ]);
    table.add_row(vec![
        "Compression level",
        &config.output.compression_level.to_string(),
    ]);
    table.add_row(vec!["Max rows", &config.output.max_rows.to_string()]);

    eprintln!("\n{table}");
}
