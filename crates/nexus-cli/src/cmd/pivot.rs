//! `nexus pivot` - filter rows, then spread indicators into columns

use anyhow::Result;
use arrow::array::RecordBatch;
use clap::Args;
use nexus_analysis::{IndicatorKey, RowFilter};

use super::OutputArgs;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct PivotArgs {
    /// Indicator column used for headers: label or code
    #[arg(long, default_value_t = IndicatorKey::Label)]
    pub ind: IndicatorKey,

    /// Keep only these sources (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub source: Vec<String>,

    /// Keep only these collections
    #[arg(long, value_delimiter = ',')]
    pub collection: Vec<String>,

    /// Keep only these years
    #[arg(long, value_delimiter = ',')]
    pub year: Vec<String>,

    /// Keep only these countries
    #[arg(long, value_delimiter = ',')]
    pub country: Vec<String>,

    /// Keep only these regions
    #[arg(long, value_delimiter = ',')]
    pub region: Vec<String>,

    #[command(flatten)]
    pub out: OutputArgs,
}

impl PivotArgs {
    fn filters(&self) -> Vec<RowFilter> {
        [
            ("source", &self.source),
            ("collection", &self.collection),
            ("year", &self.year),
            ("country", &self.country),
            ("region_name", &self.region),
        ]
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(column, values)| RowFilter::new(column, values.iter().cloned()))
        .collect()
    }
}

pub fn run(args: PivotArgs, nexus: &RecordBatch, config: &Config) -> Result<()> {
    let filtered = nexus_analysis::apply_filters(nexus, &args.filters())?;
    if filtered.num_rows() == 0 {
        log::warn!("No rows match the filters");
    }
    let wide = nexus_analysis::filter_pivot(&filtered, &config.query.index_columns, args.ind)?;
    super::emit(&wide, &args.out, config)
}
