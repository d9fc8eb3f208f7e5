use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, AsArray, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema, UInt32Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use nexus_analysis::{
    IndicatorKey, IndicatorStats, QueryConfig, RowFilter, apply_filters, calculate_base_stats,
    calculate_sub_region_coverage, classify_income, create_indicators_metadata, datamap,
    filter_pivot, get_sub_region_info, income_distribution, metadata_profile,
    unclassified_countries,
};
use nexus_core::{ProgressContext, load_nexus};
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

/// One raw observation as shipped in the nexus parquet files.
struct Raw {
    country: &'static str,
    region: &'static str,
    sub_region: &'static str,
    income: Option<&'static str>,
    year: i64,
    source: &'static str,
    label: &'static str,
    code: &'static str,
    value: Option<f64>,
}

fn raw(
    country: &'static str,
    sub_region: &'static str,
    income: Option<&'static str>,
    year: i64,
    label: &'static str,
    value: Option<f64>,
) -> Raw {
    let region = match sub_region {
        "Western Africa" | "Middle Africa" => "Africa",
        _ => "Americas",
    };
    let code = match label {
        "GDP per capita" => "GDP.PC",
        _ => "TAX.REV",
    };
    Raw {
        country,
        region,
        sub_region,
        income,
        year,
        source: "WB",
        label,
        code,
        value,
    }
}

fn raw_batch(rows: &[Raw]) -> RecordBatch {
    let text = |name: &str| Field::new(name, DataType::Utf8, true);
    let schema = Arc::new(Schema::new(vec![
        text("country_or_area"),
        Field::new("year", DataType::Int64, true),
        text("source"),
        text("database"),
        text("collection"),
        text("indicator_label"),
        text("indicator_code"),
        text("value_meta"),
        Field::new("value", DataType::Float64, true),
        text("region_name"),
        text("sub_region_name"),
        text("high_income"),
        text("upper_middle_income"),
        text("lower_middle_income"),
        text("low_income"),
    ]));
    let strs = |f: &dyn Fn(&Raw) -> Option<&'static str>| -> ArrayRef {
        Arc::new(rows.iter().map(f).collect::<StringArray>())
    };
    let flag = |marker: &'static str| -> ArrayRef {
        Arc::new(
            rows.iter()
                .map(|r| if r.income == Some(marker) { Some(marker) } else { Some("") })
                .collect::<StringArray>(),
        )
    };
    RecordBatch::try_new(
        schema,
        vec![
            strs(&|r| Some(r.country)),
            Arc::new(rows.iter().map(|r| Some(r.year)).collect::<Int64Array>()),
            strs(&|r| Some(r.source)),
            strs(&|_| Some("World Development Indicators")),
            strs(&|_| Some("WDI")),
            strs(&|r| Some(r.label)),
            strs(&|r| Some(r.code)),
            strs(&|_| None),
            Arc::new(rows.iter().map(|r| r.value).collect::<Float64Array>()),
            strs(&|r| Some(r.region)),
            strs(&|r| Some(r.sub_region)),
            flag("High income"),
            flag("Upper middle income"),
            flag("Lower middle income"),
            flag("Low income"),
        ],
    )
    .unwrap()
}

fn write_shard(dir: &Path, name: &str, batch: &RecordBatch) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(batch).unwrap();
    writer.close().unwrap();
    path
}

fn strings(batch: &RecordBatch, name: &str) -> Vec<String> {
    let options = FormatOptions::default().with_null("null");
    let col = batch.column_by_name(name).unwrap();
    let fmt = ArrayFormatter::try_new(col.as_ref(), &options).unwrap();
    (0..batch.num_rows()).map(|i| fmt.value(i).to_string()).collect()
}

fn floats(batch: &RecordBatch, name: &str) -> Vec<Option<f64>> {
    batch
        .column_by_name(name)
        .unwrap()
        .as_primitive::<arrow::datatypes::Float64Type>()
        .iter()
        .collect()
}

/// Nexus dataset split over two shards, loaded and income-classified.
fn load_fixture() -> (TempDir, RecordBatch) {
    let dir = TempDir::new().unwrap();
    let gdp = "GDP per capita";
    let tax = "Tax revenue";
    write_shard(
        dir.path(),
        "part-0.parquet",
        &raw_batch(&[
            raw("Ghana", "Western Africa", Some("Lower middle income"), 2019, gdp, Some(2.2)),
            raw("Ghana", "Western Africa", Some("Lower middle income"), 2020, gdp, Some(2.3)),
            raw("Liberia", "Western Africa", Some("Low income"), 2020, gdp, None),
            raw("Chad", "Middle Africa", Some("Low income"), 2020, gdp, Some(0.7)),
        ]),
    );
    write_shard(
        dir.path(),
        "part-1.parquet",
        &raw_batch(&[
            raw("Chile", "South America", Some("High income"), 2019, gdp, Some(15.0)),
            raw("Chile", "South America", Some("High income"), 2020, gdp, Some(14.0)),
            raw("Peru", "South America", Some("Upper middle income"), 2020, tax, Some(16.1)),
            raw("Atlantis", "South America", None, 2020, tax, None),
        ]),
    );
    let loaded = load_nexus(dir.path(), &ProgressContext::hidden()).unwrap();
    let nexus = classify_income(&loaded).unwrap();
    (dir, nexus)
}

#[test]
fn load_and_classify() {
    let (_dir, nexus) = load_fixture();
    assert_eq!(nexus.num_rows(), 8);
    assert!(nexus.column_by_name("country_or_area").is_none());
    assert_eq!(
        strings(&nexus, "income_level"),
        vec![
            "Lower Middle Income",
            "Lower Middle Income",
            "Low Income",
            "Low Income",
            "High Income",
            "High Income",
            "Upper Middle Income",
            "null",
        ]
    );
    assert_eq!(unclassified_countries(&nexus).unwrap(), vec!["Atlantis"]);
}

#[test]
fn income_distribution_counts() {
    let (_dir, nexus) = load_fixture();
    let dist = income_distribution(&nexus).unwrap();
    let counts: Vec<u32> = dist
        .column_by_name("count")
        .unwrap()
        .as_primitive::<UInt32Type>()
        .values()
        .to_vec();
    assert_eq!(counts.iter().sum::<u32>(), 8);
    assert_eq!(counts[0], 2);
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn datamap_over_default_metadata() {
    let (_dir, nexus) = load_fixture();
    let config = QueryConfig::default();
    let out = datamap(
        &nexus,
        &config.source_metadata_columns,
        &config.indicator_metadata_columns,
    )
    .unwrap();
    assert_eq!(strings(&out, "indicator_label"), vec!["GDP per capita", "Tax revenue"]);
    assert_eq!(strings(&out, "count"), vec!["6", "2"]);
}

#[test]
fn filter_then_pivot_by_code() {
    let (_dir, nexus) = load_fixture();
    let filtered = apply_filters(
        &nexus,
        &[
            RowFilter::new("region_name", ["Americas"]),
            RowFilter::new("year", ["2020"]),
        ],
    )
    .unwrap();
    let config = QueryConfig::default();
    let wide = filter_pivot(&filtered, &config.index_columns, IndicatorKey::Code).unwrap();
    assert_eq!(strings(&wide, "country"), vec!["Chile", "Peru", "Atlantis"]);
    assert_eq!(floats(&wide, "GDP.PC"), vec![Some(14.0), None, None]);
    assert_eq!(floats(&wide, "TAX.REV"), vec![None, Some(16.1), None]);
}

#[test]
fn coverage_by_sub_region() {
    let (_dir, nexus) = load_fixture();
    let info = get_sub_region_info(&nexus).unwrap();
    let names: Vec<_> = info.regions.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Middle Africa", "South America", "Western Africa"]);
    assert_eq!(info.get("South America").unwrap().total_countries, 3);

    let coverage = calculate_sub_region_coverage(&nexus, &info).unwrap();
    let batch = coverage.to_record_batch().unwrap();
    assert_eq!(strings(&batch, "indicator_label"), vec!["GDP per capita", "Tax revenue"]);
    assert_eq!(floats(&batch, "pct_coverage_Middle_Africa"), vec![Some(100.0), Some(0.0)]);
    assert_eq!(floats(&batch, "pct_coverage_South_America"), vec![Some(33.333), Some(33.333)]);
    assert_eq!(floats(&batch, "pct_coverage_Western_Africa"), vec![Some(50.0), Some(0.0)]);
}

#[test]
fn completeness_pipeline() {
    let (_dir, nexus) = load_fixture();
    let stats = calculate_base_stats(&nexus).unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].count_rows, 6);
    assert_eq!(stats[0].count_missing_value, 1);
    assert_eq!(stats[0].num_countries_with_data, 4);
    assert_eq!(stats[1].num_years_with_data, 1);
    assert_eq!(IndicatorStats::to_record_batch(&stats).unwrap().num_rows(), 2);

    let metadata = create_indicators_metadata(&nexus).unwrap();
    let batch = metadata.to_record_batch().unwrap();
    assert_eq!(strings(&batch, "indicator_label"), vec!["GDP per capita", "Tax revenue"]);

    // GDP: years 2019-2020 both with data; coverage (100 + 33.333 + 50) / 3
    let gdp = &metadata.rows[0];
    assert_eq!(gdp.temporal_completeness, 100.0);
    let geographic = (100.0 + 33.333 + 50.0) / 3.0;
    assert!((gdp.geographic_completeness.unwrap() - geographic).abs() < 1e-9);
    assert!((gdp.completeness_score.unwrap() - (100.0 + geographic) / 2.0).abs() < 1e-9);
    assert!(
        metadata
            .rows
            .windows(2)
            .all(|w| w[0].completeness_score >= w[1].completeness_score)
    );
}

#[test]
fn profile_default_metadata_columns() {
    let (_dir, nexus) = load_fixture();
    let out = metadata_profile(&nexus, &QueryConfig::default()).unwrap();
    assert_eq!(
        strings(&out, "column"),
        vec![
            "source",
            "database",
            "collection",
            "indicator_label",
            "value_meta",
            "region_name",
            "sub_region_name",
            "income_level",
        ]
    );
    assert_eq!(strings(&out, "distinct_count"), vec!["1", "1", "1", "2", "1", "2", "3", "5"]);
}

#[test]
fn missing_shard_directory_fails() {
    let dir = TempDir::new().unwrap();
    let err = load_nexus(&dir.path().join("absent"), &ProgressContext::hidden()).unwrap_err();
    assert!(!err.is_schema_error());
}
