//! Fixture builders for unit tests

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int32Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};

#[derive(Debug, Clone)]
pub(crate) struct Obs {
    pub country: Option<&'static str>,
    pub sub_region: Option<&'static str>,
    pub year: Option<i32>,
    pub source: Option<&'static str>,
    pub collection: Option<&'static str>,
    pub label: Option<&'static str>,
    pub code: Option<&'static str>,
    pub value: Option<f64>,
}

/// Observation from the "WB"/"WDI" collection with no indicator code.
pub(crate) fn obs(
    country: &'static str,
    sub_region: &'static str,
    year: i32,
    label: &'static str,
    value: Option<f64>,
) -> Obs {
    Obs {
        country: Some(country),
        sub_region: Some(sub_region),
        year: Some(year),
        source: Some("WB"),
        collection: Some("WDI"),
        label: Some(label),
        code: None,
        value,
    }
}

impl Obs {
    pub fn source(mut self, source: &'static str, collection: &'static str) -> Self {
        self.source = Some(source);
        self.collection = Some(collection);
        self
    }

    pub fn code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }
}

pub(crate) fn nexus_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("country", DataType::Utf8, true),
        Field::new("year", DataType::Int32, true),
        Field::new("source", DataType::Utf8, true),
        Field::new("collection", DataType::Utf8, true),
        Field::new("indicator_label", DataType::Utf8, true),
        Field::new("indicator_code", DataType::Utf8, true),
        Field::new("value", DataType::Float64, true),
        Field::new("sub_region_name", DataType::Utf8, true),
    ]))
}

pub(crate) fn nexus_batch(rows: &[Obs]) -> RecordBatch {
    let text = |f: fn(&Obs) -> Option<&'static str>| -> ArrayRef {
        Arc::new(rows.iter().map(f).collect::<StringArray>())
    };
    RecordBatch::try_new(
        nexus_schema(),
        vec![
            text(|o| o.country),
            Arc::new(rows.iter().map(|o| o.year).collect::<Int32Array>()) as ArrayRef,
            text(|o| o.source),
            text(|o| o.collection),
            text(|o| o.label),
            text(|o| o.code),
            Arc::new(rows.iter().map(|o| o.value).collect::<Float64Array>()),
            text(|o| o.sub_region),
        ],
    )
    .unwrap()
}

/// Column `name` rendered as strings ("null" for nulls).
pub(crate) fn strings(batch: &RecordBatch, name: &str) -> Vec<String> {
    use arrow::util::display::{ArrayFormatter, FormatOptions};
    let options = FormatOptions::default().with_null("null");
    let col = batch.column_by_name(name).unwrap();
    let fmt = ArrayFormatter::try_new(col.as_ref(), &options).unwrap();
    (0..batch.num_rows()).map(|i| fmt.value(i).to_string()).collect()
}

/// Float64 column as options.
pub(crate) fn floats(batch: &RecordBatch, name: &str) -> Vec<Option<f64>> {
    let col = batch
        .column_by_name(name)
        .unwrap()
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    col.iter().collect()
}
