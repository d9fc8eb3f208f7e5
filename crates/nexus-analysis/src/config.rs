//! Column-list configuration passed to the analysis operations

use serde::Deserialize;

/// Column lists that drive pivoting, datamaps and profiling.
///
/// Deserialised from the `[query]` table of `nexus.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Columns kept before pivoting; must cover country, year, value and the indicator.
    pub index_columns: Vec<String>,
    pub source_metadata_columns: Vec<String>,
    pub indicator_metadata_columns: Vec<String>,
    pub country_classification_columns: Vec<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        let owned = |cols: &[&str]| cols.iter().map(|c| (*c).to_string()).collect();
        Self {
            index_columns: owned(&[
                "country",
                "year",
                "source",
                "collection",
                "indicator_label",
                "value",
            ]),
            source_metadata_columns: owned(&["source", "database", "collection"]),
            indicator_metadata_columns: owned(&["indicator_label", "value_meta"]),
            country_classification_columns: owned(&[
                "region_name",
                "sub_region_name",
                "income_level",
            ]),
        }
    }
}

impl QueryConfig {
    /// Source, indicator and country-classification columns, in that order.
    pub fn metadata_columns(&self) -> Vec<String> {
        self.source_metadata_columns
            .iter()
            .chain(&self.indicator_metadata_columns)
            .chain(&self.country_classification_columns)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_index_covers_pivot_keys() {
        let config = QueryConfig::default();
        for col in ["country", "year", "value", "indicator_label"] {
            assert!(config.index_columns.iter().any(|c| c == col), "{col}");
        }
    }

    #[test]
    fn metadata_columns_concatenate_in_order() {
        let config = QueryConfig {
            index_columns: vec![],
            source_metadata_columns: vec!["source".into()],
            indicator_metadata_columns: vec!["indicator_label".into()],
            country_classification_columns: vec!["income_level".into()],
        };
        assert_eq!(
            config.metadata_columns(),
            vec!["source", "indicator_label", "income_level"]
        );
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: QueryConfig = toml::from_str(
            r#"
source_metadata_columns = ["source", "collection"]
"#,
        )
        .unwrap();
        assert_eq!(config.source_metadata_columns, vec!["source", "collection"]);
        assert_eq!(config.index_columns, QueryConfig::default().index_columns);
    }
}
