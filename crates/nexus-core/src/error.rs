//! Common error type for nexus table operations

use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Result alias used across the nexus crates.
pub type Result<T> = std::result::Result<T, NexusError>;

/// Error from loading, transforming or writing a nexus table.
///
/// `MissingColumn` and `DuplicateColumn` are schema errors: the caller asked
/// for columns the table cannot provide. `DataType` is raised when a column
/// exists but cannot take part in the requested grouping or aggregation.
#[derive(Debug)]
pub enum NexusError {
    MissingColumn(String),
    DuplicateColumn(String),
    DataType {
        column: String,
        expected: &'static str,
        found: DataType,
    },
    Arrow(ArrowError),
    Parquet(ParquetError),
    Io(std::io::Error),
}

impl std::fmt::Display for NexusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn(name) => write!(f, "schema: column '{name}' not found"),
            Self::DuplicateColumn(name) => {
                write!(f, "schema: column '{name}' requested more than once")
            }
            Self::DataType {
                column,
                expected,
                found,
            } => write!(f, "data type: column '{column}' is {found}, expected {expected}"),
            Self::Arrow(e) => write!(f, "Arrow: {e}"),
            Self::Parquet(e) => write!(f, "Parquet: {e}"),
            Self::Io(e) => write!(f, "IO: {e}"),
        }
    }
}

impl std::error::Error for NexusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Arrow(e) => Some(e),
            Self::Parquet(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArrowError> for NexusError {
    fn from(e: ArrowError) -> Self {
        Self::Arrow(e)
    }
}

impl From<ParquetError> for NexusError {
    fn from(e: ParquetError) -> Self {
        Self::Parquet(e)
    }
}

impl From<std::io::Error> for NexusError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl NexusError {
    /// Missing or duplicated column names.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::MissingColumn(_) | Self::DuplicateColumn(_))
    }

    pub fn is_data_type_error(&self) -> bool {
        matches!(self, Self::DataType { .. })
    }

    pub fn data_type(column: &str, expected: &'static str, found: &DataType) -> Self {
        Self::DataType {
            column: column.to_string(),
            expected,
            found: found.clone(),
        }
    }
}
