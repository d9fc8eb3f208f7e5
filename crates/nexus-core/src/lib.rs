//! Nexus Core - Common infrastructure for the nexus indicators toolkit
//!
//! This crate provides the error type, logging, progress reporting,
//! Parquet input/output and terminal table rendering shared by the
//! analysis library and the CLI.

pub mod display;
pub mod error;
pub mod logging;
pub mod progress;
pub mod sink;
pub mod source;

// Re-exports for convenience
pub use display::{fmt_num, render_batch, render_batch_styled};
pub use error::{NexusError, Result};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress};
pub use sink::{ParquetSink, write_parquet};
pub use source::{list_parquet_files, load_nexus};
