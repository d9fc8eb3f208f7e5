//! Parquet input: read the nexus dataset into a single `RecordBatch`

use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::RecordBatch;
use arrow::compute::concat_batches;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::display::fmt_num;
use crate::error::{NexusError, Result};
use crate::progress::ProgressContext;

/// Resolve `path` to the Parquet files it denotes.
///
/// A file is returned as-is; a directory expands to its `*.parquet`
/// entries in lexical order so shards concatenate deterministically.
pub fn list_parquet_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(NexusError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    let pattern = path.join("*.parquet");
    let pattern_str = pattern.to_str().ok_or_else(|| {
        NexusError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("non-UTF8 path: {}", path.display()),
        ))
    })?;
    let mut files: Vec<PathBuf> = glob::glob(pattern_str)
        .map_err(|e| NexusError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?
        .filter_map(std::result::Result::ok)
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(NexusError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no *.parquet files in {}", path.display()),
        )));
    }
    Ok(files)
}

/// Load the nexus dataset from a Parquet file or a directory of shards.
///
/// All shards must share one schema; the result is a single concatenated batch.
pub fn load_nexus(path: &Path, progress: &ProgressContext) -> Result<RecordBatch> {
    let files = list_parquet_files(path)?;
    log::info!("Loading {} parquet file(s) from {}", files.len(), path.display());

    let mut schema = None;
    let mut batches = Vec::new();
    for file_path in &files {
        let file = File::open(file_path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let total_rows = builder.metadata().file_metadata().num_rows().max(0) as u64;
        let name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let pb = progress.file_bar(&name, total_rows);

        if schema.is_none() {
            schema = Some(builder.schema().clone());
        }
        for batch in builder.build()? {
            let batch = batch?;
            pb.inc(batch.num_rows() as u64);
            batches.push(batch);
        }
        pb.finish_and_clear();
        log::debug!("{name}: {} rows", fmt_num(total_rows as usize));
    }

    let schema = schema.ok_or_else(|| {
        NexusError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no parquet input",
        ))
    })?;
    let table = concat_batches(&schema, &batches)?;
    log::info!(
        "Loaded {} rows x {} columns",
        fmt_num(table.num_rows()),
        table.num_columns()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    fn write_shard(dir: &Path, name: &str, countries: &[&str], values: &[f64]) {
        let schema = Arc::new(Schema::new(vec![
            Field::new("country_or_area", DataType::Utf8, true),
            Field::new("value", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(countries.to_vec())),
                Arc::new(Float64Array::from(values.to_vec())),
            ],
        )
        .unwrap();
        let file = File::create(dir.join(name)).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn list_missing_path_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = list_parquet_files(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, NexusError::Io(_)));
    }

    #[test]
    fn list_empty_dir_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        assert!(list_parquet_files(dir.path()).is_err());
    }

    #[test]
    fn list_dir_sorted() {
        let dir = TempDir::new().unwrap();
        write_shard(dir.path(), "nexus_0001.parquet", &["B"], &[2.0]);
        write_shard(dir.path(), "nexus_0000.parquet", &["A"], &[1.0]);
        let files = list_parquet_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("nexus_0000.parquet"));
    }

    #[test]
    fn load_single_file() {
        let dir = TempDir::new().unwrap();
        write_shard(dir.path(), "nexus.parquet", &["A", "B"], &[1.0, 2.0]);
        let table = load_nexus(&dir.path().join("nexus.parquet"), &ProgressContext::hidden())
            .unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.num_columns(), 2);
    }

    #[test]
    fn load_directory_concatenates_in_order() {
        let dir = TempDir::new().unwrap();
        write_shard(dir.path(), "nexus_0001.parquet", &["C"], &[3.0]);
        write_shard(dir.path(), "nexus_0000.parquet", &["A", "B"], &[1.0, 2.0]);
        let table = load_nexus(dir.path(), &ProgressContext::hidden()).unwrap();
        assert_eq!(table.num_rows(), 3);
        let countries = table
            .column_by_name("country_or_area")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(countries.value(0), "A");
        assert_eq!(countries.value(2), "C");
    }
}
