//! Output sink: Parquet file writer with atomic tmp→rename

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::datatypes::Schema;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;

use crate::error::Result;

/// Buffered parquet writer with atomic tmp→rename
pub struct ParquetSink {
    writer: ArrowWriter<File>,
    tmp_path: PathBuf,
    final_path: PathBuf,
    row_count: usize,
}

impl std::fmt::Debug for ParquetSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParquetSink")
            .field("final_path", &self.final_path)
            .field("row_count", &self.row_count)
            .finish_non_exhaustive()
    }
}

impl ParquetSink {
    /// Open `<path>.tmp` for writing; the final name appears on `finalize`.
    pub fn create(path: &Path, schema: &Schema, zstd_level: i32) -> Result<Self> {
        let level = ZstdLevel::try_new(zstd_level)?;
        let final_path = path.to_path_buf();
        let mut tmp_name = final_path.clone().into_os_string();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        if let Some(parent) = final_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Clean up stale tmp file
        if tmp_path.exists() {
            fs::remove_file(&tmp_path)?;
        }

        let file = File::create(&tmp_path)?;
        let props = WriterProperties::builder()
            .set_compression(Compression::ZSTD(level))
            .build();
        let writer = ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props))?;

        Ok(Self {
            writer,
            tmp_path,
            final_path,
            row_count: 0,
        })
    }

    pub fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        self.row_count += batch.num_rows();
        self.writer.write(batch)?;
        Ok(())
    }

    /// Flush footer and atomically rename tmp → final. Returns rows written.
    pub fn finalize(self) -> Result<usize> {
        let row_count = self.row_count;
        self.writer.close()?;
        fs::rename(&self.tmp_path, &self.final_path)?;
        log::info!(
            "Wrote {} rows to {}",
            row_count,
            self.final_path.display()
        );
        Ok(row_count)
    }
}

/// Write a single result batch to `path`.
pub fn write_parquet(batch: &RecordBatch, path: &Path, zstd_level: i32) -> Result<usize> {
    let mut sink = ParquetSink::create(path, batch.schema().as_ref(), zstd_level)?;
    sink.write_batch(batch)?;
    sink.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::TempDir;

    fn result_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("indicator_label", DataType::Utf8, true),
            Field::new("completeness_score", DataType::Float64, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec![Some("GDP"), Some("Population")])),
                Arc::new(Float64Array::from(vec![Some(75.0), None])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.parquet");
        let rows = write_parquet(&result_batch(), &path, 3).unwrap();
        assert_eq!(rows, 2);
        assert!(path.exists());
        assert!(!dir.path().join("metadata.parquet.tmp").exists());

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
            .unwrap()
            .build()
            .unwrap();
        let total: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("nested").join("stats.parquet");
        write_parquet(&result_batch(), &path, 1).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn replaces_stale_tmp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pivot.parquet");
        std::fs::write(dir.path().join("pivot.parquet.tmp"), b"stale").unwrap();
        write_parquet(&result_batch(), &path, 3).unwrap();
        assert!(!dir.path().join("pivot.parquet.tmp").exists());
    }

    #[test]
    fn invalid_zstd_level_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.parquet");
        assert!(write_parquet(&result_batch(), &path, 99).is_err());
    }
}
