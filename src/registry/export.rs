//! Writing tables to CSV or Parquet files

use std::fs::File;
use std::path::Path;

use arrow::csv::WriterBuilder;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::config::ExportFormat;
use crate::error::{GrowthVizError, Result};

fn create_file(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| {
        GrowthVizError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create {}: {e}", path.display()),
        ))
    })
}

/// Write a record batch as CSV with a header row
pub fn export_csv(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = create_file(path)?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer.write(batch)?;
    Ok(())
}

/// Write a record batch as a Snappy-compressed Parquet file
pub fn export_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = create_file(path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

/// Write a record batch in the given format
pub fn export_batch(batch: &RecordBatch, path: &Path, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Csv => export_csv(batch, path),
        ExportFormat::Parquet => export_parquet(batch, path),
    }
}
