//! Registry of named derived tables
//!
//! Each derivation step registers its output under an explicit name. A
//! rendering layer, grid or exporter looks tables up by name; registered
//! tables are immutable and shared through [`Arc`].
//!
//! Registered tables:
//! - observations: observations within the age domain
//! - exclusion_summary: verdict counts per parameter
//! - reference_curves / reference_moments: yearly reference statistics
//!   (adult runs)
//! - growth_charts: LMS rows the pediatric z-scores use
//! - merged: height/weight records with post-processing and z-scores
//! - bmi_observations: BMI values labelled by usability
//! - bmi_stats: clean versus raw BMI statistics

pub mod convert;
pub mod export;
pub mod tables;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::record_batch::RecordBatch;

use crate::config::ExportFormat;
use crate::error::util::ensure_directory;
use crate::error::{GrowthVizError, Result};
use crate::utils::logging::{log_operation_complete, log_operation_start};

pub use convert::{TableRecord, curves_to_batch, records_to_batch};
pub use export::{export_batch, export_csv, export_parquet};

/// Name to table mapping, ordered by name
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: BTreeMap<String, Arc<RecordBatch>>,
}

impl TableRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record batch under a name, replacing any earlier table
    pub fn register_batch(
        &mut self,
        name: impl Into<String>,
        batch: RecordBatch,
    ) -> Arc<RecordBatch> {
        let name = name.into();
        let batch = Arc::new(batch);
        log::debug!("Registering table '{name}' with {} rows", batch.num_rows());
        if self.tables.insert(name.clone(), Arc::clone(&batch)).is_some() {
            log::debug!("Table '{name}' replaced");
        }
        batch
    }

    /// Convert records and register them under a name
    pub fn register_records<T: TableRecord>(
        &mut self,
        name: impl Into<String>,
        records: &[T],
    ) -> Result<Arc<RecordBatch>> {
        let batch = records_to_batch(records)?;
        Ok(self.register_batch(name, batch))
    }

    /// Look up a table by name
    pub fn get(&self, name: &str) -> Result<Arc<RecordBatch>> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| GrowthVizError::TableNotFound(name.to_string()))
    }

    /// Whether a table is registered under the name
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Registered names in alphabetical order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Number of registered tables
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no table is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Write one table to `<dir>/<name>.<ext>`
    ///
    /// # Returns
    /// The path written
    pub fn export(&self, name: &str, dir: &Path, format: ExportFormat) -> Result<PathBuf> {
        let batch = self.get(name)?;
        ensure_directory(dir, "table export")?;
        let path = dir.join(format!("{name}.{}", format.extension()));
        log_operation_start("Exporting table to", &path);
        export_batch(&batch, &path, format)?;
        log_operation_complete("wrote", &path, batch.num_rows(), None);
        Ok(path)
    }

    /// Write every registered table into a directory
    pub fn export_all(&self, dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
        self.names()
            .map(|name| self.export(name, dir, format))
            .collect()
    }
}
