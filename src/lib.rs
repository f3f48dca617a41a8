//! A Rust library for post-processing growth data cleaning results: reference
//! curves, merged height/weight records, BMI, z-scores and summary tables.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod reader;
pub mod registry;
pub mod utils;
pub mod validate;

// Re-export the most common types for easier use
// Core types
pub use config::{
    AgeDomain, BmiStatsConfig, ExportFormat, MissingKeyPolicy, PipelineConfig, ReferenceConfig,
    ZeroHeightPolicy,
};
pub use error::{GrowthVizError, Result};
pub use models::{
    LmsPoint, MergedObservation, Observation, Param, PostprocessCategory, ReferenceBucket,
    ReferenceCurve, ReferenceMoments, Sex, Verdict, VerdictClass,
};

// Loading and validation
pub use reader::{
    load_cdc_charts, load_lms_reference, load_observations, load_reference_buckets,
    read_csv_batches,
};
pub use validate::{ValidationIssue, ValidationReport, validate_observation_file, validate_observations};

// Derived tables
pub use algorithm::{LmsTable, ZScoreReference};
pub use pipeline::{
    GrowthReference, PipelineOutput, run, run_from_files, run_pediatrics,
    run_pediatrics_from_files,
};
pub use registry::{TableRecord, TableRegistry, tables};

// Arrow types
pub use arrow::record_batch::RecordBatch;
