//! Domain models for growth data post-processing
//!
//! This module contains the value records flowing through the pipeline:
//! observations, reference tables, growth chart LMS rows and merged
//! subject-day records.

pub mod lms;
pub mod merged;
pub mod observation;
pub mod reference;
pub mod types;
pub mod verdict;

// Re-export commonly used types
pub use lms::{LmsPoint, MONTHS_PER_YEAR};
pub use merged::{MergedObservation, compute_bmi};
pub use observation::{DAYS_PER_YEAR, Observation, round_age};
pub use reference::{
    Percentile, Percentiles, ReferenceBucket, ReferenceCurve, ReferenceMoments, percentile_value,
};
pub use types::{Param, Sex};
pub use verdict::{PostprocessCategory, Verdict, VerdictClass};
