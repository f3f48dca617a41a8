//! Derivation steps of the growth data pipeline
//!
//! Every step is a pure function from input records to new output records.
//! The modules follow the data flow: filtering, reference processing,
//! merging, post-processing, z-scores and summaries.

pub mod bmi;
pub mod compare;
pub mod exclusion;
pub mod filter;
pub mod lms;
pub mod merge;
pub mod postprocess;
pub mod reference;
pub mod selection;
pub mod statistics;
pub mod zscore;

pub use bmi::{BmiLabel, BmiObservation, bmi_observations};
pub use compare::{
    ComparisonRow, ComparisonTable, Run, RunExclusionStats, count_comparison,
    subject_category_counts, subject_category_percentages, subject_exclusion_stats,
};
pub use exclusion::{ExclusionSummaryRow, exclusion_summary};
pub use filter::{FilterCriteria, MergedFilter, ObservationFilter, apply_filter, keep_age_range};
pub use lms::{LmsTable, chart_age_months, modified_zscore};
pub use merge::merge_observations;
pub use postprocess::{correct_swaps, correct_unit_errors};
pub use reference::{ReferenceTable, build_moments, curve_moments, expand_all, expand_reference};
pub use selection::{ExtremeField, ExtremeOrder, ExtremeQuery, select_extremes};
pub use statistics::{Accumulator, BmiStatsRow, bmi_stats};
pub use zscore::{ZScoreReference, annotate_zscores, zscore};
