//! Names under which the pipeline registers its tables

/// Observations within the age domain
pub const OBSERVATIONS: &str = "observations";
/// Verdict counts per parameter
pub const EXCLUSION_SUMMARY: &str = "exclusion_summary";
/// Yearly reference curves for all parameters
pub const REFERENCE_CURVES: &str = "reference_curves";
/// Reference mean/sd per sex and age-year
pub const REFERENCE_MOMENTS: &str = "reference_moments";
/// Merged height/weight records with post-processing and z-scores
pub const MERGED: &str = "merged";
/// One BMI observation per merged record
pub const BMI_OBSERVATIONS: &str = "bmi_observations";
/// Clean versus raw BMI statistics
pub const BMI_STATS: &str = "bmi_stats";
/// Growth chart LMS rows of a pediatric run
pub const GROWTH_CHARTS: &str = "growth_charts";
