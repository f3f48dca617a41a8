//! Configuration for the growthviz pipeline.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GrowthVizError, Result};
use crate::error::util::safe_open_file;

/// Age domain the observations are restricted to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeDomain {
    /// Adults, 18 to 80 years inclusive
    Adults,
    /// Children and young adults, 2 to 25 years inclusive
    Pediatrics,
    /// Custom inclusive range in years
    Custom {
        /// Minimum age (inclusive)
        min_age: f64,
        /// Maximum age (inclusive)
        max_age: f64,
    },
}

impl AgeDomain {
    /// Inclusive age bounds in years
    #[must_use]
    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            Self::Adults => (18.0, 80.0),
            Self::Pediatrics => (2.0, 25.0),
            Self::Custom { min_age, max_age } => (min_age, max_age),
        }
    }
}

/// What to do when the BMI denominator (height) is zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZeroHeightPolicy {
    /// Fail the merge, naming the offending row
    #[default]
    Reject,
    /// Keep the row; BMI becomes infinite or NaN
    Propagate,
}

impl ZeroHeightPolicy {
    /// Check a height about to be used as the BMI denominator
    ///
    /// Applies wherever BMI is computed, including after corrections that
    /// move a value into the height slot.
    pub fn check(self, height: f64, context: impl FnOnce() -> String) -> Result<()> {
        if height == 0.0 && self == Self::Reject {
            return Err(GrowthVizError::ArithmeticAmbiguity { context: context() });
        }
        Ok(())
    }
}

/// What to do when a (sex, age) key is present for one reference parameter
/// but missing for another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingKeyPolicy {
    /// Fail with a data error naming the key
    #[default]
    Error,
    /// Drop the incomplete key
    Drop,
}

/// Output format for exported tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// Apache Parquet
    Parquet,
}

impl ExportFormat {
    /// File extension for the format
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }
}

/// Configuration of the reference curve expansion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Half-width in years of the interpolation window around each bucket seam (0 disables smoothing)
    pub smoothing_window: u32,
    /// Lower the youngest bucket's start to this age, if it starts later
    pub first_bucket_floor: Option<u32>,
    /// Age labels of aggregate rows that overlap the decade buckets
    pub aggregate_labels: Vec<String>,
    /// Policy for keys missing from one of the parameters
    pub missing_key_policy: MissingKeyPolicy,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 2,
            first_bucket_floor: Some(18),
            aggregate_labels: vec!["20 and over".to_string()],
            missing_key_policy: MissingKeyPolicy::Error,
        }
    }
}

impl ReferenceConfig {
    /// Whether a bucket label marks an aggregate row
    #[must_use]
    pub fn is_aggregate_label(&self, label: Option<&str>) -> bool {
        label.is_some_and(|l| self.aggregate_labels.iter().any(|a| a == l.trim()))
    }
}

/// Which BMI summary statistics to compute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BmiStatsConfig {
    /// Report the minimum
    pub include_min: bool,
    /// Report the mean
    pub include_mean: bool,
    /// Report the maximum
    pub include_max: bool,
    /// Report the sample standard deviation
    pub include_std: bool,
    /// Report the raw minus clean count difference
    pub include_mean_diff: bool,
    /// Report counts
    pub include_count: bool,
    /// Inclusive range of rounded ages
    pub age_range: (i64, i64),
    /// Keep rows with zero or negative height or weight in the raw columns
    pub include_missing: bool,
}

impl Default for BmiStatsConfig {
    fn default() -> Self {
        Self {
            include_min: true,
            include_mean: true,
            include_max: true,
            include_std: true,
            include_mean_diff: true,
            include_count: true,
            age_range: (20, 65),
            include_missing: false,
        }
    }
}

/// Configuration for a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Age domain observations are restricted to
    pub age_domain: AgeDomain,
    /// Reference curve expansion settings
    pub reference: ReferenceConfig,
    /// Zero height handling in the merger
    pub zero_height_policy: ZeroHeightPolicy,
    /// Swap transposed height/weight values back
    pub correct_swaps: bool,
    /// Convert values flagged as unit errors
    pub correct_unit_errors: bool,
    /// BMI summary statistics settings
    pub bmi_stats: BmiStatsConfig,
    /// Directory exported tables are written to
    pub output_dir: PathBuf,
    /// Format of exported tables
    pub export_format: ExportFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            age_domain: AgeDomain::Adults,
            reference: ReferenceConfig::default(),
            zero_height_policy: ZeroHeightPolicy::Reject,
            correct_swaps: true,
            correct_unit_errors: false,
            bmi_stats: BmiStatsConfig::default(),
            output_dir: PathBuf::from("output"),
            export_format: ExportFormat::Csv,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = safe_open_file(path, "pipeline configuration")?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that the type system does not enforce
    pub fn validate(&self) -> Result<()> {
        let (min_age, max_age) = self.age_domain.bounds();
        if !(min_age.is_finite() && max_age.is_finite()) || min_age > max_age {
            return Err(GrowthVizError::Config(format!(
                "invalid age domain {min_age}..={max_age}"
            )));
        }
        let (low, high) = self.bmi_stats.age_range;
        if low > high {
            return Err(GrowthVizError::Config(format!(
                "invalid BMI statistics age range {low}..={high}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (min_age, max_age) = self.age_domain.bounds();
        writeln!(f, "Pipeline Configuration:")?;
        writeln!(f, "  Age Domain: {min_age} to {max_age} years")?;
        writeln!(f, "  Smoothing Window: {} years", self.reference.smoothing_window)?;
        if let Some(floor) = self.reference.first_bucket_floor {
            writeln!(f, "  First Bucket Floor: {floor}")?;
        }
        writeln!(f, "  Missing Key Policy: {:?}", self.reference.missing_key_policy)?;
        writeln!(f, "  Zero Height Policy: {:?}", self.zero_height_policy)?;
        writeln!(f, "  Correct Swaps: {}", self.correct_swaps)?;
        writeln!(f, "  Correct Unit Errors: {}", self.correct_unit_errors)?;
        writeln!(
            f,
            "  BMI Statistics Ages: {} to {}",
            self.bmi_stats.age_range.0, self.bmi_stats.age_range.1
        )?;
        writeln!(f, "  Output: {} ({:?})", self.output_dir.display(), self.export_format)?;
        Ok(())
    }
}
