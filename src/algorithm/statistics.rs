//! BMI summary statistics
//!
//! This module compares BMI of clean records (both measurements included)
//! with BMI of all records, per sex and rounded age.

use std::collections::BTreeMap;

use arrow_schema::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

use crate::config::BmiStatsConfig;
use crate::models::MergedObservation;
use crate::registry::TableRecord;
use crate::utils::logging::log_derivation;

/// Running moments of a sample, updated one value at a time
#[derive(Debug, Clone, Copy)]
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
    min: f64,
    max: f64,
    nonfinite: usize,
}

impl Accumulator {
    /// Empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            diff_2_sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            nonfinite: 0,
        }
    }

    /// Add a value; non-finite values are only counted
    pub fn add(&mut self, val: f64) {
        if !val.is_finite() {
            self.nonfinite += 1;
            return;
        }
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;

        self.min = self.min.min(val);
        self.max = self.max.max(val);
    }

    /// Number of finite values added
    #[must_use]
    pub fn count(&self) -> usize {
        self.n_vals
    }

    /// Number of non-finite values seen
    #[must_use]
    pub fn nonfinite(&self) -> usize {
        self.nonfinite
    }

    /// Mean of the finite values
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        (self.n_vals > 0).then_some(self.mean)
    }

    /// Sample standard deviation (n - 1 denominator)
    #[must_use]
    pub fn std_dev(&self) -> Option<f64> {
        (self.n_vals > 1).then(|| (self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt())
    }

    /// Smallest finite value
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        (self.n_vals > 0).then_some(self.min)
    }

    /// Largest finite value
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        (self.n_vals > 0).then_some(self.max)
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Clean and raw BMI statistics for one sex and rounded age
///
/// Statistics that were not requested are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiStatsRow {
    /// "F" or "M"
    pub sex: String,
    /// Rounded age in years
    pub rounded_age: i64,
    pub min_clean: Option<f64>,
    pub mean_clean: Option<f64>,
    pub max_clean: Option<f64>,
    pub sd_clean: Option<f64>,
    pub count_clean: Option<usize>,
    pub min_raw: Option<f64>,
    pub mean_raw: Option<f64>,
    pub max_raw: Option<f64>,
    pub sd_raw: Option<f64>,
    pub count_raw: Option<usize>,
    /// Raw count minus clean count
    pub count_diff: Option<i64>,
    /// Clean rows whose BMI is infinite or undefined
    pub nonfinite_clean: usize,
    /// Raw rows whose BMI is infinite or undefined
    pub nonfinite_raw: usize,
}

/// Compute clean versus raw BMI statistics per sex and rounded age
///
/// Groups without any clean row are left out. Rows are ordered with females
/// first, then by age.
#[must_use]
pub fn bmi_stats(rows: &[MergedObservation], config: &BmiStatsConfig) -> Vec<BmiStatsRow> {
    let (min_age, max_age) = config.age_range;
    let mut groups: BTreeMap<(&'static str, i64), (Option<Accumulator>, Accumulator)> =
        BTreeMap::new();

    for row in rows {
        if !(min_age..=max_age).contains(&row.rounded_age) {
            continue;
        }
        if !config.include_missing && !(row.height > 0.0 && row.weight > 0.0) {
            continue;
        }
        let (clean, raw) = groups
            .entry((row.sex.label(), row.rounded_age))
            .or_insert_with(|| (None, Accumulator::new()));
        raw.add(row.bmi);
        if row.include_both {
            clean.get_or_insert_with(Accumulator::new).add(row.bmi);
        }
    }

    let pick = |wanted: bool, value: Option<f64>| if wanted { value } else { None };
    let with_diff = config.include_mean && config.include_count && config.include_mean_diff;
    let stats: Vec<BmiStatsRow> = groups
        .into_iter()
        .filter_map(|((sex, rounded_age), (clean, raw))| {
            let clean = clean?;
            let count_diff = with_diff.then(|| raw.count() as i64 - clean.count() as i64);
            Some(BmiStatsRow {
                sex: sex.to_string(),
                rounded_age,
                min_clean: pick(config.include_min, clean.min()),
                mean_clean: pick(config.include_mean, clean.mean()),
                max_clean: pick(config.include_max, clean.max()),
                sd_clean: pick(config.include_std, clean.std_dev()),
                count_clean: config.include_count.then(|| clean.count()),
                min_raw: pick(config.include_min, raw.min()),
                mean_raw: pick(config.include_mean, raw.mean()),
                max_raw: pick(config.include_max, raw.max()),
                sd_raw: pick(config.include_std, raw.std_dev()),
                count_raw: config.include_count.then(|| raw.count()),
                count_diff,
                nonfinite_clean: clean.nonfinite(),
                nonfinite_raw: raw.nonfinite(),
            })
        })
        .collect();

    log_derivation("BMI statistics", rows.len(), stats.len());
    stats
}

impl TableRecord for BmiStatsRow {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("sex", DataType::Utf8, false),
            Field::new("rounded_age", DataType::Int64, false),
            Field::new("min_clean", DataType::Float64, true),
            Field::new("mean_clean", DataType::Float64, true),
            Field::new("max_clean", DataType::Float64, true),
            Field::new("sd_clean", DataType::Float64, true),
            Field::new("count_clean", DataType::UInt64, true),
            Field::new("min_raw", DataType::Float64, true),
            Field::new("mean_raw", DataType::Float64, true),
            Field::new("max_raw", DataType::Float64, true),
            Field::new("sd_raw", DataType::Float64, true),
            Field::new("count_raw", DataType::UInt64, true),
            Field::new("count_diff", DataType::Int64, true),
            Field::new("nonfinite_clean", DataType::UInt64, false),
            Field::new("nonfinite_raw", DataType::UInt64, false),
        ])
    }
}
