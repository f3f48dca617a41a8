//! Reference percentile tables
//!
//! Published reference statistics come in decade-wide buckets
//! ([`ReferenceBucket`]); they are expanded to one row per whole year
//! ([`ReferenceCurve`]) and reshaped to one mean/sd row per sex and year
//! ([`ReferenceMoments`]).

use arrow_schema::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::models::types::{Param, Sex};
use crate::registry::TableRecord;

/// A percentile rank and its value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentile {
    /// Rank, e.g. 5 for the 5th percentile
    pub rank: u8,
    /// Value at that rank
    pub value: f64,
}

/// Percentile values of one row, ordered by rank
pub type Percentiles = SmallVec<[Percentile; 9]>;

/// Look up the value for a rank
#[must_use]
pub fn percentile_value(percentiles: &[Percentile], rank: u8) -> Option<f64> {
    percentiles.iter().find(|p| p.rank == rank).map(|p| p.value)
}

/// One published row of reference statistics covering an age bucket
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceBucket {
    /// Sex code as published (1 = male, 2 = female)
    pub sex_code: i64,
    /// Parameter the statistics describe
    pub param: Param,
    /// First age (years) covered by the bucket
    pub age_low: f64,
    /// Last age (years) covered by the bucket
    pub age_high: f64,
    /// Age label as published, e.g. "20-29" or "20 and over"
    pub label: Option<String>,
    /// Published mean, if present
    pub mean: Option<f64>,
    /// Published percentiles
    pub percentiles: Percentiles,
    /// Number of examined persons
    pub examined: f64,
    /// Standard error of the mean
    pub standard_error: f64,
}

/// Reference statistics for one sex, parameter and whole age-year
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceCurve {
    /// Sex in canonical encoding
    pub sex: Sex,
    /// Parameter
    pub param: Param,
    /// Age in whole years
    pub age: u32,
    /// Published mean, smoothed across bucket seams
    pub mean: Option<f64>,
    /// Standard deviation derived from the standard error
    pub sd: f64,
    /// Percentile values, smoothed across bucket seams
    pub percentiles: Percentiles,
}

impl ReferenceCurve {
    /// Value of a percentile rank, if published
    #[must_use]
    pub fn percentile(&self, rank: u8) -> Option<f64> {
        percentile_value(&self.percentiles, rank)
    }
}

/// Mean and standard deviation of every parameter for one sex and age-year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMoments {
    /// Sex in canonical encoding
    pub sex: Sex,
    /// Age in whole years
    #[serde(rename = "rounded_age")]
    pub age: u32,
    /// Reference mean height (cm)
    #[serde(rename = "Mean_height")]
    pub mean_height: f64,
    /// Reference height standard deviation
    #[serde(rename = "sd_height")]
    pub sd_height: f64,
    /// Reference mean weight (kg)
    #[serde(rename = "Mean_weight")]
    pub mean_weight: f64,
    /// Reference weight standard deviation
    #[serde(rename = "sd_weight")]
    pub sd_weight: f64,
    /// Reference mean BMI
    #[serde(rename = "Mean_bmi")]
    pub mean_bmi: f64,
    /// Reference BMI standard deviation
    #[serde(rename = "sd_bmi")]
    pub sd_bmi: f64,
}

impl ReferenceMoments {
    /// Mean and standard deviation for one parameter
    #[must_use]
    pub fn moments(&self, param: Param) -> (f64, f64) {
        match param {
            Param::Height => (self.mean_height, self.sd_height),
            Param::Weight => (self.mean_weight, self.sd_weight),
            Param::Bmi => (self.mean_bmi, self.sd_bmi),
        }
    }
}

impl TableRecord for ReferenceMoments {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("sex", DataType::UInt8, false),
            Field::new("rounded_age", DataType::UInt32, false),
            Field::new("Mean_height", DataType::Float64, false),
            Field::new("sd_height", DataType::Float64, false),
            Field::new("Mean_weight", DataType::Float64, false),
            Field::new("sd_weight", DataType::Float64, false),
            Field::new("Mean_bmi", DataType::Float64, false),
            Field::new("sd_bmi", DataType::Float64, false),
        ])
    }
}
