//! Observation entity model
//!
//! One height or weight measurement with the cleaning verdict attached.

use arrow_schema::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

use crate::models::types::{Param, Sex};
use crate::models::verdict::Verdict;
use crate::registry::TableRecord;

/// Days per year used to convert ages in days to decimal years
pub const DAYS_PER_YEAR: f64 = 365.25;

/// A single measurement event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Unique observation id
    pub id: i64,
    /// Subject identifier
    pub subjid: String,
    /// Sex of the subject
    pub sex: Sex,
    /// Age at measurement in days
    pub agedays: u32,
    /// Which parameter was measured
    pub param: Param,
    /// Measured value (cm or kg)
    pub measurement: f64,
    /// Cleaning verdict
    #[serde(rename = "clean_value")]
    pub verdict: Verdict,
    /// Age at measurement in decimal years
    pub age: f64,
    /// Whether the verdict includes the observation
    pub include: bool,
}

impl Observation {
    /// Create an observation, deriving age in years and the include flag
    #[must_use]
    pub fn new(
        id: i64,
        subjid: impl Into<String>,
        sex: Sex,
        agedays: u32,
        param: Param,
        measurement: f64,
        verdict: Verdict,
    ) -> Self {
        Self {
            id,
            subjid: subjid.into(),
            sex,
            agedays,
            param,
            measurement,
            verdict,
            age: f64::from(agedays) / DAYS_PER_YEAR,
            include: verdict.is_include(),
        }
    }

    /// Age rounded to the nearest whole year, ties to even
    #[must_use]
    pub fn rounded_age(&self) -> i64 {
        round_age(self.age)
    }
}

/// Round a decimal age to whole years, halves going to the even year
#[must_use]
pub fn round_age(age: f64) -> i64 {
    age.round_ties_even() as i64
}

impl TableRecord for Observation {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("subjid", DataType::Utf8, false),
            Field::new("sex", DataType::UInt8, false),
            Field::new("agedays", DataType::UInt32, false),
            Field::new("param", DataType::Utf8, false),
            Field::new("measurement", DataType::Float64, false),
            Field::new("clean_value", DataType::Utf8, false),
            Field::new("age", DataType::Float64, false),
            Field::new("include", DataType::Boolean, false),
        ])
    }
}
