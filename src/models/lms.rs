//! Growth chart LMS parameters
//!
//! Pediatric references publish, per sex and half month of age, the Box-Cox
//! power `L`, the median `M` and the coefficient of variation `S`.

use arrow_schema::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

use crate::models::types::{Param, Sex};
use crate::registry::TableRecord;

/// Months per year used to convert chart ages
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// One growth chart row for a parameter, sex and age in months
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LmsPoint {
    /// Sex in canonical encoding
    pub sex: Sex,
    /// Parameter the chart describes
    pub param: Param,
    /// Age in months as published, e.g. 24.5
    #[serde(rename = "Agemos")]
    pub agemos: f64,
    /// Age in decimal years
    pub age: f64,
    /// Box-Cox power
    #[serde(rename = "L")]
    pub l: f64,
    /// Median
    #[serde(rename = "M")]
    pub m: f64,
    /// Coefficient of variation
    #[serde(rename = "S")]
    pub s: f64,
}

impl LmsPoint {
    /// Create a chart row, deriving the age in years
    #[must_use]
    pub fn new(sex: Sex, param: Param, agemos: f64, l: f64, m: f64, s: f64) -> Self {
        Self {
            sex,
            param,
            agemos,
            age: agemos / MONTHS_PER_YEAR,
            l,
            m,
            s,
        }
    }

    /// Value at `z` standard deviations on the LMS curve
    #[must_use]
    pub fn value_at(&self, z: f64) -> f64 {
        if self.l == 0.0 {
            self.m * (self.s * z).exp()
        } else {
            self.m * (1.0 + self.l * self.s * z).powf(1.0 / self.l)
        }
    }
}

impl TableRecord for LmsPoint {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("sex", DataType::UInt8, false),
            Field::new("param", DataType::Utf8, false),
            Field::new("Agemos", DataType::Float64, false),
            Field::new("age", DataType::Float64, false),
            Field::new("L", DataType::Float64, false),
            Field::new("M", DataType::Float64, false),
            Field::new("S", DataType::Float64, false),
        ])
    }
}
