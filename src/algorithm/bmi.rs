//! BMI as an observation series
//!
//! Every merged record yields one BMI observation, labelled by whether it can
//! be used: both measurements included, one of them implausible, or neither.

use std::fmt;

use arrow_schema::{DataType, Field, Schema};
use serde::{Deserialize, Serialize, Serializer};

use crate::models::{MergedObservation, Param, Sex, Verdict};
use crate::registry::TableRecord;
use crate::utils::logging::log_derivation;

/// Usability of a BMI value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum BmiLabel {
    /// Height and weight are both included
    #[serde(rename = "Include")]
    Include,
    /// Height or weight was judged implausible
    #[serde(rename = "Implausible")]
    Implausible,
    /// Only one of the two measurements is usable
    #[serde(rename = "Only Wt or Ht")]
    OnlyWeightOrHeight,
}

impl BmiLabel {
    /// Label of a merged record
    #[must_use]
    pub fn of(row: &MergedObservation) -> Self {
        if row.include_both {
            Self::Include
        } else if row.height_cat == Verdict::Implausible || row.weight_cat == Verdict::Implausible {
            Self::Implausible
        } else {
            Self::OnlyWeightOrHeight
        }
    }

    /// Label written to output tables
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Include => "Include",
            Self::Implausible => "Implausible",
            Self::OnlyWeightOrHeight => "Only Wt or Ht",
        }
    }
}

impl fmt::Display for BmiLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for BmiLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One BMI value derived from a merged record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiObservation {
    /// Id of the merged record
    pub id: i64,
    pub subjid: String,
    pub sex: Sex,
    pub age: f64,
    pub rounded_age: i64,
    /// Always BMI
    pub param: Param,
    /// BMI value
    pub measurement: f64,
    /// Usability label
    pub clean_value: BmiLabel,
    /// Whether both source measurements are included
    pub include: bool,
}

/// Derive one BMI observation per merged record
#[must_use]
pub fn bmi_observations(rows: &[MergedObservation]) -> Vec<BmiObservation> {
    let observations: Vec<BmiObservation> = rows
        .iter()
        .map(|row| BmiObservation {
            id: row.id,
            subjid: row.subjid.clone(),
            sex: row.sex,
            age: row.age,
            rounded_age: row.rounded_age,
            param: Param::Bmi,
            measurement: row.bmi,
            clean_value: BmiLabel::of(row),
            include: row.include_both,
        })
        .collect();
    log_derivation("BMI observations", rows.len(), observations.len());
    observations
}

impl TableRecord for BmiObservation {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("subjid", DataType::Utf8, false),
            Field::new("sex", DataType::UInt8, false),
            Field::new("age", DataType::Float64, false),
            Field::new("rounded_age", DataType::Int64, false),
            Field::new("param", DataType::Utf8, false),
            Field::new("measurement", DataType::Float64, false),
            Field::new("clean_value", DataType::Utf8, false),
            Field::new("include", DataType::Boolean, false),
        ])
    }
}
