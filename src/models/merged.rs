//! Merged height/weight records
//!
//! A [`MergedObservation`] pairs the height and weight measured for the same
//! subject on the same day and carries the derived BMI, the z-scores and the
//! post-processing categories.

use arrow_schema::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

use crate::models::types::Sex;
use crate::models::verdict::{PostprocessCategory, Verdict};
use crate::registry::TableRecord;

/// BMI from height in centimetres and weight in kilograms
///
/// A zero height yields an infinite (or NaN) BMI; callers decide whether
/// that is acceptable.
#[must_use]
pub fn compute_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    weight_kg / (height_cm / 100.0).powi(2)
}

/// A subject-day record combining one height and one weight observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedObservation {
    /// Id of the height observation
    pub id: i64,
    /// Subject identifier
    pub subjid: String,
    /// Sex of the subject
    pub sex: Sex,
    /// Age at measurement in days
    pub agedays: u32,
    /// Age at measurement in decimal years
    pub age: f64,
    /// Age rounded to whole years (ties to even)
    pub rounded_age: i64,
    /// Height in centimetres
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    /// Body mass index
    pub bmi: f64,
    /// Verdict of the height observation
    pub height_cat: Verdict,
    /// Verdict of the weight observation
    pub weight_cat: Verdict,
    /// Whether the height observation is included
    pub include_height: bool,
    /// Whether the weight observation is included
    pub include_weight: bool,
    /// Whether both observations are included
    pub include_both: bool,
    /// Height z-score against the reference
    pub htz: Option<f64>,
    /// Weight z-score against the reference
    pub wtz: Option<f64>,
    /// BMI z-score against the reference
    pub bmiz: Option<f64>,
    /// Height category after post-processing
    pub postprocess_height_cat: Option<PostprocessCategory>,
    /// Weight category after post-processing
    pub postprocess_weight_cat: Option<PostprocessCategory>,
}

impl MergedObservation {
    /// Height category after post-processing, falling back to the verdict
    #[must_use]
    pub fn effective_height_cat(&self) -> PostprocessCategory {
        self.postprocess_height_cat
            .unwrap_or(PostprocessCategory::Original(self.height_cat))
    }

    /// Weight category after post-processing, falling back to the verdict
    #[must_use]
    pub fn effective_weight_cat(&self) -> PostprocessCategory {
        self.postprocess_weight_cat
            .unwrap_or(PostprocessCategory::Original(self.weight_cat))
    }

    /// Copy with new height and weight values and the BMI recomputed
    #[must_use]
    pub fn with_measurements(&self, height: f64, weight: f64) -> Self {
        Self {
            height,
            weight,
            bmi: compute_bmi(height, weight),
            ..self.clone()
        }
    }
}

impl TableRecord for MergedObservation {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("subjid", DataType::Utf8, false),
            Field::new("sex", DataType::UInt8, false),
            Field::new("agedays", DataType::UInt32, false),
            Field::new("age", DataType::Float64, false),
            Field::new("rounded_age", DataType::Int64, false),
            Field::new("height", DataType::Float64, false),
            Field::new("weight", DataType::Float64, false),
            Field::new("bmi", DataType::Float64, false),
            Field::new("height_cat", DataType::Utf8, false),
            Field::new("weight_cat", DataType::Utf8, false),
            Field::new("include_height", DataType::Boolean, false),
            Field::new("include_weight", DataType::Boolean, false),
            Field::new("include_both", DataType::Boolean, false),
            Field::new("htz", DataType::Float64, true),
            Field::new("wtz", DataType::Float64, true),
            Field::new("bmiz", DataType::Float64, true),
            Field::new("postprocess_height_cat", DataType::Utf8, true),
            Field::new("postprocess_weight_cat", DataType::Utf8, true),
        ])
    }
}
