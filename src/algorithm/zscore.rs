//! Z-scores of merged records against a growth reference
//!
//! Adults are scored with the classical `(value - mean) / sd` using the
//! reference moments for the row's sex and rounded age. Children are scored
//! against growth chart LMS rows with the modified z-score.

use crate::algorithm::lms::{LmsTable, modified_zscore};
use crate::algorithm::reference::ReferenceTable;
use crate::error::{GrowthVizError, Result};
use crate::models::{MergedObservation, Param};
use crate::utils::logging::log_derivation;

/// Classical z-score, `None` when the standard deviation is unusable
#[must_use]
pub fn zscore(value: f64, mean: f64, sd: f64) -> Option<f64> {
    if !(sd.is_finite() && sd > 0.0) {
        return None;
    }
    let z = (value - mean) / sd;
    z.is_finite().then_some(z)
}

/// A reference merged rows can be scored against
pub trait ZScoreReference {
    /// Height, weight and BMI z-scores of a row
    ///
    /// Returns [`GrowthVizError::Lookup`] when the reference does not cover
    /// the row's sex and age at all.
    fn scores(&self, row: &MergedObservation) -> Result<[Option<f64>; 3]>;
}

impl ZScoreReference for ReferenceTable {
    fn scores(&self, row: &MergedObservation) -> Result<[Option<f64>; 3]> {
        let moments = self.lookup(row.sex, row.rounded_age)?;
        let score = |param: Param, value: f64| {
            let (mean, sd) = moments.moments(param);
            zscore(value, mean, sd)
        };
        Ok([
            score(Param::Height, row.height),
            score(Param::Weight, row.weight),
            score(Param::Bmi, row.bmi),
        ])
    }
}

impl ZScoreReference for LmsTable {
    fn scores(&self, row: &MergedObservation) -> Result<[Option<f64>; 3]> {
        let points = [Param::Height, Param::Weight, Param::Bmi]
            .map(|param| self.lookup(row.sex, param, row.age));
        if points.iter().all(Option::is_none) {
            return Err(GrowthVizError::Lookup {
                sex: row.sex,
                age: row.rounded_age,
            });
        }
        let [height, weight, bmi] = points;
        Ok([
            height.and_then(|p| modified_zscore(row.height, p)),
            weight.and_then(|p| modified_zscore(row.weight, p)),
            bmi.and_then(|p| modified_zscore(row.bmi, p)),
        ])
    }
}

/// Attach `htz`, `wtz` and `bmiz` to every row
///
/// Rows the reference does not cover get no z-scores; this is not an error.
#[must_use]
pub fn annotate_zscores<R>(rows: &[MergedObservation], reference: &R) -> Vec<MergedObservation>
where
    R: ZScoreReference + ?Sized,
{
    let mut missing = 0;
    let annotated: Vec<MergedObservation> = rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            let [htz, wtz, bmiz] = reference.scores(&row).unwrap_or_else(|err| {
                log::trace!("{err}");
                missing += 1;
                [None; 3]
            });
            row.htz = htz;
            row.wtz = wtz;
            row.bmiz = bmiz;
            row
        })
        .collect();

    if missing > 0 {
        log::info!("{missing} merged rows are not covered by the reference for their sex and age");
    }
    log_derivation("z-score annotation", rows.len(), annotated.len());
    annotated
}
