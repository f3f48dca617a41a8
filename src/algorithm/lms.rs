//! Pediatric z-scores from growth chart LMS parameters
//!
//! Charts are indexed by sex, parameter and half month of age. A row's age in
//! years is rounded to whole months and shifted by half a month, which is
//! how chart ages are published (`24.5`, `25.5`, ...).

use rustc_hash::FxHashMap;

use crate::error::{GrowthVizError, Result};
use crate::models::{LmsPoint, MONTHS_PER_YEAR, Param, Sex};
use crate::utils::logging::log_derivation;

/// Chart age in months for an age in years
///
/// Months are rounded half to even before the half-month shift.
#[must_use]
pub fn chart_age_months(age_years: f64) -> f64 {
    (age_years * MONTHS_PER_YEAR).round_ties_even() + 0.5
}

/// Key of a chart age: the number of half months
fn half_months(agemos: f64) -> Option<i64> {
    let doubled = agemos * 2.0;
    (doubled.is_finite() && doubled.fract() == 0.0).then_some(doubled as i64)
}

/// Modified z-score of a value against one chart row
///
/// Distances above the median are scaled by half the distance from the median
/// to the value at z = +2, distances below it by half the distance to the
/// value at z = -2. `None` when that distance is not a positive number.
#[must_use]
pub fn modified_zscore(value: f64, point: &LmsPoint) -> Option<f64> {
    let half_distance = if value >= point.m {
        (point.value_at(2.0) - point.m) / 2.0
    } else {
        (point.m - point.value_at(-2.0)) / 2.0
    };
    if !(half_distance.is_finite() && half_distance > 0.0) {
        return None;
    }
    let z = (value - point.m) / half_distance;
    z.is_finite().then_some(z)
}

/// Growth chart rows indexed by sex, parameter and half month of age
#[derive(Debug, Clone, Default)]
pub struct LmsTable {
    points: Vec<LmsPoint>,
    index: FxHashMap<(Sex, Param, i64), usize>,
}

impl LmsTable {
    /// Index chart rows
    ///
    /// Fails on a row whose age is not a multiple of half a month, on a
    /// non-positive median or coefficient of variation, and on duplicate keys.
    pub fn new(points: Vec<LmsPoint>) -> Result<Self> {
        let mut index = FxHashMap::default();
        for (i, point) in points.iter().enumerate() {
            let context = || {
                format!(
                    "{} growth chart sex {} Agemos {}",
                    point.param,
                    point.sex.code(),
                    point.agemos
                )
            };
            let key = half_months(point.agemos)
                .ok_or_else(|| GrowthVizError::data(context(), "age is not a half month"))?;
            if !(point.m > 0.0 && point.s > 0.0) {
                return Err(GrowthVizError::data(
                    context(),
                    format!("M and S must be positive, found M = {} S = {}", point.m, point.s),
                ));
            }
            if index.insert((point.sex, point.param, key), i).is_some() {
                return Err(GrowthVizError::data(context(), "duplicate chart row"));
            }
        }
        log_derivation("growth chart index", points.len(), index.len());
        Ok(Self { points, index })
    }

    /// Chart row for a sex, parameter and age in years
    #[must_use]
    pub fn lookup(&self, sex: Sex, param: Param, age_years: f64) -> Option<&LmsPoint> {
        let key = half_months(chart_age_months(age_years))?;
        self.index.get(&(sex, param, key)).map(|&i| &self.points[i])
    }

    /// All rows in insertion order
    #[must_use]
    pub fn points(&self) -> &[LmsPoint] {
        &self.points
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
