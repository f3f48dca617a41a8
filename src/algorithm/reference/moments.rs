//! Conversion of yearly curves into mean/sd lookup rows

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::config::MissingKeyPolicy;
use crate::error::{GrowthVizError, Result};
use crate::models::{Param, ReferenceCurve, ReferenceMoments, Sex};
use crate::utils::logging::{log_derivation, log_warning};

/// Mean and standard deviation of one parameter for one sex and year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamMoments {
    /// Sex in canonical encoding
    pub sex: Sex,
    /// Age in whole years
    pub age: u32,
    /// Published mean, or the median when no mean is published
    pub mean: f64,
    /// Standard deviation carried from the curve
    pub sd: f64,
}

/// Select mean and sd per sex and year for one parameter
///
/// The published mean is used when present, the 50th percentile otherwise.
pub fn curve_moments(curves: &[ReferenceCurve], param: Param) -> Result<Vec<ParamMoments>> {
    curves
        .iter()
        .filter(|c| c.param == param)
        .map(|curve| {
            let mean = curve.mean.or_else(|| curve.percentile(50)).ok_or_else(|| {
                GrowthVizError::data(
                    format!("reference {param} sex {} age {}", curve.sex.code(), curve.age),
                    "neither a mean nor a 50th percentile is available",
                )
            })?;
            Ok(ParamMoments {
                sex: curve.sex,
                age: curve.age,
                mean,
                sd: curve.sd,
            })
        })
        .collect()
}

/// Join the moments of height, weight and BMI into one row per sex and year
///
/// # Arguments
/// * `curves` - Expanded curves of all three parameters
/// * `policy` - Whether a key missing from one of the parameters is an error
///   or is dropped
///
/// # Returns
/// Rows ordered by sex and age
pub fn build_moments(
    curves: &[ReferenceCurve],
    policy: MissingKeyPolicy,
) -> Result<Vec<ReferenceMoments>> {
    let mut tables: Vec<(Param, FxHashMap<(Sex, u32), ParamMoments>)> = Vec::new();
    let mut keys = BTreeSet::new();
    for param in Param::ALL {
        let moments = curve_moments(curves, param)?;
        let mut table = FxHashMap::default();
        for m in moments {
            keys.insert((m.sex, m.age));
            if table.insert((m.sex, m.age), m).is_some() {
                return Err(GrowthVizError::data(
                    format!("reference {param}"),
                    format!("duplicate rows for sex {} age {}", m.sex.code(), m.age),
                ));
            }
        }
        tables.push((param, table));
    }

    let mut rows = Vec::with_capacity(keys.len());
    for (sex, age) in keys {
        let lookup = |param: Param| {
            tables
                .iter()
                .find(|(p, _)| *p == param)
                .and_then(|(_, table)| table.get(&(sex, age)))
        };
        let (Some(height), Some(weight), Some(bmi)) =
            (lookup(Param::Height), lookup(Param::Weight), lookup(Param::Bmi))
        else {
            let missing: Vec<&str> = Param::ALL
                .into_iter()
                .filter(|p| lookup(*p).is_none())
                .map(Param::label)
                .collect();
            let message = format!(
                "sex {} age {age} has no {} reference",
                sex.code(),
                missing.join("/")
            );
            match policy {
                MissingKeyPolicy::Error => {
                    return Err(GrowthVizError::data("reference moments", message));
                }
                MissingKeyPolicy::Drop => {
                    log_warning(&format!("Dropping reference key: {message}"), None);
                    continue;
                }
            }
        };
        rows.push(ReferenceMoments {
            sex,
            age,
            mean_height: height.mean,
            sd_height: height.sd,
            mean_weight: weight.mean,
            sd_weight: weight.sd,
            mean_bmi: bmi.mean,
            sd_bmi: bmi.sd,
        });
    }

    log_derivation("reference moments", curves.len(), rows.len());
    Ok(rows)
}

/// Reference moments indexed by sex and age-year
///
/// Built once and only read afterwards; z-score annotation and any other
/// consumer share the same table.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    rows: Vec<ReferenceMoments>,
    index: FxHashMap<(Sex, i64), usize>,
}

impl ReferenceTable {
    /// Index moment rows; each (sex, age) key may appear once
    pub fn new(rows: Vec<ReferenceMoments>) -> Result<Self> {
        let mut index = FxHashMap::default();
        for (i, row) in rows.iter().enumerate() {
            if index.insert((row.sex, i64::from(row.age)), i).is_some() {
                return Err(GrowthVizError::data(
                    "reference moments",
                    format!("duplicate key sex {} age {}", row.sex.code(), row.age),
                ));
            }
        }
        Ok(Self { rows, index })
    }

    /// Moments for a sex and rounded age
    pub fn lookup(&self, sex: Sex, age: i64) -> Result<&ReferenceMoments> {
        self.index
            .get(&(sex, age))
            .map(|&i| &self.rows[i])
            .ok_or(GrowthVizError::Lookup { sex, age })
    }

    /// All rows in insertion order
    #[must_use]
    pub fn rows(&self) -> &[ReferenceMoments] {
        &self.rows
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Lowest and highest covered age-year
    #[must_use]
    pub fn age_span(&self) -> Option<(u32, u32)> {
        let min = self.rows.iter().map(|r| r.age).min()?;
        let max = self.rows.iter().map(|r| r.age).max()?;
        Some((min, max))
    }
}
