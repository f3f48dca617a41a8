//! Selection of the most extreme merged records

use serde::{Deserialize, Serialize};

use crate::algorithm::filter::{FilterCriteria, MergedFilter};
use crate::models::{MergedObservation, Sex, Verdict};

/// Measurement to rank records by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremeField {
    Height,
    Weight,
    Bmi,
}

impl ExtremeField {
    fn value(self, row: &MergedObservation) -> f64 {
        match self {
            Self::Height => row.height,
            Self::Weight => row.weight,
            Self::Bmi => row.bmi,
        }
    }
}

/// Which end of the ranking to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremeOrder {
    /// Largest values first
    #[default]
    Largest,
    /// Smallest values first
    Smallest,
}

/// Criteria for [`select_extremes`]
#[derive(Debug, Clone)]
pub struct ExtremeQuery {
    /// Measurement to rank by
    pub field: ExtremeField,
    /// Largest or smallest
    pub order: ExtremeOrder,
    /// Number of records to return
    pub limit: usize,
    /// Inclusive range of rounded ages
    pub age_range: Option<(i64, i64)>,
    /// Restrict to one sex
    pub sex: Option<Sex>,
    /// Restrict to these height verdicts
    pub height_verdicts: Option<Vec<Verdict>>,
    /// Restrict to these weight verdicts
    pub weight_verdicts: Option<Vec<Verdict>>,
}

impl ExtremeQuery {
    /// Ten largest values of a field, without further restrictions
    #[must_use]
    pub fn new(field: ExtremeField) -> Self {
        Self {
            field,
            order: ExtremeOrder::Largest,
            limit: 10,
            age_range: None,
            sex: None,
            height_verdicts: None,
            weight_verdicts: None,
        }
    }

    fn filter(&self) -> MergedFilter {
        let mut filters = Vec::new();
        if let Some((min_age, max_age)) = self.age_range {
            filters.push(MergedFilter::RoundedAgeRange { min_age, max_age });
        }
        if let Some(sex) = self.sex {
            filters.push(MergedFilter::Sex(sex));
        }
        if let Some(verdicts) = &self.height_verdicts {
            filters.push(MergedFilter::HeightVerdicts(verdicts.clone()));
        }
        if let Some(verdicts) = &self.weight_verdicts {
            filters.push(MergedFilter::WeightVerdicts(verdicts.clone()));
        }
        MergedFilter::All(filters)
    }
}

/// Records with the largest or smallest values of a field
///
/// Records whose value is NaN are never selected. Ties keep input order.
#[must_use]
pub fn select_extremes(rows: &[MergedObservation], query: &ExtremeQuery) -> Vec<MergedObservation> {
    let filter = query.filter();
    let mut candidates: Vec<&MergedObservation> = rows
        .iter()
        .filter(|row| filter.meets_criteria(row) && !query.field.value(row).is_nan())
        .collect();

    candidates.sort_by(|a, b| {
        let (a, b) = (query.field.value(a), query.field.value(b));
        match query.order {
            ExtremeOrder::Largest => b.total_cmp(&a),
            ExtremeOrder::Smallest => a.total_cmp(&b),
        }
    });
    candidates.into_iter().take(query.limit).cloned().collect()
}
