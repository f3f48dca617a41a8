//! Observation filtering criteria
//!
//! This module provides filters for narrowing observations down to a
//! supported age domain and other demographic criteria.

use rustc_hash::FxHashSet;

use crate::config::AgeDomain;
use crate::models::{MergedObservation, Observation, Param, Sex, Verdict};
use crate::utils::logging::log_derivation;

/// Defines a criterion for filtering records
pub trait FilterCriteria<T> {
    /// Determine if a record meets the filter criteria
    fn meets_criteria(&self, entity: &T) -> bool;
}

/// A filter that can be applied to an observation
#[derive(Debug, Clone)]
pub enum ObservationFilter {
    /// Filter by age in decimal years
    AgeRange {
        /// Minimum age (inclusive)
        min_age: Option<f64>,
        /// Maximum age (inclusive)
        max_age: Option<f64>,
    },
    /// Filter by sex
    Sex(Sex),
    /// Filter by measured parameter
    Param(Param),
    /// Filter by included/excluded status
    Included(bool),
    /// Filter by a specific set of subjects
    Subjects(FxHashSet<String>),
    /// Combined filter that requires all criteria to be met
    All(Vec<ObservationFilter>),
    /// Combined filter that requires any criterion to be met
    Any(Vec<ObservationFilter>),
}

impl ObservationFilter {
    /// Filter restricting observations to an age domain
    #[must_use]
    pub fn age_domain(domain: &AgeDomain) -> Self {
        let (min_age, max_age) = domain.bounds();
        Self::AgeRange {
            min_age: Some(min_age),
            max_age: Some(max_age),
        }
    }
}

impl FilterCriteria<Observation> for ObservationFilter {
    fn meets_criteria(&self, observation: &Observation) -> bool {
        match self {
            Self::AgeRange { min_age, max_age } => {
                let age = observation.age;
                if let Some(min) = min_age {
                    if age < *min {
                        return false;
                    }
                }
                if let Some(max) = max_age {
                    if age > *max {
                        return false;
                    }
                }
                true
            }
            Self::Sex(sex) => observation.sex == *sex,
            Self::Param(param) => observation.param == *param,
            Self::Included(included) => observation.include == *included,
            Self::Subjects(subjects) => subjects.contains(&observation.subjid),
            Self::All(filters) => filters.iter().all(|f| f.meets_criteria(observation)),
            Self::Any(filters) => filters.iter().any(|f| f.meets_criteria(observation)),
        }
    }
}

/// A filter that can be applied to a merged subject-day record
#[derive(Debug, Clone)]
pub enum MergedFilter {
    /// Filter by rounded age in whole years
    RoundedAgeRange {
        /// Minimum rounded age (inclusive)
        min_age: i64,
        /// Maximum rounded age (inclusive)
        max_age: i64,
    },
    /// Filter by sex
    Sex(Sex),
    /// Keep rows whose height verdict is in the set
    HeightVerdicts(Vec<Verdict>),
    /// Keep rows whose weight verdict is in the set
    WeightVerdicts(Vec<Verdict>),
    /// Combined filter that requires all criteria to be met
    All(Vec<MergedFilter>),
}

impl FilterCriteria<MergedObservation> for MergedFilter {
    fn meets_criteria(&self, row: &MergedObservation) -> bool {
        match self {
            Self::RoundedAgeRange { min_age, max_age } => {
                (*min_age..=*max_age).contains(&row.rounded_age)
            }
            Self::Sex(sex) => row.sex == *sex,
            Self::HeightVerdicts(verdicts) => verdicts.contains(&row.height_cat),
            Self::WeightVerdicts(verdicts) => verdicts.contains(&row.weight_cat),
            Self::All(filters) => filters.iter().all(|f| f.meets_criteria(row)),
        }
    }
}

/// Apply a filter, keeping the records that meet it in their original order
pub fn apply_filter<T: Clone, F: FilterCriteria<T>>(records: &[T], filter: &F) -> Vec<T> {
    records
        .iter()
        .filter(|record| filter.meets_criteria(record))
        .cloned()
        .collect()
}

/// Restrict observations to an age domain (bounds inclusive)
#[must_use]
pub fn keep_age_range(observations: &[Observation], domain: &AgeDomain) -> Vec<Observation> {
    let kept = apply_filter(observations, &ObservationFilter::age_domain(domain));
    log_derivation("age filter", observations.len(), kept.len());
    kept
}
