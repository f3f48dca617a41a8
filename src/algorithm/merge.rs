//! Pairing of height and weight observations into subject-day records

use rustc_hash::FxHashMap;

use crate::config::ZeroHeightPolicy;
use crate::error::{GrowthVizError, Result};
use crate::models::{MergedObservation, Observation, Param, compute_bmi, round_age};
use crate::utils::logging::log_derivation;

/// The observations of one subject-day
#[derive(Default)]
struct DayPair<'a> {
    height: Option<&'a Observation>,
    weight: Option<&'a Observation>,
    duplicates: usize,
}

/// Prefer included observations, then the lowest id
fn preferred<'a>(current: Option<&'a Observation>, candidate: &'a Observation) -> &'a Observation {
    match current {
        Some(current) if (!current.include, current.id) <= (!candidate.include, candidate.id) => {
            current
        }
        _ => candidate,
    }
}

/// Merge height and weight observations measured on the same subject-day
///
/// Subject-days with only one of the two parameters produce no row. When a
/// parameter was recorded more than once on a day, the included observation
/// with the lowest id is used, or the lowest id if none is included.
///
/// # Arguments
/// * `observations` - Filtered observations
/// * `zero_height` - Whether a zero height fails the merge or yields a
///   non-finite BMI
///
/// # Returns
/// Merged rows ordered by subject and age in days
pub fn merge_observations(
    observations: &[Observation],
    zero_height: ZeroHeightPolicy,
) -> Result<Vec<MergedObservation>> {
    let mut days: FxHashMap<(&str, u32), DayPair<'_>> = FxHashMap::default();
    for obs in observations {
        let pair = days.entry((obs.subjid.as_str(), obs.agedays)).or_default();
        let slot = match obs.param {
            Param::Height => &mut pair.height,
            Param::Weight => &mut pair.weight,
            Param::Bmi => continue,
        };
        if slot.is_some() {
            pair.duplicates += 1;
        }
        *slot = Some(preferred(*slot, obs));
    }

    let duplicates: usize = days.values().map(|p| p.duplicates).sum();
    if duplicates > 0 {
        log::debug!("Resolved {duplicates} repeated same-day measurements");
    }

    let mut merged = Vec::new();
    for ((subjid, agedays), pair) in days {
        let (Some(height), Some(weight)) = (pair.height, pair.weight) else {
            continue;
        };
        let context = || {
            format!(
                "subject {subjid} day {agedays} (height id {}, weight id {})",
                height.id, weight.id
            )
        };
        if height.sex != weight.sex {
            return Err(GrowthVizError::data(
                context(),
                format!(
                    "height row has sex {} but weight row has sex {}",
                    height.sex, weight.sex
                ),
            ));
        }
        zero_height.check(height.measurement, context)?;

        merged.push(MergedObservation {
            id: height.id,
            subjid: subjid.to_string(),
            sex: height.sex,
            agedays,
            age: height.age,
            rounded_age: round_age(height.age),
            height: height.measurement,
            weight: weight.measurement,
            bmi: compute_bmi(height.measurement, weight.measurement),
            height_cat: height.verdict,
            weight_cat: weight.verdict,
            include_height: height.include,
            include_weight: weight.include,
            include_both: height.include && weight.include,
            htz: None,
            wtz: None,
            bmiz: None,
            postprocess_height_cat: None,
            postprocess_weight_cat: None,
        });
    }
    merged.sort_by(|a, b| a.subjid.cmp(&b.subjid).then(a.agedays.cmp(&b.agedays)));

    log_derivation("height/weight merge", observations.len(), merged.len());
    Ok(merged)
}
