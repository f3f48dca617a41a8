//! Expansion of decade reference buckets into yearly curves
//!
//! Each bucket is replicated for every whole year it covers. Near the seam
//! between two adjacent buckets the step is replaced by a straight line from
//! the lower bucket's value to the upper bucket's value, so the curve has no
//! jump at decade transitions.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::config::ReferenceConfig;
use crate::error::{GrowthVizError, Result};
use crate::models::{
    Param, Percentile, Percentiles, ReferenceBucket, ReferenceCurve, Sex, percentile_value,
};
use crate::utils::logging::log_derivation;

/// A bucket that passed validation, with whole-year bounds
#[derive(Debug, Clone)]
struct YearBucket {
    start: u32,
    end: u32,
    mean: Option<f64>,
    sd: f64,
    percentiles: Percentiles,
}

impl YearBucket {
    fn years(&self) -> u32 {
        self.end - self.start + 1
    }
}

fn bucket_context(bucket: &ReferenceBucket) -> String {
    match &bucket.label {
        Some(label) => format!("reference {} sex {} ages {label}", bucket.param, bucket.sex_code),
        None => format!(
            "reference {} sex {} ages {}-{}",
            bucket.param, bucket.sex_code, bucket.age_low, bucket.age_high
        ),
    }
}

fn whole_year(value: f64, what: &str, context: &str) -> Result<u32> {
    if !value.is_finite() || value.fract() != 0.0 || value < 0.0 || value > f64::from(u32::MAX) {
        return Err(GrowthVizError::data(
            context,
            format!("{what} {value} is not a whole number of years"),
        ));
    }
    Ok(value as u32)
}

/// Check one published bucket and convert it to whole-year form
fn validate_bucket(bucket: &ReferenceBucket) -> Result<(Sex, YearBucket)> {
    let context = bucket_context(bucket);
    let sex = Sex::from_reference_code(bucket.sex_code).ok_or_else(|| {
        GrowthVizError::data(&context, format!("unexpected sex code {}", bucket.sex_code))
    })?;
    let start = whole_year(bucket.age_low, "age start", &context)?;
    let end = whole_year(bucket.age_high, "age end", &context)?;
    if start > end {
        return Err(GrowthVizError::data(
            &context,
            format!("age start {start} is after age end {end}"),
        ));
    }
    if !(bucket.examined.is_finite() && bucket.examined > 0.0) {
        return Err(GrowthVizError::data(
            &context,
            format!("examined persons must be positive, found {}", bucket.examined),
        ));
    }
    if !(bucket.standard_error.is_finite() && bucket.standard_error >= 0.0) {
        return Err(GrowthVizError::data(
            &context,
            format!(
                "standard error must be non-negative, found {}",
                bucket.standard_error
            ),
        ));
    }
    for (lower, upper) in bucket.percentiles.iter().tuple_windows() {
        if lower.rank >= upper.rank || lower.value > upper.value {
            return Err(GrowthVizError::data(
                &context,
                format!(
                    "percentiles out of order: P{} = {} before P{} = {}",
                    lower.rank, lower.value, upper.rank, upper.value
                ),
            ));
        }
    }

    Ok((
        sex,
        YearBucket {
            start,
            end,
            mean: bucket.mean,
            sd: standard_deviation(bucket.standard_error, bucket.examined),
            percentiles: bucket.percentiles.clone(),
        },
    ))
}

/// Standard deviation from the standard error of the mean: `SE = sd / sqrt(n)`
#[must_use]
pub fn standard_deviation(standard_error: f64, examined: f64) -> f64 {
    standard_error * examined.sqrt()
}

fn lerp(lower: f64, upper: f64, t: f64) -> f64 {
    lower + t * (upper - lower)
}

/// Smooth one seam between two adjacent buckets
///
/// `rows` holds the values of every year of the sex/param series, `base` is
/// the first year of the series. Years within `window` of the seam at
/// `lower.end + 0.5` are replaced by the line from the lower value at
/// `seam - window` to the upper value at `seam + window`. Those years carry
/// only the percentile ranks both buckets publish, which keeps them ordered.
fn smooth_seam(
    rows: &mut [ReferenceCurve],
    base: u32,
    lower: &YearBucket,
    upper: &YearBucket,
    window: u32,
) {
    let window = window.min(lower.years() / 2).min(upper.years() / 2);
    if window == 0 {
        return;
    }
    let seam = f64::from(lower.end) + 0.5;
    let half_width = f64::from(window);

    let unshared: Vec<u8> = lower
        .percentiles
        .iter()
        .chain(upper.percentiles.iter())
        .map(|p| p.rank)
        .filter(|&rank| {
            percentile_value(&lower.percentiles, rank).is_none()
                || percentile_value(&upper.percentiles, rank).is_none()
        })
        .unique()
        .collect();
    if !unshared.is_empty() {
        log::debug!(
            "Ranks {unshared:?} are not published on both sides of age {}; left out of years {}-{}",
            lower.end,
            lower.end + 1 - window,
            lower.end + window
        );
    }

    for year in (lower.end + 1 - window)..=(lower.end + window) {
        let t = (f64::from(year) - (seam - half_width)) / (2.0 * half_width);
        let row = &mut rows[(year - base) as usize];

        if let (Some(lo), Some(hi)) = (lower.mean, upper.mean) {
            row.mean = Some(lerp(lo, hi, t));
        }
        row.sd = lerp(lower.sd, upper.sd, t);
        row.percentiles = lower
            .percentiles
            .iter()
            .filter_map(|lo| {
                percentile_value(&upper.percentiles, lo.rank).map(|hi| Percentile {
                    rank: lo.rank,
                    value: lerp(lo.value, hi, t),
                })
            })
            .collect();
    }
}

/// Expand the buckets of one parameter into one curve row per sex and year
///
/// # Arguments
/// * `buckets` - Published buckets; rows for other parameters are ignored
/// * `param` - Parameter to expand
/// * `config` - Aggregate labels to skip, first bucket floor and smoothing window
///
/// # Returns
/// Curve rows ordered by sex and age
pub fn expand_reference(
    buckets: &[ReferenceBucket],
    param: Param,
    config: &ReferenceConfig,
) -> Result<Vec<ReferenceCurve>> {
    let mut by_sex: BTreeMap<Sex, Vec<YearBucket>> = BTreeMap::new();
    let mut input = 0;
    for bucket in buckets.iter().filter(|b| b.param == param) {
        input += 1;
        if config.is_aggregate_label(bucket.label.as_deref()) {
            log::debug!("Skipping aggregate bucket {}", bucket_context(bucket));
            continue;
        }
        let (sex, year_bucket) = validate_bucket(bucket)?;
        by_sex.entry(sex).or_default().push(year_bucket);
    }

    let mut curves = Vec::new();
    for (sex, mut series) in by_sex {
        series.sort_by_key(|b| b.start);
        if let (Some(floor), Some(first)) = (config.first_bucket_floor, series.first_mut()) {
            if first.start > floor {
                first.start = floor;
            }
        }

        for (lower, upper) in series.iter().tuple_windows() {
            if upper.start != lower.end + 1 {
                let kind = if upper.start > lower.end + 1 { "gap" } else { "overlap" };
                return Err(GrowthVizError::data(
                    format!("reference {param} sex {}", sex.code()),
                    format!(
                        "{kind} between buckets {}-{} and {}-{}",
                        lower.start, lower.end, upper.start, upper.end
                    ),
                ));
            }
        }

        let base = series.first().map_or(0, |b| b.start);
        let mut rows: Vec<ReferenceCurve> = series
            .iter()
            .flat_map(|bucket| {
                (bucket.start..=bucket.end).map(move |age| ReferenceCurve {
                    sex,
                    param,
                    age,
                    mean: bucket.mean,
                    sd: bucket.sd,
                    percentiles: bucket.percentiles.clone(),
                })
            })
            .collect();

        if config.smoothing_window > 0 {
            for (lower, upper) in series.iter().tuple_windows() {
                smooth_seam(&mut rows, base, lower, upper, config.smoothing_window);
            }
        }
        curves.extend(rows);
    }

    log_derivation(&format!("{param} reference expansion"), input, curves.len());
    Ok(curves)
}

/// Expand every parameter present in the buckets
pub fn expand_all(
    buckets: &[ReferenceBucket],
    config: &ReferenceConfig,
) -> Result<Vec<ReferenceCurve>> {
    let mut curves = Vec::new();
    for param in Param::ALL {
        if buckets.iter().any(|b| b.param == param) {
            curves.extend(expand_reference(buckets, param, config)?);
        }
    }
    Ok(curves)
}
