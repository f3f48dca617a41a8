//! Post-processing corrections of merged records
//!
//! Each correction returns new rows; the input is left untouched. A corrected
//! measurement is terminal: later passes never correct it again.

use crate::config::ZeroHeightPolicy;
use crate::error::Result;
use crate::models::{MergedObservation, PostprocessCategory, Verdict};
use crate::utils::logging::log_derivation;

/// Centimetres per inch
pub const CM_PER_INCH: f64 = 2.54;
/// Pounds per kilogram
pub const LB_PER_KG: f64 = 2.2046;

/// Exchange height and weight on rows where both verdicts flag a swap
///
/// Corrected rows get a recomputed BMI and the `Include-Fixed-Swap`
/// category on both measurements. Every other row keeps its existing
/// post-process category, or its verdict if it has none. A swap that moves
/// a zero weight into the height slot is subject to `zero_height`.
pub fn correct_swaps(
    rows: &[MergedObservation],
    zero_height: ZeroHeightPolicy,
) -> Result<Vec<MergedObservation>> {
    let mut corrected = 0;
    let output = rows
        .iter()
        .map(|row| -> Result<MergedObservation> {
            let already_fixed = row.postprocess_height_cat
                == Some(PostprocessCategory::IncludeFixedSwap)
                || row.postprocess_weight_cat == Some(PostprocessCategory::IncludeFixedSwap);
            if !already_fixed
                && row.height_cat.is_swap_candidate()
                && row.weight_cat.is_swap_candidate()
            {
                zero_height.check(row.weight, || row_context(row, "swap correction"))?;
                corrected += 1;
                let mut fixed = row.with_measurements(row.weight, row.height);
                fixed.postprocess_height_cat = Some(PostprocessCategory::IncludeFixedSwap);
                fixed.postprocess_weight_cat = Some(PostprocessCategory::IncludeFixedSwap);
                Ok(fixed)
            } else {
                let mut unchanged = row.clone();
                unchanged.postprocess_height_cat = Some(row.effective_height_cat());
                unchanged.postprocess_weight_cat = Some(row.effective_weight_cat());
                Ok(unchanged)
            }
        })
        .collect::<Result<Vec<_>>>()?;

    log::info!("Fixed {corrected} swapped height/weight pairs");
    log_derivation("swap correction", rows.len(), rows.len());
    Ok(output)
}

fn row_context(row: &MergedObservation, step: &str) -> String {
    format!("{step} of subject {} day {} (id {})", row.subjid, row.agedays, row.id)
}

/// Converted value and category for a unit error verdict
fn unit_fix(
    value: f64,
    verdict: Verdict,
    current: PostprocessCategory,
    factor: f64,
) -> Option<(f64, PostprocessCategory)> {
    if current.is_corrected() {
        return None;
    }
    match verdict {
        Verdict::UnitErrorLow => Some((value * factor, PostprocessCategory::IncludeUnitLow)),
        Verdict::UnitErrorHigh => Some((value / factor, PostprocessCategory::IncludeUnitHigh)),
        _ => None,
    }
}

/// Convert measurements flagged as recorded in the wrong unit
///
/// Heights flagged `Unit-Error-Low` are multiplied by 2.54 and those flagged
/// `Unit-Error-High` divided by it; weights use 2.2046. Converted
/// measurements get the `Include-UL` or `Include-UH` category and the BMI is
/// recomputed under `zero_height`. Only the pediatric algorithm assigns these
/// verdicts.
pub fn correct_unit_errors(
    rows: &[MergedObservation],
    zero_height: ZeroHeightPolicy,
) -> Result<Vec<MergedObservation>> {
    let mut corrected = 0;
    let output = rows
        .iter()
        .map(|row| -> Result<MergedObservation> {
            let mut height_cat = row.effective_height_cat();
            let mut weight_cat = row.effective_weight_cat();
            let mut height = row.height;
            let mut weight = row.weight;

            if let Some((value, category)) =
                unit_fix(height, row.height_cat, height_cat, CM_PER_INCH)
            {
                height = value;
                height_cat = category;
                corrected += 1;
            }
            if let Some((value, category)) =
                unit_fix(weight, row.weight_cat, weight_cat, LB_PER_KG)
            {
                weight = value;
                weight_cat = category;
                corrected += 1;
            }

            let mut fixed = if height == row.height && weight == row.weight {
                row.clone()
            } else {
                zero_height.check(height, || row_context(row, "unit error correction"))?;
                row.with_measurements(height, weight)
            };
            fixed.postprocess_height_cat = Some(height_cat);
            fixed.postprocess_weight_cat = Some(weight_cat);
            Ok(fixed)
        })
        .collect::<Result<Vec<_>>>()?;

    log::info!("Converted {corrected} measurements recorded in the wrong unit");
    log_derivation("unit error correction", rows.len(), rows.len());
    Ok(output)
}
