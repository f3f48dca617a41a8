//! Tests for merging, swap correction and z-scores

use growthviz::algorithm::{
    ReferenceTable, annotate_zscores, correct_swaps, merge_observations, zscore,
};
use growthviz::GrowthVizError;
use growthviz::config::ZeroHeightPolicy;
use growthviz::models::{PostprocessCategory, ReferenceMoments, Sex, Verdict};

use crate::utils::{approx_eq, subject_day};

fn moments(age: u32) -> ReferenceMoments {
    ReferenceMoments {
        sex: Sex::Male,
        age,
        mean_height: 175.0,
        sd_height: 7.0,
        mean_weight: 80.0,
        sd_weight: 15.0,
        mean_bmi: 26.0,
        sd_bmi: 5.0,
    }
}

#[test]
fn test_merge_computes_bmi_and_combined_flag() {
    let observations = subject_day(
        1,
        "1",
        Sex::Male,
        10_000,
        (170.0, Verdict::Include),
        (70.0, Verdict::AdultEwmaModerate),
    );
    let merged = merge_observations(&observations, ZeroHeightPolicy::Reject).unwrap();

    assert_eq!(merged.len(), 1);
    let row = &merged[0];
    assert!((row.bmi - 70.0 / (1.7 * 1.7)).abs() < 1e-9);
    assert!((row.bmi - 24.22).abs() < 0.01);
    assert!(row.include_height);
    assert!(!row.include_weight);
    assert_eq!(row.include_both, row.include_height && row.include_weight);
    assert_eq!(row.rounded_age, 27);
}

#[test]
fn test_swap_correction() {
    let swapped = Verdict::AdultSwappedMeasurements;
    let observations = subject_day(1, "1", Sex::Male, 10_000, (70.0, swapped), (170.0, swapped));
    let merged = merge_observations(&observations, ZeroHeightPolicy::Reject).unwrap();

    let corrected = correct_swaps(&merged, ZeroHeightPolicy::Reject).unwrap();
    let row = &corrected[0];
    assert_eq!(row.height, 170.0);
    assert_eq!(row.weight, 70.0);
    assert!((row.bmi - 24.221_453).abs() < 1e-6);
    assert_eq!(row.postprocess_height_cat, Some(PostprocessCategory::IncludeFixedSwap));
    assert_eq!(row.postprocess_weight_cat, Some(PostprocessCategory::IncludeFixedSwap));
    assert_eq!(row.effective_height_cat().label(), "Include-Fixed-Swap");

    // a second pass leaves corrected rows alone
    assert_eq!(correct_swaps(&corrected, ZeroHeightPolicy::Reject).unwrap(), corrected);
}

#[test]
fn test_swapped_zero_weight_is_a_zero_height() {
    let swapped = Verdict::AdultSwappedMeasurements;
    let observations = subject_day(1, "z", Sex::Male, 10_000, (175.0, swapped), (0.0, swapped));
    // the merge itself sees a valid height
    let merged = merge_observations(&observations, ZeroHeightPolicy::Reject).unwrap();

    let err = correct_swaps(&merged, ZeroHeightPolicy::Reject).unwrap_err();
    assert!(matches!(err, GrowthVizError::ArithmeticAmbiguity { .. }));

    let kept = correct_swaps(&merged, ZeroHeightPolicy::Propagate).unwrap();
    assert_eq!((kept[0].height, kept[0].weight), (0.0, 175.0));
    assert!(kept[0].bmi.is_infinite());
}

#[test]
fn test_zero_height_policies() {
    let observations = subject_day(
        1,
        "1",
        Sex::Female,
        10_000,
        (0.0, Verdict::Include),
        (60.0, Verdict::Include),
    );
    assert!(matches!(
        merge_observations(&observations, ZeroHeightPolicy::Reject),
        Err(growthviz::GrowthVizError::ArithmeticAmbiguity { .. })
    ));
    let merged = merge_observations(&observations, ZeroHeightPolicy::Propagate).unwrap();
    assert!(merged[0].bmi.is_infinite());
}

#[test]
fn test_zscore_outside_reference_coverage_is_missing() {
    let table = ReferenceTable::new((20..=49).map(moments).collect()).unwrap();
    let mut observations = subject_day(
        1,
        "a",
        Sex::Male,
        10_958,
        (182.0, Verdict::Include),
        (95.0, Verdict::Include),
    );
    // 55 years, beyond the last covered year
    observations.extend(subject_day(
        3,
        "b",
        Sex::Male,
        20_089,
        (182.0, Verdict::Include),
        (95.0, Verdict::Include),
    ));
    let merged = merge_observations(&observations, ZeroHeightPolicy::Reject).unwrap();
    let annotated = annotate_zscores(&merged, &table);

    let covered = &annotated[0];
    assert!(approx_eq(covered.htz.unwrap(), 1.0));
    assert!(approx_eq(covered.wtz.unwrap(), 1.0));
    assert!(covered.bmiz.is_some());

    let outside = &annotated[1];
    assert_eq!(outside.rounded_age, 55);
    assert_eq!((outside.htz, outside.wtz, outside.bmiz), (None, None, None));
}

#[test]
fn test_zscore_rejects_unusable_sd() {
    assert_eq!(zscore(10.0, 8.0, 2.0), Some(1.0));
    assert_eq!(zscore(10.0, 8.0, 0.0), None);
    assert_eq!(zscore(10.0, 8.0, -1.0), None);
    assert_eq!(zscore(10.0, 8.0, f64::NAN), None);
}
