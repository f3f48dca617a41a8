//! Tests for reference curve expansion and the moments table

use growthviz::algorithm::reference::{build_moments, expand_reference, standard_deviation};
use growthviz::algorithm::ReferenceTable;
use growthviz::config::{MissingKeyPolicy, ReferenceConfig};
use growthviz::models::{Param, Percentile, Sex};
use growthviz::reader::load_reference_buckets;
use growthviz::GrowthVizError;

use crate::utils::{approx_eq, data_file, flat_bucket};

fn no_floor(window: u32) -> ReferenceConfig {
    ReferenceConfig {
        smoothing_window: window,
        first_bucket_floor: None,
        ..ReferenceConfig::default()
    }
}

fn p50_by_age(curves: &[growthviz::ReferenceCurve]) -> Vec<(u32, f64)> {
    curves
        .iter()
        .map(|c| (c.age, c.percentile(50).unwrap()))
        .collect()
}

#[test]
fn test_single_flat_bucket_round_trip() {
    let buckets = vec![flat_bucket(Param::Bmi, 20, 29, 22.0)];
    let curves = expand_reference(&buckets, Param::Bmi, &no_floor(2)).unwrap();

    assert_eq!(curves.len(), 10);
    for (expected_age, (age, value)) in (20..=29).zip(p50_by_age(&curves)) {
        assert_eq!(age, expected_age);
        assert_eq!(value, 22.0);
    }
    assert!(curves.iter().all(|c| c.sex == Sex::Male));
}

#[test]
fn test_seam_smoothing_is_linear_and_monotone() {
    let buckets = vec![
        flat_bucket(Param::Bmi, 20, 29, 22.0),
        flat_bucket(Param::Bmi, 30, 39, 24.0),
    ];
    let curves = expand_reference(&buckets, Param::Bmi, &no_floor(2)).unwrap();
    let values: Vec<(u32, f64)> = p50_by_age(&curves);

    let at = |age: u32| values.iter().find(|(a, _)| *a == age).unwrap().1;
    assert_eq!(at(27), 22.0);
    assert!(approx_eq(at(28), 22.25));
    assert!(approx_eq(at(29), 22.75));
    assert!(approx_eq(at(30), 23.25));
    assert!(approx_eq(at(31), 23.75));
    assert_eq!(at(32), 24.0);

    // no step between consecutive years is larger than the interpolation delta
    for pair in values.windows(2) {
        let step = pair[1].1 - pair[0].1;
        assert!(step >= 0.0);
        assert!(step <= 0.5 + 1e-9);
    }
}

fn is_ordered(curve: &growthviz::ReferenceCurve) -> bool {
    curve.percentiles.windows(2).all(|w| w[0].rank < w[1].rank && w[0].value <= w[1].value)
}

#[test]
fn test_seam_with_different_rank_sets_stays_ordered() {
    let mut lower = flat_bucket(Param::Bmi, 20, 29, 25.0);
    lower.percentiles = [(5, 20.0), (10, 21.0), (50, 25.0)]
        .into_iter()
        .map(|(rank, value)| Percentile { rank, value })
        .collect();
    let mut upper = flat_bucket(Param::Bmi, 30, 39, 35.0);
    upper.percentiles = [(5, 30.0), (50, 35.0)]
        .into_iter()
        .map(|(rank, value)| Percentile { rank, value })
        .collect();

    let curves = expand_reference(&[lower, upper], Param::Bmi, &no_floor(2)).unwrap();
    assert!(curves.iter().all(is_ordered));

    let ranks = |age: u32| -> Vec<u8> {
        let curve = curves.iter().find(|c| c.age == age).unwrap();
        curve.percentiles.iter().map(|p| p.rank).collect()
    };
    assert_eq!(ranks(27), vec![5, 10, 50]);
    assert_eq!(ranks(28), vec![5, 50]);
    assert_eq!(ranks(31), vec![5, 50]);
    assert_eq!(ranks(32), vec![5, 50]);
}

#[test]
fn test_fixture_curves_are_ordered() {
    let buckets = load_reference_buckets(&data_file("reference.csv")).unwrap();
    for param in Param::ALL {
        let curves = expand_reference(&buckets, param, &ReferenceConfig::default()).unwrap();
        assert!(curves.iter().all(is_ordered), "{param}");
    }
}

#[test]
fn test_zero_window_keeps_steps() {
    let buckets = vec![
        flat_bucket(Param::Bmi, 20, 29, 22.0),
        flat_bucket(Param::Bmi, 30, 39, 24.0),
    ];
    let curves = expand_reference(&buckets, Param::Bmi, &no_floor(0)).unwrap();
    let values = p50_by_age(&curves);
    assert_eq!(values[9], (29, 22.0));
    assert_eq!(values[10], (30, 24.0));
}

#[test]
fn test_gap_between_buckets_is_a_data_error() {
    let buckets = vec![
        flat_bucket(Param::Bmi, 20, 29, 22.0),
        flat_bucket(Param::Bmi, 31, 39, 24.0),
    ];
    let err = expand_reference(&buckets, Param::Bmi, &no_floor(2)).unwrap_err();
    assert!(matches!(&err, GrowthVizError::Data { message, .. } if message.contains("gap")));
}

#[test]
fn test_standard_deviation_from_standard_error() {
    assert!(approx_eq(standard_deviation(0.5, 100.0), 5.0));

    let curves =
        expand_reference(&[flat_bucket(Param::Height, 20, 29, 170.0)], Param::Height, &no_floor(0))
            .unwrap();
    assert!(curves.iter().all(|c| approx_eq(c.sd, 5.0)));
}

#[test]
fn test_moments_table_lookup() {
    let buckets: Vec<_> = [(Param::Height, 170.0), (Param::Weight, 70.0), (Param::Bmi, 24.0)]
        .into_iter()
        .map(|(param, value)| flat_bucket(param, 20, 29, value))
        .collect();
    let config = no_floor(0);
    let curves: Vec<_> = Param::ALL
        .into_iter()
        .flat_map(|param| expand_reference(&buckets, param, &config).unwrap())
        .collect();

    let table = ReferenceTable::new(build_moments(&curves, MissingKeyPolicy::Error).unwrap()).unwrap();
    assert_eq!(table.len(), 10);
    assert_eq!(table.age_span(), Some((20, 29)));

    let row = table.lookup(Sex::Male, 25).unwrap();
    assert_eq!(row.mean_height, 170.0);
    assert_eq!(row.mean_weight, 70.0);
    assert_eq!(row.mean_bmi, 24.0);
    assert!(table.lookup(Sex::Male, 30).unwrap_err().is_lookup());
    assert!(table.lookup(Sex::Female, 25).unwrap_err().is_lookup());
}

#[test]
fn test_missing_parameter_policy() {
    let buckets = vec![
        flat_bucket(Param::Height, 20, 29, 170.0),
        flat_bucket(Param::Weight, 20, 29, 70.0),
    ];
    let config = no_floor(0);
    let curves: Vec<_> = [Param::Height, Param::Weight]
        .into_iter()
        .flat_map(|param| expand_reference(&buckets, param, &config).unwrap())
        .collect();

    assert!(matches!(
        build_moments(&curves, MissingKeyPolicy::Error),
        Err(GrowthVizError::Data { .. })
    ));
    assert!(build_moments(&curves, MissingKeyPolicy::Drop).unwrap().is_empty());
}
