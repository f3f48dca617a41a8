//! Tests for the verdict table and the include mapping

use growthviz::models::{Observation, Param, Sex, Verdict, VerdictClass};

#[test]
fn test_include_flag_follows_verdict_class() {
    for &verdict in Verdict::ALL {
        let obs = Observation::new(1, "s", Sex::Female, 9000, Param::Height, 160.0, verdict);
        assert_eq!(obs.include, verdict == Verdict::Include, "{verdict}");
        assert_eq!(obs.include, verdict.class() == VerdictClass::Include);
    }
}

#[test]
fn test_every_label_parses_back() {
    for &verdict in Verdict::ALL {
        assert_eq!(verdict.label().parse::<Verdict>().unwrap(), verdict);
    }
    assert!("Exclude-Something-New".parse::<Verdict>().is_err());
}

#[test]
fn test_swap_candidates() {
    let candidates: Vec<Verdict> = Verdict::ALL
        .iter()
        .copied()
        .filter(|v| v.is_swap_candidate())
        .collect();
    assert_eq!(
        candidates,
        vec![Verdict::AdultSwappedMeasurements, Verdict::SwappedMeasurements]
    );
}

#[test]
fn test_age_in_years() {
    let obs = Observation::new(1, "s", Sex::Male, 10_958, Param::Weight, 80.0, Verdict::Include);
    assert!((obs.age - 30.001_368_9).abs() < 1e-6);
    assert_eq!(obs.rounded_age(), 30);
}
