//! Tests for BMI summary statistics and extreme-value selection

use growthviz::algorithm::{
    ExtremeField, ExtremeOrder, ExtremeQuery, bmi_stats, merge_observations, select_extremes,
};
use growthviz::config::{BmiStatsConfig, ZeroHeightPolicy};
use growthviz::models::{MergedObservation, Observation, Sex, Verdict};

use crate::utils::subject_day;

fn merged() -> Vec<MergedObservation> {
    let days: [(&str, Sex, u32, f64, f64, Verdict); 6] = [
        ("a", Sex::Male, 10_958, 180.0, 81.0, Verdict::Include),
        ("b", Sex::Male, 10_958, 175.0, 70.0, Verdict::Include),
        ("c", Sex::Male, 10_958, 172.0, 95.0, Verdict::AdultEwmaExtreme),
        ("d", Sex::Female, 10_958, 160.0, 58.0, Verdict::Include),
        ("e", Sex::Female, 14_610, 165.0, 90.0, Verdict::AdultBiv),
        ("f", Sex::Male, 5_000, 150.0, 40.0, Verdict::Include),
    ];
    let observations: Vec<Observation> = days
        .iter()
        .enumerate()
        .flat_map(|(i, &(subjid, sex, agedays, height, weight, weight_verdict))| {
            subject_day(
                i as i64 * 2,
                subjid,
                sex,
                agedays,
                (height, Verdict::Include),
                (weight, weight_verdict),
            )
        })
        .collect();
    merge_observations(&observations, ZeroHeightPolicy::Reject).unwrap()
}

#[test]
fn test_bmi_stats_groups_and_counts() {
    let stats = bmi_stats(&merged(), &BmiStatsConfig::default());

    // females first; the female group at 40 has no clean row and the
    // 14-year-old is outside the age range
    let keys: Vec<(&str, i64)> = stats.iter().map(|r| (r.sex.as_str(), r.rounded_age)).collect();
    assert_eq!(keys, vec![("F", 30), ("M", 30)]);

    let male = &stats[1];
    assert_eq!(male.count_clean, Some(2));
    assert_eq!(male.count_raw, Some(3));
    assert_eq!(male.count_diff, Some(1));
    assert!(male.sd_clean.is_some());
    assert!(male.min_raw.unwrap() <= male.min_clean.unwrap());
    assert!(male.max_raw.unwrap() >= male.max_clean.unwrap());

    let female = &stats[0];
    assert_eq!(female.count_clean, Some(1));
    assert_eq!(female.sd_clean, None);
}

#[test]
fn test_bmi_stats_is_idempotent() {
    let rows = merged();
    let config = BmiStatsConfig::default();
    assert_eq!(bmi_stats(&rows, &config), bmi_stats(&rows, &config));
}

#[test]
fn test_bmi_stats_flags_hide_columns() {
    let config = BmiStatsConfig {
        include_std: false,
        include_mean_diff: false,
        ..BmiStatsConfig::default()
    };
    let stats = bmi_stats(&merged(), &config);
    assert!(stats.iter().all(|r| r.sd_clean.is_none() && r.sd_raw.is_none()));
    assert!(stats.iter().all(|r| r.count_diff.is_none()));
    assert!(stats.iter().all(|r| r.mean_clean.is_some()));
}

#[test]
fn test_select_largest_bmi_among_clean_rows() {
    let query = ExtremeQuery {
        limit: 2,
        weight_verdicts: Some(vec![Verdict::Include]),
        ..ExtremeQuery::new(ExtremeField::Bmi)
    };
    let selected = select_extremes(&merged(), &query);
    let subjects: Vec<&str> = selected.iter().map(|r| r.subjid.as_str()).collect();
    assert_eq!(subjects, vec!["a", "b"]);

    let smallest = ExtremeQuery {
        order: ExtremeOrder::Smallest,
        limit: 1,
        sex: Some(Sex::Male),
        age_range: Some((20, 65)),
        ..ExtremeQuery::new(ExtremeField::Weight)
    };
    assert_eq!(select_extremes(&merged(), &smallest)[0].subjid, "b");
}
