//! Tests for run comparison tables

use growthviz::algorithm::{
    Run, count_comparison, exclusion_summary, subject_category_counts,
    subject_category_percentages, subject_exclusion_stats,
};
use growthviz::models::{Observation, Param, Sex, Verdict};

fn obs(id: i64, subjid: &str, param: Param, verdict: Verdict) -> Observation {
    Observation::new(id, subjid, Sex::Male, 10_000, param, 70.0, verdict)
}

fn first_run() -> Vec<Observation> {
    vec![
        obs(1, "a", Param::Height, Verdict::Include),
        obs(2, "a", Param::Weight, Verdict::Include),
        obs(3, "b", Param::Height, Verdict::AdultBiv),
        obs(4, "b", Param::Weight, Verdict::Include),
    ]
}

fn second_run() -> Vec<Observation> {
    vec![
        obs(1, "a", Param::Height, Verdict::Include),
        obs(2, "a", Param::Weight, Verdict::AdultEwmaModerate),
        obs(3, "b", Param::Height, Verdict::AdultBiv),
        obs(4, "b", Param::Weight, Verdict::AdultEwmaModerate),
    ]
}

fn runs() -> Vec<Run> {
    vec![Run::new("v1", first_run()), Run::new("v2", second_run())]
}

#[test]
fn test_count_comparison_orders_by_diff() {
    let table = count_comparison(&runs()).unwrap();
    let order: Vec<Verdict> = table.rows.iter().map(|r| r.verdict).collect();
    assert_eq!(
        order,
        vec![Verdict::AdultEwmaModerate, Verdict::Include, Verdict::AdultBiv]
    );
    assert_eq!(table.value(Verdict::Include, "v1"), Some(3.0));
    assert_eq!(table.value(Verdict::Include, "v2"), Some(1.0));
    assert_eq!(table.rows[0].diff, Some(2.0));
    assert_eq!(table.rows[2].diff, Some(0.0));

    let batch = table.to_record_batch().unwrap();
    let names: Vec<String> = batch.schema().fields().iter().map(|f| f.name().clone()).collect();
    assert_eq!(names, vec!["clean_value", "v1", "v2", "diff"]);
}

#[test]
fn test_subject_counts_and_percentages() {
    let counts = subject_category_counts(&runs()).unwrap();
    assert_eq!(counts.value(Verdict::AdultEwmaModerate, "v2"), Some(2.0));
    assert!(counts.rows.iter().all(|r| r.population_percent_change.is_some()));

    let shares = subject_category_percentages(&runs()).unwrap();
    assert_eq!(shares.value(Verdict::Include, "v1"), Some(100.0));
    assert_eq!(shares.value(Verdict::AdultBiv, "v1"), Some(50.0));
}

#[test]
fn test_exclusion_rates() {
    let stats = subject_exclusion_stats(&runs()).unwrap();
    assert_eq!(stats[0].run_name, "v1");
    assert_eq!(stats[0].percent_with_exclusion, 50.0);
    assert_eq!(stats[0].exclusions_per_subject, 0.5);
    assert_eq!(stats[1].percent_with_exclusion, 100.0);
    assert_eq!(stats[1].exclusions_per_subject, 1.5);
}

#[test]
fn test_duplicate_run_names_are_rejected() {
    let runs = vec![Run::new("v1", first_run()), Run::new("v1", second_run())];
    assert!(count_comparison(&runs).is_err());
    assert!(count_comparison(&[]).is_err());
}

#[test]
fn test_exclusion_summary_percentages() {
    let summary = exclusion_summary(&first_run());
    assert_eq!(summary[0].clean_value, Verdict::Include);
    assert_eq!(summary[0].height_count, 1);
    assert_eq!(summary[0].weight_count, 2);
    assert_eq!(summary[0].total, 3);
    assert_eq!(summary[0].height_percent, 50.0);
    assert_eq!(summary[0].weight_percent, 100.0);
}
