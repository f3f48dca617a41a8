//! End-to-end runs over the fixture files

use growthviz::config::PipelineConfig;
use growthviz::models::{PostprocessCategory, Sex, Verdict};
use growthviz::pipeline::{run, run_from_files};
use growthviz::reader::{load_observations, load_reference_buckets};
use growthviz::tables;

use crate::utils::data_file;

fn fixture_output() -> growthviz::PipelineOutput {
    run_from_files(
        &data_file("observations.csv"),
        &data_file("reference.csv"),
        &PipelineConfig::default(),
    )
    .unwrap()
}

#[test]
fn test_registers_every_table() {
    let output = fixture_output();
    let names: Vec<&str> = output.registry.names().collect();
    assert_eq!(
        names,
        vec![
            tables::BMI_OBSERVATIONS,
            tables::BMI_STATS,
            tables::EXCLUSION_SUMMARY,
            tables::MERGED,
            tables::OBSERVATIONS,
            tables::REFERENCE_CURVES,
            tables::REFERENCE_MOMENTS,
        ]
    );
    assert_eq!(output.registry.get(tables::MERGED).unwrap().num_rows(), output.merged.len());
    let moments = output.registry.get(tables::REFERENCE_MOMENTS).unwrap();
    for column in ["Mean_height", "sd_height", "Mean_weight", "sd_weight", "Mean_bmi", "sd_bmi"] {
        assert!(moments.schema().index_of(column).is_ok(), "{column}");
    }
}

#[test]
fn test_age_filter_and_merge() {
    let output = fixture_output();
    // the 13-year-old subject is outside the adult domain
    assert_eq!(output.observations.len(), 13);
    assert!(output.observations.iter().all(|o| o.subjid != "s4"));

    // s5 has no weight and produces no merged row
    let keys: Vec<(&str, u32)> = output
        .merged
        .iter()
        .map(|r| (r.subjid.as_str(), r.agedays))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("s1", 10_958),
            ("s1", 11_323),
            ("s2", 9_131),
            ("s2", 9_496),
            ("s3", 20_089),
            ("s6", 12_784),
        ]
    );
}

#[test]
fn test_swapped_pair_is_corrected() {
    let output = fixture_output();
    let row = output
        .merged
        .iter()
        .find(|r| r.subjid == "s2" && r.agedays == 9_131)
        .unwrap();
    assert_eq!((row.height, row.weight), (165.0, 70.0));
    assert_eq!(row.postprocess_height_cat, Some(PostprocessCategory::IncludeFixedSwap));
    assert!((row.bmi - 70.0 / (1.65 * 1.65)).abs() < 1e-9);
}

#[test]
fn test_zscores_follow_reference_coverage() {
    let output = fixture_output();
    // the reference covers 18 to 49 years after the first bucket floor
    assert_eq!(output.reference.moments().and_then(|table| table.age_span()), Some((18, 49)));
    for row in &output.merged {
        let covered = (18..=49).contains(&row.rounded_age);
        assert_eq!(row.htz.is_some(), covered, "{} at {}", row.subjid, row.rounded_age);
        assert_eq!(row.bmiz.is_some(), covered);
    }
}

#[test]
fn test_summary_tables() {
    let output = fixture_output();

    let include = &output.exclusion_summary[0];
    assert_eq!(include.clean_value, Verdict::Include);
    assert_eq!((include.height_count, include.weight_count), (5, 4));

    let keys: Vec<(&str, i64)> = output
        .bmi_stats
        .iter()
        .map(|r| (r.sex.as_str(), r.rounded_age))
        .collect();
    assert_eq!(keys, vec![("F", 26), ("M", 30), ("M", 55)]);
    assert_eq!(output.bmi_observations.len(), output.merged.len());
}

#[test]
fn test_aggregate_bucket_is_skipped() {
    let buckets = load_reference_buckets(&data_file("reference.csv")).unwrap();
    assert_eq!(buckets.len(), 19);
    let observations = load_observations(&data_file("observations.csv")).unwrap();

    let output = run(&observations, &buckets, &PipelineConfig::default()).unwrap();
    let male_heights = output
        .curves
        .iter()
        .filter(|c| c.sex == Sex::Male && c.param == growthviz::Param::Height)
        .count();
    assert_eq!(male_heights, 32);
}

#[test]
fn test_unsupported_age_range_is_a_config_error() {
    let config = PipelineConfig {
        bmi_stats: growthviz::BmiStatsConfig {
            age_range: (65, 20),
            ..Default::default()
        },
        ..PipelineConfig::default()
    };
    let result = run(&[], &[], &config);
    assert!(matches!(result, Err(growthviz::GrowthVizError::Config(_))));
}
