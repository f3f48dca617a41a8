//! Validation of observation files

use std::fs;

use growthviz::config::PipelineConfig;
use growthviz::pipeline::run_from_files;
use growthviz::validate::validate_observation_file;
use tempfile::tempdir;

use crate::utils::data_file;

#[test]
fn test_fixture_is_clean() {
    let report = validate_observation_file(&data_file("observations.csv")).unwrap();
    assert!(report.is_clean(), "{:?}", report.messages());
    assert_eq!(report.rows_checked, 15);
}

#[test]
fn test_every_problem_is_reported() {
    let report = validate_observation_file(&data_file("observations_invalid.csv")).unwrap();
    let found = |column: &str, text: &str| {
        report
            .issues
            .iter()
            .find(|i| i.column == column && i.message.contains(text))
    };

    let sex = found("sex", "outside of 0 and 1").unwrap();
    assert_eq!(sex.rows, 2);
    assert_eq!(sex.first_line, Some(3));
    assert_eq!(found("agedays", "less than zero").unwrap().first_line, Some(4));
    assert_eq!(found("measurement", "less than zero").unwrap().first_line, Some(4));
    assert_eq!(found("measurement", "missing value").unwrap().first_line, Some(6));
    assert!(found("param", "WEIGHTKG and HEIGHTCM").is_some());
    assert!(found("clean_res", "Not-A-Verdict").is_some());
    assert_eq!(report.issues.len(), 6);
}

#[test]
fn test_missing_column_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no_verdict.csv");
    fs::write(
        &path,
        "id,subjid,sex,agedays,param,measurement\n1,s1,0,10958,HEIGHTCM,175.0\n",
    )
    .unwrap();

    let report = validate_observation_file(&path).unwrap();
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].column, "clean_res");
    assert!(report.issues[0].message.contains("not included"));
}

#[test]
fn test_invalid_file_stops_the_pipeline() {
    let result = run_from_files(
        &data_file("observations_invalid.csv"),
        &data_file("reference.csv"),
        &PipelineConfig::default(),
    );
    match result {
        Err(growthviz::GrowthVizError::Data { message, .. }) => {
            assert!(message.contains("sex"));
            assert!(message.contains("clean_res"));
        }
        other => panic!("expected a data error, got {other:?}"),
    }
}
