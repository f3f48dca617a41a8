//! Pediatric runs scored against growth chart LMS rows

use std::fs;

use growthviz::config::{AgeDomain, ExportFormat, PipelineConfig};
use growthviz::models::{LmsPoint, Param, PostprocessCategory, Sex, Verdict};
use growthviz::pipeline::{PipelineOutput, run_pediatrics, run_pediatrics_from_files};
use growthviz::reader::{load_cdc_charts, load_lms_reference, load_observations};
use growthviz::registry::TableRecord;
use growthviz::{GrowthVizError, tables};
use tempfile::tempdir;

use crate::utils::{approx_eq, data_file};

fn pediatric_config() -> PipelineConfig {
    PipelineConfig {
        age_domain: AgeDomain::Pediatrics,
        correct_unit_errors: true,
        ..PipelineConfig::default()
    }
}

fn fixture_output() -> PipelineOutput {
    run_pediatrics_from_files(
        &data_file("observations_pediatrics.csv"),
        &data_file("cdc"),
        &pediatric_config(),
    )
    .unwrap()
}

#[test]
fn test_cdc_charts_load_all_parameters() {
    let charts = load_cdc_charts(&data_file("cdc")).unwrap();
    assert_eq!(charts.len(), 8);
    let heights: Vec<&LmsPoint> = charts.iter().filter(|p| p.param == Param::Height).collect();
    assert_eq!(heights.len(), 4);
    assert_eq!(heights[0].sex, Sex::Male);
    assert_eq!(heights[2].sex, Sex::Female);
    assert!(approx_eq(heights[0].agemos, 120.5));
    assert!(approx_eq(heights[0].age, 120.5 / 12.0));
    assert!(charts.iter().any(|p| p.param == Param::Bmi && p.sex == Sex::Female));
}

#[test]
fn test_chart_loading_names_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("statage.csv");
    fs::write(&path, "Sex,Agemos,L,M,S\n3,120.5,1,138,0.04\n").unwrap();

    let err = load_lms_reference(&path, Param::Height).unwrap_err();
    match err {
        GrowthVizError::Data { context, message } => {
            assert!(context.contains("statage.csv"), "{context}");
            assert!(message.contains("Sex"), "{message}");
        }
        other => panic!("unexpected error {other}"),
    }

    // only the height chart is present
    fs::write(&path, "Sex,Agemos,L,M,S\n1,120.5,1,138,0.04\n").unwrap();
    assert_eq!(load_lms_reference(&path, Param::Height).unwrap().len(), 1);
    assert!(load_cdc_charts(dir.path()).is_err());
}

#[test]
fn test_registers_growth_charts_instead_of_adult_reference() {
    let output = fixture_output();
    let names: Vec<&str> = output.registry.names().collect();
    assert_eq!(
        names,
        vec![
            tables::BMI_OBSERVATIONS,
            tables::BMI_STATS,
            tables::EXCLUSION_SUMMARY,
            tables::GROWTH_CHARTS,
            tables::MERGED,
            tables::OBSERVATIONS,
        ]
    );
    let charts = output.registry.get(tables::GROWTH_CHARTS).unwrap();
    assert_eq!(charts.num_rows(), 8);
    assert_eq!(charts.schema().as_ref(), &LmsPoint::schema());
    assert!(output.curves.is_empty());
    assert!(output.reference.moments().is_none());
    assert_eq!(output.reference.charts().map(|table| table.len()), Some(8));
}

#[test]
fn test_pediatric_age_domain() {
    let output = fixture_output();
    // p4 is 27 years old
    assert_eq!(output.observations.len(), 6);
    let subjects: Vec<&str> = output.merged.iter().map(|r| r.subjid.as_str()).collect();
    assert_eq!(subjects, vec!["p1", "p2", "p3"]);
}

#[test]
fn test_modified_zscores_against_charts() {
    let output = fixture_output();
    let p1 = &output.merged[0];
    // with L = 1 the score is (x - M) / (M * S) on both sides of the median
    assert!(approx_eq(p1.htz.unwrap(), 2.0 / (138.0 * 0.04)));
    assert!(approx_eq(p1.wtz.unwrap(), 3.0 / (32.0 * 0.1)));
    assert!(approx_eq(p1.bmiz.unwrap(), (p1.bmi - 17.0) / 1.7));

    // no chart row at 228.5 months
    let p3 = &output.merged[2];
    assert_eq!((p3.htz, p3.wtz, p3.bmiz), (None, None, None));
}

#[test]
fn test_unit_errors_are_corrected_before_scoring() {
    let output = fixture_output();
    let p2 = &output.merged[1];
    assert_eq!(p2.height_cat, Verdict::UnitErrorLow);
    assert!(approx_eq(p2.height, 57.0 * 2.54));
    assert_eq!(p2.postprocess_height_cat, Some(PostprocessCategory::IncludeUnitLow));
    assert_eq!(
        p2.postprocess_weight_cat,
        Some(PostprocessCategory::Original(Verdict::Include))
    );
    assert!(approx_eq(p2.bmi, 40.0 / (1.4478_f64 * 1.4478)));
    assert!(approx_eq(p2.htz.unwrap(), (144.78 - 144.0) / (144.0 * 0.05)));
    assert!(approx_eq(p2.wtz.unwrap(), 0.0));
}

#[test]
fn test_uncorrected_unit_error_scores_raw_height() {
    let config = PipelineConfig {
        correct_unit_errors: false,
        ..pediatric_config()
    };
    let observations = load_observations(&data_file("observations_pediatrics.csv")).unwrap();
    let charts = load_cdc_charts(&data_file("cdc")).unwrap();
    let output = run_pediatrics(&observations, &charts, &config).unwrap();

    let p2 = &output.merged[1];
    assert!(approx_eq(p2.height, 57.0));
    assert!(p2.htz.unwrap() < -10.0);
}

#[test]
fn test_duplicate_chart_rows_are_rejected() {
    let observations = load_observations(&data_file("observations_pediatrics.csv")).unwrap();
    let mut charts = load_cdc_charts(&data_file("cdc")).unwrap();
    charts.push(charts[0]);
    assert!(run_pediatrics(&observations, &charts, &pediatric_config()).is_err());
}

#[test]
fn test_pediatric_tables_export() {
    let output = fixture_output();
    let dir = tempdir().unwrap();
    for format in [ExportFormat::Csv, ExportFormat::Parquet] {
        let written = output.registry.export_all(dir.path(), format).unwrap();
        assert_eq!(written.len(), output.registry.len());
    }
}
