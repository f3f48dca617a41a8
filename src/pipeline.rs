//! End-to-end derivation of the growth tables
//!
//! Each step is a function over the outputs of earlier steps; every derived
//! table is registered under its name in [`tables`] as it is produced. Adult
//! runs score against moments expanded from published buckets, pediatric
//! runs against growth chart LMS rows. Every other step is shared.

use std::path::Path;
use std::time::Instant;

use crate::algorithm::{
    BmiObservation, BmiStatsRow, ExclusionSummaryRow, LmsTable, ReferenceTable, ZScoreReference,
    annotate_zscores, bmi_observations, bmi_stats, build_moments, correct_swaps,
    correct_unit_errors, exclusion_summary, expand_all, keep_age_range, merge_observations,
};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{LmsPoint, MergedObservation, Observation, ReferenceBucket, ReferenceCurve};
use crate::reader::{load_cdc_charts, load_observations, load_reference_buckets};
use crate::registry::{TableRegistry, curves_to_batch, tables};
use crate::validate::validate_observation_file;

/// Reference the merged rows were scored against
#[derive(Debug, Clone)]
pub enum GrowthReference {
    /// Yearly moments expanded from published adult buckets
    Adult(ReferenceTable),
    /// Growth chart LMS rows
    Pediatric(LmsTable),
}

impl GrowthReference {
    /// Adult moments, if this is an adult run
    #[must_use]
    pub fn moments(&self) -> Option<&ReferenceTable> {
        match self {
            Self::Adult(table) => Some(table),
            Self::Pediatric(_) => None,
        }
    }

    /// Growth charts, if this is a pediatric run
    #[must_use]
    pub fn charts(&self) -> Option<&LmsTable> {
        match self {
            Self::Adult(_) => None,
            Self::Pediatric(table) => Some(table),
        }
    }
}

/// Typed results of a pipeline run together with the registered tables
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Every derived table by name
    pub registry: TableRegistry,
    /// Observations within the age domain
    pub observations: Vec<Observation>,
    pub exclusion_summary: Vec<ExclusionSummaryRow>,
    /// Yearly reference curves of every parameter; empty for pediatric runs
    pub curves: Vec<ReferenceCurve>,
    pub reference: GrowthReference,
    /// Merged records after post-processing and z-score annotation
    pub merged: Vec<MergedObservation>,
    pub bmi_observations: Vec<BmiObservation>,
    pub bmi_stats: Vec<BmiStatsRow>,
}

/// Tables derived from the observations once a reference is available
struct Derived {
    merged: Vec<MergedObservation>,
    bmi_observations: Vec<BmiObservation>,
    bmi_stats: Vec<BmiStatsRow>,
}

/// Filter the observations and register them with their exclusion summary
fn prepare(
    observations: &[Observation],
    config: &PipelineConfig,
    registry: &mut TableRegistry,
) -> Result<(Vec<Observation>, Vec<ExclusionSummaryRow>)> {
    config.validate()?;
    let observations = keep_age_range(observations, &config.age_domain);
    registry.register_records(tables::OBSERVATIONS, &observations)?;

    let summary = exclusion_summary(&observations);
    registry.register_records(tables::EXCLUSION_SUMMARY, &summary)?;
    Ok((observations, summary))
}

/// Merge, correct and score the observations, then summarise BMI
fn derive<R: ZScoreReference>(
    observations: &[Observation],
    reference: &R,
    config: &PipelineConfig,
    registry: &mut TableRegistry,
) -> Result<Derived> {
    let mut merged = merge_observations(observations, config.zero_height_policy)?;
    if config.correct_swaps {
        merged = correct_swaps(&merged, config.zero_height_policy)?;
    }
    if config.correct_unit_errors {
        merged = correct_unit_errors(&merged, config.zero_height_policy)?;
    }
    let merged = annotate_zscores(&merged, reference);
    registry.register_records(tables::MERGED, &merged)?;

    let bmi_rows = bmi_observations(&merged);
    registry.register_records(tables::BMI_OBSERVATIONS, &bmi_rows)?;

    let stats = bmi_stats(&merged, &config.bmi_stats);
    registry.register_records(tables::BMI_STATS, &stats)?;

    Ok(Derived {
        merged,
        bmi_observations: bmi_rows,
        bmi_stats: stats,
    })
}

/// Run every derivation step over loaded adult inputs
///
/// # Arguments
/// * `observations` - Parsed observation rows
/// * `buckets` - Parsed reference buckets of all three parameters
/// * `config` - Pipeline configuration
pub fn run(
    observations: &[Observation],
    buckets: &[ReferenceBucket],
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    let start = Instant::now();
    let mut registry = TableRegistry::new();
    let (observations, summary) = prepare(observations, config, &mut registry)?;

    let curves = expand_all(buckets, &config.reference)?;
    registry.register_batch(tables::REFERENCE_CURVES, curves_to_batch(&curves)?);

    let moments = build_moments(&curves, config.reference.missing_key_policy)?;
    registry.register_records(tables::REFERENCE_MOMENTS, &moments)?;
    let reference = ReferenceTable::new(moments)?;

    let derived = derive(&observations, &reference, config, &mut registry)?;
    log::info!(
        "Derived {} tables from {} observations in {:?}",
        registry.len(),
        observations.len(),
        start.elapsed()
    );

    Ok(PipelineOutput {
        registry,
        observations,
        exclusion_summary: summary,
        curves,
        reference: GrowthReference::Adult(reference),
        merged: derived.merged,
        bmi_observations: derived.bmi_observations,
        bmi_stats: derived.bmi_stats,
    })
}

/// Run every derivation step over loaded pediatric inputs
///
/// Rows are scored with the modified z-score against the growth charts; the
/// charts are registered as [`tables::GROWTH_CHARTS`].
pub fn run_pediatrics(
    observations: &[Observation],
    charts: &[LmsPoint],
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    let start = Instant::now();
    let mut registry = TableRegistry::new();
    let (observations, summary) = prepare(observations, config, &mut registry)?;

    registry.register_records(tables::GROWTH_CHARTS, charts)?;
    let reference = LmsTable::new(charts.to_vec())?;

    let derived = derive(&observations, &reference, config, &mut registry)?;
    log::info!(
        "Derived {} pediatric tables from {} observations in {:?}",
        registry.len(),
        observations.len(),
        start.elapsed()
    );

    Ok(PipelineOutput {
        registry,
        observations,
        exclusion_summary: summary,
        curves: Vec::new(),
        reference: GrowthReference::Pediatric(reference),
        merged: derived.merged,
        bmi_observations: derived.bmi_observations,
        bmi_stats: derived.bmi_stats,
    })
}

/// Validate and load the observation file
fn load_validated(observations_path: &Path) -> Result<Vec<Observation>> {
    let report = validate_observation_file(observations_path)?;
    report.into_result(&observations_path.display().to_string())?;
    load_observations(observations_path)
}

/// Validate and load both input files, then run the pipeline
///
/// Validation reports every problem in the observation file at once; any
/// problem aborts the run before derivation starts.
pub fn run_from_files(
    observations_path: &Path,
    reference_path: &Path,
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    let observations = load_validated(observations_path)?;
    let buckets = load_reference_buckets(reference_path)?;
    run(&observations, &buckets, config)
}

/// Validate the observation file, load the CDC charts from `charts_dir`, then
/// run the pediatric pipeline
pub fn run_pediatrics_from_files(
    observations_path: &Path,
    charts_dir: &Path,
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    let observations = load_validated(observations_path)?;
    let charts = load_cdc_charts(charts_dir)?;
    run_pediatrics(&observations, &charts, config)
}
