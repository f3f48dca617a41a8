use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, bail};
use growthviz::pipeline::{run, run_pediatrics};
use growthviz::reader::{load_cdc_charts, load_observations, load_reference_buckets};
use growthviz::{AgeDomain, PipelineConfig};
use growthviz::utils::logging::console::{
    print_bmi_stats, print_registry_summary, print_validation_report,
};
use growthviz::utils::logging::{create_spinner, finish_progress_bar};
use growthviz::validate::validate_observation_file;
use log::info;

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let (Some(observations_path), Some(reference_path)) = (args.next(), args.next()) else {
        bail!("usage: growthviz <observations.csv> <reference.csv | chart dir> [config.json]");
    };
    let (observations_path, reference_path) =
        (PathBuf::from(observations_path), PathBuf::from(reference_path));

    let config = match args.next() {
        Some(path) => PipelineConfig::from_json_file(&PathBuf::from(&path))
            .with_context(|| format!("loading configuration from {path}"))?,
        None => PipelineConfig::default(),
    };
    info!("{config}");

    let start = Instant::now();
    let report = validate_observation_file(&observations_path)?;
    print_validation_report(&report);
    if !report.is_clean() {
        bail!(
            "{} has {} problem(s); nothing was derived",
            observations_path.display(),
            report.issues.len()
        );
    }

    let spinner = create_spinner(Some("Loading input files..."));
    let observations = load_observations(&observations_path)?;
    // pediatric runs take the directory holding the CDC chart files
    let output = if config.age_domain == AgeDomain::Pediatrics {
        let charts = load_cdc_charts(&reference_path)?;
        spinner.set_message("Deriving tables...");
        run_pediatrics(&observations, &charts, &config)?
    } else {
        let buckets = load_reference_buckets(&reference_path)?;
        spinner.set_message("Deriving tables...");
        run(&observations, &buckets, &config)?
    };

    spinner.set_message("Exporting tables...");
    let written = output
        .registry
        .export_all(&config.output_dir, config.export_format)
        .with_context(|| format!("exporting to {}", config.output_dir.display()))?;
    finish_progress_bar(&spinner, Some("Done"));

    print_registry_summary(&output.registry);
    print_bmi_stats(&output.bmi_stats);
    info!(
        "Wrote {} tables to {} in {:?}",
        written.len(),
        config.output_dir.display(),
        start.elapsed()
    );

    Ok(())
}
