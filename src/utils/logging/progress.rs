//! Progress reporting for the pipeline driver
//!
//! Thin wrappers over indicatif used by the binary around each stage.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Template for the stage spinner
pub const STAGE_SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {msg}";

/// Spinner shown while a pipeline stage runs; the message names the stage
#[must_use]
pub fn create_spinner(stage: Option<&str>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    match ProgressStyle::default_spinner().template(STAGE_SPINNER_TEMPLATE) {
        Ok(style) => spinner.set_style(style),
        Err(err) => log::debug!("Spinner template rejected: {err}"),
    }
    if let Some(stage) = stage {
        spinner.set_message(stage.to_string());
    }
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Stop a spinner, leaving `message` (if any) on screen
pub fn finish_progress_bar(spinner: &ProgressBar, message: Option<&str>) {
    match message {
        Some(message) => spinner.finish_with_message(message.to_string()),
        None => spinner.finish(),
    }
}
