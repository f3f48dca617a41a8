//! Logging helpers
//!
//! File operations and derivation steps are logged in one format so a run
//! can be followed from the log alone.

use std::path::Path;
use std::time::Duration;

/// Log the start of a file operation
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{operation} {}", path.display());
}

/// Log a finished file operation
///
/// # Arguments
/// * `verb` - What was done, e.g. "read" or "wrote"
/// * `path` - File that was read or written
/// * `rows` - Number of data rows
/// * `elapsed` - Time taken, when measured
pub fn log_operation_complete(verb: &str, path: &Path, rows: usize, elapsed: Option<Duration>) {
    match elapsed {
        Some(duration) => log::info!("{verb} {rows} rows ({}) in {duration:?}", path.display()),
        None => log::info!("{verb} {rows} rows ({})", path.display()),
    }
}

/// Log a derivation step that turned `input` rows into `output` rows
pub fn log_derivation(step: &str, input: usize, output: usize) {
    log::info!("{step}: {input} rows in, {output} rows out");
}

/// Log a recoverable problem, with the file it concerns if any
pub fn log_warning(message: &str, path: Option<&Path>) {
    match path {
        Some(path) => log::warn!("{message} ({})", path.display()),
        None => log::warn!("{message}"),
    }
}
