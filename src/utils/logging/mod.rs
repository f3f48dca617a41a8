//! Logging, console output and progress display
//!
//! Library code logs through the `log` facade; the console and progress
//! helpers are used by the binary.

pub mod console;
pub mod log;
pub mod progress;

pub use self::log::{log_derivation, log_operation_complete, log_operation_start, log_warning};
pub use progress::{create_spinner, finish_progress_bar};
