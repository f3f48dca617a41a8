//! Shared utilities: Arrow column access and logging.

pub mod arrow;
pub mod logging;
