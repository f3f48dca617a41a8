//! Typed access to Arrow columns of CSV-derived record batches

pub mod array_utils;
pub mod extractors;

pub use array_utils::{downcast_array, get_column, lost_in_cast};
pub use extractors::{f64_at, float64_column, str_at, string_column, whole_at};
