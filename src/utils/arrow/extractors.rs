//! Typed column extraction for Arrow record batches
//!
//! Columns are extracted once per batch and then indexed per row, which keeps
//! the row loops in the readers free of schema lookups.

use arrow::array::{Array, Float64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::utils::arrow::array_utils::{downcast_array, get_column};

/// Extract a column as strings, converting other types to their text form
///
/// # Returns
///
/// * `Ok(Some(StringArray))` - The column
/// * `Ok(None)` - If the column is not present and not required
pub fn string_column(
    batch: &RecordBatch,
    column_name: &str,
    required: bool,
) -> Result<Option<StringArray>> {
    match get_column(batch, column_name, &DataType::Utf8, required)? {
        Some(array) => Ok(Some(
            downcast_array::<StringArray>(&array, column_name, "String")?.clone(),
        )),
        None => Ok(None),
    }
}

/// Extract a column as 64-bit floats
///
/// Text that does not parse as a number becomes null.
pub fn float64_column(
    batch: &RecordBatch,
    column_name: &str,
    required: bool,
) -> Result<Option<Float64Array>> {
    match get_column(batch, column_name, &DataType::Float64, required)? {
        Some(array) => Ok(Some(
            downcast_array::<Float64Array>(&array, column_name, "Float64")?.clone(),
        )),
        None => Ok(None),
    }
}

/// Value at a row, `None` if null or out of range
#[must_use]
pub fn f64_at(array: &Float64Array, row: usize) -> Option<f64> {
    (row < array.len() && !array.is_null(row)).then(|| array.value(row))
}

/// Trimmed non-empty string at a row, `None` if null, empty or out of range
#[must_use]
pub fn str_at(array: &StringArray, row: usize) -> Option<&str> {
    if row >= array.len() || array.is_null(row) {
        return None;
    }
    let value = array.value(row).trim();
    (!value.is_empty()).then_some(value)
}

/// Whole number at a row, `None` if null or fractional
#[must_use]
pub fn whole_at(array: &Float64Array, row: usize) -> Option<i64> {
    f64_at(array, row).filter(|v| v.is_finite() && v.fract() == 0.0).map(|v| v as i64)
}
