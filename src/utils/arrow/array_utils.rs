//! Column lookup and casting for CSV-derived record batches

use arrow::array::{Array, ArrayRef};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::debug;

use crate::error::{GrowthVizError, Result};

/// Look up a column by name and cast it to `expected_type`
///
/// CSV schema inference decides column types from the data, so an all-integer
/// measurement column arrives as `Int64` and a numeric subject id as `Int64`.
/// Columns of another type go through Arrow's cast kernel; values that cannot
/// be converted become nulls (see [`lost_in_cast`]).
///
/// A missing column is an error when `required`, otherwise `Ok(None)`.
pub fn get_column(
    batch: &RecordBatch,
    column_name: &str,
    expected_type: &DataType,
    required: bool,
) -> Result<Option<ArrayRef>> {
    let Ok(idx) = batch.schema().index_of(column_name) else {
        if required {
            return Err(GrowthVizError::data(
                "record batch",
                format!("required column '{column_name}' not found"),
            ));
        }
        debug!("Optional column '{column_name}' is absent");
        return Ok(None);
    };

    let column = batch.column(idx);
    let actual_type = column.data_type();
    if actual_type == expected_type {
        return Ok(Some(column.clone()));
    }

    debug!("Converting column '{column_name}' from {actual_type:?} to {expected_type:?}");
    Ok(Some(cast(column, expected_type)?))
}

/// Downcast a column to its concrete array type, naming the column on failure
pub fn downcast_array<'a, A: Array + 'static>(
    array: &'a ArrayRef,
    column_name: &str,
    expected_type_name: &str,
) -> Result<&'a A> {
    array.as_any().downcast_ref::<A>().ok_or_else(|| {
        GrowthVizError::data(
            format!("column '{column_name}'"),
            format!("expected a {expected_type_name} array"),
        )
    })
}

/// Rows that became null through a cast but were present in the source
#[must_use]
pub fn lost_in_cast(original: &dyn Array, converted: &dyn Array) -> Vec<usize> {
    (0..original.len())
        .filter(|&row| !original.is_null(row) && converted.is_null(row))
        .collect()
}
