//! Conversion of derived records into Arrow record batches

use std::collections::BTreeSet;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, UInt8Array, UInt32Array};
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Field, FieldRef, Schema};
use serde::Serialize;

use crate::error::Result;
use crate::models::ReferenceCurve;

/// Records that are registered as tables
///
/// The Arrow schema is fixed per record type. A column whose values are all
/// missing in one run keeps its type, and label enums are written as `Utf8`.
pub trait TableRecord: Serialize {
    /// Arrow schema of the table
    fn schema() -> Schema;
}

/// Convert records into a record batch with the schema of their type
pub fn records_to_batch<T: TableRecord>(records: &[T]) -> Result<RecordBatch> {
    let schema = T::schema();
    if records.is_empty() {
        return Ok(RecordBatch::new_empty(Arc::new(schema)));
    }
    let fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
    Ok(serde_arrow::to_record_batch(&fields, &records)?)
}

/// Convert reference curves into a record batch
///
/// Columns are `param`, `Sex`, `age`, `Mean`, `sd` and one `P<rank>` column
/// per percentile rank present in any curve.
pub fn curves_to_batch(curves: &[ReferenceCurve]) -> Result<RecordBatch> {
    let ranks: BTreeSet<u8> = curves
        .iter()
        .flat_map(|c| c.percentiles.iter().map(|p| p.rank))
        .collect();

    let mut fields = vec![
        Field::new("param", DataType::Utf8, false),
        Field::new("Sex", DataType::UInt8, false),
        Field::new("age", DataType::UInt32, false),
        Field::new("Mean", DataType::Float64, true),
        Field::new("sd", DataType::Float64, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(curves.iter().map(|c| c.param.label()))),
        Arc::new(UInt8Array::from_iter_values(curves.iter().map(|c| c.sex.code()))),
        Arc::new(UInt32Array::from_iter_values(curves.iter().map(|c| c.age))),
        Arc::new(curves.iter().map(|c| c.mean).collect::<Float64Array>()),
        Arc::new(Float64Array::from_iter_values(curves.iter().map(|c| c.sd))),
    ];
    for rank in ranks {
        fields.push(Field::new(format!("P{rank}"), DataType::Float64, true));
        columns.push(Arc::new(
            curves.iter().map(|c| c.percentile(rank)).collect::<Float64Array>(),
        ));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
