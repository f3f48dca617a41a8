//! Structural validation of observation files
//!
//! Validation runs every check over every row and reports all problems found,
//! so an analyst sees the complete list in one run. Each distinct problem is
//! reported once with the number of affected rows and the first line it
//! occurs on.

use std::fmt;
use std::path::Path;

use arrow::array::Array;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashMap;

use crate::error::{GrowthVizError, Result};
use crate::models::{Param, Sex, Verdict};
use crate::reader::columns::{
    AGEDAYS, CLEAN_RES, MEASUREMENT, OBSERVATION_COLUMNS, PARAM, SEX,
};
use crate::reader::read_csv_batches;
use crate::utils::arrow::{f64_at, float64_column, get_column, lost_in_cast, str_at, string_column};

/// One structural problem in an input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Column the problem was found in
    pub column: String,
    /// Description of the problem
    pub message: String,
    /// Number of affected rows (0 for column-level problems)
    pub rows: usize,
    /// First affected line in the file (header is line 1)
    pub first_line: Option<usize>,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.column, self.message)?;
        if let Some(line) = self.first_line {
            write!(f, " ({} row(s), first at line {line})", self.rows)?;
        }
        Ok(())
    }
}

/// Result of a validation pass
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Problems found, in the order first encountered
    pub issues: Vec<ValidationIssue>,
    /// Number of data rows checked
    pub rows_checked: usize,
}

impl ValidationReport {
    /// Whether no problem was found
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Human-readable list of the problems, one per entry
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    /// Turn a report with problems into a data error listing all of them
    pub fn into_result(self, context: &str) -> Result<()> {
        if self.is_clean() {
            return Ok(());
        }
        Err(GrowthVizError::data(context, self.messages().join("; ")))
    }
}

#[derive(Default)]
struct IssueCollector {
    issues: Vec<ValidationIssue>,
    index: FxHashMap<(String, String), usize>,
}

impl IssueCollector {
    fn column_issue(&mut self, column: &str, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            column: column.to_string(),
            message: message.into(),
            rows: 0,
            first_line: None,
        });
    }

    fn row_issue(&mut self, column: &str, message: impl Into<String>, line: usize) {
        let key = (column.to_string(), message.into());
        if let Some(&idx) = self.index.get(&key) {
            self.issues[idx].rows += 1;
            return;
        }
        self.index.insert(key.clone(), self.issues.len());
        self.issues.push(ValidationIssue {
            column: key.0,
            message: key.1,
            rows: 1,
            first_line: Some(line),
        });
    }
}

/// Run every structural check over observation record batches
#[must_use]
pub fn validate_observations(batches: &[RecordBatch]) -> ValidationReport {
    let mut collector = IssueCollector::default();
    let rows_checked = batches.iter().map(RecordBatch::num_rows).sum();

    let Some(first) = batches.first() else {
        collector.column_issue("file", "contains no data rows");
        return ValidationReport {
            issues: collector.issues,
            rows_checked,
        };
    };

    let schema = first.schema();
    let present: Vec<&str> = OBSERVATION_COLUMNS
        .iter()
        .copied()
        .filter(|name| {
            let found = schema.index_of(name).is_ok();
            if !found {
                collector.column_issue(name, "column not included in patient data");
            }
            found
        })
        .collect();

    if present.contains(&AGEDAYS) {
        if let Ok(field) = schema.field_with_name(AGEDAYS) {
            if !matches!(field.data_type(), DataType::Int64 | DataType::Int32) {
                collector.column_issue(
                    AGEDAYS,
                    format!("column is not integer (found {})", field.data_type()),
                );
            }
        }
    }

    let mut offset = 0;
    for batch in batches {
        for name in &present {
            if let Some(column) = batch.column_by_name(name) {
                for row in 0..column.len() {
                    if column.is_null(row) {
                        collector.row_issue(name, "missing value", offset + row + 2);
                    }
                }
            }
        }
        check_batch(batch, &present, offset, &mut collector);
        offset += batch.num_rows();
    }

    ValidationReport {
        issues: collector.issues,
        rows_checked,
    }
}

fn check_numeric_column(
    batch: &RecordBatch,
    name: &str,
    offset: usize,
    collector: &mut IssueCollector,
    check: impl Fn(f64) -> Option<&'static str>,
) {
    let (Some(original), Ok(Some(converted))) = (
        batch.column_by_name(name),
        get_column(batch, name, &DataType::Float64, false),
    ) else {
        return;
    };
    for row in lost_in_cast(original.as_ref(), converted.as_ref()) {
        collector.row_issue(name, "value is not numeric", offset + row + 2);
    }
    let Ok(Some(values)) = float64_column(batch, name, false) else {
        return;
    };
    for row in 0..values.len() {
        if let Some(message) = f64_at(&values, row).and_then(&check) {
            collector.row_issue(name, message, offset + row + 2);
        }
    }
}

fn check_batch(batch: &RecordBatch, present: &[&str], offset: usize, collector: &mut IssueCollector) {
    if present.contains(&SEX) {
        check_numeric_column(batch, SEX, offset, collector, |v| {
            let valid = v.fract() == 0.0 && Sex::from_code(v as i64).is_some();
            (!valid).then_some("contains values outside of 0 and 1")
        });
    }
    if present.contains(&AGEDAYS) {
        check_numeric_column(batch, AGEDAYS, offset, collector, |v| {
            if v < 0.0 {
                Some("contains values less than zero")
            } else if v.fract() != 0.0 {
                Some("contains non-integer values")
            } else {
                None
            }
        });
    }
    if present.contains(&MEASUREMENT) {
        check_numeric_column(batch, MEASUREMENT, offset, collector, |v| {
            (v < 0.0).then_some("contains values less than zero")
        });
    }
    if present.contains(&PARAM) {
        if let Ok(Some(params)) = string_column(batch, PARAM, false) {
            for row in 0..params.len() {
                let valid = str_at(&params, row)
                    .and_then(|p| p.parse::<Param>().ok())
                    .is_none_or(Param::is_measured);
                if !valid {
                    collector.row_issue(
                        PARAM,
                        "contains values other than WEIGHTKG and HEIGHTCM",
                        offset + row + 2,
                    );
                }
            }
        }
    }
    if present.contains(&CLEAN_RES) {
        if let Ok(Some(verdicts)) = string_column(batch, CLEAN_RES, false) {
            for row in 0..verdicts.len() {
                if let Some(label) = str_at(&verdicts, row) {
                    if Verdict::from_label(label).is_none() {
                        collector.row_issue(
                            CLEAN_RES,
                            format!("unknown verdict '{label}'"),
                            offset + row + 2,
                        );
                    }
                }
            }
        }
    }
}

/// Read and validate an observation file
pub fn validate_observation_file(path: &Path) -> Result<ValidationReport> {
    let batches = read_csv_batches(path)?;
    Ok(validate_observations(&batches))
}
