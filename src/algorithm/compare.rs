//! Comparison of several cleaning runs over the same data
//!
//! Each run is tagged with a name. Tables have one row per verdict and one
//! column per run; with exactly two runs a `diff` column (second minus first)
//! is added and rows are ordered by it, largest first, with unchanged
//! verdicts last.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{GrowthVizError, Result};
use crate::models::{Observation, Verdict};
use crate::utils::logging::log_derivation;

/// Observations of one named cleaning run
#[derive(Debug, Clone)]
pub struct Run {
    /// Name the run is reported under
    pub name: String,
    /// The run's observations
    pub observations: Vec<Observation>,
}

impl Run {
    /// Tag observations with a run name
    pub fn new(name: impl Into<String>, observations: Vec<Observation>) -> Self {
        Self {
            name: name.into(),
            observations,
        }
    }

    fn subject_count(&self) -> usize {
        self.observations
            .iter()
            .map(|o| o.subjid.as_str())
            .collect::<FxHashSet<_>>()
            .len()
    }
}

/// One verdict's values across runs
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    /// Verdict the row describes
    pub verdict: Verdict,
    /// One value per run, in run order
    pub values: Vec<f64>,
    /// Second run minus first run, when exactly two runs are compared
    pub diff: Option<f64>,
    /// Diff as a percentage of the second run's total, for subject counts
    pub population_percent_change: Option<f64>,
}

/// A verdict-by-run comparison table
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable {
    /// Run names, in column order
    pub runs: Vec<String>,
    /// Rows, one per verdict seen in any run
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    /// Value for a verdict and run name
    #[must_use]
    pub fn value(&self, verdict: Verdict, run: &str) -> Option<f64> {
        let column = self.runs.iter().position(|r| r == run)?;
        self.rows
            .iter()
            .find(|r| r.verdict == verdict)
            .map(|r| r.values[column])
    }

    /// Convert to a record batch with a `clean_value` column and one column per run
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = vec![Field::new("clean_value", DataType::Utf8, false)];
        let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from_iter_values(
            self.rows.iter().map(|r| r.verdict.label()),
        ))];

        for (i, run) in self.runs.iter().enumerate() {
            fields.push(Field::new(run, DataType::Float64, false));
            columns.push(Arc::new(Float64Array::from_iter_values(
                self.rows.iter().map(|r| r.values[i]),
            )));
        }
        if self.rows.iter().any(|r| r.diff.is_some()) {
            fields.push(Field::new("diff", DataType::Float64, true));
            columns.push(Arc::new(self.rows.iter().map(|r| r.diff).collect::<Float64Array>()));
        }
        if self.rows.iter().any(|r| r.population_percent_change.is_some()) {
            fields.push(Field::new("population percent change", DataType::Float64, true));
            columns.push(Arc::new(
                self.rows
                    .iter()
                    .map(|r| r.population_percent_change)
                    .collect::<Float64Array>(),
            ));
        }

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
    }
}

fn check_runs(runs: &[Run]) -> Result<()> {
    if runs.is_empty() {
        return Err(GrowthVizError::data("run comparison", "no runs to compare"));
    }
    let mut seen = FxHashSet::default();
    for run in runs {
        if !seen.insert(run.name.as_str()) {
            return Err(GrowthVizError::data(
                "run comparison",
                format!("run name '{}' is used twice", run.name),
            ));
        }
    }
    Ok(())
}

/// Order rows by diff, largest first, with zero diffs last
fn diff_order(a: &ComparisonRow, b: &ComparisonRow) -> Ordering {
    let key = |row: &ComparisonRow| match row.diff {
        Some(d) if d != 0.0 => d,
        _ => f64::NEG_INFINITY,
    };
    key(b).total_cmp(&key(a))
}

/// Pivot per-run verdict values into a table
fn pivot(runs: &[Run], per_run: Vec<FxHashMap<Verdict, f64>>) -> ComparisonTable {
    let verdicts: BTreeMap<&str, Verdict> = per_run
        .iter()
        .flat_map(|m| m.keys())
        .map(|v| (v.label(), *v))
        .collect();

    let mut rows: Vec<ComparisonRow> = verdicts
        .into_values()
        .map(|verdict| {
            let values: Vec<f64> = per_run
                .iter()
                .map(|m| m.get(&verdict).copied().unwrap_or(0.0))
                .collect();
            let diff = (values.len() == 2).then(|| values[1] - values[0]);
            ComparisonRow {
                verdict,
                values,
                diff,
                population_percent_change: None,
            }
        })
        .collect();
    if runs.len() == 2 {
        rows.sort_by(diff_order);
    }

    ComparisonTable {
        runs: runs.iter().map(|r| r.name.clone()).collect(),
        rows,
    }
}

fn subjects_per_verdict(run: &Run) -> FxHashMap<Verdict, f64> {
    let mut subjects: FxHashMap<Verdict, FxHashSet<&str>> = FxHashMap::default();
    for obs in &run.observations {
        subjects.entry(obs.verdict).or_default().insert(obs.subjid.as_str());
    }
    subjects
        .into_iter()
        .map(|(verdict, ids)| (verdict, ids.len() as f64))
        .collect()
}

/// Number of observations per verdict and run
pub fn count_comparison(runs: &[Run]) -> Result<ComparisonTable> {
    check_runs(runs)?;
    let per_run = runs
        .iter()
        .map(|run| {
            let mut counts: FxHashMap<Verdict, f64> = FxHashMap::default();
            for obs in &run.observations {
                *counts.entry(obs.verdict).or_default() += 1.0;
            }
            counts
        })
        .collect();
    let table = pivot(runs, per_run);
    log_derivation("count comparison", runs.len(), table.rows.len());
    Ok(table)
}

/// Number of subjects with at least one observation per verdict, by run
///
/// With two runs the diff is also reported as a percentage of all subject
/// counts of the second run.
pub fn subject_category_counts(runs: &[Run]) -> Result<ComparisonTable> {
    check_runs(runs)?;
    let per_run = runs.iter().map(subjects_per_verdict).collect();
    let mut table = pivot(runs, per_run);
    if runs.len() == 2 {
        let second_total: f64 = table.rows.iter().map(|r| r.values[1]).sum();
        for row in &mut table.rows {
            row.population_percent_change = row
                .diff
                .filter(|_| second_total > 0.0)
                .map(|d| d / second_total * 100.0);
        }
    }
    log_derivation("subject category counts", runs.len(), table.rows.len());
    Ok(table)
}

/// Percentage of each run's subjects with at least one observation per verdict
pub fn subject_category_percentages(runs: &[Run]) -> Result<ComparisonTable> {
    check_runs(runs)?;
    let per_run = runs
        .iter()
        .map(|run| {
            let subjects = run.subject_count();
            subjects_per_verdict(run)
                .into_iter()
                .map(|(verdict, count)| {
                    let share = if subjects == 0 {
                        0.0
                    } else {
                        count / subjects as f64 * 100.0
                    };
                    (verdict, share)
                })
                .collect()
        })
        .collect();
    let table = pivot(runs, per_run);
    log_derivation("subject category percentages", runs.len(), table.rows.len());
    Ok(table)
}

/// Exclusion rates of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunExclusionStats {
    #[serde(rename = "run name")]
    pub run_name: String,
    /// Percentage of subjects with at least one excluded observation
    #[serde(rename = "percent with exclusion")]
    pub percent_with_exclusion: f64,
    /// Excluded observations per subject
    #[serde(rename = "exclusions per patient")]
    pub exclusions_per_subject: f64,
}

/// Share of subjects with an exclusion and exclusions per subject, by run
pub fn subject_exclusion_stats(runs: &[Run]) -> Result<Vec<RunExclusionStats>> {
    check_runs(runs)?;
    Ok(runs
        .iter()
        .map(|run| {
            let subjects = run.subject_count();
            let excluded: Vec<&Observation> =
                run.observations.iter().filter(|o| !o.include).collect();
            let excluded_subjects = excluded
                .iter()
                .map(|o| o.subjid.as_str())
                .collect::<FxHashSet<_>>()
                .len();
            let (percent_with_exclusion, exclusions_per_subject) = if subjects == 0 {
                (0.0, 0.0)
            } else {
                (
                    excluded_subjects as f64 / subjects as f64 * 100.0,
                    excluded.len() as f64 / subjects as f64,
                )
            };
            RunExclusionStats {
                run_name: run.name.clone(),
                percent_with_exclusion,
                exclusions_per_subject,
            }
        })
        .collect())
}
