//! Verdict counts per measured parameter

use std::collections::BTreeMap;

use arrow_schema::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

use crate::models::{Observation, Param, Verdict};
use crate::registry::TableRecord;
use crate::utils::logging::log_derivation;

/// Number and share of observations with one verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionSummaryRow {
    /// Verdict label
    pub clean_value: Verdict,
    /// Height observations with the verdict
    #[serde(rename = "HEIGHTCM")]
    pub height_count: usize,
    /// Share of all height observations, in percent
    #[serde(rename = "height percent")]
    pub height_percent: f64,
    /// Weight observations with the verdict
    #[serde(rename = "WEIGHTKG")]
    pub weight_count: usize,
    /// Share of all weight observations, in percent
    #[serde(rename = "weight percent")]
    pub weight_percent: f64,
    /// Height and weight observations with the verdict
    pub total: usize,
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Count observations per verdict and parameter
///
/// Only verdicts that occur are listed, most frequent first.
#[must_use]
pub fn exclusion_summary(observations: &[Observation]) -> Vec<ExclusionSummaryRow> {
    let mut counts: BTreeMap<Verdict, (usize, usize)> = BTreeMap::new();
    let (mut heights, mut weights) = (0, 0);
    for obs in observations {
        let entry = counts.entry(obs.verdict).or_default();
        match obs.param {
            Param::Height => {
                entry.0 += 1;
                heights += 1;
            }
            Param::Weight => {
                entry.1 += 1;
                weights += 1;
            }
            Param::Bmi => {}
        }
    }

    let mut rows: Vec<ExclusionSummaryRow> = counts
        .into_iter()
        .map(|(verdict, (height_count, weight_count))| ExclusionSummaryRow {
            clean_value: verdict,
            height_count,
            height_percent: percent(height_count, heights),
            weight_count,
            weight_percent: percent(weight_count, weights),
            total: height_count + weight_count,
        })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total));

    log_derivation("exclusion summary", observations.len(), rows.len());
    rows
}

impl TableRecord for ExclusionSummaryRow {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("clean_value", DataType::Utf8, false),
            Field::new("HEIGHTCM", DataType::UInt64, false),
            Field::new("height percent", DataType::Float64, false),
            Field::new("WEIGHTKG", DataType::UInt64, false),
            Field::new("weight percent", DataType::Float64, false),
            Field::new("total", DataType::UInt64, false),
        ])
    }
}
