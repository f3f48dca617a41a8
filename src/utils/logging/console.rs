//! Console output utilities
//!
//! This module provides utilities for formatted console output.

use crate::algorithm::statistics::BmiStatsRow;
use crate::registry::TableRegistry;
use crate::validate::ValidationReport;

/// Print the registered tables with their row counts
pub fn print_registry_summary(registry: &TableRegistry) {
    println!("Derived tables:");
    for name in registry.names() {
        if let Ok(batch) = registry.get(name) {
            println!(
                "  - {name}: {} rows, {} columns",
                batch.num_rows(),
                batch.num_columns()
            );
        }
    }
}

/// Print every problem found by the validation pass
pub fn print_validation_report(report: &ValidationReport) {
    if report.is_clean() {
        println!("Validation passed: {} rows checked", report.rows_checked);
        return;
    }
    println!("Validation found {} problem(s):", report.issues.len());
    for issue in &report.issues {
        println!("  - {issue}");
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// Print BMI summary statistics, females first as in the summary tables
pub fn print_bmi_stats(rows: &[BmiStatsRow]) {
    for (heading, sex) in [("Female", "F"), ("Male", "M")] {
        println!("## {heading}");
        println!(
            "{:>5} {:>10} {:>10} {:>10} {:>10} {:>8} {:>8}",
            "age", "mean_clean", "mean_raw", "sd_clean", "sd_raw", "n_clean", "n_raw"
        );
        for row in rows.iter().filter(|r| r.sex == sex) {
            println!(
                "{:>5} {:>10} {:>10} {:>10} {:>10} {:>8} {:>8}",
                row.rounded_age,
                fmt_opt(row.mean_clean),
                fmt_opt(row.mean_raw),
                fmt_opt(row.sd_clean),
                fmt_opt(row.sd_raw),
                row.count_clean.map_or_else(|| "-".to_string(), |c| c.to_string()),
                row.count_raw.map_or_else(|| "-".to_string(), |c| c.to_string()),
            );
        }
    }
}
