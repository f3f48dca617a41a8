//! Module for reading observation and reference CSV files.
//!
//! Files are read into Arrow record batches with an inferred schema and then
//! converted row by row into typed records. Conversion is fail-fast: the first
//! malformed row aborts the load with a [`GrowthVizError::Data`] naming the
//! line. Run [`crate::validate::validate_observations`] first to get the full
//! list of problems in one pass.

pub mod columns;

use std::io::Seek;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::array::Float64Array;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::record_batch::RecordBatch;
use smallvec::SmallVec;

use crate::error::util::safe_open_file;
use crate::error::{GrowthVizError, Result};
use crate::models::{
    LmsPoint, Observation, Param, Percentile, ReferenceBucket, Sex, Verdict,
};
use crate::utils::arrow::{f64_at, float64_column, str_at, string_column, whole_at};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Default number of rows per record batch
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Read a CSV file with a header row into record batches
///
/// The schema is inferred from the whole file.
///
/// # Arguments
/// * `path` - Path to the CSV file
///
/// # Returns
/// The record batches in file order
pub fn read_csv_batches(path: &Path) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_operation_start("Reading CSV file", path);

    let mut file = safe_open_file(path, "CSV input")?;
    let format = Format::default().with_header(true);
    let (schema, _) = format.infer_schema(&mut file, None)?;
    file.rewind()?;

    let reader = ReaderBuilder::new(Arc::new(schema))
        .with_header(true)
        .with_batch_size(DEFAULT_BATCH_SIZE)
        .build(file)?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;

    let rows = batches.iter().map(RecordBatch::num_rows).sum();
    log_operation_complete("read", path, rows, Some(start.elapsed()));
    Ok(batches)
}

/// Line number in the source file of a data row (header is line 1)
fn line(offset: usize, row: usize) -> String {
    format!("line {}", offset + row + 2)
}

/// Convert observation record batches into typed observations
pub fn observations_from_batches(batches: &[RecordBatch]) -> Result<Vec<Observation>> {
    use self::columns::{AGEDAYS, CLEAN_RES, ID, MEASUREMENT, PARAM, SEX, SUBJID};

    let mut observations = Vec::with_capacity(batches.iter().map(RecordBatch::num_rows).sum());
    let mut offset = 0;

    for batch in batches {
        let required = |name: &'static str| -> Result<_> {
            float64_column(batch, name, true)?
                .ok_or_else(|| GrowthVizError::data("observations", format!("missing {name}")))
        };
        let ids = required(ID)?;
        let sexes = required(SEX)?;
        let agedays = required(AGEDAYS)?;
        let measurements = required(MEASUREMENT)?;
        let text = |name: &'static str| -> Result<_> {
            string_column(batch, name, true)?
                .ok_or_else(|| GrowthVizError::data("observations", format!("missing {name}")))
        };
        let subjids = text(SUBJID)?;
        let params = text(PARAM)?;
        let verdicts = text(CLEAN_RES)?;

        for row in 0..batch.num_rows() {
            let ctx = || line(offset, row);
            let id = whole_at(&ids, row)
                .ok_or_else(|| GrowthVizError::data(ctx(), "id is missing or not an integer"))?;
            let subjid = str_at(&subjids, row)
                .ok_or_else(|| GrowthVizError::data(ctx(), "subjid is missing"))?;
            let sex = whole_at(&sexes, row)
                .and_then(Sex::from_code)
                .ok_or_else(|| GrowthVizError::data(ctx(), "sex must be 0 or 1"))?;
            let days = whole_at(&agedays, row)
                .and_then(|d| u32::try_from(d).ok())
                .ok_or_else(|| {
                    GrowthVizError::data(ctx(), "agedays must be a non-negative integer")
                })?;
            let param = str_at(&params, row)
                .ok_or_else(|| GrowthVizError::data(ctx(), "param is missing"))?
                .parse::<Param>()
                .map_err(|e| GrowthVizError::data(ctx(), e.to_string()))?;
            if !param.is_measured() {
                return Err(GrowthVizError::data(
                    ctx(),
                    format!("param must be HEIGHTCM or WEIGHTKG, found {param}"),
                ));
            }
            let measurement = f64_at(&measurements, row)
                .ok_or_else(|| GrowthVizError::data(ctx(), "measurement is missing"))?;
            let verdict = str_at(&verdicts, row)
                .ok_or_else(|| GrowthVizError::data(ctx(), "clean_res is missing"))?
                .parse::<Verdict>()
                .map_err(|e| GrowthVizError::data(ctx(), e.to_string()))?;

            observations.push(Observation::new(
                id,
                subjid,
                sex,
                days,
                param,
                measurement,
                verdict,
            ));
        }
        offset += batch.num_rows();
    }

    Ok(observations)
}

/// Load a cleaned observation file
pub fn load_observations(path: &Path) -> Result<Vec<Observation>> {
    let batches = read_csv_batches(path)?;
    observations_from_batches(&batches).map_err(|e| match e {
        GrowthVizError::Data { context, message } => GrowthVizError::Data {
            context: format!("{}: {context}", path.display()),
            message,
        },
        other => other,
    })
}

/// Parse a published sex value: `Male`/`Female` labels or a numeric code
///
/// Numeric codes are returned as published; the reference expander maps them
/// to the canonical encoding.
fn reference_sex_code(value: &str) -> Option<i64> {
    match value.to_ascii_lowercase().as_str() {
        "male" => Some(1),
        "female" => Some(2),
        other => other
            .parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0)
            .map(|v| v as i64),
    }
}

/// Convert reference record batches into buckets
pub fn reference_from_batches(batches: &[RecordBatch]) -> Result<Vec<ReferenceBucket>> {
    use self::columns::{
        REF_AGE_HIGH, REF_AGE_LABEL, REF_AGE_LOW, REF_EXAMINED, REF_MEAN, REF_MEASURE, REF_SEX,
        REF_STANDARD_ERROR, percentile_rank,
    };

    let mut buckets = Vec::new();
    let mut offset = 0;

    for batch in batches {
        let missing = |name: &str| GrowthVizError::data("reference", format!("missing {name}"));
        let sexes = string_column(batch, REF_SEX, true)?.ok_or_else(|| missing(REF_SEX))?;
        let measures =
            string_column(batch, REF_MEASURE, true)?.ok_or_else(|| missing(REF_MEASURE))?;
        let lows = float64_column(batch, REF_AGE_LOW, true)?.ok_or_else(|| missing(REF_AGE_LOW))?;
        let highs =
            float64_column(batch, REF_AGE_HIGH, true)?.ok_or_else(|| missing(REF_AGE_HIGH))?;
        let examined =
            float64_column(batch, REF_EXAMINED, true)?.ok_or_else(|| missing(REF_EXAMINED))?;
        let errors = float64_column(batch, REF_STANDARD_ERROR, true)?
            .ok_or_else(|| missing(REF_STANDARD_ERROR))?;
        let labels = string_column(batch, REF_AGE_LABEL, false)?;
        let means = float64_column(batch, REF_MEAN, false)?;

        let mut percentile_columns = Vec::new();
        for field in batch.schema().fields() {
            if let Some(rank) = percentile_rank(field.name()) {
                if let Some(values) = float64_column(batch, field.name(), true)? {
                    percentile_columns.push((rank, values));
                }
            }
        }
        percentile_columns.sort_by_key(|(rank, _)| *rank);

        for row in 0..batch.num_rows() {
            let ctx = || line(offset, row);
            let sex_code = str_at(&sexes, row)
                .and_then(reference_sex_code)
                .ok_or_else(|| GrowthVizError::data(ctx(), "Sex is missing or unreadable"))?;
            let param = str_at(&measures, row)
                .ok_or_else(|| GrowthVizError::data(ctx(), "Measure is missing"))?
                .parse::<Param>()
                .map_err(|e| GrowthVizError::data(ctx(), e.to_string()))?;
            let age_low = f64_at(&lows, row)
                .ok_or_else(|| GrowthVizError::data(ctx(), "Age_low is missing"))?;
            let age_high = f64_at(&highs, row)
                .ok_or_else(|| GrowthVizError::data(ctx(), "Age_high is missing"))?;
            let examined_persons = f64_at(&examined, row).ok_or_else(|| {
                GrowthVizError::data(ctx(), "Number of examined persons is missing")
            })?;
            let standard_error = f64_at(&errors, row).ok_or_else(|| {
                GrowthVizError::data(ctx(), "Standard error of the mean is missing")
            })?;

            let mut percentiles = SmallVec::new();
            for (rank, values) in &percentile_columns {
                if let Some(value) = f64_at(values, row) {
                    percentiles.push(Percentile { rank: *rank, value });
                }
            }

            buckets.push(ReferenceBucket {
                sex_code,
                param,
                age_low,
                age_high,
                label: labels
                    .as_ref()
                    .and_then(|l| str_at(l, row))
                    .map(str::to_string),
                mean: means.as_ref().and_then(|m| f64_at(m, row)),
                percentiles,
                examined: examined_persons,
                standard_error,
            });
        }
        offset += batch.num_rows();
    }

    Ok(buckets)
}

/// Load a published reference percentile table
pub fn load_reference_buckets(path: &Path) -> Result<Vec<ReferenceBucket>> {
    let batches = read_csv_batches(path)?;
    reference_from_batches(&batches)
}

/// Convert growth chart record batches into LMS rows of one parameter
///
/// Chart sex codes (1 = male, 2 = female) are mapped to the canonical
/// encoding.
pub fn lms_from_batches(batches: &[RecordBatch], param: Param) -> Result<Vec<LmsPoint>> {
    use self::columns::{LMS_AGEMOS, LMS_L, LMS_M, LMS_S, LMS_SEX};

    let mut points = Vec::with_capacity(batches.iter().map(RecordBatch::num_rows).sum());
    let mut offset = 0;

    for batch in batches {
        let required = |name: &'static str| -> Result<_> {
            float64_column(batch, name, true)?.ok_or_else(|| {
                GrowthVizError::data(format!("{param} growth chart"), format!("missing {name}"))
            })
        };
        let sexes = required(LMS_SEX)?;
        let ages = required(LMS_AGEMOS)?;
        let ls = required(LMS_L)?;
        let ms = required(LMS_M)?;
        let ss = required(LMS_S)?;

        for row in 0..batch.num_rows() {
            let ctx = || line(offset, row);
            let sex = whole_at(&sexes, row)
                .and_then(Sex::from_reference_code)
                .ok_or_else(|| GrowthVizError::data(ctx(), "Sex must be 1 or 2"))?;
            let value = |values: &Float64Array, name: &str| {
                f64_at(values, row)
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| GrowthVizError::data(ctx(), format!("{name} is missing")))
            };
            let agemos = value(&ages, LMS_AGEMOS)?;
            points.push(LmsPoint::new(
                sex,
                param,
                agemos,
                value(&ls, LMS_L)?,
                value(&ms, LMS_M)?,
                value(&ss, LMS_S)?,
            ));
        }
        offset += batch.num_rows();
    }

    Ok(points)
}

/// Load one growth chart file
pub fn load_lms_reference(path: &Path, param: Param) -> Result<Vec<LmsPoint>> {
    let batches = read_csv_batches(path)?;
    lms_from_batches(&batches, param).map_err(|e| match e {
        GrowthVizError::Data { context, message } => GrowthVizError::Data {
            context: format!("{}: {context}", path.display()),
            message,
        },
        other => other,
    })
}

/// Load the CDC height, weight and BMI charts from one directory
pub fn load_cdc_charts(dir: &Path) -> Result<Vec<LmsPoint>> {
    let mut points = Vec::new();
    for (param, file) in self::columns::CDC_CHART_FILES {
        points.extend(load_lms_reference(&dir.join(file), param)?);
    }
    Ok(points)
}
