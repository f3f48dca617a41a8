use std::path::PathBuf;

use growthviz::models::{Observation, Param, Percentile, ReferenceBucket, Sex, Verdict};
use smallvec::smallvec;

/// Directory holding the fixture files
#[must_use]
pub fn test_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

/// Path to a fixture file
#[must_use]
pub fn data_file(name: &str) -> PathBuf {
    test_data_dir().join(name)
}

/// Height and weight observations of one subject-day
#[must_use]
pub fn subject_day(
    first_id: i64,
    subjid: &str,
    sex: Sex,
    agedays: u32,
    (height, height_verdict): (f64, Verdict),
    (weight, weight_verdict): (f64, Verdict),
) -> Vec<Observation> {
    vec![
        Observation::new(first_id, subjid, sex, agedays, Param::Height, height, height_verdict),
        Observation::new(first_id + 1, subjid, sex, agedays, Param::Weight, weight, weight_verdict),
    ]
}

/// A bucket with one flat percentile value, published with reference sex code 1
#[must_use]
pub fn flat_bucket(param: Param, low: u32, high: u32, value: f64) -> ReferenceBucket {
    ReferenceBucket {
        sex_code: 1,
        param,
        age_low: f64::from(low),
        age_high: f64::from(high),
        label: Some(format!("{low}-{high}")),
        mean: None,
        percentiles: smallvec![Percentile { rank: 50, value }],
        examined: 100.0,
        standard_error: 0.5,
    }
}

/// Whether two floats agree to within `1e-9`
#[must_use]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
