//! Column names of the input files

use crate::Param;

/// Observation id
pub const ID: &str = "id";
/// Subject identifier
pub const SUBJID: &str = "subjid";
/// Sex, 0 = male, 1 = female
pub const SEX: &str = "sex";
/// Age in days
pub const AGEDAYS: &str = "agedays";
/// HEIGHTCM or WEIGHTKG
pub const PARAM: &str = "param";
/// Measured value
pub const MEASUREMENT: &str = "measurement";
/// Cleaning verdict
pub const CLEAN_RES: &str = "clean_res";

/// Columns every observation file must carry
pub const OBSERVATION_COLUMNS: [&str; 7] =
    [ID, SUBJID, SEX, AGEDAYS, PARAM, MEASUREMENT, CLEAN_RES];

/// Published sex, 1/2 or Male/Female
pub const REF_SEX: &str = "Sex";
/// Parameter the statistics describe
pub const REF_MEASURE: &str = "Measure";
/// First age of the bucket
pub const REF_AGE_LOW: &str = "Age_low";
/// Last age of the bucket
pub const REF_AGE_HIGH: &str = "Age_high";
/// Published age label
pub const REF_AGE_LABEL: &str = "Age (All race and Hispanic-origin groups)";
/// Published mean
pub const REF_MEAN: &str = "Mean";
/// Number of examined persons
pub const REF_EXAMINED: &str = "Number of examined persons";
/// Standard error of the mean
pub const REF_STANDARD_ERROR: &str = "Standard error of the mean";

/// Growth chart sex, 1 = male, 2 = female
pub const LMS_SEX: &str = "Sex";
/// Growth chart age in months
pub const LMS_AGEMOS: &str = "Agemos";
/// Box-Cox power
pub const LMS_L: &str = "L";
/// Median
pub const LMS_M: &str = "M";
/// Coefficient of variation
pub const LMS_S: &str = "S";

/// CDC growth chart file of each parameter
pub const CDC_CHART_FILES: [(Param, &str); 3] = [
    (Param::Height, "statage.csv"),
    (Param::Weight, "wtage.csv"),
    (Param::Bmi, "bmiagerev.csv"),
];

/// Percentile rank encoded in a column name such as `P5` or `P95`
#[must_use]
pub fn percentile_rank(column_name: &str) -> Option<u8> {
    let digits = column_name.strip_prefix('P')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|rank| (1..100).contains(rank))
}
