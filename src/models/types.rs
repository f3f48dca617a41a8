//! Common domain type definitions
//!
//! This module contains the enum types shared by observations, reference
//! tables and merged records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GrowthVizError;

/// Sex of a subject, in the cleaning algorithm's encoding (0 = male, 1 = female)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sex {
    /// Male, encoded as 0
    Male,
    /// Female, encoded as 1
    Female,
}

impl Sex {
    /// Both sexes, in code order
    pub const ALL: [Self; 2] = [Self::Male, Self::Female];

    /// Canonical numeric code
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Male => 0,
            Self::Female => 1,
        }
    }

    /// Parse the canonical encoding used in observation files
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Male),
            1 => Some(Self::Female),
            _ => None,
        }
    }

    /// Parse the encoding used in published reference tables (1 = male, 2 = female)
    pub fn from_reference_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Male),
            2 => Some(Self::Female),
            _ => None,
        }
    }

    /// One-letter label used in summary tables
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for Sex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Sex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Self::from_code(i64::from(code))
            .ok_or_else(|| serde::de::Error::custom(format!("invalid sex code {code}")))
    }
}

/// Measured or derived parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum Param {
    /// Height in centimetres
    #[serde(rename = "HEIGHTCM")]
    Height,
    /// Weight in kilograms
    #[serde(rename = "WEIGHTKG")]
    Weight,
    /// Body mass index, kg/m²
    #[serde(rename = "BMI")]
    Bmi,
}

impl Param {
    /// All parameters covered by the reference tables
    pub const ALL: [Self; 3] = [Self::Height, Self::Weight, Self::Bmi];

    /// Label as written in input files
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Height => "HEIGHTCM",
            Self::Weight => "WEIGHTKG",
            Self::Bmi => "BMI",
        }
    }

    /// Short name used as the suffix of moment columns (`Mean_height`, `sd_bmi`)
    #[must_use]
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Height => "height",
            Self::Weight => "weight",
            Self::Bmi => "bmi",
        }
    }

    /// Whether the parameter can appear in an observation file
    #[must_use]
    pub fn is_measured(self) -> bool {
        matches!(self, Self::Height | Self::Weight)
    }
}

impl FromStr for Param {
    type Err = GrowthVizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "HEIGHTCM" => Ok(Self::Height),
            "WEIGHTKG" => Ok(Self::Weight),
            "BMI" => Ok(Self::Bmi),
            other => Err(GrowthVizError::data(
                "param",
                format!("unexpected parameter '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Param {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
