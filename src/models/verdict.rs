//! Cleaning verdicts
//!
//! Every label the cleaning algorithm can assign to an observation maps to a
//! [`Verdict`] variant, and every variant maps to exactly one [`VerdictClass`].
//! Labels that are not in the table are rejected at load time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GrowthVizError;

/// Coarse meaning of a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerdictClass {
    /// The observation is kept as is
    Include,
    /// The observation is excluded
    Exclude,
    /// Height and weight were recorded in each other's fields
    SwapCandidate,
}

macro_rules! verdicts {
    ($($variant:ident => $label:literal, $class:ident;)+) => {
        /// A cleaning verdict label
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Verdict {
            $(
                #[doc = $label]
                $variant,
            )+
        }

        impl Verdict {
            /// Every known verdict
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Label as written by the cleaning algorithm
            #[must_use]
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            /// Class of the verdict
            #[must_use]
            pub fn class(self) -> VerdictClass {
                match self {
                    $(Self::$variant => VerdictClass::$class,)+
                }
            }

            /// Look up a verdict by its label
            #[must_use]
            pub fn from_label(label: &str) -> Option<Self> {
                match label {
                    $($label => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

verdicts! {
    Include => "Include", Include;
    // Adult algorithm
    AdultBiv => "Exclude-Adult-BIV", Exclude;
    AdultHundreds => "Exclude-Adult-Hundreds", Exclude;
    AdultHundredsRv => "Exclude-Adult-Hundreds-RV", Exclude;
    AdultUnitErrors => "Exclude-Adult-Unit-Errors", Exclude;
    AdultUnitErrorsRv => "Exclude-Adult-Unit-Errors-RV", Exclude;
    AdultTranspositions => "Exclude-Adult-Transpositions", Exclude;
    AdultTranspositionsRv => "Exclude-Adult-Transpositions-RV", Exclude;
    AdultWeightCapIdentical => "Exclude-Adult-Weight-Cap-Identical", Exclude;
    AdultWeightCap => "Exclude-Adult-Weight-Cap", Exclude;
    AdultSwappedMeasurements => "Exclude-Adult-Swapped-Measurements", SwapCandidate;
    AdultIdenticalSameDay => "Exclude-Adult-Identical-Same-Day", Exclude;
    AdultExtraneousSameDay => "Exclude-Adult-Extraneous-Same-Day", Exclude;
    AdultDistinctPairs => "Exclude-Adult-Distinct-Pairs", Exclude;
    AdultDistinctThreeOrMore => "Exclude-Adult-Distinct-3-Or-More", Exclude;
    AdultDistinctOrderedPairs => "Exclude-Adult-Distinct-Ordered-Pairs", Exclude;
    AdultDistinctSingle => "Exclude-Adult-Distinct-Single", Exclude;
    AdultEwmaExtreme => "Exclude-Adult-EWMA-Extreme", Exclude;
    AdultEwmaModerate => "Exclude-Adult-EWMA-Moderate", Exclude;
    AdultPossiblyImpactedByWeightCap => "Exclude-Adult-Possibly-Impacted-By-Weight-Cap", Exclude;
    AdultTooManyErrors => "Exclude-Adult-Too-Many-Errors", Exclude;
    // Pediatric algorithm
    SwappedMeasurements => "Swapped-Measurements", SwapCandidate;
    UnitErrorHigh => "Unit-Error-High", Exclude;
    UnitErrorLow => "Unit-Error-Low", Exclude;
    UnitErrorPossible => "Unit-Error-Possible", Exclude;
    Exclude => "Exclude", Exclude;
    CarriedForward => "Exclude-Carried-Forward", Exclude;
    SdCutoff => "Exclude-SD-Cutoff", Exclude;
    EwmaExtreme => "Exclude-EWMA-Extreme", Exclude;
    EwmaExtremePair => "Exclude-EWMA-Extreme-Pair", Exclude;
    ExtraneousSameDay => "Exclude-Extraneous-Same-Day", Exclude;
    SameDayExtreme => "Exclude-Same-Day-Extreme", Exclude;
    SameDayIdentical => "Exclude-Same-Day-Identical", Exclude;
    MinHeightChange => "Exclude-Min-Height-Change", Exclude;
    MaxHeightChange => "Exclude-Max-Height-Change", Exclude;
    Duplicate => "Exclude-Duplicate", Exclude;
    TooManyErrors => "Exclude-Too-Many-Errors", Exclude;
    TooManyErrorsOtherParameter => "Exclude-Too-Many-Errors-Other-Parameter", Exclude;
    Missing => "Missing", Exclude;
    // Older releases
    Implausible => "Implausible", Exclude;
}

impl Verdict {
    /// Whether the observation is included as is
    #[must_use]
    pub fn is_include(self) -> bool {
        self.class() == VerdictClass::Include
    }

    /// Whether the observation was flagged as a height/weight swap
    #[must_use]
    pub fn is_swap_candidate(self) -> bool {
        self.class() == VerdictClass::SwapCandidate
    }
}

impl FromStr for Verdict {
    type Err = GrowthVizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s.trim())
            .ok_or_else(|| GrowthVizError::data("clean_res", format!("unknown verdict '{s}'")))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Verdict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// Category assigned to a merged measurement by post-processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostprocessCategory {
    /// Unchanged: the original verdict carries over
    Original(Verdict),
    /// Height and weight were swapped back into place
    IncludeFixedSwap,
    /// A unit error (value recorded too high) was converted
    IncludeUnitHigh,
    /// A unit error (value recorded too low) was converted
    IncludeUnitLow,
}

impl PostprocessCategory {
    /// Label written to output tables
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Original(verdict) => verdict.label(),
            Self::IncludeFixedSwap => "Include-Fixed-Swap",
            Self::IncludeUnitHigh => "Include-UH",
            Self::IncludeUnitLow => "Include-UL",
        }
    }

    /// Whether post-processing changed the measurement
    #[must_use]
    pub fn is_corrected(self) -> bool {
        !matches!(self, Self::Original(_))
    }
}

impl FromStr for PostprocessCategory {
    type Err = GrowthVizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Include-Fixed-Swap" => Ok(Self::IncludeFixedSwap),
            "Include-UH" => Ok(Self::IncludeUnitHigh),
            "Include-UL" => Ok(Self::IncludeUnitLow),
            other => other.parse().map(Self::Original),
        }
    }
}

impl fmt::Display for PostprocessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for PostprocessCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for PostprocessCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}
