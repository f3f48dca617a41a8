//! Reference curve processing
//!
//! Published decade buckets are expanded to yearly curves ([`expand`]) and
//! reshaped into the mean/sd lookup table used for z-scores ([`moments`]).

pub mod expand;
pub mod moments;

pub use expand::{expand_all, expand_reference, standard_deviation};
pub use moments::{ParamMoments, ReferenceTable, build_moments, curve_moments};
