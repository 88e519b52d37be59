//! Length units and conversion to the canonical centimeter working unit.
//!
//! Every geometric value is normalized to centimeters before it reaches the
//! solver. Conversions in both directions are exact per unit; rounding only
//! happens in [`to_integer_cm`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Linear units accepted on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LengthUnit {
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "m")]
    Meter,
}

impl LengthUnit {
    /// Wire tag of the unit (`"mm"`, `"cm"` or `"m"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            LengthUnit::Millimeter => "mm",
            LengthUnit::Centimeter => "cm",
            LengthUnit::Meter => "m",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a unit tag outside the closed set reaches the converter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("unsupported units: {0}")]
    InvalidUnit(String),
}

impl FromStr for LengthUnit {
    type Err = UnitError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "mm" => Ok(LengthUnit::Millimeter),
            "cm" => Ok(LengthUnit::Centimeter),
            "m" => Ok(LengthUnit::Meter),
            other => Err(UnitError::InvalidUnit(other.to_string())),
        }
    }
}

/// Converts a value in `unit` to centimeters.
///
/// # Examples
/// ```
/// use pack_normalizer::units::{LengthUnit, to_canonical};
///
/// assert_eq!(to_canonical(125.0, LengthUnit::Millimeter), 12.5);
/// assert_eq!(to_canonical(2.5, LengthUnit::Meter), 250.0);
/// ```
pub fn to_canonical(value: f64, unit: LengthUnit) -> f64 {
    match unit {
        LengthUnit::Millimeter => value / 10.0,
        LengthUnit::Centimeter => value,
        LengthUnit::Meter => value * 100.0,
    }
}

/// Converts a centimeter value back into `unit`.
pub fn from_canonical(value_cm: f64, unit: LengthUnit) -> f64 {
    match unit {
        LengthUnit::Millimeter => value_cm * 10.0,
        LengthUnit::Centimeter => value_cm,
        LengthUnit::Meter => value_cm / 100.0,
    }
}

/// Rounds a centimeter value to an integer centimeter, never below 1.
///
/// Ties go to the even neighbour (12.5 → 12, 13.5 → 14). Values beyond the
/// `u32` range saturate.
pub fn to_integer_cm(value_cm: f64) -> u32 {
    let rounded = value_cm.round_ties_even();
    if rounded.is_nan() || rounded < 1.0 {
        return 1;
    }
    // float-to-int `as` saturates at u32::MAX
    rounded as u32
}
