//! Fixed-point math utilities for deterministic construction.
//!
//! Every scalar the engine derives (credits, weight, slots, ranges) is a
//! fixed-point number. Two regenerations of the same build must produce
//! byte-identical manifests, and percentage chains must round the same way
//! on every platform, so floating-point never enters the pipeline.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all construction math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Rounding policy applied after a percentage or multiplier.
///
/// Percentage chains are order- and rounding-sensitive, so the policy is
/// always carried explicitly by the modifier that needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rounding {
    /// Keep the exact fixed-point result.
    #[default]
    None,
    /// Round towards negative infinity.
    Floor,
    /// Round towards positive infinity.
    Ceil,
    /// Round half away from zero.
    Nearest,
}

impl Rounding {
    /// Apply this rounding policy to a value.
    #[must_use]
    pub fn apply(self, value: Fixed) -> Fixed {
        match self {
            Self::None => value,
            Self::Floor => value.floor(),
            Self::Ceil => value.ceil(),
            Self::Nearest => value.round(),
        }
    }

    /// Short label used in factor descriptions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "exact",
            Self::Floor => "round down",
            Self::Ceil => "round up",
            Self::Nearest => "round nearest",
        }
    }
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> Fixed {
    Fixed::from_num(n)
}

/// Create a fixed-point number from a ratio of two integers.
///
/// Used for constants such as `0.25` kg without touching floats.
#[must_use]
pub fn ratio(numerator: i32, denominator: i32) -> Fixed {
    Fixed::from_num(numerator) / Fixed::from_num(denominator)
}

/// Apply a percentage change to a value with an explicit rounding policy.
///
/// Computes `value * (100 + percent) / 100` and rounds the result. A
/// percent of `30` on `10` yields `13`; `-30` yields `7`.
#[must_use]
pub fn apply_percentage(value: Fixed, percent: Fixed, rounding: Rounding) -> Fixed {
    let hundred = fixed(100);
    rounding.apply(value * (hundred + percent) / hundred)
}

/// The portion `percent%` of a value, with an explicit rounding policy.
#[must_use]
pub fn percentage_of(value: Fixed, percent: Fixed, rounding: Rounding) -> Fixed {
    rounding.apply(value * percent / fixed(100))
}

/// Number of levels a percentage offset spans.
///
/// Offsets are bought in fixed-size levels and any partial level counts as a
/// whole one: `ceil(|offset| / level_size)`. A zero level size yields zero.
#[must_use]
pub fn level_count(offset_percent: i32, level_size: i32) -> u32 {
    if level_size <= 0 {
        return 0;
    }
    offset_percent.unsigned_abs().div_ceil(level_size.unsigned_abs())
}

/// Format a scalar for manifests and notes.
///
/// Integers print bare, anything else prints with two decimals. The output
/// depends only on the bits of the value, so manifests stay byte-identical.
#[must_use]
pub fn format_scalar(value: Fixed) -> String {
    if value.frac() == Fixed::ZERO {
        return format!("{}", value.to_num::<i64>());
    }
    let hundredths = (value * fixed(100)).round().to_num::<i64>();
    let sign = if hundredths < 0 { "-" } else { "" };
    let magnitude = hundredths.unsigned_abs();
    format!("{sign}{}.{:02}", magnitude / 100, magnitude % 100)
}

/// Format a signed delta (`+5`, `-2.50`).
#[must_use]
pub fn format_delta(value: Fixed) -> String {
    if value >= Fixed::ZERO {
        format!("+{}", format_scalar(value))
    } else {
        format_scalar(value)
    }
}
