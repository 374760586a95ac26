//! Pure transformations from one attribute value to another.

use crate::math::{apply_percentage, format_delta, format_scalar, Fixed, Rounding};

use super::attribute::{AttributeValue, DiceRoll, ScalarValue};

/// What to do when a modifier targets an attribute that is not set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsentPolicy {
    /// Skip the factor silently.
    Skip,
    /// Treat as a construction-invariant violation.
    Error,
}

/// A pure function from an existing attribute value to a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// Add a constant. On a dice roll the constant part is adjusted.
    Constant(Fixed),
    /// Add `percent%` of the current value, then round.
    Percentage {
        /// Percentage offset (may be negative).
        percent: Fixed,
        /// Rounding applied to the result.
        rounding: Rounding,
    },
    /// Multiply the current value, then round.
    Multiply {
        /// Multiplier.
        factor: Fixed,
        /// Rounding applied to the result.
        rounding: Rounding,
    },
    /// Add dice to a dice roll.
    DiceCount(i32),
}

impl Modifier {
    /// Percentage modifier with explicit rounding.
    #[must_use]
    pub fn percentage(percent: i32, rounding: Rounding) -> Self {
        Self::Percentage {
            percent: Fixed::from_num(percent),
            rounding,
        }
    }

    /// Unrounded multiplier.
    #[must_use]
    pub fn multiply(factor: Fixed) -> Self {
        Self::Multiply {
            factor,
            rounding: Rounding::None,
        }
    }

    /// Policy for an absent target attribute.
    ///
    /// Relative modifiers have nothing to scale and are skipped; absolute
    /// ones mean a component definition expected a value that never arrived.
    #[must_use]
    pub const fn absent_policy(&self) -> AbsentPolicy {
        match self {
            Self::Percentage { .. } | Self::Multiply { .. } => AbsentPolicy::Skip,
            Self::Constant(_) | Self::DiceCount(_) => AbsentPolicy::Error,
        }
    }

    /// Apply the modifier.
    ///
    /// Returns the new value, or the tag name of the value when the modifier
    /// cannot operate on it.
    pub fn apply(&self, value: &AttributeValue) -> Result<AttributeValue, &'static str> {
        let label = self.describe();
        match (self, value) {
            (Self::Constant(amount), AttributeValue::Scalar(s)) => Ok(AttributeValue::Scalar(
                ScalarValue::new(s.value + *amount, format!("{} {label}", s.label)),
            )),
            (Self::Constant(amount), AttributeValue::DiceRoll(d)) => {
                Ok(AttributeValue::DiceRoll(DiceRoll {
                    constant: d.constant + *amount,
                    label: format!("{} {label}", d.label),
                    ..d.clone()
                }))
            }
            (Self::Percentage { percent, rounding }, AttributeValue::Scalar(s)) => {
                Ok(AttributeValue::Scalar(ScalarValue::new(
                    apply_percentage(s.value, *percent, *rounding),
                    format!("{} {label}", s.label),
                )))
            }
            (Self::Multiply { factor, rounding }, AttributeValue::Scalar(s)) => {
                Ok(AttributeValue::Scalar(ScalarValue::new(
                    rounding.apply(s.value * *factor),
                    format!("{} {label}", s.label),
                )))
            }
            (Self::DiceCount(dice), AttributeValue::DiceRoll(d)) => {
                Ok(AttributeValue::DiceRoll(DiceRoll {
                    count: (d.count + dice).max(0),
                    label: format!("{} {label}", d.label),
                    ..d.clone()
                }))
            }
            (_, other) => Err(other.kind_name()),
        }
    }

    /// Human-readable description (`+3`, `+30% (round down)`, `x2`, `+1D`).
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Constant(amount) => format_delta(*amount),
            Self::Percentage { percent, rounding } => match rounding {
                Rounding::None => format!("{}%", format_delta(*percent)),
                _ => format!("{}% ({})", format_delta(*percent), rounding.label()),
            },
            Self::Multiply { factor, rounding } => match rounding {
                Rounding::None => format!("x{}", format_scalar(*factor)),
                _ => format!("x{} ({})", format_scalar(*factor), rounding.label()),
            },
            Self::DiceCount(dice) if *dice >= 0 => format!("+{dice}D"),
            Self::DiceCount(dice) => format!("{dice}D"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{fixed, ratio};

    #[test]
    fn test_constant_on_scalar() {
        let value = AttributeValue::scalar(fixed(10), "Range");
        let result = Modifier::Constant(fixed(5)).apply(&value).unwrap();
        assert_eq!(result.as_scalar(), Some(fixed(15)));
    }

    #[test]
    fn test_constant_on_dice_adjusts_constant() {
        let value = AttributeValue::DiceRoll(DiceRoll::d6(3, "Damage"));
        let result = Modifier::Constant(fixed(-1)).apply(&value).unwrap();
        assert_eq!(result.to_string(), "3D-1");
    }

    #[test]
    fn test_percentage_rounding_is_explicit() {
        let value = AttributeValue::scalar(fixed(7), "Capacity");
        let floor = Modifier::percentage(30, Rounding::Floor).apply(&value).unwrap();
        let ceil = Modifier::percentage(30, Rounding::Ceil).apply(&value).unwrap();
        let exact = Modifier::percentage(30, Rounding::None).apply(&value).unwrap();
        assert_eq!(floor.as_scalar(), Some(fixed(9)));
        assert_eq!(ceil.as_scalar(), Some(fixed(10)));
        assert!(exact.as_scalar().unwrap() > fixed(9));
    }

    #[test]
    fn test_multiply() {
        let value = AttributeValue::scalar(fixed(4), "Weight");
        let result = Modifier::multiply(ratio(3, 2)).apply(&value).unwrap();
        assert_eq!(result.as_scalar(), Some(fixed(6)));
    }

    #[test]
    fn test_dice_count_never_negative() {
        let value = AttributeValue::DiceRoll(DiceRoll::d6(1, "Damage"));
        let result = Modifier::DiceCount(-3).apply(&value).unwrap();
        assert_eq!(result.as_dice().unwrap().count, 0);
    }

    #[test]
    fn test_type_mismatch_reports_tag() {
        let dice = AttributeValue::DiceRoll(DiceRoll::d6(3, "Damage"));
        assert_eq!(
            Modifier::percentage(10, Rounding::Floor).apply(&dice),
            Err("a dice roll")
        );

        let scalar = AttributeValue::scalar(fixed(3), "Auto");
        assert_eq!(Modifier::DiceCount(1).apply(&scalar), Err("a scalar"));

        let flag = AttributeValue::flag("Slow");
        assert_eq!(Modifier::Constant(fixed(1)).apply(&flag), Err("an enum flag"));
    }

    #[test]
    fn test_absent_policy() {
        assert_eq!(
            Modifier::percentage(10, Rounding::Floor).absent_policy(),
            AbsentPolicy::Skip
        );
        assert_eq!(Modifier::Constant(fixed(1)).absent_policy(), AbsentPolicy::Error);
    }

    #[test]
    fn test_describe() {
        assert_eq!(Modifier::Constant(fixed(3)).describe(), "+3");
        assert_eq!(
            Modifier::percentage(30, Rounding::Floor).describe(),
            "+30% (round down)"
        );
        assert_eq!(Modifier::percentage(-10, Rounding::None).describe(), "-10%");
        assert_eq!(Modifier::multiply(fixed(2)).describe(), "x2");
        assert_eq!(Modifier::DiceCount(2).describe(), "+2D");
    }
}
