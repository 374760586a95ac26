//! Attribute values and the per-sequence attribute map.
//!
//! An attribute value is immutable once built. Modifiers never mutate a
//! stored value, they produce a replacement.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, format_scalar, Fixed};

/// Closed, domain-specific set of attribute keys.
///
/// Implemented automatically for any enum with the required derives. Keys
/// order deterministically so attribute maps iterate the same way every run.
pub trait AttributeKey:
    Copy
    + Eq
    + Ord
    + Hash
    + fmt::Debug
    + fmt::Display
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<T> AttributeKey for T where
    T: Copy
        + Eq
        + Ord
        + Hash
        + fmt::Debug
        + fmt::Display
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

/// A number carrying a human-readable provenance label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScalarValue {
    /// The numeric value.
    #[serde(with = "fixed_serde")]
    pub value: Fixed,
    /// Where the value came from, for explainability.
    pub label: String,
}

impl ScalarValue {
    /// Create a labelled scalar.
    #[must_use]
    pub fn new(value: Fixed, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

/// Die type of a dice roll expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieType {
    /// Three-sided die (a halved D6).
    D3,
    /// Standard six-sided die.
    D6,
}

/// A dice roll expression such as `3D+2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceRoll {
    /// Number of dice.
    pub count: i32,
    /// Die type.
    pub die: DieType,
    /// Constant added to the roll.
    #[serde(with = "fixed_serde")]
    pub constant: Fixed,
    /// Where the expression came from.
    pub label: String,
}

impl DiceRoll {
    /// Create a roll of `count` D6 with no constant.
    #[must_use]
    pub fn d6(count: i32, label: impl Into<String>) -> Self {
        Self {
            count,
            die: DieType::D6,
            constant: Fixed::ZERO,
            label: label.into(),
        }
    }

    /// Set the constant (builder pattern).
    #[must_use]
    pub fn with_constant(mut self, constant: Fixed) -> Self {
        self.constant = constant;
        self
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.die {
            DieType::D6 => write!(f, "{}D", self.count)?,
            DieType::D3 => write!(f, "{}D3", self.count)?,
        }
        if self.constant > Fixed::ZERO {
            write!(f, "+{}", format_scalar(self.constant))?;
        } else if self.constant < Fixed::ZERO {
            write!(f, "{}", format_scalar(self.constant))?;
        }
        Ok(())
    }
}

/// A value stored under an attribute key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeValue {
    /// A labelled number.
    Scalar(ScalarValue),
    /// A dice roll expression.
    DiceRoll(DiceRoll),
    /// A symbolic flag value (e.g. a Flyer speed band).
    Enum(String),
}

impl AttributeValue {
    /// Labelled scalar value.
    #[must_use]
    pub fn scalar(value: Fixed, label: impl Into<String>) -> Self {
        Self::Scalar(ScalarValue::new(value, label))
    }

    /// Symbolic flag value.
    #[must_use]
    pub fn flag(value: impl Into<String>) -> Self {
        Self::Enum(value.into())
    }

    /// The scalar number, if this is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<Fixed> {
        match self {
            Self::Scalar(s) => Some(s.value),
            _ => None,
        }
    }

    /// The dice expression, if this is a dice roll.
    #[must_use]
    pub fn as_dice(&self) -> Option<&DiceRoll> {
        match self {
            Self::DiceRoll(d) => Some(d),
            _ => None,
        }
    }

    /// The flag value, if this is an enum.
    #[must_use]
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Name of the value's tag, used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "a scalar",
            Self::DiceRoll(_) => "a dice roll",
            Self::Enum(_) => "an enum flag",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => f.write_str(&format_scalar(s.value)),
            Self::DiceRoll(d) => d.fmt(f),
            Self::Enum(e) => f.write_str(e),
        }
    }
}

/// Attribute values of one sequence, keyed by the domain's attribute enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMap<A: AttributeKey> {
    values: BTreeMap<A, AttributeValue>,
}

impl<A: AttributeKey> Default for AttributeMap<A> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<A: AttributeKey> AttributeMap<A> {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value.
    #[must_use]
    pub fn get(&self, attribute: A) -> Option<&AttributeValue> {
        self.values.get(&attribute)
    }

    /// Insert or overwrite a value.
    pub fn set(&mut self, attribute: A, value: AttributeValue) {
        self.values.insert(attribute, value);
    }

    /// Remove a value.
    pub fn remove(&mut self, attribute: A) -> Option<AttributeValue> {
        self.values.remove(&attribute)
    }

    /// Check if a value is set.
    #[must_use]
    pub fn contains(&self, attribute: A) -> bool {
        self.values.contains_key(&attribute)
    }

    /// Scalar number stored under a key.
    #[must_use]
    pub fn scalar(&self, attribute: A) -> Option<Fixed> {
        self.get(attribute).and_then(AttributeValue::as_scalar)
    }

    /// Dice expression stored under a key.
    #[must_use]
    pub fn dice(&self, attribute: A) -> Option<&DiceRoll> {
        self.get(attribute).and_then(AttributeValue::as_dice)
    }

    /// Iterate values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (A, &AttributeValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Number of values set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no values are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::fixed;

    #[test]
    fn test_dice_display() {
        assert_eq!(DiceRoll::d6(3, "base").to_string(), "3D");
        assert_eq!(
            DiceRoll::d6(2, "base").with_constant(fixed(2)).to_string(),
            "2D+2"
        );
        assert_eq!(
            DiceRoll::d6(4, "base").with_constant(fixed(-1)).to_string(),
            "4D-1"
        );
    }

    #[test]
    fn test_value_accessors_respect_tag() {
        let scalar = AttributeValue::scalar(fixed(5), "test");
        assert_eq!(scalar.as_scalar(), Some(fixed(5)));
        assert!(scalar.as_dice().is_none());

        let flag = AttributeValue::flag("Slow");
        assert_eq!(flag.as_enum(), Some("Slow"));
        assert_eq!(flag.kind_name(), "an enum flag");
    }
}
