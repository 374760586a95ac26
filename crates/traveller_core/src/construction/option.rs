//! Editable component options and their bounds.
//!
//! Option bounds may depend on other components, so components recompute
//! them every regeneration. Values are clamped into the new bounds rather
//! than rejected.

use serde::{Deserialize, Serialize};

use crate::error::{ConstructionError, Result};

/// A fixed list of labelled choices an option can take.
pub trait OptionChoice: Copy + Eq + 'static {
    /// Every choice, in display order.
    const ALL: &'static [Self];

    /// Display label, also used as the option value.
    fn label(self) -> &'static str;

    /// Parse a label back into a choice.
    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }

    /// Labels of every choice.
    fn labels() -> Vec<String> {
        Self::ALL.iter().map(|c| c.label().to_string()).collect()
    }
}

/// A value supplied for an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionValue {
    /// Whole number.
    Integer(i32),
    /// On/off switch.
    Boolean(bool),
    /// One of a set of labels.
    Choice(String),
}

/// The range of values an option accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionBounds {
    /// Inclusive integer range.
    Integer {
        /// Minimum value.
        min: i32,
        /// Maximum value.
        max: i32,
    },
    /// Any boolean.
    Boolean,
    /// One of these labels.
    Choice(Vec<String>),
}

/// An option exposed to collaborators for editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentOption {
    /// Stable identifier used by `set_option`.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Current value.
    pub value: OptionValue,
    /// Accepted values.
    pub bounds: OptionBounds,
}

impl ComponentOption {
    /// Integer option.
    #[must_use]
    pub fn integer(id: &'static str, name: &'static str, value: &BoundedInt) -> Self {
        let (min, max) = value.bounds();
        Self {
            id,
            name,
            value: OptionValue::Integer(value.value()),
            bounds: OptionBounds::Integer { min, max },
        }
    }

    /// Boolean option.
    #[must_use]
    pub fn boolean(id: &'static str, name: &'static str, value: bool) -> Self {
        Self {
            id,
            name,
            value: OptionValue::Boolean(value),
            bounds: OptionBounds::Boolean,
        }
    }

    /// Choice option.
    #[must_use]
    pub fn choice<T: OptionChoice>(id: &'static str, name: &'static str, value: T) -> Self {
        Self {
            id,
            name,
            value: OptionValue::Choice(value.label().to_string()),
            bounds: OptionBounds::Choice(T::labels()),
        }
    }
}

/// An integer option value with bounds that can be narrowed at runtime.
///
/// Only the value is persisted. The runtime bounds are recomputed by the
/// owning component on every regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundedInt {
    value: i32,
    #[serde(skip)]
    limits: Option<(i32, i32)>,
}

impl BoundedInt {
    /// Create an unconstrained value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self {
            value,
            limits: None,
        }
    }

    /// Create a value constrained to a range.
    #[must_use]
    pub fn ranged(value: i32, min: i32, max: i32) -> Self {
        let mut bounded = Self::new(value);
        bounded.constrain(min, max);
        bounded
    }

    /// Current value.
    #[must_use]
    pub const fn value(&self) -> i32 {
        self.value
    }

    /// Current bounds. Unconstrained values report their own value.
    #[must_use]
    pub const fn bounds(&self) -> (i32, i32) {
        match self.limits {
            Some(limits) => limits,
            None => (self.value, self.value),
        }
    }

    /// Narrow the bounds and clamp the value into them.
    ///
    /// An inverted range collapses to its minimum.
    pub fn constrain(&mut self, min: i32, max: i32) {
        let max = max.max(min);
        self.limits = Some((min, max));
        self.value = self.value.clamp(min, max);
    }

    /// Set a new value, rejecting it if outside the bounds.
    pub fn set(&mut self, option: &str, value: i32) -> Result<()> {
        let (min, max) = self.bounds();
        if self.limits.is_some() && !(min..=max).contains(&value) {
            return Err(ConstructionError::InvalidOptionValue {
                option: option.to_string(),
                message: format!("{value} is outside {min}..={max}"),
            });
        }
        self.value = value;
        Ok(())
    }
}

/// Extract an integer from an option value.
pub fn expect_integer(option: &str, value: &OptionValue) -> Result<i32> {
    match value {
        OptionValue::Integer(v) => Ok(*v),
        other => Err(wrong_kind(option, "an integer", other)),
    }
}

/// Extract a boolean from an option value.
pub fn expect_boolean(option: &str, value: &OptionValue) -> Result<bool> {
    match value {
        OptionValue::Boolean(v) => Ok(*v),
        other => Err(wrong_kind(option, "a boolean", other)),
    }
}

/// Extract a choice from an option value.
pub fn expect_choice<T: OptionChoice>(option: &str, value: &OptionValue) -> Result<T> {
    match value {
        OptionValue::Choice(label) => {
            T::from_label(label).ok_or_else(|| ConstructionError::InvalidOptionValue {
                option: option.to_string(),
                message: format!("'{label}' is not one of {:?}", T::labels()),
            })
        }
        other => Err(wrong_kind(option, "a choice", other)),
    }
}

fn wrong_kind(option: &str, expected: &str, found: &OptionValue) -> ConstructionError {
    ConstructionError::InvalidOptionValue {
        option: option.to_string(),
        message: format!("expected {expected}, got {found:?}"),
    }
}

/// Error for an option id the component does not expose.
#[must_use]
pub fn unknown_option(component: &str, option: &str) -> ConstructionError {
    ConstructionError::UnknownOption {
        component: component.to_string(),
        option: option.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Finish {
        Matte,
        Gloss,
    }

    impl OptionChoice for Finish {
        const ALL: &'static [Self] = &[Self::Matte, Self::Gloss];

        fn label(self) -> &'static str {
            match self {
                Self::Matte => "Matte",
                Self::Gloss => "Gloss",
            }
        }
    }

    #[test]
    fn test_bounded_int_clamps_on_constrain() {
        let mut value = BoundedInt::new(80);
        value.constrain(10, 50);
        assert_eq!(value.value(), 50);
        assert_eq!(value.bounds(), (10, 50));

        value.constrain(60, 40);
        assert_eq!(value.bounds(), (60, 60));
        assert_eq!(value.value(), 60);
    }

    #[test]
    fn test_bounded_int_set_respects_bounds() {
        let mut value = BoundedInt::new(20);
        value.constrain(10, 50);
        assert!(value.set("percent", 40).is_ok());
        assert_eq!(value.value(), 40);
        assert!(value.set("percent", 60).is_err());
        assert_eq!(value.value(), 40);
    }

    #[test]
    fn test_bounded_int_persists_value_only() {
        let mut value = BoundedInt::new(30);
        value.constrain(10, 150);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "30");
        let restored: BoundedInt = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.value(), 30);
    }

    #[test]
    fn test_expect_choice() {
        let value = OptionValue::Choice("Gloss".to_string());
        assert_eq!(expect_choice::<Finish>("finish", &value).unwrap(), Finish::Gloss);

        let bad = OptionValue::Choice("Satin".to_string());
        assert!(expect_choice::<Finish>("finish", &bad).is_err());

        let wrong = OptionValue::Integer(1);
        assert!(expect_choice::<Finish>("finish", &wrong).is_err());
    }
}
