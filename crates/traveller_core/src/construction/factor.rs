//! Factors: units of effect on the shared attribute map.

use crate::error::{ConstructionError, Result};

use super::attribute::{AttributeKey, AttributeMap, AttributeValue};
use super::modifier::{AbsentPolicy, Modifier};

/// A unit of effect on a sequence's attribute map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Factor<A: AttributeKey> {
    /// Overwrite or insert an attribute unconditionally.
    Set {
        /// Target attribute.
        attribute: A,
        /// New value.
        value: AttributeValue,
    },
    /// Replace an attribute with the result of a modifier.
    Modify {
        /// Target attribute.
        attribute: A,
        /// Modifier to apply to the current value.
        modifier: Modifier,
    },
    /// Computed for display only, never written to the map.
    NonModifying(Box<Factor<A>>),
}

impl<A: AttributeKey> Factor<A> {
    /// Set factor.
    #[must_use]
    pub fn set(attribute: A, value: AttributeValue) -> Self {
        Self::Set { attribute, value }
    }

    /// Modify factor.
    #[must_use]
    pub fn modify(attribute: A, modifier: Modifier) -> Self {
        Self::Modify {
            attribute,
            modifier,
        }
    }

    /// Wrap this factor so it is projected but never applied.
    #[must_use]
    pub fn non_modifying(self) -> Self {
        match self {
            Self::NonModifying(_) => self,
            other => Self::NonModifying(Box::new(other)),
        }
    }

    /// The attribute this factor targets.
    #[must_use]
    pub fn attribute(&self) -> A {
        match self {
            Self::Set { attribute, .. } | Self::Modify { attribute, .. } => *attribute,
            Self::NonModifying(inner) => inner.attribute(),
        }
    }

    /// Check if applying this factor can change the map.
    #[must_use]
    pub fn is_modifying(&self) -> bool {
        !matches!(self, Self::NonModifying(_))
    }
}

/// Outcome of applying one factor, kept in the step log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactorOutcome {
    /// The map now holds this value.
    Applied(AttributeValue),
    /// Skipped because the attribute was absent and the policy allows it.
    Skipped,
    /// Display-only projection. `None` when nothing could be projected.
    Projected(Option<AttributeValue>),
}

/// Compute the value a factor would produce, without touching the map.
fn evaluate<A: AttributeKey>(
    map: &AttributeMap<A>,
    factor: &Factor<A>,
) -> Result<Option<AttributeValue>> {
    match factor {
        Factor::Set { value, .. } => Ok(Some(value.clone())),
        Factor::Modify {
            attribute,
            modifier,
        } => match map.get(*attribute) {
            Some(current) => modifier.apply(current).map(Some).map_err(|found| {
                ConstructionError::AttributeTypeMismatch {
                    attribute: attribute.to_string(),
                    found,
                    modifier: modifier.describe(),
                }
            }),
            None => match modifier.absent_policy() {
                AbsentPolicy::Skip => Ok(None),
                AbsentPolicy::Error => Err(ConstructionError::MissingAttribute {
                    attribute: attribute.to_string(),
                    modifier: modifier.describe(),
                }),
            },
        },
        Factor::NonModifying(inner) => evaluate(map, inner),
    }
}

/// Apply a factor to an attribute map.
///
/// Set factors overwrite unconditionally. Modify factors read the current
/// value and store the modifier's result; an absent attribute is skipped or
/// rejected according to the modifier's [`AbsentPolicy`]. Non-modifying
/// factors are evaluated for display and leave the map untouched. A
/// projection on an absent attribute never fails.
pub fn apply_factor<A: AttributeKey>(
    map: &mut AttributeMap<A>,
    factor: &Factor<A>,
) -> Result<FactorOutcome> {
    if let Factor::NonModifying(inner) = factor {
        return match evaluate(map, inner) {
            Ok(projected) => Ok(FactorOutcome::Projected(projected)),
            Err(ConstructionError::MissingAttribute { .. }) => Ok(FactorOutcome::Projected(None)),
            Err(err) => Err(err),
        };
    }

    match evaluate(map, factor)? {
        Some(value) => {
            map.set(factor.attribute(), value.clone());
            Ok(FactorOutcome::Applied(value))
        }
        None => Ok(FactorOutcome::Skipped),
    }
}

/// Describe a factor and its outcome for manifests.
#[must_use]
pub fn describe_factor<A: AttributeKey>(factor: &Factor<A>, outcome: &FactorOutcome) -> String {
    match (factor, outcome) {
        (Factor::Set { attribute, value }, _) => format!("{attribute} = {value}"),
        (
            Factor::Modify {
                attribute,
                modifier,
            },
            FactorOutcome::Applied(value),
        ) => format!("{attribute} {} -> {value}", modifier.describe()),
        (
            Factor::Modify {
                attribute,
                modifier,
            },
            _,
        ) => format!("{attribute} {} (not set, skipped)", modifier.describe()),
        (Factor::NonModifying(inner), FactorOutcome::Projected(Some(value))) => {
            format!("{} would become {value} (not applied)", inner.attribute())
        }
        (Factor::NonModifying(inner), _) => {
            format!("{} unchanged (not applied)", inner.attribute())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::attribute::DiceRoll;
    use crate::math::{fixed, Rounding};
    use serde::{Deserialize, Serialize};
    use std::fmt;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    enum TestAttribute {
        Capacity,
        Damage,
    }

    impl fmt::Display for TestAttribute {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            fmt::Debug::fmt(self, f)
        }
    }

    #[test]
    fn test_set_overwrites() {
        let mut map = AttributeMap::new();
        let factor = Factor::set(
            TestAttribute::Capacity,
            AttributeValue::scalar(fixed(10), "base"),
        );
        apply_factor(&mut map, &factor).unwrap();
        let factor = Factor::set(
            TestAttribute::Capacity,
            AttributeValue::scalar(fixed(1), "single shot"),
        );
        apply_factor(&mut map, &factor).unwrap();
        assert_eq!(map.scalar(TestAttribute::Capacity), Some(fixed(1)));
    }

    #[test]
    fn test_modify_absent_percentage_is_skipped() {
        let mut map: AttributeMap<TestAttribute> = AttributeMap::new();
        let factor = Factor::modify(
            TestAttribute::Capacity,
            Modifier::percentage(30, Rounding::Floor),
        );
        let outcome = apply_factor(&mut map, &factor).unwrap();
        assert_eq!(outcome, FactorOutcome::Skipped);
        assert!(map.is_empty());
    }

    #[test]
    fn test_modify_absent_constant_is_error() {
        let mut map: AttributeMap<TestAttribute> = AttributeMap::new();
        let factor = Factor::modify(TestAttribute::Capacity, Modifier::Constant(fixed(2)));
        let err = apply_factor(&mut map, &factor).unwrap_err();
        assert!(matches!(err, ConstructionError::MissingAttribute { .. }));
    }

    #[test]
    fn test_modify_wrong_tag_is_error() {
        let mut map = AttributeMap::new();
        map.set(
            TestAttribute::Damage,
            AttributeValue::DiceRoll(DiceRoll::d6(3, "base")),
        );
        let factor = Factor::modify(
            TestAttribute::Damage,
            Modifier::percentage(10, Rounding::Floor),
        );
        let err = apply_factor(&mut map, &factor).unwrap_err();
        assert!(matches!(err, ConstructionError::AttributeTypeMismatch { .. }));
    }

    #[test]
    fn test_non_modifying_never_writes() {
        let mut map = AttributeMap::new();
        map.set(
            TestAttribute::Damage,
            AttributeValue::DiceRoll(DiceRoll::d6(3, "base")),
        );
        let before = map.clone();

        let factor =
            Factor::modify(TestAttribute::Damage, Modifier::DiceCount(1)).non_modifying();
        let outcome = apply_factor(&mut map, &factor).unwrap();

        assert_eq!(map, before);
        match &outcome {
            FactorOutcome::Projected(Some(value)) => assert_eq!(value.to_string(), "4D"),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(
            describe_factor(&factor, &outcome),
            "Damage would become 4D (not applied)"
        );
    }

    #[test]
    fn test_non_modifying_on_absent_projects_nothing() {
        let mut map: AttributeMap<TestAttribute> = AttributeMap::new();
        let factor =
            Factor::modify(TestAttribute::Damage, Modifier::DiceCount(1)).non_modifying();
        let outcome = apply_factor(&mut map, &factor).unwrap();
        assert_eq!(outcome, FactorOutcome::Projected(None));
    }
}
