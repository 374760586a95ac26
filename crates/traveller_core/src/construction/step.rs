//! Steps: the atomic contribution of one component within one stage.
//!
//! Steps are created fresh on every regeneration and never patched. Once
//! applied they are recorded in the context's log as [`AppliedStep`]s.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, format_delta, format_scalar, percentage_of, Fixed, Rounding};

use super::attribute::AttributeKey;
use super::component::ComponentRef;
use super::factor::Factor;
use super::ConstructionDomain;

/// A running total tracked per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CostKind {
    /// Purchase price in credits.
    Credits,
    /// Weight in kilograms.
    Weight,
    /// Robot slots used.
    Slots,
    /// Robot brain bandwidth used.
    Bandwidth,
}

impl CostKind {
    /// All cost kinds in reporting order.
    pub const ALL: [Self; 4] = [Self::Credits, Self::Weight, Self::Slots, Self::Bandwidth];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Credits => "Credits",
            Self::Weight => "Weight",
            Self::Slots => "Slots",
            Self::Bandwidth => "Bandwidth",
        }
    }
}

impl fmt::Display for CostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a step changes one running phase total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostModifier {
    /// Add a constant.
    Constant(Fixed),
    /// Add `percent%` of the phase's current running total.
    Percentage {
        /// Percentage of the running total (may be negative).
        percent: Fixed,
        /// Rounding applied to the added portion.
        rounding: Rounding,
    },
    /// Multiply the phase's running total.
    Multiply(Fixed),
}

impl CostModifier {
    /// Unrounded percentage of the running total.
    #[must_use]
    pub fn percentage(percent: i32) -> Self {
        Self::Percentage {
            percent: Fixed::from_num(percent),
            rounding: Rounding::None,
        }
    }

    /// The amount this modifier adds to a running total.
    #[must_use]
    pub fn delta(&self, running: Fixed) -> Fixed {
        match self {
            Self::Constant(amount) => *amount,
            Self::Percentage { percent, rounding } => percentage_of(running, *percent, *rounding),
            Self::Multiply(factor) => running * *factor - running,
        }
    }
}

/// Credits, weight, slots and bandwidth accumulated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct CostTotals {
    /// Credits.
    #[serde(with = "fixed_serde")]
    pub credits: Fixed,
    /// Weight in kilograms.
    #[serde(with = "fixed_serde")]
    pub weight: Fixed,
    /// Slots.
    #[serde(with = "fixed_serde")]
    pub slots: Fixed,
    /// Bandwidth.
    #[serde(with = "fixed_serde")]
    pub bandwidth: Fixed,
}

impl CostTotals {
    /// All-zero totals.
    pub const ZERO: Self = Self {
        credits: Fixed::ZERO,
        weight: Fixed::ZERO,
        slots: Fixed::ZERO,
        bandwidth: Fixed::ZERO,
    };

    /// Get one total.
    #[must_use]
    pub const fn get(&self, kind: CostKind) -> Fixed {
        match kind {
            CostKind::Credits => self.credits,
            CostKind::Weight => self.weight,
            CostKind::Slots => self.slots,
            CostKind::Bandwidth => self.bandwidth,
        }
    }

    /// Add to one total.
    pub fn add(&mut self, kind: CostKind, amount: Fixed) {
        match kind {
            CostKind::Credits => self.credits += amount,
            CostKind::Weight => self.weight += amount,
            CostKind::Slots => self.slots += amount,
            CostKind::Bandwidth => self.bandwidth += amount,
        }
    }

    /// Sum two sets of totals.
    #[must_use]
    pub fn combined(mut self, other: &Self) -> Self {
        for kind in CostKind::ALL {
            self.add(kind, other.get(kind));
        }
        self
    }
}

impl fmt::Display for CostTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cr{} / {}kg / {} slots / {} bandwidth",
            format_scalar(self.credits),
            format_scalar(self.weight),
            format_scalar(self.slots),
            format_scalar(self.bandwidth)
        )
    }
}

/// One contribution of a component, before it is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<A: AttributeKey> {
    /// Label shown in the manifest.
    pub name: String,
    /// Running-total modifiers.
    pub costs: BTreeMap<CostKind, CostModifier>,
    /// Attribute effects in application order.
    pub factors: Vec<Factor<A>>,
    /// Free-text notes.
    pub notes: Vec<String>,
}

impl<A: AttributeKey> Step<A> {
    /// Create an empty step.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            costs: BTreeMap::new(),
            factors: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Set a cost modifier (builder pattern).
    #[must_use]
    pub fn with_cost(mut self, kind: CostKind, modifier: CostModifier) -> Self {
        self.costs.insert(kind, modifier);
        self
    }

    /// Set the credits modifier (builder pattern).
    #[must_use]
    pub fn with_credits(self, modifier: CostModifier) -> Self {
        self.with_cost(CostKind::Credits, modifier)
    }

    /// Set the weight modifier (builder pattern).
    #[must_use]
    pub fn with_weight(self, modifier: CostModifier) -> Self {
        self.with_cost(CostKind::Weight, modifier)
    }

    /// Set the slots modifier (builder pattern).
    #[must_use]
    pub fn with_slots(self, modifier: CostModifier) -> Self {
        self.with_cost(CostKind::Slots, modifier)
    }

    /// Set the bandwidth modifier (builder pattern).
    #[must_use]
    pub fn with_bandwidth(self, modifier: CostModifier) -> Self {
        self.with_cost(CostKind::Bandwidth, modifier)
    }

    /// Append a factor (builder pattern).
    #[must_use]
    pub fn with_factor(mut self, factor: Factor<A>) -> Self {
        self.factors.push(factor);
        self
    }

    /// Append a note (builder pattern).
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Append a factor.
    pub fn add_factor(&mut self, factor: Factor<A>) {
        self.factors.push(factor);
    }

    /// Append a note.
    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

/// A step after it has been applied, as recorded in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedStep<D: ConstructionDomain> {
    /// Component that produced the step.
    pub component: ComponentRef<D>,
    /// Display name of that component.
    pub component_name: String,
    /// Phase the step was accounted in.
    pub phase: D::Phase,
    /// Step label.
    pub name: String,
    /// Change to each running total, in cost kind order.
    pub cost_deltas: BTreeMap<CostKind, Fixed>,
    /// Descriptions of the factors and their outcomes.
    pub factors: Vec<String>,
    /// Free-text notes.
    pub notes: Vec<String>,
}

impl<D: ConstructionDomain> AppliedStep<D> {
    /// Change applied to one running total.
    #[must_use]
    pub fn delta(&self, kind: CostKind) -> Fixed {
        self.cost_deltas.get(&kind).copied().unwrap_or(Fixed::ZERO)
    }

    /// Short `Credits +300, Weight +2.50` summary of non-zero deltas.
    #[must_use]
    pub fn cost_summary(&self) -> String {
        self.cost_deltas
            .iter()
            .filter(|(_, delta)| **delta != Fixed::ZERO)
            .map(|(kind, delta)| format!("{kind} {}", format_delta(*delta)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{fixed, ratio};

    #[test]
    fn test_cost_modifier_delta() {
        assert_eq!(CostModifier::Constant(fixed(50)).delta(fixed(200)), fixed(50));
        assert_eq!(CostModifier::percentage(25).delta(fixed(200)), fixed(50));
        assert_eq!(CostModifier::percentage(-50).delta(fixed(200)), fixed(-100));
        assert_eq!(CostModifier::Multiply(fixed(3)).delta(fixed(200)), fixed(400));
        assert_eq!(
            CostModifier::Multiply(ratio(1, 2)).delta(fixed(200)),
            fixed(-100)
        );
    }

    #[test]
    fn test_cost_totals_combined() {
        let mut a = CostTotals::ZERO;
        a.add(CostKind::Credits, fixed(100));
        a.add(CostKind::Slots, fixed(2));
        let mut b = CostTotals::ZERO;
        b.add(CostKind::Credits, fixed(50));
        b.add(CostKind::Weight, ratio(1, 2));

        let total = a.combined(&b);
        assert_eq!(total.credits, fixed(150));
        assert_eq!(total.weight, ratio(1, 2));
        assert_eq!(total.slots, fixed(2));
        assert_eq!(total.to_string(), "Cr150 / 0.50kg / 2 slots / 0 bandwidth");
    }
}
