//! Slot options.
//!
//! Slot options consume chassis slots. None of them checks free capacity;
//! an overrun is reported by finalisation instead of being refused here.

use serde::{Deserialize, Serialize};

use crate::construction::option::{expect_integer, unknown_option};
use crate::construction::{
    AttributeValue, BoundedInt, BuildCursor, BuildView, Component, ComponentOption, CostModifier,
    Factor, OptionValue, Step,
};
use crate::error::Result;
use crate::math::{fixed, Fixed};

use super::{is_mobile, RobotAttribute, RobotComponent, RobotStage, Robots};

/// Better self-maintenance; removes the routine maintenance requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImprovedMaintenance;

impl Component<Robots> for ImprovedMaintenance {
    fn stage(&self) -> RobotStage {
        RobotStage::SlotOptions
    }

    fn type_name(&self) -> &'static str {
        "Improved Maintenance"
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Robots>) -> bool {
        !context.has_component_before(sequence, |c| {
            matches!(c, RobotComponent::ImprovedMaintenance(_))
        })
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Robots>) -> Result<()> {
        let step = Step::new("Improved Maintenance")
            .with_credits(CostModifier::Constant(fixed(500)))
            .with_slots(CostModifier::Constant(fixed(1)));
        context.apply_step(step)
    }
}

const fn max_stealth_grade(tech_level: u32) -> i32 {
    match tech_level {
        ..=11 => 1,
        12..=13 => 2,
        _ => 3,
    }
}

/// Coating that defeats sensors. Grade is limited by tech level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StealthCoating {
    /// Stealth grade.
    pub grade: BoundedInt,
}

impl Default for StealthCoating {
    fn default() -> Self {
        Self::new(1)
    }
}

impl StealthCoating {
    /// Create a coating of `grade`.
    #[must_use]
    pub fn new(grade: i32) -> Self {
        Self {
            grade: BoundedInt::ranged(grade, 1, 3),
        }
    }
}

impl Component<Robots> for StealthCoating {
    fn stage(&self) -> RobotStage {
        RobotStage::SlotOptions
    }

    fn type_name(&self) -> &'static str {
        "Stealth Coating"
    }

    fn instance_name(&self) -> String {
        format!("Stealth Coating (Grade {})", self.grade.value())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Robots>) -> bool {
        context.tech_level() >= 10
            && context.has_attribute(sequence, RobotAttribute::Size)
            && !context.has_component_before(sequence, |c| {
                matches!(c, RobotComponent::StealthCoating(_))
            })
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::integer("grade", "Grade", &self.grade)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "grade" => self.grade.set(id, expect_integer(id, value)?),
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn update_options(&mut self, _sequence: usize, context: &BuildView<'_, Robots>) {
        self.grade.constrain(1, max_stealth_grade(context.tech_level()));
    }

    fn create_steps(&self, sequence: usize, context: &mut BuildCursor<'_, Robots>) -> Result<()> {
        let grade = self.grade.value();
        let size = context
            .view()
            .scalar(sequence, RobotAttribute::Size)
            .unwrap_or(Fixed::ZERO);
        let step = Step::new(self.instance_name())
            .with_credits(CostModifier::Constant(size * fixed(300 * grade)))
            .with_slots(CostModifier::Constant(fixed(grade)))
            .with_factor(Factor::set(
                RobotAttribute::Stealth,
                AttributeValue::scalar(fixed(grade), "Stealth coating"),
            ));
        context.apply_step(step)
    }
}

const fn max_autopilot_rating(tech_level: u32) -> i32 {
    match tech_level {
        ..=8 => 1,
        9..=10 => 2,
        _ => 3,
    }
}

/// Vehicle autopilot for robots that move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Autopilot {
    /// Autopilot rating.
    pub rating: BoundedInt,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Autopilot {
    /// Create an autopilot of `rating`.
    #[must_use]
    pub fn new(rating: i32) -> Self {
        Self {
            rating: BoundedInt::ranged(rating, 1, 3),
        }
    }
}

impl Component<Robots> for Autopilot {
    fn stage(&self) -> RobotStage {
        RobotStage::SlotOptions
    }

    fn type_name(&self) -> &'static str {
        "Autopilot"
    }

    fn instance_name(&self) -> String {
        format!("Autopilot {}", self.rating.value())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Robots>) -> bool {
        context.tech_level() >= 7
            && is_mobile(context, sequence)
            && !context.has_component_before(sequence, |c| matches!(c, RobotComponent::Autopilot(_)))
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::integer("rating", "Rating", &self.rating)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "rating" => self.rating.set(id, expect_integer(id, value)?),
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn update_options(&mut self, _sequence: usize, context: &BuildView<'_, Robots>) {
        self.rating
            .constrain(1, max_autopilot_rating(context.tech_level()));
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Robots>) -> Result<()> {
        let rating = self.rating.value();
        let step = Step::new(self.instance_name())
            .with_credits(CostModifier::Constant(fixed(7500 << (rating - 1))))
            .with_factor(Factor::set(
                RobotAttribute::Autopilot,
                AttributeValue::scalar(fixed(rating), "Autopilot"),
            ));
        context.apply_step(step)
    }
}

/// Internal cargo space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageCompartment {
    /// Slots given over to storage.
    pub slots: BoundedInt,
}

impl Default for StorageCompartment {
    fn default() -> Self {
        Self::new(1)
    }
}

impl StorageCompartment {
    /// Create a compartment of `slots`.
    #[must_use]
    pub fn new(slots: i32) -> Self {
        Self {
            slots: BoundedInt::ranged(slots, 1, 100),
        }
    }
}

impl Component<Robots> for StorageCompartment {
    fn stage(&self) -> RobotStage {
        RobotStage::SlotOptions
    }

    fn type_name(&self) -> &'static str {
        "Storage Compartment"
    }

    fn instance_name(&self) -> String {
        format!("Storage Compartment ({} slots)", self.slots.value())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Robots>) -> bool {
        context.has_attribute(sequence, RobotAttribute::MaxSlots)
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::integer("slots", "Slots", &self.slots)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "slots" => self.slots.set(id, expect_integer(id, value)?),
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn update_options(&mut self, _sequence: usize, _context: &BuildView<'_, Robots>) {
        self.slots.constrain(1, 100);
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Robots>) -> Result<()> {
        let slots = self.slots.value();
        let step = Step::new(self.instance_name())
            .with_credits(CostModifier::Constant(fixed(50 * slots)))
            .with_slots(CostModifier::Constant(fixed(slots)));
        context.apply_step(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_limits_follow_tech_level() {
        assert_eq!(max_stealth_grade(10), 1);
        assert_eq!(max_stealth_grade(13), 2);
        assert_eq!(max_stealth_grade(15), 3);
        assert_eq!(max_autopilot_rating(8), 1);
        assert_eq!(max_autopilot_rating(12), 3);
    }
}
