//! Locomotion, movement options and secondary locomotion.

use serde::{Deserialize, Serialize};

use crate::construction::option::{expect_choice, expect_integer, unknown_option};
use crate::construction::{
    AttributeValue, BoundedInt, BuildCursor, BuildView, Component, ComponentOption, CostModifier,
    Factor, Modifier, OptionChoice, OptionValue, Step,
};
use crate::error::Result;
use crate::math::{fixed, level_count, Fixed, Rounding};

use super::{is_mobile, primary_locomotion, RobotAttribute, RobotComponent, RobotStage, Robots};

/// Ground speed in metres per round of every mobile locomotion.
const BASE_SPEED: i32 = 5;

/// How a robot moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LocomotionKind {
    /// Stationary.
    None,
    /// Wheeled.
    #[default]
    Wheels,
    /// Tracked.
    Tracks,
    /// Legged.
    Walker,
    /// Air cushion.
    Hovercraft,
    /// Boat or submersible.
    Aquatic,
    /// Fixed-wing flight.
    Aeroplane,
    /// Rotor or ducted-fan flight.
    Vtol,
    /// Gravitic lifters.
    Grav,
    /// Reaction thrusters for vacuum.
    Thruster,
}

impl OptionChoice for LocomotionKind {
    const ALL: &'static [Self] = &[
        Self::None,
        Self::Wheels,
        Self::Tracks,
        Self::Walker,
        Self::Hovercraft,
        Self::Aquatic,
        Self::Aeroplane,
        Self::Vtol,
        Self::Grav,
        Self::Thruster,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Wheels => "Wheels",
            Self::Tracks => "Tracks",
            Self::Walker => "Walker",
            Self::Hovercraft => "Hovercraft",
            Self::Aquatic => "Aquatic",
            Self::Aeroplane => "Aeroplane",
            Self::Vtol => "VTOL",
            Self::Grav => "Grav",
            Self::Thruster => "Thruster",
        }
    }
}

impl LocomotionKind {
    /// Minimum tech level.
    #[must_use]
    pub const fn tech_level(self) -> u32 {
        match self {
            Self::None | Self::Wheels | Self::Tracks => 5,
            Self::Aquatic | Self::Aeroplane => 6,
            Self::Hovercraft => 7,
            Self::Walker | Self::Vtol => 8,
            Self::Grav => 9,
            Self::Thruster => 10,
        }
    }

    /// Multiplier applied to the chassis cost.
    #[must_use]
    pub const fn cost_multiplier(self) -> i32 {
        match self {
            Self::None => 1,
            Self::Wheels | Self::Tracks => 2,
            Self::Aquatic => 4,
            Self::Walker | Self::Hovercraft => 10,
            Self::Aeroplane => 12,
            Self::Vtol => 14,
            Self::Grav | Self::Thruster => 20,
        }
    }

    /// Base agility DM.
    #[must_use]
    pub const fn agility(self) -> i32 {
        match self {
            Self::Tracks => -1,
            Self::Aquatic => -2,
            Self::Hovercraft | Self::Aeroplane | Self::Grav => 1,
            _ => 0,
        }
    }

    /// Operating hours between recharges.
    #[must_use]
    pub const fn endurance(self) -> i32 {
        match self {
            Self::None => 216,
            Self::Wheels | Self::Tracks | Self::Walker | Self::Aquatic => 72,
            Self::Hovercraft | Self::Vtol | Self::Grav | Self::Thruster => 24,
            Self::Aeroplane => 12,
        }
    }

    /// Movement trait granted, if any.
    #[must_use]
    pub const fn movement_trait(self) -> Option<RobotAttribute> {
        match self {
            Self::None | Self::Wheels => None,
            Self::Tracks | Self::Walker => Some(RobotAttribute::Atv),
            Self::Hovercraft => Some(RobotAttribute::Acv),
            Self::Aquatic => Some(RobotAttribute::Seafarer),
            Self::Aeroplane | Self::Vtol | Self::Grav => Some(RobotAttribute::Flyer),
            Self::Thruster => Some(RobotAttribute::Thruster),
        }
    }

    /// Whether flight depends on an atmosphere.
    #[must_use]
    pub const fn needs_atmosphere(self) -> bool {
        matches!(self, Self::Aeroplane | Self::Vtol)
    }

    const fn speed(self) -> i32 {
        match self {
            Self::None => 0,
            _ => BASE_SPEED,
        }
    }

    fn trait_factor(self, source: &str) -> Option<Factor<RobotAttribute>> {
        let attribute = self.movement_trait()?;
        let value = match attribute {
            RobotAttribute::Flyer if self.needs_atmosphere() => "Atmospheric".to_string(),
            RobotAttribute::Flyer => "Gravitic".to_string(),
            _ => source.to_string(),
        };
        Some(Factor::set(attribute, AttributeValue::flag(value)))
    }
}

/// Primary locomotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Locomotion {
    /// Locomotion type.
    pub kind: LocomotionKind,
}

impl Locomotion {
    /// Create a primary locomotion.
    #[must_use]
    pub const fn new(kind: LocomotionKind) -> Self {
        Self { kind }
    }
}

impl Component<Robots> for Locomotion {
    fn stage(&self) -> RobotStage {
        RobotStage::Locomotion
    }

    fn type_name(&self) -> &'static str {
        "Locomotion"
    }

    fn instance_name(&self) -> String {
        format!("{} Locomotion", self.kind.label())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Robots>) -> bool {
        context.tech_level() >= self.kind.tech_level()
            && context.has_attribute(sequence, RobotAttribute::Size)
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::choice("kind", "Locomotion", self.kind)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "kind" => {
                self.kind = expect_choice(id, value)?;
                Ok(())
            }
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Robots>) -> Result<()> {
        let label = self.kind.label();
        let mut step = Step::new(self.instance_name())
            .with_credits(CostModifier::Multiply(fixed(self.kind.cost_multiplier())))
            .with_factor(Factor::set(RobotAttribute::Locomotion, AttributeValue::flag(label)))
            .with_factor(Factor::set(
                RobotAttribute::Agility,
                AttributeValue::scalar(fixed(self.kind.agility()), label),
            ))
            .with_factor(Factor::set(
                RobotAttribute::Endurance,
                AttributeValue::scalar(fixed(self.kind.endurance()), label),
            ))
            .with_factor(Factor::set(
                RobotAttribute::Speed,
                AttributeValue::scalar(fixed(self.kind.speed()), label),
            ));
        if let Some(factor) = self.kind.trait_factor(label) {
            step.add_factor(factor);
        }
        context.apply_step(step)
    }
}

/// Improved agility, bought in whole levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgilityEnhancement {
    /// Agility DM added.
    pub levels: BoundedInt,
}

impl Default for AgilityEnhancement {
    fn default() -> Self {
        Self::new(1)
    }
}

impl AgilityEnhancement {
    /// Create an enhancement of `levels`.
    #[must_use]
    pub fn new(levels: i32) -> Self {
        Self {
            levels: BoundedInt::ranged(levels, 1, 4),
        }
    }
}

impl Component<Robots> for AgilityEnhancement {
    fn stage(&self) -> RobotStage {
        RobotStage::MovementOptions
    }

    fn type_name(&self) -> &'static str {
        "Agility Enhancement"
    }

    fn instance_name(&self) -> String {
        format!("Agility +{}", self.levels.value())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Robots>) -> bool {
        is_mobile(context, sequence)
            && context.has_attribute(sequence, RobotAttribute::Agility)
            && !context.has_component_before(sequence, |c| {
                matches!(c, RobotComponent::AgilityEnhancement(_))
            })
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::integer("levels", "Levels", &self.levels)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "levels" => self.levels.set(id, expect_integer(id, value)?),
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn update_options(&mut self, _sequence: usize, _context: &BuildView<'_, Robots>) {
        self.levels.constrain(1, 4);
    }

    fn create_steps(&self, sequence: usize, context: &mut BuildCursor<'_, Robots>) -> Result<()> {
        let levels = self.levels.value();
        let size = context
            .view()
            .scalar(sequence, RobotAttribute::Size)
            .unwrap_or_else(|| fixed(1));
        let step = Step::new(self.instance_name())
            .with_credits(CostModifier::Constant(size * fixed(100 * levels)))
            .with_factor(Factor::modify(
                RobotAttribute::Agility,
                Modifier::Constant(fixed(levels)),
            ));
        context.apply_step(step)
    }
}

/// Faster or slower movement, in 10% levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedModification {
    /// Speed change in percent.
    pub percent: BoundedInt,
}

impl Default for SpeedModification {
    fn default() -> Self {
        Self::new(10)
    }
}

impl SpeedModification {
    /// Create a modification of `percent`.
    #[must_use]
    pub fn new(percent: i32) -> Self {
        Self {
            percent: BoundedInt::ranged(percent, -90, 300),
        }
    }
}

impl Component<Robots> for SpeedModification {
    fn stage(&self) -> RobotStage {
        RobotStage::MovementOptions
    }

    fn type_name(&self) -> &'static str {
        "Speed Modification"
    }

    fn instance_name(&self) -> String {
        format!("Speed {:+}%", self.percent.value())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Robots>) -> bool {
        is_mobile(context, sequence)
            && context.has_attribute(sequence, RobotAttribute::Speed)
            && !context.has_component_before(sequence, |c| {
                matches!(c, RobotComponent::SpeedModification(_))
            })
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::integer("percent", "Speed (%)", &self.percent)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "percent" => self.percent.set(id, expect_integer(id, value)?),
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn update_options(&mut self, _sequence: usize, _context: &BuildView<'_, Robots>) {
        self.percent.constrain(-90, 300);
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Robots>) -> Result<()> {
        let requested = self.percent.value();
        let levels = level_count(requested, 10) as i32 * requested.signum();
        // Slowing a robot down saves half as much as speeding it up costs.
        let credits = if levels > 0 { 10 * levels } else { 5 * levels };
        let step = Step::new(format!("Speed {:+}%", levels * 10))
            .with_credits(CostModifier::percentage(credits))
            .with_factor(Factor::modify(
                RobotAttribute::Speed,
                Modifier::percentage(levels * 10, Rounding::Floor),
            ));
        context.apply_step(step)
    }
}

/// A second mode of movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryLocomotion {
    /// Locomotion type.
    pub kind: LocomotionKind,
}

impl Default for SecondaryLocomotion {
    fn default() -> Self {
        Self::new(LocomotionKind::Aquatic)
    }
}

impl SecondaryLocomotion {
    /// Create a secondary locomotion.
    #[must_use]
    pub const fn new(kind: LocomotionKind) -> Self {
        Self { kind }
    }
}

impl Component<Robots> for SecondaryLocomotion {
    fn stage(&self) -> RobotStage {
        RobotStage::SecondaryLocomotion
    }

    fn type_name(&self) -> &'static str {
        "Secondary Locomotion"
    }

    fn instance_name(&self) -> String {
        format!("Secondary {} Locomotion", self.kind.label())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Robots>) -> bool {
        self.kind != LocomotionKind::None
            && context.tech_level() >= self.kind.tech_level()
            && is_mobile(context, sequence)
            && primary_locomotion(context, sequence) != Some(self.kind)
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::choice("kind", "Locomotion", self.kind)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "kind" => {
                self.kind = expect_choice(id, value)?;
                Ok(())
            }
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn create_steps(&self, sequence: usize, context: &mut BuildCursor<'_, Robots>) -> Result<()> {
        let max_slots = context
            .view()
            .scalar(sequence, RobotAttribute::MaxSlots)
            .unwrap_or(Fixed::ZERO);
        let slots = Rounding::Ceil.apply(max_slots / fixed(4));
        let mut step = Step::new(self.instance_name())
            .with_credits(CostModifier::percentage(25))
            .with_slots(CostModifier::Constant(slots));
        if let Some(factor) = self.kind.trait_factor(self.kind.label()) {
            step.add_factor(factor);
        }
        context.apply_step(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flyers_report_flight_mode() {
        let grav = LocomotionKind::Grav.trait_factor("Grav");
        let vtol = LocomotionKind::Vtol.trait_factor("VTOL");
        assert!(matches!(grav, Some(Factor::Set { attribute: RobotAttribute::Flyer, .. })));
        assert!(matches!(vtol, Some(Factor::Set { attribute: RobotAttribute::Flyer, .. })));
        assert!(LocomotionKind::Vtol.needs_atmosphere());
        assert!(!LocomotionKind::Grav.needs_atmosphere());
    }

    #[test]
    fn test_wheels_grant_no_trait() {
        assert!(LocomotionKind::Wheels.movement_trait().is_none());
        assert_eq!(LocomotionKind::Tracks.movement_trait(), Some(RobotAttribute::Atv));
    }

    #[test]
    fn test_labels_round_trip() {
        for kind in LocomotionKind::ALL {
            assert_eq!(LocomotionKind::from_label(kind.label()), Some(*kind));
        }
    }
}
