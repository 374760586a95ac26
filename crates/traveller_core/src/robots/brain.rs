//! Brains and skill packages.

use serde::{Deserialize, Serialize};

use crate::construction::option::{expect_choice, expect_integer, unknown_option};
use crate::construction::{
    AttributeValue, BoundedInt, BuildCursor, BuildView, Component, ComponentOption, CostModifier,
    Factor, OptionChoice, OptionValue, Step,
};
use crate::error::Result;
use crate::math::fixed;

use super::{RobotAttribute, RobotComponent, RobotStage, Robots};

/// Brain class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BrainKind {
    /// Fixed routines only.
    Primitive,
    /// Simple programmable brain.
    #[default]
    Basic,
    /// Combat-optimised basic brain.
    HunterKiller,
    /// Learns within its programming.
    Advanced,
    /// Near-human reasoning.
    VeryAdvanced,
    /// A true artificial intelligence.
    SelfAware,
}

impl OptionChoice for BrainKind {
    const ALL: &'static [Self] = &[
        Self::Primitive,
        Self::Basic,
        Self::HunterKiller,
        Self::Advanced,
        Self::VeryAdvanced,
        Self::SelfAware,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Primitive => "Primitive",
            Self::Basic => "Basic",
            Self::HunterKiller => "Hunter/Killer",
            Self::Advanced => "Advanced",
            Self::VeryAdvanced => "Very Advanced",
            Self::SelfAware => "Self-Aware",
        }
    }
}

impl BrainKind {
    /// Minimum tech level.
    #[must_use]
    pub const fn tech_level(self) -> u32 {
        match self {
            Self::Primitive => 7,
            Self::Basic | Self::HunterKiller => 8,
            Self::Advanced => 10,
            Self::VeryAdvanced => 12,
            Self::SelfAware => 15,
        }
    }

    /// Bandwidth available to skill packages.
    #[must_use]
    pub const fn bandwidth(self) -> i32 {
        match self {
            Self::Primitive => 0,
            Self::Basic => 1,
            Self::HunterKiller => 2,
            Self::Advanced => 8,
            Self::VeryAdvanced => 16,
            Self::SelfAware => 32,
        }
    }

    /// Intelligence characteristic.
    #[must_use]
    pub const fn intelligence(self) -> i32 {
        match self {
            Self::Primitive => 1,
            Self::Basic | Self::HunterKiller => 4,
            Self::Advanced => 8,
            Self::VeryAdvanced => 10,
            Self::SelfAware => 15,
        }
    }

    const fn credits(self) -> i32 {
        match self {
            Self::Primitive => 1_000,
            Self::Basic => 5_000,
            Self::HunterKiller => 8_000,
            Self::Advanced => 10_000,
            Self::VeryAdvanced => 15_000,
            Self::SelfAware => 25_000,
        }
    }

    /// Check if the brain runs only fixed routines.
    #[must_use]
    pub const fn is_limited(self) -> bool {
        matches!(self, Self::Primitive | Self::Basic)
    }
}

/// The robot's brain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Brain {
    /// Brain class.
    pub kind: BrainKind,
}

impl Brain {
    /// Create a brain of `kind`.
    #[must_use]
    pub const fn new(kind: BrainKind) -> Self {
        Self { kind }
    }
}

impl Component<Robots> for Brain {
    fn stage(&self) -> RobotStage {
        RobotStage::Brain
    }

    fn type_name(&self) -> &'static str {
        "Brain"
    }

    fn instance_name(&self) -> String {
        format!("{} Brain", self.kind.label())
    }

    fn is_compatible(&self, _sequence: usize, context: &BuildView<'_, Robots>) -> bool {
        context.tech_level() >= self.kind.tech_level()
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::choice("kind", "Brain", self.kind)]
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
        let step = Step::new(self.instance_name())
            .with_credits(CostModifier::Constant(fixed(self.kind.credits())))
            .with_factor(Factor::set(
                RobotAttribute::Intelligence,
                AttributeValue::scalar(fixed(self.kind.intelligence()), label),
            ))
            .with_factor(Factor::set(
                RobotAttribute::MaxBandwidth,
                AttributeValue::scalar(fixed(self.kind.bandwidth()), label),
            ));
        context.apply_step(step)
    }
}

/// Skill a package teaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RobotSkill {
    /// Athletics.
    #[default]
    Athletics,
    /// Drive.
    Drive,
    /// Flight.
    Flight,
    /// Pilot.
    Pilot,
    /// Gun Combat.
    GunCombat,
    /// Melee.
    Melee,
    /// Recon.
    Recon,
    /// Mechanic.
    Mechanic,
    /// Electronics.
    Electronics,
    /// Medic.
    Medic,
    /// Navigation.
    Navigation,
    /// Steward.
    Steward,
}

impl OptionChoice for RobotSkill {
    const ALL: &'static [Self] = &[
        Self::Athletics,
        Self::Drive,
        Self::Flight,
        Self::Pilot,
        Self::GunCombat,
        Self::Melee,
        Self::Recon,
        Self::Mechanic,
        Self::Electronics,
        Self::Medic,
        Self::Navigation,
        Self::Steward,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Athletics => "Athletics",
            Self::Drive => "Drive",
            Self::Flight => "Flight",
            Self::Pilot => "Pilot",
            Self::GunCombat => "Gun Combat",
            Self::Melee => "Melee",
            Self::Recon => "Recon",
            Self::Mechanic => "Mechanic",
            Self::Electronics => "Electronics",
            Self::Medic => "Medic",
            Self::Navigation => "Navigation",
            Self::Steward => "Steward",
        }
    }
}

impl RobotSkill {
    /// Check if the skill controls a vehicle.
    #[must_use]
    pub const fn is_vehicle(self) -> bool {
        matches!(self, Self::Drive | Self::Flight | Self::Pilot)
    }
}

/// A skill package loaded into the brain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillPackage {
    /// Skill taught.
    pub skill: RobotSkill,
    /// Skill level 0 to 3.
    pub level: BoundedInt,
}

impl Default for SkillPackage {
    fn default() -> Self {
        Self::new(RobotSkill::default(), 0)
    }
}

impl SkillPackage {
    /// Create a package for `skill` at `level`.
    #[must_use]
    pub fn new(skill: RobotSkill, level: i32) -> Self {
        Self {
            skill,
            level: BoundedInt::ranged(level, 0, 3),
        }
    }

    /// Bandwidth the package consumes; doubles with each level.
    #[must_use]
    pub const fn bandwidth(&self) -> i32 {
        1 << self.level.value()
    }
}

impl Component<Robots> for SkillPackage {
    fn stage(&self) -> RobotStage {
        RobotStage::Skills
    }

    fn type_name(&self) -> &'static str {
        "Skill Package"
    }

    fn instance_name(&self) -> String {
        format!("{} {}", self.skill.label(), self.level.value())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Robots>) -> bool {
        let brain = context.find_component(sequence, |c| match c {
            RobotComponent::Brain(b) => Some(b.kind),
            _ => None,
        });
        let repeated = context.has_component_before(sequence, |c| {
            matches!(c, RobotComponent::SkillPackage(p) if p.skill == self.skill)
        });
        match brain {
            Some(kind) => {
                !repeated && (!kind.is_limited() || context.rules().primitive_brain_skills)
            }
            None => false,
        }
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![
            ComponentOption::choice("skill", "Skill", self.skill),
            ComponentOption::integer("level", "Level", &self.level),
        ]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "skill" => {
                self.skill = expect_choice(id, value)?;
                Ok(())
            }
            "level" => self.level.set(id, expect_integer(id, value)?),
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn update_options(&mut self, _sequence: usize, _context: &BuildView<'_, Robots>) {
        self.level.constrain(0, 3);
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Robots>) -> Result<()> {
        let bandwidth = self.bandwidth();
        let step = Step::new(format!("{} Package", self.instance_name()))
            .with_credits(CostModifier::Constant(fixed(1_000 * bandwidth)))
            .with_bandwidth(CostModifier::Constant(fixed(bandwidth)));
        context.apply_step(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_bandwidth_doubles_per_level() {
        let bandwidth: Vec<_> = (0..=3)
            .map(|level| SkillPackage::new(RobotSkill::Recon, level).bandwidth())
            .collect();
        assert_eq!(bandwidth, vec![1, 2, 4, 8]);
    }

    #[test]
    fn test_limited_brains() {
        assert!(BrainKind::Primitive.is_limited());
        assert!(BrainKind::Basic.is_limited());
        assert!(!BrainKind::HunterKiller.is_limited());
    }

    #[test]
    fn test_vehicle_skills() {
        assert!(RobotSkill::Drive.is_vehicle());
        assert!(!RobotSkill::Medic.is_vehicle());
    }
}
