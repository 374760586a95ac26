//! Firing mechanisms.
//!
//! The mechanism stage holds at most one component, so choosing one
//! mechanism excludes every other. Single shot and semi-automatic can
//! never coexist for that reason.

use serde::{Deserialize, Serialize};

use crate::construction::{
    AttributeValue, BuildCursor, BuildView, Component, CostModifier, Factor, Step,
};
use crate::error::Result;
use crate::math::fixed;

use super::{
    has_conventional_receiver, has_power_pack_receiver, has_projector_receiver, Gunsmith,
    WeaponAttribute, WeaponStage,
};

const AUTOMATIC_TECH_LEVEL: u32 = 6;

fn set_auto(score: i32, label: &str) -> Factor<WeaponAttribute> {
    Factor::set(WeaponAttribute::Auto, AttributeValue::scalar(fixed(score), label))
}

/// Breech-loaded weapon that holds one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SingleShotMechanism;

impl Component<Gunsmith> for SingleShotMechanism {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Mechanism
    }

    fn type_name(&self) -> &'static str {
        "Single Shot Mechanism"
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        !has_power_pack_receiver(context, sequence)
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let step = Step::new("Single Shot")
            .with_credits(CostModifier::percentage(-50))
            .with_factor(Factor::set(
                WeaponAttribute::AmmoCapacity,
                AttributeValue::scalar(fixed(1), "Single shot"),
            ))
            .with_note("Must be reloaded after every shot");
        context.apply_step(step)
    }
}

/// Manually cycled action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepeaterMechanism;

impl Component<Gunsmith> for RepeaterMechanism {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Mechanism
    }

    fn type_name(&self) -> &'static str {
        "Repeater Mechanism"
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        has_conventional_receiver(context, sequence)
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let step = Step::new("Repeater")
            .with_credits(CostModifier::percentage(-25))
            .with_note("The action must be worked between shots");
        context.apply_step(step)
    }
}

/// Self-loading action firing once per trigger pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SemiAutomaticMechanism;

impl Component<Gunsmith> for SemiAutomaticMechanism {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Mechanism
    }

    fn type_name(&self) -> &'static str {
        "Semi-Automatic Mechanism"
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        !has_projector_receiver(context, sequence)
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        context.apply_step(Step::new("Semi-Automatic"))
    }
}

/// Action able to fire short bursts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BurstCapableMechanism;

impl Component<Gunsmith> for BurstCapableMechanism {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Mechanism
    }

    fn type_name(&self) -> &'static str {
        "Burst Capable Mechanism"
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        context.tech_level() >= AUTOMATIC_TECH_LEVEL && !has_projector_receiver(context, sequence)
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let step = Step::new("Burst Capable")
            .with_credits(CostModifier::percentage(10))
            .with_factor(set_auto(2, "Burst capable"));
        context.apply_step(step)
    }
}

/// Fully automatic action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FullyAutomaticMechanism;

impl Component<Gunsmith> for FullyAutomaticMechanism {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Mechanism
    }

    fn type_name(&self) -> &'static str {
        "Fully Automatic Mechanism"
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        context.tech_level() >= AUTOMATIC_TECH_LEVEL && !has_projector_receiver(context, sequence)
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let step = Step::new("Fully Automatic")
            .with_credits(CostModifier::percentage(20))
            .with_factor(set_auto(3, "Fully automatic"));
        context.apply_step(step)
    }
}
