//! Optional weapon features.

use serde::{Deserialize, Serialize};

use crate::construction::option::{expect_boolean, unknown_option};
use crate::construction::{
    AttributeValue, BuildCursor, BuildView, Component, ComponentOption, CostModifier, Factor,
    Modifier, OptionValue, Step,
};
use crate::error::Result;
use crate::math::{fixed, ratio, Rounding};

use super::{
    escalation_factors, has_conventional_receiver, FireRate, Gunsmith, ReceiverClass,
    WeaponAttribute, WeaponComponent, WeaponStage,
};

/// Lighter materials at extra cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lightweight {
    /// Extreme lightweighting.
    pub extreme: bool,
}

impl Component<Gunsmith> for Lightweight {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Features
    }

    fn type_name(&self) -> &'static str {
        "Lightweight"
    }

    fn instance_name(&self) -> String {
        if self.extreme {
            "Extreme Lightweight".to_string()
        } else {
            "Lightweight".to_string()
        }
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        !context.has_component_before(sequence, |c| matches!(c, WeaponComponent::Lightweight(_)))
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::boolean("extreme", "Extreme", self.extreme)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "extreme" => {
                self.extreme = expect_boolean(id, value)?;
                Ok(())
            }
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let step = if self.extreme {
            Step::new("Extreme Lightweight")
                .with_credits(CostModifier::percentage(50))
                .with_weight(CostModifier::percentage(-40))
                .with_note("Recoil makes Auto fire harder to control")
        } else {
            Step::new("Lightweight")
                .with_credits(CostModifier::percentage(25))
                .with_weight(CostModifier::percentage(-25))
        };
        context.apply_step(step)
    }
}

/// Action behind the trigger group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bullpup;

impl Component<Gunsmith> for Bullpup {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Features
    }

    fn type_name(&self) -> &'static str {
        "Bullpup"
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        context.has_component(sequence, |c| {
            matches!(
                c,
                WeaponComponent::ConventionalReceiver(r)
                    if matches!(r.class, ReceiverClass::Assault | ReceiverClass::Longarm)
            )
        }) && !context.has_component_before(sequence, |c| matches!(c, WeaponComponent::Bullpup(_)))
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let step = Step::new("Bullpup")
            .with_credits(CostModifier::percentage(10))
            .with_weight(CostModifier::percentage(-10))
            .with_factor(Factor::modify(
                WeaponAttribute::Quickdraw,
                Modifier::Constant(fixed(2)),
            ));
        context.apply_step(step)
    }
}

/// Integral sound suppressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Suppressor;

impl Component<Gunsmith> for Suppressor {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Features
    }

    fn type_name(&self) -> &'static str {
        "Suppressor"
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        has_conventional_receiver(context, sequence)
            && !context.has_component_before(sequence, |c| matches!(c, WeaponComponent::Suppressor(_)))
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let step = Step::new("Suppressor")
            .with_credits(CostModifier::Constant(fixed(250)))
            .with_weight(CostModifier::Constant(ratio(1, 2)))
            .with_factor(Factor::set(
                WeaponAttribute::Signature,
                AttributeValue::flag("Low"),
            ))
            .with_factor(Factor::modify(
                WeaponAttribute::Range,
                Modifier::percentage(-25, Rounding::Floor),
            ));
        context.apply_step(step)
    }
}

/// Cycle rate raised until the weapon fires as RF or VRF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighCycleRate {
    /// Very rapid fire instead of rapid fire.
    pub very_rapid: bool,
}

impl HighCycleRate {
    const fn rate(self) -> FireRate {
        if self.very_rapid {
            FireRate::VeryRapid
        } else {
            FireRate::Rapid
        }
    }
}

impl Component<Gunsmith> for HighCycleRate {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Features
    }

    fn type_name(&self) -> &'static str {
        "High Cycle Rate"
    }

    fn instance_name(&self) -> String {
        format!("High Cycle Rate ({})", self.rate().label())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        context.has_component(sequence, |c| matches!(c, WeaponComponent::FullyAutomatic(_)))
            && !context
                .has_component_before(sequence, |c| matches!(c, WeaponComponent::HighCycleRate(_)))
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::boolean("very_rapid", "Very Rapid Fire", self.very_rapid)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "very_rapid" => {
                self.very_rapid = expect_boolean(id, value)?;
                Ok(())
            }
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn create_steps(&self, sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let rate = self.rate();
        let view = context.view();
        let dice = view
            .dice(sequence, WeaponAttribute::Damage)
            .map_or(0, |d| d.count);
        let mut step = Step::new(format!("High Cycle Rate ({})", rate.label()))
            .with_credits(CostModifier::percentage(25 * rate.multiplier()));
        for factor in escalation_factors(&view, sequence, rate, dice) {
            step.add_factor(factor);
        }
        context.apply_step(step)
    }
}
