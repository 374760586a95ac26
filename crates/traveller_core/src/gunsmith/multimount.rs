//! Multi-mounts: several identical weapons fired together.
//!
//! The duplication step captures the sequence totals at the moment it is
//! created and adds `count - 1` copies of them. Anything bought later is
//! not duplicated, which is why loaded consumables are scaled separately by
//! the engine-owned [`MultiMountLoaded`] at the end of the loading phase.

use serde::{Deserialize, Serialize};

use crate::config::EscalationStacking;
use crate::construction::option::{expect_integer, unknown_option};
use crate::construction::{
    AttributeValue, BoundedInt, BuildCursor, BuildView, Component, ComponentOption, CostModifier,
    Factor, OptionValue, Step,
};
use crate::error::Result;
use crate::math::{fixed, format_scalar};

use super::{escalation_factors, FireRate, Gunsmith, WeaponAttribute, WeaponStage};

const MIN_MOUNTED: i32 = 2;
const MAX_MOUNTED: i32 = 12;

/// Several copies of the weapon built so far, mounted to fire together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiMount {
    /// Number of weapons in the mount.
    pub count: BoundedInt,
}

impl Default for MultiMount {
    fn default() -> Self {
        Self::new(MIN_MOUNTED)
    }
}

impl MultiMount {
    /// Create a mount of `count` weapons.
    #[must_use]
    pub fn new(count: i32) -> Self {
        Self {
            count: BoundedInt::ranged(count, MIN_MOUNTED, MAX_MOUNTED),
        }
    }
}

impl Component<Gunsmith> for MultiMount {
    fn stage(&self) -> WeaponStage {
        WeaponStage::MultiMount
    }

    fn type_name(&self) -> &'static str {
        "Multi-Mount"
    }

    fn instance_name(&self) -> String {
        format!("Multi-Mount (x{})", self.count.value())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        context.has_attribute(sequence, WeaponAttribute::Damage)
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::integer("count", "Weapons", &self.count)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "count" => self.count.set(id, expect_integer(id, value)?),
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn update_options(&mut self, _sequence: usize, _context: &BuildView<'_, Gunsmith>) {
        self.count.constrain(MIN_MOUNTED, MAX_MOUNTED);
    }

    fn create_steps(&self, sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let count = self.count.value();
        let view = context.view();

        let totals = view.sequence_totals(sequence);
        let extra = fixed(count - 1);
        let duplication = Step::new(format!("Additional Weapons (x{count})"))
            .with_credits(CostModifier::Constant(totals.credits * extra))
            .with_weight(CostModifier::Constant(totals.weight * extra))
            .with_factor(Factor::set(
                WeaponAttribute::MountCount,
                AttributeValue::scalar(fixed(count), "Multi-mount"),
            ))
            .with_note(format!(
                "{} additional weapon(s) at Cr{} and {}kg each",
                count - 1,
                format_scalar(totals.credits),
                format_scalar(totals.weight)
            ));

        let escalation = view.scalar(sequence, WeaponAttribute::Auto).and_then(|auto| {
            let combined = auto * fixed(count);
            FireRate::for_combined_auto(combined).map(|rate| (combined, rate))
        });
        let escalation_step = escalation.map(|(combined, rate)| {
            let mut step = Step::new(format!("Combined Fire ({})", rate.label()))
                .with_note(format!("Combined Auto {}", format_scalar(combined)));
            let existing = FireRate::current(&view, sequence);
            match (existing, view.rules().multi_mount_escalation) {
                (Some(existing), EscalationStacking::NoStack) => step.add_note(format!(
                    "Already fires {}; multi-mount escalation does not stack",
                    existing.label()
                )),
                _ => {
                    let dice = view
                        .dice(sequence, WeaponAttribute::Damage)
                        .map_or(0, |d| d.count);
                    for factor in escalation_factors(&view, sequence, rate, dice) {
                        step.add_factor(factor);
                    }
                }
            }
            step
        });

        context.apply_step(duplication)?;
        if let Some(step) = escalation_step {
            context.apply_step(step)?;
        }
        Ok(())
    }
}

/// Scales the loading phase by the mount count, so every mounted weapon
/// carries its own load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MultiMountLoaded;

impl Component<Gunsmith> for MultiMountLoaded {
    fn stage(&self) -> WeaponStage {
        WeaponStage::LoadedMultiMount
    }

    fn type_name(&self) -> &'static str {
        "Loaded Multi-Mount"
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        context.has_attribute(sequence, WeaponAttribute::MountCount)
    }

    fn create_steps(&self, sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let Some(count) = context.view().scalar(sequence, WeaponAttribute::MountCount) else {
            return Ok(());
        };
        let step = Step::new(format!("Loaded Multi-Mount (x{})", format_scalar(count)))
            .with_credits(CostModifier::Multiply(count))
            .with_weight(CostModifier::Multiply(count))
            .with_note("Every mounted weapon carries its own load");
        context.apply_step(step)
    }
}
