//! Ammunition capacity changes.
//!
//! Capacity is bought in 10% levels; a partial level counts as a whole one.
//! The new capacity is `floor(capacity * (100 ± 10 * levels) / 100)`.

use serde::{Deserialize, Serialize};

use crate::construction::option::{expect_integer, unknown_option};
use crate::construction::{
    BoundedInt, BuildCursor, BuildView, Component, ComponentOption, CostModifier, Factor,
    Modifier, OptionValue, Step,
};
use crate::error::Result;
use crate::math::{level_count, Rounding};

use super::{
    has_power_pack_receiver, has_projector_receiver, has_single_shot, Gunsmith, WeaponAttribute,
    WeaponStage,
};

/// Size of one capacity level in percent.
pub const CAPACITY_LEVEL: i32 = 10;

const MAX_INCREASE_LEVELS: i32 = 15;
const MAX_DECREASE_LEVELS: i32 = 9;

fn accepts_capacity_change(context: &BuildView<'_, Gunsmith>, sequence: usize) -> bool {
    context.has_attribute(sequence, WeaponAttribute::AmmoCapacity)
        && !has_projector_receiver(context, sequence)
        && !has_power_pack_receiver(context, sequence)
        && !has_single_shot(context, sequence)
}

fn current_capacity(context: &BuildView<'_, Gunsmith>, sequence: usize) -> Option<i32> {
    context
        .scalar(sequence, WeaponAttribute::AmmoCapacity)
        .map(|c| c.floor().to_num::<i32>())
}

fn effective_percent(percent: i32) -> i32 {
    level_count(percent, CAPACITY_LEVEL) as i32 * CAPACITY_LEVEL
}

/// Larger magazine or feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncreasedCapacity {
    /// Requested increase in percent.
    pub percent: BoundedInt,
}

impl Default for IncreasedCapacity {
    fn default() -> Self {
        Self::new(CAPACITY_LEVEL)
    }
}

impl IncreasedCapacity {
    /// Create an increase of `percent`.
    #[must_use]
    pub fn new(percent: i32) -> Self {
        Self {
            percent: BoundedInt::ranged(
                percent,
                CAPACITY_LEVEL,
                CAPACITY_LEVEL * MAX_INCREASE_LEVELS,
            ),
        }
    }
}

impl Component<Gunsmith> for IncreasedCapacity {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Capacity
    }

    fn type_name(&self) -> &'static str {
        "Increased Capacity"
    }

    fn instance_name(&self) -> String {
        format!("Increased Capacity (+{}%)", effective_percent(self.percent.value()))
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        accepts_capacity_change(context, sequence)
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::integer("percent", "Increase (%)", &self.percent)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "percent" => self.percent.set(id, expect_integer(id, value)?),
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn update_options(&mut self, _sequence: usize, _context: &BuildView<'_, Gunsmith>) {
        self.percent
            .constrain(CAPACITY_LEVEL, CAPACITY_LEVEL * MAX_INCREASE_LEVELS);
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let levels = level_count(self.percent.value(), CAPACITY_LEVEL) as i32;
        let percent = levels * CAPACITY_LEVEL;
        let step = Step::new(format!("Capacity +{percent}%"))
            .with_credits(CostModifier::percentage(10 * levels))
            .with_weight(CostModifier::percentage(5 * levels))
            .with_factor(Factor::modify(
                WeaponAttribute::AmmoCapacity,
                Modifier::percentage(percent, Rounding::Floor),
            ));
        context.apply_step(step)
    }
}

/// Smaller magazine or feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecreasedCapacity {
    /// Requested decrease in percent.
    pub percent: BoundedInt,
}

impl Default for DecreasedCapacity {
    fn default() -> Self {
        Self::new(CAPACITY_LEVEL)
    }
}

impl DecreasedCapacity {
    /// Create a decrease of `percent`.
    #[must_use]
    pub fn new(percent: i32) -> Self {
        Self {
            percent: BoundedInt::ranged(
                percent,
                CAPACITY_LEVEL,
                CAPACITY_LEVEL * MAX_DECREASE_LEVELS,
            ),
        }
    }

    /// Largest decrease that leaves at least one round.
    fn max_percent(capacity: i32) -> Option<i32> {
        (1..=MAX_DECREASE_LEVELS)
            .rev()
            .map(|levels| levels * CAPACITY_LEVEL)
            .find(|percent| capacity * (100 - percent) >= 100)
    }
}

impl Component<Gunsmith> for DecreasedCapacity {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Capacity
    }

    fn type_name(&self) -> &'static str {
        "Decreased Capacity"
    }

    fn instance_name(&self) -> String {
        format!("Decreased Capacity (-{}%)", effective_percent(self.percent.value()))
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        accepts_capacity_change(context, sequence)
            && current_capacity(context, sequence)
                .and_then(Self::max_percent)
                .is_some()
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::integer("percent", "Decrease (%)", &self.percent)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "percent" => self.percent.set(id, expect_integer(id, value)?),
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn update_options(&mut self, sequence: usize, context: &BuildView<'_, Gunsmith>) {
        let max = current_capacity(context, sequence)
            .and_then(Self::max_percent)
            .unwrap_or(CAPACITY_LEVEL);
        self.percent.constrain(CAPACITY_LEVEL, max);
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let levels = level_count(self.percent.value(), CAPACITY_LEVEL) as i32;
        let percent = levels * CAPACITY_LEVEL;
        let step = Step::new(format!("Capacity -{percent}%"))
            .with_weight(CostModifier::percentage(-5 * levels))
            .with_factor(Factor::modify(
                WeaponAttribute::AmmoCapacity,
                Modifier::percentage(-percent, Rounding::Floor),
            ));
        context.apply_step(step)
    }
}
