//! Chassis and chassis options.

use serde::{Deserialize, Serialize};

use crate::construction::option::{expect_integer, unknown_option};
use crate::construction::{
    AttributeValue, BoundedInt, BuildCursor, BuildView, Component, ComponentOption, CostModifier,
    Factor, Modifier, OptionValue, Step,
};
use crate::error::Result;
use crate::math::{fixed, level_count, Rounding};

use super::{RobotAttribute, RobotComponent, RobotStage, Robots};

const MIN_SIZE: i32 = 1;
const MAX_SIZE: i32 = 8;

/// Slots, hits and credits of a chassis size.
const fn size_table(size: i32) -> (i32, i32, i32) {
    match size {
        ..=1 => (2, 1, 100),
        2 => (4, 4, 200),
        3 => (8, 8, 400),
        4 => (12, 12, 800),
        5 => (16, 15, 1000),
        6 => (20, 20, 2000),
        7 => (24, 30, 4000),
        _ => (32, 45, 8000),
    }
}

/// Armour every chassis has at a tech level.
const fn base_protection(tech_level: u32) -> i32 {
    match tech_level {
        ..=8 => 2,
        9..=11 => 3,
        _ => 4,
    }
}

/// Highest armour a chassis can carry at a tech level.
const fn max_protection(tech_level: u32) -> i32 {
    match tech_level {
        ..=8 => 20,
        9..=11 => 30,
        12..=14 => 40,
        _ => 50,
    }
}

fn scalar_i32(context: &BuildView<'_, Robots>, sequence: usize, attribute: RobotAttribute) -> Option<i32> {
    context
        .scalar(sequence, attribute)
        .map(|v| v.floor().to_num::<i32>())
}

/// The robot's body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chassis {
    /// Size 1 to 8.
    pub size: BoundedInt,
}

impl Default for Chassis {
    fn default() -> Self {
        Self::new(5)
    }
}

impl Chassis {
    /// Create a chassis of the given size.
    #[must_use]
    pub fn new(size: i32) -> Self {
        Self {
            size: BoundedInt::ranged(size, MIN_SIZE, MAX_SIZE),
        }
    }
}

impl Component<Robots> for Chassis {
    fn stage(&self) -> RobotStage {
        RobotStage::Chassis
    }

    fn type_name(&self) -> &'static str {
        "Chassis"
    }

    fn instance_name(&self) -> String {
        format!("Size {} Chassis", self.size.value())
    }

    fn is_compatible(&self, _sequence: usize, _context: &BuildView<'_, Robots>) -> bool {
        true
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::integer("size", "Size", &self.size)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "size" => self.size.set(id, expect_integer(id, value)?),
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn update_options(&mut self, _sequence: usize, _context: &BuildView<'_, Robots>) {
        self.size.constrain(MIN_SIZE, MAX_SIZE);
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Robots>) -> Result<()> {
        let size = self.size.value();
        let (slots, hits, credits) = size_table(size);
        let protection = base_protection(context.view().tech_level());
        let name = self.instance_name();
        let step = Step::new(name.as_str())
            .with_credits(CostModifier::Constant(fixed(credits)))
            .with_factor(Factor::set(
                RobotAttribute::Size,
                AttributeValue::scalar(fixed(size), name.as_str()),
            ))
            .with_factor(Factor::set(
                RobotAttribute::MaxSlots,
                AttributeValue::scalar(fixed(slots), name.as_str()),
            ))
            .with_factor(Factor::set(
                RobotAttribute::Hits,
                AttributeValue::scalar(fixed(hits), name.as_str()),
            ))
            .with_factor(Factor::set(
                RobotAttribute::Protection,
                AttributeValue::scalar(fixed(protection), "Base armour"),
            ));
        context.apply_step(step)
    }
}

/// Armour added to or removed from the chassis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmourModification {
    /// Armour points; negative removes armour.
    pub points: BoundedInt,
}

impl Default for ArmourModification {
    fn default() -> Self {
        Self {
            points: BoundedInt::new(1),
        }
    }
}

impl ArmourModification {
    /// Create a modification of `points`.
    #[must_use]
    pub const fn new(points: i32) -> Self {
        Self {
            points: BoundedInt::new(points),
        }
    }
}

impl Component<Robots> for ArmourModification {
    fn stage(&self) -> RobotStage {
        RobotStage::ChassisOptions
    }

    fn type_name(&self) -> &'static str {
        "Armour Modification"
    }

    fn instance_name(&self) -> String {
        format!("Armour {:+}", self.points.value())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Robots>) -> bool {
        context.has_attribute(sequence, RobotAttribute::Protection)
            && !context.has_component_before(sequence, |c| {
                matches!(c, RobotComponent::ArmourModification(_))
            })
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::integer("points", "Armour Points", &self.points)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "points" => self.points.set(id, expect_integer(id, value)?),
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn update_options(&mut self, sequence: usize, context: &BuildView<'_, Robots>) {
        let current = scalar_i32(context, sequence, RobotAttribute::Protection).unwrap_or(0);
        let max = max_protection(context.tech_level()) - current;
        self.points.constrain(-current, max.max(0));
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Robots>) -> Result<()> {
        let points = self.points.value();
        let step = Step::new(self.instance_name())
            .with_credits(CostModifier::percentage(10 * points))
            .with_factor(Factor::modify(
                RobotAttribute::Protection,
                Modifier::Constant(fixed(points)),
            ));
        context.apply_step(step)
    }
}

/// Longer or shorter operation between recharges, in 10% levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnduranceModification {
    /// Endurance change in percent.
    pub percent: BoundedInt,
}

impl Default for EnduranceModification {
    fn default() -> Self {
        Self::new(10)
    }
}

impl EnduranceModification {
    /// Create a modification of `percent`.
    #[must_use]
    pub fn new(percent: i32) -> Self {
        Self {
            percent: BoundedInt::ranged(percent, -90, 200),
        }
    }
}

impl Component<Robots> for EnduranceModification {
    fn stage(&self) -> RobotStage {
        RobotStage::ChassisOptions
    }

    fn type_name(&self) -> &'static str {
        "Endurance Modification"
    }

    fn instance_name(&self) -> String {
        format!("Endurance {:+}%", self.percent.value())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Robots>) -> bool {
        context.has_attribute(sequence, RobotAttribute::Endurance)
            && !context.has_component_before(sequence, |c| {
                matches!(c, RobotComponent::EnduranceModification(_))
            })
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::integer("percent", "Endurance (%)", &self.percent)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "percent" => self.percent.set(id, expect_integer(id, value)?),
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn update_options(&mut self, _sequence: usize, _context: &BuildView<'_, Robots>) {
        self.percent.constrain(-90, 200);
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Robots>) -> Result<()> {
        let requested = self.percent.value();
        let levels = level_count(requested, 10) as i32 * requested.signum();
        let step = Step::new(format!("Endurance {:+}%", levels * 10))
            .with_credits(CostModifier::percentage(5 * levels))
            .with_factor(Factor::modify(
                RobotAttribute::Endurance,
                Modifier::percentage(levels * 10, Rounding::Floor),
            ));
        context.apply_step(step)
    }
}

/// Extra or fewer hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResiliencyModification {
    /// Hits added; negative removes hits.
    pub hits: BoundedInt,
}

impl Default for ResiliencyModification {
    fn default() -> Self {
        Self {
            hits: BoundedInt::new(1),
        }
    }
}

impl ResiliencyModification {
    /// Create a modification of `hits`.
    #[must_use]
    pub const fn new(hits: i32) -> Self {
        Self {
            hits: BoundedInt::new(hits),
        }
    }
}

impl Component<Robots> for ResiliencyModification {
    fn stage(&self) -> RobotStage {
        RobotStage::ChassisOptions
    }

    fn type_name(&self) -> &'static str {
        "Resiliency Modification"
    }

    fn instance_name(&self) -> String {
        format!("Resiliency {:+}", self.hits.value())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Robots>) -> bool {
        context.has_attribute(sequence, RobotAttribute::Hits)
            && !context.has_component_before(sequence, |c| {
                matches!(c, RobotComponent::ResiliencyModification(_))
            })
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::integer("hits", "Hits", &self.hits)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "hits" => self.hits.set(id, expect_integer(id, value)?),
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn update_options(&mut self, sequence: usize, context: &BuildView<'_, Robots>) {
        let current = scalar_i32(context, sequence, RobotAttribute::Hits).unwrap_or(1);
        self.hits.constrain(1 - current, current);
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Robots>) -> Result<()> {
        let hits = self.hits.value();
        let mut step = Step::new(self.instance_name()).with_factor(Factor::modify(
            RobotAttribute::Hits,
            Modifier::Constant(fixed(hits)),
        ));
        if hits > 0 {
            step = step.with_credits(CostModifier::Constant(fixed(100 * hits)));
        }
        context.apply_step(step)
    }
}
