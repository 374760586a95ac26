//! Manipulator arms.

use serde::{Deserialize, Serialize};

use crate::construction::option::{expect_integer, unknown_option};
use crate::construction::{
    BoundedInt, BuildCursor, BuildView, Component, ComponentOption, CostModifier, OptionValue,
    Step,
};
use crate::error::Result;
use crate::math::fixed;

use super::{RobotAttribute, RobotStage, Robots};

/// One arm. Its size may not exceed the chassis size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manipulator {
    /// Manipulator size.
    pub size: BoundedInt,
}

impl Default for Manipulator {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Manipulator {
    /// Create a manipulator of `size`.
    #[must_use]
    pub fn new(size: i32) -> Self {
        Self {
            size: BoundedInt::ranged(size, 1, 8),
        }
    }

    /// STR granted to the arm.
    #[must_use]
    pub const fn strength(&self) -> i32 {
        2 * self.size.value() - 1
    }
}

impl Component<Robots> for Manipulator {
    fn stage(&self) -> RobotStage {
        RobotStage::Manipulators
    }

    fn type_name(&self) -> &'static str {
        "Manipulator"
    }

    fn instance_name(&self) -> String {
        format!("Size {} Manipulator", self.size.value())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Robots>) -> bool {
        context.has_attribute(sequence, RobotAttribute::Size)
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

    fn update_options(&mut self, sequence: usize, context: &BuildView<'_, Robots>) {
        let chassis = context
            .scalar(sequence, RobotAttribute::Size)
            .map_or(1, |size| size.floor().to_num::<i32>());
        self.size.constrain(1, chassis.max(1));
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Robots>) -> Result<()> {
        let size = self.size.value();
        let step = Step::new(self.instance_name())
            .with_credits(CostModifier::Constant(fixed(100 * size)))
            .with_slots(CostModifier::Constant(fixed(size)))
            .with_note(format!("STR {}", self.strength()));
        context.apply_step(step)
    }
}
