//! Spare munitions carried with the weapon.
//!
//! Spare loads are not in the weapon, so their effects are projected with
//! non-modifying factors: the manifest shows what the weapon would do with
//! them loaded, while the live attributes stay untouched.

use serde::{Deserialize, Serialize};

use crate::construction::option::{expect_choice, expect_integer, unknown_option};
use crate::construction::{
    BoundedInt, BuildCursor, BuildView, Component, ComponentOption, CostModifier, Factor,
    Modifier, OptionChoice, OptionValue, Step,
};
use crate::error::Result;
use crate::math::{fixed, format_scalar};

use super::loading::{round_weight, AmmunitionKind, FuelKind};
use super::{has_conventional_receiver, has_projector_receiver, Gunsmith, WeaponAttribute, WeaponStage};

/// Spare cartridges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmunitionQuantity {
    /// Cartridge type.
    pub kind: AmmunitionKind,
    /// Number of rounds.
    pub rounds: BoundedInt,
}

impl Default for AmmunitionQuantity {
    fn default() -> Self {
        Self::new(AmmunitionKind::Ball, 100)
    }
}

impl AmmunitionQuantity {
    /// Create a quantity of spare rounds.
    #[must_use]
    pub fn new(kind: AmmunitionKind, rounds: i32) -> Self {
        Self {
            kind,
            rounds: BoundedInt::ranged(rounds, 1, 10_000),
        }
    }
}

impl Component<Gunsmith> for AmmunitionQuantity {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Munitions
    }

    fn type_name(&self) -> &'static str {
        "Ammunition Quantity"
    }

    fn instance_name(&self) -> String {
        format!("{} {} Rounds", self.rounds.value(), self.kind.label())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        has_conventional_receiver(context, sequence)
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![
            ComponentOption::choice("kind", "Ammunition", self.kind),
            ComponentOption::integer("rounds", "Rounds", &self.rounds),
        ]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "kind" => {
                self.kind = expect_choice(id, value)?;
                Ok(())
            }
            "rounds" => self.rounds.set(id, expect_integer(id, value)?),
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn update_options(&mut self, _sequence: usize, _context: &BuildView<'_, Gunsmith>) {
        self.rounds.constrain(1, 10_000);
    }

    fn create_steps(&self, sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let rounds = fixed(self.rounds.value());
        let mut step = Step::new(self.instance_name())
            .with_credits(CostModifier::Constant(rounds * self.kind.price_per_round()))
            .with_weight(CostModifier::Constant(rounds * round_weight()));
        if self.kind.penetration() > 0 {
            step.add_factor(
                Factor::modify(
                    WeaponAttribute::Penetration,
                    Modifier::Constant(fixed(self.kind.penetration())),
                )
                .non_modifying(),
            );
        }
        if let Some(capacity) = context
            .view()
            .scalar(sequence, WeaponAttribute::AmmoCapacity)
            .filter(|c| *c > fixed(0))
        {
            step.add_note(format!(
                "Enough for {} full reloads",
                format_scalar((rounds / capacity).floor())
            ));
        }
        context.apply_step(step)
    }
}

/// Spare projector fuel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectorFuelQuantity {
    /// Fuel grade.
    pub fuel: FuelKind,
    /// Litres carried.
    pub litres: BoundedInt,
}

impl Default for ProjectorFuelQuantity {
    fn default() -> Self {
        Self::new(FuelKind::Standard, 10)
    }
}

impl ProjectorFuelQuantity {
    /// Create a quantity of spare fuel.
    #[must_use]
    pub fn new(fuel: FuelKind, litres: i32) -> Self {
        Self {
            fuel,
            litres: BoundedInt::ranged(litres, 1, 1000),
        }
    }
}

impl Component<Gunsmith> for ProjectorFuelQuantity {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Munitions
    }

    fn type_name(&self) -> &'static str {
        "Projector Fuel Quantity"
    }

    fn instance_name(&self) -> String {
        format!("{}l {} Fuel", self.litres.value(), self.fuel.label())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        has_projector_receiver(context, sequence)
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![
            ComponentOption::choice("fuel", "Fuel", self.fuel),
            ComponentOption::integer("litres", "Litres", &self.litres),
        ]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "fuel" => {
                self.fuel = expect_choice(id, value)?;
                Ok(())
            }
            "litres" => self.litres.set(id, expect_integer(id, value)?),
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn update_options(&mut self, _sequence: usize, _context: &BuildView<'_, Gunsmith>) {
        self.litres.constrain(1, 1000);
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let litres = fixed(self.litres.value());
        let mut step = Step::new(self.instance_name())
            .with_credits(CostModifier::Constant(
                litres * fixed(self.fuel.price_per_litre()),
            ))
            .with_weight(CostModifier::Constant(litres));
        if self.fuel.extra_dice() != 0 {
            for factor in self.fuel.factors() {
                step.add_factor(factor.non_modifying());
            }
        }
        context.apply_step(step)
    }
}
