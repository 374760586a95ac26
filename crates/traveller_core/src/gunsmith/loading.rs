//! Loaded consumables: magazines, ammunition, power packs and fuel.

use serde::{Deserialize, Serialize};

use crate::construction::option::{expect_choice, unknown_option};
use crate::construction::{
    AttributeValue, BuildCursor, BuildView, Component, ComponentOption, CostModifier, Factor,
    Modifier, OptionChoice, OptionValue, Step,
};
use crate::error::Result;
use crate::math::{fixed, format_scalar, ratio, Fixed, Rounding};

use super::{
    has_conventional_receiver, has_power_pack_receiver, has_projector_receiver, Gunsmith,
    WeaponAttribute, WeaponComponent, WeaponStage,
};

/// Weight of one cartridge in kilograms.
pub(crate) fn round_weight() -> Fixed {
    ratio(1, 100)
}

/// Cartridge type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AmmunitionKind {
    /// Standard ball rounds.
    #[default]
    Ball,
    /// Armour-piercing rounds.
    ArmourPiercing,
}

impl OptionChoice for AmmunitionKind {
    const ALL: &'static [Self] = &[Self::Ball, Self::ArmourPiercing];

    fn label(self) -> &'static str {
        match self {
            Self::Ball => "Ball",
            Self::ArmourPiercing => "Armour Piercing",
        }
    }
}

impl AmmunitionKind {
    /// Price of one round.
    #[must_use]
    pub fn price_per_round(self) -> Fixed {
        match self {
            Self::Ball => ratio(1, 2),
            Self::ArmourPiercing => fixed(2),
        }
    }

    /// AP granted by the round.
    #[must_use]
    pub const fn penetration(self) -> i32 {
        match self {
            Self::Ball => 0,
            Self::ArmourPiercing => 2,
        }
    }
}

/// Power pack rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PowerPackKind {
    /// Many weak shots.
    Weak,
    /// Balanced.
    #[default]
    Standard,
    /// Few strong shots.
    Strong,
}

impl OptionChoice for PowerPackKind {
    const ALL: &'static [Self] = &[Self::Weak, Self::Standard, Self::Strong];

    fn label(self) -> &'static str {
        match self {
            Self::Weak => "Weak",
            Self::Standard => "Standard",
            Self::Strong => "Strong",
        }
    }
}

impl PowerPackKind {
    const fn credits(self) -> i32 {
        match self {
            Self::Weak => 100,
            Self::Standard => 150,
            Self::Strong => 250,
        }
    }

    fn weight(self) -> Fixed {
        match self {
            Self::Weak => ratio(1, 2),
            Self::Standard => fixed(1),
            Self::Strong => ratio(3, 2),
        }
    }

    const fn shots(self) -> i32 {
        match self {
            Self::Weak => 40,
            Self::Standard => 25,
            Self::Strong => 15,
        }
    }

    const fn damage_dice(self) -> i32 {
        match self {
            Self::Weak => -1,
            Self::Standard => 0,
            Self::Strong => 1,
        }
    }
}

/// Projector fuel grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FuelKind {
    /// Standard incendiary fuel.
    #[default]
    Standard,
    /// Advanced high-energy fuel.
    Advanced,
}

impl OptionChoice for FuelKind {
    const ALL: &'static [Self] = &[Self::Standard, Self::Advanced];

    fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Advanced => "Advanced",
        }
    }
}

impl FuelKind {
    /// Price of one litre.
    #[must_use]
    pub const fn price_per_litre(self) -> i32 {
        match self {
            Self::Standard => 10,
            Self::Advanced => 25,
        }
    }

    /// Extra damage dice the fuel grants.
    #[must_use]
    pub const fn extra_dice(self) -> i32 {
        match self {
            Self::Standard => 0,
            Self::Advanced => 1,
        }
    }

    /// Range change in percent.
    #[must_use]
    pub const fn range_percent(self) -> i32 {
        match self {
            Self::Standard => 0,
            Self::Advanced => 50,
        }
    }

    /// Damage and range factors of this fuel.
    pub(crate) fn factors(self) -> [Factor<WeaponAttribute>; 2] {
        [
            Factor::modify(WeaponAttribute::Damage, Modifier::DiceCount(self.extra_dice())),
            Factor::modify(
                WeaponAttribute::Range,
                Modifier::percentage(self.range_percent(), Rounding::Floor),
            ),
        ]
    }
}

fn loads_cartridges(context: &BuildView<'_, Gunsmith>, sequence: usize) -> bool {
    has_conventional_receiver(context, sequence)
        && context.has_attribute(sequence, WeaponAttribute::AmmoCapacity)
}

fn capacity(context: &BuildView<'_, Gunsmith>, sequence: usize) -> Fixed {
    context
        .scalar(sequence, WeaponAttribute::AmmoCapacity)
        .unwrap_or(Fixed::ZERO)
}

/// Empty magazine sized to the current capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadedMagazine;

impl Component<Gunsmith> for LoadedMagazine {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Loading
    }

    fn type_name(&self) -> &'static str {
        "Loaded Magazine"
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        loads_cartridges(context, sequence)
            && !context.has_component(sequence, |c| matches!(c, WeaponComponent::SingleShot(_)))
            && !context
                .has_component_before(sequence, |c| matches!(c, WeaponComponent::LoadedMagazine(_)))
    }

    fn create_steps(&self, sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let rounds = capacity(&context.view(), sequence);
        let step = Step::new("Magazine")
            .with_credits(CostModifier::Constant(fixed(10)))
            .with_weight(CostModifier::Constant(rounds * ratio(1, 200)))
            .with_note(format!("Holds {} rounds", format_scalar(rounds)));
        context.apply_step(step)
    }
}

/// A full load of cartridges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadedAmmunition {
    /// Cartridge type.
    pub kind: AmmunitionKind,
}

impl Component<Gunsmith> for LoadedAmmunition {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Loading
    }

    fn type_name(&self) -> &'static str {
        "Loaded Ammunition"
    }

    fn instance_name(&self) -> String {
        format!("Loaded {} Ammunition", self.kind.label())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        loads_cartridges(context, sequence)
            && !context.has_component_before(sequence, |c| {
                matches!(c, WeaponComponent::LoadedAmmunition(_))
            })
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::choice("kind", "Ammunition", self.kind)]
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

    fn create_steps(&self, sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let rounds = capacity(&context.view(), sequence);
        let mut step = Step::new(format!("{} Rounds x{}", self.kind.label(), format_scalar(rounds)))
            .with_credits(CostModifier::Constant(rounds * self.kind.price_per_round()))
            .with_weight(CostModifier::Constant(rounds * round_weight()));
        if self.kind.penetration() > 0 {
            step.add_factor(Factor::modify(
                WeaponAttribute::Penetration,
                Modifier::Constant(fixed(self.kind.penetration())),
            ));
        }
        context.apply_step(step)
    }
}

/// A power pack connected to an energy weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadedPowerPack {
    /// Pack rating.
    pub kind: PowerPackKind,
}

impl Component<Gunsmith> for LoadedPowerPack {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Loading
    }

    fn type_name(&self) -> &'static str {
        "Loaded Power Pack"
    }

    fn instance_name(&self) -> String {
        format!("{} Power Pack", self.kind.label())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        has_power_pack_receiver(context, sequence)
            && !context
                .has_component_before(sequence, |c| matches!(c, WeaponComponent::LoadedPowerPack(_)))
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::choice("kind", "Power Pack", self.kind)]
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

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let mut step = Step::new(self.instance_name())
            .with_credits(CostModifier::Constant(fixed(self.kind.credits())))
            .with_weight(CostModifier::Constant(self.kind.weight()))
            .with_factor(Factor::set(
                WeaponAttribute::AmmoCapacity,
                AttributeValue::scalar(fixed(self.kind.shots()), "Power pack shots"),
            ));
        if self.kind.damage_dice() != 0 {
            step.add_factor(Factor::modify(
                WeaponAttribute::Damage,
                Modifier::DiceCount(self.kind.damage_dice()),
            ));
        }
        context.apply_step(step)
    }
}

/// A full tank of projector fuel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadedProjectorFuel {
    /// Fuel grade.
    pub fuel: FuelKind,
}

impl Component<Gunsmith> for LoadedProjectorFuel {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Loading
    }

    fn type_name(&self) -> &'static str {
        "Loaded Projector Fuel"
    }

    fn instance_name(&self) -> String {
        format!("Loaded {} Fuel", self.fuel.label())
    }

    fn is_compatible(&self, sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        has_projector_receiver(context, sequence)
            && context.has_attribute(sequence, WeaponAttribute::FuelCapacity)
            && !context.has_component_before(sequence, |c| {
                matches!(c, WeaponComponent::LoadedProjectorFuel(_))
            })
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::choice("fuel", "Fuel", self.fuel)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "fuel" => {
                self.fuel = expect_choice(id, value)?;
                Ok(())
            }
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn create_steps(&self, sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let litres = context
            .view()
            .scalar(sequence, WeaponAttribute::FuelCapacity)
            .unwrap_or(Fixed::ZERO);
        let mut step = Step::new(format!(
            "{} Fuel x{}l",
            self.fuel.label(),
            format_scalar(litres)
        ))
        .with_credits(CostModifier::Constant(
            litres * fixed(self.fuel.price_per_litre()),
        ))
        .with_weight(CostModifier::Constant(litres));
        if self.fuel.extra_dice() != 0 {
            for factor in self.fuel.factors() {
                step.add_factor(factor);
            }
        }
        context.apply_step(step)
    }
}
