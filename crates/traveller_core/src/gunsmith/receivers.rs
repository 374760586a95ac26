//! Receivers: the core of every weapon.

use serde::{Deserialize, Serialize};

use crate::construction::option::{expect_choice, unknown_option};
use crate::construction::{
    AttributeValue, BuildCursor, BuildView, Component, ComponentOption, CostModifier, DiceRoll,
    Factor, OptionChoice, OptionValue, Step,
};
use crate::error::Result;
use crate::math::{fixed, ratio};

use super::{Gunsmith, WeaponAttribute, WeaponStage};

/// Base statistics of a receiver.
struct ReceiverStats {
    tech_level: u32,
    credits: i32,
    /// Weight in tenths of a kilogram.
    weight_tenths: i32,
    damage_dice: i32,
    range: i32,
    capacity: i32,
    quickdraw: i32,
    bulk: Option<&'static str>,
}

impl ReceiverStats {
    fn base_step(&self, name: &str) -> Step<WeaponAttribute> {
        let mut step = Step::new(name)
            .with_credits(CostModifier::Constant(fixed(self.credits)))
            .with_weight(CostModifier::Constant(ratio(self.weight_tenths, 10)))
            .with_factor(Factor::set(
                WeaponAttribute::Damage,
                AttributeValue::DiceRoll(DiceRoll::d6(self.damage_dice, name)),
            ))
            .with_factor(Factor::set(
                WeaponAttribute::Range,
                AttributeValue::scalar(fixed(self.range), name),
            ))
            .with_factor(Factor::set(
                WeaponAttribute::Quickdraw,
                AttributeValue::scalar(fixed(self.quickdraw), name),
            ))
            .with_factor(Factor::set(
                WeaponAttribute::Penetration,
                AttributeValue::scalar(fixed(0), name),
            ))
            .with_factor(Factor::set(
                WeaponAttribute::Heat,
                AttributeValue::scalar(fixed(0), name),
            ));
        if let Some(bulk) = self.bulk {
            step.add_factor(Factor::set(WeaponAttribute::Bulk, AttributeValue::flag(bulk)));
        }
        step
    }
}

/// Size class of a conventional receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReceiverClass {
    /// Pistols and revolvers.
    Handgun,
    /// Carbines and assault rifles.
    #[default]
    Assault,
    /// Rifles and shotguns.
    Longarm,
    /// Squad support weapons.
    LightSupport,
    /// Crew-served support weapons.
    Support,
}

impl OptionChoice for ReceiverClass {
    const ALL: &'static [Self] = &[
        Self::Handgun,
        Self::Assault,
        Self::Longarm,
        Self::LightSupport,
        Self::Support,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Handgun => "Handgun",
            Self::Assault => "Assault Weapon",
            Self::Longarm => "Longarm",
            Self::LightSupport => "Light Support Weapon",
            Self::Support => "Support Weapon",
        }
    }
}

impl ReceiverClass {
    const fn stats(self) -> ReceiverStats {
        match self {
            Self::Handgun => ReceiverStats {
                tech_level: 3,
                credits: 175,
                weight_tenths: 8,
                damage_dice: 3,
                range: 10,
                capacity: 15,
                quickdraw: 4,
                bulk: None,
            },
            Self::Assault => ReceiverStats {
                tech_level: 6,
                credits: 300,
                weight_tenths: 25,
                damage_dice: 3,
                range: 150,
                capacity: 30,
                quickdraw: 0,
                bulk: None,
            },
            Self::Longarm => ReceiverStats {
                tech_level: 3,
                credits: 400,
                weight_tenths: 35,
                damage_dice: 3,
                range: 300,
                capacity: 20,
                quickdraw: -2,
                bulk: None,
            },
            Self::LightSupport => ReceiverStats {
                tech_level: 6,
                credits: 1500,
                weight_tenths: 80,
                damage_dice: 4,
                range: 400,
                capacity: 100,
                quickdraw: -4,
                bulk: Some("Bulky"),
            },
            Self::Support => ReceiverStats {
                tech_level: 6,
                credits: 3000,
                weight_tenths: 150,
                damage_dice: 5,
                range: 500,
                capacity: 200,
                quickdraw: -6,
                bulk: Some("Very Bulky"),
            },
        }
    }
}

/// Receiver for cartridge firearms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConventionalReceiver {
    /// Size class.
    pub class: ReceiverClass,
}

impl ConventionalReceiver {
    /// Create a receiver of the given class.
    #[must_use]
    pub const fn new(class: ReceiverClass) -> Self {
        Self { class }
    }
}

impl Component<Gunsmith> for ConventionalReceiver {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Receiver
    }

    fn type_name(&self) -> &'static str {
        "Conventional Receiver"
    }

    fn instance_name(&self) -> String {
        format!("{} Receiver", self.class.label())
    }

    fn is_compatible(&self, _sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        context.tech_level() >= self.class.stats().tech_level
    }

    fn options(&self) -> Vec<ComponentOption> {
        vec![ComponentOption::choice("class", "Receiver Class", self.class)]
    }

    fn set_option(&mut self, id: &str, value: &OptionValue) -> Result<()> {
        match id {
            "class" => {
                self.class = expect_choice(id, value)?;
                Ok(())
            }
            _ => Err(unknown_option(self.type_name(), id)),
        }
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let stats = self.class.stats();
        let name = self.instance_name();
        let step = stats.base_step(&name).with_factor(Factor::set(
            WeaponAttribute::AmmoCapacity,
            AttributeValue::scalar(fixed(stats.capacity), name.as_str()),
        ));
        context.apply_step(step)
    }
}

/// Receiver for flame and liquid projectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectorReceiver;

const PROJECTOR: ReceiverStats = ReceiverStats {
    tech_level: 4,
    credits: 500,
    weight_tenths: 50,
    damage_dice: 3,
    range: 10,
    capacity: 0,
    quickdraw: -4,
    bulk: Some("Bulky"),
};

const PROJECTOR_FUEL_LITRES: i32 = 10;

impl Component<Gunsmith> for ProjectorReceiver {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Receiver
    }

    fn type_name(&self) -> &'static str {
        "Projector Receiver"
    }

    fn is_compatible(&self, _sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        context.tech_level() >= PROJECTOR.tech_level
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let step = PROJECTOR
            .base_step(self.type_name())
            .with_factor(Factor::set(
                WeaponAttribute::FuelCapacity,
                AttributeValue::scalar(fixed(PROJECTOR_FUEL_LITRES), "Fuel tank"),
            ))
            .with_note("Fires a stream of fuel; needs loaded projector fuel");
        context.apply_step(step)
    }
}

/// Receiver for energy weapons drawing on an external power pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PowerPackReceiver;

const POWER_PACK: ReceiverStats = ReceiverStats {
    tech_level: 9,
    credits: 2000,
    weight_tenths: 30,
    damage_dice: 3,
    range: 200,
    capacity: 0,
    quickdraw: 0,
    bulk: None,
};

impl Component<Gunsmith> for PowerPackReceiver {
    fn stage(&self) -> WeaponStage {
        WeaponStage::Receiver
    }

    fn type_name(&self) -> &'static str {
        "Power Pack Receiver"
    }

    fn is_compatible(&self, _sequence: usize, context: &BuildView<'_, Gunsmith>) -> bool {
        context.tech_level() >= POWER_PACK.tech_level
    }

    fn create_steps(&self, _sequence: usize, context: &mut BuildCursor<'_, Gunsmith>) -> Result<()> {
        let step = POWER_PACK
            .base_step(self.type_name())
            .with_note("Shots are drawn from a loaded power pack");
        context.apply_step(step)
    }
}
