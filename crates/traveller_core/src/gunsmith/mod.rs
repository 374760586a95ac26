//! Firearm construction rules.
//!
//! A weapon is built receiver first: the receiver sets the base damage,
//! range and capacity, mechanisms and features adjust them, a multi-mount
//! duplicates everything bought so far, and loading and munitions add the
//! consumables. Weapons may hold several sequences for multi-barrel
//! assemblies; each sequence is an independent weapon with its own
//! receiver.
//!
//! ## Stage order
//!
//! Receiver → Mechanism → Capacity → Features → Multi-Mount → Loading →
//! Loaded Multi-Mount → Munitions → Finalisation

mod capacity;
mod features;
mod finalisation;
mod loading;
mod mechanisms;
mod multimount;
mod munitions;
mod receivers;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConstructionConfig;
use crate::construction::component::component_enum;
use crate::construction::{
    AttributeValue, BuildView, ConstructionDomain, Factor, Modifier, OptionChoice, PhaseKind,
    StageKind,
};
use crate::math::{fixed, Fixed};

pub use capacity::{DecreasedCapacity, IncreasedCapacity};
pub use features::{Bullpup, HighCycleRate, Lightweight, Suppressor};
pub use finalisation::WeaponFinalisation;
pub use loading::{
    AmmunitionKind, FuelKind, LoadedAmmunition, LoadedMagazine, LoadedPowerPack,
    LoadedProjectorFuel, PowerPackKind,
};
pub use mechanisms::{
    BurstCapableMechanism, FullyAutomaticMechanism, RepeaterMechanism, SemiAutomaticMechanism,
    SingleShotMechanism,
};
pub use multimount::{MultiMount, MultiMountLoaded};
pub use munitions::{AmmunitionQuantity, ProjectorFuelQuantity};
pub use receivers::{ConventionalReceiver, PowerPackReceiver, ProjectorReceiver, ReceiverClass};

/// Firearm build kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Gunsmith;

/// Attributes derived for a weapon sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeaponAttribute {
    /// Damage dice.
    Damage,
    /// Effective range in metres.
    Range,
    /// Rounds or shots per load.
    AmmoCapacity,
    /// Projector fuel tank in litres.
    FuelCapacity,
    /// Quickdraw modifier.
    Quickdraw,
    /// Auto score.
    Auto,
    /// `RF` or `VRF` escalation flag.
    FireRate,
    /// Armour piercing.
    Penetration,
    /// Heat generated per attack.
    Heat,
    /// `Bulky` or `Very Bulky`.
    Bulk,
    /// Physical signature flag.
    Signature,
    /// Number of weapons in a multi-mount.
    MountCount,
}

impl fmt::Display for WeaponAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Damage => "Damage",
            Self::Range => "Range",
            Self::AmmoCapacity => "Ammo Capacity",
            Self::FuelCapacity => "Fuel Capacity",
            Self::Quickdraw => "Quickdraw",
            Self::Auto => "Auto",
            Self::FireRate => "Fire Rate",
            Self::Penetration => "AP",
            Self::Heat => "Heat",
            Self::Bulk => "Bulk",
            Self::Signature => "Physical Signature",
            Self::MountCount => "Mount Count",
        })
    }
}

/// Reporting phases of a weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeaponPhase {
    /// Receiver, mechanism, capacity and features.
    Receiver,
    /// Multi-mount duplication.
    MultiMount,
    /// Loaded magazines, ammunition, power packs and fuel.
    Loading,
    /// Spare munitions.
    Munitions,
    /// Trait notes.
    Finalisation,
}

impl PhaseKind for WeaponPhase {
    fn name(self) -> &'static str {
        match self {
            Self::Receiver => "Receiver",
            Self::MultiMount => "Multi-Mount",
            Self::Loading => "Loading",
            Self::Munitions => "Munitions",
            Self::Finalisation => "Finalisation",
        }
    }
}

/// Stages of a weapon sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeaponStage {
    /// Exactly one receiver.
    Receiver,
    /// At most one firing mechanism.
    Mechanism,
    /// At most one capacity change.
    Capacity,
    /// Optional features.
    Features,
    /// At most one multi-mount.
    MultiMount,
    /// Loaded consumables.
    Loading,
    /// Engine-owned: scales loaded consumables by the mount count.
    LoadedMultiMount,
    /// Spare munitions.
    Munitions,
    /// Engine-owned: trait notes.
    Finalisation,
}

const WEAPON_LAYOUT: [WeaponStage; 9] = [
    WeaponStage::Receiver,
    WeaponStage::Mechanism,
    WeaponStage::Capacity,
    WeaponStage::Features,
    WeaponStage::MultiMount,
    WeaponStage::Loading,
    WeaponStage::LoadedMultiMount,
    WeaponStage::Munitions,
    WeaponStage::Finalisation,
];

impl StageKind for WeaponStage {
    type Phase = WeaponPhase;

    fn name(self) -> &'static str {
        match self {
            Self::Receiver => "Receiver",
            Self::Mechanism => "Mechanism",
            Self::Capacity => "Capacity",
            Self::Features => "Features",
            Self::MultiMount => "Multi-Mount",
            Self::Loading => "Loading",
            Self::LoadedMultiMount => "Loaded Multi-Mount",
            Self::Munitions => "Munitions",
            Self::Finalisation => "Finalisation",
        }
    }

    fn phase(self) -> WeaponPhase {
        match self {
            Self::Receiver | Self::Mechanism | Self::Capacity | Self::Features => {
                WeaponPhase::Receiver
            }
            Self::MultiMount => WeaponPhase::MultiMount,
            Self::Loading | Self::LoadedMultiMount => WeaponPhase::Loading,
            Self::Munitions => WeaponPhase::Munitions,
            Self::Finalisation => WeaponPhase::Finalisation,
        }
    }

    fn min_components(self) -> usize {
        match self {
            Self::Receiver | Self::LoadedMultiMount | Self::Finalisation => 1,
            _ => 0,
        }
    }

    fn max_components(self) -> usize {
        match self {
            Self::Receiver
            | Self::Mechanism
            | Self::Capacity
            | Self::MultiMount
            | Self::LoadedMultiMount
            | Self::Finalisation => 1,
            Self::Loading => 3,
            Self::Features => 4,
            Self::Munitions => 8,
        }
    }

    fn is_internal(self) -> bool {
        matches!(self, Self::LoadedMultiMount | Self::Finalisation)
    }
}

component_enum! {
    /// Every weapon component.
    pub enum WeaponComponent for Gunsmith {
        /// Conventional firearm receiver.
        ConventionalReceiver(ConventionalReceiver),
        /// Fuel projector receiver.
        ProjectorReceiver(ProjectorReceiver),
        /// Energy weapon receiver fed by a power pack.
        PowerPackReceiver(PowerPackReceiver),
        /// Single-shot mechanism.
        SingleShot(SingleShotMechanism),
        /// Manually cycled repeater.
        Repeater(RepeaterMechanism),
        /// Semi-automatic mechanism.
        SemiAutomatic(SemiAutomaticMechanism),
        /// Burst-capable mechanism.
        BurstCapable(BurstCapableMechanism),
        /// Fully automatic mechanism.
        FullyAutomatic(FullyAutomaticMechanism),
        /// Increased ammunition capacity.
        IncreasedCapacity(IncreasedCapacity),
        /// Decreased ammunition capacity.
        DecreasedCapacity(DecreasedCapacity),
        /// Lightweight construction.
        Lightweight(Lightweight),
        /// Bullpup layout.
        Bullpup(Bullpup),
        /// Integral suppressor.
        Suppressor(Suppressor),
        /// High cycle rate.
        HighCycleRate(HighCycleRate),
        /// Several identical weapons fired together.
        MultiMount(MultiMount),
        /// Loaded magazine.
        LoadedMagazine(LoadedMagazine),
        /// Loaded ammunition.
        LoadedAmmunition(LoadedAmmunition),
        /// Loaded power pack.
        LoadedPowerPack(LoadedPowerPack),
        /// Loaded projector fuel.
        LoadedProjectorFuel(LoadedProjectorFuel),
        /// Engine-owned loaded multi-mount scaling.
        MultiMountLoaded(MultiMountLoaded),
        /// Spare ammunition.
        AmmunitionQuantity(AmmunitionQuantity),
        /// Spare projector fuel.
        ProjectorFuelQuantity(ProjectorFuelQuantity),
        /// Engine-owned weapon finalisation.
        Finalisation(WeaponFinalisation),
    }
}

impl ConstructionDomain for Gunsmith {
    type Attribute = WeaponAttribute;
    type Phase = WeaponPhase;
    type Stage = WeaponStage;
    type Component = WeaponComponent;

    const KIND: &'static str = "weapon";
    const MULTI_SEQUENCE: bool = true;

    fn stage_layout() -> &'static [WeaponStage] {
        &WEAPON_LAYOUT
    }

    fn initial_components(_config: &ConstructionConfig) -> Vec<(WeaponStage, WeaponComponent)> {
        vec![
            (WeaponStage::LoadedMultiMount, MultiMountLoaded.into()),
            (WeaponStage::Finalisation, WeaponFinalisation.into()),
        ]
    }
}

impl WeaponComponent {
    /// Every component a collaborator may offer for a stage, with default
    /// options. Engine-owned stages yield nothing.
    #[must_use]
    pub fn catalogue(stage: WeaponStage) -> Vec<Self> {
        match stage {
            WeaponStage::Receiver => ReceiverClass::ALL
                .iter()
                .map(|class| ConventionalReceiver::new(*class).into())
                .chain([ProjectorReceiver.into(), PowerPackReceiver.into()])
                .collect(),
            WeaponStage::Mechanism => vec![
                SingleShotMechanism.into(),
                RepeaterMechanism.into(),
                SemiAutomaticMechanism.into(),
                BurstCapableMechanism.into(),
                FullyAutomaticMechanism.into(),
            ],
            WeaponStage::Capacity => vec![
                IncreasedCapacity::default().into(),
                DecreasedCapacity::default().into(),
            ],
            WeaponStage::Features => vec![
                Lightweight::default().into(),
                Bullpup.into(),
                Suppressor.into(),
                HighCycleRate::default().into(),
            ],
            WeaponStage::MultiMount => vec![MultiMount::default().into()],
            WeaponStage::Loading => vec![
                LoadedMagazine.into(),
                LoadedAmmunition::default().into(),
                LoadedPowerPack::default().into(),
                LoadedProjectorFuel::default().into(),
            ],
            WeaponStage::Munitions => vec![
                AmmunitionQuantity::default().into(),
                ProjectorFuelQuantity::default().into(),
            ],
            WeaponStage::LoadedMultiMount | WeaponStage::Finalisation => Vec::new(),
        }
    }
}

// ============================================================================
// Shared predicates
// ============================================================================

pub(crate) fn has_conventional_receiver(view: &BuildView<'_, Gunsmith>, sequence: usize) -> bool {
    view.has_component(sequence, |c| matches!(c, WeaponComponent::ConventionalReceiver(_)))
}

pub(crate) fn has_projector_receiver(view: &BuildView<'_, Gunsmith>, sequence: usize) -> bool {
    view.has_component(sequence, |c| matches!(c, WeaponComponent::ProjectorReceiver(_)))
}

pub(crate) fn has_power_pack_receiver(view: &BuildView<'_, Gunsmith>, sequence: usize) -> bool {
    view.has_component(sequence, |c| matches!(c, WeaponComponent::PowerPackReceiver(_)))
}

pub(crate) fn has_single_shot(view: &BuildView<'_, Gunsmith>, sequence: usize) -> bool {
    view.has_component(sequence, |c| matches!(c, WeaponComponent::SingleShot(_)))
}

// ============================================================================
// Fire-rate escalation
// ============================================================================

/// Rapid-fire escalation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum FireRate {
    Rapid,
    VeryRapid,
}

impl FireRate {
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Rapid => "RF",
            Self::VeryRapid => "VRF",
        }
    }

    pub(crate) fn from_label(label: &str) -> Option<Self> {
        match label {
            "RF" => Some(Self::Rapid),
            "VRF" => Some(Self::VeryRapid),
            _ => None,
        }
    }

    pub(crate) const fn multiplier(self) -> i32 {
        match self {
            Self::Rapid => 1,
            Self::VeryRapid => 2,
        }
    }

    /// Escalation earned by a combined Auto score.
    pub(crate) fn for_combined_auto(auto: Fixed) -> Option<Self> {
        if auto >= fixed(8) {
            Some(Self::VeryRapid)
        } else if auto >= fixed(4) {
            Some(Self::Rapid)
        } else {
            None
        }
    }

    /// Current escalation of a sequence.
    pub(crate) fn current(view: &BuildView<'_, Gunsmith>, sequence: usize) -> Option<Self> {
        view.flag(sequence, WeaponAttribute::FireRate)
            .and_then(Self::from_label)
    }
}

/// Factors escalating a weapon to `rate`.
///
/// AP and Heat grow with the damage dice the weapon had before this
/// escalation, so `dice` must be read before the step adds dice.
pub(crate) fn escalation_factors(
    view: &BuildView<'_, Gunsmith>,
    sequence: usize,
    rate: FireRate,
    dice: i32,
) -> Vec<Factor<WeaponAttribute>> {
    let bonus = fixed(dice * rate.multiplier());
    let flag = match FireRate::current(view, sequence) {
        Some(existing) if existing > rate => existing,
        _ => rate,
    };
    vec![
        Factor::set(WeaponAttribute::FireRate, AttributeValue::flag(flag.label())),
        add_scalar(view, sequence, WeaponAttribute::Penetration, bonus, rate.label()),
        add_scalar(view, sequence, WeaponAttribute::Heat, bonus, rate.label()),
        Factor::modify(WeaponAttribute::Damage, Modifier::DiceCount(rate.multiplier())),
    ]
}

/// Add to a scalar, setting it when absent.
pub(crate) fn add_scalar(
    view: &BuildView<'_, Gunsmith>,
    sequence: usize,
    attribute: WeaponAttribute,
    amount: Fixed,
    label: &str,
) -> Factor<WeaponAttribute> {
    if view.has_attribute(sequence, attribute) {
        Factor::modify(attribute, Modifier::Constant(amount))
    } else {
        Factor::set(attribute, AttributeValue::scalar(amount, label))
    }
}
