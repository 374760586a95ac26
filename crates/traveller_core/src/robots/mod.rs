//! Robot construction rules.
//!
//! A robot is a single sequence. The chassis sets hits, slots and base
//! cost; locomotion multiplies the chassis cost and sets movement traits;
//! options, manipulators and slot options consume slots; the brain and
//! skill packages consume bandwidth. Finalisation reports traits and flags
//! slot or bandwidth overruns as advisory notes.
//!
//! ## Stage order
//!
//! Chassis → Locomotion → Chassis Options → Movement Options → Secondary
//! Locomotion → Manipulators → Slot Options → Brain → Skills → Finalisation

mod brain;
mod chassis;
mod finalisation;
mod locomotion;
mod manipulators;
mod slot_options;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConstructionConfig;
use crate::construction::component::component_enum;
use crate::construction::{BuildView, ConstructionDomain, OptionChoice, PhaseKind, StageKind};

pub use brain::{Brain, BrainKind, RobotSkill, SkillPackage};
pub use chassis::{ArmourModification, Chassis, EnduranceModification, ResiliencyModification};
pub use finalisation::RobotFinalisation;
pub use locomotion::{
    AgilityEnhancement, Locomotion, LocomotionKind, SecondaryLocomotion, SpeedModification,
};
pub use manipulators::Manipulator;
pub use slot_options::{Autopilot, ImprovedMaintenance, StealthCoating, StorageCompartment};

/// Robot build kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Robots;

/// Attributes derived for a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RobotAttribute {
    /// Chassis size.
    Size,
    /// Damage the robot can take.
    Hits,
    /// Armour.
    Protection,
    /// Operating hours between recharges.
    Endurance,
    /// Agility DM.
    Agility,
    /// Speed in metres per round.
    Speed,
    /// Slots available.
    MaxSlots,
    /// Primary locomotion name.
    Locomotion,
    /// All-terrain trait.
    Atv,
    /// Air-cushion trait.
    Acv,
    /// Water trait.
    Seafarer,
    /// Flyer trait with its speed band.
    Flyer,
    /// Vacuum thruster trait.
    Thruster,
    /// Stealth grade.
    Stealth,
    /// Autopilot rating.
    Autopilot,
    /// Brain intelligence.
    Intelligence,
    /// Bandwidth the brain supports.
    MaxBandwidth,
}

impl fmt::Display for RobotAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Size => "Size",
            Self::Hits => "Hits",
            Self::Protection => "Protection",
            Self::Endurance => "Endurance",
            Self::Agility => "Agility",
            Self::Speed => "Speed",
            Self::MaxSlots => "Max Slots",
            Self::Locomotion => "Locomotion",
            Self::Atv => "ATV",
            Self::Acv => "ACV",
            Self::Seafarer => "Seafarer",
            Self::Flyer => "Flyer",
            Self::Thruster => "Thruster",
            Self::Stealth => "Stealth",
            Self::Autopilot => "Autopilot",
            Self::Intelligence => "INT",
            Self::MaxBandwidth => "Max Bandwidth",
        })
    }
}

/// Reporting phases of a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RobotPhase {
    /// Chassis, locomotion and their options.
    Chassis,
    /// Manipulators.
    Manipulators,
    /// Slot options.
    SlotOptions,
    /// Brain and skills.
    Brain,
    /// Trait notes and overrun warnings.
    Finalisation,
}

impl PhaseKind for RobotPhase {
    fn name(self) -> &'static str {
        match self {
            Self::Chassis => "Chassis",
            Self::Manipulators => "Manipulators",
            Self::SlotOptions => "Slot Options",
            Self::Brain => "Brain",
            Self::Finalisation => "Finalisation",
        }
    }
}

/// Stages of a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RobotStage {
    /// Exactly one chassis.
    Chassis,
    /// Exactly one primary locomotion.
    Locomotion,
    /// Armour, endurance and resiliency changes.
    ChassisOptions,
    /// Agility and speed changes.
    MovementOptions,
    /// At most one secondary locomotion.
    SecondaryLocomotion,
    /// Manipulators.
    Manipulators,
    /// Slot options.
    SlotOptions,
    /// Exactly one brain.
    Brain,
    /// Skill packages.
    Skills,
    /// Engine-owned: trait notes and overrun warnings.
    Finalisation,
}

const ROBOT_LAYOUT: [RobotStage; 10] = [
    RobotStage::Chassis,
    RobotStage::Locomotion,
    RobotStage::ChassisOptions,
    RobotStage::MovementOptions,
    RobotStage::SecondaryLocomotion,
    RobotStage::Manipulators,
    RobotStage::SlotOptions,
    RobotStage::Brain,
    RobotStage::Skills,
    RobotStage::Finalisation,
];

impl StageKind for RobotStage {
    type Phase = RobotPhase;

    fn name(self) -> &'static str {
        match self {
            Self::Chassis => "Chassis",
            Self::Locomotion => "Locomotion",
            Self::ChassisOptions => "Chassis Options",
            Self::MovementOptions => "Movement Options",
            Self::SecondaryLocomotion => "Secondary Locomotion",
            Self::Manipulators => "Manipulators",
            Self::SlotOptions => "Slot Options",
            Self::Brain => "Brain",
            Self::Skills => "Skills",
            Self::Finalisation => "Finalisation",
        }
    }

    fn phase(self) -> RobotPhase {
        match self {
            Self::Chassis
            | Self::Locomotion
            | Self::ChassisOptions
            | Self::MovementOptions
            | Self::SecondaryLocomotion => RobotPhase::Chassis,
            Self::Manipulators => RobotPhase::Manipulators,
            Self::SlotOptions => RobotPhase::SlotOptions,
            Self::Brain | Self::Skills => RobotPhase::Brain,
            Self::Finalisation => RobotPhase::Finalisation,
        }
    }

    fn min_components(self) -> usize {
        match self {
            Self::Chassis | Self::Locomotion | Self::Brain | Self::Finalisation => 1,
            _ => 0,
        }
    }

    fn max_components(self) -> usize {
        match self {
            Self::Chassis
            | Self::Locomotion
            | Self::SecondaryLocomotion
            | Self::Brain
            | Self::Finalisation => 1,
            Self::MovementOptions => 2,
            Self::ChassisOptions => 3,
            Self::Manipulators => 8,
            Self::SlotOptions | Self::Skills => 16,
        }
    }

    fn is_internal(self) -> bool {
        self == Self::Finalisation
    }
}

component_enum! {
    /// Every robot component.
    pub enum RobotComponent for Robots {
        /// Chassis.
        Chassis(Chassis),
        /// Primary locomotion.
        Locomotion(Locomotion),
        /// Armour change.
        ArmourModification(ArmourModification),
        /// Endurance change.
        EnduranceModification(EnduranceModification),
        /// Resiliency change.
        ResiliencyModification(ResiliencyModification),
        /// Agility enhancement.
        AgilityEnhancement(AgilityEnhancement),
        /// Speed change.
        SpeedModification(SpeedModification),
        /// Secondary locomotion.
        SecondaryLocomotion(SecondaryLocomotion),
        /// Manipulator arm.
        Manipulator(Manipulator),
        /// Improved maintenance.
        ImprovedMaintenance(ImprovedMaintenance),
        /// Stealth coating.
        StealthCoating(StealthCoating),
        /// Autopilot.
        Autopilot(Autopilot),
        /// Storage compartment.
        StorageCompartment(StorageCompartment),
        /// Brain.
        Brain(Brain),
        /// Skill package.
        SkillPackage(SkillPackage),
        /// Engine-owned robot finalisation.
        Finalisation(RobotFinalisation),
    }
}

impl ConstructionDomain for Robots {
    type Attribute = RobotAttribute;
    type Phase = RobotPhase;
    type Stage = RobotStage;
    type Component = RobotComponent;

    const KIND: &'static str = "robot";
    const MULTI_SEQUENCE: bool = false;

    fn stage_layout() -> &'static [RobotStage] {
        &ROBOT_LAYOUT
    }

    fn initial_components(_config: &ConstructionConfig) -> Vec<(RobotStage, RobotComponent)> {
        vec![
            (RobotStage::Chassis, Chassis::default().into()),
            (RobotStage::Locomotion, Locomotion::default().into()),
            (RobotStage::Brain, Brain::default().into()),
            (RobotStage::Finalisation, RobotFinalisation.into()),
        ]
    }
}

impl RobotComponent {
    /// Every component a collaborator may offer for a stage, with default
    /// options. The engine-owned stage yields nothing.
    #[must_use]
    pub fn catalogue(stage: RobotStage) -> Vec<Self> {
        match stage {
            RobotStage::Chassis => (1..=8).map(|size| Chassis::new(size).into()).collect(),
            RobotStage::Locomotion => LocomotionKind::ALL
                .iter()
                .map(|kind| Locomotion::new(*kind).into())
                .collect(),
            RobotStage::ChassisOptions => vec![
                ArmourModification::default().into(),
                EnduranceModification::default().into(),
                ResiliencyModification::default().into(),
            ],
            RobotStage::MovementOptions => vec![
                AgilityEnhancement::default().into(),
                SpeedModification::default().into(),
            ],
            RobotStage::SecondaryLocomotion => LocomotionKind::ALL
                .iter()
                .filter(|kind| **kind != LocomotionKind::None)
                .map(|kind| SecondaryLocomotion::new(*kind).into())
                .collect(),
            RobotStage::Manipulators => vec![Manipulator::default().into()],
            RobotStage::SlotOptions => vec![
                ImprovedMaintenance.into(),
                StealthCoating::default().into(),
                Autopilot::default().into(),
                StorageCompartment::default().into(),
            ],
            RobotStage::Brain => BrainKind::ALL
                .iter()
                .map(|kind| Brain::new(*kind).into())
                .collect(),
            RobotStage::Skills => RobotSkill::ALL
                .iter()
                .map(|skill| SkillPackage::new(*skill, 0).into())
                .collect(),
            RobotStage::Finalisation => Vec::new(),
        }
    }
}

/// Primary locomotion of the robot, if attached.
pub(crate) fn primary_locomotion(view: &BuildView<'_, Robots>, sequence: usize) -> Option<LocomotionKind> {
    view.find_component(sequence, |c| match c {
        RobotComponent::Locomotion(l) => Some(l.kind),
        _ => None,
    })
}

/// Check if the robot can move under its own power.
pub(crate) fn is_mobile(view: &BuildView<'_, Robots>, sequence: usize) -> bool {
    primary_locomotion(view, sequence).is_some_and(|kind| kind != LocomotionKind::None)
}
