//! Test fixtures and helpers.
//!
//! Sample weapons and robots built through the public editing API, for
//! consistent testing across crates.

use traveller_core::config::ConstructionConfig;
use traveller_core::construction::Context;
use traveller_core::gunsmith::{
    AmmunitionKind, AmmunitionQuantity, ConventionalReceiver, FullyAutomaticMechanism, FuelKind,
    Gunsmith, LoadedAmmunition, LoadedMagazine, LoadedPowerPack, MultiMount, PowerPackReceiver,
    ProjectorFuelQuantity, ProjectorReceiver, ReceiverClass, SemiAutomaticMechanism,
    WeaponComponent, WeaponStage,
};
use traveller_core::math::Fixed;
use traveller_core::robots::{
    Brain, BrainKind, Chassis, Locomotion, LocomotionKind, Manipulator, RobotComponent,
    RobotSkill, RobotStage, Robots, SkillPackage, StorageCompartment,
};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> Fixed {
    Fixed::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: construction code never uses floats. This is only for
/// convenient test assertions.
#[must_use]
pub fn fixed_f(n: f64) -> Fixed {
    Fixed::from_num(n)
}

/// Default configuration at a given tech level.
#[must_use]
pub fn config(tech_level: u32) -> ConstructionConfig {
    ConstructionConfig::new(tech_level)
}

/// Build a weapon from `(stage, component)` pairs attached in order to
/// sequence 0.
///
/// # Panics
///
/// Panics if any component cannot be attached.
#[must_use]
pub fn weapon_with(
    config: ConstructionConfig,
    components: impl IntoIterator<Item = (WeaponStage, WeaponComponent)>,
) -> Context<Gunsmith> {
    let mut context = Context::new(config).expect("empty weapon regenerates");
    for (stage, component) in components {
        context
            .add_component(0, stage, component, false)
            .expect("fixture component attaches");
    }
    context.regenerate().expect("fixture weapon regenerates");
    context
}

/// Build a robot from `(stage, component)` pairs. A chassis, locomotion or
/// brain pair replaces the default one instead of being appended.
///
/// # Panics
///
/// Panics if any component cannot be attached.
#[must_use]
pub fn robot_with(
    config: ConstructionConfig,
    components: impl IntoIterator<Item = (RobotStage, RobotComponent)>,
) -> Context<Robots> {
    let mut context = Context::new(config).expect("default robot regenerates");
    for (stage, component) in components {
        let single = matches!(
            stage,
            RobotStage::Chassis | RobotStage::Locomotion | RobotStage::Brain
        );
        if single {
            context
                .replace_component(0, stage, 0, component, false)
                .expect("fixture component replaces");
        } else {
            context
                .add_component(0, stage, component, false)
                .expect("fixture component attaches");
        }
    }
    context.regenerate().expect("fixture robot regenerates");
    context
}

/// Fully automatic assault rifle with a loaded magazine and spare rounds.
#[must_use]
pub fn assault_rifle() -> Context<Gunsmith> {
    weapon_with(
        config(12),
        [
            (
                WeaponStage::Receiver,
                ConventionalReceiver::new(ReceiverClass::Assault).into(),
            ),
            (WeaponStage::Mechanism, FullyAutomaticMechanism.into()),
            (WeaponStage::Loading, LoadedMagazine.into()),
            (WeaponStage::Loading, LoadedAmmunition::default().into()),
            (
                WeaponStage::Munitions,
                AmmunitionQuantity::new(AmmunitionKind::Ball, 120).into(),
            ),
        ],
    )
}

/// Semi-automatic handgun with a loaded magazine.
#[must_use]
pub fn handgun() -> Context<Gunsmith> {
    weapon_with(
        config(8),
        [
            (
                WeaponStage::Receiver,
                ConventionalReceiver::new(ReceiverClass::Handgun).into(),
            ),
            (WeaponStage::Mechanism, SemiAutomaticMechanism.into()),
            (WeaponStage::Loading, LoadedMagazine.into()),
            (WeaponStage::Loading, LoadedAmmunition::default().into()),
        ],
    )
}

/// Bare projector: Cr500 and 5kg before any options.
#[must_use]
pub fn projector() -> Context<Gunsmith> {
    weapon_with(
        config(12),
        [(WeaponStage::Receiver, ProjectorReceiver.into())],
    )
}

/// Projector multi-mounted `count` times.
#[must_use]
pub fn multi_mounted_projector(count: i32) -> Context<Gunsmith> {
    weapon_with(
        config(12),
        [
            (WeaponStage::Receiver, ProjectorReceiver.into()),
            (WeaponStage::MultiMount, MultiMount::new(count).into()),
        ],
    )
}

/// Projector with spare advanced fuel carried but not loaded.
#[must_use]
pub fn projector_with_spare_fuel() -> Context<Gunsmith> {
    weapon_with(
        config(12),
        [
            (WeaponStage::Receiver, ProjectorReceiver.into()),
            (
                WeaponStage::Munitions,
                ProjectorFuelQuantity::new(FuelKind::Advanced, 20).into(),
            ),
        ],
    )
}

/// Energy weapon with a standard power pack.
#[must_use]
pub fn laser_carbine() -> Context<Gunsmith> {
    weapon_with(
        config(12),
        [
            (WeaponStage::Receiver, PowerPackReceiver.into()),
            (WeaponStage::Loading, LoadedPowerPack::default().into()),
        ],
    )
}

/// Wheeled labour robot with two arms and a few skills.
#[must_use]
pub fn utility_robot() -> Context<Robots> {
    robot_with(
        config(12),
        [
            (RobotStage::Chassis, Chassis::new(4).into()),
            (
                RobotStage::Locomotion,
                Locomotion::new(LocomotionKind::Wheels).into(),
            ),
            (RobotStage::Manipulators, Manipulator::new(3).into()),
            (RobotStage::Manipulators, Manipulator::new(3).into()),
            (
                RobotStage::Brain,
                Brain::new(BrainKind::Advanced).into(),
            ),
            (
                RobotStage::Skills,
                SkillPackage::new(RobotSkill::Mechanic, 1).into(),
            ),
            (
                RobotStage::Skills,
                SkillPackage::new(RobotSkill::Drive, 0).into(),
            ),
        ],
    )
}

/// Size 1 robot whose storage wants far more slots than it has.
#[must_use]
pub fn overloaded_robot() -> Context<Robots> {
    robot_with(
        config(12),
        [
            (RobotStage::Chassis, Chassis::new(1).into()),
            (RobotStage::SlotOptions, StorageCompartment::new(10).into()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_regenerate() {
        assert!(assault_rifle().validate().is_ok());
        assert!(handgun().validate().is_ok());
        assert!(projector().validate().is_ok());
        assert!(laser_carbine().validate().is_ok());
        assert!(utility_robot().validate().is_ok());
        assert!(overloaded_robot().validate().is_ok());
    }
}
