//! Robot rules exercised end to end through sample builds.

use traveller_core::robots::{
    Autopilot, Brain, BrainKind, Chassis, ImprovedMaintenance, Locomotion, LocomotionKind,
    Manipulator, RobotPhase, RobotSkill, SecondaryLocomotion, SkillPackage, StealthCoating,
};
use traveller_core::prelude::*;
use traveller_test_utils::fixtures::{self, config, fixed, robot_with};

fn notes(robot: &Context<Robots>) -> Vec<String> {
    robot.manifest().notes().map(str::to_string).collect()
}

fn skipped(robot: &Context<Robots>, stage: RobotStage, index: usize) -> bool {
    robot
        .steps_for_component(ComponentRef::new(0, stage, index))
        .next()
        .is_none()
}

// =============================================================================
// Slot and bandwidth usage
// =============================================================================

#[test]
fn test_slot_overrun_is_a_warning() {
    let robot = fixtures::overloaded_robot();
    let notes = notes(&robot);
    assert!(notes.contains(&"Uses 10 of 2 slots".to_string()));
    assert!(notes.contains(&"Warning: 10 slots used exceeds the maximum of 2".to_string()));
    // The robot is still fully computed.
    assert!(robot.validate().is_ok());
    assert_eq!(robot.totals().slots, fixed(10));
    assert!(robot.totals().credits > fixed(0));
}

#[test]
fn test_usage_within_limits_has_no_warning() {
    let robot = fixtures::utility_robot();
    let notes = notes(&robot);
    assert!(notes.contains(&"Uses 6 of 12 slots".to_string()));
    assert!(notes.contains(&"Uses 3 of 8 bandwidth".to_string()));
    assert!(!notes.iter().any(|n| n.starts_with("Warning")));
}

#[test]
fn test_manipulator_size_follows_chassis() {
    let robot = robot_with(
        config(12),
        [
            (RobotStage::Chassis, Chassis::new(2).into()),
            (RobotStage::Manipulators, Manipulator::new(5).into()),
        ],
    );
    let size = match &robot.components(0, RobotStage::Manipulators)[0] {
        RobotComponent::Manipulator(m) => m.size.value(),
        other => panic!("unexpected component {other:?}"),
    };
    assert_eq!(size, 2);
    assert_eq!(
        robot.phase_totals(0, RobotPhase::Manipulators).slots,
        fixed(2)
    );
}

// =============================================================================
// Brain and skills
// =============================================================================

#[test]
fn test_limited_brain_skips_skills_by_default() {
    let components: [(RobotStage, RobotComponent); 2] = [
        (RobotStage::Brain, Brain::new(BrainKind::Primitive).into()),
        (
            RobotStage::Skills,
            SkillPackage::new(RobotSkill::Athletics, 1).into(),
        ),
    ];

    let strict = robot_with(config(12), components.clone());
    assert_eq!(strict.totals().bandwidth, fixed(0));

    let lenient_config = config(12).with_rules(RulePolicy {
        primitive_brain_skills: true,
        ..RulePolicy::default()
    });
    let lenient = robot_with(lenient_config, components);
    assert_eq!(lenient.totals().bandwidth, fixed(2));
    assert!(notes(&lenient)
        .iter()
        .any(|n| n == "Warning: 2 bandwidth used exceeds the maximum of 0"));
}

#[test]
fn test_autopilot_overlaps_vehicle_skill() {
    let robot = robot_with(
        config(12),
        [
            (RobotStage::Brain, Brain::new(BrainKind::Advanced).into()),
            (RobotStage::SlotOptions, Autopilot::new(2).into()),
            (
                RobotStage::Skills,
                SkillPackage::new(RobotSkill::Drive, 1).into(),
            ),
        ],
    );
    assert!(notes(&robot)
        .iter()
        .any(|n| n.starts_with("Autopilot 2 overlaps the Drive skill package")));
}

// =============================================================================
// Locomotion and traits
// =============================================================================

#[test]
fn test_grav_robot_flies_without_atmosphere() {
    let robot = robot_with(
        config(12),
        [(
            RobotStage::Locomotion,
            Locomotion::new(LocomotionKind::Grav).into(),
        )],
    );
    assert!(notes(&robot)
        .iter()
        .any(|n| n.starts_with("Flyer: gravitic lift")));
}

#[test]
fn test_secondary_locomotion_must_differ_from_primary() {
    let robot = fixtures::utility_robot();
    let offered = robot
        .find_compatible_components(
            0,
            RobotStage::SecondaryLocomotion,
            None,
            RobotComponent::catalogue(RobotStage::SecondaryLocomotion),
        )
        .unwrap();
    assert!(!offered.contains(&SecondaryLocomotion::new(LocomotionKind::Wheels).into()));
    assert!(offered.contains(&SecondaryLocomotion::new(LocomotionKind::Tracks).into()));
}

#[test]
fn test_improved_maintenance_removes_maintenance_note() {
    let plain = fixtures::utility_robot();
    assert!(notes(&plain)
        .iter()
        .any(|n| n == "Requires routine maintenance every year"));

    let maintained = robot_with(
        config(12),
        [(RobotStage::SlotOptions, ImprovedMaintenance.into())],
    );
    assert!(!notes(&maintained)
        .iter()
        .any(|n| n == "Requires routine maintenance every year"));
}

// =============================================================================
// Options that do not stack
// =============================================================================

#[test]
fn test_second_copy_of_slot_option_is_skipped() {
    let once = robot_with(
        config(12),
        [
            (RobotStage::SlotOptions, StealthCoating::new(2).into()),
            (RobotStage::SlotOptions, ImprovedMaintenance.into()),
        ],
    );
    let twice = robot_with(
        config(12),
        [
            (RobotStage::SlotOptions, StealthCoating::new(2).into()),
            (RobotStage::SlotOptions, StealthCoating::new(2).into()),
            (RobotStage::SlotOptions, ImprovedMaintenance.into()),
            (RobotStage::SlotOptions, ImprovedMaintenance.into()),
        ],
    );

    assert_eq!(twice.components(0, RobotStage::SlotOptions).len(), 4);
    assert!(!skipped(&twice, RobotStage::SlotOptions, 0));
    assert!(skipped(&twice, RobotStage::SlotOptions, 1));
    assert!(!skipped(&twice, RobotStage::SlotOptions, 2));
    assert!(skipped(&twice, RobotStage::SlotOptions, 3));
    assert_eq!(twice.totals(), once.totals());
}

#[test]
fn test_attached_slot_option_is_not_offered_again() {
    let robot = robot_with(
        config(12),
        [
            (RobotStage::SlotOptions, StealthCoating::new(1).into()),
            (RobotStage::SlotOptions, ImprovedMaintenance.into()),
        ],
    );
    let catalogue = RobotComponent::catalogue(RobotStage::SlotOptions);

    let offered = robot
        .find_compatible_components(0, RobotStage::SlotOptions, None, catalogue.clone())
        .unwrap();
    assert!(!offered
        .iter()
        .any(|c| matches!(c, RobotComponent::ImprovedMaintenance(_))));
    assert!(!offered
        .iter()
        .any(|c| matches!(c, RobotComponent::StealthCoating(_))));
    assert!(offered
        .iter()
        .any(|c| matches!(c, RobotComponent::StorageCompartment(_))));

    // Replacing the maintenance option offers it again in its own place.
    let replacements = robot
        .find_compatible_components(0, RobotStage::SlotOptions, Some(1), catalogue)
        .unwrap();
    assert!(replacements
        .iter()
        .any(|c| matches!(c, RobotComponent::ImprovedMaintenance(_))));
}

#[test]
fn test_repeated_skill_package_is_skipped() {
    let mut robot = fixtures::utility_robot();
    robot
        .add_component(
            0,
            RobotStage::Skills,
            SkillPackage::new(RobotSkill::Mechanic, 2).into(),
            true,
        )
        .unwrap();

    assert!(skipped(&robot, RobotStage::Skills, 2));
    assert_eq!(robot.totals().bandwidth, fixed(3));
    assert!(notes(&robot).contains(&"Uses 3 of 8 bandwidth".to_string()));
}
