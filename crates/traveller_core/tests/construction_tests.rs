//! Engine behaviour observed through the public editing API.
//!
//! These tests drive sample builds from the shared fixtures and check the
//! properties every regeneration must hold, independent of domain rules.

use proptest::prelude::*;

use traveller_core::gunsmith::{ConventionalReceiver, MultiMount, ReceiverClass};
use traveller_core::prelude::*;
use traveller_test_utils::determinism::{
    strategies, verify_build_determinism, verify_parallel_builds, verify_regeneration,
};
use traveller_test_utils::fixtures;

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_regeneration_is_byte_identical() {
    let mut rifle = fixtures::assault_rifle();
    verify_regeneration(&mut rifle, 10).assert_deterministic();

    let mut robot = fixtures::utility_robot();
    verify_regeneration(&mut robot, 10).assert_deterministic();
}

#[test]
fn test_independent_builds_match() {
    verify_build_determinism(fixtures::assault_rifle, 5).assert_deterministic();
    verify_build_determinism(fixtures::overloaded_robot, 5).assert_deterministic();
}

#[test]
fn test_parallel_builds_match() {
    let result = verify_parallel_builds(fixtures::utility_robot, 4);
    result.assert_deterministic();
    assert_eq!(result.unique_hashes().len(), 1);
}

// =============================================================================
// Compatibility queries
// =============================================================================

#[test]
fn test_compatibility_query_is_idempotent() {
    let rifle = fixtures::assault_rifle();
    let before = rifle.clone();
    let first = rifle
        .find_compatible_components(
            0,
            WeaponStage::Features,
            None,
            WeaponComponent::catalogue(WeaponStage::Features),
        )
        .unwrap();
    let second = rifle
        .find_compatible_components(
            0,
            WeaponStage::Features,
            None,
            WeaponComponent::catalogue(WeaponStage::Features),
        )
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(rifle, before, "queries must not modify the build");
}

#[test]
fn test_compatibility_query_can_ignore_replaced_component() {
    let rifle = fixtures::assault_rifle();
    let receivers = rifle
        .find_compatible_components(
            0,
            WeaponStage::Receiver,
            Some(0),
            WeaponComponent::catalogue(WeaponStage::Receiver),
        )
        .unwrap();
    assert_eq!(
        receivers.len(),
        WeaponComponent::catalogue(WeaponStage::Receiver).len()
    );
}

// =============================================================================
// Edit rollback
// =============================================================================

#[test]
fn test_rejected_option_leaves_build_unchanged() {
    let mut weapon = fixtures::multi_mounted_projector(3);
    let before = weapon.clone();
    let err = weapon
        .set_component_option(
            0,
            WeaponStage::MultiMount,
            0,
            "count",
            &OptionValue::Integer(40),
            true,
        )
        .unwrap_err();
    assert!(matches!(err, ConstructionError::InvalidOptionValue { .. }));
    assert_eq!(weapon, before);
}

#[test]
fn test_full_stage_rejects_component() {
    let mut weapon = fixtures::handgun();
    let before = weapon.clone();
    let err = weapon
        .add_component(
            0,
            WeaponStage::Receiver,
            ConventionalReceiver::new(ReceiverClass::Longarm).into(),
            true,
        )
        .unwrap_err();
    assert!(matches!(err, ConstructionError::StageFull { .. }));
    assert_eq!(weapon, before);
}

#[test]
fn test_internal_stage_cannot_be_edited() {
    let mut weapon = fixtures::projector();
    let err = weapon
        .remove_component(0, WeaponStage::Finalisation, 0, true)
        .unwrap_err();
    assert!(matches!(err, ConstructionError::InternalStage(_)));
}

#[test]
fn test_option_change_updates_costs() {
    let mut weapon = fixtures::multi_mounted_projector(2);
    let two = weapon.totals().get(CostKind::Credits);
    weapon
        .set_component_option(
            0,
            WeaponStage::MultiMount,
            0,
            "count",
            &OptionValue::Integer(4),
            true,
        )
        .unwrap();
    assert!(weapon.totals().get(CostKind::Credits) > two);
    assert_eq!(
        weapon.components(0, WeaponStage::MultiMount),
        &[WeaponComponent::from(MultiMount::new(4))]
    );
}

#[test]
fn test_weapons_accept_additional_sequences() {
    let mut weapon = fixtures::projector();
    let sequence = weapon.add_sequence(true).unwrap();
    assert_eq!(sequence, 1);
    weapon
        .add_component(
            sequence,
            WeaponStage::Receiver,
            ConventionalReceiver::new(ReceiverClass::Handgun).into(),
            true,
        )
        .unwrap();
    let manifest = weapon.manifest();
    assert!(manifest.section(1, "Receiver").is_some());
    assert_eq!(
        weapon.totals(),
        weapon.sequence_totals(0).combined(&weapon.sequence_totals(1))
    );
    weapon.remove_sequence(1, true).unwrap();
    assert!(matches!(
        weapon.remove_sequence(0, true),
        Err(ConstructionError::LastSequence)
    ));
}

#[test]
fn test_robots_are_single_sequence() {
    let mut robot = fixtures::utility_robot();
    assert!(matches!(
        robot.add_sequence(true),
        Err(ConstructionError::SingleSequenceOnly(_))
    ));
}

#[test]
fn test_stop_early_preview_omits_later_stages() {
    let mut rifle = fixtures::assault_rifle();
    rifle.regenerate_until(0, WeaponStage::Loading).unwrap();
    assert!(rifle
        .steps()
        .iter()
        .all(|s| s.component.stage < WeaponStage::Loading));
    rifle.regenerate().unwrap();
    assert!(rifle
        .steps()
        .iter()
        .any(|s| s.component.stage == WeaponStage::Finalisation));
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_random_weapons_regenerate_deterministically(mut weapon in strategies::arb_weapon()) {
        let result = verify_regeneration::<Gunsmith>(&mut weapon, 3);
        prop_assert!(result.is_deterministic);
    }

    #[test]
    fn prop_random_robots_regenerate_deterministically(mut robot in strategies::arb_robot()) {
        let result = verify_regeneration::<Robots>(&mut robot, 3);
        prop_assert!(result.is_deterministic);
    }

    #[test]
    fn prop_compatibility_queries_are_pure(robot in strategies::arb_robot()) {
        let before = robot.clone();
        for stage in [RobotStage::MovementOptions, RobotStage::SlotOptions, RobotStage::Skills] {
            let first = robot
                .find_compatible_components(0, stage, None, RobotComponent::catalogue(stage))
                .unwrap();
            let second = robot
                .find_compatible_components(0, stage, None, RobotComponent::catalogue(stage))
                .unwrap();
            prop_assert_eq!(first, second);
        }
        prop_assert_eq!(robot, before);
    }

    #[test]
    fn prop_manifest_totals_match_build(weapon in strategies::arb_weapon()) {
        let manifest = weapon.manifest();
        prop_assert_eq!(manifest.totals, weapon.totals());
        let summed = manifest
            .sections
            .iter()
            .fold(CostTotals::ZERO, |acc, s| acc.combined(&s.totals));
        prop_assert_eq!(summed, weapon.totals());
    }
}
