//! Weapon rules exercised end to end through sample builds.

use proptest::prelude::*;

use traveller_core::construction::OptionChoice;
use traveller_core::gunsmith::{
    AmmunitionKind, ConventionalReceiver, DecreasedCapacity, FuelKind, FullyAutomaticMechanism,
    HighCycleRate, IncreasedCapacity, LoadedAmmunition, LoadedProjectorFuel, MultiMount,
    PowerPackReceiver, ProjectorFuelQuantity, ProjectorReceiver, ReceiverClass,
    SingleShotMechanism, WeaponPhase,
};
use traveller_core::prelude::*;
use traveller_test_utils::fixtures::{self, config, fixed, weapon_with};

fn capacity(weapon: &Context<Gunsmith>) -> Option<Fixed> {
    weapon.view().scalar(0, WeaponAttribute::AmmoCapacity)
}

fn damage_dice(weapon: &Context<Gunsmith>) -> Option<i32> {
    weapon.view().dice(0, WeaponAttribute::Damage).map(|d| d.count)
}

/// Fire rate, AP, Heat and damage dice of sequence 0.
fn fire_profile(
    weapon: &Context<Gunsmith>,
) -> (Option<&str>, Option<Fixed>, Option<Fixed>, Option<i32>) {
    let view = weapon.view();
    (
        view.flag(0, WeaponAttribute::FireRate),
        view.scalar(0, WeaponAttribute::Penetration),
        view.scalar(0, WeaponAttribute::Heat),
        damage_dice(weapon),
    )
}

/// Fully automatic assault weapon with extra components attached in order.
fn automatic_assault(
    config: ConstructionConfig,
    extra: impl IntoIterator<Item = (WeaponStage, WeaponComponent)>,
) -> Context<Gunsmith> {
    let base: [(WeaponStage, WeaponComponent); 2] = [
        (
            WeaponStage::Receiver,
            ConventionalReceiver::new(ReceiverClass::Assault).into(),
        ),
        (WeaponStage::Mechanism, FullyAutomaticMechanism.into()),
    ];
    weapon_with(config, base.into_iter().chain(extra))
}

fn skipped(weapon: &Context<Gunsmith>, stage: WeaponStage, index: usize) -> bool {
    weapon
        .steps_for_component(ComponentRef::new(0, stage, index))
        .next()
        .is_none()
}

// =============================================================================
// Receivers and mechanisms
// =============================================================================

#[test]
fn test_single_shot_excluded_by_power_pack() {
    let weapon = weapon_with(
        config(12),
        [
            (WeaponStage::Receiver, PowerPackReceiver.into()),
            (WeaponStage::Mechanism, SingleShotMechanism.into()),
        ],
    );

    // Attached but skipped: it contributes no steps.
    assert_eq!(weapon.components(0, WeaponStage::Mechanism).len(), 1);
    assert!(weapon
        .steps()
        .iter()
        .all(|s| s.component.stage != WeaponStage::Mechanism));

    let offered = weapon
        .find_compatible_components(
            0,
            WeaponStage::Mechanism,
            None,
            WeaponComponent::catalogue(WeaponStage::Mechanism),
        )
        .unwrap();
    assert!(!offered.contains(&SingleShotMechanism.into()));
}

#[test]
fn test_single_shot_allowed_on_conventional_receiver() {
    let weapon = weapon_with(
        config(12),
        [
            (
                WeaponStage::Receiver,
                ConventionalReceiver::new(ReceiverClass::Longarm).into(),
            ),
            (WeaponStage::Mechanism, SingleShotMechanism.into()),
        ],
    );
    assert!(weapon
        .steps()
        .iter()
        .any(|s| s.component.stage == WeaponStage::Mechanism));
}

#[test]
fn test_tech_level_gates_receivers() {
    let weapon = Context::<Gunsmith>::new(config(5)).unwrap();
    let offered = weapon
        .find_compatible_components(
            0,
            WeaponStage::Receiver,
            None,
            WeaponComponent::catalogue(WeaponStage::Receiver),
        )
        .unwrap();
    assert!(offered.contains(&ConventionalReceiver::new(ReceiverClass::Handgun).into()));
    assert!(!offered.contains(&ConventionalReceiver::new(ReceiverClass::Assault).into()));
    assert!(!offered.contains(&PowerPackReceiver.into()));
}

#[test]
fn test_lowering_tech_level_skips_components() {
    let mut weapon = fixtures::laser_carbine();
    assert!(weapon.totals().credits > fixed(0));
    weapon.set_tech_level(8).unwrap();
    assert_eq!(weapon.totals().credits, fixed(0));
    assert_eq!(weapon.components(0, WeaponStage::Receiver).len(), 1);
}

// =============================================================================
// Capacity
// =============================================================================

#[test]
fn test_capacity_increase_rounds_down() {
    let weapon = weapon_with(
        config(12),
        [
            (
                WeaponStage::Receiver,
                ConventionalReceiver::new(ReceiverClass::Handgun).into(),
            ),
            (WeaponStage::Capacity, IncreasedCapacity::new(30).into()),
        ],
    );
    // 15 * 130 / 100 = 19.5
    assert_eq!(capacity(&weapon), Some(fixed(19)));
}

#[test]
fn test_partial_capacity_level_counts_whole() {
    let weapon = weapon_with(
        config(12),
        [
            (
                WeaponStage::Receiver,
                ConventionalReceiver::new(ReceiverClass::Assault).into(),
            ),
            (WeaponStage::Capacity, IncreasedCapacity::new(25).into()),
        ],
    );
    assert_eq!(capacity(&weapon), Some(fixed(39)));
}

proptest! {
    #[test]
    fn prop_capacity_matches_integer_formula(
        class_index in 0usize..ReceiverClass::ALL.len(),
        levels in 1i32..=15,
    ) {
        let class = ReceiverClass::ALL[class_index];
        let receiver: (WeaponStage, WeaponComponent) =
            (WeaponStage::Receiver, ConventionalReceiver::new(class).into());
        let base = capacity(&weapon_with(config(12), [receiver.clone()]))
            .expect("conventional receivers have a capacity")
            .to_num::<i32>();
        let weapon = weapon_with(
            config(12),
            [
                receiver,
                (WeaponStage::Capacity, IncreasedCapacity::new(levels * 10).into()),
            ],
        );
        let expected = base * (100 + 10 * levels) / 100;
        prop_assert_eq!(capacity(&weapon), Some(fixed(expected)));
    }

    #[test]
    fn prop_capacity_decrease_matches_integer_formula(
        class_index in 0usize..ReceiverClass::ALL.len(),
        levels in 1i32..=9,
    ) {
        let class = ReceiverClass::ALL[class_index];
        let receiver: (WeaponStage, WeaponComponent) =
            (WeaponStage::Receiver, ConventionalReceiver::new(class).into());
        let base = capacity(&weapon_with(config(12), [receiver.clone()]))
            .expect("conventional receivers have a capacity")
            .to_num::<i32>();
        let weapon = weapon_with(
            config(12),
            [
                receiver,
                (WeaponStage::Capacity, DecreasedCapacity::new(levels * 10).into()),
            ],
        );
        let expected = base * (100 - 10 * levels) / 100;
        prop_assert!(expected >= 1);
        prop_assert_eq!(capacity(&weapon), Some(fixed(expected)));
    }
}

// =============================================================================
// Multi-mount
// =============================================================================

#[test]
fn test_multi_mount_duplicates_totals_so_far() {
    let single = fixtures::projector();
    assert_eq!(single.totals().credits, fixed(500));
    assert_eq!(single.totals().weight, fixed(5));

    let triple = fixtures::multi_mounted_projector(3);
    let section = triple
        .manifest()
        .section(0, "Multi-Mount")
        .cloned()
        .expect("multi-mount section");
    assert_eq!(section.totals.credits, fixed(1000));
    assert_eq!(section.totals.weight, fixed(10));
    assert_eq!(triple.totals().credits, fixed(1500));
    assert_eq!(triple.totals().weight, fixed(15));
    assert_eq!(
        triple.view().scalar(0, WeaponAttribute::MountCount),
        Some(fixed(3))
    );
}

#[test]
fn test_multi_mount_scales_loaded_fuel() {
    let loaded = weapon_with(
        config(12),
        [
            (WeaponStage::Receiver, ProjectorReceiver.into()),
            (WeaponStage::Loading, LoadedProjectorFuel::default().into()),
        ],
    );
    let loaded_triple = weapon_with(
        config(12),
        [
            (WeaponStage::Receiver, ProjectorReceiver.into()),
            (WeaponStage::MultiMount, MultiMount::new(3).into()),
            (WeaponStage::Loading, LoadedProjectorFuel::default().into()),
        ],
    );
    let single_load = loaded.phase_totals(0, WeaponPhase::Loading);
    let triple_load = loaded_triple.phase_totals(0, WeaponPhase::Loading);
    assert!(single_load.weight > fixed(0));
    assert_eq!(triple_load.weight, single_load.weight * fixed(3));
    assert_eq!(triple_load.credits, single_load.credits * fixed(3));
}

// =============================================================================
// Fire-rate escalation
// =============================================================================

#[test]
fn test_multi_mount_escalates_from_pre_escalation_dice() {
    // Auto 3 x 3 weapons = 9: very rapid fire on a 3D weapon.
    let weapon = automatic_assault(
        config(12),
        [(WeaponStage::MultiMount, MultiMount::new(3).into())],
    );
    assert_eq!(
        fire_profile(&weapon),
        (Some("VRF"), Some(fixed(6)), Some(fixed(6)), Some(5))
    );
}

#[test]
fn test_two_mounted_weapons_reach_rapid_fire() {
    // Auto 3 x 2 weapons = 6: rapid fire, short of very rapid.
    let weapon = automatic_assault(
        config(12),
        [(WeaponStage::MultiMount, MultiMount::new(2).into())],
    );
    assert_eq!(
        fire_profile(&weapon),
        (Some("RF"), Some(fixed(3)), Some(fixed(3)), Some(4))
    );
}

#[test]
fn test_high_cycle_rate_gives_rapid_fire() {
    let weapon = automatic_assault(
        config(12),
        [(WeaponStage::Features, HighCycleRate::default().into())],
    );
    assert_eq!(
        fire_profile(&weapon),
        (Some("RF"), Some(fixed(3)), Some(fixed(3)), Some(4))
    );
}

#[test]
fn test_second_high_cycle_rate_is_skipped() {
    let once = automatic_assault(
        config(12),
        [(WeaponStage::Features, HighCycleRate::default().into())],
    );
    let twice = automatic_assault(
        config(12),
        [
            (WeaponStage::Features, HighCycleRate::default().into()),
            (WeaponStage::Features, HighCycleRate::default().into()),
        ],
    );
    assert!(!skipped(&twice, WeaponStage::Features, 0));
    assert!(skipped(&twice, WeaponStage::Features, 1));
    assert_eq!(fire_profile(&twice), fire_profile(&once));
    assert_eq!(twice.totals(), once.totals());
}

#[test]
fn test_multi_mount_escalation_does_not_stack_by_default() {
    let weapon = automatic_assault(
        config(12),
        [
            (WeaponStage::Features, HighCycleRate::default().into()),
            (WeaponStage::MultiMount, MultiMount::new(3).into()),
        ],
    );
    assert_eq!(
        fire_profile(&weapon),
        (Some("RF"), Some(fixed(3)), Some(fixed(3)), Some(4))
    );
    assert!(weapon
        .manifest()
        .notes()
        .any(|n| n == "Already fires RF; multi-mount escalation does not stack"));
}

#[test]
fn test_multi_mount_escalation_stacks_when_allowed() {
    let stacking = config(12).with_rules(RulePolicy {
        multi_mount_escalation: EscalationStacking::Stack,
        ..RulePolicy::default()
    });
    let weapon = automatic_assault(
        stacking,
        [
            (WeaponStage::Features, HighCycleRate::default().into()),
            (WeaponStage::MultiMount, MultiMount::new(3).into()),
        ],
    );
    // RF takes 3D to 4D; VRF then reads 4D: AP and Heat 3 + 8, damage 6D.
    assert_eq!(
        fire_profile(&weapon),
        (Some("VRF"), Some(fixed(11)), Some(fixed(11)), Some(6))
    );
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_second_ammunition_load_is_skipped() {
    let armour_piercing: (WeaponStage, WeaponComponent) = (
        WeaponStage::Loading,
        LoadedAmmunition {
            kind: AmmunitionKind::ArmourPiercing,
        }
        .into(),
    );
    let once = automatic_assault(config(12), [armour_piercing.clone()]);
    let twice = automatic_assault(config(12), [armour_piercing.clone(), armour_piercing]);

    assert_eq!(
        twice.view().scalar(0, WeaponAttribute::Penetration),
        Some(fixed(2))
    );
    assert!(skipped(&twice, WeaponStage::Loading, 1));
    assert_eq!(twice.totals(), once.totals());

    let offered = once
        .find_compatible_components(
            0,
            WeaponStage::Loading,
            None,
            WeaponComponent::catalogue(WeaponStage::Loading),
        )
        .unwrap();
    assert!(!offered
        .iter()
        .any(|c| matches!(c, WeaponComponent::LoadedAmmunition(_))));
    assert!(offered
        .iter()
        .any(|c| matches!(c, WeaponComponent::LoadedMagazine(_))));
}

#[test]
fn test_second_fuel_load_is_skipped() {
    let advanced: (WeaponStage, WeaponComponent) = (
        WeaponStage::Loading,
        LoadedProjectorFuel {
            fuel: FuelKind::Advanced,
        }
        .into(),
    );
    let twice = weapon_with(
        config(12),
        [
            (WeaponStage::Receiver, ProjectorReceiver.into()),
            advanced.clone(),
            advanced,
        ],
    );
    assert_eq!(damage_dice(&twice), Some(4));
    assert!(skipped(&twice, WeaponStage::Loading, 1));
}

// =============================================================================
// Fuel
// =============================================================================

#[test]
fn test_spare_fuel_does_not_change_live_attributes() {
    let bare = fixtures::projector();
    let spare = fixtures::projector_with_spare_fuel();

    assert_eq!(damage_dice(&spare), damage_dice(&bare));
    assert_eq!(
        spare.view().scalar(0, WeaponAttribute::Range),
        bare.view().scalar(0, WeaponAttribute::Range)
    );

    let munitions = spare
        .manifest()
        .section(0, "Munitions")
        .cloned()
        .expect("munitions section");
    assert_eq!(munitions.entries.len(), 1);
    assert_eq!(munitions.entries[0].factors.len(), 2);
    assert_eq!(munitions.totals.weight, fixed(20));
}

#[test]
fn test_spare_standard_fuel_projects_nothing() {
    let weapon = weapon_with(
        config(12),
        [
            (WeaponStage::Receiver, ProjectorReceiver.into()),
            (
                WeaponStage::Munitions,
                ProjectorFuelQuantity::new(FuelKind::Standard, 20).into(),
            ),
        ],
    );
    let munitions = weapon
        .manifest()
        .section(0, "Munitions")
        .cloned()
        .expect("munitions section");
    assert_eq!(munitions.entries.len(), 1);
    assert!(munitions.entries[0].factors.is_empty());
    assert_eq!(munitions.totals.weight, fixed(20));
}

#[test]
fn test_loaded_advanced_fuel_changes_live_attributes() {
    let weapon = weapon_with(
        config(12),
        [
            (WeaponStage::Receiver, ProjectorReceiver.into()),
            (
                WeaponStage::Loading,
                LoadedProjectorFuel {
                    fuel: FuelKind::Advanced,
                }
                .into(),
            ),
        ],
    );
    assert_eq!(damage_dice(&weapon), Some(4));
    assert_eq!(
        weapon.view().scalar(0, WeaponAttribute::Range),
        Some(fixed(15))
    );
}

// =============================================================================
// Finalisation
// =============================================================================

#[test]
fn test_missing_mechanism_is_noted() {
    let weapon = weapon_with(
        config(12),
        [(
            WeaponStage::Receiver,
            ConventionalReceiver::new(ReceiverClass::Assault).into(),
        )],
    );
    let manifest = weapon.manifest();
    assert!(manifest.notes().any(|n| n.contains("cannot fire")));
    assert!(manifest.notes().any(|n| n == "Range 150m"));
}

#[test]
fn test_assault_rifle_reports_auto() {
    let rifle = fixtures::assault_rifle();
    assert!(rifle.manifest().notes().any(|n| n.starts_with("Auto ")));
    assert!(rifle
        .construction_notes()
        .iter()
        .any(|n| n.starts_with("Finalisation: ")));
}
