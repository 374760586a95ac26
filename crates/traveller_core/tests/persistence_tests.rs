//! Builds saved to and restored from an object store on disk.

use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use traveller_core::prelude::*;
use traveller_test_utils::determinism::verify_document_round_trip;
use traveller_test_utils::fixtures;

fn sample_weapons() -> Vec<Weapon> {
    vec![
        Weapon::from_context("Rifle", fixtures::assault_rifle()),
        Weapon::from_context("Sidearm", fixtures::handgun()),
        Weapon::from_context("Triple Projector", fixtures::multi_mounted_projector(3)),
        Weapon::from_context("Laser", fixtures::laser_carbine()),
    ]
}

#[test]
fn test_json_round_trip_preserves_manifests() {
    for weapon in sample_weapons() {
        assert!(verify_document_round_trip(&weapon), "{}", weapon.name());
    }
    let robot = Robot::from_context("Worker", fixtures::utility_robot());
    assert!(verify_document_round_trip(&robot));
    let robot = Robot::from_context("Crate", fixtures::overloaded_robot());
    assert!(verify_document_round_trip(&robot));
}

#[test]
fn test_store_reopen_restores_every_build() {
    let dir = TempDir::new().unwrap();
    let weapons = sample_weapons();
    {
        let store = ObjectStore::<Weapon>::open(dir.path()).unwrap();
        for weapon in &weapons {
            store.save(weapon).unwrap();
        }
    }

    let store = ObjectStore::<Weapon>::open(dir.path()).unwrap();
    assert_eq!(store.len(), weapons.len());
    let batch = store.load_all();
    assert!(batch.is_complete());
    for weapon in &weapons {
        let restored = batch
            .loaded
            .iter()
            .find(|w| w.id() == weapon.id())
            .expect("weapon restored");
        assert_eq!(restored.name(), weapon.name());
        assert_eq!(restored.manifest(), weapon.manifest());
    }
}

#[test]
fn test_weapon_and_robot_stores_reject_each_other() {
    let dir = TempDir::new().unwrap();
    let robots = ObjectStore::<Robot>::open(dir.path()).unwrap();
    let robot = Robot::from_context("Worker", fixtures::utility_robot());
    robots.save(&robot).unwrap();

    let weapons = ObjectStore::<Weapon>::open(dir.path()).unwrap();
    let err = weapons.load(robot.id()).unwrap_err();
    assert!(matches!(err, StoreError::KindMismatch { expected: "weapon", .. }));
}

#[test]
fn test_store_shared_across_threads() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(ObjectStore::<Robot>::open(dir.path()).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let robot = Robot::from_context(format!("Worker {i}"), fixtures::utility_robot());
                store.save(&robot).unwrap();
                robot.id().to_string()
            })
        })
        .collect();
    let ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(store.len(), 4);
    for id in ids {
        assert!(store.load(&id).is_ok());
    }
}

#[test]
fn test_edited_copy_is_independent() {
    let dir = TempDir::new().unwrap();
    let store = ObjectStore::<Weapon>::open(dir.path()).unwrap();
    let original = Weapon::from_context("Mount", fixtures::multi_mounted_projector(2));
    store.save(&original).unwrap();

    let mut copy = store.copy(&original, "Mount Mk II").unwrap();
    copy.context_mut()
        .set_component_option(
            0,
            WeaponStage::MultiMount,
            0,
            "count",
            &OptionValue::Integer(6),
            true,
        )
        .unwrap();
    store.save(&copy).unwrap();

    let reloaded = store.load(original.id()).unwrap();
    assert_eq!(reloaded.manifest(), original.manifest());
    let reloaded_copy = store.load(copy.id()).unwrap();
    assert!(reloaded_copy.context().totals().credits > reloaded.context().totals().credits);
}

#[test]
fn test_config_loaded_from_ron_is_stored_with_build() {
    let config = ConstructionConfig::from_ron_str(
        "ConstructionConfig(tech_level: 9, rules: RulePolicy(multi_mount_escalation: Stack))",
    )
    .unwrap();
    assert_eq!(config.rules.multi_mount_escalation, EscalationStacking::Stack);
    assert!(!config.rules.primitive_brain_skills);

    let weapon = Weapon::new("Blank", config).unwrap();
    assert_eq!(weapon.to_document().config, config);
}
