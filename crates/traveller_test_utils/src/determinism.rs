//! Determinism testing utilities.
//!
//! Provides harnesses for verifying that regeneration produces identical
//! manifests given identical builds.
//!
//! # Testing Strategy
//!
//! Two reviewers looking at the same build must see the same numbers.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`traveller_core::math::Fixed`]
//!   throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Attribute maps and phase totals are ordered maps.
//!
//! - **Stale state**: Every regeneration starts from an empty attribute map
//!   and an empty step log.
//!
//! Manifests are compared as their `bincode` encoding, so any difference in
//! a label, a delta or a note is caught.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use tracing::debug;

use traveller_core::construction::{ConstructionDomain, Context};
use traveller_core::persist::{BuildDocument, Construct};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    fn from_hashes(hashes: Vec<u64>) -> Self {
        let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
        debug!(runs = hashes.len(), is_deterministic, "Determinism check complete");
        Self {
            is_deterministic,
            hashes,
        }
    }

    /// Get all unique hashes (should be 1 for a deterministic build).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the build was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Regeneration is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Hash of a build's encoded manifest.
///
/// # Panics
///
/// Panics if the manifest cannot be encoded.
pub fn manifest_hash<D: ConstructionDomain>(context: &Context<D>) -> u64 {
    let bytes = context
        .manifest()
        .to_bytes()
        .expect("manifest encodes");
    compute_hash(&bytes)
}

/// Regenerate the same build `runs` times and hash the manifest after each.
///
/// # Panics
///
/// Panics if a regeneration fails.
pub fn verify_regeneration<D: ConstructionDomain>(
    context: &mut Context<D>,
    runs: usize,
) -> DeterminismResult {
    let mut hashes = Vec::with_capacity(runs);
    for _ in 0..runs {
        context.regenerate().expect("regeneration succeeds");
        hashes.push(manifest_hash(context));
    }
    DeterminismResult::from_hashes(hashes)
}

/// Build the same context from scratch `runs` times and compare manifests.
pub fn verify_build_determinism<D, F>(setup: F, runs: usize) -> DeterminismResult
where
    D: ConstructionDomain,
    F: Fn() -> Context<D>,
{
    let hashes = (0..runs).map(|_| manifest_hash(&setup())).collect();
    DeterminismResult::from_hashes(hashes)
}

/// Build the same context on `threads` scoped threads and compare manifests.
///
/// # Panics
///
/// Panics if a build thread panics.
pub fn verify_parallel_builds<D, F>(setup: F, threads: usize) -> DeterminismResult
where
    D: ConstructionDomain,
    F: Fn() -> Context<D> + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| s.spawn(|| manifest_hash(&setup())))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("build thread panicked"))
            .collect()
    });
    DeterminismResult::from_hashes(hashes)
}

/// Verify that a document round-trip through JSON preserves the manifest
/// exactly.
///
/// # Panics
///
/// Panics if the document cannot be encoded or decoded.
pub fn verify_document_round_trip<D: ConstructionDomain>(construct: &Construct<D>) -> bool {
    let json = serde_json::to_string_pretty(&construct.to_document()).expect("document encodes");
    let document: BuildDocument<D> = serde_json::from_str(&json).expect("document decodes");
    match Construct::from_document(document) {
        Ok(restored) => restored.manifest() == construct.manifest(),
        Err(_) => false,
    }
}

/// Proptest strategies for construction testing.
///
/// These strategies generate random but reproducible builds for
/// property-based testing.
pub mod strategies {
    use proptest::prelude::*;

    use traveller_core::config::{ConstructionConfig, EscalationStacking, RulePolicy};
    use traveller_core::construction::{ConstructionDomain, Context};
    use traveller_core::gunsmith::{Gunsmith, WeaponComponent, WeaponStage};
    use traveller_core::robots::{RobotComponent, RobotStage, Robots};

    /// Editable weapon stages.
    const WEAPON_STAGES: [WeaponStage; 6] = [
        WeaponStage::Mechanism,
        WeaponStage::Capacity,
        WeaponStage::Features,
        WeaponStage::MultiMount,
        WeaponStage::Loading,
        WeaponStage::Munitions,
    ];

    /// Editable robot stages, excluding the single-component ones.
    const ROBOT_STAGES: [RobotStage; 6] = [
        RobotStage::ChassisOptions,
        RobotStage::MovementOptions,
        RobotStage::SecondaryLocomotion,
        RobotStage::Manipulators,
        RobotStage::SlotOptions,
        RobotStage::Skills,
    ];

    /// Generate a tech level across the range the rules cover.
    pub fn arb_tech_level() -> impl Strategy<Value = u32> {
        5u32..=16
    }

    /// Generate a configuration with either rule policy.
    pub fn arb_config() -> impl Strategy<Value = ConstructionConfig> {
        (arb_tech_level(), any::<bool>(), any::<bool>()).prop_map(|(tl, stack, skills)| {
            ConstructionConfig::new(tl).with_rules(RulePolicy {
                multi_mount_escalation: if stack {
                    EscalationStacking::Stack
                } else {
                    EscalationStacking::NoStack
                },
                primitive_brain_skills: skills,
            })
        })
    }

    /// Generate a percentage offset in 1..=150.
    pub fn arb_percent() -> impl Strategy<Value = i32> {
        1i32..=150
    }

    fn pick<T: Clone + std::fmt::Debug>(items: Vec<T>) -> impl Strategy<Value = T> {
        let len = items.len();
        (0..len).prop_map(move |i| items[i].clone())
    }

    /// Generate a weapon receiver.
    pub fn arb_receiver() -> impl Strategy<Value = WeaponComponent> {
        pick(WeaponComponent::catalogue(WeaponStage::Receiver))
    }

    /// Generate a `(stage, component)` pair from the weapon catalogue.
    pub fn arb_weapon_part() -> impl Strategy<Value = (WeaponStage, WeaponComponent)> {
        let parts: Vec<_> = WEAPON_STAGES
            .iter()
            .flat_map(|stage| {
                WeaponComponent::catalogue(*stage)
                    .into_iter()
                    .map(move |c| (*stage, c))
            })
            .collect();
        pick(parts)
    }

    /// Generate a `(stage, component)` pair from the robot catalogue.
    pub fn arb_robot_part() -> impl Strategy<Value = (RobotStage, RobotComponent)> {
        let parts: Vec<_> = ROBOT_STAGES
            .iter()
            .flat_map(|stage| {
                RobotComponent::catalogue(*stage)
                    .into_iter()
                    .map(move |c| (*stage, c))
            })
            .collect();
        pick(parts)
    }

    /// Attach parts in order and regenerate. Parts a full stage refuses are
    /// dropped; builds that fail to regenerate yield `None`.
    fn attach_all<D: ConstructionDomain>(
        mut context: Context<D>,
        parts: Vec<(D::Stage, D::Component)>,
    ) -> Option<Context<D>> {
        for (stage, component) in parts {
            let _ = context.add_component(0, stage, component, false);
        }
        context.regenerate().ok()?;
        Some(context)
    }

    /// Generate a random weapon build.
    pub fn arb_weapon() -> impl Strategy<Value = Context<Gunsmith>> {
        (
            arb_config(),
            arb_receiver(),
            prop::collection::vec(arb_weapon_part(), 0..8),
        )
            .prop_filter_map("weapon regenerates", |(config, receiver, parts)| {
                let mut context = Context::<Gunsmith>::new(config).ok()?;
                context
                    .add_component(0, WeaponStage::Receiver, receiver, true)
                    .ok()?;
                attach_all(context, parts)
            })
    }

    /// Generate a random robot build.
    pub fn arb_robot() -> impl Strategy<Value = Context<Robots>> {
        (
            arb_config(),
            pick(RobotComponent::catalogue(RobotStage::Chassis)),
            pick(RobotComponent::catalogue(RobotStage::Locomotion)),
            prop::collection::vec(arb_robot_part(), 0..8),
        )
            .prop_filter_map("robot regenerates", |(config, chassis, locomotion, parts)| {
                let mut context = Context::<Robots>::new(config).ok()?;
                context
                    .replace_component(0, RobotStage::Chassis, 0, chassis, true)
                    .ok()?;
                context
                    .replace_component(0, RobotStage::Locomotion, 0, locomotion, true)
                    .ok()?;
                attach_all(context, parts)
            })
    }
}
