//! Regeneration benchmarks for traveller_core.
//!
//! Run with: `cargo bench -p traveller_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use traveller_core::gunsmith::WeaponStage;
use traveller_core::persist::Weapon;
use traveller_test_utils::fixtures;

/// Full replay of sample builds.
pub fn regeneration_benchmark(c: &mut Criterion) {
    let mut rifle = fixtures::assault_rifle();
    c.bench_function("regenerate_assault_rifle", |b| {
        b.iter(|| black_box(&mut rifle).regenerate())
    });

    let mut robot = fixtures::utility_robot();
    c.bench_function("regenerate_utility_robot", |b| {
        b.iter(|| black_box(&mut robot).regenerate())
    });
}

/// Candidate filtering replays a scratch copy for every query.
pub fn compatibility_benchmark(c: &mut Criterion) {
    let rifle = fixtures::assault_rifle();
    c.bench_function("find_compatible_features", |b| {
        b.iter(|| {
            rifle.find_compatible_components(
                0,
                WeaponStage::Features,
                None,
                traveller_core::gunsmith::WeaponComponent::catalogue(WeaponStage::Features),
            )
        })
    });
}

/// Manifest rendering and document round-trips.
pub fn persistence_benchmark(c: &mut Criterion) {
    let weapon = Weapon::from_context("Rifle", fixtures::assault_rifle());
    c.bench_function("manifest_to_bytes", |b| {
        b.iter(|| black_box(&weapon).manifest().to_bytes())
    });
    c.bench_function("document_round_trip", |b| {
        b.iter(|| Weapon::from_document(black_box(&weapon).to_document()))
    });
}

criterion_group!(
    benches,
    regeneration_benchmark,
    compatibility_benchmark,
    persistence_benchmark
);
criterion_main!(benches);
