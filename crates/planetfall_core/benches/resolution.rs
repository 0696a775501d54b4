//! Simulation benchmarks for planetfall_core.
//!
//! Run with: `cargo bench -p planetfall_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use planetfall_core::prelude::*;
use planetfall_test_utils::fixtures::{derived_unit, force, resource, COLONY_SHIP, METAL};

fn formula_benchmark(c: &mut Criterion) {
    let mut bindings = Bindings::new();
    bindings.set("level", 12.0);
    bindings.set("laser", 7.0);
    bindings.set("metal_mine", 15.0);

    c.bench_function("formula_evaluate", |b| {
        b.iter(|| {
            planetfall_core::formula::evaluate(
                black_box("40 * 1.5 ^ level + laser * 20 + metal_mine"),
                black_box(&bindings),
            )
            .unwrap()
        })
    });
}

fn combat_benchmark(c: &mut Criterion) {
    c.bench_function("resolve_100v100", |b| {
        b.iter(|| {
            let units = |base: u64| -> Vec<DerivedItem> {
                (0..100)
                    .map(|i| derived_unit(UnitId(base + i), ItemId(10), 40, 30, 100))
                    .collect()
            };
            let attacker = force(
                PlanetId(1),
                UserId(7),
                units(0),
                vec![],
                vec![resource(METAL, 0, 0, 1_000)],
                1_000,
            );
            let defender = force(
                PlanetId(2),
                UserId(8),
                units(1_000),
                vec![],
                vec![resource(METAL, 50_000, 0, 1_000)],
                1_000,
            );
            let resolver = CombatResolver::new(GameRng::new(9), COLONY_SHIP, 1_000);
            resolver
                .resolve(CombatInput {
                    attacker,
                    defender,
                    selected_units: (0..100).map(UnitId).collect(),
                })
                .unwrap()
        })
    });
}

criterion_group!(benches, formula_benchmark, combat_benchmark);
criterion_main!(benches);
