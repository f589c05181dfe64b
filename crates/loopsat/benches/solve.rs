//! loopsat Benchmarks
//!
//! Measures full solver runs and the per-generation cost of the automaton.
//!
//! ```bash
//! cargo bench -p loopsat
//! ```

#![allow(missing_docs, clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use loopsat::{solve, Clause, Collector, EngineConfig, Kernel, Simulation, Table, TruthValue};

fn table(clauses: &[&[i32]]) -> Table {
    let clauses: Vec<Clause> = clauses
        .iter()
        .map(|c| {
            c.iter()
                .map(|&l| {
                    let value = if l > 0 { TruthValue::True } else { TruthValue::False };
                    (l.unsigned_abs(), value)
                })
                .collect()
        })
        .collect();
    let vars = clauses
        .iter()
        .flat_map(|c| c.literals().iter().map(|l| l.variable))
        .max()
        .unwrap_or(0) as usize;
    Table::compile(&clauses, vars).unwrap()
}

const FORMULAS: [(&str, &[&[i32]]); 4] = [
    ("unit", &[&[1]]),
    ("xor", &[&[1, 2], &[-1, -2]]),
    ("three_vars", &[&[1, 2, 3], &[-1, -2], &[-3]]),
    ("four_vars", &[&[1, 2], &[-2, 3, 4], &[-2, -4], &[-3]]),
];

// ============================================================================
// Full Runs
// ============================================================================

fn bench_solve(c: &mut Criterion) {
    let mut g = c.benchmark_group("solve");
    g.sample_size(10);
    for (name, clauses) in FORMULAS {
        let compiled = table(clauses);
        g.bench_with_input(BenchmarkId::from_parameter(name), &compiled, |b, t| {
            b.iter(|| solve(black_box(t.clone()), EngineConfig::default()))
        });
    }
    g.finish();
}

// ============================================================================
// Generations
// ============================================================================

/// Cost of the first hundred generations after seeding.
fn bench_generations(c: &mut Criterion) {
    let compiled = table(FORMULAS[3].1);
    c.bench_function("generations/100", |b| {
        b.iter(|| {
            let mut kernel = Kernel::new();
            let mut sim = Simulation::new(compiled.clone(), EngineConfig::default(), Collector::new());
            sim.start(&mut kernel);
            for _ in 0..100 {
                let _ = kernel.turn(&mut sim);
            }
            black_box(sim.grid().bound_count())
        })
    });
}

criterion_group!(benches, bench_solve, bench_generations);
criterion_main!(benches);
