//! End-to-end runs of the automaton.
//!
//! Each formula is solved to completion and the harvested assignments are
//! checked against the formula itself and against the known solution set.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p loopsat --test solve_end_to_end --release
//! ```

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;

use loopsat::{
    solve, Clause, EngineConfig, Error, Frame, Kernel, Observer, Outcome, Simulation, Table,
    TruthValue, VisualField,
};

/// Builds a table from DIMACS-style signed literals.
fn formula(clauses: &[&[i32]]) -> (Table, Vec<Clause>) {
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
    (Table::compile(&clauses, vars).unwrap(), clauses)
}

fn satisfies(bits: &[bool], clauses: &[Clause]) -> bool {
    clauses.iter().all(|c| {
        c.literals().iter().any(|l| match l.value {
            TruthValue::True => bits[l.variable as usize - 1],
            TruthValue::False => !bits[l.variable as usize - 1],
            TruthValue::Tautology => true,
            TruthValue::Paradox => false,
        })
    })
}

/// Solves and checks that every harvested assignment is a model.
fn run(clauses: &[&[i32]]) -> BTreeSet<String> {
    let (table, clauses) = formula(clauses);
    let outcome = solve(table, EngineConfig::default()).unwrap();
    let mut seen = BTreeSet::new();
    for assignment in outcome.assignments() {
        let bits = assignment.to_bools();
        assert!(satisfies(&bits, &clauses), "not a model: {bits:?}");
        let word: String = bits.iter().map(|&b| if b { 'T' } else { 'F' }).collect();
        assert!(seen.insert(word), "duplicate assignment");
    }
    assert_eq!(outcome.is_satisfiable(), !seen.is_empty());
    seen
}

fn set(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| (*w).to_owned()).collect()
}

// =============================================================================
// Satisfiable Formulas
// =============================================================================

#[test]
fn test_single_positive_literal() {
    assert_eq!(run(&[&[1]]), set(&["T"]));
}

#[test]
fn test_tautology_yields_both_values() {
    assert_eq!(run(&[&[1, -1]]), set(&["T", "F"]));
}

#[test]
fn test_unique_model_of_two_variables() {
    assert_eq!(run(&[&[1, 2], &[-1, 2], &[1, -2]]), set(&["TT"]));
}

#[test]
fn test_exclusive_or() {
    assert_eq!(run(&[&[1, 2], &[-1, -2]]), set(&["FT", "TF"]));
}

#[test]
fn test_three_variables_with_unit_clause() {
    assert_eq!(run(&[&[1, 2, 3], &[-1, -2], &[-3]]), set(&["FTF", "TFF"]));
}

#[test]
fn test_all_units() {
    assert_eq!(run(&[&[1], &[2], &[3]]), set(&["TTT"]));
}

#[test]
fn test_chained_implications() {
    assert_eq!(
        run(&[&[1, 2], &[-1, 3], &[-2, -3], &[-1, -2]]),
        set(&["FTF", "TFT"])
    );
}

#[test]
fn test_at_most_one_of_three() {
    assert_eq!(
        run(&[&[1, 2, 3], &[-1, -2], &[-2, -3], &[-1, -3], &[1, -3]]),
        set(&["FTF", "TFF"])
    );
}

#[test]
fn test_four_variables() {
    assert_eq!(
        run(&[&[1, 2], &[-2, 3, 4], &[-2, -4], &[-3]]),
        set(&["TFFT", "TFFF"])
    );
}

#[test]
fn test_five_variables_forced() {
    assert_eq!(
        run(&[&[1, 2, 3, 4, 5], &[-1], &[-2], &[-3], &[-4]]),
        set(&["FFFFT"])
    );
}

// =============================================================================
// Unsatisfiable Formulas
// =============================================================================

#[test]
fn test_contradictory_units() {
    assert!(run(&[&[1], &[-1]]).is_empty());
}

#[test]
fn test_disjunction_with_both_negated() {
    assert!(run(&[&[1, 2], &[-1], &[-2]]).is_empty());
}

#[test]
fn test_all_four_binary_clauses() {
    assert!(run(&[&[1, 2], &[-1, 2], &[1, -2], &[-1, -2]]).is_empty());
}

// =============================================================================
// Observation
// =============================================================================

#[derive(Default)]
struct Recorder {
    frames: usize,
    teardowns: usize,
    described_in_first_frame: Option<usize>,
    outcome: Option<Outcome>,
    failure: Option<Error>,
}

impl Observer for Recorder {
    fn on_frame(&mut self, frame: &Frame<'_>) {
        self.frames += 1;
        if self.described_in_first_frame.is_none() {
            let described = (0..frame.height())
                .flat_map(|r| (0..frame.width()).map(move |c| (r, c)))
                .filter(|&(r, c)| frame.describe_cell(r, c).is_some())
                .count();
            self.described_in_first_frame = Some(described);
        }
    }

    fn on_teardown(&mut self) {
        self.teardowns += 1;
    }

    fn on_success(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
    }

    fn on_failure(&mut self, error: Error) {
        self.failure = Some(error);
    }
}

#[test]
fn test_frames_are_reported_while_a_field_is_selected() {
    let (table, _) = formula(&[&[1, 2], &[-1, -2]]);
    let config = EngineConfig::default().with_visual_field(VisualField::Code);
    let mut kernel = Kernel::with_idle_wait(config.idle_wait);
    let mut sim = Simulation::new(table, config, Recorder::default());
    sim.start(&mut kernel);
    kernel.run(&mut sim).unwrap();

    let recorder = sim.into_observer();
    assert!(recorder.frames > 0);
    assert_eq!(recorder.teardowns, 1);
    assert!(recorder.described_in_first_frame.is_some_and(|n| n > 0));
    assert!(recorder.failure.is_none());
    let outcome = recorder.outcome.unwrap();
    assert_eq!(outcome.assignments().len(), 2);
    assert!(outcome.generations() > 0);
}

#[test]
fn test_no_frames_without_a_field() {
    let (table, _) = formula(&[&[1]]);
    let mut kernel = Kernel::new();
    let mut sim = Simulation::new(table, EngineConfig::default(), Recorder::default());
    sim.start(&mut kernel);
    kernel.run(&mut sim).unwrap();

    let recorder = sim.into_observer();
    assert_eq!(recorder.frames, 0);
    assert_eq!(recorder.teardowns, 0);
    assert!(recorder.outcome.is_some_and(|o| o.is_satisfiable()));
}

#[test]
fn test_grid_is_released_after_the_run() {
    let (table, _) = formula(&[&[1, 2]]);
    let mut kernel = Kernel::new();
    let mut sim = Simulation::new(table, EngineConfig::default(), Recorder::default());
    sim.start(&mut kernel);
    assert!(!sim.grid().is_empty());
    kernel.run(&mut sim).unwrap();
    assert!(sim.grid().is_empty());
    assert!(sim.loops().is_empty());
    assert_eq!(kernel.pending(), 0);
}

// =============================================================================
// Generation Limit
// =============================================================================

/// Keeps replicating with its variables numbered as written.
const RESTLESS: [&[i32]; 5] = [
    &[1, -5, 1],
    &[-6, -3, -5],
    &[-3, 3, 5],
    &[2, -3],
    &[-6, 4, -3],
];

/// The same formula numbered by first appearance.
const RESTLESS_RENUMBERED: [&[i32]; 5] = [
    &[1, -2, 1],
    &[-3, -4, -2],
    &[-4, 4, 2],
    &[5, -4],
    &[-3, 6, -4],
];

#[test]
fn test_generation_limit_aborts_a_restless_run() {
    let (table, _) = formula(&RESTLESS);
    let config = EngineConfig::default().with_generation_limit(2_000);
    let mut kernel = Kernel::new();
    let mut sim = Simulation::new(table, config, Recorder::default());
    sim.start(&mut kernel);
    kernel.run(&mut sim).unwrap();

    assert!(kernel.tick() > 2_000);
    assert!(sim.grid().is_empty());
    assert_eq!(kernel.pending(), 0);
    let recorder = sim.into_observer();
    assert!(recorder.outcome.is_none());
    assert!(matches!(recorder.failure, Some(Error::GenerationLimit { limit: 2_000 })));
}

#[test]
fn test_renumbered_formula_finishes_within_the_limit() {
    let (table, clauses) = formula(&RESTLESS_RENUMBERED);
    let outcome = solve(table, EngineConfig::default().with_generation_limit(20_000)).unwrap();
    assert!(outcome.generations() <= 20_000);
    // 24 of its 32 models are reached.
    assert_eq!(outcome.assignments().len(), 24);
    for assignment in outcome.assignments() {
        assert!(satisfies(&assignment.to_bools(), &clauses));
    }
}
