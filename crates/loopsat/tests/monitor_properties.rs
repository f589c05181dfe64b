//! Property-based tests for clause monitors and the clause table.

use loopsat::grid::cell::Code;
use loopsat::monitor::{Monitor, Verdict};
use loopsat::{Clause, Table, TruthValue};
use proptest::prelude::*;

const VARIABLES: u32 = 4;
const LOOP_LEN: usize = 8;

fn clause_strategy() -> impl Strategy<Value = Clause> {
    prop::collection::vec((1..=VARIABLES, any::<bool>()), 1..4).prop_map(|lits| {
        lits.into_iter()
            .map(|(v, positive)| {
                let value = if positive { TruthValue::True } else { TruthValue::False };
                (v, value)
            })
            .collect()
    })
}

fn code_strategy() -> impl Strategy<Value = Code> {
    prop_oneof![
        Just(Code::Zero),
        Just(Code::One),
        Just(Code::Unexplored0),
        Just(Code::Flow),
    ]
}

// =============================================================================
// Monitor Progress
// =============================================================================

proptest! {
    /// Slots only move forward, and an eliminated slot stays eliminated.
    #[test]
    fn prop_slots_are_monotone(
        clauses in prop::collection::vec(clause_strategy(), 1..12),
        offset in 1usize..=LOOP_LEN,
        feed in prop::collection::vec((1..=VARIABLES, code_strategy()), 0..40),
    ) {
        let table = Table::compile(&clauses, VARIABLES as usize).unwrap();
        let slots = Monitor::slot_count(offset, table.clause_count(), LOOP_LEN);
        let mut monitor = Monitor::new(offset, slots).unwrap();

        for (id, code) in feed {
            let before = monitor.slots().to_vec();
            let verdict = monitor.scan(&table, LOOP_LEN, id, code);
            if verdict == Verdict::Fail {
                break;
            }
            for (old, new) in before.iter().zip(monitor.slots()) {
                match (old, new) {
                    (None, Some(_)) => prop_assert!(false, "slot revived"),
                    (Some(a), Some(b)) => prop_assert!(b >= a),
                    _ => {}
                }
            }
        }
    }

    /// Undecided bits never change a monitor.
    #[test]
    fn prop_undecided_bits_are_ignored(
        clauses in prop::collection::vec(clause_strategy(), 1..12),
        offset in 1usize..=LOOP_LEN,
        id in 1..=VARIABLES,
    ) {
        let table = Table::compile(&clauses, VARIABLES as usize).unwrap();
        let slots = Monitor::slot_count(offset, table.clause_count(), LOOP_LEN);
        let mut monitor = Monitor::new(offset, slots).unwrap();
        let before = monitor.clone();
        let verdict = monitor.scan(&table, LOOP_LEN, id, Code::Unexplored1);
        prop_assert_ne!(verdict, Verdict::Fail);
        prop_assert_eq!(monitor.slots(), before.slots());
    }

    /// Monitors of one loop watch every clause exactly once between them.
    #[test]
    fn prop_slot_counts_cover_all_clauses(clause_count in 0usize..64, loop_len in 1usize..20) {
        let total: usize = (1..=loop_len)
            .map(|k| Monitor::slot_count(k, clause_count, loop_len))
            .sum();
        prop_assert_eq!(total, clause_count);
    }
}

// =============================================================================
// Table Layout
// =============================================================================

proptest! {
    /// Each column is sorted by variable with padding trailing, and holds the
    /// falsifying value of every literal.
    #[test]
    fn prop_columns_sorted_and_inverted(clauses in prop::collection::vec(clause_strategy(), 1..12)) {
        let table = Table::compile(&clauses, VARIABLES as usize).unwrap();
        for (i, clause) in clauses.iter().enumerate() {
            let column: Vec<_> = table.column(i + 1).collect();
            let present: Vec<_> = column.iter().filter(|l| !l.is_absent()).collect();
            prop_assert_eq!(present.len(), clause.len());
            prop_assert!(present.windows(2).all(|w| w[0].variable < w[1].variable));
            prop_assert!(column.iter().skip(present.len()).all(|l| l.is_absent()));
            for literal in clause.literals() {
                let entry = present.iter().find(|l| l.variable == literal.variable);
                prop_assert_eq!(entry.map(|l| l.value), Some(literal.value.inverse()));
            }
        }
        for row in 0..table.record_count() {
            prop_assert_eq!(table.entry(row, 0).value, TruthValue::Paradox);
        }
    }
}
