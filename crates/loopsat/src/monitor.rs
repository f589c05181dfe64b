//! Clause monitors.
//!
//! A loop of `L` cells shares the clauses between its monitors: the monitor
//! with spreading offset `k` (from 1) watches clauses `k, k+L, k+2L, ...`.
//! Each watched clause gets a slot holding the table row of the next literal
//! expected to be falsified. As decided bits pass the monitor, a slot either
//! advances (the literal was falsified) or is eliminated (the literal was
//! satisfied, so the clause is). Reaching padding means every literal of the
//! clause is false.

use crate::error::{Error, Result};
use crate::grid::cell::Code;
use crate::table::{Table, TruthValue};

/// Result of feeding one bit to a monitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing changed.
    NoOp,
    /// Every watched clause is satisfied.
    Success,
    /// A literal matched and its clause is still open.
    Active,
    /// A clause has a single open literal left.
    Alert,
    /// A clause is falsified.
    Fail,
}

/// Per-cell clause watcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Monitor {
    slots: Vec<Option<usize>>,
    offset: usize,
    active: bool,
}

impl Monitor {
    /// Number of clauses watched by the monitor at `offset`.
    #[must_use]
    pub fn slot_count(offset: usize, clause_count: usize, loop_len: usize) -> usize {
        if loop_len == 0 {
            return 0;
        }
        let per = clause_count / loop_len;
        let rest = clause_count - per * loop_len;
        per + usize::from(offset <= rest)
    }

    /// Creates an active monitor with every slot at row 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if the slot table cannot be reserved.
    pub fn new(offset: usize, slot_count: usize) -> Result<Self> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(slot_count)
            .map_err(Error::allocation("monitor slots"))?;
        slots.resize(slot_count, Some(0));
        Ok(Self {
            slots,
            offset,
            active: true,
        })
    }

    /// Spreading offset, from 1.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether the monitor still consumes bits.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stops consuming bits.
    #[inline]
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Slot rows; `None` for eliminated clauses.
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[Option<usize>] {
        &self.slots
    }

    /// Furthest row any slot has reached.
    #[must_use]
    pub fn furthest(&self) -> usize {
        self.slots.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Whether `row` is the last row of `table`.
    #[inline]
    #[must_use]
    pub fn is_fail_row(row: usize, table: &Table) -> bool {
        row + 1 == table.record_count()
    }

    /// Feeds the bit `code` carried for variable `id`.
    pub fn scan(&mut self, table: &Table, loop_len: usize, id: u32, code: Code) -> Verdict {
        if !self.active {
            return Verdict::NoOp;
        }

        let generated = code.truth_value();
        let mut verdict = Verdict::NoOp;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let Some(row) = *slot else {
                continue;
            };
            let entry = table.entry(row, self.offset + i * loop_len);
            if entry.is_absent() && entry.value == TruthValue::Tautology {
                return Verdict::Fail;
            }
            if entry.variable != id {
                continue;
            }
            if entry.value == TruthValue::Paradox || Some(entry.value) != generated {
                if code.is_final() {
                    *slot = None;
                }
                continue;
            }
            if Self::is_fail_row(row, table) {
                return Verdict::Fail;
            }
            verdict = if row + 2 == table.record_count() {
                Verdict::Alert
            } else {
                Verdict::Active
            };
            *slot = Some(row + 1);
        }

        if self.slots.iter().all(Option::is_none) {
            Verdict::Success
        } else {
            verdict
        }
    }
}
