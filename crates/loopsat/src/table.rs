//! Clause position table.
//!
//! The table is the only view of the formula the automaton has. Column `i`
//! (from 1) lists the literals of clause `i`, one per row, each paired with
//! the truth value that *falsifies* it. Within a column literals are sorted
//! by variable id with padding last, so a monitor can step down a column in
//! the same order a loop generates bits.
//!
//! ```text
//!            col 0      col 1      col 2     ...
//! row 0   (0,PARADOX)  (1,FALSE)  (2,TRUE)
//! row 1   (0,PARADOX)  (2,FALSE)  (3,FALSE)
//! row 2   (0,PARADOX)  (0,TAUT)   (4,FALSE)
//! ```
//!
//! Padding `(0, TAUTOLOGY)` marks "every literal of this clause is false".

use core::fmt;

use crate::error::{Error, Result};

/// Truth value of a literal or an assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TruthValue {
    /// False.
    False,
    /// True.
    True,
    /// True under any assignment.
    Tautology,
    /// False under any assignment.
    Paradox,
}

impl TruthValue {
    /// Negation: swaps false with true and tautology with paradox.
    #[inline]
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::False => Self::True,
            Self::True => Self::False,
            Self::Tautology => Self::Paradox,
            Self::Paradox => Self::Tautology,
        }
    }

    /// `true` for [`TruthValue::True`] and [`TruthValue::Tautology`].
    #[inline]
    #[must_use]
    pub const fn holds(self) -> bool {
        matches!(self, Self::True | Self::Tautology)
    }
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::False => "FALSE",
            Self::True => "TRUE",
            Self::Tautology => "TAUTOLOGY",
            Self::Paradox => "PARADOX",
        };
        f.write_str(name)
    }
}

/// A variable paired with a truth value. Variable 0 is padding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Literal {
    /// Variable id, from 1; 0 when absent.
    pub variable: u32,
    /// Truth value.
    pub value: TruthValue,
}

impl Literal {
    /// Row padding below a clause's literals.
    pub const PADDING: Self = Self::new(0, TruthValue::Tautology);

    /// Sentinel filling column 0.
    pub const SENTINEL: Self = Self::new(0, TruthValue::Paradox);

    /// Creates a literal.
    #[inline]
    #[must_use]
    pub const fn new(variable: u32, value: TruthValue) -> Self {
        Self { variable, value }
    }

    /// Whether this is padding or a sentinel.
    #[inline]
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        self.variable == 0
    }
}

/// A disjunction of literals with at most one literal per variable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    /// An empty clause.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `variable` with `value`.
    ///
    /// Repeating a variable with the same sign changes nothing; with the
    /// opposite sign the clause becomes tautological in that variable.
    pub fn add(&mut self, variable: u32, value: TruthValue) {
        if let Some(existing) = self.literals.iter_mut().find(|l| l.variable == variable) {
            if existing.value != value {
                existing.value = TruthValue::Tautology;
            }
            return;
        }
        self.literals.push(Literal::new(variable, value));
    }

    /// Literals in insertion order.
    #[inline]
    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// Number of distinct variables.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// Whether the clause has no literals.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}

impl FromIterator<(u32, TruthValue)> for Clause {
    fn from_iter<I: IntoIterator<Item = (u32, TruthValue)>>(iter: I) -> Self {
        let mut clause = Self::new();
        for (variable, value) in iter {
            clause.add(variable, value);
        }
        clause
    }
}

/// One satisfying assignment, ordered by variable id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    values: Vec<Literal>,
}

impl Assignment {
    /// Entries in variable order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[Literal] {
        &self.values
    }

    /// Value recorded for `variable`.
    #[must_use]
    pub fn get(&self, variable: u32) -> Option<TruthValue> {
        self.values
            .iter()
            .find(|l| l.variable == variable)
            .map(|l| l.value)
    }

    /// Values as booleans, in variable order.
    #[must_use]
    pub fn to_bools(&self) -> Vec<bool> {
        self.values.iter().map(|l| l.value.holds()).collect()
    }
}

/// Compiled clause position table plus harvested assignments.
#[derive(Clone, PartialEq, Eq)]
pub struct Table {
    record_count: usize,
    column_count: usize,
    variable_count: usize,
    rows: Vec<Vec<Literal>>,
    assignments: Vec<Assignment>,
}

impl Table {
    /// Compiles `clauses` over variables `1..=variable_count`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTable`] when `clauses` is empty.
    pub fn compile(clauses: &[Clause], variable_count: usize) -> Result<Self> {
        if clauses.is_empty() {
            return Err(Error::EmptyTable);
        }
        let record_count = clauses.iter().map(Clause::len).max().unwrap_or(0);
        let column_count = clauses.len() + 1;

        let mut rows = vec![vec![Literal::PADDING; column_count]; record_count];
        for (col, clause) in clauses.iter().enumerate().map(|(i, c)| (i + 1, c)) {
            let mut column: Vec<Literal> = clause
                .literals()
                .iter()
                .map(|l| Literal::new(l.variable, l.value.inverse()))
                .collect();
            column.resize(record_count, Literal::PADDING);
            column.sort_by_key(|l| (l.is_absent(), l.variable));
            for (row, literal) in rows.iter_mut().zip(column) {
                row[col] = literal;
            }
        }
        for row in &mut rows {
            row[0] = Literal::SENTINEL;
        }

        Ok(Self {
            record_count,
            column_count,
            variable_count,
            rows,
            assignments: Vec::new(),
        })
    }

    /// Widest clause; the number of rows.
    #[inline]
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Clause count plus the sentinel column.
    #[inline]
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Number of clauses.
    #[inline]
    #[must_use]
    pub fn clause_count(&self) -> usize {
        self.column_count - 1
    }

    /// Number of variables.
    #[inline]
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Entry at `(row, column)`.
    #[inline]
    #[must_use]
    pub fn entry(&self, row: usize, column: usize) -> Literal {
        self.rows[row][column]
    }

    /// Column `column`, top to bottom.
    pub fn column(&self, column: usize) -> impl Iterator<Item = Literal> + '_ {
        self.rows.iter().map(move |row| row[column])
    }

    /// Replaces the assignment store with `count` empty assignments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if storage cannot be reserved.
    pub fn create_assignment_storage(&mut self, count: usize) -> Result<()> {
        let mut assignments = Vec::new();
        assignments
            .try_reserve_exact(count)
            .map_err(Error::allocation("assignment table"))?;
        for _ in 0..count {
            let mut values = Vec::new();
            values
                .try_reserve_exact(self.variable_count)
                .map_err(Error::allocation("assignment row"))?;
            values.extend((1..=self.variable_count as u32).map(|id| Literal::new(id, TruthValue::False)));
            assignments.push(Assignment { values });
        }
        self.assignments = assignments;
        Ok(())
    }

    /// Records `value` for variable `id` in assignment `slot`.
    ///
    /// Out-of-range slots or ids are ignored.
    pub fn record_assignment(&mut self, slot: usize, id: u32, value: TruthValue) {
        let Some(index) = (id as usize).checked_sub(1) else {
            return;
        };
        if let Some(entry) = self
            .assignments
            .get_mut(slot)
            .and_then(|a| a.values.get_mut(index))
        {
            *entry = Literal::new(id, value);
        }
    }

    /// Harvested assignments.
    #[inline]
    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Moves the harvested assignments out.
    pub fn take_assignments(&mut self) -> Vec<Assignment> {
        core::mem::take(&mut self.assignments)
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Table {{ records: {}, columns: {}, variables: {} }}",
            self.record_count, self.column_count, self.variable_count
        )?;
        for row in &self.rows {
            for literal in row {
                write!(f, " {:>3}:{:<9}", literal.variable, literal.value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
