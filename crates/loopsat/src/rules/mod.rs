//! Cell rule engine.
//!
//! A scan evaluates one cell against its neighbourhood in three ordered
//! stages, stopping at the first rule that fires within a stage:
//!
//! | Stage    | Applies to   | Decides                                   |
//! |----------|--------------|-------------------------------------------|
//! | flags    | every cell   | markers, monitor feeding, loop failure    |
//! | bound    | bound cells  | code flow, detaching, arm extension, bits |
//! | unbound  | background   | growth into the cell, turning             |
//!
//! Rules never write a cell. Every change is queued as a
//! [`Task::Mutate`](crate::engine::Task::Mutate) and lands in the next
//! generation, so all cells of a generation see the same state.
//!
//! - [`patterns`]: neighbourhood predicates shared by the stages
//! - `flags`, `bound`, `unbound`: the three stages

mod bound;
mod flags;
pub(crate) mod patterns;
mod unbound;

use crate::engine::{Observer, Simulation, Task};
use crate::event::Kernel;
use crate::grid::cell::CellId;

impl<O: Observer> Simulation<O> {
    /// Evaluates the full rule set for `cell`.
    pub(crate) fn scan(&mut self, cell: CellId, kernel: &mut Kernel<Task>) {
        self.scan_flags(cell, kernel);
        if self.grid()[cell].is_bound() {
            self.scan_bound(cell, kernel);
        } else {
            self.scan_unbound(cell, kernel);
        }
    }
}
