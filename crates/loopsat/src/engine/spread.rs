//! Monitor spreading.
//!
//! Monitors are handed along a ring one cell at a time, each with the next
//! offset, until every clause of the table is watched by some cell. A cell
//! that is not yet in place restarts the hand-over two generations later.

use super::{Observer, Simulation, Task};
use crate::event::Kernel;
use crate::grid::cell::{CellId, Flag};
use crate::monitor::Monitor;

impl<O: Observer> Simulation<O> {
    /// Offset the monitor on `cell` would get: one past its pointing
    /// neighbour's, or 1 when that neighbour has none.
    fn spread_offset(&self, cell: CellId) -> usize {
        match self.grid.pointing(cell).map(|p| self.grid[p].monitor_offset()) {
            Some(offset) if offset != 0 => offset + 1,
            _ => 1,
        }
    }

    fn slot_count(&self, offset: usize) -> usize {
        Monitor::slot_count(offset, self.table.clause_count(), self.geometry.loop_len)
    }

    pub(super) fn spread_scan(&mut self, cell: CellId, kernel: &mut Kernel<Task>) {
        let c = &self.grid[cell];
        if c.flag == Flag::EraseLoop {
            return;
        }
        let Some(heading) = c.heading else {
            kernel.schedule(Task::SpreadPhase2(cell));
            return;
        };

        let left = self.grid.neighbour(cell, heading.toward(-2));
        let ahead = self.grid.neighbour(cell, heading.compass());
        if !self.grid[left].is_bound() && !self.grid[ahead].is_bound() {
            kernel.schedule(Task::SpreadPhase2(cell));
            return;
        }

        // A monitor is never spread twice, nor onto the cell joining a
        // loop to its replicate, nor once every clause is covered.
        let behind_left = self.grid.neighbour(cell, heading.toward(-3));
        if c.monitor.is_some()
            || self.grid[behind_left].heading == Some(heading.left())
            || self.slot_count(self.spread_offset(cell)) == 0
        {
            return;
        }

        kernel.schedule(Task::SpreadApply(cell));
    }

    pub(super) fn spread_apply(&mut self, cell: CellId, kernel: &mut Kernel<Task>) {
        let Some(heading) = self.grid[cell].heading else {
            return;
        };
        let offset = self.spread_offset(cell);
        let ahead = self.grid.neighbour(cell, heading.compass());
        let left = self.grid.neighbour(cell, heading.toward(-2));
        let next = if self.grid[left].is_bound() && self.grid.pointing(left) == Some(cell) {
            left
        } else {
            ahead
        };

        match Monitor::new(offset, self.slot_count(offset)) {
            Ok(monitor) => {
                self.grid[cell].monitor = Some(monitor);
                kernel.schedule_once(Task::SpreadScan(next));
            }
            Err(error) => kernel.fail(error),
        }
    }

    pub(super) fn spread_phase2_set(&mut self, cell: CellId, kernel: &mut Kernel<Task>) {
        let target = match self.grid[cell].heading {
            Some(heading) => self.grid.neighbour(cell, heading.compass()),
            None => cell,
        };
        kernel.schedule(Task::SpreadPhase2(target));
    }
}
