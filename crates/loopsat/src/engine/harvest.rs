//! Run termination: signal handlers, harvesting and completion.

use tracing::{debug, info, warn};

use super::{Observer, Outcome, Simulation, Target, Task};
use crate::error::{Error, Result};
use crate::event::{Kernel, Payload};
use crate::grid::cell::Code;
use crate::grid::Grid;
use crate::table::TruthValue;

impl<O: Observer> Simulation<O> {
    /// Drops every pending task of a bound cell and the pending frame.
    fn clear_cell_tasks(&mut self, kernel: &mut Kernel<Task>) {
        let bound: Vec<_> = self
            .grid
            .iter()
            .filter(|(_, c)| c.is_bound())
            .map(|(id, _)| id)
            .collect();
        let mut dropped = 0;
        for id in bound {
            dropped += kernel.cancel_all(Target::Cell(id));
        }
        dropped += kernel.cancel_where(|task| matches!(task, Task::Frame | Task::FrameRearm));
        debug!(dropped, "cell tasks cleared");
    }

    pub(super) fn on_loop_signal(&mut self, kernel: &mut Kernel<Task>) {
        if self.loops.has_active() || self.finishing {
            return;
        }
        self.finishing = true;
        info!(
            tick = kernel.tick(),
            successes = self.loops.succeeded().len(),
            "search exhausted"
        );
        self.clear_cell_tasks(kernel);
        kernel.schedule(Task::Epilogue);
    }

    pub(super) fn on_error_signal(&mut self, kernel: &mut Kernel<Task>) {
        if self.grid.is_empty() {
            return;
        }
        self.finishing = true;
        self.clear_cell_tasks(kernel);
        kernel.schedule(Task::Failure);
    }

    fn teardown(&mut self) {
        if self.config.visual_field.is_enabled() && !self.torn_down {
            self.torn_down = true;
            self.observer.on_teardown();
        }
    }

    pub(super) fn epilogue(&mut self, kernel: &mut Kernel<Task>) {
        self.teardown();
        match self.harvest() {
            Ok(()) => kernel.schedule(Task::Success),
            Err(error) => {
                self.error = Some(error);
                kernel.schedule(Task::Failure);
            }
        }
    }

    /// Reads one assignment off every succeeded loop, most recent success
    /// first, and deletes the loops.
    fn harvest(&mut self) -> Result<()> {
        let succeeded: Vec<_> = self.loops.succeeded().iter().rev().copied().collect();
        let mut corners = Vec::with_capacity(succeeded.len());
        for id in succeeded {
            let corner = self
                .loops
                .ring(id)
                .and_then(|ring| ring.iter().copied().find(|&c| self.grid[c].code == Code::TurnLeft));
            match corner {
                Some(corner) => corners.push((id, corner)),
                None => {
                    warn!(loop_id = %id, "succeeded loop has no turn-left cell");
                    self.loops.delete(id, &mut self.grid);
                }
            }
        }
        if corners.is_empty() {
            return Ok(());
        }
        self.table.create_assignment_storage(corners.len())?;

        let variables = u32::try_from(self.table.variable_count()).unwrap_or(u32::MAX);
        for (slot, (id, corner)) in corners.into_iter().enumerate() {
            let mut cursor = self.grid.pointing(corner);
            for var in 1..=variables {
                let Some(cell) = cursor else {
                    break;
                };
                let code = self.grid[cell].code;
                let value = code.truth_value().unwrap_or_else(|| {
                    warn!(loop_id = %id, variable = var, ?code, "undecided bit harvested");
                    TruthValue::Paradox
                });
                self.table.record_assignment(slot, var, value);
                cursor = self.grid.pointing(cell);
            }
            self.loops.delete(id, &mut self.grid);
        }
        info!(assignments = self.table.assignments().len(), "assignments harvested");
        Ok(())
    }

    /// Releases everything the run still holds and queues the report.
    pub(super) fn complete(&mut self, success: bool, kernel: &mut Kernel<Task>) {
        if self.completed {
            return;
        }
        self.completed = true;
        let dropped = kernel.cancel_where(|task| {
            task.payload().is_grid() || matches!(task, Task::Frame | Task::FrameRearm)
        });
        self.teardown();
        self.loops.clear(&mut self.grid);
        self.grid = Grid::empty();

        let report = if success {
            Ok(Outcome {
                assignments: self.table.take_assignments(),
                generations: kernel.tick(),
            })
        } else {
            Err(self
                .error
                .take()
                .or_else(|| kernel.take_fault())
                .unwrap_or(Error::Incomplete))
        };
        debug!(dropped, success, "grid released");
        self.report = Some(report);
        kernel.schedule(Task::Notify);
    }

    pub(super) fn notify(&mut self) {
        match self.report.take() {
            Some(Ok(outcome)) => {
                info!(
                    satisfiable = outcome.is_satisfiable(),
                    assignments = outcome.assignments().len(),
                    "run succeeded"
                );
                self.observer.on_success(outcome);
            }
            Some(Err(error)) => {
                warn!(%error, "run failed");
                self.observer.on_failure(error);
            }
            None => {}
        }
    }
}
