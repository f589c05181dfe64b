//! Simulation driver.
//!
//! [`Simulation`] owns the grid, the loop registry and the clause table, and
//! receives every [`Task`] the [`Kernel`] dispatches. It is the only
//! [`Dispatch`] implementation of the crate.
//!
//! # Run lifecycle
//!
//! ```text
//! start ──► Seed ──► (generations of Scan / Mutate / Spread* / Loop*)
//!                              │
//!            loop signal, no active loop left
//!                              ▼
//!          clear cell tasks ──► Epilogue ──► Success ──► Notify
//!                                   │
//!          error signal ────────────┴──────► Failure ──► Notify
//! ```
//!
//! - [`task`]: the task vocabulary and cancellation targets
//! - `seed`: the initial loop
//! - `spread`: monitor spreading
//! - `loops`: loop creation, failure and success
//! - `harvest`: signal handlers, assignment harvesting, completion

mod harvest;
mod loops;
mod seed;
mod spread;
pub mod task;

use tracing::{debug, info};

pub use self::task::{Target, Task};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::event::signal::Signal;
use crate::event::{Dispatch, Kernel, Payload};
use crate::grid::cell::CellId;
use crate::grid::mutation::{Mutation, Rescan};
use crate::grid::Grid;
use crate::lifecycle::Loops;
use crate::table::{Assignment, Table};
use crate::view::{CellView, Frame};

/// Receiver of everything a run reports.
///
/// Exactly one of [`on_success`](Self::on_success) and
/// [`on_failure`](Self::on_failure) is called per run.
pub trait Observer {
    /// Called every second generation while a visual field is selected.
    fn on_frame(&mut self, _frame: &Frame<'_>) {}

    /// Called once when framing stops, before the result is reported.
    fn on_teardown(&mut self) {}

    /// The run finished; `outcome` holds every harvested assignment.
    fn on_success(&mut self, outcome: Outcome);

    /// The run was aborted by a fatal error.
    fn on_failure(&mut self, error: Error);
}

/// Result of a completed run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outcome {
    assignments: Vec<Assignment>,
    generations: u64,
}

impl Outcome {
    /// Whether at least one satisfying assignment was harvested.
    #[inline]
    #[must_use]
    pub fn is_satisfiable(&self) -> bool {
        !self.assignments.is_empty()
    }

    /// Harvested assignments, most recent success first.
    #[inline]
    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Moves the assignments out.
    #[must_use]
    pub fn into_assignments(self) -> Vec<Assignment> {
        self.assignments
    }

    /// Number of generations the run took.
    #[inline]
    #[must_use]
    pub fn generations(&self) -> u64 {
        self.generations
    }
}

/// An [`Observer`] that only keeps the result.
#[derive(Debug, Default)]
pub struct Collector {
    result: Option<Result<Outcome>>,
}

impl Collector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The reported result, if the run has finished.
    #[must_use]
    pub fn into_result(self) -> Option<Result<Outcome>> {
        self.result
    }
}

impl Observer for Collector {
    fn on_success(&mut self, outcome: Outcome) {
        self.result = Some(Ok(outcome));
    }

    fn on_failure(&mut self, error: Error) {
        self.result = Some(Err(error));
    }
}

/// Sizes derived from the variable count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    /// Side of the square grid.
    pub dim: usize,
    /// Side of the seed loop.
    pub loop_dim: usize,
    /// Cells per loop.
    pub loop_len: usize,
}

impl Geometry {
    /// Geometry for `variables` variables.
    #[must_use]
    pub const fn for_variables(variables: usize) -> Self {
        let dim = (2 * variables + 1) * ((variables + 2) / 3) + 6 * variables + 2;
        let loop_dim = (variables + 8) / 3;
        Self {
            dim,
            loop_dim,
            loop_len: 4 * (loop_dim - 1),
        }
    }
}

/// The automaton and everything it acts on.
pub struct Simulation<O> {
    pub(crate) table: Table,
    config: EngineConfig,
    observer: O,
    pub(crate) geometry: Geometry,
    pub(crate) grid: Grid,
    pub(crate) loops: Loops,
    finishing: bool,
    completed: bool,
    torn_down: bool,
    limit_reached: bool,
    error: Option<Error>,
    report: Option<Result<Outcome>>,
}

impl<O: Observer> Simulation<O> {
    /// Prepares a run of `table`. Nothing is allocated until
    /// [`start`](Self::start).
    pub fn new(table: Table, config: EngineConfig, observer: O) -> Self {
        let geometry = Geometry::for_variables(table.variable_count());
        Self {
            table,
            config,
            observer,
            geometry,
            grid: Grid::empty(),
            loops: Loops::new(),
            finishing: false,
            completed: false,
            torn_down: false,
            limit_reached: false,
            error: None,
            report: None,
        }
    }

    /// Allocates the grid, registers the signal handlers and queues the
    /// seed loop (and the first frame, if a field is visualized).
    ///
    /// An allocation failure is reported through
    /// [`Observer::on_failure`] once the kernel runs.
    pub fn start(&mut self, kernel: &mut Kernel<Task>) {
        let dim = self.geometry.dim;
        match Grid::allocate(dim, dim) {
            Ok(grid) => self.grid = grid,
            Err(error) => {
                self.error = Some(error);
                kernel.schedule(Task::Failure);
                return;
            }
        }

        kernel.register_signal(Signal::Loop, Task::OnLoopSignal);
        kernel.register_signal(Signal::Error, Task::OnErrorSignal);

        info!(
            dim,
            loop_len = self.geometry.loop_len,
            variables = self.table.variable_count(),
            clauses = self.table.clause_count(),
            "simulation started"
        );
        kernel.schedule(Task::Seed);
        if self.config.visual_field.is_enabled() {
            kernel.schedule(Task::Frame);
        }
    }

    /// Grid geometry of this run.
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// The live grid; empty before start and after completion.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The loop registry.
    #[must_use]
    pub fn loops(&self) -> &Loops {
        &self.loops
    }

    /// The clause table.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// The observer.
    #[must_use]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Consumes the simulation, returning its observer.
    #[must_use]
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// The cell at `(row, col)` as drawn for the configured field.
    #[must_use]
    pub fn describe_cell(&self, row: usize, col: usize) -> Option<CellView> {
        self.frame(0).describe_cell(row, col)
    }

    fn frame(&self, tick: u64) -> Frame<'_> {
        Frame::new(
            &self.grid,
            &self.table,
            self.config.visual_field,
            self.loops.has_active(),
            tick,
        )
    }

    // ------------------------------------------------------------------
    // Field writes
    // ------------------------------------------------------------------

    pub(crate) fn write(kernel: &mut Kernel<Task>, cell: CellId, mutation: Mutation) {
        kernel.schedule(Task::Mutate(cell, mutation));
    }

    pub(crate) fn write_id(&self, kernel: &mut Kernel<Task>, cell: CellId, target: u32) {
        if let Some(step) = Mutation::id_step(self.grid[cell].id, target) {
            Self::write(kernel, cell, step);
        }
    }

    fn mutate(&mut self, cell: CellId, mutation: Mutation, kernel: &mut Kernel<Task>) {
        mutation.apply(&mut self.grid[cell]);
        let rescan = mutation.rescan();
        if rescan == Rescan::None {
            return;
        }
        kernel.schedule_once(Task::Scan(cell));
        if let Some(dir) = rescan.neighbour(self.grid[cell].heading) {
            kernel.schedule_once(Task::Scan(self.grid.neighbour(cell, dir)));
        }
    }

    fn frame_task(&mut self, kernel: &mut Kernel<Task>) {
        // Framing ends with teardown.
        if self.torn_down {
            return;
        }
        let frame = Frame::new(
            &self.grid,
            &self.table,
            self.config.visual_field,
            self.loops.has_active(),
            kernel.tick(),
        );
        self.observer.on_frame(&frame);
        kernel.schedule(Task::FrameRearm);
    }
}

impl<O: Observer> Dispatch<Task> for Simulation<O> {
    fn dispatch(&mut self, task: Task, kernel: &mut Kernel<Task>) {
        if let Some(limit) = self.config.generation_limit {
            if !self.limit_reached && !self.finishing && kernel.tick() > limit {
                self.limit_reached = true;
                kernel.fail(Error::GenerationLimit { limit });
            }
        }
        if self.grid.is_empty() && task.payload().is_grid() {
            debug!(?task, "grid released; task dropped");
            return;
        }

        match task {
            Task::Scan(cell) => self.scan(cell, kernel),
            Task::Mutate(cell, mutation) => self.mutate(cell, mutation, kernel),
            Task::DeferScan(cell) => {
                kernel.schedule_once(Task::Scan(cell));
            }
            Task::LoopNew(cell) => self.loop_new(cell, kernel),
            Task::SpreadScan(cell) => self.spread_scan(cell, kernel),
            Task::SpreadApply(cell) => self.spread_apply(cell, kernel),
            Task::SpreadPhase1(cell) => kernel.schedule(Task::SpreadPhase2Set(cell)),
            Task::SpreadPhase2Set(cell) => self.spread_phase2_set(cell, kernel),
            Task::SpreadPhase2(cell) => kernel.schedule(Task::SpreadScan(cell)),
            Task::MonitorRelease(cell) => self.grid[cell].monitor = None,
            Task::MonitorDeactivate(cell) => {
                if let Some(monitor) = self.grid[cell].monitor.as_mut() {
                    monitor.deactivate();
                }
            }
            Task::LoopFailSet(id) => self.loop_fail_set(id, kernel),
            Task::LoopFailReset(id) => {
                kernel.schedule_once(Task::LoopFailSet(id));
            }
            Task::LoopFail(id) => self.loop_fail(id, kernel),
            Task::LoopSuccess(id) => self.loop_success(id, kernel),
            Task::RaiseLoop => kernel.raise(Signal::Loop),
            Task::Seed => self.seed(kernel),
            Task::Frame => self.frame_task(kernel),
            Task::FrameRearm => kernel.schedule(Task::Frame),
            Task::Epilogue => self.epilogue(kernel),
            Task::Failure => self.complete(false, kernel),
            Task::Success => self.complete(true, kernel),
            Task::OnLoopSignal => self.on_loop_signal(kernel),
            Task::OnErrorSignal => self.on_error_signal(kernel),
            Task::Notify => self.notify(),
        }
    }
}

/// Solves `table` to completion on a private kernel.
///
/// # Errors
///
/// Returns the fatal error that aborted the run: an allocation failure
/// inside the engine, a descriptor multiplexing failure in the kernel, or
/// an exceeded [`EngineConfig::generation_limit`].
pub fn solve(table: Table, config: EngineConfig) -> Result<Outcome> {
    let mut kernel = Kernel::with_idle_wait(config.idle_wait);
    let mut sim = Simulation::new(table, config, Collector::new());
    sim.start(&mut kernel);
    kernel.run(&mut sim)?;
    debug!(generations = kernel.tick(), "kernel drained");
    match sim.into_observer().into_result() {
        Some(result) => result,
        None => Err(Error::Incomplete),
    }
}
