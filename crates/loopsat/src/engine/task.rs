//! Deferred engine work items.

use crate::event::Payload;
use crate::grid::cell::CellId;
use crate::grid::mutation::Mutation;
use crate::lifecycle::LoopId;

/// One unit of deferred work.
///
/// Tasks compare equal when they would do the same thing to the same
/// structure, which is what [`Kernel::schedule_once`] deduplicates on.
///
/// [`Kernel::schedule_once`]: crate::event::Kernel::schedule_once
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    // ------------------------------------------------------------------
    // Cell tasks
    // ------------------------------------------------------------------
    /// Evaluate the rule set for a cell.
    Scan(CellId),
    /// Apply one field write, then rescan as the write requires.
    Mutate(CellId, Mutation),
    /// Request a scan one generation later.
    DeferScan(CellId),
    /// Build a loop starting at the cell.
    LoopNew(CellId),
    /// Decide whether a monitor may spread onto the cell.
    SpreadScan(CellId),
    /// Install a monitor on the cell and move on.
    SpreadApply(CellId),
    /// First hop of a delayed spreading restart.
    SpreadPhase1(CellId),
    /// Second hop; retargets the restart at the cell ahead.
    SpreadPhase2Set(CellId),
    /// Restarts spreading at the cell.
    SpreadPhase2(CellId),

    // ------------------------------------------------------------------
    // Monitor tasks (addressed by the owning cell)
    // ------------------------------------------------------------------
    /// Drop the cell's monitor.
    MonitorRelease(CellId),
    /// Stop the cell's monitor consuming bits.
    MonitorDeactivate(CellId),

    // ------------------------------------------------------------------
    // Loop tasks
    // ------------------------------------------------------------------
    /// Fail the loop once no member is still erasing.
    LoopFailSet(LoopId),
    /// Re-arm a failure check one generation later.
    LoopFailReset(LoopId),
    /// Remove and delete an active loop.
    LoopFail(LoopId),
    /// Move an active loop to the success list.
    LoopSuccess(LoopId),

    // ------------------------------------------------------------------
    // Kernel and simulation tasks
    // ------------------------------------------------------------------
    /// Raise the loop signal.
    RaiseLoop,
    /// Lay down the seed loop.
    Seed,
    /// Hand a frame to the observer.
    Frame,
    /// Schedule the next frame.
    FrameRearm,
    /// Tear down the observer and harvest assignments.
    Epilogue,
    /// Release the grid after a fatal error.
    Failure,
    /// Release the grid after harvesting.
    Success,
    /// Loop signal handler.
    OnLoopSignal,
    /// Error signal handler.
    OnErrorSignal,
    /// Report the result to the observer.
    Notify,
}

/// Structure a [`Task`] acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// A grid cell.
    Cell(CellId),
    /// The monitor of a grid cell.
    Monitor(CellId),
    /// A registered loop.
    Loop(LoopId),
    /// The kernel itself.
    Kernel,
    /// The simulation as a whole.
    Space,
    /// Whoever started the simulation.
    Caller,
}

impl Target {
    /// Whether the target lives in the grid.
    #[inline]
    #[must_use]
    pub const fn is_grid(self) -> bool {
        matches!(self, Self::Cell(_) | Self::Monitor(_) | Self::Loop(_))
    }
}

impl Payload for Task {
    type Id = Target;

    fn payload(&self) -> Target {
        match *self {
            Self::Scan(c)
            | Self::Mutate(c, _)
            | Self::DeferScan(c)
            | Self::LoopNew(c)
            | Self::SpreadScan(c)
            | Self::SpreadApply(c)
            | Self::SpreadPhase1(c)
            | Self::SpreadPhase2Set(c)
            | Self::SpreadPhase2(c) => Target::Cell(c),
            Self::MonitorRelease(c) | Self::MonitorDeactivate(c) => Target::Monitor(c),
            Self::LoopFailSet(l) | Self::LoopFailReset(l) | Self::LoopFail(l) | Self::LoopSuccess(l) => {
                Target::Loop(l)
            }
            Self::RaiseLoop => Target::Kernel,
            Self::Seed
            | Self::Frame
            | Self::FrameRearm
            | Self::Epilogue
            | Self::Failure
            | Self::Success
            | Self::OnLoopSignal
            | Self::OnErrorSignal => Target::Space,
            Self::Notify => Target::Caller,
        }
    }
}
