//! Flag stage.

use super::patterns::Hood;
use crate::engine::{Observer, Simulation, Task};
use crate::event::Kernel;
use crate::grid::cell::{CellId, Code, Flag};
use crate::grid::mutation::Mutation;
use crate::monitor::Verdict;

impl<O: Observer> Simulation<O> {
    fn flag(kernel: &mut Kernel<Task>, cell: CellId, flag: Flag) {
        Self::write(kernel, cell, Mutation::Flag(flag));
    }

    pub(super) fn scan_flags(&mut self, id: CellId, kernel: &mut Kernel<Task>) {
        let hood = Hood::new(&self.grid, id);
        let cell = hood.cell();

        // Erase and collision markers last exactly one scan.
        if cell.flag.is_degenerate() {
            Self::flag(kernel, id, Flag::Quiescent);
            if let Some(member_of) = cell.member_of {
                self.loop_fail_set(member_of, kernel);
            }
            return;
        }

        if cell.is_bound() && hood.any_orthogonal(|n| n.flag == Flag::EraseLoop) {
            Self::flag(kernel, id, Flag::EraseLoop);
            return;
        }

        // A retracting arm copies its collision marker back to the corner,
        // where it becomes a branch request.
        if let Some(dir) = hood.retracting_arm() {
            let flag = if hood.side(dir, -2).heading == Some(dir) {
                Flag::BranchSeq
            } else {
                Flag::Collision
            };
            Self::flag(kernel, id, flag);
            return;
        }

        if cell.code != Code::Quiescent
            && cell.flag.is_settled()
            && hood.any_orthogonal(|n| n.code == Code::Detach)
        {
            Self::flag(kernel, id, Flag::GenZero);
            return;
        }

        if cell.code == Code::ArmExtEnd && hood.extrusion_failed() {
            Self::flag(kernel, id, Flag::BranchSeq);
            return;
        }

        if cell.flag == Flag::GenZero && cell.code == Code::TurnLeft {
            Self::flag(kernel, id, Flag::GenOne);
            return;
        }

        if cell.code == Code::ArmExtStart {
            Self::flag(kernel, id, Flag::Quiescent);
            return;
        }

        if cell.flag.is_generating() {
            if hood.pointing().is_some_and(|p| p.code == Code::Flow) {
                Self::flag(kernel, id, Flag::Quiescent);
                return;
            }
            if cell.code.is_unexplored() {
                Self::flag(kernel, id, Flag::BranchSeq);
                return;
            }
        }

        if cell.id == 0 {
            return;
        }
        let (var, code) = (cell.id, cell.code);
        let loop_len = self.geometry.loop_len;
        let verdict = match self.grid[id].monitor.as_mut() {
            Some(monitor) => monitor.scan(&self.table, loop_len, var, code),
            None => Verdict::NoOp,
        };
        match verdict {
            Verdict::NoOp => {}
            Verdict::Success => kernel.schedule(Task::MonitorDeactivate(id)),
            Verdict::Active => Self::flag(kernel, id, Flag::MonitorActive),
            Verdict::Alert => Self::flag(kernel, id, Flag::MonitorAlert),
            Verdict::Fail => Self::flag(kernel, id, Flag::EraseLoop),
        }
    }
}
