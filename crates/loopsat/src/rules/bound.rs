//! Bound stage.
//!
//! A bound cell normally copies code and id from its pointing neighbour,
//! which is how signals travel along a ring. The special cases below detach
//! finished replicas, start arm extensions, and decide unexplored bits.

use super::patterns::Hood;
use crate::engine::{Observer, Simulation, Task};
use crate::event::Kernel;
use crate::grid::cell::{CellId, Code, Colour, Flag};
use crate::grid::mutation::Mutation;

impl<O: Observer> Simulation<O> {
    fn code(kernel: &mut Kernel<Task>, cell: CellId, code: Code) {
        Self::write(kernel, cell, Mutation::Code(code));
    }

    /// Queues the writes that return `cell` to the background.
    fn unbind(kernel: &mut Kernel<Task>, cell: CellId) {
        Self::code(kernel, cell, Code::Quiescent);
        Self::write(kernel, cell, Mutation::Heading(None));
        Self::write(kernel, cell, Mutation::Colour(Colour::Quiescent));
    }

    pub(super) fn scan_bound(&mut self, id: CellId, kernel: &mut Kernel<Task>) {
        let hood = Hood::new(&self.grid, id);
        let cell = hood.cell();
        let (Some(heading), Some(nb)) = (cell.heading, hood.pointing()) else {
            return;
        };

        if cell.flag.is_degenerate() {
            Self::unbind(kernel, id);
            self.write_id(kernel, id, 0);
            kernel.schedule(Task::MonitorRelease(id));
            return;
        }

        if cell.code == Code::Quiescent {
            if nb.code == Code::Grow {
                Self::code(kernel, id, Code::Flow);
            } else {
                kernel.schedule(Task::DeferScan(id));
            }
            return;
        }

        if cell.code == Code::Detach && hood.any_orthogonal(|n| n.flag == Flag::GenZero) {
            Self::unbind(kernel, id);
            return;
        }

        if hood.closes_loop() {
            Self::code(kernel, id, Code::Detach);
            self.write_id(kernel, id, 0);
            return;
        }

        // The parent detached: turn right and close the child ring.
        if nb.code == Code::Detach {
            let code = hood.side(heading, -2).code;
            Self::write(kernel, id, Mutation::Heading(Some(heading.right())));
            Self::code(kernel, id, code);
            kernel.schedule(Task::LoopNew(id));
            return;
        }

        if cell.code != Code::Flow
            && cell.code != Code::ArmExtStart
            && cell.flag == Flag::BranchSeq
            && nb.code == Code::Flow
        {
            Self::code(kernel, id, Code::ArmExtStart);
            self.write_id(kernel, id, 0);
            return;
        }

        if cell.code == Code::ArmExtStart {
            Self::code(kernel, id, Code::ArmExtEnd);
            return;
        }

        // Extension codes never travel round corners.
        if hood.arm_start_corner() {
            Self::code(kernel, id, Code::Flow);
            self.write_id(kernel, id, 0);
            return;
        }
        if cell.code == Code::Flow && nb.code == Code::ArmExtEnd {
            Self::code(kernel, id, Code::Flow);
            return;
        }

        if nb.flag.is_generating() {
            Self::code(kernel, id, nb.code.decide(nb.flag == Flag::GenOne));
            self.write_id(kernel, id, nb.id);
            return;
        }

        // A decided bit with nothing left to check behind it completes the
        // candidate assignment.
        if !cell.is_monitoring() && cell.code.is_final() && nb.code == Code::Flow {
            if let Some(member_of) = cell.member_of {
                self.loop_success_set(member_of, kernel);
            }
        }
        Self::code(kernel, id, nb.code);
        self.write_id(kernel, id, nb.id);
    }
}
