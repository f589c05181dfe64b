//! The initial configuration.
//!
//! One square loop sits in the bottom-left quarter of the grid with a
//! growing arm sticking out to the right of its corner:
//!
//! ```text
//!   < < < ^          top row: ids continue leftwards
//!   v     ^          left side: ids 1.. downwards, right side: upwards
//!   v     ^
//!   L > > G G o o    corner (turn-left), then the arm
//! ```

use tracing::debug;

use super::{Observer, Simulation, Task};
use crate::event::Kernel;
use crate::grid::cell::{CellId, Code, Colour};
use crate::grid::compass::Heading;

/// Hands out variable ids to ring cells until the variables run out.
struct Ids {
    next: u32,
    remaining: usize,
}

impl Ids {
    fn take(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let id = self.next;
        self.next += 1;
        Some(id)
    }

    fn skip(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

impl<O: Observer> Simulation<O> {
    fn place(&mut self, cell: CellId, code: Code, heading: Heading) {
        let c = &mut self.grid[cell];
        c.code = code;
        c.heading = Some(heading);
        c.colour = Colour::Red;
    }

    fn place_ring_cell(&mut self, cell: CellId, ids: &mut Ids, heading: Heading, kernel: &mut Kernel<Task>) {
        match ids.take() {
            Some(id) => {
                self.place(cell, Code::Unexplored0, heading);
                self.grid[cell].id = id;
            }
            None => self.place(cell, Code::Flow, heading),
        }
        kernel.schedule_once(Task::Scan(cell));
    }

    pub(super) fn seed(&mut self, kernel: &mut Kernel<Task>) {
        let dim = self.geometry.dim;
        let loop_dim = self.geometry.loop_dim;
        let x0 = (dim / (2 * (loop_dim + 1))).saturating_sub(1) * (loop_dim + 1);
        let y0 = dim - 1 - x0;
        let top = y0 + 1 - loop_dim;
        debug!(row = y0, col = x0, loop_dim, "seeding initial loop");

        let corner = self.grid.at(y0, x0);
        self.place(corner, Code::TurnLeft, Heading::Down);
        kernel.schedule_once(Task::Scan(corner));
        kernel.schedule_once(Task::SpreadScan(corner));
        kernel.schedule(Task::LoopNew(corner));

        // Bottom edge and the arm beyond it.
        for i in 1..=loop_dim + 1 {
            let cell = self.grid.at(y0, x0 + i);
            let code = if i < loop_dim { Code::Grow } else { Code::Flow };
            self.place(cell, code, Heading::Right);
            kernel.schedule_once(Task::Scan(cell));
        }
        kernel.schedule_once(Task::SpreadScan(self.grid.at(y0, x0 + loop_dim + 1)));

        let mut ids = Ids {
            next: 1,
            remaining: self.table.variable_count(),
        };

        // Left edge, upwards from the corner.
        for i in 1..loop_dim {
            let row = y0 - i;
            let heading = if row == top { Heading::Left } else { Heading::Down };
            let cell = self.grid.at(row, x0);
            self.place_ring_cell(cell, &mut ids, heading, kernel);
        }

        // Top edge, rightwards.
        for i in 1..loop_dim {
            let heading = if i == loop_dim - 1 { Heading::Up } else { Heading::Left };
            let cell = self.grid.at(top, x0 + i);
            self.place_ring_cell(cell, &mut ids, heading, kernel);
        }

        // Right edge, top to bottom; each cell here uses up two variables.
        let right = x0 + loop_dim - 1;
        for i in 0..loop_dim.saturating_sub(2) {
            let cell = self.grid.at(top + 1 + i, right);
            self.place_ring_cell(cell, &mut ids, Heading::Up, kernel);
            ids.skip();
        }
    }
}
