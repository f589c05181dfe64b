//! Loop creation, failure and success.

use tracing::{debug, info};

use super::{Observer, Simulation, Target, Task};
use crate::event::Kernel;
use crate::grid::cell::{CellId, Flag};
use crate::lifecycle::LoopId;

impl<O: Observer> Simulation<O> {
    pub(super) fn loop_new(&mut self, start: CellId, kernel: &mut Kernel<Task>) {
        match self.loops.create(&mut self.grid, start, self.geometry.loop_len) {
            Ok(id) => debug!(loop_id = %id, active = self.loops.active_count(), "loop started"),
            Err(error) => kernel.fail(error),
        }
    }

    fn ring_has_flag(&self, id: LoopId, flag: Flag) -> bool {
        self.loops
            .ring(id)
            .is_some_and(|ring| ring.iter().any(|&c| self.grid[c].flag == flag))
    }

    /// Requests failure of `id`; while a member still erases, the check is
    /// retried every other generation.
    pub(crate) fn loop_fail_set(&self, id: LoopId, kernel: &mut Kernel<Task>) {
        if self.ring_has_flag(id, Flag::EraseLoop) {
            kernel.schedule_once(Task::LoopFailReset(id));
        } else {
            kernel.schedule_once(Task::LoopFail(id));
        }
    }

    pub(super) fn loop_fail(&mut self, id: LoopId, kernel: &mut Kernel<Task>) {
        if !self.loops.remove_active(id) {
            return;
        }
        kernel.schedule_once(Task::RaiseLoop);
        self.loops.delete(id, &mut self.grid);
        kernel.cancel_all(Target::Loop(id));
        debug!(loop_id = %id, active = self.loops.active_count(), "loop failed");
    }

    /// Requests success of `id` unless a member is still monitoring or
    /// erasing.
    pub(crate) fn loop_success_set(&self, id: LoopId, kernel: &mut Kernel<Task>) {
        if !self.loops.is_active(id) {
            return;
        }
        let Some(ring) = self.loops.ring(id) else {
            return;
        };
        let busy = ring.iter().any(|&c| {
            let cell = &self.grid[c];
            cell.is_monitoring() || cell.flag == Flag::EraseLoop
        });
        if !busy {
            kernel.schedule_once(Task::LoopSuccess(id));
        }
    }

    pub(super) fn loop_success(&mut self, id: LoopId, kernel: &mut Kernel<Task>) {
        if !self.loops.succeed(id) {
            return;
        }
        kernel.schedule_once(Task::RaiseLoop);
        info!(
            loop_id = %id,
            successes = self.loops.succeeded().len(),
            active = self.loops.active_count(),
            "loop succeeded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::Collector;
    use crate::grid::compass::Heading;
    use crate::monitor::Monitor;
    use crate::table::{Clause, Table, TruthValue};

    /// A started single-variable simulation; its own kernel is discarded.
    fn simulation() -> Simulation<Collector> {
        let clause: Clause = [(1, TruthValue::True)].into_iter().collect();
        let table = Table::compile(&[clause], 1).unwrap();
        let mut sim = Simulation::new(table, EngineConfig::default(), Collector::new());
        sim.start(&mut Kernel::new());
        sim
    }

    /// Lays an eight-cell ring with its top-left corner at `(r, c)` and
    /// registers it.
    fn ring(sim: &mut Simulation<Collector>, r: usize, c: usize) -> LoopId {
        let layout = [
            ((0, 0), Heading::Up),
            ((1, 0), Heading::Up),
            ((2, 0), Heading::Left),
            ((2, 1), Heading::Left),
            ((2, 2), Heading::Down),
            ((1, 2), Heading::Down),
            ((0, 2), Heading::Right),
            ((0, 1), Heading::Right),
        ];
        for ((dr, dc), h) in layout {
            let id = sim.grid.at(r + dr, c + dc);
            sim.grid[id].heading = Some(h);
        }
        let start = sim.grid.at(r, c);
        sim.loops.create(&mut sim.grid, start, 8).unwrap()
    }

    #[test]
    fn test_failure_cancels_only_that_loops_tasks() {
        let mut sim = simulation();
        let a = ring(&mut sim, 0, 0);
        let b = ring(&mut sim, 5, 5);
        let cell = sim.grid.at(0, 0);

        let mut kernel = Kernel::new();
        kernel.schedule(Task::LoopSuccess(a));
        kernel.schedule(Task::LoopFailReset(b));
        kernel.schedule(Task::Scan(cell));
        kernel.schedule(Task::LoopFailSet(a));
        sim.loop_fail(a, &mut kernel);

        let left: Vec<Task> = kernel.queued().copied().collect();
        assert_eq!(left, vec![Task::LoopFailReset(b), Task::Scan(cell), Task::RaiseLoop]);
        assert!(!sim.loops.is_active(a));
        assert!(sim.loops.ring(a).is_none());
        assert!(sim.loops.is_active(b));
        assert_eq!(sim.loops.active_count(), 1);
        assert_eq!(sim.grid[cell].member_of, None);
        assert_eq!(sim.grid[sim.grid.at(5, 5)].member_of, Some(b));

        // Failing it again changes nothing.
        sim.loop_fail(a, &mut kernel);
        assert_eq!(kernel.pending(), 3);
    }

    #[test]
    fn test_failure_settles_after_erasure() {
        let mut sim = simulation();
        let id = ring(&mut sim, 2, 2);
        let erasing = sim.grid.at(3, 2);
        sim.grid[erasing].flag = Flag::EraseLoop;

        let mut kernel = Kernel::new();
        kernel.schedule(Task::LoopFailSet(id));
        for _ in 0..6 {
            kernel.turn(&mut sim).unwrap();
            assert!(sim.loops.is_active(id));
        }
        // The check alternates with its re-arm every generation.
        let queued: Vec<Task> = kernel.queued().copied().collect();
        assert_eq!(queued, vec![Task::LoopFailSet(id)]);

        sim.grid[erasing].flag = Flag::Quiescent;
        for _ in 0..3 {
            kernel.turn(&mut sim).unwrap();
        }
        assert!(!sim.loops.is_active(id));
        assert!(sim.loops.is_empty());
    }

    #[test]
    fn test_success_waits_for_monitors() {
        let mut sim = simulation();
        let id = ring(&mut sim, 0, 0);
        let watcher = sim.grid.at(1, 0);
        sim.grid[watcher].monitor = Some(Monitor::new(1, 1).unwrap());

        let mut kernel = Kernel::new();
        sim.loop_success_set(id, &mut kernel);
        assert_eq!(kernel.pending(), 0);

        if let Some(monitor) = sim.grid[watcher].monitor.as_mut() {
            monitor.deactivate();
        }
        sim.loop_success_set(id, &mut kernel);
        sim.loop_success(id, &mut kernel);
        sim.loop_success(id, &mut kernel);
        assert_eq!(sim.loops.succeeded(), &[id]);
        assert!(!sim.loops.has_active());
    }
}
