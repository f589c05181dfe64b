//! Unbound stage: background cells joining a structure.

use super::patterns::Hood;
use crate::engine::{Observer, Simulation, Task};
use crate::event::Kernel;
use crate::grid::cell::{CellId, Code, Colour, Flag};
use crate::grid::compass::Heading;
use crate::grid::mutation::Mutation;

impl<O: Observer> Simulation<O> {
    /// Binds `cell` to `heading`, or marks a collision if that would run
    /// into a structure of another colour. Returns whether it bound.
    fn join(hood: &Hood<'_>, kernel: &mut Kernel<Task>, cell: CellId, heading: Heading) -> bool {
        Self::write(kernel, cell, Mutation::Heading(Some(heading)));
        if hood.collides(heading) {
            Self::write(kernel, cell, Mutation::Flag(Flag::Collision));
            return false;
        }
        true
    }

    pub(super) fn scan_unbound(&mut self, id: CellId, kernel: &mut Kernel<Task>) {
        let hood = Hood::new(&self.grid, id);

        if let Some(heading) = hood.grow_source() {
            if Self::join(&hood, kernel, id, heading) {
                let colour = hood.at(heading.opposite().compass()).colour;
                Self::write(kernel, id, Mutation::Code(Code::Flow));
                Self::write(kernel, id, Mutation::Colour(colour));
            }
            return;
        }

        if let Some(heading) = hood.arm_extension_source() {
            Self::write(kernel, id, Mutation::Heading(Some(heading)));
            Self::write(kernel, id, Mutation::Code(Code::Grow));
            Self::write(kernel, id, Mutation::Colour(Colour::of_arm(heading)));
            kernel.schedule(Task::SpreadPhase1(id));
            return;
        }

        if let Some(heading) = hood.turn_left_source() {
            if Self::join(&hood, kernel, id, heading) {
                let colour = hood.at(heading.opposite().compass()).colour;
                Self::write(kernel, id, Mutation::Colour(colour));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::EngineConfig;
    use crate::engine::{Collector, Simulation, Task};
    use crate::event::Kernel;
    use crate::grid::cell::{Code, Colour, Flag};
    use crate::grid::compass::Heading;
    use crate::grid::mutation::Mutation;
    use crate::table::{Clause, Table, TruthValue};

    fn started() -> (Simulation<Collector>, Kernel<Task>) {
        let clause: Clause = [(1, TruthValue::True)].into_iter().collect();
        let table = Table::compile(&[clause], 1).unwrap();
        let mut sim = Simulation::new(table, EngineConfig::default(), Collector::new());
        let mut kernel = Kernel::new();
        sim.start(&mut kernel);
        kernel.cancel_where(|_| true);
        (sim, kernel)
    }

    #[test]
    fn test_growth_extends_arm() {
        let (mut sim, mut kernel) = started();
        let tip = sim.grid.at(3, 2);
        sim.grid[tip].code = Code::Grow;
        sim.grid[tip].heading = Some(Heading::Right);
        sim.grid[tip].colour = Colour::Red;
        let next = sim.grid.at(3, 3);
        sim.scan_unbound(next, &mut kernel);
        assert_eq!(
            kernel.queued().copied().collect::<Vec<_>>(),
            vec![
                Task::Mutate(next, Mutation::Heading(Some(Heading::Right))),
                Task::Mutate(next, Mutation::Code(Code::Flow)),
                Task::Mutate(next, Mutation::Colour(Colour::Red)),
            ]
        );
    }

    #[test]
    fn test_growth_into_foreign_structure_collides() {
        let (mut sim, mut kernel) = started();
        let tip = sim.grid.at(3, 2);
        sim.grid[tip].code = Code::Grow;
        sim.grid[tip].heading = Some(Heading::Right);
        sim.grid[tip].colour = Colour::Red;
        let wall = sim.grid.at(3, 4);
        sim.grid[wall].heading = Some(Heading::Up);
        sim.grid[wall].colour = Colour::White;
        let next = sim.grid.at(3, 3);
        sim.scan_unbound(next, &mut kernel);
        assert_eq!(
            kernel.queued().copied().collect::<Vec<_>>(),
            vec![
                Task::Mutate(next, Mutation::Heading(Some(Heading::Right))),
                Task::Mutate(next, Mutation::Flag(Flag::Collision)),
            ]
        );
    }

    #[test]
    fn test_arm_extension_starts_spreading() {
        let (mut sim, mut kernel) = started();
        let start = sim.grid.at(3, 3);
        sim.grid[start].code = Code::ArmExtStart;
        sim.grid[start].heading = Some(Heading::Up);
        let next = sim.grid.at(2, 3);
        sim.scan_unbound(next, &mut kernel);
        let queued: Vec<Task> = kernel.queued().copied().collect();
        assert_eq!(queued[2], Task::Mutate(next, Mutation::Colour(Colour::White)));
        assert_eq!(queued[3], Task::SpreadPhase1(next));
    }
}
