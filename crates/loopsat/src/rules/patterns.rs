//! Neighbourhood patterns.
//!
//! Every pattern is tried over [`Heading::ROTATION`] and the first matching
//! heading wins, so ties between directions always break the same way.

use crate::grid::cell::{Cell, CellId, Code, Flag};
use crate::grid::compass::{Compass, Heading};
use crate::grid::Grid;

/// Read-only view of one cell and its Moore neighbourhood.
#[derive(Clone, Copy)]
pub(crate) struct Hood<'a> {
    grid: &'a Grid,
    id: CellId,
}

impl<'a> Hood<'a> {
    pub(crate) fn new(grid: &'a Grid, id: CellId) -> Self {
        Self { grid, id }
    }

    pub(crate) fn cell(&self) -> &'a Cell {
        &self.grid[self.id]
    }

    pub(crate) fn at(&self, dir: Compass) -> &'a Cell {
        &self.grid[self.grid.neighbour(self.id, dir)]
    }

    /// Neighbour `steps` eighths of a turn from `heading`.
    pub(crate) fn side(&self, heading: Heading, steps: i8) -> &'a Cell {
        self.at(heading.toward(steps))
    }

    pub(crate) fn pointing_id(&self) -> Option<CellId> {
        self.grid.pointing(self.id)
    }

    pub(crate) fn pointing(&self) -> Option<&'a Cell> {
        self.pointing_id().map(|p| &self.grid[p])
    }

    /// First heading of the rotation satisfying `pred`.
    pub(crate) fn first(&self, pred: impl Fn(Heading) -> bool) -> Option<Heading> {
        Heading::ROTATION.into_iter().find(|&h| pred(h))
    }

    /// Whether any orthogonal neighbour satisfies `pred`.
    pub(crate) fn any_orthogonal(&self, pred: impl Fn(&Cell) -> bool) -> bool {
        self.first(|h| pred(self.at(h.compass()))).is_some()
    }

    // ------------------------------------------------------------------
    // Flag patterns
    // ------------------------------------------------------------------

    /// Direction of a neighbour facing away with a collision marker.
    pub(crate) fn retracting_arm(&self) -> Option<Heading> {
        self.first(|x| {
            let n = self.at(x.compass());
            n.heading == Some(x) && n.flag == Flag::Collision
        })
    }

    /// A bound cell whose way ahead is free while the cell to its left
    /// still flows: an arm extension that found no room.
    pub(crate) fn extrusion_failed(&self) -> bool {
        self.cell().heading.is_some_and(|h| {
            !self.at(h.compass()).is_bound() && self.side(h, -2).code == Code::Flow
        })
    }

    // ------------------------------------------------------------------
    // Bound patterns
    // ------------------------------------------------------------------

    /// Both diagonal neighbours behind-left and ahead-left belong to a ring
    /// turning into this cell.
    pub(crate) fn closes_loop(&self) -> bool {
        self.cell().heading.is_some_and(|x| {
            let back = self.side(x, -3);
            let front = self.side(x, -1);
            back.heading == Some(x.left())
                && back.code != Code::Quiescent
                && front.heading == Some(x.right())
                && front.code != Code::Quiescent
        })
    }

    /// The pointing neighbour carries an arm-start turned right, fed by an
    /// arm-end.
    pub(crate) fn arm_start_corner(&self) -> bool {
        let Some(h) = self.cell().heading else {
            return false;
        };
        let Some(p) = self.pointing_id() else {
            return false;
        };
        let nb = &self.grid[p];
        nb.code == Code::ArmExtStart
            && nb.heading.map(Heading::compass) == Some(h.toward(2))
            && self
                .grid
                .pointing(p)
                .is_some_and(|pp| self.grid[pp].code == Code::ArmExtEnd)
    }

    // ------------------------------------------------------------------
    // Unbound patterns (each returns the heading the cell should take)
    // ------------------------------------------------------------------

    /// A growing arm pointing at this cell.
    pub(crate) fn grow_source(&self) -> Option<Heading> {
        self.first(|x| {
            let n = self.at(x.compass());
            n.code == Code::Grow
                && n.heading == Some(x.opposite())
                && self.at(x.toward(1)).heading.map(Heading::compass) != Some(x.toward(2))
                && n.flag.is_receptive()
        })
        .map(Heading::opposite)
    }

    /// An arm-start pointing at this cell with free space behind it.
    pub(crate) fn arm_extension_source(&self) -> Option<Heading> {
        self.first(|x| {
            let n = self.at(x.compass());
            n.code == Code::ArmExtStart
                && n.heading == Some(x.opposite())
                && !self.at(x.opposite().compass()).is_bound()
                && n.flag.is_receptive()
        })
        .map(Heading::opposite)
    }

    /// A turn-left cell whose left side is this cell.
    pub(crate) fn turn_left_source(&self) -> Option<Heading> {
        self.first(|x| {
            let n = self.at(x.compass());
            n.code == Code::TurnLeft
                && n.heading.map(Heading::compass) == Some(x.toward(-2))
                && !self.at(x.toward(-1)).is_bound()
                && n.flag.is_receptive()
        })
        .map(Heading::opposite)
    }

    /// Taking `heading` would hit a bound cell of another colour.
    pub(crate) fn collides(&self, heading: Heading) -> bool {
        let ahead = self.at(heading.compass());
        ahead.is_bound() && ahead.colour != self.at(heading.opposite().compass()).colour
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::cell::Colour;

    fn bind(grid: &mut Grid, r: usize, c: usize, code: Code, h: Heading) -> CellId {
        let id = grid.at(r, c);
        grid[id].code = code;
        grid[id].heading = Some(h);
        id
    }

    #[test]
    fn test_grow_source_points_away_from_arm() {
        let mut grid = Grid::allocate(5, 5).unwrap();
        // Arm tip at (2,1) growing right into (2,2).
        bind(&mut grid, 2, 1, Code::Grow, Heading::Right);
        let hood = Hood::new(&grid, grid.at(2, 2));
        assert_eq!(hood.grow_source(), Some(Heading::Right));
    }

    #[test]
    fn test_grow_blocked_by_turning_neighbour() {
        let mut grid = Grid::allocate(5, 5).unwrap();
        bind(&mut grid, 2, 1, Code::Grow, Heading::Right);
        // Source direction is W; the cell at W+1 (NW) faces N = W+2.
        bind(&mut grid, 1, 1, Code::Flow, Heading::Up);
        let hood = Hood::new(&grid, grid.at(2, 2));
        assert_eq!(hood.grow_source(), None);
    }

    #[test]
    fn test_collision_needs_other_colour() {
        let mut grid = Grid::allocate(5, 5).unwrap();
        let behind = bind(&mut grid, 2, 1, Code::Grow, Heading::Right);
        let ahead = bind(&mut grid, 2, 3, Code::Flow, Heading::Up);
        grid[behind].colour = Colour::Red;
        grid[ahead].colour = Colour::Red;
        let hood = Hood::new(&grid, grid.at(2, 2));
        assert!(!hood.collides(Heading::Right));
        grid[ahead].colour = Colour::Blue;
        let hood = Hood::new(&grid, grid.at(2, 2));
        assert!(hood.collides(Heading::Right));
        assert!(!hood.collides(Heading::Up));
    }

    #[test]
    fn test_retracting_arm_follows_rotation() {
        let mut grid = Grid::allocate(5, 5).unwrap();
        let down = bind(&mut grid, 3, 2, Code::Flow, Heading::Down);
        let left = bind(&mut grid, 2, 1, Code::Flow, Heading::Left);
        grid[down].flag = Flag::Collision;
        grid[left].flag = Flag::Collision;
        let hood = Hood::new(&grid, grid.at(2, 2));
        assert_eq!(hood.retracting_arm(), Some(Heading::Down));
    }
}
