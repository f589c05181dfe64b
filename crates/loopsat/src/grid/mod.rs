//! Toroidal automaton grid.
//!
//! - [`compass`]: Moore-neighbourhood directions and cell headings
//! - [`cell`]: Cell state (code, heading, colour, flag, id, monitor, loop)
//! - [`mutation`]: Deferred single-field writes and the rescans they imply
//!
//! Cells live in one row-major arena. Each cell's eight neighbours are wired
//! once at allocation as indices, wrapping at every edge.

pub mod cell;
pub mod compass;
pub mod mutation;

use core::fmt;
use core::ops::{Index, IndexMut};

use self::cell::{Cell, CellId};
use self::compass::Compass;
use crate::error::{Error, Result};

/// A `height × width` torus of cells.
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<Cell>,
    links: Vec<[CellId; 8]>,
}

impl Grid {
    /// A grid without cells.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            height: 0,
            width: 0,
            cells: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Allocates a grid of background cells with neighbour links wired.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if either arena cannot be reserved.
    /// Nothing is retained on failure.
    pub fn allocate(height: usize, width: usize) -> Result<Self> {
        let len = height * width;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(Error::allocation("grid cells"))?;
        let mut links = Vec::new();
        links
            .try_reserve_exact(len)
            .map_err(Error::allocation("grid neighbour links"))?;

        for row in 0..height {
            for col in 0..width {
                cells.push(Cell::default());
                links.push(Compass::ALL.map(|dir| {
                    let (dr, dc) = dir.delta();
                    let r = (row as isize + dr).rem_euclid(height as isize) as usize;
                    let c = (col as isize + dc).rem_euclid(width as isize) as usize;
                    CellId::new(r * width + c)
                }));
            }
        }

        Ok(Self {
            height,
            width,
            cells,
            links,
        })
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of cells.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at `(row, col)`, wrapping both coordinates.
    #[inline]
    #[must_use]
    pub fn at(&self, row: usize, col: usize) -> CellId {
        CellId::new((row % self.height) * self.width + col % self.width)
    }

    /// `(row, col)` of `id`.
    #[inline]
    #[must_use]
    pub fn position(&self, id: CellId) -> (usize, usize) {
        (id.index() / self.width, id.index() % self.width)
    }

    /// Neighbour of `id` towards `dir`.
    #[inline]
    #[must_use]
    pub fn neighbour(&self, id: CellId, dir: Compass) -> CellId {
        self.links[id.index()][dir.index()]
    }

    /// The neighbour behind a bound cell, i.e. opposite its heading.
    ///
    /// Following pointing neighbours walks a ring against its flow.
    #[inline]
    #[must_use]
    pub fn pointing(&self, id: CellId) -> Option<CellId> {
        self.cells[id.index()]
            .heading
            .map(|h| self.neighbour(id, h.opposite().compass()))
    }

    /// All cell ids in row-major order.
    pub fn ids(&self) -> impl Iterator<Item = CellId> {
        (0..self.cells.len()).map(CellId::new)
    }

    /// Cells with their ids, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (CellId, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (CellId::new(i), c))
    }

    /// Number of bound cells.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_bound()).count()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

impl Index<CellId> for Grid {
    type Output = Cell;

    #[inline]
    fn index(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }
}

impl IndexMut<CellId> for Grid {
    #[inline]
    fn index_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.index()]
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Grid {{ {}x{}, {} bound cells }}",
            self.height,
            self.width,
            self.bound_count()
        )
    }
}
