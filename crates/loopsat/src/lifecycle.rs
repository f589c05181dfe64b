//! Loop registry.
//!
//! A loop is a fixed-length ring of cells collected by following pointing
//! neighbours from a start cell. Cells hold a back-reference
//! ([`Cell::member_of`](crate::grid::cell::Cell::member_of)); the registry
//! owns the ring lists and tracks which loops are still searching and which
//! have succeeded.
//!
//! ```text
//! create ──► Active ──► Succeeded ──► (harvested) deleted
//!               │
//!               └─────► Failed: deleted, back-references cleared
//! ```

use std::collections::BTreeMap;

use core::fmt;

use tracing::debug;

use crate::error::{Error, Result};
use crate::grid::cell::CellId;
use crate::grid::Grid;

/// Handle of a registered loop.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoopId(u32);

impl LoopId {
    /// Raw handle value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for LoopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoopId({})", self.0)
    }
}

impl fmt::Display for LoopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owner of every live loop.
#[derive(Debug, Default)]
pub struct Loops {
    rings: BTreeMap<LoopId, Vec<CellId>>,
    active: Vec<LoopId>,
    succeeded: Vec<LoopId>,
    next: u32,
}

impl Loops {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects `len` cells by walking pointing neighbours from `start` and
    /// registers them as a new active loop.
    ///
    /// Every collected cell is enlisted in the new loop. The walk stops
    /// early at an unbound cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if the ring list cannot be reserved;
    /// no cell is touched in that case.
    pub fn create(&mut self, grid: &mut Grid, start: CellId, len: usize) -> Result<LoopId> {
        let mut ring = Vec::new();
        ring.try_reserve_exact(len)
            .map_err(Error::allocation("loop ring"))?;
        self.active
            .try_reserve(1)
            .map_err(Error::allocation("active loop list"))?;

        let id = LoopId(self.next);
        self.next = self.next.wrapping_add(1);

        let mut cursor = Some(start);
        while ring.len() < len {
            let Some(cell) = cursor else {
                break;
            };
            grid[cell].member_of = Some(id);
            ring.push(cell);
            cursor = grid.pointing(cell);
        }

        debug!(loop_id = %id, cells = ring.len(), "loop created");
        self.rings.insert(id, ring);
        self.active.push(id);
        Ok(id)
    }

    /// Cells of `id`, in walk order.
    #[must_use]
    pub fn ring(&self, id: LoopId) -> Option<&[CellId]> {
        self.rings.get(&id).map(Vec::as_slice)
    }

    /// Whether `id` is still searching.
    #[inline]
    #[must_use]
    pub fn is_active(&self, id: LoopId) -> bool {
        self.active.contains(&id)
    }

    /// Number of searching loops.
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Whether any loop is still searching.
    #[inline]
    #[must_use]
    pub fn has_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// Succeeded loops, oldest success first.
    #[inline]
    #[must_use]
    pub fn succeeded(&self) -> &[LoopId] {
        &self.succeeded
    }

    /// Number of registered loops in any state.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rings.len()
    }

    /// Whether no loop is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Drops `id` from the active set. Returns whether it was active.
    pub fn remove_active(&mut self, id: LoopId) -> bool {
        match self.active.iter().position(|&l| l == id) {
            Some(at) => {
                self.active.remove(at);
                true
            }
            None => false,
        }
    }

    /// Moves an active loop to the success list. Returns whether it moved.
    pub fn succeed(&mut self, id: LoopId) -> bool {
        if !self.remove_active(id) {
            return false;
        }
        self.succeeded.push(id);
        true
    }

    /// Deletes `id`, clearing the back-reference of every ring cell.
    pub fn delete(&mut self, id: LoopId, grid: &mut Grid) {
        let Some(ring) = self.rings.remove(&id) else {
            return;
        };
        if !grid.is_empty() {
            for cell in ring {
                grid[cell].member_of = None;
            }
        }
        self.active.retain(|&l| l != id);
        self.succeeded.retain(|&l| l != id);
    }

    /// Deletes every loop.
    pub fn clear(&mut self, grid: &mut Grid) {
        let ids: Vec<LoopId> = self.rings.keys().copied().collect();
        for id in ids {
            self.delete(id, grid);
        }
    }
}
