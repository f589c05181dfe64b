//! Deferred single-field cell writes.
//!
//! Rules never write a cell directly; they queue a [`Mutation`] that is
//! applied in the next generation, followed by the rescans it implies.

use super::cell::{Cell, Code, Colour, Flag};
use super::compass::{Compass, Heading};

/// A single-field cell write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// Replace the code.
    Code(Code),
    /// Replace the heading; `None` unbinds the cell.
    Heading(Option<Heading>),
    /// Replace the tint.
    Colour(Colour),
    /// Replace the marker.
    Flag(Flag),
    /// Set the variable id to 0.
    ResetId,
    /// Advance the variable id by one.
    IncrementId,
}

/// Cells to rescan after a mutation has been applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rescan {
    /// Nothing.
    None,
    /// The mutated cell.
    Itself,
    /// The mutated cell, then its neighbour at the given offset from its
    /// heading.
    ItselfAnd(i8),
}

impl Mutation {
    /// Chooses the id step towards `target`.
    ///
    /// Ids only ever advance by one or fall back to zero, so a target that
    /// is not the successor resets. Returns `None` when already equal.
    #[inline]
    #[must_use]
    pub const fn id_step(current: u32, target: u32) -> Option<Self> {
        if current == target {
            None
        } else if target == current.wrapping_add(1) {
            Some(Self::IncrementId)
        } else {
            Some(Self::ResetId)
        }
    }

    /// Writes the field.
    pub fn apply(self, cell: &mut Cell) {
        match self {
            Self::Code(code) => cell.code = code,
            Self::Heading(heading) => cell.heading = heading,
            Self::Colour(colour) => cell.colour = colour,
            Self::Flag(flag) => cell.flag = flag,
            Self::ResetId => cell.id = 0,
            Self::IncrementId => cell.id = cell.id.wrapping_add(1),
        }
    }

    /// Rescans that follow this write.
    ///
    /// Markers never trigger a rescan, nor does turning to face right.
    #[must_use]
    pub const fn rescan(self) -> Rescan {
        match self {
            Self::Code(Code::Grow | Code::ArmExtStart) => Rescan::ItselfAnd(0),
            Self::Code(Code::TurnLeft) => Rescan::ItselfAnd(-2),
            Self::Heading(Some(Heading::Right)) | Self::Flag(_) => Rescan::None,
            Self::Code(_)
            | Self::Heading(_)
            | Self::Colour(_)
            | Self::ResetId
            | Self::IncrementId => Rescan::Itself,
        }
    }
}

impl Rescan {
    /// Neighbour direction of the extra rescan for a cell facing `heading`.
    #[inline]
    #[must_use]
    pub fn neighbour(self, heading: Option<Heading>) -> Option<Compass> {
        match self {
            Self::ItselfAnd(steps) => heading.map(|h| h.toward(steps)),
            Self::None | Self::Itself => None,
        }
    }
}
