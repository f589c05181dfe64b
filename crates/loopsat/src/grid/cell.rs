//! Cell state and cell addressing.
//!
//! A cell is bound when it has a heading. Bound cells carry loop structure
//! and follow the bound rule set; everything else is background.

use core::fmt;

use super::compass::Heading;
use crate::lifecycle::LoopId;
use crate::monitor::Monitor;
use crate::table::TruthValue;

/// Index of a cell in a [`Grid`](super::Grid).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct CellId(u32);

impl CellId {
    #[inline]
    #[must_use]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position in row-major order.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellId({})", self.0)
    }
}

/// The symbol a cell carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Code {
    /// Nothing.
    #[default]
    Quiescent,
    /// Signal in transit along a ring.
    Flow,
    /// Leading edge of a growing arm.
    Grow,
    /// Corner marker; one per ring.
    TurnLeft,
    /// First step of an arm extension.
    ArmExtStart,
    /// Second step of an arm extension.
    ArmExtEnd,
    /// Separates a child ring from its parent.
    Detach,
    /// Variable bit not yet decided, first branch.
    Unexplored0,
    /// Variable bit not yet decided, second branch.
    Unexplored1,
    /// Decided false.
    Zero,
    /// Decided true.
    One,
    /// Always satisfied.
    Tautology,
    /// Never satisfied.
    Paradox,
}

impl Code {
    /// Whether this is a decided bit.
    #[inline]
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Zero | Self::One)
    }

    /// Whether this is an undecided bit.
    #[inline]
    #[must_use]
    pub const fn is_unexplored(self) -> bool {
        matches!(self, Self::Unexplored0 | Self::Unexplored1)
    }

    /// Truth value of a decided bit.
    #[inline]
    #[must_use]
    pub const fn truth_value(self) -> Option<TruthValue> {
        match self {
            Self::Zero => Some(TruthValue::False),
            Self::One => Some(TruthValue::True),
            _ => None,
        }
    }

    /// Decides an unexplored bit: the first branch becomes zero under a
    /// gen-zero flag and one under gen-one, the second the reverse.
    #[inline]
    #[must_use]
    pub const fn decide(self, invert: bool) -> Self {
        match (self, invert) {
            (Self::Unexplored0, false) | (Self::Unexplored1, true) => Self::Zero,
            (Self::Unexplored1, false) | (Self::Unexplored0, true) => Self::One,
            (other, _) => other,
        }
    }
}

/// Tint of a growing structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Colour {
    /// No tint.
    #[default]
    Quiescent,
    /// Arms grown upward.
    White,
    /// Arms grown downward.
    Yellow,
    /// Arms grown leftward.
    Blue,
    /// Arms grown rightward; also the seed ring.
    Red,
}

impl Colour {
    /// Tint given to an arm growing towards `heading`.
    #[inline]
    #[must_use]
    pub const fn of_arm(heading: Heading) -> Self {
        match heading {
            Heading::Up => Self::White,
            Heading::Right => Self::Red,
            Heading::Down => Self::Yellow,
            Heading::Left => Self::Blue,
        }
    }
}

/// Exclusive coordination marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Flag {
    /// No marker.
    #[default]
    Quiescent,
    /// The ring is being torn down.
    EraseLoop,
    /// Two arms of different colour met.
    Collision,
    /// Start a branch (arm extension) here.
    BranchSeq,
    /// Mutate the next undecided bit on the first branch.
    GenZero,
    /// Mutate the next undecided bit on the second branch.
    GenOne,
    /// The cell's monitor has matched at least one literal.
    MonitorActive,
    /// The cell's monitor is one match away from failing.
    MonitorAlert,
}

impl Flag {
    /// Markers that reset the cell on the next scan.
    #[inline]
    #[must_use]
    pub const fn is_degenerate(self) -> bool {
        matches!(self, Self::EraseLoop | Self::Collision)
    }

    /// Markers a neighbour may carry while still feeding growth.
    #[inline]
    #[must_use]
    pub const fn is_receptive(self) -> bool {
        matches!(self, Self::Quiescent | Self::MonitorActive)
    }

    /// No structural marker is set.
    #[inline]
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(
            self,
            Self::Quiescent | Self::MonitorActive | Self::MonitorAlert
        )
    }

    /// A bit-generation marker is set.
    #[inline]
    #[must_use]
    pub const fn is_generating(self) -> bool {
        matches!(self, Self::GenZero | Self::GenOne)
    }
}

/// State of one automaton cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    /// Carried symbol.
    pub code: Code,
    /// Facing; `None` means unbound.
    pub heading: Option<Heading>,
    /// Tint.
    pub colour: Colour,
    /// Coordination marker.
    pub flag: Flag,
    /// Variable this cell currently represents; 0 when unassigned.
    pub id: u32,
    /// Clause monitor, when one has spread here.
    pub monitor: Option<Monitor>,
    /// Loop this cell was last enlisted in.
    pub member_of: Option<LoopId>,
}

impl Cell {
    /// Whether the cell has a heading.
    #[inline]
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.heading.is_some()
    }

    /// Whether the cell carries an active monitor.
    #[inline]
    #[must_use]
    pub fn is_monitoring(&self) -> bool {
        self.monitor.as_ref().is_some_and(Monitor::is_active)
    }

    /// Spreading offset of this cell's monitor, 0 if it has none.
    #[inline]
    #[must_use]
    pub fn monitor_offset(&self) -> usize {
        self.monitor.as_ref().map_or(0, Monitor::offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbound_background() {
        let cell = Cell::default();
        assert!(!cell.is_bound());
        assert_eq!(cell.code, Code::Quiescent);
        assert_eq!(cell.flag, Flag::Quiescent);
        assert_eq!(cell.monitor_offset(), 0);
        assert!(!cell.is_monitoring());
    }

    #[test]
    fn test_decide() {
        assert_eq!(Code::Unexplored0.decide(false), Code::Zero);
        assert_eq!(Code::Unexplored1.decide(false), Code::One);
        assert_eq!(Code::Unexplored0.decide(true), Code::One);
        assert_eq!(Code::Unexplored1.decide(true), Code::Zero);
        assert_eq!(Code::Flow.decide(true), Code::Flow);
    }

    #[test]
    fn test_truth_value() {
        assert_eq!(Code::Zero.truth_value(), Some(TruthValue::False));
        assert_eq!(Code::One.truth_value(), Some(TruthValue::True));
        assert_eq!(Code::Unexplored0.truth_value(), None);
    }

    #[test]
    fn test_flag_classes() {
        assert!(Flag::EraseLoop.is_degenerate());
        assert!(Flag::Collision.is_degenerate());
        assert!(!Flag::BranchSeq.is_degenerate());
        assert!(Flag::MonitorActive.is_receptive());
        assert!(!Flag::MonitorAlert.is_receptive());
        assert!(Flag::MonitorAlert.is_settled());
        assert!(Flag::GenOne.is_generating());
    }
}
