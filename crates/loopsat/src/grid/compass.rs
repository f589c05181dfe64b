//! Compass points of the Moore neighbourhood and the four headings a bound
//! cell may face.

use core::fmt;

/// One of the eight Moore-neighbourhood directions, clockwise from north.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Compass {
    /// Row above.
    N = 0,
    /// Row above, column right.
    NE = 1,
    /// Column right.
    E = 2,
    /// Row below, column right.
    SE = 3,
    /// Row below.
    S = 4,
    /// Row below, column left.
    SW = 5,
    /// Column left.
    W = 6,
    /// Row above, column left.
    NW = 7,
}

impl Compass {
    /// All directions in clockwise order from north.
    pub const ALL: [Self; 8] = [
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
        Self::NW,
    ];

    /// Index into a neighbour table.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Rotates by `steps` eighths of a turn; positive is clockwise.
    #[inline]
    #[must_use]
    pub const fn rotate(self, steps: i8) -> Self {
        let turn = (steps % 8 + 8) % 8;
        Self::ALL[(self as usize + turn as usize) % 8]
    }

    /// The direction pointing the other way.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        self.rotate(4)
    }

    /// `(row, column)` offset of the neighbour in this direction.
    #[inline]
    #[must_use]
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Self::N => (-1, 0),
            Self::NE => (-1, 1),
            Self::E => (0, 1),
            Self::SE => (1, 1),
            Self::S => (1, 0),
            Self::SW => (1, -1),
            Self::W => (0, -1),
            Self::NW => (-1, -1),
        }
    }
}

/// Facing of a bound cell.
///
/// An unbound cell has no heading; cells store `Option<Heading>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Heading {
    /// Towards [`Compass::N`].
    Up,
    /// Towards [`Compass::S`].
    Down,
    /// Towards [`Compass::W`].
    Left,
    /// Towards [`Compass::E`].
    Right,
}

impl Heading {
    /// Order in which neighbourhood patterns are tried. The first match wins.
    pub const ROTATION: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The compass point this heading faces.
    #[inline]
    #[must_use]
    pub const fn compass(self) -> Compass {
        match self {
            Self::Up => Compass::N,
            Self::Down => Compass::S,
            Self::Left => Compass::W,
            Self::Right => Compass::E,
        }
    }

    /// The heading facing `compass`, if it is a cardinal point.
    #[inline]
    #[must_use]
    pub const fn from_compass(compass: Compass) -> Option<Self> {
        match compass {
            Compass::N => Some(Self::Up),
            Compass::S => Some(Self::Down),
            Compass::W => Some(Self::Left),
            Compass::E => Some(Self::Right),
            _ => None,
        }
    }

    /// The heading facing the other way.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// A quarter turn anticlockwise.
    #[inline]
    #[must_use]
    pub const fn left(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Left => Self::Down,
            Self::Down => Self::Right,
            Self::Right => Self::Up,
        }
    }

    /// A quarter turn clockwise.
    #[inline]
    #[must_use]
    pub const fn right(self) -> Self {
        self.left().opposite()
    }

    /// Compass point reached by rotating this heading `steps` eighths.
    #[inline]
    #[must_use]
    pub const fn toward(self, steps: i8) -> Compass {
        self.compass().rotate(steps)
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_wraps_both_ways() {
        assert_eq!(Compass::N.rotate(-1), Compass::NW);
        assert_eq!(Compass::N.rotate(-3), Compass::SW);
        assert_eq!(Compass::NW.rotate(1), Compass::N);
        assert_eq!(Compass::E.rotate(10), Compass::S);
        assert_eq!(Compass::E.rotate(-10), Compass::N);
    }

    #[test]
    fn test_opposite_deltas_cancel() {
        for c in Compass::ALL {
            let (r, k) = c.delta();
            let (or, ok) = c.opposite().delta();
            assert_eq!((r + or, k + ok), (0, 0), "{c:?}");
        }
    }

    #[test]
    fn test_heading_turns() {
        for h in Heading::ROTATION {
            assert_eq!(h.left().compass(), h.compass().rotate(-2));
            assert_eq!(h.right().compass(), h.compass().rotate(2));
            assert_eq!(Heading::from_compass(h.compass()), Some(h));
            assert_eq!(h.opposite().opposite(), h);
        }
        assert_eq!(Heading::from_compass(Compass::SE), None);
    }
}
