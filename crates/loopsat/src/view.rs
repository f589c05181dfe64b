//! Per-cell presentation.
//!
//! The engine knows nothing about terminals. It describes each cell as a
//! symbol, a colour, and an emphasis for the attribute selected by a
//! [`VisualField`]; observers decide how to draw that.
//!
//! | Field     | Symbols                                   |
//! |-----------|-------------------------------------------|
//! | code      | ` o G L E F D A B 0 1 T P`                |
//! | direction | ` ^ > v <`                                |
//! | flag      | ` . # ! * + - ? %`                        |
//! | colour    | ` w r g b`                                |
//! | monitor   | `1`.. furthest slot, else the code symbol |

use crate::grid::cell::{Cell, Code, Colour, Flag};
use crate::grid::compass::Heading;
use crate::grid::Grid;
use crate::monitor::Monitor;
use crate::table::Table;

/// Cell attribute to visualize.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VisualField {
    /// No frames are produced.
    #[default]
    None,
    /// Carried symbol.
    Code,
    /// Heading.
    Direction,
    /// Coordination marker.
    Flag,
    /// Tint.
    Colour,
    /// Monitor progress.
    Monitor,
}

impl VisualField {
    /// Whether frames are produced at all.
    #[inline]
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Foreground colour of a described cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum TermColour {
    Black,
    White,
    Grey,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

/// Intensity of a described cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Emphasis {
    /// Normal intensity.
    Dull,
    /// Bold or bright.
    Bright,
}

impl Emphasis {
    /// The other intensity.
    #[inline]
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dull => Self::Bright,
            Self::Bright => Self::Dull,
        }
    }

    const fn toggled_if(self, cond: bool) -> Self {
        if cond {
            self.toggled()
        } else {
            self
        }
    }
}

/// How one cell should be drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellView {
    /// Character to draw.
    pub symbol: char,
    /// Foreground colour.
    pub colour: TermColour,
    /// Intensity.
    pub emphasis: Emphasis,
}

impl CellView {
    const fn new(symbol: char, colour: TermColour, emphasis: Emphasis) -> Self {
        Self {
            symbol,
            colour,
            emphasis,
        }
    }
}

const fn code_view(code: Code) -> CellView {
    use Emphasis::{Bright, Dull};
    use TermColour as C;
    match code {
        Code::Quiescent => CellView::new(' ', C::Black, Dull),
        Code::Flow => CellView::new('o', C::Grey, Dull),
        Code::Grow => CellView::new('G', C::Red, Bright),
        Code::TurnLeft => CellView::new('L', C::Yellow, Dull),
        Code::ArmExtStart => CellView::new('E', C::Blue, Bright),
        Code::ArmExtEnd => CellView::new('F', C::Magenta, Dull),
        Code::Detach => CellView::new('D', C::White, Bright),
        Code::Unexplored0 => CellView::new('A', C::Green, Bright),
        Code::Unexplored1 => CellView::new('B', C::Green, Bright),
        Code::Zero => CellView::new('0', C::Yellow, Bright),
        Code::One => CellView::new('1', C::Cyan, Bright),
        Code::Tautology => CellView::new('T', C::White, Dull),
        Code::Paradox => CellView::new('P', C::Red, Dull),
    }
}

const fn heading_view(heading: Option<Heading>) -> CellView {
    use TermColour as C;
    let (symbol, colour) = match heading {
        None => (' ', C::Black),
        Some(Heading::Up) => ('^', C::White),
        Some(Heading::Right) => ('>', C::Red),
        Some(Heading::Down) => ('v', C::Green),
        Some(Heading::Left) => ('<', C::Cyan),
    };
    CellView::new(symbol, colour, Emphasis::Dull)
}

const fn flag_view(flag: Flag, bound: bool) -> CellView {
    use Emphasis::{Bright, Dull};
    use TermColour as C;
    match flag {
        Flag::Quiescent if bound => CellView::new('.', C::Grey, Dull),
        Flag::Quiescent => CellView::new(' ', C::Black, Dull),
        Flag::EraseLoop => CellView::new('#', C::Red, Bright),
        Flag::Collision => CellView::new('!', C::Blue, Bright),
        Flag::BranchSeq => CellView::new('*', C::Magenta, Dull),
        Flag::GenZero => CellView::new('+', C::Yellow, Bright),
        Flag::GenOne => CellView::new('-', C::Cyan, Bright),
        Flag::MonitorActive => CellView::new('?', C::Green, Bright),
        Flag::MonitorAlert => CellView::new('%', C::White, Bright),
    }
}

const fn colour_view(colour: Colour) -> CellView {
    use TermColour as C;
    let (symbol, colour) = match colour {
        Colour::Quiescent => (' ', C::Black),
        Colour::White => ('w', C::White),
        Colour::Red => ('r', C::Red),
        Colour::Yellow => ('g', C::Green),
        Colour::Blue => ('b', C::Cyan),
    };
    CellView::new(symbol, colour, Emphasis::Dull)
}

fn monitor_view(cell: &Cell, table: &Table, pulse: bool) -> CellView {
    match cell.monitor.as_ref().filter(|m| m.is_active()) {
        Some(monitor) => {
            let furthest = monitor.furthest();
            let symbol = u32::try_from(furthest)
                .ok()
                .and_then(|k| char::from_u32(u32::from(b'1') + k))
                .unwrap_or('?');
            let colour = if Monitor::is_fail_row(furthest, table) {
                TermColour::Red
            } else {
                TermColour::Green
            };
            let emphasis = if pulse {
                Emphasis::Bright
            } else {
                Emphasis::Dull
            };
            CellView::new(symbol, colour, emphasis)
        }
        None if !cell.is_bound() => code_view(Code::Quiescent),
        None => {
            let view = code_view(Code::Flow);
            CellView {
                emphasis: view.emphasis.toggled_if(pulse),
                ..view
            }
        }
    }
}

/// Describes `cell` for `field`.
///
/// `pulsing` is set while loops are still searching; turn-left cells then
/// flip their emphasis in every field but the code field. Returns `None`
/// for [`VisualField::None`].
#[must_use]
pub fn describe(cell: &Cell, field: VisualField, table: &Table, pulsing: bool) -> Option<CellView> {
    let corner = pulsing && cell.code == Code::TurnLeft;
    let view = match field {
        VisualField::None => return None,
        VisualField::Code => code_view(cell.code),
        VisualField::Direction => {
            let view = heading_view(cell.heading);
            CellView {
                emphasis: view.emphasis.toggled_if(corner),
                ..view
            }
        }
        VisualField::Flag => {
            let view = flag_view(cell.flag, cell.is_bound());
            let pulse = corner && cell.flag == Flag::Quiescent && cell.is_bound();
            CellView {
                emphasis: view.emphasis.toggled_if(pulse),
                ..view
            }
        }
        VisualField::Colour => {
            let view = colour_view(cell.colour);
            CellView {
                emphasis: view.emphasis.toggled_if(corner),
                ..view
            }
        }
        VisualField::Monitor => monitor_view(cell, table, corner),
    };
    Some(view)
}

/// A read-only snapshot handed to observers once per frame.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    grid: &'a Grid,
    table: &'a Table,
    field: VisualField,
    pulsing: bool,
    tick: u64,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(
        grid: &'a Grid,
        table: &'a Table,
        field: VisualField,
        pulsing: bool,
        tick: u64,
    ) -> Self {
        Self {
            grid,
            table,
            field,
            pulsing,
            tick,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Generation the frame was taken in.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Field being visualized.
    #[must_use]
    pub fn field(&self) -> VisualField {
        self.field
    }

    /// The cell at `(row, col)` as drawn for the selected field.
    #[must_use]
    pub fn describe_cell(&self, row: usize, col: usize) -> Option<CellView> {
        if self.grid.is_empty() {
            return None;
        }
        let id = self.grid.at(row, col);
        describe(&self.grid[id], self.field, self.table, self.pulsing)
    }

    /// The underlying grid.
    #[must_use]
    pub fn grid(&self) -> &'a Grid {
        self.grid
    }
}
