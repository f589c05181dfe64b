//! ANSI terminal renderer.
//!
//! Draws every frame the engine hands out in place: the cursor is moved back
//! up over the previous frame, which is then overwritten. The renderer owns
//! the terminal between its first frame and teardown.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use clap::ValueEnum;
use loopsat::{Emphasis, Error, Frame, Observer, Outcome, TermColour};
use tracing::warn;

/// Clears the whole screen.
pub const CLEAR_SCREEN: &str = "\x1b[2J";
/// Hides the cursor.
pub const CURSOR_DISABLE: &str = "\x1b[?25l";
/// Shows the cursor.
pub const CURSOR_ENABLE: &str = "\x1b[?25h";
/// Resets all attributes.
pub const COLOUR_CLEAR: &str = "\x1b[00;00;00m";

const BACKGROUND_BLACK: u8 = 40;

/// Pause between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Speed {
    /// Half a second per frame.
    Slow,
    /// A tenth of a second per frame.
    #[default]
    Medium,
    /// A twentieth of a second per frame.
    Rapid,
}

impl Speed {
    /// Delay after each frame.
    #[must_use]
    pub const fn delay(self) -> Duration {
        match self {
            Self::Slow => Duration::from_micros(500_000),
            Self::Medium => Duration::from_micros(100_000),
            Self::Rapid => Duration::from_micros(50_000),
        }
    }
}

const fn foreground(colour: TermColour) -> u8 {
    match colour {
        TermColour::White => 29,
        TermColour::Black => 30,
        TermColour::Red => 31,
        TermColour::Green => 32,
        TermColour::Yellow => 33,
        TermColour::Blue => 34,
        TermColour::Magenta => 35,
        TermColour::Cyan => 36,
        TermColour::Grey => 37,
    }
}

const fn attribute(emphasis: Emphasis) -> u8 {
    match emphasis {
        Emphasis::Dull => 0,
        Emphasis::Bright => 1,
    }
}

fn set_colour<W: Write>(out: &mut W, colour: TermColour, emphasis: Emphasis) -> io::Result<()> {
    write!(
        out,
        "\x1b[{};{};{}m",
        attribute(emphasis),
        foreground(colour),
        BACKGROUND_BLACK
    )
}

/// An [`Observer`] that draws frames on a terminal and keeps the result.
pub struct TerminalRenderer<W: Write> {
    out: W,
    delay: Duration,
    started: bool,
    failed: Option<io::Error>,
    result: Option<loopsat::Result<Outcome>>,
}

impl<W: Write> TerminalRenderer<W> {
    /// Renders to `out`, pausing according to `speed`.
    pub fn new(out: W, speed: Speed) -> Self {
        Self::with_delay(out, speed.delay())
    }

    /// Renders to `out`, pausing `delay` after each frame.
    pub fn with_delay(out: W, delay: Duration) -> Self {
        Self {
            out,
            delay,
            started: false,
            failed: None,
            result: None,
        }
    }

    /// The underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// The reported result, if the run finished.
    ///
    /// # Errors
    ///
    /// Returns the first terminal write failure; drawing stops after it.
    pub fn into_result(self) -> io::Result<Option<loopsat::Result<Outcome>>> {
        match self.failed {
            Some(error) => Err(error),
            None => Ok(self.result),
        }
    }

    /// Reserves the drawing area below the cursor.
    fn begin(&mut self, lines: usize) -> io::Result<()> {
        write!(self.out, "{CURSOR_DISABLE}{CLEAR_SCREEN}")?;
        for _ in 0..lines {
            writeln!(self.out)?;
        }
        self.out.flush()
    }

    fn border(&mut self, width: usize) -> io::Result<()> {
        set_colour(&mut self.out, TermColour::White, Emphasis::Bright)?;
        write!(self.out, "+{}+", "-".repeat(width))?;
        writeln!(self.out, "{COLOUR_CLEAR}")
    }

    fn edge(&mut self) -> io::Result<()> {
        set_colour(&mut self.out, TermColour::White, Emphasis::Bright)?;
        write!(self.out, "|{COLOUR_CLEAR}")
    }

    fn draw(&mut self, frame: &Frame<'_>) -> io::Result<()> {
        let (height, width) = (frame.height(), frame.width());
        if !self.started {
            self.begin(height + 2)?;
            self.started = true;
        }

        write!(self.out, "\x1b[{}A", height + 2)?;
        self.border(width)?;
        for row in 0..height {
            self.edge()?;
            for col in 0..width {
                let Some(view) = frame.describe_cell(row, col) else {
                    continue;
                };
                set_colour(&mut self.out, view.colour, view.emphasis)?;
                write!(self.out, "{}{COLOUR_CLEAR}", view.symbol)?;
            }
            self.edge()?;
            writeln!(self.out)?;
        }
        self.border(width)?;
        self.out.flush()
    }
}

impl<W: Write> Observer for TerminalRenderer<W> {
    fn on_frame(&mut self, frame: &Frame<'_>) {
        if self.failed.is_some() {
            return;
        }
        if let Err(error) = self.draw(frame) {
            warn!(%error, "terminal write failed, frames disabled");
            self.failed = Some(error);
            return;
        }
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }

    fn on_teardown(&mut self) {
        if !self.started {
            return;
        }
        let restored = write!(self.out, "{CURSOR_ENABLE}").and_then(|()| self.out.flush());
        if let Err(error) = restored {
            self.failed.get_or_insert(error);
        }
    }

    fn on_success(&mut self, outcome: Outcome) {
        self.result = Some(Ok(outcome));
    }

    fn on_failure(&mut self, error: Error) {
        self.result = Some(Err(error));
    }
}

/// Clears the screen and re-enables the cursor, e.g. after a run was
/// interrupted while drawing.
///
/// # Errors
///
/// Returns the write failure.
pub fn restore_terminal<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "{CLEAR_SCREEN}{CURSOR_ENABLE}")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use loopsat::{EngineConfig, Kernel, Simulation, VisualField};

    fn run(field: VisualField) -> TerminalRenderer<Vec<u8>> {
        let predicate = crate::parser::parse("(a)").unwrap();
        let table = predicate.table().unwrap();
        let config = EngineConfig::default().with_visual_field(field);
        let renderer = TerminalRenderer::with_delay(Vec::new(), Duration::ZERO);
        let mut kernel = Kernel::with_idle_wait(config.idle_wait);
        let mut sim = Simulation::new(table, config, renderer);
        sim.start(&mut kernel);
        kernel.run(&mut sim).unwrap();
        sim.into_observer()
    }

    #[test]
    fn test_frames_are_bordered_and_restore_cursor() {
        let renderer = run(VisualField::Code);
        let text = String::from_utf8(renderer.get_ref().clone()).unwrap();
        let dim = loopsat::Geometry::for_variables(1).dim;

        assert!(text.starts_with(&format!("{CURSOR_DISABLE}{CLEAR_SCREEN}")));
        assert!(text.ends_with(CURSOR_ENABLE));
        assert!(text.contains(&format!("\x1b[{}A", dim + 2)));
        assert!(text.contains(&format!("\x1b[1;29;40m+{}+", "-".repeat(dim))));
        assert!(text.contains("\x1b[1;29;40m|"));

        let result = renderer.into_result().unwrap().unwrap().unwrap();
        assert!(result.is_satisfiable());
    }

    #[test]
    fn test_nothing_is_drawn_without_a_field() {
        let renderer = run(VisualField::None);
        assert!(renderer.get_ref().is_empty());
        assert!(renderer.into_result().unwrap().is_some());
    }

    #[test]
    fn test_speed_delays() {
        assert_eq!(Speed::Slow.delay(), Duration::from_millis(500));
        assert_eq!(Speed::default().delay(), Duration::from_millis(100));
        assert_eq!(Speed::Rapid.delay(), Duration::from_millis(50));
    }

    #[test]
    fn test_restore_terminal() {
        let mut out = Vec::new();
        restore_terminal(&mut out).unwrap();
        assert_eq!(out, format!("{CLEAR_SCREEN}{CURSOR_ENABLE}").into_bytes());
    }
}
