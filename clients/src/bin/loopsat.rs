//! `loopsat`: decides a CNF predicate with self-replicating loops.
//!
//! **Usage:**
//! ```text
//! loopsat [OPTIONS] "(p1 or -p2) and (-p1 or p4 or p3) and (-p4)"
//! loopsat [OPTIONS] -f <file>
//! loopsat -e
//! ```
//!
//! Exits non-zero if the predicate does not parse or the run is aborted.
//! An unsatisfiable predicate is a successful run.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use loopsat::{EngineConfig, Kernel, Simulation, VisualField};
use loopsat_clients::render::restore_terminal;
use loopsat_clients::report::{write_json, write_text};
use loopsat_clients::{parse, Speed, TerminalRenderer};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Cell attribute drawn while the automaton runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Field {
    #[default]
    None,
    Code,
    Direction,
    Flag,
    Colour,
    Monitor,
}

impl From<Field> for VisualField {
    fn from(field: Field) -> Self {
        match field {
            Field::None => Self::None,
            Field::Code => Self::Code,
            Field::Direction => Self::Direction,
            Field::Flag => Self::Flag,
            Field::Colour => Self::Colour,
            Field::Monitor => Self::Monitor,
        }
    }
}

/// Decide a CNF predicate on a self-replicating-loop cellular automaton.
#[derive(Parser)]
#[command(
    name = "loopsat",
    version,
    about = "Decide a CNF predicate on a self-replicating-loop cellular automaton",
    after_help = "The predicate must be of the form: (p1 or -p2) and (-p1 or p4 or p3) and (-p4)",
    group(ArgGroup::new("input").args(["expr", "predicate", "file"])),
    group(ArgGroup::new("fields").args(["field", "none", "code", "direction", "flag", "colour", "monitor"])),
    group(ArgGroup::new("speeds").args(["speed", "slow", "medium", "rapid"]))
)]
struct Args {
    /// CNF predicate.
    #[arg(value_name = "EXPR")]
    expr: Option<String>,

    /// CNF predicate given as an option.
    #[arg(short = 'p', long, value_name = "EXPR")]
    predicate: Option<String>,

    /// Read the predicate from a file.
    #[arg(short = 'f', long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Field to draw while solving.
    #[arg(long, value_enum)]
    field: Option<Field>,

    /// Do not draw (default).
    #[arg(short = 'n')]
    none: bool,

    /// Draw the code field.
    #[arg(short = 'o')]
    code: bool,

    /// Draw the direction field.
    #[arg(short = 'd')]
    direction: bool,

    /// Draw the flag field.
    #[arg(short = 'l')]
    flag: bool,

    /// Draw the colour field.
    #[arg(short = 'c')]
    colour: bool,

    /// Draw the monitor field.
    #[arg(short = 't')]
    monitor: bool,

    /// Pause between frames.
    #[arg(long, value_enum)]
    speed: Option<Speed>,

    /// Slow: 0.5 seconds per frame.
    #[arg(short = 's')]
    slow: bool,

    /// Medium: 0.1 seconds per frame (default).
    #[arg(short = 'm')]
    medium: bool,

    /// Rapid: 0.05 seconds per frame.
    #[arg(short = 'r')]
    rapid: bool,

    /// Clear the screen and enable the cursor, e.g. after an interrupted run.
    #[arg(short = 'e', long)]
    restore_cursor: bool,

    /// Abort if no result is reached after N generations.
    #[arg(short = 'g', long, value_name = "N")]
    max_generations: Option<u64>,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn field(&self) -> Field {
        let flags = [
            (self.none, Field::None),
            (self.code, Field::Code),
            (self.direction, Field::Direction),
            (self.flag, Field::Flag),
            (self.colour, Field::Colour),
            (self.monitor, Field::Monitor),
        ];
        self.field
            .or_else(|| flags.iter().find(|(set, _)| *set).map(|&(_, f)| f))
            .unwrap_or_default()
    }

    fn speed(&self) -> Speed {
        let flags = [
            (self.slow, Speed::Slow),
            (self.medium, Speed::Medium),
            (self.rapid, Speed::Rapid),
        ];
        self.speed
            .or_else(|| flags.iter().find(|(set, _)| *set).map(|&(_, s)| s))
            .unwrap_or_default()
    }

    /// The predicate text, if one was given.
    fn source(&self) -> Result<Option<String>> {
        if let Some(path) = &self.file {
            let text = fs::read_to_string(path)
                .with_context(|| format!("could not read {}", path.display()))?;
            return Ok(Some(text));
        }
        Ok(self.expr.clone().or_else(|| self.predicate.clone()))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();

    let mut stdout = io::stdout();
    if args.restore_cursor {
        restore_terminal(&mut stdout).context("could not restore the terminal")?;
    }

    let Some(source) = args.source()? else {
        if args.restore_cursor {
            return Ok(());
        }
        eprintln!("no CNF predicate given; try loopsat --help");
        process::exit(2);
    };

    let predicate = match parse(&source) {
        Ok(predicate) => predicate,
        Err(error) => {
            writeln!(stdout, "{}", error.render(&source))?;
            process::exit(1);
        }
    };
    info!(
        clauses = predicate.clauses().len(),
        variables = predicate.variables().len(),
        "predicate parsed"
    );

    let table = predicate.table().context("could not build the clause table")?;
    let mut config = EngineConfig::default().with_visual_field(args.field().into());
    if let Some(limit) = args.max_generations {
        config = config.with_generation_limit(limit);
    }
    let renderer = TerminalRenderer::new(io::stdout(), args.speed());

    let mut kernel = Kernel::with_idle_wait(config.idle_wait);
    let mut sim = Simulation::new(table, config, renderer);
    sim.start(&mut kernel);
    kernel.run(&mut sim).context("event kernel failed")?;
    debug!(generations = kernel.tick(), "run finished");

    let outcome = sim
        .into_observer()
        .into_result()
        .context("terminal output failed")?
        .context("simulation ended without a result")?
        .context("simulation aborted")?;

    if args.json {
        write_json(&mut stdout, &outcome, predicate.variables())?;
    } else {
        write_text(&mut stdout, &outcome, predicate.variables())?;
    }
    Ok(())
}
