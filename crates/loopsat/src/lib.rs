//! loopsat - CNF satisfiability on a self-replicating-loop cellular automaton
//!
//! A CNF formula is solved by growing loops on a toroidal grid. Every loop
//! carries one bit per variable. Loops replicate, and each replica decides
//! the next undecided bit both ways. Clause monitors travel with the loops.
//! A loop that falsifies a clause erases itself; a loop whose monitors all
//! retire has found a satisfying assignment.
//!
//! # Execution Model
//!
//! ```text
//! Kernel     = FIFO of deferred tasks + signal bits + descriptor waits
//! Generation = one kernel tick; tasks queued now run in the next tick
//! Scan       = flags stage, then bound or unbound stage, for one cell
//! Mutation   = single-field write queued by a scan, applied next tick
//! ```
//!
//! Because rules only ever queue writes, every cell of a generation reads
//! the same state, and a run is fully deterministic.
//!
//! # Grid Geometry
//!
//! | Variables | Grid side | Loop side | Loop length |
//! |-----------|-----------|-----------|-------------|
//! | 1         | 11        | 3         | 8           |
//! | 2         | 19        | 3         | 8           |
//! | 4         | 44        | 4         | 12          |
//! | 7         | 89        | 5         | 16          |
//!
//! # Example
//!
//! ```
//! use loopsat::table::{Clause, Table, TruthValue};
//! use loopsat::{solve, EngineConfig};
//!
//! // (a or b) and (-a or -b)
//! let clauses: Vec<Clause> = vec![
//!     [(1, TruthValue::True), (2, TruthValue::True)].into_iter().collect(),
//!     [(1, TruthValue::False), (2, TruthValue::False)].into_iter().collect(),
//! ];
//! let table = Table::compile(&clauses, 2).unwrap();
//! let outcome = solve(table, EngineConfig::default()).unwrap();
//! assert!(outcome.is_satisfiable());
//! for assignment in outcome.assignments() {
//!     let bits = assignment.to_bools();
//!     assert_ne!(bits[0], bits[1]);
//! }
//! ```
//!
//! # Design Principles
//!
//! - **Generation Isolation**: no task observes writes from its own tick
//! - **Single Owner**: the simulation owns grid, loops and table; tasks
//!   carry indices, never references
//! - **Fatal vs. Local Failure**: a falsified clause is cell state; only
//!   allocation failures, multiplexing failures and an exceeded generation
//!   limit are errors

#![forbid(unsafe_op_in_unsafe_fn)]

// Fatal error taxonomy
pub mod error;

// Event kernel (tasks, signals, descriptors)
pub mod event;

// Toroidal grid (compass, cell, mutation)
pub mod grid;

// Clause table and assignments
pub mod table;

// Clause monitors
pub mod monitor;

// Loop registry
pub mod lifecycle;

// Cell rule engine
mod rules;

// Simulation driver
pub mod engine;

// Engine configuration
pub mod config;

// Per-cell presentation
pub mod view;

// Re-export commonly used items at crate root
pub use config::EngineConfig;
pub use engine::{solve, Collector, Geometry, Observer, Outcome, Simulation, Task};
pub use error::{Error, Result};
pub use event::{Kernel, Status};
pub use table::{Assignment, Clause, Table, TruthValue};
pub use view::{CellView, Emphasis, Frame, TermColour, VisualField};
