//! loopsat client library.
//!
//! Everything the `loopsat` binary needs around the engine:
//!
//! - [`parser`]: CNF predicate syntax, variable names, positioned errors
//! - [`render`]: ANSI terminal renderer implementing the engine's observer
//! - [`report`]: text and JSON result output

pub mod parser;
pub mod render;
pub mod report;

pub use parser::{parse, ParseError, ParseErrorKind, Predicate, VariableRegistry};
pub use render::{Speed, TerminalRenderer};
