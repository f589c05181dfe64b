//! Fatal error taxonomy.
//!
//! Local falsification (a monitor slot that can no longer match, a loop that
//! erases itself) is routine and modelled as cell state. Only conditions that
//! end a run surface here.

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Errors that terminate a simulation.
#[derive(Debug, Error)]
pub enum Error {
    /// The allocator refused to grow one of the engine's structures.
    #[error("could not allocate {what}")]
    Allocation {
        /// Which structure was being allocated.
        what: &'static str,
        /// The refused reservation.
        #[source]
        source: TryReserveError,
    },

    /// Waiting on registered descriptors failed.
    #[error("descriptor multiplexing failed")]
    Multiplex(#[source] io::Error),

    /// A table without clauses cannot seed a simulation.
    #[error("clause table is empty")]
    EmptyTable,

    /// The run was still searching when its generation limit passed.
    #[error("no result after {limit} generations")]
    GenerationLimit {
        /// The configured limit.
        limit: u64,
    },

    /// The kernel drained before the run reported a result.
    #[error("simulation ended without reporting a result")]
    Incomplete,
}

impl Error {
    pub(crate) fn allocation(what: &'static str) -> impl FnOnce(TryReserveError) -> Self {
        move |source| Self::Allocation { what, source }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
