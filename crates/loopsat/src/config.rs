//! Engine configuration.

use std::time::Duration;

use crate::event::DEFAULT_IDLE_WAIT;
use crate::view::VisualField;

/// Knobs for one simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Attribute handed to the observer every second generation.
    pub visual_field: VisualField,
    /// Bound on the kernel's descriptor wait when nothing else is queued.
    pub idle_wait: Duration,
    /// Generations after which a run still searching is aborted with
    /// [`Error::GenerationLimit`]. Unbounded by default.
    ///
    /// Termination depends on the variable numbering: the seed ring carries
    /// ids in ascending order, and some formulas keep loops replicating
    /// forever under one numbering while finishing under another. The CNF
    /// parser numbers variables by first appearance.
    ///
    /// [`Error::GenerationLimit`]: crate::Error::GenerationLimit
    pub generation_limit: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            visual_field: VisualField::None,
            idle_wait: DEFAULT_IDLE_WAIT,
            generation_limit: None,
        }
    }
}

impl EngineConfig {
    /// Sets the visualized field.
    #[must_use]
    pub fn with_visual_field(mut self, field: VisualField) -> Self {
        self.visual_field = field;
        self
    }

    /// Sets the idle descriptor wait.
    #[must_use]
    pub fn with_idle_wait(mut self, wait: Duration) -> Self {
        self.idle_wait = wait;
        self
    }

    /// Aborts runs still searching after `limit` generations.
    #[must_use]
    pub fn with_generation_limit(mut self, limit: u64) -> Self {
        self.generation_limit = Some(limit);
        self
    }
}
