//! Level-triggered signals.
//!
//! A raised signal stays pending until the start of the next tick, when every
//! handler registered for it is invoked and all pending bits are cleared.

use core::fmt;

/// Signals understood by the kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Signal {
    /// A loop left the active set.
    Loop,
    /// A fatal error was recorded.
    Error,
}

impl Signal {
    /// Number of distinct signals.
    pub const COUNT: usize = 2;

    /// All signals in dispatch order.
    pub const ALL: [Self; Self::COUNT] = [Self::Loop, Self::Error];

    #[inline]
    #[must_use]
    const fn bit(self) -> u8 {
        1 << self as u8
    }

    #[inline]
    #[must_use]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loop => f.write_str("SIG_LOOP"),
            Self::Error => f.write_str("SIG_ERROR"),
        }
    }
}

/// Pending signal bits.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalSet(u8);

impl SignalSet {
    /// An empty set.
    pub const EMPTY: Self = Self(0);

    /// Marks `signal` pending.
    #[inline]
    pub fn raise(&mut self, signal: Signal) {
        self.0 |= signal.bit();
    }

    /// Whether `signal` is pending.
    #[inline]
    #[must_use]
    pub const fn contains(self, signal: Signal) -> bool {
        self.0 & signal.bit() != 0
    }

    /// Whether no signal is pending.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Clears every pending bit.
    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

impl fmt::Debug for SignalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(Signal::ALL.iter().filter(|s| self.contains(**s)))
            .finish()
    }
}

/// Handlers per signal, most recently registered first.
pub(crate) struct SignalTable<T> {
    handlers: [Vec<T>; Signal::COUNT],
}

impl<T> SignalTable<T> {
    pub(crate) fn new() -> Self {
        Self {
            handlers: [Vec::new(), Vec::new()],
        }
    }

    pub(crate) fn register(&mut self, signal: Signal, handler: T) {
        self.handlers[signal.index()].insert(0, handler);
    }

    pub(crate) fn handlers(&self, signal: Signal) -> &[T] {
        &self.handlers[signal.index()]
    }
}
