//! Cooperative, tick-based event kernel.
//!
//! Every state transition of the automaton is a queued task. One call to
//! [`Kernel::turn`] is one generation:
//!
//! ```text
//! 1. dispatch handlers of raised signals, then clear all signal bits
//! 2. advance the tick counter
//! 3. drain tasks queued before this tick (FIFO); tasks queued now wait
//! 4. terminate if nothing is queued, registered, or raised
//! 5. otherwise wait briefly on registered descriptors
//! ```
//!
//! A task queued during tick N never runs in tick N. This generation
//! isolation is what makes the automaton deterministic.
//!
//! - [`signal`]: level-triggered signal set and handler table
//! - [`fd`]: one-shot descriptor readiness registrations

pub mod fd;
pub mod signal;

use std::collections::VecDeque;
use std::os::unix::io::RawFd;
use std::time::Duration;

use tracing::{trace, warn};

use self::fd::{FdTable, Interest};
use self::signal::{Signal, SignalSet, SignalTable};
use crate::error::{Error, Result};

/// Default bound on a descriptor wait when nothing else is queued.
pub const DEFAULT_IDLE_WAIT: Duration = Duration::from_micros(10);

/// Receiver of dispatched tasks.
///
/// The kernel owns the queue; the context owns the state tasks act on.
pub trait Dispatch<T> {
    /// Runs one task. The task may schedule or cancel further tasks.
    fn dispatch(&mut self, task: T, kernel: &mut Kernel<T>);
}

/// Identity of the structure a task acts on, used for cancellation.
pub trait Payload {
    /// Identity type.
    type Id: Copy + PartialEq;

    /// The structure this task refers to.
    fn payload(&self) -> Self::Id;
}

/// Outcome of a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// More work remains.
    Continue,
    /// Queue, descriptors, and signals are all empty.
    Terminate,
}

struct Entry<T> {
    stamp: u64,
    task: T,
}

/// The scheduling kernel.
pub struct Kernel<T> {
    queue: VecDeque<Entry<T>>,
    handlers: SignalTable<T>,
    raised: SignalSet,
    fds: FdTable<T>,
    tick: u64,
    idle_wait: Duration,
    fault: Option<Error>,
}

impl<T> Default for Kernel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Kernel<T> {
    /// Creates an idle kernel at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self::with_idle_wait(DEFAULT_IDLE_WAIT)
    }

    /// Creates a kernel whose descriptor wait is bounded by `idle_wait`.
    #[must_use]
    pub fn with_idle_wait(idle_wait: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            handlers: SignalTable::new(),
            raised: SignalSet::EMPTY,
            fds: FdTable::new(),
            tick: 0,
            idle_wait,
            fault: None,
        }
    }

    /// Current generation.
    #[inline]
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Number of queued tasks.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of descriptor registrations.
    #[inline]
    #[must_use]
    pub fn registered_fds(&self) -> usize {
        self.fds.len()
    }

    /// Currently raised signals.
    #[inline]
    #[must_use]
    pub fn raised(&self) -> SignalSet {
        self.raised
    }

    /// Iterates over queued tasks in dispatch order.
    pub fn queued(&self) -> impl Iterator<Item = &T> + '_ {
        self.queue.iter().map(|e| &e.task)
    }

    /// Appends `task` to the queue. It runs in the next generation.
    ///
    /// If the queue cannot grow, the failure is recorded and
    /// [`Signal::Error`] is raised instead.
    pub fn schedule(&mut self, task: T) {
        if let Err(source) = self.queue.try_reserve(1) {
            self.fail(Error::Allocation {
                what: "deferred task",
                source,
            });
            return;
        }
        self.queue.push_back(Entry {
            stamp: self.tick,
            task,
        });
    }

    /// Appends `task` unless an equal task is already queued.
    ///
    /// Returns whether the task was appended.
    pub fn schedule_once(&mut self, task: T) -> bool
    where
        T: PartialEq,
    {
        if self.queue.iter().any(|e| e.task == task) {
            return false;
        }
        self.schedule(task);
        true
    }

    /// Removes the first queued task acting on `id`.
    pub fn cancel_one(&mut self, id: T::Id) -> bool
    where
        T: Payload,
    {
        match self.queue.iter().position(|e| e.task.payload() == id) {
            Some(at) => {
                self.queue.remove(at);
                true
            }
            None => false,
        }
    }

    /// Removes every queued task acting on `id`.
    pub fn cancel_all(&mut self, id: T::Id) -> usize
    where
        T: Payload,
    {
        self.cancel_where(|task| task.payload() == id)
    }

    /// Removes every queued task matching `pred`.
    pub fn cancel_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.queue.len();
        self.queue.retain(|e| !pred(&e.task));
        before - self.queue.len()
    }

    /// Registers `handler` for `signal`. Later registrations run first.
    pub fn register_signal(&mut self, signal: Signal, handler: T) {
        self.handlers.register(signal, handler);
    }

    /// Marks `signal` pending until the start of the next tick.
    pub fn raise(&mut self, signal: Signal) {
        self.raised.raise(signal);
    }

    /// Records a fatal error and raises [`Signal::Error`].
    ///
    /// Only the first error of a run is kept.
    pub fn fail(&mut self, error: Error) {
        warn!(tick = self.tick, %error, "fatal error raised");
        if self.fault.is_none() {
            self.fault = Some(error);
        }
        self.raise(Signal::Error);
    }

    /// Takes the recorded fatal error, if any.
    pub fn take_fault(&mut self) -> Option<Error> {
        self.fault.take()
    }

    /// Registers a one-shot readiness handler.
    ///
    /// A combined `interest` becomes one registration per condition.
    /// Registrations made during a tick are not considered until the next.
    pub fn register_fd(&mut self, fd: RawFd, interest: Interest, task: T)
    where
        T: Clone,
    {
        for bit in interest.split() {
            self.fds.insert(fd, bit, self.tick, task.clone());
        }
    }

    /// Removes readiness handlers previously registered with the same
    /// descriptor, interest, and task.
    pub fn unregister_fd(&mut self, fd: RawFd, interest: Interest, task: &T)
    where
        T: PartialEq,
    {
        for bit in interest.split() {
            self.fds.remove_matching(fd, bit, task);
        }
    }

    /// Drops every queued task and descriptor registration.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.fds.clear();
    }

    /// Runs one generation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Multiplex`] if waiting on registered descriptors
    /// fails.
    pub fn turn<D>(&mut self, ctx: &mut D) -> Result<Status>
    where
        T: Clone,
        D: Dispatch<T>,
    {
        let raised = self.raised;
        for signal in Signal::ALL {
            if raised.contains(signal) {
                let handlers = self.handlers.handlers(signal).to_vec();
                for handler in handlers {
                    ctx.dispatch(handler, self);
                }
            }
        }
        self.raised.clear();

        self.tick += 1;
        let now = self.tick;

        // Tasks queued during this drain carry `now` and sit behind every
        // eligible entry.
        while self.queue.front().is_some_and(|e| e.stamp != now) {
            if let Some(entry) = self.queue.pop_front() {
                ctx.dispatch(entry.task, self);
            }
        }

        trace!(tick = now, queued = self.queue.len(), "generation drained");

        if self.queue.is_empty() && self.fds.is_empty() && self.raised.is_empty() {
            return Ok(Status::Terminate);
        }
        if self.fds.is_empty() {
            return Ok(Status::Continue);
        }

        let wait = if self.queue.is_empty() && self.raised.is_empty() {
            self.idle_wait
        } else {
            Duration::ZERO
        };
        let ready = self.fds.ready(wait, now).map_err(Error::Multiplex)?;
        for serial in ready {
            if let Some(registration) = self.fds.take(serial) {
                ctx.dispatch(registration.task, self);
            }
        }

        Ok(Status::Continue)
    }

    /// Runs generations until the kernel has nothing left to do.
    ///
    /// # Errors
    ///
    /// Returns the first multiplexing failure. All queued tasks are dropped
    /// before returning.
    pub fn run<D>(&mut self, ctx: &mut D) -> Result<()>
    where
        T: Clone,
        D: Dispatch<T>,
    {
        loop {
            match self.turn(ctx) {
                Ok(Status::Continue) => {}
                Ok(Status::Terminate) => return Ok(()),
                Err(error) => {
                    self.queue.clear();
                    return Err(error);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum Step {
        Log(u32),
        Chain(u32),
        Raise,
        OnLoop,
    }

    impl Payload for Step {
        type Id = u32;

        fn payload(&self) -> u32 {
            match self {
                Self::Log(n) | Self::Chain(n) => *n,
                Self::Raise | Self::OnLoop => 0,
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<(u64, Step)>,
    }

    impl Dispatch<Step> for Recorder {
        fn dispatch(&mut self, task: Step, kernel: &mut Kernel<Step>) {
            self.seen.push((kernel.tick(), task.clone()));
            match task {
                Step::Chain(n) if n > 0 => kernel.schedule(Step::Chain(n - 1)),
                Step::Raise => kernel.raise(Signal::Loop),
                _ => {}
            }
        }
    }

    #[test]
    fn test_fifo_within_generation() {
        let mut kernel = Kernel::new();
        let mut rec = Recorder::default();
        kernel.schedule(Step::Log(1));
        kernel.schedule(Step::Log(2));
        kernel.schedule(Step::Log(3));
        kernel.run(&mut rec).unwrap();
        let order: Vec<_> = rec.seen.iter().map(|(_, p)| p.clone()).collect();
        assert_eq!(order, vec![Step::Log(1), Step::Log(2), Step::Log(3)]);
        assert!(rec.seen.iter().all(|(t, _)| *t == 1));
    }

    #[test]
    fn test_chained_tasks_advance_generation() {
        let mut kernel = Kernel::new();
        let mut rec = Recorder::default();
        kernel.schedule(Step::Chain(3));
        kernel.run(&mut rec).unwrap();
        let ticks: Vec<_> = rec.seen.iter().map(|(t, _)| *t).collect();
        assert_eq!(ticks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_schedule_once_dedups_pending() {
        let mut kernel = Kernel::new();
        assert!(kernel.schedule_once(Step::Log(9)));
        assert!(!kernel.schedule_once(Step::Log(9)));
        assert!(kernel.schedule_once(Step::Log(8)));
        assert_eq!(kernel.pending(), 2);
    }

    #[test]
    fn test_cancel_by_payload() {
        let mut kernel = Kernel::new();
        kernel.schedule(Step::Log(1));
        kernel.schedule(Step::Chain(1));
        kernel.schedule(Step::Log(2));
        kernel.schedule(Step::Log(1));
        assert!(kernel.cancel_one(1));
        assert_eq!(kernel.pending(), 3);
        assert_eq!(kernel.cancel_all(1), 2);
        assert_eq!(kernel.queued().cloned().collect::<Vec<_>>(), vec![Step::Log(2)]);
        assert!(!kernel.cancel_one(7));
    }

    #[test]
    fn test_signal_handlers_run_next_generation() {
        let mut kernel = Kernel::new();
        let mut rec = Recorder::default();
        kernel.register_signal(Signal::Loop, Step::OnLoop);
        kernel.schedule(Step::Raise);
        kernel.run(&mut rec).unwrap();
        // Raised in tick 1, handled before tick 2 starts.
        assert_eq!(rec.seen, vec![(1, Step::Raise), (1, Step::OnLoop)]);
        assert!(kernel.raised().is_empty());
    }

    #[test]
    fn test_empty_kernel_terminates_immediately() {
        let mut kernel: Kernel<Step> = Kernel::new();
        let mut rec = Recorder::default();
        assert_eq!(kernel.turn(&mut rec).unwrap(), Status::Terminate);
        assert_eq!(kernel.tick(), 1);
    }

    #[test]
    fn test_fail_keeps_first_error() {
        let mut kernel: Kernel<Step> = Kernel::new();
        kernel.fail(Error::EmptyTable);
        kernel.fail(Error::Multiplex(std::io::Error::other("late")));
        assert!(kernel.raised().contains(Signal::Error));
        assert!(matches!(kernel.take_fault(), Some(Error::EmptyTable)));
        assert!(kernel.take_fault().is_none());
    }

    #[test]
    fn test_ready_descriptor_dispatches_once() {
        let mut fds = [0 as RawFd; 2];
        // SAFETY: `fds` has room for the two descriptors pipe(2) writes.
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        let mut kernel = Kernel::new();
        let mut rec = Recorder::default();
        kernel.register_fd(fds[1], Interest::WRITE, Step::Log(42));
        kernel.run(&mut rec).unwrap();
        assert_eq!(rec.seen.len(), 1);
        assert_eq!(rec.seen[0].1, Step::Log(42));
        assert_eq!(kernel.registered_fds(), 0);
        // SAFETY: both descriptors came from pipe(2) above and are closed once.
        unsafe {
            libc::close(fds[0]);
            libc::close(fds[1]);
        }
    }
}
