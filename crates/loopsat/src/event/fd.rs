//! One-shot descriptor readiness registrations.

use core::fmt;
use core::ops::BitOr;
use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

/// Readiness conditions a registration waits for.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Interest(u8);

impl Interest {
    /// Readable (including end of stream and error).
    pub const READ: Self = Self(0x1);
    /// Writable.
    pub const WRITE: Self = Self(0x2);
    /// Exceptional condition (out-of-band data).
    pub const EXCEPTION: Self = Self(0x4);

    const SINGLE: [Self; 3] = [Self::READ, Self::WRITE, Self::EXCEPTION];

    /// Whether every bit of `other` is set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    /// Splits a combined interest into single-condition interests.
    pub fn split(self) -> impl Iterator<Item = Self> {
        Self::SINGLE.into_iter().filter(move |bit| self.contains(*bit))
    }

    fn events(self) -> libc::c_short {
        match self {
            Self::READ => libc::POLLIN,
            Self::WRITE => libc::POLLOUT,
            _ => libc::POLLPRI,
        }
    }

    fn is_ready(self, revents: libc::c_short) -> bool {
        let hangup = libc::POLLERR | libc::POLLHUP | libc::POLLNVAL;
        match self {
            Self::READ => revents & (libc::POLLIN | hangup) != 0,
            Self::WRITE => revents & (libc::POLLOUT | libc::POLLERR | libc::POLLNVAL) != 0,
            _ => revents & libc::POLLPRI != 0,
        }
    }
}

impl BitOr for Interest {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [(Self::READ, "READ"), (Self::WRITE, "WRITE"), (Self::EXCEPTION, "EXCEPTION")];
        let mut first = true;
        for (bit, name) in names {
            if self.contains(bit) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("NONE")?;
        }
        Ok(())
    }
}

pub(crate) struct Registration<T> {
    pub(crate) serial: u64,
    pub(crate) fd: RawFd,
    pub(crate) interest: Interest,
    pub(crate) stamp: u64,
    pub(crate) task: T,
}

/// Registrations kept in ascending descriptor order.
pub(crate) struct FdTable<T> {
    entries: Vec<Registration<T>>,
    next_serial: u64,
}

impl<T> FdTable<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_serial: 0,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Inserts a single-condition registration ahead of any with an equal or
    /// larger descriptor.
    pub(crate) fn insert(&mut self, fd: RawFd, interest: Interest, stamp: u64, task: T) {
        let at = self
            .entries
            .iter()
            .position(|r| fd <= r.fd)
            .unwrap_or(self.entries.len());
        let serial = self.next_serial;
        self.next_serial += 1;
        self.entries.insert(
            at,
            Registration {
                serial,
                fd,
                interest,
                stamp,
                task,
            },
        );
    }

    pub(crate) fn remove_matching(&mut self, fd: RawFd, interest: Interest, task: &T) -> bool
    where
        T: PartialEq,
    {
        match self
            .entries
            .iter()
            .position(|r| r.fd == fd && r.interest == interest && r.task == *task)
        {
            Some(at) => {
                self.entries.remove(at);
                true
            }
            None => false,
        }
    }

    pub(crate) fn take(&mut self, serial: u64) -> Option<Registration<T>> {
        let at = self.entries.iter().position(|r| r.serial == serial)?;
        Some(self.entries.remove(at))
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Waits up to `wait` and returns the serials of registrations that are
    /// ready and were not registered during tick `now`.
    pub(crate) fn ready(&self, wait: Duration, now: u64) -> io::Result<Vec<u64>> {
        let mut polled: Vec<libc::pollfd> = self
            .entries
            .iter()
            .map(|r| libc::pollfd {
                fd: r.fd,
                events: r.interest.events(),
                revents: 0,
            })
            .collect();
        let timeout = libc::c_int::try_from(wait.as_micros().div_ceil(1000)).unwrap_or(libc::c_int::MAX);
        let count = polled.len() as libc::nfds_t;

        // SAFETY: `polled` is a live, exclusively borrowed buffer of exactly
        // `count` initialised pollfd records for the duration of the call.
        let n = unsafe { libc::poll(polled.as_mut_ptr(), count, timeout) };
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(Vec::new());
            }
            return Err(err);
        }
        if n == 0 {
            return Ok(Vec::new());
        }

        Ok(self
            .entries
            .iter()
            .zip(&polled)
            .filter(|(r, p)| r.stamp != now && r.interest.is_ready(p.revents))
            .map(|(r, _)| r.serial)
            .collect())
    }
}
