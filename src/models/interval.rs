//! Time interval model.
//!
//! Instants are clock-free `chrono::NaiveDateTime` values supplied by the
//! caller. Every busy/free decision in the crate goes through [`overlaps`].
//!
//! # Convention
//! Intervals are half-open `[start, stop)`: two intervals that only touch at
//! an endpoint do not overlap, and a zero-length interval overlaps nothing.

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::{Error, Result};

/// A point in time with at least minute resolution.
pub type Instant = NaiveDateTime;

/// A time interval [start, stop).
///
/// Construction rejects reversed intervals (`start > stop`); zero-length
/// intervals are accepted.
///
/// Live intervals keep seconds but envelopes keep minutes. An interval that
/// starts and stops within the same minute reloads as zero length, so a
/// reloaded resource no longer reports it as busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeInterval {
    start: Instant,
    stop: Instant,
}

impl TimeInterval {
    /// Creates a new interval.
    ///
    /// # Errors
    /// `Error::InvalidInterval` when `start > stop`.
    pub fn new(start: Instant, stop: Instant) -> Result<Self> {
        if start > stop {
            return Err(Error::InvalidInterval { start, stop });
        }
        Ok(Self { start, stop })
    }

    /// Interval start (inclusive).
    #[inline]
    pub fn start(&self) -> Instant {
        self.start
    }

    /// Interval stop (exclusive).
    #[inline]
    pub fn stop(&self) -> Instant {
        self.stop
    }

    #[inline]
    pub fn duration(&self) -> TimeDelta {
        self.stop - self.start
    }

    /// Whether start and stop coincide.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    /// Whether an instant falls within this interval.
    #[inline]
    pub fn contains(&self, instant: Instant) -> bool {
        instant >= self.start && instant < self.stop
    }

    /// Whether two intervals overlap. See [`overlaps`].
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        overlaps(self, other)
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.stop)
    }
}

/// Whether `a` and `b` share at least one instant.
///
/// Computed as `max(a.start, b.start) < min(a.stop, b.stop)`.
pub fn overlaps(a: &TimeInterval, b: &TimeInterval) -> bool {
    a.start.max(b.start) < a.stop.min(b.stop)
}
