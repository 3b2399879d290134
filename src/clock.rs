// src/clock.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic time source for the timed phase.

use std::time::{Duration, Instant};

/// Point in time, as an offset from the owning clock's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Timestamp(Duration);

impl Timestamp {
    pub fn from_duration(offset: Duration) -> Self {
        Self(offset)
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is later.
    pub fn since(self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

/// High-resolution, monotonic clock.
pub trait MonotonicClock {
    fn now(&self) -> Timestamp;
}

/// [`MonotonicClock`] backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    origin: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for InstantClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.origin.elapsed())
    }
}
