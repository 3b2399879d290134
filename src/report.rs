// src/report.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Run results and their text rendering.

use std::fmt;
use std::time::Duration;

use crate::clock::Timestamp;
use crate::prefetch::PrefetchStatus;
use crate::strategy::Strategy;

/// One checkpoint: wall-clock timestamp plus cumulative page faults.
///
/// Faults are counted per mapping, not per base page: with transparent huge
/// pages one fault can back 512 of the `pages` in a [`BenchReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementSample {
    pub at: Timestamp,
    pub faults: Option<u64>,
}

impl MeasurementSample {
    /// True when neither field went backwards from `earlier`.
    pub fn follows(&self, earlier: &MeasurementSample) -> bool {
        let faults_ok = match (earlier.faults, self.faults) {
            (Some(a), Some(b)) => b >= a,
            _ => true,
        };
        self.at >= earlier.at && faults_ok
    }

    /// Faults between `earlier` and `self`; `None` if either side has no counter.
    pub fn faults_since(&self, earlier: &MeasurementSample) -> Option<u64> {
        Some(self.faults?.saturating_sub(earlier.faults?))
    }
}

/// Result of one benchmark run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchReport {
    pub strategy: Strategy,
    pub elements: usize,
    pub bytes: usize,
    /// Base pages spanned; huge pages take fewer faults, see [`MeasurementSample`]
    pub pages: usize,
    pub page_size: usize,
    pub stride: usize,
    pub touched: usize,
    pub checksum: i32,
    /// Set only for [`Strategy::Prefetch`]
    pub prefetch: Option<PrefetchStatus>,
    /// Before strategy, after strategy, after access loop
    pub samples: [MeasurementSample; 3],
    /// Access loop wall time
    pub elapsed: Duration,
    /// Faults during strategy application
    pub strategy_faults: Option<u64>,
    /// Faults during the access loop
    pub loop_faults: Option<u64>,
}

impl BenchReport {
    /// Short form: the Time and Pagefaults lines only.
    pub fn summary(&self) -> Summary<'_> {
        Summary(self)
    }

    pub fn has_fault_counts(&self) -> bool {
        self.strategy_faults.is_some() && self.loop_faults.is_some()
    }
}

/// Short form of a [`BenchReport`], see [`BenchReport::summary`].
#[derive(Debug)]
pub struct Summary<'a>(&'a BenchReport);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        writeln!(f, "Time: {:.6} s", r.elapsed.as_secs_f64())?;
        if let (Some(prefetch), Some(hot)) = (r.strategy_faults, r.loop_faults) {
            writeln!(f, "Pagefaults (Prefetch): {prefetch}")?;
            writeln!(f, "Pagefaults (Hot): {hot}")?;
        }
        Ok(())
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mode: {}", self.strategy)?;
        writeln!(
            f,
            "Elements: {} ({} bytes, {} pages of {} bytes)",
            self.elements, self.bytes, self.pages, self.page_size
        )?;
        writeln!(f, "Stride: {} ({} elements touched)", self.stride, self.touched)?;
        if let Some(status) = &self.prefetch {
            writeln!(f, "Prefetch: {status}")?;
        }
        write!(f, "{}", self.summary())?;
        writeln!(f, "Checksum: {}", self.checksum)
    }
}
