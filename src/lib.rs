// src/lib.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
//
// Crate root — public re-exports.

//! Measures what lazy (demand-paged) allocation costs compared with eager
//! initialization or an OS prefetch hint.
//!
//! A run allocates an uninitialized block, applies a [`Strategy`], then times
//! a strided write loop over the block while sampling the process page-fault
//! counter before and after each phase.

pub mod constants;
pub mod error;
pub mod config;
pub mod hardware;
pub mod memory;
pub mod clock;
pub mod faults;
pub mod prefetch;
pub mod strategy;
pub mod access;
pub mod report;
pub mod harness;

// ===== Core Public API =====
pub use config::{BenchConfig, WritePattern};
pub use error::{BenchError, Result};
pub use harness::{Harness, NativeHarness};
pub use report::{BenchReport, MeasurementSample};
pub use strategy::Strategy;

pub use clock::{InstantClock, MonotonicClock, Timestamp};
pub use faults::{FaultCounter, NoFaultCounter, OsFaultCounter};
pub use prefetch::{OsAdvisor, PageTouchAdvisor, PrefetchStatus, UnsupportedAdvisor};

/// Run one benchmark with the host's clock, fault counter and prefetch facility.
pub fn run_benchmark(config: &BenchConfig) -> Result<BenchReport> {
    NativeHarness::native().run(config)
}
