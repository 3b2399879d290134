// src/harness.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Memory touch benchmark harness
//!
//! Runs one benchmark: allocate, sample, apply the strategy, sample, run the
//! timed access loop, sample, release. The clock, the fault counter and the
//! prefetch facility are injected so the harness holds no platform code.
//!
//! # Usage
//!
//! ```rust,no_run
//! use pagetouch::{BenchConfig, Harness, Strategy};
//!
//! let config = BenchConfig::new(Strategy::Lazy).with_elements(1_000_000);
//! let report = Harness::native().run(&config)?;
//! print!("{report}");
//! # Ok::<(), pagetouch::BenchError>(())
//! ```

use tracing::{debug, info, warn};

use crate::access::run_access_loop;
use crate::clock::{InstantClock, MonotonicClock};
use crate::config::BenchConfig;
use crate::error::Result;
use crate::faults::{FaultCounter, OsFaultCounter};
use crate::hardware;
use crate::memory::MemoryBlock;
use crate::prefetch::{OsAdvisor, PageTouchAdvisor};
use crate::report::{BenchReport, MeasurementSample};

#[derive(Debug, Clone)]
pub struct Harness<C, F, A> {
    clock: C,
    counter: F,
    advisor: A,
}

/// Harness wired to the host's clock, fault counter and prefetch facility.
pub type NativeHarness = Harness<InstantClock, OsFaultCounter, OsAdvisor>;

impl NativeHarness {
    pub fn native() -> Self {
        Harness::new(InstantClock::new(), OsFaultCounter, OsAdvisor)
    }
}

impl<C, F, A> Harness<C, F, A>
where
    C: MonotonicClock,
    F: FaultCounter,
    A: PageTouchAdvisor,
{
    pub fn new(clock: C, counter: F, advisor: A) -> Self {
        Self { clock, counter, advisor }
    }

    /// Execute one run of `config`.
    ///
    /// # Errors
    /// * `InvalidArgument` for a config that fails validation; nothing is allocated
    /// * `AllocationFailure` if the block cannot be allocated
    pub fn run(&self, config: &BenchConfig) -> Result<BenchReport> {
        config.validate()?;

        let mut block = MemoryBlock::allocate(config.elements)?;
        debug!(
            "running {} over {} elements, stride {} ({} touched)",
            config.strategy,
            config.elements,
            config.stride,
            config.touched_elements()
        );

        let before = self.sample_faults_first();
        let outcome = config.strategy.apply(&mut block, config.fill_byte, &self.advisor);
        let applied = self.sample_faults_first();
        debug!("strategy {} applied", config.strategy);

        // Timed region: the clock is read last on entry and first on exit so
        // fault-counter reads stay outside it.
        let access = run_access_loop(&mut block, config.stride, config.pattern, config.seed)?;
        let finished = self.sample_time_first();

        let samples = [before, applied, finished];
        if !samples.windows(2).all(|w| w[1].follows(&w[0])) {
            warn!("measurement samples went backwards: {:?}", samples);
        }
        if before.faults.is_none() {
            warn!("page fault counter unavailable; fault counts omitted");
        }

        let report = BenchReport {
            strategy: config.strategy,
            elements: block.len(),
            bytes: block.byte_len(),
            pages: block.pages(),
            page_size: hardware::page_size(),
            stride: config.stride,
            touched: access.touched,
            checksum: access.checksum,
            prefetch: outcome.prefetch,
            samples,
            elapsed: finished.at.since(applied.at),
            strategy_faults: applied.faults_since(&before),
            loop_faults: finished.faults_since(&applied),
        };
        drop(block);

        info!(
            "{}: {:.6} s, faults strategy={:?} loop={:?}",
            report.strategy,
            report.elapsed.as_secs_f64(),
            report.strategy_faults,
            report.loop_faults
        );
        Ok(report)
    }

    fn sample_faults_first(&self) -> MeasurementSample {
        let faults = self.counter.page_faults();
        MeasurementSample { at: self.clock.now(), faults }
    }

    fn sample_time_first(&self) -> MeasurementSample {
        let at = self.clock.now();
        MeasurementSample { at, faults: self.counter.page_faults() }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;
    use crate::clock::Timestamp;
    use crate::config::WritePattern;
    use crate::error::BenchError;
    use crate::faults::NoFaultCounter;
    use crate::prefetch::{PrefetchStatus, UnsupportedAdvisor};
    use crate::strategy::Strategy;

    /// Clock that advances by a fixed step on every read.
    struct StepClock {
        ticks: Cell<u64>,
        step: Duration,
    }

    impl StepClock {
        fn new(step: Duration) -> Self {
            Self { ticks: Cell::new(0), step }
        }
    }

    impl MonotonicClock for StepClock {
        fn now(&self) -> Timestamp {
            let t = self.ticks.get();
            self.ticks.set(t + 1);
            Timestamp::from_duration(self.step * t as u32)
        }
    }

    /// Counter returning a scripted sequence of readings.
    struct ScriptedCounter {
        readings: Vec<u64>,
        next: Cell<usize>,
    }

    impl FaultCounter for ScriptedCounter {
        fn page_faults(&self) -> Option<u64> {
            let i = self.next.get();
            self.next.set(i + 1);
            self.readings.get(i).copied()
        }
    }

    fn small(strategy: Strategy) -> BenchConfig {
        BenchConfig::new(strategy)
            .with_elements(64 * 1024)
            .with_stride(16)
            .with_pattern(WritePattern::Index)
    }

    #[test]
    fn elapsed_covers_only_the_access_loop() {
        let harness = Harness::new(
            StepClock::new(Duration::from_millis(10)),
            NoFaultCounter,
            UnsupportedAdvisor,
        );
        let report = harness.run(&small(Strategy::Eager)).unwrap();
        // Three clock reads at ticks 0, 1, 2; the loop spans ticks 1..2.
        assert_eq!(report.elapsed, Duration::from_millis(10));
        assert_eq!(report.strategy_faults, None);
        assert_eq!(report.loop_faults, None);
    }

    #[test]
    fn fault_deltas_come_from_checkpoints() {
        let counter = ScriptedCounter { readings: vec![100, 100, 116], next: Cell::new(0) };
        let harness = Harness::new(InstantClock::new(), counter, UnsupportedAdvisor);
        let report = harness.run(&small(Strategy::Lazy)).unwrap();
        assert_eq!(report.strategy_faults, Some(0));
        assert_eq!(report.loop_faults, Some(16));
        assert!(report.has_fault_counts());
    }

    #[test]
    fn backwards_counter_saturates_to_zero() {
        let counter = ScriptedCounter { readings: vec![50, 40, 30], next: Cell::new(0) };
        let harness = Harness::new(InstantClock::new(), counter, UnsupportedAdvisor);
        let report = harness.run(&small(Strategy::Lazy)).unwrap();
        assert_eq!(report.strategy_faults, Some(0));
        assert_eq!(report.loop_faults, Some(0));
    }

    #[test]
    fn unsupported_prefetch_still_runs() {
        let harness = Harness::new(InstantClock::new(), NoFaultCounter, UnsupportedAdvisor);
        let report = harness.run(&small(Strategy::Prefetch)).unwrap();
        assert!(matches!(report.prefetch, Some(PrefetchStatus::Unsupported(_))));
        assert_eq!(report.touched, 4096);
    }

    #[test]
    fn touched_count_matches_config() {
        let harness = Harness::new(InstantClock::new(), NoFaultCounter, UnsupportedAdvisor);
        for stride in [1, 7, 1000, 64 * 1024, 1 << 20] {
            let config = small(Strategy::Lazy).with_stride(stride);
            let report = harness.run(&config).unwrap();
            assert_eq!(report.touched, config.touched_elements(), "stride {stride}");
        }
    }

    #[test]
    fn invalid_config_fails_before_sampling() {
        let counter = ScriptedCounter { readings: vec![1, 2, 3], next: Cell::new(0) };
        let harness = Harness::new(InstantClock::new(), counter, UnsupportedAdvisor);
        let err = harness.run(&small(Strategy::Lazy).with_stride(0)).unwrap_err();
        assert!(matches!(err, BenchError::InvalidArgument(_)));
        assert_eq!(harness.counter.next.get(), 0);
    }

    #[test]
    fn report_describes_block() {
        let harness = Harness::new(InstantClock::new(), NoFaultCounter, UnsupportedAdvisor);
        let report = harness.run(&small(Strategy::Lazy)).unwrap();
        assert_eq!(report.elements, 64 * 1024);
        assert_eq!(report.bytes, 256 * 1024);
        assert_eq!(report.pages, hardware::pages_spanned(256 * 1024));
        assert_eq!(report.stride, 16);
        assert_eq!(report.prefetch, None);
    }
}
