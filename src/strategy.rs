// src/strategy.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pre-touch strategies applied to the block before the timed phase.

use std::fmt;
use std::str::FromStr;

use crate::error::BenchError;
use crate::memory::MemoryBlock;
use crate::prefetch::{PageTouchAdvisor, PrefetchStatus};

/// How the block is touched before the access loop.
///
/// Canonical names are `lazy`, `eager` and `prefetch`; `init` and
/// `initialize` are accepted for `eager`. Parsing is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Leave every page unbacked until the access loop touches it.
    Lazy,
    /// Write every byte so all pages fault in before timing starts.
    Eager,
    /// Hint the OS to back the pages, without waiting for it.
    Prefetch,
}

/// Side information from applying a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StrategyOutcome {
    /// Set only for [`Strategy::Prefetch`].
    pub prefetch: Option<PrefetchStatus>,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Lazy, Strategy::Eager, Strategy::Prefetch];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Lazy => "lazy",
            Strategy::Eager => "eager",
            Strategy::Prefetch => "prefetch",
        }
    }

    /// Apply this strategy to `block`.
    ///
    /// Prefetch degradation is recorded in the outcome, never returned as an
    /// error: the run continues as if the strategy were `Lazy`.
    pub fn apply<A: PageTouchAdvisor + ?Sized>(
        &self,
        block: &mut MemoryBlock,
        fill_byte: u8,
        advisor: &A,
    ) -> StrategyOutcome {
        match self {
            Strategy::Lazy => StrategyOutcome::default(),
            Strategy::Eager => {
                block.fill_bytes(fill_byte);
                StrategyOutcome::default()
            }
            Strategy::Prefetch => {
                let status = PrefetchStatus::from(advisor.prefetch(block));
                if status.is_degraded() {
                    tracing::warn!("prefetch degraded to a no-op ({})", status);
                }
                StrategyOutcome { prefetch: Some(status) }
            }
        }
    }
}

impl FromStr for Strategy {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lazy" => Ok(Strategy::Lazy),
            "eager" | "init" | "initialize" => Ok(Strategy::Eager),
            "prefetch" => Ok(Strategy::Prefetch),
            other => Err(BenchError::invalid(format!(
                "unknown mode '{other}' (expected lazy, eager or prefetch)"
            ))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
