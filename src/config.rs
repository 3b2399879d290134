// src/config.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use clap::ValueEnum;

use crate::constants::{DEFAULT_ELEMENTS, DEFAULT_FILL_BYTE, DEFAULT_SEED, DEFAULT_STRIDE};
use crate::error::{BenchError, Result};
use crate::strategy::Strategy;

/// Value written to each visited element by the access loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum WritePattern {
    /// Pseudo-random `i32` from a seeded generator
    #[default]
    Random,
    /// The element's index, truncated to `i32`
    Index,
}

/// Parameters for one benchmark run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    pub strategy:   Strategy,
    pub elements:   usize,   // block length in i32 elements
    pub stride:     usize,   // distance between visited elements; 1 = every element
    pub fill_byte:  u8,      // eager strategy only
    pub pattern:    WritePattern,
    pub seed:       u64,     // random pattern only
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            strategy:  Strategy::Lazy,
            elements:  DEFAULT_ELEMENTS,
            stride:    DEFAULT_STRIDE,
            fill_byte: DEFAULT_FILL_BYTE,
            pattern:   WritePattern::Random,
            seed:      DEFAULT_SEED,
        }
    }
}

impl BenchConfig {
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy, ..Self::default() }
    }

    pub fn with_elements(mut self, elements: usize) -> Self {
        self.elements = elements;
        self
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_fill_byte(mut self, fill_byte: u8) -> Self {
        self.fill_byte = fill_byte;
        self
    }

    pub fn with_pattern(mut self, pattern: WritePattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject configurations that cannot run. Called before anything is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.elements == 0 {
            return Err(BenchError::invalid("element count must be positive"));
        }
        if self.stride == 0 {
            return Err(BenchError::invalid("stride must be positive"));
        }
        Ok(())
    }

    /// Number of elements the access loop visits: `ceil(elements / stride)`.
    pub fn touched_elements(&self) -> usize {
        if self.stride == 0 {
            return 0;
        }
        self.elements.div_ceil(self.stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_primary_variant() {
        let config = BenchConfig::default();
        assert_eq!(config.elements, 10_000_000);
        assert_eq!(config.stride, 1000);
        assert_eq!(config.fill_byte, 0);
        assert_eq!(config.pattern, WritePattern::Random);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let config = BenchConfig::new(Strategy::Eager)
            .with_elements(100_000)
            .with_stride(1)
            .with_fill_byte(0xFF)
            .with_pattern(WritePattern::Index)
            .with_seed(7);

        assert_eq!(config.strategy, Strategy::Eager);
        assert_eq!(config.elements, 100_000);
        assert_eq!(config.stride, 1);
        assert_eq!(config.fill_byte, 0xFF);
        assert_eq!(config.pattern, WritePattern::Index);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn zero_values_are_invalid() {
        let err = BenchConfig::default().with_elements(0).validate().unwrap_err();
        assert!(matches!(err, BenchError::InvalidArgument(_)));
        let err = BenchConfig::default().with_stride(0).validate().unwrap_err();
        assert!(matches!(err, BenchError::InvalidArgument(_)));
    }

    #[test]
    fn touched_elements_rounds_up() {
        assert_eq!(BenchConfig::default().touched_elements(), 10_000);
        assert_eq!(BenchConfig::default().with_elements(1001).touched_elements(), 2);
        assert_eq!(BenchConfig::default().with_elements(5).with_stride(1).touched_elements(), 5);
    }
}
