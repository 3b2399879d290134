// src/access.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The timed access loop.
//!
//! Visits `0, stride, 2*stride, ...` and, for each visited element, writes a
//! new value then reads it back into a wrapping accumulator. The write comes
//! first so that an untouched (lazy) element is never read uninitialized; it
//! is also the first touch of the page and therefore where a lazy block pays
//! its fault. The accumulator goes through `black_box` so the loop survives
//! optimization.

use std::hint::black_box;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::WritePattern;
use crate::error::{BenchError, Result};
use crate::memory::MemoryBlock;

/// What the access loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessSummary {
    /// Elements visited
    pub touched: usize,
    /// Wrapping sum of the values written
    pub checksum: i32,
}

/// Run the access loop over `block`.
///
/// # Errors
/// * `InvalidArgument` if `stride` is zero
pub fn run_access_loop(
    block: &mut MemoryBlock,
    stride: usize,
    pattern: WritePattern,
    seed: u64,
) -> Result<AccessSummary> {
    if stride == 0 {
        return Err(BenchError::invalid("stride must be positive"));
    }

    let len = block.len();
    let base = block.as_mut_ptr();
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut sum: i32 = 0;
    let mut touched = 0usize;

    for i in (0..len).step_by(stride) {
        let value = match pattern {
            WritePattern::Random => rng.random::<i32>(),
            WritePattern::Index => i as i32,
        };
        // SAFETY: i < len, and the element is written before it is read.
        unsafe {
            let slot = base.add(i);
            slot.write(value);
            sum = sum.wrapping_add(slot.read());
        }
        touched += 1;
    }

    let checksum = black_box(sum);
    Ok(AccessSummary { touched, checksum })
}
