// src/constants.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
//
// Centralized constants for pagetouch to avoid hardcoded values throughout the codebase

/// Default page size fallback when system detection fails (4096 bytes)
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Smallest page size accepted from the OS before falling back to the default
pub const MIN_PAGE_SIZE: usize = 512;

/// Largest page size accepted from the OS before falling back to the default (1 MiB)
pub const MAX_PAGE_SIZE: usize = 1024 * 1024;

/// Size in bytes of one block element (`i32`)
pub const ELEMENT_SIZE: usize = std::mem::size_of::<i32>();

/// Default number of elements in the benchmark block (40 MB of `i32`)
pub const DEFAULT_ELEMENTS: usize = 10_000_000;

/// Default distance, in elements, between two visited elements of the access loop.
///
/// 1000 elements is 4000 bytes, which is below a 4 KiB page, so every page
/// of the block is still touched once.
pub const DEFAULT_STRIDE: usize = 1000;

/// Default byte written by the eager strategy.
///
/// `memset` truncates its value to a byte, so filling with `INT_MIN` writes zeros.
pub const DEFAULT_FILL_BYTE: u8 = 0x00;

/// Default seed for the random write pattern, fixed so runs are reproducible
pub const DEFAULT_SEED: u64 = 0x5EED_0F_FA_0175;

// ============================================================================
// Process exit codes
// ============================================================================

/// Run completed (including degraded prefetch or missing fault counter)
pub const EXIT_SUCCESS: i32 = 0;

/// Missing or unrecognized mode, or a bad option value.
/// Matches the code clap uses for usage errors.
pub const EXIT_INVALID_ARGUMENT: i32 = 2;

/// The benchmark block could not be allocated
pub const EXIT_ALLOCATION_FAILURE: i32 = 3;

/// Any other OS-level failure
pub const EXIT_OS_ERROR: i32 = 4;

// ============================================================================
// Environment variables
// ============================================================================

pub const ENV_ELEMENTS: &str = "PAGETOUCH_ELEMENTS";
pub const ENV_STRIDE: &str = "PAGETOUCH_STRIDE";
pub const ENV_FILL_BYTE: &str = "PAGETOUCH_FILL_BYTE";
pub const ENV_PATTERN: &str = "PAGETOUCH_PATTERN";
pub const ENV_SEED: &str = "PAGETOUCH_SEED";
