// src/error.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy for a benchmark run.
//!
//! Every variant is a whole-run condition. `PlatformUnsupported` is the only
//! one the harness absorbs: it degrades the prefetch strategy instead of
//! aborting the run.

use thiserror::Error;

use crate::constants::{EXIT_ALLOCATION_FAILURE, EXIT_INVALID_ARGUMENT, EXIT_OS_ERROR};

#[derive(Debug, Error)]
pub enum BenchError {
    /// Missing or unrecognized mode, or an out-of-range option.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The block could not be allocated.
    #[error("failed to allocate {bytes} bytes for {elements} elements")]
    AllocationFailure { elements: usize, bytes: usize },

    /// The host has no facility for the requested operation.
    #[error("not supported on this platform: {0}")]
    PlatformUnsupported(&'static str),

    #[error("os error: {0}")]
    Os(#[from] std::io::Error),
}

impl BenchError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Process exit code for this error, see `constants::EXIT_*`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => EXIT_INVALID_ARGUMENT,
            Self::AllocationFailure { .. } => EXIT_ALLOCATION_FAILURE,
            Self::PlatformUnsupported(_) | Self::Os(_) => EXIT_OS_ERROR,
        }
    }
}

pub type Result<T, E = BenchError> = std::result::Result<T, E>;
