// src/prefetch.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
//
//! Advisory page prefetch
//!
//! Asks the kernel to back a block's pages with physical memory ahead of
//! access. Where the host only offers a hint, the request may return before
//! any page is resident, and the harness never waits for it.
//!
//! On Linux `MADV_WILLNEED` only reads back swapped-out pages; it leaves
//! never-touched anonymous pages alone. Linux therefore populates with
//! `MADV_POPULATE_WRITE` (5.14+) and reports older kernels as unsupported.

use std::fmt;

use crate::error::{BenchError, Result};
use crate::memory::MemoryBlock;

/// Issues a best-effort, non-blocking prefetch request for a block.
pub trait PageTouchAdvisor {
    /// Fire-and-forget prefetch of `block`.
    ///
    /// # Errors
    /// * `PlatformUnsupported` when the host has no prefetch facility
    /// * `Os` when the host rejected the request
    fn prefetch(&self, block: &MemoryBlock) -> Result<()>;
}

impl<T: PageTouchAdvisor + ?Sized> PageTouchAdvisor for &T {
    fn prefetch(&self, block: &MemoryBlock) -> Result<()> {
        (**self).prefetch(block)
    }
}

/// What happened to a prefetch request, as shown in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefetchStatus {
    Issued,
    /// No facility on this host; the strategy ran as a no-op.
    Unsupported(&'static str),
    /// The host rejected the hint; the strategy ran as a no-op.
    Failed(String),
}

impl PrefetchStatus {
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Issued)
    }
}

impl From<Result<()>> for PrefetchStatus {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => Self::Issued,
            Err(BenchError::PlatformUnsupported(reason)) => Self::Unsupported(reason),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

impl fmt::Display for PrefetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issued => f.write_str("issued"),
            Self::Unsupported(reason) => write!(f, "unsupported: {reason}"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// [`PageTouchAdvisor`] backed by the host OS.
///
/// # Platform Support
/// - Linux 5.14+: `madvise(MADV_POPULATE_WRITE)`; older kernels get
///   `MADV_WILLNEED` and an `Unsupported` status
/// - Android/Apple/FreeBSD: `madvise(MADV_WILLNEED)`
/// - Windows: `PrefetchVirtualMemory`
/// - Other platforms: `PlatformUnsupported`
#[derive(Debug, Clone, Copy, Default)]
pub struct OsAdvisor;

impl PageTouchAdvisor for OsAdvisor {
    fn prefetch(&self, block: &MemoryBlock) -> Result<()> {
        os_prefetch(block)
    }
}

/// [`PageTouchAdvisor`] for hosts without a prefetch facility.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedAdvisor;

impl PageTouchAdvisor for UnsupportedAdvisor {
    fn prefetch(&self, _block: &MemoryBlock) -> Result<()> {
        Err(BenchError::PlatformUnsupported("no prefetch facility"))
    }
}

// From linux/mman-common.h; not exported by every libc release.
#[cfg(target_os = "linux")]
const MADV_POPULATE_WRITE: libc::c_int = 23;

#[cfg(target_os = "linux")]
fn os_prefetch(block: &MemoryBlock) -> Result<()> {
    match advise(block, MADV_POPULATE_WRITE) {
        Ok(()) => {
            tracing::debug!("madvise(MADV_POPULATE_WRITE) populated {} bytes", block.byte_len());
            Ok(())
        }
        // Kernel older than 5.14.
        Err(e) if e.raw_os_error() == Some(libc::EINVAL) => {
            advise(block, libc::MADV_WILLNEED)?;
            tracing::debug!("MADV_POPULATE_WRITE rejected, fell back to MADV_WILLNEED");
            Err(BenchError::PlatformUnsupported(
                "MADV_WILLNEED does not populate anonymous memory",
            ))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(any(target_os = "android", target_vendor = "apple", target_os = "freebsd"))]
fn os_prefetch(block: &MemoryBlock) -> Result<()> {
    advise(block, libc::MADV_WILLNEED)?;
    tracing::debug!("madvise(MADV_WILLNEED) issued for {} bytes", block.byte_len());
    Ok(())
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_vendor = "apple",
    target_os = "freebsd"
))]
fn advise(block: &MemoryBlock, advice: libc::c_int) -> std::io::Result<()> {
    // Block is page-aligned, as madvise requires.
    let addr = block.as_ptr().cast_mut().cast::<libc::c_void>();
    // SAFETY: the range is exactly the block's live allocation; neither advice
    // used here changes its contents.
    let rc = unsafe { libc::madvise(addr, block.byte_len(), advice) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(windows)]
fn os_prefetch(block: &MemoryBlock) -> Result<()> {
    use windows_sys::Win32::System::Memory::{PrefetchVirtualMemory, WIN32_MEMORY_RANGE_ENTRY};
    use windows_sys::Win32::System::Threading::GetCurrentProcess;

    let range = WIN32_MEMORY_RANGE_ENTRY {
        VirtualAddress: block.as_ptr().cast_mut().cast(),
        NumberOfBytes: block.byte_len(),
    };
    // SAFETY: one valid range entry describing the block's live allocation.
    let ok = unsafe { PrefetchVirtualMemory(GetCurrentProcess(), 1, &range, 0) };
    if ok == 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    tracing::debug!("PrefetchVirtualMemory issued for {} bytes", block.byte_len());
    Ok(())
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_vendor = "apple",
    target_os = "freebsd",
    windows
)))]
fn os_prefetch(block: &MemoryBlock) -> Result<()> {
    UnsupportedAdvisor.prefetch(block)
}
