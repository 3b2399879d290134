// src/faults.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-process page-fault counter
//!
//! # Platform Support
//!
//! - **Unix**: `getrusage(RUSAGE_SELF)`, minor + major faults
//! - **Windows**: `GetProcessMemoryInfo().PageFaultCount`
//! - **Other platforms**: no counter; [`OsFaultCounter::page_faults`] returns `None`

/// Reader for the current process's cumulative page-fault count.
pub trait FaultCounter {
    /// Cumulative fault count, or `None` if the platform exposes no counter
    /// (or the read failed). Callers must omit fault figures on `None`.
    fn page_faults(&self) -> Option<u64>;
}

/// [`FaultCounter`] reading the host OS's accounting.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFaultCounter;

impl FaultCounter for OsFaultCounter {
    fn page_faults(&self) -> Option<u64> {
        read_page_faults()
    }
}

/// [`FaultCounter`] for hosts with no counter; always `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaultCounter;

impl FaultCounter for NoFaultCounter {
    fn page_faults(&self) -> Option<u64> {
        None
    }
}

#[cfg(unix)]
fn read_page_faults() -> Option<u64> {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::uninit();
    // SAFETY: getrusage writes a full rusage on success.
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if rc != 0 {
        tracing::warn!("getrusage failed: {}", std::io::Error::last_os_error());
        return None;
    }
    // SAFETY: rc == 0, so the struct was initialized.
    let usage = unsafe { usage.assume_init() };
    let minor = u64::try_from(usage.ru_minflt).ok()?;
    let major = u64::try_from(usage.ru_majflt).ok()?;
    Some(minor + major)
}

#[cfg(windows)]
fn read_page_faults() -> Option<u64> {
    use windows_sys::Win32::System::ProcessStatus::{GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS};
    use windows_sys::Win32::System::Threading::GetCurrentProcess;

    let mut counters = std::mem::MaybeUninit::<PROCESS_MEMORY_COUNTERS>::uninit();
    let size = std::mem::size_of::<PROCESS_MEMORY_COUNTERS>() as u32;
    // SAFETY: the pseudo-handle is always valid and `counters` holds `size` bytes.
    let ok = unsafe { GetProcessMemoryInfo(GetCurrentProcess(), counters.as_mut_ptr(), size) };
    if ok == 0 {
        tracing::warn!("GetProcessMemoryInfo failed: {}", std::io::Error::last_os_error());
        return None;
    }
    // SAFETY: the call succeeded.
    let counters = unsafe { counters.assume_init() };
    Some(u64::from(counters.PageFaultCount))
}

#[cfg(not(any(unix, windows)))]
fn read_page_faults() -> Option<u64> {
    None
}
