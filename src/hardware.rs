// src/hardware.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page size detection
//!
//! Runtime detection of the virtual-memory page size. The value is read once
//! from the OS and cached; platforms where detection is unavailable or
//! returns nonsense get [`DEFAULT_PAGE_SIZE`].
//!
//! # Usage
//!
//! ```rust
//! use pagetouch::hardware;
//!
//! let page = hardware::page_size();
//! assert!(page.is_power_of_two());
//! assert_eq!(hardware::pages_spanned(page + 1), 2);
//! ```

use once_cell::sync::Lazy;

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};

static PAGE_SIZE: Lazy<usize> = Lazy::new(|| {
    let detected = detect_page_size();
    let size = validate_page_size(detected);
    if Some(size) != detected {
        tracing::debug!("page size detection returned {:?}, using {}", detected, size);
    }
    size
});

/// Get the system page size in bytes.
///
/// # Platform Support
///
/// - **Unix**: `sysconf(_SC_PAGESIZE)`
/// - **Windows**: `GetSystemInfo().dwPageSize`
/// - **Other platforms**: [`DEFAULT_PAGE_SIZE`]
pub fn page_size() -> usize {
    *PAGE_SIZE
}

/// Number of pages needed to hold `bytes`, i.e. `ceil(bytes / page_size())`.
pub fn pages_spanned(bytes: usize) -> usize {
    bytes.div_ceil(page_size())
}

/// Accept a detected page size only when it is a power of two within
/// `[MIN_PAGE_SIZE, MAX_PAGE_SIZE]`.
fn validate_page_size(detected: Option<usize>) -> usize {
    match detected {
        Some(size) if (MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&size) && size.is_power_of_two() => size,
        _ => DEFAULT_PAGE_SIZE,
    }
}

#[cfg(unix)]
fn detect_page_size() -> Option<usize> {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    usize::try_from(size).ok()
}

#[cfg(windows)]
fn detect_page_size() -> Option<usize> {
    use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

    // SAFETY: GetSystemInfo fills the whole struct; all-zero is a valid bit pattern for it.
    let info = unsafe {
        let mut info: SYSTEM_INFO = std::mem::zeroed();
        GetSystemInfo(&mut info);
        info
    };
    usize::try_from(info.dwPageSize).ok()
}

#[cfg(not(any(unix, windows)))]
fn detect_page_size() -> Option<usize> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detected_page_size_is_sane() {
        let size = page_size();
        assert!(size.is_power_of_two());
        assert!(size >= MIN_PAGE_SIZE && size <= MAX_PAGE_SIZE);
    }

    #[test]
    fn invalid_detection_falls_back() {
        assert_eq!(validate_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(validate_page_size(Some(0)), DEFAULT_PAGE_SIZE);
        assert_eq!(validate_page_size(Some(3000)), DEFAULT_PAGE_SIZE);
        assert_eq!(validate_page_size(Some(256)), DEFAULT_PAGE_SIZE);
        assert_eq!(validate_page_size(Some(16384)), 16384);
    }

    #[test]
    fn pages_spanned_rounds_up() {
        let page = page_size();
        assert_eq!(pages_spanned(0), 0);
        assert_eq!(pages_spanned(1), 1);
        assert_eq!(pages_spanned(page), 1);
        assert_eq!(pages_spanned(page + 1), 2);
        assert_eq!(pages_spanned(10 * page), 10);
    }
}
