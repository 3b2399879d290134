// src/memory.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
//
// The benchmark block: a page-aligned heap allocation that is never
// initialized by the allocator, so its pages stay unbacked until first touch.

use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

use crate::constants::ELEMENT_SIZE;
use crate::error::{BenchError, Result};
use crate::hardware;

/// Uninitialized, page-aligned block of `i32` elements.
///
/// The block is obtained with `std::alloc::alloc` rather than `alloc_zeroed`
/// so that no page is written before the harness decides how to touch it.
/// Large requests are served by the system allocator straight from fresh
/// anonymous mappings, which the kernel backs lazily.
///
/// The block never hands out a `&[i32]`: its memory may be uninitialized.
#[derive(Debug)]
pub struct MemoryBlock {
    ptr: NonNull<i32>,
    elements: usize,
    layout: Layout,
}

impl MemoryBlock {
    /// Allocate an uninitialized block of `elements` integers.
    ///
    /// # Errors
    /// * `InvalidArgument` if `elements` is zero
    /// * `AllocationFailure` if the byte size overflows or the allocator refuses
    pub fn allocate(elements: usize) -> Result<Self> {
        if elements == 0 {
            return Err(BenchError::invalid("element count must be positive"));
        }
        let bytes = elements
            .checked_mul(ELEMENT_SIZE)
            .ok_or(BenchError::AllocationFailure { elements, bytes: usize::MAX })?;
        let layout = Layout::from_size_align(bytes, hardware::page_size())
            .map_err(|_| BenchError::AllocationFailure { elements, bytes })?;

        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc(layout) };
        let ptr = NonNull::new(raw.cast::<i32>())
            .ok_or(BenchError::AllocationFailure { elements, bytes })?;

        tracing::debug!(
            "allocated {} elements ({} bytes, align {}) at {:p}",
            elements,
            bytes,
            layout.align(),
            ptr
        );
        Ok(Self { ptr, elements, layout })
    }

    /// Number of `i32` elements in the block
    pub fn len(&self) -> usize {
        self.elements
    }

    /// Always false: zero-sized blocks are rejected at allocation.
    pub fn is_empty(&self) -> bool {
        self.elements == 0
    }

    /// Size of the block in bytes
    pub fn byte_len(&self) -> usize {
        self.layout.size()
    }

    /// Pages the block spans
    pub fn pages(&self) -> usize {
        hardware::pages_spanned(self.byte_len())
    }

    pub fn as_ptr(&self) -> *const i32 {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut i32 {
        self.ptr.as_ptr()
    }

    /// Write `byte` to every byte of the block, forcing every page resident.
    pub fn fill_bytes(&mut self, byte: u8) {
        // SAFETY: the block owns `byte_len()` writable bytes starting at `ptr`.
        unsafe { std::ptr::write_bytes(self.ptr.as_ptr().cast::<u8>(), byte, self.byte_len()) };
    }

    /// Read the element at `index`, or `None` when out of bounds.
    ///
    /// # Safety
    /// The element must have been written (by [`write`](Self::write) or
    /// [`fill_bytes`](Self::fill_bytes)) since allocation.
    pub unsafe fn read(&self, index: usize) -> Option<i32> {
        if index >= self.elements {
            return None;
        }
        // SAFETY: index is in bounds and the caller guarantees it is initialized.
        Some(unsafe { self.ptr.as_ptr().add(index).read() })
    }

    /// Write `value` at `index`. Returns false when `index` is out of bounds.
    pub fn write(&mut self, index: usize, value: i32) -> bool {
        if index >= self.elements {
            return false;
        }
        // SAFETY: index is in bounds of the owned allocation.
        unsafe { self.ptr.as_ptr().add(index).write(value) };
        true
    }
}

impl Drop for MemoryBlock {
    fn drop(&mut self) {
        tracing::debug!("releasing {} bytes at {:p}", self.byte_len(), self.ptr);
        // SAFETY: ptr was returned by `alloc` with this exact layout.
        unsafe {
            dealloc(self.ptr.as_ptr().cast::<u8>(), self.layout);
        }
    }
}
