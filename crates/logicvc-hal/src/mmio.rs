//! Memory-mapped implementations of the access traits.
//!
//! Every access is volatile. Accesses outside the mapped length are dropped
//! (reads return 0). Misaligned pool stores are split into byte stores.

use core::ptr::NonNull;

use crate::{RegisterIo, VideoMemory};

/// Pointer to `size` bytes at `offset`, if they lie inside `len`.
fn window(base: NonNull<u8>, len: usize, offset: usize, size: usize) -> Option<*mut u8> {
    let end = offset.checked_add(size)?;
    if end > len {
        return None;
    }
    // SAFETY: `offset + size <= len` and the window spans `len` bytes.
    Some(unsafe { base.as_ptr().add(offset) })
}

/// Volatile little-endian store of `bytes`, one byte at a time.
///
/// # Safety
///
/// `ptr` must be valid for `bytes.len()` bytes of writes.
unsafe fn store_bytes(ptr: *mut u8, bytes: &[u8]) {
    for (i, byte) in bytes.iter().enumerate() {
        // SAFETY: `i < bytes.len()` per the caller's contract.
        unsafe { ptr.add(i).write_volatile(*byte) }
    }
}

/// A mapped register window.
pub struct MmioRegisters {
    base: NonNull<u8>,
    len: usize,
}

// SAFETY: the window is device memory owned by this handle; every access is a
// single volatile load or store.
unsafe impl Send for MmioRegisters {}

impl MmioRegisters {
    /// Wrap a mapped register window.
    ///
    /// Returns `None` for a null base, which is how an unmapped window shows up.
    ///
    /// # Safety
    ///
    /// `base` must point to `len` bytes of mapped device registers, aligned to
    /// 4 bytes, that stay mapped and are not accessed through any other handle
    /// for the lifetime of the returned value.
    #[must_use]
    pub unsafe fn new(base: *mut u8, len: usize) -> Option<Self> {
        NonNull::new(base).map(|base| Self { base, len })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl RegisterIo for MmioRegisters {
    fn read32(&self, offset: u32) -> u32 {
        match window(self.base, self.len, offset as usize, 4) {
            // SAFETY: in bounds; alignment per the constructor contract.
            Some(ptr) => unsafe { ptr.cast::<u32>().read_volatile() },
            None => 0,
        }
    }

    fn write32(&mut self, offset: u32, value: u32) {
        if let Some(ptr) = window(self.base, self.len, offset as usize, 4) {
            // SAFETY: in bounds; alignment per the constructor contract.
            unsafe { ptr.cast::<u32>().write_volatile(value) }
        }
    }
}

/// A mapped video memory pool.
pub struct MmioMemory {
    base: NonNull<u8>,
    len: usize,
}

// SAFETY: see `MmioRegisters`.
unsafe impl Send for MmioMemory {}

impl MmioMemory {
    /// Wrap a mapped video memory pool.
    ///
    /// # Safety
    ///
    /// Same contract as [`MmioRegisters::new`].
    #[must_use]
    pub unsafe fn new(base: *mut u8, len: usize) -> Option<Self> {
        NonNull::new(base).map(|base| Self { base, len })
    }
}

impl VideoMemory for MmioMemory {
    fn len(&self) -> usize {
        self.len
    }

    fn write_u8(&mut self, offset: usize, value: u8) {
        if let Some(ptr) = window(self.base, self.len, offset, 1) {
            // SAFETY: in bounds.
            unsafe { ptr.write_volatile(value) }
        }
    }

    fn write_u16(&mut self, offset: usize, value: u16) {
        let Some(ptr) = window(self.base, self.len, offset, 2) else {
            return;
        };
        let ptr16 = ptr.cast::<u16>();
        if ptr16.is_aligned() {
            // SAFETY: in bounds and aligned.
            unsafe { ptr16.write_volatile(value.to_le()) }
        } else {
            // SAFETY: in bounds.
            unsafe { store_bytes(ptr, &value.to_le_bytes()) }
        }
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        let Some(ptr) = window(self.base, self.len, offset, 4) else {
            return;
        };
        let ptr32 = ptr.cast::<u32>();
        if ptr32.is_aligned() {
            // SAFETY: in bounds and aligned.
            unsafe { ptr32.write_volatile(value.to_le()) }
        } else {
            // SAFETY: in bounds.
            unsafe { store_bytes(ptr, &value.to_le_bytes()) }
        }
    }
}
