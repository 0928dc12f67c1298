#![no_std]

pub mod mmio;

pub use embedded_hal::delay::DelayNs;
pub use mmio::{MmioMemory, MmioRegisters};

/// 32-bit access to one register window (compositor or timing controller).
///
/// Offsets are byte offsets from the start of the window. Accesses cannot
/// fail.
pub trait RegisterIo {
    /// Read the register at `offset`.
    ///
    /// On hardware without readback this returns whatever the bus returns;
    /// callers that need the last written value go through a shadow.
    fn read32(&self, offset: u32) -> u32;

    /// Write `value` to the register at `offset`.
    fn write32(&mut self, offset: u32, value: u32);
}

/// Write access to the video memory pool shared by all layers.
///
/// Offsets are byte offsets from the pool base. Multi-byte values are stored
/// little-endian. Writes past the end of the pool are dropped.
pub trait VideoMemory {
    /// Size of the pool in bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_u8(&mut self, offset: usize, value: u8);

    fn write_u16(&mut self, offset: usize, value: u16);

    fn write_u32(&mut self, offset: usize, value: u32);
}

impl<T: RegisterIo + ?Sized> RegisterIo for &mut T {
    fn read32(&self, offset: u32) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&mut self, offset: u32, value: u32) {
        (**self).write32(offset, value);
    }
}
