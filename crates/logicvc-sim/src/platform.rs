//! In-memory stand-ins for the register windows, the video memory pool and
//! the delay source.

use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use logicvc_hal::{DelayNs, RegisterIo, VideoMemory};
use logicvc_registers::map::REGISTERS_RANGE;

/// Size of the timing controller window.
pub const VTC_WINDOW: u32 = 0x100;

/// A register window that remembers every value written to it.
#[derive(Debug, Clone)]
pub struct SimRegisters {
    len: u32,
    values: BTreeMap<u32, u32>,
}

impl SimRegisters {
    /// The compositor's own window.
    pub fn compositor() -> Self {
        Self::with_len(REGISTERS_RANGE)
    }

    /// An external timing controller window.
    pub fn timing_controller() -> Self {
        Self::with_len(VTC_WINDOW)
    }

    fn with_len(len: u32) -> Self {
        Self {
            len,
            values: BTreeMap::new(),
        }
    }

    /// Registers written so far, by ascending offset.
    pub fn written(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.values.iter().map(|(o, v)| (*o, *v))
    }
}

impl RegisterIo for SimRegisters {
    fn read32(&self, offset: u32) -> u32 {
        self.values.get(&offset).copied().unwrap_or(0)
    }

    fn write32(&mut self, offset: u32, value: u32) {
        if offset >= self.len {
            log::warn!("write {value:#010x} to {offset:#06x} outside the window, dropped");
            return;
        }
        self.values.insert(offset, value);
    }
}

/// The video memory pool as a byte vector.
#[derive(Debug, Clone)]
pub struct SimMemory {
    bytes: Vec<u8>,
}

impl SimMemory {
    pub fn new(len: usize) -> Self {
        Self {
            bytes: vec![0; len],
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn store(&mut self, offset: usize, value: &[u8]) {
        let end = offset.saturating_add(value.len());
        if let Some(dst) = self.bytes.get_mut(offset..end) {
            dst.copy_from_slice(value);
        }
    }
}

impl VideoMemory for SimMemory {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn write_u8(&mut self, offset: usize, value: u8) {
        self.store(offset, &[value]);
    }

    fn write_u16(&mut self, offset: usize, value: u16) {
        self.store(offset, &value.to_le_bytes());
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        self.store(offset, &value.to_le_bytes());
    }
}

/// Delay source that accounts for the requested time and optionally sleeps.
#[derive(Debug, Clone, Default)]
pub struct SimDelay {
    sleep: bool,
    elapsed_ns: u64,
}

impl SimDelay {
    pub fn new(sleep: bool) -> Self {
        Self {
            sleep,
            elapsed_ns: 0,
        }
    }

    /// Total delay requested by the driver.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_ns)
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
        if self.sleep {
            thread::sleep(Duration::from_nanos(u64::from(ns)));
        }
    }
}
