//! Shared mock hardware for the device integration tests.
//!
//! Register windows keep a register file plus a log of every write so tests
//! can check both the final state and the programming order.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use logicvc_core::edid::DisplayDescriptor;
use logicvc_core::timing::{FoundMode, ModeDb, ModeLookup, VideoMode};
use logicvc_core::{AlphaMode, Device, DeviceConfig, LayerConfig, LayerType, Resources};
use logicvc_hal::{DelayNs, RegisterIo, VideoMemory};
use logicvc_registers::map::common::INT_STAT;

pub const POOL_BASE: u64 = 0x1000_0000;
/// Room for 2049 lines of 1024 pixels at 16 bpp, so the last-layer search
/// lands on its first step.
pub const POOL_SIZE: u64 = 4 * 1024 * 1024 + 2048;

/// Captured register write: (offset, value).
pub type WriteRecord = (u32, u32);

/// Register window mock. Reads return the register file unless the window is
/// built write-only, in which case they return garbage.
#[derive(Clone)]
pub struct MockRegs {
    writes: Arc<Mutex<Vec<WriteRecord>>>,
    file: Arc<Mutex<HashMap<u32, u32>>>,
    readable: bool,
}

impl MockRegs {
    pub fn new(readable: bool) -> Self {
        Self {
            writes: Arc::new(Mutex::new(Vec::new())),
            file: Arc::new(Mutex::new(HashMap::new())),
            readable,
        }
    }

    /// Make the hardware report `value` at `offset`, as a status bit would.
    pub fn set_value(&self, offset: u32, value: u32) {
        self.file.lock().unwrap().insert(offset, value);
    }

    pub fn get_writes(&self) -> Vec<WriteRecord> {
        self.writes.lock().unwrap().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.lock().unwrap().clear();
    }

    pub fn last_write_to(&self, offset: u32) -> Option<u32> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
    }

    pub fn writes_to(&self, offset: u32) -> Vec<u32> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
            .collect()
    }
}

impl RegisterIo for MockRegs {
    fn read32(&self, offset: u32) -> u32 {
        if !self.readable {
            return 0xDEAD_BEEF;
        }
        self.file.lock().unwrap().get(&offset).copied().unwrap_or(0)
    }

    fn write32(&mut self, offset: u32, value: u32) {
        self.writes.lock().unwrap().push((offset, value));
        let mut file = self.file.lock().unwrap();
        if offset == INT_STAT {
            // write-one-to-clear
            let pending = file.get(&offset).copied().unwrap_or(0);
            file.insert(offset, pending & !value);
        } else {
            file.insert(offset, value);
        }
    }
}

/// Video memory pool mock.
#[derive(Clone)]
pub struct MockMemory {
    pub bytes: Arc<Mutex<Vec<u8>>>,
}

impl MockMemory {
    pub fn new(len: usize) -> Self {
        Self {
            bytes: Arc::new(Mutex::new(vec![0; len])),
        }
    }

    pub fn u16_at(&self, offset: usize) -> u16 {
        let bytes = self.bytes.lock().unwrap();
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    pub fn u32_at(&self, offset: usize) -> u32 {
        let bytes = self.bytes.lock().unwrap();
        u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
    }

    pub fn u8_at(&self, offset: usize) -> u8 {
        self.bytes.lock().unwrap()[offset]
    }
}

impl VideoMemory for MockMemory {
    fn len(&self) -> usize {
        self.bytes.lock().unwrap().len()
    }

    fn write_u8(&mut self, offset: usize, value: u8) {
        self.bytes.lock().unwrap()[offset] = value;
    }

    fn write_u16(&mut self, offset: usize, value: u16) {
        self.bytes.lock().unwrap()[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        self.bytes.lock().unwrap()[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }
}

/// Delay source that only accumulates the requested time.
#[derive(Clone, Default)]
pub struct MockDelay {
    pub total_ns: Arc<Mutex<u64>>,
}

impl MockDelay {
    pub fn total_ms(&self) -> u64 {
        *self.total_ns.lock().unwrap() / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.lock().unwrap() += u64::from(ns);
    }
}

/// Built-in lookup that counts its calls and can be told to find nothing.
#[derive(Clone, Default)]
pub struct CountingLookup {
    pub calls: Arc<AtomicUsize>,
    pub refuse: Arc<AtomicBool>,
}

impl CountingLookup {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }
}

impl ModeLookup for CountingLookup {
    fn find_mode(
        &self,
        name: Option<&str>,
        db: &[VideoMode],
        default: Option<&VideoMode>,
        bpp: u32,
    ) -> Option<FoundMode> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.refuse.load(Ordering::SeqCst) {
            return None;
        }
        ModeDb.find_mode(name, db, default, bpp)
    }
}

pub type TestDevice = Device<MockRegs, MockMemory, MockDelay>;

/// Handles kept by a test after the device took ownership of its resources.
pub struct Harness {
    pub regs: MockRegs,
    pub vtc: Option<MockRegs>,
    pub vmem: MockMemory,
    pub delay: MockDelay,
    pub lookup: CountingLookup,
}

pub fn rgb_layer(offset: u32, data_width: u32, alpha_mode: AlphaMode) -> LayerConfig {
    LayerConfig {
        offset,
        buffer_offset: 768,
        row_stride: 1024,
        layer_type: LayerType::Rgb.bits(),
        alpha_mode: alpha_mode.bits(),
        data_width,
        abgr: false,
    }
}

/// One 16-bit RGB layer over the whole pool.
pub fn single_layer_config(readable_regs: bool) -> DeviceConfig {
    DeviceConfig {
        pool_base: POOL_BASE,
        pool_high: POOL_BASE + POOL_SIZE,
        readable_regs,
        power_on_delay_ms: 20,
        signal_on_delay_ms: 10,
        layers: vec![rgb_layer(0, 16, AlphaMode::Layer)],
        ..DeviceConfig::default()
    }
}

pub fn harness(readable: bool, with_vtc: bool) -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();
    Harness {
        regs: MockRegs::new(readable),
        vtc: with_vtc.then(|| MockRegs::new(true)),
        vmem: MockMemory::new(POOL_SIZE as usize),
        delay: MockDelay::default(),
        lookup: CountingLookup::default(),
    }
}

impl Harness {
    pub fn resources(
        &self,
        display: Option<Arc<dyn DisplayDescriptor>>,
    ) -> Resources<MockRegs, MockMemory, MockDelay> {
        Resources {
            regs: self.regs.clone(),
            vtc: self.vtc.clone(),
            vmem: self.vmem.clone(),
            delay: self.delay.clone(),
            display,
        }
    }
}

pub fn build_with_display(
    config: &DeviceConfig,
    display: Option<Arc<dyn DisplayDescriptor>>,
) -> (TestDevice, Harness) {
    let harness = harness(config.readable_regs, false);
    let device = Device::new(
        config,
        harness.resources(display),
        Box::new(harness.lookup.clone()),
    )
    .expect("device bring-up should succeed");
    (device, harness)
}

pub fn build(config: &DeviceConfig, readable: bool, with_vtc: bool) -> (TestDevice, Harness) {
    let harness = harness(readable, with_vtc);
    let device = Device::new(config, harness.resources(None), Box::new(harness.lookup.clone()))
        .expect("device bring-up should succeed");
    (device, harness)
}

/// EDID base block advertising 1280x720@60 with positive syncs.
pub fn edid_1280x720() -> [u8; 128] {
    let mut edid = [0u8; 128];
    edid[..8].copy_from_slice(&[0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00]);
    edid[18] = 1;
    edid[19] = 3;
    let dtd: [u8; 18] = [
        0x01, 0x1D, 0x00, 0x72, 0x51, 0xD0, 0x1E, 0x20, 0x6E, 0x28, 0x55, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x1E,
    ];
    edid[54..72].copy_from_slice(&dtd);
    let sum = edid[..127].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    edid[127] = 0u8.wrapping_sub(sum);
    edid
}

/// The single-layer device most tests start from.
pub fn make_device() -> (TestDevice, Harness) {
    build(&single_layer_config(true), true, false)
}
