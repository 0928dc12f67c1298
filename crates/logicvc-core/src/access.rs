//! Register access strategies.
//!
//! Some compositor builds cannot read their registers back. Those devices get
//! a [`ShadowAccess`] that mirrors every write in memory and answers reads from
//! the mirror; everything else gets a [`DirectAccess`]. The choice is made once
//! at construction and callers only ever see `dyn RegisterAccess`.

use log::trace;
use logicvc_hal::RegisterIo;
use logicvc_registers::map::{self, REGISTER_STRIDE};

const COMMON_SLOTS: usize = (map::common::SIZE / REGISTER_STRIDE) as usize;
const LAYER_SLOTS: usize = (map::layer::SIZE / REGISTER_STRIDE) as usize;

/// Register block a shadowed register belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterBlock {
    Common,
    Layer(u8),
}

impl RegisterBlock {
    /// Window offset of the block.
    #[must_use]
    pub const fn base(self) -> u32 {
        match self {
            Self::Common => 0,
            Self::Layer(id) => map::layer_base(id),
        }
    }
}

/// Uniform get/set of a register inside a block.
pub trait RegisterAccess: Send {
    /// Current value of the register at `offset` within `block`.
    fn get(&self, io: &dyn RegisterIo, block: RegisterBlock, offset: u32) -> u32;

    /// Write `value` to the register at `offset` within `block`.
    fn set(&mut self, io: &mut dyn RegisterIo, block: RegisterBlock, offset: u32, value: u32);

    /// True when reads never reach the hardware.
    fn is_shadowed(&self) -> bool;
}

/// Pass-through access for hardware with register readback.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectAccess;

impl RegisterAccess for DirectAccess {
    fn get(&self, io: &dyn RegisterIo, block: RegisterBlock, offset: u32) -> u32 {
        io.read32(block.base() + offset)
    }

    fn set(&mut self, io: &mut dyn RegisterIo, block: RegisterBlock, offset: u32, value: u32) {
        io.write32(block.base() + offset, value);
    }

    fn is_shadowed(&self) -> bool {
        false
    }
}

/// In-memory mirror of write-only registers.
///
/// One slot per register, indexed by `offset / REGISTER_STRIDE` inside the
/// common block or inside the addressed layer's block.
#[derive(Debug, Clone)]
pub struct ShadowAccess {
    common: [u32; COMMON_SLOTS],
    layers: Vec<[u32; LAYER_SLOTS]>,
}

impl ShadowAccess {
    #[must_use]
    pub fn new(layers: usize) -> Self {
        Self {
            common: [0; COMMON_SLOTS],
            layers: vec![[0; LAYER_SLOTS]; layers],
        }
    }

    fn slot(&self, block: RegisterBlock, offset: u32) -> Option<&u32> {
        let index = (offset / REGISTER_STRIDE) as usize;
        match block {
            RegisterBlock::Common => self.common.get(index),
            RegisterBlock::Layer(id) => self.layers.get(usize::from(id))?.get(index),
        }
    }

    fn slot_mut(&mut self, block: RegisterBlock, offset: u32) -> Option<&mut u32> {
        let index = (offset / REGISTER_STRIDE) as usize;
        match block {
            RegisterBlock::Common => self.common.get_mut(index),
            RegisterBlock::Layer(id) => self.layers.get_mut(usize::from(id))?.get_mut(index),
        }
    }
}

impl RegisterAccess for ShadowAccess {
    fn get(&self, _io: &dyn RegisterIo, block: RegisterBlock, offset: u32) -> u32 {
        self.slot(block, offset).copied().unwrap_or(0)
    }

    fn set(&mut self, io: &mut dyn RegisterIo, block: RegisterBlock, offset: u32, value: u32) {
        match self.slot_mut(block, offset) {
            Some(slot) => *slot = value,
            None => trace!("no shadow slot for {block:?}+{offset:#x}"),
        }
        io.write32(block.base() + offset, value);
    }

    fn is_shadowed(&self) -> bool {
        true
    }
}

/// Pick the access strategy for a device.
#[must_use]
pub fn select(readable_regs: bool, layers: usize) -> Box<dyn RegisterAccess> {
    if readable_regs {
        Box::new(DirectAccess)
    } else {
        Box::new(ShadowAccess::new(layers))
    }
}
