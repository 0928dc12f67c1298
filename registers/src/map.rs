//! Address map of the compositor register window
//!
//! All registers are 32 bits wide and placed on an 8-byte stride. The window
//! holds one common block, one block per layer, and two palette (CLUT) tables
//! per layer.

/// Distance in bytes between consecutive registers.
pub const REGISTER_STRIDE: u32 = 8;

/// Size of the whole register window in bytes.
pub const REGISTERS_RANGE: u32 = 0x6000;

/// Common block: display timing, control and power registers.
pub mod common {
    pub const SHSY_FP: u32 = 0x00;
    pub const SHSY: u32 = 0x08;
    pub const SHSY_BP: u32 = 0x10;
    pub const SHSY_RES: u32 = 0x18;
    pub const SVSY_FP: u32 = 0x20;
    pub const SVSY: u32 = 0x28;
    pub const SVSY_BP: u32 = 0x30;
    pub const SVSY_RES: u32 = 0x38;
    pub const CTRL: u32 = 0x40;
    pub const DTYPE: u32 = 0x48;
    pub const BACKGROUND: u32 = 0x50;
    pub const DOUBLE_CLUT: u32 = 0x58;
    pub const INT_STAT: u32 = 0x60;
    pub const INT_MASK: u32 = 0x68;
    pub const SPWRCTRL: u32 = 0x78;
    pub const IP_VERSION: u32 = 0xF8;

    /// Byte size of the common block.
    pub const SIZE: u32 = 0x100;
}

/// Per-layer block, relative to [`layer_base`].
pub mod layer {
    pub const HOR_OFF: u32 = 0x00;
    pub const VER_OFF: u32 = 0x08;
    pub const HOR_POS: u32 = 0x10;
    pub const VER_POS: u32 = 0x18;
    pub const WIDTH: u32 = 0x20;
    pub const HEIGHT: u32 = 0x28;
    pub const ALPHA: u32 = 0x30;
    pub const CTRL: u32 = 0x38;
    pub const TRANSP: u32 = 0x40;

    /// Byte size of one layer block.
    pub const SIZE: u32 = 0x80;
}

/// External video timing controller window.
pub mod vtc {
    pub const CTL: u32 = 0x00;
    pub const GASIZE: u32 = 0x60;
    pub const GPOL: u32 = 0x6C;
    pub const GHSIZE: u32 = 0x70;
    pub const GVSIZE: u32 = 0x74;
    pub const GHSYNC: u32 = 0x78;
    pub const GVBHOFF_F0: u32 = 0x7C;
    pub const GVSYNC_F0: u32 = 0x80;
    pub const GVSHOFF_F0: u32 = 0x84;
    pub const GVBHOFF_F1: u32 = 0x88;
    pub const GVSYNC_F1: u32 = 0x8C;
    pub const GVSHOFF_F1: u32 = 0x90;

    pub const CTL_SW_ENABLE: u32 = 1 << 0;
    pub const CTL_REG_UPDATE: u32 = 1 << 1;
    pub const CTL_GEN_ENABLE: u32 = 1 << 2;
}

/// Offset of layer 0's block.
pub const LAYER_BASE: u32 = 0x100;

/// Offset of the first palette table.
pub const CLUT_BASE: u32 = 0x1000;
/// Bytes occupied by one palette table.
pub const CLUT_TABLE_SIZE: u32 = 0x800;
/// Palette tables per layer (double buffered).
pub const CLUTS_PER_LAYER: u32 = 2;
/// Entries per palette table.
pub const CLUT_ENTRIES: usize = 256;
/// Bytes between consecutive palette entries.
pub const CLUT_ENTRY_SIZE: u32 = 8;

/// Maximum number of layers the compositor can be synthesized with.
pub const MAX_LAYERS: usize = 5;
/// Maximum number of frame buffers per layer.
pub const MAX_LAYER_BUFFERS: u32 = 3;
/// Hardware ceiling on addressable lines per layer.
pub const MAX_LINES: u32 = 2048;

pub const MIN_XRES: u32 = 64;
pub const MAX_XRES: u32 = 2048;
pub const MIN_YRES: u32 = 1;
pub const MAX_YRES: u32 = 2048;

/// Default transparent color keys, per stored pixel format.
pub mod transparent {
    pub const COLOR_8BPP: u32 = 0x03;
    pub const COLOR_8BPP_CLUT_16: u32 = 0xF81F;
    pub const COLOR_8BPP_CLUT_32: u32 = 0x00FF_00FF;
    pub const COLOR_16BPP: u32 = 0xF81F;
    pub const COLOR_32BPP: u32 = 0x00FF_00FF;
}

/// Offset of a layer's register block.
#[inline(always)]
#[must_use]
pub const fn layer_base(layer: u8) -> u32 {
    LAYER_BASE + layer as u32 * layer::SIZE
}

/// Offset of one of a layer's palette tables.
#[inline(always)]
#[must_use]
pub const fn clut_base(layer: u8, table: u8) -> u32 {
    CLUT_BASE + (layer as u32 * CLUTS_PER_LAYER + table as u32) * CLUT_TABLE_SIZE
}

/// Register block an offset of the window falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Common,
    Layer(u8),
    Clut { layer: u8, table: u8 },
}

/// Split a window offset into its block and the offset relative to that block.
///
/// Returns `None` for offsets outside every block or not aligned to a register.
#[must_use]
pub const fn decode(offset: u32) -> Option<(Block, u32)> {
    if offset % 4 != 0 || offset >= REGISTERS_RANGE {
        return None;
    }
    if offset < common::SIZE {
        return Some((Block::Common, offset));
    }
    let layers_end = LAYER_BASE + MAX_LAYERS as u32 * layer::SIZE;
    if offset >= LAYER_BASE && offset < layers_end {
        let rel = offset - LAYER_BASE;
        return Some((Block::Layer((rel / layer::SIZE) as u8), rel % layer::SIZE));
    }
    let cluts_end = CLUT_BASE + MAX_LAYERS as u32 * CLUTS_PER_LAYER * CLUT_TABLE_SIZE;
    if offset >= CLUT_BASE && offset < cluts_end {
        let index = (offset - CLUT_BASE) / CLUT_TABLE_SIZE;
        return Some((
            Block::Clut {
                layer: (index / CLUTS_PER_LAYER) as u8,
                table: (index % CLUTS_PER_LAYER) as u8,
            },
            (offset - CLUT_BASE) % CLUT_TABLE_SIZE,
        ));
    }
    None
}
