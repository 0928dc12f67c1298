//! Per-layer control surface and raw register passthrough.

use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use logicvc_hal::{DelayNs, RegisterIo, VideoMemory};
use logicvc_registers::map::{self, common as common_regs, layer as layer_regs, Block};
use logicvc_registers::reg::Register;
use logicvc_registers::LayerCtrlReg;

use super::{lock, Device};
use crate::access::RegisterBlock;
use crate::edid::DisplayDescriptor;
use crate::error::{LogicvcError, Result};
use crate::AlphaMode;

/// Poll period while waiting for the display descriptor.
const DESCRIPTOR_POLL: Duration = Duration::from_millis(10);

/// A color either as a raw register value or as 8-bit RGB to be converted to
/// the target format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerColor {
    pub raw: u32,
    pub use_raw: bool,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl LayerColor {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            raw: 0,
            use_raw: false,
            r,
            g,
            b,
        }
    }

    #[must_use]
    pub const fn raw(raw: u32) -> Self {
        Self {
            raw,
            use_raw: true,
            r: 0,
            g: 0,
            b: 0,
        }
    }
}

/// Position and size of a layer on the output, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerGeometry {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Rectangle to fill with a color index or pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Pseudo-palette index on true-color layers, raw pixel value otherwise.
    pub color: u32,
}

const fn rgb332(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32 >> 5) << 5) | ((g as u32 >> 5) << 2) | (b as u32 >> 6)
}

const fn rgb565(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32 >> 3) << 11) | ((g as u32 >> 2) << 5) | (b as u32 >> 3)
}

const fn rgb888(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Convert a color to the transparent-color format of a layer.
const fn transparent_value(color: LayerColor, bpp_virt: u32, alpha_mode: AlphaMode) -> u32 {
    if color.use_raw {
        return color.raw;
    }
    let (r, g, b) = (color.r, color.g, color.b);
    match (bpp_virt, alpha_mode) {
        (8, AlphaMode::Clut16) => rgb565(r, g, b),
        (8, AlphaMode::Clut32) => rgb888(r, g, b),
        (8, _) => rgb332(r, g, b),
        (16, _) => rgb565(r, g, b),
        _ => rgb888(r, g, b),
    }
}

/// Convert a color to the background register format.
const fn background_value(color: LayerColor, bpp: u32) -> u32 {
    if color.use_raw {
        return color.raw;
    }
    match bpp {
        8 => rgb332(color.r, color.g, color.b),
        16 => rgb565(color.r, color.g, color.b),
        _ => rgb888(color.r, color.g, color.b),
    }
}

impl<R: RegisterIo, M: VideoMemory, D: DelayNs> Device<R, M, D> {
    /// Hardware index of a layer.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index.
    pub fn layer_index(&self, index: usize) -> Result<u8> {
        Ok(lock(self.layer(index)?).id)
    }

    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index.
    pub fn alpha(&self, index: usize) -> Result<u8> {
        let layer = lock(self.layer(index)?);
        let raw = lock(&self.common)
            .hw
            .get(RegisterBlock::Layer(layer.id), layer_regs::ALPHA);
        Ok(raw as u8)
    }

    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index.
    pub fn set_alpha(&self, index: usize, alpha: u8) -> Result<()> {
        let layer = lock(self.layer(index)?);
        lock(&self.common).hw.set(
            RegisterBlock::Layer(layer.id),
            layer_regs::ALPHA,
            u32::from(alpha),
        );
        Ok(())
    }

    /// Enable or disable the transparent-color key of a layer.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index.
    pub fn set_color_transparency(&self, index: usize, enable: bool) -> Result<()> {
        let mut layer = lock(self.layer(index)?);
        let mut common = lock(&self.common);
        let block = RegisterBlock::Layer(layer.id);
        let mut ctrl = LayerCtrlReg::from_raw(common.hw.get(block, layer_regs::CTRL));
        ctrl.set_transp_disable(!enable);
        layer.ctrl.set_transp_disable(!enable);
        common.hw.set(block, layer_regs::CTRL, ctrl.to_raw());
        Ok(())
    }

    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index.
    pub fn transparent_color(&self, index: usize) -> Result<u32> {
        let layer = lock(self.layer(index)?);
        Ok(lock(&self.common)
            .hw
            .get(RegisterBlock::Layer(layer.id), layer_regs::TRANSP))
    }

    /// Set the transparent color, converting RGB to the layer format.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index.
    pub fn set_transparent_color(&self, index: usize, color: LayerColor) -> Result<()> {
        let layer = lock(self.layer(index)?);
        let value = transparent_value(color, layer.setup.bpp_virt, layer.setup.alpha_mode);
        lock(&self.common)
            .hw
            .set(RegisterBlock::Layer(layer.id), layer_regs::TRANSP, value);
        Ok(())
    }

    /// Position and size of a layer on the output.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index.
    pub fn size_position(&self, index: usize) -> Result<LayerGeometry> {
        let layer = lock(self.layer(index)?);
        let common = lock(&self.common);
        let block = RegisterBlock::Layer(layer.id);
        let width = common.hw.get(block, layer_regs::WIDTH).saturating_add(1);
        let height = common.hw.get(block, layer_regs::HEIGHT).saturating_add(1);
        let hor_end = common.hw.get(block, layer_regs::HOR_POS).saturating_add(1);
        let ver_end = common.hw.get(block, layer_regs::VER_POS).saturating_add(1);
        Ok(LayerGeometry {
            x: hor_end.saturating_sub(width),
            y: ver_end.saturating_sub(height),
            width,
            height,
        })
    }

    /// Place and size a layer on the output.
    ///
    /// The window must be non-empty and lie inside both the current output
    /// resolution and the layer's memory.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index,
    /// [`LogicvcError::InvalidArgument`] for a window that does not fit.
    pub fn set_size_position(&self, index: usize, geometry: LayerGeometry) -> Result<()> {
        let layer = lock(self.layer(index)?);
        let mut common = lock(&self.common);
        let mode = common.negotiator.current().mode;
        let LayerGeometry {
            x,
            y,
            width,
            height,
        } = geometry;
        let x_end = x.checked_add(width);
        let y_end = y.checked_add(height);
        let fits = width != 0
            && height != 0
            && x_end.is_some_and(|e| e <= mode.xres)
            && y_end.is_some_and(|e| e <= mode.yres)
            && width <= layer.setup.width
            && height <= layer.plan.height;
        if !fits {
            return Err(LogicvcError::InvalidArgument("layer window does not fit"));
        }
        let block = RegisterBlock::Layer(layer.id);
        common.hw.set(block, layer_regs::WIDTH, width - 1);
        common.hw.set(block, layer_regs::HEIGHT, height - 1);
        common.hw.set(block, layer_regs::HOR_POS, x + width - 1);
        common.hw.set(block, layer_regs::VER_POS, y + height - 1);
        debug!("layer {index} window {width}x{height} at {x},{y}");
        Ok(())
    }

    /// Index of the frame buffer the layer scans out.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index.
    pub fn active_buffer(&self, index: usize) -> Result<u32> {
        let layer = lock(self.layer(index)?);
        let ver_off = lock(&self.common)
            .hw
            .get(RegisterBlock::Layer(layer.id), layer_regs::VER_OFF);
        Ok(ver_off / layer.setup.buffer_offset.max(1))
    }

    /// Switch the layer to scan out frame buffer `buffer`.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index,
    /// [`LogicvcError::InvalidArgument`] when the layer has fewer buffers.
    pub fn set_active_buffer(&self, index: usize, buffer: u32) -> Result<()> {
        let mut layer = lock(self.layer(index)?);
        if buffer >= layer.plan.buffer_count() {
            return Err(LogicvcError::InvalidArgument("buffer index out of range"));
        }
        let ver_off = buffer * layer.setup.buffer_offset;
        layer.var.yoffset = ver_off;
        lock(&self.common)
            .hw
            .set(RegisterBlock::Layer(layer.id), layer_regs::VER_OFF, ver_off);
        Ok(())
    }

    /// Lines between consecutive frame buffers of a layer.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index.
    pub fn buffer_offset(&self, index: usize) -> Result<u32> {
        Ok(lock(self.layer(index)?).setup.buffer_offset)
    }

    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index.
    pub fn buffer_count(&self, index: usize) -> Result<u32> {
        Ok(lock(self.layer(index)?).plan.buffer_count())
    }

    /// # Errors
    /// [`LogicvcError::InvalidArgument`] when no background layer is fitted.
    pub fn background_color(&self) -> Result<u32> {
        let common = lock(&self.common);
        if common.background.is_none() {
            return Err(LogicvcError::InvalidArgument("no background layer"));
        }
        Ok(common
            .hw
            .get(RegisterBlock::Common, common_regs::BACKGROUND))
    }

    /// # Errors
    /// [`LogicvcError::InvalidArgument`] when no background layer is fitted.
    pub fn set_background_color(&self, color: LayerColor) -> Result<()> {
        let mut common = lock(&self.common);
        let Some(background) = common.background else {
            return Err(LogicvcError::InvalidArgument("no background layer"));
        };
        let value = background_value(color, background.bpp);
        common
            .hw
            .set(RegisterBlock::Common, common_regs::BACKGROUND, value);
        Ok(())
    }

    /// Read any register of the window by offset.
    ///
    /// Common and layer registers go through the access strategy, so shadowed
    /// devices return the last written value. Palette entries are read
    /// directly.
    ///
    /// # Errors
    /// [`LogicvcError::RegisterOffset`] for offsets outside every block.
    pub fn read_register(&self, offset: u32) -> Result<u32> {
        let (block, rel) = map::decode(offset).ok_or(LogicvcError::RegisterOffset(offset))?;
        let common = lock(&self.common);
        Ok(match block {
            Block::Common => common.hw.get(RegisterBlock::Common, rel),
            Block::Layer(id) if usize::from(id) < self.layers.len() => {
                common.hw.get(RegisterBlock::Layer(id), rel)
            }
            Block::Layer(_) => return Err(LogicvcError::RegisterOffset(offset)),
            Block::Clut { .. } => common.hw.read32(offset),
        })
    }

    /// Write any register of the window by offset.
    ///
    /// # Errors
    /// [`LogicvcError::RegisterOffset`] for offsets outside every block.
    pub fn write_register(&self, offset: u32, value: u32) -> Result<()> {
        let (block, rel) = map::decode(offset).ok_or(LogicvcError::RegisterOffset(offset))?;
        let mut common = lock(&self.common);
        match block {
            Block::Common => common.hw.set(RegisterBlock::Common, rel, value),
            Block::Layer(id) if usize::from(id) < self.layers.len() => {
                common.hw.set(RegisterBlock::Layer(id), rel, value);
            }
            Block::Layer(_) => return Err(LogicvcError::RegisterOffset(offset)),
            Block::Clut { .. } => common.hw.write32(offset, value),
        }
        Ok(())
    }

    /// Attach or replace the display descriptor.
    pub fn attach_display(&self, display: std::sync::Arc<dyn DisplayDescriptor>) {
        let mut common = lock(&self.common);
        common.print_display(display.as_ref());
        common.display = Some(display);
    }

    /// Raw bytes of the attached display descriptor.
    ///
    /// # Errors
    /// [`LogicvcError::NoDisplay`] when no ready descriptor is attached.
    pub fn display_descriptor(&self) -> Result<[u8; 256]> {
        lock(&self.common)
            .display
            .as_ref()
            .filter(|d| d.is_ready())
            .and_then(|d| d.raw())
            .ok_or(LogicvcError::NoDisplay)
    }

    /// Block until the attached display descriptor is ready.
    ///
    /// # Errors
    /// [`LogicvcError::Timeout`] when it does not become ready in time.
    pub fn wait_display_descriptor(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let ready = lock(&self.common)
                .display
                .as_ref()
                .is_some_and(|d| d.is_ready());
            if ready {
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(LogicvcError::Timeout("display descriptor"));
            }
            thread::sleep(DESCRIPTOR_POLL.min(deadline - now));
        }
    }
}
