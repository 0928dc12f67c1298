//! Palette programming and rectangle fills.

use logicvc_hal::{DelayNs, RegisterIo, VideoMemory};
use logicvc_registers::map::{clut_base, CLUT_ENTRY_SIZE};

use super::{lock, Common, Device, FillRect};
use crate::color::{self, encode_color, Color, ColorMap, Encoded, PaletteTarget, PALETTE_SIZE};
use crate::error::{LogicvcError, Result};
use crate::layer::Layer;

impl<R: RegisterIo, M, D> Common<R, M, D> {
    fn store(&mut self, layer: &mut Layer, encoded: &Encoded) {
        let indices = encoded.start..encoded.start + encoded.values.len();
        match encoded.target {
            PaletteTarget::PseudoPalette => {
                layer.pseudo_palette[indices].copy_from_slice(&encoded.values);
            }
            PaletteTarget::Clut => {
                let base = clut_base(layer.id, 0);
                for (index, value) in indices.zip(&encoded.values) {
                    self.hw.write32(base + index as u32 * CLUT_ENTRY_SIZE, *value);
                }
            }
        }
    }

    /// Encode one color and store it at `regno`.
    pub(crate) fn write_color(
        &mut self,
        layer: &mut Layer,
        regno: usize,
        color: Color,
    ) -> Result<()> {
        if regno >= PALETTE_SIZE {
            return Err(LogicvcError::PaletteRange {
                start: regno,
                end: regno + 1,
                capacity: PALETTE_SIZE,
            });
        }
        let format = layer.format();
        let encoded = Encoded {
            target: color::encode::target(&format)?,
            start: regno,
            values: vec![encode_color(color, &format, self.interface)?],
        };
        self.store(layer, &encoded);
        Ok(())
    }
}

impl<R: RegisterIo, M: VideoMemory, D: DelayNs> Device<R, M, D> {
    /// Program a run of palette entries starting at `start`.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index,
    /// [`LogicvcError::PaletteRange`] when the run does not fit,
    /// [`LogicvcError::UnsupportedFormat`] for layers without a palette.
    /// Nothing is stored on error.
    pub fn set_cmap(&self, index: usize, map: &ColorMap<'_>, start: usize) -> Result<()> {
        let mut layer = lock(self.layer(index)?);
        let mut common = lock(&self.common);
        let encoded = color::encode(map, start, &layer.format(), common.interface)?;
        common.store(&mut layer, &encoded);
        Ok(())
    }

    /// Program one palette entry.
    ///
    /// # Errors
    /// Same as [`Device::set_cmap`].
    pub fn set_color_reg(&self, index: usize, regno: usize, color: Color) -> Result<()> {
        let mut layer = lock(self.layer(index)?);
        lock(&self.common).write_color(&mut layer, regno, color)
    }

    /// Fill a rectangle of the layer's virtual screen.
    ///
    /// True-color layers look `rect.color` up in the pseudo palette; other
    /// layers write it as the pixel value. The rectangle is clipped to the
    /// virtual screen.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index,
    /// [`LogicvcError::PaletteRange`] for a pseudo-palette index past the end.
    pub fn fill_rect(&self, index: usize, rect: FillRect) -> Result<()> {
        let layer = lock(self.layer(index)?);
        let target = color::encode::target(&layer.format()).ok();
        let value = if target == Some(PaletteTarget::PseudoPalette) {
            let slot = rect.color as usize;
            *layer
                .pseudo_palette
                .get(slot)
                .ok_or(LogicvcError::PaletteRange {
                    start: slot,
                    end: slot.saturating_add(1),
                    capacity: PALETTE_SIZE,
                })?
        } else {
            rect.color
        };
        let mut common = lock(&self.common);
        let area = (rect.x, rect.y, rect.width, rect.height);
        layer.fill_area(&mut common.hw.vmem, area, layer.setup.bpp, value);
        Ok(())
    }
}
