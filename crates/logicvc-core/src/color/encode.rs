//! Packing of colors into palette entries and pseudo-palette values.

use logicvc_registers::map::CLUT_ENTRIES;

use super::format::{narrow, FourCc, PixelFormat, Visual};
use super::yuv::{pack_ayuv, rgb_to_ycbcr, YuvCoefficients};
use crate::error::{LogicvcError, Result};
use crate::{AlphaMode, DisplayInterface, LayerType};

/// Entries in a hardware palette and in the pseudo palette.
pub const PALETTE_SIZE: usize = CLUT_ENTRIES;

/// One color. Components carry 8-bit values in their low byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    /// `None` means fully opaque.
    pub transp: Option<u16>,
}

/// A run of palette colors as parallel component arrays.
#[derive(Debug, Clone, Copy)]
pub struct ColorMap<'a> {
    pub red: &'a [u16],
    pub green: &'a [u16],
    pub blue: &'a [u16],
    pub transp: Option<&'a [u16]>,
}

impl ColorMap<'_> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.red.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.red.is_empty()
    }

    fn check(&self) -> Result<()> {
        let len = self.len();
        if self.green.len() != len
            || self.blue.len() != len
            || self.transp.is_some_and(|t| t.len() != len)
        {
            return Err(LogicvcError::InvalidArgument("color map arrays differ in length"));
        }
        Ok(())
    }

    fn get(&self, i: usize) -> Color {
        Color {
            red: self.red[i],
            green: self.green[i],
            blue: self.blue[i],
            transp: self.transp.map(|t| t[i]),
        }
    }
}

/// Where encoded values go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteTarget {
    /// The in-memory palette of a true-color layer.
    PseudoPalette,
    /// The hardware palette (CLUT) of the layer.
    Clut,
}

/// Encoded values for the indices `start..start + values.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub target: PaletteTarget,
    pub start: usize,
    pub values: Vec<u32>,
}

/// True when palette entries of this format are YCbCr.
fn uses_yuv(format: &PixelFormat) -> bool {
    format.layer_type == LayerType::YCbCr && format.fourcc() == Some(FourCc::Ayuv)
}

/// Target and encoding rule for `format`.
///
/// # Errors
/// [`LogicvcError::UnsupportedFormat`] for formats without a color path.
pub fn target(format: &PixelFormat) -> Result<PaletteTarget> {
    if uses_yuv(format) {
        return Ok(PaletteTarget::Clut);
    }
    match format.visual() {
        Visual::TrueColor => Ok(PaletteTarget::PseudoPalette),
        Visual::PseudoColor => Ok(PaletteTarget::Clut),
        Visual::FourCc => Err(LogicvcError::UnsupportedFormat),
    }
}

/// Pack one color for `format`.
///
/// # Errors
/// [`LogicvcError::UnsupportedFormat`] for formats without a color path.
pub fn encode_color(
    color: Color,
    format: &PixelFormat,
    interface: DisplayInterface,
) -> Result<u32> {
    if uses_yuv(format) {
        let (y, cb, cr) = rgb_to_ycbcr(
            color.red as u8,
            color.green as u8,
            color.blue as u8,
            YuvCoefficients::for_interface(interface),
        );
        let transp = color.transp.map_or(0xFF, |t| t as u8);
        return Ok(pack_ayuv(transp, y, cb, cr));
    }

    let layout = format.layout();
    let rgb =
        layout.red.pack(color.red) | layout.green.pack(color.green) | layout.blue.pack(color.blue);
    let transp = layout.transp.place(
        color
            .transp
            .map_or(layout.transp.max(), |t| narrow(t, layout.transp.length)),
    );

    match format.visual() {
        Visual::PseudoColor => Ok(rgb | transp),
        Visual::TrueColor => Ok(match (format.bpp_virt, format.alpha_mode) {
            (8, AlphaMode::Pixel) => {
                let pixel = rgb | transp;
                (pixel << 16) | pixel
            }
            (8, _) => rgb * 0x0101_0101,
            (16, AlphaMode::Pixel) => rgb | transp,
            (16, _) => (rgb << 16) | rgb,
            (_, AlphaMode::Pixel) => rgb | transp,
            _ => rgb,
        }),
        Visual::FourCc => Err(LogicvcError::UnsupportedFormat),
    }
}

/// Pack `map` into palette indices starting at `start`.
///
/// # Errors
/// [`LogicvcError::PaletteRange`] when the run does not fit the palette,
/// [`LogicvcError::InvalidArgument`] for ragged component arrays and
/// [`LogicvcError::UnsupportedFormat`] for formats without a color path.
pub fn encode(
    map: &ColorMap<'_>,
    start: usize,
    format: &PixelFormat,
    interface: DisplayInterface,
) -> Result<Encoded> {
    map.check()?;
    let end = start.saturating_add(map.len());
    if end > PALETTE_SIZE {
        return Err(LogicvcError::PaletteRange {
            start,
            end,
            capacity: PALETTE_SIZE,
        });
    }
    let target = target(format)?;
    let values = (0..map.len())
        .map(|i| encode_color(map.get(i), format, interface))
        .collect::<Result<Vec<_>>>()?;
    Ok(Encoded {
        target,
        start,
        values,
    })
}
