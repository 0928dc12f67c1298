/// Packing of colors per layer format.
pub mod encode;
/// Component layouts, visuals and FourCC codes of layer formats.
pub mod format;
pub mod yuv;

pub use encode::{encode, encode_color, Color, ColorMap, Encoded, PaletteTarget, PALETTE_SIZE};
pub use format::{Bitfield, ColorLayout, FourCc, PixelFormat, Visual};
