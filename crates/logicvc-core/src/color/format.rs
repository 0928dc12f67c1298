use crate::{AlphaMode, LayerType};

/// Position of one color component inside a packed pixel or palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bitfield {
    pub offset: u32,
    pub length: u32,
}

impl Bitfield {
    #[must_use]
    pub const fn new(offset: u32, length: u32) -> Self {
        Self { offset, length }
    }

    #[must_use]
    pub const fn mask(&self) -> u32 {
        if self.length == 0 {
            0
        } else {
            (u32::MAX >> (32 - self.length)) << self.offset
        }
    }

    /// All-ones value of the field width, used as "fully opaque".
    #[must_use]
    pub const fn max(&self) -> u32 {
        if self.length == 0 {
            0
        } else {
            u32::MAX >> (32 - self.length)
        }
    }

    /// Place an already narrowed component.
    #[must_use]
    pub const fn place(&self, value: u32) -> u32 {
        (value << self.offset) & self.mask()
    }

    /// Narrow `component` to the field width and place it.
    #[must_use]
    pub fn pack(&self, component: u16) -> u32 {
        self.place(narrow(component, self.length))
    }

    /// Read the field back out of a packed value.
    #[must_use]
    pub const fn extract(&self, value: u32) -> u32 {
        (value & self.mask()) >> self.offset
    }
}

/// Keep the `bits` most significant bits of the 8-bit component carried in
/// the low byte of `component`.
#[must_use]
pub fn narrow(component: u16, bits: u32) -> u32 {
    let byte = u32::from(component & 0xFF);
    match bits {
        0 => 0,
        1..=8 => byte >> (8 - bits),
        _ => byte,
    }
}

/// Component positions of a layer format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorLayout {
    pub red: Bitfield,
    pub green: Bitfield,
    pub blue: Bitfield,
    pub transp: Bitfield,
}

/// How pixel values of a layer are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visual {
    TrueColor,
    /// 8-bit indices into a hardware palette.
    PseudoColor,
    /// Described by a [`FourCc`] code.
    FourCc,
}

/// Pixel formats of YCbCr and alpha layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FourCc {
    Ayuv,
    Avuy,
    Vyuy,
    Yvyu,
    A8,
}

/// The format facts that decide how colors are packed for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    /// Bits per pixel as stored in memory.
    pub bpp: u32,
    /// Bits per pixel of the color part, before per-pixel alpha.
    pub bpp_virt: u32,
    pub alpha_mode: AlphaMode,
    pub layer_type: LayerType,
    pub swap_rb: bool,
}

impl PixelFormat {
    #[must_use]
    pub fn layout(&self) -> ColorLayout {
        let bf = Bitfield::new;
        let pixel_alpha = self.alpha_mode == AlphaMode::Pixel;
        match self.bpp_virt {
            8 => match self.alpha_mode {
                AlphaMode::Clut16 => ColorLayout {
                    red: bf(19, 5),
                    green: bf(10, 6),
                    blue: bf(3, 5),
                    transp: bf(24, 6),
                },
                AlphaMode::Clut32 => ColorLayout {
                    red: bf(16, 8),
                    green: bf(8, 8),
                    blue: bf(0, 8),
                    transp: bf(24, 8),
                },
                _ => ColorLayout {
                    red: bf(5, 3),
                    green: bf(2, 3),
                    blue: bf(0, 2),
                    transp: if pixel_alpha { bf(8, 3) } else { bf(0, 0) },
                },
            },
            16 => ColorLayout {
                red: bf(11, 5),
                green: bf(5, 6),
                blue: bf(0, 5),
                transp: if pixel_alpha { bf(24, 6) } else { bf(0, 0) },
            },
            _ => ColorLayout {
                red: bf(0, 8),
                green: bf(8, 8),
                blue: bf(16, 8),
                transp: if pixel_alpha { bf(24, 8) } else { bf(0, 0) },
            },
        }
    }

    #[must_use]
    pub fn visual(&self) -> Visual {
        match self.layer_type {
            LayerType::YCbCr | LayerType::Alpha => Visual::FourCc,
            LayerType::Rgb if self.bpp_virt == 8 && self.alpha_mode.is_clut() => {
                Visual::PseudoColor
            }
            LayerType::Rgb => Visual::TrueColor,
        }
    }

    #[must_use]
    pub fn fourcc(&self) -> Option<FourCc> {
        match self.layer_type {
            LayerType::Rgb => None,
            LayerType::Alpha => Some(FourCc::A8),
            LayerType::YCbCr => Some(match (self.bpp, self.swap_rb) {
                (16, false) => FourCc::Vyuy,
                (16, true) => FourCc::Yvyu,
                (32, true) => FourCc::Avuy,
                _ => FourCc::Ayuv,
            }),
        }
    }

    /// Bytes per row for a stride of `width` pixels.
    #[must_use]
    pub const fn line_length(&self, width: u32) -> u32 {
        width.saturating_mul(self.bpp) / 8
    }
}
