//! Fixed-point RGB to YCbCr conversion for palette entries of YCbCr layers.
//!
//! Coefficients are scaled by 100000. Chroma gets an offset of 128 (scaled).

use crate::DisplayInterface;

const SCALE: i64 = 100_000;
const CHROMA_OFFSET: i64 = 128 * SCALE;

/// One coefficient set. Signs are applied by [`rgb_to_ycbcr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YuvCoefficients {
    pub ykr: i64,
    pub ykg: i64,
    pub ykb: i64,
    pub yk: i64,
    pub crkr: i64,
    pub crkg: i64,
    pub crkb: i64,
    pub cbkr: i64,
    pub cbkg: i64,
    pub cbkb: i64,
}

/// Studio range coefficients for ITU-R BT.656 outputs.
pub const ITU656: YuvCoefficients = YuvCoefficients {
    ykr: 29_900,
    ykg: 58_700,
    ykb: 11_400,
    yk: 1_600_000,
    crkr: 51_138,
    crkg: 42_820,
    crkb: 8_316,
    cbkr: 17_258,
    cbkg: 33_881,
    cbkb: 51_140,
};

/// Full range coefficients for every other interface.
pub const FULL_RANGE: YuvCoefficients = YuvCoefficients {
    ykr: 29_900,
    ykg: 58_700,
    ykb: 11_400,
    yk: 0,
    crkr: 49_980,
    crkg: 41_850,
    crkb: 8_128,
    cbkr: 16_868,
    cbkg: 33_107,
    cbkb: 49_970,
};

impl YuvCoefficients {
    #[must_use]
    pub const fn for_interface(interface: DisplayInterface) -> &'static Self {
        match interface {
            DisplayInterface::Itu656 => &ITU656,
            _ => &FULL_RANGE,
        }
    }
}

/// Convert 8-bit RGB into `(y, cb, cr)`, each clamped to a byte.
#[must_use]
pub fn rgb_to_ycbcr(red: u8, green: u8, blue: u8, k: &YuvCoefficients) -> (u8, u8, u8) {
    let (r, g, b) = (i64::from(red), i64::from(green), i64::from(blue));
    let clamp = |v: i64| (v / SCALE).clamp(0, 255) as u8;
    let y = clamp(k.ykr * r + k.ykg * g + k.ykb * b + k.yk);
    let cr = clamp(k.crkr * r - k.crkg * g - k.crkb * b + CHROMA_OFFSET);
    let cb = clamp(-k.cbkr * r - k.cbkg * g + k.cbkb * b + CHROMA_OFFSET);
    (y, cb, cr)
}

/// Pack as `T:8 Y:8 Cb:8 Cr:8`, transparency in the top byte.
#[must_use]
pub const fn pack_ayuv(transp: u8, y: u8, cb: u8, cr: u8) -> u32 {
    (transp as u32) << 24 | (y as u32) << 16 | (cb as u32) << 8 | cr as u32
}
