//! Field Enum: ALPHA_MODE

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaModeE {
    /// One alpha value for the whole layer
    Layer = 0,
    /// Alpha stored with every pixel
    Pixel = 1,
    /// Alpha taken from a 16-bit-per-entry palette
    Clut16 = 2,
    /// Alpha taken from a 32-bit-per-entry palette
    Clut32 = 3,
}

impl AlphaModeE {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            0 => Ok(Self::Layer),
            1 => Ok(Self::Pixel),
            2 => Ok(Self::Clut16),
            3 => Ok(Self::Clut32),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }

    /// True for both palette alpha modes
    #[must_use]
    pub const fn is_clut(&self) -> bool {
        matches!(self, Self::Clut16 | Self::Clut32)
    }
}
