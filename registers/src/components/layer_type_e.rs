//! Field Enum: LAYER_TYPE

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerTypeE {
    /// RGB pixels
    Rgb = 0,
    /// YCbCr pixels
    YCbCr = 1,
    /// Alpha-only plane blended over the layer below
    Alpha = 2,
}

impl LayerTypeE {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            0 => Ok(Self::Rgb),
            1 => Ok(Self::YCbCr),
            2 => Ok(Self::Alpha),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }
}
