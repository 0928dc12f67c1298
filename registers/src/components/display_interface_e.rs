//! Field Enum: DISPLAY_INTERFACE

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayInterfaceE {
    Parallel = 0,
    /// ITU-R BT.656 studio range video
    Itu656 = 1,
    Lvds4Bit = 2,
    CameraLink4Bit = 3,
    Lvds3Bit = 4,
    Dvi = 5,
}

impl DisplayInterfaceE {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            0 => Ok(Self::Parallel),
            1 => Ok(Self::Itu656),
            2 => Ok(Self::Lvds4Bit),
            3 => Ok(Self::CameraLink4Bit),
            4 => Ok(Self::Lvds3Bit),
            5 => Ok(Self::Dvi),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }
}
