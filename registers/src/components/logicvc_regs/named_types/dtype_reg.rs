//! Register: DTYPE

/// Display type
///
/// Physical interface and color space of the output.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct DtypeReg(u32);

impl core::default::Default for DtypeReg {
    fn default() -> Self {
        Self(0x0)
    }
}

impl crate::reg::Register for DtypeReg {
    const OFFSET: u32 = crate::map::common::DTYPE;

    fn from_raw(val: u32) -> Self {
        Self(val)
    }

    fn to_raw(self) -> u32 {
        self.0
    }
}

impl DtypeReg {
    pub const COLOR_SPACE_OFFSET: usize = 0;
    pub const COLOR_SPACE_WIDTH: usize = 4;
    pub const COLOR_SPACE_MASK: u32 = 0xF;

    /// Output color space (see `ColorSpaceE`)
    #[inline(always)]
    #[must_use]
    pub fn color_space(&self) -> u8 {
        let val = (self.0 >> Self::COLOR_SPACE_OFFSET) & Self::COLOR_SPACE_MASK;
        val as u8
    }

    /// Output color space (see `ColorSpaceE`)
    #[inline(always)]
    pub fn set_color_space(&mut self, val: u8) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::COLOR_SPACE_MASK << Self::COLOR_SPACE_OFFSET))
            | ((val & Self::COLOR_SPACE_MASK) << Self::COLOR_SPACE_OFFSET);
    }

    pub const INTERFACE_OFFSET: usize = 4;
    pub const INTERFACE_WIDTH: usize = 4;
    pub const INTERFACE_MASK: u32 = 0xF;

    /// Output interface (see `DisplayInterfaceE`)
    #[inline(always)]
    #[must_use]
    pub fn interface(&self) -> u8 {
        let val = (self.0 >> Self::INTERFACE_OFFSET) & Self::INTERFACE_MASK;
        val as u8
    }

    /// Output interface (see `DisplayInterfaceE`)
    #[inline(always)]
    pub fn set_interface(&mut self, val: u8) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::INTERFACE_MASK << Self::INTERFACE_OFFSET))
            | ((val & Self::INTERFACE_MASK) << Self::INTERFACE_OFFSET);
    }
}

impl core::fmt::Debug for DtypeReg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DtypeReg")
            .field("color_space", &self.color_space())
            .field("interface", &self.interface())
            .finish()
    }
}
