//! Register: LAYER_CTRL

/// Layer control
///
/// Layer enable, color-key transparency and red/blue swap.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct LayerCtrlReg(u32);

impl core::default::Default for LayerCtrlReg {
    fn default() -> Self {
        Self(0x0)
    }
}

impl crate::reg::Register for LayerCtrlReg {
    const OFFSET: u32 = crate::map::layer::CTRL;

    fn from_raw(val: u32) -> Self {
        Self(val)
    }

    fn to_raw(self) -> u32 {
        self.0
    }
}

impl LayerCtrlReg {
    pub const ENABLE_OFFSET: usize = 0;
    pub const ENABLE_WIDTH: usize = 1;
    pub const ENABLE_MASK: u32 = 0x1;

    /// Layer is displayed
    #[inline(always)]
    #[must_use]
    pub fn enable(&self) -> bool {
        let val = (self.0 >> Self::ENABLE_OFFSET) & Self::ENABLE_MASK;
        val != 0
    }

    /// Layer is displayed
    #[inline(always)]
    pub fn set_enable(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::ENABLE_MASK << Self::ENABLE_OFFSET))
            | ((val & Self::ENABLE_MASK) << Self::ENABLE_OFFSET);
    }

    pub const TRANSP_DISABLE_OFFSET: usize = 1;
    pub const TRANSP_DISABLE_WIDTH: usize = 1;
    pub const TRANSP_DISABLE_MASK: u32 = 0x1;

    /// Ignore the transparent color key
    #[inline(always)]
    #[must_use]
    pub fn transp_disable(&self) -> bool {
        let val = (self.0 >> Self::TRANSP_DISABLE_OFFSET) & Self::TRANSP_DISABLE_MASK;
        val != 0
    }

    /// Ignore the transparent color key
    #[inline(always)]
    pub fn set_transp_disable(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::TRANSP_DISABLE_MASK << Self::TRANSP_DISABLE_OFFSET))
            | ((val & Self::TRANSP_DISABLE_MASK) << Self::TRANSP_DISABLE_OFFSET);
    }

    pub const SWAP_RB_OFFSET: usize = 4;
    pub const SWAP_RB_WIDTH: usize = 1;
    pub const SWAP_RB_MASK: u32 = 0x1;

    /// Swap red and blue components
    #[inline(always)]
    #[must_use]
    pub fn swap_rb(&self) -> bool {
        let val = (self.0 >> Self::SWAP_RB_OFFSET) & Self::SWAP_RB_MASK;
        val != 0
    }

    /// Swap red and blue components
    #[inline(always)]
    pub fn set_swap_rb(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::SWAP_RB_MASK << Self::SWAP_RB_OFFSET))
            | ((val & Self::SWAP_RB_MASK) << Self::SWAP_RB_OFFSET);
    }
}

impl core::fmt::Debug for LayerCtrlReg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayerCtrlReg")
            .field("enable", &self.enable())
            .field("transp_disable", &self.transp_disable())
            .field("swap_rb", &self.swap_rb())
            .finish()
    }
}
