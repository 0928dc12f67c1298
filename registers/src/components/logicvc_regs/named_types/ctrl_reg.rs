//! Register: CTRL

/// Display control
///
/// Sync and data-enable outputs with their polarities.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct CtrlReg(u32);

impl core::default::Default for CtrlReg {
    fn default() -> Self {
        Self(0x1F)
    }
}

impl crate::reg::Register for CtrlReg {
    const OFFSET: u32 = crate::map::common::CTRL;

    fn from_raw(val: u32) -> Self {
        Self(val)
    }

    fn to_raw(self) -> u32 {
        self.0
    }
}

impl CtrlReg {
    pub const HSYNC_ENABLE_OFFSET: usize = 0;
    pub const HSYNC_ENABLE_WIDTH: usize = 1;
    pub const HSYNC_ENABLE_MASK: u32 = 0x1;

    /// Horizontal sync output enable
    #[inline(always)]
    #[must_use]
    pub fn hsync_enable(&self) -> bool {
        let val = (self.0 >> Self::HSYNC_ENABLE_OFFSET) & Self::HSYNC_ENABLE_MASK;
        val != 0
    }

    /// Horizontal sync output enable
    #[inline(always)]
    pub fn set_hsync_enable(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::HSYNC_ENABLE_MASK << Self::HSYNC_ENABLE_OFFSET))
            | ((val & Self::HSYNC_ENABLE_MASK) << Self::HSYNC_ENABLE_OFFSET);
    }

    pub const HSYNC_HIGH_OFFSET: usize = 1;
    pub const HSYNC_HIGH_WIDTH: usize = 1;
    pub const HSYNC_HIGH_MASK: u32 = 0x1;

    /// Horizontal sync active high
    #[inline(always)]
    #[must_use]
    pub fn hsync_high(&self) -> bool {
        let val = (self.0 >> Self::HSYNC_HIGH_OFFSET) & Self::HSYNC_HIGH_MASK;
        val != 0
    }

    /// Horizontal sync active high
    #[inline(always)]
    pub fn set_hsync_high(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::HSYNC_HIGH_MASK << Self::HSYNC_HIGH_OFFSET))
            | ((val & Self::HSYNC_HIGH_MASK) << Self::HSYNC_HIGH_OFFSET);
    }

    pub const VSYNC_ENABLE_OFFSET: usize = 2;
    pub const VSYNC_ENABLE_WIDTH: usize = 1;
    pub const VSYNC_ENABLE_MASK: u32 = 0x1;

    /// Vertical sync output enable
    #[inline(always)]
    #[must_use]
    pub fn vsync_enable(&self) -> bool {
        let val = (self.0 >> Self::VSYNC_ENABLE_OFFSET) & Self::VSYNC_ENABLE_MASK;
        val != 0
    }

    /// Vertical sync output enable
    #[inline(always)]
    pub fn set_vsync_enable(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::VSYNC_ENABLE_MASK << Self::VSYNC_ENABLE_OFFSET))
            | ((val & Self::VSYNC_ENABLE_MASK) << Self::VSYNC_ENABLE_OFFSET);
    }

    pub const VSYNC_HIGH_OFFSET: usize = 3;
    pub const VSYNC_HIGH_WIDTH: usize = 1;
    pub const VSYNC_HIGH_MASK: u32 = 0x1;

    /// Vertical sync active high
    #[inline(always)]
    #[must_use]
    pub fn vsync_high(&self) -> bool {
        let val = (self.0 >> Self::VSYNC_HIGH_OFFSET) & Self::VSYNC_HIGH_MASK;
        val != 0
    }

    /// Vertical sync active high
    #[inline(always)]
    pub fn set_vsync_high(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::VSYNC_HIGH_MASK << Self::VSYNC_HIGH_OFFSET))
            | ((val & Self::VSYNC_HIGH_MASK) << Self::VSYNC_HIGH_OFFSET);
    }

    pub const DATA_ENABLE_OFFSET: usize = 4;
    pub const DATA_ENABLE_WIDTH: usize = 1;
    pub const DATA_ENABLE_MASK: u32 = 0x1;

    /// Data enable output enable
    #[inline(always)]
    #[must_use]
    pub fn data_enable(&self) -> bool {
        let val = (self.0 >> Self::DATA_ENABLE_OFFSET) & Self::DATA_ENABLE_MASK;
        val != 0
    }

    /// Data enable output enable
    #[inline(always)]
    pub fn set_data_enable(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::DATA_ENABLE_MASK << Self::DATA_ENABLE_OFFSET))
            | ((val & Self::DATA_ENABLE_MASK) << Self::DATA_ENABLE_OFFSET);
    }

    pub const PIX_DATA_INVERT_OFFSET: usize = 7;
    pub const PIX_DATA_INVERT_WIDTH: usize = 1;
    pub const PIX_DATA_INVERT_MASK: u32 = 0x1;

    /// Invert pixel data bus
    #[inline(always)]
    #[must_use]
    pub fn pix_data_invert(&self) -> bool {
        let val = (self.0 >> Self::PIX_DATA_INVERT_OFFSET) & Self::PIX_DATA_INVERT_MASK;
        val != 0
    }

    /// Invert pixel data bus
    #[inline(always)]
    pub fn set_pix_data_invert(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::PIX_DATA_INVERT_MASK << Self::PIX_DATA_INVERT_OFFSET))
            | ((val & Self::PIX_DATA_INVERT_MASK) << Self::PIX_DATA_INVERT_OFFSET);
    }

    pub const PIX_CLK_ACT_HIGH_OFFSET: usize = 8;
    pub const PIX_CLK_ACT_HIGH_WIDTH: usize = 1;
    pub const PIX_CLK_ACT_HIGH_MASK: u32 = 0x1;

    /// Pixel data launched on the rising clock edge
    #[inline(always)]
    #[must_use]
    pub fn pix_clk_act_high(&self) -> bool {
        let val = (self.0 >> Self::PIX_CLK_ACT_HIGH_OFFSET) & Self::PIX_CLK_ACT_HIGH_MASK;
        val != 0
    }

    /// Pixel data launched on the rising clock edge
    #[inline(always)]
    pub fn set_pix_clk_act_high(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::PIX_CLK_ACT_HIGH_MASK << Self::PIX_CLK_ACT_HIGH_OFFSET))
            | ((val & Self::PIX_CLK_ACT_HIGH_MASK) << Self::PIX_CLK_ACT_HIGH_OFFSET);
    }
}

impl core::fmt::Debug for CtrlReg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CtrlReg")
            .field("hsync_enable", &self.hsync_enable())
            .field("hsync_high", &self.hsync_high())
            .field("vsync_enable", &self.vsync_enable())
            .field("vsync_high", &self.vsync_high())
            .field("data_enable", &self.data_enable())
            .field("pix_data_invert", &self.pix_data_invert())
            .field("pix_clk_act_high", &self.pix_clk_act_high())
            .finish()
    }
}
