//! Register: SPWRCTRL

/// Power control
///
/// Panel supply, signal and backlight enables.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct PowerCtrlReg(u32);

impl core::default::Default for PowerCtrlReg {
    fn default() -> Self {
        Self(0x0)
    }
}

impl crate::reg::Register for PowerCtrlReg {
    const OFFSET: u32 = crate::map::common::SPWRCTRL;

    fn from_raw(val: u32) -> Self {
        Self(val)
    }

    fn to_raw(self) -> u32 {
        self.0
    }
}

impl PowerCtrlReg {
    pub const BLIGHT_EN_OFFSET: usize = 0;
    pub const BLIGHT_EN_WIDTH: usize = 1;
    pub const BLIGHT_EN_MASK: u32 = 0x1;

    /// Backlight enable
    #[inline(always)]
    #[must_use]
    pub fn blight_en(&self) -> bool {
        let val = (self.0 >> Self::BLIGHT_EN_OFFSET) & Self::BLIGHT_EN_MASK;
        val != 0
    }

    /// Backlight enable
    #[inline(always)]
    pub fn set_blight_en(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::BLIGHT_EN_MASK << Self::BLIGHT_EN_OFFSET))
            | ((val & Self::BLIGHT_EN_MASK) << Self::BLIGHT_EN_OFFSET);
    }

    pub const VDD_EN_OFFSET: usize = 1;
    pub const VDD_EN_WIDTH: usize = 1;
    pub const VDD_EN_MASK: u32 = 0x1;

    /// Panel logic supply enable
    #[inline(always)]
    #[must_use]
    pub fn vdd_en(&self) -> bool {
        let val = (self.0 >> Self::VDD_EN_OFFSET) & Self::VDD_EN_MASK;
        val != 0
    }

    /// Panel logic supply enable
    #[inline(always)]
    pub fn set_vdd_en(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::VDD_EN_MASK << Self::VDD_EN_OFFSET))
            | ((val & Self::VDD_EN_MASK) << Self::VDD_EN_OFFSET);
    }

    pub const VEE_EN_OFFSET: usize = 2;
    pub const VEE_EN_WIDTH: usize = 1;
    pub const VEE_EN_MASK: u32 = 0x1;

    /// Panel bias supply enable
    #[inline(always)]
    #[must_use]
    pub fn vee_en(&self) -> bool {
        let val = (self.0 >> Self::VEE_EN_OFFSET) & Self::VEE_EN_MASK;
        val != 0
    }

    /// Panel bias supply enable
    #[inline(always)]
    pub fn set_vee_en(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::VEE_EN_MASK << Self::VEE_EN_OFFSET))
            | ((val & Self::VEE_EN_MASK) << Self::VEE_EN_OFFSET);
    }

    pub const V_EN_OFFSET: usize = 3;
    pub const V_EN_WIDTH: usize = 1;
    pub const V_EN_MASK: u32 = 0x1;

    /// Video signal enable
    #[inline(always)]
    #[must_use]
    pub fn v_en(&self) -> bool {
        let val = (self.0 >> Self::V_EN_OFFSET) & Self::V_EN_MASK;
        val != 0
    }

    /// Video signal enable
    #[inline(always)]
    pub fn set_v_en(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::V_EN_MASK << Self::V_EN_OFFSET))
            | ((val & Self::V_EN_MASK) << Self::V_EN_OFFSET);
    }
}

impl core::fmt::Debug for PowerCtrlReg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PowerCtrlReg")
            .field("blight_en", &self.blight_en())
            .field("vdd_en", &self.vdd_en())
            .field("vee_en", &self.vee_en())
            .field("v_en", &self.v_en())
            .finish()
    }
}
