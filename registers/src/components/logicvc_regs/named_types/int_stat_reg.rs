//! Register: INT_STAT

/// Interrupt status
///
/// Same layout is used by the interrupt mask register.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct IntStatReg(u32);

impl core::default::Default for IntStatReg {
    fn default() -> Self {
        Self(0x0)
    }
}

impl crate::reg::Register for IntStatReg {
    const OFFSET: u32 = crate::map::common::INT_STAT;

    fn from_raw(val: u32) -> Self {
        Self(val)
    }

    fn to_raw(self) -> u32 {
        self.0
    }
}

impl IntStatReg {
    pub const LAYER_UPDATE_OFFSET: usize = 0;
    pub const LAYER_UPDATE_WIDTH: usize = 5;
    pub const LAYER_UPDATE_MASK: u32 = 0x1F;

    /// Per-layer buffer switch completed
    #[inline(always)]
    #[must_use]
    pub fn layer_update(&self) -> u8 {
        let val = (self.0 >> Self::LAYER_UPDATE_OFFSET) & Self::LAYER_UPDATE_MASK;
        val as u8
    }

    /// Per-layer buffer switch completed
    #[inline(always)]
    pub fn set_layer_update(&mut self, val: u8) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::LAYER_UPDATE_MASK << Self::LAYER_UPDATE_OFFSET))
            | ((val & Self::LAYER_UPDATE_MASK) << Self::LAYER_UPDATE_OFFSET);
    }

    pub const VSYNC_OFFSET: usize = 5;
    pub const VSYNC_WIDTH: usize = 1;
    pub const VSYNC_MASK: u32 = 0x1;

    /// Vertical sync
    #[inline(always)]
    #[must_use]
    pub fn vsync(&self) -> bool {
        let val = (self.0 >> Self::VSYNC_OFFSET) & Self::VSYNC_MASK;
        val != 0
    }

    /// Vertical sync
    #[inline(always)]
    pub fn set_vsync(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::VSYNC_MASK << Self::VSYNC_OFFSET))
            | ((val & Self::VSYNC_MASK) << Self::VSYNC_OFFSET);
    }

    pub const VIDEO_VALID_OFFSET: usize = 6;
    pub const VIDEO_VALID_WIDTH: usize = 1;
    pub const VIDEO_VALID_MASK: u32 = 0x1;

    /// External video input valid
    #[inline(always)]
    #[must_use]
    pub fn video_valid(&self) -> bool {
        let val = (self.0 >> Self::VIDEO_VALID_OFFSET) & Self::VIDEO_VALID_MASK;
        val != 0
    }

    /// External video input valid
    #[inline(always)]
    pub fn set_video_valid(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::VIDEO_VALID_MASK << Self::VIDEO_VALID_OFFSET))
            | ((val & Self::VIDEO_VALID_MASK) << Self::VIDEO_VALID_OFFSET);
    }

    pub const FIFO_UNDERRUN_OFFSET: usize = 7;
    pub const FIFO_UNDERRUN_WIDTH: usize = 1;
    pub const FIFO_UNDERRUN_MASK: u32 = 0x1;

    /// Pixel FIFO underrun
    #[inline(always)]
    #[must_use]
    pub fn fifo_underrun(&self) -> bool {
        let val = (self.0 >> Self::FIFO_UNDERRUN_OFFSET) & Self::FIFO_UNDERRUN_MASK;
        val != 0
    }

    /// Pixel FIFO underrun
    #[inline(always)]
    pub fn set_fifo_underrun(&mut self, val: bool) {
        let val = val as u32;
        self.0 = (self.0 & !(Self::FIFO_UNDERRUN_MASK << Self::FIFO_UNDERRUN_OFFSET))
            | ((val & Self::FIFO_UNDERRUN_MASK) << Self::FIFO_UNDERRUN_OFFSET);
    }
}

impl core::fmt::Debug for IntStatReg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IntStatReg")
            .field("layer_update", &self.layer_update())
            .field("vsync", &self.vsync())
            .field("video_valid", &self.video_valid())
            .field("fifo_underrun", &self.fifo_underrun())
            .finish()
    }
}
