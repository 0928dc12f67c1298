//! Literal values of the hardware timing registers.

use logicvc_registers::map::{common, vtc};
use logicvc_registers::reg::Register;
use logicvc_registers::CtrlReg;

use super::mode::{VideoMode, VmodeFlags};

/// Compositor sync generator registers. Every count is stored minus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingRegisters {
    pub shsy_fp: u32,
    pub shsy: u32,
    pub shsy_bp: u32,
    pub shsy_res: u32,
    pub svsy_fp: u32,
    pub svsy: u32,
    pub svsy_bp: u32,
    pub svsy_res: u32,
    pub ctrl: CtrlReg,
}

impl TimingRegisters {
    #[must_use]
    pub fn new(mode: &VideoMode, ctrl: CtrlReg) -> Self {
        let minus_one = |v: u32| v.saturating_sub(1);
        Self {
            shsy_fp: minus_one(mode.right_margin),
            shsy: minus_one(mode.hsync_len),
            shsy_bp: minus_one(mode.left_margin),
            shsy_res: minus_one(mode.xres),
            svsy_fp: minus_one(mode.lower_margin),
            svsy: minus_one(mode.vsync_len),
            svsy_bp: minus_one(mode.upper_margin),
            svsy_res: minus_one(mode.yres),
            ctrl,
        }
    }

    /// `(offset, value)` pairs in programming order.
    #[must_use]
    pub fn writes(&self) -> [(u32, u32); 9] {
        [
            (common::SHSY_FP, self.shsy_fp),
            (common::SHSY, self.shsy),
            (common::SHSY_BP, self.shsy_bp),
            (common::SHSY_RES, self.shsy_res),
            (common::SVSY_FP, self.svsy_fp),
            (common::SVSY, self.svsy),
            (common::SVSY_BP, self.svsy_bp),
            (common::SVSY_RES, self.svsy_res),
            (CtrlReg::OFFSET, self.ctrl.to_raw()),
        ]
    }
}

/// External timing controller generator registers.
///
/// Horizontal positions count pixels from the start of active video, vertical
/// positions count lines. Start/end pairs pack the start in the low half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VtcTimings {
    pub active_size: u32,
    pub polarity: u32,
    pub hsize: u32,
    pub vsize: u32,
    pub hsync: u32,
    pub vblank_hoffset: u32,
    pub vsync: u32,
    pub vsync_hoffset: u32,
    pub interlaced: bool,
}

impl VtcTimings {
    #[must_use]
    pub fn new(mode: &VideoMode, ctrl: CtrlReg) -> Self {
        let pack = |low: u32, high: u32| (high << 16) | (low & 0xFFFF);
        let hsync_start = mode.xres + mode.right_margin;
        let hsync_end = hsync_start + mode.hsync_len;
        let vsync_start = mode.yres + mode.lower_margin;
        let vsync_end = vsync_start + mode.vsync_len;
        let polarity = u32::from(ctrl.hsync_high()) << 3 | u32::from(ctrl.vsync_high()) << 2;
        Self {
            active_size: pack(mode.xres, mode.yres),
            polarity,
            hsize: mode.htotal(),
            vsize: pack(mode.vtotal(), mode.vtotal()),
            hsync: pack(hsync_start, hsync_end),
            vblank_hoffset: pack(mode.xres, mode.xres),
            vsync: pack(vsync_start, vsync_end),
            vsync_hoffset: pack(hsync_start, hsync_start),
            interlaced: mode.vmode.contains(VmodeFlags::INTERLACED),
        }
    }

    /// `(offset, value)` pairs in programming order, field 1 only when
    /// interlaced.
    #[must_use]
    pub fn writes(&self) -> Vec<(u32, u32)> {
        let mut writes = vec![
            (vtc::GASIZE, self.active_size),
            (vtc::GPOL, self.polarity),
            (vtc::GHSIZE, self.hsize),
            (vtc::GVSIZE, self.vsize),
            (vtc::GHSYNC, self.hsync),
            (vtc::GVBHOFF_F0, self.vblank_hoffset),
            (vtc::GVSYNC_F0, self.vsync),
            (vtc::GVSHOFF_F0, self.vsync_hoffset),
        ];
        if self.interlaced {
            writes.extend([
                (vtc::GVBHOFF_F1, self.vblank_hoffset),
                (vtc::GVSYNC_F1, self.vsync),
                (vtc::GVSHOFF_F1, self.vsync_hoffset),
            ]);
        }
        writes
    }
}
