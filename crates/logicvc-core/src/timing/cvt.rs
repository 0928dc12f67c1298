//! VESA Coordinated Video Timings (CVT 1.1) generator.

use super::mode::{khz_to_picos, SyncFlags, VideoMode, VmodeFlags};

const CELL_GRAN: u32 = 8;
const MARGIN_PERCENT: f64 = 1.8;
const MIN_V_PORCH: u32 = 3;
const MIN_V_BPORCH: u32 = 6;
const MIN_VSYNC_BP_US: f64 = 550.0;
const H_SYNC_PERCENT: f64 = 8.0;
/// Blanking formula gradient and offset, already scaled by the weighting.
const C_PRIME: f64 = 30.0;
const M_PRIME: f64 = 300.0;
const CLOCK_STEP_MHZ: f64 = 0.25;

const RB_H_BLANK: u32 = 160;
const RB_H_SYNC: u32 = 32;
const RB_MIN_V_BLANK_US: f64 = 460.0;
const RB_V_FPORCH: u32 = 3;

/// Generator options, as given by the `R`, `i` and `m` name modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CvtOptions {
    pub reduced_blanking: bool,
    pub interlaced: bool,
    pub margins: bool,
}

fn vsync_for_aspect(xres: u32, yres: u32) -> u32 {
    let ratio = |w: u32, h: u32| yres * w == xres * h;
    if ratio(4, 3) {
        4
    } else if ratio(16, 9) {
        5
    } else if ratio(16, 10) {
        6
    } else if ratio(5, 4) || ratio(15, 9) {
        7
    } else {
        10
    }
}

/// Compute CVT timings for `xres` x `yres` at `refresh` Hz.
///
/// Returns `None` for degenerate requests (zero size or rate).
#[must_use]
pub fn generate(xres: u32, yres: u32, refresh: u32, opts: CvtOptions) -> Option<VideoMode> {
    if xres == 0 || yres == 0 || refresh == 0 {
        return None;
    }

    let h_pixels = xres / CELL_GRAN * CELL_GRAN;
    let h_margin = if opts.margins {
        ((f64::from(h_pixels) * MARGIN_PERCENT / 100.0) as u32) / CELL_GRAN * CELL_GRAN
    } else {
        0
    };
    let active_pixels = h_pixels + 2 * h_margin;

    let v_lines = if opts.interlaced { yres / 2 } else { yres };
    let v_margin = if opts.margins {
        (f64::from(v_lines) * MARGIN_PERCENT / 100.0) as u32
    } else {
        0
    };
    let interlace = if opts.interlaced { 0.5 } else { 0.0 };
    let field_rate = f64::from(if opts.interlaced { refresh * 2 } else { refresh });
    let vsync = vsync_for_aspect(xres, yres);

    let (total_pixels, total_lines, pixel_mhz, hsync, h_back, v_back) = if opts.reduced_blanking {
        let h_period = (1_000_000.0 / field_rate - RB_MIN_V_BLANK_US)
            / f64::from(v_lines + 2 * v_margin);
        let vbi_lines = (RB_MIN_V_BLANK_US / h_period) as u32 + 1;
        let vbi_lines = vbi_lines.max(RB_V_FPORCH + vsync + MIN_V_BPORCH);
        let total_lines = f64::from(vbi_lines + v_lines + 2 * v_margin) + interlace;
        let total_pixels = RB_H_BLANK + active_pixels;
        let pixel_mhz = field_rate * total_lines * f64::from(total_pixels) / 1_000_000.0;
        let v_back = vbi_lines - RB_V_FPORCH - vsync;
        (total_pixels, total_lines, pixel_mhz, RB_H_SYNC, RB_H_BLANK / 2, v_back)
    } else {
        let h_period = (1.0 / field_rate - MIN_VSYNC_BP_US / 1_000_000.0)
            / (f64::from(v_lines + 2 * v_margin + MIN_V_PORCH) + interlace)
            * 1_000_000.0;
        let vsync_bp = ((MIN_VSYNC_BP_US / h_period) as u32 + 1).max(vsync + MIN_V_BPORCH);
        let total_lines = f64::from(v_lines + 2 * v_margin + vsync_bp + MIN_V_PORCH) + interlace;
        let duty = (C_PRIME - M_PRIME * h_period / 1000.0).max(20.0);
        let h_blank = ((f64::from(active_pixels) * duty / (100.0 - duty)) as u32)
            / (2 * CELL_GRAN)
            * (2 * CELL_GRAN);
        let total_pixels = active_pixels + h_blank;
        let pixel_mhz = f64::from(total_pixels) / h_period;
        let hsync = ((f64::from(total_pixels) * H_SYNC_PERCENT / 100.0) as u32) / CELL_GRAN
            * CELL_GRAN;
        (total_pixels, total_lines, pixel_mhz, hsync, h_blank / 2, vsync_bp - vsync)
    };

    let pixel_mhz = (pixel_mhz / CLOCK_STEP_MHZ).floor() * CLOCK_STEP_MHZ;
    let pixel_khz = (pixel_mhz * 1000.0) as u32;
    let h_blank = total_pixels - active_pixels;
    let v_front = if opts.reduced_blanking {
        RB_V_FPORCH
    } else {
        MIN_V_PORCH
    };

    let sync = if opts.reduced_blanking {
        SyncFlags::HOR_HIGH_ACT
    } else {
        SyncFlags::VERT_HIGH_ACT
    };
    let mut vmode = VmodeFlags::empty();
    if opts.interlaced {
        vmode |= VmodeFlags::INTERLACED;
    }

    let refresh_hz = f64::from(pixel_khz) * 1000.0 / (f64::from(total_pixels) * total_lines);

    Some(VideoMode {
        refresh: refresh_hz.round() as u32,
        xres: h_pixels,
        yres,
        pixclock: khz_to_picos(pixel_khz),
        left_margin: h_back + h_margin,
        right_margin: h_blank - hsync - h_back + h_margin,
        upper_margin: v_back + v_margin,
        lower_margin: v_front + v_margin,
        hsync_len: hsync,
        vsync_len: vsync,
        sync,
        vmode,
    })
}
