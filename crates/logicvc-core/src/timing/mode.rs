use core::fmt::Write as _;

use bitflags::bitflags;
use logicvc_registers::CtrlReg;

use crate::error::{LogicvcError, Result};

/// Longest mode name the driver keeps, e.g. `1920x1080MR-32@60im`.
pub const MODE_NAME_LEN: usize = 20;
/// Room for both modifier letters of one option group.
pub const MODE_OPTS_LEN: usize = 2;

pub type ModeName = heapless::String<MODE_NAME_LEN>;
pub type ModeOpts = heapless::String<MODE_OPTS_LEN>;

bitflags! {
    /// Sync pulse polarity.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SyncFlags: u32 {
        const HOR_HIGH_ACT = 1 << 0;
        const VERT_HIGH_ACT = 1 << 1;
    }

    /// Scan and panning modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VmodeFlags: u32 {
        const INTERLACED = 1 << 0;
        const DOUBLE = 1 << 1;
        const YWRAP = 1 << 8;
    }
}

/// Timing of one display mode.
///
/// Margins follow the framebuffer convention: `left`/`upper` are the back
/// porches, `right`/`lower` the front porches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoMode {
    pub refresh: u32,
    pub xres: u32,
    pub yres: u32,
    /// Pixel clock period in picoseconds.
    pub pixclock: u32,
    pub left_margin: u32,
    pub right_margin: u32,
    pub upper_margin: u32,
    pub lower_margin: u32,
    pub hsync_len: u32,
    pub vsync_len: u32,
    pub sync: SyncFlags,
    pub vmode: VmodeFlags,
}

/// Fallback used whenever no better mode is available: 1024x768 at 60 Hz.
pub const DEFAULT_MODE: VideoMode = VideoMode {
    refresh: 60,
    xres: 1024,
    yres: 768,
    pixclock: khz_to_picos(65_000),
    left_margin: 160,
    right_margin: 24,
    upper_margin: 29,
    lower_margin: 3,
    hsync_len: 136,
    vsync_len: 6,
    sync: SyncFlags::empty(),
    vmode: VmodeFlags::empty(),
};

/// Pixel clock period in picoseconds for a frequency in kHz.
#[must_use]
pub const fn khz_to_picos(khz: u32) -> u32 {
    if khz == 0 {
        0
    } else {
        1_000_000_000 / khz
    }
}

/// Pixel clock frequency in kHz for a period in picoseconds.
#[must_use]
pub const fn picos_to_khz(picos: u32) -> u32 {
    if picos == 0 {
        0
    } else {
        1_000_000_000 / picos
    }
}

impl VideoMode {
    /// Pixels per line including blanking.
    #[must_use]
    pub const fn htotal(&self) -> u32 {
        self.xres + self.left_margin + self.right_margin + self.hsync_len
    }

    /// Lines per frame including blanking.
    #[must_use]
    pub const fn vtotal(&self) -> u32 {
        self.yres + self.upper_margin + self.lower_margin + self.vsync_len
    }

    #[must_use]
    pub const fn pixclock_khz(&self) -> u32 {
        picos_to_khz(self.pixclock)
    }

    /// Refresh rate implied by the pixel clock and the frame size, rounded to
    /// the closest integer.
    #[must_use]
    pub fn derived_refresh(&self) -> u32 {
        let total = u64::from(self.htotal()) * u64::from(self.vtotal());
        if total == 0 {
            return 0;
        }
        let hz = u64::from(self.pixclock_khz()) * 1000;
        ((hz + total / 2) / total) as u32
    }
}

/// A mode record together with the name and options it was selected by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmodeData {
    pub ctrl: CtrlReg,
    pub mode: VideoMode,
    pub name: ModeName,
    /// Coordinated Video Timings modifiers (`M`, `R`).
    pub opts_cvt: ModeOpts,
    /// Scan modifiers (`i`, `m`).
    pub opts_ext: ModeOpts,
}

impl Default for VmodeData {
    fn default() -> Self {
        Self {
            ctrl: CtrlReg::default(),
            mode: VideoMode::default(),
            name: ModeName::new(),
            opts_cvt: ModeOpts::new(),
            opts_ext: ModeOpts::new(),
        }
    }
}

impl VmodeData {
    /// True when the name carries a resolution (`<x>x<y>...`).
    #[must_use]
    pub fn has_resolution(&self) -> bool {
        self.name.chars().take(10).any(|c| c == 'x')
    }
}

/// Build `<xres>x<yres><cvt>-<bpp>@<refresh><ext>`.
///
/// # Errors
/// [`LogicvcError::ModeName`] when the result does not fit a [`ModeName`].
pub fn canonical_name(
    xres: u32,
    yres: u32,
    opts_cvt: &str,
    bpp: u32,
    refresh: u32,
    opts_ext: &str,
) -> Result<ModeName> {
    let mut name = ModeName::new();
    write!(name, "{xres}x{yres}{opts_cvt}-{bpp}@{refresh}{opts_ext}")
        .map_err(|_| LogicvcError::ModeName(format!("{xres}x{yres}-{bpp}@{refresh}")))?;
    Ok(name)
}

/// Copy a plain string into a [`ModeName`].
///
/// # Errors
/// [`LogicvcError::ModeName`] when `text` is too long.
pub fn mode_name(text: &str) -> Result<ModeName> {
    let mut name = ModeName::new();
    name.write_str(text)
        .map_err(|_| LogicvcError::ModeName(text.to_owned()))?;
    Ok(name)
}

/// Extract modifier letters from a configured mode name.
///
/// `M` and `R` go to the timing-formula options, `i` and `m` to the scan
/// options, each in that fixed order.
#[must_use]
pub fn parse_mode_opts(name: &str) -> (ModeOpts, ModeOpts) {
    let mut cvt = ModeOpts::new();
    let mut ext = ModeOpts::new();
    for letter in ['M', 'R', 'i', 'm'] {
        if !name.contains(letter) {
            continue;
        }
        let opts = if letter.is_ascii_uppercase() {
            &mut cvt
        } else {
            &mut ext
        };
        // each group has room for both of its letters
        let _ = opts.write_char(letter);
    }
    (cvt, ext)
}
