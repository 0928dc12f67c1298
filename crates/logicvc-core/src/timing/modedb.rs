//! Mode database and mode-name lookup.
//!
//! Names follow `<xres>x<yres>[M][R][-<bpp>][@<refresh>][i][m]`. `M` asks for
//! computed Coordinated Video Timings instead of a table entry, `R` selects
//! reduced blanking, `i` interlace and `m` margins.

use log::debug;

use super::cvt::{self, CvtOptions};
use super::mode::{khz_to_picos, SyncFlags, VideoMode, VmodeFlags, DEFAULT_MODE};

#[allow(clippy::too_many_arguments)]
const fn entry(
    refresh: u32,
    xres: u32,
    yres: u32,
    pixclock: u32,
    margins: [u32; 4],
    hsync_len: u32,
    vsync_len: u32,
    sync: SyncFlags,
) -> VideoMode {
    VideoMode {
        refresh,
        xres,
        yres,
        pixclock,
        left_margin: margins[0],
        right_margin: margins[1],
        upper_margin: margins[2],
        lower_margin: margins[3],
        hsync_len,
        vsync_len,
        sync,
        vmode: VmodeFlags::empty(),
    }
}

const HV_HIGH: SyncFlags = SyncFlags::HOR_HIGH_ACT.union(SyncFlags::VERT_HIGH_ACT);

/// Modes used when the host supplies no database of its own.
pub const BUILTIN_MODES: &[VideoMode] = &[
    entry(60, 640, 480, 39721, [40, 24, 32, 11], 96, 2, SyncFlags::empty()),
    entry(60, 800, 600, 25000, [88, 40, 23, 1], 128, 4, HV_HIGH),
    entry(72, 800, 600, 20000, [64, 56, 23, 37], 120, 6, HV_HIGH),
    DEFAULT_MODE,
    entry(70, 1024, 768, khz_to_picos(75_000), [144, 24, 29, 3], 136, 6, SyncFlags::empty()),
    entry(60, 1280, 720, 13468, [220, 110, 20, 5], 40, 5, HV_HIGH),
    entry(60, 1280, 1024, 9259, [248, 48, 38, 1], 112, 3, HV_HIGH),
    entry(60, 1920, 1080, 6734, [148, 88, 36, 4], 44, 5, HV_HIGH),
];

/// How a lookup arrived at its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeMatch {
    /// Resolution and refresh matched (or timings were computed).
    Exact,
    /// Resolution matched at a different refresh rate.
    IgnoredRefresh,
    /// Nothing matched; the caller's default mode was returned.
    Default,
    /// Nothing matched and no default was given; the first database entry
    /// was returned.
    FirstEntry,
}

/// Result of a mode lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoundMode {
    pub kind: ModeMatch,
    pub mode: VideoMode,
    /// Bit depth from the name, or the caller's depth.
    pub bpp: u32,
}

/// Host-suppliable mode lookup.
pub trait ModeLookup: Send + Sync {
    /// Find the mode called `name` in `db` (an empty `db` means the built-in
    /// table), falling back to `default`.
    ///
    /// Returns `None` only when nothing at all can be offered.
    fn find_mode(
        &self,
        name: Option<&str>,
        db: &[VideoMode],
        default: Option<&VideoMode>,
        bpp: u32,
    ) -> Option<FoundMode>;
}

/// A parsed mode name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeSpec {
    pub resolution: Option<(u32, u32)>,
    pub bpp: Option<u32>,
    pub refresh: Option<u32>,
    pub cvt: bool,
    pub reduced_blanking: bool,
    pub interlaced: bool,
    pub margins: bool,
}

fn take_number(text: &str) -> (Option<u32>, &str) {
    let end = text
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(text.len(), |(i, _)| i);
    (text[..end].parse().ok(), &text[end..])
}

/// Parse a mode name. Returns `None` when the name has trailing garbage.
#[must_use]
pub fn parse_mode_name(name: &str) -> Option<ModeSpec> {
    let mut spec = ModeSpec::default();
    let mut rest = name;

    let (xres, after) = take_number(rest);
    if let Some(xres) = xres {
        let after = after.strip_prefix('x')?;
        let (yres, after) = take_number(after);
        spec.resolution = Some((xres, yres?));
        rest = after;
    }

    loop {
        if let Some(after) = rest.strip_prefix('M') {
            spec.cvt = true;
            rest = after;
        } else if let Some(after) = rest.strip_prefix('R') {
            spec.reduced_blanking = true;
            rest = after;
        } else {
            break;
        }
    }

    if let Some(after) = rest.strip_prefix('-') {
        let (bpp, after) = take_number(after);
        spec.bpp = Some(bpp?);
        rest = after;
    }
    if let Some(after) = rest.strip_prefix('@') {
        let (refresh, after) = take_number(after);
        spec.refresh = Some(refresh?);
        rest = after;
    }

    for c in rest.chars() {
        match c {
            'i' => spec.interlaced = true,
            'm' => spec.margins = true,
            _ => return None,
        }
    }
    Some(spec)
}

/// The default lookup over a mode table.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModeDb;

impl ModeLookup for ModeDb {
    fn find_mode(
        &self,
        name: Option<&str>,
        db: &[VideoMode],
        default: Option<&VideoMode>,
        bpp: u32,
    ) -> Option<FoundMode> {
        let db = if db.is_empty() { BUILTIN_MODES } else { db };
        let spec = name
            .filter(|name| !name.is_empty())
            .and_then(parse_mode_name)
            .unwrap_or_default();
        let bpp = spec.bpp.unwrap_or(bpp);
        let found = |kind, mode| Some(FoundMode { kind, mode, bpp });

        if let Some((xres, yres)) = spec.resolution {
            if spec.cvt {
                let opts = CvtOptions {
                    reduced_blanking: spec.reduced_blanking,
                    interlaced: spec.interlaced,
                    margins: spec.margins,
                };
                if let Some(mode) = cvt::generate(xres, yres, spec.refresh.unwrap_or(60), opts) {
                    debug!("computed CVT timings for {xres}x{yres}");
                    return found(ModeMatch::Exact, mode);
                }
            }

            let same_size = |m: &&VideoMode| m.xres == xres && m.yres == yres;
            let wanted = spec.refresh.unwrap_or(60);
            if let Some(mode) = db.iter().filter(same_size).find(|m| m.refresh == wanted) {
                return found(ModeMatch::Exact, *mode);
            }
            if let Some(mode) = db.iter().find(same_size) {
                let kind = if spec.refresh.is_some() {
                    ModeMatch::IgnoredRefresh
                } else {
                    ModeMatch::Exact
                };
                return found(kind, *mode);
            }
        }

        match default {
            Some(mode) => found(ModeMatch::Default, *mode),
            None => db.first().and_then(|mode| found(ModeMatch::FirstEntry, *mode)),
        }
    }
}
