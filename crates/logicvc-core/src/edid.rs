//! Display descriptors (EDID).
//!
//! The host reads the monitor's EDID on its own schedule and publishes it
//! through a [`DisplayDescriptor`]; the driver polls [`DisplayDescriptor::is_ready`]
//! before trusting anything else it reports.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::sync::PoisonError;

use log::{debug, info};

use crate::error::{LogicvcError, Result};
use crate::timing::mode::{khz_to_picos, SyncFlags, VideoMode, VmodeFlags};

/// Bytes returned by a descriptor read (base block plus one extension).
pub const EDID_SIZE: usize = 256;
const BLOCK_SIZE: usize = 128;
const HEADER: [u8; 8] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];
const DTD_START: usize = 54;
const DTD_SIZE: usize = 18;
const DTD_COUNT: usize = 4;

/// Source of display capabilities.
pub trait DisplayDescriptor: Send + Sync {
    /// True once the descriptor has been read from the display.
    fn is_ready(&self) -> bool;

    /// Raw descriptor bytes, if ready.
    fn raw(&self) -> Option<[u8; EDID_SIZE]>;

    /// Modes the display advertises, preferred mode first.
    fn modes(&self) -> Vec<VideoMode>;
}

/// Descriptor backed by raw EDID bytes published later by the host.
#[derive(Debug, Default)]
pub struct EdidDisplay {
    ready: AtomicBool,
    data: Mutex<Option<([u8; EDID_SIZE], Vec<VideoMode>)>>,
}

impl EdidDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish EDID bytes read from the display and mark the descriptor ready.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidEdid`] when the base block is malformed; the
    /// descriptor then stays not ready.
    pub fn publish(&self, bytes: &[u8]) -> Result<()> {
        let modes = parse_detailed_timings(bytes)?;
        let mut raw = [0u8; EDID_SIZE];
        let len = bytes.len().min(EDID_SIZE);
        raw[..len].copy_from_slice(&bytes[..len]);
        info!("display descriptor ready, {} detailed modes", modes.len());
        *self.data.lock().unwrap_or_else(PoisonError::into_inner) = Some((raw, modes));
        self.ready.store(true, Ordering::Release);
        Ok(())
    }
}

impl DisplayDescriptor for EdidDisplay {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn raw(&self) -> Option<[u8; EDID_SIZE]> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(raw, _)| *raw)
    }

    fn modes(&self) -> Vec<VideoMode> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(_, modes)| modes.clone())
            .unwrap_or_default()
    }
}

/// Check header and checksum of the EDID base block.
///
/// # Errors
/// [`LogicvcError::InvalidEdid`] naming the first problem found.
pub fn validate(bytes: &[u8]) -> Result<()> {
    let block = bytes
        .get(..BLOCK_SIZE)
        .ok_or(LogicvcError::InvalidEdid("shorter than one block"))?;
    if block[..HEADER.len()] != HEADER {
        return Err(LogicvcError::InvalidEdid("bad header"));
    }
    let sum = block.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != 0 {
        return Err(LogicvcError::InvalidEdid("bad checksum"));
    }
    Ok(())
}

/// Decode the detailed timing descriptors of the base block.
///
/// # Errors
/// See [`validate`].
pub fn parse_detailed_timings(bytes: &[u8]) -> Result<Vec<VideoMode>> {
    validate(bytes)?;
    let modes: Vec<VideoMode> = bytes[DTD_START..DTD_START + DTD_COUNT * DTD_SIZE]
        .chunks_exact(DTD_SIZE)
        .filter_map(parse_dtd)
        .collect();
    for mode in &modes {
        debug!(
            "edid mode {}x{}@{} pixclock {} ps",
            mode.xres, mode.yres, mode.refresh, mode.pixclock
        );
    }
    Ok(modes)
}

fn parse_dtd(d: &[u8]) -> Option<VideoMode> {
    let clock_10khz = u32::from(u16::from_le_bytes([d[0], d[1]]));
    if clock_10khz == 0 {
        // display descriptor, not a timing
        return None;
    }
    let hi = |byte: u8, shift: u32| u32::from(byte >> shift) & 0x0F;
    let h_active = u32::from(d[2]) | hi(d[4], 4) << 8;
    let h_blank = u32::from(d[3]) | (u32::from(d[4]) & 0x0F) << 8;
    let v_active = u32::from(d[5]) | hi(d[7], 4) << 8;
    let v_blank = u32::from(d[6]) | (u32::from(d[7]) & 0x0F) << 8;
    let h_front = u32::from(d[8]) | (u32::from(d[11]) >> 6 & 0x03) << 8;
    let h_sync = u32::from(d[9]) | (u32::from(d[11]) >> 4 & 0x03) << 8;
    let v_front = u32::from(d[10] >> 4) | (u32::from(d[11]) >> 2 & 0x03) << 4;
    let v_sync = u32::from(d[10] & 0x0F) | (u32::from(d[11]) & 0x03) << 4;
    let flags = d[17];

    let mut sync = SyncFlags::empty();
    if flags & 0x18 == 0x18 {
        if flags & 0x04 != 0 {
            sync |= SyncFlags::VERT_HIGH_ACT;
        }
        if flags & 0x02 != 0 {
            sync |= SyncFlags::HOR_HIGH_ACT;
        }
    }
    let vmode = if flags & 0x80 != 0 {
        VmodeFlags::INTERLACED
    } else {
        VmodeFlags::empty()
    };

    let mut mode = VideoMode {
        refresh: 0,
        xres: h_active,
        yres: v_active,
        pixclock: khz_to_picos(clock_10khz * 10),
        left_margin: h_blank.checked_sub(h_front + h_sync)?,
        right_margin: h_front,
        upper_margin: v_blank.checked_sub(v_front + v_sync)?,
        lower_margin: v_front,
        hsync_len: h_sync,
        vsync_len: v_sync,
        sync,
        vmode,
    };
    mode.refresh = mode.derived_refresh();
    Some(mode)
}
