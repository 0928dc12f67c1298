//! Video timing negotiation.
//!
//! A device keeps two mode records: the configured one and the current one.
//! Negotiation only ever replaces the current record, and promotes it to the
//! configured record once it is confirmed by a display descriptor or when no
//! explicit resolution was configured.

use log::{debug, info, warn};

use super::mode::{canonical_name, SyncFlags, VmodeData, DEFAULT_MODE};
use super::modedb::{FoundMode, ModeLookup, ModeMatch};
use crate::edid::DisplayDescriptor;
use crate::error::{LogicvcError, Result};

/// Refresh rate requested when re-applying a resolution.
pub const REAPPLY_REFRESH: u32 = 60;

/// Everything a negotiation may consult besides the records themselves.
pub struct NegotiationContext<'a> {
    /// Bring-up phase: an explicitly configured record is taken as is.
    pub init: bool,
    /// Modes must come from the display descriptor.
    pub descriptor_mode: bool,
    pub display: Option<&'a dyn DisplayDescriptor>,
    pub lookup: &'a dyn ModeLookup,
}

impl NegotiationContext<'_> {
    fn display_ready(&self) -> bool {
        self.display.is_some_and(|d| d.is_ready())
    }
}

/// Outcome of re-applying a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reapply {
    /// The canonical name equals the configured one; no lookup was made.
    Unchanged,
    /// A new current record was negotiated.
    Negotiated,
}

/// The configured and current mode records of one device.
#[derive(Debug, Clone)]
pub struct Negotiator {
    configured: VmodeData,
    current: VmodeData,
}

impl Negotiator {
    #[must_use]
    pub fn new(configured: VmodeData) -> Self {
        Self {
            current: configured.clone(),
            configured,
        }
    }

    #[must_use]
    pub fn configured(&self) -> &VmodeData {
        &self.configured
    }

    #[must_use]
    pub fn current(&self) -> &VmodeData {
        &self.current
    }

    /// Select timings for `name` and make them the current record.
    ///
    /// # Errors
    /// [`LogicvcError::ModeNotFound`] when no mode can be selected; the
    /// records are left untouched.
    pub fn negotiate(
        &mut self,
        ctx: &NegotiationContext<'_>,
        name: Option<&str>,
        bpp: u32,
    ) -> Result<&VmodeData> {
        let display_ready = ctx.display_ready();

        if ctx.init && !display_ready && self.configured.has_resolution() {
            debug!("using configured mode {}", self.configured.name);
            self.current = self.configured.clone();
            return Ok(&self.current);
        }

        let found = self.select(ctx, name, bpp)?;
        let mut current = self.configured.clone();
        current.mode = found.mode;
        current.mode.refresh = found.mode.derived_refresh();
        current.ctrl.set_hsync_high(found.mode.sync.contains(SyncFlags::HOR_HIGH_ACT));
        current.ctrl.set_vsync_high(found.mode.sync.contains(SyncFlags::VERT_HIGH_ACT));
        current.name = canonical_name(
            current.mode.xres,
            current.mode.yres,
            &current.opts_cvt,
            found.bpp,
            current.mode.refresh,
            &current.opts_ext,
        )?;
        info!("negotiated video mode {}", current.name);

        if display_ready || !self.configured.has_resolution() {
            self.configured = current.clone();
        }
        self.current = current;
        Ok(&self.current)
    }

    /// Re-apply `xres` x `yres` at `bpp`.
    ///
    /// When the canonical name for the request equals the configured record's
    /// name, the configured record becomes current without any lookup.
    ///
    /// # Errors
    /// As [`Negotiator::negotiate`].
    pub fn reapply(
        &mut self,
        ctx: &NegotiationContext<'_>,
        xres: u32,
        yres: u32,
        bpp: u32,
    ) -> Result<Reapply> {
        let name = canonical_name(
            xres,
            yres,
            &self.current.opts_cvt,
            bpp,
            REAPPLY_REFRESH,
            &self.current.opts_ext,
        )?;
        if self.configured.name == name {
            self.current = self.configured.clone();
            return Ok(Reapply::Unchanged);
        }
        self.negotiate(ctx, Some(&name), bpp)?;
        Ok(Reapply::Negotiated)
    }

    fn select(
        &self,
        ctx: &NegotiationContext<'_>,
        name: Option<&str>,
        bpp: u32,
    ) -> Result<FoundMode> {
        let not_found = || LogicvcError::ModeNotFound(name.unwrap_or("").to_owned());

        if ctx.descriptor_mode {
            if let Some(display) = ctx.display.filter(|d| d.is_ready()) {
                let modes = display.modes();
                if !modes.is_empty() {
                    let found = ctx
                        .lookup
                        .find_mode(name, &modes, Some(&DEFAULT_MODE), bpp)
                        .ok_or_else(not_found)?;
                    return match found.kind {
                        ModeMatch::Exact | ModeMatch::IgnoredRefresh => Ok(found),
                        // bring-up takes the display's preferred mode instead
                        _ if ctx.init => Ok(FoundMode {
                            kind: ModeMatch::FirstEntry,
                            mode: modes[0],
                            bpp: found.bpp,
                        }),
                        _ => {
                            warn!("display does not advertise {:?}", name);
                            Err(not_found())
                        }
                    };
                }
            }
        }

        let found = ctx
            .lookup
            .find_mode(name, &[], Some(&DEFAULT_MODE), bpp)
            .ok_or_else(not_found)?;
        if found.kind != ModeMatch::Exact {
            debug!("mode {:?} resolved as {:?}", name, found.kind);
        }
        Ok(found)
    }
}
