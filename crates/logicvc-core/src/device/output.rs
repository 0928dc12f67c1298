//! Output power sequencing, mode application, blanking and panning.

use log::{debug, error, info};
use logicvc_hal::{DelayNs, RegisterIo, VideoMemory};
use logicvc_registers::map::{common as common_regs, layer as layer_regs, vtc};
use logicvc_registers::reg::Register;
use logicvc_registers::PowerCtrlReg;

use super::{lock, negotiation, BlankMode, Common, Device, DeviceEvent, DeviceState, DriverFlags};
use crate::access::RegisterBlock;
use crate::color::Color;
use crate::error::{LogicvcError, Result};
use crate::layer::{Layer, ScreenInfo};
use crate::timing::hw::{TimingRegisters, VtcTimings};
use crate::timing::{Reapply, VmodeFlags};
use crate::{AlphaMode, LayerType};

/// Settle time after switching the output signal on or off.
const BLANK_SETTLE_MS: u32 = 50;

impl<R: RegisterIo, M, D: DelayNs> Common<R, M, D> {
    fn power_ctrl(&self) -> PowerCtrlReg {
        PowerCtrlReg::from_raw(self.hw.get(RegisterBlock::Common, common_regs::SPWRCTRL))
    }

    fn set_power_ctrl(&mut self, reg: PowerCtrlReg) {
        self.hw
            .set(RegisterBlock::Common, common_regs::SPWRCTRL, reg.to_raw());
    }

    /// Supply first, then the signal, then the backlight.
    pub(crate) fn power_on(&mut self) {
        let mut reg = PowerCtrlReg::default();
        reg.set_vdd_en(true);
        self.set_power_ctrl(reg);
        self.hw.delay.delay_ms(self.power_on_delay_ms);
        reg.set_v_en(true);
        self.set_power_ctrl(reg);
        self.hw.delay.delay_ms(self.signal_on_delay_ms);
        reg.set_blight_en(true);
        self.set_power_ctrl(reg);
    }

    pub(crate) fn power_off(&mut self) {
        self.set_power_ctrl(PowerCtrlReg::default());
    }

    fn set_signal(&mut self, on: bool) {
        let mut reg = self.power_ctrl();
        reg.set_v_en(on);
        self.set_power_ctrl(reg);
        self.hw.delay.delay_ms(BLANK_SETTLE_MS);
    }

    fn write_timing(&mut self) {
        let current = self.negotiator.current();
        let timing = TimingRegisters::new(&current.mode, current.ctrl);
        let vtc_timing = VtcTimings::new(&current.mode, current.ctrl);
        for (offset, value) in timing.writes() {
            self.hw.set(RegisterBlock::Common, offset, value);
        }
        if let Some(regs) = self.hw.vtc.as_mut() {
            let ctl = regs.read32(vtc::CTL);
            regs.write32(vtc::CTL, ctl | vtc::CTL_REG_UPDATE);
            for (offset, value) in vtc_timing.writes() {
                regs.write32(offset, value);
            }
            regs.write32(
                vtc::CTL,
                ctl | vtc::CTL_REG_UPDATE | vtc::CTL_SW_ENABLE | vtc::CTL_GEN_ENABLE,
            );
        }
        debug!(
            "timing: hfp {} hsync {} hbp {} vfp {} vsync {} vbp {} pixclock {} ps, {}x{}",
            current.mode.right_margin,
            current.mode.hsync_len,
            current.mode.left_margin,
            current.mode.lower_margin,
            current.mode.vsync_len,
            current.mode.upper_margin,
            current.mode.pixclock,
            current.mode.xres,
            current.mode.yres
        );
    }

    /// Reprogram the output for the current mode record.
    ///
    /// The output goes down first, then the layers. Layers that were on are
    /// switched back on once the output is powered again.
    pub(crate) fn program_output(&mut self, layers: &mut [&mut Layer]) {
        let was_on: Vec<bool> = layers.iter().map(|l| l.is_on()).collect();
        self.power_off();
        for layer in layers.iter_mut() {
            self.disable_layer(layer);
        }
        self.write_timing();
        self.power_on();
        for (layer, on) in layers.iter_mut().zip(was_on) {
            if on {
                self.enable_layer(layer);
            }
        }
    }

    fn write_pan(&mut self, layer: &Layer) {
        let block = RegisterBlock::Layer(layer.id);
        let var = &layer.var;
        self.hw.set(block, layer_regs::HOR_OFF, var.xoffset);
        self.hw.set(block, layer_regs::VER_OFF, var.yoffset);
        self.hw
            .set(block, layer_regs::HOR_POS, var.xres.saturating_sub(1));
        self.hw
            .set(block, layer_regs::VER_POS, var.yres.saturating_sub(1));
    }
}

/// Pixel width and value that paint a layer black.
const fn black_fill(bpp_virt: u32, alpha_mode: AlphaMode) -> Option<(u32, u32)> {
    match (bpp_virt, alpha_mode) {
        (8, AlphaMode::Layer) => Some((8, 0x00)),
        (8, AlphaMode::Pixel) => Some((16, 0xFF00)),
        (8, AlphaMode::Clut16 | AlphaMode::Clut32) => Some((8, 0)),
        (16, AlphaMode::Layer) => Some((16, 0x0000)),
        (16, AlphaMode::Pixel) => Some((32, 0xFF00_0000)),
        (32, _) => Some((32, 0xFF00_0000)),
        _ => None,
    }
}

impl<R: RegisterIo, M: VideoMemory, D: DelayNs> Device<R, M, D> {
    /// Normalize a requested geometry for a layer without applying it.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index.
    pub fn check_geometry(&self, index: usize, requested: &ScreenInfo) -> Result<ScreenInfo> {
        Ok(lock(self.layer(index)?).check_var(requested))
    }

    /// Normalize and apply a geometry.
    ///
    /// A resolution change renegotiates the mode and reprograms the output;
    /// every layer then takes over the new timing. Anything else only updates
    /// the layer's geometry.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index and
    /// [`LogicvcError::ModeNotFound`] when the new resolution cannot be
    /// negotiated. A failed negotiation leaves the hardware and the layer
    /// geometry untouched.
    pub fn set_geometry(&self, index: usize, requested: &ScreenInfo) -> Result<()> {
        self.layer(index)?;
        let mut guards: Vec<_> = self.layers.iter().map(lock).collect();
        let var = guards[index].check_var(requested);

        let mut common = lock(&self.common);
        let common = &mut *common;
        let current = common.negotiator.current().mode;
        let resolution_change = common.flags.contains(DriverFlags::EDID_VMODE)
            || var.xres != current.xres
            || var.yres != current.yres;
        if !resolution_change {
            guards[index].var = var;
            return Ok(());
        }

        let outcome = {
            let ctx = negotiation(
                common.display.as_deref(),
                common.flags,
                common.state == DeviceState::ModeInit,
                self.lookup.as_ref(),
            );
            common
                .negotiator
                .reapply(&ctx, var.xres, var.yres, var.bits_per_pixel)
        };
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("mode change to {}x{} failed: {e}", var.xres, var.yres);
                return Err(e);
            }
        };
        if outcome == Reapply::Unchanged {
            debug!("configured mode reused");
        }

        let mode = common.negotiator.current().clone();
        guards[index].var = var;
        for layer in &mut guards {
            layer.var.set_timing(&mode.mode);
        }
        {
            let mut refs: Vec<&mut Layer> = guards.iter_mut().map(|g| &mut **g).collect();
            common.program_output(&mut refs);
        }
        info!("video mode {}", mode.name);
        drop(guards);
        self.notify(&DeviceEvent::ModeChanged { layer: index, mode });
        Ok(())
    }

    /// Blank, unblank or power down the output, or paint a layer black.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index,
    /// [`LogicvcError::UnsupportedBlank`] for the sync-suspend levels.
    pub fn blank(&self, index: usize, mode: BlankMode) -> Result<()> {
        let mut layer = lock(self.layer(index)?);
        let mut common = lock(&self.common);
        match mode {
            BlankMode::Unblank => common.set_signal(true),
            BlankMode::Powerdown => common.set_signal(false),
            BlankMode::Normal => {
                let setup = layer.setup;
                if setup.alpha_mode.is_clut() && setup.bpp_virt == 8 {
                    let black = Color {
                        transp: Some(0xFF),
                        ..Color::default()
                    };
                    common.write_color(&mut layer, 0, black)?;
                }
                if let Some((bits, value)) = black_fill(setup.bpp_virt, setup.alpha_mode) {
                    layer.fill_visible(&mut common.hw.vmem, bits, value);
                }
            }
            BlankMode::VSyncSuspend | BlankMode::HSyncSuspend => {
                debug!("blank mode {mode:?} not supported");
                return Err(LogicvcError::UnsupportedBlank(mode));
            }
        }
        Ok(())
    }

    /// Move the visible window inside the layer.
    ///
    /// Offsets may run past the virtual size as long as they stay within the
    /// planned layer memory. YCbCr 4:2:2 layers only pan to even columns.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index,
    /// [`LogicvcError::PanWrap`] for y-wrapping layers and
    /// [`LogicvcError::PanOutOfRange`] when the window would leave the layer.
    /// No register is written on error.
    pub fn pan(&self, index: usize, xoffset: u32, yoffset: u32) -> Result<()> {
        let mut layer = lock(self.layer(index)?);
        let var = layer.var;
        if var.xoffset == xoffset && var.yoffset == yoffset {
            return Ok(());
        }
        if var.timing.vmode.contains(VmodeFlags::YWRAP) {
            return Err(LogicvcError::PanWrap);
        }
        let x_end = u64::from(xoffset) + u64::from(var.xres);
        let y_end = u64::from(yoffset) + u64::from(var.yres);
        let beyond_virtual =
            x_end > u64::from(var.xres_virtual) || y_end > u64::from(var.yres_virtual);
        let beyond_memory =
            x_end > u64::from(layer.setup.width) || y_end > u64::from(layer.plan.height);
        if beyond_virtual && beyond_memory {
            return Err(LogicvcError::PanOutOfRange {
                x: xoffset,
                y: yoffset,
            });
        }

        let mut xoffset = xoffset;
        if layer.setup.layer_type == LayerType::YCbCr && layer.setup.bpp_virt == 16 {
            xoffset &= !1;
        }
        layer.var.xoffset = xoffset;
        layer.var.yoffset = yoffset;
        lock(&self.common).write_pan(&layer);
        Ok(())
    }
}
