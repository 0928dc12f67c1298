//! Device resource description.
//!
//! A [`DeviceConfig`] is what the host knows about one compositor instance
//! before bring-up: where its windows are, how the layers are laid out in the
//! video memory pool and which mode to start in. [`DeviceConfig::normalize`]
//! checks it and turns it into the [`DeviceSetup`] the device is built from.

use log::warn;
use logicvc_registers::map::MAX_LAYERS;
use logicvc_registers::{CtrlReg, DtypeReg};

use crate::error::{LogicvcError, Result};
use crate::planner::PlanInput;
use crate::timing::mode::{
    khz_to_picos, mode_name, parse_mode_opts, SyncFlags, VideoMode, VmodeData, VmodeFlags,
};
use crate::{AlphaMode, ColorSpace, DisplayInterface, LayerType};

/// Row stride used when a layer does not configure one.
pub const DEFAULT_ROW_STRIDE: u32 = 1024;
/// Data width used when a layer does not configure one.
pub const DEFAULT_DATA_WIDTH: u32 = 16;
/// Refresh rate assumed when the configuration names none.
pub const DEFAULT_REFRESH: u32 = 60;

/// Everything the host supplies about one compositor instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeviceConfig {
    /// Physical base of the register window.
    pub regs_base: u64,
    pub irq: u32,
    /// Physical base of the external timing controller, if fitted.
    pub vtc_base: Option<u64>,
    pub pool_base: u64,
    pub pool_high: u64,
    /// The register window can be read back.
    pub readable_regs: bool,
    /// Display interface code, see [`DisplayInterface`].
    pub interface: u8,
    /// Display color space code, see [`ColorSpace`].
    pub color_space: u8,
    /// Take video modes from the attached display descriptor.
    pub edid_vmode: bool,
    /// Log the display descriptor once it is attached.
    pub edid_print: bool,
    pub power_on_delay_ms: u32,
    pub signal_on_delay_ms: u32,
    pub pixel_data_invert: bool,
    pub pixel_clock_active_high: bool,
    /// Console layer index.
    pub active_layer: usize,
    pub background: Option<BackgroundConfig>,
    pub video_mode: Option<VideoModeConfig>,
    pub layers: Vec<LayerConfig>,
}

/// Placement and format of one layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayerConfig {
    /// Start of the layer inside the pool, in rows of `row_stride` pixels.
    pub offset: u32,
    /// Lines per buffer.
    pub buffer_offset: u32,
    /// Row stride in pixels, 0 for the default.
    pub row_stride: u32,
    /// Layer type code, see [`LayerType`].
    pub layer_type: u8,
    /// Alpha mode code, see [`AlphaMode`].
    pub alpha_mode: u8,
    /// Bits per pixel of the color data, 0 for the default.
    pub data_width: u32,
    /// Components are stored blue first.
    pub abgr: bool,
}

/// The background plane. It has no memory of its own, only a color.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BackgroundConfig {
    /// Data width, 0 for the default.
    pub data_width: u32,
    pub alpha_mode: u8,
}

/// Startup video mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VideoModeConfig {
    /// Mode name such as `1024x768` or `1280x720MR`. A `_suffix` is ignored.
    pub name: String,
    /// Explicit timings; without them the name is looked up.
    pub timings: Option<TimingConfig>,
}

/// Literal timings of the startup mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingConfig {
    pub refresh: u32,
    pub xres: u32,
    pub yres: u32,
    pub pixclock_khz: u32,
    pub left_margin: u32,
    pub right_margin: u32,
    pub upper_margin: u32,
    pub lower_margin: u32,
    pub hsync_len: u32,
    pub vsync_len: u32,
    /// Sync polarity bits, see [`SyncFlags`].
    pub sync: u32,
    /// Scan bits, see [`VmodeFlags`].
    pub vmode: u32,
}

impl TimingConfig {
    #[must_use]
    pub fn to_mode(&self) -> VideoMode {
        VideoMode {
            refresh: self.refresh,
            xres: self.xres,
            yres: self.yres,
            pixclock: khz_to_picos(self.pixclock_khz),
            left_margin: self.left_margin,
            right_margin: self.right_margin,
            upper_margin: self.upper_margin,
            lower_margin: self.lower_margin,
            hsync_len: self.hsync_len,
            vsync_len: self.vsync_len,
            sync: SyncFlags::from_bits_truncate(self.sync),
            vmode: VmodeFlags::from_bits_truncate(self.vmode),
        }
    }
}

/// A checked layer description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSetup {
    pub offset: u32,
    pub buffer_offset: u32,
    /// Row stride in pixels.
    pub width: u32,
    /// Stored bits per pixel.
    pub bpp: u32,
    /// Bits per pixel of the color part.
    pub bpp_virt: u32,
    pub layer_type: LayerType,
    pub alpha_mode: AlphaMode,
    pub swap_rb: bool,
}

impl LayerSetup {
    #[must_use]
    pub const fn plan_input(&self) -> PlanInput {
        PlanInput {
            offset: self.offset,
            buffer_offset: self.buffer_offset,
            width: self.width,
            bpp: self.bpp,
        }
    }
}

/// A checked background description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundSetup {
    pub bpp: u32,
    pub alpha_mode: AlphaMode,
}

/// A checked device description, ready for bring-up.
#[derive(Debug, Clone)]
pub struct DeviceSetup {
    pub pool_base: u64,
    pub pool_high: u64,
    pub readable_regs: bool,
    pub has_vtc: bool,
    pub interface: DisplayInterface,
    pub color_space: ColorSpace,
    pub dtype: DtypeReg,
    pub edid_vmode: bool,
    pub edid_print: bool,
    pub power_on_delay_ms: u32,
    pub signal_on_delay_ms: u32,
    pub active_layer: usize,
    pub layers: Vec<LayerSetup>,
    pub background: Option<BackgroundSetup>,
    /// The configured mode record.
    pub vmode: VmodeData,
    /// Mode name handed to the first lookup.
    pub mode_option: Option<String>,
}

fn config_err(msg: impl Into<String>) -> LogicvcError {
    LogicvcError::Config(msg.into())
}

/// Stored width for a configured data width.
const fn data_width(width: u32) -> u32 {
    match width {
        0 => DEFAULT_DATA_WIDTH,
        24 => 32,
        w => w,
    }
}

fn check_width(what: &str, bpp: u32) -> Result<()> {
    if matches!(bpp, 8 | 16 | 32) {
        Ok(())
    } else {
        Err(config_err(format!("{what}: unsupported data width {bpp}")))
    }
}

impl LayerConfig {
    /// Check and normalize one layer.
    ///
    /// # Errors
    /// [`LogicvcError::Config`] for unknown codes, unsupported widths, a zero
    /// buffer offset and a row stride whose line length overflows.
    pub fn normalize(&self, id: usize) -> Result<LayerSetup> {
        let what = format!("layer {id}");
        let layer_type = LayerType::from_bits(self.layer_type)
            .map_err(|e| config_err(format!("{what}: unknown layer type {e}")))?;
        let mut alpha_mode = AlphaMode::from_bits(self.alpha_mode)
            .map_err(|e| config_err(format!("{what}: unknown alpha mode {e}")))?;
        if layer_type == LayerType::Alpha {
            alpha_mode = AlphaMode::Layer;
        }
        if self.buffer_offset == 0 {
            return Err(config_err(format!("{what}: zero buffer offset")));
        }

        let bpp_virt = data_width(self.data_width);
        check_width(&what, bpp_virt)?;
        let bpp = match (bpp_virt, alpha_mode) {
            (8, AlphaMode::Pixel) => 16,
            (16, AlphaMode::Pixel) => 32,
            (b, _) => b,
        };
        if bpp_virt != 8 && alpha_mode.is_clut() {
            warn!("{what}: palette alpha needs 8 bpp, using layer alpha");
            alpha_mode = AlphaMode::Layer;
        }

        let width = if self.row_stride == 0 {
            DEFAULT_ROW_STRIDE
        } else {
            self.row_stride
        };
        if width.checked_mul(bpp).is_none() {
            return Err(config_err(format!("{what}: row stride {width} too large")));
        }

        Ok(LayerSetup {
            offset: self.offset,
            buffer_offset: self.buffer_offset,
            width,
            bpp,
            bpp_virt,
            layer_type,
            alpha_mode,
            swap_rb: self.abgr,
        })
    }
}

impl BackgroundConfig {
    /// # Errors
    /// [`LogicvcError::Config`] for an unknown alpha mode or width.
    pub fn normalize(&self) -> Result<BackgroundSetup> {
        let bpp = data_width(self.data_width);
        check_width("background", bpp)?;
        let alpha_mode = AlphaMode::from_bits(self.alpha_mode)
            .map_err(|e| config_err(format!("background: unknown alpha mode {e}")))?;
        Ok(BackgroundSetup { bpp, alpha_mode })
    }
}

/// Initial control register: sync polarity plus the two pixel flags.
#[must_use]
pub fn initial_ctrl(sync: SyncFlags, pixel_data_invert: bool, pixel_clock_active_high: bool) -> CtrlReg {
    let mut ctrl = CtrlReg::default();
    ctrl.set_hsync_high(sync.contains(SyncFlags::HOR_HIGH_ACT));
    ctrl.set_vsync_high(sync.contains(SyncFlags::VERT_HIGH_ACT));
    ctrl.set_pix_data_invert(pixel_data_invert);
    ctrl.set_pix_clk_act_high(pixel_clock_active_high);
    ctrl
}

impl DeviceConfig {
    /// Check the description and derive the bring-up parameters.
    ///
    /// # Errors
    /// [`LogicvcError::Config`] for anything bring-up cannot work with.
    pub fn normalize(&self) -> Result<DeviceSetup> {
        if self.layers.is_empty() {
            return Err(config_err("zero layers"));
        }
        if self.layers.len() > MAX_LAYERS {
            return Err(config_err(format!(
                "{} layers configured, hardware has {MAX_LAYERS}",
                self.layers.len()
            )));
        }
        if self.pool_high <= self.pool_base {
            return Err(config_err(format!(
                "empty video memory pool {:#x}..{:#x}",
                self.pool_base, self.pool_high
            )));
        }
        let interface = DisplayInterface::from_bits(self.interface)
            .map_err(|e| config_err(format!("unknown display interface {e}")))?;
        let color_space = ColorSpace::from_bits(self.color_space)
            .map_err(|e| config_err(format!("unknown color space {e}")))?;

        let layers = self
            .layers
            .iter()
            .enumerate()
            .map(|(id, layer)| layer.normalize(id))
            .collect::<Result<Vec<_>>>()?;
        let background = self
            .background
            .as_ref()
            .map(BackgroundConfig::normalize)
            .transpose()?;

        let active_layer = if self.active_layer < layers.len() {
            self.active_layer
        } else {
            warn!("active layer {} out of range, using 0", self.active_layer);
            0
        };

        let mut dtype = DtypeReg::default();
        dtype.set_interface(interface.bits());
        dtype.set_color_space(color_space.bits());

        let (vmode, mode_option) = self.configured_mode(layers[active_layer].bpp)?;

        Ok(DeviceSetup {
            pool_base: self.pool_base,
            pool_high: self.pool_high,
            readable_regs: self.readable_regs,
            has_vtc: self.vtc_base.is_some(),
            interface,
            color_space,
            dtype,
            edid_vmode: self.edid_vmode,
            edid_print: self.edid_print,
            power_on_delay_ms: self.power_on_delay_ms,
            signal_on_delay_ms: self.signal_on_delay_ms,
            active_layer,
            layers,
            background,
            vmode,
            mode_option,
        })
    }

    /// The configured mode record and the name to look up at bring-up.
    ///
    /// The record carries a name only when explicit timings are configured;
    /// otherwise it holds just the control register and the refresh rate.
    fn configured_mode(&self, bpp: u32) -> Result<(VmodeData, Option<String>)> {
        let mut vmode = VmodeData::default();
        let timings = self.video_mode.as_ref().and_then(|m| m.timings);
        let sync = timings.map_or(SyncFlags::empty(), |t| SyncFlags::from_bits_truncate(t.sync));
        vmode.ctrl = initial_ctrl(sync, self.pixel_data_invert, self.pixel_clock_active_high);

        let Some(config) = &self.video_mode else {
            vmode.mode.refresh = DEFAULT_REFRESH;
            return Ok((vmode, None));
        };

        let base = config.name.split('_').next().unwrap_or_default();
        let refresh = timings.map_or(DEFAULT_REFRESH, |t| t.refresh);
        let option = format!("{base}-{bpp}@{refresh}");

        match timings {
            Some(t) => {
                vmode.mode = t.to_mode();
                vmode.name = mode_name(&option)?;
            }
            None => vmode.mode.refresh = refresh,
        }
        if !self.edid_vmode {
            let (cvt, ext) = parse_mode_opts(base);
            vmode.opts_cvt = cvt;
            vmode.opts_ext = ext;
        }
        Ok((vmode, Some(option)))
    }
}
