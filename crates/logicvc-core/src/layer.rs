//! Runtime state of one layer and its variable screen geometry.

use logicvc_hal::VideoMemory;
use logicvc_registers::map::{transparent, MAX_LINES, MAX_XRES, MAX_YRES, MIN_XRES, MIN_YRES};
use logicvc_registers::LayerCtrlReg;

use crate::color::{ColorLayout, FourCc, PixelFormat, PALETTE_SIZE};
use crate::config::LayerSetup;
use crate::planner::LayerPlan;
use crate::timing::VideoMode;
use crate::AlphaMode;

/// Visible and virtual geometry of a layer plus the output timing it is shown
/// with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenInfo {
    pub xres: u32,
    pub yres: u32,
    pub xres_virtual: u32,
    pub yres_virtual: u32,
    pub xoffset: u32,
    pub yoffset: u32,
    pub bits_per_pixel: u32,
    pub layout: ColorLayout,
    pub fourcc: Option<FourCc>,
    /// Output timing. Its resolution mirrors `xres`/`yres`.
    pub timing: VideoMode,
}

impl ScreenInfo {
    /// Take over resolution and timing of `mode`.
    pub fn set_timing(&mut self, mode: &VideoMode) {
        self.xres = mode.xres;
        self.yres = mode.yres;
        self.timing = *mode;
    }
}

/// Default transparent color for a layer format.
#[must_use]
pub const fn default_transparent(bpp_virt: u32, alpha_mode: AlphaMode) -> u32 {
    match (bpp_virt, alpha_mode) {
        (8, AlphaMode::Clut16) => transparent::COLOR_8BPP_CLUT_16,
        (8, AlphaMode::Clut32) => transparent::COLOR_8BPP_CLUT_32,
        (8, _) => transparent::COLOR_8BPP,
        (16, _) => transparent::COLOR_16BPP,
        _ => transparent::COLOR_32BPP,
    }
}

/// One layer: fixed placement, control flags, geometry and use count.
#[derive(Debug, Clone)]
pub struct Layer {
    pub(crate) id: u8,
    pub(crate) setup: LayerSetup,
    pub(crate) plan: LayerPlan,
    /// Byte offset of the layer inside the video memory pool.
    pub(crate) vmem_offset: usize,
    pub(crate) ctrl: LayerCtrlReg,
    pub(crate) var: ScreenInfo,
    pub(crate) use_count: u32,
    pub(crate) pseudo_palette: [u32; PALETTE_SIZE],
}

impl Layer {
    #[must_use]
    pub fn new(setup: LayerSetup, plan: LayerPlan, pool_base: u64, timing: &VideoMode) -> Self {
        let mut ctrl = LayerCtrlReg::default();
        ctrl.set_swap_rb(setup.swap_rb);
        let format = PixelFormat {
            bpp: setup.bpp,
            bpp_virt: setup.bpp_virt,
            alpha_mode: setup.alpha_mode,
            layer_type: setup.layer_type,
            swap_rb: setup.swap_rb,
        };
        let mut var = ScreenInfo {
            xres: 0,
            yres: 0,
            xres_virtual: setup.width,
            yres_virtual: plan.height.min(MAX_LINES),
            xoffset: 0,
            yoffset: 0,
            bits_per_pixel: setup.bpp,
            layout: format.layout(),
            fourcc: format.fourcc(),
            timing: *timing,
        };
        var.set_timing(timing);
        let vmem_offset =
            usize::try_from(plan.address.saturating_sub(pool_base)).unwrap_or(usize::MAX);
        Self {
            id: plan.layer_index(),
            setup,
            vmem_offset,
            plan,
            ctrl,
            var,
            use_count: 0,
            pseudo_palette: [0; PALETTE_SIZE],
        }
    }

    #[must_use]
    pub const fn id(&self) -> u8 {
        self.id
    }

    #[must_use]
    pub const fn setup(&self) -> &LayerSetup {
        &self.setup
    }

    #[must_use]
    pub const fn plan(&self) -> &LayerPlan {
        &self.plan
    }

    #[must_use]
    pub const fn var(&self) -> &ScreenInfo {
        &self.var
    }

    #[must_use]
    pub const fn ctrl(&self) -> LayerCtrlReg {
        self.ctrl
    }

    #[must_use]
    pub const fn use_count(&self) -> u32 {
        self.use_count
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.ctrl.enable()
    }

    #[must_use]
    pub const fn format(&self) -> PixelFormat {
        PixelFormat {
            bpp: self.setup.bpp,
            bpp_virt: self.setup.bpp_virt,
            alpha_mode: self.setup.alpha_mode,
            layer_type: self.setup.layer_type,
            swap_rb: self.setup.swap_rb,
        }
    }

    /// Bytes per memory row.
    #[must_use]
    pub const fn line_length(&self) -> u32 {
        self.format().line_length(self.setup.width)
    }

    #[must_use]
    pub const fn pseudo_palette(&self) -> &[u32; PALETTE_SIZE] {
        &self.pseudo_palette
    }

    /// Normalize a requested geometry against this layer.
    ///
    /// Resolution is clamped to the hardware limits and the virtual size to the
    /// planned memory. Offsets that would run past the virtual size are pulled
    /// back. Any depth other than the current one becomes the current one,
    /// except 24 which is widened to 32. Format fields always come from the
    /// layer.
    #[must_use]
    pub fn check_var(&self, requested: &ScreenInfo) -> ScreenInfo {
        let mut var = *requested;
        var.xres = var.xres.clamp(MIN_XRES, MAX_XRES);
        var.yres = var.yres.clamp(MIN_YRES, MAX_YRES);

        var.xres_virtual = var.xres_virtual.max(var.xres).min(self.setup.width);
        var.yres_virtual = var.yres_virtual.max(var.yres).min(self.plan.height);

        if var.xoffset.saturating_add(var.xres) >= var.xres_virtual {
            var.xoffset = var.xres_virtual.saturating_sub(var.xres).saturating_sub(1);
        }
        if var.yoffset.saturating_add(var.yres) >= var.yres_virtual {
            var.yoffset = var.yres_virtual.saturating_sub(var.yres).saturating_sub(1);
        }

        if var.bits_per_pixel != self.var.bits_per_pixel {
            var.bits_per_pixel = if var.bits_per_pixel == 24 {
                32
            } else {
                self.var.bits_per_pixel
            };
        }

        var.layout = self.var.layout;
        var.fourcc = self.var.fourcc;
        var.timing.sync = self.var.timing.sync;
        var.timing.xres = var.xres;
        var.timing.yres = var.yres;
        var
    }

    /// Fill the visible window with `value`, `bits` wide per pixel.
    pub(crate) fn fill_visible<M: VideoMemory + ?Sized>(&self, vmem: &mut M, bits: u32, value: u32) {
        let var = &self.var;
        self.fill_area(vmem, (var.xoffset, var.yoffset, var.xres, var.yres), bits, value);
    }

    /// Fill `(x, y, width, height)` of the virtual screen, clipped to it and to
    /// the layer memory.
    pub(crate) fn fill_area<M: VideoMemory + ?Sized>(
        &self,
        vmem: &mut M,
        (x, y, width, height): (u32, u32, u32, u32),
        bits: u32,
        value: u32,
    ) {
        let bytes = (bits / 8) as usize;
        let stride = self.line_length() as usize;
        let end = self
            .vmem_offset
            .saturating_add(usize::try_from(self.plan.size).unwrap_or(usize::MAX))
            .min(vmem.len());
        let x_end = x.saturating_add(width).min(self.setup.width);
        let y_end = y.saturating_add(height).min(self.plan.height);
        for row in y..y_end {
            let row_start = self.vmem_offset + row as usize * stride;
            for col in x..x_end {
                let at = row_start + col as usize * bytes;
                if at + bytes > end {
                    return;
                }
                match bits {
                    8 => vmem.write_u8(at, value as u8),
                    16 => vmem.write_u16(at, value as u16),
                    _ => vmem.write_u32(at, value),
                }
            }
        }
    }
}
