//! The device context: every piece of state of one compositor instance.
//!
//! Locking: each layer has its own lock and the rest of the device sits
//! behind one common lock. Layer locks are always taken in ascending index
//! order and before the common lock. Interrupt state has a lock of its own,
//! so the interrupt path never waits on a mode change. The register window
//! and the listener list sit behind leaf locks.

mod control;
mod output;
mod palette;
mod vsync;

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use bitflags::bitflags;
use log::{debug, info};
use logicvc_hal::{DelayNs, RegisterIo, VideoMemory};
use logicvc_registers::map::layer as layer_regs;
use logicvc_registers::reg::Register;
use logicvc_registers::{DtypeReg, IntStatReg};

use crate::access::{self, RegisterAccess, RegisterBlock};
use crate::config::{BackgroundSetup, DeviceConfig};
use crate::edid::DisplayDescriptor;
use crate::error::{LogicvcError, Result};
use crate::layer::{default_transparent, Layer, ScreenInfo};
use crate::planner::{self, LayerPlan};
use crate::timing::{ModeLookup, NegotiationContext, Negotiator, VmodeData};
use crate::DisplayInterface;

pub use control::{FillRect, LayerColor, LayerGeometry};

/// Alpha written at bring-up when the alpha register cannot be read back.
const INITIAL_LAYER_ALPHA: u32 = 0xFF;

bitflags! {
    /// Device-wide options fixed at bring-up.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DriverFlags: u32 {
        /// Registers can be read back.
        const READABLE_REGS = 1 << 0;
        /// Modes come from the display descriptor.
        const EDID_VMODE = 1 << 1;
        /// Log the display descriptor when it is attached.
        const EDID_PRINT = 1 << 2;
        /// An external timing controller is fitted.
        const VTC = 1 << 3;
    }
}

/// Device life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Uninitialized,
    /// First mode application, before any layer is exposed.
    ModeInit,
    Ready,
}

/// Output blanking levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankMode {
    Unblank,
    /// Fill the visible window with black.
    Normal,
    VSyncSuspend,
    HSyncSuspend,
    Powerdown,
}

/// Notification sent to listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// A new mode was programmed on behalf of `layer`.
    ModeChanged { layer: usize, mode: VmodeData },
}

/// Mode-change listener. Must not subscribe further listeners.
pub type Listener = Box<dyn Fn(&DeviceEvent) + Send + Sync>;

/// Host resources a device takes ownership of.
pub struct Resources<R, M, D> {
    /// Compositor register window.
    pub regs: R,
    /// External timing controller window.
    pub vtc: Option<R>,
    pub vmem: M,
    pub delay: D,
    pub display: Option<Arc<dyn DisplayDescriptor>>,
}

/// Register windows, memory and delay source plus the access strategy.
pub(crate) struct Hardware<R, M, D> {
    /// Compositor register window, shared with the interrupt path.
    pub(crate) regs: Arc<Mutex<R>>,
    pub(crate) vtc: Option<R>,
    pub(crate) vmem: M,
    pub(crate) delay: D,
    pub(crate) access: Box<dyn RegisterAccess>,
}

impl<R: RegisterIo, M, D> Hardware<R, M, D> {
    pub(crate) fn get(&self, block: RegisterBlock, offset: u32) -> u32 {
        self.access.get(&*lock(&self.regs), block, offset)
    }

    pub(crate) fn set(&mut self, block: RegisterBlock, offset: u32, value: u32) {
        self.access.set(&mut *lock(&self.regs), block, offset, value);
    }

    /// Raw window read, bypassing the access strategy.
    pub(crate) fn read32(&self, offset: u32) -> u32 {
        lock(&self.regs).read32(offset)
    }

    /// Raw window write, bypassing the access strategy.
    pub(crate) fn write32(&mut self, offset: u32, value: u32) {
        lock(&self.regs).write32(offset, value);
    }
}

/// State behind the interrupt lock.
pub(crate) struct IrqState<R> {
    pub(crate) regs: Arc<Mutex<R>>,
    pub(crate) vsync_count: u64,
}

/// State behind the common lock.
pub(crate) struct Common<R, M, D> {
    pub(crate) hw: Hardware<R, M, D>,
    pub(crate) negotiator: Negotiator,
    pub(crate) flags: DriverFlags,
    pub(crate) state: DeviceState,
    /// Sum of all layer use counts.
    pub(crate) use_count: u32,
    pub(crate) display: Option<Arc<dyn DisplayDescriptor>>,
    pub(crate) interface: DisplayInterface,
    pub(crate) dtype: DtypeReg,
    pub(crate) background: Option<BackgroundSetup>,
    pub(crate) active_layer: usize,
    pub(crate) power_on_delay_ms: u32,
    pub(crate) signal_on_delay_ms: u32,
}

pub(crate) fn negotiation<'a>(
    display: Option<&'a dyn DisplayDescriptor>,
    flags: DriverFlags,
    init: bool,
    lookup: &'a dyn ModeLookup,
) -> NegotiationContext<'a> {
    NegotiationContext {
        init,
        descriptor_mode: flags.contains(DriverFlags::EDID_VMODE),
        display,
        lookup,
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One compositor instance.
pub struct Device<R, M, D> {
    pub(crate) common: Mutex<Common<R, M, D>>,
    pub(crate) layers: Vec<Mutex<Layer>>,
    pub(crate) lookup: Box<dyn ModeLookup>,
    pub(crate) irq: Mutex<IrqState<R>>,
    pub(crate) vsync_wait: Condvar,
    pub(crate) listeners: Mutex<Vec<Listener>>,
}

impl<R: RegisterIo, M: VideoMemory, D: DelayNs> Device<R, M, D> {
    /// Bring up a device.
    ///
    /// Checks the description, plans the memory pool, negotiates the startup
    /// mode and programs every layer and the output.
    ///
    /// # Errors
    /// [`LogicvcError::Config`] and the planner errors for unusable
    /// descriptions, [`LogicvcError::ModeNotFound`] when no startup mode can
    /// be selected. Nothing is written to the hardware in either case.
    pub fn new(
        config: &DeviceConfig,
        resources: Resources<R, M, D>,
        lookup: Box<dyn ModeLookup>,
    ) -> Result<Self> {
        let setup = config.normalize()?;

        let inputs: Vec<_> = setup.layers.iter().map(|l| l.plan_input()).collect();
        let plans = planner::plan(&inputs, setup.pool_base, setup.pool_high);
        planner::validate(&inputs, &plans, setup.pool_base, setup.pool_high)?;

        let mut flags = DriverFlags::empty();
        flags.set(DriverFlags::READABLE_REGS, setup.readable_regs);
        flags.set(DriverFlags::EDID_VMODE, setup.edid_vmode);
        flags.set(DriverFlags::EDID_PRINT, setup.edid_print);
        flags.set(DriverFlags::VTC, resources.vtc.is_some());

        let mut negotiator = Negotiator::new(setup.vmode.clone());
        {
            let ctx = negotiation(resources.display.as_deref(), flags, true, lookup.as_ref());
            negotiator.negotiate(
                &ctx,
                setup.mode_option.as_deref(),
                setup.layers[setup.active_layer].bpp,
            )?;
        }
        let mode = negotiator.current().mode;

        let mut layers: Vec<Layer> = setup
            .layers
            .iter()
            .zip(&plans)
            .map(|(layer, plan)| Layer::new(*layer, *plan, setup.pool_base, &mode))
            .collect();
        for layer in &layers {
            log_layer(layer);
        }

        let regs = Arc::new(Mutex::new(resources.regs));
        let irq = IrqState {
            regs: Arc::clone(&regs),
            vsync_count: 0,
        };
        let mut common = Common {
            hw: Hardware {
                access: access::select(setup.readable_regs, layers.len()),
                regs,
                vtc: resources.vtc,
                vmem: resources.vmem,
                delay: resources.delay,
            },
            negotiator,
            flags,
            state: DeviceState::Uninitialized,
            use_count: 0,
            display: resources.display,
            interface: setup.interface,
            dtype: setup.dtype,
            background: setup.background,
            active_layer: setup.active_layer,
            power_on_delay_ms: setup.power_on_delay_ms,
            signal_on_delay_ms: setup.signal_on_delay_ms,
        };

        for layer in &layers {
            common.init_layer_regs(layer);
        }
        let mut mask = IntStatReg::from_raw(0xFFFF);
        mask.set_vsync(false);
        common.hw.set(
            RegisterBlock::Common,
            logicvc_registers::map::common::INT_MASK,
            mask.to_raw(),
        );

        common.state = DeviceState::ModeInit;
        {
            let mut refs: Vec<&mut Layer> = layers.iter_mut().collect();
            common.program_output(&mut refs);
        }
        common.state = DeviceState::Ready;
        info!(
            "logicvc ready: {} layers, mode {}, {} registers",
            layers.len(),
            common.negotiator.current().name,
            if common.hw.access.is_shadowed() { "shadowed" } else { "readable" }
        );
        if let Some(display) = common.display.clone() {
            common.print_display(display.as_ref());
        }

        Ok(Self {
            common: Mutex::new(common),
            layers: layers.into_iter().map(Mutex::new).collect(),
            lookup,
            irq: Mutex::new(irq),
            vsync_wait: Condvar::new(),
            listeners: Mutex::new(Vec::new()),
        })
    }

    fn layer(&self, index: usize) -> Result<&Mutex<Layer>> {
        self.layers.get(index).ok_or(LogicvcError::InvalidLayer(index))
    }

    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn state(&self) -> DeviceState {
        lock(&self.common).state
    }

    #[must_use]
    pub fn flags(&self) -> DriverFlags {
        lock(&self.common).flags
    }

    /// Sum of all layer use counts.
    #[must_use]
    pub fn use_count(&self) -> u32 {
        lock(&self.common).use_count
    }

    /// The mode the output currently runs.
    #[must_use]
    pub fn current_mode(&self) -> VmodeData {
        lock(&self.common).negotiator.current().clone()
    }

    /// The configured (confirmed) mode record.
    #[must_use]
    pub fn configured_mode(&self) -> VmodeData {
        lock(&self.common).negotiator.configured().clone()
    }

    /// Display type register value: interface in the high nibble, color space
    /// in the low one.
    #[must_use]
    pub fn display_type(&self) -> DtypeReg {
        lock(&self.common).dtype
    }

    /// Console layer index.
    #[must_use]
    pub fn active_layer(&self) -> usize {
        lock(&self.common).active_layer
    }

    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index.
    pub fn layer_plan(&self, index: usize) -> Result<LayerPlan> {
        Ok(lock(self.layer(index)?).plan)
    }

    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index.
    pub fn layer_var(&self, index: usize) -> Result<ScreenInfo> {
        Ok(lock(self.layer(index)?).var)
    }

    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index.
    pub fn layer_use_count(&self, index: usize) -> Result<u32> {
        Ok(lock(self.layer(index)?).use_count)
    }

    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index.
    pub fn is_layer_on(&self, index: usize) -> Result<bool> {
        Ok(lock(self.layer(index)?).is_on())
    }

    /// Take a reference on a layer, enabling it on the first one.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index.
    pub fn open(&self, index: usize) -> Result<()> {
        let mut layer = lock(self.layer(index)?);
        let mut common = lock(&self.common);
        if layer.use_count == 0 {
            common.enable_layer(&mut layer);
        }
        layer.use_count += 1;
        common.use_count += 1;
        debug!("layer {index} opened, {} references", layer.use_count);
        Ok(())
    }

    /// Drop a reference on a layer, disabling it with the last one.
    ///
    /// # Errors
    /// [`LogicvcError::InvalidLayer`] for an unknown index,
    /// [`LogicvcError::NotOpen`] when the layer holds no reference.
    pub fn release(&self, index: usize) -> Result<()> {
        let mut layer = lock(self.layer(index)?);
        if layer.use_count == 0 {
            return Err(LogicvcError::NotOpen(index));
        }
        let mut common = lock(&self.common);
        layer.use_count -= 1;
        if layer.use_count == 0 {
            common.disable_layer(&mut layer);
        }
        common.use_count = common.use_count.saturating_sub(1);
        debug!("layer {index} released, {} references", layer.use_count);
        Ok(())
    }

    /// Register a mode-change listener.
    pub fn subscribe(&self, listener: Listener) {
        lock(&self.listeners).push(listener);
    }

    pub(crate) fn notify(&self, event: &DeviceEvent) {
        for listener in lock(&self.listeners).iter() {
            listener(event);
        }
    }

    /// Tear the device down and hand the resources back.
    ///
    /// # Errors
    /// While any layer is open the device is returned unchanged together with
    /// [`LogicvcError::InUse`].
    pub fn remove(self) -> core::result::Result<Resources<R, M, D>, (Self, LogicvcError)> {
        let in_use = lock(&self.common).use_count;
        if in_use != 0 {
            log::error!("device in use by {in_use} references");
            return Err((self, LogicvcError::InUse(in_use)));
        }
        for layer in &self.layers {
            let mut layer = lock(layer);
            lock(&self.common).disable_layer(&mut layer);
        }
        let Self {
            common,
            layers,
            lookup,
            irq,
            vsync_wait,
            listeners,
        } = self;
        let IrqState {
            regs: irq_regs,
            vsync_count,
        } = irq.into_inner().unwrap_or_else(PoisonError::into_inner);
        drop(irq_regs);
        let mut common = common.into_inner().unwrap_or_else(PoisonError::into_inner);
        let Hardware {
            regs,
            vtc,
            vmem,
            delay,
            access,
        } = common.hw;
        match Arc::try_unwrap(regs) {
            Ok(regs) => {
                info!("logicvc removed");
                Ok(Resources {
                    regs: regs.into_inner().unwrap_or_else(PoisonError::into_inner),
                    vtc,
                    vmem,
                    delay,
                    display: common.display,
                })
            }
            Err(regs) => {
                log::error!("register window still shared");
                let irq = IrqState {
                    regs: Arc::clone(&regs),
                    vsync_count,
                };
                common.hw = Hardware {
                    regs,
                    vtc,
                    vmem,
                    delay,
                    access,
                };
                let device = Self {
                    common: Mutex::new(common),
                    layers,
                    lookup,
                    irq: Mutex::new(irq),
                    vsync_wait,
                    listeners,
                };
                Err((device, LogicvcError::InUse(0)))
            }
        }
    }
}

impl<R: RegisterIo, M, D> Common<R, M, D> {
    /// Transparent color, alpha and control of a fresh layer.
    fn init_layer_regs(&mut self, layer: &Layer) {
        let block = RegisterBlock::Layer(layer.id);
        let setup = layer.setup;
        self.hw.set(
            block,
            layer_regs::TRANSP,
            default_transparent(setup.bpp_virt, setup.alpha_mode),
        );
        if !self.flags.contains(DriverFlags::READABLE_REGS) {
            self.hw.set(block, layer_regs::ALPHA, INITIAL_LAYER_ALPHA);
        }
        self.hw.set(block, layer_regs::CTRL, layer.ctrl.to_raw());
    }

    pub(crate) fn enable_layer(&mut self, layer: &mut Layer) {
        layer.ctrl.set_enable(true);
        self.hw
            .set(RegisterBlock::Layer(layer.id), layer_regs::CTRL, layer.ctrl.to_raw());
    }

    pub(crate) fn disable_layer(&mut self, layer: &mut Layer) {
        layer.ctrl.set_enable(false);
        self.hw
            .set(RegisterBlock::Layer(layer.id), layer_regs::CTRL, layer.ctrl.to_raw());
    }

    pub(crate) fn print_display(&self, display: &dyn DisplayDescriptor) {
        if !self.flags.contains(DriverFlags::EDID_PRINT) || !display.is_ready() {
            return;
        }
        for mode in display.modes() {
            info!(
                "display mode {}x{}@{} pixclock {} kHz",
                mode.xres,
                mode.yres,
                mode.derived_refresh(),
                mode.pixclock_khz()
            );
        }
    }
}

fn log_layer(layer: &Layer) {
    let plan = layer.plan;
    let setup = layer.setup;
    debug!(
        "layer {}: address {:#x}, {} bytes, offset {}, buffer offset {}, {} buffers, \
         {}x{} lines, {} bpp ({} virtual)",
        layer.id,
        plan.address,
        plan.size,
        setup.offset,
        setup.buffer_offset,
        plan.buffer_count(),
        setup.width,
        plan.height,
        setup.bpp,
        setup.bpp_virt
    );
}
