//! Driver core for the logiCVC-ML multi-layer video compositor.
//!
//! Hardware is reached only through the `logicvc-hal` traits, so the same code
//! runs against mapped registers or an in-memory model.

/// Register access strategies (direct or shadowed).
pub mod access;
/// Color and palette encoding per layer pixel format.
pub mod color;
/// Device resource description and its normalization.
pub mod config;
/// Layer/output state machine and the per-layer control surface.
pub mod device;
/// EDID display descriptors.
pub mod edid;
/// Error type shared by every operation.
pub mod error;
/// Runtime layer state and variable screen geometry.
pub mod layer;
/// Layer placement inside the video memory pool.
pub mod planner;
/// Video modes, mode lookup and timing negotiation.
pub mod timing;

pub use color::{Color, ColorMap};
pub use config::{BackgroundConfig, DeviceConfig, LayerConfig, TimingConfig, VideoModeConfig};
pub use device::{
    BlankMode, Device, DeviceEvent, DeviceState, DriverFlags, FillRect, LayerColor, LayerGeometry,
    Resources,
};
pub use error::{LogicvcError, Result};
pub use layer::ScreenInfo;
pub use logicvc_registers::components::alpha_mode_e::AlphaModeE as AlphaMode;
pub use logicvc_registers::components::color_space_e::ColorSpaceE as ColorSpace;
pub use logicvc_registers::components::display_interface_e::DisplayInterfaceE as DisplayInterface;
pub use logicvc_registers::components::layer_type_e::LayerTypeE as LayerType;
