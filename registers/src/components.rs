//! Register component definitions

pub mod alpha_mode_e;
pub mod color_space_e;
pub mod display_interface_e;
pub mod layer_type_e;
pub mod logicvc_regs;
