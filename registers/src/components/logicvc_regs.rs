//! Addrmap: logiCVC-ML register window

/// Named types defined within this component's body
pub mod named_types {
    pub mod ctrl_reg;
    pub mod dtype_reg;
    pub mod int_stat_reg;
    pub mod layer_ctrl_reg;
    pub mod power_ctrl_reg;
}

pub use crate::components::logicvc_regs::named_types::ctrl_reg::CtrlReg;
pub use crate::components::logicvc_regs::named_types::dtype_reg::DtypeReg;
pub use crate::components::logicvc_regs::named_types::int_stat_reg::IntStatReg;
pub use crate::components::logicvc_regs::named_types::layer_ctrl_reg::LayerCtrlReg;
pub use crate::components::logicvc_regs::named_types::power_ctrl_reg::PowerCtrlReg;
