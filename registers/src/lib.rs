//! Control/Status register map of the logiCVC-ML video compositor
#![no_std]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::identity_op)]
#![allow(clippy::inline_always)]
#![allow(clippy::unnecessary_cast)]

pub mod components;
pub mod encode;
pub mod map;
pub mod reg;

pub use crate::components::logicvc_regs::{CtrlReg, DtypeReg, IntStatReg, LayerCtrlReg, PowerCtrlReg};
