/// VESA Coordinated Video Timings generator.
pub mod cvt;
/// Literal timing register values.
pub mod hw;
pub mod mode;
/// Built-in mode table and mode-name lookup.
pub mod modedb;
pub mod negotiate;

pub use mode::{SyncFlags, VideoMode, VmodeData, VmodeFlags, DEFAULT_MODE};
pub use modedb::{FoundMode, ModeDb, ModeLookup, ModeMatch};
pub use negotiate::{NegotiationContext, Negotiator, Reapply};
