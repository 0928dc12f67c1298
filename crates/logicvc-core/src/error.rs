use crate::device::BlankMode;

/// Errors reported by the driver core.
///
/// Configuration errors abort bring-up. Every other variant aborts only the
/// operation that raised it and leaves the hardware as it was.
#[derive(Debug, thiserror::Error)]
pub enum LogicvcError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("layer {layer}: memory plan leaves no usable lines")]
    EmptyLayer { layer: usize },

    #[error("layer {layer}: buffer offset {buffer_offset} exceeds the {height} planned lines")]
    NoBuffers {
        layer: usize,
        buffer_offset: u32,
        height: u32,
    },

    #[error("layers {first} and {second} start at the same pool address")]
    OverlappingLayers { first: usize, second: usize },

    #[error("no video mode matches {0:?}")]
    ModeNotFound(String),

    #[error("video mode name too long: {0}")]
    ModeName(String),

    #[error("no layer with index {0}")]
    InvalidLayer(usize),

    #[error("layer {0} is not open")]
    NotOpen(usize),

    #[error("palette range {start}..{end} exceeds {capacity} entries")]
    PaletteRange {
        start: usize,
        end: usize,
        capacity: usize,
    },

    #[error("pixel format cannot be programmed with colors")]
    UnsupportedFormat,

    #[error("pan to ({x}, {y}) leaves the layer")]
    PanOutOfRange { x: u32, y: u32 },

    #[error("y-wrap panning is not supported")]
    PanWrap,

    #[error("unsupported blank mode {0:?}")]
    UnsupportedBlank(BlankMode),

    #[error("register offset {0:#06x} is outside the register window")]
    RegisterOffset(u32),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("device busy: {0} open references")]
    InUse(u32),

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    #[error("no display descriptor attached")]
    NoDisplay,

    #[error("malformed display descriptor: {0}")]
    InvalidEdid(&'static str),
}

pub type Result<T> = core::result::Result<T, LogicvcError>;
