//! Register value abstraction

/// A register value type with a raw 32-bit representation.
pub trait Register: Copy {
    /// Byte offset of the register inside its block.
    const OFFSET: u32;

    /// Reinterpret a raw value read from (or shadowed for) the register.
    fn from_raw(val: u32) -> Self;

    /// Raw value to write to the register.
    fn to_raw(self) -> u32;
}
