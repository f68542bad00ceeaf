//! Byte and word helpers shared by the CPU and PPU.
//!
//! All CPU/PPU state is plain `u8`/`u16`. Arithmetic on it wraps (mod 256 / mod 65536);
//! these helpers cover the bit-level operations the chips need on top of that.

/// Assemble a little-endian word from its low and high bytes.
#[inline]
pub fn word(lo: u8, hi: u8) -> u16 {
    ((hi as u16) << 8) | lo as u16
}

#[inline]
pub fn lo(value: u16) -> u8 {
    (value & 0x00FF) as u8
}

#[inline]
pub fn hi(value: u16) -> u8 {
    (value >> 8) as u8
}

/// Bit `n` of `value` (bit 0 = LSB).
#[inline]
pub fn bit(value: u8, n: u8) -> bool {
    (value >> n) & 1 != 0
}

/// True when `a` and `b` lie in different 256-byte pages.
#[inline]
pub fn page_crossed(a: u16, b: u16) -> bool {
    (a & 0xFF00) != (b & 0xFF00)
}

/// Add a signed 8-bit displacement to an address, wrapping within 64 KiB.
#[inline]
pub fn offset(base: u16, displacement: i8) -> u16 {
    base.wrapping_add(displacement as i16 as u16)
}

/// Narrow a computed value to a byte.
///
/// Panics when the value does not fit: that is an arithmetic defect upstream, and masking it
/// here would only hide it.
#[inline]
pub fn narrow(value: u16) -> u8 {
    assert!(value <= 0xFF, "byte out of range: {value:#06X}");
    value as u8
}
