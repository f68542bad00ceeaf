//! System palette and palette-RAM addressing.

/// 2C02 64-color palette (0xRRGGBB), indexed by the 6-bit values stored in palette RAM.
#[rustfmt::skip]
pub const NES_PALETTE_RGB: [u32; 64] = [
    0x7C7C7C, 0x0000FC, 0x0000BC, 0x4428BC, 0x940084, 0xA80020, 0xA81000, 0x881400,
    0x503000, 0x007800, 0x006800, 0x005800, 0x004058, 0x000000, 0x000000, 0x000000,
    0xBCBCBC, 0x0078F8, 0x0058F8, 0x6844FC, 0xD800CC, 0xE40058, 0xF83800, 0xE45C10,
    0xAC7C00, 0x00B800, 0x00A800, 0x00A844, 0x008888, 0x000000, 0x000000, 0x000000,
    0xF8F8F8, 0x3CBCFC, 0x6888FC, 0x9878F8, 0xF878F8, 0xF85898, 0xF87858, 0xFCA044,
    0xF8B800, 0xB8F818, 0x58D854, 0x58F898, 0x00E8D8, 0x787878, 0x000000, 0x000000,
    0xFCFCFC, 0xA4E4FC, 0xB8B8F8, 0xD8B8F8, 0xF8B8F8, 0xF8A4C0, 0xF0D0B0, 0xFCE0A8,
    0xF8D878, 0xD8F878, 0xB8F8B8, 0xB8F8D8, 0x00FCFC, 0xF8D8F8, 0x000000, 0x000000,
];

/// Resolve PPU palette address $3F00–$3FFF to a 32-byte palette RAM index.
/// $3F10, $3F14, $3F18, $3F1C mirror $3F00, $3F04, $3F08, $3F0C.
pub fn palette_index(addr: u16) -> usize {
    let i = (addr & 0x1F) as usize;
    if i & 0x13 == 0x10 { i & 0x0F } else { i }
}

/// RGBA bytes (alpha 255) for a system palette index; bits 6-7 are ignored.
pub fn rgba(color: u8) -> [u8; 4] {
    let rgb = NES_PALETTE_RGB[(color & 0x3F) as usize];
    [(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 0xFF]
}
