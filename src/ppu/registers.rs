//! Bit views over the PPU's control ($2000), mask ($2001) and status ($2002) registers.

use bitflags::bitflags;

bitflags! {
    /// PPUCTRL ($2000).
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlRegister: u8 {
        /// Base nametable: 0 = $2000, 1 = $2400, 2 = $2800, 3 = $2C00.
        const NAMETABLE_SELECT = 0x03;
        /// VRAM address increment per $2007 access: 0 = 1, 1 = 32.
        const VRAM_INCREMENT = 0x04;
        /// 8x8 sprite pattern table: 0 = $0000, 1 = $1000. Ignored in 8x16 mode.
        const SPRITE_TABLE = 0x08;
        const BACKGROUND_TABLE = 0x10;
        const TALL_SPRITES = 0x20;
        /// PPU master/slave select. Unused on a stock console.
        const EXT_OUTPUT = 0x40;
        const GENERATE_NMI = 0x80;
    }
}

impl ControlRegister {
    pub fn nametable_select(&self) -> u8 {
        (*self & Self::NAMETABLE_SELECT).bits()
    }

    pub fn vram_addr_increment(&self) -> u16 {
        if self.contains(Self::VRAM_INCREMENT) { 32 } else { 1 }
    }

    pub fn sprite_pattern_addr(&self) -> u16 {
        if self.contains(Self::SPRITE_TABLE) { 0x1000 } else { 0x0000 }
    }

    pub fn background_pattern_addr(&self) -> u16 {
        if self.contains(Self::BACKGROUND_TABLE) { 0x1000 } else { 0x0000 }
    }

    pub fn sprite_height(&self) -> u16 {
        if self.contains(Self::TALL_SPRITES) { 16 } else { 8 }
    }
}

bitflags! {
    /// PPUMASK ($2001).
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MaskRegister: u8 {
        const GRAYSCALE = 0x01;
        /// Background in the leftmost 8 columns.
        const BACKGROUND_LEFT = 0x02;
        /// Sprites in the leftmost 8 columns.
        const SPRITES_LEFT = 0x04;
        const SHOW_BACKGROUND = 0x08;
        const SHOW_SPRITES = 0x10;
        // Color emphasis is stored but not rendered.
        const EMPHASIZE_RED = 0x20;
        const EMPHASIZE_GREEN = 0x40;
        const EMPHASIZE_BLUE = 0x80;
    }
}

bitflags! {
    /// PPUSTATUS ($2002). Only bits 7-5 are real; the low five read back as open bus.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusRegister: u8 {
        const SPRITE_OVERFLOW = 0x20;
        const SPRITE_ZERO_HIT = 0x40;
        const VBLANK = 0x80;
    }
}
