//! NES mappers for PRG/CHR memory mapping.
//!
//! Mapper0 (NROM) and common types.

/// Nametable mirroring mode for PPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    /// $2000 = $2400, $2800 = $2C00 (vertical scrolling games).
    Horizontal,
    /// $2000 = $2800, $2400 = $2C00 (horizontal scrolling games).
    Vertical,
}

#[allow(clippy::module_inception)]
pub mod mapper;

pub mod mapper0;
