//! NES cartridge loading and mapper support.
//!
//! - **cartridge**: Parses iNES images, holds the mapper and the board's nametable mirroring.
//! - **mapper**: NROM (0), fixed 16/32 KiB PRG and 8 KiB CHR ROM or RAM.

#[allow(clippy::module_inception)]
pub mod cartridge;
pub mod mapper;

pub use cartridge::Cartridge;
pub use mapper::Mirroring;
