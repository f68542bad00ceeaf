//! PPU (Picture Processing Unit) emulation for the NES.
//!
//! See [PPU](https://www.nesdev.org/wiki/PPU), [PPU registers](https://www.nesdev.org/wiki/PPU_registers),
//! [PPU memory map](https://www.nesdev.org/wiki/PPU_memory_map). Register ports, nametables with
//! cartridge mirroring, palette RAM, OAM, and a whole-frame background + sprite renderer into
//! a 256×240 RGBA buffer.

pub mod palette;
#[allow(clippy::module_inception)]
pub mod ppu;
pub mod registers;
mod render;

pub use ppu::{FRAME_LEN, PPU, SCREEN_HEIGHT, SCREEN_WIDTH};
