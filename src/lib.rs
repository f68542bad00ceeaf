//! Famicore: a frame-stepped NES (Nintendo Entertainment System) emulator core.
//!
//! Implements the NES chipset as documented on the
//! [NESdev Wiki](https://www.nesdev.org/wiki/NES_reference_guide): Ricoh 2A03 CPU (APU registers
//! only, no synthesis), 2C02 PPU, NROM cartridges, and controller I/O. Timing is approximated
//! per frame: the CPU runs a cycle budget, then the PPU renders the whole frame.
//!
//! ## Modules (NESdev references)
//!
//! - **apu** – [APU registers](https://www.nesdev.org/wiki/APU_registers), latched without sound
//! - **bus** – [CPU memory map](https://www.nesdev.org/wiki/CPU_memory_map): RAM, PPU, APU,
//!   controller, cartridge; unmapped addresses fault
//! - **cartridge** – [iNES](https://www.nesdev.org/wiki/INES) loading; [NROM](https://www.nesdev.org/wiki/NROM)
//! - **controller** – [Controller reading](https://www.nesdev.org/wiki/Controller_reading): $4016 strobe, shift-out
//! - **cpu** – [6502](https://www.nesdev.org/wiki/CPU) / 2A03: table-driven, documented + undocumented opcodes, [NMI](https://www.nesdev.org/wiki/NMI)
//! - **ppu** – [PPU](https://www.nesdev.org/wiki/PPU), [PPU registers](https://www.nesdev.org/wiki/PPU_registers), OAM, nametables, 256×240 RGBA
//! - **nes** – the console: frame loop, input, fault latch
//!
//! ```no_run
//! use famicore::nes::Nes;
//!
//! let rom = std::fs::read("game.nes")?;
//! let mut nes = Nes::new(&rom)?;
//! nes.on_frame(|nes| println!("frame {}", nes.frame_count()));
//! nes.run_frame()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod apu;
pub mod bits;
pub mod bus;
pub mod cartridge;
pub mod config;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod logger;
pub mod memory;
pub mod nes;
pub mod ppu;

pub use error::{Error, Fault};
pub use nes::Nes;
