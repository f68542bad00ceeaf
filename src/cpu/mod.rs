//! 6502 CPU emulation for the NES.
//!
//! Table-driven fetch/decode/execute over all 256 opcode bytes, including the undocumented
//! ones. Memory and I/O go through the [`Bus`](crate::bus::Bus) trait, borrowed per step.

mod addressing;
#[allow(clippy::module_inception)]
pub mod cpu;
pub mod flags;
mod instructions;
pub mod opcodes;

#[cfg(test)]
mod tests;

pub use cpu::{CPU, Registers};
