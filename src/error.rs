//! Error types for cartridge loading and emulation faults.
//!
//! Execution errors (`BusError`, `CpuError`) are fatal: the orchestrator latches the first one
//! into a [`Fault`] together with the CPU state and stops the frame loop.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::cpu::Registers;

/// Direction of a bus access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => f.write_str("read"),
            Access::Write => f.write_str("write"),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    #[error("unmapped {access} at ${address:04X}")]
    Unmapped { address: u16, access: Access },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuError {
    #[error("illegal opcode ${opcode:02X} at ${pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },
    #[error(transparent)]
    Bus(#[from] BusError),
}

#[derive(Error, Debug)]
pub enum CartridgeError {
    #[error("cartridge image is {len} bytes, shorter than the 16-byte header")]
    TooShort { len: usize },
    #[error("header declares {expected} bytes of PRG/CHR data, image has {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("header declares no PRG ROM")]
    NoProgramRom,
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u8),
    #[error("unsupported PRG ROM size: {banks} × 16 KiB (fixed mapping needs 1 or 2)")]
    UnsupportedProgramSize { banks: usize },
    #[error("failed to read cartridge: {0}")]
    Io(#[from] io::Error),
}

/// A fatal emulation error with the CPU state at the point it happened.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{cause} (opcode {}, {registers})", OpcodeLabel(*.opcode))]
pub struct Fault {
    pub cause: CpuError,
    /// Opcode of the instruction in flight, if it had been fetched.
    pub opcode: Option<u8>,
    pub registers: Registers,
}

struct OpcodeLabel(Option<u8>);

impl fmt::Display for OpcodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(op) => write!(f, "${op:02X}"),
            None => f.write_str("none"),
        }
    }
}

/// Errors surfaced by [`crate::nes::Nes`] to hosts.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Cartridge(#[from] CartridgeError),
    #[error("emulation halted: {0}")]
    Fault(#[from] Fault),
}
