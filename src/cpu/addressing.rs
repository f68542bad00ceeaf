//! Operand resolution for the 13 addressing modes.
//!
//! Each mode consumes its operand bytes by sequential fetch at PC. Zero-page indexing and
//! zero-page pointers wrap within page 0; `JMP ($xxFF)` re-reads the pointer's high byte from
//! the start of the same page, as the NMOS 6502 does.

use crate::{
    bits,
    bus::Bus,
    cpu::{cpu::CPU, opcodes::AddressingMode},
    error::CpuError,
};

/// What an instruction operates on after its addressing mode is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Implied,
    Accumulator,
    Immediate(u8),
    /// Branch target, already offset from the following instruction.
    Relative(u16),
    Memory(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub operand: Operand,
    /// Address before X/Y indexing (the pointer value for `(zp),Y`).
    pub base: u16,
    /// Indexing or branching moved into a different page.
    pub crossed: bool,
}

impl Resolved {
    fn plain(operand: Operand) -> Self {
        Self {
            operand,
            base: 0,
            crossed: false,
        }
    }

    fn memory(addr: u16) -> Self {
        Self {
            operand: Operand::Memory(addr),
            base: addr,
            crossed: false,
        }
    }

    fn indexed(base: u16, addr: u16) -> Self {
        Self {
            operand: Operand::Memory(addr),
            base,
            crossed: bits::page_crossed(base, addr),
        }
    }
}

impl CPU {
    pub(super) fn resolve<B: Bus>(
        &mut self,
        bus: &mut B,
        mode: AddressingMode,
    ) -> Result<Resolved, CpuError> {
        use AddressingMode::*;

        let resolved = match mode {
            Implied => Resolved::plain(Operand::Implied),
            Accumulator => Resolved::plain(Operand::Accumulator),
            Immediate => Resolved::plain(Operand::Immediate(self.fetch_byte(bus)?)),
            Relative => {
                let displacement = self.fetch_byte(bus)? as i8;
                let target = bits::offset(self.pc, displacement);
                Resolved {
                    operand: Operand::Relative(target),
                    base: self.pc,
                    crossed: bits::page_crossed(self.pc, target),
                }
            }
            ZeroPage => Resolved::memory(self.fetch_byte(bus)? as u16),
            ZeroPageX => Resolved::memory(self.fetch_byte(bus)?.wrapping_add(self.x) as u16),
            ZeroPageY => Resolved::memory(self.fetch_byte(bus)?.wrapping_add(self.y) as u16),
            Absolute => Resolved::memory(self.fetch_word(bus)?),
            AbsoluteX => {
                let base = self.fetch_word(bus)?;
                Resolved::indexed(base, base.wrapping_add(self.x as u16))
            }
            AbsoluteY => {
                let base = self.fetch_word(bus)?;
                Resolved::indexed(base, base.wrapping_add(self.y as u16))
            }
            Indirect => {
                let ptr = self.fetch_word(bus)?;
                // High byte comes from the same page: ($10FF) reads $10FF and $1000.
                let hi_addr = (ptr & 0xFF00) | (bits::lo(ptr).wrapping_add(1) as u16);
                let lo = bus.read(ptr)?;
                let hi = bus.read(hi_addr)?;
                Resolved::memory(bits::word(lo, hi))
            }
            IndirectX => {
                let zp = self.fetch_byte(bus)?.wrapping_add(self.x);
                let addr = self.read_zero_page_word(bus, zp)?;
                Resolved::memory(addr)
            }
            IndirectY => {
                let zp = self.fetch_byte(bus)?;
                let base = self.read_zero_page_word(bus, zp)?;
                Resolved::indexed(base, base.wrapping_add(self.y as u16))
            }
        };
        Ok(resolved)
    }

    /// Little-endian pointer from page 0; the high byte wraps from $FF to $00.
    fn read_zero_page_word<B: Bus>(&mut self, bus: &mut B, zp: u8) -> Result<u16, CpuError> {
        let lo = bus.read(zp as u16)?;
        let hi = bus.read(zp.wrapping_add(1) as u16)?;
        Ok(bits::word(lo, hi))
    }

    /// Read the operand value. Implied operands have none.
    pub(super) fn load<B: Bus>(&mut self, bus: &mut B, operand: Operand) -> Result<u8, CpuError> {
        match operand {
            Operand::Immediate(value) => Ok(value),
            Operand::Accumulator => Ok(self.a),
            Operand::Memory(addr) => Ok(bus.read(addr)?),
            Operand::Implied | Operand::Relative(_) => Err(self.illegal()),
        }
    }

    /// Write back a read-modify-write result (memory or accumulator).
    pub(super) fn store<B: Bus>(
        &mut self,
        bus: &mut B,
        operand: Operand,
        value: u8,
    ) -> Result<(), CpuError> {
        match operand {
            Operand::Accumulator => {
                self.a = value;
                Ok(())
            }
            Operand::Memory(addr) => Ok(bus.write(addr, value)?),
            Operand::Implied | Operand::Immediate(_) | Operand::Relative(_) => Err(self.illegal()),
        }
    }

    /// Effective address, for stores and jumps.
    pub(super) fn address(&self, operand: Operand) -> Result<u16, CpuError> {
        match operand {
            Operand::Memory(addr) => Ok(addr),
            _ => Err(self.illegal()),
        }
    }
}
