use std::fmt;

use crate::{
    bits,
    bus::Bus,
    cpu::{
        flags::{
            FLAG_BREAK, FLAG_INTERRUPT_DISABLE, FLAG_NEGATIVE, FLAG_UNUSED, FLAG_ZERO,
            POWER_ON_STATUS,
        },
        opcodes,
    },
    error::CpuError,
};

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

const STACK_PAGE: u16 = 0x0100;
const INTERRUPT_CYCLES: u64 = 7;

/// Copy of the programmer-visible CPU state, for fault reports and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub status: u8,
    pub pc: u16,
    pub cycles: u64,
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PC:{:04X} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            self.pc, self.a, self.x, self.y, self.status, self.sp, self.cycles
        )
    }
}

/// Ricoh 2A03 CPU core. The bus is borrowed per call, never owned.
pub struct CPU {
    pub(super) a: u8,
    pub(super) x: u8,
    pub(super) y: u8,
    pub(super) sp: u8,
    pub(super) pc: u16,
    pub(super) status: u8,
    pub(super) cycles: u64,
    /// Opcode of the instruction in flight (or last executed).
    pub(super) opcode: Option<u8>,
    /// Address the in-flight opcode was fetched from.
    pub(super) opcode_pc: u16,
}

impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}

impl CPU {
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            status: POWER_ON_STATUS,
            cycles: 0,
            opcode: None,
            opcode_pc: 0,
        }
    }

    pub fn reset<B: Bus>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        self.pc = self.read_word(bus, RESET_VECTOR)?;

        self.sp = 0xFD; // the reset sequence does three phantom pushes from $00
        self.status = POWER_ON_STATUS;

        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.opcode = None;

        self.cycles = INTERRUPT_CYCLES;
        log::info!("CPU reset, PC=${:04X}", self.pc);
        Ok(())
    }

    /// Execute one instruction, servicing a pending NMI first.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        if bus.poll_nmi() {
            self.nmi(bus)?;
        }

        self.opcode = None;
        self.opcode_pc = self.pc;
        let opcode = self.fetch_byte(bus)?;
        self.opcode = Some(opcode);

        let Some(op) = opcodes::decode(opcode) else {
            return Err(self.illegal());
        };
        self.trace(op);

        let resolved = self.resolve(bus, op.mode)?;
        self.cycles += op.cycles as u64;
        if op.page_cycle && resolved.crossed {
            self.cycles += 1;
        }
        self.execute(bus, op, resolved)
    }

    /// Non-maskable interrupt: push PC and P (B clear), jump through $FFFA.
    pub fn nmi<B: Bus>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        self.interrupt(bus, NMI_VECTOR, false)
    }

    pub fn a(&self) -> u8 {
        self.a
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn y(&self) -> u8 {
        self.y
    }

    pub fn sp(&self) -> u8 {
        self.sp
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn status(&self) -> u8 {
        self.status
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Opcode fetched by the most recent `step`, if the fetch succeeded.
    pub fn current_opcode(&self) -> Option<u8> {
        self.opcode
    }

    pub fn registers(&self) -> Registers {
        Registers {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            status: self.status,
            pc: self.pc,
            cycles: self.cycles,
        }
    }

    pub(super) fn interrupt<B: Bus>(
        &mut self,
        bus: &mut B,
        vector: u16,
        brk: bool,
    ) -> Result<(), CpuError> {
        self.push_word(bus, self.pc)?;
        let pushed = if brk {
            self.status | FLAG_BREAK | FLAG_UNUSED
        } else {
            (self.status & !FLAG_BREAK) | FLAG_UNUSED
        };
        self.push(bus, pushed)?;
        self.set_flag(FLAG_INTERRUPT_DISABLE, true);
        self.pc = self.read_word(bus, vector)?;
        if !brk {
            // BRK's cost comes from the opcode table.
            self.cycles += INTERRUPT_CYCLES;
        }
        Ok(())
    }

    pub(super) fn illegal(&self) -> CpuError {
        CpuError::IllegalOpcode {
            opcode: self.opcode.unwrap_or(0),
            pc: self.opcode_pc,
        }
    }

    pub(super) fn fetch_byte<B: Bus>(&mut self, bus: &mut B) -> Result<u8, CpuError> {
        let byte = bus.read(self.pc)?;
        self.pc = self.pc.wrapping_add(1);
        Ok(byte)
    }

    pub(super) fn fetch_word<B: Bus>(&mut self, bus: &mut B) -> Result<u16, CpuError> {
        let lo = self.fetch_byte(bus)?;
        let hi = self.fetch_byte(bus)?;
        Ok(bits::word(lo, hi))
    }

    pub(super) fn read_word<B: Bus>(&mut self, bus: &mut B, addr: u16) -> Result<u16, CpuError> {
        let lo = bus.read(addr)?;
        let hi = bus.read(addr.wrapping_add(1))?;
        Ok(bits::word(lo, hi))
    }

    pub(super) fn push<B: Bus>(&mut self, bus: &mut B, data: u8) -> Result<(), CpuError> {
        bus.write(STACK_PAGE | self.sp as u16, data)?;
        self.sp = self.sp.wrapping_sub(1);
        Ok(())
    }

    pub(super) fn pop<B: Bus>(&mut self, bus: &mut B) -> Result<u8, CpuError> {
        self.sp = self.sp.wrapping_add(1);
        Ok(bus.read(STACK_PAGE | self.sp as u16)?)
    }

    pub(super) fn push_word<B: Bus>(&mut self, bus: &mut B, value: u16) -> Result<(), CpuError> {
        self.push(bus, bits::hi(value))?;
        self.push(bus, bits::lo(value))
    }

    pub(super) fn pop_word<B: Bus>(&mut self, bus: &mut B) -> Result<u16, CpuError> {
        let lo = self.pop(bus)?;
        let hi = self.pop(bus)?;
        Ok(bits::word(lo, hi))
    }

    pub(super) fn flag(&self, mask: u8) -> bool {
        self.status & mask != 0
    }

    pub(super) fn set_flag(&mut self, mask: u8, on: bool) {
        if on {
            self.status |= mask;
        } else {
            self.status &= !mask;
        }
    }

    /// Replace P from a pulled byte: B is not a real flag, R always reads 1.
    pub(super) fn restore_status(&mut self, pulled: u8) {
        self.status = (pulled & !FLAG_BREAK) | FLAG_UNUSED;
    }

    pub(super) fn update_zero_and_negative_flags(&mut self, result: u8) {
        self.set_flag(FLAG_ZERO, result == 0);
        self.set_flag(FLAG_NEGATIVE, result & 0x80 != 0);
    }

    fn trace(&self, op: &opcodes::Opcode) {
        if log::log_enabled!(log::Level::Trace) {
            log::trace!(
                "{:04X}  {:02X} {}{:<4} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
                self.opcode_pc,
                self.opcode.unwrap_or(0),
                if op.illegal { '*' } else { ' ' },
                op.mnemonic,
                self.a,
                self.x,
                self.y,
                self.status,
                self.sp,
                self.cycles
            );
        }
    }
}
