//! Instruction semantics, dispatched by mnemonic from the opcode table.

use crate::{
    bits,
    bus::Bus,
    cpu::{
        addressing::{Operand, Resolved},
        cpu::{CPU, IRQ_VECTOR},
        flags::{
            FLAG_BREAK, FLAG_CARRY, FLAG_DECIMAL, FLAG_INTERRUPT_DISABLE, FLAG_NEGATIVE,
            FLAG_OVERFLOW, FLAG_UNUSED, FLAG_ZERO,
        },
        opcodes::{Mnemonic, Opcode},
    },
    error::CpuError,
};

/// Magic constant ANE/LXA OR into A before masking. Varies by chip; $EE is the common value.
const ANE_MAGIC: u8 = 0xEE;

impl CPU {
    pub(super) fn execute<B: Bus>(
        &mut self,
        bus: &mut B,
        op: &Opcode,
        resolved: Resolved,
    ) -> Result<(), CpuError> {
        use Mnemonic::*;

        let operand = resolved.operand;
        match op.mnemonic {
            // Loads and stores
            Lda => {
                self.a = self.load(bus, operand)?;
                self.update_zero_and_negative_flags(self.a);
            }
            Ldx => {
                self.x = self.load(bus, operand)?;
                self.update_zero_and_negative_flags(self.x);
            }
            Ldy => {
                self.y = self.load(bus, operand)?;
                self.update_zero_and_negative_flags(self.y);
            }
            Sta => self.write_register(bus, operand, self.a)?,
            Stx => self.write_register(bus, operand, self.x)?,
            Sty => self.write_register(bus, operand, self.y)?,

            // Transfers
            Tax => {
                self.x = self.a;
                self.update_zero_and_negative_flags(self.x);
            }
            Tay => {
                self.y = self.a;
                self.update_zero_and_negative_flags(self.y);
            }
            Txa => {
                self.a = self.x;
                self.update_zero_and_negative_flags(self.a);
            }
            Tya => {
                self.a = self.y;
                self.update_zero_and_negative_flags(self.a);
            }
            Tsx => {
                self.x = self.sp;
                self.update_zero_and_negative_flags(self.x);
            }
            Txs => self.sp = self.x,

            // Stack
            Pha => self.push(bus, self.a)?,
            Php => self.push(bus, self.status | FLAG_BREAK | FLAG_UNUSED)?,
            Pla => {
                self.a = self.pop(bus)?;
                self.update_zero_and_negative_flags(self.a);
            }
            Plp => {
                let pulled = self.pop(bus)?;
                self.restore_status(pulled);
            }

            // Logic and arithmetic
            And => {
                let value = self.load(bus, operand)?;
                self.a &= value;
                self.update_zero_and_negative_flags(self.a);
            }
            Ora => {
                let value = self.load(bus, operand)?;
                self.a |= value;
                self.update_zero_and_negative_flags(self.a);
            }
            Eor => {
                let value = self.load(bus, operand)?;
                self.a ^= value;
                self.update_zero_and_negative_flags(self.a);
            }
            Adc => {
                let value = self.load(bus, operand)?;
                self.add_with_carry(value);
            }
            Sbc | Usbc => {
                let value = self.load(bus, operand)?;
                self.add_with_carry(!value);
            }
            Cmp => {
                let value = self.load(bus, operand)?;
                self.compare(self.a, value);
            }
            Cpx => {
                let value = self.load(bus, operand)?;
                self.compare(self.x, value);
            }
            Cpy => {
                let value = self.load(bus, operand)?;
                self.compare(self.y, value);
            }
            Bit => {
                let value = self.load(bus, operand)?;
                self.set_flag(FLAG_ZERO, self.a & value == 0);
                self.set_flag(FLAG_OVERFLOW, value & FLAG_OVERFLOW != 0);
                self.set_flag(FLAG_NEGATIVE, value & FLAG_NEGATIVE != 0);
            }

            // Increments and decrements
            Inc => {
                let value = self.load(bus, operand)?.wrapping_add(1);
                self.store(bus, operand, value)?;
                self.update_zero_and_negative_flags(value);
            }
            Dec => {
                let value = self.load(bus, operand)?.wrapping_sub(1);
                self.store(bus, operand, value)?;
                self.update_zero_and_negative_flags(value);
            }
            Inx => {
                self.x = self.x.wrapping_add(1);
                self.update_zero_and_negative_flags(self.x);
            }
            Iny => {
                self.y = self.y.wrapping_add(1);
                self.update_zero_and_negative_flags(self.y);
            }
            Dex => {
                self.x = self.x.wrapping_sub(1);
                self.update_zero_and_negative_flags(self.x);
            }
            Dey => {
                self.y = self.y.wrapping_sub(1);
                self.update_zero_and_negative_flags(self.y);
            }

            // Shifts and rotates
            Asl => {
                self.shift_left(bus, operand)?;
            }
            Lsr => {
                self.shift_right(bus, operand)?;
            }
            Rol => {
                self.rotate_left(bus, operand)?;
            }
            Ror => {
                self.rotate_right(bus, operand)?;
            }

            // Jumps and subroutines
            Jmp => self.pc = self.address(operand)?,
            Jsr => {
                let target = self.address(operand)?;
                self.push_word(bus, self.pc.wrapping_sub(1))?;
                self.pc = target;
            }
            Rts => self.pc = self.pop_word(bus)?.wrapping_add(1),
            Rti => {
                let pulled = self.pop(bus)?;
                self.restore_status(pulled);
                self.pc = self.pop_word(bus)?;
            }
            Brk => {
                // The byte after BRK is padding.
                self.pc = self.pc.wrapping_add(1);
                self.interrupt(bus, IRQ_VECTOR, true)?;
            }

            // Branches
            Bcc => self.branch(!self.flag(FLAG_CARRY), resolved)?,
            Bcs => self.branch(self.flag(FLAG_CARRY), resolved)?,
            Bne => self.branch(!self.flag(FLAG_ZERO), resolved)?,
            Beq => self.branch(self.flag(FLAG_ZERO), resolved)?,
            Bpl => self.branch(!self.flag(FLAG_NEGATIVE), resolved)?,
            Bmi => self.branch(self.flag(FLAG_NEGATIVE), resolved)?,
            Bvc => self.branch(!self.flag(FLAG_OVERFLOW), resolved)?,
            Bvs => self.branch(self.flag(FLAG_OVERFLOW), resolved)?,

            // Flags
            Clc => self.set_flag(FLAG_CARRY, false),
            Sec => self.set_flag(FLAG_CARRY, true),
            Cli => self.set_flag(FLAG_INTERRUPT_DISABLE, false),
            Sei => self.set_flag(FLAG_INTERRUPT_DISABLE, true),
            Cld => self.set_flag(FLAG_DECIMAL, false),
            Sed => self.set_flag(FLAG_DECIMAL, true),
            Clv => self.set_flag(FLAG_OVERFLOW, false),

            // Multi-byte NOPs fetch their operand but do not touch the bus.
            Nop => {}

            // Undocumented read-modify-write combinations
            Slo => {
                let value = self.shift_left(bus, operand)?;
                self.a |= value;
                self.update_zero_and_negative_flags(self.a);
            }
            Rla => {
                let value = self.rotate_left(bus, operand)?;
                self.a &= value;
                self.update_zero_and_negative_flags(self.a);
            }
            Sre => {
                let value = self.shift_right(bus, operand)?;
                self.a ^= value;
                self.update_zero_and_negative_flags(self.a);
            }
            Rra => {
                let value = self.rotate_right(bus, operand)?;
                self.add_with_carry(value);
            }
            Dcp => {
                let value = self.load(bus, operand)?.wrapping_sub(1);
                self.store(bus, operand, value)?;
                self.compare(self.a, value);
            }
            Isc => {
                let value = self.load(bus, operand)?.wrapping_add(1);
                self.store(bus, operand, value)?;
                self.add_with_carry(!value);
            }

            // Undocumented loads and stores
            Lax => {
                let value = self.load(bus, operand)?;
                self.a = value;
                self.x = value;
                self.update_zero_and_negative_flags(value);
            }
            Sax => self.write_register(bus, operand, self.a & self.x)?,
            Las => {
                let value = self.load(bus, operand)? & self.sp;
                self.a = value;
                self.x = value;
                self.sp = value;
                self.update_zero_and_negative_flags(value);
            }
            Sha => self.store_high_and(bus, resolved, self.a & self.x)?,
            Shx => self.store_high_and(bus, resolved, self.x)?,
            Shy => self.store_high_and(bus, resolved, self.y)?,
            Tas => {
                self.sp = self.a & self.x;
                self.store_high_and(bus, resolved, self.sp)?;
            }

            // Undocumented immediate operations
            Anc => {
                let value = self.load(bus, operand)?;
                self.a &= value;
                self.update_zero_and_negative_flags(self.a);
                self.set_flag(FLAG_CARRY, self.flag(FLAG_NEGATIVE));
            }
            Alr => {
                let value = self.load(bus, operand)?;
                self.a &= value;
                self.shift_right(bus, Operand::Accumulator)?;
            }
            Arr => {
                let value = self.a & self.load(bus, operand)?;
                let carry_in = if self.flag(FLAG_CARRY) { 0x80 } else { 0 };
                self.a = (value >> 1) | carry_in;
                self.update_zero_and_negative_flags(self.a);
                let bit6 = bits::bit(self.a, 6);
                let bit5 = bits::bit(self.a, 5);
                self.set_flag(FLAG_CARRY, bit6);
                self.set_flag(FLAG_OVERFLOW, bit6 ^ bit5);
            }
            Ane => {
                let value = self.load(bus, operand)?;
                self.a = (self.a | ANE_MAGIC) & self.x & value;
                self.update_zero_and_negative_flags(self.a);
            }
            Lxa => {
                let value = (self.a | ANE_MAGIC) & self.load(bus, operand)?;
                self.a = value;
                self.x = value;
                self.update_zero_and_negative_flags(value);
            }
            Sbx => {
                let value = self.load(bus, operand)?;
                let masked = self.a & self.x;
                self.set_flag(FLAG_CARRY, masked >= value);
                self.x = masked.wrapping_sub(value);
                self.update_zero_and_negative_flags(self.x);
            }
        }
        Ok(())
    }

    /// Binary add of A, `value` and C. SBC is this with `!value`.
    fn add_with_carry(&mut self, value: u8) {
        let carry = self.flag(FLAG_CARRY) as u16;
        let sum = self.a as u16 + value as u16 + carry;
        let result = bits::lo(sum);

        self.set_flag(FLAG_CARRY, sum > 0xFF);
        // Overflow when both inputs share a sign the result does not.
        self.set_flag(
            FLAG_OVERFLOW,
            (self.a ^ result) & (value ^ result) & 0x80 != 0,
        );
        self.a = result;
        self.update_zero_and_negative_flags(result);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.set_flag(FLAG_CARRY, register >= value);
        self.update_zero_and_negative_flags(register.wrapping_sub(value));
    }

    fn branch(&mut self, taken: bool, resolved: Resolved) -> Result<(), CpuError> {
        let Operand::Relative(target) = resolved.operand else {
            return Err(self.illegal());
        };
        if taken {
            self.cycles += 1;
            if resolved.crossed {
                self.cycles += 1;
            }
            self.pc = target;
        }
        Ok(())
    }

    fn write_register<B: Bus>(
        &mut self,
        bus: &mut B,
        operand: Operand,
        value: u8,
    ) -> Result<(), CpuError> {
        let addr = self.address(operand)?;
        Ok(bus.write(addr, value)?)
    }

    /// SHA/SHX/SHY/TAS: store `value & (high byte of the unindexed address + 1)`.
    fn store_high_and<B: Bus>(
        &mut self,
        bus: &mut B,
        resolved: Resolved,
        value: u8,
    ) -> Result<(), CpuError> {
        let addr = self.address(resolved.operand)?;
        let mask = bits::hi(resolved.base).wrapping_add(1);
        Ok(bus.write(addr, value & mask)?)
    }

    fn shift_left<B: Bus>(&mut self, bus: &mut B, operand: Operand) -> Result<u8, CpuError> {
        let value = self.load(bus, operand)?;
        let result = value << 1;
        self.set_flag(FLAG_CARRY, value & 0x80 != 0);
        self.store(bus, operand, result)?;
        self.update_zero_and_negative_flags(result);
        Ok(result)
    }

    fn shift_right<B: Bus>(&mut self, bus: &mut B, operand: Operand) -> Result<u8, CpuError> {
        let value = self.load(bus, operand)?;
        let result = value >> 1;
        self.set_flag(FLAG_CARRY, value & 0x01 != 0);
        self.store(bus, operand, result)?;
        self.update_zero_and_negative_flags(result);
        Ok(result)
    }

    fn rotate_left<B: Bus>(&mut self, bus: &mut B, operand: Operand) -> Result<u8, CpuError> {
        let value = self.load(bus, operand)?;
        let result = (value << 1) | self.flag(FLAG_CARRY) as u8;
        self.set_flag(FLAG_CARRY, value & 0x80 != 0);
        self.store(bus, operand, result)?;
        self.update_zero_and_negative_flags(result);
        Ok(result)
    }

    fn rotate_right<B: Bus>(&mut self, bus: &mut B, operand: Operand) -> Result<u8, CpuError> {
        let value = self.load(bus, operand)?;
        let carry_in = if self.flag(FLAG_CARRY) { 0x80 } else { 0 };
        let result = (value >> 1) | carry_in;
        self.set_flag(FLAG_CARRY, value & 0x01 != 0);
        self.store(bus, operand, result)?;
        self.update_zero_and_negative_flags(result);
        Ok(result)
    }
}
