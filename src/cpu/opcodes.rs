//! The 256-entry opcode table.
//!
//! Every byte value maps to an [`Opcode`] or to `None`. The twelve `None` slots are the JAM
//! bytes, which lock up real hardware; the CPU reports them as illegal opcodes.
//! See [6502 instructions](https://www.nesdev.org/wiki/Instruction_reference) and
//! [unofficial opcodes](https://www.nesdev.org/wiki/CPU_unofficial_opcodes).

use std::fmt;

use self::AddressingMode::*;
use self::Mnemonic::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Relative,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
}

impl AddressingMode {
    /// Operand bytes following the opcode.
    pub const fn operand_len(self) -> u16 {
        match self {
            Implied | Accumulator => 0,
            Immediate | ZeroPage | ZeroPageX | ZeroPageY | Relative | IndirectX | IndirectY => 1,
            Absolute | AbsoluteX | AbsoluteY | Indirect => 2,
        }
    }
}

/// Instruction mnemonics, documented and undocumented.
#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    // Documented
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    // Undocumented
    Alr, Anc, Ane, Arr, Dcp, Isc, Las, Lax, Lxa, Rla, Rra, Sax, Sbx, Sha,
    Shx, Shy, Slo, Sre, Tas, Usbc,
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("{self:?}").to_ascii_uppercase();
        f.pad(&name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    /// Base cycle cost.
    pub cycles: u8,
    /// One extra cycle when indexing crosses a page. Branch penalties are applied separately.
    pub page_cycle: bool,
    pub illegal: bool,
}

const fn entry(
    mnemonic: Mnemonic,
    mode: AddressingMode,
    cycles: u8,
    page_cycle: bool,
    illegal: bool,
) -> Option<Opcode> {
    Some(Opcode {
        mnemonic,
        mode,
        cycles,
        page_cycle,
        illegal,
    })
}

const fn doc(m: Mnemonic, mode: AddressingMode, cycles: u8) -> Option<Opcode> {
    entry(m, mode, cycles, false, false)
}

const fn doc_px(m: Mnemonic, mode: AddressingMode, cycles: u8) -> Option<Opcode> {
    entry(m, mode, cycles, true, false)
}

const fn undoc(m: Mnemonic, mode: AddressingMode, cycles: u8) -> Option<Opcode> {
    entry(m, mode, cycles, false, true)
}

const fn undoc_px(m: Mnemonic, mode: AddressingMode, cycles: u8) -> Option<Opcode> {
    entry(m, mode, cycles, true, true)
}

#[rustfmt::skip]
pub static OPCODES: [Option<Opcode>; 256] = [
    /* 00 */ doc(Brk, Implied, 7),
    /* 01 */ doc(Ora, IndirectX, 6),
    /* 02 */ None,
    /* 03 */ undoc(Slo, IndirectX, 8),
    /* 04 */ undoc(Nop, ZeroPage, 3),
    /* 05 */ doc(Ora, ZeroPage, 3),
    /* 06 */ doc(Asl, ZeroPage, 5),
    /* 07 */ undoc(Slo, ZeroPage, 5),
    /* 08 */ doc(Php, Implied, 3),
    /* 09 */ doc(Ora, Immediate, 2),
    /* 0A */ doc(Asl, Accumulator, 2),
    /* 0B */ undoc(Anc, Immediate, 2),
    /* 0C */ undoc(Nop, Absolute, 4),
    /* 0D */ doc(Ora, Absolute, 4),
    /* 0E */ doc(Asl, Absolute, 6),
    /* 0F */ undoc(Slo, Absolute, 6),
    /* 10 */ doc(Bpl, Relative, 2),
    /* 11 */ doc_px(Ora, IndirectY, 5),
    /* 12 */ None,
    /* 13 */ undoc(Slo, IndirectY, 8),
    /* 14 */ undoc(Nop, ZeroPageX, 4),
    /* 15 */ doc(Ora, ZeroPageX, 4),
    /* 16 */ doc(Asl, ZeroPageX, 6),
    /* 17 */ undoc(Slo, ZeroPageX, 6),
    /* 18 */ doc(Clc, Implied, 2),
    /* 19 */ doc_px(Ora, AbsoluteY, 4),
    /* 1A */ undoc(Nop, Implied, 2),
    /* 1B */ undoc(Slo, AbsoluteY, 7),
    /* 1C */ undoc_px(Nop, AbsoluteX, 4),
    /* 1D */ doc_px(Ora, AbsoluteX, 4),
    /* 1E */ doc(Asl, AbsoluteX, 7),
    /* 1F */ undoc(Slo, AbsoluteX, 7),
    /* 20 */ doc(Jsr, Absolute, 6),
    /* 21 */ doc(And, IndirectX, 6),
    /* 22 */ None,
    /* 23 */ undoc(Rla, IndirectX, 8),
    /* 24 */ doc(Bit, ZeroPage, 3),
    /* 25 */ doc(And, ZeroPage, 3),
    /* 26 */ doc(Rol, ZeroPage, 5),
    /* 27 */ undoc(Rla, ZeroPage, 5),
    /* 28 */ doc(Plp, Implied, 4),
    /* 29 */ doc(And, Immediate, 2),
    /* 2A */ doc(Rol, Accumulator, 2),
    /* 2B */ undoc(Anc, Immediate, 2),
    /* 2C */ doc(Bit, Absolute, 4),
    /* 2D */ doc(And, Absolute, 4),
    /* 2E */ doc(Rol, Absolute, 6),
    /* 2F */ undoc(Rla, Absolute, 6),
    /* 30 */ doc(Bmi, Relative, 2),
    /* 31 */ doc_px(And, IndirectY, 5),
    /* 32 */ None,
    /* 33 */ undoc(Rla, IndirectY, 8),
    /* 34 */ undoc(Nop, ZeroPageX, 4),
    /* 35 */ doc(And, ZeroPageX, 4),
    /* 36 */ doc(Rol, ZeroPageX, 6),
    /* 37 */ undoc(Rla, ZeroPageX, 6),
    /* 38 */ doc(Sec, Implied, 2),
    /* 39 */ doc_px(And, AbsoluteY, 4),
    /* 3A */ undoc(Nop, Implied, 2),
    /* 3B */ undoc(Rla, AbsoluteY, 7),
    /* 3C */ undoc_px(Nop, AbsoluteX, 4),
    /* 3D */ doc_px(And, AbsoluteX, 4),
    /* 3E */ doc(Rol, AbsoluteX, 7),
    /* 3F */ undoc(Rla, AbsoluteX, 7),
    /* 40 */ doc(Rti, Implied, 6),
    /* 41 */ doc(Eor, IndirectX, 6),
    /* 42 */ None,
    /* 43 */ undoc(Sre, IndirectX, 8),
    /* 44 */ undoc(Nop, ZeroPage, 3),
    /* 45 */ doc(Eor, ZeroPage, 3),
    /* 46 */ doc(Lsr, ZeroPage, 5),
    /* 47 */ undoc(Sre, ZeroPage, 5),
    /* 48 */ doc(Pha, Implied, 3),
    /* 49 */ doc(Eor, Immediate, 2),
    /* 4A */ doc(Lsr, Accumulator, 2),
    /* 4B */ undoc(Alr, Immediate, 2),
    /* 4C */ doc(Jmp, Absolute, 3),
    /* 4D */ doc(Eor, Absolute, 4),
    /* 4E */ doc(Lsr, Absolute, 6),
    /* 4F */ undoc(Sre, Absolute, 6),
    /* 50 */ doc(Bvc, Relative, 2),
    /* 51 */ doc_px(Eor, IndirectY, 5),
    /* 52 */ None,
    /* 53 */ undoc(Sre, IndirectY, 8),
    /* 54 */ undoc(Nop, ZeroPageX, 4),
    /* 55 */ doc(Eor, ZeroPageX, 4),
    /* 56 */ doc(Lsr, ZeroPageX, 6),
    /* 57 */ undoc(Sre, ZeroPageX, 6),
    /* 58 */ doc(Cli, Implied, 2),
    /* 59 */ doc_px(Eor, AbsoluteY, 4),
    /* 5A */ undoc(Nop, Implied, 2),
    /* 5B */ undoc(Sre, AbsoluteY, 7),
    /* 5C */ undoc_px(Nop, AbsoluteX, 4),
    /* 5D */ doc_px(Eor, AbsoluteX, 4),
    /* 5E */ doc(Lsr, AbsoluteX, 7),
    /* 5F */ undoc(Sre, AbsoluteX, 7),
    /* 60 */ doc(Rts, Implied, 6),
    /* 61 */ doc(Adc, IndirectX, 6),
    /* 62 */ None,
    /* 63 */ undoc(Rra, IndirectX, 8),
    /* 64 */ undoc(Nop, ZeroPage, 3),
    /* 65 */ doc(Adc, ZeroPage, 3),
    /* 66 */ doc(Ror, ZeroPage, 5),
    /* 67 */ undoc(Rra, ZeroPage, 5),
    /* 68 */ doc(Pla, Implied, 4),
    /* 69 */ doc(Adc, Immediate, 2),
    /* 6A */ doc(Ror, Accumulator, 2),
    /* 6B */ undoc(Arr, Immediate, 2),
    /* 6C */ doc(Jmp, Indirect, 5),
    /* 6D */ doc(Adc, Absolute, 4),
    /* 6E */ doc(Ror, Absolute, 6),
    /* 6F */ undoc(Rra, Absolute, 6),
    /* 70 */ doc(Bvs, Relative, 2),
    /* 71 */ doc_px(Adc, IndirectY, 5),
    /* 72 */ None,
    /* 73 */ undoc(Rra, IndirectY, 8),
    /* 74 */ undoc(Nop, ZeroPageX, 4),
    /* 75 */ doc(Adc, ZeroPageX, 4),
    /* 76 */ doc(Ror, ZeroPageX, 6),
    /* 77 */ undoc(Rra, ZeroPageX, 6),
    /* 78 */ doc(Sei, Implied, 2),
    /* 79 */ doc_px(Adc, AbsoluteY, 4),
    /* 7A */ undoc(Nop, Implied, 2),
    /* 7B */ undoc(Rra, AbsoluteY, 7),
    /* 7C */ undoc_px(Nop, AbsoluteX, 4),
    /* 7D */ doc_px(Adc, AbsoluteX, 4),
    /* 7E */ doc(Ror, AbsoluteX, 7),
    /* 7F */ undoc(Rra, AbsoluteX, 7),
    /* 80 */ undoc(Nop, Immediate, 2),
    /* 81 */ doc(Sta, IndirectX, 6),
    /* 82 */ undoc(Nop, Immediate, 2),
    /* 83 */ undoc(Sax, IndirectX, 6),
    /* 84 */ doc(Sty, ZeroPage, 3),
    /* 85 */ doc(Sta, ZeroPage, 3),
    /* 86 */ doc(Stx, ZeroPage, 3),
    /* 87 */ undoc(Sax, ZeroPage, 3),
    /* 88 */ doc(Dey, Implied, 2),
    /* 89 */ undoc(Nop, Immediate, 2),
    /* 8A */ doc(Txa, Implied, 2),
    /* 8B */ undoc(Ane, Immediate, 2),
    /* 8C */ doc(Sty, Absolute, 4),
    /* 8D */ doc(Sta, Absolute, 4),
    /* 8E */ doc(Stx, Absolute, 4),
    /* 8F */ undoc(Sax, Absolute, 4),
    /* 90 */ doc(Bcc, Relative, 2),
    /* 91 */ doc(Sta, IndirectY, 6),
    /* 92 */ None,
    /* 93 */ undoc(Sha, IndirectY, 6),
    /* 94 */ doc(Sty, ZeroPageX, 4),
    /* 95 */ doc(Sta, ZeroPageX, 4),
    /* 96 */ doc(Stx, ZeroPageY, 4),
    /* 97 */ undoc(Sax, ZeroPageY, 4),
    /* 98 */ doc(Tya, Implied, 2),
    /* 99 */ doc(Sta, AbsoluteY, 5),
    /* 9A */ doc(Txs, Implied, 2),
    /* 9B */ undoc(Tas, AbsoluteY, 5),
    /* 9C */ undoc(Shy, AbsoluteX, 5),
    /* 9D */ doc(Sta, AbsoluteX, 5),
    /* 9E */ undoc(Shx, AbsoluteY, 5),
    /* 9F */ undoc(Sha, AbsoluteY, 5),
    /* A0 */ doc(Ldy, Immediate, 2),
    /* A1 */ doc(Lda, IndirectX, 6),
    /* A2 */ doc(Ldx, Immediate, 2),
    /* A3 */ undoc(Lax, IndirectX, 6),
    /* A4 */ doc(Ldy, ZeroPage, 3),
    /* A5 */ doc(Lda, ZeroPage, 3),
    /* A6 */ doc(Ldx, ZeroPage, 3),
    /* A7 */ undoc(Lax, ZeroPage, 3),
    /* A8 */ doc(Tay, Implied, 2),
    /* A9 */ doc(Lda, Immediate, 2),
    /* AA */ doc(Tax, Implied, 2),
    /* AB */ undoc(Lxa, Immediate, 2),
    /* AC */ doc(Ldy, Absolute, 4),
    /* AD */ doc(Lda, Absolute, 4),
    /* AE */ doc(Ldx, Absolute, 4),
    /* AF */ undoc(Lax, Absolute, 4),
    /* B0 */ doc(Bcs, Relative, 2),
    /* B1 */ doc_px(Lda, IndirectY, 5),
    /* B2 */ None,
    /* B3 */ undoc_px(Lax, IndirectY, 5),
    /* B4 */ doc(Ldy, ZeroPageX, 4),
    /* B5 */ doc(Lda, ZeroPageX, 4),
    /* B6 */ doc(Ldx, ZeroPageY, 4),
    /* B7 */ undoc(Lax, ZeroPageY, 4),
    /* B8 */ doc(Clv, Implied, 2),
    /* B9 */ doc_px(Lda, AbsoluteY, 4),
    /* BA */ doc(Tsx, Implied, 2),
    /* BB */ undoc_px(Las, AbsoluteY, 4),
    /* BC */ doc_px(Ldy, AbsoluteX, 4),
    /* BD */ doc_px(Lda, AbsoluteX, 4),
    /* BE */ doc_px(Ldx, AbsoluteY, 4),
    /* BF */ undoc_px(Lax, AbsoluteY, 4),
    /* C0 */ doc(Cpy, Immediate, 2),
    /* C1 */ doc(Cmp, IndirectX, 6),
    /* C2 */ undoc(Nop, Immediate, 2),
    /* C3 */ undoc(Dcp, IndirectX, 8),
    /* C4 */ doc(Cpy, ZeroPage, 3),
    /* C5 */ doc(Cmp, ZeroPage, 3),
    /* C6 */ doc(Dec, ZeroPage, 5),
    /* C7 */ undoc(Dcp, ZeroPage, 5),
    /* C8 */ doc(Iny, Implied, 2),
    /* C9 */ doc(Cmp, Immediate, 2),
    /* CA */ doc(Dex, Implied, 2),
    /* CB */ undoc(Sbx, Immediate, 2),
    /* CC */ doc(Cpy, Absolute, 4),
    /* CD */ doc(Cmp, Absolute, 4),
    /* CE */ doc(Dec, Absolute, 6),
    /* CF */ undoc(Dcp, Absolute, 6),
    /* D0 */ doc(Bne, Relative, 2),
    /* D1 */ doc_px(Cmp, IndirectY, 5),
    /* D2 */ None,
    /* D3 */ undoc(Dcp, IndirectY, 8),
    /* D4 */ undoc(Nop, ZeroPageX, 4),
    /* D5 */ doc(Cmp, ZeroPageX, 4),
    /* D6 */ doc(Dec, ZeroPageX, 6),
    /* D7 */ undoc(Dcp, ZeroPageX, 6),
    /* D8 */ doc(Cld, Implied, 2),
    /* D9 */ doc_px(Cmp, AbsoluteY, 4),
    /* DA */ undoc(Nop, Implied, 2),
    /* DB */ undoc(Dcp, AbsoluteY, 7),
    /* DC */ undoc_px(Nop, AbsoluteX, 4),
    /* DD */ doc_px(Cmp, AbsoluteX, 4),
    /* DE */ doc(Dec, AbsoluteX, 7),
    /* DF */ undoc(Dcp, AbsoluteX, 7),
    /* E0 */ doc(Cpx, Immediate, 2),
    /* E1 */ doc(Sbc, IndirectX, 6),
    /* E2 */ undoc(Nop, Immediate, 2),
    /* E3 */ undoc(Isc, IndirectX, 8),
    /* E4 */ doc(Cpx, ZeroPage, 3),
    /* E5 */ doc(Sbc, ZeroPage, 3),
    /* E6 */ doc(Inc, ZeroPage, 5),
    /* E7 */ undoc(Isc, ZeroPage, 5),
    /* E8 */ doc(Inx, Implied, 2),
    /* E9 */ doc(Sbc, Immediate, 2),
    /* EA */ doc(Nop, Implied, 2),
    /* EB */ undoc(Usbc, Immediate, 2),
    /* EC */ doc(Cpx, Absolute, 4),
    /* ED */ doc(Sbc, Absolute, 4),
    /* EE */ doc(Inc, Absolute, 6),
    /* EF */ undoc(Isc, Absolute, 6),
    /* F0 */ doc(Beq, Relative, 2),
    /* F1 */ doc_px(Sbc, IndirectY, 5),
    /* F2 */ None,
    /* F3 */ undoc(Isc, IndirectY, 8),
    /* F4 */ undoc(Nop, ZeroPageX, 4),
    /* F5 */ doc(Sbc, ZeroPageX, 4),
    /* F6 */ doc(Inc, ZeroPageX, 6),
    /* F7 */ undoc(Isc, ZeroPageX, 6),
    /* F8 */ doc(Sed, Implied, 2),
    /* F9 */ doc_px(Sbc, AbsoluteY, 4),
    /* FA */ undoc(Nop, Implied, 2),
    /* FB */ undoc(Isc, AbsoluteY, 7),
    /* FC */ undoc_px(Nop, AbsoluteX, 4),
    /* FD */ doc_px(Sbc, AbsoluteX, 4),
    /* FE */ doc(Inc, AbsoluteX, 7),
    /* FF */ undoc(Isc, AbsoluteX, 7),
];

/// Look up the table entry for `byte`.
#[inline]
pub fn decode(byte: u8) -> Option<&'static Opcode> {
    OPCODES[byte as usize].as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAM: [u8; 12] = [
        0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2,
    ];

    #[test]
    fn only_jam_bytes_are_missing() {
        for byte in 0..=255u8 {
            assert_eq!(decode(byte).is_none(), JAM.contains(&byte), "opcode {byte:02X}");
        }
    }

    #[test]
    fn documented_set_has_151_entries() {
        let documented = OPCODES.iter().flatten().filter(|op| !op.illegal).count();
        assert_eq!(documented, 151);
    }

    #[test]
    fn well_known_entries() {
        let lda = decode(0xA9).unwrap();
        assert_eq!((lda.mnemonic, lda.mode, lda.cycles), (Lda, Immediate, 2));

        let jmp = decode(0x6C).unwrap();
        assert_eq!((jmp.mnemonic, jmp.mode, jmp.cycles), (Jmp, Indirect, 5));

        let lda_y = decode(0xB1).unwrap();
        assert!(lda_y.page_cycle);
        // Stores never take the page-cross shortcut.
        assert!(!decode(0x91).unwrap().page_cycle);

        assert_eq!(decode(0xEB).unwrap().mnemonic, Usbc);
        assert!(decode(0xEB).unwrap().illegal);
    }

    #[test]
    fn mnemonics_display_in_upper_case() {
        assert_eq!(Lda.to_string(), "LDA");
        assert_eq!(format!("{:<4}", Usbc), "USBC");
        assert_eq!(format!("{:<4}|", Nop), "NOP |");
    }
}
