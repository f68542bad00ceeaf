//! Mapper 0 (NROM): no bank switching, 16/32KB PRG, 8KB CHR.

use crate::{
    cartridge::mapper::{Mirroring, mapper::Mapper},
    error::CartridgeError,
};

pub const PRG_BANK_SIZE: usize = 16 * 1024;
pub const CHR_BANK_SIZE: usize = 8 * 1024;

/// NROM mapper: fixed PRG and CHR. A single 16KB PRG bank appears at both $8000 and $C000.
pub struct Nrom {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    mirroring: Mirroring,
}

impl Nrom {
    /// Empty `chr` gives the board 8KB of CHR RAM. `prg_rom` must be exactly one or two banks.
    pub(crate) fn new(
        prg_rom: Vec<u8>,
        chr: Vec<u8>,
        mirroring: Mirroring,
    ) -> Result<Self, CartridgeError> {
        if prg_rom.is_empty() {
            return Err(CartridgeError::NoProgramRom);
        }
        if prg_rom.len() != PRG_BANK_SIZE && prg_rom.len() != 2 * PRG_BANK_SIZE {
            return Err(CartridgeError::UnsupportedProgramSize {
                banks: prg_rom.len().div_ceil(PRG_BANK_SIZE),
            });
        }
        let chr_is_ram = chr.is_empty();
        let chr = if chr_is_ram {
            vec![0; CHR_BANK_SIZE]
        } else {
            chr
        };
        Ok(Self {
            prg_rom,
            chr,
            chr_is_ram,
            mirroring,
        })
    }

    pub fn has_chr_ram(&self) -> bool {
        self.chr_is_ram
    }
}

impl Mapper for Nrom {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            // PRG ROM: $8000-$FFFF, 16KB images repeat
            0x8000..=0xFFFF => self.prg_rom[(addr - 0x8000) as usize % self.prg_rom.len()],
            // CHR: $0000-$1FFF
            0x0000..=0x1FFF => self.chr[addr as usize % self.chr.len()],
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x1FFF if self.chr_is_ram => {
                let len = self.chr.len();
                self.chr[addr as usize % len] = data;
            }
            _ => log::debug!("NROM: ignored write ${data:02X} to ROM at ${addr:04X}"),
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }
}
