//! NES cartridge loading from iNES format (.nes files).
//!
//! Implements the [iNES](https://www.nesdev.org/wiki/INES) format: 16-byte header (magic "NES\x1A",
//! PRG size in 16 KiB units, CHR size in 8 KiB units, flags 6–7 for mapper, etc.), an optional
//! 512-byte trainer, then PRG ROM, then CHR ROM. Only mapper 0 is supported.

use std::fs;
use std::path::Path;

use crate::cartridge::mapper::Mirroring;
use crate::cartridge::mapper::mapper::Mapper;
use crate::cartridge::mapper::mapper0::{CHR_BANK_SIZE, Nrom, PRG_BANK_SIZE};
use crate::error::CartridgeError;

pub const HEADER_LEN: usize = 16;
pub const TRAINER_LEN: usize = 512;
const MAGIC: &[u8; 4] = b"NES\x1A";

/// Cartridge: the mapper that implements PRG/CHR decoding and nametable mirroring.
/// CPU reads PRG via bus at $8000–$FFFF; PPU reads CHR at $0000–$1FFF (pattern tables).
pub struct Cartridge {
    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    /// Read and parse an iNES file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CartridgeError> {
        let data = fs::read(path.as_ref())?;
        log::info!("loading {} ({} bytes)", path.as_ref().display(), data.len());
        Self::from_bytes(&data)
    }

    /// Parse an iNES image. Header sizes are validated against the image before anything is
    /// sliced, so a malformed cartridge never reaches the CPU.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_LEN {
            return Err(CartridgeError::TooShort { len: data.len() });
        }
        if &data[0..4] != MAGIC {
            log::warn!("missing iNES magic, parsing header anyway");
        }

        let prg_banks = data[4] as usize;
        let chr_banks = data[5] as usize;
        let flags6 = data[6];
        let flags7 = data[7];

        // Mapper number: high nibble of byte 6 | high nibble of byte 7.
        let mapper_id = (flags6 >> 4) | (flags7 & 0xF0);
        if mapper_id != 0 {
            return Err(CartridgeError::UnsupportedMapper(mapper_id));
        }
        if prg_banks == 0 {
            return Err(CartridgeError::NoProgramRom);
        }
        if prg_banks > 2 {
            return Err(CartridgeError::UnsupportedProgramSize { banks: prg_banks });
        }

        let trainer = if flags6 & 0x04 != 0 { TRAINER_LEN } else { 0 };
        let prg_start = HEADER_LEN + trainer;
        let prg_end = prg_start + prg_banks * PRG_BANK_SIZE;
        let chr_end = prg_end + chr_banks * CHR_BANK_SIZE;
        if data.len() < chr_end {
            return Err(CartridgeError::SizeMismatch {
                expected: chr_end,
                actual: data.len(),
            });
        }

        let mirroring = if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let prg_rom = data[prg_start..prg_end].to_vec();
        let chr_rom = data[prg_end..chr_end].to_vec();

        log::info!(
            "cartridge: mapper 0, {} KiB PRG, {}, {:?} mirroring",
            prg_banks * 16,
            if chr_banks == 0 {
                "8 KiB CHR RAM".to_string()
            } else {
                format!("{} KiB CHR ROM", chr_banks * 8)
            },
            mirroring
        );

        Ok(Self {
            mapper: Box::new(Nrom::new(prg_rom, chr_rom, mirroring)?),
        })
    }

    /// Read: PRG space ($8000–$FFFF) or CHR ($0000–$1FFF) depending on addr.
    pub fn read(&self, addr: u16) -> u8 {
        self.mapper.read(addr)
    }

    /// Write: CHR RAM if present; ROM writes are dropped.
    pub fn write(&mut self, addr: u16, data: u8) {
        self.mapper.write(addr, data);
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring()
    }
}
