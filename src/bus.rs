//! Memory bus and address decoding for the NES.
//!
//! Maps CPU addresses to RAM, PPU registers, APU registers, the controller and the cartridge.
//! Anything outside those ranges ($4018–$7FFF) is unmapped and faults.

use crate::{
    apu::APU,
    bits,
    cartridge::Cartridge,
    controller::{Button, Controller},
    error::{Access, BusError},
    memory::Ram,
    ppu::{PPU, ppu::OAM_LEN},
};

const RAM_LEN: usize = 0x800;

/// Trait for memory-mapped I/O and bus access used by the CPU.
pub trait Bus {
    fn read(&mut self, addr: u16) -> Result<u8, BusError>;
    fn write(&mut self, addr: u16, data: u8) -> Result<(), BusError>;
    /// Consume a pending NMI request. Buses without an interrupt source never raise one.
    fn poll_nmi(&mut self) -> bool {
        false
    }
}

/// Main NES bus: RAM, PPU, APU, cartridge, and controller.
pub struct SystemBus {
    ram: Ram,
    ppu: PPU,
    apu: APU,
    controller: Controller,
    cart: Cartridge,
}

impl SystemBus {
    /// Create a new bus with the given cartridge.
    pub fn new(cart: Cartridge) -> Self {
        Self {
            ram: Ram::new(RAM_LEN),
            ppu: PPU::new(),
            apu: APU::new(),
            controller: Controller::new(),
            cart,
        }
    }

    pub fn ppu(&self) -> &PPU {
        &self.ppu
    }

    pub fn apu(&self) -> &APU {
        &self.apu
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cart
    }

    pub fn ram(&self) -> &[u8] {
        self.ram.as_slice()
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.controller.set_button(button, pressed);
    }

    /// Render the current PPU state into its frame buffer.
    pub fn render_frame(&mut self) {
        self.ppu.render(&self.cart);
    }

    pub fn set_vblank(&mut self, on: bool) {
        self.ppu.set_vblank(on);
    }

    /// OAM DMA ($4014): copy page `page` through the dispatcher, then hand it to the PPU.
    fn oam_dma(&mut self, page: u8) -> Result<(), BusError> {
        let base = bits::word(0x00, page);
        let mut buf = [0u8; OAM_LEN];
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = self.read(base + i as u16)?;
        }
        self.ppu.oam_dma(&buf);
        Ok(())
    }
}

impl Bus for SystemBus {
    fn read(&mut self, addr: u16) -> Result<u8, BusError> {
        let data = match addr {
            // Internal RAM (mirrored 4x in 0x0000-0x1FFF)
            0x0000..=0x1FFF => self.ram.read(addr & 0x07FF),
            // PPU registers $2000-$3FFF (mirrored every 8 bytes)
            0x2000..=0x3FFF => match addr & 0x0007 {
                2 => self.ppu.read_status(),
                4 => self.ppu.read_oam_data(),
                7 => self.ppu.read_data(&self.cart),
                _ => self.ppu.open_bus(),
            },
            0x4016 => self.controller.read(),
            0x4000..=0x4017 => self.apu.read(addr),
            // Cartridge PRG ROM
            0x8000..=0xFFFF => self.cart.read(addr),
            _ => {
                return Err(BusError::Unmapped {
                    address: addr,
                    access: Access::Read,
                });
            }
        };
        Ok(data)
    }

    fn write(&mut self, addr: u16, data: u8) -> Result<(), BusError> {
        match addr {
            // Internal RAM
            0x0000..=0x1FFF => self.ram.write(addr & 0x07FF, data),
            // PPU registers $2000-$3FFF (mirrored every 8 bytes)
            0x2000..=0x3FFF => match addr & 0x0007 {
                0 => self.ppu.write_ctrl(data),
                1 => self.ppu.write_mask(data),
                3 => self.ppu.write_oam_addr(data),
                4 => self.ppu.write_oam_data(data),
                5 => self.ppu.write_scroll(data),
                6 => self.ppu.write_addr(data),
                7 => self.ppu.write_data(&mut self.cart, data),
                // $2002 is read-only
                _ => log::debug!("PPU: write ${data:02X} to status port ignored"),
            },
            0x4014 => self.oam_dma(data)?,
            0x4016 => self.controller.write(data),
            0x4000..=0x4017 => self.apu.write(addr, data),
            // Cartridge: NROM has no registers
            0x8000..=0xFFFF => self.cart.write(addr, data),
            _ => {
                return Err(BusError::Unmapped {
                    address: addr,
                    access: Access::Write,
                });
            }
        }
        Ok(())
    }

    fn poll_nmi(&mut self) -> bool {
        self.ppu.take_nmi()
    }
}
