//! NES PPU (Picture Processing Unit) register file and VRAM access.
//!
//! Handles the eight CPU-visible ports ($2000–$2007, mirrored every 8 bytes), nametable
//! mirroring, palette RAM, OAM, and the VBlank/NMI handshake with the frame loop. Rendering
//! lives in `render.rs`.

use crate::{
    bits,
    cartridge::{Cartridge, Mirroring},
    memory::Ram,
    ppu::{
        palette::palette_index,
        registers::{ControlRegister, MaskRegister, StatusRegister},
    },
};

/// OAM (Object Attribute Memory): 64 sprites × 4 bytes. Each entry: Y, tile, attr, X.
pub const OAM_LEN: usize = 256;

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;
/// RGBA frame buffer length.
pub const FRAME_LEN: usize = SCREEN_WIDTH * SCREEN_HEIGHT * 4;

const VRAM_LEN: usize = 0x800;

/// PPU state: registers, VRAM, palettes, OAM, and framebuffer.
pub struct PPU {
    pub(super) ctrl: ControlRegister,
    pub(super) mask: MaskRegister,
    pub(super) status: StatusRegister,
    pub(super) oam_addr: u8,
    /// Current VRAM address for $2007.
    addr: u16,
    /// Shared first/second-write toggle for $2005 and $2006.
    write_toggle: bool,
    pub(super) scroll_x: u8,
    pub(super) scroll_y: u8,
    read_buffer: u8,
    /// Last byte written to any port; write-only ports read back as this.
    open_bus: u8,
    nmi_pending: bool,
    pub(super) vram: Ram,
    /// Palette RAM $3F00-$3F1F (32 bytes, with NES mirroring).
    pub(super) palette: [u8; 32],
    pub(super) oam: [u8; OAM_LEN],
    /// 256×240 RGBA framebuffer. Row-major, left-to-right, top-to-bottom.
    pub(super) frame: Vec<u8>,
}

impl Default for PPU {
    fn default() -> Self {
        Self::new()
    }
}

impl PPU {
    pub fn new() -> Self {
        let mut frame = vec![0; FRAME_LEN];
        for alpha in frame.iter_mut().skip(3).step_by(4) {
            *alpha = 0xFF;
        }
        Self {
            ctrl: ControlRegister::default(),
            mask: MaskRegister::default(),
            status: StatusRegister::default(),
            oam_addr: 0,
            addr: 0,
            write_toggle: false,
            scroll_x: 0,
            scroll_y: 0,
            read_buffer: 0,
            open_bus: 0,
            nmi_pending: false,
            vram: Ram::new(VRAM_LEN),
            palette: [0; 32],
            oam: [0; OAM_LEN],
            frame,
        }
    }

    pub fn frame_buffer(&self) -> &[u8] {
        &self.frame
    }

    pub fn ctrl(&self) -> ControlRegister {
        self.ctrl
    }

    pub fn mask(&self) -> MaskRegister {
        self.mask
    }

    pub fn status(&self) -> StatusRegister {
        self.status
    }

    pub fn oam(&self) -> &[u8; OAM_LEN] {
        &self.oam
    }

    /// Current VRAM address for $2007.
    pub fn vram_addr(&self) -> u16 {
        self.addr
    }

    /// Set or clear VBlank. Entering VBlank with NMI enabled leaves an NMI pending.
    /// Leaving VBlank also clears sprite-0 hit and overflow, as the pre-render line does.
    pub fn set_vblank(&mut self, on: bool) {
        self.status.set(StatusRegister::VBLANK, on);
        if on {
            if self.ctrl.contains(ControlRegister::GENERATE_NMI) {
                self.nmi_pending = true;
            }
        } else {
            self.status
                .remove(StatusRegister::SPRITE_ZERO_HIT | StatusRegister::SPRITE_OVERFLOW);
            self.nmi_pending = false;
        }
    }

    /// Consume a pending NMI request.
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    /// Value returned by reads of write-only ports.
    pub fn open_bus(&self) -> u8 {
        self.open_bus
    }

    /// Read PPUSTATUS ($2002); clears vblank and the write toggle.
    pub fn read_status(&mut self) -> u8 {
        let data = (self.status.bits() & 0xE0) | (self.open_bus & 0x1F);
        self.status.remove(StatusRegister::VBLANK);
        self.write_toggle = false;
        self.open_bus = data;
        data
    }

    /// Write PPUCTRL ($2000). Enabling NMI while already in VBlank raises one immediately.
    pub fn write_ctrl(&mut self, data: u8) {
        self.open_bus = data;
        let was_enabled = self.ctrl.contains(ControlRegister::GENERATE_NMI);
        self.ctrl = ControlRegister::from_bits_retain(data);
        if !was_enabled
            && self.ctrl.contains(ControlRegister::GENERATE_NMI)
            && self.status.contains(StatusRegister::VBLANK)
        {
            self.nmi_pending = true;
        }
    }

    /// Write PPUMASK ($2001).
    pub fn write_mask(&mut self, data: u8) {
        self.open_bus = data;
        self.mask = MaskRegister::from_bits_retain(data);
    }

    /// Write OAMADDR ($2003).
    pub fn write_oam_addr(&mut self, data: u8) {
        self.open_bus = data;
        self.oam_addr = data;
    }

    /// Read OAMDATA ($2004); does not increment OAMADDR.
    pub fn read_oam_data(&mut self) -> u8 {
        let data = self.oam[self.oam_addr as usize];
        self.open_bus = data;
        data
    }

    /// Write OAMDATA ($2004); writes OAM and increments OAMADDR.
    pub fn write_oam_data(&mut self, data: u8) {
        self.open_bus = data;
        self.oam[self.oam_addr as usize] = data;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    /// Copy a 256-byte page into OAM (OAM DMA from $4014), starting at OAMADDR.
    pub fn oam_dma(&mut self, page: &[u8; OAM_LEN]) {
        for (i, &byte) in page.iter().enumerate() {
            self.oam[(self.oam_addr as usize + i) % OAM_LEN] = byte;
        }
    }

    /// Write PPUSCROLL ($2005): first write X, second write Y.
    pub fn write_scroll(&mut self, data: u8) {
        self.open_bus = data;
        if !self.write_toggle {
            self.scroll_x = data;
        } else {
            self.scroll_y = data;
        }
        self.write_toggle = !self.write_toggle;
    }

    /// Write PPUADDR ($2006): two-byte write for the 14-bit VRAM address (high then low).
    pub fn write_addr(&mut self, data: u8) {
        self.open_bus = data;
        if !self.write_toggle {
            self.addr = bits::word(bits::lo(self.addr), data & 0x3F);
        } else {
            self.addr = bits::word(data, bits::hi(self.addr));
        }
        self.write_toggle = !self.write_toggle;
    }

    /// Read PPUDATA ($2007). Below $3F00 the read returns the previously buffered byte; palette
    /// reads are immediate and refill the buffer from the nametable underneath.
    pub fn read_data(&mut self, cart: &Cartridge) -> u8 {
        let addr = self.addr & 0x3FFF;
        let data = if addr >= 0x3F00 {
            self.read_buffer = self.read_vram(cart, addr - 0x1000);
            self.palette[palette_index(addr)]
        } else {
            let fresh = self.read_vram(cart, addr);
            std::mem::replace(&mut self.read_buffer, fresh)
        };
        self.increment_addr();
        self.open_bus = data;
        data
    }

    /// Write PPUDATA ($2007): writes VRAM at the current address, then increments it
    /// by 1 or 32 per PPUCTRL.
    pub fn write_data(&mut self, cart: &mut Cartridge, data: u8) {
        self.open_bus = data;
        let addr = self.addr & 0x3FFF;
        match addr {
            // CHR RAM only (writes to ROM ignored by mapper)
            0x0000..=0x1FFF => cart.write(addr, data),
            0x2000..=0x3EFF => {
                let index = Self::map_nametable_addr(addr, cart.mirroring());
                self.vram.write(index, data);
            }
            // Stored whole; color lookup ignores bits 6-7.
            _ => self.palette[palette_index(addr)] = data,
        }
        self.increment_addr();
    }

    fn increment_addr(&mut self) {
        self.addr = self.addr.wrapping_add(self.ctrl.vram_addr_increment()) & 0x3FFF;
    }

    /// Read PPU space $0000–$3FFF without side effects.
    pub(super) fn read_vram(&self, cart: &Cartridge, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => cart.read(addr),
            0x2000..=0x3EFF => self
                .vram
                .read(Self::map_nametable_addr(addr, cart.mirroring())),
            _ => self.palette[palette_index(addr)],
        }
    }

    /// Map a nametable address ($2000–$3EFF) to an index into the 2 KiB VRAM.
    /// $3000–$3EFF mirrors $2000–$2EFF.
    pub fn map_nametable_addr(addr: u16, mirroring: Mirroring) -> u16 {
        let addr = (addr - 0x2000) & 0x0FFF;
        let table = addr / 0x400;
        let offset = addr & 0x3FF;

        match (mirroring, table) {
            (Mirroring::Vertical, 0 | 2) | (Mirroring::Horizontal, 0 | 1) => offset,
            _ => offset + 0x400,
        }
    }
}
