//! The console: CPU plus system bus, driven one frame at a time.
//!
//! Each frame runs the CPU for the active-picture cycle budget, renders, raises VBlank (which
//! the CPU sees as an NMI if the PPU has it enabled), runs the VBlank budget, then clears
//! VBlank. Budgets are absolute cycle deadlines, so an instruction that overshoots one phase
//! shortens the next.
//!
//! The first CPU or bus error stops the machine: it is latched as a [`Fault`] and every later
//! `run_frame`/`step` returns it without executing anything.

use std::path::Path;

use crate::{
    bus::SystemBus,
    cartridge::Cartridge,
    config::FrameTiming,
    controller::Button,
    cpu::CPU,
    error::{CpuError, Error, Fault},
    ppu::PPU,
};

/// Called once per completed frame with the console, so the host can pull the frame buffer.
pub type FrameCallback = Box<dyn FnMut(&Nes)>;

pub struct Nes {
    cpu: CPU,
    bus: SystemBus,
    timing: FrameTiming,
    /// Cycle count at which the current frame's active period began.
    frame_start: u64,
    frame_count: u64,
    fault: Option<Fault>,
    on_frame: Option<FrameCallback>,
}

impl Nes {
    /// Power on with an iNES image, NTSC timing.
    pub fn new(rom: &[u8]) -> Result<Self, Error> {
        Self::with_timing(rom, FrameTiming::default())
    }

    pub fn with_timing(rom: &[u8], timing: FrameTiming) -> Result<Self, Error> {
        Self::from_cartridge(Cartridge::from_bytes(rom)?, timing)
    }

    /// Load an iNES file from disk.
    pub fn load(path: impl AsRef<Path>, timing: FrameTiming) -> Result<Self, Error> {
        Self::from_cartridge(Cartridge::load(path)?, timing)
    }

    pub fn from_cartridge(cart: Cartridge, timing: FrameTiming) -> Result<Self, Error> {
        let mut nes = Self {
            cpu: CPU::new(),
            bus: SystemBus::new(cart),
            timing,
            frame_start: 0,
            frame_count: 0,
            fault: None,
            on_frame: None,
        };
        nes.reset()?;
        Ok(nes)
    }

    /// Reset the CPU through the reset vector and clear a latched fault.
    pub fn reset(&mut self) -> Result<(), Fault> {
        self.fault = None;
        self.bus.set_vblank(false);
        if let Err(cause) = self.cpu.reset(&mut self.bus) {
            return Err(self.latch(cause));
        }
        self.frame_start = self.cpu.cycles();
        Ok(())
    }

    /// Run one full frame and notify the frame callback.
    pub fn run_frame(&mut self) -> Result<(), Fault> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }

        let vblank_at = self.frame_start + self.timing.active_cycles;
        self.run_until(vblank_at)?;

        self.bus.render_frame();
        self.bus.set_vblank(true);

        let frame_end = vblank_at + self.timing.vblank_cycles;
        self.run_until(frame_end)?;
        self.bus.set_vblank(false);

        self.frame_start = frame_end;
        self.frame_count += 1;
        self.notify();
        Ok(())
    }

    /// Execute a single instruction outside the frame loop.
    pub fn step(&mut self) -> Result<(), Fault> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        self.step_cpu()
    }

    pub fn on_frame(&mut self, callback: impl FnMut(&Nes) + 'static) {
        self.on_frame = Some(Box::new(callback));
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.bus.set_button(button, pressed);
    }

    /// RGBA, 256×240, row-major.
    pub fn frame_buffer(&self) -> &[u8] {
        self.bus.ppu().frame_buffer()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    pub fn cpu(&self) -> &CPU {
        &self.cpu
    }

    pub fn ppu(&self) -> &PPU {
        self.bus.ppu()
    }

    pub fn bus(&self) -> &SystemBus {
        &self.bus
    }

    pub fn timing(&self) -> FrameTiming {
        self.timing
    }

    fn run_until(&mut self, deadline: u64) -> Result<(), Fault> {
        while self.cpu.cycles() < deadline {
            self.step_cpu()?;
        }
        Ok(())
    }

    fn step_cpu(&mut self) -> Result<(), Fault> {
        match self.cpu.step(&mut self.bus) {
            Ok(()) => Ok(()),
            Err(cause) => Err(self.latch(cause)),
        }
    }

    fn latch(&mut self, cause: CpuError) -> Fault {
        let fault = Fault {
            cause,
            opcode: self.cpu.current_opcode(),
            registers: self.cpu.registers(),
        };
        log::error!("emulation halted after {} frames: {fault}", self.frame_count);
        self.fault = Some(fault);
        fault
    }

    fn notify(&mut self) {
        if let Some(mut callback) = self.on_frame.take() {
            callback(self);
            self.on_frame = Some(callback);
        }
    }
}
