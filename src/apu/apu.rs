//! NES APU register sink.
//!
//! Register layout follows the [APU registers](https://www.nesdev.org/wiki/APU_registers):
//! five channels (pulse×2, triangle, noise, DMC), status/enable at $4015 and the
//! [frame counter](https://www.nesdev.org/wiki/APU_Frame_Counter) at $4017. Writes are stored
//! per channel; nothing is clocked and every read returns 0.

/// Pulse channel ($4000–$4003 = pulse 1, $4004–$4007 = pulse 2).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    /// DDLC NNNN: duty, length halt, constant volume, volume/envelope.
    pub control: u8,
    /// EPPP NSSS: sweep enable, period, negate, shift.
    pub sweep: u8,
    pub timer_lo: u8,
    /// LLLL LHHH: length counter load, timer high.
    pub length_timer_hi: u8,
}

impl Pulse {
    pub fn duty(&self) -> u8 {
        self.control >> 6
    }

    /// 11-bit timer period.
    pub fn timer_period(&self) -> u16 {
        ((self.length_timer_hi as u16 & 0x07) << 8) | self.timer_lo as u16
    }

    fn write(&mut self, reg: u16, data: u8) {
        match reg {
            0 => self.control = data,
            1 => self.sweep = data,
            2 => self.timer_lo = data,
            _ => self.length_timer_hi = data,
        }
    }
}

/// Triangle channel ($4008, $400A, $400B; $4009 is unused).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    /// CRRR RRRR: length halt / linear control, linear reload value.
    pub linear: u8,
    pub timer_lo: u8,
    pub length_timer_hi: u8,
}

/// Noise channel ($400C, $400E, $400F; $400D is unused).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Noise {
    /// --LC NNNN: length halt, constant volume, volume/envelope.
    pub control: u8,
    /// L--- PPPP: mode, period index.
    pub mode_period: u8,
    pub length: u8,
}

/// Delta modulation channel ($4010–$4013).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Dmc {
    /// IL-- RRRR: IRQ enable, loop, rate index.
    pub control: u8,
    /// -DDD DDDD: direct output level.
    pub direct_load: u8,
    pub sample_address: u8,
    pub sample_length: u8,
}

impl Dmc {
    /// CPU address of the sample: $C000 + A × 64.
    pub fn sample_start(&self) -> u16 {
        0xC000 | ((self.sample_address as u16) << 6)
    }
}

/// APU state: the last value written to every register.
#[derive(Debug, Default, Clone)]
pub struct APU {
    pub pulse1: Pulse,
    pub pulse2: Pulse,
    pub triangle: Triangle,
    pub noise: Noise,
    pub dmc: Dmc,
    /// $4015 ---D NT21: channel enables.
    pub status: u8,
    /// $4017 MI-- ----: 5-step mode, IRQ inhibit.
    pub frame_counter: u8,
}

impl APU {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write to APU registers $4000–$4013, $4015, $4017.
    pub fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x4000..=0x4003 => self.pulse1.write(addr - 0x4000, data),
            0x4004..=0x4007 => self.pulse2.write(addr - 0x4004, data),
            0x4008 => self.triangle.linear = data,
            0x400A => self.triangle.timer_lo = data,
            0x400B => self.triangle.length_timer_hi = data,
            0x400C => self.noise.control = data,
            0x400E => self.noise.mode_period = data,
            0x400F => self.noise.length = data,
            0x4010 => self.dmc.control = data,
            0x4011 => self.dmc.direct_load = data & 0x7F,
            0x4012 => self.dmc.sample_address = data,
            0x4013 => self.dmc.sample_length = data,
            0x4015 => self.status = data & 0x1F,
            0x4017 => self.frame_counter = data & 0xC0,
            _ => log::debug!("APU: write ${data:02X} to unused register ${addr:04X}"),
        }
    }

    /// Reads return 0: there are no length counters or IRQs to report.
    pub fn read(&mut self, addr: u16) -> u8 {
        log::debug!("APU: read of ${addr:04X}");
        0
    }

    pub fn channel_enabled(&self, channel: u8) -> bool {
        channel < 5 && self.status & (1 << channel) != 0
    }
}
