//! Frame timing configuration.
//!
//! The core steps the CPU a frame at a time in two phases (active picture, then VBlank). The
//! phase budgets are CPU cycles derived from the PPU's dot clock, not instruction counts.

/// PPU dots per scanline.
pub const DOTS_PER_SCANLINE: u32 = 341;

/// Scanline on which VBlank begins (after 240 visible lines and one post-render line).
pub const VBLANK_SCANLINE: u32 = 241;

/// Video region: decides scanline count and the CPU/PPU clock ratio.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// 60 Hz, 262 scanlines, 3 PPU dots per CPU cycle.
    #[default]
    Ntsc,
    /// 50 Hz, 312 scanlines, 3.2 PPU dots per CPU cycle.
    Pal,
}

impl Region {
    pub const fn scanlines_per_frame(self) -> u32 {
        match self {
            Self::Ntsc => 262,
            Self::Pal => 312,
        }
    }

    /// PPU dots per CPU cycle, as a (numerator, denominator) pair.
    const fn dot_ratio(self) -> (u32, u32) {
        match self {
            Self::Ntsc => (3, 1),
            Self::Pal => (16, 5),
        }
    }

    pub const fn frames_per_second(self) -> u32 {
        match self {
            Self::Ntsc => 60,
            Self::Pal => 50,
        }
    }
}

/// CPU cycle budgets for the two halves of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    /// Cycles run before the frame is rendered and VBlank is raised.
    pub active_cycles: u64,
    /// Cycles run with VBlank set.
    pub vblank_cycles: u64,
}

impl FrameTiming {
    pub const fn from_region(region: Region) -> Self {
        let (num, den) = region.dot_ratio();
        let active_dots = DOTS_PER_SCANLINE * VBLANK_SCANLINE;
        let frame_dots = DOTS_PER_SCANLINE * region.scanlines_per_frame();
        // Round to the nearest whole cycle.
        let active = (active_dots * den + num / 2) / num;
        let frame = (frame_dots * den + num / 2) / num;
        Self {
            active_cycles: active as u64,
            vblank_cycles: (frame - active) as u64,
        }
    }

    pub const fn cycles_per_frame(&self) -> u64 {
        self.active_cycles + self.vblank_cycles
    }
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::from_region(Region::Ntsc)
    }
}
