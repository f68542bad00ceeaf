//! NES APU (Audio Processing Unit) register file.
//!
//! Channel registers ($4000–$4013), channel enable ($4015) and frame counter ($4017) are
//! latched so the CPU can program them, but no audio is synthesized.

#[allow(clippy::module_inception)]
pub mod apu;

pub use apu::APU;
