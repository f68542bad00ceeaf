//! 6502 processor status register (P) flag bits.

pub const FLAG_CARRY: u8 = 1 << 0;
pub const FLAG_ZERO: u8 = 1 << 1;
pub const FLAG_INTERRUPT_DISABLE: u8 = 1 << 2;
pub const FLAG_DECIMAL: u8 = 1 << 3;  // Stored, but ADC/SBC stay binary on the 2A03
pub const FLAG_BREAK: u8 = 1 << 4;    // Only exists in pushed copies of P
pub const FLAG_UNUSED: u8 = 1 << 5;   // "R": always reads 1
pub const FLAG_OVERFLOW: u8 = 1 << 6;
pub const FLAG_NEGATIVE: u8 = 1 << 7;

/// Status after power-on/reset: I and R set.
pub const POWER_ON_STATUS: u8 = FLAG_INTERRUPT_DISABLE | FLAG_UNUSED;

/// One-letter names, bit 7 first, for trace output.
const NAMES: [char; 8] = ['N', 'V', 'R', 'B', 'D', 'I', 'Z', 'C'];

/// Render P as `NV-BDIZC`-style letters, lowercase when clear.
pub fn describe(status: u8) -> String {
    NAMES
        .iter()
        .enumerate()
        .map(|(i, &name)| {
            if status & (0x80 >> i) != 0 {
                name
            } else {
                name.to_ascii_lowercase()
            }
        })
        .collect()
}
