//! NES controller input handling.
//!
//! Implements the standard NES controller shift register protocol:
//! write $01 to $4016 to hold the latch on button A; write $00 to release it; then read $4016
//! repeatedly to get one bit per read (A, B, Select, Start, Up, Down, Left, Right). Reads past
//! the eighth return 1, as an official pad does.

/// Controller buttons, in shift-out order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];

    /// Bit in the button state byte (and position in the read sequence).
    pub const fn bit(self) -> u8 {
        self as u8
    }
}

/// Represents a single NES controller connected to port 1 ($4016).
#[derive(Debug, Default, Clone)]
pub struct Controller {
    /// Current button states: bit 0 = A, 1 = B, 2 = Select, 3 = Start,
    /// 4 = Up, 5 = Down, 6 = Left, 7 = Right.
    state: u8,
    /// Index of the next button to shift out; 8 once all have been read.
    index: u8,
    strobe: bool,
}

impl Controller {
    /// Create a new controller with no buttons pressed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        let mask = 1 << button.bit();
        if pressed {
            self.state |= mask;
        } else {
            self.state &= !mask;
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.state & (1 << button.bit()) != 0
    }

    /// Read one button state from $4016. Returns the button bit OR'd with open bus ($40).
    /// Each read advances to the next button unless the strobe is held.
    pub fn read(&mut self) -> u8 {
        let bit = if self.index < 8 {
            (self.state >> self.index) & 1
        } else {
            1
        };
        if !self.strobe && self.index < 8 {
            self.index += 1;
        }
        bit | 0x40
    }

    /// Write to $4016. While bit 0 is 1 the shift position stays on A.
    pub fn write(&mut self, data: u8) {
        self.strobe = data & 1 != 0;
        if self.strobe {
            self.index = 0;
        }
    }
}
