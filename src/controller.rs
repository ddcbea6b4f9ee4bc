/*!
Standard pad: 8-bit button latch shifted out serially through $4016/$4017.

Wiring:
- Bit order (also the `set_button_state` mask layout): A, B, Select, Start, Up, Down,
  Left, Right as bits 0..7.
- Writing bit 0 of $4016 drives the strobe of both pads. While strobe is high every read
  re-latches and reports A; when it drops the latched snapshot is shifted out, one bit per
  read. After eight reads the pad reports 1.
*/

use bitflags::bitflags;

bitflags! {
    /// Button mask in shift-out order.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct Buttons: u8 {
        const A = 1 << 0;
        const B = 1 << 1;
        const SELECT = 1 << 2;
        const START = 1 << 3;
        const UP = 1 << 4;
        const DOWN = 1 << 5;
        const LEFT = 1 << 6;
        const RIGHT = 1 << 7;
    }
}

#[derive(Clone, Debug, Default)]
pub struct Controller {
    // Live state pushed by the input collaborator.
    buttons: Buttons,
    // Snapshot being shifted out.
    shift: u8,
    strobe: bool,
    // Reads since the last latch, saturating at 8.
    read_count: u8,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the live button state.
    pub fn set_state(&mut self, buttons: Buttons) {
        self.buttons = buttons;
    }

    /// Raw-mask form of `set_state`; unknown bits cannot occur in a `u8` mask.
    pub fn set_state_mask(&mut self, mask: u8) {
        self.buttons = Buttons::from_bits_truncate(mask);
    }

    pub fn set_button(&mut self, button: Buttons, pressed: bool) {
        self.buttons.set(button, pressed);
    }

    pub fn buttons(&self) -> Buttons {
        self.buttons
    }

    /// CPU write to $4016 (bit 0 = strobe).
    pub fn write_strobe(&mut self, value: u8) {
        self.strobe = value & 1 != 0;
        if self.strobe {
            self.latch();
        }
    }

    /// CPU read of the pad port; only bit 0 is driven.
    pub fn read(&mut self) -> u8 {
        if self.strobe {
            self.latch();
            return self.shift & 1;
        }
        let bit = self.peek();
        if self.read_count < 8 {
            self.read_count += 1;
        }
        bit
    }

    /// The bit the next `read` would return, without shifting.
    pub fn peek(&self) -> u8 {
        if self.strobe {
            self.buttons.bits() & 1
        } else if self.read_count < 8 {
            (self.shift >> self.read_count) & 1
        } else {
            1
        }
    }

    #[inline]
    fn latch(&mut self) {
        self.shift = self.buttons.bits();
        self.read_count = 0;
    }
}
