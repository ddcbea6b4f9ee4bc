//! Triangle channel ($4008-$400B): 32-step ramp gated by both the length and linear
//! counters. Its timer runs at the CPU rate, twice as fast as the pulse timers.

use crate::apu::units::LengthCounter;

const SEQUENCE: [u8; 32] = [
    15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12,
    13, 14, 15,
];

#[derive(Clone, Debug, Default)]
pub(crate) struct Triangle {
    control: bool,
    linear_reload_value: u8,
    linear: u8,
    linear_reload: bool,
    period: u16,
    timer: u16,
    step: u8,
    pub(crate) length: LengthCounter,
}

impl Triangle {
    pub(crate) fn write(&mut self, reg: u16, value: u8) {
        match reg {
            0 => {
                self.control = value & 0x80 != 0;
                self.length.set_halt(self.control);
                self.linear_reload_value = value & 0x7F;
            }
            1 => {}
            2 => self.period = (self.period & 0x0700) | value as u16,
            _ => {
                self.period = (self.period & 0x00FF) | ((value as u16 & 0x07) << 8);
                self.length.load(value >> 3);
                self.linear_reload = true;
            }
        }
    }

    /// CPU-cycle timer clock.
    pub(crate) fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = self.period;
            if self.length.active() && self.linear > 0 {
                self.step = (self.step + 1) & 0x1F;
            }
        } else {
            self.timer -= 1;
        }
    }

    pub(crate) fn clock_quarter(&mut self) {
        if self.linear_reload {
            self.linear = self.linear_reload_value;
        } else if self.linear > 0 {
            self.linear -= 1;
        }
        if !self.control {
            self.linear_reload = false;
        }
    }

    pub(crate) fn clock_half(&mut self) {
        self.length.clock();
    }

    /// The sequencer holds its level when gated, so output is never forced to 0.
    pub(crate) fn output(&self) -> u8 {
        SEQUENCE[self.step as usize]
    }
}
