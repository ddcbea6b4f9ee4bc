//! Noise channel ($400C-$400F): 15-bit LFSR, feedback tap on bit 1 (long mode) or bit 6
//! (short mode). Periods are NTSC CPU cycles.

use crate::apu::units::{Envelope, LengthCounter};

const PERIOD_TABLE: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

#[derive(Clone, Debug)]
pub(crate) struct Noise {
    short_mode: bool,
    period: u16,
    timer: u16,
    shift: u16,
    pub(crate) length: LengthCounter,
    envelope: Envelope,
}

impl Default for Noise {
    fn default() -> Self {
        Self {
            short_mode: false,
            period: PERIOD_TABLE[0],
            timer: 0,
            shift: 1,
            length: LengthCounter::default(),
            envelope: Envelope::default(),
        }
    }
}

impl Noise {
    pub(crate) fn write(&mut self, reg: u16, value: u8) {
        match reg {
            0 => {
                self.length.set_halt(value & 0x20 != 0);
                self.envelope.write_control(value);
            }
            1 => {}
            2 => {
                self.short_mode = value & 0x80 != 0;
                self.period = PERIOD_TABLE[(value & 0x0F) as usize];
            }
            _ => {
                self.length.load(value >> 3);
                self.envelope.restart();
            }
        }
    }

    /// CPU-cycle timer clock.
    pub(crate) fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = self.period - 1;
            let tap = if self.short_mode { 6 } else { 1 };
            let feedback = (self.shift ^ (self.shift >> tap)) & 0x01;
            self.shift = (self.shift >> 1) | (feedback << 14);
        } else {
            self.timer -= 1;
        }
    }

    pub(crate) fn clock_quarter(&mut self) {
        self.envelope.clock();
    }

    pub(crate) fn clock_half(&mut self) {
        self.length.clock();
    }

    pub(crate) fn output(&self) -> u8 {
        if !self.length.active() || self.shift & 0x01 != 0 {
            0
        } else {
            self.envelope.output()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lfsr_period(short: bool) -> usize {
        let mut n = Noise::default();
        n.write(2, if short { 0x80 } else { 0x00 });
        let start = n.shift;
        let mut steps = 0;
        loop {
            for _ in 0..4 {
                n.clock_timer();
            }
            steps += 1;
            if n.shift == start {
                return steps;
            }
        }
    }

    #[test]
    fn long_mode_cycles_through_32767_states() {
        assert_eq!(lfsr_period(false), 32767);
    }

    #[test]
    fn short_mode_has_short_cycle() {
        assert!(lfsr_period(true) <= 93);
    }

    #[test]
    fn silent_without_length() {
        let mut n = Noise::default();
        n.write(0, 0x1F);
        n.write(3, 0x08);
        assert_eq!(n.output(), 0);
    }
}
