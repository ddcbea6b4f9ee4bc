/*!
Pulse channel ($4000-$4003 / $4004-$4007).

- 11-bit timer clocked every APU cycle (every other CPU cycle) steps an 8-step duty sequence.
- Sweep unit adjusts the period on half frames. Channel 1 negates with one's complement
  (subtracts one extra), channel 2 with two's complement.
- Muted while the period is below 8 or the sweep target exceeds $7FF, regardless of the
  sweep enable bit.
*/

use crate::apu::units::{Envelope, LengthCounter};

const DUTY_TABLE: [[u8; 8]; 4] = [
    [0, 1, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 0, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 0, 0, 0],
    [1, 0, 0, 1, 1, 1, 1, 1],
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum PulseChannel {
    One,
    Two,
}

#[derive(Clone, Debug)]
pub(crate) struct Pulse {
    channel: PulseChannel,
    duty: u8,
    step: u8,
    period: u16,
    timer: u16,
    pub(crate) length: LengthCounter,
    envelope: Envelope,

    sweep_enabled: bool,
    sweep_period: u8,
    sweep_negate: bool,
    sweep_shift: u8,
    sweep_divider: u8,
    sweep_reload: bool,
}

impl Pulse {
    pub(crate) fn new(channel: PulseChannel) -> Self {
        Self {
            channel,
            duty: 0,
            step: 0,
            period: 0,
            timer: 0,
            length: LengthCounter::default(),
            envelope: Envelope::default(),
            sweep_enabled: false,
            sweep_period: 0,
            sweep_negate: false,
            sweep_shift: 0,
            sweep_divider: 0,
            sweep_reload: false,
        }
    }

    /// Register write; `reg` is 0..=3 within the channel's window.
    pub(crate) fn write(&mut self, reg: u16, value: u8) {
        match reg {
            0 => {
                self.duty = value >> 6;
                self.length.set_halt(value & 0x20 != 0);
                self.envelope.write_control(value);
            }
            1 => {
                self.sweep_enabled = value & 0x80 != 0;
                self.sweep_period = (value >> 4) & 0x07;
                self.sweep_negate = value & 0x08 != 0;
                self.sweep_shift = value & 0x07;
                self.sweep_reload = true;
            }
            2 => self.period = (self.period & 0x0700) | value as u16,
            _ => {
                self.period = (self.period & 0x00FF) | ((value as u16 & 0x07) << 8);
                self.length.load(value >> 3);
                self.envelope.restart();
                self.step = 0;
            }
        }
    }

    /// APU-cycle timer clock.
    pub(crate) fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = self.period;
            self.step = (self.step + 1) & 0x07;
        } else {
            self.timer -= 1;
        }
    }

    pub(crate) fn clock_quarter(&mut self) {
        self.envelope.clock();
    }

    pub(crate) fn clock_half(&mut self) {
        self.length.clock();
        if self.sweep_divider == 0 && self.sweep_enabled && self.sweep_shift > 0 && !self.muted() {
            self.period = self.sweep_target();
        }
        if self.sweep_divider == 0 || self.sweep_reload {
            self.sweep_divider = self.sweep_period;
            self.sweep_reload = false;
        } else {
            self.sweep_divider -= 1;
        }
    }

    fn sweep_target(&self) -> u16 {
        let change = self.period >> self.sweep_shift;
        if self.sweep_negate {
            let extra = u16::from(self.channel == PulseChannel::One);
            self.period.saturating_sub(change + extra)
        } else {
            self.period + change
        }
    }

    #[inline]
    fn muted(&self) -> bool {
        self.period < 8 || self.sweep_target() > 0x07FF
    }

    /// Current 4-bit output level.
    pub(crate) fn output(&self) -> u8 {
        if !self.length.active()
            || self.muted()
            || DUTY_TABLE[self.duty as usize][self.step as usize] == 0
        {
            0
        } else {
            self.envelope.output()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(channel: PulseChannel) -> Pulse {
        let mut p = Pulse::new(channel);
        p.length.set_enabled(true);
        p.write(0, 0b1011_1111); // duty 2, halt, constant volume 15
        p.write(2, 0x00);
        p.write(3, 0x09); // period $100, length index 1
        p
    }

    #[test]
    fn duty_sequence_toggles_output() {
        let mut p = playing(PulseChannel::One);
        let mut levels = Vec::new();
        for _ in 0..8 {
            levels.push(p.output());
            for _ in 0..=0x100 {
                p.clock_timer();
            }
        }
        assert_eq!(levels.iter().filter(|&&l| l == 15).count(), 4);
    }

    #[test]
    fn low_period_mutes() {
        let mut p = playing(PulseChannel::One);
        p.write(2, 0x05);
        p.write(3, 0x08);
        for _ in 0..8 {
            assert_eq!(p.output(), 0);
            for _ in 0..6 {
                p.clock_timer();
            }
        }
    }

    #[test]
    fn negate_differs_between_channels() {
        let mut one = playing(PulseChannel::One);
        let mut two = playing(PulseChannel::Two);
        for p in [&mut one, &mut two] {
            p.write(1, 0b1000_1001); // enabled, period 0, negate, shift 1
            p.clock_half();
        }
        assert_eq!(one.period, 0x100 - 0x80 - 1);
        assert_eq!(two.period, 0x100 - 0x80);
    }

    #[test]
    fn overflowing_target_mutes_even_without_sweep() {
        let mut p = playing(PulseChannel::Two);
        p.write(2, 0xFF);
        p.write(3, 0x0F);
        p.write(1, 0x01); // shift 1, disabled: target $7FF + $3FF
        assert!(p.muted());
        assert_eq!(p.output(), 0);
    }
}
