//! Building blocks shared by the pulse, triangle and noise channels: the length counter
//! and the volume envelope.

/// Length counter load values, indexed by bits 3..7 of the channel's fourth register.
pub(crate) const LENGTH_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, 12, 16, 24, 18, 48, 20, 96, 22,
    192, 24, 72, 26, 16, 28, 32, 30,
];

#[derive(Clone, Debug, Default)]
pub(crate) struct LengthCounter {
    enabled: bool,
    halt: bool,
    value: u8,
}

impl LengthCounter {
    /// $4015 enable bit. Disabling forces the counter to zero.
    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.value = 0;
        }
    }

    pub(crate) fn set_halt(&mut self, halt: bool) {
        self.halt = halt;
    }

    /// Load from the 5-bit table index; ignored while the channel is disabled.
    pub(crate) fn load(&mut self, index: u8) {
        if self.enabled {
            self.value = LENGTH_TABLE[(index & 0x1F) as usize];
        }
    }

    /// Half-frame clock.
    pub(crate) fn clock(&mut self) {
        if !self.halt && self.value > 0 {
            self.value -= 1;
        }
    }

    #[inline]
    pub(crate) fn active(&self) -> bool {
        self.value > 0
    }

    #[cfg(test)]
    pub(crate) fn value(&self) -> u8 {
        self.value
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Envelope {
    start: bool,
    looping: bool,
    constant: bool,
    // Volume in constant mode, divider period otherwise
    volume: u8,
    divider: u8,
    decay: u8,
}

impl Envelope {
    /// Bits 0..5 of the channel's first register.
    pub(crate) fn write_control(&mut self, value: u8) {
        self.looping = value & 0x20 != 0;
        self.constant = value & 0x10 != 0;
        self.volume = value & 0x0F;
    }

    pub(crate) fn restart(&mut self) {
        self.start = true;
    }

    /// Quarter-frame clock.
    pub(crate) fn clock(&mut self) {
        if self.start {
            self.start = false;
            self.decay = 15;
            self.divider = self.volume;
            return;
        }
        if self.divider > 0 {
            self.divider -= 1;
            return;
        }
        self.divider = self.volume;
        if self.decay > 0 {
            self.decay -= 1;
        } else if self.looping {
            self.decay = 15;
        }
    }

    #[inline]
    pub(crate) fn output(&self) -> u8 {
        if self.constant { self.volume } else { self.decay }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counter_respects_enable_and_halt() {
        let mut lc = LengthCounter::default();
        lc.load(1);
        assert!(!lc.active());

        lc.set_enabled(true);
        lc.load(1);
        assert_eq!(lc.value(), 254);
        lc.set_halt(true);
        lc.clock();
        assert_eq!(lc.value(), 254);
        lc.set_halt(false);
        lc.clock();
        assert_eq!(lc.value(), 253);

        lc.set_enabled(false);
        assert!(!lc.active());
    }

    #[test]
    fn envelope_decays_and_loops() {
        let mut env = Envelope::default();
        env.write_control(0x20); // loop, divider period 0
        env.restart();
        env.clock();
        assert_eq!(env.output(), 15);
        for _ in 0..15 {
            env.clock();
        }
        assert_eq!(env.output(), 0);
        env.clock();
        assert_eq!(env.output(), 15);
    }

    #[test]
    fn constant_volume_bypasses_decay() {
        let mut env = Envelope::default();
        env.write_control(0x17);
        env.restart();
        env.clock();
        env.clock();
        assert_eq!(env.output(), 7);
    }
}
