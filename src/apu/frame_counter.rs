/*!
Frame sequencer.

Counts APU cycles (one per two CPU cycles) and emits quarter/half-frame clocks:

| step  | 4-step mode            | 5-step mode  |
|-------|------------------------|--------------|
| 3729  | quarter                | quarter      |
| 7457  | quarter + half         | quarter+half |
| 11186 | quarter                | quarter      |
| 14916 | quarter + half + IRQ   | (nothing)    |
| 18641 | -                      | quarter+half |

A $4017 write takes effect 3 CPU cycles later: the counter restarts and, in 5-step mode,
quarter and half clocks fire at that moment. The inhibit bit clears the frame IRQ at once.
*/

const STEP_1: u16 = 3729;
const STEP_2: u16 = 7457;
const STEP_3: u16 = 11186;
const STEP_4: u16 = 14916;
const STEP_5: u16 = 18641;

const WRITE_DELAY: u8 = 3;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SequencerMode {
    #[default]
    FourStep,
    FiveStep,
}

/// Clocks produced by one sequencer step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FrameClocks {
    pub(crate) quarter: bool,
    pub(crate) half: bool,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FrameCounter {
    mode: SequencerMode,
    irq_inhibit: bool,
    pub(crate) irq_flag: bool,
    counter: u16,
    odd_cpu_cycle: bool,
    pending_write: Option<(u8, u8)>,
}

impl FrameCounter {
    #[cfg(test)]
    pub(crate) fn mode(&self) -> SequencerMode {
        self.mode
    }

    pub(crate) fn counter(&self) -> u16 {
        self.counter
    }

    /// $4017 write.
    pub(crate) fn write(&mut self, value: u8) {
        self.irq_inhibit = value & 0x40 != 0;
        if self.irq_inhibit {
            self.irq_flag = false;
        }
        self.pending_write = Some((value, WRITE_DELAY));
    }

    /// One CPU cycle.
    pub(crate) fn clock(&mut self) -> FrameClocks {
        let mut clocks = FrameClocks::default();

        if let Some((value, delay)) = self.pending_write {
            if delay <= 1 {
                self.pending_write = None;
                self.mode = if value & 0x80 != 0 {
                    SequencerMode::FiveStep
                } else {
                    SequencerMode::FourStep
                };
                self.counter = 0;
                if self.mode == SequencerMode::FiveStep {
                    clocks.quarter = true;
                    clocks.half = true;
                }
            } else {
                self.pending_write = Some((value, delay - 1));
            }
        }

        self.odd_cpu_cycle = !self.odd_cpu_cycle;
        if !self.odd_cpu_cycle {
            return clocks;
        }

        self.counter += 1;
        match (self.mode, self.counter) {
            (_, STEP_1) | (_, STEP_3) => clocks.quarter = true,
            (_, STEP_2) => {
                clocks.quarter = true;
                clocks.half = true;
            }
            (SequencerMode::FourStep, STEP_4) => {
                clocks.quarter = true;
                clocks.half = true;
                if !self.irq_inhibit {
                    self.irq_flag = true;
                }
                self.counter = 0;
            }
            (SequencerMode::FiveStep, STEP_5) => {
                clocks.quarter = true;
                clocks.half = true;
                self.counter = 0;
            }
            _ => {}
        }
        clocks
    }
}
