/*!
APU: register window, frame sequencer, five channels and the mixer.

Register map:
- $4000-$4003 pulse 1, $4004-$4007 pulse 2, $4008-$400B triangle, $400C-$400F noise
- $4010-$4013 DMC (IRQ enable/loop/rate, direct load, sample address, sample length)
- $4015 write: channel enables (clears the DMC IRQ). Read: length-counter status for the four
  tone channels, DMC active, frame IRQ (bit 6), DMC IRQ (bit 7); clears the frame IRQ.
- $4017 write: sequencer mode (bit 7) and frame IRQ inhibit (bit 6)

Timing:
- `clock` runs once per CPU cycle. Triangle, noise and DMC timers count CPU cycles; pulse
  timers and the frame sequencer run at half that rate.
- `update_sample` latches the mixer output; the master driver calls it right after the CPU.
*/

pub mod frame_counter;
pub mod mixer;

pub(crate) mod dmc;
pub(crate) mod noise;
pub(crate) mod pulse;
pub(crate) mod triangle;
pub(crate) mod units;

use tracing::trace;

use crate::apu::dmc::Dmc;
use crate::apu::frame_counter::FrameCounter;
use crate::apu::noise::Noise;
use crate::apu::pulse::{Pulse, PulseChannel};
use crate::apu::triangle::Triangle;

#[derive(Clone, Debug)]
pub struct Apu {
    pulse1: Pulse,
    pulse2: Pulse,
    triangle: Triangle,
    noise: Noise,
    dmc: Dmc,
    frame: FrameCounter,
    odd_cycle: bool,
    sample: i16,
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

impl Apu {
    pub fn new() -> Self {
        Self {
            pulse1: Pulse::new(PulseChannel::One),
            pulse2: Pulse::new(PulseChannel::Two),
            triangle: Triangle::default(),
            noise: Noise::default(),
            dmc: Dmc::default(),
            frame: FrameCounter::default(),
            odd_cycle: false,
            sample: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// CPU write to $4000-$4013, $4015 or $4017. Other addresses are ignored.
    pub fn write_register(&mut self, addr: u16, value: u8) {
        match addr {
            0x4000..=0x4003 => self.pulse1.write(addr - 0x4000, value),
            0x4004..=0x4007 => self.pulse2.write(addr - 0x4004, value),
            0x4008..=0x400B => self.triangle.write(addr - 0x4008, value),
            0x400C..=0x400F => self.noise.write(addr - 0x400C, value),
            0x4010..=0x4013 => self.dmc.write(addr - 0x4010, value),
            0x4015 => {
                self.pulse1.length.set_enabled(value & 0x01 != 0);
                self.pulse2.length.set_enabled(value & 0x02 != 0);
                self.triangle.length.set_enabled(value & 0x04 != 0);
                self.noise.length.set_enabled(value & 0x08 != 0);
                self.dmc.set_enabled(value & 0x10 != 0);
            }
            0x4017 => {
                trace!(value, "apu frame counter write");
                self.frame.write(value);
            }
            _ => {}
        }
    }

    /// $4015 read: reports status and acknowledges the frame IRQ.
    pub fn read_status(&mut self) -> u8 {
        let v = self.peek_status();
        self.frame.irq_flag = false;
        v
    }

    /// $4015 without the acknowledge.
    pub fn peek_status(&self) -> u8 {
        let mut v = 0u8;
        v |= u8::from(self.pulse1.length.active());
        v |= u8::from(self.pulse2.length.active()) << 1;
        v |= u8::from(self.triangle.length.active()) << 2;
        v |= u8::from(self.noise.length.active()) << 3;
        v |= u8::from(self.dmc.active()) << 4;
        v |= u8::from(self.frame.irq_flag) << 6;
        v |= u8::from(self.dmc.irq_flag) << 7;
        v
    }

    /// One CPU cycle.
    pub fn clock(&mut self) {
        let clocks = self.frame.clock();
        if clocks.quarter {
            self.pulse1.clock_quarter();
            self.pulse2.clock_quarter();
            self.triangle.clock_quarter();
            self.noise.clock_quarter();
        }
        if clocks.half {
            self.pulse1.clock_half();
            self.pulse2.clock_half();
            self.triangle.clock_half();
            self.noise.clock_half();
        }

        self.triangle.clock_timer();
        self.noise.clock_timer();
        self.dmc.clock_timer();
        self.odd_cycle = !self.odd_cycle;
        if self.odd_cycle {
            self.pulse1.clock_timer();
            self.pulse2.clock_timer();
        }
    }

    /// Latch the current mixer output.
    pub fn update_sample(&mut self) {
        let mixed = mixer::mix(
            self.pulse1.output(),
            self.pulse2.output(),
            self.triangle.output(),
            self.noise.output(),
            self.dmc.output(),
        );
        self.sample = mixer::to_sample(mixed);
    }

    /// Most recent mixed sample.
    pub fn mixed_sample(&self) -> i16 {
        self.sample
    }

    /// Frame or DMC interrupt asserted.
    pub fn irq_pending(&self) -> bool {
        self.frame.irq_flag || self.dmc.irq_flag
    }

    pub fn frame_irq(&self) -> bool {
        self.frame.irq_flag
    }

    /// DMC sample buffer is empty with bytes left to fetch.
    pub fn dmc_dma_request(&self) -> bool {
        self.dmc.dma_request()
    }

    pub fn dmc_dma_address(&self) -> u16 {
        self.dmc.dma_address()
    }

    /// Complete a DMC DMA with the byte the CPU read.
    pub fn dmc_dma_complete(&mut self, value: u8) {
        self.dmc.fill_buffer(value);
    }
}
