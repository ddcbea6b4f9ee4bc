/*!
Delta modulation channel ($4010-$4013).

Memory reader
- While the sample buffer is empty and bytes remain, `dma_request` is raised. The CPU answers
  by reading the byte at `dma_address` and handing it to `fill_buffer`.
- The address counter wraps $FFFF -> $8000. When the last byte is consumed the sample
  restarts if looping, otherwise the DMC IRQ latches when enabled.

Output unit
- Timer period from the NTSC rate table (CPU cycles). Each expiry consumes one bit of the
  shift register: 1 adds 2, 0 subtracts 2, clamped to 0..=127. After 8 bits a new byte is
  taken from the buffer, or the unit goes silent if the buffer is empty.
*/

const RATE_TABLE: [u16; 16] = [
    428, 380, 340, 320, 286, 254, 226, 214, 190, 160, 142, 128, 106, 84, 72, 54,
];

#[derive(Clone, Debug)]
pub(crate) struct Dmc {
    irq_enabled: bool,
    looping: bool,
    period: u16,
    timer: u16,
    pub(crate) irq_flag: bool,

    output_level: u8,
    sample_address: u16,
    sample_length: u16,
    address_counter: u16,
    bytes_remaining: u16,

    buffer: u8,
    buffer_empty: bool,
    shift: u8,
    bits_remaining: u8,
    silence: bool,
}

impl Default for Dmc {
    fn default() -> Self {
        Self {
            irq_enabled: false,
            looping: false,
            period: RATE_TABLE[0],
            timer: 0,
            irq_flag: false,
            output_level: 0,
            sample_address: 0xC000,
            sample_length: 1,
            address_counter: 0xC000,
            bytes_remaining: 0,
            buffer: 0,
            buffer_empty: true,
            shift: 0,
            bits_remaining: 8,
            silence: true,
        }
    }
}

impl Dmc {
    pub(crate) fn write(&mut self, reg: u16, value: u8) {
        match reg {
            0 => {
                self.irq_enabled = value & 0x80 != 0;
                self.looping = value & 0x40 != 0;
                self.period = RATE_TABLE[(value & 0x0F) as usize];
                if !self.irq_enabled {
                    self.irq_flag = false;
                }
            }
            1 => self.output_level = value & 0x7F,
            2 => self.sample_address = 0xC000 | ((value as u16) << 6),
            _ => self.sample_length = ((value as u16) << 4) + 1,
        }
    }

    /// $4015 bit 4. Also acknowledges the DMC IRQ.
    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.irq_flag = false;
        if !enabled {
            self.bytes_remaining = 0;
        } else if self.bytes_remaining == 0 {
            self.restart();
        }
    }

    fn restart(&mut self) {
        self.address_counter = self.sample_address;
        self.bytes_remaining = self.sample_length;
    }

    #[inline]
    pub(crate) fn active(&self) -> bool {
        self.bytes_remaining > 0
    }

    #[inline]
    pub(crate) fn dma_request(&self) -> bool {
        self.buffer_empty && self.bytes_remaining > 0
    }

    #[inline]
    pub(crate) fn dma_address(&self) -> u16 {
        self.address_counter
    }

    /// Deliver the byte fetched by the CPU for the pending request.
    pub(crate) fn fill_buffer(&mut self, value: u8) {
        if !self.dma_request() {
            return;
        }
        self.buffer = value;
        self.buffer_empty = false;
        self.address_counter = if self.address_counter == 0xFFFF {
            0x8000
        } else {
            self.address_counter + 1
        };
        self.bytes_remaining -= 1;
        if self.bytes_remaining == 0 {
            if self.looping {
                self.restart();
            } else if self.irq_enabled {
                self.irq_flag = true;
            }
        }
    }

    /// CPU-cycle timer clock.
    pub(crate) fn clock_timer(&mut self) {
        if self.timer > 0 {
            self.timer -= 1;
            return;
        }
        self.timer = self.period - 1;

        if !self.silence {
            if self.shift & 0x01 != 0 {
                if self.output_level <= 125 {
                    self.output_level += 2;
                }
            } else if self.output_level >= 2 {
                self.output_level -= 2;
            }
        }
        self.shift >>= 1;
        self.bits_remaining -= 1;
        if self.bits_remaining == 0 {
            self.bits_remaining = 8;
            if self.buffer_empty {
                self.silence = true;
            } else {
                self.silence = false;
                self.shift = self.buffer;
                self.buffer_empty = true;
            }
        }
    }

    pub(crate) fn output(&self) -> u8 {
        self.output_level
    }
}
