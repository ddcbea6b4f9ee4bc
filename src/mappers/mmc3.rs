/*!
MMC3 (Mapper 4).

Implemented:
- Bank select ($8000 even) / bank data ($8001 odd) registers R0..R7
- PRG banking modes (select bit 6): two switchable 8K windows, second-last and last fixed
- CHR banking (two 2K + four 1K windows) with A12 inversion (select bit 7)
- Runtime mirroring ($A000 even, bit 0: 0 = vertical, 1 = horizontal)
- PRG RAM enable (bit 7) and write protect (bit 6) via $A001 odd
- Scanline IRQ counter: latch ($C000), reload ($C001), disable/acknowledge ($E000),
  enable ($E001)

IRQ clocking
- A12 is sampled on every PPU-space access the PPU (or a CPU $2007 access) makes; nametable
  fetches hold it low.
- `clock()` runs once per PPU dot and counts how long A12 has been low.
- A 0->1 transition after at least `A12_LOW_FILTER` low dots clocks the counter: if it is
  zero or a reload was requested it is loaded from the latch, otherwise it decrements.
  When the result is zero and IRQs are enabled the IRQ line is asserted.
*/

use tracing::trace;

use crate::cartridge::Mirroring;
use crate::mapper::{CartridgeMemory, Mapper};

/// Dots A12 must stay low before a rising edge counts.
const A12_LOW_FILTER: u16 = 3;

#[derive(Debug, Clone)]
pub struct Mmc3 {
    mem: CartridgeMemory,

    // Bank registers R0..R7
    bank_regs: [u8; 8],
    bank_select: u8,

    // Runtime controls
    horizontal: bool,
    prg_ram_enabled: bool,
    prg_ram_write_protect: bool,

    // IRQ state
    irq_latch: u8,
    irq_counter: u8,
    irq_reload: bool,
    irq_enabled: bool,
    irq_pending: bool,
    a12_high: bool,
    a12_low_dots: u16,
}

impl Mmc3 {
    pub(crate) fn new(mem: CartridgeMemory, mirroring: Mirroring) -> Self {
        let mut m = Self {
            mem,
            bank_regs: [0; 8],
            bank_select: 0,
            horizontal: mirroring == Mirroring::Horizontal,
            prg_ram_enabled: true,
            prg_ram_write_protect: false,
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            irq_pending: false,
            a12_high: false,
            a12_low_dots: 0,
        };
        m.reset_banks();
        m
    }

    fn reset_banks(&mut self) {
        self.bank_regs = [0, 2, 4, 5, 6, 7, 0, 1];
        self.bank_select = 0;
    }

    /// Current IRQ counter value.
    pub fn irq_counter(&self) -> u8 {
        self.irq_counter
    }

    #[inline]
    fn prg_mode_swapped(&self) -> bool {
        self.bank_select & 0x40 != 0
    }

    #[inline]
    fn chr_inverted(&self) -> bool {
        self.bank_select & 0x80 != 0
    }

    fn prg_offset(&self, addr: u16) -> usize {
        let count = self.mem.prg_banks(0x2000);
        let last = count - 1;
        let second_last = count.saturating_sub(2);
        let r6 = (self.bank_regs[6] & 0x3F) as usize % count;
        let r7 = (self.bank_regs[7] & 0x3F) as usize % count;
        let bank = match (addr, self.prg_mode_swapped()) {
            (0x8000..=0x9FFF, false) => r6,
            (0x8000..=0x9FFF, true) => second_last,
            (0xA000..=0xBFFF, _) => r7,
            (0xC000..=0xDFFF, false) => second_last,
            (0xC000..=0xDFFF, true) => r6,
            _ => last,
        };
        bank * 0x2000 + (addr as usize & 0x1FFF)
    }

    fn chr_offset(&self, addr: u16) -> usize {
        // Fold the inversion bit into the address so one table serves both layouts.
        let a = (if self.chr_inverted() { addr ^ 0x1000 } else { addr }) as usize & 0x1FFF;
        let bank_1k = match a {
            0x0000..=0x07FF => (self.bank_regs[0] & 0xFE) as usize + (a >> 10 & 1),
            0x0800..=0x0FFF => (self.bank_regs[1] & 0xFE) as usize + (a >> 10 & 1),
            0x1000..=0x13FF => self.bank_regs[2] as usize,
            0x1400..=0x17FF => self.bank_regs[3] as usize,
            0x1800..=0x1BFF => self.bank_regs[4] as usize,
            _ => self.bank_regs[5] as usize,
        };
        (bank_1k % self.mem.chr_banks(0x400)) * 0x400 + (a & 0x03FF)
    }

    fn observe_a12(&mut self, addr: u16) {
        if addr & 0x1000 == 0 {
            self.a12_high = false;
            return;
        }
        if !self.a12_high && self.a12_low_dots >= A12_LOW_FILTER {
            self.clock_irq_counter();
        }
        self.a12_high = true;
        self.a12_low_dots = 0;
    }

    fn clock_irq_counter(&mut self) {
        if self.irq_counter == 0 || self.irq_reload {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        } else {
            self.irq_counter -= 1;
        }
        if self.irq_counter == 0 && self.irq_enabled {
            self.irq_pending = true;
        }
    }

    fn write_register(&mut self, addr: u16, value: u8) {
        let even = addr & 1 == 0;
        match (addr, even) {
            (0x8000..=0x9FFF, true) => self.bank_select = value,
            (0x8000..=0x9FFF, false) => {
                let target = (self.bank_select & 0x07) as usize;
                self.bank_regs[target] = value;
                trace!(reg = target, value, "mmc3 bank data");
            }
            (0xA000..=0xBFFF, true) => self.horizontal = value & 1 != 0,
            (0xA000..=0xBFFF, false) => {
                self.prg_ram_enabled = value & 0x80 != 0;
                self.prg_ram_write_protect = value & 0x40 != 0;
            }
            (0xC000..=0xDFFF, true) => self.irq_latch = value,
            (0xC000..=0xDFFF, false) => {
                self.irq_counter = 0;
                self.irq_reload = true;
            }
            (_, true) => {
                self.irq_enabled = false;
                self.irq_pending = false;
            }
            (_, false) => self.irq_enabled = true,
        }
    }
}

impl Mapper for Mmc3 {
    fn mapper_id(&self) -> u16 {
        4
    }

    fn cpu_read(&self, addr: u16) -> Option<u8> {
        match addr {
            0x6000..=0x7FFF if self.prg_ram_enabled => Some(self.mem.prg_ram(addr)),
            0x8000..=0xFFFF => Some(self.mem.prg_rom(self.prg_offset(addr))),
            _ => None,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) -> bool {
        match addr {
            0x6000..=0x7FFF => {
                if self.prg_ram_enabled && !self.prg_ram_write_protect {
                    self.mem.set_prg_ram(addr, value);
                }
                true
            }
            0x8000..=0xFFFF => {
                self.write_register(addr, value);
                true
            }
            _ => false,
        }
    }

    fn ppu_read(&mut self, addr: u16) -> Option<u8> {
        self.observe_a12(addr);
        if addr >= 0x2000 {
            return None;
        }
        Some(self.mem.chr(self.chr_offset(addr)))
    }

    fn ppu_write(&mut self, addr: u16, value: u8) -> bool {
        self.observe_a12(addr);
        if addr >= 0x2000 {
            return false;
        }
        let offset = self.chr_offset(addr);
        self.mem.set_chr(offset, value);
        true
    }

    fn mirroring(&self) -> Mirroring {
        if self.horizontal {
            Mirroring::Horizontal
        } else {
            Mirroring::Vertical
        }
    }

    fn reset(&mut self) {
        self.reset_banks();
        self.prg_ram_enabled = true;
        self.prg_ram_write_protect = false;
        self.irq_latch = 0;
        self.irq_counter = 0;
        self.irq_reload = false;
        self.irq_enabled = false;
        self.irq_pending = false;
        self.a12_high = false;
        self.a12_low_dots = 0;
    }

    fn clock(&mut self) {
        if !self.a12_high {
            self.a12_low_dots = self.a12_low_dots.saturating_add(1);
        }
    }

    fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    fn describe(&self) -> String {
        format!(
            "MMC3 sel={:02X} regs={:02X?} irq latch={} counter={} en={} pending={}",
            self.bank_select,
            self.bank_regs,
            self.irq_latch,
            self.irq_counter,
            self.irq_enabled,
            self.irq_pending
        )
    }
}
