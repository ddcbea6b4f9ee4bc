//! MMC1 (Mapper 1).
//!
//! Implements:
//! - 5-bit serial shift register feeding control / CHR0 / CHR1 / PRG registers
//! - PRG banking modes (32K switch, 16K with $8000 fixed, 16K with $C000 fixed)
//! - CHR banking (8K or 4K+4K)
//! - Runtime mirroring (single-screen lower/upper, vertical, horizontal)
//! - PRG RAM enable (PRG register bit 4, active low)
//!
//! Not modelled: the ignored second write of back-to-back RMW cycles, SUROM/SXROM outer banks.

use tracing::trace;

use crate::cartridge::Mirroring;
use crate::mapper::{CartridgeMemory, Mapper};

#[derive(Debug, Clone)]
pub struct Mmc1 {
    mem: CartridgeMemory,

    // 5-bit registers
    control: u8,
    chr_bank0: u8,
    chr_bank1: u8,
    prg_bank: u8,

    // Serial latch
    shift_reg: u8,
    shift_count: u8,

    // Cached 16 KiB windows for $8000 and $C000
    prg_bank_lo: usize,
    prg_bank_hi: usize,
}

impl Mmc1 {
    pub(crate) fn new(mem: CartridgeMemory) -> Self {
        let mut s = Self {
            mem,
            control: 0x0C,
            chr_bank0: 0,
            chr_bank1: 0,
            prg_bank: 0,
            shift_reg: 0,
            shift_count: 0,
            prg_bank_lo: 0,
            prg_bank_hi: 0,
        };
        s.recompute_prg_banks();
        s
    }

    /// Current control register (mirroring, PRG mode, CHR mode).
    pub fn control(&self) -> u8 {
        self.control
    }

    #[inline]
    fn prg_mode(&self) -> u8 {
        (self.control >> 2) & 0x03
    }

    #[inline]
    fn chr_4k_mode(&self) -> bool {
        self.control & 0x10 != 0
    }

    #[inline]
    fn prg_ram_enabled(&self) -> bool {
        self.prg_bank & 0x10 == 0
    }

    fn recompute_prg_banks(&mut self) {
        let count = self.mem.prg_banks(0x4000);
        let bank = (self.prg_bank & 0x0F) as usize % count;
        let last = count - 1;
        (self.prg_bank_lo, self.prg_bank_hi) = match self.prg_mode() {
            0 | 1 => {
                let even = bank & !1;
                (even, (even + 1).min(last))
            }
            2 => (0, bank),
            _ => (bank, last),
        };
    }

    fn commit_register(&mut self, addr: u16, value5: u8) {
        match addr {
            0x8000..=0x9FFF => self.control = value5,
            0xA000..=0xBFFF => self.chr_bank0 = value5,
            0xC000..=0xDFFF => self.chr_bank1 = value5,
            _ => self.prg_bank = value5,
        }
        self.recompute_prg_banks();
        trace!(
            control = self.control,
            chr0 = self.chr_bank0,
            chr1 = self.chr_bank1,
            prg = self.prg_bank,
            "mmc1 register commit"
        );
    }

    fn serial_write(&mut self, addr: u16, data: u8) {
        if data & 0x80 != 0 {
            self.shift_reg = 0;
            self.shift_count = 0;
            self.control |= 0x0C;
            self.recompute_prg_banks();
            return;
        }
        self.shift_reg |= (data & 1) << self.shift_count;
        self.shift_count += 1;
        if self.shift_count == 5 {
            let value5 = self.shift_reg & 0x1F;
            self.shift_reg = 0;
            self.shift_count = 0;
            self.commit_register(addr, value5);
        }
    }

    fn chr_offset(&self, addr: u16) -> usize {
        let a = addr as usize & 0x1FFF;
        if self.chr_4k_mode() {
            let count = self.mem.chr_banks(0x1000);
            let bank = (if a < 0x1000 { self.chr_bank0 } else { self.chr_bank1 }) as usize % count;
            bank * 0x1000 + (a & 0x0FFF)
        } else {
            let count = self.mem.chr_banks(0x2000);
            let bank = (self.chr_bank0 as usize >> 1) % count;
            bank * 0x2000 + a
        }
    }
}

impl Mapper for Mmc1 {
    fn mapper_id(&self) -> u16 {
        1
    }

    fn cpu_read(&self, addr: u16) -> Option<u8> {
        match addr {
            0x6000..=0x7FFF if self.prg_ram_enabled() => Some(self.mem.prg_ram(addr)),
            0x8000..=0xBFFF => Some(
                self.mem
                    .prg_rom(self.prg_bank_lo * 0x4000 + (addr as usize & 0x3FFF)),
            ),
            0xC000..=0xFFFF => Some(
                self.mem
                    .prg_rom(self.prg_bank_hi * 0x4000 + (addr as usize & 0x3FFF)),
            ),
            _ => None,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) -> bool {
        match addr {
            0x6000..=0x7FFF => {
                if self.prg_ram_enabled() {
                    self.mem.set_prg_ram(addr, value);
                }
                true
            }
            0x8000..=0xFFFF => {
                self.serial_write(addr, value);
                true
            }
            _ => false,
        }
    }

    fn ppu_read(&mut self, addr: u16) -> Option<u8> {
        (addr < 0x2000).then(|| self.mem.chr(self.chr_offset(addr)))
    }

    fn ppu_write(&mut self, addr: u16, value: u8) -> bool {
        if addr >= 0x2000 {
            return false;
        }
        let offset = self.chr_offset(addr);
        self.mem.set_chr(offset, value);
        true
    }

    fn mirroring(&self) -> Mirroring {
        match self.control & 0x03 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        }
    }

    fn reset(&mut self) {
        self.control = 0x0C;
        self.shift_reg = 0;
        self.shift_count = 0;
        self.chr_bank0 = 0;
        self.chr_bank1 = 0;
        self.prg_bank = 0;
        self.recompute_prg_banks();
    }

    fn describe(&self) -> String {
        format!(
            "MMC1 ctrl={:05b} prg=[{},{}] chr=[{},{}] shift={}/{}",
            self.control,
            self.prg_bank_lo,
            self.prg_bank_hi,
            self.chr_bank0,
            self.chr_bank1,
            self.shift_reg,
            self.shift_count
        )
    }
}
