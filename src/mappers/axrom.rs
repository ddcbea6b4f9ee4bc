/*
AxROM (Mapper 7).

- PRG: 32 KiB switchable window at $8000-$FFFF (bits 0..2 of the bank register).
- CHR: 8 KiB RAM.
- Mirroring: single-screen; bit 4 of the bank register picks the nametable page.
*/

use tracing::trace;

use crate::cartridge::Mirroring;
use crate::mapper::{CartridgeMemory, Mapper};

#[derive(Debug, Clone)]
pub struct Axrom {
    mem: CartridgeMemory,
    prg_bank: usize,
    upper_page: bool,
}

impl Axrom {
    pub(crate) fn new(mem: CartridgeMemory) -> Self {
        Self {
            mem,
            prg_bank: 0,
            upper_page: false,
        }
    }
}

impl Mapper for Axrom {
    fn mapper_id(&self) -> u16 {
        7
    }

    fn cpu_read(&self, addr: u16) -> Option<u8> {
        match addr {
            0x8000..=0xFFFF => Some(
                self.mem
                    .prg_rom(self.prg_bank * 0x8000 + (addr as usize & 0x7FFF)),
            ),
            _ => None,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) -> bool {
        if addr < 0x8000 {
            return false;
        }
        self.prg_bank = (value & 0x07) as usize % self.mem.prg_banks(0x8000);
        self.upper_page = value & 0x10 != 0;
        trace!(bank = self.prg_bank, upper = self.upper_page, "axrom select");
        true
    }

    fn ppu_read(&mut self, addr: u16) -> Option<u8> {
        (addr < 0x2000).then(|| self.mem.chr(addr as usize))
    }

    fn ppu_write(&mut self, addr: u16, value: u8) -> bool {
        if addr >= 0x2000 {
            return false;
        }
        self.mem.set_chr(addr as usize, value);
        true
    }

    fn mirroring(&self) -> Mirroring {
        if self.upper_page {
            Mirroring::SingleScreenUpper
        } else {
            Mirroring::SingleScreenLower
        }
    }

    fn reset(&mut self) {
        self.prg_bank = 0;
        self.upper_page = false;
    }

    fn describe(&self) -> String {
        format!(
            "AxROM prg={} page={}",
            self.prg_bank,
            if self.upper_page { 1 } else { 0 }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axrom() -> Axrom {
        let mut prg = vec![0u8; 4 * 0x8000];
        for b in 0..4 {
            prg[b * 0x8000] = 0xA0 + b as u8;
        }
        Axrom::new(CartridgeMemory::new(prg, vec![0; 0x2000], true))
    }

    #[test]
    fn bank_and_page_select() {
        let mut m = axrom();
        assert_eq!(m.cpu_read(0x8000), Some(0xA0));
        assert_eq!(m.mirroring(), Mirroring::SingleScreenLower);

        m.cpu_write(0x8000, 0x12);
        assert_eq!(m.cpu_read(0x8000), Some(0xA2));
        assert_eq!(m.mirroring(), Mirroring::SingleScreenUpper);

        m.cpu_write(0x8000, 0x07);
        assert_eq!(m.cpu_read(0x8000), Some(0xA3));
        assert_eq!(m.mirroring(), Mirroring::SingleScreenLower);
    }
}
