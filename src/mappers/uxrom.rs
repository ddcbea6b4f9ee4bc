/*
UxROM (Mapper 2).

- PRG: 16 KiB switchable window at $8000-$BFFF, last bank fixed at $C000-$FFFF.
- CHR: 8 KiB, usually RAM.
- Any write to $8000-$FFFF selects the switchable bank.
*/

use tracing::trace;

use crate::cartridge::Mirroring;
use crate::mapper::{CartridgeMemory, Mapper};

#[derive(Debug, Clone)]
pub struct Uxrom {
    mem: CartridgeMemory,
    mirroring: Mirroring,
    prg_bank: usize,
}

impl Uxrom {
    pub(crate) fn new(mem: CartridgeMemory, mirroring: Mirroring) -> Self {
        Self {
            mem,
            mirroring,
            prg_bank: 0,
        }
    }

    fn last_bank(&self) -> usize {
        self.mem.prg_banks(0x4000) - 1
    }
}

impl Mapper for Uxrom {
    fn mapper_id(&self) -> u16 {
        2
    }

    fn cpu_read(&self, addr: u16) -> Option<u8> {
        let ofs = addr as usize & 0x3FFF;
        match addr {
            0x8000..=0xBFFF => Some(self.mem.prg_rom(self.prg_bank * 0x4000 + ofs)),
            0xC000..=0xFFFF => Some(self.mem.prg_rom(self.last_bank() * 0x4000 + ofs)),
            _ => None,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) -> bool {
        if addr < 0x8000 {
            return false;
        }
        self.prg_bank = value as usize % self.mem.prg_banks(0x4000);
        trace!(bank = self.prg_bank, "uxrom prg select");
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
        self.mirroring
    }

    fn reset(&mut self) {
        self.prg_bank = 0;
    }

    fn describe(&self) -> String {
        format!("UxROM prg=[{},{}]", self.prg_bank, self.last_bank())
    }
}
