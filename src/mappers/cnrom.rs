/*
CNROM (Mapper 3).

Characteristics:
- PRG: fixed 16 KiB mirrored or 32 KiB direct at $8000-$FFFF.
- CHR: 8 KiB window selected by any write to $8000-$FFFF.
- Mirroring: header-defined.

Bank select wraps modulo the number of 8 KiB CHR banks so oversize values mirror.
*/

use tracing::trace;

use crate::cartridge::Mirroring;
use crate::mapper::{CartridgeMemory, Mapper};

#[derive(Debug, Clone)]
pub struct Cnrom {
    mem: CartridgeMemory,
    mirroring: Mirroring,
    chr_bank: usize,
}

impl Cnrom {
    pub(crate) fn new(mem: CartridgeMemory, mirroring: Mirroring) -> Self {
        Self {
            mem,
            mirroring,
            chr_bank: 0,
        }
    }
}

impl Mapper for Cnrom {
    fn mapper_id(&self) -> u16 {
        3
    }

    fn cpu_read(&self, addr: u16) -> Option<u8> {
        match addr {
            0x8000..=0xFFFF => Some(self.mem.prg_rom((addr - 0x8000) as usize)),
            _ => None,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) -> bool {
        if addr < 0x8000 {
            return false;
        }
        self.chr_bank = value as usize % self.mem.chr_banks(0x2000);
        trace!(bank = self.chr_bank, "cnrom chr select");
        true
    }

    fn ppu_read(&mut self, addr: u16) -> Option<u8> {
        (addr < 0x2000).then(|| self.mem.chr(self.chr_bank * 0x2000 + addr as usize))
    }

    fn ppu_write(&mut self, addr: u16, value: u8) -> bool {
        if addr >= 0x2000 {
            return false;
        }
        self.mem.set_chr(self.chr_bank * 0x2000 + addr as usize, value);
        true
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn reset(&mut self) {
        self.chr_bank = 0;
    }

    fn describe(&self) -> String {
        format!("CNROM chr={}", self.chr_bank)
    }
}
