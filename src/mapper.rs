/*!
Mapper subsystem: the capability every cartridge board implements, shared bank storage,
and the NROM (mapper 0) board.

The Bus forwards:
- CPU $4020..=$FFFF to `Mapper::cpu_read` / `Mapper::cpu_write`.
- PPU $0000..=$3EFF to `Mapper::ppu_read` / `Mapper::ppu_write` first; when the mapper
  reports "not handled" (`None` / `false`) the Bus falls back to its own nametable VRAM,
  folded by `Mapper::mirroring()`.

Boards that track PPU address line A12 (MMC3) see every PPU fetch because pattern and
nametable accesses both go through `ppu_read` before any fallback.
*/

use crate::cartridge::Mirroring;

/// Common interface all cartridge mappers implement.
///
/// All methods take full, unmasked CPU or PPU addresses.
pub trait Mapper {
    /// Mapper number from the iNES header.
    fn mapper_id(&self) -> u16;

    /// CPU read in cartridge space. `None` means the board does not drive the bus.
    fn cpu_read(&self, addr: u16) -> Option<u8>;

    /// CPU write in cartridge space. Returns whether the board consumed the write.
    fn cpu_write(&mut self, addr: u16, value: u8) -> bool;

    /// PPU read. `None` for addresses served by console VRAM.
    fn ppu_read(&mut self, addr: u16) -> Option<u8>;

    /// PPU write. Returns whether the board consumed the write.
    fn ppu_write(&mut self, addr: u16, value: u8) -> bool;

    /// Current nametable arrangement.
    fn mirroring(&self) -> Mirroring;

    /// Power/reset state for bank registers and IRQ logic.
    fn reset(&mut self) {}

    /// Advance board timers by one master tick (one PPU dot).
    fn clock(&mut self) {}

    /// Whether the board is asserting the CPU IRQ line.
    fn irq_pending(&self) -> bool {
        false
    }

    /// Human-readable register summary for debuggers and logs.
    fn describe(&self) -> String {
        format!("mapper {}", self.mapper_id())
    }
}

/// PRG/CHR backing store shared by every board.
///
/// Offsets handed to the accessors are absolute byte offsets into the ROM images; each
/// accessor wraps them to the image length so an out-of-range bank register mirrors
/// instead of panicking.
#[derive(Clone, Debug)]
pub(crate) struct CartridgeMemory {
    pub(crate) prg_rom: Vec<u8>,
    pub(crate) prg_ram: Vec<u8>,
    pub(crate) chr: Vec<u8>,
    pub(crate) chr_is_ram: bool,
}

impl CartridgeMemory {
    pub(crate) const PRG_RAM_SIZE: usize = 8 * 1024;

    pub(crate) fn new(prg_rom: Vec<u8>, chr: Vec<u8>, chr_is_ram: bool) -> Self {
        Self {
            prg_rom,
            prg_ram: vec![0; Self::PRG_RAM_SIZE],
            chr,
            chr_is_ram,
        }
    }

    /// Number of PRG banks of `size` bytes (never zero).
    #[inline]
    pub(crate) fn prg_banks(&self, size: usize) -> usize {
        (self.prg_rom.len() / size).max(1)
    }

    #[inline]
    pub(crate) fn chr_banks(&self, size: usize) -> usize {
        (self.chr.len() / size).max(1)
    }

    #[inline]
    pub(crate) fn prg_rom(&self, offset: usize) -> u8 {
        if self.prg_rom.is_empty() {
            return 0xFF;
        }
        self.prg_rom[offset % self.prg_rom.len()]
    }

    #[inline]
    pub(crate) fn prg_ram(&self, addr: u16) -> u8 {
        self.prg_ram[(addr as usize - 0x6000) % self.prg_ram.len()]
    }

    #[inline]
    pub(crate) fn set_prg_ram(&mut self, addr: u16, value: u8) {
        let len = self.prg_ram.len();
        self.prg_ram[(addr as usize - 0x6000) % len] = value;
    }

    #[inline]
    pub(crate) fn chr(&self, offset: usize) -> u8 {
        if self.chr.is_empty() {
            return 0;
        }
        self.chr[offset % self.chr.len()]
    }

    /// CHR write; ignored for CHR ROM.
    #[inline]
    pub(crate) fn set_chr(&mut self, offset: usize, value: u8) {
        if !self.chr_is_ram || self.chr.is_empty() {
            return;
        }
        let len = self.chr.len();
        self.chr[offset % len] = value;
    }
}

/// NROM (mapper 0).
///
/// - PRG ROM: 16 KiB mirrored into both halves of $8000..=$FFFF, or 32 KiB direct.
/// - PRG RAM: 8 KiB at $6000..=$7FFF.
/// - CHR: 8 KiB fixed, writable when the cartridge has CHR RAM.
#[derive(Clone, Debug)]
pub struct Nrom {
    mem: CartridgeMemory,
    mirroring: Mirroring,
}

impl Nrom {
    pub(crate) fn new(mem: CartridgeMemory, mirroring: Mirroring) -> Self {
        Self { mem, mirroring }
    }
}

impl Mapper for Nrom {
    #[inline]
    fn mapper_id(&self) -> u16 {
        0
    }

    fn cpu_read(&self, addr: u16) -> Option<u8> {
        match addr {
            0x6000..=0x7FFF => Some(self.mem.prg_ram(addr)),
            0x8000..=0xFFFF => Some(self.mem.prg_rom((addr - 0x8000) as usize)),
            _ => None,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) -> bool {
        match addr {
            0x6000..=0x7FFF => {
                self.mem.set_prg_ram(addr, value);
                true
            }
            _ => false,
        }
    }

    fn ppu_read(&mut self, addr: u16) -> Option<u8> {
        (addr < 0x2000).then(|| self.mem.chr(addr as usize))
    }

    fn ppu_write(&mut self, addr: u16, value: u8) -> bool {
        if addr < 0x2000 {
            self.mem.set_chr(addr as usize, value);
            true
        } else {
            false
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn describe(&self) -> String {
        format!(
            "NROM-{} prg={}K chr={}K{}",
            if self.mem.prg_rom.len() > 16 * 1024 { 256 } else { 128 },
            self.mem.prg_rom.len() / 1024,
            self.mem.chr.len() / 1024,
            if self.mem.chr_is_ram { " (ram)" } else { "" }
        )
    }
}
