#![doc = r#"
PPU address-space view.

`PpuMemory` borrows the nametable VRAM and the cartridge for the duration of one PPU call:
- $0000-$1FFF: cartridge CHR via the mapper (open, reads 0, without a cartridge)
- $2000-$3EFF: VRAM folded by the cartridge's current mirroring (horizontal without one);
  a mapper that claims nametable space answers first
- $3F00-$3FFF: palette, owned by the PPU. Reaching this view with a palette address is an
  address decode fault: it trips a debug assertion and reads 0 in release builds.
"#]

use crate::bus::VRAM_SIZE;
use crate::cartridge::{Cartridge, Mirroring};
use crate::ppu_bus::PpuBus;

pub struct PpuMemory<'a> {
    vram: &'a mut [u8; VRAM_SIZE],
    cartridge: Option<&'a mut Cartridge>,
}

impl<'a> PpuMemory<'a> {
    pub fn new(vram: &'a mut [u8; VRAM_SIZE], cartridge: Option<&'a mut Cartridge>) -> Self {
        Self { vram, cartridge }
    }

    fn mirroring(&self) -> Mirroring {
        self.cartridge
            .as_ref()
            .map_or(Mirroring::Horizontal, |c| c.mirroring())
    }
}

impl PpuBus for PpuMemory<'_> {
    fn ppu_read(&mut self, addr: u16) -> u8 {
        let a = addr & 0x3FFF;
        if let Some(v) = self.cartridge.as_mut().and_then(|c| c.ppu_read(a)) {
            return v;
        }
        match a {
            0x0000..=0x1FFF => 0,
            0x2000..=0x3EFF => self.vram[self.mirroring().vram_offset(a)],
            _ => {
                debug_assert!(false, "palette address {a:#06X} routed to PPU memory");
                0
            }
        }
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        let a = addr & 0x3FFF;
        if self.cartridge.as_mut().is_some_and(|c| c.ppu_write(a, value)) {
            return;
        }
        match a {
            0x0000..=0x1FFF => {}
            0x2000..=0x3EFF => {
                let offset = self.mirroring().vram_offset(a);
                self.vram[offset] = value;
            }
            _ => debug_assert!(false, "palette address {a:#06X} routed to PPU memory"),
        }
    }
}
