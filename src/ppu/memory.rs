#![doc = r#"
PPU memory helpers

Responsibilities
- Palette RAM read/write with the backdrop aliases folded in (`palette::palette_index`).
- OAM DMA sink: the bus streams 256 bytes through `oam_dma_write`, honoring OAMADDR.
- Debug access to palette RAM without touching registers.
"#]

use crate::ppu::Ppu;
use crate::ppu::palette::palette_index;

impl Ppu {
    #[inline]
    pub(in crate::ppu) fn read_palette(&self, addr: u16) -> u8 {
        self.palette[palette_index(addr)]
    }

    #[inline]
    pub(in crate::ppu) fn write_palette(&mut self, addr: u16, value: u8) {
        self.palette[palette_index(addr)] = value & 0x3F;
    }

    /// One byte of an OAM DMA transfer; lands at OAMADDR which then advances.
    pub fn oam_dma_write(&mut self, value: u8) {
        self.oam[self.oam_addr as usize] = value;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    /// Palette RAM byte for any address in $3F00-$3FFF.
    pub fn peek_palette(&self, addr: u16) -> u8 {
        self.read_palette(addr)
    }
}

#[cfg(test)]
mod tests {
    use crate::ppu::Ppu;

    #[test]
    fn dma_starts_at_oam_addr_and_wraps() {
        let mut ppu = Ppu::new();
        ppu.oam_addr = 0xFE;
        for b in 0..4u8 {
            ppu.oam_dma_write(b + 1);
        }
        assert_eq!(ppu.oam()[0xFE], 1);
        assert_eq!(ppu.oam()[0xFF], 2);
        assert_eq!(ppu.oam()[0x00], 3);
        assert_eq!(ppu.oam()[0x01], 4);
    }

    #[test]
    fn palette_values_are_six_bits() {
        let mut ppu = Ppu::new();
        ppu.write_palette(0x3F01, 0xFF);
        assert_eq!(ppu.peek_palette(0x3F21), 0x3F);
        ppu.write_palette(0x3F00, 0x0F);
        assert_eq!(ppu.peek_palette(0x3F10), 0x0F);
    }
}
