#![doc = r#"
PPU background fetch pipeline

Cadence (visible and pre-render lines, rendering enabled), over dots 2..=257 and 321..=337:
- every dot: shift the four background shifters
- (dot-1) % 8 == 0: reload shifter low bytes from the latches, fetch nametable byte
- (dot-1) % 8 == 2: attribute byte, reduced to the 2-bit palette of the tile's quadrant
- (dot-1) % 8 == 4: pattern low plane
- (dot-1) % 8 == 6: pattern high plane
- (dot-1) % 8 == 7: coarse X increment

Plus: fine Y increment at 256, horizontal copy at 257, dummy nametable reads at 338/340,
vertical copy on pre-render dots 280..=304.
"#]

use crate::ppu::{PRE_RENDER_SCANLINE, Ppu, PpuCtrl, PpuMask};
use crate::ppu_bus::PpuBus;

impl Ppu {
    pub(in crate::ppu) fn background_dot<B: PpuBus>(&mut self, bus: &mut B) {
        let dot = self.dot;

        if (2..=257).contains(&dot) || (321..=337).contains(&dot) {
            self.shift_background();
            match (dot - 1) % 8 {
                0 => {
                    self.load_background_shifters();
                    self.bg_next_tile = bus.ppu_read(self.v.tile_addr());
                }
                2 => {
                    let mut attr = bus.ppu_read(self.v.attribute_addr());
                    if self.v.coarse_y() & 0x02 != 0 {
                        attr >>= 4;
                    }
                    if self.v.coarse_x() & 0x02 != 0 {
                        attr >>= 2;
                    }
                    self.bg_next_attr = attr & 0x03;
                }
                4 => self.bg_next_lo = bus.ppu_read(self.background_pattern_addr()),
                6 => self.bg_next_hi = bus.ppu_read(self.background_pattern_addr() + 8),
                7 => self.v.increment_x(),
                _ => {}
            }
        }

        if dot == 256 {
            self.v.increment_y();
        }
        if dot == 257 {
            self.load_background_shifters();
            self.v.copy_horizontal(self.t);
        }
        if dot == 338 || dot == 340 {
            self.bg_next_tile = bus.ppu_read(self.v.tile_addr());
        }
        if self.scanline == PRE_RENDER_SCANLINE && (280..=304).contains(&dot) {
            self.v.copy_vertical(self.t);
        }
    }

    #[inline]
    fn background_pattern_addr(&self) -> u16 {
        let table = if self.ctrl.contains(PpuCtrl::BACKGROUND_TABLE) {
            0x1000
        } else {
            0x0000
        };
        table + ((self.bg_next_tile as u16) << 4) + self.v.fine_y()
    }

    fn load_background_shifters(&mut self) {
        self.bg_pattern_lo = (self.bg_pattern_lo & 0xFF00) | self.bg_next_lo as u16;
        self.bg_pattern_hi = (self.bg_pattern_hi & 0xFF00) | self.bg_next_hi as u16;
        let lo = if self.bg_next_attr & 0x01 != 0 { 0xFF } else { 0x00 };
        let hi = if self.bg_next_attr & 0x02 != 0 { 0xFF } else { 0x00 };
        self.bg_attr_lo = (self.bg_attr_lo & 0xFF00) | lo;
        self.bg_attr_hi = (self.bg_attr_hi & 0xFF00) | hi;
    }

    #[inline]
    fn shift_background(&mut self) {
        if self.mask.contains(PpuMask::SHOW_BACKGROUND) {
            self.bg_pattern_lo <<= 1;
            self.bg_pattern_hi <<= 1;
            self.bg_attr_lo <<= 1;
            self.bg_attr_hi <<= 1;
        }
    }

    /// Background (color, palette) at the current dot, fine X applied.
    /// Returns (0, 0) when the layer is hidden or clipped at `x`.
    pub(in crate::ppu) fn background_pixel(&self, x: u16) -> (u8, u8) {
        if !self.mask.contains(PpuMask::SHOW_BACKGROUND)
            || (x < 8 && !self.mask.contains(PpuMask::BACKGROUND_LEFT))
        {
            return (0, 0);
        }
        let mux = 0x8000u16 >> self.fine_x;
        let bit = |reg: u16| u8::from(reg & mux != 0);
        let color = (bit(self.bg_pattern_hi) << 1) | bit(self.bg_pattern_lo);
        let palette = (bit(self.bg_attr_hi) << 1) | bit(self.bg_attr_lo);
        (color, palette)
    }
}

#[cfg(test)]
mod tests {
    use crate::ppu::Ppu;
    use crate::ppu_bus::mock::MockPpuBus;

    fn run_to(ppu: &mut Ppu, bus: &mut MockPpuBus, scanline: u16, dot: u16) {
        while !(ppu.scanline() == scanline && ppu.dot() == dot) {
            ppu.clock(bus);
        }
    }

    #[test]
    fn prerender_prefetches_two_tiles() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        bus.nametable[0] = 1;
        bus.nametable[1] = 2;
        bus.set_tile(0, 1, [0xF0; 8], [0x00; 8]);
        bus.set_tile(0, 2, [0x0F; 8], [0xFF; 8]);
        ppu._test_set_position(261, 0);
        ppu.cpu_write(0x2001, 0x0A, &mut bus);
        run_to(&mut ppu, &mut bus, 0, 1);

        assert_eq!(ppu.bg_pattern_lo, 0xF00F);
        assert_eq!(ppu.bg_pattern_hi, 0x00FF);
    }

    #[test]
    fn attribute_quadrant_selection() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        // Block 0: top-left = 1, top-right = 2, bottom-left = 3, bottom-right = 0
        bus.nametable[0x3C0] = 0b00_11_10_01;
        ppu._test_set_position(261, 0);
        ppu.cpu_write(0x2001, 0x0A, &mut bus);
        run_to(&mut ppu, &mut bus, 0, 1);
        assert_eq!(ppu.bg_attr_lo & 0xFF00, 0xFF00);
        assert_eq!(ppu.bg_attr_hi & 0xFF00, 0x0000);

        // Tile column 2 (loaded at dot 9) lands in the top-right quadrant.
        run_to(&mut ppu, &mut bus, 0, 10);
        assert_eq!(ppu.bg_attr_lo & 0x00FF, 0x0000);
        assert_eq!(ppu.bg_attr_hi & 0x00FF, 0x00FF);
    }

    #[test]
    fn horizontal_and_vertical_copies() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        ppu.cpu_write(0x2001, 0x08, &mut bus);
        // t: coarse X 3, coarse Y 4, fine Y 2
        ppu.cpu_write(0x2005, 3 << 3, &mut bus);
        ppu.cpu_write(0x2005, (4 << 3) | 2, &mut bus);
        ppu._test_set_position(261, 0);
        run_to(&mut ppu, &mut bus, 261, 305);
        assert_eq!(ppu.v.coarse_y(), 4);
        assert_eq!(ppu.v.fine_y(), 2);
        run_to(&mut ppu, &mut bus, 0, 258);
        // Dot 256 stepped Y, dot 257 restored X.
        assert_eq!(ppu.v.fine_y(), 3);
        assert_eq!(ppu.v.coarse_x(), 3);
    }
}
