#![doc = r#"
PPU registers module

Purpose
- CPU-visible register semantics for $2000-$2007 (mirrored every 8 bytes through $3FFF).

Notes
- Every access drives the PPU I/O latch. Write-only registers read back the latch, and
  $2002 fills its low five bits from it.
- $2002 read clears vblank and the write toggle; `peek` performs the same read without either.
- $2007 reads below $3F00 return the internal buffer and refill it. Palette reads return
  immediately and refill the buffer from the nametable byte underneath ($2Fxx).
- $2007 access during rendering bumps coarse X and fine Y instead of the 1/32 increment.
"#]

use crate::ppu::{Ppu, PpuCtrl, PpuStatus};
use crate::ppu_bus::PpuBus;

impl Ppu {
    /// CPU read from the register window.
    pub fn cpu_read<B: PpuBus>(&mut self, addr: u16, bus: &mut B) -> u8 {
        let value = match addr & 0x0007 {
            2 => {
                let v = self.status_byte();
                self.status.remove(PpuStatus::VBLANK);
                self.write_toggle = false;
                v
            }
            4 => self.oam[self.oam_addr as usize],
            7 => self.read_data(bus),
            _ => self.io_latch,
        };
        self.io_latch = value;
        value
    }

    /// CPU write to the register window.
    pub fn cpu_write<B: PpuBus>(&mut self, addr: u16, value: u8, bus: &mut B) {
        self.io_latch = value;
        match addr & 0x0007 {
            0 => {
                self.ctrl = PpuCtrl::from_bits_retain(value);
                self.t.set_nametable(value);
            }
            1 => self.mask = crate::ppu::PpuMask::from_bits_retain(value),
            2 => {}
            3 => self.oam_addr = value,
            4 => {
                self.oam[self.oam_addr as usize] = value;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            5 => {
                if !self.write_toggle {
                    self.fine_x = value & 0x07;
                    self.t.set_coarse_x(value >> 3);
                } else {
                    self.t.set_fine_y(value & 0x07);
                    self.t.set_coarse_y(value >> 3);
                }
                self.write_toggle = !self.write_toggle;
            }
            6 => {
                if !self.write_toggle {
                    let t = (self.t.get() & 0x00FF) | ((value as u16 & 0x3F) << 8);
                    self.t.set(t);
                } else {
                    let t = (self.t.get() & 0xFF00) | value as u16;
                    self.t.set(t);
                    self.v = self.t;
                }
                self.write_toggle = !self.write_toggle;
            }
            _ => {
                let target = self.v.get() & 0x3FFF;
                if target >= 0x3F00 {
                    self.write_palette(target, value);
                } else {
                    bus.ppu_write(target, value);
                }
                self.increment_after_data_access();
            }
        }
    }

    /// Side-effect-free register read for debuggers and trace rendering.
    pub fn peek(&self, addr: u16) -> u8 {
        match addr & 0x0007 {
            2 => self.status_byte(),
            4 => self.oam[self.oam_addr as usize],
            7 => {
                let target = self.v.get() & 0x3FFF;
                if target >= 0x3F00 {
                    self.read_palette(target)
                } else {
                    self.read_buffer
                }
            }
            _ => self.io_latch,
        }
    }

    #[inline]
    fn status_byte(&self) -> u8 {
        (self.status.bits() & 0xE0) | (self.io_latch & 0x1F)
    }

    fn read_data<B: PpuBus>(&mut self, bus: &mut B) -> u8 {
        let target = self.v.get() & 0x3FFF;
        let out = if target >= 0x3F00 {
            self.read_buffer = bus.ppu_read(target - 0x1000);
            self.read_palette(target)
        } else {
            let buffered = self.read_buffer;
            self.read_buffer = bus.ppu_read(target);
            buffered
        };
        self.increment_after_data_access();
        out
    }

    fn increment_after_data_access(&mut self) {
        if self.rendering_enabled() && self.on_render_line() {
            self.v.increment_x();
            self.v.increment_y();
        } else {
            let step = if self.ctrl.contains(PpuCtrl::INCREMENT_32) {
                32
            } else {
                1
            };
            let next = self.v.get().wrapping_add(step);
            self.v.set(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ppu::Ppu;
    use crate::ppu_bus::mock::MockPpuBus;
    use quickcheck::quickcheck;

    fn set_addr(ppu: &mut Ppu, bus: &mut MockPpuBus, addr: u16) {
        ppu.cpu_write(0x2006, (addr >> 8) as u8, bus);
        ppu.cpu_write(0x2006, addr as u8, bus);
    }

    #[test]
    fn palette_write_to_3f10_reads_back_at_3f00() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        set_addr(&mut ppu, &mut bus, 0x3F10);
        ppu.cpu_write(0x2007, 0x11, &mut bus);
        set_addr(&mut ppu, &mut bus, 0x3F00);
        assert_eq!(ppu.cpu_read(0x2007, &mut bus), 0x11);
    }

    #[test]
    fn status_read_clears_vblank_and_toggle() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        ppu.status.insert(crate::ppu::PpuStatus::VBLANK);
        ppu.cpu_write(0x2005, 0x10, &mut bus);
        assert!(ppu.write_toggle());

        assert_eq!(ppu.peek(0x2002) & 0x80, 0x80);
        assert!(ppu.write_toggle());

        let first = ppu.cpu_read(0x2002, &mut bus);
        assert_eq!(first & 0x80, 0x80);
        assert!(!ppu.write_toggle());
        assert_eq!(ppu.cpu_read(0x2002, &mut bus) & 0x80, 0);
    }

    #[test]
    fn status_low_bits_come_from_io_latch() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        ppu.cpu_write(0x2001, 0x1F, &mut bus);
        assert_eq!(ppu.cpu_read(0x2002, &mut bus), 0x1F);
        // Write-only registers echo the latch.
        ppu.cpu_write(0x2003, 0xA5, &mut bus);
        assert_eq!(ppu.cpu_read(0x2005, &mut bus), 0xA5);
    }

    #[test]
    fn data_reads_are_buffered() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        bus.nametable[0x000] = 0xAB;
        bus.nametable[0x001] = 0xCD;
        set_addr(&mut ppu, &mut bus, 0x2000);
        let _stale = ppu.cpu_read(0x2007, &mut bus);
        assert_eq!(ppu.cpu_read(0x2007, &mut bus), 0xAB);
        assert_eq!(ppu.cpu_read(0x2007, &mut bus), 0xCD);
    }

    #[test]
    fn palette_read_refills_buffer_from_nametable_below() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        bus.nametable[0xF05] = 0x77;
        set_addr(&mut ppu, &mut bus, 0x3F05);
        ppu.cpu_read(0x2007, &mut bus);
        set_addr(&mut ppu, &mut bus, 0x2400);
        assert_eq!(ppu.cpu_read(0x2007, &mut bus), 0x77);
    }

    #[test]
    fn increment_32_mode() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        ppu.cpu_write(0x2000, 0x04, &mut bus);
        set_addr(&mut ppu, &mut bus, 0x2000);
        ppu.cpu_write(0x2007, 1, &mut bus);
        ppu.cpu_write(0x2007, 2, &mut bus);
        assert_eq!(ppu.vram_addr(), 0x2040);
        assert_eq!(bus.nametable[0x020], 2);
    }

    #[test]
    fn scroll_then_addr_matches_direct_addr() {
        let mut a = Ppu::new();
        let mut b = Ppu::new();
        let mut bus = MockPpuBus::new();

        a.cpu_write(0x2005, 0x7D, &mut bus);
        a.cpu_write(0x2005, 0x5E, &mut bus);
        a.cpu_write(0x2006, 0x23, &mut bus);
        a.cpu_write(0x2006, 0x45, &mut bus);

        b.cpu_write(0x2006, 0x23, &mut bus);
        b.cpu_write(0x2006, 0x45, &mut bus);

        assert_eq!(a.vram_addr(), b.vram_addr());
        assert_eq!(a.vram_addr(), 0x2345);
        assert_eq!(a.fine_x(), 0x7D & 7);
    }

    #[test]
    fn ctrl_write_sets_nametable_bits_of_t() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        ppu.cpu_write(0x2000, 0x03, &mut bus);
        assert_eq!(ppu.temp_addr() & 0x0C00, 0x0C00);
    }

    #[test]
    fn enabling_nmi_inside_vblank_raises_line() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        ppu.status.insert(crate::ppu::PpuStatus::VBLANK);
        assert!(!ppu.nmi_line());
        ppu.cpu_write(0x2000, 0x80, &mut bus);
        assert!(ppu.nmi_line());
        ppu.cpu_read(0x2002, &mut bus);
        assert!(!ppu.nmi_line());
    }

    #[test]
    fn oam_data_write_advances_address_read_does_not() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        ppu.cpu_write(0x2003, 0xFE, &mut bus);
        ppu.cpu_write(0x2004, 0x11, &mut bus);
        ppu.cpu_write(0x2004, 0x22, &mut bus);
        ppu.cpu_write(0x2004, 0x33, &mut bus);
        assert_eq!(ppu.oam()[0xFE], 0x11);
        assert_eq!(ppu.oam()[0xFF], 0x22);
        assert_eq!(ppu.oam()[0x00], 0x33);
        ppu.cpu_write(0x2003, 0xFF, &mut bus);
        assert_eq!(ppu.cpu_read(0x2004, &mut bus), 0x22);
        assert_eq!(ppu.cpu_read(0x2004, &mut bus), 0x22);
    }

    #[test]
    fn registers_mirror_every_eight_bytes() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        ppu.cpu_write(0x3FFE, 0x21, &mut bus);
        ppu.cpu_write(0x200E, 0x08, &mut bus);
        assert_eq!(ppu.vram_addr(), 0x2108);
    }

    quickcheck! {
        fn sequential_reads_advance_by_one(start: u16, n: u8) -> bool {
            let mut ppu = Ppu::new();
            let mut bus = MockPpuBus::new();
            let start = 0x2000 | (start & 0x0EFF);
            set_addr(&mut ppu, &mut bus, start);
            for _ in 0..n {
                ppu.cpu_read(0x2007, &mut bus);
            }
            ppu.vram_addr() == start + n as u16
        }

        fn palette_alias_reads_match(entry: u8, value: u8) -> bool {
            let mut ppu = Ppu::new();
            let mut bus = MockPpuBus::new();
            let alias = 0x3F10 + ((entry as u16 & 0x03) << 2);
            set_addr(&mut ppu, &mut bus, alias);
            ppu.cpu_write(0x2007, value, &mut bus);
            set_addr(&mut ppu, &mut bus, alias - 0x10);
            ppu.cpu_read(0x2007, &mut bus) == value & 0x3F
        }
    }
}
