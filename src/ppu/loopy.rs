//! Packed 15-bit scroll/VRAM address (`v` and `t`).
//!
//! Layout: `yyy NN YYYYY XXXXX` = fine Y, nametable select, coarse Y, coarse X.

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct VramAddr(u16);

impl VramAddr {
    const COARSE_X: u16 = 0x001F;
    const COARSE_Y: u16 = 0x03E0;
    const NAMETABLE_X: u16 = 0x0400;
    const NAMETABLE_Y: u16 = 0x0800;
    const FINE_Y: u16 = 0x7000;
    const HORIZONTAL: u16 = Self::COARSE_X | Self::NAMETABLE_X;
    const VERTICAL: u16 = Self::COARSE_Y | Self::NAMETABLE_Y | Self::FINE_Y;

    pub fn new(raw: u16) -> Self {
        Self(raw & 0x7FFF)
    }

    #[inline]
    pub fn get(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn set(&mut self, raw: u16) {
        self.0 = raw & 0x7FFF;
    }

    #[inline]
    pub fn coarse_x(self) -> u16 {
        self.0 & Self::COARSE_X
    }

    #[inline]
    pub fn coarse_y(self) -> u16 {
        (self.0 & Self::COARSE_Y) >> 5
    }

    #[inline]
    pub fn fine_y(self) -> u16 {
        (self.0 & Self::FINE_Y) >> 12
    }

    pub fn set_coarse_x(&mut self, value: u8) {
        self.0 = (self.0 & !Self::COARSE_X) | (value as u16 & 0x1F);
    }

    pub fn set_coarse_y(&mut self, value: u8) {
        self.0 = (self.0 & !Self::COARSE_Y) | ((value as u16 & 0x1F) << 5);
    }

    pub fn set_fine_y(&mut self, value: u8) {
        self.0 = (self.0 & !Self::FINE_Y) | ((value as u16 & 0x07) << 12);
    }

    /// Nametable select bits (0..=3) as written through $2000.
    pub fn set_nametable(&mut self, value: u8) {
        self.0 = (self.0 & !(Self::NAMETABLE_X | Self::NAMETABLE_Y)) | ((value as u16 & 0x03) << 10);
    }

    /// Nametable byte address for the tile under `v`.
    #[inline]
    pub fn tile_addr(self) -> u16 {
        0x2000 | (self.0 & 0x0FFF)
    }

    /// Attribute byte address for the 4x4-tile block under `v`.
    #[inline]
    pub fn attribute_addr(self) -> u16 {
        0x23C0 | (self.0 & 0x0C00) | ((self.0 >> 4) & 0x38) | ((self.0 >> 2) & 0x07)
    }

    /// Step one tile right, flipping the horizontal nametable on wrap.
    pub fn increment_x(&mut self) {
        if self.coarse_x() == 31 {
            self.0 &= !Self::COARSE_X;
            self.0 ^= Self::NAMETABLE_X;
        } else {
            self.0 += 1;
        }
    }

    /// Step one pixel row down. Coarse Y 29 wraps and flips the vertical nametable;
    /// 31 (attribute rows used as tiles) wraps without the flip.
    pub fn increment_y(&mut self) {
        if self.fine_y() < 7 {
            self.0 += 0x1000;
            return;
        }
        self.0 &= !Self::FINE_Y;
        match self.coarse_y() {
            29 => {
                self.set_coarse_y(0);
                self.0 ^= Self::NAMETABLE_Y;
            }
            31 => self.set_coarse_y(0),
            y => self.set_coarse_y(y as u8 + 1),
        }
    }

    pub fn copy_horizontal(&mut self, from: VramAddr) {
        self.0 = (self.0 & !Self::HORIZONTAL) | (from.0 & Self::HORIZONTAL);
    }

    pub fn copy_vertical(&mut self, from: VramAddr) {
        self.0 = (self.0 & !Self::VERTICAL) | (from.0 & Self::VERTICAL);
    }
}
