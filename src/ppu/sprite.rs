//! Sprite output units: the eight slots committed by the fetch phase shift out one pixel per
//! dot once their X counter has run down.

use crate::ppu::{Ppu, PpuMask};

/// Winning sprite pixel at a dot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct SpritePixel {
    pub(crate) color: u8,
    pub(crate) palette: u8,
    pub(crate) behind_background: bool,
    pub(crate) is_sprite_zero: bool,
}

impl Ppu {
    /// First opaque active sprite in slot order, honoring the sprite enable and left clip.
    pub(in crate::ppu) fn sprite_pixel(&self, x: u16) -> Option<SpritePixel> {
        if !self.mask.contains(PpuMask::SHOW_SPRITES)
            || (x < 8 && !self.mask.contains(PpuMask::SPRITES_LEFT))
        {
            return None;
        }
        self.slots[..self.slot_count as usize]
            .iter()
            .filter(|s| s.x_counter == 0)
            .find_map(|s| {
                let color = ((s.pattern_hi >> 7) << 1) | (s.pattern_lo >> 7);
                (color != 0).then_some(SpritePixel {
                    color,
                    palette: s.attr & 0x03,
                    behind_background: s.attr & 0x20 != 0,
                    is_sprite_zero: s.is_sprite_zero,
                })
            })
    }

    /// Advance every slot by one dot: count X down, or shift once active.
    pub(in crate::ppu) fn advance_sprites(&mut self) {
        for s in &mut self.slots[..self.slot_count as usize] {
            if s.x_counter > 0 {
                s.x_counter -= 1;
            } else {
                s.pattern_lo <<= 1;
                s.pattern_hi <<= 1;
            }
        }
    }
}
