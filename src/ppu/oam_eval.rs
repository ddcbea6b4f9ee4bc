#![doc = r#"
PPU OAM evaluation submodule

Responsibilities
- CLEAR    (dots 1..=64): fill secondary OAM with $FF, one byte every other dot.
- EVALUATE (dots 65..=256, visible lines): one primary OAM entry per odd dot. Up to eight
  entries whose Y places them on the next line are copied to secondary OAM; a ninth sets
  sprite overflow.
- FETCH    (dots 257..=320): for each of the eight slots, latch Y/tile/attr/X and read both
  pattern planes, then commit the slot for the next line. OAMADDR is held at 0.

Notes
- A sprite at OAM Y is drawn starting on line Y+1, so "in range" is evaluated against the
  current line: 0 <= scanline - Y < height.
- Empty slots still fetch tile $FF so pattern-table A12 activity matches hardware.
- The pre-render line clears secondary OAM but evaluates nothing; line 0 has no sprites.
"#]

use crate::ppu::{PRE_RENDER_SCANLINE, Ppu, PpuCtrl, PpuStatus, SpriteSlot};
use crate::ppu_bus::PpuBus;

impl Ppu {
    pub(in crate::ppu) fn sprite_evaluation_dot(&mut self) {
        match self.dot {
            1..=64 => {
                if self.dot == 1 {
                    self.eval_index = 0;
                    self.eval_count = 0;
                    self.sprite_zero_in_eval = false;
                }
                if self.dot % 2 == 0 {
                    self.secondary_oam[(self.dot / 2 - 1) as usize] = 0xFF;
                }
            }
            65..=256 if self.scanline != PRE_RENDER_SCANLINE => {
                if self.dot % 2 == 1 && self.eval_index < 64 {
                    self.evaluate_entry(self.eval_index as usize);
                    self.eval_index += 1;
                }
            }
            _ => {}
        }
    }

    fn evaluate_entry(&mut self, n: usize) {
        let y = self.oam[n * 4] as i32;
        let row = self.scanline as i32 - y;
        if row < 0 || row >= self.sprite_height() as i32 {
            return;
        }
        if self.eval_count < 8 {
            let dst = self.eval_count as usize * 4;
            self.secondary_oam[dst..dst + 4].copy_from_slice(&self.oam[n * 4..n * 4 + 4]);
            if n == 0 {
                self.sprite_zero_in_eval = true;
            }
            self.eval_count += 1;
        } else {
            self.status.insert(PpuStatus::SPRITE_OVERFLOW);
        }
    }

    pub(in crate::ppu) fn sprite_fetch_dot<B: PpuBus>(&mut self, bus: &mut B) {
        let offset = self.dot - 257;
        let slot = (offset / 8) as usize;
        self.oam_addr = 0;
        match offset % 8 {
            0 => {
                self.fetch_latch
                    .copy_from_slice(&self.secondary_oam[slot * 4..slot * 4 + 4]);
                if slot == 0 {
                    self.slot_count = self.eval_count;
                }
            }
            4 => {
                let addr = self.sprite_pattern_addr(slot);
                self.slots[slot].pattern_lo = self.sprite_plane(bus.ppu_read(addr), slot);
            }
            6 => {
                let addr = self.sprite_pattern_addr(slot) + 8;
                self.slots[slot].pattern_hi = self.sprite_plane(bus.ppu_read(addr), slot);
            }
            7 => {
                let attr = self.fetch_latch[2];
                let x = self.fetch_latch[3];
                let s = &mut self.slots[slot];
                s.attr = attr;
                s.x_counter = x;
                s.is_sprite_zero = slot == 0 && self.sprite_zero_in_eval;
            }
            _ => {}
        }
    }

    /// Pattern row address for the sprite latched in `slot` (tile $FF row 0 for empty slots).
    fn sprite_pattern_addr(&self, slot: usize) -> u16 {
        let [y, tile, attr, _] = self.fetch_latch;
        let empty = slot >= self.eval_count as usize;
        let flip_v = attr & 0x80 != 0;
        let row = if empty {
            0
        } else {
            self.scanline.wrapping_sub(y as u16) & 0x0F
        };

        if self.ctrl.contains(PpuCtrl::SPRITE_16) {
            let table = if tile & 0x01 != 0 { 0x1000 } else { 0x0000 };
            let row = if flip_v && !empty { 15 - row } else { row };
            let tile = (tile & 0xFE) as u16 + (row >> 3);
            table + (tile << 4) + (row & 0x07)
        } else {
            let table = if self.ctrl.contains(PpuCtrl::SPRITE_TABLE) {
                0x1000
            } else {
                0x0000
            };
            let row = row & 0x07;
            let row = if flip_v && !empty { 7 - row } else { row };
            table + ((tile as u16) << 4) + row
        }
    }

    /// Empty slots load transparent; horizontal flip is applied at load time.
    #[inline]
    fn sprite_plane(&self, data: u8, slot: usize) -> u8 {
        if slot >= self.eval_count as usize {
            0
        } else if self.fetch_latch[2] & 0x40 != 0 {
            data.reverse_bits()
        } else {
            data
        }
    }

    #[cfg(test)]
    pub(crate) fn _test_slots(&self) -> (&[SpriteSlot; 8], u8) {
        (&self.slots, self.slot_count)
    }
}
