#![doc = r#"
PPU renderer: per-dot sequencing and the pixel multiplexer.

`clock` order within a dot:
1. pre-render dot 1 clears vblank / sprite-0 hit / overflow
2. with rendering enabled on render lines: background fetch, sprite clear/evaluate,
   sprite fetch (257..=320)
3. visible dots 1..=256: compose and store one pixel, then advance sprite units
4. 241,1: set vblank, swap framebuffers
5. advance (scanline, dot), including the odd-frame skip
"#]

use crate::ppu::sprite::SpritePixel;
use crate::ppu::{
    DOTS_PER_SCANLINE, NES_WIDTH, PRE_RENDER_SCANLINE, Ppu, PpuMask, PpuStatus, VBLANK_SCANLINE,
    VISIBLE_SCANLINES,
};
use crate::ppu_bus::PpuBus;

impl Ppu {
    /// Advance the PPU by exactly one dot.
    pub fn clock<B: PpuBus>(&mut self, bus: &mut B) {
        let rendering = self.rendering_enabled();

        if self.scanline == PRE_RENDER_SCANLINE && self.dot == 1 {
            self.status.remove(
                PpuStatus::VBLANK | PpuStatus::SPRITE_ZERO_HIT | PpuStatus::SPRITE_OVERFLOW,
            );
        }

        if rendering && self.on_render_line() {
            self.background_dot(bus);
            self.sprite_evaluation_dot();
            if (257..=320).contains(&self.dot) {
                self.sprite_fetch_dot(bus);
            }
        }

        if self.scanline < VISIBLE_SCANLINES && (1..=256).contains(&self.dot) {
            self.output_pixel();
        }

        if self.scanline == VBLANK_SCANLINE && self.dot == 1 {
            self.status.insert(PpuStatus::VBLANK);
            std::mem::swap(&mut self.back, &mut self.front);
            self.frame_ready = true;
        }

        self.advance_position(rendering);
    }

    fn advance_position(&mut self, rendering: bool) {
        self.dot += 1;
        if self.dot < DOTS_PER_SCANLINE {
            return;
        }
        self.dot = 0;
        self.scanline += 1;
        if self.scanline > PRE_RENDER_SCANLINE {
            self.scanline = 0;
            self.frame += 1;
            if rendering && self.frame % 2 == 1 {
                self.dot = 1;
            }
        }
    }

    fn output_pixel(&mut self) {
        let x = self.dot - 1;
        let (bg_color, bg_palette) = self.background_pixel(x);
        let sprite = self.sprite_pixel(x);

        if let Some(s) = sprite {
            self.check_sprite_zero_hit(&s, bg_color, x);
        }

        let palette_addr = match sprite {
            Some(s) if bg_color == 0 || !s.behind_background => {
                0x3F10 | ((s.palette as u16) << 2) | s.color as u16
            }
            _ if bg_color != 0 => 0x3F00 | ((bg_palette as u16) << 2) | bg_color as u16,
            _ => 0x3F00,
        };

        let mut color = self.read_palette(palette_addr);
        if self.mask.contains(PpuMask::GREYSCALE) {
            color &= 0x30;
        }
        let emphasis = (self.mask.bits() >> 5) as usize;
        let rgba = self.colors[emphasis * 64 + color as usize];
        let offset = (self.scanline as usize * NES_WIDTH + x as usize) * 4;
        self.back[offset..offset + 4].copy_from_slice(&rgba);

        if self.rendering_enabled() {
            self.advance_sprites();
        }
    }

    fn check_sprite_zero_hit(&mut self, s: &SpritePixel, bg_color: u8, x: u16) {
        let both_layers =
            self.mask.contains(PpuMask::SHOW_BACKGROUND | PpuMask::SHOW_SPRITES);
        if s.is_sprite_zero
            && bg_color != 0
            && both_layers
            && x != 255
            && !self.status.contains(PpuStatus::SPRITE_ZERO_HIT)
        {
            self.status.insert(PpuStatus::SPRITE_ZERO_HIT);
        }
    }
}
