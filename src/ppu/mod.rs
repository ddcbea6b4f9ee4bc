/*!
PPU (2C02) dot-driven core.

One `clock` call advances exactly one dot. The frame is 262 scanlines x 341 dots:
- 0..=239   visible: background pipeline, sprite evaluation/fetch, pixel output
- 240       post-render idle
- 241..=260 vertical blank (flag and NMI line raised at 241,1; buffers swap there)
- 261       pre-render: clears status flags at dot 1, reloads vertical scroll on 280..=304,
            prefetches the first two tiles of line 0

With rendering enabled, odd frames skip dot 0 of scanline 0.

STRUCTURE:
- `registers.rs`: CPU-visible $2000-$2007 semantics (write toggle, $2007 buffering, open bus)
- `loopy.rs`:     packed v/t scroll address helpers
- `fetch.rs`:     background fetch/shift pipeline
- `oam_eval.rs`:  secondary OAM clear, evaluation and sprite pattern fetch
- `sprite.rs`:    per-slot sprite shifters and sprite pixel selection
- `renderer.rs`:  per-dot sequencing, pixel multiplexer, position advance
- `memory.rs`:    palette RAM access, OAM DMA sink, debug peeks
- `palette.rs`:   color table and palette index folding

Pattern and nametable fetches go through `PpuBus`; palette RAM and OAM live here.
*/

use bitflags::bitflags;

use crate::ppu::loopy::VramAddr;
use crate::ppu::palette::ColorTable;

/// Screen width in pixels.
pub const NES_WIDTH: usize = 256;
/// Screen height in pixels.
pub const NES_HEIGHT: usize = 240;
/// RGBA bytes per pixel.
pub const BYTES_PER_PIXEL: usize = 4;

pub const DOTS_PER_SCANLINE: u16 = 341;
pub const SCANLINES_PER_FRAME: u16 = 262;
pub(crate) const VISIBLE_SCANLINES: u16 = 240;
pub(crate) const VBLANK_SCANLINE: u16 = 241;
pub(crate) const PRE_RENDER_SCANLINE: u16 = 261;

pub(crate) mod fetch;
pub mod loopy;
pub(crate) mod memory;
pub(crate) mod oam_eval;
pub mod palette;
pub(crate) mod registers;
pub(crate) mod renderer;
pub(crate) mod sprite;

bitflags! {
    /// $2000 PPUCTRL.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct PpuCtrl: u8 {
        const NAMETABLE_X = 1 << 0;
        const NAMETABLE_Y = 1 << 1;
        const INCREMENT_32 = 1 << 2;
        const SPRITE_TABLE = 1 << 3;
        const BACKGROUND_TABLE = 1 << 4;
        const SPRITE_16 = 1 << 5;
        const MASTER_SLAVE = 1 << 6;
        const NMI_ENABLE = 1 << 7;
    }
}

bitflags! {
    /// $2001 PPUMASK.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct PpuMask: u8 {
        const GREYSCALE = 1 << 0;
        const BACKGROUND_LEFT = 1 << 1;
        const SPRITES_LEFT = 1 << 2;
        const SHOW_BACKGROUND = 1 << 3;
        const SHOW_SPRITES = 1 << 4;
        const EMPHASIZE_RED = 1 << 5;
        const EMPHASIZE_GREEN = 1 << 6;
        const EMPHASIZE_BLUE = 1 << 7;
    }
}

bitflags! {
    /// $2002 PPUSTATUS (top three bits; the rest is I/O latch).
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct PpuStatus: u8 {
        const SPRITE_OVERFLOW = 1 << 5;
        const SPRITE_ZERO_HIT = 1 << 6;
        const VBLANK = 1 << 7;
    }
}

/// One of the eight sprites selected for the current scanline.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct SpriteSlot {
    pub(crate) pattern_lo: u8,
    pub(crate) pattern_hi: u8,
    pub(crate) attr: u8,
    /// Dots left before the sprite starts shifting out.
    pub(crate) x_counter: u8,
    pub(crate) is_sprite_zero: bool,
}

pub struct Ppu {
    ctrl: PpuCtrl,
    mask: PpuMask,
    status: PpuStatus,
    oam_addr: u8,

    // Loopy registers
    v: VramAddr,
    t: VramAddr,
    fine_x: u8,
    write_toggle: bool,

    read_buffer: u8,
    // Last value driven on the CPU<->PPU data lines.
    io_latch: u8,

    // Background latches filled by the 8-dot fetch cadence
    bg_next_tile: u8,
    bg_next_attr: u8,
    bg_next_lo: u8,
    bg_next_hi: u8,
    // Background shifters (high byte = current tile)
    bg_pattern_lo: u16,
    bg_pattern_hi: u16,
    bg_attr_lo: u16,
    bg_attr_hi: u16,

    // Sprites
    oam: [u8; 256],
    secondary_oam: [u8; 32],
    eval_index: u8,
    eval_count: u8,
    sprite_zero_in_eval: bool,
    fetch_latch: [u8; 4],
    slots: [SpriteSlot; 8],
    slot_count: u8,

    palette: [u8; 32],
    colors: Box<ColorTable>,

    // Timing
    scanline: u16,
    dot: u16,
    frame: u64,
    frame_ready: bool,

    back: Vec<u8>,
    front: Vec<u8>,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        let fb_len = NES_WIDTH * NES_HEIGHT * BYTES_PER_PIXEL;
        Self {
            ctrl: PpuCtrl::empty(),
            mask: PpuMask::empty(),
            status: PpuStatus::empty(),
            oam_addr: 0,
            v: VramAddr::default(),
            t: VramAddr::default(),
            fine_x: 0,
            write_toggle: false,
            read_buffer: 0,
            io_latch: 0,
            bg_next_tile: 0,
            bg_next_attr: 0,
            bg_next_lo: 0,
            bg_next_hi: 0,
            bg_pattern_lo: 0,
            bg_pattern_hi: 0,
            bg_attr_lo: 0,
            bg_attr_hi: 0,
            oam: [0; 256],
            secondary_oam: [0xFF; 32],
            eval_index: 0,
            eval_count: 0,
            sprite_zero_in_eval: false,
            fetch_latch: [0xFF; 4],
            slots: [SpriteSlot::default(); 8],
            slot_count: 0,
            palette: [0; 32],
            colors: palette::build_color_table(),
            scanline: 0,
            dot: 0,
            frame: 0,
            frame_ready: false,
            back: vec![0; fb_len],
            front: vec![0; fb_len],
        }
    }

    /// Power/reset: registers, pipelines and position return to their initial state.
    /// OAM and palette RAM keep their contents.
    pub fn reset(&mut self) {
        self.ctrl = PpuCtrl::empty();
        self.mask = PpuMask::empty();
        self.status = PpuStatus::empty();
        self.oam_addr = 0;
        self.v = VramAddr::default();
        self.t = VramAddr::default();
        self.fine_x = 0;
        self.write_toggle = false;
        self.read_buffer = 0;
        self.io_latch = 0;
        self.bg_next_tile = 0;
        self.bg_next_attr = 0;
        self.bg_next_lo = 0;
        self.bg_next_hi = 0;
        self.bg_pattern_lo = 0;
        self.bg_pattern_hi = 0;
        self.bg_attr_lo = 0;
        self.bg_attr_hi = 0;
        self.secondary_oam = [0xFF; 32];
        self.eval_index = 0;
        self.eval_count = 0;
        self.sprite_zero_in_eval = false;
        self.fetch_latch = [0xFF; 4];
        self.slots = [SpriteSlot::default(); 8];
        self.slot_count = 0;
        self.scanline = 0;
        self.dot = 0;
        self.frame = 0;
        self.frame_ready = false;
        self.back.fill(0);
        self.front.fill(0);
    }

    // ---------------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------------

    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    pub fn dot(&self) -> u16 {
        self.dot
    }

    /// Frames started since reset.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn ctrl(&self) -> PpuCtrl {
        self.ctrl
    }

    pub fn mask(&self) -> PpuMask {
        self.mask
    }

    pub fn status(&self) -> PpuStatus {
        self.status
    }

    pub fn vram_addr(&self) -> u16 {
        self.v.get()
    }

    pub fn temp_addr(&self) -> u16 {
        self.t.get()
    }

    pub fn fine_x(&self) -> u8 {
        self.fine_x
    }

    pub fn write_toggle(&self) -> bool {
        self.write_toggle
    }

    pub fn oam(&self) -> &[u8; 256] {
        &self.oam
    }

    /// Level of the PPU's /NMI output: vblank flag AND'ed with PPUCTRL bit 7.
    pub fn nmi_line(&self) -> bool {
        self.status.contains(PpuStatus::VBLANK) && self.ctrl.contains(PpuCtrl::NMI_ENABLE)
    }

    #[inline]
    pub fn rendering_enabled(&self) -> bool {
        self.mask
            .intersects(PpuMask::SHOW_BACKGROUND | PpuMask::SHOW_SPRITES)
    }

    /// The most recently completed frame (256x240 RGBA).
    pub fn active_frame(&self) -> &[u8] {
        &self.front
    }

    /// True once per vblank entry; clears on read.
    pub fn take_frame_ready(&mut self) -> bool {
        std::mem::take(&mut self.frame_ready)
    }

    #[inline]
    fn sprite_height(&self) -> u16 {
        if self.ctrl.contains(PpuCtrl::SPRITE_16) {
            16
        } else {
            8
        }
    }

    #[inline]
    fn on_render_line(&self) -> bool {
        self.scanline < VISIBLE_SCANLINES || self.scanline == PRE_RENDER_SCANLINE
    }

    // ---------------------------------------------------------------------
    // Test helpers
    // ---------------------------------------------------------------------

    #[cfg(test)]
    pub(crate) fn _test_set_position(&mut self, scanline: u16, dot: u16) {
        self.scanline = scanline;
        self.dot = dot;
    }

    #[cfg(test)]
    pub(crate) fn _test_oam_mut(&mut self) -> &mut [u8; 256] {
        &mut self.oam
    }

    #[cfg(test)]
    pub(crate) fn _test_back_buffer(&self) -> &[u8] {
        &self.back
    }
}
