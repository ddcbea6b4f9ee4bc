/*!
Nes: the owning root and master-clock driver.

One master tick is one PPU dot. Per tick:
1. the cartridge mapper is clocked (A12-driven IRQ counters),
2. the PPU advances one dot,
3. on every third tick the APU advances one CPU cycle, the CPU runs one cycle, and the APU
   latches its mixer output.

Emulated time accumulates by the master period after every tick; whenever it passes the
audio sample period a sample is ready and `tick` returns `true`.

Outputs:
- `active_frame`: 256x240 RGBA, swapped in at the start of vertical blank
- `read_samples`: signed 16-bit little-endian stereo frames (the mono mix duplicated)
*/

use std::path::Path;

use tracing::debug;

use crate::bus::Bus;
use crate::cartridge::{Cartridge, LoadError};
use crate::cpu::{Cpu, TraceLine};

/// NTSC master rate, in PPU dots per second.
pub const NTSC_MASTER_CLOCK_HZ: f64 = 5_369_318.0;
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
/// Bytes per audio frame handed out by `read_samples` (two 16-bit channels).
pub const BYTES_PER_AUDIO_FRAME: usize = 4;

/// Longest possible frame in master ticks, plus slack for a partially elapsed one.
const MAX_FRAME_TICKS: u64 = 341 * 262 * 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NesConfig {
    /// Host audio sample rate in Hz.
    pub sample_rate: u32,
    /// Master clock rate in Hz.
    pub master_clock_hz: f64,
}

impl Default for NesConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            master_clock_hz: NTSC_MASTER_CLOCK_HZ,
        }
    }
}

/// Tick counter and the emulated-time accumulator that paces audio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasterState {
    pub ticks: u64,
    pub time: f64,
    pub master_period: f64,
    pub sample_period: f64,
}

impl MasterState {
    fn new(config: &NesConfig) -> Self {
        Self {
            ticks: 0,
            time: 0.0,
            master_period: 1.0 / config.master_clock_hz,
            sample_period: 1.0 / config.sample_rate.max(1) as f64,
        }
    }

    fn clear(&mut self) {
        self.ticks = 0;
        self.time = 0.0;
    }
}

#[cfg(feature = "screenshot")]
#[derive(Debug, thiserror::Error)]
pub enum ScreenshotError {
    #[error("framebuffer does not hold a {width}x{height} RGBA image")]
    BadFrame { width: u32, height: u32 },
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub struct Nes {
    cpu: Cpu,
    bus: Bus,
    master: MasterState,
    config: NesConfig,
}

impl Default for Nes {
    fn default() -> Self {
        Self::new()
    }
}

impl Nes {
    /// A console with no cartridge inserted.
    pub fn new() -> Self {
        Self::with_config(NesConfig::default())
    }

    pub fn with_config(config: NesConfig) -> Self {
        Self {
            cpu: Cpu::new(),
            bus: Bus::new(),
            master: MasterState::new(&config),
            config,
        }
    }

    pub fn from_cartridge(cartridge: Cartridge) -> Self {
        let mut nes = Self::new();
        nes.insert_cartridge(cartridge);
        nes
    }

    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, LoadError> {
        Ok(Self::from_cartridge(Cartridge::from_ines_bytes(data)?))
    }

    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        Ok(Self::from_cartridge(Cartridge::from_ines_file(path)?))
    }

    /// Insert a cartridge and power-cycle the console.
    pub fn insert_cartridge(&mut self, cartridge: Cartridge) {
        self.bus.attach_cartridge(cartridge);
        self.reset();
    }

    /// Reset every component and clear the master clock.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.master.clear();
        debug!(pc = self.cpu.pc(), "system reset");
    }

    // ---------------------------------------------------------------------
    // Clock
    // ---------------------------------------------------------------------

    /// Advance one master tick. Returns `true` when an audio sample became due.
    pub fn tick(&mut self) -> bool {
        self.master.ticks += 1;
        self.bus.clock_cartridge();
        self.bus.clock_ppu();
        if self.master.ticks % 3 == 0 {
            self.bus.clock_apu();
            self.cpu.clock(&mut self.bus);
            self.bus.update_audio_sample();
        }

        self.master.time += self.master.master_period;
        if self.master.time >= self.master.sample_period {
            self.master.time -= self.master.sample_period;
            true
        } else {
            false
        }
    }

    /// Run until the PPU completes a frame; returns the ticks spent.
    pub fn run_frame(&mut self) -> u64 {
        // A frame finished by earlier `tick`/`read_samples` calls does not count.
        self.bus.ppu_mut().take_frame_ready();
        let start = self.master.ticks;
        while self.master.ticks - start < MAX_FRAME_TICKS {
            self.tick();
            if self.bus.ppu_mut().take_frame_ready() {
                break;
            }
        }
        self.master.ticks - start
    }

    /// Fill `out` with whole stereo frames, ticking as far as needed. Returns bytes written.
    pub fn read_samples(&mut self, out: &mut [u8]) -> usize {
        let mut written = 0;
        for frame in out.chunks_exact_mut(BYTES_PER_AUDIO_FRAME) {
            while !self.tick() {}
            let [lo, hi] = self.bus.apu().mixed_sample().to_le_bytes();
            frame.copy_from_slice(&[lo, hi, lo, hi]);
            written += BYTES_PER_AUDIO_FRAME;
        }
        written
    }

    // ---------------------------------------------------------------------
    // Host-facing state
    // ---------------------------------------------------------------------

    /// The last completed frame as 256x240 RGBA.
    pub fn active_frame(&self) -> &[u8] {
        self.bus.ppu().active_frame()
    }

    /// Buttons for `port` as a bitmask: A, B, Select, Start, Up, Down, Left, Right from bit 0.
    /// Ports other than 0 and 1 are ignored.
    pub fn set_button_state(&mut self, port: usize, buttons: u8) {
        if let Some(pad) = self.bus.controller_mut(port) {
            pad.set_state_mask(buttons);
        }
    }

    /// Call `tracer` before every instruction dispatch.
    pub fn set_tracer<F>(&mut self, tracer: F)
    where
        F: FnMut(&TraceLine) + 'static,
    {
        self.cpu.set_tracer(Some(Box::new(tracer)));
    }

    pub fn clear_tracer(&mut self) {
        self.cpu.set_tracer(None);
    }

    pub fn config(&self) -> &NesConfig {
        &self.config
    }

    pub fn master(&self) -> &MasterState {
        &self.master
    }

    pub fn master_ticks(&self) -> u64 {
        self.master.ticks
    }

    pub fn frame_count(&self) -> u64 {
        self.bus.ppu().frame_count()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Write the active frame as a PNG.
    #[cfg(feature = "screenshot")]
    pub fn save_screenshot<P: AsRef<Path>>(&self, path: P) -> Result<(), ScreenshotError> {
        use crate::ppu::{NES_HEIGHT, NES_WIDTH};

        let (width, height) = (NES_WIDTH as u32, NES_HEIGHT as u32);
        let img = image::RgbaImage::from_raw(width, height, self.active_frame().to_vec())
            .ok_or(ScreenshotError::BadFrame { width, height })?;
        img.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::cartridge::Mirroring;
    use crate::test_utils::{build_mapper_rom, build_nrom_with_prg, nrom_cartridge};

    fn nes_with(program: &[u8]) -> Nes {
        Nes::from_cartridge(nrom_cartridge(program))
    }

    fn run_until_pc(nes: &mut Nes, pc: u16) {
        for _ in 0..1_000_000 {
            nes.tick();
            if nes.cpu().pc() == pc {
                return;
            }
        }
        panic!("PC never reached {pc:04X}");
    }

    fn collect_trace(nes: &mut Nes) -> Rc<RefCell<Vec<String>>> {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lines);
        nes.set_tracer(move |line| sink.borrow_mut().push(line.to_string()));
        lines
    }

    #[test]
    fn first_instruction_lands_on_dot_21() {
        let mut nes = nes_with(&[0x4C, 0x00, 0x80]);
        let lines = collect_trace(&mut nes);
        for _ in 0..21 {
            nes.tick();
        }
        let lines = lines.borrow();
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0],
            "8000  4C 00 80  JMP $8000                       A:00 X:00 Y:00 P:34 SP:FD PPU:  0, 21 CYC:7"
        );
    }

    #[test]
    fn oam_dma_stalls_the_cpu() {
        // LDA #$02; STA $4014; NOP
        let mut nes = nes_with(&[0xA9, 0x02, 0x8D, 0x14, 0x40, 0xEA, 0x4C, 0x05, 0x80]);
        for i in 0..=255u16 {
            nes.bus_mut().write(0x0200 + i, i as u8);
        }
        let lines = collect_trace(&mut nes);
        run_until_pc(&mut nes, 0x8006);
        let lines = lines.borrow();
        assert!(lines[1].contains("STA $4014") && lines[1].ends_with("CYC:9"));
        // DMA starts on cycle 13 (odd): 514 stall cycles
        assert!(lines[2].starts_with("8005") && lines[2].ends_with("CYC:527"));
        assert_eq!(nes.bus().ppu().oam()[0xFF], 0xFF);
    }

    #[test]
    fn odd_frames_are_one_dot_shorter() {
        // LDA #$1E; STA $2001; JMP $8005
        let mut nes = nes_with(&[0xA9, 0x1E, 0x8D, 0x01, 0x20, 0x4C, 0x05, 0x80]);
        nes.run_frame();
        let lengths: Vec<u64> = (0..4).map(|_| nes.run_frame()).collect();
        for len in &lengths {
            assert!(*len == 89341 || *len == 89342, "{lengths:?}");
        }
        for pair in lengths.windows(2) {
            assert_ne!(pair[0], pair[1], "{lengths:?}");
        }
    }

    #[test]
    fn run_frame_ignores_a_frame_finished_by_tick() {
        let mut nes = nes_with(&[0x4C, 0x00, 0x80]);
        while nes.bus().ppu().scanline() != 241 || nes.bus().ppu().dot() != 2 {
            nes.tick();
        }
        // The vblank flag from the frame just completed is still pending here.
        assert!(nes.run_frame() > 89_000);
    }

    #[test]
    fn rendering_disabled_frames_are_full_length() {
        let mut nes = nes_with(&[0x4C, 0x00, 0x80]);
        nes.run_frame();
        assert_eq!(nes.run_frame(), 89342);
        assert_eq!(nes.run_frame(), 89342);
    }

    #[test]
    fn mmc1_serial_writes_through_the_cpu() {
        let mut rom = build_mapper_rom(1, 2, 1, 0);
        #[rustfmt::skip]
        let program = [
            0xA9, 0x01, 0x8D, 0x00, 0x80,
            0xA9, 0x01, 0x8D, 0x00, 0x80,
            0xA9, 0x00, 0x8D, 0x00, 0x80,
            0xA9, 0x00, 0x8D, 0x00, 0x80,
            0xA9, 0x00, 0x8D, 0x00, 0x80,
            // partial write, then the reset bit
            0xA9, 0x01, 0x8D, 0x00, 0x80,
            0xA9, 0x80, 0x8D, 0x00, 0x80,
            0x4C, 0x23, 0x80,
        ];
        rom[16..16 + program.len()].copy_from_slice(&program);
        let mut nes = Nes::from_ines_bytes(&rom).expect("parse");

        run_until_pc(&mut nes, 0x8019);
        let cart = nes.bus().cartridge().expect("cartridge");
        assert!(cart.describe().contains("ctrl=00011"), "{}", cart.describe());
        assert_eq!(cart.mirroring(), Mirroring::Horizontal);

        run_until_pc(&mut nes, 0x8023);
        let cart = nes.bus().cartridge().expect("cartridge");
        assert!(cart.describe().contains("ctrl=01111"), "{}", cart.describe());
        assert!(cart.describe().contains("shift=0/0"), "{}", cart.describe());
    }

    #[test]
    fn mmc3_counts_scanlines_from_rendering_fetches() {
        let mut rom = build_mapper_rom(4, 2, 1, 0);
        #[rustfmt::skip]
        let program = [
            0xA9, 0x40, 0x8D, 0x17, 0x40, // frame IRQ off
            0xA9, 0x08, 0x8D, 0x00, 0x20, // BG at $0000, sprites at $1000
            0xA9, 0x1E, 0x8D, 0x01, 0x20, // show both layers
            0x4C, 0x0F, 0x80,
        ];
        rom[16..16 + program.len()].copy_from_slice(&program);
        let mut nes = Nes::from_ines_bytes(&rom).expect("parse");
        nes.run_frame();
        assert!(nes.bus().ppu().rendering_enabled());

        // Latch 10 with a reload request, armed during vblank.
        nes.bus_mut().write(0xC000, 10);
        nes.bus_mut().write(0xC001, 0);
        nes.bus_mut().write(0xE001, 0);

        let mut irq_lines = Vec::new();
        let mut prev = nes.bus().irq_line();
        loop {
            nes.tick();
            let ppu = nes.bus().ppu();
            let (scanline, dot) = (ppu.scanline(), ppu.dot());
            let line = nes.bus().irq_line();
            if line && !prev {
                assert!((258..=264).contains(&dot), "IRQ at {scanline},{dot}");
                irq_lines.push(scanline);
                nes.bus_mut().write(0xE000, 0);
                nes.bus_mut().write(0xE001, 0);
            }
            prev = nes.bus().irq_line();
            if nes.bus_mut().ppu_mut().take_frame_ready() {
                break;
            }
        }

        // Pre-render reloads 10; the counter hits zero on line 9, then every 11 lines.
        let expected: Vec<u16> = (0..21).map(|k| 9 + 11 * k).collect();
        assert_eq!(irq_lines, expected);
    }

    #[test]
    fn read_samples_duplicates_mono_into_stereo() {
        let mut nes = nes_with(&[0x4C, 0x00, 0x80]);
        let mut buf = [0u8; 402];
        assert_eq!(nes.read_samples(&mut buf), 400);
        for frame in buf[..400].chunks_exact(4) {
            assert_eq!(frame[0..2], frame[2..4]);
        }
        // 100 samples at 44.1 kHz is about 12175 master ticks.
        let ticks = nes.master_ticks();
        assert!((12_100..=12_200).contains(&ticks), "{ticks}");
    }

    #[test]
    fn sample_rate_comes_from_config() {
        let config = NesConfig {
            sample_rate: 22_050,
            ..NesConfig::default()
        };
        let mut nes = Nes::with_config(config);
        nes.insert_cartridge(nrom_cartridge(&[0x4C, 0x00, 0x80]));
        let mut buf = [0u8; 400];
        nes.read_samples(&mut buf);
        let ticks = nes.master_ticks();
        assert!((24_250..=24_400).contains(&ticks), "{ticks}");
    }

    #[test]
    fn controller_bits_shift_out_then_read_one() {
        // Strobe 1 then 0, nine times LDA $4016; PHA, then spin.
        let mut program = vec![0xA9, 0x01, 0x8D, 0x16, 0x40, 0xA9, 0x00, 0x8D, 0x16, 0x40];
        for _ in 0..9 {
            program.extend_from_slice(&[0xAD, 0x16, 0x40, 0x48]);
        }
        program.extend_from_slice(&[0x4C, 0x2E, 0x80]);
        let mut nes = nes_with(&program);
        nes.set_button_state(0, 0b1000_0001);
        run_until_pc(&mut nes, 0x802E);
        let reads: Vec<u8> = (0..9u16).map(|i| nes.bus().peek(0x01FD - i)).collect();
        assert_eq!(reads, vec![1, 0, 0, 0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn out_of_range_ports_are_ignored() {
        let mut nes = nes_with(&[0x4C, 0x00, 0x80]);
        nes.set_button_state(2, 0xFF);
        assert!(nes.bus().controller(2).is_none());
        assert!(nes.bus().controller(0).expect("pad").buttons().is_empty());
        assert!(nes.bus().controller(1).expect("pad").buttons().is_empty());
        nes.set_button_state(1, 0x01);
        assert_eq!(nes.bus().controller(1).expect("pad").buttons().bits(), 0x01);
    }

    #[test]
    fn nmi_reaches_the_handler() {
        // RESET: LDA #$80; STA $2000; JMP $8005. NMI handler at $8010: INX; RTI
        let mut prg = vec![0xEA; 0x20];
        prg[..8].copy_from_slice(&[0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80]);
        prg[0x10] = 0xE8;
        prg[0x11] = 0x40;
        let rom = build_nrom_with_prg(&prg, 1, Some((0x8000, 0x8010, 0x8000)));
        let mut nes = Nes::from_ines_bytes(&rom).expect("parse");
        // run_frame stops on the vblank tick, before the CPU takes that NMI.
        nes.run_frame();
        assert_eq!(nes.cpu().state().x, 0);
        nes.run_frame();
        assert_eq!(nes.cpu().state().x, 1);
        nes.run_frame();
        assert_eq!(nes.cpu().state().x, 2);
    }

    #[test]
    fn reset_restarts_the_machine() {
        let mut nes = nes_with(&[0xE8, 0x4C, 0x00, 0x80]);
        nes.run_frame();
        assert!(nes.cpu().state().x > 0);
        nes.reset();
        assert_eq!(nes.master_ticks(), 0);
        assert_eq!(nes.cpu().pc(), 0x8000);
        assert_eq!(nes.cpu().state().x, 0);
        assert_eq!(nes.cpu().cycles_remaining(), 7);
        assert_eq!(nes.frame_count(), 0);
    }

    #[test]
    fn load_errors_propagate() {
        assert!(matches!(
            Nes::from_ines_bytes(b"NOPE"),
            Err(LoadError::BadMagic) | Err(LoadError::Truncated { .. })
        ));
    }

    #[cfg(feature = "screenshot")]
    #[test]
    fn screenshot_writes_a_png() {
        let mut nes = nes_with(&[0x4C, 0x00, 0x80]);
        nes.run_frame();
        let path = std::env::temp_dir().join("nescore_screenshot_test.png");
        nes.save_screenshot(&path).expect("save");
        let img = image::open(&path).expect("open").to_rgba8();
        assert_eq!(img.dimensions(), (256, 240));
        let _ = std::fs::remove_file(&path);
    }
}
