#![doc = r#"
nescore library crate.

A cycle-driven NES emulator core: a master clock interleaves the PPU, APU and 6502 CPU at
the NTSC 3:1 ratio and hands out RGBA frames and 16-bit stereo audio.

Modules:
- apu: pulse/triangle/noise/DMC channels, frame sequencer and mixer
- bus: CPU address space, open bus, DMA plumbing, PPU memory view
- cartridge: iNES loader; constructs the board's Mapper
- controller: standard pad shift register
- cpu: 6502 core (state, opcode table, addressing, dispatch families, trace)
- mapper / mappers: Mapper trait with NROM, MMC1, UxROM, CNROM, AxROM and MMC3
- nes: the owning root and master-clock driver
- ppu: dot-accurate background/sprite pipeline and register interface
- ppu_bus: trait the PPU fetches pattern and nametable bytes through

In tests, shared iNES builders are available under `crate::test_utils`.
"#]

pub mod apu;
pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod mapper;
pub mod mappers;
pub mod nes;
pub mod ppu;
pub mod ppu_bus;

pub use bus::Bus;
pub use cartridge::{Cartridge, LoadError, Mirroring};
pub use cpu::{Cpu, TraceLine};
pub use nes::{Nes, NesConfig};

#[cfg(test)]
pub mod test_utils;
