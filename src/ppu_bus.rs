/*!
ppu_bus: the PPU's view of its own address space, decoupled from the full `Bus`.

Address space expected from implementors:
- 0x0000-0x1FFF : pattern tables (cartridge CHR ROM/RAM via the mapper)
- 0x2000-0x2FFF : nametables, folded by the current mirroring
- 0x3000-0x3EFF : mirrors of 0x2000-0x2EFF

Palette RAM ($3F00-$3FFF) lives inside the PPU and never reaches this trait.

Both methods take `&mut self`: pattern fetches are observable by the cartridge (MMC3
watches A12), and CPU writes through $2007 land in CHR RAM or VRAM.
*/

/// Memory interface the PPU uses for pattern and nametable fetches.
pub trait PpuBus {
    /// Read a byte at a 14-bit PPU address below $3F00.
    fn ppu_read(&mut self, addr: u16) -> u8;

    /// Write a byte at a 14-bit PPU address below $3F00.
    fn ppu_write(&mut self, addr: u16, value: u8);
}
