#![doc = r#"
Bus module: owner of every addressable device and the CPU-side address decoder.

Modules and responsibilities
- Bus (this file): device ownership, reset, clock fan-out to PPU/APU/cartridge, interrupt lines.
- cpu_interface: CPU-visible decode ($0000-$FFFF) for read/write and side-effect-free `peek`.
- ppu_space: `PpuMemory`, the PPU's view of pattern tables (cartridge) and nametables (VRAM
  folded by the cartridge's current mirroring). Built per access from disjoint field borrows.
- dma: OAM DMA transfer and DMC sample fetch, both performed on behalf of the CPU.

Ownership
- The bus owns PPU, APU, controllers, RAM, VRAM and the cartridge. The CPU is owned by the
  `Nes` root and receives `&mut Bus` on every clock, so no component holds a reference to
  another.
"#]

pub mod cpu_interface;
pub mod dma;
pub mod ppu_space;

#[cfg(test)]
mod tests;

use tracing::debug;

use crate::apu::Apu;
use crate::cartridge::Cartridge;
use crate::controller::Controller;
use crate::ppu::Ppu;

pub use ppu_space::PpuMemory;

/// 2 KiB of internal RAM.
pub const RAM_SIZE: usize = 0x0800;
/// Nametable RAM; 4 KiB so four-screen boards get four distinct pages.
pub const VRAM_SIZE: usize = 0x1000;

pub struct Bus {
    ram: [u8; RAM_SIZE],
    vram: [u8; VRAM_SIZE],
    ppu: Ppu,
    apu: Apu,
    controllers: [Controller; 2],
    cartridge: Option<Cartridge>,
    // Last value driven on the CPU data bus.
    open_bus: u8,
    // Source page latched by a $4014 write, consumed by the CPU.
    oam_dma_page: Option<u8>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            ram: [0; RAM_SIZE],
            vram: [0; VRAM_SIZE],
            ppu: Ppu::new(),
            apu: Apu::new(),
            controllers: [Controller::new(), Controller::new()],
            cartridge: None,
            open_bus: 0,
            oam_dma_page: None,
        }
    }

    pub fn attach_cartridge(&mut self, cartridge: Cartridge) {
        debug!(mapper = cartridge.mapper_id(), "cartridge attached");
        self.cartridge = Some(cartridge);
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.cartridge.as_mut()
    }

    /// Reset every device on the bus. RAM and VRAM are cleared.
    pub fn reset(&mut self) {
        self.ram.fill(0);
        self.vram.fill(0);
        self.ppu.reset();
        self.apu.reset();
        self.controllers = [Controller::new(), Controller::new()];
        if let Some(cart) = self.cartridge.as_mut() {
            cart.reset();
        }
        self.open_bus = 0;
        self.oam_dma_page = None;
    }

    // ---------------------------------------------------------------------
    // Device access
    // ---------------------------------------------------------------------

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    pub fn apu_mut(&mut self) -> &mut Apu {
        &mut self.apu
    }

    /// Controller on `port` (0 or 1); `None` for any other port.
    pub fn controller_mut(&mut self, port: usize) -> Option<&mut Controller> {
        self.controllers.get_mut(port)
    }

    pub fn controller(&self, port: usize) -> Option<&Controller> {
        self.controllers.get(port)
    }

    pub fn open_bus(&self) -> u8 {
        self.open_bus
    }

    /// Split the bus into the PPU and its memory view.
    pub(crate) fn ppu_parts(&mut self) -> (&mut Ppu, PpuMemory<'_>) {
        let Bus {
            ppu,
            vram,
            cartridge,
            ..
        } = self;
        (ppu, PpuMemory::new(vram, cartridge.as_mut()))
    }

    // ---------------------------------------------------------------------
    // Clock fan-out
    // ---------------------------------------------------------------------

    /// One PPU dot.
    pub fn clock_ppu(&mut self) {
        let (ppu, mut mem) = self.ppu_parts();
        ppu.clock(&mut mem);
    }

    /// One master tick of mapper timers.
    pub fn clock_cartridge(&mut self) {
        if let Some(cart) = self.cartridge.as_mut() {
            cart.clock();
        }
    }

    /// One CPU cycle of APU time.
    pub fn clock_apu(&mut self) {
        self.apu.clock();
    }

    pub fn update_audio_sample(&mut self) {
        self.apu.update_sample();
    }

    // ---------------------------------------------------------------------
    // Interrupt lines
    // ---------------------------------------------------------------------

    /// PPU /NMI output level (edge detection happens in the CPU).
    pub fn nmi_line(&self) -> bool {
        self.ppu.nmi_line()
    }

    /// Wired-OR of every IRQ source: APU frame/DMC and the cartridge.
    pub fn irq_line(&self) -> bool {
        self.apu.irq_pending() || self.cartridge.as_ref().is_some_and(|c| c.irq_pending())
    }

    // ---------------------------------------------------------------------
    // Internal RAM
    // ---------------------------------------------------------------------

    #[inline]
    fn ram_read(&self, addr: u16) -> u8 {
        self.ram[(addr as usize) & (RAM_SIZE - 1)]
    }

    #[inline]
    fn ram_write(&mut self, addr: u16, value: u8) {
        self.ram[(addr as usize) & (RAM_SIZE - 1)] = value;
    }
}
