/*!
CPU interface dispatcher

Address map:
- $0000-$1FFF: 2 KiB RAM, mirrored every $0800
- $2000-$3FFF: PPU registers, mirrored every 8 bytes
- $4000-$4013: APU channel registers (write-only; reads are open bus)
- $4014: OAM DMA page latch (write); open bus on read
- $4015: APU status / channel enables
- $4016: controller 1 read; strobe write for both pads
- $4017: controller 2 read; APU frame counter write
- $4018-$401F: disabled test registers (open bus)
- $4020-$FFFF: cartridge; unmapped cartridge space reads open bus

Every read and write updates the open-bus byte. Controller reads return the pad's serial
bit unmodified.
*/

use tracing::trace;

use crate::bus::Bus;

impl Bus {
    /// CPU read with all device side effects.
    pub fn read(&mut self, addr: u16) -> u8 {
        let value = match addr {
            0x0000..=0x1FFF => self.ram_read(addr),
            0x2000..=0x3FFF => {
                let (ppu, mut mem) = self.ppu_parts();
                ppu.cpu_read(addr, &mut mem)
            }
            0x4015 => self.apu.read_status() | (self.open_bus & 0x20),
            0x4016 | 0x4017 => {
                let port = (addr - 0x4016) as usize;
                self.controllers[port].read()
            }
            0x4000..=0x401F => self.open_bus,
            0x4020..=0xFFFF => self
                .cartridge
                .as_ref()
                .and_then(|c| c.cpu_read(addr))
                .unwrap_or(self.open_bus),
        };
        self.open_bus = value;
        value
    }

    /// CPU write.
    pub fn write(&mut self, addr: u16, value: u8) {
        self.open_bus = value;
        match addr {
            0x0000..=0x1FFF => self.ram_write(addr, value),
            0x2000..=0x3FFF => {
                let (ppu, mut mem) = self.ppu_parts();
                ppu.cpu_write(addr, value, &mut mem);
            }
            0x4014 => {
                trace!(page = value, "oam dma requested");
                self.oam_dma_page = Some(value);
            }
            0x4016 => {
                for pad in &mut self.controllers {
                    pad.write_strobe(value);
                }
            }
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.write_register(addr, value),
            0x4018..=0x401F => {}
            0x4020..=0xFFFF => {
                if let Some(cart) = self.cartridge.as_mut() {
                    cart.cpu_write(addr, value);
                }
            }
        }
    }

    /// Read without side effects: no $2002 clear, no $2007 buffer advance, no controller
    /// shift, no $4015 acknowledge, no open-bus update.
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram_read(addr),
            0x2000..=0x3FFF => self.ppu.peek(addr),
            0x4015 => self.apu.peek_status() | (self.open_bus & 0x20),
            0x4016 | 0x4017 => {
                let port = (addr - 0x4016) as usize;
                self.controllers[port].peek()
            }
            0x4000..=0x401F => self.open_bus,
            0x4020..=0xFFFF => self
                .cartridge
                .as_ref()
                .and_then(|c| c.cpu_read(addr))
                .unwrap_or(self.open_bus),
        }
    }

    /// Little-endian word read (vectors).
    pub fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }
}
