/*!
DMA transfers performed on behalf of the CPU.

- OAM DMA: a $4014 write latches a source page. The CPU notices the latch at its next
  dispatch, stalls for 513 (or 514 on an odd cycle) cycles and calls `run_oam_dma`, which
  copies `$XX00-$XXFF` into OAM starting at the current OAMADDR. Source reads go through the
  regular CPU decoder, so they keep their side effects.
- DMC DMA: when the DMC sample buffer runs dry the CPU steals a read cycle and hands the
  byte back to the APU through `service_dmc_dma`.
*/

use tracing::trace;

use crate::bus::Bus;

impl Bus {
    /// Take the page latched by the last $4014 write.
    pub fn take_oam_dma_page(&mut self) -> Option<u8> {
        self.oam_dma_page.take()
    }

    pub fn oam_dma_pending(&self) -> bool {
        self.oam_dma_page.is_some()
    }

    /// Copy 256 bytes from `page << 8` into OAM.
    pub fn run_oam_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        for offset in 0..=0xFFu16 {
            let value = self.read(base | offset);
            self.ppu.oam_dma_write(value);
        }
        trace!(page, "oam dma complete");
    }

    pub fn dmc_dma_pending(&self) -> bool {
        self.apu.dmc_dma_request()
    }

    /// Fetch the next DMC sample byte and return the address it came from.
    pub fn service_dmc_dma(&mut self) -> u16 {
        let addr = self.apu.dmc_dma_address();
        let value = self.read(addr);
        self.apu.dmc_dma_complete(value);
        addr
    }
}
