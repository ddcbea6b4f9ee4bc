/*!
core.rs - the cycle-stepped 6502 driver.

Timing model
============
`clock` is called once per CPU cycle. It counts the cycle, burns one cycle of the current
instruction, and when nothing is left it dispatches the next unit of work. An instruction
executes completely at dispatch and then occupies the CPU for its full cost, so bus side
effects land on the instruction's first cycle.

Dispatch priority
=================
1. OAM DMA latched by a $4014 write: copy 256 bytes, stall 513 cycles (514 on an odd cycle).
2. DMC sample fetch: one read on the APU's behalf, stall 4 cycles.
3. NMI: latched on the rising edge of the PPU's NMI output.
4. IRQ: level of the wired-OR IRQ line, masked by I.
5. Fetch, resolve, execute the opcode at PC.

Interrupt lines are sampled at the start of every cycle, so an NMI raised in the middle of
an instruction is taken at the next dispatch.

Interrupt entry pushes PCH, PCL and P (B clear, bit 5 set), sets I and loads the vector;
it costs 7 cycles.
*/

use tracing::debug;

use crate::bus::Bus;
use crate::cpu::addressing::{self, Resolved};
use crate::cpu::dispatch;
use crate::cpu::dispatch::control_flow::{IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR};
use crate::cpu::state::{CpuState, Status};
use crate::cpu::table::{AddrMode, Opcode, lookup};
use crate::cpu::trace::TraceLine;

/// Cycles the CPU spends in its reset sequence before the first fetch.
pub const RESET_CYCLES: u32 = 7;
/// Interrupt entry cost.
pub const INTERRUPT_CYCLES: u32 = 7;
/// OAM DMA stall on an even cycle; one more on an odd cycle.
pub const OAM_DMA_CYCLES: u32 = 513;
/// DMC sample fetch stall.
pub const DMC_DMA_CYCLES: u32 = 4;

/// Per-instruction trace hook.
pub type Tracer = Box<dyn FnMut(&TraceLine)>;

/// What a dispatching cycle started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Instruction(u8),
    Nmi,
    Irq,
    OamDma(u8),
    DmcDma(u16),
}

pub struct Cpu {
    state: CpuState,
    cycles_remaining: u32,
    total_cycles: u64,
    nmi_line_prev: bool,
    nmi_pending: bool,
    irq_line: bool,
    tracer: Option<Tracer>,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("cycles_remaining", &self.cycles_remaining)
            .field("total_cycles", &self.total_cycles)
            .field("nmi_pending", &self.nmi_pending)
            .field("irq_line", &self.irq_line)
            .field("tracer", &self.tracer.is_some())
            .finish()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            state: CpuState::new(),
            cycles_remaining: 0,
            total_cycles: 0,
            nmi_line_prev: false,
            nmi_pending: false,
            irq_line: false,
            tracer: None,
        }
    }

    /// Registers to power-on values, PC from $FFFC, 7 cycles until the first fetch.
    /// The tracer survives a reset.
    pub fn reset(&mut self, bus: &mut Bus) {
        self.state = CpuState::new();
        self.state.pc = bus.read_word(RESET_VECTOR);
        self.cycles_remaining = RESET_CYCLES;
        self.total_cycles = 0;
        self.nmi_line_prev = false;
        self.nmi_pending = false;
        self.irq_line = false;
        debug!(pc = self.state.pc, "cpu reset");
    }

    // ---------------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------------

    pub fn state(&self) -> &CpuState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    pub fn pc(&self) -> u16 {
        self.state.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.state.pc = pc;
    }

    pub fn cycles_remaining(&self) -> u32 {
        self.cycles_remaining
    }

    /// CPU cycles since reset.
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    pub fn set_tracer(&mut self, tracer: Option<Tracer>) {
        self.tracer = tracer;
    }

    // ---------------------------------------------------------------------
    // Clock
    // ---------------------------------------------------------------------

    /// One CPU cycle. Returns what was dispatched, if this cycle started something.
    pub fn clock(&mut self, bus: &mut Bus) -> Option<Dispatch> {
        self.poll_lines(bus);
        self.total_cycles += 1;
        if self.cycles_remaining > 0 {
            self.cycles_remaining -= 1;
        }
        if self.cycles_remaining != 0 {
            return None;
        }
        Some(self.dispatch(bus))
    }

    fn poll_lines(&mut self, bus: &Bus) {
        let nmi = bus.nmi_line();
        if nmi && !self.nmi_line_prev {
            self.nmi_pending = true;
        }
        self.nmi_line_prev = nmi;
        self.irq_line = bus.irq_line();
    }

    fn dispatch(&mut self, bus: &mut Bus) -> Dispatch {
        if let Some(page) = bus.take_oam_dma_page() {
            bus.run_oam_dma(page);
            self.cycles_remaining = OAM_DMA_CYCLES + (self.total_cycles & 1) as u32;
            return Dispatch::OamDma(page);
        }
        if bus.dmc_dma_pending() {
            let addr = bus.service_dmc_dma();
            self.cycles_remaining = DMC_DMA_CYCLES;
            return Dispatch::DmcDma(addr);
        }
        if self.nmi_pending {
            self.nmi_pending = false;
            self.interrupt(bus, NMI_VECTOR);
            return Dispatch::Nmi;
        }
        if self.irq_line && !self.state.flag(Status::IRQ_DISABLE) {
            self.interrupt(bus, IRQ_VECTOR);
            return Dispatch::Irq;
        }
        self.execute_next(bus)
    }

    fn interrupt(&mut self, bus: &mut Bus, vector: u16) {
        let pc = self.state.pc;
        self.state.push_word(bus, pc);
        let p = self.state.pushed_status(false);
        self.state.push(bus, p);
        self.state.set_flag(Status::IRQ_DISABLE, true);
        self.state.pc = bus.read_word(vector);
        self.cycles_remaining = INTERRUPT_CYCLES;
    }

    fn execute_next(&mut self, bus: &mut Bus) -> Dispatch {
        if let Some(tracer) = self.tracer.as_mut() {
            let line = TraceLine::capture(&self.state, bus, self.total_cycles);
            tracer(&line);
        }

        let pc = self.state.pc;
        let opcode = bus.read(pc);
        let info = lookup(opcode);
        let Resolved {
            operand,
            page_crossed,
        } = addressing::resolve(info.mode, &self.state, bus);
        self.state.pc = pc.wrapping_add(info.len());

        let penalty = page_penalty(info, page_crossed);
        let extra = dispatch::execute(info.mnemonic, &mut self.state, bus, operand);
        self.cycles_remaining = info.cycles as u32 + penalty + extra as u32;
        Dispatch::Instruction(opcode)
    }
}

/// Indexed reads pay a cycle when the index carries into the high byte. Stores and RMW forms
/// always take their fixed (higher) base cost.
fn page_penalty(info: &Opcode, crossed: bool) -> u32 {
    if !crossed {
        return 0;
    }
    match info.mode {
        AddrMode::Abx | AddrMode::Aby => u32::from(info.cycles == 4),
        AddrMode::Izy => u32::from(info.cycles == 5),
        _ => 0,
    }
}
