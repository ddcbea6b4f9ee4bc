//! unstable.rs - ANE, LXA, SHA, SHX, SHY, TAS and JAM run as stubs: cycles pass, state does not change.

use tracing::trace;

use crate::bus::Bus;
use crate::cpu::addressing::Operand;
use crate::cpu::state::CpuState;
use crate::cpu::table::Mnemonic;

pub(super) fn handle(
    m: Mnemonic,
    cpu: &mut CpuState,
    _bus: &mut Bus,
    _operand: Operand,
) -> Option<u8> {
    if !m.is_stub() {
        return None;
    }
    trace!(mnemonic = m.name(), next_pc = cpu.pc, "unstable opcode stubbed");
    Some(0)
}
