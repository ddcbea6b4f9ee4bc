/*!
dispatch - instruction execution by opcode family.

Overview
========
The core fetches the opcode, resolves its operand and advances PC past the instruction, then
calls `execute`. Each family module exposes `handle`, which returns `Some(extra_cycles)` when
it owns the mnemonic and `None` otherwise. Families are tried in order. Every mnemonic in
the opcode table has exactly one owner; the unstable/JAM stubs claim only `Mnemonic::is_stub`.

Families
========
- load_store: LDA/LDX/LDY, STA/STX/STY, LAX, SAX, LAS
- arithmetic: ADC, SBC (including the $EB alias)
- logical: AND, ORA, EOR, BIT, ANC, ALR, ARR
- compare: CMP, CPX, CPY, SBX
- rmw: shifts, rotates, INC/DEC and register increments, plus SLO/RLA/SRE/RRA/DCP/ISC
- branches: the eight conditional branches (the only family that returns extra cycles)
- control_flow: JMP, JSR, RTS, RTI, BRK
- misc: transfers, stack pushes and pulls, flag set/clear, NOP
- unstable: ANE, LXA, SHA, SHX, SHY, TAS and JAM

Contract
========
- `cpu.pc` already points at the next instruction when a handler runs.
- Handlers never touch timing; the returned extra cycles are added to the opcode's base cost.
*/

pub(crate) mod arithmetic;
pub(crate) mod branches;
pub(crate) mod compare;
pub(crate) mod control_flow;
pub(crate) mod load_store;
pub(crate) mod logical;
pub(crate) mod misc;
pub(crate) mod rmw;
pub(crate) mod unstable;

use crate::bus::Bus;
use crate::cpu::addressing::Operand;
use crate::cpu::state::CpuState;
use crate::cpu::table::Mnemonic;

type Handler = fn(Mnemonic, &mut CpuState, &mut Bus, Operand) -> Option<u8>;

const FAMILIES: [Handler; 9] = [
    load_store::handle,
    arithmetic::handle,
    logical::handle,
    compare::handle,
    rmw::handle,
    branches::handle,
    control_flow::handle,
    misc::handle,
    unstable::handle,
];

/// Run one instruction's semantics; returns cycles beyond the base cost.
pub(crate) fn execute(m: Mnemonic, cpu: &mut CpuState, bus: &mut Bus, operand: Operand) -> u8 {
    let extra = FAMILIES
        .iter()
        .find_map(|family| family(m, cpu, bus, operand));
    debug_assert!(extra.is_some(), "no family handles {m}");
    extra.unwrap_or(0)
}
