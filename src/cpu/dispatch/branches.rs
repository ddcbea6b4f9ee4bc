/*!
branches.rs - conditional relative branches.

Base cost 2. A taken branch adds 1; a taken branch whose target sits on a different page
than the following instruction adds 1 more.
*/

use crate::bus::Bus;
use crate::cpu::addressing::Operand;
use crate::cpu::state::{CpuState, Status};
use crate::cpu::table::Mnemonic;

pub(super) fn handle(
    m: Mnemonic,
    cpu: &mut CpuState,
    _bus: &mut Bus,
    operand: Operand,
) -> Option<u8> {
    let taken = match m {
        Mnemonic::Bpl => !cpu.flag(Status::NEGATIVE),
        Mnemonic::Bmi => cpu.flag(Status::NEGATIVE),
        Mnemonic::Bvc => !cpu.flag(Status::OVERFLOW),
        Mnemonic::Bvs => cpu.flag(Status::OVERFLOW),
        Mnemonic::Bcc => !cpu.flag(Status::CARRY),
        Mnemonic::Bcs => cpu.flag(Status::CARRY),
        Mnemonic::Bne => !cpu.flag(Status::ZERO),
        Mnemonic::Beq => cpu.flag(Status::ZERO),
        _ => return None,
    };
    let Operand::Address(target) = operand else {
        return Some(0);
    };
    if !taken {
        return Some(0);
    }
    let extra = if (cpu.pc & 0xFF00) != (target & 0xFF00) { 2 } else { 1 };
    cpu.pc = target;
    Some(extra)
}
