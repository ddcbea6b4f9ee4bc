//! compare.rs - CMP/CPX/CPY and SBX (X = (A AND X) - M, carry as in CMP).

use crate::bus::Bus;
use crate::cpu::addressing::Operand;
use crate::cpu::execute::{compare, load};
use crate::cpu::state::CpuState;
use crate::cpu::table::Mnemonic;

pub(super) fn handle(
    m: Mnemonic,
    cpu: &mut CpuState,
    bus: &mut Bus,
    operand: Operand,
) -> Option<u8> {
    let reg = match m {
        Mnemonic::Cmp => cpu.a,
        Mnemonic::Cpx => cpu.x,
        Mnemonic::Cpy => cpu.y,
        Mnemonic::Sbx => cpu.a & cpu.x,
        _ => return None,
    };
    let v = load(cpu, bus, operand);
    compare(cpu, reg, v);
    if m == Mnemonic::Sbx {
        cpu.x = reg.wrapping_sub(v);
    }
    Some(0)
}
