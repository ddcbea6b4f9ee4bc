/*!
logical.rs - AND/ORA/EOR/BIT and the immediate-only undocumented combinations.

ANC: AND, then C = N.
ALR: AND, then LSR A.
ARR: AND, then ROR A; C comes from bit 6 and V from bit 6 XOR bit 5 of the result.
*/

use crate::bus::Bus;
use crate::cpu::addressing::Operand;
use crate::cpu::execute::{bit, load, lsr, ror};
use crate::cpu::state::{CpuState, Status};
use crate::cpu::table::Mnemonic;

pub(super) fn handle(
    m: Mnemonic,
    cpu: &mut CpuState,
    bus: &mut Bus,
    operand: Operand,
) -> Option<u8> {
    match m {
        Mnemonic::And => {
            let v = load(cpu, bus, operand);
            cpu.a &= v;
            cpu.update_zn(cpu.a);
        }
        Mnemonic::Ora => {
            let v = load(cpu, bus, operand);
            cpu.a |= v;
            cpu.update_zn(cpu.a);
        }
        Mnemonic::Eor => {
            let v = load(cpu, bus, operand);
            cpu.a ^= v;
            cpu.update_zn(cpu.a);
        }
        Mnemonic::Bit => {
            let v = load(cpu, bus, operand);
            bit(cpu, v);
        }
        Mnemonic::Anc => {
            let v = load(cpu, bus, operand);
            cpu.a &= v;
            cpu.update_zn(cpu.a);
            cpu.set_flag(Status::CARRY, cpu.a & 0x80 != 0);
        }
        Mnemonic::Alr => {
            let v = cpu.a & load(cpu, bus, operand);
            cpu.a = lsr(cpu, v);
        }
        Mnemonic::Arr => {
            let v = cpu.a & load(cpu, bus, operand);
            let r = ror(cpu, v);
            cpu.a = r;
            cpu.set_flag(Status::CARRY, r & 0x40 != 0);
            cpu.set_flag(Status::OVERFLOW, ((r >> 6) ^ (r >> 5)) & 1 != 0);
        }
        _ => return None,
    }
    Some(0)
}
