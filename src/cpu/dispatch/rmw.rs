/*!
rmw.rs - read-modify-write family.

Shifts and rotates work on A (accumulator mode) or memory. The undocumented combinations
modify memory and then feed the result into a second operation:

| op  | memory | then            |
|-----|--------|-----------------|
| SLO | ASL    | ORA             |
| RLA | ROL    | AND             |
| SRE | LSR    | EOR             |
| RRA | ROR    | ADC             |
| DCP | DEC    | CMP             |
| ISC | INC    | SBC             |

Register increments (INX/INY/DEX/DEY) live here too.
*/

use crate::bus::Bus;
use crate::cpu::addressing::Operand;
use crate::cpu::execute::{adc, asl, compare, dec, inc, lsr, modify, rol, ror, sbc};
use crate::cpu::state::CpuState;
use crate::cpu::table::Mnemonic;

pub(super) fn handle(
    m: Mnemonic,
    cpu: &mut CpuState,
    bus: &mut Bus,
    operand: Operand,
) -> Option<u8> {
    match m {
        Mnemonic::Asl => {
            modify(cpu, bus, operand, asl);
        }
        Mnemonic::Lsr => {
            modify(cpu, bus, operand, lsr);
        }
        Mnemonic::Rol => {
            modify(cpu, bus, operand, rol);
        }
        Mnemonic::Ror => {
            modify(cpu, bus, operand, ror);
        }
        Mnemonic::Inc => {
            modify(cpu, bus, operand, inc);
        }
        Mnemonic::Dec => {
            modify(cpu, bus, operand, dec);
        }
        Mnemonic::Inx => {
            let x = cpu.x;
            cpu.x = inc(cpu, x);
        }
        Mnemonic::Iny => {
            let y = cpu.y;
            cpu.y = inc(cpu, y);
        }
        Mnemonic::Dex => {
            let x = cpu.x;
            cpu.x = dec(cpu, x);
        }
        Mnemonic::Dey => {
            let y = cpu.y;
            cpu.y = dec(cpu, y);
        }
        Mnemonic::Slo => {
            let v = modify(cpu, bus, operand, asl);
            cpu.a |= v;
            cpu.update_zn(cpu.a);
        }
        Mnemonic::Rla => {
            let v = modify(cpu, bus, operand, rol);
            cpu.a &= v;
            cpu.update_zn(cpu.a);
        }
        Mnemonic::Sre => {
            let v = modify(cpu, bus, operand, lsr);
            cpu.a ^= v;
            cpu.update_zn(cpu.a);
        }
        Mnemonic::Rra => {
            let v = modify(cpu, bus, operand, ror);
            adc(cpu, v);
        }
        Mnemonic::Dcp => {
            let v = modify(cpu, bus, operand, |_, v| v.wrapping_sub(1));
            let a = cpu.a;
            compare(cpu, a, v);
        }
        Mnemonic::Isc => {
            let v = modify(cpu, bus, operand, |_, v| v.wrapping_add(1));
            sbc(cpu, v);
        }
        _ => return None,
    }
    Some(0)
}
