/*!
misc.rs - transfers, stack and flag instructions, and NOP.

TXS is the only transfer that leaves N/Z alone. PHP pushes P with B set; PLP drops B.
Undocumented NOPs resolve their operand (so PC advances correctly) but never read it.
*/

use crate::bus::Bus;
use crate::cpu::addressing::Operand;
use crate::cpu::state::{CpuState, Status};
use crate::cpu::table::Mnemonic;

pub(super) fn handle(
    m: Mnemonic,
    cpu: &mut CpuState,
    bus: &mut Bus,
    _operand: Operand,
) -> Option<u8> {
    match m {
        Mnemonic::Tax => {
            cpu.x = cpu.a;
            cpu.update_zn(cpu.x);
        }
        Mnemonic::Tay => {
            cpu.y = cpu.a;
            cpu.update_zn(cpu.y);
        }
        Mnemonic::Txa => {
            cpu.a = cpu.x;
            cpu.update_zn(cpu.a);
        }
        Mnemonic::Tya => {
            cpu.a = cpu.y;
            cpu.update_zn(cpu.a);
        }
        Mnemonic::Tsx => {
            cpu.x = cpu.sp;
            cpu.update_zn(cpu.x);
        }
        Mnemonic::Txs => cpu.sp = cpu.x,

        Mnemonic::Pha => {
            let a = cpu.a;
            cpu.push(bus, a);
        }
        Mnemonic::Php => {
            let p = cpu.pushed_status(true);
            cpu.push(bus, p);
        }
        Mnemonic::Pla => {
            cpu.a = cpu.pull(bus);
            cpu.update_zn(cpu.a);
        }
        Mnemonic::Plp => {
            let p = cpu.pull(bus);
            cpu.restore_status(p);
        }

        Mnemonic::Clc => cpu.set_flag(Status::CARRY, false),
        Mnemonic::Sec => cpu.set_flag(Status::CARRY, true),
        Mnemonic::Cli => cpu.set_flag(Status::IRQ_DISABLE, false),
        Mnemonic::Sei => cpu.set_flag(Status::IRQ_DISABLE, true),
        Mnemonic::Cld => cpu.set_flag(Status::DECIMAL, false),
        Mnemonic::Sed => cpu.set_flag(Status::DECIMAL, true),
        Mnemonic::Clv => cpu.set_flag(Status::OVERFLOW, false),

        Mnemonic::Nop => {}
        _ => return None,
    }
    Some(0)
}
