/*!
control_flow.rs - JMP, JSR, RTS, RTI, BRK.

JSR pushes the address of its last byte; RTS pulls it and adds one. BRK skips a padding
byte, pushes P with B set and vectors through $FFFE.
*/

use crate::bus::Bus;
use crate::cpu::addressing::Operand;
use crate::cpu::state::{CpuState, Status};
use crate::cpu::table::Mnemonic;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

pub(super) fn handle(
    m: Mnemonic,
    cpu: &mut CpuState,
    bus: &mut Bus,
    operand: Operand,
) -> Option<u8> {
    match m {
        Mnemonic::Jmp => {
            if let Operand::Address(target) = operand {
                cpu.pc = target;
            }
        }
        Mnemonic::Jsr => {
            if let Operand::Address(target) = operand {
                let ret = cpu.pc.wrapping_sub(1);
                cpu.push_word(bus, ret);
                cpu.pc = target;
            }
        }
        Mnemonic::Rts => {
            cpu.pc = cpu.pull_word(bus).wrapping_add(1);
        }
        Mnemonic::Rti => {
            let p = cpu.pull(bus);
            cpu.restore_status(p);
            cpu.pc = cpu.pull_word(bus);
        }
        Mnemonic::Brk => {
            let ret = cpu.pc.wrapping_add(1);
            cpu.push_word(bus, ret);
            let p = cpu.pushed_status(true);
            cpu.push(bus, p);
            cpu.set_flag(Status::IRQ_DISABLE, true);
            cpu.pc = bus.read_word(IRQ_VECTOR);
        }
        _ => return None,
    }
    Some(0)
}
