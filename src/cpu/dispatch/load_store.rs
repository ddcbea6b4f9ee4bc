/*!
load_store.rs - register loads and stores.

LAX loads A and X together; SAX stores A AND X without touching flags; LAS loads
M AND S into A, X and S.
*/

use crate::bus::Bus;
use crate::cpu::addressing::Operand;
use crate::cpu::execute::{load, store};
use crate::cpu::state::CpuState;
use crate::cpu::table::Mnemonic;

pub(super) fn handle(
    m: Mnemonic,
    cpu: &mut CpuState,
    bus: &mut Bus,
    operand: Operand,
) -> Option<u8> {
    match m {
        Mnemonic::Lda => {
            cpu.a = load(cpu, bus, operand);
            cpu.update_zn(cpu.a);
        }
        Mnemonic::Ldx => {
            cpu.x = load(cpu, bus, operand);
            cpu.update_zn(cpu.x);
        }
        Mnemonic::Ldy => {
            cpu.y = load(cpu, bus, operand);
            cpu.update_zn(cpu.y);
        }
        Mnemonic::Lax => {
            let v = load(cpu, bus, operand);
            cpu.a = v;
            cpu.x = v;
            cpu.update_zn(v);
        }
        Mnemonic::Las => {
            let v = load(cpu, bus, operand) & cpu.sp;
            cpu.a = v;
            cpu.x = v;
            cpu.sp = v;
            cpu.update_zn(v);
        }
        Mnemonic::Sta | Mnemonic::Stx | Mnemonic::Sty | Mnemonic::Sax => {
            let v = match m {
                Mnemonic::Sta => cpu.a,
                Mnemonic::Stx => cpu.x,
                Mnemonic::Sty => cpu.y,
                _ => cpu.a & cpu.x,
            };
            store(cpu, bus, operand, v);
        }
        _ => return None,
    }
    Some(0)
}
