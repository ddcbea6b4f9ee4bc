//! arithmetic.rs - ADC and SBC. Decimal mode is ignored (the 2A03 has no BCD unit).

use crate::bus::Bus;
use crate::cpu::addressing::Operand;
use crate::cpu::execute::{adc, load, sbc};
use crate::cpu::state::CpuState;
use crate::cpu::table::Mnemonic;

pub(super) fn handle(
    m: Mnemonic,
    cpu: &mut CpuState,
    bus: &mut Bus,
    operand: Operand,
) -> Option<u8> {
    match m {
        Mnemonic::Adc => {
            let v = load(cpu, bus, operand);
            adc(cpu, v);
        }
        Mnemonic::Sbc => {
            let v = load(cpu, bus, operand);
            sbc(cpu, v);
        }
        _ => return None,
    }
    Some(0)
}
