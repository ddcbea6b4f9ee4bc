/*!
execute.rs - instruction semantics shared by the dispatch families.

ALU helpers take the operand value and update registers/flags; shift and rotate helpers
return the new value so the caller decides whether it lands in A or memory. `load` and
`store` move data through an `Operand` and are the only place the effective address is
touched.
*/

use crate::bus::Bus;
use crate::cpu::addressing::Operand;
use crate::cpu::state::{CpuState, Status};

#[inline]
pub(crate) fn load(cpu: &CpuState, bus: &mut Bus, operand: Operand) -> u8 {
    match operand {
        Operand::Address(addr) => bus.read(addr),
        Operand::Accumulator => cpu.a,
        Operand::None => 0,
    }
}

#[inline]
pub(crate) fn store(cpu: &mut CpuState, bus: &mut Bus, operand: Operand, v: u8) {
    match operand {
        Operand::Address(addr) => bus.write(addr, v),
        Operand::Accumulator => cpu.a = v,
        Operand::None => {}
    }
}

/// Read, transform, write back.
pub(crate) fn modify(
    cpu: &mut CpuState,
    bus: &mut Bus,
    operand: Operand,
    f: impl FnOnce(&mut CpuState, u8) -> u8,
) -> u8 {
    let old = load(cpu, bus, operand);
    let new = f(cpu, old);
    store(cpu, bus, operand, new);
    new
}

pub(crate) fn adc(cpu: &mut CpuState, m: u8) {
    let a = cpu.a;
    let sum = a as u16 + m as u16 + cpu.carry() as u16;
    let r = sum as u8;
    cpu.set_flag(Status::CARRY, sum > 0xFF);
    cpu.set_flag(Status::OVERFLOW, (!(a ^ m) & (a ^ r)) & 0x80 != 0);
    cpu.a = r;
    cpu.update_zn(r);
}

/// A - M - (1 - C), which is ADC of the complement.
#[inline]
pub(crate) fn sbc(cpu: &mut CpuState, m: u8) {
    adc(cpu, !m);
}

pub(crate) fn compare(cpu: &mut CpuState, reg: u8, m: u8) {
    cpu.set_flag(Status::CARRY, reg >= m);
    cpu.update_zn(reg.wrapping_sub(m));
}

pub(crate) fn bit(cpu: &mut CpuState, m: u8) {
    cpu.set_flag(Status::ZERO, cpu.a & m == 0);
    cpu.set_flag(Status::NEGATIVE, m & 0x80 != 0);
    cpu.set_flag(Status::OVERFLOW, m & 0x40 != 0);
}

pub(crate) fn asl(cpu: &mut CpuState, v: u8) -> u8 {
    cpu.set_flag(Status::CARRY, v & 0x80 != 0);
    let r = v << 1;
    cpu.update_zn(r);
    r
}

pub(crate) fn lsr(cpu: &mut CpuState, v: u8) -> u8 {
    cpu.set_flag(Status::CARRY, v & 0x01 != 0);
    let r = v >> 1;
    cpu.update_zn(r);
    r
}

pub(crate) fn rol(cpu: &mut CpuState, v: u8) -> u8 {
    let r = (v << 1) | cpu.carry();
    cpu.set_flag(Status::CARRY, v & 0x80 != 0);
    cpu.update_zn(r);
    r
}

pub(crate) fn ror(cpu: &mut CpuState, v: u8) -> u8 {
    let r = (v >> 1) | (cpu.carry() << 7);
    cpu.set_flag(Status::CARRY, v & 0x01 != 0);
    cpu.update_zn(r);
    r
}

pub(crate) fn inc(cpu: &mut CpuState, v: u8) -> u8 {
    let r = v.wrapping_add(1);
    cpu.update_zn(r);
    r
}

pub(crate) fn dec(cpu: &mut CpuState, v: u8) -> u8 {
    let r = v.wrapping_sub(1);
    cpu.update_zn(r);
    r
}
