/*!
addressing.rs - effective address resolution.

`resolve` reads the operand bytes that follow the opcode (PC still points at the opcode) plus
any zero-page or absolute pointer, and returns where the instruction's data lives. It never
reads the effective address itself: handlers fetch the byte only when the instruction needs
it, so a store never performs a stray read of its target register.

Page crossing is reported for the indexed modes; whether it costs a cycle is decided by the
dispatcher from the opcode's base cost.
*/

use crate::bus::Bus;
use crate::cpu::state::CpuState;
use crate::cpu::table::AddrMode;

/// Where an instruction's data lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    None,
    Accumulator,
    Address(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub operand: Operand,
    pub page_crossed: bool,
}

impl Resolved {
    fn at(addr: u16) -> Self {
        Self {
            operand: Operand::Address(addr),
            page_crossed: false,
        }
    }

    fn indexed(base: u16, addr: u16) -> Self {
        Self {
            operand: Operand::Address(addr),
            page_crossed: (base & 0xFF00) != (addr & 0xFF00),
        }
    }
}

pub fn resolve(mode: AddrMode, cpu: &CpuState, bus: &mut Bus) -> Resolved {
    let pc = cpu.pc;
    let arg = pc.wrapping_add(1);
    match mode {
        AddrMode::Imp => Resolved {
            operand: Operand::None,
            page_crossed: false,
        },
        AddrMode::Acc => Resolved {
            operand: Operand::Accumulator,
            page_crossed: false,
        },
        AddrMode::Imm => Resolved::at(arg),
        AddrMode::Zp0 => Resolved::at(bus.read(arg) as u16),
        AddrMode::Zpx => Resolved::at(bus.read(arg).wrapping_add(cpu.x) as u16),
        AddrMode::Zpy => Resolved::at(bus.read(arg).wrapping_add(cpu.y) as u16),
        AddrMode::Abs => Resolved::at(bus.read_word(arg)),
        AddrMode::Abx => {
            let base = bus.read_word(arg);
            Resolved::indexed(base, base.wrapping_add(cpu.x as u16))
        }
        AddrMode::Aby => {
            let base = bus.read_word(arg);
            Resolved::indexed(base, base.wrapping_add(cpu.y as u16))
        }
        AddrMode::Ind => {
            let ptr = bus.read_word(arg);
            Resolved::at(read_word_page_wrapped(bus, ptr))
        }
        AddrMode::Izx => {
            let zp = bus.read(arg).wrapping_add(cpu.x);
            Resolved::at(read_word_zp(bus, zp))
        }
        AddrMode::Izy => {
            let zp = bus.read(arg);
            let base = read_word_zp(bus, zp);
            Resolved::indexed(base, base.wrapping_add(cpu.y as u16))
        }
        AddrMode::Rel => {
            let offset = bus.read(arg) as i8;
            let next = pc.wrapping_add(2);
            Resolved::at(next.wrapping_add(offset as i16 as u16))
        }
    }
}

/// Word from page zero; the high byte wraps to $00 after $FF.
pub(crate) fn read_word_zp(bus: &mut Bus, zp: u8) -> u16 {
    let lo = bus.read(zp as u16) as u16;
    let hi = bus.read(zp.wrapping_add(1) as u16) as u16;
    (hi << 8) | lo
}

/// JMP ($xxFF) fetches its high byte from $xx00.
pub(crate) fn read_word_page_wrapped(bus: &mut Bus, ptr: u16) -> u16 {
    let hi_addr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
    let lo = bus.read(ptr) as u16;
    let hi = bus.read(hi_addr) as u16;
    (hi << 8) | lo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::nrom_cartridge;

    fn setup(program: &[u8]) -> (CpuState, Bus) {
        let mut bus = Bus::new();
        bus.attach_cartridge(nrom_cartridge(program));
        let cpu = CpuState {
            pc: 0x8000,
            ..CpuState::new()
        };
        (cpu, bus)
    }

    #[test]
    fn zero_page_indexed_wraps() {
        let (mut cpu, mut bus) = setup(&[0xB5, 0xF0]);
        cpu.x = 0x20;
        assert_eq!(
            resolve(AddrMode::Zpx, &cpu, &mut bus).operand,
            Operand::Address(0x0010)
        );
    }

    #[test]
    fn absolute_x_reports_page_cross() {
        let (mut cpu, mut bus) = setup(&[0xBD, 0xF0, 0x12]);
        cpu.x = 0x0F;
        let r = resolve(AddrMode::Abx, &cpu, &mut bus);
        assert_eq!(r.operand, Operand::Address(0x12FF));
        assert!(!r.page_crossed);
        cpu.x = 0x10;
        let r = resolve(AddrMode::Abx, &cpu, &mut bus);
        assert_eq!(r.operand, Operand::Address(0x1300));
        assert!(r.page_crossed);
    }

    #[test]
    fn indirect_x_pointer_wraps_in_page_zero() {
        let (mut cpu, mut bus) = setup(&[0xA1, 0xFE]);
        cpu.x = 0x01;
        bus.write(0x00FF, 0x34);
        bus.write(0x0000, 0x12);
        assert_eq!(
            resolve(AddrMode::Izx, &cpu, &mut bus).operand,
            Operand::Address(0x1234)
        );
    }

    #[test]
    fn indirect_y_adds_after_dereference() {
        let (mut cpu, mut bus) = setup(&[0xB1, 0x10]);
        cpu.y = 0x01;
        bus.write(0x0010, 0xFF);
        bus.write(0x0011, 0x03);
        let r = resolve(AddrMode::Izy, &cpu, &mut bus);
        assert_eq!(r.operand, Operand::Address(0x0400));
        assert!(r.page_crossed);
    }

    #[test]
    fn jmp_indirect_page_bug() {
        let (cpu, mut bus) = setup(&[0x6C, 0xFF, 0x02]);
        bus.write(0x02FF, 0x00);
        bus.write(0x0200, 0x90);
        bus.write(0x0300, 0x40);
        assert_eq!(
            resolve(AddrMode::Ind, &cpu, &mut bus).operand,
            Operand::Address(0x9000)
        );
    }

    #[test]
    fn relative_targets_from_next_instruction() {
        let (cpu, mut bus) = setup(&[0xD0, 0xFC]);
        assert_eq!(
            resolve(AddrMode::Rel, &cpu, &mut bus).operand,
            Operand::Address(0x7FFE)
        );
        let (cpu, mut bus) = setup(&[0xD0, 0x05]);
        assert_eq!(
            resolve(AddrMode::Rel, &cpu, &mut bus).operand,
            Operand::Address(0x8007)
        );
    }

    #[test]
    fn resolve_does_not_touch_the_target() {
        // STA $2002 must not acknowledge vblank.
        let (cpu, mut bus) = setup(&[0x8D, 0x02, 0x20]);
        bus.ppu_mut()._test_set_position(241, 1);
        bus.clock_ppu();
        let _ = resolve(AddrMode::Abs, &cpu, &mut bus);
        assert!(bus.peek(0x2002) & 0x80 != 0);
    }
}
