/*!
trace.rs - per-instruction trace records in the nestest log format.

```text
C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD PPU:  0, 21 CYC:7
```

Columns: PC, up to three instruction bytes, `*` for undocumented opcodes, the disassembly
padded to 32 columns, registers, PPU scanline/dot and the cumulative CPU cycle count.
Operand values are captured with `Bus::peek`, so recording a trace never disturbs the
machine.
*/

use std::fmt;

use crate::bus::Bus;
use crate::cpu::state::CpuState;
use crate::cpu::table::{AddrMode, Mnemonic, lookup};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine {
    pub pc: u16,
    pub bytes: [u8; 3],
    pub len: u8,
    pub mnemonic: Mnemonic,
    pub legal: bool,
    /// Rendered operand, e.g. `$10,X @ 1F = 00`.
    pub operand: String,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub p: u8,
    pub sp: u8,
    pub scanline: u16,
    pub dot: u16,
    pub cycles: u64,
}

impl TraceLine {
    /// Record the instruction at `cpu.pc` before it executes.
    pub fn capture(cpu: &CpuState, bus: &Bus, cycles: u64) -> Self {
        let pc = cpu.pc;
        let opcode = bus.peek(pc);
        let info = lookup(opcode);
        let len = info.len() as u8;
        let mut bytes = [opcode, 0, 0];
        for (i, b) in bytes.iter_mut().enumerate().take(len as usize).skip(1) {
            *b = bus.peek(pc.wrapping_add(i as u16));
        }
        let operand = render_operand(cpu, bus, info.mode, info.mnemonic, bytes);
        Self {
            pc,
            bytes,
            len,
            mnemonic: info.mnemonic,
            legal: info.legal,
            operand,
            a: cpu.a,
            x: cpu.x,
            y: cpu.y,
            p: cpu.status.bits(),
            sp: cpu.sp,
            scanline: bus.ppu().scanline(),
            dot: bus.ppu().dot(),
            cycles,
        }
    }

    pub fn disassembly(&self) -> String {
        if self.operand.is_empty() {
            self.mnemonic.name().to_string()
        } else {
            format!("{} {}", self.mnemonic.name(), self.operand)
        }
    }
}

fn render_operand(
    cpu: &CpuState,
    bus: &Bus,
    mode: AddrMode,
    mnemonic: Mnemonic,
    bytes: [u8; 3],
) -> String {
    let lo = bytes[1];
    let word = u16::from_le_bytes([bytes[1], bytes[2]]);
    match mode {
        AddrMode::Imp => String::new(),
        AddrMode::Acc => "A".to_string(),
        AddrMode::Imm => format!("#${lo:02X}"),
        AddrMode::Zp0 => format!("${lo:02X} = {:02X}", bus.peek(lo as u16)),
        AddrMode::Zpx => {
            let addr = lo.wrapping_add(cpu.x);
            format!("${lo:02X},X @ {addr:02X} = {:02X}", bus.peek(addr as u16))
        }
        AddrMode::Zpy => {
            let addr = lo.wrapping_add(cpu.y);
            format!("${lo:02X},Y @ {addr:02X} = {:02X}", bus.peek(addr as u16))
        }
        AddrMode::Abs => match mnemonic {
            Mnemonic::Jmp | Mnemonic::Jsr => format!("${word:04X}"),
            _ => format!("${word:04X} = {:02X}", bus.peek(word)),
        },
        AddrMode::Abx => {
            let addr = word.wrapping_add(cpu.x as u16);
            format!("${word:04X},X @ {addr:04X} = {:02X}", bus.peek(addr))
        }
        AddrMode::Aby => {
            let addr = word.wrapping_add(cpu.y as u16);
            format!("${word:04X},Y @ {addr:04X} = {:02X}", bus.peek(addr))
        }
        AddrMode::Ind => {
            let hi_addr = (word & 0xFF00) | (word.wrapping_add(1) & 0x00FF);
            let target = u16::from_le_bytes([bus.peek(word), bus.peek(hi_addr)]);
            format!("(${word:04X}) = {target:04X}")
        }
        AddrMode::Izx => {
            let ptr = lo.wrapping_add(cpu.x);
            let addr = zp_word(bus, ptr);
            format!(
                "(${lo:02X},X) @ {ptr:02X} = {addr:04X} = {:02X}",
                bus.peek(addr)
            )
        }
        AddrMode::Izy => {
            let base = zp_word(bus, lo);
            let addr = base.wrapping_add(cpu.y as u16);
            format!(
                "(${lo:02X}),Y = {base:04X} @ {addr:04X} = {:02X}",
                bus.peek(addr)
            )
        }
        AddrMode::Rel => {
            let target = cpu.pc.wrapping_add(2).wrapping_add(lo as i8 as i16 as u16);
            format!("${target:04X}")
        }
    }
}

fn zp_word(bus: &Bus, zp: u8) -> u16 {
    u16::from_le_bytes([bus.peek(zp as u16), bus.peek(zp.wrapping_add(1) as u16)])
}

impl fmt::Display for TraceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.bytes[..self.len as usize]
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        let marker = if self.legal { ' ' } else { '*' };
        write!(
            f,
            "{:04X}  {:<8} {}{:<32}A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} PPU:{:>3},{:>3} CYC:{}",
            self.pc,
            bytes,
            marker,
            self.disassembly(),
            self.a,
            self.x,
            self.y,
            self.p,
            self.sp,
            self.scanline,
            self.dot,
            self.cycles
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::nrom_cartridge;

    fn bus_with(program: &[u8]) -> Bus {
        let mut bus = Bus::new();
        bus.attach_cartridge(nrom_cartridge(program));
        bus
    }

    fn state_at(pc: u16) -> CpuState {
        CpuState {
            pc,
            status: crate::cpu::state::Status::from_bits_retain(0x24),
            ..CpuState::new()
        }
    }

    #[test]
    fn jmp_line_matches_log_layout() {
        let mut bus = bus_with(&[0x4C, 0xF5, 0xC5]);
        for _ in 0..21 {
            bus.clock_ppu();
        }
        let line = TraceLine::capture(&state_at(0x8000), &bus, 7);
        assert_eq!(
            line.to_string(),
            "8000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD PPU:  0, 21 CYC:7"
        );
    }

    #[test]
    fn undocumented_opcodes_get_a_star() {
        let mut bus = bus_with(&[0x04, 0xA9]);
        bus.write(0x00A9, 0x00);
        let line = TraceLine::capture(&state_at(0x8000), &bus, 0);
        let text = line.to_string();
        assert!(text.starts_with("8000  04 A9    *NOP $A9 = 00"), "{text}");
        assert_eq!(text.find("A:"), Some(48));
    }

    #[test]
    fn indirect_modes_render_intermediate_addresses() {
        let mut bus = bus_with(&[0xA1, 0x80, 0xB1, 0x89]);
        bus.write(0x0080, 0x00);
        bus.write(0x0081, 0x02);
        bus.write(0x0200, 0x5A);
        bus.write(0x0089, 0x00);
        bus.write(0x008A, 0x03);
        bus.write(0x0334, 0x11);
        let mut cpu = state_at(0x8000);
        let line = TraceLine::capture(&cpu, &bus, 0);
        assert_eq!(line.disassembly(), "LDA ($80,X) @ 80 = 0200 = 5A");
        cpu.pc = 0x8002;
        cpu.y = 0x34;
        let line = TraceLine::capture(&cpu, &bus, 0);
        assert_eq!(line.disassembly(), "LDA ($89),Y = 0300 @ 0334 = 11");
    }

    #[test]
    fn jmp_indirect_shows_the_wrapped_target() {
        let mut bus = bus_with(&[0x6C, 0xFF, 0x02]);
        bus.write(0x02FF, 0x00);
        bus.write(0x0200, 0xA9);
        let line = TraceLine::capture(&state_at(0x8000), &bus, 0);
        assert_eq!(line.disassembly(), "JMP ($02FF) = A900");
    }

    #[test]
    fn capture_leaves_ppu_status_alone() {
        let mut bus = bus_with(&[0xAD, 0x02, 0x20]);
        bus.ppu_mut()._test_set_position(241, 1);
        bus.clock_ppu();
        let line = TraceLine::capture(&state_at(0x8000), &bus, 0);
        assert!(line.operand.starts_with("$2002 = "));
        assert!(bus.peek(0x2002) & 0x80 != 0);
    }
}
