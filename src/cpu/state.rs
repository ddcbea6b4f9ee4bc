/*!
state.rs - 6502 architectural state (registers + status flags).

`CpuState` holds only what an instruction can observe or change: A, X, Y, S, PC and P.
Timing, interrupt latches and the tracer live on `Cpu` in `core.rs`.

Status register layout
======================
Bit: 7 6 5 4 3 2 1 0
     N V 1 B D I Z C

B and bit 5 only exist in the pushed copy of P. PHP and BRK push B=1; NMI and IRQ push B=0.
PLP and RTI ignore B on the way back in and keep bit 5 set.
*/

use bitflags::bitflags;

use crate::bus::Bus;

/// Base address of the hardware stack page.
pub const STACK_PAGE: u16 = 0x0100;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        const CARRY = 0b0000_0001;
        const ZERO = 0b0000_0010;
        const IRQ_DISABLE = 0b0000_0100;
        const DECIMAL = 0b0000_1000;
        const BREAK = 0b0001_0000;
        const UNUSED = 0b0010_0000;
        const OVERFLOW = 0b0100_0000;
        const NEGATIVE = 0b1000_0000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: Status,
}

impl Default for CpuState {
    fn default() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            status: Status::IRQ_DISABLE | Status::UNUSED | Status::BREAK,
        }
    }
}

impl CpuState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn flag(&self, f: Status) -> bool {
        self.status.contains(f)
    }

    #[inline]
    pub fn set_flag(&mut self, f: Status, on: bool) {
        self.status.set(f, on);
    }

    /// Set N and Z from `v`.
    #[inline]
    pub fn update_zn(&mut self, v: u8) {
        self.status.set(Status::ZERO, v == 0);
        self.status.set(Status::NEGATIVE, v & 0x80 != 0);
    }

    #[inline]
    pub fn carry(&self) -> u8 {
        u8::from(self.flag(Status::CARRY))
    }

    /// P as pushed by PHP/BRK (`brk = true`) or by NMI/IRQ.
    #[inline]
    pub fn pushed_status(&self, brk: bool) -> u8 {
        let mut p = self.status | Status::UNUSED;
        p.set(Status::BREAK, brk);
        p.bits()
    }

    /// Restore P from a stacked byte (PLP/RTI).
    #[inline]
    pub fn restore_status(&mut self, v: u8) {
        self.status = (Status::from_bits_retain(v) - Status::BREAK) | Status::UNUSED;
    }

    // ---------------------------------------------------------------------
    // Stack
    // ---------------------------------------------------------------------

    pub fn push(&mut self, bus: &mut Bus, v: u8) {
        bus.write(STACK_PAGE | self.sp as u16, v);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub fn pull(&mut self, bus: &mut Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(STACK_PAGE | self.sp as u16)
    }

    /// Push high byte then low byte.
    pub fn push_word(&mut self, bus: &mut Bus, v: u16) {
        self.push(bus, (v >> 8) as u8);
        self.push(bus, v as u8);
    }

    pub fn pull_word(&mut self, bus: &mut Bus) -> u16 {
        let lo = self.pull(bus) as u16;
        let hi = self.pull(bus) as u16;
        (hi << 8) | lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn reset_defaults() {
        let s = CpuState::new();
        assert_eq!(s.sp, 0xFD);
        assert_eq!(s.status.bits(), 0x34);
    }

    #[test]
    fn pushed_status_sets_bit5_and_break_as_requested() {
        let mut s = CpuState::new();
        s.status = Status::CARRY;
        assert_eq!(s.pushed_status(true), 0x31);
        assert_eq!(s.pushed_status(false), 0x21);
    }

    #[test]
    fn restore_status_ignores_break() {
        let mut s = CpuState::new();
        s.restore_status(0xFF);
        assert_eq!(s.status.bits(), 0xEF);
        s.restore_status(0x00);
        assert_eq!(s.status.bits(), 0x20);
    }

    #[test]
    fn stack_wraps_within_page_one() {
        let mut bus = Bus::new();
        let mut s = CpuState::new();
        s.sp = 0x00;
        s.push(&mut bus, 0xAB);
        assert_eq!(s.sp, 0xFF);
        assert_eq!(bus.peek(0x0100), 0xAB);
        assert_eq!(s.pull(&mut bus), 0xAB);
        assert_eq!(s.sp, 0x00);
    }

    quickcheck! {
        fn pull_returns_what_was_pushed(values: Vec<u8>, sp: u8) -> bool {
            let mut bus = Bus::new();
            let mut s = CpuState::new();
            s.sp = sp;
            let values: Vec<u8> = values.into_iter().take(256).collect();
            for &v in &values {
                s.push(&mut bus, v);
            }
            let pulled: Vec<u8> = (0..values.len()).map(|_| s.pull(&mut bus)).collect();
            pulled.into_iter().eq(values.into_iter().rev()) && s.sp == sp
        }

        fn word_roundtrip(v: u16, sp: u8) -> bool {
            let mut bus = Bus::new();
            let mut s = CpuState::new();
            s.sp = sp;
            s.push_word(&mut bus, v);
            s.pull_word(&mut bus) == v && s.sp == sp
        }
    }
}
