/*!
table.rs - 256-entry opcode table.

Each slot records the mnemonic, addressing mode, base cycle count and whether the opcode is
part of the documented set. Instruction length follows from the addressing mode. Penalty
cycles (page crossing, taken branches) are added at dispatch time, not stored here.

Undocumented slots carry their conventional mnemonic (`ISC` traces as `ISB`, matching common
test logs). The twelve JAM slots are two-cycle stubs.
*/

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddrMode {
    /// Implied.
    Imp,
    /// Accumulator.
    Acc,
    /// #imm
    Imm,
    /// zp
    Zp0,
    /// zp,X
    Zpx,
    /// zp,Y
    Zpy,
    /// abs
    Abs,
    /// abs,X
    Abx,
    /// abs,Y
    Aby,
    /// (abs), JMP only
    Ind,
    /// (zp,X)
    Izx,
    /// (zp),Y
    Izy,
    /// Signed branch offset.
    Rel,
}

impl AddrMode {
    /// Instruction length in bytes, opcode included.
    pub const fn len(self) -> u16 {
        match self {
            AddrMode::Imp | AddrMode::Acc => 1,
            AddrMode::Imm
            | AddrMode::Zp0
            | AddrMode::Zpx
            | AddrMode::Zpy
            | AddrMode::Izx
            | AddrMode::Izy
            | AddrMode::Rel => 2,
            AddrMode::Abs | AddrMode::Abx | AddrMode::Aby | AddrMode::Ind => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    // Documented
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    // Undocumented, stable
    Slo, Rla, Sre, Rra, Sax, Lax, Dcp, Isc, Anc, Alr, Arr, Sbx, Las,
    // Undocumented, unstable or locking
    Ane, Lxa, Sha, Shx, Shy, Tas, Jam,
}

impl Mnemonic {
    pub const fn name(self) -> &'static str {
        use Mnemonic::*;
        match self {
            Adc => "ADC", And => "AND", Asl => "ASL", Bcc => "BCC", Bcs => "BCS",
            Beq => "BEQ", Bit => "BIT", Bmi => "BMI", Bne => "BNE", Bpl => "BPL",
            Brk => "BRK", Bvc => "BVC", Bvs => "BVS", Clc => "CLC", Cld => "CLD",
            Cli => "CLI", Clv => "CLV", Cmp => "CMP", Cpx => "CPX", Cpy => "CPY",
            Dec => "DEC", Dex => "DEX", Dey => "DEY", Eor => "EOR", Inc => "INC",
            Inx => "INX", Iny => "INY", Jmp => "JMP", Jsr => "JSR", Lda => "LDA",
            Ldx => "LDX", Ldy => "LDY", Lsr => "LSR", Nop => "NOP", Ora => "ORA",
            Pha => "PHA", Php => "PHP", Pla => "PLA", Plp => "PLP", Rol => "ROL",
            Ror => "ROR", Rti => "RTI", Rts => "RTS", Sbc => "SBC", Sec => "SEC",
            Sed => "SED", Sei => "SEI", Sta => "STA", Stx => "STX", Sty => "STY",
            Tax => "TAX", Tay => "TAY", Tsx => "TSX", Txa => "TXA", Txs => "TXS",
            Tya => "TYA", Slo => "SLO", Rla => "RLA", Sre => "SRE", Rra => "RRA",
            Sax => "SAX", Lax => "LAX", Dcp => "DCP", Isc => "ISB", Anc => "ANC",
            Alr => "ALR", Arr => "ARR", Sbx => "SBX", Las => "LAS", Ane => "ANE",
            Lxa => "LXA", Sha => "SHA", Shx => "SHX", Shy => "SHY", Tas => "TAS",
            Jam => "JAM",
        }
    }

    /// Unstable opcodes and JAM: executed as stubs that only burn cycles.
    pub const fn is_stub(self) -> bool {
        matches!(
            self,
            Mnemonic::Ane
                | Mnemonic::Lxa
                | Mnemonic::Sha
                | Mnemonic::Shx
                | Mnemonic::Shy
                | Mnemonic::Tas
                | Mnemonic::Jam
        )
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub mnemonic: Mnemonic,
    pub mode: AddrMode,
    pub cycles: u8,
    pub legal: bool,
}

impl Opcode {
    #[inline]
    pub const fn len(&self) -> u16 {
        self.mode.len()
    }
}

macro_rules! op {
    ($m:ident, $mode:ident, $cycles:expr) => {
        Opcode {
            mnemonic: Mnemonic::$m,
            mode: AddrMode::$mode,
            cycles: $cycles,
            legal: true,
        }
    };
}

macro_rules! ill {
    ($m:ident, $mode:ident, $cycles:expr) => {
        Opcode {
            mnemonic: Mnemonic::$m,
            mode: AddrMode::$mode,
            cycles: $cycles,
            legal: false,
        }
    };
}

#[inline]
pub fn lookup(opcode: u8) -> &'static Opcode {
    &OPCODES[opcode as usize]
}

#[rustfmt::skip]
pub static OPCODES: [Opcode; 256] = [
    /* 00 */ op!(Brk, Imp, 7),
    /* 01 */ op!(Ora, Izx, 6),
    /* 02 */ ill!(Jam, Imp, 2),
    /* 03 */ ill!(Slo, Izx, 8),
    /* 04 */ ill!(Nop, Zp0, 3),
    /* 05 */ op!(Ora, Zp0, 3),
    /* 06 */ op!(Asl, Zp0, 5),
    /* 07 */ ill!(Slo, Zp0, 5),
    /* 08 */ op!(Php, Imp, 3),
    /* 09 */ op!(Ora, Imm, 2),
    /* 0A */ op!(Asl, Acc, 2),
    /* 0B */ ill!(Anc, Imm, 2),
    /* 0C */ ill!(Nop, Abs, 4),
    /* 0D */ op!(Ora, Abs, 4),
    /* 0E */ op!(Asl, Abs, 6),
    /* 0F */ ill!(Slo, Abs, 6),
    /* 10 */ op!(Bpl, Rel, 2),
    /* 11 */ op!(Ora, Izy, 5),
    /* 12 */ ill!(Jam, Imp, 2),
    /* 13 */ ill!(Slo, Izy, 8),
    /* 14 */ ill!(Nop, Zpx, 4),
    /* 15 */ op!(Ora, Zpx, 4),
    /* 16 */ op!(Asl, Zpx, 6),
    /* 17 */ ill!(Slo, Zpx, 6),
    /* 18 */ op!(Clc, Imp, 2),
    /* 19 */ op!(Ora, Aby, 4),
    /* 1A */ ill!(Nop, Imp, 2),
    /* 1B */ ill!(Slo, Aby, 7),
    /* 1C */ ill!(Nop, Abx, 4),
    /* 1D */ op!(Ora, Abx, 4),
    /* 1E */ op!(Asl, Abx, 7),
    /* 1F */ ill!(Slo, Abx, 7),
    /* 20 */ op!(Jsr, Abs, 6),
    /* 21 */ op!(And, Izx, 6),
    /* 22 */ ill!(Jam, Imp, 2),
    /* 23 */ ill!(Rla, Izx, 8),
    /* 24 */ op!(Bit, Zp0, 3),
    /* 25 */ op!(And, Zp0, 3),
    /* 26 */ op!(Rol, Zp0, 5),
    /* 27 */ ill!(Rla, Zp0, 5),
    /* 28 */ op!(Plp, Imp, 4),
    /* 29 */ op!(And, Imm, 2),
    /* 2A */ op!(Rol, Acc, 2),
    /* 2B */ ill!(Anc, Imm, 2),
    /* 2C */ op!(Bit, Abs, 4),
    /* 2D */ op!(And, Abs, 4),
    /* 2E */ op!(Rol, Abs, 6),
    /* 2F */ ill!(Rla, Abs, 6),
    /* 30 */ op!(Bmi, Rel, 2),
    /* 31 */ op!(And, Izy, 5),
    /* 32 */ ill!(Jam, Imp, 2),
    /* 33 */ ill!(Rla, Izy, 8),
    /* 34 */ ill!(Nop, Zpx, 4),
    /* 35 */ op!(And, Zpx, 4),
    /* 36 */ op!(Rol, Zpx, 6),
    /* 37 */ ill!(Rla, Zpx, 6),
    /* 38 */ op!(Sec, Imp, 2),
    /* 39 */ op!(And, Aby, 4),
    /* 3A */ ill!(Nop, Imp, 2),
    /* 3B */ ill!(Rla, Aby, 7),
    /* 3C */ ill!(Nop, Abx, 4),
    /* 3D */ op!(And, Abx, 4),
    /* 3E */ op!(Rol, Abx, 7),
    /* 3F */ ill!(Rla, Abx, 7),
    /* 40 */ op!(Rti, Imp, 6),
    /* 41 */ op!(Eor, Izx, 6),
    /* 42 */ ill!(Jam, Imp, 2),
    /* 43 */ ill!(Sre, Izx, 8),
    /* 44 */ ill!(Nop, Zp0, 3),
    /* 45 */ op!(Eor, Zp0, 3),
    /* 46 */ op!(Lsr, Zp0, 5),
    /* 47 */ ill!(Sre, Zp0, 5),
    /* 48 */ op!(Pha, Imp, 3),
    /* 49 */ op!(Eor, Imm, 2),
    /* 4A */ op!(Lsr, Acc, 2),
    /* 4B */ ill!(Alr, Imm, 2),
    /* 4C */ op!(Jmp, Abs, 3),
    /* 4D */ op!(Eor, Abs, 4),
    /* 4E */ op!(Lsr, Abs, 6),
    /* 4F */ ill!(Sre, Abs, 6),
    /* 50 */ op!(Bvc, Rel, 2),
    /* 51 */ op!(Eor, Izy, 5),
    /* 52 */ ill!(Jam, Imp, 2),
    /* 53 */ ill!(Sre, Izy, 8),
    /* 54 */ ill!(Nop, Zpx, 4),
    /* 55 */ op!(Eor, Zpx, 4),
    /* 56 */ op!(Lsr, Zpx, 6),
    /* 57 */ ill!(Sre, Zpx, 6),
    /* 58 */ op!(Cli, Imp, 2),
    /* 59 */ op!(Eor, Aby, 4),
    /* 5A */ ill!(Nop, Imp, 2),
    /* 5B */ ill!(Sre, Aby, 7),
    /* 5C */ ill!(Nop, Abx, 4),
    /* 5D */ op!(Eor, Abx, 4),
    /* 5E */ op!(Lsr, Abx, 7),
    /* 5F */ ill!(Sre, Abx, 7),
    /* 60 */ op!(Rts, Imp, 6),
    /* 61 */ op!(Adc, Izx, 6),
    /* 62 */ ill!(Jam, Imp, 2),
    /* 63 */ ill!(Rra, Izx, 8),
    /* 64 */ ill!(Nop, Zp0, 3),
    /* 65 */ op!(Adc, Zp0, 3),
    /* 66 */ op!(Ror, Zp0, 5),
    /* 67 */ ill!(Rra, Zp0, 5),
    /* 68 */ op!(Pla, Imp, 4),
    /* 69 */ op!(Adc, Imm, 2),
    /* 6A */ op!(Ror, Acc, 2),
    /* 6B */ ill!(Arr, Imm, 2),
    /* 6C */ op!(Jmp, Ind, 5),
    /* 6D */ op!(Adc, Abs, 4),
    /* 6E */ op!(Ror, Abs, 6),
    /* 6F */ ill!(Rra, Abs, 6),
    /* 70 */ op!(Bvs, Rel, 2),
    /* 71 */ op!(Adc, Izy, 5),
    /* 72 */ ill!(Jam, Imp, 2),
    /* 73 */ ill!(Rra, Izy, 8),
    /* 74 */ ill!(Nop, Zpx, 4),
    /* 75 */ op!(Adc, Zpx, 4),
    /* 76 */ op!(Ror, Zpx, 6),
    /* 77 */ ill!(Rra, Zpx, 6),
    /* 78 */ op!(Sei, Imp, 2),
    /* 79 */ op!(Adc, Aby, 4),
    /* 7A */ ill!(Nop, Imp, 2),
    /* 7B */ ill!(Rra, Aby, 7),
    /* 7C */ ill!(Nop, Abx, 4),
    /* 7D */ op!(Adc, Abx, 4),
    /* 7E */ op!(Ror, Abx, 7),
    /* 7F */ ill!(Rra, Abx, 7),
    /* 80 */ ill!(Nop, Imm, 2),
    /* 81 */ op!(Sta, Izx, 6),
    /* 82 */ ill!(Nop, Imm, 2),
    /* 83 */ ill!(Sax, Izx, 6),
    /* 84 */ op!(Sty, Zp0, 3),
    /* 85 */ op!(Sta, Zp0, 3),
    /* 86 */ op!(Stx, Zp0, 3),
    /* 87 */ ill!(Sax, Zp0, 3),
    /* 88 */ op!(Dey, Imp, 2),
    /* 89 */ ill!(Nop, Imm, 2),
    /* 8A */ op!(Txa, Imp, 2),
    /* 8B */ ill!(Ane, Imm, 2),
    /* 8C */ op!(Sty, Abs, 4),
    /* 8D */ op!(Sta, Abs, 4),
    /* 8E */ op!(Stx, Abs, 4),
    /* 8F */ ill!(Sax, Abs, 4),
    /* 90 */ op!(Bcc, Rel, 2),
    /* 91 */ op!(Sta, Izy, 6),
    /* 92 */ ill!(Jam, Imp, 2),
    /* 93 */ ill!(Sha, Izy, 6),
    /* 94 */ op!(Sty, Zpx, 4),
    /* 95 */ op!(Sta, Zpx, 4),
    /* 96 */ op!(Stx, Zpy, 4),
    /* 97 */ ill!(Sax, Zpy, 4),
    /* 98 */ op!(Tya, Imp, 2),
    /* 99 */ op!(Sta, Aby, 5),
    /* 9A */ op!(Txs, Imp, 2),
    /* 9B */ ill!(Tas, Aby, 5),
    /* 9C */ ill!(Shy, Abx, 5),
    /* 9D */ op!(Sta, Abx, 5),
    /* 9E */ ill!(Shx, Aby, 5),
    /* 9F */ ill!(Sha, Aby, 5),
    /* A0 */ op!(Ldy, Imm, 2),
    /* A1 */ op!(Lda, Izx, 6),
    /* A2 */ op!(Ldx, Imm, 2),
    /* A3 */ ill!(Lax, Izx, 6),
    /* A4 */ op!(Ldy, Zp0, 3),
    /* A5 */ op!(Lda, Zp0, 3),
    /* A6 */ op!(Ldx, Zp0, 3),
    /* A7 */ ill!(Lax, Zp0, 3),
    /* A8 */ op!(Tay, Imp, 2),
    /* A9 */ op!(Lda, Imm, 2),
    /* AA */ op!(Tax, Imp, 2),
    /* AB */ ill!(Lxa, Imm, 2),
    /* AC */ op!(Ldy, Abs, 4),
    /* AD */ op!(Lda, Abs, 4),
    /* AE */ op!(Ldx, Abs, 4),
    /* AF */ ill!(Lax, Abs, 4),
    /* B0 */ op!(Bcs, Rel, 2),
    /* B1 */ op!(Lda, Izy, 5),
    /* B2 */ ill!(Jam, Imp, 2),
    /* B3 */ ill!(Lax, Izy, 5),
    /* B4 */ op!(Ldy, Zpx, 4),
    /* B5 */ op!(Lda, Zpx, 4),
    /* B6 */ op!(Ldx, Zpy, 4),
    /* B7 */ ill!(Lax, Zpy, 4),
    /* B8 */ op!(Clv, Imp, 2),
    /* B9 */ op!(Lda, Aby, 4),
    /* BA */ op!(Tsx, Imp, 2),
    /* BB */ ill!(Las, Aby, 4),
    /* BC */ op!(Ldy, Abx, 4),
    /* BD */ op!(Lda, Abx, 4),
    /* BE */ op!(Ldx, Aby, 4),
    /* BF */ ill!(Lax, Aby, 4),
    /* C0 */ op!(Cpy, Imm, 2),
    /* C1 */ op!(Cmp, Izx, 6),
    /* C2 */ ill!(Nop, Imm, 2),
    /* C3 */ ill!(Dcp, Izx, 8),
    /* C4 */ op!(Cpy, Zp0, 3),
    /* C5 */ op!(Cmp, Zp0, 3),
    /* C6 */ op!(Dec, Zp0, 5),
    /* C7 */ ill!(Dcp, Zp0, 5),
    /* C8 */ op!(Iny, Imp, 2),
    /* C9 */ op!(Cmp, Imm, 2),
    /* CA */ op!(Dex, Imp, 2),
    /* CB */ ill!(Sbx, Imm, 2),
    /* CC */ op!(Cpy, Abs, 4),
    /* CD */ op!(Cmp, Abs, 4),
    /* CE */ op!(Dec, Abs, 6),
    /* CF */ ill!(Dcp, Abs, 6),
    /* D0 */ op!(Bne, Rel, 2),
    /* D1 */ op!(Cmp, Izy, 5),
    /* D2 */ ill!(Jam, Imp, 2),
    /* D3 */ ill!(Dcp, Izy, 8),
    /* D4 */ ill!(Nop, Zpx, 4),
    /* D5 */ op!(Cmp, Zpx, 4),
    /* D6 */ op!(Dec, Zpx, 6),
    /* D7 */ ill!(Dcp, Zpx, 6),
    /* D8 */ op!(Cld, Imp, 2),
    /* D9 */ op!(Cmp, Aby, 4),
    /* DA */ ill!(Nop, Imp, 2),
    /* DB */ ill!(Dcp, Aby, 7),
    /* DC */ ill!(Nop, Abx, 4),
    /* DD */ op!(Cmp, Abx, 4),
    /* DE */ op!(Dec, Abx, 7),
    /* DF */ ill!(Dcp, Abx, 7),
    /* E0 */ op!(Cpx, Imm, 2),
    /* E1 */ op!(Sbc, Izx, 6),
    /* E2 */ ill!(Nop, Imm, 2),
    /* E3 */ ill!(Isc, Izx, 8),
    /* E4 */ op!(Cpx, Zp0, 3),
    /* E5 */ op!(Sbc, Zp0, 3),
    /* E6 */ op!(Inc, Zp0, 5),
    /* E7 */ ill!(Isc, Zp0, 5),
    /* E8 */ op!(Inx, Imp, 2),
    /* E9 */ op!(Sbc, Imm, 2),
    /* EA */ op!(Nop, Imp, 2),
    /* EB */ ill!(Sbc, Imm, 2),
    /* EC */ op!(Cpx, Abs, 4),
    /* ED */ op!(Sbc, Abs, 4),
    /* EE */ op!(Inc, Abs, 6),
    /* EF */ ill!(Isc, Abs, 6),
    /* F0 */ op!(Beq, Rel, 2),
    /* F1 */ op!(Sbc, Izy, 5),
    /* F2 */ ill!(Jam, Imp, 2),
    /* F3 */ ill!(Isc, Izy, 8),
    /* F4 */ ill!(Nop, Zpx, 4),
    /* F5 */ op!(Sbc, Zpx, 4),
    /* F6 */ op!(Inc, Zpx, 6),
    /* F7 */ ill!(Isc, Zpx, 6),
    /* F8 */ op!(Sed, Imp, 2),
    /* F9 */ op!(Sbc, Aby, 4),
    /* FA */ ill!(Nop, Imp, 2),
    /* FB */ ill!(Isc, Aby, 7),
    /* FC */ ill!(Nop, Abx, 4),
    /* FD */ op!(Sbc, Abx, 4),
    /* FE */ op!(Inc, Abx, 7),
    /* FF */ ill!(Isc, Abx, 7),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_count() {
        assert_eq!(OPCODES.iter().filter(|o| o.legal).count(), 151);
    }

    #[test]
    fn jam_slots() {
        let jams: Vec<usize> = (0..256)
            .filter(|&i| OPCODES[i].mnemonic == Mnemonic::Jam)
            .collect();
        assert_eq!(
            jams,
            vec![0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2]
        );
    }

    #[test]
    fn spot_checks() {
        assert_eq!(lookup(0x6C).mode, AddrMode::Ind);
        assert_eq!(lookup(0x6C).cycles, 5);
        assert_eq!(lookup(0x91).cycles, 6);
        assert_eq!(lookup(0xEB).mnemonic, Mnemonic::Sbc);
        assert!(!lookup(0xEB).legal);
        assert_eq!(lookup(0xE3).mnemonic.name(), "ISB");
        assert_eq!(lookup(0x20).len(), 3);
        assert_eq!(lookup(0x00).len(), 1);
    }
}
