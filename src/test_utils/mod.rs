//! iNES image builders shared by the unit tests.
//!
//! Header layout used by every builder:
//! - bytes[0..4] = b"NES\x1A"
//! - byte 4 = PRG ROM size in 16 KiB units
//! - byte 5 = CHR ROM size in 8 KiB units (0 => the loader allocates 8 KiB CHR RAM)
//! - byte 6 = mirroring (bit 0), battery (bit 1), trainer (bit 2), four-screen (bit 3),
//!   mapper low nibble (bits 4..7)
//! - byte 7 = mapper high nibble (bits 4..7)
//! - bytes 8..15 = zero
//!
//! PRG banks are filled with their own bank index so bank-switching tests can tell
//! which 16 KiB (or 8 KiB, see `build_mapper_rom`) window a read landed in.

#![allow(dead_code)]

use crate::cartridge::Cartridge;

pub const PRG_BANK: usize = 16 * 1024;
pub const CHR_BANK: usize = 8 * 1024;

/// Build an iNES image with `prg_16k` PRG units, `chr_8k` CHR units and raw flag bytes.
///
/// PRG bytes are `0xAA` and CHR bytes are `0xCC` unless the caller patches them.
pub fn build_ines(
    prg_16k: usize,
    chr_8k: usize,
    flags6: u8,
    flags7: u8,
    trainer: Option<&[u8; 512]>,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(
        16 + trainer.map(|_| 512).unwrap_or(0) + prg_16k * PRG_BANK + chr_8k * CHR_BANK,
    );

    bytes.extend_from_slice(b"NES\x1A");
    bytes.push(prg_16k as u8);
    bytes.push(chr_8k as u8);
    bytes.push(flags6);
    bytes.push(flags7);
    bytes.extend_from_slice(&[0u8; 8]);

    if let Some(t) = trainer {
        bytes.extend_from_slice(t);
    }
    bytes.extend(std::iter::repeat_n(0xAA, prg_16k * PRG_BANK));
    bytes.extend(std::iter::repeat_n(0xCC, chr_8k * CHR_BANK));
    bytes
}

/// Build an image for `mapper` where every 8 KiB PRG page starts with its page index
/// and every 1 KiB CHR page starts with its page index.
///
/// The last PRG page also carries RESET/NMI/IRQ vectors pointing at `$8000`.
pub fn build_mapper_rom(mapper: u8, prg_16k: usize, chr_8k: usize, mirroring_bit: u8) -> Vec<u8> {
    let flags6 = ((mapper & 0x0F) << 4) | (mirroring_bit & 1);
    let flags7 = mapper & 0xF0;
    let mut rom = build_ines(prg_16k, chr_8k, flags6, flags7, None);

    let prg_start = 16;
    let prg_len = prg_16k * PRG_BANK;
    for page in 0..(prg_len / 0x2000) {
        rom[prg_start + page * 0x2000] = page as u8;
    }
    let chr_start = prg_start + prg_len;
    for page in 0..(chr_8k * CHR_BANK / 0x400) {
        rom[chr_start + page * 0x400] = page as u8;
    }
    if prg_len > 0 {
        let last = &mut rom[prg_start + prg_len - 6..prg_start + prg_len];
        last.copy_from_slice(&[0x00, 0x80, 0x00, 0x80, 0x00, 0x80]);
    }
    rom
}

/// Build an NROM-128 image whose PRG begins with `prg` and whose vectors default to `$8000`.
///
/// `vectors` is `(reset, nmi, irq)`.
pub fn build_nrom_with_prg(prg: &[u8], chr_8k: usize, vectors: Option<(u16, u16, u16)>) -> Vec<u8> {
    assert!(prg.len() <= PRG_BANK, "program must fit within a 16 KiB PRG bank");

    let mut rom = build_ines(1, chr_8k, 0, 0, None);
    let prg_start = 16;
    rom[prg_start..prg_start + PRG_BANK].fill(0xEA);
    rom[prg_start..prg_start + prg.len()].copy_from_slice(prg);

    let (reset, nmi, irq) = vectors.unwrap_or((0x8000, 0x8000, 0x8000));
    set_vectors_in_prg(&mut rom[prg_start..prg_start + PRG_BANK], reset, nmi, irq);
    rom
}

/// Parse a program image straight into a cartridge.
pub fn nrom_cartridge(prg: &[u8]) -> Cartridge {
    let rom = build_nrom_with_prg(prg, 0, None);
    Cartridge::from_ines_bytes(&rom).expect("test image parses")
}

/// Write NMI/RESET/IRQ vectors into the tail of a 16 KiB or 32 KiB PRG slice.
pub fn set_vectors_in_prg(prg: &mut [u8], reset: u16, nmi: u16, irq: u16) {
    let base = match prg.len() {
        16384 => 0x3FFA,
        32768 => 0x7FFA,
        other => panic!("unsupported PRG length for vector placement: {other} bytes"),
    };
    write_le_u16(prg, base, nmi);
    write_le_u16(prg, base + 2, reset);
    write_le_u16(prg, base + 4, irq);
}

#[inline]
fn write_le_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_fields_round_out() {
        let rom = build_ines(2, 1, 0x01, 0x00, None);
        assert_eq!(&rom[0..4], b"NES\x1A");
        assert_eq!(rom[4], 2);
        assert_eq!(rom[5], 1);
        assert_eq!(rom[6], 0x01);
        assert_eq!(rom.len(), 16 + 2 * PRG_BANK + CHR_BANK);
    }

    #[test]
    fn vectors_land_at_bank_tail() {
        let mut prg = vec![0u8; 16 * 1024];
        set_vectors_in_prg(&mut prg, 0x8123, 0x8456, 0x8ABC);
        assert_eq!(&prg[0x3FFA..], &[0x56, 0x84, 0x23, 0x81, 0xBC, 0x8A]);

        let mut prg = vec![0u8; 32 * 1024];
        set_vectors_in_prg(&mut prg, 0x8123, 0x8456, 0x8ABC);
        assert_eq!(&prg[0x7FFA..], &[0x56, 0x84, 0x23, 0x81, 0xBC, 0x8A]);
    }

    #[test]
    fn mapper_rom_tags_pages() {
        let rom = build_mapper_rom(4, 2, 1, 0);
        assert_eq!(rom[6] >> 4, 4);
        assert_eq!(rom[16], 0);
        assert_eq!(rom[16 + 0x2000], 1);
        assert_eq!(rom[16 + 0x6000], 3);
        let chr = 16 + 2 * PRG_BANK;
        assert_eq!(rom[chr + 0x400 * 5], 5);
    }
}
