/*!
Cartridge: iNES (v1) loader, header metadata, content fingerprint and mapper construction.

Loading:
- Header bytes 0..4 must be `NES\x1A`.
- Byte 4 = PRG ROM size in 16 KiB units; byte 5 = CHR ROM size in 8 KiB units
  (0 => 8 KiB CHR RAM is allocated).
- Byte 6: bit 0 mirroring (0 horizontal, 1 vertical), bit 1 battery, bit 2 trainer,
  bit 3 four-screen, high nibble mapper low bits. Byte 7 high nibble = mapper high bits.
- A 512-byte trainer, when flagged, sits between the header and PRG and is skipped.

Every failure is a `LoadError`; nothing is half-constructed.
*/

use std::fmt;
use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::mapper::{CartridgeMemory, Mapper, Nrom};
use crate::mappers::{Axrom, Cnrom, Mmc1, Mmc3, Uxrom};

const HEADER_LEN: usize = 16;
const TRAINER_LEN: usize = 512;
const PRG_UNIT: usize = 16 * 1024;
const CHR_UNIT: usize = 8 * 1024;

/// Errors raised while turning an iNES image into a `Cartridge`.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read ROM file: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing iNES magic (expected NES<1A>)")]
    BadMagic,
    #[error("image truncated: header declares {expected} bytes, file has {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u16),
}

/// Nametable arrangement of the four logical 1 KiB pages at $2000/$2400/$2800/$2C00.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mirroring {
    /// $2000/$2400 share a page, $2800/$2C00 share the other.
    Horizontal,
    /// $2000/$2800 share a page, $2400/$2C00 share the other.
    Vertical,
    SingleScreenLower,
    SingleScreenUpper,
    /// Four distinct pages (cartridge supplies the extra 2 KiB).
    FourScreen,
}

impl Mirroring {
    /// Fold a PPU nametable address ($2000..=$3EFF) into a VRAM byte offset.
    pub fn vram_offset(self, addr: u16) -> usize {
        let a = (addr as usize) & 0x0FFF;
        let logical = a >> 10;
        let page = match self {
            Mirroring::Horizontal => logical >> 1,
            Mirroring::Vertical => logical & 1,
            Mirroring::SingleScreenLower => 0,
            Mirroring::SingleScreenUpper => 1,
            Mirroring::FourScreen => logical,
        };
        page * 0x400 + (a & 0x3FF)
    }
}

/// Fields decoded from the 16-byte iNES header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InesHeader {
    pub prg_banks: usize,
    pub chr_banks: usize,
    pub mapper_id: u16,
    pub vertical: bool,
    pub battery: bool,
    pub trainer: bool,
    pub four_screen: bool,
}

impl InesHeader {
    pub fn parse(data: &[u8]) -> Result<Self, LoadError> {
        if data.len() < HEADER_LEN || &data[0..4] != b"NES\x1A" {
            return Err(LoadError::BadMagic);
        }
        let flags6 = data[6];
        let flags7 = data[7];
        Ok(Self {
            prg_banks: data[4] as usize,
            chr_banks: data[5] as usize,
            mapper_id: ((flags7 & 0xF0) | (flags6 >> 4)) as u16,
            vertical: flags6 & 0x01 != 0,
            battery: flags6 & 0x02 != 0,
            trainer: flags6 & 0x04 != 0,
            four_screen: flags6 & 0x08 != 0,
        })
    }

    fn header_mirroring(&self) -> Mirroring {
        if self.vertical {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        }
    }
}

pub struct Cartridge {
    mapper: Box<dyn Mapper>,
    header: InesHeader,
    fingerprint: [u8; 16],
    prg_rom_len: usize,
    chr_len: usize,
    chr_is_ram: bool,
}

impl fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cartridge")
            .field("header", &self.header)
            .field("fingerprint", &self.fingerprint_hex())
            .field("prg_rom_len", &self.prg_rom_len)
            .field("chr_len", &self.chr_len)
            .field("chr_is_ram", &self.chr_is_ram)
            .field("mapper", &self.mapper.describe())
            .finish()
    }
}

impl Cartridge {
    /// Parse raw iNES bytes and construct the board named by the header.
    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, LoadError> {
        let header = InesHeader::parse(data)?;

        let mut offset = HEADER_LEN;
        if header.trainer {
            offset += TRAINER_LEN;
        }
        let prg_rom_len = header.prg_banks * PRG_UNIT;
        let chr_rom_len = header.chr_banks * CHR_UNIT;
        let expected = offset + prg_rom_len + chr_rom_len;
        if data.len() < expected {
            return Err(LoadError::Truncated {
                expected,
                actual: data.len(),
            });
        }

        let prg_rom = data[offset..offset + prg_rom_len].to_vec();
        offset += prg_rom_len;
        let chr_is_ram = header.chr_banks == 0;
        let chr = if chr_is_ram {
            vec![0; CHR_UNIT]
        } else {
            data[offset..offset + chr_rom_len].to_vec()
        };

        let fingerprint = fingerprint(&prg_rom, if chr_is_ram { &[] } else { &chr });
        let chr_len = chr.len();
        let mem = CartridgeMemory::new(prg_rom, chr, chr_is_ram);
        let mirroring = header.header_mirroring();

        let mapper: Box<dyn Mapper> = match header.mapper_id {
            0 => Box::new(Nrom::new(mem, mirroring)),
            1 => Box::new(Mmc1::new(mem)),
            2 => Box::new(Uxrom::new(mem, mirroring)),
            3 => Box::new(Cnrom::new(mem, mirroring)),
            4 => Box::new(Mmc3::new(mem, mirroring)),
            7 => Box::new(Axrom::new(mem)),
            other => {
                warn!(mapper = other, "unsupported mapper");
                return Err(LoadError::UnsupportedMapper(other));
            }
        };

        let cart = Self {
            mapper,
            header,
            fingerprint,
            prg_rom_len,
            chr_len,
            chr_is_ram,
        };
        debug!(
            mapper = cart.header.mapper_id,
            prg_kib = prg_rom_len / 1024,
            chr_kib = chr_len / 1024,
            chr_ram = chr_is_ram,
            mirroring = ?cart.mirroring(),
            fingerprint = %cart.fingerprint_hex(),
            "cartridge loaded"
        );
        Ok(cart)
    }

    /// Read an iNES file from disk.
    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let data = fs::read(path)?;
        Self::from_ines_bytes(&data)
    }

    pub fn header(&self) -> &InesHeader {
        &self.header
    }

    pub fn mapper_id(&self) -> u16 {
        self.header.mapper_id
    }

    pub fn has_battery(&self) -> bool {
        self.header.battery
    }

    pub fn has_trainer(&self) -> bool {
        self.header.trainer
    }

    pub fn prg_rom_len(&self) -> usize {
        self.prg_rom_len
    }

    pub fn chr_len(&self) -> usize {
        self.chr_len
    }

    pub fn chr_is_ram(&self) -> bool {
        self.chr_is_ram
    }

    /// 128-bit content hash over PRG and CHR ROM, used to pair save files with images.
    pub fn fingerprint(&self) -> [u8; 16] {
        self.fingerprint
    }

    pub fn fingerprint_hex(&self) -> String {
        self.fingerprint.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Effective nametable arrangement; a four-screen header overrides the board.
    pub fn mirroring(&self) -> Mirroring {
        if self.header.four_screen {
            Mirroring::FourScreen
        } else {
            self.mapper.mirroring()
        }
    }

    // -------------- Mapper delegation --------------

    #[inline]
    pub fn cpu_read(&self, addr: u16) -> Option<u8> {
        self.mapper.cpu_read(addr)
    }

    #[inline]
    pub fn cpu_write(&mut self, addr: u16, value: u8) -> bool {
        self.mapper.cpu_write(addr, value)
    }

    #[inline]
    pub fn ppu_read(&mut self, addr: u16) -> Option<u8> {
        self.mapper.ppu_read(addr)
    }

    #[inline]
    pub fn ppu_write(&mut self, addr: u16, value: u8) -> bool {
        self.mapper.ppu_write(addr, value)
    }

    #[inline]
    pub fn clock(&mut self) {
        self.mapper.clock();
    }

    #[inline]
    pub fn irq_pending(&self) -> bool {
        self.mapper.irq_pending()
    }

    pub fn reset(&mut self) {
        self.mapper.reset();
    }

    pub fn describe(&self) -> String {
        self.mapper.describe()
    }
}

/// FNV-1a, 128-bit variant.
fn fingerprint(prg: &[u8], chr: &[u8]) -> [u8; 16] {
    const OFFSET_BASIS: u128 = 0x6c62272e_07bb0142_62b82175_6295c58d;
    const PRIME: u128 = 0x00000000_01000000_00000000_0000013b;
    let hash = prg.iter().chain(chr).fold(OFFSET_BASIS, |h, &b| {
        (h ^ b as u128).wrapping_mul(PRIME)
    });
    hash.to_be_bytes()
}
