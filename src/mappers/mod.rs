/*
Module: mappers

Declares the bank-switching boards beyond NROM (which lives next to the trait in
`crate::mapper`) and re-exports their types.

Implemented:
- MMC1 (Mapper 1)
- UxROM (Mapper 2)
- CNROM (Mapper 3)
- MMC3 (Mapper 4), including the A12 scanline IRQ
- AxROM (Mapper 7)
*/

pub mod axrom;
pub mod cnrom;
pub mod mmc1;
pub mod mmc3;
pub mod uxrom;

pub use axrom::Axrom;
pub use cnrom::Cnrom;
pub use mmc1::Mmc1;
pub use mmc3::Mmc3;
pub use uxrom::Uxrom;
