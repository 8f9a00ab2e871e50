//! arm-dump — static ELF32 → ARM assembly listing.

pub mod elf;
pub mod listing;
