//! Disassembly error types.

use thiserror::Error;

/// Error raised while fetching instruction words for the decoder.
///
/// The decoder itself never fails: any word it does not recognise is
/// rendered as `und`. Errors only come from the memory side of an
/// interface, e.g. a read outside the image being disassembled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisasError {
    /// Not enough bytes to hold a full instruction word.
    #[error("truncated instruction at {address:#010x}: need {needed} bytes, have {available}")]
    Truncated {
        address: u32,
        needed: usize,
        available: usize,
    },

    /// Word read outside the backing image.
    #[error("address {address:#010x} is outside the image")]
    OutOfBounds { address: u32 },

    /// Word read from an address that is not 4-byte aligned.
    #[error("unaligned instruction address {address:#010x}")]
    Unaligned { address: u32 },
}

impl DisasError {
    pub fn truncated(address: u32, needed: usize, available: usize) -> Self {
        Self::Truncated {
            address,
            needed,
            available,
        }
    }
}
