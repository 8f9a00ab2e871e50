//! ARM disassembler.
//!
//! Decodes 32-bit A32 instruction words into assembly text. The
//! decoder does no I/O of its own: every word it reads and every
//! character it prints goes through a [`DisasmInterface`] supplied by
//! the caller, so the same engine serves a debugger reading live
//! memory, a static ELF dump, or a C host through the [`ffi`] table.

pub mod arm;
pub mod error;
pub mod ffi;
pub mod interface;
pub mod symbols;

pub use arm::{
    disasm, disassemble, disassemble_range, print_insn_arm, INSN_SIZE,
};
pub use error::DisasError;
pub use interface::{DisasmInterface, HostInterface, ImageInterface};
pub use symbols::SymbolMap;
