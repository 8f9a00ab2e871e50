//! Host callbacks used by the disassembler.
//!
//! The decoder never touches memory or output directly. It asks the
//! caller for instruction words and hands back text and addresses,
//! the same split QEMU's `disassemble_info` makes between the decoder
//! and its `read_memory_func`/`print_address_func`/`fprintf_func`.

use std::fmt::{self, Write as _};
use std::io::{self, Write as _};

use tracing::debug;

use crate::error::DisasError;
use crate::symbols::SymbolMap;

/// Callbacks a disassembly routine needs from its host.
///
/// All three stay borrowed for the whole of a [`disasm`](crate::disasm)
/// call.
pub trait DisasmInterface {
    /// Fetch the 32-bit word at `addr`.
    fn read_word(&mut self, addr: u32) -> u32;

    /// Render a machine address, e.g. a branch target.
    fn print_addr(&mut self, addr: u32);

    /// Formatted output. Returns the number of bytes written.
    fn print(&mut self, args: fmt::Arguments<'_>) -> usize;
}

impl<T: DisasmInterface + ?Sized> DisasmInterface for &mut T {
    fn read_word(&mut self, addr: u32) -> u32 {
        (**self).read_word(addr)
    }

    fn print_addr(&mut self, addr: u32) {
        (**self).print_addr(addr)
    }

    fn print(&mut self, args: fmt::Arguments<'_>) -> usize {
        (**self).print(args)
    }
}

// ================================================================
// Image-backed interface
// ================================================================

/// Interface over a little-endian byte image mapped at `base`.
///
/// Output accumulates in an owned buffer. Reads outside the image
/// yield `0` and record a fault, retrievable with
/// [`take_fault`](Self::take_fault); only the first fault is kept.
pub struct ImageInterface<'a> {
    base: u32,
    image: &'a [u8],
    symbols: Option<&'a SymbolMap>,
    out: String,
    fault: Option<DisasError>,
}

impl<'a> ImageInterface<'a> {
    pub fn new(base: u32, image: &'a [u8]) -> Self {
        Self {
            base,
            image,
            symbols: None,
            out: String::new(),
            fault: None,
        }
    }

    /// Annotate printed addresses with `<symbol+0xoff>`.
    pub fn with_symbols(mut self, symbols: &'a SymbolMap) -> Self {
        self.symbols = Some(symbols);
        self
    }

    /// One past the last mapped address.
    pub fn end(&self) -> u64 {
        self.base as u64 + self.image.len() as u64
    }

    /// Whether a full word at `addr` lies inside the image.
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.base && addr as u64 + 4 <= self.end()
    }

    pub fn output(&self) -> &str {
        &self.out
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.out)
    }

    pub fn take_fault(&mut self) -> Option<DisasError> {
        self.fault.take()
    }

    fn record_fault(&mut self, err: DisasError) {
        debug!("{err}");
        if self.fault.is_none() {
            self.fault = Some(err);
        }
    }
}

impl DisasmInterface for ImageInterface<'_> {
    fn read_word(&mut self, addr: u32) -> u32 {
        if addr & 3 != 0 {
            self.record_fault(DisasError::Unaligned { address: addr });
            return 0;
        }
        if !self.contains(addr) {
            self.record_fault(DisasError::OutOfBounds { address: addr });
            return 0;
        }
        let off = (addr - self.base) as usize;
        let b = &self.image[off..off + 4];
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    fn print_addr(&mut self, addr: u32) {
        let _ = write!(self.out, "0x{addr:08x}");
        if let Some((name, off)) = self.symbols.and_then(|s| s.lookup(addr)) {
            let _ = if off == 0 {
                write!(self.out, " <{name}>")
            } else {
                write!(self.out, " <{name}+0x{off:x}>")
            };
        }
    }

    fn print(&mut self, args: fmt::Arguments<'_>) -> usize {
        let before = self.out.len();
        let _ = self.out.write_fmt(args);
        self.out.len() - before
    }
}

// ================================================================
// Live-memory interface
// ================================================================

/// Interface over the current address space, printing to stdout.
pub struct HostInterface {
    _priv: (),
}

impl HostInterface {
    /// # Safety
    ///
    /// Every address the decoder is pointed at must be a readable,
    /// 4-byte aligned location in this process for as long as the
    /// interface is used.
    pub unsafe fn new() -> Self {
        Self { _priv: () }
    }
}

impl DisasmInterface for HostInterface {
    fn read_word(&mut self, addr: u32) -> u32 {
        // SAFETY: upheld by the caller of `HostInterface::new`.
        unsafe { (addr as usize as *const u32).read_volatile() }
    }

    fn print_addr(&mut self, addr: u32) {
        self.print(format_args!("0x{addr:08x}"));
    }

    fn print(&mut self, args: fmt::Arguments<'_>) -> usize {
        let text = fmt::format(args);
        let mut out = io::stdout().lock();
        match out.write_all(text.as_bytes()) {
            Ok(()) => text.len(),
            Err(e) => {
                debug!("stdout write failed: {e}");
                0
            }
        }
    }
}
