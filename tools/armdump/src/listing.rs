//! Flat image construction and listing output.

use std::io::Write;

use anyhow::{bail, Context, Result};
use arm_disas::{disasm, ImageInterface, SymbolMap, INSN_SIZE};
use tracing::{debug, warn};

use crate::elf::{ElfInfo, Symbol, MAX_SEGMENT_SIZE};

/// Executable segments flattened into one buffer at `base`.
pub struct Image {
    pub base: u32,
    pub data: Vec<u8>,
}

impl Image {
    pub fn end(&self) -> u64 {
        self.base as u64 + self.data.len() as u64
    }

    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.base && addr as u64 + INSN_SIZE as u64 <= self.end()
    }
}

/// Build a flat image from the executable segments; gaps are zero.
pub fn build_image(info: &ElfInfo) -> Result<Image> {
    let exec_segs: Vec<_> =
        info.segments.iter().filter(|s| s.executable).collect();
    let Some(lo) = exec_segs.iter().map(|s| s.vaddr).min() else {
        bail!("no executable segments found");
    };
    let hi = exec_segs
        .iter()
        .map(|s| s.vaddr as u64 + s.data.len() as u64)
        .max()
        .unwrap_or(lo as u64);

    let span = hi - lo as u64;
    if span > 4 * MAX_SEGMENT_SIZE as u64 {
        bail!("executable segments span {span:#x} bytes");
    }
    let size = span as usize;
    let mut data = vec![0u8; size];
    for seg in &exec_segs {
        let off = (seg.vaddr - lo) as usize;
        data[off..off + seg.data.len()].copy_from_slice(&seg.data);
    }
    debug!("image {lo:#010x}..{hi:#010x}, {} segment(s)", exec_segs.len());
    Ok(Image { base: lo, data })
}

/// Symbol map used to annotate addresses and start sections.
pub fn symbol_map(symbols: &[Symbol]) -> SymbolMap {
    let mut map = SymbolMap::new();
    for s in symbols {
        map.insert_sized(s.addr, s.size, s.name.as_str());
    }
    map
}

/// Where to begin: explicit address, then named symbol, then entry.
pub fn resolve_start(
    info: &ElfInfo,
    start: Option<u32>,
    symbol: Option<&str>,
) -> Result<u32> {
    let addr = match (start, symbol) {
        (Some(addr), _) => addr,
        (None, Some(name)) => {
            let sym = info
                .symbols
                .iter()
                .find(|s| s.name == name)
                .with_context(|| format!("symbol not found: {name}"))?;
            if sym.thumb {
                bail!("{name} is Thumb code; only A32 is supported");
            }
            sym.addr
        }
        (None, None) => {
            if info.entry & 1 != 0 {
                bail!(
                    "entry point {:#010x} is Thumb code; use --start",
                    info.entry
                );
            }
            info.entry
        }
    };
    if addr % INSN_SIZE != 0 {
        bail!("start address {addr:#010x} is not word aligned");
    }
    Ok(addr)
}

/// Write up to `count` instructions starting at `start`.
///
/// Each line is `addr:<tab>text`; a `<name>:` header precedes any
/// instruction where a symbol begins. Returns the number of
/// instructions written.
pub fn write_listing<W: Write + ?Sized>(
    w: &mut W,
    image: &Image,
    symbols: Option<&SymbolMap>,
    start: u32,
    count: usize,
    raw: bool,
) -> Result<usize> {
    let mut di = ImageInterface::new(image.base, &image.data);
    if let Some(symbols) = symbols {
        di = di.with_symbols(symbols);
    }

    let mut loc = start;
    let mut n = 0;
    while n < count && image.contains(loc) {
        if let Some(name) = symbols.and_then(|s| s.get(loc)) {
            if n > 0 {
                writeln!(w)?;
            }
            writeln!(w, "<{name}>:")?;
        }
        let next = disasm(&mut di, loc, raw);
        if let Some(err) = di.take_fault() {
            warn!("{err}");
            break;
        }
        write!(w, "{loc:8x}:\t{}", di.take_output())
            .context("write failed")?;
        n += 1;
        if next <= loc {
            // Wrapped past the top of the address space.
            break;
        }
        loc = next;
    }
    Ok(n)
}
