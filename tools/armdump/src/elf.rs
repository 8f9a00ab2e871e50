//! Minimal ELF32 parser — entry point, PT_LOAD segments and the
//! static symbol table of a little-endian ARM image.

use thiserror::Error;

const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
const ELFCLASS32: u8 = 1;
const ELFDATA2LSB: u8 = 1;
const PT_LOAD: u32 = 1;
const PF_X: u32 = 1;
const SHT_SYMTAB: u32 = 2;
const SHN_UNDEF: u16 = 0;
const STT_OBJECT: u8 = 1;
const STT_FUNC: u8 = 2;

pub const EM_ARM: u16 = 40;

const EHDR_SIZE: usize = 52;
const PHDR_SIZE: usize = 32;
const SHDR_SIZE: usize = 40;
const SYM_SIZE: usize = 16;

/// Largest zero-filled executable segment accepted.
pub const MAX_SEGMENT_SIZE: u32 = 64 << 20;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ElfError {
    #[error("file too small for ELF header")]
    TooSmall,
    #[error("not an ELF file")]
    BadMagic,
    #[error("not a 32-bit ELF")]
    NotElf32,
    #[error("not a little-endian ELF")]
    NotLittleEndian,
    #[error("{what} out of bounds")]
    OutOfBounds { what: &'static str },
    #[error("segment at {vaddr:#010x} too large ({size:#x} bytes)")]
    SegmentTooLarge { vaddr: u32, size: u32 },
}

/// A loaded ELF segment.
pub struct Segment {
    pub vaddr: u32,
    pub data: Vec<u8>,
    pub executable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Object,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    /// Address with the Thumb bit cleared.
    pub addr: u32,
    pub size: u32,
    pub kind: SymbolKind,
    pub thumb: bool,
}

/// Parsed ELF information.
pub struct ElfInfo {
    pub entry: u32,
    pub e_machine: u16,
    pub segments: Vec<Segment>,
    pub symbols: Vec<Symbol>,
}

fn u16_at(data: &[u8], off: usize) -> Result<u16, ElfError> {
    data.get(off..off + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or(ElfError::OutOfBounds { what: "field" })
}

fn u32_at(data: &[u8], off: usize) -> Result<u32, ElfError> {
    data.get(off..off + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(ElfError::OutOfBounds { what: "field" })
}

fn slice<'a>(
    data: &'a [u8],
    off: u32,
    len: u32,
    what: &'static str,
) -> Result<&'a [u8], ElfError> {
    let start = off as usize;
    start
        .checked_add(len as usize)
        .and_then(|end| data.get(start..end))
        .ok_or(ElfError::OutOfBounds { what })
}

/// Parse an ELF32 little-endian binary from raw bytes.
pub fn parse(data: &[u8]) -> Result<ElfInfo, ElfError> {
    if data.len() < EHDR_SIZE {
        return Err(ElfError::TooSmall);
    }
    if data[..4] != ELF_MAGIC {
        return Err(ElfError::BadMagic);
    }
    if data[4] != ELFCLASS32 {
        return Err(ElfError::NotElf32);
    }
    if data[5] != ELFDATA2LSB {
        return Err(ElfError::NotLittleEndian);
    }

    let e_machine = u16_at(data, 18)?;
    let entry = u32_at(data, 24)?;
    let ph_off = u32_at(data, 28)? as usize;
    let sh_off = u32_at(data, 32)? as usize;
    let ph_ent = u16_at(data, 42)? as usize;
    let ph_num = u16_at(data, 44)? as usize;
    let sh_ent = u16_at(data, 46)? as usize;
    let sh_num = u16_at(data, 48)? as usize;

    let mut segments = Vec::new();
    for i in 0..ph_num {
        let off = ph_off + i * ph_ent;
        if off + PHDR_SIZE > data.len() {
            return Err(ElfError::OutOfBounds { what: "phdr" });
        }
        if u32_at(data, off)? != PT_LOAD {
            continue;
        }
        let foff = u32_at(data, off + 4)?;
        let vaddr = u32_at(data, off + 8)?;
        let fsz = u32_at(data, off + 16)?;
        let msz = u32_at(data, off + 20)?;
        let flags = u32_at(data, off + 24)?;
        let bytes = slice(data, foff, fsz, "segment data")?;
        let executable = (flags & PF_X) != 0;
        // Only code is disassembled, so only code gets its bss.
        let seg_data = if executable {
            let size = msz.max(fsz);
            if size > MAX_SEGMENT_SIZE {
                return Err(ElfError::SegmentTooLarge { vaddr, size });
            }
            let mut buf = vec![0u8; size as usize];
            buf[..bytes.len()].copy_from_slice(bytes);
            buf
        } else {
            bytes.to_vec()
        };
        segments.push(Segment {
            vaddr,
            data: seg_data,
            executable,
        });
    }

    let mut shdrs = Vec::with_capacity(sh_num);
    for i in 0..sh_num {
        let off = sh_off + i * sh_ent;
        if off + SHDR_SIZE > data.len() {
            return Err(ElfError::OutOfBounds { what: "shdr" });
        }
        shdrs.push(off);
    }
    let mut symbols = Vec::new();
    for &sh in &shdrs {
        if u32_at(data, sh + 4)? != SHT_SYMTAB {
            continue;
        }
        let link = u32_at(data, sh + 24)? as usize;
        let Some(&strtab) = shdrs.get(link) else {
            return Err(ElfError::OutOfBounds { what: "strtab link" });
        };
        let strings = slice(
            data,
            u32_at(data, strtab + 16)?,
            u32_at(data, strtab + 20)?,
            "strtab",
        )?;
        let table = slice(
            data,
            u32_at(data, sh + 16)?,
            u32_at(data, sh + 20)?,
            "symtab",
        )?;
        read_symbols(table, strings, &mut symbols)?;
    }

    Ok(ElfInfo {
        entry,
        e_machine,
        segments,
        symbols,
    })
}

fn read_symbols(
    table: &[u8],
    strings: &[u8],
    out: &mut Vec<Symbol>,
) -> Result<(), ElfError> {
    for sym in table.chunks_exact(SYM_SIZE) {
        let name_off = u32_at(sym, 0)? as usize;
        let value = u32_at(sym, 4)?;
        let size = u32_at(sym, 8)?;
        let info = sym[12];
        let shndx = u16_at(sym, 14)?;

        let kind = match info & 0xf {
            STT_FUNC => SymbolKind::Function,
            STT_OBJECT => SymbolKind::Object,
            _ => continue,
        };
        if shndx == SHN_UNDEF {
            continue;
        }
        let name = c_str(strings, name_off)?;
        // Mapping symbols ($a, $d, $t) mark code/data runs, not names.
        if name.is_empty() || name.starts_with('$') {
            continue;
        }
        let thumb = kind == SymbolKind::Function && value & 1 != 0;
        out.push(Symbol {
            name: name.to_string(),
            addr: if thumb { value & !1 } else { value },
            size,
            kind,
            thumb,
        });
    }
    Ok(())
}

fn c_str(strings: &[u8], off: usize) -> Result<&str, ElfError> {
    let tail = strings
        .get(off..)
        .ok_or(ElfError::OutOfBounds { what: "symbol name" })?;
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    Ok(std::str::from_utf8(&tail[..end]).unwrap_or(""))
}
