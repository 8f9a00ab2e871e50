//! ARM disassembler — A32, ARMv5TE.
//!
//! Table driven: each opcode entry carries a mask, a match pattern,
//! the mnemonic and a small format string. The format string is
//! interpreted one letter at a time; upper-case letters are mnemonic
//! modifiers glued onto the previous text, everything else is an
//! operand and gets a tab (first) or `", "` separator. Besides the
//! integer core this covers the FPA coprocessor, generic coprocessor
//! transfers and a handful of v6/v7 extend and bitfield forms.

use tracing::{debug, trace};

use crate::error::DisasError;
use crate::interface::{DisasmInterface, HostInterface, ImageInterface};

/// Size of one A32 instruction in bytes.
pub const INSN_SIZE: u32 = 4;

// -- Name tables --

const COND: [&str; 16] = [
    "eq", "ne", "cs", "cc", "mi", "pl", "vs", "vc", "hi", "ls", "ge", "lt",
    "gt", "le", "", "nv",
];

const REG: [&str; 16] = [
    "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11",
    "r12", "sp", "lr", "pc",
];

const SHIFT: [&str; 4] = ["lsl", "lsr", "asr", "ror"];

/// Indexed by P:U.
const BLOCK_TRANSFER: [&str; 4] = ["da", "ia", "db", "ib"];

/// Indexed by L:P:U, for ldm/stm with an sp base.
const STACK_TRANSFER: [&str; 8] =
    ["ed", "ea", "fd", "fa", "fa", "fd", "ea", "ed"];

const FPA_CONST: [&str; 8] =
    ["0.0", "1.0", "2.0", "3.0", "4.0", "5.0", "0.5", "10.0"];

const FPA_PREC: [&str; 4] = ["s", "d", "e", "p"];

const FPA_ROUND: [&str; 4] = ["", "p", "m", "z"];

fn reg(r: u32) -> &'static str {
    REG[(r & 0xf) as usize]
}

// ================================================================
// Opcode table
// ================================================================

/// One opcode table entry.
#[derive(Debug)]
pub struct OpcodeDef {
    pub mask: u32,
    pub pattern: u32,
    pub name: &'static str,
    pub format: &'static str,
}

const fn op(
    mask: u32,
    pattern: u32,
    name: &'static str,
    format: &'static str,
) -> OpcodeDef {
    OpcodeDef {
        mask,
        pattern,
        name,
        format,
    }
}

impl OpcodeDef {
    /// Entries in the `cond == 0b1111` space take no condition suffix.
    fn unconditional(&self) -> bool {
        self.pattern >> 28 == 0xf
    }

    fn is_undefined(&self) -> bool {
        self.name == "und"
    }
}

static UNDEFINED: OpcodeDef = op(0, 0, "und", "x");

/// First match wins; specific encodings sit above the general
/// patterns that would otherwise swallow them.
pub static OPCODES: &[OpcodeDef] = &[
    // Unconditional space
    op(0xfe000000, 0xfa000000, "blx", "t"),
    op(0xfd70f000, 0xf550f000, "pld", "a"),
    // Miscellaneous, ahead of data processing
    op(0x0ffffff0, 0x012fff10, "bx", "m"),
    op(0x0ffffff0, 0x012fff30, "blx", "m"),
    op(0xfff000f0, 0xe1200070, "bkpt", "k"),
    op(0x0fff0ff0, 0x016f0f10, "clz", "dm"),
    op(0x0fbf0fff, 0x010f0000, "mrs", "dp"),
    op(0x0fb0fff0, 0x0120f000, "msr", "pFm"),
    op(0x0fb0f000, 0x0320f000, "msr", "pF2"),
    // Branches and software interrupt
    op(0x0f000000, 0x0f000000, "swi", "c"),
    op(0x0f000000, 0x0a000000, "b", "b"),
    op(0x0f000000, 0x0b000000, "bl", "b"),
    // Multiply, swap, exclusives
    op(0x0fe000f0, 0x00000090, "mul", "Snms"),
    op(0x0fe000f0, 0x00200090, "mla", "Snmsd"),
    op(0x0fe000f0, 0x00800090, "umull", "Sdnms"),
    op(0x0fe000f0, 0x00a00090, "umlal", "Sdnms"),
    op(0x0fe000f0, 0x00c00090, "smull", "Sdnms"),
    op(0x0fe000f0, 0x00e00090, "smlal", "Sdnms"),
    op(0x0ff00ff0, 0x01000090, "swp", "dmo"),
    op(0x0ff00ff0, 0x01400090, "swpb", "dmo"),
    op(0x0ff00fff, 0x01900f9f, "ldrex", "do"),
    op(0x0ff00ff0, 0x01800f90, "strex", "dmo"),
    // Halfword, signed and doubleword transfers
    op(0x0e1000f0, 0x001000b0, "ldrh", "de"),
    op(0x0e1000f0, 0x000000b0, "strh", "de"),
    op(0x0e1000f0, 0x001000d0, "ldrsb", "de"),
    op(0x0e1000f0, 0x001000f0, "ldrsh", "de"),
    op(0x0e1000f0, 0x000000d0, "ldrd", "de"),
    op(0x0e1000f0, 0x000000f0, "strd", "de"),
    op(0x0e000090, 0x00000090, "und", "x"),
    // Data processing
    op(0x0de00000, 0x00000000, "and", "Sdn2"),
    op(0x0de00000, 0x00200000, "eor", "Sdn2"),
    op(0x0de00000, 0x00400000, "sub", "Sdn2"),
    op(0x0de00000, 0x00600000, "rsb", "Sdn2"),
    op(0x0de00000, 0x00800000, "add", "Sdn2"),
    op(0x0de00000, 0x00a00000, "adc", "Sdn2"),
    op(0x0de00000, 0x00c00000, "sbc", "Sdn2"),
    op(0x0de00000, 0x00e00000, "rsc", "Sdn2"),
    op(0x0df00000, 0x01100000, "tst", "Dn2"),
    op(0x0df00000, 0x01300000, "teq", "Dn2"),
    op(0x0df00000, 0x01500000, "cmp", "Dn2"),
    op(0x0df00000, 0x01700000, "cmn", "Dn2"),
    op(0x0de00000, 0x01800000, "orr", "Sdn2"),
    op(0x0de00000, 0x01a00000, "mov", "Sd2"),
    op(0x0de00000, 0x01c00000, "bic", "Sdn2"),
    op(0x0de00000, 0x01e00000, "mvn", "Sd2"),
    // Media: extend and bitfield
    op(0x0fff03f0, 0x068f0070, "sxtb16", "dmJ"),
    op(0x0fff03f0, 0x06af0070, "sxtb", "dmJ"),
    op(0x0fff03f0, 0x06bf0070, "sxth", "dmJ"),
    op(0x0fff03f0, 0x06cf0070, "uxtb16", "dmJ"),
    op(0x0fff03f0, 0x06ef0070, "uxtb", "dmJ"),
    op(0x0fff03f0, 0x06ff0070, "uxth", "dmJ"),
    op(0x0fe00070, 0x07a00050, "sbfx", "dmiw"),
    op(0x0fe00070, 0x07e00050, "ubfx", "dmiw"),
    op(0x0fe0007f, 0x07c0001f, "bfc", "diw"),
    op(0x0fe00070, 0x07c00010, "bfi", "dmiw"),
    op(0x0e000010, 0x06000010, "und", "x"),
    // Single data transfer
    op(0x0d700000, 0x04200000, "strt", "da"),
    op(0x0d700000, 0x04300000, "ldrt", "da"),
    op(0x0d700000, 0x04600000, "strbt", "da"),
    op(0x0d700000, 0x04700000, "ldrbt", "da"),
    op(0x0c500000, 0x04000000, "str", "da"),
    op(0x0c500000, 0x04100000, "ldr", "da"),
    op(0x0c500000, 0x04400000, "strb", "da"),
    op(0x0c500000, 0x04500000, "ldrb", "da"),
    // Block transfer, sp base first
    op(0x0e1f0000, 0x080d0000, "stm", "YnWl"),
    op(0x0e1f0000, 0x081d0000, "ldm", "YnWl"),
    op(0x0e100000, 0x08000000, "stm", "XnWl"),
    op(0x0e100000, 0x08100000, "ldm", "XnWl"),
    // FPA (cp1/cp2)
    op(0x0e100f00, 0x0c000100, "stf", "Qfq"),
    op(0x0e100f00, 0x0c100100, "ldf", "Qfq"),
    op(0x0e100f00, 0x0c000200, "sfm", "frq"),
    op(0x0e100f00, 0x0c100200, "lfm", "frq"),
    op(0x0ff08f10, 0x0e000100, "adf", "PRfgh"),
    op(0x0ff08f10, 0x0e100100, "muf", "PRfgh"),
    op(0x0ff08f10, 0x0e200100, "suf", "PRfgh"),
    op(0x0ff08f10, 0x0e300100, "rsf", "PRfgh"),
    op(0x0ff08f10, 0x0e400100, "dvf", "PRfgh"),
    op(0x0ff08f10, 0x0e500100, "rdf", "PRfgh"),
    op(0x0ff08f10, 0x0e600100, "pow", "PRfgh"),
    op(0x0ff08f10, 0x0e700100, "rpw", "PRfgh"),
    op(0x0ff08f10, 0x0e800100, "rmf", "PRfgh"),
    op(0x0ff08f10, 0x0e900100, "fml", "PRfgh"),
    op(0x0ff08f10, 0x0ea00100, "fdv", "PRfgh"),
    op(0x0ff08f10, 0x0eb00100, "frd", "PRfgh"),
    op(0x0ff08f10, 0x0ec00100, "pol", "PRfgh"),
    op(0x0ff08f10, 0x0e008100, "mvf", "PRfh"),
    op(0x0ff08f10, 0x0e108100, "mnf", "PRfh"),
    op(0x0ff08f10, 0x0e208100, "abs", "PRfh"),
    op(0x0ff08f10, 0x0e308100, "rnd", "PRfh"),
    op(0x0ff08f10, 0x0e408100, "sqt", "PRfh"),
    op(0x0ff08f10, 0x0e508100, "log", "PRfh"),
    op(0x0ff08f10, 0x0e608100, "lgn", "PRfh"),
    op(0x0ff08f10, 0x0e708100, "exp", "PRfh"),
    op(0x0ff08f10, 0x0e808100, "sin", "PRfh"),
    op(0x0ff08f10, 0x0e908100, "cos", "PRfh"),
    op(0x0ff08f10, 0x0ea08100, "tan", "PRfh"),
    op(0x0ff08f10, 0x0eb08100, "asn", "PRfh"),
    op(0x0ff08f10, 0x0ec08100, "acs", "PRfh"),
    op(0x0ff08f10, 0x0ed08100, "atn", "PRfh"),
    op(0x0ff08f10, 0x0ee08100, "urd", "PRfh"),
    op(0x0ff08f10, 0x0ef08100, "nrm", "PRfh"),
    op(0x0ff0ff10, 0x0e90f110, "cmf", "gh"),
    op(0x0ff0ff10, 0x0eb0f110, "cnf", "gh"),
    op(0x0ff0ff10, 0x0ed0f110, "cmfe", "gh"),
    op(0x0ff0ff10, 0x0ef0f110, "cnfe", "gh"),
    op(0x0ff00f10, 0x0e000110, "flt", "PRgd"),
    op(0x0ff00f10, 0x0e100110, "fix", "Rdh"),
    op(0x0ff00f10, 0x0e200110, "wfs", "d"),
    op(0x0ff00f10, 0x0e300110, "rfs", "d"),
    op(0x0ff00f10, 0x0e400110, "wfc", "d"),
    op(0x0ff00f10, 0x0e500110, "rfc", "d"),
    // Generic coprocessor
    op(0x0e100000, 0x0c000000, "stc", "L#v"),
    op(0x0e100000, 0x0c100000, "ldc", "L#v"),
    op(0x0f000010, 0x0e000000, "cdp", "#y"),
    op(0x0f100010, 0x0e000010, "mcr", "#z"),
    op(0x0f100010, 0x0e100010, "mrc", "#z"),
];

/// Table entry describing `insn`, or the `und` fallback.
pub fn lookup(insn: u32) -> &'static OpcodeDef {
    let uncond = insn >> 28 == 0xf;
    OPCODES
        .iter()
        .find(|d| insn & d.mask == d.pattern && d.unconditional() == uncond)
        .unwrap_or(&UNDEFINED)
}

/// Mnemonic for `insn` without condition or modifiers.
pub fn mnemonic(insn: u32) -> &'static str {
    lookup(insn).name
}

// ================================================================
// Entry points
// ================================================================

/// Disassemble the instruction at `loc`.
///
/// Reads one word through `di`, prints one line (terminated by
/// `'\n'`) and returns the address of the next instruction. With
/// `altfmt` the raw word is printed in front of the mnemonic.
pub fn disasm<I>(di: &mut I, loc: u32, altfmt: bool) -> u32
where
    I: DisasmInterface + ?Sized,
{
    let insn = di.read_word(loc);
    let def = lookup(insn);
    trace!("{loc:#010x}: {insn:#010x} {}", def.name);
    if def.is_undefined() {
        debug!("undefined instruction {insn:#010x} at {loc:#010x}");
    }

    if altfmt {
        di.print(format_args!("{insn:08x}\t"));
    }
    di.print(format_args!("{}", def.name));
    if !def.unconditional() && !def.is_undefined() {
        di.print(format_args!("{}", COND[(insn >> 28) as usize]));
    }

    let mut operands = 0;
    for f in def.format.chars() {
        if !f.is_ascii_uppercase() {
            let sep = if operands == 0 { "\t" } else { ", " };
            di.print(format_args!("{sep}"));
            operands += 1;
        }
        print_field(di, f, insn, loc);
    }
    di.print(format_args!("\n"));

    loc.wrapping_add(INSN_SIZE)
}

/// Disassemble the instruction at `loc` in the current address space,
/// printing to stdout.
///
/// # Safety
///
/// `loc` must be a readable, 4-byte aligned address in this process.
pub unsafe fn disassemble(loc: u32) {
    let mut di = HostInterface::new();
    disasm(&mut di, loc, false);
}

/// Disassemble `count` consecutive instructions starting at `start`.
/// Returns the address following the last one.
pub fn disassemble_range<I>(
    di: &mut I,
    start: u32,
    count: usize,
    altfmt: bool,
) -> u32
where
    I: DisasmInterface + ?Sized,
{
    let mut loc = start;
    for _ in 0..count {
        loc = disasm(di, loc, altfmt);
    }
    loc
}

/// Disassemble one instruction from raw little-endian bytes at `pc`.
///
/// Returns the text (without trailing newline) and the instruction
/// length in bytes.
pub fn print_insn_arm(pc: u32, data: &[u8]) -> Result<(String, usize), DisasError> {
    let size = INSN_SIZE as usize;
    if data.len() < size {
        return Err(DisasError::truncated(pc, size, data.len()));
    }
    let mut di = ImageInterface::new(pc, &data[..size]);
    disasm(&mut di, pc, false);
    if let Some(err) = di.take_fault() {
        return Err(err);
    }
    let mut text = di.take_output();
    text.truncate(text.trim_end_matches('\n').len());
    Ok((text, size))
}

// ================================================================
// Format interpreter
// ================================================================

macro_rules! out {
    ($di:expr, $($arg:tt)*) => {
        $di.print(format_args!($($arg)*))
    };
}

fn print_field<I>(di: &mut I, f: char, insn: u32, loc: u32)
where
    I: DisasmInterface + ?Sized,
{
    match f {
        // Registers
        'd' => out!(di, "{}", reg(insn >> 12)),
        'n' => out!(di, "{}", reg(insn >> 16)),
        's' => out!(di, "{}", reg(insn >> 8)),
        'm' => out!(di, "{}", reg(insn)),
        'o' => out!(di, "[{}]", reg(insn >> 16)),
        // Operands
        '2' => operand2(di, insn),
        'a' => ldr_str_address(di, insn, loc),
        'e' => halfword_address(di, insn, loc),
        'l' => register_list(di, insn),
        'b' => {
            di.print_addr(branch_target(insn, loc));
            0
        }
        't' => {
            let target = branch_target(insn, loc).wrapping_add((insn >> 23) & 2);
            di.print_addr(target);
            0
        }
        'k' => out!(di, "#0x{:x}", ((insn >> 4) & 0xfff0) | (insn & 0xf)),
        'c' => out!(di, "0x{:08x}", insn & 0x00ff_ffff),
        'x' => out!(di, "0x{insn:08x}"),
        'p' => out!(di, "{}", if insn & (1 << 22) != 0 { "spsr" } else { "cpsr" }),
        'i' => out!(di, "#{}", (insn >> 7) & 0x1f),
        'w' => out!(di, "#{}", bitfield_width(insn)),
        // Coprocessor
        '#' => out!(di, "p{}", (insn >> 8) & 0xf),
        'y' => out!(
            di,
            "{}, c{}, c{}, c{}, {}",
            (insn >> 20) & 0xf,
            (insn >> 12) & 0xf,
            (insn >> 16) & 0xf,
            insn & 0xf,
            (insn >> 5) & 0x7
        ),
        'z' => out!(
            di,
            "{}, {}, c{}, c{}, {}",
            (insn >> 21) & 0x7,
            reg(insn >> 12),
            (insn >> 16) & 0xf,
            insn & 0xf,
            (insn >> 5) & 0x7
        ),
        'v' => {
            out!(di, "c{}, ", (insn >> 12) & 0xf);
            coproc_address(di, insn, loc)
        }
        'q' => coproc_address(di, insn, loc),
        // FPA
        'f' => out!(di, "f{}", (insn >> 12) & 0x7),
        'g' => out!(di, "f{}", (insn >> 16) & 0x7),
        'h' => {
            if insn & (1 << 3) != 0 {
                out!(di, "#{}", FPA_CONST[(insn & 0x7) as usize])
            } else {
                out!(di, "f{}", insn & 0x7)
            }
        }
        'r' => {
            let count = ((insn >> 21) & 2) | ((insn >> 15) & 1);
            out!(di, "{}", if count == 0 { 4 } else { count })
        }
        // Modifiers
        'S' if insn & (1 << 20) != 0 => out!(di, "s"),
        'D' if (insn >> 12) & 0xf == 0xf => out!(di, "p"),
        'L' if insn & (1 << 22) != 0 => out!(di, "l"),
        'W' if insn & (1 << 21) != 0 => out!(di, "!"),
        'S' | 'D' | 'L' | 'W' => 0,
        'X' => out!(di, "{}", BLOCK_TRANSFER[((insn >> 23) & 3) as usize]),
        'Y' => {
            let idx = ((insn >> 18) & 4) | ((insn >> 23) & 3);
            out!(di, "{}", STACK_TRANSFER[idx as usize])
        }
        'F' => psr_fields(di, insn),
        'P' => {
            let prec = ((insn >> 18) & 2) | ((insn >> 7) & 1);
            out!(di, "{}", FPA_PREC[prec as usize])
        }
        'Q' => {
            let prec = ((insn >> 21) & 2) | ((insn >> 15) & 1);
            out!(di, "{}", FPA_PREC[prec as usize])
        }
        'R' => out!(di, "{}", FPA_ROUND[((insn >> 5) & 3) as usize]),
        'J' => match (insn >> 10) & 3 {
            0 => 0,
            rot => out!(di, ", ror #{}", rot * 8),
        },
        _ => {
            debug!("unknown format letter {f:?} for {insn:#010x}");
            0
        }
    };
}

/// `loc + 8 + simm24 * 4`.
fn branch_target(insn: u32, loc: u32) -> u32 {
    let off = ((insn << 8) as i32 >> 6) as u32;
    loc.wrapping_add(8).wrapping_add(off)
}

/// Literal address for a pc-relative transfer.
fn pc_relative(insn: u32, loc: u32, off: u32) -> u32 {
    let pc = loc.wrapping_add(8);
    if insn & (1 << 23) != 0 {
        pc.wrapping_add(off)
    } else {
        pc.wrapping_sub(off)
    }
}

fn sign(insn: u32) -> &'static str {
    if insn & (1 << 23) != 0 {
        ""
    } else {
        "-"
    }
}

fn bitfield_width(insn: u32) -> i32 {
    let hi = ((insn >> 16) & 0x1f) as i32;
    if insn & (1 << 21) != 0 {
        // ubfx/sbfx: widthm1
        hi + 1
    } else {
        // bfi/bfc: msb
        hi - ((insn >> 7) & 0x1f) as i32 + 1
    }
}

fn operand2<I>(di: &mut I, insn: u32) -> usize
where
    I: DisasmInterface + ?Sized,
{
    if insn & (1 << 25) != 0 {
        let rot = ((insn >> 8) & 0xf) * 2;
        out!(di, "#0x{:x}", (insn & 0xff).rotate_right(rot))
    } else {
        shifted_register(di, insn)
    }
}

/// `rm` with its optional shift (bits 0-11).
fn shifted_register<I>(di: &mut I, insn: u32) -> usize
where
    I: DisasmInterface + ?Sized,
{
    let mut n = out!(di, "{}", reg(insn));
    let ty = ((insn >> 5) & 3) as usize;
    if insn & (1 << 4) != 0 {
        return n + out!(di, ", {} {}", SHIFT[ty], reg(insn >> 8));
    }
    let amount = (insn >> 7) & 0x1f;
    n += match (ty, amount) {
        (0, 0) => 0,
        (3, 0) => out!(di, ", rrx"),
        (1 | 2, 0) => out!(di, ", {} #32", SHIFT[ty]),
        _ => out!(di, ", {} #{amount}", SHIFT[ty]),
    };
    n
}

/// `[rn, <off>]{!}` or `[rn], <off>`; `offset` prints `<off>`.
fn indexed<I, F>(di: &mut I, insn: u32, omit_offset: bool, offset: F) -> usize
where
    I: DisasmInterface + ?Sized,
    F: FnOnce(&mut I) -> usize,
{
    let rn = reg(insn >> 16);
    if insn & (1 << 24) != 0 {
        let mut n = out!(di, "[{rn}");
        if !omit_offset {
            n += out!(di, ", ");
            n += offset(di);
        }
        n += out!(di, "]");
        if insn & (1 << 21) != 0 {
            n += out!(di, "!");
        }
        n
    } else {
        out!(di, "[{rn}], ") + offset(di)
    }
}

/// Is this a pre-indexed, non-writeback access based on pc?
fn is_literal(insn: u32) -> bool {
    (insn >> 16) & 0xf == 15 && insn & (1 << 24) != 0 && insn & (1 << 21) == 0
}

fn ldr_str_address<I>(di: &mut I, insn: u32, loc: u32) -> usize
where
    I: DisasmInterface + ?Sized,
{
    if insn & (1 << 25) == 0 {
        let off = insn & 0xfff;
        if is_literal(insn) {
            di.print_addr(pc_relative(insn, loc, off));
            return 0;
        }
        let omit = off == 0 && insn & (1 << 23) != 0;
        indexed(di, insn, omit, |di| out!(di, "#{}0x{off:x}", sign(insn)))
    } else {
        indexed(di, insn, false, |di| {
            out!(di, "{}", sign(insn)) + shifted_register(di, insn)
        })
    }
}

fn halfword_address<I>(di: &mut I, insn: u32, loc: u32) -> usize
where
    I: DisasmInterface + ?Sized,
{
    if insn & (1 << 22) != 0 {
        let off = (insn & 0xf) | ((insn >> 4) & 0xf0);
        if is_literal(insn) {
            di.print_addr(pc_relative(insn, loc, off));
            return 0;
        }
        let omit = off == 0 && insn & (1 << 23) != 0;
        indexed(di, insn, omit, |di| out!(di, "#{}0x{off:x}", sign(insn)))
    } else {
        indexed(di, insn, false, |di| out!(di, "{}{}", sign(insn), reg(insn)))
    }
}

fn coproc_address<I>(di: &mut I, insn: u32, loc: u32) -> usize
where
    I: DisasmInterface + ?Sized,
{
    let pre = insn & (1 << 24) != 0;
    let wb = insn & (1 << 21) != 0;
    if !pre && !wb {
        // Unindexed: the 8-bit field is a coprocessor option.
        return out!(di, "[{}], {{{}}}", reg(insn >> 16), insn & 0xff);
    }
    let off = (insn & 0xff) << 2;
    if is_literal(insn) {
        di.print_addr(pc_relative(insn, loc, off));
        return 0;
    }
    let omit = off == 0 && insn & (1 << 23) != 0;
    indexed(di, insn, omit, |di| out!(di, "#{}0x{off:x}", sign(insn)))
}

fn register_list<I>(di: &mut I, insn: u32) -> usize
where
    I: DisasmInterface + ?Sized,
{
    let mut n = out!(di, "{{");
    let mut first = true;
    for r in (0..16).filter(|r| insn & (1 << r) != 0) {
        if !first {
            n += out!(di, ", ");
        }
        n += out!(di, "{}", reg(r));
        first = false;
    }
    n += out!(di, "}}");
    if insn & (1 << 22) != 0 {
        n += out!(di, "^");
    }
    n
}

fn psr_fields<I>(di: &mut I, insn: u32) -> usize
where
    I: DisasmInterface + ?Sized,
{
    let mut n = out!(di, "_");
    for (bit, c) in [(16, 'c'), (17, 'x'), (18, 's'), (19, 'f')] {
        if insn & (1 << bit) != 0 {
            n += out!(di, "{c}");
        }
    }
    n
}
