
use std::collections::HashMap;
use std::fmt;

use arm_disas::{
    disasm, disassemble_range, DisasmInterface, ImageInterface, SymbolMap,
};

/// Interface that records every callback.
#[derive(Default)]
struct Recorder {
    words: HashMap<u32, u32>,
    reads: Vec<u32>,
    addrs: Vec<u32>,
    out: String,
}

impl Recorder {
    fn with_words(base: u32, words: &[u32]) -> Self {
        let words = words
            .iter()
            .enumerate()
            .map(|(i, &w)| (base + 4 * i as u32, w))
            .collect();
        Recorder {
            words,
            ..Default::default()
        }
    }
}

impl DisasmInterface for Recorder {
    fn read_word(&mut self, addr: u32) -> u32 {
        self.reads.push(addr);
        self.words.get(&addr).copied().unwrap_or(0)
    }

    fn print_addr(&mut self, addr: u32) {
        self.addrs.push(addr);
        self.out.push_str(&format!("@{addr:x}"));
    }

    fn print(&mut self, args: fmt::Arguments<'_>) -> usize {
        let s = args.to_string();
        self.out.push_str(&s);
        s.len()
    }
}

fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

#[test]
fn reads_exactly_one_word() {
    let mut rec = Recorder::with_words(0x8000, &[0xe3a00001]);
    assert_eq!(disasm(&mut rec, 0x8000, false), 0x8004);
    assert_eq!(rec.reads, vec![0x8000]);
    assert!(rec.addrs.is_empty());
    assert_eq!(rec.out, "mov\tr0, #0x1\n");
}

#[test]
fn one_line_per_instruction() {
    for &insn in &[0xe92d4010, 0xeafffffe, 0xe7f000f0, 0xee010f10, 0xf5d1f000] {
        let mut rec = Recorder::with_words(0x1000, &[insn]);
        disasm(&mut rec, 0x1000, false);
        assert!(rec.out.ends_with('\n'), "{insn:#010x}: {:?}", rec.out);
        assert_eq!(rec.out.matches('\n').count(), 1, "{insn:#010x}");
    }
}

#[test]
fn branch_target_goes_through_print_addr() {
    let mut rec = Recorder::with_words(0x8000, &[0xeb000010]);
    disasm(&mut rec, 0x8000, false);
    assert_eq!(rec.addrs, vec![0x8048]);
    assert_eq!(rec.out, "bl\t@8048\n");
}

#[test]
fn backward_literal_goes_through_print_addr() {
    let mut rec = Recorder::with_words(0x9000, &[0xe51f0008]);
    disasm(&mut rec, 0x9000, false);
    assert_eq!(rec.addrs, vec![0x9000]);
    assert_eq!(rec.out, "ldr\tr0, @9000\n");
}

#[test]
fn works_through_trait_object() {
    let mut rec = Recorder::with_words(0, &[0xe12fff1e]);
    let di: &mut dyn DisasmInterface = &mut rec;
    assert_eq!(disasm(di, 0, true), 4);
    assert_eq!(rec.out, "e12fff1e\tbx\tlr\n");
}

#[test]
fn condition_suffixes() {
    let expected = [
        "eq", "ne", "cs", "cc", "mi", "pl", "vs", "vc", "hi", "ls", "ge",
        "lt", "gt", "le", "",
    ];
    for (cond, suffix) in expected.iter().enumerate() {
        let insn = (cond as u32) << 28 | 0x00800000;
        let mut rec = Recorder::with_words(0, &[insn]);
        disasm(&mut rec, 0, false);
        assert_eq!(rec.out, format!("add{suffix}\tr0, r0, r0\n"));
    }
    // cond = 0b1111 with a conditional-only encoding
    let mut rec = Recorder::with_words(0, &[0xf0800000]);
    disasm(&mut rec, 0, false);
    assert_eq!(rec.out, "und\t0xf0800000\n");
}

#[test]
fn range_over_image_with_symbols() {
    let code = words_to_bytes(&[
        0xe92d4010, // stmfd sp!, {r4, lr}
        0xe3a00000, // mov r0, #0
        0xeb000000, // bl helper
        0xe8bd8010, // ldmfd sp!, {r4, pc}
        0xe12fff1e, // helper: bx lr
    ]);
    let syms: SymbolMap =
        [(0x8000, "main"), (0x8010, "helper")].into_iter().collect();
    let mut di = ImageInterface::new(0x8000, &code).with_symbols(&syms);

    let end = disassemble_range(&mut di, 0x8000, 5, false);
    assert_eq!(end, 0x8014);
    assert!(di.take_fault().is_none());
    assert_eq!(
        di.output(),
        "stmfd\tsp!, {r4, lr}\n\
         mov\tr0, #0x0\n\
         bl\t0x00008010 <helper>\n\
         ldmfd\tsp!, {r4, pc}\n\
         bx\tlr\n"
    );
}

#[test]
fn range_past_image_end_faults() {
    let code = words_to_bytes(&[0xe1a00000]);
    let mut di = ImageInterface::new(0x100, &code);
    assert_eq!(disassemble_range(&mut di, 0x100, 2, false), 0x108);
    assert_eq!(
        di.take_fault(),
        Some(arm_disas::DisasError::OutOfBounds { address: 0x104 })
    );
}
