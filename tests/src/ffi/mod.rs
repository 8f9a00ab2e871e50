//! C ABI: `disasm_interface_t` driven through plain C callbacks.

use std::fs::File;
use std::io::Read;
use std::mem::{offset_of, size_of};
use std::os::fd::FromRawFd;
use std::ptr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use arm_disas::ffi::{disasm, disasm_interface_t, vm_offset_t};
use libc::c_uint;

// Callbacks are plain functions, so state lives in statics; tests
// using them take `LOCK`.
static LOCK: Mutex<()> = Mutex::new(());
static WORD: AtomicU32 = AtomicU32::new(0);
static LAST_READ: AtomicU32 = AtomicU32::new(0);
static LAST_ADDR: AtomicU32 = AtomicU32::new(0);

unsafe extern "C" fn readword(addr: c_uint) -> c_uint {
    LAST_READ.store(addr, Ordering::SeqCst);
    WORD.load(Ordering::SeqCst)
}

unsafe extern "C" fn printaddr(addr: c_uint) {
    LAST_ADDR.store(addr, Ordering::SeqCst);
}

fn table() -> disasm_interface_t {
    disasm_interface_t {
        di_readword: Some(readword),
        di_printaddr: Some(printaddr),
        di_printf: Some(libc::printf),
    }
}

fn run(word: u32, loc: vm_offset_t) -> vm_offset_t {
    WORD.store(word, Ordering::SeqCst);
    LAST_ADDR.store(0, Ordering::SeqCst);
    let di = table();
    unsafe { disasm(&di, loc, 0) }
}

/// Run `f` with fd 1 redirected into a pipe; returns what reached it.
fn capture_stdout(f: impl FnOnce()) -> String {
    let mut fds = [0; 2];
    let mut text = String::new();
    unsafe {
        assert_eq!(libc::pipe(fds.as_mut_ptr()), 0);
        libc::fflush(ptr::null_mut());
        let saved = libc::dup(1);
        assert!(saved >= 0);
        libc::dup2(fds[1], 1);
        f();
        libc::fflush(ptr::null_mut());
        libc::dup2(saved, 1);
        libc::close(saved);
        libc::close(fds[1]);
        File::from_raw_fd(fds[0]).read_to_string(&mut text).unwrap();
    }
    text
}

#[test]
fn field_order_matches_header() {
    let p = size_of::<usize>();
    assert_eq!(offset_of!(disasm_interface_t, di_readword), 0);
    assert_eq!(offset_of!(disasm_interface_t, di_printaddr), p);
    assert_eq!(offset_of!(disasm_interface_t, di_printf), 2 * p);
}

#[test]
fn returns_next_instruction() {
    let _g = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    assert_eq!(run(0xe3a00001, 0x8000), 0x8004);
    assert_eq!(LAST_READ.load(Ordering::SeqCst), 0x8000);
}

#[test]
fn branch_target_reaches_printaddr() {
    let _g = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    run(0xea000002, 0x4000);
    assert_eq!(LAST_ADDR.load(Ordering::SeqCst), 0x4010);
}

#[test]
fn swi_prints_through_printf() {
    let _g = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let mut next = 0;
    let text = capture_stdout(|| next = run(0xef123456, 0x100));
    assert_eq!(next, 0x104);
    // The test harness may write its own lines to fd 1 meanwhile.
    assert!(text.contains("swi\t0x00123456\n"), "{text:?}");
}
