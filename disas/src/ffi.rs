//! C calling interface.
//!
//! `disasm_interface_t` and the two entry points keep the layout and
//! signatures of the BSD `<machine/disassem.h>` header, so existing C
//! callers can link against the static library unchanged.

#![allow(non_camel_case_types)]

use std::ffi::CString;
use std::fmt;

use libc::{c_char, c_int, c_uint};

use crate::arm::INSN_SIZE;
use crate::interface::DisasmInterface;

pub type vm_offset_t = libc::uintptr_t;

/// Callbacks supplied by a C caller, in header order.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct disasm_interface_t {
    pub di_readword: Option<unsafe extern "C" fn(c_uint) -> c_uint>,
    pub di_printaddr: Option<unsafe extern "C" fn(c_uint)>,
    pub di_printf: Option<unsafe extern "C" fn(*const c_char, ...) -> c_int>,
}

/// Adapter from the C table to [`DisasmInterface`]. Only built by
/// [`disasm`] once every pointer is known to be non-null.
struct CInterface {
    readword: unsafe extern "C" fn(c_uint) -> c_uint,
    printaddr: unsafe extern "C" fn(c_uint),
    printf: unsafe extern "C" fn(*const c_char, ...) -> c_int,
}

impl DisasmInterface for CInterface {
    fn read_word(&mut self, addr: u32) -> u32 {
        // SAFETY: non-null and callable for the whole `disasm` call.
        unsafe { (self.readword)(addr) }
    }

    fn print_addr(&mut self, addr: u32) {
        // SAFETY: non-null and callable for the whole `disasm` call.
        unsafe { (self.printaddr)(addr) }
    }

    fn print(&mut self, args: fmt::Arguments<'_>) -> usize {
        // Decoder output never contains NUL.
        let Ok(text) = CString::new(fmt::format(args)) else {
            return 0;
        };
        // Pass the text as an argument, never as the format.
        // SAFETY: both pointers are NUL-terminated and outlive the call;
        // `%s` consumes exactly the one vararg supplied.
        let n = unsafe {
            (self.printf)(b"%s\0".as_ptr() as *const c_char, text.as_ptr())
        };
        n.max(0) as usize
    }
}

/// Disassemble the instruction at `loc` through `di`.
///
/// Returns the address of the next instruction. A null table or a
/// null callback prints nothing and returns `loc`.
///
/// # Safety
///
/// `di` must be null or point to a valid table whose callbacks stay
/// callable for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn disasm(
    di: *const disasm_interface_t,
    loc: vm_offset_t,
    altfmt: c_int,
) -> vm_offset_t {
    let Some(table) = di.as_ref() else {
        return loc;
    };
    let (Some(readword), Some(printaddr), Some(printf)) =
        (table.di_readword, table.di_printaddr, table.di_printf)
    else {
        return loc;
    };
    let mut host = CInterface {
        readword,
        printaddr,
        printf,
    };
    crate::arm::disasm(&mut host, loc as u32, altfmt != 0);
    loc.wrapping_add(INSN_SIZE as vm_offset_t)
}

/// Disassemble the instruction at `loc` in this address space to
/// stdout.
///
/// # Safety
///
/// `loc` must be a readable, 4-byte aligned address.
#[no_mangle]
pub unsafe extern "C" fn disassemble(loc: c_uint) {
    crate::arm::disassemble(loc)
}
