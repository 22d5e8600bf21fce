//! Minimal native library exposing a handful of functions across the C ABI
//!
//! Buffers returned by [hello] belong to the caller, who must hand them back through [freeMemory].
//! The library keeps no state between calls.
#![allow(non_snake_case)]

use std::ffi::{c_int, c_void, CStr};
use std::os::raw::c_char;
use std::{mem, ptr};

pub mod greeting;

/// Callback accepted by [foo]; receives an opaque context and the forwarded value.
pub type FooCallback = extern "C" fn(context: *mut c_void, value: c_int) -> c_int;

/// Returns a newly allocated, NUL terminated `Hello <text>!`.
///
/// Returns null if `text` is null or the buffer cannot be allocated. Callers must check for it.
///
/// # Safety
/// `text` must be null or point to a NUL terminated string valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn hello(text: *const c_char) -> *mut c_char {
    if text.is_null() {
        log::warn!("hello: called with null text");
        return ptr::null_mut();
    }
    let text = unsafe { CStr::from_ptr(text) };
    match greeting::format_greeting(text) {
        Ok(greeting) => {
            let buffer = greeting.into_raw();
            log::trace!("hello: allocated buffer 0x{:x}", buffer as usize);
            buffer
        }
        Err(e) => {
            log::warn!("hello: {e}");
            ptr::null_mut()
        }
    }
}

/// Releases a buffer obtained from [hello]. Null is ignored.
///
/// # Safety
/// `buffer` must be null or a pointer returned by [hello] that was not released yet.
#[no_mangle]
pub unsafe extern "C" fn freeMemory(buffer: *mut c_char) {
    if buffer.is_null() {
        return;
    }
    log::trace!("freeMemory: releasing buffer 0x{:x}", buffer as usize);
    // SAFETY: the buffer came from CString::into_raw in hello and still holds its terminator.
    drop(unsafe { std::ffi::CString::from_raw(buffer) });
}

#[no_mangle]
pub extern "C" fn intSize() -> c_int {
    mem::size_of::<c_int>() as c_int
}

#[no_mangle]
pub extern "C" fn boolSize() -> c_int {
    mem::size_of::<bool>() as c_int
}

#[no_mangle]
pub extern "C" fn pointerSize() -> c_int {
    mem::size_of::<*const c_void>() as c_int
}

/// Calls `callback` once with a null context and `value`, returning what it returns.
///
/// A null callback yields `0`.
#[no_mangle]
pub extern "C" fn foo(value: c_int, callback: Option<FooCallback>) -> c_int {
    match callback {
        Some(callback) => callback(ptr::null_mut(), value),
        None => {
            log::warn!("foo: called with null callback");
            0
        }
    }
}
