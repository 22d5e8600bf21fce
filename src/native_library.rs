//! Bindings for the C interface of shared library "native"
//!
//! [NativeApi] is the raw boundary. Its provided methods turn raw results into owned Rust values,
//! most importantly [Greeting], which releases its buffer through `freeMemory` when dropped.

use std::borrow::Cow;
use std::ffi::{c_int, CStr, CString};
use std::fmt;
use std::mem;
use std::os::raw::c_char;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use dlopen2::wrapper::Container;
use dlopen2::wrapper::WrapperApi;

use crate::error::{self, NativeError};

/// Callback signature expected by `foo`; the context argument is always null.
pub type NativeCallback = native::FooCallback;

#[derive(dlopen2_derive::WrapperApi)]
pub struct NativeBindings {
    hello: unsafe extern "C" fn(text: *const c_char) -> *mut c_char,
    #[dlopen2_name = "freeMemory"]
    free_memory: unsafe extern "C" fn(buffer: *mut c_char),
    #[dlopen2_name = "intSize"]
    int_size: unsafe extern "C" fn() -> c_int,
    #[dlopen2_name = "boolSize"]
    bool_size: unsafe extern "C" fn() -> c_int,
    #[dlopen2_name = "pointerSize"]
    pointer_size: unsafe extern "C" fn() -> c_int,
    foo: unsafe extern "C" fn(value: c_int, callback: Option<NativeCallback>) -> c_int,
}

/// The raw entry points of the native library, wherever they come from.
pub trait NativeApi {
    /// # Safety
    /// `text` must be null or a valid NUL terminated string.
    unsafe fn hello(&self, text: *const c_char) -> *mut c_char;

    /// # Safety
    /// `buffer` must be null or an unreleased result of [NativeApi::hello] on the same library.
    unsafe fn free_memory(&self, buffer: *mut c_char);

    fn int_size(&self) -> c_int;

    fn bool_size(&self) -> c_int;

    fn pointer_size(&self) -> c_int;

    fn foo(&self, value: c_int, callback: Option<NativeCallback>) -> c_int;

    /// Asks the library for a greeting and takes ownership of the returned buffer.
    fn greet(&self, text: &str) -> error::Result<Greeting<'_, Self>> where Self: Sized {
        let text = CString::new(text)?;
        let buffer = unsafe { self.hello(text.as_ptr()) };
        // SAFETY: a non-null result of hello is a fresh buffer nobody else owns.
        unsafe { Greeting::from_raw(self, buffer) }.ok_or(NativeError::AllocationFailed)
    }

    fn primitive_sizes(&self) -> PrimitiveSizes {
        PrimitiveSizes {
            int: self.int_size(),
            bool: self.bool_size(),
            pointer: self.pointer_size(),
        }
    }

    fn invoke(&self, value: i32, callback: NativeCallback) -> i32 {
        self.foo(value, Some(callback))
    }
}

pub struct NativeLibrary {
    api: Container<NativeBindings>,
    path: PathBuf,
}

impl NativeLibrary {

    pub fn load<P: AsRef<Path>>(libname: P) -> error::Result<Self> {
        let path = libname.as_ref().canonicalize()?;
        log::debug!("Loading native library: '{}'", path.display());
        let api: Container<NativeBindings> = unsafe { Container::load(path.as_os_str()) }?;
        Ok(Self { api, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NativeApi for NativeLibrary {
    unsafe fn hello(&self, text: *const c_char) -> *mut c_char {
        unsafe { self.api.hello(text) }
    }

    unsafe fn free_memory(&self, buffer: *mut c_char) {
        unsafe { self.api.free_memory(buffer) }
    }

    fn int_size(&self) -> c_int {
        unsafe { self.api.int_size() }
    }

    fn bool_size(&self) -> c_int {
        unsafe { self.api.bool_size() }
    }

    fn pointer_size(&self) -> c_int {
        unsafe { self.api.pointer_size() }
    }

    fn foo(&self, value: c_int, callback: Option<NativeCallback>) -> c_int {
        unsafe { self.api.foo(value, callback) }
    }
}

/// The native library linked into this binary, no loading involved.
#[derive(Copy, Clone, Debug, Default)]
pub struct LinkedNative;

impl NativeApi for LinkedNative {
    unsafe fn hello(&self, text: *const c_char) -> *mut c_char {
        unsafe { native::hello(text) }
    }

    unsafe fn free_memory(&self, buffer: *mut c_char) {
        unsafe { native::freeMemory(buffer) }
    }

    fn int_size(&self) -> c_int {
        native::intSize()
    }

    fn bool_size(&self) -> c_int {
        native::boolSize()
    }

    fn pointer_size(&self) -> c_int {
        native::pointerSize()
    }

    fn foo(&self, value: c_int, callback: Option<NativeCallback>) -> c_int {
        native::foo(value, callback)
    }
}

/// Greeting buffer owned by the host; released through the library that produced it.
pub struct Greeting<'a, A: NativeApi> {
    api: &'a A,
    buffer: NonNull<c_char>,
}

impl<'a, A: NativeApi> Greeting<'a, A> {
    /// Takes ownership of `buffer`; `None` when it is null.
    ///
    /// # Safety
    /// `buffer` must be null or an unreleased result of `api.hello()` not owned elsewhere.
    pub unsafe fn from_raw(api: &'a A, buffer: *mut c_char) -> Option<Self> {
        NonNull::new(buffer).map(|buffer| Self { api, buffer })
    }

    /// Gives the buffer back without releasing it. The caller becomes responsible for `freeMemory`.
    pub fn into_raw(self) -> *mut c_char {
        let buffer = self.buffer.as_ptr();
        mem::forget(self);
        buffer
    }

    pub fn as_c_str(&self) -> &CStr {
        // SAFETY: the buffer is NUL terminated and stays alive until self is dropped.
        unsafe { CStr::from_ptr(self.buffer.as_ptr()) }
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        self.as_c_str().to_string_lossy()
    }

    /// Length in bytes, terminator excluded.
    pub fn len(&self) -> usize {
        self.as_c_str().to_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a, A: NativeApi> Drop for Greeting<'a, A> {
    fn drop(&mut self) {
        log::trace!("calling freeMemory(0x{:x})", self.buffer.as_ptr() as usize);
        unsafe { self.api.free_memory(self.buffer.as_ptr()) }
    }
}

impl<'a, A: NativeApi> fmt::Display for Greeting<'a, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl<'a, A: NativeApi> fmt::Debug for Greeting<'a, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Greeting").field(&self.as_c_str()).finish()
    }
}

/// Byte widths of primitive types, as reported by one side of the boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PrimitiveSizes {
    pub int: i32,
    pub bool: i32,
    pub pointer: i32,
}

impl PrimitiveSizes {
    pub fn host() -> Self {
        Self {
            int: mem::size_of::<c_int>() as i32,
            bool: mem::size_of::<bool>() as i32,
            pointer: mem::size_of::<*const u8>() as i32,
        }
    }

    fn entries(&self) -> [(&'static str, i32); 3] {
        [("int", self.int), ("bool", self.bool), ("pointer", self.pointer)]
    }

    /// Fails on the first size that is not positive or differs from `host`.
    pub fn check_compatible(&self, host: &PrimitiveSizes) -> error::Result<()> {
        for ((kind, library), (_, host)) in self.entries().into_iter().zip(host.entries()) {
            if library <= 0 {
                return Err(NativeError::InvalidSize(kind, library));
            }
            if library != host {
                return Err(NativeError::LayoutMismatch { kind, library, host });
            }
        }
        Ok(())
    }
}

impl fmt::Display for PrimitiveSizes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "int={} bool={} pointer={}", self.int, self.bool, self.pointer)
    }
}
