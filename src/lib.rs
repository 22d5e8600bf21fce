//! Host-side access to the "native" example library
//!
//! The library is either loaded at runtime ([NativeLibrary]) or linked in ([LinkedNative]);
//! both expose the same [NativeApi].

pub use error::{NativeError, Result};
pub use native_library::{Greeting, LinkedNative, NativeApi, NativeBindings, NativeCallback, NativeLibrary, PrimitiveSizes};

pub mod native_library;
mod error;

/// Default file name of the built native library for the current platform.
#[cfg(target_os = "windows")]
pub const DEFAULT_LIB: &str = "target/debug/native.dll";
#[cfg(target_os = "macos")]
pub const DEFAULT_LIB: &str = "target/debug/libnative.dylib";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const DEFAULT_LIB: &str = "target/debug/libnative.so";
