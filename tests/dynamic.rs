use std::ffi::{c_int, c_void};
use std::path::{Path, PathBuf};

use nativehost::{NativeApi, NativeError, NativeLibrary, PrimitiveSizes};

/// Path of the built `native` shared library.
///
/// `NATIVE_LIB` wins; otherwise the library cargo builds into the target directory is used.
/// A missing library fails the test.
fn native_lib() -> PathBuf {
    if let Ok(lib) = std::env::var("NATIVE_LIB") {
        return PathBuf::from(lib);
    }
    let target = std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("target"));
    let file_name = Path::new(nativehost::DEFAULT_LIB).file_name().unwrap();
    let candidates = [
        target.join("debug").join(file_name),
        target.join("debug").join("deps").join(file_name),
    ];
    candidates.iter()
        .find(|path| path.is_file())
        .cloned()
        .unwrap_or_else(|| panic!("native library not found in {candidates:?}; run `cargo build --workspace` or set NATIVE_LIB"))
}

extern "C" fn double(_context: *mut c_void, value: c_int) -> c_int {
    value * 2
}

extern "C" fn context_is_null(context: *mut c_void, _value: c_int) -> c_int {
    context.is_null() as c_int
}

#[test]
fn missing_library() {
    let err = NativeLibrary::load("no/such/libnative.so").err().unwrap();
    assert!(matches!(err, NativeError::IoError(_)));
}

#[test]
fn not_a_library() {
    let err = NativeLibrary::load("Cargo.toml").err().unwrap();
    assert!(matches!(err, NativeError::DlOpenError(_)));
}

#[test]
fn dynamic_hello() -> anyhow::Result<()> {
    let lib = NativeLibrary::load(native_lib())?;
    println!("Loaded: {}", lib.path().display());
    for text in ["World", "", "native boundary"] {
        let greeting = lib.greet(text)?;
        assert_eq!(format!("Hello {text}!"), greeting.to_string_lossy());
        assert_eq!("Hello !".len() + text.len(), greeting.len());
    }
    Ok(())
}

#[test]
fn dynamic_free_round_trip() -> anyhow::Result<()> {
    let lib = NativeLibrary::load(native_lib())?;
    let raw = lib.greet("raw")?.into_raw();
    assert!(!raw.is_null());
    unsafe {
        lib.free_memory(raw);
        lib.free_memory(std::ptr::null_mut());
    }
    Ok(())
}

#[test]
fn dynamic_sizes() -> anyhow::Result<()> {
    let lib = NativeLibrary::load(native_lib())?;
    let first = lib.primitive_sizes();
    assert_eq!(first, lib.primitive_sizes());
    first.check_compatible(&PrimitiveSizes::host())?;
    Ok(())
}

#[test]
fn dynamic_foo() -> anyhow::Result<()> {
    let lib = NativeLibrary::load(native_lib())?;
    assert_eq!(10, lib.invoke(5, double));
    assert_eq!(1, lib.invoke(5, context_is_null));
    assert_eq!(0, lib.foo(5, None));
    Ok(())
}
