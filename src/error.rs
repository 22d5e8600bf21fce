use std::ffi::NulError;
use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, NativeError>;

#[derive(ThisError,Debug)]
pub enum NativeError {
    #[error("IO Error")]
    IoError(#[from] std::io::Error),
    #[error("DlOpen Error")]
    DlOpenError(#[from] dlopen2::Error),
    #[error("Null Error")]
    NulError(#[from] NulError),
    #[error("Native library returned no buffer (allocation failed)")]
    AllocationFailed,
    #[error("Native library reports invalid size {1} for {0}")]
    InvalidSize(&'static str, i32),
    #[error("Size of {kind} differs: library={library}, host={host}")]
    LayoutMismatch { kind: &'static str, library: i32, host: i32 },
}
