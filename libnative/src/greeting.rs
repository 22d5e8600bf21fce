use std::collections::TryReserveError;
use std::ffi::{CStr, CString};
use thiserror::Error as ThisError;

pub const GREETING_PREFIX: &[u8] = b"Hello ";
pub const GREETING_SUFFIX: &[u8] = b"!";

/// Bytes added around the caller's text, terminator included.
pub const GREETING_OVERHEAD: usize = GREETING_PREFIX.len() + GREETING_SUFFIX.len() + 1;

#[derive(ThisError, Debug)]
pub enum GreetingError {
    #[error("greeting size overflows usize")]
    CapacityOverflow,
    #[error("cannot allocate greeting buffer")]
    Allocation(#[from] TryReserveError),
}

/// Formats `Hello <text>!` into a single exact-size allocation.
///
/// The reservation is fallible, so an exhausted allocator surfaces as [GreetingError::Allocation]
/// instead of aborting the process.
pub fn format_greeting(text: &CStr) -> Result<CString, GreetingError> {
    let text = text.to_bytes();
    let size = text.len()
        .checked_add(GREETING_OVERHEAD)
        .ok_or(GreetingError::CapacityOverflow)?;
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(size)?;
    buffer.extend_from_slice(GREETING_PREFIX);
    buffer.extend_from_slice(text);
    buffer.extend_from_slice(GREETING_SUFFIX);
    buffer.push(0);
    // SAFETY: CStr bytes and both template parts are NUL free; the only NUL is the one just pushed.
    Ok(unsafe { CString::from_vec_with_nul_unchecked(buffer) })
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;
    use super::{format_greeting, GREETING_OVERHEAD};

    #[test]
    fn greets_text() {
        let text = CString::new("World").unwrap();
        let greeting = format_greeting(&text).unwrap();
        assert_eq!("Hello World!", greeting.to_str().unwrap());
    }

    #[test]
    fn greeting_length_is_template_plus_text() {
        for s in ["", "a", "Rustacean", "with spaces and 123"] {
            let text = CString::new(s).unwrap();
            let greeting = format_greeting(&text).unwrap();
            assert_eq!(s.len() + GREETING_OVERHEAD - 1, greeting.as_bytes().len());
            assert_eq!(s.len() + GREETING_OVERHEAD, greeting.as_bytes_with_nul().len());
        }
    }

    #[test]
    fn greeting_has_single_terminator() {
        let text = CString::new("terminated").unwrap();
        let greeting = format_greeting(&text).unwrap();
        let bytes = greeting.as_bytes_with_nul();
        assert_eq!(1, bytes.iter().filter(|&&b| b == 0).count());
        assert_eq!(Some(&0), bytes.last());
    }

    #[test]
    fn non_utf8_text_passes_through() {
        let text = CString::new(vec![0xC3, 0x28, b'x']).unwrap();
        let greeting = format_greeting(&text).unwrap();
        assert_eq!(b"Hello \xC3\x28x!", greeting.as_bytes());
    }
}
