use thiserror::Error;

/// Decode errors raised while reading a DER/BER byte buffer.
///
/// Everything here is fatal and propagated to the caller; recovery (the
/// encapsulation fallback) happens in the layers above.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A declared length runs past the end of the remaining input.
    #[error("truncated: declared length exceeds remaining input")]
    Truncated,

    /// Invalid length octets: indefinite form, the reserved value 127, or a
    /// length wider than this platform can address.
    #[error("malformed length encoding")]
    MalformedLength,

    /// Invalid identifier octets in the high-tag-number form.
    #[error("malformed tag encoding")]
    MalformedTag,

    /// The top-level value consumed fewer bytes than the buffer holds.
    #[error("trailing bytes after the top-level value")]
    TrailingData,

    /// Nesting exceeded the decoder's depth limit.
    #[error("nesting exceeds {0} levels")]
    TooDeep(usize),
}

// nom's error channel is folded into this taxonomy here so it never leaks
// out of the crate. The complete-mode combinators only fail when input runs
// out, which is exactly `Truncated`.
impl nom::error::ParseError<&[u8]> for Error {
    fn from_error_kind(_input: &[u8], _kind: nom::error::ErrorKind) -> Self {
        Error::Truncated
    }

    fn append(_input: &[u8], _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<nom::Err<Error>> for Error {
    fn from(err: nom::Err<Error>) -> Self {
        match err {
            nom::Err::Incomplete(_) => Error::Truncated,
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
        }
    }
}
