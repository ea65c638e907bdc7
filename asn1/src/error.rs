//! Error types for ASN.1 value decoding.

use thiserror::Error;

/// Errors raised while turning a TLV tree into typed ASN.1 values.
///
/// All of these are fatal for the dump that hit them; the only condition
/// recovered from is an encapsulation probe failure, which never leaves the
/// prober.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid DER encoding: {0}")]
    Der(#[from] der::Error),

    #[error("BOOLEAN: no content")]
    InvalidBoolean,

    #[error("BIT STRING: no content")]
    BitStringNoData,
    #[error("BIT STRING: unused bits {0} out of range (must be 0-7)")]
    BitStringUnusedBitsOutOfRange(u8),

    #[error("OBJECT IDENTIFIER: no content")]
    ObjectIdentifierNoData,
    #[error("OBJECT IDENTIFIER: incomplete encoding")]
    ObjectIdentifierIncompleteEncoding,
    #[error("OBJECT IDENTIFIER: arc value exceeds 64 bits")]
    ObjectIdentifierArcOverflow,

    #[error("UTF8String: invalid UTF-8")]
    InvalidUtf8String,
    #[error("BMPString: odd byte length {0}")]
    BmpStringOddLength(usize),
    #[error("BMPString: invalid UTF-16 code unit")]
    BmpStringInvalidCodeUnit,
    #[error("UniversalString: byte length {0} is not a multiple of 4")]
    UniversalStringInvalidLength(usize),
    #[error("UniversalString: invalid code point 0x{0:08X}")]
    UniversalStringInvalidCodePoint(u32),

    #[error("UTCTime: invalid time string '{0}'")]
    InvalidUtcTime(String),
    #[error("GeneralizedTime: invalid time string '{0}'")]
    InvalidGeneralizedTime(String),

    #[error("{0}: constructed type with primitive encoding")]
    NotConstructed(&'static str),
}
