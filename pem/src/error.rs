use base64::DecodeError;
use thiserror::Error;

/// Errors raised while parsing or decoding PEM text.
///
/// Parsing follows RFC 7468: boundary markers must be present and well
/// formed, the BEGIN and END labels must agree, and the body must be
/// valid base64.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// No `-----BEGIN <label>-----` marker was found.
    #[error("missing a pre encapsulation boundary")]
    MissingPreEncapsulationBoundary,

    /// The block was never closed with `-----END <label>-----`.
    #[error("missing a post encapsulation boundary")]
    MissingPostEncapsulationBoundary,

    /// Nothing between the boundary markers.
    #[error("missing PEM data")]
    MissingData,

    /// BEGIN and END carry different labels.
    #[error("label mismatch: BEGIN {begin}, END {end}")]
    LabelMismatch { begin: String, end: String },

    /// A blank line inside the base64 body.
    #[error("blank line inside the base64 body")]
    BlankLineInBody,

    #[error("base64 decode: {0}")]
    Base64Decode(#[from] DecodeError),
}
