//! Decoder trait for type-safe conversions.
//!
//! `Decoder<T, D>` converts a source type `T` into a destination type `D`.
//! The destination must be marked with `DecodableFrom<T>`, so only the
//! conversions the workspace actually defines can be written down.
//!
//! To add a new decodable type, implement both traits:
//!
//! ```no_run
//! use kaibou::decoder::{DecodableFrom, Decoder};
//!
//! struct Raw(Vec<u8>);
//! struct Text(String);
//!
//! #[derive(Debug)]
//! struct MyError;
//!
//! impl DecodableFrom<Raw> for Text {}
//!
//! impl Decoder<Raw, Text> for Raw {
//!     type Error = MyError;
//!
//!     fn decode(&self) -> Result<Text, Self::Error> {
//!         Ok(Text(String::from_utf8_lossy(&self.0).to_string()))
//!     }
//! }
//! ```

/// Converts `self` into the destination type `D`.
///
/// Implemented by the source type `T` (usually `Self`). The destination
/// type must implement `DecodableFrom<T>`.
pub trait Decoder<T, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into type `D`.
    ///
    /// # Errors
    ///
    /// Returns an error when the conversion fails; the conditions depend on
    /// the implementing type.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait indicating that type `D` can be decoded from type `T`.
///
/// Has no methods; it exists so the compiler can verify a conversion is
/// valid before a `Decoder` implementation is accepted.
pub trait DecodableFrom<T> {}
