//! # kaibou
//!
//! Core traits for the kaibou DER inspection toolkit.
//!
//! This crate defines the `Decoder` trait and its `DecodableFrom` marker,
//! which establish the one-way conversion pipeline the workspace is built
//! around:
//!
//! ```text
//! PEM → Vec<u8> → Der → Element
//! ```
//!
//! Each step implements `Decoder` to convert into the next representation.
//! There is no encoding direction: kaibou inspects existing encodings, it
//! never produces them.
//!
//! ## Type safety
//!
//! `DecodableFrom<T>` is a marker trait constraining which conversions
//! exist. A `Decoder<T, D>` implementation is only accepted by the compiler
//! when `D: DecodableFrom<T>`, so an invalid conversion is a compile error
//! rather than a runtime surprise.
//!
//! ## Example
//!
//! Concrete implementations live in the `der` and `asn1` crates:
//!
//! ```ignore
//! use kaibou::decoder::Decoder;
//! use der::Der;
//!
//! let bytes: &[u8] = &[0x30, 0x00];
//! let der: Der = bytes.decode().unwrap();
//! ```

#![forbid(unsafe_code)]

pub mod decoder;
