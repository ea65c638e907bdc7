//! DER/BER tag-length-value decoding.
//!
//! This crate reads the raw binary layer only: identifier octets, length
//! octets and content octets. It builds a [`Tlv`] tree for constructed
//! values and leaves every interpretation of the content (integers, strings,
//! times) to the `asn1` crate.

use kaibou::decoder::{DecodableFrom, Decoder};
use nom::{IResult, Parser};

pub mod error;

pub use error::Error;

/// Bit 6 of the identifier octet: constructed encoding.
pub const TAG_CONSTRUCTED: u8 = 0x20;

/// Low five bits of the identifier octet all set: the tag number follows in
/// base-128 continuation octets.
const HIGH_TAG_NUMBER: u8 = 0x1f;

/// Default nesting limit while building a `Tlv` tree. Attacker-supplied
/// input must not be able to exhaust the call stack.
pub const MAX_DEPTH: usize = 64;

/// Universal tag numbers understood by the inspection layer.
pub mod universal {
    pub const BOOLEAN: u32 = 0x01;
    pub const INTEGER: u32 = 0x02;
    pub const BIT_STRING: u32 = 0x03;
    pub const OCTET_STRING: u32 = 0x04;
    pub const NULL: u32 = 0x05;
    pub const OBJECT_IDENTIFIER: u32 = 0x06;
    pub const ENUMERATED: u32 = 0x0a;
    pub const UTF8_STRING: u32 = 0x0c;
    pub const SEQUENCE: u32 = 0x10;
    pub const SET: u32 = 0x11;
    pub const NUMERIC_STRING: u32 = 0x12;
    pub const PRINTABLE_STRING: u32 = 0x13;
    pub const TELETEX_STRING: u32 = 0x14;
    pub const IA5_STRING: u32 = 0x16;
    pub const UTC_TIME: u32 = 0x17;
    pub const GENERALIZED_TIME: u32 = 0x18;
    pub const VISIBLE_STRING: u32 = 0x1a;
    pub const UNIVERSAL_STRING: u32 = 0x1c;
    pub const BMP_STRING: u32 = 0x1e;
}

/// Tag class from the top two bits of the identifier octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Class {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

impl From<u8> for Class {
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0b00 => Class::Universal,
            0b01 => Class::Application,
            0b10 => Class::ContextSpecific,
            _ => Class::Private,
        }
    }
}

/// Fully classified identifier octets of one TLV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    class: Class,
    constructed: bool,
    number: u32,
    alternative: bool,
}

impl Tag {
    pub fn class(&self) -> Class {
        self.class
    }

    pub fn constructed(&self) -> bool {
        self.constructed
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// True when the tag number was encoded in the multi-byte
    /// high-tag-number form rather than the low five bits.
    pub fn alternative(&self) -> bool {
        self.alternative
    }

    // SEQUENCE and SET always contain nested TLVs; so does any constructed
    // value of a non-universal class. A constructed universal string (BER)
    // keeps its raw content instead.
    fn has_children(&self) -> bool {
        self.constructed
            && (self.class != Class::Universal
                || matches!(self.number, universal::SEQUENCE | universal::SET))
    }
}

/// One decoded tag-length-value node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: Tag,
    value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Primitive(Vec<u8>),
    Constructed(Vec<Tlv>),
}

impl Tlv {
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Content octets for primitively encoded values.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Primitive(data) => Some(data),
            Value::Constructed(_) => None,
        }
    }

    /// Nested TLVs for constructed values, in original encoded order.
    pub fn tlvs(&self) -> Option<&[Tlv]> {
        match &self.value {
            Value::Primitive(_) => None,
            Value::Constructed(tlvs) => Some(tlvs),
        }
    }

    /// Parses one value from the start of `input`, returning it together
    /// with the number of bytes consumed.
    pub fn parse(input: &[u8]) -> Result<(Tlv, usize), Error> {
        Self::parse_at(input, 0, MAX_DEPTH)
    }

    /// Same as [`Tlv::parse`] with an explicit starting depth and nesting
    /// limit, so a caller re-parsing embedded content can keep counting
    /// against its own budget.
    pub fn parse_at(input: &[u8], depth: usize, limit: usize) -> Result<(Tlv, usize), Error> {
        if depth >= limit {
            return Err(Error::TooDeep(limit));
        }

        let (tag, content, consumed) = read_tlv(input)?;

        let value = if tag.has_children() {
            let mut children = Vec::new();
            let mut rest = content;
            while !rest.is_empty() {
                let (child, used) = Self::parse_at(rest, depth + 1, limit)?;
                rest = &rest[used..];
                children.push(child);
            }
            Value::Constructed(children)
        } else {
            Value::Primitive(content.to_vec())
        };

        Ok((Tlv { tag, value }, consumed))
    }
}

/// A well-formed top-level DER/BER buffer: exactly one value, no trailing
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Der {
    tlv: Tlv,
}

impl Der {
    /// Parses `input` as a single value covering the whole buffer.
    ///
    /// A buffer whose top-level value accounts for fewer bytes than the
    /// input holds is rejected with [`Error::TrailingData`]; this is the one
    /// global well-formedness check.
    pub fn parse(input: &[u8]) -> Result<Self, Error> {
        Self::parse_with_limit(input, MAX_DEPTH)
    }

    /// Like [`Der::parse`] with a caller-chosen nesting limit.
    pub fn parse_with_limit(input: &[u8], limit: usize) -> Result<Self, Error> {
        let (tlv, consumed) = Tlv::parse_at(input, 0, limit)?;
        if consumed < input.len() {
            return Err(Error::TrailingData);
        }
        Ok(Der { tlv })
    }

    pub fn tlv(&self) -> &Tlv {
        &self.tlv
    }
}

impl DecodableFrom<&[u8]> for Der {}

impl Decoder<&[u8], Der> for &[u8] {
    type Error = Error;

    fn decode(&self) -> Result<Der, Error> {
        Der::parse(self)
    }
}

impl DecodableFrom<Vec<u8>> for Der {}

impl Decoder<Vec<u8>, Der> for Vec<u8> {
    type Error = Error;

    fn decode(&self) -> Result<Der, Error> {
        Der::parse(self)
    }
}

type ParseResult<'a, O> = IResult<&'a [u8], O, Error>;

/// Reads one tag-length-value from the start of `input`.
///
/// Returns the classified tag, the raw content octets and the total number
/// of bytes consumed (identifier + length + content). Pure: no state, no
/// side effects.
pub fn read_tlv(input: &[u8]) -> Result<(Tag, &[u8], usize), Error> {
    let (rest, (tag, content)) = tlv_parts(input).map_err(Error::from)?;
    Ok((tag, content, input.len() - rest.len()))
}

fn tlv_parts(input: &[u8]) -> ParseResult<'_, (Tag, &[u8])> {
    let (input, tag) = parse_tag(input)?;
    let (input, length) = parse_length(input)?;
    let (input, content) = nom::bytes::complete::take(length).parse(input)?;
    Ok((input, (tag, content)))
}

fn parse_tag(input: &[u8]) -> ParseResult<'_, Tag> {
    let (input, first) = nom::number::be_u8().parse(input)?;
    let class = Class::from(first >> 6);
    let constructed = first & TAG_CONSTRUCTED != 0;

    let low = first & HIGH_TAG_NUMBER;
    if low != HIGH_TAG_NUMBER {
        return Ok((
            input,
            Tag {
                class,
                constructed,
                number: low as u32,
                alternative: false,
            },
        ));
    }

    // High-tag-number form: base-128, most significant octets first, bit 8
    // set on every octet but the last. A leading 0x80 octet carries no bits
    // and is invalid.
    let mut number: u32 = 0;
    let mut rest = input;
    loop {
        let (next, octet) = nom::number::be_u8().parse(rest)?;
        rest = next;
        if number == 0 && octet == 0x80 {
            return Err(nom::Err::Failure(Error::MalformedTag));
        }
        number = number
            .checked_mul(128)
            .and_then(|n| n.checked_add((octet & 0x7f) as u32))
            .ok_or(nom::Err::Failure(Error::MalformedTag))?;
        if octet & 0x80 == 0 {
            break;
        }
    }

    Ok((
        rest,
        Tag {
            class,
            constructed,
            number,
            alternative: true,
        },
    ))
}

fn parse_length(input: &[u8]) -> ParseResult<'_, usize> {
    let (input, first) = nom::number::be_u8().parse(input)?;

    // short form: 0-127 in a single octet
    if first & 0x80 == 0 {
        return Ok((input, first as usize));
    }

    // Long form: the low 7 bits count the following big-endian length
    // octets. Zero means the indefinite (streaming) form, which this
    // decoder does not support; 127 is reserved.
    let count = (first & 0x7f) as usize;
    if count == 0 || count == 0x7f || count > size_of::<usize>() {
        return Err(nom::Err::Failure(Error::MalformedLength));
    }

    let (input, octets) = nom::bytes::complete::take(count).parse(input)?;
    let length = octets
        .iter()
        .fold(0usize, |n, &octet| (n << 8) | octet as usize);
    Ok((input, length))
}
