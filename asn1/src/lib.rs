//! Typed ASN.1 values decoded from a DER/BER TLV tree.
//!
//! [`Element`] is a closed variant over every universal type the dump
//! understands, decided once while decoding and matched exhaustively by the
//! renderer in [`dump`]. Values never outlive the dump call that produced
//! them.

use std::fmt::Display;

use chrono::{DateTime, NaiveDateTime};
use der::{Class, Der, Tlv, universal};
use kaibou::decoder::{DecodableFrom, Decoder};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

pub mod dump;
pub mod error;

pub use error::Error;

/// One decoded ASN.1 value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Boolean(bool),
    Integer(Integer),
    Enumerated(Integer),
    BitString(BitString),
    OctetString(OctetString),
    Null,
    ObjectIdentifier(ObjectIdentifier),
    String(StringKind, String),
    UtcTime(Time),
    GeneralizedTime(Time),
    Sequence(Vec<Element>),
    Set(Vec<Element>),
    Tagged(Tagged),
}

/// Which character-string type a [`Element::String`] came from.
///
/// `Unknown` doubles as the catch-all for universal tags the dump has no
/// dedicated rendering for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    Utf8,
    Printable,
    Ia5,
    Numeric,
    Teletex,
    Universal,
    Bmp,
    Visible,
    Unknown,
}

impl StringKind {
    pub fn label(&self) -> &'static str {
        match self {
            StringKind::Utf8 => "UTF8 STRING",
            StringKind::Printable => "PRINTABLE STRING",
            StringKind::Ia5 => "IA5 STRING",
            StringKind::Numeric => "NUMERIC STRING",
            StringKind::Teletex => "TELETEX STRING",
            StringKind::Universal => "UNIVERSAL STRING",
            StringKind::Bmp => "BMP STRING",
            StringKind::Visible => "VISIBLE STRING",
            StringKind::Unknown => "UNKNOWN STRING",
        }
    }
}

impl TryFrom<&Tlv> for Element {
    type Error = Error;

    fn try_from(tlv: &Tlv) -> Result<Self, Self::Error> {
        let tag = tlv.tag();
        if tag.class() != Class::Universal {
            return Ok(Element::Tagged(Tagged::try_from(tlv)?));
        }

        let data = tlv.data().unwrap_or(&[]);
        match tag.number() {
            universal::BOOLEAN => match data.first() {
                Some(0x00) => Ok(Element::Boolean(false)),
                Some(_) => Ok(Element::Boolean(true)),
                None => Err(Error::InvalidBoolean),
            },
            universal::INTEGER => Ok(Element::Integer(Integer::from(data))),
            universal::ENUMERATED => Ok(Element::Enumerated(Integer::from(data))),
            universal::BIT_STRING => Ok(Element::BitString(BitString::try_from(data)?)),
            universal::OCTET_STRING => Ok(Element::OctetString(OctetString::from(data))),
            universal::NULL => Ok(Element::Null),
            universal::OBJECT_IDENTIFIER => {
                Ok(Element::ObjectIdentifier(ObjectIdentifier::try_from(data)?))
            }
            universal::SEQUENCE => Ok(Element::Sequence(decode_children(tlv, "SEQUENCE")?)),
            universal::SET => Ok(Element::Set(decode_children(tlv, "SET")?)),
            universal::UTF8_STRING => decode_string(StringKind::Utf8, data),
            universal::PRINTABLE_STRING => decode_string(StringKind::Printable, data),
            universal::IA5_STRING => decode_string(StringKind::Ia5, data),
            universal::NUMERIC_STRING => decode_string(StringKind::Numeric, data),
            universal::TELETEX_STRING => decode_string(StringKind::Teletex, data),
            universal::UNIVERSAL_STRING => decode_string(StringKind::Universal, data),
            universal::BMP_STRING => decode_string(StringKind::Bmp, data),
            universal::VISIBLE_STRING => decode_string(StringKind::Visible, data),
            universal::UTC_TIME => Ok(Element::UtcTime(Time::parse_utc(data)?)),
            universal::GENERALIZED_TIME => Ok(Element::GeneralizedTime(Time::parse_generalized(data)?)),
            _ => decode_string(StringKind::Unknown, data),
        }
    }
}

fn decode_children(tlv: &Tlv, label: &'static str) -> Result<Vec<Element>, Error> {
    match tlv.tlvs() {
        Some(tlvs) => tlvs.iter().map(Element::try_from).collect(),
        // a primitive-encoded SEQUENCE/SET is only tolerable when empty
        None if tlv.data().is_some_and(|d| d.is_empty()) => Ok(Vec::new()),
        None => Err(Error::NotConstructed(label)),
    }
}

fn decode_string(kind: StringKind, data: &[u8]) -> Result<Element, Error> {
    let text = match kind {
        StringKind::Utf8 => {
            String::from_utf8(data.to_vec()).map_err(|_| Error::InvalidUtf8String)?
        }
        // ASCII-based types; mapping bytes through Latin-1 keeps malformed
        // input visible instead of failing the whole dump
        StringKind::Printable
        | StringKind::Ia5
        | StringKind::Numeric
        | StringKind::Visible
        | StringKind::Teletex => data.iter().map(|&b| b as char).collect(),
        StringKind::Bmp => decode_bmp(data)?,
        StringKind::Universal => decode_universal_string(data)?,
        StringKind::Unknown => String::from_utf8_lossy(data).into_owned(),
    };
    Ok(Element::String(kind, text))
}

fn decode_bmp(data: &[u8]) -> Result<String, Error> {
    if data.len() % 2 != 0 {
        return Err(Error::BmpStringOddLength(data.len()));
    }
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|_| Error::BmpStringInvalidCodeUnit)
}

fn decode_universal_string(data: &[u8]) -> Result<String, Error> {
    if data.len() % 4 != 0 {
        return Err(Error::UniversalStringInvalidLength(data.len()));
    }
    data.chunks_exact(4)
        .map(|quad| {
            let code = u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]]);
            char::from_u32(code).ok_or(Error::UniversalStringInvalidCodePoint(code))
        })
        .collect()
}

impl DecodableFrom<Der> for Element {}

impl Decoder<Der, Element> for Der {
    type Error = Error;

    fn decode(&self) -> Result<Element, Error> {
        Element::try_from(self.tlv())
    }
}

/// Arbitrary-size ASN.1 INTEGER, big-endian two's complement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Integer {
    inner: BigInt,
}

impl Integer {
    /// The value when it fits the signed 64-bit range.
    pub fn to_i64(&self) -> Option<i64> {
        self.inner.to_i64()
    }

    /// Minimal big-endian two's-complement content octets.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        self.inner.to_signed_bytes_be()
    }
}

impl From<&[u8]> for Integer {
    fn from(value: &[u8]) -> Self {
        Integer {
            inner: BigInt::from_signed_bytes_be(value),
        }
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// ASN.1 BIT STRING: content octets with the unused-bit count split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    unused: u8,
    data: Vec<u8>,
}

impl BitString {
    /// The bit data without the leading unused-bit-count octet.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl TryFrom<&[u8]> for BitString {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        match value.first() {
            Some(&unused) if unused > 7 => Err(Error::BitStringUnusedBitsOutOfRange(unused)),
            Some(&unused) => Ok(BitString {
                unused,
                data: value[1..].to_vec(),
            }),
            None => Err(Error::BitStringNoData),
        }
    }
}

impl Display for BitString {
    /// Renders the bits as a string of binary digits, dropping the unused
    /// bits of the final octet.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, byte) in self.data.iter().enumerate() {
            if i == self.data.len() - 1 && self.unused > 0 {
                let valid = byte >> self.unused;
                let count = 8 - self.unused as usize;
                write!(f, "{:0count$b}", valid)?;
            } else {
                write!(f, "{:08b}", byte)?;
            }
        }
        Ok(())
    }
}

/// ASN.1 OCTET STRING content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctetString {
    inner: Vec<u8>,
}

impl OctetString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }
}

impl From<&[u8]> for OctetString {
    fn from(value: &[u8]) -> Self {
        OctetString {
            inner: value.to_vec(),
        }
    }
}

impl Display for OctetString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.inner {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// OBJECT IDENTIFIER rendered as its dotted-decimal components.
///
/// No name lookup happens here; mapping an OID to a display name is an
/// external concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectIdentifier {
    components: Vec<u64>,
}

impl TryFrom<&[u8]> for ObjectIdentifier {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let Some(&first) = value.first() else {
            return Err(Error::ObjectIdentifierNoData);
        };

        // The first octet packs the first two components as 40*X+Y, with X
        // capped at 2.
        let mut components = Vec::new();
        let (x, y) = match first {
            0..=79 => ((first / 40) as u64, (first % 40) as u64),
            _ => (2, first as u64 - 80),
        };
        components.push(x);
        components.push(y);

        let mut value_acc = 0u64;
        let mut pending = false;
        for &octet in &value[1..] {
            value_acc = value_acc
                .checked_mul(128)
                .and_then(|n| n.checked_add((octet & 0x7f) as u64))
                .ok_or(Error::ObjectIdentifierArcOverflow)?;
            if octet & 0x80 == 0 {
                components.push(value_acc);
                value_acc = 0;
                pending = false;
            } else {
                pending = true;
            }
        }
        if pending {
            return Err(Error::ObjectIdentifierIncompleteEncoding);
        }

        Ok(ObjectIdentifier { components })
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut components = self.components.iter();
        if let Some(first) = components.next() {
            write!(f, "{}", first)?;
            for n in components {
                write!(f, ".{}", n)?;
            }
        }
        Ok(())
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

/// A parsed UTCTime or GeneralizedTime together with its raw time string,
/// which the dump echoes back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Time {
    time: NaiveDateTime,
    raw: String,
}

impl Time {
    pub fn time(&self) -> NaiveDateTime {
        self.time
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parses UTCTime: `YYMMDDHHMM[SS](Z|±HHMM)`.
    pub fn parse_utc(data: &[u8]) -> Result<Self, Error> {
        let raw = std::str::from_utf8(data)
            .map_err(|_| Error::InvalidUtcTime(String::from_utf8_lossy(data).into_owned()))?;
        parse_time(
            raw,
            &["%y%m%d%H%M%SZ", "%y%m%d%H%MZ"],
            &["%y%m%d%H%M%S%z", "%y%m%d%H%M%z"],
        )
        .map(|time| Time {
            time,
            raw: raw.to_string(),
        })
        .ok_or_else(|| Error::InvalidUtcTime(raw.to_string()))
    }

    /// Parses GeneralizedTime: `YYYYMMDDHHMMSS[.f…](Z|±HHMM)?`.
    pub fn parse_generalized(data: &[u8]) -> Result<Self, Error> {
        let raw = std::str::from_utf8(data).map_err(|_| {
            Error::InvalidGeneralizedTime(String::from_utf8_lossy(data).into_owned())
        })?;
        parse_time(
            raw,
            &[
                "%Y%m%d%H%M%SZ",
                "%Y%m%d%H%M%S%.fZ",
                "%Y%m%d%H%M%S",
                "%Y%m%d%H%MZ",
            ],
            &["%Y%m%d%H%M%S%z", "%Y%m%d%H%M%S%.f%z"],
        )
        .map(|time| Time {
            time,
            raw: raw.to_string(),
        })
        .ok_or_else(|| Error::InvalidGeneralizedTime(raw.to_string()))
    }
}

fn parse_time(raw: &str, naive: &[&str], with_offset: &[&str]) -> Option<NaiveDateTime> {
    for format in naive {
        if let Ok(time) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(time);
        }
    }
    for format in with_offset {
        if let Ok(time) = DateTime::parse_from_str(raw, format) {
            return Some(time.naive_utc());
        }
    }
    None
}

/// A context-, application- or private-class tagged value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tagged {
    number: u32,
    explicit: bool,
    alternative: bool,
    content: TaggedContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaggedContent {
    /// Zero-length value.
    Empty,
    /// Explicit tagging: the decoded wrapped value(s).
    Elements(Vec<Element>),
    /// Implicit tagging: opaque content octets. The wire carries no type
    /// information, so interpretation is left to the renderer's prober.
    Raw(Vec<u8>),
}

impl Tagged {
    pub fn number(&self) -> u32 {
        self.number
    }

    /// True for constructed (explicit) tagging.
    pub fn explicit(&self) -> bool {
        self.explicit
    }

    /// True when the tag number used the high-tag-number encoding.
    pub fn alternative(&self) -> bool {
        self.alternative
    }

    pub fn content(&self) -> &TaggedContent {
        &self.content
    }
}

impl TryFrom<&Tlv> for Tagged {
    type Error = Error;

    fn try_from(tlv: &Tlv) -> Result<Self, Self::Error> {
        let tag = tlv.tag();
        let content = match (tlv.tlvs(), tlv.data()) {
            (Some([]), _) | (_, Some([])) => TaggedContent::Empty,
            (Some(tlvs), _) => TaggedContent::Elements(
                tlvs.iter()
                    .map(Element::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            (_, Some(data)) => TaggedContent::Raw(data.to_vec()),
            (None, None) => TaggedContent::Empty,
        };
        Ok(Tagged {
            number: tag.number(),
            explicit: tag.constructed(),
            alternative: tag.alternative(),
            content,
        })
    }
}
