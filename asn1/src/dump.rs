//! Indented text dump of DER/BER-encoded data.
//!
//! [`Dumper`] turns a byte buffer into a human-readable tree, one line per
//! primitive value and brace-delimited blocks for constructed ones. OCTET
//! STRING and BIT STRING payloads are probed for nested encodings and shown
//! recursively when the probe succeeds; everything that resists
//! interpretation falls back to a side-by-side hex/clear dump.
//!
//! A `Dumper` is immutable after construction. The nesting depth travels as
//! a parameter through every recursive call, so one instance can serve any
//! number of threads on independent inputs.

use der::Der;
use kaibou::decoder::Decoder;

use crate::error::Error;
use crate::{Element, Tagged, TaggedContent};

/// Default cap on render depth, matching the decoder's parse limit.
pub const DEFAULT_MAX_DEPTH: usize = der::MAX_DEPTH;

const BYTES_PER_LINE: usize = 16;

/// Indentation unit: a character repeated `width` times per nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indent {
    unit: char,
    width: usize,
}

impl Indent {
    pub const fn new(unit: char, width: usize) -> Self {
        Indent { unit, width }
    }

    /// Four spaces per level.
    pub const fn spaces() -> Self {
        Indent::new(' ', 4)
    }

    /// One tab per level.
    pub const fn tab() -> Self {
        Indent::new('\t', 1)
    }

    /// The prefix string for a given nesting depth.
    pub fn prefix(&self, depth: usize) -> String {
        std::iter::repeat(self.unit)
            .take(self.width * depth)
            .collect()
    }
}

impl Default for Indent {
    fn default() -> Self {
        Indent::spaces()
    }
}

/// Renders DER/BER buffers as indented text trees.
#[derive(Debug, Clone, Copy)]
pub struct Dumper {
    indent: Indent,
    max_depth: usize,
}

impl Default for Dumper {
    fn default() -> Self {
        Dumper {
            indent: Indent::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Dumper {
    pub fn new(indent: Indent) -> Self {
        Dumper {
            indent,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Dumps one DER/BER-encoded value as a newline-terminated multi-line
    /// string.
    ///
    /// # Errors
    ///
    /// Propagates every decode error: truncation, malformed tag or length
    /// octets, trailing bytes after the top-level value, nesting past the
    /// depth limit, and unparseable UTCTime/GeneralizedTime content.
    pub fn dump(&self, input: &[u8]) -> Result<String, Error> {
        let der = Der::parse_with_limit(input, self.max_depth)?;
        let element: Element = der.decode()?;
        let mut out = String::new();
        self.render(&element, 0, &mut out);
        Ok(out)
    }

    fn render(&self, element: &Element, depth: usize, out: &mut String) {
        let pad = self.indent.prefix(depth);
        match element {
            Element::Boolean(b) => out.push_str(&format!("{pad}BOOLEAN={b}\n")),
            Element::Integer(integer) => match integer.to_i64() {
                Some(v) if v >= 10 => out.push_str(&format!("{pad}INTEGER={v} (0x{v:x})\n")),
                Some(v) => out.push_str(&format!("{pad}INTEGER={v}\n")),
                // too wide for decimal display
                None => {
                    out.push_str(&format!("{pad}INTEGER\n"));
                    hex_clear(&integer.to_be_bytes(), &self.indent, depth + 1, out);
                }
            },
            Element::Enumerated(integer) => out.push_str(&format!("{pad}ENUMERATED={integer}\n")),
            Element::Null => out.push_str(&format!("{pad}NULL\n")),
            Element::ObjectIdentifier(oid) => {
                out.push_str(&format!("{pad}OBJECT IDENTIFIER={oid}\n"))
            }
            Element::OctetString(octets) => match self.probe(octets.as_bytes(), depth) {
                Ok(body) => {
                    out.push_str(&format!("{pad}OCTET STRING, encapsulates:\n"));
                    out.push_str(&body);
                }
                Err(_) => self.render_opaque("OCTET STRING", octets.as_bytes(), depth, out),
            },
            Element::BitString(bits) => match self.probe(bits.as_bytes(), depth) {
                Ok(body) => {
                    out.push_str(&format!("{pad}BIT STRING, encapsulates:\n"));
                    out.push_str(&body);
                }
                Err(_) => {
                    if bits.as_bytes().len() < 8 {
                        out.push_str(&format!("{pad}BIT STRING={bits}\n"));
                    } else {
                        out.push_str(&format!("{pad}BIT STRING\n"));
                        hex_clear(bits.as_bytes(), &self.indent, depth + 1, out);
                    }
                }
            },
            Element::String(kind, text) => {
                out.push_str(&format!("{pad}{}='{text}'\n", kind.label()))
            }
            Element::UtcTime(time) => out.push_str(&format!(
                "{pad}UTC TIME={} ({})\n",
                time.time().format("%Y-%m-%d %H:%M:%S"),
                time.raw()
            )),
            Element::GeneralizedTime(time) => out.push_str(&format!(
                "{pad}GENERALIZED TIME={} ({})\n",
                time.time().format("%Y-%m-%d %H:%M:%S%.3f"),
                time.raw()
            )),
            Element::Sequence(children) => self.render_block("SEQUENCE", children, depth, out),
            Element::Set(children) => self.render_block("SET", children, depth, out),
            Element::Tagged(tagged) => self.render_tagged(tagged, depth, out),
        }
    }

    fn render_block(&self, label: &str, children: &[Element], depth: usize, out: &mut String) {
        let pad = self.indent.prefix(depth);
        out.push_str(&format!("{pad}{label} {{\n"));
        for child in children {
            self.render(child, depth + 1, out);
        }
        out.push_str(&format!("{pad}}}\n"));
    }

    fn render_tagged(&self, tagged: &Tagged, depth: usize, out: &mut String) {
        let pad = self.indent.prefix(depth);
        let marker = if tagged.alternative() { "*" } else { "" };
        let qualifier = if tagged.explicit() { "" } else { " IMPLICIT" };
        out.push_str(&format!(
            "{pad}TAGGED [{marker}{}]{qualifier} :\n",
            tagged.number()
        ));

        match tagged.content() {
            TaggedContent::Empty => {
                out.push_str(&format!("{}EMPTY\n", self.indent.prefix(depth + 1)))
            }
            TaggedContent::Elements(children) => {
                for child in children {
                    self.render(child, depth + 1, out);
                }
            }
            // Implicit tagging strips the type information, so the content
            // gets the same treatment as an octet-string payload.
            TaggedContent::Raw(bytes) => match self.probe(bytes, depth) {
                Ok(body) => out.push_str(&body),
                Err(_) => {
                    if bytes.len() < 8 {
                        out.push_str(&format!(
                            "{}{}\n",
                            self.indent.prefix(depth + 1),
                            inline_hex(bytes)
                        ));
                    } else {
                        hex_clear(bytes, &self.indent, depth + 1, out);
                    }
                }
            },
        }
    }

    fn render_opaque(&self, label: &str, bytes: &[u8], depth: usize, out: &mut String) {
        let pad = self.indent.prefix(depth);
        if bytes.len() < 8 {
            out.push_str(&format!("{pad}{label}={}\n", inline_hex(bytes)));
        } else {
            out.push_str(&format!("{pad}{label}\n"));
            hex_clear(bytes, &self.indent, depth + 1, out);
        }
    }

    /// Encapsulation prober: tries to reinterpret `payload` as a nested
    /// DER/BER value and render it one level deeper.
    ///
    /// Accepts only when decoding raises no error and the reparsed value
    /// accounts for no fewer bytes than the payload holds (the trailing-data
    /// check). Any error returned here is recovered by the caller with a
    /// hex fallback; it never propagates further.
    fn probe(&self, payload: &[u8], depth: usize) -> Result<String, Error> {
        if depth + 1 >= self.max_depth {
            return Err(Error::Der(der::Error::TooDeep(self.max_depth)));
        }
        // the nested value only gets the depth budget left at this point
        let parsed = Der::parse_with_limit(payload, self.max_depth - depth - 1)?;
        let element: Element = parsed.decode()?;
        let mut body = String::new();
        self.render(&element, depth + 1, &mut body);
        Ok(body)
    }
}

/// Dumps one DER/BER-encoded value with the default configuration.
pub fn dump_der(input: &[u8]) -> Result<String, Error> {
    Dumper::default().dump(input)
}

/// Renders a raw byte buffer as an unindented hex/clear dump.
pub fn hex_clear_dump(data: &[u8]) -> String {
    let mut out = String::new();
    hex_clear(data, &Indent::default(), 0, &mut out);
    out
}

fn inline_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

// 16 bytes per line, hex column and printable column side by side. Short
// final lines are padded so the printable column stays aligned.
fn hex_clear(data: &[u8], indent: &Indent, depth: usize, out: &mut String) {
    let pad = indent.prefix(depth);
    for chunk in data.chunks(BYTES_PER_LINE) {
        out.push_str(&pad);

        for (i, byte) in chunk.iter().enumerate() {
            out.push_str(&format!("{:02X} ", byte));
            if i == 7 {
                out.push(' ');
            }
        }
        for i in chunk.len()..BYTES_PER_LINE {
            out.push_str("   ");
            if i == 7 {
                out.push(' ');
            }
        }

        // two more spaces on top of the trailing one: 3-space separator
        out.push_str("  ");
        for &byte in chunk {
            let c = byte as char;
            out.push(if c.is_control() { '.' } else { c });
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use kaibou::decoder::Decoder;
    use pem::Pem;
    use rstest::rstest;

    use super::*;
    use crate::error::Error;

    #[rstest(depth, expected,
        case(0, ""),
        case(1, "    "),
        case(3, "            "),
    )]
    fn test_indent_spaces(depth: usize, expected: &str) {
        assert_eq!(expected, Indent::spaces().prefix(depth));
    }

    #[test]
    fn test_indent_tab() {
        assert_eq!("\t\t", Indent::tab().prefix(2));
    }

    #[rstest(input, expected,
        case(vec![0x01, 0x01, 0xff], "BOOLEAN=true\n"),
        case(vec![0x01, 0x01, 0x00], "BOOLEAN=false\n"),
        case(vec![0x02, 0x01, 0x05], "INTEGER=5\n"),
        case(vec![0x02, 0x02, 0x00, 0xff], "INTEGER=255 (0xff)\n"),
        case(vec![0x02, 0x01, 0x09], "INTEGER=9\n"),
        case(vec![0x02, 0x01, 0x0a], "INTEGER=10 (0xa)\n"),
        case(vec![0x0a, 0x01, 0x2a], "ENUMERATED=42\n"),
        case(vec![0x05, 0x00], "NULL\n"),
        case(vec![0x13, 0x02, 0x68, 0x69], "PRINTABLE STRING='hi'\n"),
        case(vec![0x0c, 0x04, 0xf0, 0x9f, 0x98, 0x8e], "UTF8 STRING='😎'\n"),
    )]
    fn test_dump_primitives(input: Vec<u8>, expected: &str) {
        assert_eq!(expected, dump_der(&input).unwrap());
    }

    #[test]
    fn test_dump_object_identifier_verbatim() {
        let input = [
            0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01,
        ];
        assert_eq!(
            "OBJECT IDENTIFIER=1.2.840.113549.1.1.1\n",
            dump_der(&input).unwrap()
        );
    }

    #[test]
    fn test_dump_large_integer_uses_hex_dump() {
        let mut input = vec![0x02, 0x81, 0x82, 0x01];
        input.extend(std::iter::repeat_n(0xab, 129));
        let out = dump_der(&input).unwrap();

        let mut lines = out.lines();
        assert_eq!(Some("INTEGER"), lines.next());
        // 130 content bytes over 16-byte lines
        assert_eq!(9, lines.count());
        assert!(!out.contains('='));
    }

    #[test]
    fn test_dump_sequence_renders_children_in_order() {
        let input = [
            0x30, 0x09, 0x02, 0x01, 0x07, 0x02, 0x01, 0x08, 0x02, 0x01, 0x09,
        ];
        let expected = "SEQUENCE {\n    INTEGER=7\n    INTEGER=8\n    INTEGER=9\n}\n";
        assert_eq!(expected, dump_der(&input).unwrap());
    }

    #[test]
    fn test_dump_set() {
        let input = [0x31, 0x03, 0x02, 0x01, 0x01];
        assert_eq!("SET {\n    INTEGER=1\n}\n", dump_der(&input).unwrap());
    }

    #[test]
    fn test_dump_octet_string_encapsulation() {
        // OCTET STRING wrapping SEQUENCE { INTEGER=7 }
        let input = [0x04, 0x05, 0x30, 0x03, 0x02, 0x01, 0x07];
        let expected = "OCTET STRING, encapsulates:\n    SEQUENCE {\n        INTEGER=7\n    }\n";
        assert_eq!(expected, dump_der(&input).unwrap());
    }

    #[test]
    fn test_dump_octet_string_opaque_short() {
        let input = [0x04, 0x03, 0xfe, 0xff, 0x00];
        assert_eq!("OCTET STRING=FE FF 00\n", dump_der(&input).unwrap());
    }

    #[test]
    fn test_dump_octet_string_opaque_long() {
        // 20 bytes that do not parse as a nested value
        let mut input = vec![0x04, 0x14];
        input.extend((0xe0u8..0xf4).collect::<Vec<_>>());
        let out = dump_der(&input).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(3, lines.len());
        assert_eq!("OCTET STRING", lines[0]);
        assert!(lines[1].starts_with("    E0 "));
    }

    #[test]
    fn test_dump_bit_string_short_binary() {
        // 3 content bytes, no unused bits: 24 binary digits
        let input = [0x03, 0x04, 0x00, 0xb5, 0xf0, 0x0d];
        let out = dump_der(&input).unwrap();
        let digits = out
            .trim_end()
            .strip_prefix("BIT STRING=")
            .unwrap();
        assert_eq!(24, digits.len());
        assert!(digits.chars().all(|c| c == '0' || c == '1'));
    }

    #[test]
    fn test_dump_bit_string_long_hex() {
        let input = [
            0x03, 0x0b, 0x00, 0xfe, 0xfe, 0xfe, 0xfe, 0xfe, 0xfe, 0xfe, 0xfe, 0xfe, 0xfe,
        ];
        let out = dump_der(&input).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(2, lines.len());
        assert_eq!("BIT STRING", lines[0]);
        assert!(lines[1].starts_with("    FE "));
    }

    #[test]
    fn test_dump_bit_string_encapsulation() {
        // BIT STRING with zero unused bits wrapping SEQUENCE { INTEGER=1 }
        let input = [0x03, 0x06, 0x00, 0x30, 0x03, 0x02, 0x01, 0x01];
        let out = dump_der(&input).unwrap();
        assert!(out.starts_with("BIT STRING, encapsulates:\n"));
        assert!(out.contains("SEQUENCE {"));
    }

    #[test]
    fn test_dump_empty_implicit_tag() {
        let input = [0x80, 0x00];
        assert_eq!(
            "TAGGED [0] IMPLICIT :\n    EMPTY\n",
            dump_der(&input).unwrap()
        );
    }

    #[test]
    fn test_dump_explicit_tag() {
        let input = [0xa0, 0x03, 0x02, 0x01, 0x05];
        assert_eq!(
            "TAGGED [0] :\n    INTEGER=5\n",
            dump_der(&input).unwrap()
        );
    }

    #[test]
    fn test_dump_alternative_form_tag() {
        // [31] IMPLICIT, high-tag-number form
        let input = [0x9f, 0x1f, 0x01, 0xcc];
        let out = dump_der(&input).unwrap();
        assert!(out.starts_with("TAGGED [*31] IMPLICIT :\n"));
    }

    #[test]
    fn test_dump_utc_time() {
        let mut input = vec![0x17, 0x0d];
        input.extend_from_slice(b"191216030210Z");
        assert_eq!(
            "UTC TIME=2019-12-16 03:02:10 (191216030210Z)\n",
            dump_der(&input).unwrap()
        );
    }

    #[test]
    fn test_dump_generalized_time() {
        let mut input = vec![0x18, 0x0f];
        input.extend_from_slice(b"20191216030210Z");
        assert_eq!(
            "GENERALIZED TIME=2019-12-16 03:02:10.000 (20191216030210Z)\n",
            dump_der(&input).unwrap()
        );
    }

    #[test]
    fn test_dump_invalid_time_propagates() {
        let input = [0x17, 0x04, b'j', b'u', b'n', b'k'];
        assert!(matches!(
            dump_der(&input).unwrap_err(),
            Error::InvalidUtcTime(_)
        ));
    }

    #[test]
    fn test_dump_rejects_trailing_data() {
        let input = [0x02, 0x01, 0x05, 0x00];
        assert!(matches!(
            dump_der(&input).unwrap_err(),
            Error::Der(der::Error::TrailingData)
        ));
    }

    #[test]
    fn test_dump_is_deterministic() {
        let input = [
            0x30, 0x0a, 0x02, 0x01, 0x2a, 0x04, 0x03, 0x01, 0x02, 0x03, 0x05, 0x00,
        ];
        let first = dump_der(&input).unwrap();
        let second = dump_der(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_dump_max_depth_caps_parsing() {
        // SEQUENCE { SEQUENCE { SEQUENCE { INTEGER=1 } } }
        let input = [0x30, 0x07, 0x30, 0x05, 0x30, 0x03, 0x02, 0x01, 0x01];

        let err = Dumper::default().with_max_depth(2).dump(&input).unwrap_err();
        assert!(matches!(err, Error::Der(der::Error::TooDeep(2))));

        let out = Dumper::default().with_max_depth(4).dump(&input).unwrap();
        assert!(out.contains("INTEGER=1"));
    }

    #[test]
    fn test_dump_probe_counts_against_max_depth() {
        // OCTET STRING wrapping SEQUENCE { INTEGER=7 }: with only two levels
        // of budget the nested value cannot be rendered, so the payload
        // falls back to hex instead of encapsulating
        let input = [0x04, 0x05, 0x30, 0x03, 0x02, 0x01, 0x07];
        let out = Dumper::default().with_max_depth(2).dump(&input).unwrap();
        assert_eq!("OCTET STRING=30 03 02 01 07\n", out);
    }

    #[test]
    fn test_dump_with_tab_indent() {
        let input = [0x30, 0x03, 0x02, 0x01, 0x01];
        let out = Dumper::new(Indent::tab()).dump(&input).unwrap();
        assert_eq!("SEQUENCE {\n\tINTEGER=1\n}\n", out);
    }

    #[test]
    fn test_hex_clear_dump_alignment() {
        let data: Vec<u8> = (0x41..0x55).collect(); // 20 printable bytes
        let out = hex_clear_dump(&data);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(2, lines.len());
        // ASCII columns line up across full and short lines
        let first_ascii = lines[0].find("ABCDEFGHIJKLMNOP").unwrap();
        let second_ascii = lines[1].find("QRST").unwrap();
        assert_eq!(first_ascii, second_ascii);
    }

    #[test]
    fn test_hex_clear_dump_marks_unprintable_bytes() {
        let out = hex_clear_dump(&[0x00, 0x41, 0x1f, 0x7f, 0x20]);
        assert!(out.ends_with(".A.. \n"));
    }

    #[test]
    fn test_hex_clear_dump_eight_byte_gap() {
        let out = hex_clear_dump(&[0u8; 16]);
        assert!(out.starts_with("00 00 00 00 00 00 00 00  00 "));
    }

    const TEST_PEM_CERT: &str = r"-----BEGIN CERTIFICATE-----
MIICLDCCAdKgAwIBAgIBADAKBggqhkjOPQQDAjB9MQswCQYDVQQGEwJCRTEPMA0G
A1UEChMGR251VExTMSUwIwYDVQQLExxHbnVUTFMgY2VydGlmaWNhdGUgYXV0aG9y
aXR5MQ8wDQYDVQQIEwZMZXV2ZW4xJTAjBgNVBAMTHEdudVRMUyBjZXJ0aWZpY2F0
ZSBhdXRob3JpdHkwHhcNMTEwNTIzMjAzODIxWhcNMTIxMjIyMDc0MTUxWjB9MQsw
CQYDVQQGEwJCRTEPMA0GA1UEChMGR251VExTMSUwIwYDVQQLExxHbnVUTFMgY2Vy
dGlmaWNhdGUgYXV0aG9yaXR5MQ8wDQYDVQQIEwZMZXV2ZW4xJTAjBgNVBAMTHEdu
dVRMUyBjZXJ0aWZpY2F0ZSBhdXRob3JpdHkwWTATBgcqhkjOPQIBBggqhkjOPQMB
BwNCAARS2I0jiuNn14Y2sSALCX3IybqiIJUvxUpj+oNfzngvj/Niyv2394BWnW4X
uQ4RTEiywK87WRcWMGgJB5kX/t2no0MwQTAPBgNVHRMBAf8EBTADAQH/MA8GA1Ud
DwEB/wQFAwMHBgAwHQYDVR0OBBYEFPC0gf6YEr+1KLlkQAPLzB9mTigDMAoGCCqG
SM49BAMCA0gAMEUCIDGuwD1KPyG+hRf88MeyMQcqOFZD0TbVleF+UsAGQ4enAiEA
l4wOuDwKQa+upc8GftXE2C//4mKANBC6It01gUaTIpo=
-----END CERTIFICATE-----";

    #[test]
    fn test_dump_full_certificate() {
        let pem = Pem::from_str(TEST_PEM_CERT).unwrap();
        let der_bytes: Vec<u8> = pem.decode().unwrap();
        let out = dump_der(&der_bytes).unwrap();

        assert!(out.starts_with("SEQUENCE {\n"));
        // signature algorithm: ecdsa-with-SHA256
        assert!(out.contains("OBJECT IDENTIFIER=1.2.840.10045.4.3.2"));
        // issuer attributes
        assert!(out.contains("PRINTABLE STRING='GnuTLS certificate authority'"));
        // validity
        assert!(out.contains("UTC TIME=2011-05-23 20:38:21 (110523203821Z)"));
        // version wrapper
        assert!(out.contains("TAGGED [0] :"));
    }
}
