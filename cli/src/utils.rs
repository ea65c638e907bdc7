use std::fs;
use std::io::{self, Read};
use std::str::FromStr;

use kaibou::decoder::Decoder;
use pem::Pem;

use crate::error::Result;

/// Read input from a file or stdin
///
/// If `file` is `Some`, reads from the specified file path.
/// If `file` is `None`, reads from stdin.
pub(crate) fn read_input(file: Option<&str>) -> Result<Vec<u8>> {
    match file {
        Some(path) => Ok(fs::read(path)?),
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Read input and return DER bytes.
///
/// Textual input carrying a PEM boundary is decoded to its DER body;
/// anything else passes through as raw DER.
pub(crate) fn read_der_input(file: Option<&str>) -> Result<Vec<u8>> {
    let raw = read_input(file)?;
    if let Ok(text) = std::str::from_utf8(&raw) {
        if Pem::detect(text) {
            let pem = Pem::from_str(text)?;
            let der_bytes: Vec<u8> = pem.decode()?;
            return Ok(der_bytes);
        }
    }
    Ok(raw)
}
