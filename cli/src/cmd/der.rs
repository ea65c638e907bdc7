use std::io::{self, Write};
use std::str::FromStr;

use asn1::dump::hex_clear_dump;
use clap::{Args, Subcommand};
use kaibou::decoder::Decoder;
use pem::Pem;

use crate::error::Result;
use crate::utils::{read_der_input, read_input};

#[derive(Subcommand)]
pub(crate) enum DerCommands {
    /// Extract the DER body from a PEM file
    Decode {
        #[command(flatten)]
        config: DecodeConfig,
    },
    /// Show raw DER bytes as a hex/clear dump
    Dump {
        #[command(flatten)]
        config: DumpConfig,
    },
}

#[derive(Args)]
pub(crate) struct DecodeConfig {
    /// Path to the PEM file. If not specified, reads from stdin
    file: Option<String>,

    /// Output as hexadecimal dump instead of binary
    #[arg(long)]
    hex: bool,
}

pub(crate) fn decode(config: DecodeConfig) -> Result<()> {
    let input_bytes = read_input(config.file.as_deref())?;

    let contents = String::from_utf8(input_bytes)?;
    let pem = Pem::from_str(&contents)?;
    let der_bytes: Vec<u8> = pem.decode()?;

    if config.hex {
        print!("{}", hex_clear_dump(&der_bytes));
    } else {
        io::stdout().write_all(&der_bytes)?;
    }

    Ok(())
}

#[derive(Args)]
pub(crate) struct DumpConfig {
    /// Path to the DER or PEM file. If not specified, reads from stdin
    file: Option<String>,
}

pub(crate) fn dump(config: DumpConfig) -> Result<()> {
    let der_bytes = read_der_input(config.file.as_deref())?;
    print!("{}", hex_clear_dump(&der_bytes));

    Ok(())
}
