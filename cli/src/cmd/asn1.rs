use asn1::dump::{DEFAULT_MAX_DEPTH, Dumper, Indent};
use clap::{Args, Subcommand};

use crate::error::Result;
use crate::utils::read_der_input;

#[derive(Subcommand)]
pub(crate) enum Asn1Commands {
    /// Dump DER/BER-encoded data as an indented text tree
    Dump {
        #[command(flatten)]
        config: DumpConfig,
    },
}

#[derive(Args)]
pub(crate) struct DumpConfig {
    /// Path to the DER or PEM file. If not specified, reads from stdin
    file: Option<String>,

    /// Indent with one tab per level instead of spaces
    #[arg(long)]
    tab: bool,

    /// Number of spaces per indent level
    #[arg(long, default_value_t = 4, conflicts_with = "tab")]
    indent_width: usize,

    /// Maximum nesting depth
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

pub(crate) fn dump(config: DumpConfig) -> Result<()> {
    let der_bytes = read_der_input(config.file.as_deref())?;

    let indent = if config.tab {
        Indent::tab()
    } else {
        Indent::new(' ', config.indent_width)
    };
    let dumper = Dumper::new(indent).with_max_depth(config.max_depth);

    print!("{}", dumper.dump(&der_bytes)?);

    Ok(())
}
