use clap::{Parser, Subcommand};

mod cmd;
mod error;
mod utils;

use cmd::asn1::Asn1Commands;
use cmd::der::DerCommands;
use error::Result;

#[derive(Parser)]
#[command(name = "kaibou")]
#[command(about = "DER/BER dissection toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// ASN.1 operations
    Asn1 {
        #[command(subcommand)]
        command: Asn1Commands,
    },
    /// DER encoding operations
    Der {
        #[command(subcommand)]
        command: DerCommands,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Asn1 { command } => match command {
            Asn1Commands::Dump { config } => {
                cmd::asn1::dump(config)?;
            }
        },
        Commands::Der { command } => match command {
            DerCommands::Decode { config } => {
                cmd::der::decode(config)?;
            }
            DerCommands::Dump { config } => {
                cmd::der::dump(config)?;
            }
        },
    }

    Ok(())
}
