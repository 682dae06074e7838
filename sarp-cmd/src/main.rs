mod beacon;
mod decode;
mod info;

use std::io::stderr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sarp::{DecodeOpts, Dialect};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
struct DecodeArgs {
    /// Dialect used to decode messages.
    ///
    /// One of "SARSAT SARP-2", "SARSAT SARP-3" or "COSPAS SARP-2". Case, spaces and dashes
    /// are ignored, e.g., sarsat-sarp2 is accepted.
    #[arg(short, long, default_value_t = Dialect::default())]
    dialect: Dialect,

    /// Symbols have inverted polarity.
    #[arg(short, long, action)]
    inverted: bool,
}

impl From<&DecodeArgs> for DecodeOpts {
    fn from(args: &DecodeArgs) -> Self {
        DecodeOpts::builder()
            .dialect(args.dialect)
            .inverted(args.inverted)
            .build()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Decode frames from a recorded symbol file.
    ///
    /// The input contains one byte per demodulated symbol, where 1 is a set symbol. Symbols
    /// are consumed in blocks of 1200, one frame per block.
    Decode {
        /// Input symbol file
        input: PathBuf,

        #[command(flatten)]
        args: DecodeArgs,

        /// Output format. Json writes one frame per line, text writes accepted messages and
        /// their beacons.
        #[arg(short, long, default_value = "json")]
        format: info::Format,

        /// Include frames that failed synchronization or format checks.
        #[arg(short, long, action)]
        all: bool,
    },
    /// Show decode statistics and beacon counts for a recorded symbol file.
    Info {
        /// Input symbol file
        input: PathBuf,

        #[command(flatten)]
        args: DecodeArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: info::Format,
    },
    /// Decode a single beacon message from hex.
    Beacon {
        /// 22 (short) or 30 (long) hex digit beacon message
        hex: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("SARP_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Decode {
            input,
            args,
            format,
            all,
        } => decode::decode(input, args.into(), format, *all),
        Commands::Info {
            input,
            args,
            format,
        } => info::info(input, args.into(), format),
        Commands::Beacon { hex } => beacon::beacon(hex),
    }
}
