//! Padlock command-line tools.
//!
//! Offline helpers for the pad ceremony and for debugging stored state. No
//! command sends anything over the network.
//!
//! # Usage
//!
//! ```bash
//! # Words to read aloud during the ceremony
//! padlock mnemonic --pad pad.bin --words 6
//!
//! # Conversation id (add --reveal for the secret tokens)
//! padlock tokens --pad pad.bin
//!
//! # Transfer checksum, optionally verified
//! padlock crc pad.bin --expect 00000000000004000a1b2c3d
//!
//! # Frame header summary
//! padlock inspect frame.b64 --base64
//!
//! # Stored ledger counters
//! padlock ledger conversation.cbor
//! ```

mod commands;

use std::{io::Write, path::PathBuf};

use clap::{Parser, Subcommand};
use padlock_core::LedgerConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Padlock pad and frame tools
#[derive(Parser, Debug)]
#[command(name = "padlock")]
#[command(about = "Offline tools for one-time pad conversations")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the mnemonic checksum of a pad
    Mnemonic {
        /// Pad file
        #[arg(short, long)]
        pad: PathBuf,

        /// Number of words (1 to 32)
        #[arg(short, long, default_value_t = padlock_crypto::DEFAULT_WORD_COUNT)]
        words: usize,
    },

    /// Print the identity tokens derived from a pad
    Tokens {
        /// Pad file
        #[arg(short, long)]
        pad: PathBuf,

        /// Also print the secret auth and burn tokens
        #[arg(long)]
        reveal: bool,
    },

    /// Print (or verify) the transfer checksum of a file
    Crc {
        /// File to checksum
        file: PathBuf,

        /// Expected checksum as 24 hex characters
        #[arg(long)]
        expect: Option<String>,
    },

    /// Summarize an encoded frame
    Inspect {
        /// Frame file
        frame: PathBuf,

        /// File holds base64 text instead of raw bytes
        #[arg(long)]
        base64: bool,
    },

    /// Summarize a CBOR ledger snapshot
    Ledger {
        /// Snapshot file
        snapshot: PathBuf,

        /// Remaining bytes below which the conversation counts as exhausted
        #[arg(long, default_value_t = LedgerConfig::default().min_frame_consumption)]
        exhaust_below: u64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();

    tracing::debug!(command = ?args.command, "running");

    let output = match &args.command {
        Command::Mnemonic { pad, words } => {
            commands::mnemonic(pad, &LedgerConfig { mnemonic_words: *words, ..LedgerConfig::default() })
        },
        Command::Tokens { pad, reveal } => commands::tokens(pad, *reveal),
        Command::Crc { file, expect } => commands::crc(file, expect.as_deref()),
        Command::Inspect { frame, base64 } => commands::inspect(frame, *base64),
        Command::Ledger { snapshot, exhaust_below } => commands::ledger(
            snapshot,
            &LedgerConfig { min_frame_consumption: *exhaust_below, ..LedgerConfig::default() },
        ),
    }
    .inspect_err(|e| tracing::error!(error = %e, "command failed"))?;

    writeln!(std::io::stdout().lock(), "{output}")?;
    Ok(())
}
