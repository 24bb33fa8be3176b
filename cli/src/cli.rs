//! # CLI Interface
//!
//! Defines the command-line argument structure for `legacy-transfer` using
//! `clap` derive. Supports four subcommands: `sweep`, `estimate-fee`,
//! `account-state`, and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Legacy address sweep tool.
///
/// Moves every coin held by a set of legacy (Byron-era) addresses to a new
/// address in one signed transaction, using a wallet backend for UTXO
/// lookup and submission.
#[derive(Parser, Debug)]
#[command(
    name = "legacy-transfer",
    about = "Sweep funds out of legacy wallet addresses",
    version,
    propagate_version = true
)]
pub struct LegacyTransferCli {
    /// Log output format.
    #[arg(
        long,
        global = true,
        env = "LEGACY_TRANSFER_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is not set.
    #[arg(
        long,
        global = true,
        env = "LEGACY_TRANSFER_LOG",
        default_value = "legacy_transfer=info,legacy_transfer_cli=info"
    )]
    pub log_level: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build (and optionally submit) a transaction sweeping every UTXO of
    /// the given addresses to one destination.
    Sweep(SweepArgs),
    /// Print the minimum fee for a transaction of a given size.
    EstimateFee(EstimateFeeArgs),
    /// Query the on-chain account state of addresses.
    AccountState(AccountStateArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `sweep` subcommand.
#[derive(Parser, Debug)]
pub struct SweepArgs {
    /// Path to the YAML configuration file. Built-in mainnet defaults are
    /// used when omitted.
    #[arg(long, short = 'c', env = "LEGACY_TRANSFER_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON file listing the owned addresses and their addressing.
    #[arg(long, short = 'a')]
    pub addresses: PathBuf,

    /// File holding the hex-encoded extended signing key
    /// (`secret || chain_code`).
    #[arg(long, short = 'k', env = "LEGACY_TRANSFER_KEY_FILE")]
    pub key_file: PathBuf,

    /// Derivation level of the key in the key file: 0 for a wallet root,
    /// 3 for an account key.
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=5))]
    pub key_level: u32,

    /// Address that receives the swept funds.
    #[arg(long, short = 'd')]
    pub destination: String,

    /// Submit the signed transaction to the backend after building it.
    #[arg(long)]
    pub submit: bool,
}

/// Arguments for the `estimate-fee` subcommand.
#[derive(Parser, Debug)]
pub struct EstimateFeeArgs {
    /// Path to the YAML configuration file.
    #[arg(long, short = 'c', env = "LEGACY_TRANSFER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Size of the signed transaction in bytes.
    #[arg(long, short = 's')]
    pub size: usize,
}

/// Arguments for the `account-state` subcommand.
#[derive(Parser, Debug)]
pub struct AccountStateArgs {
    /// Path to the YAML configuration file.
    #[arg(long, short = 'c', env = "LEGACY_TRANSFER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Addresses to look up.
    #[arg(required = true, num_args = 1..)]
    pub addresses: Vec<String>,
}
