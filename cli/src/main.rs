// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Legacy Transfer CLI
//!
//! Entry point for the `legacy-transfer` binary. Parses CLI arguments,
//! initializes logging, and runs one command against the configured wallet
//! backend.
//!
//! The binary supports four subcommands:
//!
//! - `sweep`         : build (and optionally submit) a sweep transaction
//! - `estimate-fee`  : print the minimum fee for a transaction size
//! - `account-state` : query account states from the backend
//! - `version`       : print build version information

mod cli;
mod config;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;

use legacy_transfer::crypto::ExtendedSigningKey;
use legacy_transfer::transaction::estimate_fee;
use legacy_transfer::{sweep_from_addresses, Address, Bip32SigningKey, RemoteFetcher};

use cli::{Commands, LegacyTransferCli};
use config::SweepConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = LegacyTransferCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Sweep(args) => run_sweep(args).await,
        Commands::EstimateFee(args) => run_estimate_fee(args),
        Commands::AccountState(args) => run_account_state(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Resolves, builds, and prints a sweep transaction; submits it when asked.
async fn run_sweep(args: cli::SweepArgs) -> Result<()> {
    let config = SweepConfig::load(args.config.as_deref())?;
    let addresses = read_addresses(&args.addresses)?;
    let key = read_key(&args.key_file, args.key_level)?;
    let fetcher = connect(&config)?;

    tracing::info!(
        backend = %config.backend_url,
        network = %config.network,
        addresses = addresses.len(),
        key_level = args.key_level,
        "building sweep"
    );

    let tx = sweep_from_addresses(
        &fetcher,
        &addresses,
        &args.destination,
        &key,
        &config.protocol_params,
        config.network,
        config.batch_size,
    )
    .await
    .context("failed to build sweep transaction")?;

    println!("{}", serde_json::to_string_pretty(&tx)?);

    if args.submit {
        fetcher
            .submit(&tx.encoded_tx)
            .await
            .with_context(|| format!("failed to submit transaction {}", tx.id))?;
        tracing::info!(id = %tx.id, "transaction submitted");
    }

    Ok(())
}

/// Prints the minimum fee for a transaction of `args.size` bytes.
fn run_estimate_fee(args: cli::EstimateFeeArgs) -> Result<()> {
    let config = SweepConfig::load(args.config.as_deref())?;
    let fee = estimate_fee(args.size, &config.protocol_params);
    println!("{fee}");
    Ok(())
}

/// Queries and prints the account state of each address.
async fn run_account_state(args: cli::AccountStateArgs) -> Result<()> {
    let config = SweepConfig::load(args.config.as_deref())?;
    let fetcher = connect(&config)?;
    let states = fetcher
        .account_state(&args.addresses)
        .await
        .context("failed to query account state")?;
    println!("{}", serde_json::to_string_pretty(&states)?);
    Ok(())
}

fn connect(config: &SweepConfig) -> Result<RemoteFetcher> {
    RemoteFetcher::new(&config.backend_url, &config.client_version, &config.locale)
        .with_context(|| format!("failed to create client for {}", config.backend_url))
}

fn read_addresses(path: &Path) -> Result<Vec<Address>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read address list {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse address list {}", path.display()))
}

fn read_key(path: &Path, level: u32) -> Result<Bip32SigningKey> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read key file {}", path.display()))?;
    let key = ExtendedSigningKey::from_hex(&raw)
        .with_context(|| format!("invalid key in {}", path.display()))?;
    tracing::debug!(public_key = %key.public().to_hex(), level, "signing key loaded");
    Ok(Bip32SigningKey::new(key, level))
}

/// Prints version information to stdout.
fn print_version() {
    println!("legacy-transfer {}", env!("CARGO_PKG_VERSION"));
    println!(
        "protocol magic  {} (mainnet), {} (testnet)",
        legacy_transfer::config::MAINNET_PROTOCOL_MAGIC,
        legacy_transfer::config::TESTNET_PROTOCOL_MAGIC
    );
}
