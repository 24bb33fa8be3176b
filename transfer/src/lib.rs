// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Legacy Transfer: Core Library
//!
//! Builds the transaction that moves every coin out of a set of deprecated
//! (Byron-era) wallet addresses: it finds their unspent outputs, spends all
//! of them, pays a fee that is exact for the final encoded size, and signs
//! each input with the key its address was derived from.
//!
//! ## Architecture
//!
//! The crate is split along the stages of a build:
//!
//! - **wallet**: addresses, their derivation metadata, and UTXOs.
//! - **fetch**: the UTXO lookup capability, the resolver, and the HTTP
//!   backend client.
//! - **transaction**: fee model, wire codec, assembler, signer, packager.
//! - **transfer**: the end-to-end entry points.
//! - **crypto**: extended Ed25519 keys and hashing.
//! - **config**: protocol constants and network parameters.
//!
//! ```text
//! addresses -> UtxoResolver -> assemble_sweep <-> estimate_fee
//!                                   |
//!                              sign_inputs -> package -> TransferTx
//! ```
//!
//! ## Design Philosophy
//!
//! 1. Integer arithmetic only. Sums are checked and the fee saturates.
//! 2. One await point per build; everything after resolution is synchronous.
//! 3. A build either returns a complete signed transaction or an error,
//!    never something in between.

pub mod config;
pub mod crypto;
pub mod fetch;
pub mod transaction;
pub mod transfer;
pub mod wallet;

pub use config::{Network, ProtocolParams};
pub use fetch::{RemoteFetcher, UtxoFetchError, UtxoResolver, UtxoSource};
pub use transaction::{Bip32SigningKey, SigningKeySource, TransferError, TransferTx};
pub use transfer::{build_send, build_sweep, sweep_from_addresses};
pub use wallet::{Address, Addressing, Utxo};
