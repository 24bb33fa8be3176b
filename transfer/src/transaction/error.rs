//! Error types for building a transfer.

use thiserror::Error;

use crate::crypto::KeyError;
use crate::fetch::UtxoFetchError;
use crate::wallet::AddressingError;

// ---------------------------------------------------------------------------
// TransferError
// ---------------------------------------------------------------------------

/// Everything that can stop a transfer from being built.
///
/// Every variant is terminal for the build that produced it: nothing is
/// retried and no partially-built transaction is returned.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The UTXO backend failed or returned something unparseable.
    #[error(transparent)]
    UtxoFetch(#[from] UtxoFetchError),

    #[error("no addresses to sweep")]
    NoAddresses,

    /// An owned address carried no derivation metadata, so its inputs
    /// could never be signed.
    #[error("address {0} has no addressing")]
    MissingAddressing(String),

    /// The inputs cannot cover the fee plus the smallest allowed output.
    #[error("not enough money: {available} available, {required} required")]
    NotEnoughMoney { available: u64, required: u64 },

    /// A requested send amount is itself below the minimum output value.
    #[error("output of {amount} is below the minimum output value {minimum}")]
    OutputBelowMinimum { amount: u64, minimum: u64 },

    /// The signing key cannot reach the key of `address`.
    #[error("signing key cannot derive the key for {address}: {source}")]
    InvalidKeyLevel {
        address: String,
        #[source]
        source: AddressingError,
    },

    #[error("key error: {0}")]
    Key(#[from] KeyError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("input amounts overflow")]
    AmountOverflow,

    #[error("fee did not settle after {iterations} iterations")]
    FeeDidNotConverge { iterations: usize },

    #[error("expected {expected} witnesses, got {actual}")]
    WitnessCountMismatch { expected: usize, actual: usize },
}

// ---------------------------------------------------------------------------
// CodecError
// ---------------------------------------------------------------------------

/// Failures of the CBOR wire codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("cbor encoding failed: {0}")]
    Encode(String),

    #[error("cbor decoding failed: {0}")]
    Decode(String),

    /// Well-formed CBOR that is not a signed transaction.
    #[error("malformed transaction: {0}")]
    Malformed(&'static str),
}
