//! Error types for the backend-facing side of a transfer.

use thiserror::Error;

/// The UTXO backend failed, or answered with something unparseable.
///
/// Wrapped unchanged as [`TransferError::UtxoFetch`](crate::TransferError::UtxoFetch).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("utxo fetch failed: {reason}")]
pub struct UtxoFetchError {
    pub reason: String,
}

impl UtxoFetchError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Why a signed transaction was not accepted for broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The node rejected at least one witness. Usually a key/address
    /// mismatch or a transaction signed for another network.
    #[error("transaction rejected: invalid witness")]
    InvalidWitness,

    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("submission failed: {0}")]
    Transport(String),
}

/// The account-state lookup failed as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("account state lookup failed: {reason}")]
pub struct AccountStateError {
    pub reason: String,
}

/// The HTTP client could not be set up.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid header value for {name}")]
    InvalidHeader { name: &'static str },

    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
}
