//! # UTXO Fetching
//!
//! Everything between the builder and the backend:
//!
//! - [`source`]: the [`UtxoSource`] capability and its wire types.
//! - [`resolver`]: batching, reduction, and parsing into [`Utxo`](crate::wallet::Utxo)s.
//! - [`remote`]: the HTTP client for UTXO lookup, submission, and account state.
//! - [`error`]: fetch, submit, and account-state errors.

pub mod error;
pub mod remote;
pub mod resolver;
pub mod source;

pub use error::{AccountStateError, ClientError, SubmitError, UtxoFetchError};
pub use remote::{AccountState, AccountStateLookup, Delegation, RemoteFetcher};
pub use resolver::UtxoResolver;
pub use source::{AddressUtxos, InMemoryUtxoSource, RemoteUtxo, UtxoSource};
