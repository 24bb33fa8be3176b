//! # Wallet Model
//!
//! The data the builder is given: owned addresses with their derivation
//! metadata ([`address`]) and the unspent outputs they control ([`utxo`]).
//! All of it is plain immutable data.

pub mod address;
pub mod utxo;

pub use address::{Address, Addressing, AddressingError};
pub use utxo::{total_amount, TxHash, Utxo};
