//! # Transaction Module
//!
//! Assembly, signing, and packaging of legacy transfer transactions. Every
//! sweep (or send) ends up as a [`TransferTx`].
//!
//! ## Architecture
//!
//! ```text
//! fee.rs       : Linear fee formula (LinearFee, estimate_fee)
//! codec.rs     : CBOR wire format of bodies, witnesses, signed transactions
//! assembler.rs : Spend-all assembly and the fee/size fixpoint
//! signer.rs    : SigningKeySource capability and per-input witnesses
//! package.rs   : Final encoding, transaction id, TransferTx
//! error.rs     : TransferError, CodecError
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Assemble**: [`assemble_sweep`] (or [`assemble_send`]) spends every
//!    UTXO and settles the fee against the size of the signed result.
//! 2. **Sign**: [`sign_inputs`] derives each input's key and signs the body
//!    hash, one witness per input.
//! 3. **Package**: [`package`] encodes `[body, witnesses]` and computes the id.
//!
//! ## Design Decisions
//!
//! - Transaction ids are BLAKE3 of the encoded body only, so the id is known
//!   before signing and the witnesses commit to it.
//! - All amounts are `u64` in the smallest coin unit. Sums are checked; the
//!   fee formula saturates.
//! - The fee is never below the linear minimum for the final encoded size,
//!   and no output is ever created below the minimum output value.

pub mod assembler;
pub mod codec;
pub mod error;
pub mod fee;
pub mod package;
pub mod signer;

pub use assembler::{assemble_send, assemble_sweep, AssembledTx};
pub use codec::{TxBody, TxIn, TxOut, Witness};
pub use error::{CodecError, TransferError};
pub use fee::{estimate_fee, LinearFee};
pub use package::{package, TransferTx};
pub use signer::{sign_inputs, Bip32SigningKey, SigningKeySource};
