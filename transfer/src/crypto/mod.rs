//! # Cryptographic Primitives
//!
//! Everything the builder needs from cryptography, wrapped in types that
//! match how the transfer code uses them:
//!
//! - **Ed25519** extended keys with hierarchical derivation ([`keys`]).
//! - **BLAKE3** for transaction ids ([`hash`]).
//!
//! Everything here is a thin wrapper around audited implementations
//! (ed25519-dalek, hmac/sha2, blake3).

pub mod hash;
pub mod keys;

pub use hash::blake3_hash;
pub use keys::{ExtendedPublicKey, ExtendedSigningKey, KeyError};
