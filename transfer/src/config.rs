//! # Protocol Configuration & Constants
//!
//! Every magic number the transfer builder depends on lives here: protocol
//! magics, derivation-path levels, the mainnet fee parameters, and the
//! bounds the assembler and resolver work within.
//!
//! [`ProtocolParams`] is the runtime counterpart: the caller supplies it per
//! build (usually loaded from a config file), and it is read-only for the
//! duration of that build.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Protocol magic of the main network. Mixed into every witness signature so
/// a transaction signed for one network can never be replayed on another.
pub const MAINNET_PROTOCOL_MAGIC: u32 = 764_824_073;

/// Protocol magic of the legacy public testnet.
pub const TESTNET_PROTOCOL_MAGIC: u32 = 1_097_911_063;

// ---------------------------------------------------------------------------
// Derivation Paths
// ---------------------------------------------------------------------------

/// Offset added to an index to mark it as hardened (`i'` in BIP32 notation).
pub const HARDENED: u32 = 0x8000_0000;

/// BIP44 purpose index used by the legacy (Icarus-era) wallets, hardened.
pub const BIP44_PURPOSE: u32 = HARDENED + 44;

/// Registered coin type for the chain, hardened.
pub const COIN_TYPE: u32 = HARDENED + 1815;

/// Depth of each node in a BIP44 tree. A key or path segment is always
/// described by the level it sits at, never by its position in a slice.
pub mod level {
    pub const ROOT: u32 = 0;
    pub const PURPOSE: u32 = 1;
    pub const COIN_TYPE: u32 = 2;
    pub const ACCOUNT: u32 = 3;
    pub const CHAIN: u32 = 4;
    pub const ADDRESS: u32 = 5;
}

// ---------------------------------------------------------------------------
// Fee Parameters (mainnet defaults)
// ---------------------------------------------------------------------------

/// Constant term of the linear fee, in lovelace.
pub const MAINNET_LINEAR_FEE_CONSTANT: u64 = 155_381;

/// Per-byte term of the linear fee, in lovelace.
pub const MAINNET_LINEAR_FEE_COEFFICIENT: u64 = 44;

/// Smallest amount any output may carry.
pub const MAINNET_MINIMUM_UTXO_VALUE: u64 = 1_000_000;

/// Deposit for registering a stake key. Not charged by sweeps, carried so the
/// parameter set round-trips unchanged through config files.
pub const MAINNET_KEY_DEPOSIT: u64 = 2_000_000;

/// Deposit for registering a stake pool.
pub const MAINNET_POOL_DEPOSIT: u64 = 500_000_000;

// ---------------------------------------------------------------------------
// Builder Limits
// ---------------------------------------------------------------------------

/// Upper bound on fee/size fixpoint passes. The encoded amount can only grow
/// through five CBOR integer widths, so real builds settle in two or three.
pub const MAX_FEE_ITERATIONS: usize = 8;

/// Addresses per UTXO lookup request. The backend rejects larger batches.
pub const DEFAULT_ADDRESS_BATCH_SIZE: usize = 50;

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// The network a transaction is signed for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    /// Private or development network identified only by its magic.
    Custom(u32),
}

impl Network {
    /// Returns the protocol magic signed into every witness.
    pub fn protocol_magic(&self) -> u32 {
        match self {
            Self::Mainnet => MAINNET_PROTOCOL_MAGIC,
            Self::Testnet => TESTNET_PROTOCOL_MAGIC,
            Self::Custom(magic) => *magic,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Testnet => write!(f, "testnet"),
            Self::Custom(magic) => write!(f, "custom({})", magic),
        }
    }
}

// ---------------------------------------------------------------------------
// ProtocolParams
// ---------------------------------------------------------------------------

/// Network-wide constants that govern fee and output validity.
///
/// All values are non-negative integers in the chain's smallest coin unit.
/// The struct is plain data: it is supplied by the caller at build time and
/// never mutated by the builder. Missing fields deserialize to the mainnet
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolParams {
    /// Fee charged per byte of the encoded, signed transaction.
    pub linear_fee_coefficient: u64,
    /// Fee charged once per transaction.
    pub linear_fee_constant: u64,
    /// Smallest amount an output may carry.
    pub minimum_utxo_value: u64,
    /// Stake key registration deposit.
    pub key_deposit: u64,
    /// Stake pool registration deposit.
    pub pool_deposit: u64,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            linear_fee_coefficient: MAINNET_LINEAR_FEE_COEFFICIENT,
            linear_fee_constant: MAINNET_LINEAR_FEE_CONSTANT,
            minimum_utxo_value: MAINNET_MINIMUM_UTXO_VALUE,
            key_deposit: MAINNET_KEY_DEPOSIT,
            pool_deposit: MAINNET_POOL_DEPOSIT,
        }
    }
}
