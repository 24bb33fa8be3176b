//! Unspent outputs as the builder consumes them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::address::Address;

/// Hash of the transaction that created an output. Hex on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse 64 hex characters. Returns `None` for anything else.
    pub fn from_hex(hex_str: &str) -> Option<Self> {
        let bytes = hex::decode(hex_str).ok()?;
        let array: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.to_hex())
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom("expected 32 hex-encoded bytes"))
    }
}

/// An unspent output owned by one of the caller's addresses.
///
/// `owner` keeps the addressing, so the signer can find the key for this
/// input without looking anything up again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub tx_hash: TxHash,
    pub output_index: u32,
    pub amount: u64,
    pub owner: Address,
}

/// Sum of `amount` over `utxos`, or `None` on overflow.
pub fn total_amount(utxos: &[Utxo]) -> Option<u64> {
    utxos
        .iter()
        .try_fold(0u64, |acc, utxo| acc.checked_add(utxo.amount))
}
