//! Addresses and the derivation metadata that tells the signer which key
//! controls them.
//!
//! Two legacy schemes are in circulation, and they disagree about where a
//! path starts. [`Addressing`] is a closed enum over both, so the signer
//! matches on the scheme instead of probing the address at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::{level, BIP44_PURPOSE, COIN_TYPE, HARDENED};

/// Why an addressing cannot be reached from a given signing key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressingError {
    #[error("addressing ends at level {last_level}, expected the address level ({expected})")]
    IncompletePath { last_level: u32, expected: u32 },

    #[error("signing key at level {key_level} cannot reach a path starting at level {start_level}")]
    KeyAboveStart { key_level: u32, start_level: u32 },

    #[error("signing key at level {key_level} sits below the address level")]
    KeyBelowAddress { key_level: u32 },

    #[error("daedalus addresses derive from the root key, got a key at level {key_level}")]
    DaedalusRequiresRoot { key_level: u32 },
}

/// Derivation metadata for an owned address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum Addressing {
    /// BIP44 tree (`purpose'/coin'/account'/chain/index`). `path[0]` sits at
    /// `start_level`; a complete path ends at [`level::ADDRESS`].
    Bip44 { path: Vec<u32>, start_level: u32 },

    /// Random-index scheme of the first-generation wallets: two steps
    /// straight beneath the wallet root, with no purpose or coin level.
    Daedalus { account: u32, index: u32 },
}

impl Addressing {
    /// Full BIP44 addressing from the purpose level down.
    ///
    /// `account` is given unhardened and hardened here; `chain` (0 external,
    /// 1 internal) and `index` are soft.
    pub fn bip44(account: u32, chain: u32, index: u32) -> Self {
        Self::Bip44 {
            path: vec![BIP44_PURPOSE, COIN_TYPE, HARDENED + account, chain, index],
            start_level: level::PURPOSE,
        }
    }

    /// The derivation steps left to take from a key that sits at
    /// `key_level`.
    ///
    /// For BIP44 the key is assumed to be the node of this path at
    /// `key_level`, so the steps above it are skipped rather than checked.
    pub fn derivation_from(&self, key_level: u32) -> Result<Vec<u32>, AddressingError> {
        match self {
            Self::Bip44 { path, start_level } => {
                let last_level = u32::try_from(path.len())
                    .ok()
                    .and_then(|len| start_level.checked_add(len))
                    .and_then(|end| end.checked_sub(1));
                match last_level {
                    Some(level::ADDRESS) => {}
                    other => {
                        return Err(AddressingError::IncompletePath {
                            last_level: other.unwrap_or(0),
                            expected: level::ADDRESS,
                        })
                    }
                }
                if key_level > level::ADDRESS {
                    return Err(AddressingError::KeyBelowAddress { key_level });
                }
                if key_level + 1 < *start_level {
                    return Err(AddressingError::KeyAboveStart {
                        key_level,
                        start_level: *start_level,
                    });
                }
                let skip = (key_level + 1 - start_level) as usize;
                Ok(path[skip..].to_vec())
            }
            Self::Daedalus { account, index } => {
                if key_level != level::ROOT {
                    return Err(AddressingError::DaedalusRequiresRoot { key_level });
                }
                Ok(vec![*account, *index])
            }
        }
    }
}

/// An encoded chain address, optionally annotated with its addressing.
///
/// Owned (spendable) addresses carry an addressing; a destination address
/// usually does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addressing: Option<Addressing>,
}

impl Address {
    /// A bare address with no known addressing.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            addressing: None,
        }
    }

    /// An owned address with its addressing.
    pub fn owned(address: impl Into<String>, addressing: Addressing) -> Self {
        Self {
            address: address.into(),
            addressing: Some(addressing),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bip44_from_account_key_skips_three_levels() {
        let addressing = Addressing::bip44(0, 0, 7);
        let steps = addressing.derivation_from(level::ACCOUNT).unwrap();
        assert_eq!(steps, vec![0, 7]);
    }

    #[test]
    fn bip44_from_root_key_takes_the_whole_path() {
        let addressing = Addressing::bip44(2, 1, 9);
        let steps = addressing.derivation_from(level::ROOT).unwrap();
        assert_eq!(steps, vec![BIP44_PURPOSE, COIN_TYPE, HARDENED + 2, 1, 9]);
    }

    #[test]
    fn bip44_from_address_key_takes_nothing() {
        let addressing = Addressing::bip44(0, 0, 1);
        assert!(addressing.derivation_from(level::ADDRESS).unwrap().is_empty());
    }

    #[test]
    fn bip44_partial_path_from_chain_level() {
        // Path stored from the chain level down: [chain, index].
        let addressing = Addressing::Bip44 {
            path: vec![1, 4],
            start_level: level::CHAIN,
        };
        assert_eq!(addressing.derivation_from(level::ACCOUNT).unwrap(), vec![1, 4]);
        assert_eq!(addressing.derivation_from(level::CHAIN).unwrap(), vec![4]);
    }

    #[test]
    fn key_above_start_level_is_rejected() {
        let addressing = Addressing::Bip44 {
            path: vec![1, 4],
            start_level: level::CHAIN,
        };
        assert_eq!(
            addressing.derivation_from(level::COIN_TYPE),
            Err(AddressingError::KeyAboveStart {
                key_level: level::COIN_TYPE,
                start_level: level::CHAIN,
            })
        );
    }

    #[test]
    fn key_below_address_level_is_rejected() {
        let addressing = Addressing::bip44(0, 0, 1);
        assert_eq!(
            addressing.derivation_from(6),
            Err(AddressingError::KeyBelowAddress { key_level: 6 })
        );
    }

    #[test]
    fn incomplete_path_is_rejected() {
        let addressing = Addressing::Bip44 {
            path: vec![BIP44_PURPOSE, COIN_TYPE, HARDENED],
            start_level: level::PURPOSE,
        };
        assert_eq!(
            addressing.derivation_from(level::ROOT),
            Err(AddressingError::IncompletePath {
                last_level: level::ACCOUNT,
                expected: level::ADDRESS,
            })
        );

        let empty = Addressing::Bip44 {
            path: vec![],
            start_level: level::ROOT,
        };
        assert!(empty.derivation_from(level::ROOT).is_err());
    }

    #[test]
    fn daedalus_requires_root_key() {
        let addressing = Addressing::Daedalus {
            account: HARDENED,
            index: HARDENED + 5,
        };
        assert_eq!(
            addressing.derivation_from(level::ROOT).unwrap(),
            vec![HARDENED, HARDENED + 5]
        );
        assert_eq!(
            addressing.derivation_from(level::ACCOUNT),
            Err(AddressingError::DaedalusRequiresRoot {
                key_level: level::ACCOUNT
            })
        );
    }

    #[test]
    fn address_json_shape() {
        let owned = Address::owned("Ae2tdPwUPEZ", Addressing::bip44(0, 0, 0));
        let json = serde_json::to_value(&owned).unwrap();
        assert_eq!(json["addressing"]["scheme"], "bip44");
        assert_eq!(json["addressing"]["start_level"], 1);

        let bare = serde_json::to_value(Address::new("DdzFF")).unwrap();
        assert!(bare.get("addressing").is_none());

        let parsed: Address = serde_json::from_str(r#"{"address":"DdzFF"}"#).unwrap();
        assert_eq!(parsed, Address::new("DdzFF"));
    }
}
