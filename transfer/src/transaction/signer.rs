//! Witness production for assembled transactions.
//!
//! The signer never sees a wallet. It is handed one extended key at a known
//! depth of the derivation tree ([`SigningKeySource`]) and, for every input,
//! walks from that key down to the input's address key using the owner's
//! [`Addressing`](crate::wallet::Addressing).
//!
//! All paths are resolved before any key is derived, so an input whose
//! address is out of reach fails the whole call and no witness is produced.

use tracing::debug;

use super::codec::{signing_payload, Witness};
use super::error::TransferError;
use crate::config::{level, Network};
use crate::crypto::{ExtendedPublicKey, ExtendedSigningKey, KeyError};
use crate::wallet::Utxo;

/// A key the signer can derive address keys from.
///
/// Implemented by [`Bip32SigningKey`] for keys held in memory; a hardware
/// or remote signer would implement it by forwarding `derive` requests.
pub trait SigningKeySource {
    /// Depth of this key in the derivation tree (see [`level`]).
    fn key_level(&self) -> u32;

    /// The descendant at `path`, relative to this key.
    fn derive(&self, path: &[u32]) -> Result<ExtendedSigningKey, KeyError>;
}

/// Software keystore: an extended signing key and the level it sits at.
#[derive(Debug)]
pub struct Bip32SigningKey {
    key: ExtendedSigningKey,
    level: u32,
}

impl Bip32SigningKey {
    pub fn new(key: ExtendedSigningKey, level: u32) -> Self {
        Self { key, level }
    }

    /// A wallet root key (level 0).
    pub fn root(key: ExtendedSigningKey) -> Self {
        Self::new(key, level::ROOT)
    }

    pub fn public(&self) -> ExtendedPublicKey {
        self.key.public()
    }
}

impl SigningKeySource for Bip32SigningKey {
    fn key_level(&self) -> u32 {
        self.level
    }

    fn derive(&self, path: &[u32]) -> Result<ExtendedSigningKey, KeyError> {
        self.key.derive_path(path)
    }
}

/// Derivation path from `key` to the key owning `utxo`.
pub fn input_path(utxo: &Utxo, key_level: u32) -> Result<Vec<u32>, TransferError> {
    let addressing = utxo
        .owner
        .addressing
        .as_ref()
        .ok_or_else(|| TransferError::MissingAddressing(utxo.owner.address.clone()))?;
    addressing
        .derivation_from(key_level)
        .map_err(|source| TransferError::InvalidKeyLevel {
            address: utxo.owner.address.clone(),
            source,
        })
}

/// Produce one witness per input, in input order, over `body_hash`.
///
/// Derived keys are dropped (and zeroized) before this function returns.
pub fn sign_inputs<K>(
    body_hash: &[u8; 32],
    inputs: &[Utxo],
    key: &K,
    network: Network,
) -> Result<Vec<Witness>, TransferError>
where
    K: SigningKeySource + ?Sized,
{
    let key_level = key.key_level();
    let paths = inputs
        .iter()
        .map(|utxo| input_path(utxo, key_level))
        .collect::<Result<Vec<_>, _>>()?;

    let payload = signing_payload(network.protocol_magic(), body_hash)?;

    paths
        .iter()
        .zip(inputs)
        .map(|(path, utxo)| -> Result<Witness, TransferError> {
            let address_key = key.derive(path)?;
            debug!(
                address = %utxo.owner.address,
                depth = path.len(),
                "signing input"
            );
            Ok(Witness::new(address_key.public(), address_key.sign(&payload)))
        })
        .collect()
}
