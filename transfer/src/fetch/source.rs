//! The UTXO lookup capability and its wire types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use super::error::UtxoFetchError;

/// One unspent output as the backend reports it. Nothing is parsed yet:
/// `tx_hash` is hex and `amount` is a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUtxo {
    pub tx_hash: String,
    pub output_index: u32,
    pub amount: String,
}

/// All reported UTXOs of one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressUtxos {
    pub address: String,
    pub utxos: Vec<RemoteUtxo>,
}

/// Anything that can look up the UTXOs of a batch of addresses.
///
/// Implementations may return entries in any order, repeat an address, or
/// include addresses that were not asked for; the resolver copes with all
/// three.
#[async_trait]
pub trait UtxoSource: Send + Sync {
    async fn get_utxos_for_addresses(
        &self,
        addresses: &[String],
    ) -> Result<Vec<AddressUtxos>, UtxoFetchError>;
}

/// A fixed UTXO set held in memory. Answers each request with the entries
/// for the requested addresses and records every request it sees.
#[derive(Debug, Default)]
pub struct InMemoryUtxoSource {
    entries: Vec<AddressUtxos>,
    requests: Mutex<Vec<Vec<String>>>,
}

impl InMemoryUtxoSource {
    pub fn new(entries: Vec<AddressUtxos>) -> Self {
        Self {
            entries,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every batch requested so far, in order.
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl UtxoSource for InMemoryUtxoSource {
    async fn get_utxos_for_addresses(
        &self,
        addresses: &[String],
    ) -> Result<Vec<AddressUtxos>, UtxoFetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(addresses.to_vec());
        }
        Ok(self
            .entries
            .iter()
            .filter(|entry| addresses.contains(&entry.address))
            .cloned()
            .collect())
    }
}
