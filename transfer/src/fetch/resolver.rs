//! # UTXO Resolver
//!
//! Maps owned addresses to the UTXOs they control, ready for assembly.
//!
//! ## Algorithm
//!
//! 1. Reject an empty request and any address without addressing.
//! 2. Query the source in batches of `batch_size` distinct addresses, one
//!    batch at a time.
//! 3. Fold every response entry into one `address -> [utxo]` map. A later
//!    entry for an address replaces an earlier one, and a UTXO reported
//!    twice under the same address is kept once (latest report wins).
//! 4. Parse amounts and hashes, attach the owning [`Address`], and emit the
//!    UTXOs in request address order. A UTXO reported under two addresses
//!    stays with the first of them, so no output is ever spent twice.
//!
//! The only await point of a whole transfer is in here; dropping the future
//! before it resolves cancels the build.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::error::UtxoFetchError;
use super::source::{AddressUtxos, RemoteUtxo, UtxoSource};
use crate::config::DEFAULT_ADDRESS_BATCH_SIZE;
use crate::transaction::TransferError;
use crate::wallet::{Address, TxHash, Utxo};

/// Resolves addresses to UTXOs through a [`UtxoSource`].
pub struct UtxoResolver<'a, S: UtxoSource + ?Sized> {
    source: &'a S,
    batch_size: usize,
}

impl<'a, S: UtxoSource + ?Sized> UtxoResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            batch_size: DEFAULT_ADDRESS_BATCH_SIZE,
        }
    }

    /// Addresses per request. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Look up every UTXO owned by `addresses`.
    ///
    /// # Errors
    ///
    /// - [`TransferError::NoAddresses`] / [`TransferError::MissingAddressing`]
    ///   for an unusable request, before anything is queried.
    /// - [`TransferError::UtxoFetch`] for a failed batch or an unparseable
    ///   entry. Nothing is retried.
    pub async fn resolve(&self, addresses: &[Address]) -> Result<Vec<Utxo>, TransferError> {
        if addresses.is_empty() {
            return Err(TransferError::NoAddresses);
        }
        if let Some(bare) = addresses.iter().find(|a| a.addressing.is_none()) {
            return Err(TransferError::MissingAddressing(bare.address.clone()));
        }

        let mut seen = HashSet::new();
        let owners: Vec<&Address> = addresses
            .iter()
            .filter(|a| seen.insert(a.address.as_str()))
            .collect();

        let mut responses = Vec::new();
        for batch in owners.chunks(self.batch_size) {
            let names: Vec<String> = batch.iter().map(|a| a.address.clone()).collect();
            debug!(batch = names.len(), "querying utxo batch");
            responses.extend(self.source.get_utxos_for_addresses(&names).await?);
        }

        let by_address = reduce_responses(responses, &seen);

        let mut utxos: Vec<Utxo> = Vec::new();
        let mut spent = HashSet::new();
        for owner in owners {
            let Some(reported) = by_address.get(owner.address.as_str()) else {
                continue;
            };
            for remote in reported {
                let utxo = parse_remote(remote, owner)?;
                if !spent.insert((utxo.tx_hash, utxo.output_index)) {
                    warn!(
                        tx_hash = %utxo.tx_hash,
                        index = utxo.output_index,
                        address = %owner.address,
                        "utxo already reported for another address, skipping"
                    );
                    continue;
                }
                utxos.push(utxo);
            }
        }
        debug!(addresses = seen.len(), utxos = utxos.len(), "utxos resolved");
        Ok(utxos)
    }
}

/// Fold all response entries into one immutable map.
fn reduce_responses(
    responses: Vec<AddressUtxos>,
    requested: &HashSet<&str>,
) -> HashMap<String, Vec<RemoteUtxo>> {
    responses
        .into_iter()
        .fold(HashMap::new(), |mut map, entry| {
            if !requested.contains(entry.address.as_str()) {
                warn!(address = %entry.address, "ignoring utxos for an address that was not requested");
                return map;
            }
            map.insert(entry.address, dedup_latest(entry.utxos));
            map
        })
}

/// Drop repeated `(tx_hash, output_index)` pairs, keeping the position of
/// the first report and the content of the last.
fn dedup_latest(utxos: Vec<RemoteUtxo>) -> Vec<RemoteUtxo> {
    let mut positions: HashMap<(String, u32), usize> = HashMap::new();
    let mut unique: Vec<RemoteUtxo> = Vec::with_capacity(utxos.len());
    for utxo in utxos {
        let key = (utxo.tx_hash.to_ascii_lowercase(), utxo.output_index);
        match positions.get(&key) {
            Some(&at) => unique[at] = utxo,
            None => {
                positions.insert(key, unique.len());
                unique.push(utxo);
            }
        }
    }
    unique
}

fn parse_remote(remote: &RemoteUtxo, owner: &Address) -> Result<Utxo, UtxoFetchError> {
    let amount = remote.amount.parse::<u64>().map_err(|_| {
        UtxoFetchError::new(format!(
            "invalid amount {:?} for {}#{}",
            remote.amount, remote.tx_hash, remote.output_index
        ))
    })?;
    let tx_hash = TxHash::from_hex(&remote.tx_hash)
        .ok_or_else(|| UtxoFetchError::new(format!("invalid tx hash {:?}", remote.tx_hash)))?;
    Ok(Utxo {
        tx_hash,
        output_index: remote.output_index,
        amount,
        owner: owner.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::source::InMemoryUtxoSource;
    use crate::wallet::Addressing;
    use async_trait::async_trait;

    fn remote(seed: u8, index: u32, amount: &str) -> RemoteUtxo {
        RemoteUtxo {
            tx_hash: hex::encode([seed; 32]),
            output_index: index,
            amount: amount.to_string(),
        }
    }

    fn owned(name: &str, index: u32) -> Address {
        Address::owned(name, Addressing::bip44(0, 0, index))
    }

    /// Replays canned responses, one per call, ignoring the request.
    struct ScriptedSource {
        replies: Vec<Vec<AddressUtxos>>,
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl UtxoSource for ScriptedSource {
        async fn get_utxos_for_addresses(
            &self,
            _addresses: &[String],
        ) -> Result<Vec<AddressUtxos>, UtxoFetchError> {
            let call = self
                .calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(self.replies.get(call).cloned().unwrap_or_default())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl UtxoSource for FailingSource {
        async fn get_utxos_for_addresses(
            &self,
            _addresses: &[String],
        ) -> Result<Vec<AddressUtxos>, UtxoFetchError> {
            Err(UtxoFetchError::new("backend unavailable"))
        }
    }

    #[tokio::test]
    async fn test_empty_request_is_rejected() {
        let source = InMemoryUtxoSource::default();
        let err = UtxoResolver::new(&source).resolve(&[]).await.unwrap_err();
        assert!(matches!(err, TransferError::NoAddresses));
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn test_address_without_addressing_is_rejected() {
        let source = InMemoryUtxoSource::default();
        let addresses = [owned("a", 0), Address::new("bare")];
        let err = UtxoResolver::new(&source)
            .resolve(&addresses)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::MissingAddressing(ref a) if a == "bare"));
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn resolves_in_request_order_with_owner_attached() {
        let source = InMemoryUtxoSource::new(vec![
            AddressUtxos {
                address: "b".into(),
                utxos: vec![remote(2, 0, "2000000")],
            },
            AddressUtxos {
                address: "a".into(),
                utxos: vec![remote(1, 0, "1000000"), remote(1, 1, "1500000")],
            },
        ]);
        let addresses = [owned("a", 0), owned("b", 1)];
        let utxos = UtxoResolver::new(&source).resolve(&addresses).await.unwrap();

        let summary: Vec<(&str, u32, u64)> = utxos
            .iter()
            .map(|u| (u.owner.as_str(), u.output_index, u.amount))
            .collect();
        assert_eq!(
            summary,
            vec![("a", 0, 1_000_000), ("a", 1, 1_500_000), ("b", 0, 2_000_000)]
        );
        assert_eq!(utxos[2].owner, owned("b", 1));
    }

    #[tokio::test]
    async fn test_batches_are_sized_and_duplicates_queried_once() {
        let source = InMemoryUtxoSource::default();
        let addresses: Vec<Address> = (0..5)
            .map(|i| owned(&format!("addr{i}"), i))
            .chain(std::iter::once(owned("addr0", 0)))
            .collect();

        let utxos = UtxoResolver::new(&source)
            .with_batch_size(2)
            .resolve(&addresses)
            .await
            .unwrap();
        assert!(utxos.is_empty());

        let requests = source.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0], vec!["addr0".to_string(), "addr1".to_string()]);
        assert_eq!(requests[2], vec!["addr4".to_string()]);
    }

    #[tokio::test]
    async fn later_entry_for_an_address_wins() {
        let source = ScriptedSource {
            replies: vec![
                vec![AddressUtxos {
                    address: "a".into(),
                    utxos: vec![remote(1, 0, "100")],
                }],
                vec![AddressUtxos {
                    address: "a".into(),
                    utxos: vec![remote(9, 3, "900")],
                }],
            ],
            calls: Default::default(),
        };
        let addresses = [owned("a", 0), owned("b", 1)];
        let utxos = UtxoResolver::new(&source)
            .with_batch_size(1)
            .resolve(&addresses)
            .await
            .unwrap();
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos[0].amount, 900);
        assert_eq!(utxos[0].output_index, 3);
    }

    #[tokio::test]
    async fn test_duplicate_utxo_reports_are_collapsed() {
        let source = InMemoryUtxoSource::new(vec![AddressUtxos {
            address: "a".into(),
            utxos: vec![
                remote(1, 0, "100"),
                remote(2, 0, "200"),
                remote(1, 0, "150"),
            ],
        }]);
        let utxos = UtxoResolver::new(&source)
            .resolve(&[owned("a", 0)])
            .await
            .unwrap();
        let amounts: Vec<u64> = utxos.iter().map(|u| u.amount).collect();
        assert_eq!(amounts, vec![150, 200]);
    }

    #[tokio::test]
    async fn utxo_reported_for_two_addresses_is_resolved_once() {
        let source = InMemoryUtxoSource::new(vec![
            AddressUtxos {
                address: "b".into(),
                utxos: vec![remote(1, 0, "5000000"), remote(2, 0, "700")],
            },
            AddressUtxos {
                address: "a".into(),
                utxos: vec![remote(1, 0, "5000000")],
            },
        ]);
        let utxos = UtxoResolver::new(&source)
            .resolve(&[owned("a", 0), owned("b", 1)])
            .await
            .unwrap();

        let summary: Vec<(&str, u8, u64)> = utxos
            .iter()
            .map(|u| (u.owner.as_str(), u.tx_hash.as_bytes()[0], u.amount))
            .collect();
        assert_eq!(summary, vec![("a", 1, 5_000_000), ("b", 2, 700)]);
    }

    #[tokio::test]
    async fn unrequested_addresses_are_ignored() {
        let source = ScriptedSource {
            replies: vec![vec![
                AddressUtxos {
                    address: "stranger".into(),
                    utxos: vec![remote(5, 0, "5000")],
                },
                AddressUtxos {
                    address: "a".into(),
                    utxos: vec![remote(1, 0, "100")],
                },
            ]],
            calls: Default::default(),
        };
        let utxos = UtxoResolver::new(&source)
            .resolve(&[owned("a", 0)])
            .await
            .unwrap();
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos[0].owner.as_str(), "a");
    }

    #[tokio::test]
    async fn test_unparseable_entries_fail_the_fetch() {
        let short_hash = RemoteUtxo {
            tx_hash: "beef".into(),
            output_index: 0,
            amount: "10".into(),
        };
        for bad in [remote(1, 0, "12.5"), remote(1, 0, "-3"), short_hash] {
            let source = InMemoryUtxoSource::new(vec![AddressUtxos {
                address: "a".into(),
                utxos: vec![bad],
            }]);
            let err = UtxoResolver::new(&source)
                .resolve(&[owned("a", 0)])
                .await
                .unwrap_err();
            assert!(matches!(err, TransferError::UtxoFetch(_)));
        }
    }

    #[tokio::test]
    async fn test_source_failure_propagates_unchanged() {
        let err = UtxoResolver::new(&FailingSource)
            .resolve(&[owned("a", 0)])
            .await
            .unwrap_err();
        match err {
            TransferError::UtxoFetch(inner) => assert_eq!(inner.reason, "backend unavailable"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
