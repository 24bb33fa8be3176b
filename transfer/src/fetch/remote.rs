//! # Remote Backend Client
//!
//! HTTP client for the wallet backend. Three endpoints are used:
//!
//! ```text
//! POST /api/txs/utxoForAddresses  {addresses}   -> [{tx_hash, tx_index, receiver, amount}]
//! POST /api/txs/signed            {signedTx}    -> 200 on acceptance
//! POST /api/v2/account/state      {addresses}   -> {address: state | "" | "Account does not exist"}
//! ```
//!
//! Every request carries the `yoroi-version` and `yoroi-locale` headers.
//! Failures are logged with `tracing::error!` and mapped onto the error
//! type of the operation; nothing is retried here.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, error};

use super::error::{AccountStateError, ClientError, SubmitError, UtxoFetchError};
use super::source::{AddressUtxos, RemoteUtxo, UtxoSource};

const HEADER_CLIENT_VERSION: &str = "yoroi-version";
const HEADER_LOCALE: &str = "yoroi-locale";

/// Substring the node puts in its rejection when a witness does not verify.
const INVALID_WITNESS_MARKER: &str = "Invalid witness";

/// Reply for an address that is valid but has never been on chain.
const ACCOUNT_UNUSED: &str = "";

/// Reply for an address the node has no account for.
const ACCOUNT_MISSING: &str = "Account does not exist";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct AddressesRequest<'a> {
    addresses: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignedRequest {
    signed_tx: String,
}

/// One row of the UTXO endpoint's flat reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UtxoRow {
    pub tx_hash: String,
    pub tx_index: u32,
    pub receiver: String,
    pub amount: AmountRepr,
}

/// The backend reports amounts as strings, but some deployments send
/// plain numbers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AmountRepr {
    Text(String),
    Number(u64),
}

impl AmountRepr {
    fn into_decimal(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Stake delegation of an account: `[pool_id, ratio]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    #[serde(default)]
    pub pools: Vec<(String, u64)>,
}

/// On-chain state of an account address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    #[serde(default)]
    pub delegation: Delegation,
    pub value: u64,
    pub counter: u64,
}

/// Outcome of an account-state lookup for one address.
///
/// `Unused` and `Missing` both mean "no funds", but they are different
/// answers from the node and are kept apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AccountStateLookup {
    Active(AccountState),
    /// Valid address that has never appeared on chain.
    Unused,
    /// The node has no account for this address.
    Missing,
}

impl AccountStateLookup {
    /// Balance of the account, zero for unused or missing accounts.
    pub fn value(&self) -> u64 {
        match self {
            Self::Active(state) => state.value,
            Self::Unused | Self::Missing => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// RemoteFetcher
// ---------------------------------------------------------------------------

/// Client for one backend instance.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    backend_url: String,
    client: Client,
}

impl RemoteFetcher {
    /// Build a client for `backend_url` that identifies itself with
    /// `client_version` and `locale` on every request.
    pub fn new(backend_url: &str, client_version: &str, locale: &str) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HEADER_CLIENT_VERSION,
            HeaderValue::from_str(client_version).map_err(|_| ClientError::InvalidHeader {
                name: HEADER_CLIENT_VERSION,
            })?,
        );
        headers.insert(
            HEADER_LOCALE,
            HeaderValue::from_str(locale).map_err(|_| ClientError::InvalidHeader {
                name: HEADER_LOCALE,
            })?,
        );
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.backend_url, path)
    }

    /// Submit an encoded signed transaction for broadcast.
    pub async fn submit(&self, encoded_tx: &[u8]) -> Result<(), SubmitError> {
        let request = SignedRequest {
            signed_tx: general_purpose::STANDARD.encode(encoded_tx),
        };
        let response = self
            .client
            .post(self.endpoint("/api/txs/signed"))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "signed transaction submission failed");
                SubmitError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(bytes = encoded_tx.len(), "signed transaction accepted");
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        error!(%status, body = %body, "signed transaction rejected");
        Err(classify_rejection(&body, status.as_u16()))
    }

    /// Look up the account state of each address.
    pub async fn account_state(
        &self,
        addresses: &[String],
    ) -> Result<BTreeMap<String, AccountStateLookup>, AccountStateError> {
        let fail = |reason: String| {
            error!(reason = %reason, "account state lookup failed");
            AccountStateError { reason }
        };

        let response = self
            .client
            .post(self.endpoint("/api/v2/account/state"))
            .json(&AddressesRequest { addresses })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| fail(e.to_string()))?;
        let raw: HashMap<String, serde_json::Value> =
            response.json().await.map_err(|e| fail(e.to_string()))?;

        raw.into_iter()
            .map(|(address, value)| -> Result<_, AccountStateError> {
                let lookup = classify_account_state(value)
                    .map_err(|e| fail(format!("account {address}: {e}")))?;
                Ok((address, lookup))
            })
            .collect()
    }
}

#[async_trait]
impl UtxoSource for RemoteFetcher {
    async fn get_utxos_for_addresses(
        &self,
        addresses: &[String],
    ) -> Result<Vec<AddressUtxos>, UtxoFetchError> {
        let fail = |reason: String| {
            error!(reason = %reason, "utxo lookup failed");
            UtxoFetchError::new(reason)
        };

        let response = self
            .client
            .post(self.endpoint("/api/txs/utxoForAddresses"))
            .json(&AddressesRequest { addresses })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| fail(e.to_string()))?;
        let rows: Vec<UtxoRow> = response.json().await.map_err(|e| fail(e.to_string()))?;

        debug!(addresses = addresses.len(), rows = rows.len(), "utxo rows received");
        Ok(group_rows(rows))
    }
}

/// Group flat rows by receiver, in order of each receiver's first row.
pub fn group_rows(rows: Vec<UtxoRow>) -> Vec<AddressUtxos> {
    let (groups, _) = rows.into_iter().fold(
        (Vec::<AddressUtxos>::new(), HashMap::<String, usize>::new()),
        |(mut groups, mut index), row| {
            let utxo = RemoteUtxo {
                tx_hash: row.tx_hash,
                output_index: row.tx_index,
                amount: row.amount.into_decimal(),
            };
            match index.get(&row.receiver) {
                Some(&at) => groups[at].utxos.push(utxo),
                None => {
                    index.insert(row.receiver.clone(), groups.len());
                    groups.push(AddressUtxos {
                        address: row.receiver,
                        utxos: vec![utxo],
                    });
                }
            }
            (groups, index)
        },
    );
    groups
}

/// Interpret one entry of the account-state reply.
pub fn classify_account_state(
    value: serde_json::Value,
) -> Result<AccountStateLookup, serde_json::Error> {
    match value {
        serde_json::Value::String(s) if s == ACCOUNT_UNUSED => Ok(AccountStateLookup::Unused),
        serde_json::Value::String(s) if s == ACCOUNT_MISSING => Ok(AccountStateLookup::Missing),
        other => serde_json::from_value(other).map(AccountStateLookup::Active),
    }
}

/// Map a non-success submission reply onto [`SubmitError`].
pub fn classify_rejection(body: &str, status: u16) -> SubmitError {
    if body.contains(INVALID_WITNESS_MARKER) {
        SubmitError::InvalidWitness
    } else {
        SubmitError::Rejected(format!("HTTP {status}: {body}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_group_by_receiver_in_first_seen_order() {
        let rows: Vec<UtxoRow> = serde_json::from_value(json!([
            {"tx_hash": "aa", "tx_index": 0, "receiver": "b", "amount": "10"},
            {"tx_hash": "bb", "tx_index": 1, "receiver": "a", "amount": 20},
            {"tx_hash": "cc", "tx_index": 2, "receiver": "b", "amount": "30"},
        ]))
        .unwrap();

        let groups = group_rows(rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].address, "b");
        assert_eq!(groups[0].utxos.len(), 2);
        assert_eq!(groups[0].utxos[1].output_index, 2);
        assert_eq!(groups[1].address, "a");
        assert_eq!(groups[1].utxos[0].amount, "20");
    }

    #[test]
    fn empty_and_missing_accounts_stay_distinct() {
        assert_eq!(
            classify_account_state(json!("")).unwrap(),
            AccountStateLookup::Unused
        );
        assert_eq!(
            classify_account_state(json!("Account does not exist")).unwrap(),
            AccountStateLookup::Missing
        );
        assert_ne!(AccountStateLookup::Unused, AccountStateLookup::Missing);
        assert_eq!(AccountStateLookup::Missing.value(), 0);
    }

    #[test]
    fn test_active_account_state_parses() {
        let lookup = classify_account_state(json!({
            "delegation": {"pools": [["pool1", 1]]},
            "value": 2500000,
            "counter": 3
        }))
        .unwrap();
        match lookup {
            AccountStateLookup::Active(state) => {
                assert_eq!(state.value, 2_500_000);
                assert_eq!(state.counter, 3);
                assert_eq!(state.delegation.pools, vec![("pool1".to_string(), 1)]);
            }
            other => panic!("unexpected lookup: {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_account_reply_is_an_error() {
        assert!(classify_account_state(json!("something else")).is_err());
        assert!(classify_account_state(json!({"value": "lots"})).is_err());
    }

    #[test]
    fn invalid_witness_rejection_is_recognised() {
        assert_eq!(
            classify_rejection("Error: Invalid witness for input 0", 400),
            SubmitError::InvalidWitness
        );
        assert_eq!(
            classify_rejection("fee too small", 400),
            SubmitError::Rejected("HTTP 400: fee too small".into())
        );
    }

    #[test]
    fn test_client_strips_trailing_slash() {
        let fetcher = RemoteFetcher::new("https://backend.example/", "1.0.0", "en-US").unwrap();
        assert_eq!(fetcher.backend_url(), "https://backend.example");
        assert_eq!(
            fetcher.endpoint("/api/txs/signed"),
            "https://backend.example/api/txs/signed"
        );
    }

    #[test]
    fn test_invalid_header_value_is_rejected() {
        let err = RemoteFetcher::new("http://localhost", "bad\nversion", "en-US").unwrap_err();
        assert!(matches!(
            err,
            ClientError::InvalidHeader { name: "yoroi-version" }
        ));
    }

    #[test]
    fn lookup_json_shape() {
        let json = serde_json::to_value(AccountStateLookup::Unused).unwrap();
        assert_eq!(json, json!({"status": "unused"}));
    }
}
