//! End-to-end transfer builds: resolve, assemble, sign, package.
//!
//! The synchronous entry points take UTXOs that are already resolved. The
//! async [`sweep_from_addresses`] adds the lookup in front and is the only
//! place a build waits on anything.

use tracing::info;

use crate::config::{Network, ProtocolParams};
use crate::fetch::{UtxoResolver, UtxoSource};
use crate::transaction::{
    assemble_send, assemble_sweep, package, sign_inputs, AssembledTx, SigningKeySource,
    TransferError, TransferTx,
};
use crate::wallet::{Address, Utxo};

/// Sweep every UTXO in `utxos` to `destination`.
pub fn build_sweep<K>(
    utxos: &[Utxo],
    destination: &str,
    key: &K,
    params: &ProtocolParams,
    network: Network,
) -> Result<TransferTx, TransferError>
where
    K: SigningKeySource + ?Sized,
{
    let assembled = assemble_sweep(utxos, destination, params)?;
    finish(assembled, key, network)
}

/// Spend every UTXO in `utxos`, paying `amount` to `destination` and the
/// rest (less the fee) to `change_address`.
pub fn build_send<K>(
    utxos: &[Utxo],
    destination: &str,
    amount: u64,
    change_address: &str,
    key: &K,
    params: &ProtocolParams,
    network: Network,
) -> Result<TransferTx, TransferError>
where
    K: SigningKeySource + ?Sized,
{
    let assembled = assemble_send(utxos, destination, amount, change_address, params)?;
    finish(assembled, key, network)
}

/// Resolve the UTXOs of `addresses` through `source` and sweep them all to
/// `destination`.
pub async fn sweep_from_addresses<S, K>(
    source: &S,
    addresses: &[Address],
    destination: &str,
    key: &K,
    params: &ProtocolParams,
    network: Network,
    batch_size: usize,
) -> Result<TransferTx, TransferError>
where
    S: UtxoSource + ?Sized,
    K: SigningKeySource + ?Sized,
{
    let utxos = UtxoResolver::new(source)
        .with_batch_size(batch_size)
        .resolve(addresses)
        .await?;
    build_sweep(&utxos, destination, key, params, network)
}

fn finish<K>(assembled: AssembledTx, key: &K, network: Network) -> Result<TransferTx, TransferError>
where
    K: SigningKeySource + ?Sized,
{
    let body_hash = assembled.body.hash()?;
    let witnesses = sign_inputs(&body_hash, &assembled.inputs, key, network)?;
    let tx = package(assembled, &witnesses)?;
    info!(
        id = %tx.id,
        inputs = tx.sender_utxos.len(),
        fee = tx.fee,
        size = tx.encoded_tx.len(),
        %network,
        "transfer built"
    );
    Ok(tx)
}
