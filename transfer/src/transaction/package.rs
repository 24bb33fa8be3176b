//! The finished transfer: encoded, identified, ready to broadcast.

use serde::{Deserialize, Serialize};

use super::assembler::AssembledTx;
use super::codec::{encode_signed, TxOut, Witness};
use super::error::TransferError;
use crate::wallet::{total_amount, Utxo};

/// A fully signed transfer and everything a caller needs to show or
/// submit it.
///
/// Immutable once built: `encoded_tx` is exactly what goes on the wire and
/// `id` is the hash of its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTx {
    /// The spent UTXOs, in input order. Never empty.
    pub sender_utxos: Vec<Utxo>,
    pub outputs: Vec<TxOut>,
    pub fee: u64,
    /// CBOR `[body, [witness...]]`.
    #[serde(with = "hex")]
    pub encoded_tx: Vec<u8>,
    /// Hex transaction id.
    pub id: String,
}

impl TransferTx {
    /// Total value of the swept inputs.
    pub fn recovered_balance(&self) -> u64 {
        total_amount(&self.sender_utxos).unwrap_or(u64::MAX)
    }

    /// Distinct sender addresses, in order of first appearance.
    pub fn senders(&self) -> Vec<&str> {
        let mut senders: Vec<&str> = Vec::new();
        for utxo in &self.sender_utxos {
            let address = utxo.owner.as_str();
            if !senders.contains(&address) {
                senders.push(address);
            }
        }
        senders
    }

    /// Address of the first output.
    pub fn receiver(&self) -> Option<&str> {
        self.outputs.first().map(|out| out.address.as_str())
    }
}

/// Encode the signed transaction and compute its id.
///
/// `witnesses` must line up one-to-one with the inputs of `assembled`.
pub fn package(assembled: AssembledTx, witnesses: &[Witness]) -> Result<TransferTx, TransferError> {
    if witnesses.len() != assembled.inputs.len() {
        return Err(TransferError::WitnessCountMismatch {
            expected: assembled.inputs.len(),
            actual: witnesses.len(),
        });
    }

    let encoded_tx = encode_signed(&assembled.body, witnesses)?;
    let id = hex::encode(assembled.body.hash()?);

    Ok(TransferTx {
        sender_utxos: assembled.inputs,
        outputs: assembled.body.outputs,
        fee: assembled.fee,
        encoded_tx,
        id,
    })
}
