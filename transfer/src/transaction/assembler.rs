//! # Transaction Assembler
//!
//! Turns a set of UTXOs into an unsigned body whose fee is correct for the
//! final signed size.
//!
//! ## The fee fixpoint
//!
//! The fee depends on the encoded size, and the size depends on the output
//! amount (CBOR integers widen at 24, 2^8, 2^16, 2^32), which depends on the
//! fee. The assembler starts from the fee of the widest draft (the output
//! carries the whole pool) and re-estimates against the actual output until
//! the estimate stops growing:
//!
//! ```text
//! fee_0     = estimate(size(output = pool))
//! output_k  = pool - fee_k
//! fee_{k+1} = estimate(size(output_k))
//! stop when fee_{k+1} <= fee_k
//! ```
//!
//! When the estimate drops (the output fell below a width boundary), the
//! lower fee is adopted if the output it leaves still encodes at the
//! narrower width; then the fee is exactly the minimum for the final size.
//! Otherwise the higher fee is kept. Either way the result always covers
//! the minimum fee of the final size. Drafts are sized with placeholder
//! witnesses, one per input, so the measured size is the size of the signed
//! transaction the packager will emit.

use tracing::debug;

use super::codec::{signed_size, TxBody, TxIn, TxOut};
use super::error::TransferError;
use super::fee::estimate_fee;
use crate::config::{ProtocolParams, MAX_FEE_ITERATIONS};
use crate::wallet::{total_amount, Utxo};

/// An unsigned transaction with its fee settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledTx {
    pub body: TxBody,
    /// The spent UTXOs, in body input order.
    pub inputs: Vec<Utxo>,
    pub fee: u64,
}

impl AssembledTx {
    /// Sum of all input amounts. Checked at assembly time.
    pub fn input_total(&self) -> u64 {
        self.inputs.iter().map(|u| u.amount).sum()
    }

    pub fn outputs(&self) -> &[TxOut] {
        &self.body.outputs
    }
}

/// Result of splitting a pool of coin between the fee and one output.
enum Settlement {
    Paid { fee: u64, output: u64 },
    Short { required: u64 },
}

/// Spend every UTXO into a single output to `destination`.
///
/// # Errors
///
/// - [`TransferError::NotEnoughMoney`] when `utxos` is empty, or when the
///   total cannot cover the fee plus a minimum-value output.
/// - [`TransferError::AmountOverflow`] when the input amounts do not fit in
///   a `u64`.
/// - [`TransferError::FeeDidNotConverge`] if the fixpoint does not settle.
pub fn assemble_sweep(
    utxos: &[Utxo],
    destination: &str,
    params: &ProtocolParams,
) -> Result<AssembledTx, TransferError> {
    let total = spendable_total(utxos)?;
    let inputs: Vec<TxIn> = utxos.iter().map(TxIn::from).collect();

    let settlement = settle_fee(total, params, |amount| {
        draft_size(&inputs, vec![TxOut::new(destination, amount)])
    })?;

    match settlement {
        Settlement::Paid { fee, output } => {
            debug!(inputs = utxos.len(), total, fee, output, "sweep assembled");
            Ok(AssembledTx {
                body: TxBody {
                    inputs,
                    outputs: vec![TxOut::new(destination, output)],
                },
                inputs: utxos.to_vec(),
                fee,
            })
        }
        Settlement::Short { required } => Err(TransferError::NotEnoughMoney {
            available: total,
            required,
        }),
    }
}

/// Spend every UTXO, paying `amount` to `destination` and the rest, less
/// the fee, to `change_address`.
///
/// A change output that would fall below the minimum output value is left
/// out and its remainder goes to the fee, so no dust output is ever made.
pub fn assemble_send(
    utxos: &[Utxo],
    destination: &str,
    amount: u64,
    change_address: &str,
    params: &ProtocolParams,
) -> Result<AssembledTx, TransferError> {
    let minimum = minimum_output(params);
    if amount < minimum {
        return Err(TransferError::OutputBelowMinimum { amount, minimum });
    }

    let total = spendable_total(utxos)?;
    let inputs: Vec<TxIn> = utxos.iter().map(TxIn::from).collect();
    let payment = TxOut::new(destination, amount);

    let remainder = total.checked_sub(amount).ok_or(TransferError::NotEnoughMoney {
        available: total,
        required: amount,
    })?;

    let with_change = settle_fee(remainder, params, |change| {
        draft_size(
            &inputs,
            vec![payment.clone(), TxOut::new(change_address, change)],
        )
    })?;

    let (outputs, fee) = match with_change {
        Settlement::Paid { fee, output } => {
            (vec![payment, TxOut::new(change_address, output)], fee)
        }
        Settlement::Short { .. } => {
            let fee = estimate_fee(draft_size(&inputs, vec![payment.clone()])?, params);
            if remainder < fee {
                return Err(TransferError::NotEnoughMoney {
                    available: total,
                    required: amount.saturating_add(fee),
                });
            }
            debug!(remainder, fee, "change below minimum, folded into fee");
            (vec![payment], remainder)
        }
    };

    debug!(inputs = utxos.len(), total, fee, outputs = outputs.len(), "send assembled");
    Ok(AssembledTx {
        body: TxBody { inputs, outputs },
        inputs: utxos.to_vec(),
        fee,
    })
}

/// Smallest amount any output may carry. A zero output is never useful,
/// so the floor is one even when the parameters allow zero.
fn minimum_output(params: &ProtocolParams) -> u64 {
    params.minimum_utxo_value.max(1)
}

fn spendable_total(utxos: &[Utxo]) -> Result<u64, TransferError> {
    if utxos.is_empty() {
        return Err(TransferError::NotEnoughMoney {
            available: 0,
            required: 0,
        });
    }
    total_amount(utxos).ok_or(TransferError::AmountOverflow)
}

fn draft_size(inputs: &[TxIn], outputs: Vec<TxOut>) -> Result<usize, TransferError> {
    let body = TxBody {
        inputs: inputs.to_vec(),
        outputs,
    };
    Ok(signed_size(&body, inputs.len())?)
}

/// Split `pool` between the fee and one output whose encoding (and thus
/// the transaction size) depends on its amount.
fn settle_fee<F>(pool: u64, params: &ProtocolParams, size_of: F) -> Result<Settlement, TransferError>
where
    F: Fn(u64) -> Result<usize, TransferError>,
{
    let minimum = minimum_output(params);
    let mut fee = estimate_fee(size_of(pool)?, params);

    for iteration in 0..MAX_FEE_ITERATIONS {
        let output = match pool.checked_sub(fee) {
            Some(output) if output >= minimum => output,
            _ => {
                return Ok(Settlement::Short {
                    required: fee.saturating_add(minimum),
                })
            }
        };
        let next = estimate_fee(size_of(output)?, params);
        debug!(iteration, fee, next, output, "fee iteration");
        if next == fee {
            return Ok(Settlement::Paid { fee, output });
        }
        if next < fee {
            // The output shrank across a width boundary. Take the lower fee
            // unless the larger output it leaves widens the encoding again.
            let lowered = pool - next;
            if estimate_fee(size_of(lowered)?, params) <= next {
                return Ok(Settlement::Paid {
                    fee: next,
                    output: lowered,
                });
            }
            return Ok(Settlement::Paid { fee, output });
        }
        fee = next;
    }

    Err(TransferError::FeeDidNotConverge {
        iterations: MAX_FEE_ITERATIONS,
    })
}
