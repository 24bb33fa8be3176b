//! # Legacy Transaction Wire Codec
//!
//! CBOR encoding of the legacy (Byron-era) transaction format:
//!
//! ```text
//! body      = [ [input...], [output...], {} ]
//! input     = [0, #6.24(bytes .cbor [txid: bytes, index: uint])]
//! output    = [address, amount: uint]
//! signed    = [ body, [witness...] ]
//! witness   = [0, #6.24(bytes .cbor [xpub: bytes(64), signature: bytes(64)])]
//! ```
//!
//! Addresses are carried as their base58-decoded CBOR structure. A string
//! that does not decode that way is embedded as CBOR text instead, so the
//! codec never rejects an address it was handed.
//!
//! ## Design Decisions
//!
//! - Encoding goes through [`ciborium::value::Value`] so the layout above is
//!   spelled out in one place. ciborium writes definite lengths and shortest
//!   integer forms, which makes the encoding canonical: the same body always
//!   produces the same bytes and therefore the same id.
//! - The transaction id hashes the body only. Witnesses are fixed-size, so a
//!   draft signed with [`Witness::placeholder`] has exactly the length of the
//!   final transaction.

use ciborium::value::Value;
use serde::{Deserialize, Serialize};

use super::error::CodecError;
use crate::crypto::keys::{EXTENDED_PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use crate::crypto::{blake3_hash, ExtendedPublicKey, KeyError};
use crate::wallet::{TxHash, Utxo};

/// CBOR tag for "embedded CBOR data item".
const TAG_ENCODED_CBOR: u64 = 24;

/// Input kind: spend a regular UTXO.
const INPUT_KIND_UTXO: u64 = 0;

/// Witness kind: public key + signature.
const WITNESS_KIND_PUBLIC_KEY: u64 = 0;

/// First byte of every transaction signing payload.
const SIGN_TAG_TX: u8 = 0x01;

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// Reference to the output being spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxIn {
    pub tx_hash: TxHash,
    pub output_index: u32,
}

impl From<&Utxo> for TxIn {
    fn from(utxo: &Utxo) -> Self {
        Self {
            tx_hash: utxo.tx_hash,
            output_index: utxo.output_index,
        }
    }
}

/// A payment to an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    pub address: String,
    pub amount: u64,
}

impl TxOut {
    pub fn new(address: impl Into<String>, amount: u64) -> Self {
        Self {
            address: address.into(),
            amount,
        }
    }
}

/// The signed-over part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxBody {
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
}

impl TxBody {
    /// Canonical CBOR encoding of the body.
    pub fn to_cbor(&self) -> Result<Vec<u8>, CodecError> {
        to_cbor(&self.to_value()?)
    }

    /// Transaction hash: BLAKE3 of [`to_cbor`](Self::to_cbor).
    pub fn hash(&self) -> Result<[u8; 32], CodecError> {
        Ok(blake3_hash(&self.to_cbor()?))
    }

    fn to_value(&self) -> Result<Value, CodecError> {
        let inputs = self
            .inputs
            .iter()
            .map(input_value)
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = self
            .outputs
            .iter()
            .map(|out| {
                Value::Array(vec![
                    address_value(&out.address),
                    Value::Integer(out.amount.into()),
                ])
            })
            .collect();
        Ok(Value::Array(vec![
            Value::Array(inputs),
            Value::Array(outputs),
            Value::Map(Vec::new()),
        ]))
    }
}

fn input_value(input: &TxIn) -> Result<Value, CodecError> {
    let pointer = to_cbor(&Value::Array(vec![
        Value::Bytes(input.tx_hash.as_bytes().to_vec()),
        Value::Integer(input.output_index.into()),
    ]))?;
    Ok(Value::Array(vec![
        Value::Integer(INPUT_KIND_UTXO.into()),
        Value::Tag(TAG_ENCODED_CBOR, Box::new(Value::Bytes(pointer))),
    ]))
}

/// Base58 addresses decode to a CBOR structure which is embedded as-is.
/// The decoded bytes must be exactly one canonical item; anything else is
/// treated as an opaque string.
fn address_value(address: &str) -> Value {
    bs58::decode(address)
        .into_vec()
        .ok()
        .and_then(|raw| {
            let value = from_cbor(&raw).ok()?;
            (to_cbor(&value).ok()? == raw).then_some(value)
        })
        .unwrap_or_else(|| Value::Text(address.to_string()))
}

// ---------------------------------------------------------------------------
// Witness
// ---------------------------------------------------------------------------

/// Proof that the holder of an input's key approved the transaction.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Witness {
    xpub: [u8; EXTENDED_PUBLIC_KEY_LENGTH],
    signature: [u8; SIGNATURE_LENGTH],
}

impl Witness {
    pub fn new(xpub: ExtendedPublicKey, signature: [u8; SIGNATURE_LENGTH]) -> Self {
        Self {
            xpub: xpub.to_bytes(),
            signature,
        }
    }

    /// All-zero witness with the exact encoded length of a real one. Used
    /// to size drafts before any key is touched.
    pub fn placeholder() -> Self {
        Self {
            xpub: [0u8; EXTENDED_PUBLIC_KEY_LENGTH],
            signature: [0u8; SIGNATURE_LENGTH],
        }
    }

    pub fn xpub_bytes(&self) -> &[u8; EXTENDED_PUBLIC_KEY_LENGTH] {
        &self.xpub
    }

    pub fn signature(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.signature
    }

    pub fn public_key(&self) -> Result<ExtendedPublicKey, KeyError> {
        ExtendedPublicKey::from_bytes(&self.xpub)
    }

    /// Check the signature against `payload` (see [`signing_payload`]).
    pub fn verify(&self, payload: &[u8]) -> bool {
        self.public_key()
            .map(|xpub| xpub.verify(payload, &self.signature))
            .unwrap_or(false)
    }

    fn to_value(&self) -> Result<Value, CodecError> {
        let inner = to_cbor(&Value::Array(vec![
            Value::Bytes(self.xpub.to_vec()),
            Value::Bytes(self.signature.to_vec()),
        ]))?;
        Ok(Value::Array(vec![
            Value::Integer(WITNESS_KIND_PUBLIC_KEY.into()),
            Value::Tag(TAG_ENCODED_CBOR, Box::new(Value::Bytes(inner))),
        ]))
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let Value::Array(items) = value else {
            return Err(CodecError::Malformed("witness is not an array"));
        };
        let inner = match items.as_slice() {
            [Value::Integer(_), Value::Tag(TAG_ENCODED_CBOR, inner)] => match &**inner {
                Value::Bytes(bytes) => bytes,
                _ => return Err(CodecError::Malformed("witness payload is not bytes")),
            },
            _ => return Err(CodecError::Malformed("unexpected witness layout")),
        };
        let pair = from_cbor(inner)?;
        match pair {
            Value::Array(pair) => match pair.as_slice() {
                [Value::Bytes(xpub), Value::Bytes(signature)] => Ok(Self {
                    xpub: xpub
                        .as_slice()
                        .try_into()
                        .map_err(|_| CodecError::Malformed("extended public key length"))?,
                    signature: signature
                        .as_slice()
                        .try_into()
                        .map_err(|_| CodecError::Malformed("signature length"))?,
                }),
                _ => Err(CodecError::Malformed("witness pair is not [xpub, signature]")),
            },
            _ => Err(CodecError::Malformed("witness pair is not an array")),
        }
    }
}

impl std::fmt::Debug for Witness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Witness(xpub={})", &hex::encode(self.xpub)[..16])
    }
}

// ---------------------------------------------------------------------------
// Signed transaction
// ---------------------------------------------------------------------------

/// Encode `[body, [witness...]]`.
pub fn encode_signed(body: &TxBody, witnesses: &[Witness]) -> Result<Vec<u8>, CodecError> {
    let witnesses = witnesses
        .iter()
        .map(Witness::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    to_cbor(&Value::Array(vec![body.to_value()?, Value::Array(witnesses)]))
}

/// Encoded length of `body` signed by `witness_count` witnesses.
pub fn signed_size(body: &TxBody, witness_count: usize) -> Result<usize, CodecError> {
    let placeholders = vec![Witness::placeholder(); witness_count];
    Ok(encode_signed(body, &placeholders)?.len())
}

/// Split an encoded signed transaction into its body bytes and witnesses.
///
/// The body is re-encoded from the decoded value, which reproduces the
/// original bytes for anything this codec wrote.
pub fn decode_signed(encoded: &[u8]) -> Result<(Vec<u8>, Vec<Witness>), CodecError> {
    let Value::Array(parts) = from_cbor(encoded)? else {
        return Err(CodecError::Malformed("signed transaction is not an array"));
    };
    match parts.as_slice() {
        [body, Value::Array(witnesses)] => {
            let witnesses = witnesses
                .iter()
                .map(Witness::from_value)
                .collect::<Result<Vec<_>, _>>()?;
            Ok((to_cbor(body)?, witnesses))
        }
        _ => Err(CodecError::Malformed("expected [body, [witness...]]")),
    }
}

/// Bytes each witness signs: `0x01 || cbor(protocol_magic) || cbor(bytes(tx_hash))`.
///
/// Mixing in the protocol magic keeps a signature from being valid on any
/// other network.
pub fn signing_payload(protocol_magic: u32, tx_hash: &[u8; 32]) -> Result<Vec<u8>, CodecError> {
    let mut payload = vec![SIGN_TAG_TX];
    payload.extend(to_cbor(&Value::Integer(protocol_magic.into()))?);
    payload.extend(to_cbor(&Value::Bytes(tx_hash.to_vec()))?);
    Ok(payload)
}

fn to_cbor(value: &Value) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(buf)
}

fn from_cbor(bytes: &[u8]) -> Result<Value, CodecError> {
    ciborium::from_reader(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}
