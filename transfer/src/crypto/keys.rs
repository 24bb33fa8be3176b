//! # Key Management
//!
//! Extended Ed25519 keys: a signing key paired with a 32-byte chain code,
//! so that child keys can be derived along a BIP32-style path.
//!
//! Derivation is private-only. Every child is produced from the parent's
//! secret (hardened indices) or the parent's public key (soft indices) fed
//! through HMAC-SHA512 keyed by the parent chain code:
//!
//! ```text
//! hardened: I = HMAC-SHA512(chain_code, 0x00 || secret || index_be)
//! soft:     I = HMAC-SHA512(chain_code, 0x02 || public || index_be)
//! child secret = I[..32], child chain code = I[32..]
//! ```
//!
//! Both branches need the parent secret to finish (the child secret is not
//! an additive tweak), so public-only derivation is not offered.
//!
//! ## Security considerations
//!
//! - Secret scalars are zeroized on drop by ed25519-dalek; chain codes are
//!   held in [`Zeroizing`] buffers.
//! - Key bytes are never logged and `Debug` prints only the public half.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::config::HARDENED;

type HmacSha512 = Hmac<Sha512>;

/// HMAC key used to turn a wallet seed into the root extended key.
const ROOT_SEED_DOMAIN: &[u8] = b"ed25519 seed";

/// Length of an extended public key on the wire: public key || chain code.
pub const EXTENDED_PUBLIC_KEY_LENGTH: usize = 64;

/// Length of an Ed25519 signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// Errors that can occur during key operations.
///
/// Messages say what was malformed, never which bytes.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: expected {expected} hex-encoded bytes")]
    InvalidSecretKey { expected: usize },

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,

    #[error("key derivation failed at index {index}")]
    Derivation { index: u32 },
}

// ---------------------------------------------------------------------------
// ExtendedSigningKey
// ---------------------------------------------------------------------------

/// An Ed25519 signing key together with its chain code.
///
/// Not `Serialize`: exporting secret material goes through
/// [`to_hex`](Self::to_hex) explicitly.
pub struct ExtendedSigningKey {
    signing_key: SigningKey,
    chain_code: Zeroizing<[u8; 32]>,
}

impl ExtendedSigningKey {
    /// Generate a fresh key and chain code from the OS RNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let mut chain_code = Zeroizing::new([0u8; 32]);
        OsRng.fill_bytes(&mut chain_code[..]);
        Self {
            signing_key,
            chain_code,
        }
    }

    /// Derive the root extended key from wallet seed bytes.
    pub fn from_seed(seed: &[u8]) -> Result<Self, KeyError> {
        let digest = hmac_sha512(ROOT_SEED_DOMAIN, &[seed]).ok_or(KeyError::Derivation {
            index: 0,
        })?;
        Ok(Self::from_digest(&digest))
    }

    /// Assemble a key from its raw secret and chain code.
    pub fn from_parts(secret: [u8; SECRET_KEY_LENGTH], chain_code: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&secret),
            chain_code: Zeroizing::new(chain_code),
        }
    }

    /// Parse `hex(secret || chain_code)`, 64 bytes in total.
    ///
    /// This is the format the CLI reads from key files.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = Zeroizing::new(
            hex::decode(hex_str.trim()).map_err(|_| KeyError::InvalidSecretKey { expected: 64 })?,
        );
        if bytes.len() != SECRET_KEY_LENGTH + 32 {
            return Err(KeyError::InvalidSecretKey { expected: 64 });
        }
        let mut secret = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
        secret.copy_from_slice(&bytes[..SECRET_KEY_LENGTH]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&bytes[SECRET_KEY_LENGTH..]);
        Ok(Self::from_parts(*secret, chain_code))
    }

    /// Export `hex(secret || chain_code)`. Handle the result like the key itself.
    pub fn to_hex(&self) -> String {
        let mut bytes = Zeroizing::new(Vec::with_capacity(64));
        bytes.extend_from_slice(&self.signing_key.to_bytes());
        bytes.extend_from_slice(&self.chain_code[..]);
        hex::encode(bytes.as_slice())
    }

    /// Derive the child key at `index`. Indices `>= HARDENED` are hardened.
    pub fn derive(&self, index: u32) -> Result<Self, KeyError> {
        let index_be = index.to_be_bytes();
        let digest = if index >= HARDENED {
            let secret = Zeroizing::new(self.signing_key.to_bytes());
            hmac_sha512(&self.chain_code[..], &[&[0x00u8], &secret[..], &index_be])
        } else {
            let public = self.signing_key.verifying_key().to_bytes();
            hmac_sha512(&self.chain_code[..], &[&[0x02u8], &public, &index_be])
        };
        let digest = digest.ok_or(KeyError::Derivation { index })?;
        Ok(Self::from_digest(&digest))
    }

    /// Derive along `path`, one index at a time. An empty path returns a
    /// copy of `self`.
    pub fn derive_path(&self, path: &[u32]) -> Result<Self, KeyError> {
        let mut key = self.duplicate();
        for &index in path {
            key = key.derive(index)?;
        }
        Ok(key)
    }

    /// The public half, including the chain code.
    pub fn public(&self) -> ExtendedPublicKey {
        ExtendedPublicKey {
            public_key: self.signing_key.verifying_key().to_bytes(),
            chain_code: *self.chain_code,
        }
    }

    /// Sign a message. Ed25519 is deterministic: same key, same message,
    /// same signature.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key.sign(message).to_bytes()
    }

    fn from_digest(digest: &[u8; 64]) -> Self {
        let mut secret = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
        secret.copy_from_slice(&digest[..32]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&digest[32..]);
        Self::from_parts(*secret, chain_code)
    }

    fn duplicate(&self) -> Self {
        Self::from_parts(self.signing_key.to_bytes(), *self.chain_code)
    }
}

impl fmt::Debug for ExtendedSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtendedSigningKey(pub={})", self.public().to_hex())
    }
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Option<Zeroizing<[u8; 64]>> {
    let mut mac = HmacSha512::new_from_slice(key).ok()?;
    for part in parts {
        mac.update(part);
    }
    let mut out = Zeroizing::new([0u8; 64]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    Some(out)
}

// ---------------------------------------------------------------------------
// ExtendedPublicKey
// ---------------------------------------------------------------------------

/// Public key plus chain code. This is what a witness carries so that
/// validators can check the signature and the address derivation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtendedPublicKey {
    public_key: [u8; 32],
    chain_code: [u8; 32],
}

impl ExtendedPublicKey {
    /// Split a 64-byte wire encoding into key and chain code.
    pub fn from_bytes(bytes: &[u8; EXTENDED_PUBLIC_KEY_LENGTH]) -> Result<Self, KeyError> {
        let mut public_key = [0u8; 32];
        public_key.copy_from_slice(&bytes[..32]);
        VerifyingKey::from_bytes(&public_key).map_err(|_| KeyError::InvalidPublicKey)?;
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&bytes[32..]);
        Ok(Self {
            public_key,
            chain_code,
        })
    }

    /// `public_key || chain_code`.
    pub fn to_bytes(&self) -> [u8; EXTENDED_PUBLIC_KEY_LENGTH] {
        let mut out = [0u8; EXTENDED_PUBLIC_KEY_LENGTH];
        out[..32].copy_from_slice(&self.public_key);
        out[32..].copy_from_slice(&self.chain_code);
        out
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Returns `true` if `signature` is a valid Ed25519 signature of
    /// `message` under this key.
    pub fn verify(&self, message: &[u8], signature: &[u8; SIGNATURE_LENGTH]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.public_key) else {
            return false;
        };
        verifying_key
            .verify(message, &Signature::from_bytes(signature))
            .is_ok()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl fmt::Debug for ExtendedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtendedPublicKey({})", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let key = ExtendedSigningKey::generate();
        let sig = key.sign(b"sweep");
        assert!(key.public().verify(b"sweep", &sig));
        assert!(!key.public().verify(b"other", &sig));
    }

    #[test]
    fn test_from_seed_is_deterministic() {
        let a = ExtendedSigningKey::from_seed(&[7u8; 32]).unwrap();
        let b = ExtendedSigningKey::from_seed(&[7u8; 32]).unwrap();
        assert_eq!(a.public(), b.public());

        let c = ExtendedSigningKey::from_seed(&[8u8; 32]).unwrap();
        assert_ne!(a.public(), c.public());
    }

    #[test]
    fn test_hex_roundtrip() {
        let key = ExtendedSigningKey::generate();
        let restored = ExtendedSigningKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(key.public(), restored.public());
    }

    #[test]
    fn test_invalid_hex_rejected() {
        assert!(ExtendedSigningKey::from_hex("deadbeef").is_err());
        assert!(ExtendedSigningKey::from_hex("not-hex-at-all").is_err());
        // A bare 32-byte secret without the chain code is not enough.
        assert!(ExtendedSigningKey::from_hex(&"ab".repeat(32)).is_err());
    }

    #[test]
    fn hardened_and_soft_children_differ() {
        let root = ExtendedSigningKey::from_seed(b"seed").unwrap();
        let soft = root.derive(0).unwrap();
        let hard = root.derive(HARDENED).unwrap();
        assert_ne!(soft.public(), hard.public());
        assert_ne!(soft.public(), root.public());
    }

    #[test]
    fn test_derive_path_matches_stepwise_derivation() {
        let root = ExtendedSigningKey::from_seed(b"seed").unwrap();
        let path = [HARDENED + 44, HARDENED + 1815, HARDENED, 0, 3];

        let mut stepwise = root.derive(path[0]).unwrap();
        for &index in &path[1..] {
            stepwise = stepwise.derive(index).unwrap();
        }
        let direct = root.derive_path(&path).unwrap();
        assert_eq!(stepwise.public(), direct.public());
    }

    #[test]
    fn test_empty_path_is_identity() {
        let root = ExtendedSigningKey::generate();
        assert_eq!(root.derive_path(&[]).unwrap().public(), root.public());
    }

    #[test]
    fn test_extended_public_key_bytes_roundtrip() {
        let xpub = ExtendedSigningKey::generate().public();
        let restored = ExtendedPublicKey::from_bytes(&xpub.to_bytes()).unwrap();
        assert_eq!(xpub, restored);
        assert_eq!(restored.chain_code(), xpub.chain_code());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let key = ExtendedSigningKey::generate();
        let debug_str = format!("{:?}", key);
        assert!(debug_str.starts_with("ExtendedSigningKey(pub="));
        assert!(!debug_str.contains(&key.to_hex()[..64]));
    }
}
