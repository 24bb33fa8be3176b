//! # Hashing Utilities
//!
//! Transaction ids are BLAKE3 digests of the encoded transaction body. The
//! witnesses are deliberately outside the hashed bytes: the id is known
//! before signing, and the signatures commit to it.
//!
//! SHA-512 is used too, but only inside HMAC for key derivation (see
//! [`super::keys`]), so it has no free-standing helper here.

/// Compute the BLAKE3 hash of the input data.
///
/// # Example
///
/// ```
/// use legacy_transfer::crypto::blake3_hash;
///
/// let hash = blake3_hash(b"legacy transfer");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}
