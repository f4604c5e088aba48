//! # Hashing Utilities
//!
//! The client never hashes anything the chain has to agree with (the proof
//! system brings its own hash), so BLAKE3 here only feeds deterministic
//! identifiers: simulated transaction hashes and key-derivation seeds.
//!
//! Every call names a context string. Two contexts never produce the same
//! digest for the same input, so a transaction hash can't double as a key.

use super::field::{reduce, Scalar};

/// BLAKE3 in `derive_key` mode, keyed by `context`.
///
/// ```
/// use eerc_client::crypto::domain_separated_hash;
///
/// let tx = domain_separated_hash("eerc-tx", b"payload");
/// let key = domain_separated_hash("eerc-key", b"payload");
/// assert_ne!(tx, key);
/// ```
pub fn domain_separated_hash(context: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// Maps `data` into the BN254 scalar field.
///
/// The 32 digest bytes go through [`reduce`], so they are read little-endian
/// like every other byte blob that becomes a field element in this crate.
pub fn hash_to_scalar(context: &str, data: &[u8]) -> Scalar {
    reduce(&domain_separated_hash(context, data))
}
