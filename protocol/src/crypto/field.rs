//! # BN254 Scalar Field Reduction
//!
//! The protocol hands us byte blobs (signatures, hash outputs, key material)
//! that have to become field elements before they mean anything to a
//! circuit. [`reduce`] reads the bytes little-endian and reduces modulo the
//! BN254 scalar prime, the same field Baby Jubjub is defined over.

use std::fmt;

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField, Zero};
use num_bigint::BigUint;

/// The field prime `p` as a `BigUint`.
pub fn field_modulus() -> BigUint {
    BigUint::from_bytes_le(&Fr::MODULUS.to_bytes_le())
}

/// A BN254 scalar field element, always in `[0, p)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Scalar(Fr);

impl Scalar {
    /// Wraps an arkworks field element.
    pub fn from_field(value: Fr) -> Self {
        Self(value)
    }

    /// Reduces an arbitrary integer modulo `p`.
    pub fn from_biguint(value: &BigUint) -> Self {
        Self(Fr::from_le_bytes_mod_order(&value.to_bytes_le()))
    }

    /// The underlying field element.
    pub fn as_field(&self) -> &Fr {
        &self.0
    }

    /// Canonical integer representative.
    pub fn to_biguint(&self) -> BigUint {
        fr_to_biguint(&self.0)
    }

    /// Returns `true` for the additive identity.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar({})", self.to_biguint())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_biguint())
    }
}

/// Reduces a little-endian byte sequence modulo the field prime.
///
/// Byte `i` contributes `bytes[i] * 256^i`. The sequence length defines the
/// precision exactly; there is no implicit padding. Empty input is zero.
///
/// ```
/// use eerc_client::crypto::reduce;
///
/// assert!(reduce(&[]).is_zero());
/// assert_eq!(reduce(&[1, 0, 0]).to_biguint(), 1u32.into());
/// ```
pub fn reduce(bytes: &[u8]) -> Scalar {
    let value = BigUint::from_bytes_le(bytes) % field_modulus();
    Scalar(Fr::from_le_bytes_mod_order(&value.to_bytes_le()))
}

/// Canonical `BigUint` for a field element.
pub(crate) fn fr_to_biguint(value: &Fr) -> BigUint {
    BigUint::from_bytes_le(&value.into_bigint().to_bytes_le())
}

/// Field element for an integer, or `None` if it is not a canonical
/// representative (i.e. `value >= p`).
pub(crate) fn fr_from_canonical(value: &BigUint) -> Option<Fr> {
    if value >= &field_modulus() {
        return None;
    }
    Some(Fr::from_le_bytes_mod_order(&value.to_bytes_le()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FIELD_MODULUS_DEC;

    #[test]
    fn test_modulus_matches_config() {
        assert_eq!(field_modulus().to_string(), FIELD_MODULUS_DEC);
    }

    #[test]
    fn test_reduce_empty_is_zero() {
        assert!(reduce(&[]).is_zero());
    }

    #[test]
    fn test_reduce_is_little_endian() {
        assert_eq!(reduce(&[1, 0, 0]).to_biguint(), BigUint::from(1u32));
        assert_eq!(reduce(&[0, 1]).to_biguint(), BigUint::from(256u32));
        assert_eq!(reduce(&[0x34, 0x12]).to_biguint(), BigUint::from(0x1234u32));
    }

    #[test]
    fn test_reduce_wraps_at_modulus() {
        let p = field_modulus();
        let at_p = p.to_bytes_le();
        assert!(reduce(&at_p).is_zero());

        let p_plus_five = (&p + BigUint::from(5u32)).to_bytes_le();
        assert_eq!(reduce(&p_plus_five).to_biguint(), BigUint::from(5u32));
    }

    #[test]
    fn test_reduce_always_below_modulus() {
        let p = field_modulus();
        for len in [1usize, 16, 31, 32, 33, 64, 65, 200] {
            let bytes = vec![0xFFu8; len];
            let s = reduce(&bytes);
            assert!(s.to_biguint() < p, "len {}", len);
            assert_eq!(s.to_biguint(), BigUint::from_bytes_le(&bytes) % &p);
        }
    }

    #[test]
    fn test_canonical_conversion_rejects_out_of_range() {
        let p = field_modulus();
        assert!(fr_from_canonical(&p).is_none());
        let below = &p - BigUint::from(1u32);
        let fr = fr_from_canonical(&below).unwrap();
        assert_eq!(fr_to_biguint(&fr), below);
    }
}
