//! # ElGamal over Baby Jubjub
//!
//! Exponential ElGamal, the scheme eERC balances are stored under:
//!
//! ```text
//! Enc(pk, m; r) = (r·G, m·G + r·pk)           G = BASE8
//! Dec(sk, C1, C2) = C2 - sk·C1 = m·G
//! ```
//!
//! The scheme is additively homomorphic, which is what lets the contract
//! add a mint to a balance it cannot read. Recovering `m` from `m·G` is a
//! discrete log; the simulator sidesteps it by checking a candidate `m`
//! instead of searching for one.

use ark_bn254::Fr;
use ark_ff::UniformRand;
use num_bigint::BigUint;

use eerc_client::crypto::{EdwardsPoint, Scalar};
use eerc_client::EncryptedBalance;

use crate::error::ContractError;

/// An encrypted amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    pub c1: EdwardsPoint,
    pub c2: EdwardsPoint,
}

impl Ciphertext {
    /// Encryption of zero with zero randomness: `(O, O)`.
    pub fn zero() -> Self {
        Self {
            c1: EdwardsPoint::identity(),
            c2: EdwardsPoint::identity(),
        }
    }

    /// Encrypts `amount` to `public_key` with fresh randomness.
    pub fn encrypt(public_key: &EdwardsPoint, amount: &BigUint) -> Result<Self, ContractError> {
        let r = Scalar::from_field(Fr::rand(&mut rand::thread_rng())).to_biguint();
        Self::encrypt_with(public_key, amount, &r)
    }

    /// Encrypts with caller-chosen randomness.
    pub fn encrypt_with(
        public_key: &EdwardsPoint,
        amount: &BigUint,
        r: &BigUint,
    ) -> Result<Self, ContractError> {
        let g = EdwardsPoint::base8();
        let c1 = g.checked_mul(r).ok_or(ContractError::Curve("r·G"))?;
        let shared = public_key
            .checked_mul(r)
            .ok_or(ContractError::Curve("r·pk"))?;
        let message = g.checked_mul(amount).ok_or(ContractError::Curve("m·G"))?;
        let c2 = message
            .checked_add(&shared)
            .ok_or(ContractError::Curve("m·G + r·pk"))?;
        Ok(Self { c1, c2 })
    }

    /// Homomorphic addition.
    pub fn add(&self, other: &Self) -> Result<Self, ContractError> {
        Ok(Self {
            c1: self.c1.checked_add(&other.c1).ok_or(ContractError::Curve("C1 + C1'"))?,
            c2: self.c2.checked_add(&other.c2).ok_or(ContractError::Curve("C2 + C2'"))?,
        })
    }

    /// Homomorphic subtraction.
    pub fn sub(&self, other: &Self) -> Result<Self, ContractError> {
        let negated = Self {
            c1: other.c1.negate(),
            c2: other.c2.negate(),
        };
        self.add(&negated)
    }

    /// `C2 - sk·C1`, the message point.
    pub fn message_point(&self, secret: &BigUint) -> Result<EdwardsPoint, ContractError> {
        let shared = self
            .c1
            .checked_mul(secret)
            .ok_or(ContractError::Curve("sk·C1"))?;
        self.c2
            .checked_add(&shared.negate())
            .ok_or(ContractError::Curve("C2 - sk·C1"))
    }

    /// Whether this ciphertext decrypts to `amount` under `secret`.
    pub fn decrypts_to(&self, secret: &BigUint, amount: &BigUint) -> Result<bool, ContractError> {
        let expected = EdwardsPoint::base8()
            .checked_mul(amount)
            .ok_or(ContractError::Curve("m·G"))?;
        Ok(self.message_point(secret)? == expected)
    }
}

impl From<Ciphertext> for EncryptedBalance {
    fn from(ct: Ciphertext) -> Self {
        EncryptedBalance::new(ct.c1.into(), ct.c2.into())
    }
}
