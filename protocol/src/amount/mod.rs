//! # Amounts
//!
//! The eERC protocol counts in integers scaled by `10^2`. Users type
//! decimals. This module is the only place where one becomes the other.
//!
//! ```text
//! codec.rs — encode / decode between decimal strings and Amount
//! ```
//!
//! [`Amount`] wraps a `BigUint` rather than a `u64`: balances arrive from the
//! protocol as field elements, and the codec concatenates digit strings,
//! so the integer must be able to hold whatever the user typed.

pub mod codec;

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use codec::{accepts_input, decode, decode_default, encode, encode_scaled, format_balance};
pub use codec::AmountError;

/// A non-negative integer amount in the protocol's smallest unit.
///
/// `Amount` has no notion of scale. `Amount::from(150u64)` is `1.5` at two
/// fractional digits and `0.00000000000000015` at eighteen; whoever decodes
/// it decides.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigUint);

impl Amount {
    /// The zero amount.
    pub fn zero() -> Self {
        Self(BigUint::default())
    }

    /// Wraps a raw integer.
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    /// Returns `true` if this amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.bits() == 0
    }

    /// Borrows the underlying integer.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Consumes the amount, returning the underlying integer.
    pub fn into_biguint(self) -> BigUint {
        self.0
    }

    /// Saturating subtraction: never goes below zero.
    pub fn saturating_sub(&self, other: &Amount) -> Amount {
        if self.0 >= other.0 {
            Amount(&self.0 - &other.0)
        } else {
            Amount::zero()
        }
    }

    /// Subtraction that fails when `other` exceeds `self`.
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        (self.0 >= other.0).then(|| Amount(&self.0 - &other.0))
    }
}

impl std::ops::Add for &Amount {
    type Output = Amount;

    fn add(self, rhs: &Amount) -> Amount {
        Amount(&self.0 + &rhs.0)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<BigUint> for Amount {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parses a raw integer amount (no decimal point, no scaling).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::InvalidFormat {
                input: s.to_string(),
                reason: "expected an unsigned integer",
            });
        }
        s.parse::<BigUint>()
            .map(Amount)
            .map_err(|_| AmountError::InvalidFormat {
                input: s.to_string(),
                reason: "expected an unsigned integer",
            })
    }
}

// Amounts go over the wire as decimal strings. JSON numbers top out at 2^53
// in most consumers, and a balance is a field element.

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
