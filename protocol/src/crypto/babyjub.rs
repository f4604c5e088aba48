//! # Baby Jubjub
//!
//! The twisted Edwards curve the eERC protocol encrypts balances on:
//!
//! ```text
//! a·x² + y² = 1 + d·x²·y²     over the BN254 scalar field
//! a = 168700, d = 168696
//! ```
//!
//! Baby Jubjub has cofactor 8. `BASE8` generates the prime-order subgroup
//! of order `l`, and every key and ciphertext component the protocol reports
//! lives in that subgroup.
//!
//! Only affine coordinates here. The client multiplies a handful of points
//! per session, so projective coordinates would be premature optimization.

use ark_bn254::Fr;
use ark_ff::{Field, MontFp, One, Zero};
use num_bigint::BigUint;

/// Curve coefficient `a`.
pub const COEFF_A: Fr = MontFp!("168700");

/// Curve coefficient `d`.
pub const COEFF_D: Fr = MontFp!("168696");

/// `BASE8.x`.
pub const BASE8_X: Fr =
    MontFp!("5299619240641551281634865583518297030282874472190772894086521144482721001553");

/// `BASE8.y`.
pub const BASE8_Y: Fr =
    MontFp!("16950150798460657717958625567821834550301663161624707787222815936182638968203");

/// Returns `true` if `(x, y)` satisfies the curve equation.
pub fn is_on_curve(x: &Fr, y: &Fr) -> bool {
    let x2 = x.square();
    let y2 = y.square();
    COEFF_A * x2 + y2 == Fr::one() + COEFF_D * x2 * y2
}

/// Order of the subgroup generated by [`EdwardsPoint::base8`].
pub fn subgroup_order() -> BigUint {
    // The literal mirrors `config::BABYJUB_SUBGROUP_ORDER_DEC`; a test keeps them equal.
    BigUint::parse_bytes(
        b"2736030358979909402780800718157159386076813972158567259200215660948447373041",
        10,
    )
    .expect("subgroup order literal is valid decimal")
}

/// An affine Baby Jubjub point.
///
/// Construction does not check membership. Use [`EdwardsPoint::is_on_curve`]
/// before trusting a point that came from outside.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdwardsPoint {
    pub x: Fr,
    pub y: Fr,
}

impl EdwardsPoint {
    /// Creates a point from raw coordinates.
    pub fn new(x: Fr, y: Fr) -> Self {
        Self { x, y }
    }

    /// The neutral element `(0, 1)`.
    pub fn identity() -> Self {
        Self {
            x: Fr::zero(),
            y: Fr::one(),
        }
    }

    /// The prime-subgroup generator used for keys and ElGamal.
    pub fn base8() -> Self {
        Self {
            x: BASE8_X,
            y: BASE8_Y,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.x.is_zero() && self.y.is_one()
    }

    pub fn is_on_curve(&self) -> bool {
        is_on_curve(&self.x, &self.y)
    }

    /// Twisted Edwards addition:
    ///
    /// ```text
    /// x3 = (x1·y2 + y1·x2) / (1 + d·x1·x2·y1·y2)
    /// y3 = (y1·y2 - a·x1·x2) / (1 - d·x1·x2·y1·y2)
    /// ```
    ///
    /// The formula is complete on Baby Jubjub, so the denominators only
    /// vanish for inputs that are not on the curve. Those return `None`.
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        let x1x2 = self.x * other.x;
        let y1y2 = self.y * other.y;
        let dxy = COEFF_D * x1x2 * y1y2;

        let x_num = self.x * other.y + self.y * other.x;
        let y_num = y1y2 - COEFF_A * x1x2;
        let x_den = (Fr::one() + dxy).inverse()?;
        let y_den = (Fr::one() - dxy).inverse()?;

        Some(Self {
            x: x_num * x_den,
            y: y_num * y_den,
        })
    }

    /// Additive inverse: `-(x, y) = (-x, y)`.
    pub fn negate(&self) -> Self {
        Self {
            x: -self.x,
            y: self.y,
        }
    }

    /// Left-to-right double-and-add.
    ///
    /// Not constant time. Fine for a client rendering its own balance, not
    /// fine for anything that handles someone else's secrets.
    pub fn checked_mul(&self, scalar: &BigUint) -> Option<Self> {
        let mut acc = Self::identity();
        for i in (0..scalar.bits()).rev() {
            acc = acc.checked_add(&acc)?;
            if scalar.bit(i) {
                acc = acc.checked_add(self)?;
            }
        }
        Some(acc)
    }
}
