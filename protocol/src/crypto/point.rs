//! # Curve Point Model
//!
//! What the wallet shows for public keys, the auditor key and the two
//! halves of an encrypted balance. A point is just two integers; whether
//! it is on the curve is a property you *observe*, recomputed whenever a
//! coordinate changes.
//!
//! Being off the curve is not an error. A tampered or half-edited point is
//! a perfectly displayable state, and callers decide whether to warn,
//! block an action, or shrug.

use std::fmt;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::babyjub::{self, EdwardsPoint};
use super::field::{fr_from_canonical, fr_to_biguint};
use crate::config::{COORDINATE_ELISION_KEEP, COORDINATE_ELISION_THRESHOLD};

/// Errors from editing a point's coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointError {
    /// The typed text is not an unsigned decimal integer.
    #[error("invalid {which} coordinate: {input:?}")]
    InvalidCoordinate { which: Coordinate, input: String },
}

/// Which coordinate an edit replaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Coordinate {
    X,
    Y,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::X => write!(f, "x"),
            Coordinate::Y => write!(f, "y"),
        }
    }
}

/// Observed status of a point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointStatus {
    /// Both coordinates unset. Nothing to judge yet.
    Indeterminate,
    OnCurve,
    OffCurve,
}

impl PointStatus {
    /// Human-readable status, as shown on hover in the wallet UI.
    pub fn label(&self) -> &'static str {
        match self {
            PointStatus::Indeterminate => "Point is not set",
            PointStatus::OnCurve => "Point is on the curve",
            PointStatus::OffCurve => "Point is not on the curve",
        }
    }
}

/// Returns whether `(x, y)` lies on Baby Jubjub.
///
/// Never fails. Coordinates outside `[0, p)` are not canonical field
/// elements, so the membership check cannot be evaluated on them and the
/// point counts as off the curve.
pub fn validate(x: &BigUint, y: &BigUint) -> bool {
    match (fr_from_canonical(x), fr_from_canonical(y)) {
        (Some(x), Some(y)) => babyjub::is_on_curve(&x, &y),
        _ => false,
    }
}

/// A coordinate pair as reported by the protocol or typed by a user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurvePoint {
    #[serde(with = "biguint_dec")]
    pub x: BigUint,
    #[serde(with = "biguint_dec")]
    pub y: BigUint,
}

impl CurvePoint {
    pub fn new(x: BigUint, y: BigUint) -> Self {
        Self { x, y }
    }

    /// The unset point `(0, 0)`. The protocol reports missing keys as
    /// zero limbs, and `(0, 0)` is not a curve point, so it doubles as the
    /// "unknown" sentinel.
    pub fn unset() -> Self {
        Self::default()
    }

    pub fn is_unset(&self) -> bool {
        self.x.bits() == 0 && self.y.bits() == 0
    }

    /// Parses a point from two decimal strings.
    pub fn from_decimal(x: &str, y: &str) -> Result<Self, PointError> {
        Ok(Self {
            x: parse_coordinate(Coordinate::X, x)?,
            y: parse_coordinate(Coordinate::Y, y)?,
        })
    }

    /// Returns a copy with one coordinate replaced. Does not validate;
    /// [`CurvePoint::status`] recomputes on demand.
    pub fn with_coordinate(&self, which: Coordinate, value: BigUint) -> Self {
        match which {
            Coordinate::X => Self {
                x: value,
                y: self.y.clone(),
            },
            Coordinate::Y => Self {
                x: self.x.clone(),
                y: value,
            },
        }
    }

    /// Applies a typed edit from the inspection view.
    ///
    /// # Errors
    ///
    /// [`PointError::InvalidCoordinate`] when `text` is not an unsigned
    /// decimal integer. The point itself is untouched in that case.
    pub fn edit(&self, which: Coordinate, text: &str) -> Result<Self, PointError> {
        let value = parse_coordinate(which, text)?;
        Ok(self.with_coordinate(which, value))
    }

    pub fn coordinate(&self, which: Coordinate) -> &BigUint {
        match which {
            Coordinate::X => &self.x,
            Coordinate::Y => &self.y,
        }
    }

    pub fn is_on_curve(&self) -> bool {
        validate(&self.x, &self.y)
    }

    pub fn status(&self) -> PointStatus {
        if self.is_unset() {
            PointStatus::Indeterminate
        } else if self.is_on_curve() {
            PointStatus::OnCurve
        } else {
            PointStatus::OffCurve
        }
    }

    /// Converts to curve arithmetic form, if both coordinates are canonical.
    pub fn to_edwards(&self) -> Option<EdwardsPoint> {
        Some(EdwardsPoint::new(
            fr_from_canonical(&self.x)?,
            fr_from_canonical(&self.y)?,
        ))
    }
}

impl From<EdwardsPoint> for CurvePoint {
    fn from(p: EdwardsPoint) -> Self {
        Self {
            x: fr_to_biguint(&p.x),
            y: fr_to_biguint(&p.y),
        }
    }
}

impl fmt::Display for CurvePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

fn parse_coordinate(which: Coordinate, text: &str) -> Result<BigUint, PointError> {
    let text = text.trim();
    let invalid = || PointError::InvalidCoordinate {
        which,
        input: text.to_string(),
    };
    // BigUint's parser tolerates '_' separators; typed coordinates should not.
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    text.parse().map_err(|_| invalid())
}

/// Elides long coordinates for display: `12345...67890`.
///
/// Values with at most ten decimal digits are shown in full.
pub fn truncate(value: &BigUint) -> String {
    let digits = value.to_string();
    if digits.len() > COORDINATE_ELISION_THRESHOLD {
        format!(
            "{}...{}",
            &digits[..COORDINATE_ELISION_KEEP],
            &digits[digits.len() - COORDINATE_ELISION_KEEP..]
        )
    } else {
        digits
    }
}

// ---------------------------------------------------------------------------
// Encrypted Balance
// ---------------------------------------------------------------------------

/// An ElGamal ciphertext over Baby Jubjub: `(C1, C2)`.
///
/// The protocol reports it as four field elements `[c1.x, c1.y, c2.x, c2.y]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBalance {
    pub c1: CurvePoint,
    pub c2: CurvePoint,
}

impl EncryptedBalance {
    pub fn new(c1: CurvePoint, c2: CurvePoint) -> Self {
        Self { c1, c2 }
    }

    /// Builds a ciphertext from the protocol's four-limb layout.
    pub fn from_limbs(limbs: [BigUint; 4]) -> Self {
        let [c1x, c1y, c2x, c2y] = limbs;
        Self {
            c1: CurvePoint::new(c1x, c1y),
            c2: CurvePoint::new(c2x, c2y),
        }
    }

    pub fn to_limbs(&self) -> [BigUint; 4] {
        [
            self.c1.x.clone(),
            self.c1.y.clone(),
            self.c2.x.clone(),
            self.c2.y.clone(),
        ]
    }

    /// An account with no balance yet reports all-zero limbs.
    pub fn is_unset(&self) -> bool {
        self.c1.is_unset() && self.c2.is_unset()
    }

    /// Both halves are curve points.
    pub fn is_well_formed(&self) -> bool {
        self.c1.is_on_curve() && self.c2.is_on_curve()
    }
}

/// Serde helper: `BigUint` as a decimal string.
pub(crate) mod biguint_dec {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
