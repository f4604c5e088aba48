//! # Cryptographic Primitives
//!
//! Everything the client needs to reason about the protocol's cryptography
//! without ever generating a proof:
//!
//! - **field** — BN254 scalar field: reducing byte blobs to field elements.
//! - **babyjub** — Baby Jubjub arithmetic over that field (membership,
//!   addition, scalar multiplication).
//! - **point** — The user-facing point model: coordinates, on-curve status,
//!   one-coordinate-at-a-time edits, encrypted balance ciphertexts.
//! - **hash** — BLAKE3 helpers for deterministic identifiers.
//!
//! Field arithmetic comes from arkworks. The curve itself is small enough
//! to write down, and writing it down keeps the exact coefficients the eERC
//! circuits use (`a = 168700`, `d = 168696`) visible in one place.

pub mod babyjub;
pub mod field;
pub mod hash;
pub mod point;

pub use babyjub::EdwardsPoint;
pub use field::{field_modulus, reduce, Scalar};
pub use hash::{domain_separated_hash, hash_to_scalar};
pub use point::{validate, Coordinate, CurvePoint, EncryptedBalance, PointError, PointStatus};
