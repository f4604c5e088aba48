// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # eERC Client — Core Library
//!
//! The client-side core of an encrypted ERC token: the part of a wallet
//! front-end that actually has invariants. Everything visual lives elsewhere;
//! what lives here is the arithmetic that must never be off by a factor of
//! a hundred and the sequencing that must never refresh a balance before the
//! proof was submitted.
//!
//! ## Architecture
//!
//! - **amount** — Fixed-point codec between typed decimals and protocol integers.
//! - **crypto** — Scalar reduction into the BN254 field, Baby Jubjub points.
//! - **operations** — Register, mint, burn, transfer, deposit, withdraw:
//!   preconditions, delegate call, receipts, refresh.
//! - **display** — Plain-text rendering of balances, points and token info.
//! - **config** — Protocol constants and the JSON client configuration.
//!
//! ## Design Philosophy
//!
//! 1. No floating point near money. Amounts are `BigUint`, full stop.
//! 2. An off-curve point is a state, not an exception.
//! 3. Session context is passed in, never read from a global.
//! 4. The core never retries. Retrying is the user's call.

pub mod amount;
pub mod config;
pub mod crypto;
pub mod display;
pub mod operations;

pub use amount::{Amount, AmountError};
pub use crypto::{CurvePoint, EncryptedBalance, PointStatus, Scalar};
pub use operations::{
    OperationController, OperationError, OperationKind, OperationReceipt, Orchestrator,
    ProtocolClient, ProtocolError, SessionContext,
};
