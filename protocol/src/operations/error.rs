//! Error types for the operation layer.
//!
//! Two enums, one per side of the boundary. [`ProtocolError`] is what the
//! external protocol client reports: rejected submissions, prover failures,
//! transport trouble. [`OperationError`] is what the orchestrator reports
//! to its caller, and it wraps the former verbatim: as `Delegate` when the
//! mutating call failed, as `Lookup` when a read behind a precondition did.

use thiserror::Error;

use super::types::{Address, OperationKind};
use crate::amount::AmountError;
use crate::config::EercMode;

/// Failures reported by the external protocol client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The contract or wallet rejected the submission.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Zero-knowledge proof generation failed.
    #[error("proof generation failed: {0}")]
    ProofGeneration(String),

    /// RPC or network failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Outcome of an operation that did not produce a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// No wallet connected.
    #[error("wallet not connected")]
    NotConnected,

    /// Connected, but no active account address.
    #[error("no active account")]
    MissingAccount,

    /// Registration attempted twice.
    #[error("account {0} is already registered")]
    AlreadyRegistered(Address),

    /// Key generation attempted while a key exists and no regeneration was requested.
    #[error("decryption key already available; request regeneration explicitly")]
    KeyAlreadyAvailable,

    /// Transfer target is not a registered protocol participant.
    #[error("recipient {0} is not registered")]
    RecipientNotRegistered(Address),

    /// The decimals needed to encode the amount have not been reported yet.
    #[error("{asset} decimals unknown")]
    DecimalsUnknown { asset: &'static str },

    /// The operation does not exist for this deployment mode.
    #[error("{kind} is not available in {mode} mode")]
    UnsupportedInMode { kind: OperationKind, mode: EercMode },

    /// A read needed to check a precondition failed. Nothing was submitted.
    #[error("precondition lookup failed: {0}")]
    Lookup(ProtocolError),

    /// The amount text failed to encode.
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),

    /// The delegate call failed. The message is passed through untouched.
    #[error(transparent)]
    Delegate(#[from] ProtocolError),

    /// The same kind of operation is already submitting.
    #[error("{0} already in flight")]
    AlreadyInFlight(OperationKind),
}

impl OperationError {
    /// `true` if the failure happened before any mutating delegate call was
    /// made. Failed lookups count: only reads had run.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, OperationError::Delegate(_))
    }
}
