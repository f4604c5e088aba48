//! # External Seams
//!
//! The two things the client core cannot do on its own: talk to the
//! protocol (prove, sign, submit, read) and wait for a transaction receipt.
//! Both are traits so the orchestrator can run against a live SDK binding,
//! the in-memory simulator, or a scripted fake in tests.

use async_trait::async_trait;
use tracing::info;

use super::error::ProtocolError;
use super::types::{Address, DecryptionKey, OperationKind, TokenMetadata, TxHash};
use crate::amount::Amount;
use crate::crypto::{CurvePoint, EncryptedBalance};

/// The protocol client the orchestrator delegates to.
///
/// Implementations are bound to one wallet account. Every mutating method
/// proves, signs and submits in one call and returns the transaction hash;
/// the orchestrator never sees a proof.
#[async_trait]
pub trait ProtocolClient: Send + Sync {
    /// Registers the bound account's public key with the protocol.
    async fn register(&self) -> Result<TxHash, ProtocolError>;

    /// Derives the session's decryption key. Local, no transaction.
    async fn generate_decryption_key(&self) -> Result<DecryptionKey, ProtocolError>;

    async fn is_address_registered(&self, address: &Address) -> Result<bool, ProtocolError>;

    /// Standalone mode only.
    async fn mint(&self, recipient: &Address, amount: &Amount) -> Result<TxHash, ProtocolError>;

    /// Standalone mode only.
    async fn burn(&self, amount: &Amount) -> Result<TxHash, ProtocolError>;

    async fn transfer(&self, recipient: &Address, amount: &Amount)
        -> Result<TxHash, ProtocolError>;

    /// Converter mode only. `amount` is at the underlying asset's scale.
    async fn deposit(&self, amount: &Amount) -> Result<TxHash, ProtocolError>;

    /// Converter mode only.
    async fn withdraw(&self, amount: &Amount) -> Result<TxHash, ProtocolError>;

    async fn encrypted_balance(&self) -> Result<EncryptedBalance, ProtocolError>;

    /// The bound account's balance, decrypted with the session key.
    async fn decrypted_balance(&self) -> Result<Amount, ProtocolError>;

    async fn public_key(&self) -> Result<CurvePoint, ProtocolError>;

    async fn auditor_public_key(&self) -> Result<CurvePoint, ProtocolError>;

    async fn token_metadata(&self) -> Result<TokenMetadata, ProtocolError>;

    /// Decimals of the wrapped ERC-20. `None` in standalone mode or while unknown.
    async fn underlying_decimals(&self) -> Result<Option<u32>, ProtocolError>;

    /// The bound account's balance of the wrapped ERC-20.
    async fn underlying_balance(&self) -> Result<Amount, ProtocolError>;
}

/// How a watched transaction ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Confirmation {
    Included,
    Reverted(String),
}

impl Confirmation {
    pub fn is_success(&self) -> bool {
        matches!(self, Confirmation::Included)
    }
}

/// Receives every transaction hash the controller submits.
///
/// The watcher owns waiting for receipts. When one arrives it reports back
/// through `OperationController::on_confirmation`.
pub trait ConfirmationWatcher: Send + Sync {
    fn track(&self, kind: OperationKind, tx_hash: &TxHash);
}

/// A watcher that only logs. Useful where receipts arrive synchronously.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingWatcher;

impl ConfirmationWatcher for LoggingWatcher {
    fn track(&self, kind: OperationKind, tx_hash: &TxHash) {
        info!(kind = %kind, tx_hash = %tx_hash, "Tracking transaction");
    }
}
