//! # Operation Orchestrator
//!
//! Sequences every mutating action the same way:
//!
//! ```text
//! preconditions ──fail──▶ OperationError (no delegate call; failed reads
//!      │                   surface as OperationError::Lookup)
//!      │
//!      ▼
//! delegate call ──fail──▶ OperationError::Delegate (message untouched)
//!      │
//!      ▼
//! OperationReceipt { tx_hash, refresh scope }
//! ```
//!
//! The orchestrator is stateless apart from the client handle. It does not
//! guard against concurrent triggers and it does not refresh anything; the
//! receipt tells the caller what to refresh, and
//! [`OperationController`](super::OperationController) does both.

use std::future::Future;
use std::sync::Arc;

use tracing::{error, info, warn};

use super::client::ProtocolClient;
use super::error::{OperationError, ProtocolError};
use super::session::SessionContext;
use super::types::{
    Address, OperationKind, OperationReceipt, RefreshScope, TokenMetadata, TxHash,
};
use crate::amount::{encode_scaled, Amount};

/// Runs operations against a [`ProtocolClient`].
#[derive(Clone)]
pub struct Orchestrator {
    client: Arc<dyn ProtocolClient>,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn ProtocolClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<dyn ProtocolClient> {
        &self.client
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Registers the session account. Fails if it is already registered.
    pub async fn register(
        &self,
        ctx: &SessionContext,
    ) -> Result<OperationReceipt, OperationError> {
        let kind = OperationKind::Register;
        let account = precondition(kind, ctx.require_account())?;

        if lookup(kind, self.client.is_address_registered(&account)).await? {
            return precondition(kind, Err(OperationError::AlreadyRegistered(account)));
        }

        info!(kind = %kind, account = %account, "Submitting operation");
        let tx_hash = delegate(kind, self.client.register()).await?;
        Ok(submitted(kind, tx_hash, RefreshScope::Registration))
    }

    /// Derives the decryption key.
    ///
    /// A registered account already has a key somewhere; deriving again is
    /// only allowed when `regenerate` says the session lost it.
    pub async fn generate_key(
        &self,
        ctx: &SessionContext,
        regenerate: bool,
    ) -> Result<OperationReceipt, OperationError> {
        let kind = OperationKind::GenerateKey;
        precondition(kind, ctx.require_connected())?;

        if let Some(account) = ctx.account {
            if !regenerate && lookup(kind, self.client.is_address_registered(&account)).await? {
                return precondition(kind, Err(OperationError::KeyAlreadyAvailable));
            }
        }

        info!(kind = %kind, "Deriving decryption key");
        let key = delegate(kind, self.client.generate_decryption_key()).await?;
        info!(kind = %kind, "Decryption key available");
        Ok(OperationReceipt {
            kind,
            tx_hash: None,
            refresh: RefreshScope::EncryptedBalance,
            decryption_key: Some(key),
        })
    }

    /// Mints `amount` (already scaled) to the session account. Standalone only.
    pub async fn mint(
        &self,
        ctx: &SessionContext,
        amount: &Amount,
    ) -> Result<OperationReceipt, OperationError> {
        let kind = OperationKind::Mint;
        let account = precondition(kind, ctx.require_account())?;
        self.require_mode(kind).await?;

        info!(kind = %kind, recipient = %account, amount = %amount, "Submitting operation");
        let tx_hash = delegate(kind, self.client.mint(&account, amount)).await?;
        Ok(submitted(kind, tx_hash, RefreshScope::EncryptedBalance))
    }

    /// Burns `amount` (already scaled) from the session account. Standalone only.
    pub async fn burn(
        &self,
        ctx: &SessionContext,
        amount: &Amount,
    ) -> Result<OperationReceipt, OperationError> {
        let kind = OperationKind::Burn;
        precondition(kind, ctx.require_connected())?;
        self.require_mode(kind).await?;

        info!(kind = %kind, amount = %amount, "Submitting operation");
        let tx_hash = delegate(kind, self.client.burn(amount)).await?;
        Ok(submitted(kind, tx_hash, RefreshScope::EncryptedBalance))
    }

    /// Transfers a typed decimal amount to `recipient`.
    ///
    /// The recipient must be registered; otherwise the call fails with
    /// [`OperationError::RecipientNotRegistered`] and nothing is submitted.
    pub async fn transfer(
        &self,
        ctx: &SessionContext,
        recipient: &Address,
        amount: &str,
    ) -> Result<OperationReceipt, OperationError> {
        let kind = OperationKind::Transfer;
        precondition(kind, ctx.require_connected())?;
        let metadata = self.require_mode(kind).await?;
        let decimals = precondition(kind, token_decimals(&metadata))?;
        let amount = precondition(kind, encode_scaled(amount, decimals).map_err(Into::into))?;

        if !lookup(kind, self.client.is_address_registered(recipient)).await? {
            return precondition(kind, Err(OperationError::RecipientNotRegistered(*recipient)));
        }

        info!(kind = %kind, recipient = %recipient, amount = %amount, "Submitting operation");
        let tx_hash = delegate(kind, self.client.transfer(recipient, &amount)).await?;
        Ok(submitted(kind, tx_hash, RefreshScope::EncryptedBalance))
    }

    /// Wraps underlying ERC-20 into the encrypted token. Converter only.
    pub async fn deposit(
        &self,
        ctx: &SessionContext,
        amount: &str,
    ) -> Result<OperationReceipt, OperationError> {
        let kind = OperationKind::Deposit;
        precondition(kind, ctx.require_connected())?;
        self.require_mode(kind).await?;

        let decimals = lookup(kind, self.client.underlying_decimals()).await?;
        let decimals = precondition(
            kind,
            decimals.ok_or(OperationError::DecimalsUnknown { asset: "underlying" }),
        )?;
        let amount = precondition(kind, encode_scaled(amount, decimals).map_err(Into::into))?;

        info!(kind = %kind, amount = %amount, "Submitting operation");
        let tx_hash = delegate(kind, self.client.deposit(&amount)).await?;
        Ok(submitted(kind, tx_hash, RefreshScope::AllBalances))
    }

    /// Unwraps encrypted tokens back into the underlying ERC-20. Converter only.
    pub async fn withdraw(
        &self,
        ctx: &SessionContext,
        amount: &str,
    ) -> Result<OperationReceipt, OperationError> {
        let kind = OperationKind::Withdraw;
        precondition(kind, ctx.require_connected())?;
        let metadata = self.require_mode(kind).await?;
        let decimals = precondition(kind, token_decimals(&metadata))?;
        let amount = precondition(kind, encode_scaled(amount, decimals).map_err(Into::into))?;

        info!(kind = %kind, amount = %amount, "Submitting operation");
        let tx_hash = delegate(kind, self.client.withdraw(&amount)).await?;
        Ok(submitted(kind, tx_hash, RefreshScope::AllBalances))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Reads token metadata and checks the deployment mode offers `kind`.
    async fn require_mode(&self, kind: OperationKind) -> Result<TokenMetadata, OperationError> {
        let metadata = lookup(kind, self.client.token_metadata()).await?;
        if !kind.available_in(metadata.mode) {
            return precondition(
                kind,
                Err(OperationError::UnsupportedInMode {
                    kind,
                    mode: metadata.mode,
                }),
            );
        }
        Ok(metadata)
    }
}

fn token_decimals(metadata: &TokenMetadata) -> Result<u32, OperationError> {
    metadata
        .decimals
        .ok_or(OperationError::DecimalsUnknown { asset: "token" })
}

fn precondition<T>(
    kind: OperationKind,
    result: Result<T, OperationError>,
) -> Result<T, OperationError> {
    if let Err(e) = &result {
        warn!(kind = %kind, error = %e, "Operation rejected before submission");
    }
    result
}

/// Awaits a read that a precondition depends on.
async fn lookup<T>(
    kind: OperationKind,
    call: impl Future<Output = Result<T, ProtocolError>>,
) -> Result<T, OperationError> {
    call.await.map_err(|e| {
        warn!(kind = %kind, error = %e, "Precondition lookup failed");
        OperationError::Lookup(e)
    })
}

async fn delegate<T>(
    kind: OperationKind,
    call: impl Future<Output = Result<T, ProtocolError>>,
) -> Result<T, OperationError> {
    call.await.map_err(|e| {
        error!(kind = %kind, error = %e, "Delegate call failed");
        OperationError::Delegate(e)
    })
}

fn submitted(
    kind: OperationKind,
    tx_hash: TxHash,
    refresh: RefreshScope,
) -> OperationReceipt {
    info!(kind = %kind, tx_hash = %tx_hash, "Operation submitted");
    OperationReceipt {
        kind,
        tx_hash: Some(tx_hash),
        refresh,
        decryption_key: None,
    }
}
