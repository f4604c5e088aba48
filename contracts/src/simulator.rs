//! # Chain Simulator
//!
//! A single-node, instantly-finalizing chain holding one eERC deployment.
//! Every successful call gets a transaction hash and a receipt; failed
//! calls never reach the chain and get neither, same as a reverted
//! simulation in a wallet.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::info;

use eerc_client::crypto::{domain_separated_hash, hash_to_scalar, EdwardsPoint};
use eerc_client::operations::{Address, OperationKind, TxHash};
use eerc_client::Amount;

use crate::client::SimulatedClient;
use crate::erc20::Erc20Ledger;
use crate::error::ContractError;
use crate::token::EncryptedToken;

/// Context string for simulated decryption keys.
const KEY_CONTEXT: &str = "eerc-sim 2026 decryption key";

/// Context string for transaction hashes.
const TX_CONTEXT: &str = "eerc-sim 2026 transaction";

/// Derives the secret a wallet's key-derivation signature would produce.
///
/// A real wallet signs a fixed message and reduces the signature into the
/// field; the simulator hashes the address instead.
pub fn derive_secret(account: &Address) -> BigUint {
    hash_to_scalar(KEY_CONTEXT, account.as_bytes()).to_biguint()
}

/// The public key for [`derive_secret`].
pub fn derive_public_key(account: &Address) -> Result<EdwardsPoint, ContractError> {
    EdwardsPoint::base8()
        .checked_mul(&derive_secret(account))
        .ok_or(ContractError::Curve("sk·G"))
}

/// What the chain records for an included transaction.
#[derive(Debug, Clone, Serialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub kind: OperationKind,
    pub from: Address,
    pub block: u64,
    pub included_at: DateTime<Utc>,
}

/// The simulated chain.
pub struct EercSimulator {
    token: RwLock<EncryptedToken>,
    receipts: RwLock<HashMap<TxHash, TxReceipt>>,
    height: AtomicU64,
}

impl EercSimulator {
    /// Wraps an existing deployment.
    pub fn new(token: EncryptedToken) -> Arc<Self> {
        Arc::new(Self {
            token: RwLock::new(token),
            receipts: RwLock::new(HashMap::new()),
            height: AtomicU64::new(0),
        })
    }

    /// A standalone "Private Token (PRIV)" deployment with an auditor key.
    pub fn standalone() -> Result<Arc<Self>, ContractError> {
        let owner = Address::from_bytes([0x0d; 20]);
        let mut token = EncryptedToken::standalone("Private Token", "PRIV", owner);
        token.set_auditor_key(derive_public_key(&owner)?);
        Ok(Self::new(token))
    }

    /// A converter deployment wrapping an 18-decimal "Test Token (TEST)".
    pub fn converter() -> Result<Arc<Self>, ContractError> {
        let owner = Address::from_bytes([0x0d; 20]);
        let erc20 = Erc20Ledger::new("Test Token", "TEST", 18);
        let mut token = EncryptedToken::converter(erc20, owner);
        token.set_auditor_key(derive_public_key(&owner)?);
        Ok(Self::new(token))
    }

    /// A client bound to `account`.
    pub fn client(self: &Arc<Self>, account: Address) -> SimulatedClient {
        SimulatedClient::new(Arc::clone(self), account)
    }

    /// Test-network faucet for the underlying token. No-op in standalone mode.
    pub fn faucet(&self, account: &Address, amount: &Amount) {
        if let Some(ledger) = self.token.write().underlying_mut() {
            ledger.mint(account, amount);
        }
    }

    /// Runs a read against current state.
    pub fn read<T>(&self, f: impl FnOnce(&EncryptedToken) -> T) -> T {
        f(&*self.token.read())
    }

    /// Runs a state change as one transaction.
    ///
    /// `f` sees the state under the write lock; if it fails, nothing is
    /// recorded and no hash is issued.
    pub fn execute<T>(
        &self,
        kind: OperationKind,
        from: Address,
        f: impl FnOnce(&mut EncryptedToken) -> Result<T, ContractError>,
    ) -> Result<(TxHash, T), ContractError> {
        let output = f(&mut *self.token.write())?;

        let block = self.height.fetch_add(1, Ordering::SeqCst) + 1;
        let mut preimage = Vec::with_capacity(8 + 20);
        preimage.extend_from_slice(&block.to_le_bytes());
        preimage.extend_from_slice(from.as_bytes());
        let tx_hash = TxHash::from_bytes(domain_separated_hash(TX_CONTEXT, &preimage));

        info!(kind = %kind, from = %from, tx_hash = %tx_hash, block, "Transaction included");
        self.receipts.write().insert(
            tx_hash,
            TxReceipt {
                tx_hash,
                kind,
                from,
                block,
                included_at: Utc::now(),
            },
        );
        Ok((tx_hash, output))
    }

    pub fn receipt(&self, tx_hash: &TxHash) -> Option<TxReceipt> {
        self.receipts.read().get(tx_hash).cloned()
    }

    /// Number of included transactions.
    pub fn height(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }
}
