//! A [`ProtocolClient`] bound to one account on the simulated chain.

use std::sync::Arc;

use async_trait::async_trait;
use num_bigint::BigUint;
use parking_lot::Mutex;
use tracing::debug;

use eerc_client::crypto::CurvePoint;
use eerc_client::operations::{
    Address, DecryptionKey, OperationKind, ProtocolClient, ProtocolError, TokenMetadata, TxHash,
};
use eerc_client::{Amount, EncryptedBalance};

use crate::error::ContractError;
use crate::simulator::{derive_public_key, derive_secret, EercSimulator};

/// One wallet session against an [`EercSimulator`].
pub struct SimulatedClient {
    chain: Arc<EercSimulator>,
    account: Address,
    secret: Mutex<Option<BigUint>>,
}

impl SimulatedClient {
    pub fn new(chain: Arc<EercSimulator>, account: Address) -> Self {
        Self {
            chain,
            account,
            secret: Mutex::new(None),
        }
    }

    pub fn account(&self) -> &Address {
        &self.account
    }

    pub fn chain(&self) -> &Arc<EercSimulator> {
        &self.chain
    }

    pub fn has_decryption_key(&self) -> bool {
        self.secret.lock().is_some()
    }

    /// Spending needs a proof, and a proof needs the key.
    fn require_secret(&self) -> Result<BigUint, ContractError> {
        self.secret
            .lock()
            .clone()
            .ok_or(ContractError::MissingDecryptionKey)
    }

    fn derive(&self) -> BigUint {
        let secret = derive_secret(&self.account);
        *self.secret.lock() = Some(secret.clone());
        secret
    }
}

#[async_trait]
impl ProtocolClient for SimulatedClient {
    async fn register(&self) -> Result<TxHash, ProtocolError> {
        let account = self.account;
        let public_key = derive_public_key(&account)?;
        let (tx_hash, ()) = self
            .chain
            .execute(OperationKind::Register, account, |token| {
                token.register(account, public_key)
            })?;
        // Registration derives the key as a side effect, like the wallet SDK.
        self.derive();
        Ok(tx_hash)
    }

    async fn generate_decryption_key(&self) -> Result<DecryptionKey, ProtocolError> {
        let secret = self.derive();
        debug!(account = %self.account, "Derived decryption key");
        Ok(DecryptionKey::new(format!(
            "0x{}",
            hex::encode(secret.to_bytes_be())
        )))
    }

    async fn is_address_registered(&self, address: &Address) -> Result<bool, ProtocolError> {
        Ok(self.chain.read(|token| token.is_registered(address)))
    }

    async fn mint(&self, recipient: &Address, amount: &Amount) -> Result<TxHash, ProtocolError> {
        let (tx_hash, ()) = self
            .chain
            .execute(OperationKind::Mint, self.account, |token| {
                token.mint(recipient, amount)
            })?;
        Ok(tx_hash)
    }

    async fn burn(&self, amount: &Amount) -> Result<TxHash, ProtocolError> {
        self.require_secret()?;
        let account = self.account;
        let (tx_hash, ()) = self
            .chain
            .execute(OperationKind::Burn, account, |token| token.burn(&account, amount))?;
        Ok(tx_hash)
    }

    async fn transfer(
        &self,
        recipient: &Address,
        amount: &Amount,
    ) -> Result<TxHash, ProtocolError> {
        self.require_secret()?;
        let account = self.account;
        let (tx_hash, ()) = self
            .chain
            .execute(OperationKind::Transfer, account, |token| {
                token.transfer(&account, recipient, amount)
            })?;
        Ok(tx_hash)
    }

    async fn deposit(&self, amount: &Amount) -> Result<TxHash, ProtocolError> {
        let account = self.account;
        let (tx_hash, credited) = self
            .chain
            .execute(OperationKind::Deposit, account, |token| {
                token.deposit(&account, amount)
            })?;
        debug!(account = %account, credited = %credited, "Deposit credited");
        Ok(tx_hash)
    }

    async fn withdraw(&self, amount: &Amount) -> Result<TxHash, ProtocolError> {
        self.require_secret()?;
        let account = self.account;
        let (tx_hash, released) = self
            .chain
            .execute(OperationKind::Withdraw, account, |token| {
                token.withdraw(&account, amount)
            })?;
        debug!(account = %account, released = %released, "Withdrawal released");
        Ok(tx_hash)
    }

    async fn encrypted_balance(&self) -> Result<EncryptedBalance, ProtocolError> {
        Ok(self
            .chain
            .read(|token| token.encrypted_balance(&self.account))
            .map(EncryptedBalance::from)
            .unwrap_or_default())
    }

    async fn decrypted_balance(&self) -> Result<Amount, ProtocolError> {
        let secret = self.require_secret()?;
        if !self.chain.read(|token| token.is_registered(&self.account)) {
            return Ok(Amount::zero());
        }
        Ok(self
            .chain
            .read(|token| token.decrypt(&self.account, &secret))?)
    }

    async fn public_key(&self) -> Result<CurvePoint, ProtocolError> {
        Ok(self
            .chain
            .read(|token| token.public_key(&self.account).copied())
            .map(CurvePoint::from)
            .unwrap_or_default())
    }

    async fn auditor_public_key(&self) -> Result<CurvePoint, ProtocolError> {
        Ok(self
            .chain
            .read(|token| token.auditor_key().copied())
            .map(CurvePoint::from)
            .unwrap_or_default())
    }

    async fn token_metadata(&self) -> Result<TokenMetadata, ProtocolError> {
        Ok(self.chain.read(|token| token.metadata()))
    }

    async fn underlying_decimals(&self) -> Result<Option<u32>, ProtocolError> {
        Ok(self
            .chain
            .read(|token| token.underlying().map(|ledger| ledger.decimals)))
    }

    async fn underlying_balance(&self) -> Result<Amount, ProtocolError> {
        Ok(self.chain.read(|token| {
            token
                .underlying()
                .map(|ledger| ledger.balance_of(&self.account))
                .unwrap_or_default()
        }))
    }
}
