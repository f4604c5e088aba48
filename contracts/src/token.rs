//! # Encrypted Token Contract
//!
//! State of one eERC deployment: registered public keys, encrypted
//! balances, the auditor key, and (in converter mode) the wrapped ERC-20.
//!
//! ## Proof Model
//!
//! A real deployment accepts a spend only with a zero-knowledge proof that
//! the sender's ciphertext covers it. The simulator keeps a shadow
//! plaintext per account and checks that instead. Every mutation updates
//! both, and [`EncryptedToken::decrypt`] verifies the ciphertext against
//! the shadow with the caller's key, so a bookkeeping bug shows up as
//! [`ContractError::CorruptCiphertext`] rather than a wrong number.

use std::collections::HashMap;

use num_bigint::BigUint;
use tracing::debug;

use eerc_client::config::{EercMode, AMOUNT_DECIMALS};
use eerc_client::crypto::EdwardsPoint;
use eerc_client::operations::{Address, TokenMetadata};
use eerc_client::Amount;

use crate::elgamal::Ciphertext;
use crate::erc20::Erc20Ledger;
use crate::error::ContractError;

/// One account's on-chain record.
#[derive(Debug, Clone)]
struct Account {
    public_key: EdwardsPoint,
    balance: Ciphertext,
    /// What `balance` decrypts to. Stands in for the proof system.
    shadow: Amount,
}

/// An eERC deployment.
#[derive(Debug, Clone)]
pub struct EncryptedToken {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    pub owner: Address,
    mode: EercMode,
    auditor_key: Option<EdwardsPoint>,
    accounts: HashMap<Address, Account>,
    underlying: Option<Erc20Ledger>,
    total_supply: Amount,
}

impl EncryptedToken {
    /// A standalone deployment: private mint and burn.
    pub fn standalone(name: impl Into<String>, symbol: impl Into<String>, owner: Address) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals: AMOUNT_DECIMALS,
            owner,
            mode: EercMode::Standalone,
            auditor_key: None,
            accounts: HashMap::new(),
            underlying: None,
            total_supply: Amount::zero(),
        }
    }

    /// A converter deployment wrapping `underlying`.
    pub fn converter(underlying: Erc20Ledger, owner: Address) -> Self {
        Self {
            name: format!("Encrypted {}", underlying.name),
            symbol: format!("e{}", underlying.symbol),
            decimals: AMOUNT_DECIMALS,
            owner,
            mode: EercMode::Converter,
            auditor_key: None,
            accounts: HashMap::new(),
            underlying: Some(underlying),
            total_supply: Amount::zero(),
        }
    }

    pub fn mode(&self) -> EercMode {
        self.mode
    }

    pub fn metadata(&self) -> TokenMetadata {
        TokenMetadata {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: Some(self.decimals),
            mode: self.mode,
            owner: Some(self.owner),
            auditor_key_set: self.auditor_key.is_some(),
        }
    }

    pub fn set_auditor_key(&mut self, key: EdwardsPoint) {
        self.auditor_key = Some(key);
    }

    pub fn auditor_key(&self) -> Option<&EdwardsPoint> {
        self.auditor_key.as_ref()
    }

    pub fn underlying(&self) -> Option<&Erc20Ledger> {
        self.underlying.as_ref()
    }

    pub fn underlying_mut(&mut self) -> Option<&mut Erc20Ledger> {
        self.underlying.as_mut()
    }

    pub fn total_supply(&self) -> &Amount {
        &self.total_supply
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    pub fn is_registered(&self, account: &Address) -> bool {
        self.accounts.contains_key(account)
    }

    pub fn public_key(&self, account: &Address) -> Option<&EdwardsPoint> {
        self.accounts.get(account).map(|a| &a.public_key)
    }

    /// Records `public_key` for `account` with an empty balance.
    pub fn register(&mut self, account: Address, public_key: EdwardsPoint) -> Result<(), ContractError> {
        if self.is_registered(&account) {
            return Err(ContractError::AlreadyRegistered(account));
        }
        if !public_key.is_on_curve() {
            return Err(ContractError::Curve("public key is not on the curve"));
        }
        self.accounts.insert(
            account,
            Account {
                public_key,
                balance: Ciphertext::zero(),
                shadow: Amount::zero(),
            },
        );
        debug!(account = %account, "Registered public key");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Balances
    // -----------------------------------------------------------------------

    /// The stored ciphertext, `None` for unregistered accounts.
    pub fn encrypted_balance(&self, account: &Address) -> Option<Ciphertext> {
        self.accounts.get(account).map(|a| a.balance)
    }

    /// Decrypts `account`'s balance with `secret`.
    ///
    /// # Errors
    ///
    /// [`ContractError::CorruptCiphertext`] if the ciphertext does not
    /// decrypt to the tracked balance under `secret`, which is also what a
    /// wrong key looks like.
    pub fn decrypt(&self, account: &Address, secret: &BigUint) -> Result<Amount, ContractError> {
        let record = self.account(account)?;
        if record.balance.decrypts_to(secret, record.shadow.as_biguint())? {
            Ok(record.shadow.clone())
        } else {
            Err(ContractError::CorruptCiphertext(*account))
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Standalone only.
    pub fn mint(&mut self, to: &Address, amount: &Amount) -> Result<(), ContractError> {
        self.require_mode("mint", EercMode::Standalone)?;
        self.credit(to, amount)?;
        self.total_supply = &self.total_supply + amount;
        Ok(())
    }

    /// Standalone only.
    pub fn burn(&mut self, from: &Address, amount: &Amount) -> Result<(), ContractError> {
        self.require_mode("burn", EercMode::Standalone)?;
        self.debit(from, amount)?;
        self.total_supply = self.total_supply.saturating_sub(amount);
        Ok(())
    }

    pub fn transfer(&mut self, from: &Address, to: &Address, amount: &Amount) -> Result<(), ContractError> {
        // Both ends must exist before either side moves.
        self.account(from)?;
        self.account(to)?;
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    /// Converter only. `amount` is in the underlying token's unit.
    ///
    /// The part of `amount` below one encrypted unit stays in the ERC-20
    /// balance. Returns the encrypted amount credited.
    pub fn deposit(&mut self, from: &Address, amount: &Amount) -> Result<Amount, ContractError> {
        self.require_mode("deposit", EercMode::Converter)?;
        self.account(from)?;

        let (converted, spent) = {
            let ledger = self.ledger()?;
            let scale = scale_factor(ledger.decimals, self.decimals);
            let converted = Amount::new(amount.as_biguint() / &scale);
            let spent = Amount::new(converted.as_biguint() * &scale);
            (converted, spent)
        };
        if converted.is_zero() {
            return Err(ContractError::DustDeposit(amount.clone()));
        }

        self.ledger_mut()?.debit(from, &spent)?;
        self.credit(from, &converted)?;
        self.total_supply = &self.total_supply + &converted;
        Ok(converted)
    }

    /// Converter only. `amount` is in the encrypted token's unit. Returns the
    /// underlying amount credited.
    pub fn withdraw(&mut self, to: &Address, amount: &Amount) -> Result<Amount, ContractError> {
        self.require_mode("withdraw", EercMode::Converter)?;
        let scale = scale_factor(self.ledger()?.decimals, self.decimals);

        self.debit(to, amount)?;
        let released = Amount::new(amount.as_biguint() * &scale);
        self.ledger_mut()?.credit(to, &released);
        self.total_supply = self.total_supply.saturating_sub(amount);
        Ok(released)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn account(&self, address: &Address) -> Result<&Account, ContractError> {
        self.accounts
            .get(address)
            .ok_or(ContractError::NotRegistered(*address))
    }

    fn require_mode(&self, operation: &'static str, mode: EercMode) -> Result<(), ContractError> {
        if self.mode == mode {
            Ok(())
        } else {
            Err(ContractError::WrongMode {
                operation,
                mode: self.mode,
            })
        }
    }

    fn ledger(&self) -> Result<&Erc20Ledger, ContractError> {
        self.underlying.as_ref().ok_or(ContractError::WrongMode {
            operation: "underlying ledger",
            mode: self.mode,
        })
    }

    fn ledger_mut(&mut self) -> Result<&mut Erc20Ledger, ContractError> {
        let mode = self.mode;
        self.underlying.as_mut().ok_or(ContractError::WrongMode {
            operation: "underlying ledger",
            mode,
        })
    }

    fn credit(&mut self, to: &Address, amount: &Amount) -> Result<(), ContractError> {
        let record = self
            .accounts
            .get_mut(to)
            .ok_or(ContractError::NotRegistered(*to))?;
        let delta = Ciphertext::encrypt(&record.public_key, amount.as_biguint())?;
        record.balance = record.balance.add(&delta)?;
        record.shadow = &record.shadow + amount;
        Ok(())
    }

    fn debit(&mut self, from: &Address, amount: &Amount) -> Result<(), ContractError> {
        let record = self
            .accounts
            .get_mut(from)
            .ok_or(ContractError::NotRegistered(*from))?;
        let remaining = record.shadow.checked_sub(amount).ok_or_else(|| {
            ContractError::InsufficientBalance {
                balance: record.shadow.clone(),
                amount: amount.clone(),
            }
        })?;
        let delta = Ciphertext::encrypt(&record.public_key, amount.as_biguint())?;
        record.balance = record.balance.sub(&delta)?;
        record.shadow = remaining;
        Ok(())
    }
}

/// `10^(underlying - token)`, or 1 when the underlying has fewer decimals.
fn scale_factor(underlying_decimals: u32, token_decimals: u32) -> BigUint {
    BigUint::from(10u32).pow(underlying_decimals.saturating_sub(token_decimals))
}
