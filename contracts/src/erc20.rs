//! # Underlying ERC-20
//!
//! The public token a converter deployment wraps. Balances are plain
//! integers in the token's smallest unit; there are no allowances because
//! the simulator executes deposit as one atomic call.

use std::collections::HashMap;

use serde::Serialize;

use eerc_client::operations::Address;
use eerc_client::Amount;

use crate::error::ContractError;

/// A minimal fungible-token ledger.
#[derive(Debug, Clone, Serialize)]
pub struct Erc20Ledger {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    total_supply: Amount,
    balances: HashMap<Address, Amount>,
}

impl Erc20Ledger {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, decimals: u32) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            total_supply: Amount::zero(),
            balances: HashMap::new(),
        }
    }

    /// Returns the balance of `account`, zero if it never held any.
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).cloned().unwrap_or_default()
    }

    pub fn total_supply(&self) -> &Amount {
        &self.total_supply
    }

    /// Test-network faucet.
    pub fn mint(&mut self, to: &Address, amount: &Amount) {
        let balance = self.balances.entry(*to).or_default();
        *balance = &*balance + amount;
        self.total_supply = &self.total_supply + amount;
    }

    /// Removes `amount` from `from`.
    ///
    /// # Errors
    ///
    /// [`ContractError::InsufficientUnderlying`] if the balance is too low.
    /// The ledger is unchanged in that case.
    pub fn debit(&mut self, from: &Address, amount: &Amount) -> Result<(), ContractError> {
        let balance = self.balance_of(from);
        let remaining = balance
            .checked_sub(amount)
            .ok_or_else(|| ContractError::InsufficientUnderlying {
                symbol: self.symbol.clone(),
                balance: balance.clone(),
                amount: amount.clone(),
            })?;
        self.balances.insert(*from, remaining);
        self.total_supply = self.total_supply.saturating_sub(amount);
        Ok(())
    }

    /// Adds `amount` to `to`.
    pub fn credit(&mut self, to: &Address, amount: &Amount) {
        self.mint(to, amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 20])
    }

    #[test]
    fn test_mint_and_balance() {
        let mut ledger = Erc20Ledger::new("Test Token", "TEST", 18);
        ledger.mint(&addr(1), &Amount::from(1_000u64));
        assert_eq!(ledger.balance_of(&addr(1)), Amount::from(1_000u64));
        assert_eq!(ledger.balance_of(&addr(2)), Amount::zero());
        assert_eq!(ledger.total_supply(), &Amount::from(1_000u64));
    }

    #[test]
    fn test_debit_insufficient_leaves_ledger_unchanged() {
        let mut ledger = Erc20Ledger::new("Test Token", "TEST", 18);
        ledger.mint(&addr(1), &Amount::from(10u64));

        let err = ledger.debit(&addr(1), &Amount::from(11u64)).unwrap_err();
        assert!(matches!(err, ContractError::InsufficientUnderlying { .. }));
        assert_eq!(ledger.balance_of(&addr(1)), Amount::from(10u64));

        ledger.debit(&addr(1), &Amount::from(4u64)).unwrap();
        assert_eq!(ledger.balance_of(&addr(1)), Amount::from(6u64));
        assert_eq!(ledger.total_supply(), &Amount::from(6u64));
    }
}
