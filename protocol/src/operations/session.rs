//! The wallet context every operation runs in.

use serde::{Deserialize, Serialize};

use super::error::OperationError;
use super::types::Address;

/// Connection state and active account, passed explicitly into each call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub connected: bool,
    pub account: Option<Address>,
}

impl SessionContext {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(account: Address) -> Self {
        Self {
            connected: true,
            account: Some(account),
        }
    }

    /// Connected, but the wallet has not reported an account yet.
    pub fn connected_without_account() -> Self {
        Self {
            connected: true,
            account: None,
        }
    }

    pub fn require_connected(&self) -> Result<(), OperationError> {
        if self.connected {
            Ok(())
        } else {
            Err(OperationError::NotConnected)
        }
    }

    /// Connected *and* an account is known.
    pub fn require_account(&self) -> Result<Address, OperationError> {
        self.require_connected()?;
        self.account.ok_or(OperationError::MissingAccount)
    }
}
