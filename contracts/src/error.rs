//! Errors raised by the simulated contracts.

use eerc_client::config::EercMode;
use eerc_client::operations::{Address, ProtocolError};
use eerc_client::Amount;
use thiserror::Error;

/// Errors that can occur while executing a simulated contract call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// The account has no registered public key.
    #[error("account {0} is not registered")]
    NotRegistered(Address),

    /// The account already registered a public key.
    #[error("account {0} is already registered")]
    AlreadyRegistered(Address),

    /// The encrypted balance does not cover the spend.
    #[error("insufficient balance: account has {balance}, tried to spend {amount}")]
    InsufficientBalance {
        /// Current balance in the token's smallest unit.
        balance: Amount,
        /// Amount the caller tried to spend.
        amount: Amount,
    },

    /// Not enough of the wrapped ERC-20.
    #[error("insufficient {symbol} balance: account has {balance}, tried to move {amount}")]
    InsufficientUnderlying {
        symbol: String,
        balance: Amount,
        amount: Amount,
    },

    /// The call does not exist for this deployment mode.
    #[error("{operation} is not supported by a {mode} deployment")]
    WrongMode {
        operation: &'static str,
        mode: EercMode,
    },

    /// The deposit is smaller than one unit of the encrypted token.
    #[error("deposit of {0} is below the smallest encrypted unit")]
    DustDeposit(Amount),

    /// The session never derived its decryption key.
    #[error("decryption key not generated")]
    MissingDecryptionKey,

    /// A stored ciphertext does not decrypt to the tracked balance.
    #[error("ciphertext for {0} does not decrypt to its balance")]
    CorruptCiphertext(Address),

    /// Curve arithmetic hit an invalid point.
    #[error("curve arithmetic failed: {0}")]
    Curve(&'static str),
}

impl From<ContractError> for ProtocolError {
    fn from(e: ContractError) -> Self {
        match e {
            // The real prover refuses to build a proof for an overdraft, so
            // the client sees these before anything reaches the chain.
            ContractError::InsufficientBalance { .. }
            | ContractError::MissingDecryptionKey
            | ContractError::Curve(_) => ProtocolError::ProofGeneration(e.to_string()),
            _ => ProtocolError::Rejected(e.to_string()),
        }
    }
}
