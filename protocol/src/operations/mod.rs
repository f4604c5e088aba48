//! # Operations
//!
//! Register, generate-key, mint, burn, transfer, deposit, withdraw.
//!
//! ```text
//! types.rs        — Address, TxHash, OperationKind, Operation, receipts
//! session.rs      — SessionContext (connected flag, active account)
//! client.rs       — ProtocolClient and ConfirmationWatcher seams
//! orchestrator.rs — preconditions → delegate call → receipt
//! controller.rs   — in-flight guard, watcher hand-off, refresh, affordances
//! error.rs        — ProtocolError, OperationError
//! ```

pub mod client;
pub mod controller;
pub mod error;
pub mod orchestrator;
pub mod session;
pub mod types;

pub use client::{Confirmation, ConfirmationWatcher, LoggingWatcher, ProtocolClient};
pub use controller::{BalanceView, OperationController};
pub use error::{OperationError, ProtocolError};
pub use orchestrator::Orchestrator;
pub use session::SessionContext;
pub use types::{
    Address, DecryptionKey, Operation, OperationKind, OperationReceipt, OperationStatus,
    RefreshScope, TokenMetadata, TxHash,
};
