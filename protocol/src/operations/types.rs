//! # Operation Types
//!
//! Identifiers and records shared by the orchestrator, the controller and
//! every protocol client implementation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::config::EercMode;

// ---------------------------------------------------------------------------
// Hex identifiers
// ---------------------------------------------------------------------------

/// Parses `0x`-prefixed (or bare) hex into a fixed-size array.
fn parse_fixed_hex<const N: usize>(s: &str) -> Result<[u8; N], hex::FromHexError> {
    let body = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    let bytes = hex::decode(body)?;
    if bytes.len() != N {
        return Err(hex::FromHexError::InvalidStringLength);
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $len]);

        impl $name {
            pub fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// `0x`-prefixed lowercase hex.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = hex::FromHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_fixed_hex::<$len>(s).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_id!(
    /// A 20-byte account address.
    Address,
    20
);

hex_id!(
    /// A 32-byte transaction hash, the identifier every delegate call returns.
    TxHash,
    32
);

/// The session's decryption key, as handed back by key derivation.
///
/// Opaque to this crate. `Debug` never prints the material.
#[derive(Clone, PartialEq, Eq)]
pub struct DecryptionKey(String);

impl DecryptionKey {
    pub fn new(material: impl Into<String>) -> Self {
        Self(material.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DecryptionKey(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// Token Metadata
// ---------------------------------------------------------------------------

/// What the protocol reports about the encrypted token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    /// `None` until the contract has answered.
    pub decimals: Option<u32>,
    pub mode: EercMode,
    pub owner: Option<Address>,
    pub auditor_key_set: bool,
}

// ---------------------------------------------------------------------------
// Operation Kind & Status
// ---------------------------------------------------------------------------

/// Every user-triggered action the client can perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Register,
    GenerateKey,
    Mint,
    Burn,
    Transfer,
    Deposit,
    Withdraw,
}

impl OperationKind {
    pub const ALL: [OperationKind; 7] = [
        OperationKind::Register,
        OperationKind::GenerateKey,
        OperationKind::Mint,
        OperationKind::Burn,
        OperationKind::Transfer,
        OperationKind::Deposit,
        OperationKind::Withdraw,
    ];

    /// Whether the operation exists for a deployment mode.
    pub fn available_in(&self, mode: EercMode) -> bool {
        match self {
            OperationKind::Mint | OperationKind::Burn => mode == EercMode::Standalone,
            OperationKind::Deposit | OperationKind::Withdraw => mode == EercMode::Converter,
            _ => true,
        }
    }

    /// Operations that move value need a decryption key first.
    pub fn requires_decryption_key(&self) -> bool {
        !matches!(self, OperationKind::Register | OperationKind::GenerateKey)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationKind::Register => "register",
            OperationKind::GenerateKey => "generate-key",
            OperationKind::Mint => "mint",
            OperationKind::Burn => "burn",
            OperationKind::Transfer => "transfer",
            OperationKind::Deposit => "deposit",
            OperationKind::Withdraw => "withdraw",
        };
        f.pad(s)
    }
}

/// `Idle → Submitting → (Confirmed | Failed)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    Idle,
    Submitting,
    /// Terminal: the delegate call resolved.
    Confirmed,
    /// Terminal: a precondition or the delegate call failed.
    Failed(String),
}

impl OperationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationStatus::Confirmed | OperationStatus::Failed(_))
    }
}

/// A transient record of one triggered action.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Operation {
    pub id: Uuid,
    pub kind: OperationKind,
    pub status: OperationStatus,
    pub tx_hash: Option<TxHash>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Operation {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            status: OperationStatus::Idle,
            tx_hash: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// `Idle → Submitting`. No-op from any other state.
    pub fn submit(&mut self) {
        if self.status == OperationStatus::Idle {
            self.status = OperationStatus::Submitting;
        }
    }

    /// `Submitting → Confirmed`.
    pub fn confirm(&mut self, tx_hash: Option<TxHash>) {
        if self.status == OperationStatus::Submitting {
            self.status = OperationStatus::Confirmed;
            self.tx_hash = tx_hash;
            self.finished_at = Some(Utc::now());
        }
    }

    /// `Submitting → Failed`.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.status == OperationStatus::Submitting {
            self.status = OperationStatus::Failed(reason.into());
            self.finished_at = Some(Utc::now());
        }
    }
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

/// Which part of the displayed state must be re-read after an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefreshScope {
    /// Registration status and the account's public key.
    Registration,
    /// The encrypted balance and its decryption.
    EncryptedBalance,
    /// Encrypted balance plus the underlying ERC-20 balance.
    AllBalances,
    /// Everything, including token metadata. Used on session start.
    Everything,
}

impl RefreshScope {
    pub fn includes_registration(&self) -> bool {
        matches!(self, RefreshScope::Registration | RefreshScope::Everything)
    }

    pub fn includes_encrypted(&self) -> bool {
        !matches!(self, RefreshScope::Registration)
    }

    pub fn includes_underlying(&self) -> bool {
        matches!(self, RefreshScope::AllBalances | RefreshScope::Everything)
    }

    pub fn includes_metadata(&self) -> bool {
        matches!(self, RefreshScope::Everything)
    }
}

/// What the orchestrator hands back after a delegate call resolves.
#[derive(Clone, Debug)]
pub struct OperationReceipt {
    pub kind: OperationKind,
    /// Present for every operation that submits a transaction. Key
    /// derivation is local and has none.
    pub tx_hash: Option<TxHash>,
    /// The refresh the caller owes the user.
    pub refresh: RefreshScope,
    /// Set only by key generation.
    pub decryption_key: Option<DecryptionKey>,
}
