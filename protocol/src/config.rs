//! # Protocol Configuration & Constants
//!
//! Every magic number the client relies on lives here. The curve constants
//! in particular are load-bearing: get one digit wrong and every public key
//! on the page turns red.
//!
//! The second half of the file is [`ClientConfig`], the per-deployment
//! settings (contract addresses, circuit artifacts, explorer) that a front-end
//! loads from a JSON file at startup.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::operations::OperationKind;

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Fractional digits of the encrypted token. Every eERC amount is an integer
/// scaled by `10^AMOUNT_DECIMALS`, so `150` means `1.5`.
pub const AMOUNT_DECIMALS: u32 = 2;

// ---------------------------------------------------------------------------
// Field & Curve
// ---------------------------------------------------------------------------

/// The BN254 scalar field prime. Baby Jubjub is defined over this field,
/// and the scalar reducer reduces byte blobs modulo it.
pub const FIELD_MODULUS_DEC: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// Twisted Edwards coefficient `a` of Baby Jubjub.
pub const BABYJUB_A: u64 = 168_700;

/// Twisted Edwards coefficient `d` of Baby Jubjub.
pub const BABYJUB_D: u64 = 168_696;

/// Order of the prime subgroup generated by `BASE8`.
pub const BABYJUB_SUBGROUP_ORDER_DEC: &str =
    "2736030358979909402780800718157159386076813972158567259200215660948447373041";

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Coordinates with more decimal digits than this get elided on screen.
pub const COORDINATE_ELISION_THRESHOLD: usize = 10;

/// Digits kept on each side of the ellipsis when eliding.
pub const COORDINATE_ELISION_KEEP: usize = 5;

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// Avalanche Fuji C-Chain. The eERC demo contracts live here.
pub const DEFAULT_CHAIN_ID: u64 = 43_113;

/// Block explorer used for contract links.
pub const DEFAULT_EXPLORER_BASE_URL: &str = "https://testnet.snowtrace.io/address/";

// ---------------------------------------------------------------------------
// Deployment Mode
// ---------------------------------------------------------------------------

/// How the eERC contract was deployed.
///
/// Standalone tokens are minted and burned privately. Converter tokens wrap
/// an existing ERC-20: you deposit the public token and get the encrypted
/// equivalent, and withdraw to go back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EercMode {
    #[default]
    Standalone,
    Converter,
}

impl fmt::Display for EercMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EercMode::Standalone => write!(f, "Standalone"),
            EercMode::Converter => write!(f, "Converter"),
        }
    }
}

impl FromStr for EercMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standalone" => Ok(EercMode::Standalone),
            "converter" => Ok(EercMode::Converter),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Client Configuration
// ---------------------------------------------------------------------------

/// Errors raised while loading a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`ClientConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Mode string was neither `standalone` nor `converter`.
    #[error("unknown eERC mode: {0}")]
    UnknownMode(String),
}

/// Deployed contract addresses, `0x`-prefixed hex.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    pub standalone: String,
    pub converter: String,
    /// The plain ERC-20 wrapped by the converter deployment.
    pub erc20: String,
}

impl Default for ContractAddresses {
    fn default() -> Self {
        Self {
            standalone: "0x0B306BF915C4d645ff596e518fAf3F9669b97016".to_string(),
            converter: "0x4826533B4897376654Bb4d4AD88B7faFD0C98528".to_string(),
            erc20: "0xa82fF9aFd8f496c3d6ac40E2a0F282E47488CFc9".to_string(),
        }
    }
}

/// One circuit's witness generator and Groth16 proving key, as paths the
/// prover fetches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitArtifact {
    pub wasm: String,
    pub zkey: String,
}

impl CircuitArtifact {
    fn named(circuit: &str) -> Self {
        Self {
            wasm: format!("/{circuit}.wasm"),
            zkey: format!("/{circuit}.groth16.zkey"),
        }
    }
}

/// Artifacts for every circuit the protocol proves against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitArtifacts {
    pub register: CircuitArtifact,
    pub mint: CircuitArtifact,
    pub transfer: CircuitArtifact,
    pub withdraw: CircuitArtifact,
}

impl Default for CircuitArtifacts {
    fn default() -> Self {
        Self {
            register: CircuitArtifact::named("RegistrationCircuit"),
            mint: CircuitArtifact::named("MintCircuit"),
            transfer: CircuitArtifact::named("TransferCircuit"),
            withdraw: CircuitArtifact::named("WithdrawCircuit"),
        }
    }
}

/// Per-deployment client settings.
///
/// Every field has a default, so a config file only needs to list what it
/// overrides:
///
/// ```json
/// { "mode": "converter", "chain_id": 31337 }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub mode: EercMode,
    pub chain_id: u64,
    pub contracts: ContractAddresses,
    pub circuits: CircuitArtifacts,
    pub explorer_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mode: EercMode::default(),
            chain_id: DEFAULT_CHAIN_ID,
            contracts: ContractAddresses::default(),
            circuits: CircuitArtifacts::default(),
            explorer_base_url: DEFAULT_EXPLORER_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Parses a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a config from a JSON file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// The contract address the client talks to in the configured mode.
    pub fn active_contract(&self) -> &str {
        match self.mode {
            EercMode::Standalone => &self.contracts.standalone,
            EercMode::Converter => &self.contracts.converter,
        }
    }

    /// Explorer URL for an address.
    pub fn explorer_link(&self, address: &str) -> String {
        format!("{}{}", self.explorer_base_url, address)
    }

    /// The circuit whose proof accompanies `kind`, if it needs one.
    ///
    /// A burn is proven as a transfer to the burn account. Key generation
    /// and deposits carry no proof.
    pub fn circuit_for(&self, kind: OperationKind) -> Option<&CircuitArtifact> {
        match kind {
            OperationKind::Register => Some(&self.circuits.register),
            OperationKind::Mint => Some(&self.circuits.mint),
            OperationKind::Transfer | OperationKind::Burn => Some(&self.circuits.transfer),
            OperationKind::Withdraw => Some(&self.circuits.withdraw),
            OperationKind::GenerateKey | OperationKind::Deposit => None,
        }
    }
}
