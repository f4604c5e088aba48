//! # eERC Contract Simulator
//!
//! An in-memory stand-in for the encrypted ERC contracts, good enough to
//! drive the client core end to end without a chain, a prover or a wallet:
//!
//! - **token** — One deployment in standalone or converter mode: key
//!   registry, encrypted balances, auditor key, supply.
//! - **elgamal** — Exponential ElGamal on Baby Jubjub. Balances here are
//!   real ciphertexts, so the points the client renders are real points.
//! - **erc20** — The public token a converter deployment wraps.
//! - **simulator** — The chain: instant inclusion, transaction hashes,
//!   receipts.
//! - **client** / **watcher** — `ProtocolClient` and `ConfirmationWatcher`
//!   implementations bound to the simulated chain.
//!
//! ## Design Principles
//!
//! 1. A failed call leaves no trace: no state change, no hash, no receipt.
//! 2. Amount arithmetic is checked; an overdraft is an error, never a wrap.
//! 3. Every ciphertext is verified against the tracked balance on read.

pub mod client;
pub mod elgamal;
pub mod erc20;
pub mod error;
pub mod simulator;
pub mod token;
pub mod watcher;

pub use client::SimulatedClient;
pub use error::ContractError;
pub use simulator::EercSimulator;
pub use watcher::SimulatedWatcher;
