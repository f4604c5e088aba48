//! # Display
//!
//! Plain-text rendering of what a wallet screen shows: token summary,
//! public keys with their curve status, the encrypted balance, decrypted
//! and underlying balances. The CLI prints these; a GUI would lay out the
//! same strings.

use std::fmt::Write as _;

use crate::amount::{decode, format_balance};
use crate::config::{ClientConfig, EercMode, AMOUNT_DECIMALS};
use crate::crypto::point::truncate;
use crate::crypto::{CurvePoint, EncryptedBalance};
use crate::operations::{BalanceView, OperationKind, TokenMetadata};

/// `label: (x, y) [status]`, long coordinates elided.
pub fn render_point(label: &str, point: &CurvePoint) -> String {
    format!(
        "{label}: ({}, {}) [{}]",
        truncate(&point.x),
        truncate(&point.y),
        point.status().label()
    )
}

/// Both ciphertext halves, one per line.
pub fn render_encrypted_balance(balance: &EncryptedBalance) -> String {
    if balance.is_unset() {
        return "Encrypted balance: (none)".to_string();
    }
    format!(
        "Encrypted balance:\n  {}\n  {}",
        render_point("C1", &balance.c1),
        render_point("C2", &balance.c2)
    )
}

/// Name, symbol, decimals, mode and owner.
pub fn render_token(metadata: &TokenMetadata) -> String {
    let decimals = metadata
        .decimals
        .map(|d| d.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let owner = metadata
        .owner
        .map(|o| o.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "Token: {} ({})\nDecimals: {}\nMode: {}\nOwner: {}\nAuditor key set: {}",
        metadata.name,
        metadata.symbol,
        decimals,
        metadata.mode,
        owner,
        if metadata.auditor_key_set { "yes" } else { "no" }
    )
}

/// The whole session view, in the order the wallet shows it.
pub fn render_view(view: &BalanceView, config: &ClientConfig) -> String {
    let mut out = String::new();

    match &view.metadata {
        Some(metadata) => {
            let _ = writeln!(out, "{}", render_token(metadata));
        }
        None => {
            let _ = writeln!(out, "Token: (not loaded)");
        }
    }
    let _ = writeln!(
        out,
        "Contract: {}",
        config.explorer_link(config.active_contract())
    );
    let _ = writeln!(
        out,
        "Registered: {}",
        if view.registered { "yes" } else { "no" }
    );
    let _ = writeln!(out, "{}", render_point("Public key", &view.public_key));
    let _ = writeln!(
        out,
        "{}",
        render_point("Auditor public key", &view.auditor_public_key)
    );
    let _ = writeln!(out, "{}", render_encrypted_balance(&view.encrypted_balance));

    let (symbol, decimals) = view
        .metadata
        .as_ref()
        .map(|m| (m.symbol.as_str(), m.decimals.unwrap_or(AMOUNT_DECIMALS)))
        .unwrap_or(("", AMOUNT_DECIMALS));

    match &view.decrypted_balance {
        Some(amount) => {
            let _ = writeln!(
                out,
                "Decrypted balance: {}",
                format_balance(amount, decimals, symbol)
            );
        }
        None if view.decryption_key_available => {
            let _ = writeln!(out, "Decrypted balance: (loading)");
        }
        None => {
            let _ = writeln!(out, "Decrypted balance: (generate a decryption key)");
        }
    }
    if let Some(amount) = &view.underlying_balance {
        let scale = view.underlying_decimals.unwrap_or(decimals);
        let _ = writeln!(out, "Underlying balance: {}", decode(amount, scale));
    }
    if let Some(tx) = &view.pending_tx {
        let _ = writeln!(out, "Pending transaction: {tx}");
    }

    out
}

/// The resolved client configuration: deployment, links and, for each
/// operation the mode offers, the circuit its proof is built from.
pub fn render_config(config: &ClientConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Mode: {}", config.mode);
    let _ = writeln!(out, "Chain id: {}", config.chain_id);
    let _ = writeln!(
        out,
        "Contract: {}",
        config.explorer_link(config.active_contract())
    );
    if config.mode == EercMode::Converter {
        let _ = writeln!(
            out,
            "Underlying ERC-20: {}",
            config.explorer_link(&config.contracts.erc20)
        );
    }
    let _ = writeln!(out, "Circuits:");
    for kind in OperationKind::ALL {
        if !kind.available_in(config.mode) {
            continue;
        }
        match config.circuit_for(kind) {
            Some(circuit) => {
                let _ = writeln!(out, "  {:<13}{}  {}", kind, circuit.wasm, circuit.zkey);
            }
            None => {
                let _ = writeln!(out, "  {:<13}(no proof)", kind);
            }
        }
    }
    out
}
