// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # eERC CLI
//!
//! Entry point for the `eerc` binary. Parses CLI arguments, initializes
//! logging, loads the client configuration and dispatches:
//!
//! - `encode`  — decimal amount to protocol integer
//! - `decode`  — protocol integer to display string
//! - `reduce`  — little-endian bytes to a BN254 scalar
//! - `point`   — Baby Jubjub membership and elided display
//! - `demo`    — scripted session against the contract simulator
//! - `config`  — resolved configuration and circuit artifacts
//! - `version` — print build version information

mod cli;
mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use eerc_client::amount::{self, Amount};
use eerc_client::config::{ClientConfig, EercMode, DEFAULT_CHAIN_ID};
use eerc_client::crypto::{self, CurvePoint};
use eerc_client::display;
use eerc_client::operations::{
    Address, OperationController, OperationError, OperationKind, OperationReceipt, Orchestrator,
    ProtocolClient, SessionContext,
};
use eerc_contracts::{EercSimulator, SimulatedWatcher};

use cli::{Commands, EercCli};
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = EercCli::parse();

    let default_level = match cli.command {
        Commands::Demo(_) => "eerc=info,eerc_client=info,eerc_contracts=info",
        _ => "warn",
    };
    logging::init_logging(default_level, LogFormat::from(cli.log_format));

    let config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ClientConfig::default(),
    };

    match cli.command {
        Commands::Encode(args) => {
            let encoded = amount::encode_scaled(&args.amount, args.decimals)
                .context("failed to encode amount")?;
            println!("{encoded}");
            Ok(())
        }
        Commands::Decode(args) => {
            let value: Amount = args.amount.parse().context("failed to parse amount")?;
            println!("{}", amount::decode(&value, args.decimals));
            Ok(())
        }
        Commands::Reduce(args) => {
            let raw = args.hex.strip_prefix("0x").unwrap_or(&args.hex);
            let bytes = hex::decode(raw).context("input is not valid hex")?;
            println!("{}", crypto::reduce(&bytes));
            Ok(())
        }
        Commands::Point(args) => inspect_point(args),
        Commands::Demo(args) => {
            let mode = args.mode.unwrap_or(config.mode);
            run_demo(config, mode, args.json).await
        }
        Commands::Config(args) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&config).context("failed to serialize config")?
                );
            } else {
                print!("{}", display::render_config(&config));
            }
            Ok(())
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Prints the status of a typed point, the way the wallet's inspector does.
fn inspect_point(args: cli::PointArgs) -> Result<()> {
    let point = CurvePoint::from_decimal(&args.x, &args.y).context("invalid point")?;
    if args.full {
        println!("x: {}", point.x);
        println!("y: {}", point.y);
        println!("{}", point.status().label());
    } else {
        println!("{}", display::render_point("point", &point));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Demo
// ---------------------------------------------------------------------------

/// Walks one wallet through a full session on a fresh simulated deployment.
async fn run_demo(mut config: ClientConfig, mode: EercMode, json: bool) -> Result<()> {
    config.mode = mode;

    let chain = match mode {
        EercMode::Standalone => EercSimulator::standalone(),
        EercMode::Converter => EercSimulator::converter(),
    }
    .context("failed to deploy simulated contracts")?;

    let alice = Address::from_bytes([0xa1; 20]);
    let bob = Address::from_bytes([0xb0; 20]);
    let carol = Address::from_bytes([0xc0; 20]);
    tracing::info!(mode = %mode, account = %alice, "starting demo session");

    // Bob registers out of band so alice has someone to pay.
    chain
        .client(bob)
        .register()
        .await
        .context("failed to register demo recipient")?;

    if mode == EercMode::Converter {
        let underlying = chain.read(|t| t.underlying().map(|l| l.decimals)).unwrap_or(18);
        let grant = amount::encode_scaled("100", underlying).context("invalid faucet amount")?;
        chain.faucet(&alice, &grant);
    }

    let client = Arc::new(chain.client(alice));
    let watcher = Arc::new(SimulatedWatcher::new(Arc::clone(&chain)));
    let controller = OperationController::new(Orchestrator::new(client), watcher.clone());
    let ctx = SessionContext::connected(alice);

    controller
        .load(&ctx)
        .await
        .context("failed to load session view")?;

    let demo = Demo {
        controller: &controller,
        watcher: &watcher,
    };

    demo.report(OperationKind::GenerateKey, controller.generate_key(&ctx).await);
    demo.report(OperationKind::Register, controller.register(&ctx).await);

    match mode {
        EercMode::Standalone => {
            let minted = amount::encode("25").context("invalid mint amount")?;
            demo.report(OperationKind::Mint, controller.mint(&ctx, &minted).await);
        }
        EercMode::Converter => {
            demo.report(OperationKind::Deposit, controller.deposit(&ctx, "25").await);
        }
    }

    demo.report(OperationKind::Transfer, controller.transfer(&ctx, &bob, "7.5").await);
    demo.report(OperationKind::Transfer, controller.transfer(&ctx, &carol, "1").await);

    match mode {
        EercMode::Standalone => {
            let burned = amount::encode("2.5").context("invalid burn amount")?;
            demo.report(OperationKind::Burn, controller.burn(&ctx, &burned).await);
        }
        EercMode::Converter => {
            demo.report(OperationKind::Withdraw, controller.withdraw(&ctx, "2.5").await);
        }
    }

    let view = controller.view();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&view).context("failed to serialize session view")?
        );
    } else {
        println!();
        print!("{}", display::render_view(&view, &config));
    }
    Ok(())
}

struct Demo<'a> {
    controller: &'a OperationController,
    watcher: &'a SimulatedWatcher,
}

impl Demo<'_> {
    /// Prints an outcome and feeds any receipts back into the controller.
    fn report(&self, kind: OperationKind, result: Result<OperationReceipt, OperationError>) {
        match result {
            Ok(receipt) => match receipt.tx_hash {
                Some(tx_hash) => println!("ok    {kind:<12} {tx_hash}"),
                None => println!("ok    {kind:<12} (local)"),
            },
            Err(e) => println!("fail  {kind:<12} {e}"),
        }
        for (tx_hash, outcome) in self.watcher.drain() {
            self.controller.on_confirmation(&tx_hash, outcome);
        }
    }
}

/// Prints version information to stdout.
fn print_version() {
    println!("eerc      {}", env!("CARGO_PKG_VERSION"));
    println!("chain id  {}", DEFAULT_CHAIN_ID);
    println!("field     BN254 scalar, p = {}", crypto::field_modulus());
    println!("rustc     {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
