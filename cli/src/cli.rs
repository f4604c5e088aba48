//! # CLI Interface
//!
//! Defines the command-line argument structure for `eerc` using `clap`
//! derive. Inspection subcommands (`encode`, `decode`, `reduce`, `point`)
//! are pure; `demo` runs a scripted wallet session against the simulator.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use eerc_client::config::{EercMode, AMOUNT_DECIMALS};

/// eERC client toolkit.
///
/// Encodes and decodes token amounts, checks Baby Jubjub points, and runs
/// a full register/mint/transfer session against in-memory contracts.
#[derive(Parser, Debug)]
#[command(name = "eerc", about = "eERC client toolkit", version, propagate_version = true)]
pub struct EercCli {
    /// Path to a JSON client configuration.
    ///
    /// When omitted, built-in Avalanche Fuji defaults are used.
    #[arg(long, short = 'c', env = "EERC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log output format. Logs go to stderr.
    #[arg(long, value_enum, default_value_t = LogFormatArg::Pretty, global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode a decimal amount into the protocol's integer form.
    Encode(EncodeArgs),
    /// Decode an integer amount for display.
    Decode(DecodeArgs),
    /// Reduce a little-endian hex byte string into the BN254 scalar field.
    Reduce(ReduceArgs),
    /// Check whether a point lies on Baby Jubjub.
    Point(PointArgs),
    /// Run a scripted session against simulated contracts.
    Demo(DemoArgs),
    /// Print the resolved client configuration and circuit artifacts.
    Config(ConfigArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// Decimal amount, e.g. `1.5`.
    pub amount: String,

    /// Fractional digits of the target scale.
    #[arg(long, short = 'd', default_value_t = AMOUNT_DECIMALS)]
    pub decimals: u32,
}

#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// Integer amount in the smallest unit, e.g. `150`.
    pub amount: String,

    /// Fractional digits of the source scale.
    #[arg(long, short = 'd', default_value_t = AMOUNT_DECIMALS)]
    pub decimals: u32,
}

#[derive(Parser, Debug)]
pub struct ReduceArgs {
    /// Bytes as hex, least significant byte first. A `0x` prefix is allowed.
    pub hex: String,
}

#[derive(Parser, Debug)]
pub struct PointArgs {
    /// Decimal x coordinate.
    pub x: String,

    /// Decimal y coordinate.
    pub y: String,

    /// Print coordinates in full instead of eliding them.
    #[arg(long)]
    pub full: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Print as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Deployment mode to simulate. Defaults to the configured mode.
    #[arg(long, short = 'm')]
    pub mode: Option<EercMode>,

    /// Print the final session view as JSON.
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        EercCli::command().debug_assert();
    }

    #[test]
    fn parses_demo_mode() {
        let cli = EercCli::parse_from(["eerc", "demo", "--mode", "converter"]);
        match cli.command {
            Commands::Demo(args) => assert_eq!(args.mode, Some(EercMode::Converter)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_takes_global_path_after_subcommand() {
        let cli = EercCli::parse_from(["eerc", "config", "--json", "-c", "eerc.json"]);
        assert_eq!(cli.config, Some(PathBuf::from("eerc.json")));
        assert!(matches!(cli.command, Commands::Config(ConfigArgs { json: true })));
    }

    #[test]
    fn encode_defaults_to_two_decimals() {
        let cli = EercCli::parse_from(["eerc", "encode", "1.5"]);
        match cli.command {
            Commands::Encode(args) => {
                assert_eq!(args.amount, "1.5");
                assert_eq!(args.decimals, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
