//! # CLI Interface
//!
//! Argument structure for `aurora-tx`, defined with `clap` derive. Four
//! subcommands: `keygen`, `sign`, `decode` and `select`. Logging flags are
//! global and may appear before or after the subcommand.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use aurora_protocol::config::DEFAULT_BLOCK_GAS_LIMIT;

use crate::logging::LogFormat;

/// Aurora transaction tool.
///
/// Generates keys, signs and decodes transactions, and previews how a batch
/// of signed transactions would be ordered into a block.
#[derive(Parser, Debug)]
#[command(
    name = "aurora-tx",
    about = "Aurora transaction tool",
    version,
    propagate_version = true
)]
pub struct AuroraCli {
    /// Log output format.
    #[arg(long, global = true, env = "AURORA_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Default log level. `RUST_LOG` takes precedence when set.
    #[arg(long, global = true, env = "AURORA_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh secret key and print it with its address.
    Keygen,
    /// Sign a text-form transaction and print both wire forms.
    Sign(SignArgs),
    /// Decode a binary-form transaction and recover its sender.
    Decode(DecodeArgs),
    /// Order a batch of signed transactions into a block.
    Select(SelectArgs),
}

/// Chain scope shared by every command that signs or recovers.
#[derive(Args, Debug, Clone, Copy)]
pub struct ChainArgs {
    /// Chain id to sign for or recover under. Omit for unprotected
    /// signatures.
    #[arg(long, env = "AURORA_CHAIN_ID")]
    pub chain_id: Option<u64>,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Hex-encoded 32-byte secret key.
    ///
    /// **Avoid passing keys on the command line on shared machines**; prefer
    /// the environment variable.
    #[arg(long, env = "AURORA_SECRET_KEY", hide_env_values = true)]
    pub key: String,

    #[command(flatten)]
    pub chain: ChainArgs,

    /// File holding the text-form transaction. Reads stdin when omitted.
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Binary-form transaction as hex, with or without `0x`.
    pub raw: String,

    #[command(flatten)]
    pub chain: ChainArgs,
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// File holding a JSON array of text-form transactions. Reads stdin when
    /// omitted.
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub chain: ChainArgs,

    /// Gas available to the block.
    #[arg(long, env = "AURORA_GAS_LIMIT", default_value_t = DEFAULT_BLOCK_GAS_LIMIT)]
    pub gas_limit: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        AuroraCli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = AuroraCli::try_parse_from([
            "aurora-tx",
            "decode",
            "0xc0",
            "--chain-id",
            "3",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Commands::Decode(args) => {
                assert_eq!(args.raw, "0xc0");
                assert_eq!(args.chain.chain_id, Some(3));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
