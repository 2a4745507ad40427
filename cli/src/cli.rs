//! # CLI Interface
//!
//! Command-line arguments for `stc`, defined with `clap` derive. Every
//! command works offline: nothing here talks to a node.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Starcoin key and signing tool.
///
/// Generates password-sealed keystores, converts receipt identifiers, and
/// signs transfers and messages without a node connection. Signed
/// transactions are printed as hex for submission elsewhere.
#[derive(Parser, Debug)]
#[command(
    name = "stc",
    about = "Offline Starcoin key and signing tool",
    version,
    propagate_version = true
)]
pub struct StcCli {
    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, global = true, env = "STC_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format: `pretty` or `json`.
    #[arg(long, global = true, env = "STC_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a keystore file for a new (or imported) account key.
    Keygen(KeygenArgs),
    /// Encode or decode `stc1…` receipt identifiers.
    #[command(subcommand)]
    Receipt(ReceiptCommand),
    /// Sign a `peer_to_peer` token transfer.
    SignTransfer(SignTransferArgs),
    /// Sign an off-chain message.
    SignMessage(SignMessageArgs),
    /// Check a signed message produced by `sign-message`.
    VerifyMessage(VerifyMessageArgs),
    /// Print version information and exit.
    Version,
}

/// Keystore file plus its password.
#[derive(Args, Debug)]
pub struct KeystoreArgs {
    /// Path to the keystore JSON file.
    #[arg(long, short = 'k', env = "STC_KEYSTORE")]
    pub keystore: PathBuf,

    /// Keystore password.
    #[arg(long, env = "STC_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// Where to write the keystore. Refuses to overwrite an existing file.
    #[arg(long, short = 'o')]
    pub out: PathBuf,

    /// Password sealing the key.
    #[arg(long, env = "STC_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Import this hex Ed25519 secret key instead of generating one.
    #[arg(long)]
    pub secret_key: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ReceiptCommand {
    /// Build a receipt identifier from an address and optional auth key.
    Encode {
        /// Account address, `0x`-prefixed hex.
        address: String,
        /// 32-byte authentication key, hex.
        #[arg(long)]
        auth_key: Option<String>,
    },
    /// Print the address and auth key carried by a receipt identifier.
    Decode {
        /// The `stc1…` string.
        receipt: String,
    },
}

/// Chain selection and an optional provider config file.
#[derive(Args, Debug)]
pub struct ChainArgs {
    /// Network name (`main`, `barnard`, `halley`, `proxima`, `dev`, `test`)
    /// or a numeric chain id.
    #[arg(long, short = 'n', env = "STC_NETWORK", default_value = "dev")]
    pub network: String,

    /// JSON file with gas and expiration defaults.
    #[arg(long, short = 'c', env = "STC_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct SignTransferArgs {
    #[command(flatten)]
    pub key: KeystoreArgs,

    #[command(flatten)]
    pub chain: ChainArgs,

    /// Payee: hex address or receipt identifier.
    #[arg(long)]
    pub to: String,

    /// Amount in the token's smallest unit.
    #[arg(long)]
    pub amount: u128,

    /// Sender sequence number. Offline signing cannot look it up.
    #[arg(long, short = 's')]
    pub sequence_number: u64,

    /// Token type tag. Defaults to `0x1::STC::STC`.
    #[arg(long)]
    pub token: Option<String>,

    /// Gas limit. Overrides the config file.
    #[arg(long)]
    pub max_gas_amount: Option<u64>,

    /// Gas unit price. Overrides the config file.
    #[arg(long)]
    pub gas_unit_price: Option<u64>,

    /// Absolute expiration in Unix seconds. Defaults to the local clock
    /// plus the configured TTL.
    #[arg(long)]
    pub expiration: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct SignMessageArgs {
    #[command(flatten)]
    pub key: KeystoreArgs,

    #[command(flatten)]
    pub chain: ChainArgs,

    /// The message. UTF-8 text unless `--hex` is given.
    pub message: String,

    /// Treat the message as hex bytes.
    #[arg(long)]
    pub hex: bool,
}

#[derive(Parser, Debug)]
pub struct VerifyMessageArgs {
    /// Hex of the signed message.
    pub signed_message: String,
}
