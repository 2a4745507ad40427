// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # stc
//!
//! Offline front-end for `stc-provider`. Parses arguments, initializes
//! logging, and runs one command:
//!
//! - `keygen`:         seal a new or imported key into a keystore file
//! - `receipt`:        encode or decode `stc1…` receipt identifiers
//! - `sign-transfer`:  sign a `peer_to_peer` transfer, print the hex
//! - `sign-message`:   sign an off-chain message
//! - `verify-message`: check a signed message
//! - `version`:        print build version information
//!
//! Results go to stdout as JSON; logs go to stderr.

mod cli;
mod logging;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;

use stc_provider::config::{self, ProviderConfig};
use stc_provider::crypto::keys::AccountKeypair;
use stc_provider::transaction::{peer_to_peer, sign_message, sign_raw_user_transaction, SignedMessage};
use stc_provider::types::{
    AccountAddress, AuthenticationKey, ChainId, RawUserTransactionBuilder, StructTag,
};
use stc_provider::{Keystore, ReceiptIdentifier};

use cli::{Commands, ReceiptCommand, StcCli};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = StcCli::parse();
    logging::init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format));

    match cli.command {
        Commands::Keygen(args) => keygen(args),
        Commands::Receipt(cmd) => receipt(cmd),
        Commands::SignTransfer(args) => sign_transfer(args),
        Commands::SignMessage(args) => sign_message_cmd(args),
        Commands::VerifyMessage(args) => verify_message(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn keygen(args: cli::KeygenArgs) -> Result<()> {
    if args.out.exists() {
        bail!("refusing to overwrite {}", args.out.display());
    }

    let keypair = match &args.secret_key {
        Some(secret) => AccountKeypair::from_hex(secret).context("invalid secret key")?,
        None => AccountKeypair::generate(),
    };
    let keystore = Keystore::encrypt(&keypair, &args.password).context("failed to seal key")?;
    let json = keystore.to_json().context("failed to serialize keystore")?;

    std::fs::write(&args.out, json)
        .with_context(|| format!("failed to write keystore to {}", args.out.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&args.out, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict {}", args.out.display()))?;
    }

    let auth_key = AuthenticationKey::ed25519(&keystore.public_key());
    tracing::info!(address = %keystore.address(), path = %args.out.display(), "keystore written");

    print_json(&json!({
        "address": keystore.address().to_string(),
        "public_key": keystore.public_key().to_string(),
        "auth_key": auth_key.to_string(),
        "receipt_identifier": ReceiptIdentifier::new(keystore.address(), Some(auth_key)).encode(),
        "keystore": args.out.display().to_string(),
    }))
}

fn receipt(cmd: ReceiptCommand) -> Result<()> {
    match cmd {
        ReceiptCommand::Encode { address, auth_key } => {
            let address = AccountAddress::from_hex(&address).context("invalid address")?;
            let auth_key = auth_key
                .as_deref()
                .map(AuthenticationKey::from_hex)
                .transpose()
                .context("invalid auth key")?;
            if let Some(key) = auth_key {
                if key.derived_address() != address {
                    tracing::warn!(%address, "auth key does not derive this address");
                }
            }
            println!("{}", ReceiptIdentifier::new(address, auth_key));
            Ok(())
        }
        ReceiptCommand::Decode { receipt } => {
            let id = ReceiptIdentifier::decode(&receipt).context("invalid receipt identifier")?;
            print_json(&json!({
                "address": id.address.to_string(),
                "auth_key": id.auth_key.map(|key| key.to_string()),
            }))
        }
    }
}

fn sign_transfer(args: cli::SignTransferArgs) -> Result<()> {
    let keypair = open_keystore(&args.key.keystore, &args.key.password)?;
    let sender = AccountAddress::from_public_key(&keypair.public_key());
    let chain_id = resolve_chain_id(&args.chain.network)?;
    let config = load_config(args.chain.config.as_deref())?;

    let token = args
        .token
        .as_deref()
        .map(str::parse::<StructTag>)
        .transpose()
        .context("invalid token type tag")?;
    let payload = peer_to_peer(&args.to, args.amount, token.as_ref()).context("invalid transfer")?;

    let expiration = match args.expiration {
        Some(secs) => secs,
        None => local_now_secs().saturating_add(config.expiration_ttl_secs),
    };
    let raw = RawUserTransactionBuilder::new(sender, chain_id, payload)
        .sequence_number(args.sequence_number)
        .max_gas_amount(args.max_gas_amount.unwrap_or(config.max_gas_amount))
        .gas_unit_price(args.gas_unit_price.unwrap_or(config.gas_unit_price))
        .gas_token_code(config.gas_token_code.clone())
        .expiration_timestamp_secs(expiration)
        .build();

    let signed = sign_raw_user_transaction(&keypair, raw).context("failed to sign")?;
    let id = signed.id().context("failed to hash transaction")?;
    tracing::info!(%id, %sender, sequence_number = args.sequence_number, "transfer signed");

    print_json(&json!({
        "sender": sender.to_string(),
        "sequence_number": args.sequence_number,
        "chain_id": chain_id.id(),
        "expiration_timestamp_secs": expiration,
        "transaction_id": id.to_string(),
        "signed_transaction": signed.to_hex().context("failed to encode transaction")?,
    }))
}

fn sign_message_cmd(args: cli::SignMessageArgs) -> Result<()> {
    let keypair = open_keystore(&args.key.keystore, &args.key.password)?;
    let account = AccountAddress::from_public_key(&keypair.public_key());
    let chain_id = resolve_chain_id(&args.chain.network)?;

    let message = if args.hex {
        hex::decode(args.message.trim_start_matches("0x")).context("message is not valid hex")?
    } else {
        args.message.into_bytes()
    };

    let signed =
        sign_message(&keypair, account, &message, chain_id).context("failed to sign message")?;
    print_json(&json!({
        "account": account.to_string(),
        "signature": signed.signature().map(|sig| sig.to_hex()),
        "signed_message": signed.to_hex().context("failed to encode message")?,
    }))
}

fn verify_message(args: cli::VerifyMessageArgs) -> Result<()> {
    let signed =
        SignedMessage::from_hex(&args.signed_message).context("malformed signed message")?;
    let valid = signed.verify_for_account();
    print_json(&json!({
        "account": signed.account.to_string(),
        "chain_id": signed.chain_id.id(),
        "message": hex::encode(&signed.message),
        "valid": valid,
    }))?;
    if !valid {
        bail!("signature does not verify for {}", signed.account);
    }
    Ok(())
}

fn print_version() {
    println!("stc      {}", env!("CARGO_PKG_VERSION"));
    println!("receipt  {} v{}", config::RECEIPT_IDENTIFIER_HRP, config::RECEIPT_IDENTIFIER_VERSION);
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_keystore(path: &Path, password: &str) -> Result<AccountKeypair> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read keystore {}", path.display()))?;
    let keystore = Keystore::from_json(&json)
        .with_context(|| format!("malformed keystore {}", path.display()))?;
    keystore
        .decrypt(password)
        .with_context(|| format!("failed to open keystore for {}", keystore.address()))
}

/// Accepts a network name or a numeric chain id.
fn resolve_chain_id(network: &str) -> Result<ChainId> {
    if let Some(id) = config::chain_id_for_network(network) {
        return Ok(ChainId::new(id));
    }
    network
        .parse::<u8>()
        .map(ChainId::new)
        .with_context(|| format!("unknown network {:?}", network))
}

fn load_config(path: Option<&Path>) -> Result<ProviderConfig> {
    let Some(path) = path else {
        return Ok(ProviderConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn local_now_secs() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_ids_by_name_or_number() {
        assert_eq!(resolve_chain_id("dev").unwrap(), ChainId::dev());
        assert_eq!(resolve_chain_id("Barnard").unwrap().id(), config::CHAIN_ID_BARNARD);
        assert_eq!(resolve_chain_id("42").unwrap().id(), 42);
        assert!(resolve_chain_id("moon").is_err());
    }

    #[test]
    fn missing_config_means_defaults() {
        assert_eq!(load_config(None).unwrap(), ProviderConfig::default());
        assert!(load_config(Some(Path::new("/nonexistent/stc.json"))).is_err());
    }
}
