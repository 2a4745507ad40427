// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Provider Configuration & Constants
//!
//! Every protocol constant the client depends on lives here: chain ids,
//! key and address widths, hashing salts, gas defaults, and the timing
//! knobs of the confirmation engine.
//!
//! The constants mirror what the node expects on the wire. Changing any of
//! the size or salt values produces transactions the node will reject.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Chain Identifiers
// ---------------------------------------------------------------------------

/// Main network.
pub const CHAIN_ID_MAIN: u8 = 1;

/// Public test network "barnard".
pub const CHAIN_ID_BARNARD: u8 = 251;

/// Public test network "proxima".
pub const CHAIN_ID_PROXIMA: u8 = 252;

/// Public test network "halley".
pub const CHAIN_ID_HALLEY: u8 = 253;

/// Local development network.
pub const CHAIN_ID_DEV: u8 = 254;

/// In-process test network.
pub const CHAIN_ID_TEST: u8 = 255;

// ---------------------------------------------------------------------------
// Account & Key Sizes
// ---------------------------------------------------------------------------

/// Account addresses are 16 bytes.
pub const ADDRESS_LENGTH: usize = 16;

/// Authentication keys are a 32-byte SHA3-256 digest.
pub const AUTH_KEY_LENGTH: usize = 32;

/// Ed25519 secret key length.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Ed25519 public key length.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signature length.
pub const SIGNATURE_LENGTH: usize = 64;

/// Hash output length (SHA3-256).
pub const HASH_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Hashing Salts
// ---------------------------------------------------------------------------

/// Every salted crypto hash is `sha3_256(SALT_PREFIX ‖ type_name)` followed
/// by the BCS bytes of the value.
pub const HASH_SALT_PREFIX: &str = "STARCOIN::";

/// Type name salted into transaction signing messages.
pub const RAW_TXN_SALT: &str = "RawUserTransaction";

/// Type name salted into the transaction hash.
pub const SIGNED_TXN_SALT: &str = "SignedUserTransaction";

/// Type name salted into arbitrary message signatures.
pub const SIGNING_MESSAGE_SALT: &str = "SigningMessage";

// ---------------------------------------------------------------------------
// Keystore
// ---------------------------------------------------------------------------

/// AES-256 key length.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-GCM nonce length (96 bits).
pub const AES_NONCE_LENGTH: usize = 12;

/// Random salt stored next to each sealed key.
pub const KEYSTORE_SALT_LENGTH: usize = 16;

/// Argon2id memory cost in KiB for newly sealed keystores.
pub const KEYSTORE_ARGON2_M_COST: u32 = 19_456;

/// Argon2id iterations for newly sealed keystores.
pub const KEYSTORE_ARGON2_T_COST: u32 = 2;

/// Argon2id lanes for newly sealed keystores.
pub const KEYSTORE_ARGON2_P_COST: u32 = 1;

// ---------------------------------------------------------------------------
// Receipt Identifiers
// ---------------------------------------------------------------------------

/// Human-readable prefix of receipt identifiers.
pub const RECEIPT_IDENTIFIER_HRP: &str = "stc";

/// Receipt identifier format version, encoded as the first bech32 symbol.
pub const RECEIPT_IDENTIFIER_VERSION: u8 = 1;

// ---------------------------------------------------------------------------
// Gas & Expiry Defaults
// ---------------------------------------------------------------------------

/// Default gas limit for a user transaction.
pub const DEFAULT_MAX_GAS_AMOUNT: u64 = 10_000_000;

/// Default gas unit price.
pub const DEFAULT_GAS_UNIT_PRICE: u64 = 1;

/// Token used to pay for gas unless the request says otherwise.
pub const DEFAULT_GAS_TOKEN_CODE: &str = "0x1::STC::STC";

/// Transactions expire this many seconds after the node's current time.
pub const DEFAULT_EXPIRATION_TTL_SECS: u64 = 43_200;

// ---------------------------------------------------------------------------
// Confirmation Timing
// ---------------------------------------------------------------------------

/// Interval between confirmation polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound accepted for a configured poll interval.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default wait when a caller does not pass an explicit timeout.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

// ---------------------------------------------------------------------------
// ProviderConfig
// ---------------------------------------------------------------------------

/// Runtime configuration for signers and pending transactions.
///
/// Every field has a default, so a partial JSON document (or none at all)
/// is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Gas limit used when a request does not set one.
    pub max_gas_amount: u64,

    /// Gas unit price used when a request does not set one.
    pub gas_unit_price: u64,

    /// Gas token code used when a request does not set one.
    pub gas_token_code: String,

    /// Seconds added to the node clock to form the expiration timestamp.
    pub expiration_ttl_secs: u64,

    /// Confirmation poll interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Default confirmation timeout in seconds.
    pub confirmation_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            max_gas_amount: DEFAULT_MAX_GAS_AMOUNT,
            gas_unit_price: DEFAULT_GAS_UNIT_PRICE,
            gas_token_code: DEFAULT_GAS_TOKEN_CODE.to_string(),
            expiration_ttl_secs: DEFAULT_EXPIRATION_TTL_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            confirmation_timeout_secs: DEFAULT_CONFIRMATION_TIMEOUT.as_secs(),
        }
    }
}

impl ProviderConfig {
    /// Poll interval, clamped to `[1ms, MAX_POLL_INTERVAL]`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1)).min(MAX_POLL_INTERVAL)
    }

    /// Default confirmation timeout.
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Returns a friendly name for a chain id, mainly for logging.
pub fn network_name(chain_id: u8) -> String {
    match chain_id {
        CHAIN_ID_MAIN => "main".to_string(),
        CHAIN_ID_BARNARD => "barnard".to_string(),
        CHAIN_ID_PROXIMA => "proxima".to_string(),
        CHAIN_ID_HALLEY => "halley".to_string(),
        CHAIN_ID_DEV => "dev".to_string(),
        CHAIN_ID_TEST => "test".to_string(),
        other => format!("custom({})", other),
    }
}

/// Resolves a network name back to its chain id.
pub fn chain_id_for_network(name: &str) -> Option<u8> {
    match name.to_ascii_lowercase().as_str() {
        "main" | "mainnet" => Some(CHAIN_ID_MAIN),
        "barnard" => Some(CHAIN_ID_BARNARD),
        "proxima" => Some(CHAIN_ID_PROXIMA),
        "halley" => Some(CHAIN_ID_HALLEY),
        "dev" => Some(CHAIN_ID_DEV),
        "test" => Some(CHAIN_ID_TEST),
        _ => None,
    }
}
