// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Password-sealed account keys.
//!
//! A [`Keystore`] holds one Ed25519 secret key sealed with AES-256-GCM
//! under an Argon2id key derived from the account password. The account address is
//! the AAD, so a sealed key cannot be moved to another account record
//! without failing to open. The public half stays in the clear for
//! address display and dry runs.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::config::KEYSTORE_SALT_LENGTH;
use crate::crypto::encryption::{self, EncryptionError, KdfParams};
use crate::crypto::keys::{AccountKeypair, AccountPublicKey};
use crate::types::AccountAddress;

/// Current keystore layout. Version 2 switched the KDF to Argon2id.
const KEYSTORE_VERSION: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeystoreError {
    /// Wrong password, or the sealed key was altered.
    #[error("keystore could not be opened")]
    BadPassword,

    #[error("keystore sealing failed: {0}")]
    Encryption(#[from] EncryptionError),

    #[error("malformed keystore: {0}")]
    Malformed(String),

    #[error("unsupported keystore version {0}")]
    UnsupportedVersion(u8),
}

/// A sealed account key. Serializes to JSON for storage.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keystore {
    version: u8,
    address: AccountAddress,
    public_key: AccountPublicKey,
    kdf: KdfParams,
    /// Hex KDF salt.
    salt: String,
    /// Hex of `nonce ‖ ciphertext ‖ tag`.
    sealed_key: String,
}

impl Keystore {
    /// Seals `keypair` under `password` with a fresh salt and the default
    /// Argon2id cost.
    pub fn encrypt(keypair: &AccountKeypair, password: &str) -> Result<Self, KeystoreError> {
        Self::encrypt_with_params(keypair, password, KdfParams::default())
    }

    pub fn encrypt_with_params(
        keypair: &AccountKeypair,
        password: &str,
        kdf: KdfParams,
    ) -> Result<Self, KeystoreError> {
        let public_key = keypair.public_key();
        let address = AccountAddress::from_public_key(&public_key);

        let mut salt = [0u8; KEYSTORE_SALT_LENGTH];
        rand::rngs::OsRng.fill_bytes(&mut salt);
        let key = encryption::derive_key(password, &salt, &kdf)?;
        let secret = Zeroizing::new(keypair.to_bytes());
        let sealed = encryption::seal(&key, &secret[..], address.as_bytes())?;

        Ok(Self {
            version: KEYSTORE_VERSION,
            address,
            public_key,
            kdf,
            salt: hex::encode(salt),
            sealed_key: hex::encode(sealed),
        })
    }

    /// Recovers the keypair.
    pub fn decrypt(&self, password: &str) -> Result<AccountKeypair, KeystoreError> {
        if self.version != KEYSTORE_VERSION {
            return Err(KeystoreError::UnsupportedVersion(self.version));
        }
        let salt = hex::decode(&self.salt).map_err(|e| KeystoreError::Malformed(e.to_string()))?;
        let sealed =
            hex::decode(&self.sealed_key).map_err(|e| KeystoreError::Malformed(e.to_string()))?;

        let key = encryption::derive_key(password, &salt, &self.kdf)?;
        let opened = match encryption::open(&key, &sealed, self.address.as_bytes()) {
            Ok(secret) => Zeroizing::new(secret),
            Err(EncryptionError::DecryptFailed) => return Err(KeystoreError::BadPassword),
            Err(other) => return Err(other.into()),
        };
        if opened.len() != 32 {
            return Err(KeystoreError::Malformed(format!(
                "secret key is {} bytes",
                opened.len()
            )));
        }
        let mut secret = Zeroizing::new([0u8; 32]);
        secret.copy_from_slice(&opened);

        let keypair = AccountKeypair::from_bytes(&secret);
        if keypair.public_key() != self.public_key {
            return Err(KeystoreError::Malformed(
                "sealed key does not match the stored public key".to_string(),
            ));
        }
        Ok(keypair)
    }

    pub fn address(&self) -> AccountAddress {
        self.address
    }

    pub fn public_key(&self) -> AccountPublicKey {
        self.public_key
    }

    pub fn kdf_params(&self) -> KdfParams {
        self.kdf
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl fmt::Debug for Keystore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keystore")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}
