// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # AES-256-GCM Sealing
//!
//! Authenticated encryption for the signer keystore. The only secret this
//! crate ever encrypts is an Ed25519 private key, sealed under a key
//! derived from the account password.
//!
//! ## Key derivation
//!
//! Argon2id over the password with a random per-keystore salt. The salt
//! and the cost parameters are stored in the clear next to the ciphertext,
//! so a keystore opens with the parameters it was sealed with. Derived
//! keys are wiped on drop.
//!
//! ## Wire format
//!
//! [`seal`] returns `nonce ‖ ciphertext ‖ tag`. The first 12 bytes are a
//! random nonce; [`open`] expects the same layout. The caller's AAD (the
//! account address, for the keystore) is authenticated but not stored.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::config::{
    AES_KEY_LENGTH, AES_NONCE_LENGTH, KEYSTORE_ARGON2_M_COST, KEYSTORE_ARGON2_P_COST,
    KEYSTORE_ARGON2_T_COST,
};

/// Errors from sealing or opening.
///
/// Opening never says whether the key or the ciphertext was wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncryptionError {
    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,

    #[error("ciphertext too short: must be at least {AES_NONCE_LENGTH} bytes")]
    CiphertextTooShort,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory in KiB.
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: KEYSTORE_ARGON2_M_COST,
            t_cost: KEYSTORE_ARGON2_T_COST,
            p_cost: KEYSTORE_ARGON2_P_COST,
        }
    }
}

/// Derives a 256-bit sealing key from a password and salt with Argon2id.
pub fn derive_key(
    password: &str,
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; AES_KEY_LENGTH]>, EncryptionError> {
    let params = Params::new(params.m_cost, params.t_cost, params.p_cost, Some(AES_KEY_LENGTH))
        .map_err(|e| EncryptionError::KeyDerivation(e.to_string()))?;
    let mut key = Zeroizing::new([0u8; AES_KEY_LENGTH]);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(password.as_bytes(), salt, &mut key[..])
        .map_err(|e| EncryptionError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// Encrypts `plaintext` under `key` with a fresh random nonce, binding `aad`.
pub fn seal(
    key: &[u8; AES_KEY_LENGTH],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::EncryptFailed)?;

    let mut nonce_bytes = [0u8; AES_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| EncryptionError::EncryptFailed)?;

    let mut out = Vec::with_capacity(AES_NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Opens data produced by [`seal`]. The `aad` must match.
pub fn open(
    key: &[u8; AES_KEY_LENGTH],
    sealed: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    if sealed.len() < AES_NONCE_LENGTH {
        return Err(EncryptionError::CiphertextTooShort);
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(AES_NONCE_LENGTH);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::DecryptFailed)?;

    cipher
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| EncryptionError::DecryptFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        key
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let key = test_key();
        let sealed = seal(&key, b"private key bytes", b"0x1").unwrap();
        assert_eq!(open(&key, &sealed, b"0x1").unwrap(), b"private key bytes");
    }

    #[test]
    fn test_sealed_length() {
        let key = test_key();
        let sealed = seal(&key, &[0u8; 32], b"").unwrap();
        // nonce + plaintext + GCM tag
        assert_eq!(sealed.len(), AES_NONCE_LENGTH + 32 + 16);
    }

    #[test]
    fn test_wrong_key_fails() {
        let key = test_key();
        let sealed = seal(&key, b"secret", b"").unwrap();
        let mut wrong = test_key();
        wrong[0] ^= 0xff;
        assert_eq!(open(&wrong, &sealed, b""), Err(EncryptionError::DecryptFailed));
    }

    #[test]
    fn test_wrong_aad_fails() {
        let key = test_key();
        let sealed = seal(&key, b"secret", b"account-a").unwrap();
        assert!(open(&key, &sealed, b"account-b").is_err());
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = test_key();
        let mut sealed = seal(&key, b"secret", b"").unwrap();
        sealed[AES_NONCE_LENGTH] ^= 0x01;
        assert!(open(&key, &sealed, b"").is_err());
    }

    #[test]
    fn test_too_short() {
        assert_eq!(
            open(&test_key(), &[0u8; 4], b""),
            Err(EncryptionError::CiphertextTooShort)
        );
    }

    #[test]
    fn test_nonces_are_fresh() {
        let key = test_key();
        let a = seal(&key, b"m", b"").unwrap();
        let b = seal(&key, b"m", b"").unwrap();
        assert_ne!(&a[..AES_NONCE_LENGTH], &b[..AES_NONCE_LENGTH]);
    }

    const LIGHT: KdfParams = KdfParams {
        m_cost: 256,
        t_cost: 1,
        p_cost: 1,
    };

    #[test]
    fn test_derive_key_depends_on_salt_password_and_cost() {
        let a = derive_key("hunter2", b"salt-one", &LIGHT).unwrap();
        assert_eq!(*a, *derive_key("hunter2", b"salt-one", &LIGHT).unwrap());
        assert_ne!(*a, *derive_key("hunter3", b"salt-one", &LIGHT).unwrap());
        assert_ne!(*a, *derive_key("hunter2", b"salt-two", &LIGHT).unwrap());

        let slower = KdfParams { t_cost: 2, ..LIGHT };
        assert_ne!(*a, *derive_key("hunter2", b"salt-one", &slower).unwrap());
    }

    #[test]
    fn test_default_cost_is_argon2_default() {
        let params = KdfParams::default();
        assert_eq!(params.m_cost, Params::DEFAULT_M_COST);
        assert_eq!(params.t_cost, Params::DEFAULT_T_COST);
        assert_eq!(params.p_cost, Params::DEFAULT_P_COST);
    }

    #[test]
    fn test_invalid_cost_is_an_error() {
        let broken = KdfParams { m_cost: 0, ..LIGHT };
        assert!(matches!(
            derive_key("pw", b"salt-one", &broken),
            Err(EncryptionError::KeyDerivation(_))
        ));
        // Argon2 requires at least 8 bytes of salt.
        assert!(derive_key("pw", b"short", &LIGHT).is_err());
    }
}
