// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Account Keys
//!
//! Ed25519 keypairs for account signing.
//!
//! Ed25519 signatures are deterministic: the same key and message always
//! give the same 64 bytes. The golden-value transaction tests depend on
//! that property.
//!
//! Key bytes are never logged and `Debug` prints only the public half.

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::{PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

/// Errors that can occur during key operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid private key bytes: expected {SECRET_KEY_LENGTH} bytes of hex")]
    InvalidPrivateKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,

    #[error("invalid signature bytes: expected {SIGNATURE_LENGTH} bytes")]
    InvalidSignature,
}

/// Strips an optional `0x` prefix and hex-decodes.
fn decode_hex(s: &str) -> Option<Vec<u8>> {
    hex::decode(s.trim().strip_prefix("0x").unwrap_or(s.trim())).ok()
}

// ---------------------------------------------------------------------------
// AccountKeypair
// ---------------------------------------------------------------------------

/// An Ed25519 account keypair.
///
/// Does not implement `Serialize`. Exporting a private key goes through
/// [`to_bytes`](Self::to_bytes) or the keystore.
pub struct AccountKeypair {
    signing_key: SigningKey,
}

impl AccountKeypair {
    /// Generates a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Builds a keypair from a 32-byte private key.
    pub fn from_bytes(secret: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(secret),
        }
    }

    /// Builds a keypair from a hex private key, `0x` prefix optional.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = decode_hex(hex_str).ok_or(KeyError::InvalidPrivateKey)?;
        let arr: [u8; SECRET_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_bytes(&arr))
    }

    pub fn public_key(&self) -> AccountPublicKey {
        AccountPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Signs `message` as-is. Callers are responsible for any domain prefix.
    pub fn sign(&self, message: &[u8]) -> AccountSignature {
        AccountSignature {
            bytes: self.signing_key.sign(message).to_bytes(),
        }
    }

    pub fn verify(&self, message: &[u8], signature: &AccountSignature) -> bool {
        self.public_key().verify(message, signature)
    }

    /// Exports the raw private key.
    pub fn to_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.signing_key.to_bytes()
    }
}

impl Clone for AccountKeypair {
    fn clone(&self) -> Self {
        Self::from_bytes(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for AccountKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountKeypair(pub={})", self.public_key().to_hex())
    }
}

impl PartialEq for AccountKeypair {
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for AccountKeypair {}

// ---------------------------------------------------------------------------
// AccountPublicKey
// ---------------------------------------------------------------------------

/// The public half of an account key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountPublicKey {
    bytes: [u8; PUBLIC_KEY_LENGTH],
}

impl AccountPublicKey {
    /// Validates that the bytes are a point on the curve.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] =
            slice.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = decode_hex(hex_str).ok_or(KeyError::InvalidPublicKey)?;
        Self::try_from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.bytes
    }

    pub fn verify(&self, message: &[u8], signature: &AccountSignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig = DalekSignature::from_bytes(&signature.bytes);
        verifying_key.verify(message, &sig).is_ok()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Debug for AccountPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountPublicKey({})", self.to_hex())
    }
}

impl fmt::Display for AccountPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// AccountSignature
// ---------------------------------------------------------------------------

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AccountSignature {
    bytes: [u8; SIGNATURE_LENGTH],
}

impl AccountSignature {
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; SIGNATURE_LENGTH] =
            slice.try_into().map_err(|_| KeyError::InvalidSignature)?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Debug for AccountSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountSignature({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 8032 section 7.1, TEST 1.
    const RFC_SECRET: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const RFC_PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
    const RFC_SIG_EMPTY: &str = "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155\
                                 5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b";

    #[test]
    fn rfc8032_vector() {
        let kp = AccountKeypair::from_hex(RFC_SECRET).unwrap();
        assert_eq!(kp.public_key().to_hex(), RFC_PUBLIC);
        assert_eq!(kp.sign(b"").to_hex(), RFC_SIG_EMPTY);
    }

    #[test]
    fn from_hex_accepts_prefix() {
        let a = AccountKeypair::from_hex(RFC_SECRET).unwrap();
        let b = AccountKeypair::from_hex(&format!("0x{}", RFC_SECRET)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn from_hex_rejects_bad_length() {
        assert_eq!(
            AccountKeypair::from_hex("abcd").unwrap_err(),
            KeyError::InvalidPrivateKey
        );
        assert_eq!(
            AccountKeypair::from_hex("not hex").unwrap_err(),
            KeyError::InvalidPrivateKey
        );
    }

    #[test]
    fn sign_and_verify() {
        let kp = AccountKeypair::generate();
        let sig = kp.sign(b"hello");
        assert!(kp.verify(b"hello", &sig));
        assert!(!kp.verify(b"hellp", &sig));
        assert!(!AccountKeypair::generate().verify(b"hello", &sig));
    }

    #[test]
    fn signatures_are_deterministic() {
        let kp = AccountKeypair::generate();
        assert_eq!(kp.sign(b"same"), kp.sign(b"same"));
    }

    #[test]
    fn clone_keeps_key() {
        let kp = AccountKeypair::generate();
        assert_eq!(kp.clone().to_bytes(), kp.to_bytes());
    }

    #[test]
    fn debug_hides_secret() {
        let kp = AccountKeypair::from_hex(RFC_SECRET).unwrap();
        let dbg = format!("{:?}", kp);
        assert!(!dbg.contains(RFC_SECRET));
        assert!(dbg.contains(RFC_PUBLIC));
    }

    #[test]
    fn public_key_parsing() {
        let pk = AccountPublicKey::from_hex(&format!("0x{}", RFC_PUBLIC)).unwrap();
        assert_eq!(pk.to_hex(), RFC_PUBLIC);
        assert!(AccountPublicKey::try_from_slice(&[0u8; 31]).is_err());
    }

    #[test]
    fn signature_length_is_checked() {
        assert!(AccountSignature::try_from_slice(&[0u8; 64]).is_ok());
        assert_eq!(
            AccountSignature::try_from_slice(&[0u8; 63]).unwrap_err(),
            KeyError::InvalidSignature
        );
    }
}
