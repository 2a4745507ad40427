// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Hashing
//!
//! SHA3-256 digests and the salted "crypto hash" the node uses for
//! transaction hashes and signing messages.
//!
//! A salted hash of a value of type `T` is
//!
//! ```text
//! sha3_256( sha3_256("STARCOIN::" ‖ T) ‖ bcs(value) )
//! ```
//!
//! and a signing message is the same construction without the outer hash.
//! The inner digest is the *salt prefix*; each type gets its own, which is
//! what keeps a signed message from ever verifying as a signed transaction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Sha3_256};
use thiserror::Error;

use crate::config::{HASH_LENGTH, HASH_SALT_PREFIX};

/// Errors from parsing a hash string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashParseError {
    #[error("invalid hex in hash: {0}")]
    InvalidHex(String),

    #[error("invalid hash length: expected {HASH_LENGTH} bytes, got {0}")]
    InvalidLength(usize),
}

/// A 32-byte SHA3-256 digest.
///
/// Displays and serializes as `0x`-prefixed lowercase hex, which is how the
/// node's JSON-RPC API spells hashes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct HashValue([u8; HASH_LENGTH]);

impl HashValue {
    pub const fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Hashes arbitrary bytes with SHA3-256.
    pub fn sha3_256_of(data: &[u8]) -> Self {
        Self(sha3_256(data))
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// `0x`-prefixed hex.
    pub fn to_hex_literal(&self) -> String {
        format!("0x{}", self.to_hex())
    }

    pub fn from_hex(s: &str) -> Result<Self, HashParseError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| HashParseError::InvalidHex(e.to_string()))?;
        let arr: [u8; HASH_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| HashParseError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashValue(0x{})", self.to_hex())
    }
}

impl FromStr for HashValue {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for HashValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_literal())
    }
}

impl<'de> Deserialize<'de> for HashValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// SHA3-256 of `data`.
pub fn sha3_256(data: &[u8]) -> [u8; HASH_LENGTH] {
    Sha3_256::digest(data).into()
}

/// Salt prefix for a type: `sha3_256("STARCOIN::" ‖ type_name)`.
pub fn salt_prefix(type_name: &str) -> [u8; HASH_LENGTH] {
    let mut hasher = Sha3_256::new();
    hasher.update(HASH_SALT_PREFIX.as_bytes());
    hasher.update(type_name.as_bytes());
    hasher.finalize().into()
}

/// Salt prefix followed by the already-encoded value. This is the exact
/// byte string that gets signed.
pub fn salted_message(type_name: &str, encoded: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(HASH_LENGTH + encoded.len());
    message.extend_from_slice(&salt_prefix(type_name));
    message.extend_from_slice(encoded);
    message
}

/// Salted crypto hash of an already-encoded value.
pub fn crypto_hash(type_name: &str, encoded: &[u8]) -> HashValue {
    let mut hasher = Sha3_256::new();
    hasher.update(salt_prefix(type_name));
    hasher.update(encoded);
    HashValue(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha3_256_empty_vector() {
        // NIST test vector for the empty string.
        assert_eq!(
            hex::encode(sha3_256(b"")),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn salt_prefix_is_hash_of_tagged_name() {
        assert_eq!(
            salt_prefix("RawUserTransaction"),
            sha3_256(b"STARCOIN::RawUserTransaction")
        );
    }

    #[test]
    fn different_types_get_different_salts() {
        assert_ne!(salt_prefix("RawUserTransaction"), salt_prefix("SigningMessage"));
    }

    #[test]
    fn salted_message_layout() {
        let msg = salted_message("SigningMessage", b"foo");
        assert_eq!(msg.len(), 35);
        assert_eq!(&msg[..32], &salt_prefix("SigningMessage"));
        assert_eq!(&msg[32..], b"foo");
    }

    #[test]
    fn crypto_hash_is_hash_of_salted_message() {
        let encoded = [1u8, 2, 3];
        assert_eq!(
            crypto_hash("SignedUserTransaction", &encoded),
            HashValue::sha3_256_of(&salted_message("SignedUserTransaction", &encoded))
        );
    }

    #[test]
    fn hash_value_hex_roundtrip() {
        let h = HashValue::sha3_256_of(b"starcoin");
        let s = h.to_string();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 66);
        assert_eq!(s.parse::<HashValue>().unwrap(), h);
        assert_eq!(HashValue::from_hex(&h.to_hex()).unwrap(), h);
    }

    #[test]
    fn hash_value_rejects_bad_input() {
        assert!(matches!(
            HashValue::from_hex("0xzz"),
            Err(HashParseError::InvalidHex(_))
        ));
        assert_eq!(
            HashValue::from_hex("0xabcd"),
            Err(HashParseError::InvalidLength(2))
        );
    }

    #[test]
    fn hash_value_serde_is_hex_string() {
        let h = HashValue::new([0xab; 32]);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(32)));
        let back: HashValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }
}
