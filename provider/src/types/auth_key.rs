// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Authentication keys and address derivation.
//!
//! An account's authentication key is `sha3_256(public_key ‖ scheme)`. The
//! account address is the last 16 bytes of that digest, so the address of
//! a fresh key is known before the account exists on chain.

use std::fmt;
use std::str::FromStr;

use super::{impl_serde_via_str, AccountAddress, ParseError};
use crate::config::{ADDRESS_LENGTH, AUTH_KEY_LENGTH};
use crate::crypto::hash::sha3_256;
use crate::crypto::keys::AccountPublicKey;

/// Signature scheme byte appended to the public key before hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SignatureScheme {
    Ed25519 = 0,
    MultiEd25519 = 1,
}

/// A 32-byte authentication key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthenticationKey([u8; AUTH_KEY_LENGTH]);

impl AuthenticationKey {
    pub const fn new(bytes: [u8; AUTH_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// The authentication key of a single Ed25519 public key.
    pub fn ed25519(public_key: &AccountPublicKey) -> Self {
        Self::from_preimage(public_key.as_bytes(), SignatureScheme::Ed25519)
    }

    /// `sha3_256(key_bytes ‖ scheme)`.
    pub fn from_preimage(key_bytes: &[u8], scheme: SignatureScheme) -> Self {
        let mut preimage = Vec::with_capacity(key_bytes.len() + 1);
        preimage.extend_from_slice(key_bytes);
        preimage.push(scheme as u8);
        Self(sha3_256(&preimage))
    }

    /// The account address this key controls at creation.
    pub fn derived_address(&self) -> AccountAddress {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&self.0[AUTH_KEY_LENGTH - ADDRESS_LENGTH..]);
        AccountAddress::new(bytes)
    }

    pub fn try_from_slice(slice: &[u8]) -> Result<Self, ParseError> {
        let bytes: [u8; AUTH_KEY_LENGTH] = slice.try_into().map_err(|_| {
            ParseError::InvalidAuthKey(format!(
                "expected {} bytes, got {}",
                AUTH_KEY_LENGTH,
                slice.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| ParseError::InvalidAuthKey(s.to_string()))?;
        Self::try_from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; AUTH_KEY_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for AuthenticationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for AuthenticationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthenticationKey(0x{})", self.to_hex())
    }
}

impl FromStr for AuthenticationKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s.trim())
    }
}

impl_serde_via_str!(AuthenticationKey);

impl AccountAddress {
    /// Address derived from an Ed25519 public key.
    pub fn from_public_key(public_key: &AccountPublicKey) -> Self {
        AuthenticationKey::ed25519(public_key).derived_address()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 8032 TEST 1 public key.
    const PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

    #[test]
    fn ed25519_auth_key_is_sha3_of_key_and_scheme() {
        let pk = AccountPublicKey::from_hex(PUBLIC).unwrap();
        let mut preimage = hex::decode(PUBLIC).unwrap();
        preimage.push(0);
        assert_eq!(AuthenticationKey::ed25519(&pk).as_bytes(), &sha3_256(&preimage));
    }

    #[test]
    fn derived_address_is_the_last_sixteen_bytes() {
        let key = AuthenticationKey::new(core::array::from_fn(|i| i as u8));
        assert_eq!(
            key.derived_address().to_hex(),
            "101112131415161718191a1b1c1d1e1f"
        );
    }

    #[test]
    fn schemes_give_different_keys() {
        let bytes = [7u8; 32];
        assert_ne!(
            AuthenticationKey::from_preimage(&bytes, SignatureScheme::Ed25519),
            AuthenticationKey::from_preimage(&bytes, SignatureScheme::MultiEd25519)
        );
    }

    #[test]
    fn address_from_public_key_matches_auth_key() {
        let pk = AccountPublicKey::from_hex(PUBLIC).unwrap();
        assert_eq!(
            AccountAddress::from_public_key(&pk),
            AuthenticationKey::ed25519(&pk).derived_address()
        );
    }

    #[test]
    fn hex_parsing() {
        let key = AuthenticationKey::new([0xab; 32]);
        assert_eq!(key.to_string().parse::<AuthenticationKey>().unwrap(), key);
        assert!("0xabcd".parse::<AuthenticationKey>().is_err());
        assert!("0xzz".parse::<AuthenticationKey>().is_err());
    }
}
