// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Receipt Identifiers
//!
//! A shareable string that tells a sender everything needed to pay an
//! account, including one that does not exist on chain yet.
//!
//! ## Format
//!
//! ```text
//! stc 1 p <data> <checksum>
//! │   │ │   │       └── 6 symbols, BIP-173 bech32 checksum
//! │   │ │   └── address ‖ auth_key?, 8-to-5 bit regrouped (16 or 48 bytes)
//! │   │ └── version symbol (1)
//! │   └── separator
//! └── human-readable part
//! ```
//!
//! Decoding checks the checksum first, then the prefix, the version, and
//! the payload length. Nothing is extracted from a string that fails any of
//! them.

use std::fmt;
use std::str::FromStr;

use bech32::primitives::decode::CheckedHrpstring;
use bech32::primitives::iter::{ByteIterExt, Fe32IterExt};
use bech32::{Bech32, Fe32, Hrp};
use thiserror::Error;

use crate::config::{
    ADDRESS_LENGTH, AUTH_KEY_LENGTH, RECEIPT_IDENTIFIER_HRP, RECEIPT_IDENTIFIER_VERSION,
};
use crate::types::{AccountAddress, AuthenticationKey};

/// Errors from decoding a receipt identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReceiptIdentifierError {
    #[error("invalid bech32 string: {0}")]
    Bech32(String),

    #[error("wrong prefix: expected {RECEIPT_IDENTIFIER_HRP:?}, got {0:?}")]
    WrongPrefix(String),

    #[error("missing version symbol")]
    MissingVersion,

    #[error("unsupported receipt identifier version {0}")]
    UnsupportedVersion(u8),

    #[error("invalid payload length {0}: expected 16 or 48 bytes")]
    InvalidLength(usize),
}

/// An account address with an optional authentication key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReceiptIdentifier {
    pub address: AccountAddress,
    pub auth_key: Option<AuthenticationKey>,
}

impl ReceiptIdentifier {
    pub fn new(address: AccountAddress, auth_key: Option<AuthenticationKey>) -> Self {
        Self { address, auth_key }
    }

    /// Encodes to the `stc1p…` string form.
    pub fn encode(&self) -> String {
        let mut payload = Vec::with_capacity(ADDRESS_LENGTH + AUTH_KEY_LENGTH);
        payload.extend_from_slice(self.address.as_bytes());
        if let Some(key) = &self.auth_key {
            payload.extend_from_slice(key.as_bytes());
        }

        let hrp = receipt_hrp();
        std::iter::once(version_symbol())
            .chain(payload.iter().copied().bytes_to_fes())
            .with_checksum::<Bech32>(&hrp)
            .chars()
            .collect()
    }

    /// Decodes and validates a receipt identifier string.
    pub fn decode(s: &str) -> Result<Self, ReceiptIdentifierError> {
        let mut checked = CheckedHrpstring::new::<Bech32>(s)
            .map_err(|e| ReceiptIdentifierError::Bech32(e.to_string()))?;

        let hrp = checked.hrp();
        if !hrp.as_str().eq_ignore_ascii_case(RECEIPT_IDENTIFIER_HRP) {
            return Err(ReceiptIdentifierError::WrongPrefix(hrp.to_string()));
        }

        let version = checked
            .remove_witness_version()
            .ok_or(ReceiptIdentifierError::MissingVersion)?;
        if version != version_symbol() {
            return Err(ReceiptIdentifierError::UnsupportedVersion(version.to_u8()));
        }

        let payload: Vec<u8> = checked.byte_iter().collect();
        let (address, auth_key) = match payload.len() {
            ADDRESS_LENGTH => (&payload[..], None),
            len if len == ADDRESS_LENGTH + AUTH_KEY_LENGTH => {
                let (address, key) = payload.split_at(ADDRESS_LENGTH);
                (address, Some(key))
            }
            other => return Err(ReceiptIdentifierError::InvalidLength(other)),
        };

        let address = AccountAddress::try_from_slice(address)
            .map_err(|_| ReceiptIdentifierError::InvalidLength(payload.len()))?;
        let auth_key = auth_key
            .map(AuthenticationKey::try_from_slice)
            .transpose()
            .map_err(|_| ReceiptIdentifierError::InvalidLength(payload.len()))?;

        Ok(Self { address, auth_key })
    }

    /// True if `s` carries the receipt identifier prefix, without
    /// validating the rest.
    pub fn looks_like(s: &str) -> bool {
        let s = s.trim();
        s.len() > RECEIPT_IDENTIFIER_HRP.len()
            && s.is_char_boundary(RECEIPT_IDENTIFIER_HRP.len() + 1)
            && s[..RECEIPT_IDENTIFIER_HRP.len() + 1]
                .eq_ignore_ascii_case(&format!("{}1", RECEIPT_IDENTIFIER_HRP))
    }
}

fn receipt_hrp() -> Hrp {
    Hrp::parse_unchecked(RECEIPT_IDENTIFIER_HRP)
}

fn version_symbol() -> Fe32 {
    // RECEIPT_IDENTIFIER_VERSION is 1, well inside the 5-bit range.
    Fe32::try_from(RECEIPT_IDENTIFIER_VERSION).unwrap_or(Fe32::P)
}

impl fmt::Display for ReceiptIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for ReceiptIdentifier {
    type Err = ReceiptIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "0xb6d69dd935edf7f2054acf12eb884df8";
    const ADDRESS_ONLY: &str = "stc1pkmtfmkf4ahmlyp22eufwhzzdlqz02tam";

    // Auth key of the RFC 8032 TEST 1 public key, with its derived address.
    const AUTH_KEY: &str = "63c5215e87770d17b9f4cd47c777e322f4eb152cfd2054c1080fd9d57c48913b";
    const WITH_AUTH_KEY: &str = "stc1p7n432t8ayp2vzzq0m82hcjy38d3u2g27sams69ae7nx503mhuv30f6c49n7jq4xppq8an4tufzgnkr54zge";

    #[test]
    fn encodes_address_only() {
        let id = ReceiptIdentifier::new(ADDRESS.parse().unwrap(), None);
        assert_eq!(id.encode(), ADDRESS_ONLY);
        assert_eq!(id.to_string(), ADDRESS_ONLY);
    }

    #[test]
    fn encodes_with_auth_key() {
        let key: AuthenticationKey = AUTH_KEY.parse().unwrap();
        let id = ReceiptIdentifier::new(key.derived_address(), Some(key));
        assert_eq!(id.encode(), WITH_AUTH_KEY);
    }

    #[test]
    fn decode_roundtrip() {
        let id: ReceiptIdentifier = ADDRESS_ONLY.parse().unwrap();
        assert_eq!(id.address, ADDRESS.parse().unwrap());
        assert!(id.auth_key.is_none());

        let id: ReceiptIdentifier = WITH_AUTH_KEY.parse().unwrap();
        assert_eq!(id.auth_key.unwrap().to_hex(), AUTH_KEY);
        assert_eq!(id.encode(), WITH_AUTH_KEY);
    }

    #[test]
    fn uppercase_is_accepted() {
        let id: ReceiptIdentifier = ADDRESS_ONLY.to_uppercase().parse().unwrap();
        assert_eq!(id.address, ADDRESS.parse().unwrap());
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let mut chars: Vec<char> = ADDRESS_ONLY.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == 'q' { 'p' } else { 'q' };
        let corrupted: String = chars.into_iter().collect();
        assert!(matches!(
            corrupted.parse::<ReceiptIdentifier>(),
            Err(ReceiptIdentifierError::Bech32(_))
        ));
    }

    #[test]
    fn corrupted_data_symbol_is_rejected() {
        let corrupted = ADDRESS_ONLY.replacen("kmtf", "kmtg", 1);
        assert!(corrupted.parse::<ReceiptIdentifier>().is_err());
    }

    #[test]
    fn wrong_prefix_is_rejected() {
        let hrp = Hrp::parse_unchecked("bc");
        let other: String = std::iter::once(Fe32::P)
            .chain([0u8; 16].iter().copied().bytes_to_fes())
            .with_checksum::<Bech32>(&hrp)
            .chars()
            .collect();
        assert!(matches!(
            other.parse::<ReceiptIdentifier>(),
            Err(ReceiptIdentifierError::WrongPrefix(_))
        ));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let hrp = receipt_hrp();
        let v0: String = std::iter::once(Fe32::Q)
            .chain([0u8; 16].iter().copied().bytes_to_fes())
            .with_checksum::<Bech32>(&hrp)
            .chars()
            .collect();
        assert_eq!(
            v0.parse::<ReceiptIdentifier>(),
            Err(ReceiptIdentifierError::UnsupportedVersion(0))
        );
    }

    #[test]
    fn wrong_length_is_rejected() {
        let hrp = receipt_hrp();
        let short: String = std::iter::once(Fe32::P)
            .chain([7u8; 20].iter().copied().bytes_to_fes())
            .with_checksum::<Bech32>(&hrp)
            .chars()
            .collect();
        assert_eq!(
            short.parse::<ReceiptIdentifier>(),
            Err(ReceiptIdentifierError::InvalidLength(20))
        );
    }

    #[test]
    fn looks_like_checks_prefix_only() {
        assert!(ReceiptIdentifier::looks_like(ADDRESS_ONLY));
        assert!(ReceiptIdentifier::looks_like("STC1PXYZ"));
        assert!(!ReceiptIdentifier::looks_like("0x1"));
        assert!(!ReceiptIdentifier::looks_like("stc"));
    }
}
