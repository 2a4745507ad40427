// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! 16-byte account addresses.

use std::fmt;
use std::str::FromStr;

use super::{impl_serde_via_str, ParseError};
use crate::bcs::{BcsDeserialize, BcsDeserializer, BcsError, BcsSerialize, BcsSerializer};
use crate::config::ADDRESS_LENGTH;

/// An on-chain account address.
///
/// Parses from `0x`-prefixed or bare hex. Short forms such as `0x1` are
/// left-padded with zeros. Always prints the full 32 hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AccountAddress([u8; ADDRESS_LENGTH]);

impl AccountAddress {
    /// `0x0`.
    pub const ZERO: Self = Self([0u8; ADDRESS_LENGTH]);

    /// `0x1`, where the framework modules live.
    pub const ONE: Self = Self::from_u8(1);

    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    const fn from_u8(last: u8) -> Self {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[ADDRESS_LENGTH - 1] = last;
        Self(bytes)
    }

    pub fn try_from_slice(slice: &[u8]) -> Result<Self, ParseError> {
        let bytes: [u8; ADDRESS_LENGTH] = slice.try_into().map_err(|_| {
            ParseError::InvalidAddress(format!(
                "expected {} bytes, got {}",
                ADDRESS_LENGTH,
                slice.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Parses hex with an optional `0x` prefix. Up to 32 digits.
    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.is_empty() || digits.len() > ADDRESS_LENGTH * 2 {
            return Err(ParseError::InvalidAddress(s.to_string()));
        }
        let padded = format!("{:0>width$}", digits, width = ADDRESS_LENGTH * 2);
        let bytes = hex::decode(&padded).map_err(|_| ParseError::InvalidAddress(s.to_string()))?;
        Self::try_from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// 32 lowercase hex digits, no prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountAddress(0x{})", self.to_hex())
    }
}

impl FromStr for AccountAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s.trim())
    }
}

impl From<[u8; ADDRESS_LENGTH]> for AccountAddress {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl_serde_via_str!(AccountAddress);

impl BcsSerialize for AccountAddress {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        se.serialize_fixed_bytes(&self.0);
        Ok(())
    }
}

impl BcsDeserialize for AccountAddress {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        de.deserialize_fixed_bytes().map(Self)
    }
}
