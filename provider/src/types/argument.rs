// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Transaction Arguments
//!
//! Typed script-function arguments and their literal syntax:
//!
//! ```text
//! 1024u128   255u8   7u64   7        integers (unsuffixed means u64)
//! true  false                        bool
//! 0x1  0xb6d6…                       address
//! x"cafe"                            hex bytes
//! b"hello"                           UTF-8 bytes
//! ```
//!
//! An argument is encoded to its BCS bytes once and from then on travels
//! through the transaction as an opaque byte string.

use std::fmt;
use std::str::FromStr;

use super::{AccountAddress, ParseError};
use crate::bcs::{self, BcsError, BcsSerializer, IntWidth};

/// A script-function argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionArgument {
    U8(u8),
    U64(u64),
    U128(u128),
    Address(AccountAddress),
    U8Vector(Vec<u8>),
    Bool(bool),
}

impl TransactionArgument {
    /// BCS bytes of the inner value, ready to be pushed onto
    /// `ScriptFunction::args`.
    pub fn to_bcs_bytes(&self) -> Result<Vec<u8>, BcsError> {
        match self {
            Self::U8(v) => bcs::to_bytes(v),
            Self::U64(v) => bcs::to_bytes(v),
            Self::U128(v) => bcs::to_bytes(v),
            Self::Address(v) => bcs::to_bytes(v),
            Self::Bool(v) => bcs::to_bytes(v),
            Self::U8Vector(v) => {
                let mut se = BcsSerializer::with_capacity(v.len() + 5);
                se.serialize_bytes(v)?;
                Ok(se.into_bytes())
            }
        }
    }
}

impl From<AccountAddress> for TransactionArgument {
    fn from(address: AccountAddress) -> Self {
        Self::Address(address)
    }
}

impl From<bool> for TransactionArgument {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<u8>> for TransactionArgument {
    fn from(bytes: Vec<u8>) -> Self {
        Self::U8Vector(bytes)
    }
}

impl fmt::Display for TransactionArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8(v) => write!(f, "{}u8", v),
            Self::U64(v) => write!(f, "{}u64", v),
            Self::U128(v) => write!(f, "{}u128", v),
            Self::Address(v) => write!(f, "{}", v),
            Self::U8Vector(v) => write!(f, "x\"{}\"", hex::encode(v)),
            Self::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl FromStr for TransactionArgument {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "true" => return Ok(Self::Bool(true)),
            "false" => return Ok(Self::Bool(false)),
            _ => {}
        }

        if let Some(body) = quoted(s, "x\"") {
            let bytes = hex::decode(body)
                .map_err(|e| ParseError::InvalidArgument(format!("{}: {}", s, e)))?;
            return Ok(Self::U8Vector(bytes));
        }
        if let Some(body) = quoted(s, "b\"") {
            return Ok(Self::U8Vector(body.as_bytes().to_vec()));
        }
        if s.starts_with("0x") {
            return Ok(Self::Address(s.parse()?));
        }
        parse_integer(s)
    }
}

/// Returns the text between `prefix` and a closing `"`.
fn quoted<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    s.strip_prefix(prefix)?.strip_suffix('"')
}

fn parse_integer(s: &str) -> Result<TransactionArgument, ParseError> {
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (digits, suffix) = s.split_at(split);
    if digits.is_empty() {
        return Err(ParseError::InvalidArgument(s.to_string()));
    }

    let width = if suffix.is_empty() {
        IntWidth::U64
    } else {
        IntWidth::from_suffix(suffix).ok_or_else(|| {
            ParseError::InvalidArgument(format!("unsupported integer suffix in {:?}", s))
        })?
    };

    // `digits` is non-empty ASCII, so the only parse failure is a value past
    // u128. That is reported saturated, like any other out-of-width literal.
    let value: u128 = digits.parse().map_err(|_| BcsError::IntegerOverflow {
        value: u128::MAX,
        width,
    })?;
    if value > width.max_value() {
        return Err(BcsError::IntegerOverflow { value, width }.into());
    }

    // Checked above, so the narrowing casts below are exact.
    match width {
        IntWidth::U8 => Ok(TransactionArgument::U8(value as u8)),
        IntWidth::U64 => Ok(TransactionArgument::U64(value as u64)),
        IntWidth::U128 => Ok(TransactionArgument::U128(value)),
        IntWidth::U16 | IntWidth::U32 => Err(ParseError::InvalidArgument(format!(
            "{} arguments are not supported",
            width
        ))),
    }
}
