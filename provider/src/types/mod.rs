// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Transaction Model
//!
//! The typed values that make up a user transaction, each with its exact
//! BCS layout.
//!
//! ## Architecture
//!
//! ```text
//! AccountAddress ─┬─ ModuleId ── FunctionId
//!                 └─ StructTag ── TypeTag (recursive)
//!
//! ScriptFunction { module, function, ty_args, args: Vec<Vec<u8>> }
//!        │
//! TransactionPayload ── RawUserTransaction ── SignedUserTransaction
//!                                                  │
//!                                   TransactionAuthenticator (Ed25519)
//! ```
//!
//! Script arguments are opaque, pre-encoded byte strings. The model never
//! re-encodes them; [`TransactionArgument`] is the helper that produces them
//! from literals such as `1024u128` or `x"cafe"`.
//!
//! Addresses, tags, and function ids parse from and print to the same
//! string forms the node's JSON-RPC API uses.

pub mod account_address;
pub mod argument;
pub mod auth_key;
pub mod chain_id;
pub mod identifier;
pub mod payload;
pub mod raw_transaction;
pub mod signed_transaction;
pub mod type_tag;

use thiserror::Error;

use crate::bcs::BcsError;

pub use account_address::AccountAddress;
pub use argument::TransactionArgument;
pub use auth_key::{AuthenticationKey, SignatureScheme};
pub use chain_id::ChainId;
pub use identifier::{FunctionId, Identifier, ModuleId};
pub use payload::{Module, Package, Script, ScriptFunction, TransactionPayload};
pub use raw_transaction::{RawUserTransaction, RawUserTransactionBuilder};
pub use signed_transaction::{SignedUserTransaction, TransactionAuthenticator};
pub use type_tag::{parse_type_tags, StructTag, TypeTag};

/// Errors from parsing the string forms of model types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid authentication key: {0}")]
    InvalidAuthKey(String),

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("invalid module or function id: {0:?}")]
    InvalidFunctionId(String),

    #[error("invalid type tag: {0}")]
    InvalidTypeTag(String),

    #[error("invalid transaction argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Encoding(#[from] BcsError),
}

/// Implements `Serialize`/`Deserialize` through `Display`/`FromStr`.
macro_rules! impl_serde_via_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl serde::Serialize for $ty {
                fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }

            impl<'de> serde::Deserialize<'de> for $ty {
                fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let s = String::deserialize(deserializer)?;
                    s.parse().map_err(serde::de::Error::custom)
                }
            }
        )*
    };
}

pub(crate) use impl_serde_via_str;
