// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Node Gateway
//!
//! The contract between this client and a remote node: chain reads,
//! dry runs, and transaction submission.
//!
//! ## Architecture
//!
//! ```text
//! NodeGateway (trait)
//!   ├── JsonRpcProvider<T: Transport>   maps calls onto node JSON-RPC methods
//!   └── InMemoryGateway                 simulated dev chain for tests and demos
//! ```
//!
//! ## Conventions
//!
//! - "Not found" is `Ok(None)`, never an error.
//! - Submission rejections are classified into [`SubmissionError`] kinds
//!   so callers can react to a stale sequence number differently from an
//!   empty gas balance.
//! - Nothing here retries. Errors surface to the caller verbatim.

pub mod jsonrpc;
pub mod memory;
pub mod rpc;
pub mod views;

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::bcs::BcsError;
use crate::crypto::hash::HashValue;
use crate::crypto::keys::AccountPublicKey;
use crate::types::{AccountAddress, ChainId, ModuleId, RawUserTransaction, SignedUserTransaction, StructTag};

pub use jsonrpc::JsonRpcProvider;
pub use memory::InMemoryGateway;
pub use rpc::{RpcError, RpcMethod, RpcRequest, RpcResponse, Transport};
pub use views::{
    BlockBodyView, BlockHeaderView, BlockId, BlockView, ContractCall, DryRunOutput, EventFilter,
    EventView, ResourceListView, ResourceView, TransactionInfoView, TransactionStatus,
    TransactionView,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why the node refused a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The sequence number was already used, by a committed or a pending
    /// transaction.
    #[error("sequence number too old: {0}")]
    SequenceNumberTooOld(String),

    #[error("sequence number too new: {0}")]
    SequenceNumberTooNew(String),

    #[error("insufficient balance for gas: {0}")]
    InsufficientBalanceForGas(String),

    #[error("max gas amount exceeds the limit: {0}")]
    MaxGasExceeded(String),

    #[error("transaction expired: {0}")]
    TransactionExpired(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Any other rejection.
    #[error("transaction rejected: {0}")]
    Rejected(String),
}

impl SubmissionError {
    /// Classifies a node rejection message by the VM status code it carries.
    pub fn classify(message: &str) -> Self {
        let upper = message.to_ascii_uppercase();
        let message = message.to_string();
        if upper.contains("SEQUENCE_NUMBER_TOO_OLD") || upper.contains("ALREADY EXIST") {
            Self::SequenceNumberTooOld(message)
        } else if upper.contains("SEQUENCE_NUMBER_TOO_NEW") {
            Self::SequenceNumberTooNew(message)
        } else if upper.contains("INSUFFICIENT_BALANCE_FOR_TRANSACTION_FEE") {
            Self::InsufficientBalanceForGas(message)
        } else if upper.contains("MAX_GAS_UNITS_EXCEEDS_MAX_GAS_UNITS_BOUND") {
            Self::MaxGasExceeded(message)
        } else if upper.contains("TRANSACTION_EXPIRED") {
            Self::TransactionExpired(message)
        } else if upper.contains("INVALID_SIGNATURE") || upper.contains("INVALID_AUTH_KEY") {
            Self::InvalidSignature(message)
        } else {
            Self::Rejected(message)
        }
    }
}

/// Errors from any gateway call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// The request never got a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node refused a submitted transaction.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// The response did not have the expected shape.
    #[error("unexpected response from {method}: {reason}")]
    Decode { method: &'static str, reason: String },

    #[error(transparent)]
    Encoding(#[from] BcsError),
}

impl From<RpcError> for GatewayError {
    fn from(err: RpcError) -> Self {
        Self::Rpc {
            code: err.code,
            message: err.full_message(),
        }
    }
}

// ---------------------------------------------------------------------------
// NodeGateway
// ---------------------------------------------------------------------------

/// Everything the signer and the confirmation engine need from a node.
#[async_trait]
pub trait NodeGateway: Send + Sync {
    /// Network id of the node.
    async fn chain_id(&self) -> Result<ChainId, GatewayError>;

    /// Height of the current head block.
    async fn block_number(&self) -> Result<u64, GatewayError>;

    async fn get_block(&self, id: BlockId) -> Result<Option<BlockView>, GatewayError>;

    async fn get_transaction(&self, hash: HashValue) -> Result<Option<TransactionView>, GatewayError>;

    /// Execution record, or `None` while the transaction is not included.
    async fn get_transaction_info(
        &self,
        hash: HashValue,
    ) -> Result<Option<TransactionInfoView>, GatewayError>;

    async fn get_events_of_transaction(&self, hash: HashValue) -> Result<Vec<EventView>, GatewayError>;

    async fn query_events(&self, filter: &EventFilter) -> Result<Vec<EventView>, GatewayError>;

    /// Calls a read-only function and returns its decoded return values.
    async fn call_contract(&self, call: &ContractCall) -> Result<Vec<serde_json::Value>, GatewayError>;

    /// Executes `raw` without committing it. `public_key` stands in for the
    /// signature.
    async fn dry_run_raw(
        &self,
        raw: &RawUserTransaction,
        public_key: &AccountPublicKey,
    ) -> Result<DryRunOutput, GatewayError>;

    async fn get_resource(
        &self,
        address: AccountAddress,
        resource: &StructTag,
    ) -> Result<Option<ResourceView>, GatewayError>;

    async fn get_resources(&self, address: AccountAddress) -> Result<ResourceListView, GatewayError>;

    /// Bytecode of a published module.
    async fn get_code(&self, module: &ModuleId) -> Result<Option<Vec<u8>>, GatewayError>;

    /// Next sequence number for `address`, counting pending transactions.
    /// Zero for an account that does not exist.
    async fn get_sequence_number(&self, address: AccountAddress) -> Result<u64, GatewayError>;

    /// Token balance; `token` defaults to STC. `None` if the account holds
    /// no balance resource for the token.
    async fn get_balance(
        &self,
        address: AccountAddress,
        token: Option<&StructTag>,
    ) -> Result<Option<u128>, GatewayError>;

    /// Every token balance the account holds, keyed by token type tag.
    /// Built from [`get_resources`](Self::get_resources); resources that
    /// are not `0x1::Account::Balance<T>` are skipped.
    async fn get_balances(
        &self,
        address: AccountAddress,
    ) -> Result<BTreeMap<String, u128>, GatewayError> {
        let listed = self.get_resources(address).await?;
        Ok(listed
            .resources
            .iter()
            .filter_map(|(tag, view)| {
                let token = balance_token(tag)?;
                let value = view.json.as_ref()?.get("token")?.get("value")?;
                Some((token, views::num::u128_from_value(value)?))
            })
            .collect())
    }

    /// The node's clock in Unix seconds.
    async fn get_now_seconds(&self) -> Result<u64, GatewayError>;

    /// Submits a signed transaction and returns its hash.
    async fn submit_transaction(&self, txn: &SignedUserTransaction) -> Result<HashValue, GatewayError>;
}

/// Token tag of an `0x1::Account::Balance<T>` resource tag.
fn balance_token(resource: &str) -> Option<String> {
    let tag: StructTag = resource.parse().ok()?;
    let is_balance = tag.address == AccountAddress::ONE
        && tag.module.as_str() == "Account"
        && tag.name.as_str() == "Balance";
    match tag.type_params.as_slice() {
        [token] if is_balance => Some(token.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AuthenticationKey;

    #[test]
    fn balance_resource_tags() {
        assert_eq!(
            balance_token("0x1::Account::Balance<0x1::STC::STC>").as_deref(),
            Some("0x00000000000000000000000000000001::STC::STC")
        );
        assert_eq!(balance_token("0x1::Account::Account"), None);
        assert_eq!(balance_token("0x2::Account::Balance<0x1::STC::STC>"), None);
        assert_eq!(balance_token("not a tag"), None);
    }

    #[tokio::test]
    async fn balances_from_resource_listing() {
        let gateway = InMemoryGateway::default();
        let key = AuthenticationKey::new([9u8; 32]);
        let address = gateway.create_account(key, 500);
        let token: StructTag = "0x2::Coin::COIN".parse().unwrap();
        gateway.fund_token(address, &token, 7);

        let balances = gateway.get_balances(address).await.unwrap();
        assert_eq!(balances.len(), 2);
        assert_eq!(balances["0x00000000000000000000000000000001::STC::STC"], 500);
        assert_eq!(balances["0x00000000000000000000000000000002::Coin::COIN"], 7);
        assert!(gateway.get_balances(AccountAddress::ONE).await.unwrap().is_empty());
    }

    #[test]
    fn classify_vm_status_codes() {
        assert!(matches!(
            SubmissionError::classify("Invalid transaction: SEQUENCE_NUMBER_TOO_OLD"),
            SubmissionError::SequenceNumberTooOld(_)
        ));
        assert!(matches!(
            SubmissionError::classify("status_code: sequence_number_too_new"),
            SubmissionError::SequenceNumberTooNew(_)
        ));
        assert!(matches!(
            SubmissionError::classify("INSUFFICIENT_BALANCE_FOR_TRANSACTION_FEE"),
            SubmissionError::InsufficientBalanceForGas(_)
        ));
        assert!(matches!(
            SubmissionError::classify("MAX_GAS_UNITS_EXCEEDS_MAX_GAS_UNITS_BOUND"),
            SubmissionError::MaxGasExceeded(_)
        ));
        assert!(matches!(
            SubmissionError::classify("TRANSACTION_EXPIRED"),
            SubmissionError::TransactionExpired(_)
        ));
        assert!(matches!(
            SubmissionError::classify("INVALID_SIGNATURE"),
            SubmissionError::InvalidSignature(_)
        ));
        assert!(matches!(
            SubmissionError::classify("transaction already exist in pool"),
            SubmissionError::SequenceNumberTooOld(_)
        ));
        assert_eq!(
            SubmissionError::classify("something else"),
            SubmissionError::Rejected("something else".to_string())
        );
    }

    #[test]
    fn rpc_error_conversion_keeps_data() {
        let mut err = RpcError::new(-32000, "rejected");
        err.data = Some(serde_json::json!("TRANSACTION_EXPIRED"));
        match GatewayError::from(err) {
            GatewayError::Rpc { code, message } => {
                assert_eq!(code, -32000);
                assert!(message.contains("TRANSACTION_EXPIRED"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
