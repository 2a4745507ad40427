// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # JSON-RPC Wire Types
//!
//! JSON-RPC 2.0 envelopes for talking to a node, plus the [`Transport`]
//! seam that carries them. No HTTP client ships with this crate; callers
//! plug in whatever transport they already use.
//!
//! ## Method Index
//!
//! | Method                             | Used for                         |
//! |------------------------------------|----------------------------------|
//! | `chain.id`                         | network id                       |
//! | `chain.info`                       | head block number                |
//! | `chain.get_block_by_number`        | block by height                  |
//! | `chain.get_block_by_hash`          | block by hash                    |
//! | `chain.get_transaction`            | transaction by hash              |
//! | `chain.get_transaction_info`       | execution record by hash         |
//! | `chain.get_events_by_txn_hash`     | events of one transaction        |
//! | `chain.get_events`                 | filtered event query             |
//! | `contract.call_v2`                 | read-only function call          |
//! | `contract.dry_run_raw`             | dry run of a raw transaction     |
//! | `contract.get_code`                | module bytecode                  |
//! | `state.get_resource`               | one account resource             |
//! | `state.list_resource`              | all account resources            |
//! | `txpool.next_sequence_number`      | pending-aware sequence number    |
//! | `txpool.submit_hex_transaction`    | submit a signed transaction      |
//! | `node.info`                        | node clock                       |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::GatewayError;

// ---------------------------------------------------------------------------
// RPC Method Enumeration
// ---------------------------------------------------------------------------

/// Node methods this client calls. Serializes to the wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RpcMethod {
    #[serde(rename = "chain.id")]
    ChainId,
    #[serde(rename = "chain.info")]
    ChainInfo,
    #[serde(rename = "chain.get_block_by_number")]
    GetBlockByNumber,
    #[serde(rename = "chain.get_block_by_hash")]
    GetBlockByHash,
    #[serde(rename = "chain.get_transaction")]
    GetTransaction,
    #[serde(rename = "chain.get_transaction_info")]
    GetTransactionInfo,
    #[serde(rename = "chain.get_events_by_txn_hash")]
    GetEventsByTxnHash,
    #[serde(rename = "chain.get_events")]
    GetEvents,
    #[serde(rename = "contract.call_v2")]
    CallContract,
    #[serde(rename = "contract.dry_run_raw")]
    DryRunRaw,
    #[serde(rename = "contract.get_code")]
    GetCode,
    #[serde(rename = "state.get_resource")]
    GetResource,
    #[serde(rename = "state.list_resource")]
    ListResource,
    #[serde(rename = "txpool.next_sequence_number")]
    NextSequenceNumber,
    #[serde(rename = "txpool.submit_hex_transaction")]
    SubmitHexTransaction,
    #[serde(rename = "node.info")]
    NodeInfo,
}

impl RpcMethod {
    /// Wire name of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChainId => "chain.id",
            Self::ChainInfo => "chain.info",
            Self::GetBlockByNumber => "chain.get_block_by_number",
            Self::GetBlockByHash => "chain.get_block_by_hash",
            Self::GetTransaction => "chain.get_transaction",
            Self::GetTransactionInfo => "chain.get_transaction_info",
            Self::GetEventsByTxnHash => "chain.get_events_by_txn_hash",
            Self::GetEvents => "chain.get_events",
            Self::CallContract => "contract.call_v2",
            Self::DryRunRaw => "contract.dry_run_raw",
            Self::GetCode => "contract.get_code",
            Self::GetResource => "state.get_resource",
            Self::ListResource => "state.list_resource",
            Self::NextSequenceNumber => "txpool.next_sequence_number",
            Self::SubmitHexTransaction => "txpool.submit_hex_transaction",
            Self::NodeInfo => "node.info",
        }
    }
}

// ---------------------------------------------------------------------------
// RPC Request / Response
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request. `params` is always a positional array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: RpcMethod,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: RpcMethod, params: Vec<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method,
            params: serde_json::Value::Array(params),
        }
    }
}

/// A JSON-RPC 2.0 response. Exactly one of `result` or `error` is set by a
/// conforming node; a missing `result` on success means `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: u64, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: u64, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// The result value, or the error object as `Err`.
    pub fn into_result(self) -> Result<serde_json::Value, RpcError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(serde_json::Value::Null)),
        }
    }
}

// ---------------------------------------------------------------------------
// RPC Errors
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 error object.
///
/// - `-32700` parse error
/// - `-32600` invalid request
/// - `-32601` method not found
/// - `-32602` invalid params
/// - `-32603` internal error
/// - `-32000` to `-32099` node-specific
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(
            Self::METHOD_NOT_FOUND,
            format!("method not found: {}", method.into()),
        )
    }

    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::new(Self::INVALID_PARAMS, msg)
    }

    /// Message plus any `data` payload, which is where nodes put the VM
    /// status code of a rejected transaction.
    pub fn full_message(&self) -> String {
        match &self.data {
            Some(data) => format!("{} {}", self.message, data),
            None => self.message.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Carries one request to the node and returns its response.
///
/// Implementations report connection-level failures as
/// [`GatewayError::Transport`]. Node-level errors travel inside the
/// response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RpcRequest) -> Result<RpcResponse, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serialization() {
        let req = RpcRequest::new(7, RpcMethod::GetTransactionInfo, vec![json!("0xab")]);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["method"], json!("chain.get_transaction_info"));
        assert_eq!(value["params"], json!(["0xab"]));
        assert_eq!(value["jsonrpc"], json!("2.0"));

        let back: RpcRequest = serde_json::from_value(value).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn method_names_match_serde() {
        let methods = [
            RpcMethod::ChainId,
            RpcMethod::ChainInfo,
            RpcMethod::GetBlockByNumber,
            RpcMethod::GetBlockByHash,
            RpcMethod::GetTransaction,
            RpcMethod::GetTransactionInfo,
            RpcMethod::GetEventsByTxnHash,
            RpcMethod::GetEvents,
            RpcMethod::CallContract,
            RpcMethod::DryRunRaw,
            RpcMethod::GetCode,
            RpcMethod::GetResource,
            RpcMethod::ListResource,
            RpcMethod::NextSequenceNumber,
            RpcMethod::SubmitHexTransaction,
            RpcMethod::NodeInfo,
        ];
        for method in methods {
            assert_eq!(serde_json::to_value(method).unwrap(), json!(method.as_str()));
        }
    }

    #[test]
    fn response_into_result() {
        let ok = RpcResponse::success(1, json!({"id": 254}));
        assert_eq!(ok.into_result().unwrap()["id"], json!(254));

        let null: RpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": null})).unwrap();
        assert_eq!(null.into_result().unwrap(), serde_json::Value::Null);

        let err = RpcResponse::error(1, RpcError::method_not_found("foo.bar"));
        assert_eq!(err.into_result().unwrap_err().code, RpcError::METHOD_NOT_FOUND);
    }

    #[test]
    fn full_message_includes_data() {
        let mut err = RpcError::new(-32000, "Invalid transaction");
        assert_eq!(err.full_message(), "Invalid transaction");
        err.data = Some(json!("SEQUENCE_NUMBER_TOO_OLD"));
        assert!(err.full_message().contains("SEQUENCE_NUMBER_TOO_OLD"));
    }
}
