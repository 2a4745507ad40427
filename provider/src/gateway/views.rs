// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Read-side views returned by a node gateway.
//!
//! Field names follow the node's JSON-RPC output. Large integers arrive as
//! either JSON numbers or decimal strings depending on node version, so
//! numeric fields go through [`num`], which accepts both.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::hash::HashValue;
use crate::types::{AccountAddress, FunctionId, TypeTag};

// ---------------------------------------------------------------------------
// Lenient numbers
// ---------------------------------------------------------------------------

/// Serde helpers for integers that may be spelled as strings.
pub mod num {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(u64),
        Str(String),
    }

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match NumOrStr::deserialize(deserializer)? {
            NumOrStr::Num(n) => Ok(n),
            NumOrStr::Str(s) => s.parse().map_err(D::Error::custom),
        }
    }

    /// `Option<u64>` variant; `null` and a missing field are `None`.
    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<u64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_some(v),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<u64>, D::Error> {
            match Option::<NumOrStr>::deserialize(deserializer)? {
                None => Ok(None),
                Some(NumOrStr::Num(n)) => Ok(Some(n)),
                Some(NumOrStr::Str(s)) => s.parse().map(Some).map_err(D::Error::custom),
            }
        }
    }

    /// Parses a `u128` out of a JSON number or decimal string.
    pub fn u128_from_value(value: &serde_json::Value) -> Option<u128> {
        match value {
            serde_json::Value::Number(n) => n.as_u64().map(u128::from),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Block identifiers and chain info
// ---------------------------------------------------------------------------

/// Selects a block by height or hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockId {
    Number(u64),
    Hash(HashValue),
}

impl From<u64> for BlockId {
    fn from(number: u64) -> Self {
        Self::Number(number)
    }
}

impl From<HashValue> for BlockId {
    fn from(hash: HashValue) -> Self {
        Self::Hash(hash)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "#{}", n),
            Self::Hash(h) => write!(f, "{}", h),
        }
    }
}

/// `chain.id` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainIdView {
    #[serde(default)]
    pub name: String,
    pub id: u8,
}

/// `chain.info` result, reduced to the head header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfoView {
    pub chain_id: u8,
    pub head: BlockHeaderView,
}

/// `node.info` result, reduced to the node clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfoView {
    #[serde(with = "num")]
    pub now_seconds: u64,
}

// ---------------------------------------------------------------------------
// Blocks & transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeaderView {
    pub block_hash: HashValue,
    pub parent_hash: HashValue,
    #[serde(with = "num")]
    pub number: u64,
    #[serde(with = "num")]
    pub timestamp: u64,
    pub author: AccountAddress,
    #[serde(default, with = "num")]
    pub gas_used: u64,
}

/// Block body: transaction hashes or full transactions, depending on the
/// query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockBodyView {
    Hashes(Vec<HashValue>),
    Full(Vec<TransactionView>),
}

impl Default for BlockBodyView {
    fn default() -> Self {
        Self::Hashes(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockView {
    pub header: BlockHeaderView,
    #[serde(default)]
    pub body: BlockBodyView,
}

impl BlockView {
    /// Hashes of the block's user transactions, whichever body form the
    /// node returned.
    pub fn transaction_hashes(&self) -> Vec<HashValue> {
        match &self.body {
            BlockBodyView::Hashes(hashes) => hashes.clone(),
            BlockBodyView::Full(txns) => txns.iter().map(|t| t.transaction_hash).collect(),
        }
    }
}

/// A transaction as stored on chain. `user_transaction` carries the
/// node's decoded form verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionView {
    pub transaction_hash: HashValue,
    #[serde(default)]
    pub block_hash: Option<HashValue>,
    #[serde(default, with = "num::option")]
    pub block_number: Option<u64>,
    #[serde(default, with = "num::option")]
    pub transaction_index: Option<u64>,
    #[serde(default)]
    pub user_transaction: Option<serde_json::Value>,
}

/// Execution status of an included transaction.
///
/// The node reports `"Executed"` as a bare string and every failure as a
/// structured object (`{"MoveAbort": {...}}`, `"OutOfGas"`, ...). Anything
/// other than `Executed` is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Executed,
    Failed(serde_json::Value),
}

impl TransactionStatus {
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executed => f.write_str("Executed"),
            Self::Failed(serde_json::Value::String(s)) => f.write_str(s),
            Self::Failed(other) => write!(f, "{}", other),
        }
    }
}

impl Serialize for TransactionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Executed => serializer.serialize_str("Executed"),
            Self::Failed(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TransactionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        if value.as_str() == Some("Executed") {
            Ok(Self::Executed)
        } else {
            Ok(Self::Failed(value))
        }
    }
}

/// Execution record of an included transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfoView {
    pub transaction_hash: HashValue,
    pub block_hash: HashValue,
    #[serde(with = "num")]
    pub block_number: u64,
    #[serde(default, with = "num")]
    pub transaction_index: u64,
    #[serde(with = "num")]
    pub gas_used: u64,
    pub status: TransactionStatus,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventView {
    #[serde(default)]
    pub block_hash: Option<HashValue>,
    #[serde(default, with = "num::option")]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub transaction_hash: Option<HashValue>,
    #[serde(default, with = "num::option")]
    pub transaction_index: Option<u64>,
    /// Hex of the event's BCS payload.
    pub data: String,
    pub type_tag: String,
    pub event_key: String,
    #[serde(with = "num")]
    pub event_seq_number: u64,
}

/// Filter for `chain.get_events`. Empty lists match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_block: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_block: Option<u64>,
    #[serde(default)]
    pub event_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addrs: Vec<AccountAddress>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl EventFilter {
    /// Whether `event` passes the key, type, and block-range criteria.
    /// `addrs` is matched by the node against the event key's account.
    pub fn matches(&self, event: &EventView) -> bool {
        if !self.event_keys.is_empty() && !self.event_keys.contains(&event.event_key) {
            return false;
        }
        if !self.type_tags.is_empty() && !self.type_tags.contains(&event.type_tag) {
            return false;
        }
        let number = event.block_number.unwrap_or(0);
        if self.from_block.is_some_and(|from| number < from) {
            return false;
        }
        if self.to_block.is_some_and(|to| number > to) {
            return false;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Contract calls, dry runs, state
// ---------------------------------------------------------------------------

/// A read-only call of a public function. `args` are transaction argument
/// literals (`0x1`, `1024u128`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
    pub function_id: FunctionId,
    #[serde(default)]
    pub type_args: Vec<TypeTag>,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Result of dry-running a raw transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DryRunOutput {
    pub status: TransactionStatus,
    #[serde(with = "num")]
    pub gas_used: u64,
    #[serde(default)]
    pub events: Vec<EventView>,
}

/// An account resource. `raw` is the BCS hex, `json` the node's decoding
/// when requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceView {
    pub raw: String,
    #[serde(default)]
    pub json: Option<serde_json::Value>,
}

/// `state.list_resource` result, keyed by struct tag string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceListView {
    pub resources: BTreeMap<String, ResourceView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hash(byte: u8) -> String {
        format!("0x{}", hex::encode([byte; 32]))
    }

    #[test]
    fn numbers_accept_strings() {
        let info: TransactionInfoView = serde_json::from_value(json!({
            "transaction_hash": hash(1),
            "block_hash": hash(2),
            "block_number": "42",
            "transaction_index": 1,
            "gas_used": "7800",
            "status": "Executed",
        }))
        .unwrap();
        assert_eq!(info.block_number, 42);
        assert_eq!(info.gas_used, 7800);
        assert!(info.status.is_executed());
    }

    #[test]
    fn failed_status_is_kept_verbatim() {
        let status: TransactionStatus =
            serde_json::from_value(json!({"MoveAbort": {"abort_code": "26119"}})).unwrap();
        assert!(!status.is_executed());
        assert!(status.to_string().contains("MoveAbort"));

        let status: TransactionStatus = serde_json::from_value(json!("OutOfGas")).unwrap();
        assert_eq!(status.to_string(), "OutOfGas");
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("OutOfGas"));
    }

    #[test]
    fn block_body_forms() {
        let block: BlockView = serde_json::from_value(json!({
            "header": {
                "block_hash": hash(3),
                "parent_hash": hash(4),
                "number": "0",
                "timestamp": "1621311100863",
                "author": "0x1",
            },
            "body": { "Hashes": [hash(5)] }
        }))
        .unwrap();
        assert_eq!(block.header.author, AccountAddress::ONE);
        assert_eq!(block.transaction_hashes().len(), 1);

        let bare: BlockView = serde_json::from_value(json!({
            "header": {
                "block_hash": hash(3),
                "parent_hash": hash(4),
                "number": 1,
                "timestamp": 1,
                "author": "0x1",
            }
        }))
        .unwrap();
        assert!(bare.transaction_hashes().is_empty());
    }

    #[test]
    fn optional_numbers() {
        let txn: TransactionView = serde_json::from_value(json!({
            "transaction_hash": hash(1),
            "block_number": null,
        }))
        .unwrap();
        assert_eq!(txn.block_number, None);
        assert_eq!(txn.transaction_index, None);
    }

    #[test]
    fn event_filter_matching() {
        let event = EventView {
            block_hash: None,
            block_number: Some(10),
            transaction_hash: None,
            transaction_index: None,
            data: String::new(),
            type_tag: "0x1::Account::DepositEvent".to_string(),
            event_key: "key-a".to_string(),
            event_seq_number: 0,
        };
        assert!(EventFilter::default().matches(&event));
        let filter = EventFilter {
            from_block: Some(11),
            ..EventFilter::default()
        };
        assert!(!filter.matches(&event));
        let filter = EventFilter {
            event_keys: vec!["key-b".to_string()],
            ..EventFilter::default()
        };
        assert!(!filter.matches(&event));
    }

    #[test]
    fn contract_call_serializes_strings() {
        let call = ContractCall {
            function_id: "0x1::Account::balance".parse().unwrap(),
            type_args: vec!["0x1::STC::STC".parse().unwrap()],
            args: vec!["0x1".to_string()],
        };
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(
            value["function_id"],
            json!("0x00000000000000000000000000000001::Account::balance")
        );
        assert_eq!(
            value["type_args"][0],
            json!("0x00000000000000000000000000000001::STC::STC")
        );
    }

    #[test]
    fn u128_from_value_forms() {
        assert_eq!(num::u128_from_value(&json!(5)), Some(5));
        assert_eq!(
            num::u128_from_value(&json!("340282366920938463463374607431768211455")),
            Some(u128::MAX)
        );
        assert_eq!(num::u128_from_value(&json!(null)), None);
    }
}
