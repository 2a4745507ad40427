// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! [`NodeGateway`] over JSON-RPC.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::rpc::{RpcMethod, RpcRequest, Transport};
use super::views::{
    num, BlockId, BlockView, ChainIdView, ChainInfoView, ContractCall, DryRunOutput, EventFilter,
    EventView, NodeInfoView, ResourceListView, ResourceView, TransactionInfoView, TransactionView,
};
use super::{GatewayError, NodeGateway, SubmissionError};
use crate::crypto::hash::HashValue;
use crate::crypto::keys::AccountPublicKey;
use crate::transaction::transfer::STC_TOKEN;
use crate::types::{
    AccountAddress, ChainId, ModuleId, RawUserTransaction, SignedUserTransaction, StructTag,
};

/// Resource holding an account's sequence number.
const ACCOUNT_RESOURCE: &str = "0x1::Account::Account";

/// Gateway that speaks the node's JSON-RPC API through a [`Transport`].
pub struct JsonRpcProvider<T> {
    transport: T,
    next_id: AtomicU64,
}

impl<T: Transport> JsonRpcProvider<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends one request and decodes its result as `R`.
    async fn request<R: DeserializeOwned>(
        &self,
        method: RpcMethod,
        params: Vec<Value>,
    ) -> Result<R, GatewayError> {
        let value = self.request_value(method, params).await?;
        serde_json::from_value(value).map_err(|e| GatewayError::Decode {
            method: method.as_str(),
            reason: e.to_string(),
        })
    }

    async fn request_value(&self, method: RpcMethod, params: Vec<Value>) -> Result<Value, GatewayError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method = method.as_str(), id, "rpc request");
        let response = self.transport.send(RpcRequest::new(id, method, params)).await?;
        Ok(response.into_result()?)
    }

    fn decoded_resource_field<'a>(resource: &'a Option<ResourceView>, path: &[&str]) -> Option<&'a Value> {
        let mut value = resource.as_ref()?.json.as_ref()?;
        for key in path {
            value = value.get(*key)?;
        }
        Some(value)
    }
}

#[async_trait]
impl<T: Transport> NodeGateway for JsonRpcProvider<T> {
    async fn chain_id(&self) -> Result<ChainId, GatewayError> {
        let view: ChainIdView = self.request(RpcMethod::ChainId, vec![]).await?;
        Ok(ChainId::new(view.id))
    }

    async fn block_number(&self) -> Result<u64, GatewayError> {
        let info: ChainInfoView = self.request(RpcMethod::ChainInfo, vec![]).await?;
        Ok(info.head.number)
    }

    async fn get_block(&self, id: BlockId) -> Result<Option<BlockView>, GatewayError> {
        match id {
            BlockId::Number(number) => {
                self.request(RpcMethod::GetBlockByNumber, vec![json!(number)])
                    .await
            }
            BlockId::Hash(hash) => {
                self.request(RpcMethod::GetBlockByHash, vec![json!(hash)])
                    .await
            }
        }
    }

    async fn get_transaction(&self, hash: HashValue) -> Result<Option<TransactionView>, GatewayError> {
        self.request(RpcMethod::GetTransaction, vec![json!(hash)]).await
    }

    async fn get_transaction_info(
        &self,
        hash: HashValue,
    ) -> Result<Option<TransactionInfoView>, GatewayError> {
        self.request(RpcMethod::GetTransactionInfo, vec![json!(hash)])
            .await
    }

    async fn get_events_of_transaction(&self, hash: HashValue) -> Result<Vec<EventView>, GatewayError> {
        let events: Option<Vec<EventView>> = self
            .request(RpcMethod::GetEventsByTxnHash, vec![json!(hash)])
            .await?;
        Ok(events.unwrap_or_default())
    }

    async fn query_events(&self, filter: &EventFilter) -> Result<Vec<EventView>, GatewayError> {
        let events: Option<Vec<EventView>> = self
            .request(RpcMethod::GetEvents, vec![json!(filter)])
            .await?;
        Ok(events.unwrap_or_default())
    }

    async fn call_contract(&self, call: &ContractCall) -> Result<Vec<Value>, GatewayError> {
        self.request(RpcMethod::CallContract, vec![json!(call)]).await
    }

    async fn dry_run_raw(
        &self,
        raw: &RawUserTransaction,
        public_key: &AccountPublicKey,
    ) -> Result<DryRunOutput, GatewayError> {
        self.request(
            RpcMethod::DryRunRaw,
            vec![json!(raw.to_hex()?), json!(public_key.to_string())],
        )
        .await
    }

    async fn get_resource(
        &self,
        address: AccountAddress,
        resource: &StructTag,
    ) -> Result<Option<ResourceView>, GatewayError> {
        self.request(
            RpcMethod::GetResource,
            vec![json!(address), json!(resource), json!({ "decode": true })],
        )
        .await
    }

    async fn get_resources(&self, address: AccountAddress) -> Result<ResourceListView, GatewayError> {
        let list: Option<ResourceListView> = self
            .request(
                RpcMethod::ListResource,
                vec![json!(address), json!({ "decode": true })],
            )
            .await?;
        Ok(list.unwrap_or_default())
    }

    async fn get_code(&self, module: &ModuleId) -> Result<Option<Vec<u8>>, GatewayError> {
        let code: Option<String> = self
            .request(RpcMethod::GetCode, vec![json!(module)])
            .await?;
        code.map(|hex_str| {
            hex::decode(hex_str.strip_prefix("0x").unwrap_or(&hex_str)).map_err(|e| {
                GatewayError::Decode {
                    method: RpcMethod::GetCode.as_str(),
                    reason: e.to_string(),
                }
            })
        })
        .transpose()
    }

    async fn get_sequence_number(&self, address: AccountAddress) -> Result<u64, GatewayError> {
        // The pool answers only while it holds a pending transaction from
        // this sender; otherwise fall back to the committed account state.
        let pending = self
            .request_value(RpcMethod::NextSequenceNumber, vec![json!(address)])
            .await?;
        if let Some(next) = num::u128_from_value(&pending).and_then(|n| u64::try_from(n).ok()) {
            return Ok(next);
        }

        let tag: StructTag = ACCOUNT_RESOURCE.parse().map_err(|e: crate::types::ParseError| {
            GatewayError::Decode {
                method: RpcMethod::GetResource.as_str(),
                reason: e.to_string(),
            }
        })?;
        let resource = self.get_resource(address, &tag).await?;
        let committed = Self::decoded_resource_field(&resource, &["sequence_number"])
            .and_then(num::u128_from_value)
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0);
        Ok(committed)
    }

    async fn get_balance(
        &self,
        address: AccountAddress,
        token: Option<&StructTag>,
    ) -> Result<Option<u128>, GatewayError> {
        let token = token.map(ToString::to_string).unwrap_or_else(|| STC_TOKEN.to_string());
        let tag: StructTag = format!("0x1::Account::Balance<{}>", token)
            .parse()
            .map_err(|e: crate::types::ParseError| GatewayError::Decode {
                method: RpcMethod::GetResource.as_str(),
                reason: e.to_string(),
            })?;
        let resource = self.get_resource(address, &tag).await?;
        Ok(Self::decoded_resource_field(&resource, &["token", "value"]).and_then(num::u128_from_value))
    }

    async fn get_now_seconds(&self) -> Result<u64, GatewayError> {
        let info: NodeInfoView = self.request(RpcMethod::NodeInfo, vec![]).await?;
        Ok(info.now_seconds)
    }

    async fn submit_transaction(&self, txn: &SignedUserTransaction) -> Result<HashValue, GatewayError> {
        let local_id = txn.id()?;
        let result = self
            .request_value(RpcMethod::SubmitHexTransaction, vec![json!(txn.to_hex()?)])
            .await;

        let value = match result {
            Ok(value) => value,
            Err(GatewayError::Rpc { message, .. }) => {
                let rejection = SubmissionError::classify(&message);
                warn!(
                    sender = %txn.sender(),
                    sequence_number = txn.sequence_number(),
                    error = %rejection,
                    "transaction rejected"
                );
                return Err(rejection.into());
            }
            Err(other) => return Err(other),
        };

        let hash: HashValue = serde_json::from_value(value).map_err(|e| GatewayError::Decode {
            method: RpcMethod::SubmitHexTransaction.as_str(),
            reason: e.to_string(),
        })?;
        if hash != local_id {
            warn!(node = %hash, local = %local_id, "node reported a different transaction hash");
        }
        info!(
            hash = %hash,
            sender = %txn.sender(),
            sequence_number = txn.sequence_number(),
            "transaction submitted"
        );
        Ok(hash)
    }
}
