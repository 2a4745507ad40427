// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

use crate::types::{ChainId, TransactionPayload};

/// A transaction to send. Every unset field is filled in by the signer:
/// the sequence number and chain id from the node, gas settings from
/// [`ProviderConfig`](crate::config::ProviderConfig), and the expiration
/// from the node clock plus the configured TTL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub payload: TransactionPayload,
    pub sequence_number: Option<u64>,
    pub chain_id: Option<ChainId>,
    pub max_gas_amount: Option<u64>,
    pub gas_unit_price: Option<u64>,
    pub gas_token_code: Option<String>,
    pub expiration_timestamp_secs: Option<u64>,
}

impl TransactionRequest {
    pub fn new(payload: TransactionPayload) -> Self {
        Self {
            payload,
            sequence_number: None,
            chain_id: None,
            max_gas_amount: None,
            gas_unit_price: None,
            gas_token_code: None,
            expiration_timestamp_secs: None,
        }
    }

    pub fn sequence_number(mut self, sequence_number: u64) -> Self {
        self.sequence_number = Some(sequence_number);
        self
    }

    pub fn chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn max_gas_amount(mut self, max_gas_amount: u64) -> Self {
        self.max_gas_amount = Some(max_gas_amount);
        self
    }

    pub fn gas_unit_price(mut self, gas_unit_price: u64) -> Self {
        self.gas_unit_price = Some(gas_unit_price);
        self
    }

    pub fn gas_token_code(mut self, code: impl Into<String>) -> Self {
        self.gas_token_code = Some(code.into());
        self
    }

    pub fn expiration_timestamp_secs(mut self, secs: u64) -> Self {
        self.expiration_timestamp_secs = Some(secs);
        self
    }
}

impl From<TransactionPayload> for TransactionRequest {
    fn from(payload: TransactionPayload) -> Self {
        Self::new(payload)
    }
}
