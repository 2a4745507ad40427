// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Unsigned user transactions and their builder.

use chrono::Utc;

use super::{AccountAddress, ChainId, TransactionPayload};
use crate::bcs::{self, BcsDeserialize, BcsDeserializer, BcsError, BcsSerialize, BcsSerializer};
use crate::config::{
    DEFAULT_EXPIRATION_TTL_SECS, DEFAULT_GAS_TOKEN_CODE, DEFAULT_GAS_UNIT_PRICE,
    DEFAULT_MAX_GAS_AMOUNT, RAW_TXN_SALT,
};
use crate::crypto::hash::salted_message;

// ---------------------------------------------------------------------------
// RawUserTransaction
// ---------------------------------------------------------------------------

/// A user transaction before signing.
///
/// Field order is the BCS layout:
///
/// ```text
/// sender                     16 bytes
/// sequence_number            u64
/// payload                    TransactionPayload
/// max_gas_amount             u64
/// gas_unit_price             u64
/// gas_token_code             string
/// expiration_timestamp_secs  u64
/// chain_id                   u8
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUserTransaction {
    pub sender: AccountAddress,
    pub sequence_number: u64,
    pub payload: TransactionPayload,
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    pub gas_token_code: String,
    pub expiration_timestamp_secs: u64,
    pub chain_id: ChainId,
}

impl RawUserTransaction {
    pub fn to_bcs_bytes(&self) -> Result<Vec<u8>, BcsError> {
        bcs::to_bytes(self)
    }

    /// The exact bytes an account key signs for this transaction:
    /// `sha3_256("STARCOIN::RawUserTransaction") ‖ bcs(self)`.
    pub fn signing_message(&self) -> Result<Vec<u8>, BcsError> {
        Ok(salted_message(RAW_TXN_SALT, &self.to_bcs_bytes()?))
    }

    /// Hex of the BCS bytes, as `contract.dry_run_raw` expects.
    pub fn to_hex(&self) -> Result<String, BcsError> {
        Ok(hex::encode(self.to_bcs_bytes()?))
    }
}

impl BcsSerialize for RawUserTransaction {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        self.sender.bcs_serialize(se)?;
        se.serialize_u64(self.sequence_number);
        self.payload.bcs_serialize(se)?;
        se.serialize_u64(self.max_gas_amount);
        se.serialize_u64(self.gas_unit_price);
        se.serialize_str(&self.gas_token_code)?;
        se.serialize_u64(self.expiration_timestamp_secs);
        self.chain_id.bcs_serialize(se)
    }
}

impl BcsDeserialize for RawUserTransaction {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self {
            sender: BcsDeserialize::bcs_deserialize(de)?,
            sequence_number: de.deserialize_u64()?,
            payload: BcsDeserialize::bcs_deserialize(de)?,
            max_gas_amount: de.deserialize_u64()?,
            gas_unit_price: de.deserialize_u64()?,
            gas_token_code: de.deserialize_str()?,
            expiration_timestamp_secs: de.deserialize_u64()?,
            chain_id: BcsDeserialize::bcs_deserialize(de)?,
        })
    }
}

// ---------------------------------------------------------------------------
// RawUserTransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`RawUserTransaction`].
///
/// ```rust,no_run
/// use stc_provider::types::{AccountAddress, ChainId, RawUserTransactionBuilder};
/// use stc_provider::transaction::transfer::peer_to_peer;
///
/// let payload = peer_to_peer("0x1", 1024, None).unwrap();
/// let raw = RawUserTransactionBuilder::new(AccountAddress::ONE, ChainId::dev(), payload)
///     .sequence_number(5)
///     .max_gas_amount(40_000)
///     .build();
/// ```
///
/// Defaults: gas limit 10,000,000, unit price 1, gas token `0x1::STC::STC`,
/// expiration twelve hours after the local clock at `build()`.
#[derive(Debug, Clone)]
pub struct RawUserTransactionBuilder {
    sender: AccountAddress,
    chain_id: ChainId,
    payload: TransactionPayload,
    sequence_number: u64,
    max_gas_amount: u64,
    gas_unit_price: u64,
    gas_token_code: String,
    expiration_timestamp_secs: Option<u64>,
}

impl RawUserTransactionBuilder {
    pub fn new(sender: AccountAddress, chain_id: ChainId, payload: TransactionPayload) -> Self {
        Self {
            sender,
            chain_id,
            payload,
            sequence_number: 0,
            max_gas_amount: DEFAULT_MAX_GAS_AMOUNT,
            gas_unit_price: DEFAULT_GAS_UNIT_PRICE,
            gas_token_code: DEFAULT_GAS_TOKEN_CODE.to_string(),
            expiration_timestamp_secs: None,
        }
    }

    pub fn sequence_number(mut self, sequence_number: u64) -> Self {
        self.sequence_number = sequence_number;
        self
    }

    pub fn max_gas_amount(mut self, max_gas_amount: u64) -> Self {
        self.max_gas_amount = max_gas_amount;
        self
    }

    pub fn gas_unit_price(mut self, gas_unit_price: u64) -> Self {
        self.gas_unit_price = gas_unit_price;
        self
    }

    pub fn gas_token_code(mut self, code: impl Into<String>) -> Self {
        self.gas_token_code = code.into();
        self
    }

    /// Absolute expiration in Unix seconds. Prefer the node's clock over the
    /// local one when they can drift.
    pub fn expiration_timestamp_secs(mut self, secs: u64) -> Self {
        self.expiration_timestamp_secs = Some(secs);
        self
    }

    pub fn build(self) -> RawUserTransaction {
        let expiration_timestamp_secs = self.expiration_timestamp_secs.unwrap_or_else(|| {
            Utc::now().timestamp().max(0) as u64 + DEFAULT_EXPIRATION_TTL_SECS
        });

        RawUserTransaction {
            sender: self.sender,
            sequence_number: self.sequence_number,
            payload: self.payload,
            max_gas_amount: self.max_gas_amount,
            gas_unit_price: self.gas_unit_price,
            gas_token_code: self.gas_token_code,
            expiration_timestamp_secs,
            chain_id: self.chain_id,
        }
    }
}
