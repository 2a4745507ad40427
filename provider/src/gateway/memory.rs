// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # In-Memory Gateway
//!
//! A simulated dev chain that implements [`NodeGateway`] without a node.
//! Tests and demos drive it directly: create accounts, submit transactions,
//! then call [`InMemoryGateway::produce_block`] to include everything in
//! the pool.
//!
//! ## Admission
//!
//! `submit_transaction` applies the checks a real transaction pool does,
//! in this order:
//!
//! ```text
//! 1. chain id         → Rejected
//! 2. signature        → InvalidSignature
//! 3. sender exists    → Rejected
//! 4. auth key         → InvalidSignature
//! 5. expiration       → TransactionExpired
//! 6. gas bound        → MaxGasExceeded
//! 7. sequence number  → SequenceNumberTooOld / SequenceNumberTooNew
//! 8. gas balance      → InsufficientBalanceForGas
//! ```
//!
//! ## Execution
//!
//! Only `0x1::TransferScripts::peer_to_peer` changes balances. Every other
//! payload executes as a no-op. Each transaction is charged a flat
//! [`SIMULATED_GAS_USED`] (capped at its gas limit) in STC and bumps the
//! sender's sequence number, whether or not it succeeds.
//!
//! State sits behind a `parking_lot::RwLock`; no lock is held across an
//! await point.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::rpc::RpcError;
use super::views::{
    BlockBodyView, BlockHeaderView, BlockId, BlockView, ContractCall, DryRunOutput, EventFilter,
    EventView, ResourceListView, ResourceView, TransactionInfoView, TransactionStatus,
    TransactionView,
};
use super::{GatewayError, NodeGateway, SubmissionError};
use crate::bcs::{self, BcsError};
use crate::crypto::hash::HashValue;
use crate::crypto::keys::AccountPublicKey;
use crate::types::{
    AccountAddress, AuthenticationKey, ChainId, ModuleId, RawUserTransaction, ScriptFunction,
    SignedUserTransaction, StructTag, TransactionArgument, TransactionPayload,
};

/// Gas charged for every executed transaction.
pub const SIMULATED_GAS_USED: u64 = 7_800;

/// Largest gas limit the pool admits.
pub const MAX_GAS_UNITS: u64 = 40_000_000;

/// Move abort code for a transfer that exceeds the balance.
const ABORT_INSUFFICIENT_BALANCE: u64 = 26_119;

/// Move abort code for creating an account whose auth key does not match.
const ABORT_MALFORMED_AUTH_KEY: u64 = 26_887;

const WITHDRAW_EVENT_SALT: u64 = 0;
const DEPOSIT_EVENT_SALT: u64 = 1;

fn stc_token_key() -> String {
    format!("{}::STC::STC", AccountAddress::ONE)
}

fn account_resource_key() -> String {
    format!("{}::Account::Account", AccountAddress::ONE)
}

fn balance_resource_key(token: &str) -> String {
    format!("{}::Account::Balance<{}>", AccountAddress::ONE, token)
}

/// JSON number when it fits, decimal string otherwise.
fn u128_json(value: u128) -> Value {
    match u64::try_from(value) {
        Ok(small) => json!(small),
        Err(_) => json!(value.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Chain state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct SimAccount {
    /// `None` for accounts created without an auth key; those accept the
    /// key whose derived address is the account address.
    auth_key: Option<AuthenticationKey>,
    sequence_number: u64,
    /// Balance per token type tag string.
    balances: BTreeMap<String, u128>,
}

impl SimAccount {
    fn new(auth_key: Option<AuthenticationKey>) -> Self {
        Self {
            auth_key,
            sequence_number: 0,
            balances: BTreeMap::new(),
        }
    }

    fn balance(&self, token: &str) -> u128 {
        self.balances.get(token).copied().unwrap_or(0)
    }

    fn accepts(&self, address: AccountAddress, presented: AuthenticationKey) -> bool {
        match self.auth_key {
            Some(key) => key == presented,
            None => presented.derived_address() == address,
        }
    }
}

#[derive(Debug, Clone)]
struct PendingEntry {
    hash: HashValue,
    txn: SignedUserTransaction,
}

/// Result of executing one transaction.
struct Outcome {
    status: TransactionStatus,
    gas_used: u64,
    events: Vec<EventView>,
}

impl Outcome {
    fn failed(status: Value, gas_used: u64) -> Self {
        Self {
            status: TransactionStatus::Failed(status),
            gas_used,
            events: Vec::new(),
        }
    }
}

fn move_abort(module: &str, code: u64) -> Value {
    json!({
        "MoveAbort": {
            "location": format!("{}::{}", AccountAddress::ONE, module),
            "abort_code": code.to_string(),
        }
    })
}

#[derive(Debug, Clone)]
struct ChainState {
    chain_id: ChainId,
    now_seconds: u64,
    accounts: HashMap<AccountAddress, SimAccount>,
    /// Ordered by sender, then sequence number.
    pool: BTreeMap<(AccountAddress, u64), PendingEntry>,
    blocks: Vec<BlockView>,
    transactions: HashMap<HashValue, TransactionView>,
    infos: HashMap<HashValue, TransactionInfoView>,
    /// Every committed event, in commit order.
    event_log: Vec<EventView>,
    event_counters: HashMap<String, u64>,
    resources: HashMap<AccountAddress, BTreeMap<String, ResourceView>>,
    code: HashMap<String, Vec<u8>>,
    fail_next: Option<Value>,
}

impl ChainState {
    fn new(chain_id: ChainId, now_seconds: u64) -> Self {
        let mut genesis_seed = b"genesis".to_vec();
        genesis_seed.push(chain_id.id());
        let genesis = BlockView {
            header: BlockHeaderView {
                block_hash: HashValue::sha3_256_of(&genesis_seed),
                parent_hash: HashValue::default(),
                number: 0,
                timestamp: now_seconds.saturating_mul(1_000),
                author: AccountAddress::ONE,
                gas_used: 0,
            },
            body: BlockBodyView::default(),
        };

        Self {
            chain_id,
            now_seconds,
            accounts: HashMap::new(),
            pool: BTreeMap::new(),
            blocks: vec![genesis],
            transactions: HashMap::new(),
            infos: HashMap::new(),
            event_log: Vec::new(),
            event_counters: HashMap::new(),
            resources: HashMap::new(),
            code: HashMap::new(),
            fail_next: None,
        }
    }

    fn head_number(&self) -> u64 {
        self.blocks.last().map(|b| b.header.number).unwrap_or(0)
    }

    fn head_hash(&self) -> HashValue {
        self.blocks
            .last()
            .map(|b| b.header.block_hash)
            .unwrap_or_default()
    }

    /// Committed sequence number followed by every contiguous pending one.
    fn next_sequence_number(&self, address: AccountAddress) -> u64 {
        let mut next = self
            .accounts
            .get(&address)
            .map(|a| a.sequence_number)
            .unwrap_or(0);
        while self.pool.contains_key(&(address, next)) {
            next += 1;
        }
        next
    }

    fn check_sender(
        &self,
        raw: &RawUserTransaction,
        presented: AuthenticationKey,
    ) -> Result<&SimAccount, SubmissionError> {
        if raw.chain_id != self.chain_id {
            return Err(SubmissionError::Rejected(format!(
                "BAD_CHAIN_ID: node is {}, transaction is {}",
                self.chain_id, raw.chain_id
            )));
        }
        let account = self.accounts.get(&raw.sender).ok_or_else(|| {
            SubmissionError::Rejected(format!("SENDING_ACCOUNT_DOES_NOT_EXIST: {}", raw.sender))
        })?;
        if !account.accepts(raw.sender, presented) {
            return Err(SubmissionError::InvalidSignature(format!(
                "INVALID_AUTH_KEY: {} does not authorize {}",
                presented, raw.sender
            )));
        }
        Ok(account)
    }

    fn admit(&self, txn: &SignedUserTransaction) -> Result<(), SubmissionError> {
        let raw = txn.raw_txn();
        if raw.chain_id == self.chain_id && !txn.verify_signature() {
            return Err(SubmissionError::InvalidSignature(
                "INVALID_SIGNATURE".to_string(),
            ));
        }
        let account = self.check_sender(raw, txn.authenticator().authentication_key())?;

        if raw.expiration_timestamp_secs <= self.now_seconds {
            return Err(SubmissionError::TransactionExpired(format!(
                "TRANSACTION_EXPIRED: expired at {}, node time {}",
                raw.expiration_timestamp_secs, self.now_seconds
            )));
        }
        if raw.max_gas_amount > MAX_GAS_UNITS {
            return Err(SubmissionError::MaxGasExceeded(format!(
                "MAX_GAS_UNITS_EXCEEDS_MAX_GAS_UNITS_BOUND: {} > {}",
                raw.max_gas_amount, MAX_GAS_UNITS
            )));
        }

        let sequence_number = raw.sequence_number;
        if sequence_number < account.sequence_number
            || self.pool.contains_key(&(raw.sender, sequence_number))
        {
            return Err(SubmissionError::SequenceNumberTooOld(format!(
                "SEQUENCE_NUMBER_TOO_OLD: {} already used by {}",
                sequence_number, raw.sender
            )));
        }
        let expected = self.next_sequence_number(raw.sender);
        if sequence_number > expected {
            return Err(SubmissionError::SequenceNumberTooNew(format!(
                "SEQUENCE_NUMBER_TOO_NEW: got {}, expected {}",
                sequence_number, expected
            )));
        }

        let max_fee = u128::from(raw.max_gas_amount) * u128::from(raw.gas_unit_price);
        let balance = account.balance(&stc_token_key());
        if balance < max_fee {
            return Err(SubmissionError::InsufficientBalanceForGas(format!(
                "INSUFFICIENT_BALANCE_FOR_TRANSACTION_FEE: balance {}, max fee {}",
                balance, max_fee
            )));
        }
        Ok(())
    }

    fn execute(&mut self, raw: &RawUserTransaction) -> Outcome {
        let gas_used = SIMULATED_GAS_USED.min(raw.max_gas_amount);
        let fee = u128::from(gas_used) * u128::from(raw.gas_unit_price);
        let Some(sender) = self.accounts.get_mut(&raw.sender) else {
            return Outcome::failed(json!("SendingAccountDoesNotExist"), 0);
        };
        let stc = sender.balances.entry(stc_token_key()).or_insert(0);
        *stc = stc.saturating_sub(fee);
        sender.sequence_number = raw.sequence_number + 1;

        if let Some(status) = self.fail_next.take() {
            return Outcome::failed(status, gas_used);
        }

        match &raw.payload {
            TransactionPayload::ScriptFunction(call) if is_peer_to_peer(call) => {
                self.transfer(raw.sender, call, gas_used)
            }
            _ => Outcome {
                status: TransactionStatus::Executed,
                gas_used,
                events: Vec::new(),
            },
        }
    }

    fn transfer(&mut self, from: AccountAddress, call: &ScriptFunction, gas_used: u64) -> Outcome {
        let (payee, auth_key, amount) = match decode_transfer(call) {
            Ok(args) => args,
            Err(e) => {
                debug!(error = %e, "malformed transfer arguments");
                return Outcome::failed(json!("MiscellaneousError"), gas_used);
            }
        };
        let token = call
            .ty_args
            .first()
            .map(ToString::to_string)
            .unwrap_or_else(stc_token_key);

        let available = self
            .accounts
            .get(&from)
            .map(|a| a.balance(&token))
            .unwrap_or(0);
        if available < amount {
            return Outcome::failed(move_abort("Account", ABORT_INSUFFICIENT_BALANCE), gas_used);
        }

        if !self.accounts.contains_key(&payee) {
            let auth_key = if auth_key.is_empty() {
                None
            } else {
                match AuthenticationKey::try_from_slice(&auth_key) {
                    Ok(key) if key.derived_address() == payee => Some(key),
                    _ => {
                        return Outcome::failed(
                            move_abort("Account", ABORT_MALFORMED_AUTH_KEY),
                            gas_used,
                        )
                    }
                }
            };
            self.accounts.insert(payee, SimAccount::new(auth_key));
        }

        if let Some(sender) = self.accounts.get_mut(&from) {
            let balance = sender.balances.entry(token.clone()).or_insert(0);
            *balance -= amount;
        }
        if let Some(receiver) = self.accounts.get_mut(&payee) {
            let balance = receiver.balances.entry(token).or_insert(0);
            *balance = balance.saturating_add(amount);
        }

        let events = vec![
            self.emit(WITHDRAW_EVENT_SALT, from, "WithdrawEvent", amount),
            self.emit(DEPOSIT_EVENT_SALT, payee, "DepositEvent", amount),
        ];
        Outcome {
            status: TransactionStatus::Executed,
            gas_used,
            events,
        }
    }

    /// Event keys are `salt ‖ address`, like the on-chain event handles.
    fn emit(&mut self, salt: u64, address: AccountAddress, name: &str, amount: u128) -> EventView {
        let mut key = salt.to_le_bytes().to_vec();
        key.extend_from_slice(address.as_bytes());
        let event_key = format!("0x{}", hex::encode(key));

        let counter = self.event_counters.entry(event_key.clone()).or_insert(0);
        let event_seq_number = *counter;
        *counter += 1;

        EventView {
            block_hash: None,
            block_number: None,
            transaction_hash: None,
            transaction_index: None,
            data: format!("0x{}", hex::encode(amount.to_le_bytes())),
            type_tag: format!("{}::Account::{}", AccountAddress::ONE, name),
            event_key,
            event_seq_number,
        }
    }

    fn produce_block(&mut self) -> BlockView {
        let entries: Vec<PendingEntry> = std::mem::take(&mut self.pool).into_values().collect();
        let parent_hash = self.head_hash();
        let number = self.head_number() + 1;

        let mut executed = Vec::with_capacity(entries.len());
        for entry in entries {
            let raw = entry.txn.raw_txn();
            let committed = self
                .accounts
                .get(&raw.sender)
                .map(|a| a.sequence_number)
                .unwrap_or(0);
            if raw.sequence_number != committed {
                debug!(
                    hash = %entry.hash,
                    sequence_number = raw.sequence_number,
                    committed,
                    "dropping stale pool entry"
                );
                continue;
            }
            let outcome = self.execute(raw);
            executed.push((entry, outcome));
        }

        let mut preimage = parent_hash.as_bytes().to_vec();
        preimage.extend_from_slice(&number.to_le_bytes());
        for (entry, _) in &executed {
            preimage.extend_from_slice(entry.hash.as_bytes());
        }
        let block_hash = HashValue::sha3_256_of(&preimage);

        let mut hashes = Vec::with_capacity(executed.len());
        let mut block_gas = 0u64;
        for (index, (entry, outcome)) in executed.into_iter().enumerate() {
            let hash = entry.hash;
            let index = index as u64;
            block_gas = block_gas.saturating_add(outcome.gas_used);

            for mut event in outcome.events {
                event.block_hash = Some(block_hash);
                event.block_number = Some(number);
                event.transaction_hash = Some(hash);
                event.transaction_index = Some(index);
                self.event_log.push(event);
            }
            self.infos.insert(
                hash,
                TransactionInfoView {
                    transaction_hash: hash,
                    block_hash,
                    block_number: number,
                    transaction_index: index,
                    gas_used: outcome.gas_used,
                    status: outcome.status,
                },
            );
            self.transactions.insert(
                hash,
                TransactionView {
                    transaction_hash: hash,
                    block_hash: Some(block_hash),
                    block_number: Some(number),
                    transaction_index: Some(index),
                    user_transaction: entry.txn.to_hex().ok().map(Value::String),
                },
            );
            hashes.push(hash);
        }

        let block = BlockView {
            header: BlockHeaderView {
                block_hash,
                parent_hash,
                number,
                timestamp: self.now_seconds.saturating_mul(1_000),
                author: AccountAddress::ONE,
                gas_used: block_gas,
            },
            body: BlockBodyView::Hashes(hashes),
        };
        self.blocks.push(block.clone());
        block
    }

    fn resource(&self, address: AccountAddress, key: &str) -> Option<ResourceView> {
        if let Some(view) = self.resources.get(&address).and_then(|r| r.get(key)) {
            return Some(view.clone());
        }
        let account = self.accounts.get(&address)?;
        if key == account_resource_key() {
            return Some(account_view(account));
        }
        account
            .balances
            .iter()
            .find(|(token, _)| balance_resource_key(token) == key)
            .map(|(_, value)| balance_view(*value))
    }

    fn resources_of(&self, address: AccountAddress) -> ResourceListView {
        let mut resources = BTreeMap::new();
        if let Some(account) = self.accounts.get(&address) {
            resources.insert(account_resource_key(), account_view(account));
            for (token, value) in &account.balances {
                resources.insert(balance_resource_key(token), balance_view(*value));
            }
        }
        if let Some(custom) = self.resources.get(&address) {
            resources.extend(custom.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        ResourceListView { resources }
    }
}

fn account_view(account: &SimAccount) -> ResourceView {
    let auth_key = account.auth_key.map(|k| k.to_string()).unwrap_or_default();
    ResourceView {
        raw: format!("0x{}", hex::encode(account.sequence_number.to_le_bytes())),
        json: Some(json!({
            "authentication_key": auth_key,
            "sequence_number": account.sequence_number,
        })),
    }
}

fn balance_view(value: u128) -> ResourceView {
    ResourceView {
        raw: format!("0x{}", hex::encode(value.to_le_bytes())),
        json: Some(json!({ "token": { "value": u128_json(value) } })),
    }
}

fn is_peer_to_peer(call: &ScriptFunction) -> bool {
    call.module.address == AccountAddress::ONE
        && call.module.name.as_str() == "TransferScripts"
        && call.function.as_str() == "peer_to_peer"
}

fn decode_transfer(call: &ScriptFunction) -> Result<(AccountAddress, Vec<u8>, u128), BcsError> {
    let [payee, auth_key, amount] = call.args.as_slice() else {
        return Err(BcsError::InvalidValue {
            type_name: "peer_to_peer",
            reason: format!("expected 3 arguments, got {}", call.args.len()),
        });
    };
    Ok((
        bcs::from_bytes(payee)?,
        bcs::from_bytes(auth_key)?,
        bcs::from_bytes(amount)?,
    ))
}

fn invalid_call(message: impl Into<String>) -> GatewayError {
    GatewayError::Rpc {
        code: RpcError::INVALID_PARAMS,
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// InMemoryGateway
// ---------------------------------------------------------------------------

/// Simulated single-node chain. Cheap to construct; share it through an
/// `Arc` like any other gateway.
pub struct InMemoryGateway {
    state: RwLock<ChainState>,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new(ChainId::dev())
    }
}

impl InMemoryGateway {
    /// A chain with only a genesis block, its clock set to the local time.
    pub fn new(chain_id: ChainId) -> Self {
        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);
        Self {
            state: RwLock::new(ChainState::new(chain_id, now)),
        }
    }

    /// Creates (or re-keys) the account derived from `auth_key` and sets its
    /// STC balance.
    pub fn create_account(&self, auth_key: AuthenticationKey, balance: u128) -> AccountAddress {
        let address = auth_key.derived_address();
        let mut state = self.state.write();
        let account = state
            .accounts
            .entry(address)
            .or_insert_with(|| SimAccount::new(Some(auth_key)));
        account.auth_key = Some(auth_key);
        account.balances.insert(stc_token_key(), balance);
        debug!(%address, balance, "account created");
        address
    }

    /// Adds STC to `address`, creating a keyless account if needed.
    pub fn fund(&self, address: AccountAddress, amount: u128) {
        self.fund_key(address, stc_token_key(), amount);
    }

    /// Adds `amount` of `token` to `address`.
    pub fn fund_token(&self, address: AccountAddress, token: &StructTag, amount: u128) {
        self.fund_key(address, token.to_string(), amount);
    }

    fn fund_key(&self, address: AccountAddress, token: String, amount: u128) {
        let mut state = self.state.write();
        let account = state
            .accounts
            .entry(address)
            .or_insert_with(|| SimAccount::new(None));
        let balance = account.balances.entry(token).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Stores an arbitrary resource. Shadows the built-in account views.
    pub fn set_resource(&self, address: AccountAddress, tag: &StructTag, view: ResourceView) {
        self.state
            .write()
            .resources
            .entry(address)
            .or_default()
            .insert(tag.to_string(), view);
    }

    pub fn publish_module(&self, module: &ModuleId, code: Vec<u8>) {
        self.state.write().code.insert(module.to_string(), code);
    }

    pub fn now_seconds(&self) -> u64 {
        self.state.read().now_seconds
    }

    pub fn set_now_seconds(&self, now_seconds: u64) {
        self.state.write().now_seconds = now_seconds;
    }

    pub fn advance_time(&self, secs: u64) {
        let mut state = self.state.write();
        state.now_seconds = state.now_seconds.saturating_add(secs);
    }

    /// The next executed transaction fails with `status`. It still pays
    /// gas and consumes its sequence number.
    pub fn fail_next_transaction(&self, status: Value) {
        self.state.write().fail_next = Some(status);
    }

    /// Transactions waiting for the next block.
    pub fn pending_count(&self) -> usize {
        self.state.read().pool.len()
    }

    /// Executes every pending transaction into a new block.
    pub fn produce_block(&self) -> BlockView {
        let block = self.state.write().produce_block();
        info!(
            number = block.header.number,
            transactions = block.transaction_hashes().len(),
            "block produced"
        );
        block
    }

    /// Produces `count` blocks and returns the new head height.
    pub fn produce_blocks(&self, count: u64) -> u64 {
        let mut head = self.state.read().head_number();
        for _ in 0..count {
            head = self.produce_block().header.number;
        }
        head
    }
}

#[async_trait]
impl NodeGateway for InMemoryGateway {
    async fn chain_id(&self) -> Result<ChainId, GatewayError> {
        Ok(self.state.read().chain_id)
    }

    async fn block_number(&self) -> Result<u64, GatewayError> {
        Ok(self.state.read().head_number())
    }

    async fn get_block(&self, id: BlockId) -> Result<Option<BlockView>, GatewayError> {
        let state = self.state.read();
        let block = match id {
            BlockId::Number(number) => usize::try_from(number)
                .ok()
                .and_then(|i| state.blocks.get(i)),
            BlockId::Hash(hash) => state.blocks.iter().find(|b| b.header.block_hash == hash),
        };
        Ok(block.cloned())
    }

    async fn get_transaction(&self, hash: HashValue) -> Result<Option<TransactionView>, GatewayError> {
        Ok(self.state.read().transactions.get(&hash).cloned())
    }

    async fn get_transaction_info(
        &self,
        hash: HashValue,
    ) -> Result<Option<TransactionInfoView>, GatewayError> {
        Ok(self.state.read().infos.get(&hash).cloned())
    }

    async fn get_events_of_transaction(&self, hash: HashValue) -> Result<Vec<EventView>, GatewayError> {
        Ok(self
            .state
            .read()
            .event_log
            .iter()
            .filter(|e| e.transaction_hash == Some(hash))
            .cloned()
            .collect())
    }

    async fn query_events(&self, filter: &EventFilter) -> Result<Vec<EventView>, GatewayError> {
        let state = self.state.read();
        let matching = state.event_log.iter().filter(|event| {
            filter.matches(event)
                && (filter.addrs.is_empty()
                    || filter
                        .addrs
                        .iter()
                        .any(|addr| event.event_key.ends_with(&addr.to_hex())))
        });
        Ok(match filter.limit {
            Some(limit) => matching.take(limit).cloned().collect(),
            None => matching.cloned().collect(),
        })
    }

    /// Supports `0x1::Account::balance<Token>(address)` and
    /// `0x1::Account::sequence_number(address)`.
    async fn call_contract(&self, call: &ContractCall) -> Result<Vec<Value>, GatewayError> {
        let function = &call.function_id;
        if function.module.address != AccountAddress::ONE
            || function.module.name.as_str() != "Account"
        {
            return Err(invalid_call(format!("function {} is not available", function)));
        }
        let address = match call.args.first().map(|a| a.parse::<TransactionArgument>()) {
            Some(Ok(TransactionArgument::Address(address))) => address,
            _ => return Err(invalid_call("expected one address argument")),
        };

        let state = self.state.read();
        let account = state.accounts.get(&address);
        match function.function.as_str() {
            "balance" => {
                let token = call
                    .type_args
                    .first()
                    .map(ToString::to_string)
                    .unwrap_or_else(stc_token_key);
                let balance = account.map(|a| a.balance(&token)).unwrap_or(0);
                Ok(vec![u128_json(balance)])
            }
            "sequence_number" => {
                let seq = account.map(|a| a.sequence_number).unwrap_or(0);
                Ok(vec![json!(seq)])
            }
            _ => Err(invalid_call(format!("function {} is not available", function))),
        }
    }

    async fn dry_run_raw(
        &self,
        raw: &RawUserTransaction,
        public_key: &AccountPublicKey,
    ) -> Result<DryRunOutput, GatewayError> {
        let mut scratch = {
            let state = self.state.read();
            state.check_sender(raw, AuthenticationKey::ed25519(public_key))?;
            state.clone()
        };
        let outcome = scratch.execute(raw);
        Ok(DryRunOutput {
            status: outcome.status,
            gas_used: outcome.gas_used,
            events: outcome.events,
        })
    }

    async fn get_resource(
        &self,
        address: AccountAddress,
        resource: &StructTag,
    ) -> Result<Option<ResourceView>, GatewayError> {
        Ok(self.state.read().resource(address, &resource.to_string()))
    }

    async fn get_resources(&self, address: AccountAddress) -> Result<ResourceListView, GatewayError> {
        Ok(self.state.read().resources_of(address))
    }

    async fn get_code(&self, module: &ModuleId) -> Result<Option<Vec<u8>>, GatewayError> {
        Ok(self.state.read().code.get(&module.to_string()).cloned())
    }

    async fn get_sequence_number(&self, address: AccountAddress) -> Result<u64, GatewayError> {
        Ok(self.state.read().next_sequence_number(address))
    }

    async fn get_balance(
        &self,
        address: AccountAddress,
        token: Option<&StructTag>,
    ) -> Result<Option<u128>, GatewayError> {
        let token = token.map(ToString::to_string).unwrap_or_else(stc_token_key);
        Ok(self
            .state
            .read()
            .accounts
            .get(&address)
            .and_then(|a| a.balances.get(&token).copied()))
    }

    async fn get_now_seconds(&self) -> Result<u64, GatewayError> {
        Ok(self.now_seconds())
    }

    async fn submit_transaction(&self, txn: &SignedUserTransaction) -> Result<HashValue, GatewayError> {
        let hash = txn.id()?;
        let mut state = self.state.write();
        if let Err(rejection) = state.admit(txn) {
            debug!(%hash, error = %rejection, "transaction refused");
            return Err(rejection.into());
        }
        state.pool.insert(
            (txn.sender(), txn.sequence_number()),
            PendingEntry {
                hash,
                txn: txn.clone(),
            },
        );
        debug!(
            %hash,
            sender = %txn.sender(),
            sequence_number = txn.sequence_number(),
            "transaction pooled"
        );
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::AccountKeypair;
    use crate::transaction::signing::sign_raw_user_transaction;
    use crate::transaction::transfer::peer_to_peer;
    use crate::types::RawUserTransactionBuilder;

    const FUNDS: u128 = 100_000_000;

    struct Fixture {
        gateway: InMemoryGateway,
        keypair: AccountKeypair,
        sender: AccountAddress,
    }

    fn fixture() -> Fixture {
        let gateway = InMemoryGateway::default();
        let keypair = AccountKeypair::from_bytes(&[7u8; 32]);
        let sender = gateway.create_account(AuthenticationKey::ed25519(&keypair.public_key()), FUNDS);
        Fixture {
            gateway,
            keypair,
            sender,
        }
    }

    impl Fixture {
        fn builder(&self, seq: u64, to: &str, amount: u128) -> RawUserTransactionBuilder {
            RawUserTransactionBuilder::new(self.sender, ChainId::dev(), peer_to_peer(to, amount, None).unwrap())
                .sequence_number(seq)
                .expiration_timestamp_secs(self.gateway.now_seconds() + 3_600)
        }

        fn transfer(&self, seq: u64, to: &str, amount: u128) -> SignedUserTransaction {
            sign_raw_user_transaction(&self.keypair, self.builder(seq, to, amount).build()).unwrap()
        }
    }

    fn rejection(result: Result<HashValue, GatewayError>) -> SubmissionError {
        match result {
            Err(GatewayError::Submission(e)) => e,
            other => panic!("expected a submission error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn transfer_executes_in_next_block() {
        let f = fixture();
        let hash = f.gateway.submit_transaction(&f.transfer(0, "0x2", 1024)).await.unwrap();
        assert!(f.gateway.get_transaction_info(hash).await.unwrap().is_none());
        assert_eq!(f.gateway.pending_count(), 1);

        let block = f.gateway.produce_block();
        assert_eq!(block.header.number, 1);
        assert_eq!(block.transaction_hashes(), vec![hash]);

        let info = f.gateway.get_transaction_info(hash).await.unwrap().unwrap();
        assert!(info.status.is_executed());
        assert_eq!(info.block_number, 1);
        assert_eq!(info.gas_used, SIMULATED_GAS_USED);

        let payee = AccountAddress::from_hex("0x2").unwrap();
        assert_eq!(f.gateway.get_balance(payee, None).await.unwrap(), Some(1024));
        assert_eq!(
            f.gateway.get_balance(f.sender, None).await.unwrap(),
            Some(FUNDS - 1024 - u128::from(SIMULATED_GAS_USED))
        );
        assert_eq!(f.gateway.get_sequence_number(f.sender).await.unwrap(), 1);
        assert_eq!(f.gateway.block_number().await.unwrap(), 1);

        let events = f.gateway.get_events_of_transaction(hash).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].type_tag.ends_with("::Account::WithdrawEvent"));
        assert!(events[1].type_tag.ends_with("::Account::DepositEvent"));
        assert_eq!(events[1].block_number, Some(1));
    }

    #[tokio::test]
    async fn sequence_numbers_count_pending() {
        let f = fixture();
        assert_eq!(f.gateway.get_sequence_number(f.sender).await.unwrap(), 0);
        f.gateway.submit_transaction(&f.transfer(0, "0x2", 1)).await.unwrap();
        f.gateway.submit_transaction(&f.transfer(1, "0x2", 1)).await.unwrap();
        assert_eq!(f.gateway.get_sequence_number(f.sender).await.unwrap(), 2);

        let unknown = AccountAddress::from_hex("0xdead").unwrap();
        assert_eq!(f.gateway.get_sequence_number(unknown).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sequence_reuse_and_gaps_are_refused() {
        let f = fixture();
        f.gateway.submit_transaction(&f.transfer(0, "0x2", 1)).await.unwrap();

        // Same sequence number, different payload, still pending.
        let reuse = f.gateway.submit_transaction(&f.transfer(0, "0x3", 2)).await;
        assert!(matches!(rejection(reuse), SubmissionError::SequenceNumberTooOld(_)));

        let gap = f.gateway.submit_transaction(&f.transfer(5, "0x2", 1)).await;
        assert!(matches!(rejection(gap), SubmissionError::SequenceNumberTooNew(_)));

        f.gateway.produce_block();
        let committed = f.gateway.submit_transaction(&f.transfer(0, "0x3", 2)).await;
        assert!(matches!(rejection(committed), SubmissionError::SequenceNumberTooOld(_)));
    }

    #[tokio::test]
    async fn expired_and_foreign_chain_transactions_are_refused() {
        let f = fixture();
        let raw = f
            .builder(0, "0x2", 1)
            .expiration_timestamp_secs(f.gateway.now_seconds())
            .build();
        let expired = sign_raw_user_transaction(&f.keypair, raw).unwrap();
        assert!(matches!(
            rejection(f.gateway.submit_transaction(&expired).await),
            SubmissionError::TransactionExpired(_)
        ));

        let mut raw = f.builder(0, "0x2", 1).build();
        raw.chain_id = ChainId::main();
        let foreign = sign_raw_user_transaction(&f.keypair, raw).unwrap();
        assert!(matches!(
            rejection(f.gateway.submit_transaction(&foreign).await),
            SubmissionError::Rejected(_)
        ));
    }

    #[tokio::test]
    async fn wrong_key_or_signature_is_refused() {
        let f = fixture();
        let intruder = AccountKeypair::from_bytes(&[8u8; 32]);
        let stolen = sign_raw_user_transaction(&intruder, f.builder(0, "0x2", 1).build()).unwrap();
        assert!(matches!(
            rejection(f.gateway.submit_transaction(&stolen).await),
            SubmissionError::InvalidSignature(_)
        ));

        let good = f.transfer(0, "0x2", 1);
        let forged = SignedUserTransaction::ed25519(
            good.raw_txn().clone(),
            f.keypair.public_key(),
            f.keypair.sign(b"something else"),
        );
        assert!(matches!(
            rejection(f.gateway.submit_transaction(&forged).await),
            SubmissionError::InvalidSignature(_)
        ));
    }

    #[tokio::test]
    async fn gas_limits_are_enforced() {
        let f = fixture();
        let raw = f.builder(0, "0x2", 1).max_gas_amount(MAX_GAS_UNITS + 1).build();
        let too_much = sign_raw_user_transaction(&f.keypair, raw).unwrap();
        assert!(matches!(
            rejection(f.gateway.submit_transaction(&too_much).await),
            SubmissionError::MaxGasExceeded(_)
        ));

        let raw = f.builder(0, "0x2", 1).gas_unit_price(1_000).build();
        let too_expensive = sign_raw_user_transaction(&f.keypair, raw).unwrap();
        assert!(matches!(
            rejection(f.gateway.submit_transaction(&too_expensive).await),
            SubmissionError::InsufficientBalanceForGas(_)
        ));
    }

    #[tokio::test]
    async fn unknown_sender_is_refused() {
        let gateway = InMemoryGateway::default();
        let keypair = AccountKeypair::from_bytes(&[9u8; 32]);
        let sender = AccountAddress::from_public_key(&keypair.public_key());
        let raw = RawUserTransactionBuilder::new(sender, ChainId::dev(), peer_to_peer("0x2", 1, None).unwrap())
            .expiration_timestamp_secs(gateway.now_seconds() + 60)
            .build();
        let txn = sign_raw_user_transaction(&keypair, raw).unwrap();
        assert!(matches!(
            rejection(gateway.submit_transaction(&txn).await),
            SubmissionError::Rejected(_)
        ));
    }

    #[tokio::test]
    async fn failures_still_consume_sequence_and_gas() {
        let f = fixture();
        f.gateway.fail_next_transaction(json!("OutOfGas"));
        let hash = f.gateway.submit_transaction(&f.transfer(0, "0x2", 10)).await.unwrap();
        f.gateway.produce_block();

        let info = f.gateway.get_transaction_info(hash).await.unwrap().unwrap();
        assert_eq!(info.status, TransactionStatus::Failed(json!("OutOfGas")));
        assert_eq!(f.gateway.get_sequence_number(f.sender).await.unwrap(), 1);
        assert_eq!(
            f.gateway.get_balance(f.sender, None).await.unwrap(),
            Some(FUNDS - u128::from(SIMULATED_GAS_USED))
        );
        let payee = AccountAddress::from_hex("0x2").unwrap();
        assert_eq!(f.gateway.get_balance(payee, None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn overdraft_aborts() {
        let f = fixture();
        let hash = f.gateway.submit_transaction(&f.transfer(0, "0x2", FUNDS)).await.unwrap();
        f.gateway.produce_block();
        let info = f.gateway.get_transaction_info(hash).await.unwrap().unwrap();
        assert!(info.status.to_string().contains("MoveAbort"));
    }

    #[tokio::test]
    async fn dry_run_leaves_state_alone() {
        let f = fixture();
        let raw = f.builder(0, "0x2", 500).build();
        let output = f.gateway.dry_run_raw(&raw, &f.keypair.public_key()).await.unwrap();
        assert!(output.status.is_executed());
        assert_eq!(output.gas_used, SIMULATED_GAS_USED);
        assert_eq!(output.events.len(), 2);

        assert_eq!(f.gateway.get_sequence_number(f.sender).await.unwrap(), 0);
        assert_eq!(f.gateway.get_balance(f.sender, None).await.unwrap(), Some(FUNDS));

        let other = AccountKeypair::from_bytes(&[3u8; 32]).public_key();
        assert!(matches!(
            f.gateway.dry_run_raw(&raw, &other).await,
            Err(GatewayError::Submission(SubmissionError::InvalidSignature(_)))
        ));
    }

    #[tokio::test]
    async fn receipt_identifier_creates_keyed_account() {
        let f = fixture();
        let payee_key = AccountKeypair::from_bytes(&[4u8; 32]);
        let auth_key = AuthenticationKey::ed25519(&payee_key.public_key());
        let receipt = crate::receipt_identifier::ReceiptIdentifier::new(
            auth_key.derived_address(),
            Some(auth_key),
        );
        f.gateway
            .submit_transaction(&f.transfer(0, &receipt.encode(), 77))
            .await
            .unwrap();
        f.gateway.produce_block();

        let resource = f
            .gateway
            .get_resource(auth_key.derived_address(), &"0x1::Account::Account".parse().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            resource.json.unwrap()["authentication_key"],
            json!(auth_key.to_string())
        );
    }

    #[tokio::test]
    async fn contract_calls_and_resources() {
        let f = fixture();
        let call = ContractCall {
            function_id: "0x1::Account::balance".parse().unwrap(),
            type_args: vec!["0x1::STC::STC".parse().unwrap()],
            args: vec![f.sender.to_string()],
        };
        assert_eq!(f.gateway.call_contract(&call).await.unwrap(), vec![json!(FUNDS as u64)]);

        let unsupported = ContractCall {
            function_id: "0x1::Dao::proposal".parse().unwrap(),
            type_args: vec![],
            args: vec![],
        };
        assert!(f.gateway.call_contract(&unsupported).await.is_err());

        let list = f.gateway.get_resources(f.sender).await.unwrap();
        assert!(list.resources.contains_key(&account_resource_key()));
        assert!(list.resources.contains_key(&balance_resource_key(&stc_token_key())));

        let tag: StructTag = "0x1::Foo::Bar".parse().unwrap();
        let view = ResourceView {
            raw: "0x01".to_string(),
            json: None,
        };
        f.gateway.set_resource(f.sender, &tag, view.clone());
        assert_eq!(f.gateway.get_resource(f.sender, &tag).await.unwrap(), Some(view));

        let module: ModuleId = "0x1::Foo".parse().unwrap();
        assert_eq!(f.gateway.get_code(&module).await.unwrap(), None);
        f.gateway.publish_module(&module, vec![0xa1, 0x1c]);
        assert_eq!(f.gateway.get_code(&module).await.unwrap(), Some(vec![0xa1, 0x1c]));
    }

    #[tokio::test]
    async fn blocks_and_event_queries() {
        let f = fixture();
        f.gateway.submit_transaction(&f.transfer(0, "0x2", 1)).await.unwrap();
        f.gateway.submit_transaction(&f.transfer(1, "0x3", 1)).await.unwrap();
        let block = f.gateway.produce_block();
        assert_eq!(f.gateway.produce_blocks(2), 3);

        let by_hash = f
            .gateway
            .get_block(BlockId::Hash(block.header.block_hash))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_hash, block);
        assert!(f.gateway.get_block(BlockId::Number(9)).await.unwrap().is_none());

        let deposits = EventFilter {
            type_tags: vec![format!("{}::Account::DepositEvent", AccountAddress::ONE)],
            ..EventFilter::default()
        };
        assert_eq!(f.gateway.query_events(&deposits).await.unwrap().len(), 2);

        let sender_only = EventFilter {
            addrs: vec![f.sender],
            limit: Some(1),
            ..EventFilter::default()
        };
        let events = f.gateway.query_events(&sender_only).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_seq_number, 0);
    }
}
