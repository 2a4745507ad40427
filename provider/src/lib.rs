// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # stc-provider
//!
//! Client library for Starcoin nodes: build a transaction, sign it, submit
//! it, and follow it until it is confirmed. Also reads chain state (blocks,
//! transactions, events, resources, contract calls) through the same
//! gateway.
//!
//! ## Architecture
//!
//! Leaf modules first:
//!
//! - **bcs**: Binary Canonical Serialization, the wire format of
//!   everything that gets signed or hashed.
//! - **crypto**: Ed25519 keys, SHA3-256 salted hashes, AES-256-GCM sealing.
//! - **types**: Addresses, auth keys, type tags, payloads, raw and signed
//!   transactions.
//! - **transaction**: Signing messages and the `peer_to_peer` transfer
//!   builder.
//! - **receipt_identifier**: bech32 `stc1…` strings carrying an address
//!   and an optional auth key.
//! - **gateway**: The `NodeGateway` trait, its JSON-RPC implementation,
//!   and an in-memory dev chain.
//! - **signer**: Password-locked account key that signs and sends.
//! - **confirmation**: `PendingTransaction`: poll until confirmed, failed,
//!   timed out, or cancelled.
//! - **config**: Protocol constants and `ProviderConfig`.
//!
//! ## Data Flow
//!
//! ```text
//! payload ─▶ RawUserTransaction ─▶ BCS ─▶ signing message ─▶ SignedUserTransaction
//!        ─▶ NodeGateway::submit_transaction ─▶ PendingTransaction::wait
//! ```
//!
//! No HTTP client ships with the crate. Implement
//! [`gateway::Transport`] over whatever client the application already
//! uses and hand it to [`gateway::JsonRpcProvider`].

pub mod bcs;
pub mod config;
pub mod confirmation;
pub mod crypto;
pub mod gateway;
pub mod receipt_identifier;
pub mod signer;
pub mod transaction;
pub mod types;

pub use confirmation::{ConfirmationState, PendingTransaction, WaitError};
pub use gateway::{GatewayError, NodeGateway, SubmissionError};
pub use receipt_identifier::ReceiptIdentifier;
pub use signer::{AuthError, Keystore, Signer, SignerError, TransactionRequest};
