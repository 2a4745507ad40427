// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Signer
//!
//! Holds one account key and turns transaction requests into signed,
//! submitted transactions.
//!
//! ## Lock State
//!
//! ```text
//!            unlock(password) ok
//!   Locked ───────────────────────▶ Unlocked(keypair)
//!      ▲                                 │
//!      └─────────────── lock() ──────────┘
//! ```
//!
//! The secret key exists in memory only while unlocked. A failed unlock
//! leaves the state as it was, including an already unlocked signer.
//! Every signing operation on a locked signer fails with
//! [`AuthError::Locked`] before touching the node.
//!
//! The state sits behind a `tokio::sync::Mutex` held for the whole of each
//! operation, so `lock`, `unlock`, and the signing calls of one signer
//! never interleave. Two signers for the same account still race on
//! sequence numbers; the loser gets
//! [`SubmissionError::SequenceNumberTooOld`](crate::gateway::SubmissionError).

pub mod keystore;
pub mod request;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::bcs::BcsError;
use crate::config::ProviderConfig;
use crate::confirmation::PendingTransaction;
use crate::crypto::keys::{AccountKeypair, AccountPublicKey};
use crate::gateway::{GatewayError, NodeGateway, TransactionStatus};
use crate::transaction::signing::{sign_message, sign_raw_user_transaction, SignedMessage};
use crate::types::{AccountAddress, RawUserTransaction, SignedUserTransaction};

pub use keystore::{Keystore, KeystoreError};
pub use request::TransactionRequest;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("signer is locked")]
    Locked,

    #[error("credential rejected")]
    BadCredential,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignerError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Keystore(KeystoreError),

    #[error("transaction sender {actual} is not the signer account {expected}")]
    SenderMismatch {
        expected: AccountAddress,
        actual: AccountAddress,
    },

    #[error(transparent)]
    Encoding(#[from] BcsError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("dry run did not execute: {0}")]
    DryRunFailed(TransactionStatus),
}

impl From<KeystoreError> for SignerError {
    fn from(err: KeystoreError) -> Self {
        match err {
            KeystoreError::BadPassword => Self::Auth(AuthError::BadCredential),
            other => Self::Keystore(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Signer
// ---------------------------------------------------------------------------

enum SignerState {
    Locked,
    Unlocked(AccountKeypair),
}

impl SignerState {
    fn keypair(&self) -> Result<&AccountKeypair, AuthError> {
        match self {
            Self::Locked => Err(AuthError::Locked),
            Self::Unlocked(keypair) => Ok(keypair),
        }
    }
}

/// An account signer bound to a gateway. Starts locked.
pub struct Signer<G: ?Sized> {
    gateway: Arc<G>,
    keystore: Keystore,
    config: ProviderConfig,
    state: Mutex<SignerState>,
}

impl<G: ?Sized> fmt::Debug for Signer<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.keystore.address())
            .finish_non_exhaustive()
    }
}

impl<G: NodeGateway + ?Sized> Signer<G> {
    pub fn new(gateway: Arc<G>, keystore: Keystore) -> Self {
        Self {
            gateway,
            keystore,
            config: ProviderConfig::default(),
            state: Mutex::new(SignerState::Locked),
        }
    }

    pub fn with_config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn address(&self) -> AccountAddress {
        self.keystore.address()
    }

    pub fn public_key(&self) -> AccountPublicKey {
        self.keystore.public_key()
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub async fn is_unlocked(&self) -> bool {
        matches!(*self.state.lock().await, SignerState::Unlocked(_))
    }

    /// Opens the keystore with `password`. Unlocking an unlocked signer
    /// with its own password is a no-op.
    pub async fn unlock(&self, password: &str) -> Result<(), SignerError> {
        let mut state = self.state.lock().await;
        let keypair = self.keystore.decrypt(password).map_err(|e| {
            debug!(address = %self.address(), "unlock refused");
            SignerError::from(e)
        })?;
        if matches!(*state, SignerState::Locked) {
            *state = SignerState::Unlocked(keypair);
            info!(address = %self.address(), "signer unlocked");
        }
        Ok(())
    }

    /// Drops the secret key.
    pub async fn lock(&self) {
        *self.state.lock().await = SignerState::Locked;
        info!(address = %self.address(), "signer locked");
    }

    /// Signs an off-chain message for the node's chain.
    pub async fn sign_message(&self, message: &[u8]) -> Result<SignedMessage, SignerError> {
        let state = self.state.lock().await;
        let keypair = state.keypair()?;
        let chain_id = self.gateway.chain_id().await?;
        Ok(sign_message(keypair, self.address(), message, chain_id)?)
    }

    /// Signs `raw` as-is. Its sender must be this signer's account.
    pub async fn sign_transaction(
        &self,
        raw: RawUserTransaction,
    ) -> Result<SignedUserTransaction, SignerError> {
        let state = self.state.lock().await;
        let keypair = state.keypair()?;
        self.sign_with(keypair, raw)
    }

    /// Fills in `request`, signs it, and submits it. Node rejections come
    /// back as [`SignerError::Gateway`] unchanged; nothing is retried.
    pub async fn send_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<PendingTransaction<G>, SignerError> {
        let state = self.state.lock().await;
        let keypair = state.keypair()?;
        let raw = self.populate(request).await?;
        let signed = self.sign_with(keypair, raw)?;
        let hash = self.gateway.submit_transaction(&signed).await?;
        drop(state);

        info!(
            %hash,
            sender = %signed.sender(),
            sequence_number = signed.sequence_number(),
            "transaction sent"
        );
        Ok(PendingTransaction::new(
            hash,
            Arc::clone(&self.gateway),
            self.config.poll_interval(),
        ))
    }

    /// Gas the request would use, from a dry run with the public key.
    /// Works while locked.
    pub async fn estimate_gas(&self, request: TransactionRequest) -> Result<u64, SignerError> {
        let raw = self.populate(request).await?;
        let output = self.gateway.dry_run_raw(&raw, &self.public_key()).await?;
        if !output.status.is_executed() {
            return Err(SignerError::DryRunFailed(output.status));
        }
        Ok(output.gas_used)
    }

    /// Builds the raw transaction `send_transaction` would sign.
    pub async fn populate(
        &self,
        request: TransactionRequest,
    ) -> Result<RawUserTransaction, SignerError> {
        let sender = self.address();
        let sequence_number = match request.sequence_number {
            Some(n) => n,
            None => self.gateway.get_sequence_number(sender).await?,
        };
        let chain_id = match request.chain_id {
            Some(id) => id,
            None => self.gateway.chain_id().await?,
        };
        let expiration_timestamp_secs = match request.expiration_timestamp_secs {
            Some(secs) => secs,
            None => self
                .gateway
                .get_now_seconds()
                .await?
                .saturating_add(self.config.expiration_ttl_secs),
        };

        Ok(RawUserTransaction {
            sender,
            sequence_number,
            payload: request.payload,
            max_gas_amount: request.max_gas_amount.unwrap_or(self.config.max_gas_amount),
            gas_unit_price: request.gas_unit_price.unwrap_or(self.config.gas_unit_price),
            gas_token_code: request
                .gas_token_code
                .unwrap_or_else(|| self.config.gas_token_code.clone()),
            expiration_timestamp_secs,
            chain_id,
        })
    }

    fn sign_with(
        &self,
        keypair: &AccountKeypair,
        raw: RawUserTransaction,
    ) -> Result<SignedUserTransaction, SignerError> {
        if raw.sender != self.address() {
            return Err(SignerError::SenderMismatch {
                expected: self.address(),
                actual: raw.sender,
            });
        }
        Ok(sign_raw_user_transaction(keypair, raw)?)
    }
}
