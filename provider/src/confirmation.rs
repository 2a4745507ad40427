// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Confirmation Engine
//!
//! Follows a submitted transaction until it is buried under enough blocks,
//! fails, times out, or the caller gives up.
//!
//! ## State Machine
//!
//! ```text
//! Submitted ──poll──▶ Pending ──▶ Included{n} ──▶ Confirmed{n, head}
//!                        │              │
//!                        │              └──▶ Failed{n, status}   (status != Executed)
//!                        └──▶ TimedOut at the deadline; cancel is a WaitError only
//! ```
//!
//! ## Timing
//!
//! A wait has one absolute deadline, fixed when it starts. Each poll runs
//! under `timeout_at(deadline)`, and the pause between polls never sleeps
//! past it, so a never-included transaction times out no earlier than the
//! deadline and no later than one poll interval after it.
//!
//! Cancellation uses a `watch::Receiver<bool>`: sending `true` or dropping
//! the sender ends the wait. The transaction itself is unaffected; it may
//! still be included later.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::crypto::hash::HashValue;
use crate::gateway::{GatewayError, NodeGateway, TransactionInfoView, TransactionStatus};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WaitError {
    /// The deadline passed before the transaction reached the required
    /// depth. It may still be included later.
    #[error("transaction {hash} not confirmed within {waited:?}")]
    Timeout { hash: HashValue, waited: Duration },

    /// The transaction was included but did not execute successfully.
    #[error("transaction {hash} failed in block {block_number}: {status}")]
    ExecutionFailed {
        hash: HashValue,
        block_number: u64,
        status: TransactionStatus,
    },

    #[error("wait for transaction {0} cancelled")]
    Cancelled(HashValue),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

// ---------------------------------------------------------------------------
// ConfirmationState
// ---------------------------------------------------------------------------

/// Where a submitted transaction stands, as of the last poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationState {
    /// Accepted by the node, not yet polled.
    Submitted,
    /// Not in any block yet.
    Pending,
    /// In block `block_number`, not yet deep enough.
    Included { block_number: u64 },
    /// In block `block_number`, with the chain head at `head`.
    Confirmed { block_number: u64, head: u64 },
    /// Included, but execution failed.
    Failed {
        block_number: u64,
        status: TransactionStatus,
    },
    /// A wait gave up at its deadline. The transaction may still land.
    TimedOut,
}

impl fmt::Display for ConfirmationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => f.write_str("submitted"),
            Self::Pending => f.write_str("pending"),
            Self::Included { block_number } => write!(f, "included in #{}", block_number),
            Self::Confirmed { block_number, head } => {
                write!(f, "confirmed in #{} (head #{})", block_number, head)
            }
            Self::Failed {
                block_number,
                status,
            } => write!(f, "failed in #{}: {}", block_number, status),
            Self::TimedOut => f.write_str("timed out"),
        }
    }
}

// ---------------------------------------------------------------------------
// PendingTransaction
// ---------------------------------------------------------------------------

/// Handle on a submitted transaction.
pub struct PendingTransaction<G: ?Sized> {
    hash: HashValue,
    gateway: Arc<G>,
    submitted_at: Instant,
    poll_interval: Duration,
    last_state: Mutex<ConfirmationState>,
}

impl<G: ?Sized> fmt::Debug for PendingTransaction<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("hash", &self.hash)
            .field("submitted_at", &self.submitted_at)
            .field("poll_interval", &self.poll_interval)
            .field("last_state", &*self.last_state.lock())
            .finish()
    }
}

impl<G: NodeGateway + ?Sized> PendingTransaction<G> {
    pub fn new(hash: HashValue, gateway: Arc<G>, poll_interval: Duration) -> Self {
        Self {
            hash,
            gateway,
            submitted_at: Instant::now(),
            poll_interval,
            last_state: Mutex::new(ConfirmationState::Submitted),
        }
    }

    pub fn hash(&self) -> HashValue {
        self.hash
    }

    pub fn submitted_at(&self) -> Instant {
        self.submitted_at
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// State seen by the most recent poll, without contacting the node.
    pub fn last_state(&self) -> ConfirmationState {
        self.last_state.lock().clone()
    }

    /// Polls once. A transaction counts as confirmed here once one block
    /// sits on top of its own.
    pub async fn status(&self) -> Result<ConfirmationState, WaitError> {
        let (state, _) = self.poll(1).await?;
        Ok(state)
    }

    /// Waits until the transaction's block has `confirmations` blocks on
    /// top of it. Zero resolves as soon as it is included.
    pub async fn wait(
        &self,
        confirmations: u32,
        timeout: Duration,
    ) -> Result<TransactionInfoView, WaitError> {
        // The sender stays alive for the whole wait, so only the deadline
        // can end it.
        let (_never, cancel) = watch::channel(false);
        self.wait_with_cancel(confirmations, timeout, cancel).await
    }

    /// [`wait`](Self::wait) that also ends with [`WaitError::Cancelled`]
    /// when `cancel` turns `true` or its sender is dropped.
    pub async fn wait_with_cancel(
        &self,
        confirmations: u32,
        timeout: Duration,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<TransactionInfoView, WaitError> {
        let started = Instant::now();
        let deadline = started + timeout;
        let timed_out = || {
            warn!(hash = %self.hash, waited = ?started.elapsed(), "confirmation timed out");
            *self.last_state.lock() = ConfirmationState::TimedOut;
            WaitError::Timeout {
                hash: self.hash,
                waited: started.elapsed(),
            }
        };

        loop {
            let outcome = tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => return Err(self.cancelled()),
                polled = time::timeout_at(deadline, self.poll(confirmations)) => polled,
            };

            match outcome {
                Err(_elapsed) => return Err(timed_out()),
                Ok(Err(e)) => return Err(e),
                Ok(Ok((ConfirmationState::Confirmed { block_number, head }, Some(info)))) => {
                    info!(
                        hash = %self.hash,
                        block_number,
                        head,
                        confirmations,
                        "transaction confirmed"
                    );
                    return Ok(info);
                }
                Ok(Ok((ConfirmationState::Failed { block_number, status }, _))) => {
                    warn!(hash = %self.hash, block_number, %status, "transaction failed");
                    return Err(WaitError::ExecutionFailed {
                        hash: self.hash,
                        block_number,
                        status,
                    });
                }
                Ok(Ok(_)) => {}
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(timed_out());
            }
            let wake = (now + self.poll_interval).min(deadline);
            tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => return Err(self.cancelled()),
                _ = time::sleep_until(wake) => {}
            }
            if Instant::now() >= deadline {
                return Err(timed_out());
            }
        }
    }

    fn cancelled(&self) -> WaitError {
        debug!(hash = %self.hash, "confirmation wait cancelled");
        WaitError::Cancelled(self.hash)
    }

    async fn poll(
        &self,
        confirmations: u32,
    ) -> Result<(ConfirmationState, Option<TransactionInfoView>), WaitError> {
        let info = self.gateway.get_transaction_info(self.hash).await?;
        let (state, info) = match info {
            None => (ConfirmationState::Pending, None),
            Some(info) if !info.status.is_executed() => (
                ConfirmationState::Failed {
                    block_number: info.block_number,
                    status: info.status.clone(),
                },
                Some(info),
            ),
            Some(info) => {
                let head = self.gateway.block_number().await?;
                let state = if info.block_number.saturating_add(u64::from(confirmations)) <= head {
                    ConfirmationState::Confirmed {
                        block_number: info.block_number,
                        head,
                    }
                } else {
                    ConfirmationState::Included {
                        block_number: info.block_number,
                    }
                };
                (state, Some(info))
            }
        };
        debug!(hash = %self.hash, state = %state, "polled");
        *self.last_state.lock() = state.clone();
        Ok((state, info))
    }
}

/// Resolves once `cancel` holds `true` or its sender is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            return;
        }
    }
}
