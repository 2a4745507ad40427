//! Signing and payload helpers built on the transaction model.

pub mod signing;
pub mod transfer;

pub use signing::{message_signing_input, sign_message, sign_raw_user_transaction, SignedMessage};
pub use transfer::{peer_to_peer, peer_to_peer_payload, Payee, TransferError};
