// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Transaction and message signing with account keypairs.
//!
//! Two signing inputs exist and they never share a prefix:
//!
//! ```text
//! transaction  sha3_256("STARCOIN::RawUserTransaction") ‖ bcs(raw_txn)
//! message      sha3_256("STARCOIN::SigningMessage")     ‖ bcs(bytes)
//! ```
//!
//! A signature over an arbitrary message therefore can never be replayed
//! as a transaction signature, whatever bytes the message holds.

use crate::bcs::{self, BcsDeserialize, BcsDeserializer, BcsError, BcsSerialize, BcsSerializer};
use crate::config::SIGNING_MESSAGE_SALT;
use crate::crypto::hash::salted_message;
use crate::crypto::keys::{AccountKeypair, AccountPublicKey, AccountSignature};
use crate::types::{
    AccountAddress, ChainId, RawUserTransaction, SignedUserTransaction, TransactionAuthenticator,
};

/// Signs a raw transaction. The result carries the keypair's public key.
///
/// The caller is responsible for `raw.sender` matching the key's account.
pub fn sign_raw_user_transaction(
    keypair: &AccountKeypair,
    raw: RawUserTransaction,
) -> Result<SignedUserTransaction, BcsError> {
    let signature = keypair.sign(&raw.signing_message()?);
    Ok(SignedUserTransaction::ed25519(
        raw,
        keypair.public_key(),
        signature,
    ))
}

/// The exact bytes signed for an arbitrary message.
pub fn message_signing_input(message: &[u8]) -> Result<Vec<u8>, BcsError> {
    let mut se = BcsSerializer::with_capacity(message.len() + 5);
    se.serialize_bytes(message)?;
    Ok(salted_message(SIGNING_MESSAGE_SALT, &se.into_bytes()))
}

// ---------------------------------------------------------------------------
// SignedMessage
// ---------------------------------------------------------------------------

/// An off-chain message signed by an account key.
///
/// BCS layout: `account ‖ bytes(message) ‖ authenticator ‖ chain_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    pub account: AccountAddress,
    pub message: Vec<u8>,
    pub authenticator: TransactionAuthenticator,
    pub chain_id: ChainId,
}

impl SignedMessage {
    pub fn public_key(&self) -> Option<&AccountPublicKey> {
        match &self.authenticator {
            TransactionAuthenticator::Ed25519 { public_key, .. } => Some(public_key),
            TransactionAuthenticator::MultiEd25519 { .. } => None,
        }
    }

    pub fn signature(&self) -> Option<&AccountSignature> {
        match &self.authenticator {
            TransactionAuthenticator::Ed25519 { signature, .. } => Some(signature),
            TransactionAuthenticator::MultiEd25519 { .. } => None,
        }
    }

    /// Verifies the signature over the message signing input.
    pub fn verify(&self) -> bool {
        let (Some(public_key), Some(signature)) = (self.public_key(), self.signature()) else {
            return false;
        };
        match message_signing_input(&self.message) {
            Ok(input) => public_key.verify(&input, signature),
            Err(_) => false,
        }
    }

    /// Verifies the signature and that the key's derived address is the
    /// claimed account. Fails for accounts that rotated their key.
    pub fn verify_for_account(&self) -> bool {
        self.verify()
            && self.authenticator.authentication_key().derived_address() == self.account
    }

    pub fn to_hex(&self) -> Result<String, BcsError> {
        Ok(hex::encode(bcs::to_bytes(self)?))
    }

    pub fn from_hex(s: &str) -> Result<Self, BcsError> {
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s)).map_err(|e| {
            BcsError::InvalidValue {
                type_name: "SignedMessage",
                reason: e.to_string(),
            }
        })?;
        bcs::from_bytes(&bytes)
    }
}

impl BcsSerialize for SignedMessage {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        self.account.bcs_serialize(se)?;
        se.serialize_bytes(&self.message)?;
        self.authenticator.bcs_serialize(se)?;
        self.chain_id.bcs_serialize(se)
    }
}

impl BcsDeserialize for SignedMessage {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self {
            account: BcsDeserialize::bcs_deserialize(de)?,
            message: de.deserialize_bytes()?,
            authenticator: BcsDeserialize::bcs_deserialize(de)?,
            chain_id: BcsDeserialize::bcs_deserialize(de)?,
        })
    }
}

/// Signs `message` for `account`.
pub fn sign_message(
    keypair: &AccountKeypair,
    account: AccountAddress,
    message: &[u8],
    chain_id: ChainId,
) -> Result<SignedMessage, BcsError> {
    let signature = keypair.sign(&message_signing_input(message)?);
    Ok(SignedMessage {
        account,
        message: message.to_vec(),
        authenticator: TransactionAuthenticator::Ed25519 {
            public_key: keypair.public_key(),
            signature,
        },
        chain_id,
    })
}
