// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Token transfer payloads.

use thiserror::Error;

use crate::bcs::BcsError;
use crate::receipt_identifier::{ReceiptIdentifier, ReceiptIdentifierError};
use crate::types::{
    AccountAddress, AuthenticationKey, FunctionId, ParseError, ScriptFunction, StructTag,
    TransactionArgument, TransactionPayload, TypeTag,
};

/// Script function that moves tokens between accounts, creating the payee
/// if it does not exist yet.
pub const PEER_TO_PEER_FUNCTION: &str = "0x1::TransferScripts::peer_to_peer";

/// The native token.
pub const STC_TOKEN: &str = "0x1::STC::STC";

/// Errors from building a transfer payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("invalid receiver address: {0}")]
    Receiver(#[from] ParseError),

    #[error("invalid receiver receipt identifier: {0}")]
    ReceiptIdentifier(#[from] ReceiptIdentifierError),

    #[error(transparent)]
    Encoding(#[from] BcsError),
}

/// A transfer payee: an address, plus the auth key when the account may
/// need to be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payee {
    pub address: AccountAddress,
    pub auth_key: Option<AuthenticationKey>,
}

impl Payee {
    /// Accepts either a hex address or a receipt identifier.
    pub fn parse(receiver: &str) -> Result<Self, TransferError> {
        if ReceiptIdentifier::looks_like(receiver) {
            let id: ReceiptIdentifier = receiver.parse()?;
            return Ok(Self {
                address: id.address,
                auth_key: id.auth_key,
            });
        }
        Ok(Self {
            address: receiver.parse()?,
            auth_key: None,
        })
    }
}

impl From<AccountAddress> for Payee {
    fn from(address: AccountAddress) -> Self {
        Self {
            address,
            auth_key: None,
        }
    }
}

/// Builds the `peer_to_peer` call for `payee`. The auth key argument is
/// the empty byte string when none is known.
pub fn peer_to_peer_payload(
    payee: Payee,
    amount: u128,
    token: Option<&StructTag>,
) -> Result<TransactionPayload, TransferError> {
    let token = match token {
        Some(tag) => tag.clone(),
        None => STC_TOKEN.parse()?,
    };
    let function: FunctionId = PEER_TO_PEER_FUNCTION.parse()?;
    let auth_key = payee
        .auth_key
        .map(|key| key.as_bytes().to_vec())
        .unwrap_or_default();

    let call = ScriptFunction::from_function_id(
        function,
        vec![TypeTag::from(token)],
        &[
            TransactionArgument::Address(payee.address),
            TransactionArgument::U8Vector(auth_key),
            TransactionArgument::U128(amount),
        ],
    )?;
    Ok(TransactionPayload::ScriptFunction(call))
}

/// Parses `receiver` (hex address or receipt identifier) and builds the
/// `peer_to_peer` payload. `token` defaults to STC.
pub fn peer_to_peer(
    receiver: &str,
    amount: u128,
    token: Option<&StructTag>,
) -> Result<TransactionPayload, TransferError> {
    peer_to_peer_payload(Payee::parse(receiver)?, amount, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(payload: TransactionPayload) -> ScriptFunction {
        match payload {
            TransactionPayload::ScriptFunction(call) => call,
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn hex_receiver_gets_empty_auth_key() {
        let call = call(peer_to_peer("0x1", 1024, None).unwrap());
        assert_eq!(
            call.function_id(),
            PEER_TO_PEER_FUNCTION.parse::<FunctionId>().unwrap()
        );
        assert_eq!(call.ty_args, vec![STC_TOKEN.parse::<TypeTag>().unwrap()]);
        assert_eq!(call.args[0], AccountAddress::ONE.as_bytes().to_vec());
        assert_eq!(call.args[1], vec![0u8]);
        assert_eq!(call.args[2], 1024u128.to_le_bytes().to_vec());
    }

    #[test]
    fn receipt_identifier_supplies_auth_key() {
        let key = AuthenticationKey::new([9u8; 32]);
        let id = ReceiptIdentifier::new(key.derived_address(), Some(key));
        let call = call(peer_to_peer(&id.encode(), 1, None).unwrap());
        assert_eq!(call.args[0], key.derived_address().as_bytes().to_vec());
        let mut expected = vec![32u8];
        expected.extend_from_slice(&[9u8; 32]);
        assert_eq!(call.args[1], expected);
    }

    #[test]
    fn custom_token() {
        let token: StructTag = "0x1::XUSDT::XUSDT".parse().unwrap();
        let call = call(peer_to_peer("0x2", 5, Some(&token)).unwrap());
        assert_eq!(call.ty_args, vec![TypeTag::from(token)]);
    }

    #[test]
    fn bad_receivers() {
        assert!(matches!(
            peer_to_peer("not-an-address", 1, None),
            Err(TransferError::Receiver(_))
        ));
        assert!(matches!(
            peer_to_peer("stc1qqqqqq", 1, None),
            Err(TransferError::ReceiptIdentifier(_))
        ));
    }
}
