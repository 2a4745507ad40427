// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Signed user transactions.

use super::{AccountAddress, AuthenticationKey, RawUserTransaction};
use crate::bcs::{self, BcsDeserialize, BcsDeserializer, BcsError, BcsSerialize, BcsSerializer};
use crate::config::SIGNED_TXN_SALT;
use crate::crypto::hash::{crypto_hash, HashValue};
use crate::crypto::keys::{AccountPublicKey, AccountSignature};

// ---------------------------------------------------------------------------
// TransactionAuthenticator
// ---------------------------------------------------------------------------

/// Proof that the sender authorized a raw transaction.
///
/// Keys and signatures are encoded as length-prefixed byte strings.
/// Multi-signature material is carried opaquely; this crate only produces
/// single-key signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionAuthenticator {
    Ed25519 {
        public_key: AccountPublicKey,
        signature: AccountSignature,
    },
    MultiEd25519 {
        public_key: Vec<u8>,
        signature: Vec<u8>,
    },
}

impl TransactionAuthenticator {
    /// Authentication key of the signer(s).
    pub fn authentication_key(&self) -> AuthenticationKey {
        match self {
            Self::Ed25519 { public_key, .. } => AuthenticationKey::ed25519(public_key),
            Self::MultiEd25519 { public_key, .. } => AuthenticationKey::from_preimage(
                public_key,
                super::SignatureScheme::MultiEd25519,
            ),
        }
    }
}

impl BcsSerialize for TransactionAuthenticator {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        match self {
            Self::Ed25519 {
                public_key,
                signature,
            } => {
                se.serialize_variant_index(0);
                se.serialize_bytes(public_key.as_bytes())?;
                se.serialize_bytes(signature.as_bytes())
            }
            Self::MultiEd25519 {
                public_key,
                signature,
            } => {
                se.serialize_variant_index(1);
                se.serialize_bytes(public_key)?;
                se.serialize_bytes(signature)
            }
        }
    }
}

impl BcsDeserialize for TransactionAuthenticator {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        match de.deserialize_variant_index()? {
            0 => {
                let public_key = AccountPublicKey::try_from_slice(&de.deserialize_bytes()?)
                    .map_err(|e| BcsError::InvalidValue {
                        type_name: "Ed25519PublicKey",
                        reason: e.to_string(),
                    })?;
                let signature = AccountSignature::try_from_slice(&de.deserialize_bytes()?)
                    .map_err(|e| BcsError::InvalidValue {
                        type_name: "Ed25519Signature",
                        reason: e.to_string(),
                    })?;
                Ok(Self::Ed25519 {
                    public_key,
                    signature,
                })
            }
            1 => Ok(Self::MultiEd25519 {
                public_key: de.deserialize_bytes()?,
                signature: de.deserialize_bytes()?,
            }),
            index => Err(BcsError::InvalidVariant {
                type_name: "TransactionAuthenticator",
                index,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// SignedUserTransaction
// ---------------------------------------------------------------------------

/// A raw transaction plus its authenticator. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUserTransaction {
    raw_txn: RawUserTransaction,
    authenticator: TransactionAuthenticator,
}

impl SignedUserTransaction {
    pub fn new(raw_txn: RawUserTransaction, authenticator: TransactionAuthenticator) -> Self {
        Self {
            raw_txn,
            authenticator,
        }
    }

    pub fn ed25519(
        raw_txn: RawUserTransaction,
        public_key: AccountPublicKey,
        signature: AccountSignature,
    ) -> Self {
        Self::new(
            raw_txn,
            TransactionAuthenticator::Ed25519 {
                public_key,
                signature,
            },
        )
    }

    pub fn raw_txn(&self) -> &RawUserTransaction {
        &self.raw_txn
    }

    pub fn authenticator(&self) -> &TransactionAuthenticator {
        &self.authenticator
    }

    pub fn sender(&self) -> AccountAddress {
        self.raw_txn.sender
    }

    pub fn sequence_number(&self) -> u64 {
        self.raw_txn.sequence_number
    }

    /// Transaction hash: `sha3_256(sha3_256("STARCOIN::SignedUserTransaction") ‖ bcs(self))`.
    pub fn id(&self) -> Result<HashValue, BcsError> {
        Ok(crypto_hash(SIGNED_TXN_SALT, &self.to_bcs_bytes()?))
    }

    pub fn to_bcs_bytes(&self) -> Result<Vec<u8>, BcsError> {
        bcs::to_bytes(self)
    }

    /// Hex of the BCS bytes, the form `txpool.submit_hex_transaction` takes.
    pub fn to_hex(&self) -> Result<String, BcsError> {
        Ok(hex::encode(self.to_bcs_bytes()?))
    }

    pub fn from_hex(s: &str) -> Result<Self, BcsError> {
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s)).map_err(|e| {
            BcsError::InvalidValue {
                type_name: "SignedUserTransaction",
                reason: e.to_string(),
            }
        })?;
        bcs::from_bytes(&bytes)
    }

    /// Checks an Ed25519 signature against the raw transaction's signing
    /// message. Multi-signature authenticators are not checked locally and
    /// report `false`.
    pub fn verify_signature(&self) -> bool {
        let TransactionAuthenticator::Ed25519 {
            public_key,
            signature,
        } = &self.authenticator
        else {
            return false;
        };
        match self.raw_txn.signing_message() {
            Ok(message) => public_key.verify(&message, signature),
            Err(_) => false,
        }
    }
}

impl BcsSerialize for SignedUserTransaction {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        self.raw_txn.bcs_serialize(se)?;
        self.authenticator.bcs_serialize(se)
    }
}

impl BcsDeserialize for SignedUserTransaction {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self {
            raw_txn: BcsDeserialize::bcs_deserialize(de)?,
            authenticator: BcsDeserialize::bcs_deserialize(de)?,
        })
    }
}
