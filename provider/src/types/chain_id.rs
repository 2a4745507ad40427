// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Chain identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bcs::{BcsDeserialize, BcsDeserializer, BcsError, BcsSerialize, BcsSerializer};
use crate::config::{self, CHAIN_ID_DEV, CHAIN_ID_MAIN, CHAIN_ID_TEST};

/// One-byte network id carried by every transaction. The node rejects a
/// transaction whose chain id differs from its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u8);

impl ChainId {
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    pub const fn main() -> Self {
        Self(CHAIN_ID_MAIN)
    }

    pub const fn dev() -> Self {
        Self(CHAIN_ID_DEV)
    }

    pub const fn test() -> Self {
        Self(CHAIN_ID_TEST)
    }

    pub fn id(self) -> u8 {
        self.0
    }

    pub fn network_name(self) -> String {
        config::network_name(self.0)
    }
}

impl From<u8> for ChainId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl BcsSerialize for ChainId {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        se.serialize_u8(self.0);
        Ok(())
    }
}

impl BcsDeserialize for ChainId {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        de.deserialize_u8().map(Self)
    }
}
