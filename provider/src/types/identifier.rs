// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Move identifiers, module ids, and function ids.

use std::fmt;
use std::str::FromStr;

use super::{impl_serde_via_str, AccountAddress, ParseError};
use crate::bcs::{BcsDeserialize, BcsDeserializer, BcsError, BcsSerialize, BcsSerializer};

// ---------------------------------------------------------------------------
// Identifier
// ---------------------------------------------------------------------------

/// A Move identifier: `[A-Za-z_][A-Za-z0-9_]*`, not a lone `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Result<Self, ParseError> {
        let s = s.into();
        if Self::is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(ParseError::InvalidIdentifier(s))
        }
    }

    pub fn is_valid(s: &str) -> bool {
        let mut chars = s.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => {}
            Some('_') if s.len() > 1 => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl BcsSerialize for Identifier {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        se.serialize_str(&self.0)
    }
}

impl BcsDeserialize for Identifier {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        let s = de.deserialize_str()?;
        Self::new(s).map_err(|e| BcsError::InvalidValue {
            type_name: "Identifier",
            reason: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// ModuleId
// ---------------------------------------------------------------------------

/// `address::Module`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleId {
    pub address: AccountAddress,
    pub name: Identifier,
}

impl ModuleId {
    pub fn new(address: AccountAddress, name: Identifier) -> Self {
        Self { address, name }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.address, self.name)
    }
}

impl FromStr for ModuleId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split("::").collect();
        let [address, name] = parts.as_slice() else {
            return Err(ParseError::InvalidFunctionId(s.to_string()));
        };
        Ok(Self {
            address: address.parse()?,
            name: name.parse()?,
        })
    }
}

impl_serde_via_str!(ModuleId);

impl BcsSerialize for ModuleId {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        self.address.bcs_serialize(se)?;
        self.name.bcs_serialize(se)
    }
}

impl BcsDeserialize for ModuleId {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self {
            address: BcsDeserialize::bcs_deserialize(de)?,
            name: BcsDeserialize::bcs_deserialize(de)?,
        })
    }
}

// ---------------------------------------------------------------------------
// FunctionId
// ---------------------------------------------------------------------------

/// `address::Module::function`, the string form callers use to name a
/// script function or a read-only contract function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionId {
    pub module: ModuleId,
    pub function: Identifier,
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.function)
    }
}

impl FromStr for FunctionId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split("::").collect();
        let [address, module, function] = parts.as_slice() else {
            return Err(ParseError::InvalidFunctionId(s.to_string()));
        };
        Ok(Self {
            module: ModuleId::new(address.parse()?, module.parse()?),
            function: function.parse()?,
        })
    }
}

impl_serde_via_str!(FunctionId);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bcs;

    #[test]
    fn identifier_rules() {
        assert!(Identifier::is_valid("peer_to_peer"));
        assert!(Identifier::is_valid("STC"));
        assert!(Identifier::is_valid("_private"));
        assert!(!Identifier::is_valid("_"));
        assert!(!Identifier::is_valid(""));
        assert!(!Identifier::is_valid("1abc"));
        assert!(!Identifier::is_valid("a-b"));
    }

    #[test]
    fn function_id_parses_and_prints() {
        let id: FunctionId = "0x1::TransferScripts::peer_to_peer".parse().unwrap();
        assert_eq!(id.module.address, AccountAddress::ONE);
        assert_eq!(id.module.name.as_str(), "TransferScripts");
        assert_eq!(id.function.as_str(), "peer_to_peer");
        assert_eq!(
            id.to_string(),
            "0x00000000000000000000000000000001::TransferScripts::peer_to_peer"
        );
        assert_eq!(id.to_string().parse::<FunctionId>().unwrap(), id);
    }

    #[test]
    fn function_id_rejects_wrong_arity() {
        assert!("0x1::TransferScripts".parse::<FunctionId>().is_err());
        assert!("0x1::A::b::c".parse::<FunctionId>().is_err());
        assert!("0x1::A::1b".parse::<FunctionId>().is_err());
    }

    #[test]
    fn module_id_bcs_layout() {
        let id: ModuleId = "0x1::STC".parse().unwrap();
        let bytes = bcs::to_bytes(&id).unwrap();
        assert_eq!(&bytes[..16], AccountAddress::ONE.as_bytes());
        assert_eq!(&bytes[16..], &[3, b'S', b'T', b'C']);
        assert_eq!(bcs::from_bytes::<ModuleId>(&bytes).unwrap(), id);
    }

    #[test]
    fn decoding_rejects_invalid_identifier() {
        let bytes = bcs::to_bytes("9lives").unwrap();
        assert!(matches!(
            bcs::from_bytes::<Identifier>(&bytes),
            Err(BcsError::InvalidValue { .. })
        ));
    }
}
