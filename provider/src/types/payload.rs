// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Transaction payloads.

use super::{AccountAddress, FunctionId, Identifier, ModuleId, TransactionArgument, TypeTag};
use crate::bcs::{BcsDeserialize, BcsDeserializer, BcsError, BcsSerialize, BcsSerializer};

// ---------------------------------------------------------------------------
// Payload variants
// ---------------------------------------------------------------------------

/// Compiled script bytecode with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub code: Vec<u8>,
    pub ty_args: Vec<TypeTag>,
    pub args: Vec<Vec<u8>>,
}

/// One compiled module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub code: Vec<u8>,
}

/// A bundle of modules published at one address, with an optional
/// initialization call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub package_address: AccountAddress,
    pub modules: Vec<Module>,
    pub init_script: Option<ScriptFunction>,
}

/// A call to an on-chain script function.
///
/// `args` holds already-encoded BCS values and is never re-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFunction {
    pub module: ModuleId,
    pub function: Identifier,
    pub ty_args: Vec<TypeTag>,
    pub args: Vec<Vec<u8>>,
}

impl ScriptFunction {
    pub fn new(
        module: ModuleId,
        function: Identifier,
        ty_args: Vec<TypeTag>,
        args: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            module,
            function,
            ty_args,
            args,
        }
    }

    /// Builds a call from a function id and typed arguments.
    pub fn from_function_id(
        function_id: FunctionId,
        ty_args: Vec<TypeTag>,
        args: &[TransactionArgument],
    ) -> Result<Self, BcsError> {
        let args = args
            .iter()
            .map(TransactionArgument::to_bcs_bytes)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            module: function_id.module,
            function: function_id.function,
            ty_args,
            args,
        })
    }

    pub fn function_id(&self) -> FunctionId {
        FunctionId {
            module: self.module.clone(),
            function: self.function.clone(),
        }
    }
}

/// What a transaction does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionPayload {
    Script(Script),
    Package(Package),
    ScriptFunction(ScriptFunction),
}

impl From<ScriptFunction> for TransactionPayload {
    fn from(call: ScriptFunction) -> Self {
        Self::ScriptFunction(call)
    }
}

// ---------------------------------------------------------------------------
// BCS
// ---------------------------------------------------------------------------

impl BcsSerialize for Script {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        se.serialize_bytes(&self.code)?;
        self.ty_args.bcs_serialize(se)?;
        self.args.bcs_serialize(se)
    }
}

impl BcsDeserialize for Script {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self {
            code: de.deserialize_bytes()?,
            ty_args: BcsDeserialize::bcs_deserialize(de)?,
            args: BcsDeserialize::bcs_deserialize(de)?,
        })
    }
}

impl BcsSerialize for Module {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        se.serialize_bytes(&self.code)
    }
}

impl BcsDeserialize for Module {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self {
            code: de.deserialize_bytes()?,
        })
    }
}

impl BcsSerialize for Package {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        self.package_address.bcs_serialize(se)?;
        self.modules.bcs_serialize(se)?;
        self.init_script.bcs_serialize(se)
    }
}

impl BcsDeserialize for Package {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self {
            package_address: BcsDeserialize::bcs_deserialize(de)?,
            modules: BcsDeserialize::bcs_deserialize(de)?,
            init_script: BcsDeserialize::bcs_deserialize(de)?,
        })
    }
}

impl BcsSerialize for ScriptFunction {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        self.module.bcs_serialize(se)?;
        self.function.bcs_serialize(se)?;
        self.ty_args.bcs_serialize(se)?;
        self.args.bcs_serialize(se)
    }
}

impl BcsDeserialize for ScriptFunction {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self {
            module: BcsDeserialize::bcs_deserialize(de)?,
            function: BcsDeserialize::bcs_deserialize(de)?,
            ty_args: BcsDeserialize::bcs_deserialize(de)?,
            args: BcsDeserialize::bcs_deserialize(de)?,
        })
    }
}

impl BcsSerialize for TransactionPayload {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        match self {
            Self::Script(script) => {
                se.serialize_variant_index(0);
                script.bcs_serialize(se)
            }
            Self::Package(package) => {
                se.serialize_variant_index(1);
                package.bcs_serialize(se)
            }
            Self::ScriptFunction(call) => {
                se.serialize_variant_index(2);
                call.bcs_serialize(se)
            }
        }
    }
}

impl BcsDeserialize for TransactionPayload {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        match de.deserialize_variant_index()? {
            0 => Ok(Self::Script(BcsDeserialize::bcs_deserialize(de)?)),
            1 => Ok(Self::Package(BcsDeserialize::bcs_deserialize(de)?)),
            2 => Ok(Self::ScriptFunction(BcsDeserialize::bcs_deserialize(de)?)),
            index => Err(BcsError::InvalidVariant {
                type_name: "TransactionPayload",
                index,
            }),
        }
    }
}
