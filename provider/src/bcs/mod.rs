// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Binary Canonical Serialization
//!
//! The byte format the node hashes, signs, and verifies. Output must match
//! the node byte for byte; a single differing byte fails signature checks
//! on the remote side.
//!
//! ## Format
//!
//! ```text
//! u8 / u16 / u32 / u64 / u128   fixed width, little-endian
//! bool                          one byte, 0x00 or 0x01
//! bytes / string / sequence     ULEB128 length, then the items
//! option                        0x00 | 0x01 ‖ value
//! struct                        fields in declared order, no prefix
//! enum                          ULEB128 variant index, then the fields
//! ```
//!
//! ## Sessions
//!
//! A [`BcsSerializer`] owns its output buffer and is finalized with
//! [`BcsSerializer::into_bytes`], which consumes it. [`to_bytes`] opens a
//! fresh session for every value, so unrelated values can never share an
//! accumulator.

pub mod de;
pub mod ser;

use std::fmt;

use thiserror::Error;

pub use de::BcsDeserializer;
pub use ser::{BcsSerializer, MAX_SEQUENCE_LENGTH};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while encoding or decoding BCS.
///
/// Every variant is fatal to the operation that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BcsError {
    /// An integer does not fit in its declared width.
    #[error("value {value} is out of range for {width}")]
    IntegerOverflow { value: u128, width: IntWidth },

    /// The input ended before the current field was complete.
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// An enum tag that the type does not define.
    #[error("invalid variant index {index} for {type_name}")]
    InvalidVariant { type_name: &'static str, index: u32 },

    /// A bool byte other than 0 or 1.
    #[error("invalid bool byte 0x{0:02x}")]
    InvalidBool(u8),

    /// An option tag other than 0 or 1.
    #[error("invalid option tag 0x{0:02x}")]
    InvalidOptionTag(u8),

    /// A ULEB128 integer that is non-canonical or exceeds `u32`.
    #[error("invalid ULEB128 integer")]
    InvalidUleb128,

    /// A length prefix above [`MAX_SEQUENCE_LENGTH`].
    #[error("sequence length {0} exceeds the maximum")]
    SequenceTooLong(usize),

    /// A string field that is not valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    /// A value decoded structurally but failed its own validation.
    #[error("invalid {type_name}: {reason}")]
    InvalidValue {
        type_name: &'static str,
        reason: String,
    },

    /// Bytes left over after the top-level value.
    #[error("{0} trailing bytes after the value")]
    RemainingInput(usize),
}

// ---------------------------------------------------------------------------
// IntWidth
// ---------------------------------------------------------------------------

/// Declared width of an unsigned integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    U8,
    U16,
    U32,
    U64,
    U128,
}

impl IntWidth {
    /// Encoded size in bytes.
    pub fn byte_len(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
            Self::U128 => 16,
        }
    }

    /// Largest value representable at this width.
    pub fn max_value(self) -> u128 {
        match self {
            Self::U8 => u8::MAX as u128,
            Self::U16 => u16::MAX as u128,
            Self::U32 => u32::MAX as u128,
            Self::U64 => u64::MAX as u128,
            Self::U128 => u128::MAX,
        }
    }

    /// Parses a literal suffix such as `u64`.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "u8" => Some(Self::U8),
            "u16" => Some(Self::U16),
            "u32" => Some(Self::U32),
            "u64" => Some(Self::U64),
            "u128" => Some(Self::U128),
            _ => None,
        }
    }
}

impl fmt::Display for IntWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::U128 => write!(f, "u128"),
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Types with a canonical BCS encoding.
pub trait BcsSerialize {
    /// Appends the encoding of `self` to the session.
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError>;
}

/// Types that can be rebuilt from their BCS encoding.
pub trait BcsDeserialize: Sized {
    /// Reads exactly one value from the front of the input.
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError>;
}

/// Encodes a value in a fresh serialization session.
pub fn to_bytes<T: BcsSerialize + ?Sized>(value: &T) -> Result<Vec<u8>, BcsError> {
    let mut se = BcsSerializer::new();
    value.bcs_serialize(&mut se)?;
    Ok(se.into_bytes())
}

/// Decodes a value and rejects trailing bytes.
pub fn from_bytes<T: BcsDeserialize>(bytes: &[u8]) -> Result<T, BcsError> {
    let mut de = BcsDeserializer::new(bytes);
    let value = T::bcs_deserialize(&mut de)?;
    de.finish()?;
    Ok(value)
}

// ---------------------------------------------------------------------------
// Primitive impls
// ---------------------------------------------------------------------------

macro_rules! impl_bcs_uint {
    ($($ty:ty => $ser:ident, $de:ident;)*) => {
        $(
            impl BcsSerialize for $ty {
                fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
                    se.$ser(*self);
                    Ok(())
                }
            }

            impl BcsDeserialize for $ty {
                fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
                    de.$de()
                }
            }
        )*
    };
}

impl_bcs_uint! {
    u8 => serialize_u8, deserialize_u8;
    u16 => serialize_u16, deserialize_u16;
    u32 => serialize_u32, deserialize_u32;
    u64 => serialize_u64, deserialize_u64;
    u128 => serialize_u128, deserialize_u128;
}

impl BcsSerialize for bool {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        se.serialize_bool(*self);
        Ok(())
    }
}

impl BcsDeserialize for bool {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        de.deserialize_bool()
    }
}

impl BcsSerialize for str {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        se.serialize_str(self)
    }
}

impl BcsSerialize for String {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        se.serialize_str(self)
    }
}

impl BcsDeserialize for String {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        de.deserialize_str()
    }
}

impl<T: BcsSerialize> BcsSerialize for Vec<T> {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        se.serialize_seq(self)
    }
}

impl<T: BcsDeserialize> BcsDeserialize for Vec<T> {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        de.deserialize_seq()
    }
}

impl<T: BcsSerialize> BcsSerialize for Option<T> {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        se.serialize_option(self)
    }
}

impl<T: BcsDeserialize> BcsDeserialize for Option<T> {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        de.deserialize_option()
    }
}

impl<T: BcsSerialize + ?Sized> BcsSerialize for Box<T> {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        (**self).bcs_serialize(se)
    }
}

impl<T: BcsDeserialize> BcsDeserialize for Box<T> {
    fn bcs_deserialize(de: &mut BcsDeserializer<'_>) -> Result<Self, BcsError> {
        T::bcs_deserialize(de).map(Box::new)
    }
}

impl<T: BcsSerialize + ?Sized> BcsSerialize for &T {
    fn bcs_serialize(&self, se: &mut BcsSerializer) -> Result<(), BcsError> {
        (**self).bcs_serialize(se)
    }
}
