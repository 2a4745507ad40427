//! Append-only BCS serialization session.

use super::{BcsError, BcsSerialize, IntWidth};

/// Longest sequence (or byte string) the format allows.
pub const MAX_SEQUENCE_LENGTH: usize = (1 << 31) - 1;

/// One serialization session.
///
/// Owns the output buffer. Pass it by `&mut` through the encode chain and
/// finish with [`into_bytes`](Self::into_bytes), which consumes the session.
#[derive(Debug, Default)]
pub struct BcsSerializer {
    output: Vec<u8>,
}

impl BcsSerializer {
    /// Opens an empty session.
    pub fn new() -> Self {
        Self { output: Vec::new() }
    }

    /// Opens an empty session with a pre-sized buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            output: Vec::with_capacity(capacity),
        }
    }

    pub fn serialize_u8(&mut self, value: u8) {
        self.output.push(value);
    }

    pub fn serialize_u16(&mut self, value: u16) {
        self.output.extend_from_slice(&value.to_le_bytes());
    }

    pub fn serialize_u32(&mut self, value: u32) {
        self.output.extend_from_slice(&value.to_le_bytes());
    }

    pub fn serialize_u64(&mut self, value: u64) {
        self.output.extend_from_slice(&value.to_le_bytes());
    }

    pub fn serialize_u128(&mut self, value: u128) {
        self.output.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes `value` at the declared `width`, failing instead of truncating.
    pub fn serialize_uint(&mut self, value: u128, width: IntWidth) -> Result<(), BcsError> {
        if value > width.max_value() {
            return Err(BcsError::IntegerOverflow { value, width });
        }
        let bytes = value.to_le_bytes();
        self.output.extend_from_slice(&bytes[..width.byte_len()]);
        Ok(())
    }

    pub fn serialize_bool(&mut self, value: bool) {
        self.output.push(u8::from(value));
    }

    /// Writes a ULEB128 integer: 7 bits per byte, high bit set on every
    /// byte except the last.
    pub fn serialize_uleb128(&mut self, mut value: u32) {
        while value >= 0x80 {
            self.output.push((value & 0x7f) as u8 | 0x80);
            value >>= 7;
        }
        self.output.push(value as u8);
    }

    /// Writes a sequence length prefix.
    pub fn serialize_len(&mut self, len: usize) -> Result<(), BcsError> {
        if len > MAX_SEQUENCE_LENGTH {
            return Err(BcsError::SequenceTooLong(len));
        }
        self.serialize_uleb128(len as u32);
        Ok(())
    }

    /// Writes an enum discriminant.
    pub fn serialize_variant_index(&mut self, index: u32) {
        self.serialize_uleb128(index);
    }

    /// Writes a length-prefixed byte string.
    pub fn serialize_bytes(&mut self, bytes: &[u8]) -> Result<(), BcsError> {
        self.serialize_len(bytes.len())?;
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    /// Writes bytes verbatim. For fixed-size values whose width is part of
    /// the schema (addresses, hashes).
    pub fn serialize_fixed_bytes(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes);
    }

    pub fn serialize_str(&mut self, value: &str) -> Result<(), BcsError> {
        self.serialize_bytes(value.as_bytes())
    }

    /// Writes a length-prefixed sequence of values.
    pub fn serialize_seq<T: BcsSerialize>(&mut self, items: &[T]) -> Result<(), BcsError> {
        self.serialize_len(items.len())?;
        for item in items {
            item.bcs_serialize(self)?;
        }
        Ok(())
    }

    pub fn serialize_option<T: BcsSerialize>(&mut self, value: &Option<T>) -> Result<(), BcsError> {
        match value {
            Some(inner) => {
                self.output.push(1);
                inner.bcs_serialize(self)
            }
            None => {
                self.output.push(0);
                Ok(())
            }
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.output.len()
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Ends the session and hands back the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.output
    }
}
