//! BCS deserialization over a borrowed byte slice.

use super::ser::MAX_SEQUENCE_LENGTH;
use super::{BcsDeserialize, BcsError};

/// Cursor over encoded input. Every read consumes exactly the bytes of the
/// field it decodes.
#[derive(Debug)]
pub struct BcsDeserializer<'a> {
    input: &'a [u8],
}

impl<'a> BcsDeserializer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    /// Succeeds only if the whole input has been consumed.
    pub fn finish(&self) -> Result<(), BcsError> {
        if self.input.is_empty() {
            Ok(())
        } else {
            Err(BcsError::RemainingInput(self.input.len()))
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], BcsError> {
        if self.input.len() < n {
            return Err(BcsError::UnexpectedEof {
                needed: n,
                remaining: self.input.len(),
            });
        }
        let (head, tail) = self.input.split_at(n);
        self.input = tail;
        Ok(head)
    }

    /// Reads exactly `N` bytes with no length prefix.
    pub fn deserialize_fixed_bytes<const N: usize>(&mut self) -> Result<[u8; N], BcsError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn deserialize_u8(&mut self) -> Result<u8, BcsError> {
        Ok(self.take(1)?[0])
    }

    pub fn deserialize_u16(&mut self) -> Result<u16, BcsError> {
        Ok(u16::from_le_bytes(self.deserialize_fixed_bytes()?))
    }

    pub fn deserialize_u32(&mut self) -> Result<u32, BcsError> {
        Ok(u32::from_le_bytes(self.deserialize_fixed_bytes()?))
    }

    pub fn deserialize_u64(&mut self) -> Result<u64, BcsError> {
        Ok(u64::from_le_bytes(self.deserialize_fixed_bytes()?))
    }

    pub fn deserialize_u128(&mut self) -> Result<u128, BcsError> {
        Ok(u128::from_le_bytes(self.deserialize_fixed_bytes()?))
    }

    pub fn deserialize_bool(&mut self) -> Result<bool, BcsError> {
        match self.deserialize_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(BcsError::InvalidBool(other)),
        }
    }

    /// Reads a canonical ULEB128 integer that fits in `u32`.
    pub fn deserialize_uleb128(&mut self) -> Result<u32, BcsError> {
        let mut value: u64 = 0;
        for shift in (0..32).step_by(7) {
            let byte = self.deserialize_u8()?;
            let digit = byte & 0x7f;
            value |= u64::from(digit) << shift;
            if byte & 0x80 == 0 {
                // A zero final group after the first byte is an overlong encoding.
                if shift > 0 && digit == 0 {
                    return Err(BcsError::InvalidUleb128);
                }
                return u32::try_from(value).map_err(|_| BcsError::InvalidUleb128);
            }
        }
        Err(BcsError::InvalidUleb128)
    }

    /// Reads a sequence length prefix.
    pub fn deserialize_len(&mut self) -> Result<usize, BcsError> {
        let len = self.deserialize_uleb128()? as usize;
        if len > MAX_SEQUENCE_LENGTH {
            return Err(BcsError::SequenceTooLong(len));
        }
        Ok(len)
    }

    pub fn deserialize_variant_index(&mut self) -> Result<u32, BcsError> {
        self.deserialize_uleb128()
    }

    /// Reads a length-prefixed byte string.
    pub fn deserialize_bytes(&mut self) -> Result<Vec<u8>, BcsError> {
        let len = self.deserialize_len()?;
        Ok(self.take(len)?.to_vec())
    }

    pub fn deserialize_str(&mut self) -> Result<String, BcsError> {
        let bytes = self.deserialize_bytes()?;
        String::from_utf8(bytes).map_err(|_| BcsError::InvalidUtf8)
    }

    pub fn deserialize_seq<T: BcsDeserialize>(&mut self) -> Result<Vec<T>, BcsError> {
        let len = self.deserialize_len()?;
        // Every element takes at least one byte; cap the allocation by what
        // the input could possibly hold.
        let mut items = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            items.push(T::bcs_deserialize(self)?);
        }
        Ok(items)
    }

    pub fn deserialize_option<T: BcsDeserialize>(&mut self) -> Result<Option<T>, BcsError> {
        match self.deserialize_u8()? {
            0 => Ok(None),
            1 => Ok(Some(T::bcs_deserialize(self)?)),
            other => Err(BcsError::InvalidOptionTag(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uleb128_decodes_canonical_values() {
        let mut de = BcsDeserializer::new(&[0x80, 0x01, 0x7f, 0xff, 0xff, 0xff, 0xff, 0x0f]);
        assert_eq!(de.deserialize_uleb128().unwrap(), 128);
        assert_eq!(de.deserialize_uleb128().unwrap(), 127);
        assert_eq!(de.deserialize_uleb128().unwrap(), u32::MAX);
        assert!(de.finish().is_ok());
    }

    #[test]
    fn uleb128_rejects_overlong_encoding() {
        let mut de = BcsDeserializer::new(&[0x81, 0x00]);
        assert_eq!(de.deserialize_uleb128(), Err(BcsError::InvalidUleb128));
    }

    #[test]
    fn uleb128_rejects_values_above_u32() {
        let mut de = BcsDeserializer::new(&[0xff, 0xff, 0xff, 0xff, 0x1f]);
        assert_eq!(de.deserialize_uleb128(), Err(BcsError::InvalidUleb128));

        let mut de = BcsDeserializer::new(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01]);
        assert_eq!(de.deserialize_uleb128(), Err(BcsError::InvalidUleb128));
    }

    #[test]
    fn uleb128_reports_eof() {
        let mut de = BcsDeserializer::new(&[0x80]);
        assert!(matches!(
            de.deserialize_uleb128(),
            Err(BcsError::UnexpectedEof { needed: 1, remaining: 0 })
        ));
    }

    #[test]
    fn bool_rejects_other_bytes() {
        let mut de = BcsDeserializer::new(&[0x02]);
        assert_eq!(de.deserialize_bool(), Err(BcsError::InvalidBool(2)));
    }

    #[test]
    fn option_rejects_bad_tag() {
        let mut de = BcsDeserializer::new(&[0x05]);
        assert_eq!(
            de.deserialize_option::<u8>(),
            Err(BcsError::InvalidOptionTag(5))
        );
    }

    #[test]
    fn bytes_longer_than_input_are_eof() {
        let mut de = BcsDeserializer::new(&[0x04, 0xaa, 0xbb]);
        assert_eq!(
            de.deserialize_bytes(),
            Err(BcsError::UnexpectedEof {
                needed: 4,
                remaining: 2
            })
        );
    }

    #[test]
    fn string_must_be_utf8() {
        let mut de = BcsDeserializer::new(&[0x02, 0xc3, 0x28]);
        assert_eq!(de.deserialize_str(), Err(BcsError::InvalidUtf8));
    }

    #[test]
    fn huge_declared_sequence_does_not_preallocate() {
        // Claims 2^31-1 elements but carries none.
        let mut de = BcsDeserializer::new(&[0xff, 0xff, 0xff, 0xff, 0x07]);
        assert!(matches!(
            de.deserialize_seq::<u64>(),
            Err(BcsError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn fixed_bytes_consume_exactly_n() {
        let mut de = BcsDeserializer::new(&[1, 2, 3, 4, 5]);
        let head: [u8; 3] = de.deserialize_fixed_bytes().unwrap();
        assert_eq!(head, [1, 2, 3]);
        assert_eq!(de.remaining(), 2);
        assert_eq!(de.finish(), Err(BcsError::RemainingInput(2)));
    }
}
