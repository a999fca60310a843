// [libs/domain/manifest/src/binreader.rs]
//! Little-endian cursor over the JP catalog's length-prefixed binary
//! framing. Every read advances the cursor; a short buffer is a
//! `TruncatedBinary` error rather than a panic, since this reads untrusted
//! network bytes.

use crate::errors::ManifestError;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

pub struct BinReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> BinReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { cursor: Cursor::new(bytes) }
    }

    fn offset(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn read_i8(&mut self) -> Result<i8, ManifestError> {
        self.cursor
            .read_i8()
            .map_err(|_| ManifestError::TruncatedBinary { offset: self.offset() })
    }

    pub fn read_bool(&mut self) -> Result<bool, ManifestError> {
        Ok(self.read_i8()? != 0)
    }

    pub fn read_i32(&mut self) -> Result<i32, ManifestError> {
        self.cursor
            .read_i32::<LittleEndian>()
            .map_err(|_| ManifestError::TruncatedBinary { offset: self.offset() })
    }

    pub fn read_i64(&mut self) -> Result<i64, ManifestError> {
        self.cursor
            .read_i64::<LittleEndian>()
            .map_err(|_| ManifestError::TruncatedBinary { offset: self.offset() })
    }

    /// Length-prefixed UTF-8 string: an `i32` byte length, then that many bytes.
    pub fn read_string(&mut self) -> Result<String, ManifestError> {
        let offset = self.offset();
        let len = self.read_i32()?;
        if len < 0 {
            return Err(ManifestError::TruncatedBinary { offset });
        }
        let mut buf = vec![0u8; len as usize];
        std::io::Read::read_exact(&mut self.cursor, &mut buf)
            .map_err(|_| ManifestError::TruncatedBinary { offset: self.offset() })?;
        String::from_utf8(buf).map_err(|_| ManifestError::InvalidUtf8 { offset })
    }

    pub fn has_remaining(&self) -> bool {
        (self.offset() as u64) < self.cursor.get_ref().len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_length_prefixed_string() {
        let mut bytes = 3i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"abc");
        let mut reader = BinReader::new(&bytes);
        assert_eq!(reader.read_string().unwrap(), "abc");
    }

    #[test]
    fn truncated_buffer_is_an_error_not_a_panic() {
        let bytes = [0u8, 1];
        let mut reader = BinReader::new(&bytes);
        assert!(reader.read_i64().is_err());
    }
}
