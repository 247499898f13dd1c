//! Bounds-checked reading over in-memory MIDI bytes, plus the trait that turns a source such as
//! a file path into that in-memory buffer

use std::path::Path;

use crate::error::DecodeError;

/// Trait that allows for different types to be materialized into MIDI bytes before decoding
pub trait MidiReadable {
    /// Error type that may be returned while reading the source
    type Error;
    /// Reads the whole source into memory
    fn get_midi_bytes(self) -> Result<Vec<u8>, Self::Error>;
}

impl<PATH> MidiReadable for PATH
where
    PATH: AsRef<Path>,
{
    type Error = std::io::Error;
    fn get_midi_bytes(self) -> Result<Vec<u8>, Self::Error> {
        std::fs::read(self.as_ref())
    }
}

/// A read position over a borrowed byte buffer.
///
/// A cursor never reads past the end of its window. Sub-cursors created with
/// [`ByteCursor::sub_cursor`] are bounded to a prefix of the remaining bytes but keep reporting
/// positions relative to the original buffer, so errors always point at the right byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteCursor<'a> {
    /// Bytes not yet consumed
    bytes: &'a [u8],
    /// Absolute offset of `bytes[0]` in the outermost buffer
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor at the start of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Absolute offset of the next byte to be read
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes left in this cursor's window
    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if every byte in the window has been consumed
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Looks at the next byte without consuming it
    pub fn peek(&self) -> Option<u8> {
        self.bytes.first().copied()
    }

    /// Builds the error for a read of `needed` bytes that cannot be satisfied
    fn truncated(&self, needed: usize) -> DecodeError {
        DecodeError::TruncatedInput {
            offset: self.position,
            needed,
            available: self.bytes.len(),
        }
    }

    /// Consumes exactly `n` bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if n > self.bytes.len() {
            return Err(self.truncated(n));
        }

        let (taken, rest) = self.bytes.split_at(n);
        self.bytes = rest;
        self.position += n;

        Ok(taken)
    }

    /// Consumes exactly `N` bytes into an array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut array = [0; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    /// Consumes a single byte
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let [byte] = self.read_array()?;
        Ok(byte)
    }

    /// Consumes a big-endian 16 bit unsigned integer
    pub fn read_u16_be(&mut self) -> Result<u16, DecodeError> {
        self.read_array().map(u16::from_be_bytes)
    }

    /// Consumes a big-endian 32 bit unsigned integer
    pub fn read_u32_be(&mut self) -> Result<u32, DecodeError> {
        self.read_array().map(u32::from_be_bytes)
    }

    /// Splits off a cursor over the next `n` bytes and advances this cursor past them
    pub fn sub_cursor(&mut self, n: usize) -> Result<ByteCursor<'a>, DecodeError> {
        let position = self.position;
        let bytes = self.read_bytes(n)?;

        Ok(ByteCursor { bytes, position })
    }
}

#[cfg(test)]
mod tests {
    use super::{ByteCursor, MidiReadable};
    use crate::error::DecodeError;

    #[test]
    fn reads_big_endian_words() {
        let data = [0x00, 0x01, 0x00, 0x00, 0x01, 0xE0, 0x7F];
        let mut cursor = ByteCursor::new(&data);

        assert_eq!(cursor.read_u16_be(), Ok(1));
        assert_eq!(cursor.read_u32_be(), Ok(0x01E0));
        assert_eq!(cursor.position(), 6);
        assert_eq!(cursor.peek(), Some(0x7F));
        assert_eq!(cursor.read_u8(), Ok(0x7F));
        assert!(cursor.is_empty());
        assert_eq!(cursor.peek(), None)
    }

    #[test]
    fn short_read_fails_without_consuming() {
        let data = [0xAA, 0xBB];
        let mut cursor = ByteCursor::new(&data);
        cursor.read_u8().expect("Read first byte");

        assert_eq!(
            cursor.read_u16_be(),
            Err(DecodeError::TruncatedInput {
                offset: 1,
                needed: 2,
                available: 1,
            })
        );
        assert_eq!(cursor.remaining(), 1)
    }

    #[test]
    fn sub_cursor_is_bounded_and_keeps_absolute_positions() {
        let data = [1, 2, 3, 4, 5, 6];
        let mut cursor = ByteCursor::new(&data);
        cursor.read_u8().expect("Skip a byte");

        let mut window = cursor.sub_cursor(3).expect("Split off 3 bytes");
        assert_eq!(cursor.position(), 4);
        assert_eq!(cursor.remaining(), 2);

        assert_eq!(window.read_bytes(2), Ok(&[2u8, 3][..]));
        assert_eq!(
            window.read_u16_be(),
            Err(DecodeError::TruncatedInput {
                offset: 3,
                needed: 2,
                available: 1,
            })
        )
    }

    #[test]
    fn sub_cursor_longer_than_input_fails() {
        let data = [1, 2];
        let mut cursor = ByteCursor::new(&data);

        assert!(matches!(
            cursor.sub_cursor(3),
            Err(DecodeError::TruncatedInput { needed: 3, .. })
        ))
    }

    #[test]
    fn missing_file_reports_io_error() {
        let path = std::env::temp_dir().join("midimux-definitely-missing.mid");
        assert!(path.get_midi_bytes().is_err())
    }
}
