//! Variable-length quantities, the 7-bit-group encoding used for delta times and for the length
//! prefixes of meta and sysex events

use crate::{error::DecodeError, reader::ByteCursor};

/// Largest number of bytes a single quantity may span. Four groups of 7 bits cover the 28 bit
/// range the file format allows.
pub const MAX_VLQ_BYTES: usize = 4;

/// Mask for the 7 payload bits of each byte
const MASK: u8 = 0x7F;

/// Reads one variable-length quantity.
///
/// Each byte contributes its low 7 bits, most significant group first. A byte with the high bit
/// set means another byte follows; the first byte with the high bit clear ends the quantity.
pub fn read(cursor: &mut ByteCursor<'_>) -> Result<u32, DecodeError> {
    let start = cursor.position();
    let mut result: u32 = 0;

    for _ in 0..MAX_VLQ_BYTES {
        let byte = cursor.read_u8()?;
        result = (result << 7) | u32::from(byte & MASK);

        if !msb_is_one(byte) {
            return Ok(result);
        }
    }

    Err(DecodeError::VlqTooLong { offset: start })
}

/// Returns true if the msb of a byte is 1
pub(crate) fn msb_is_one(byte: u8) -> bool {
    byte >> 7 == 1
}
