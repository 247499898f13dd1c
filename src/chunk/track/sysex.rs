//! System Exclusive Messages

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::DecodeError, reader::ByteCursor, vlq};

/// Lead byte of a system exclusive message
pub const SYSEX_START: u8 = 0xF0;

/// Lead byte of a system exclusive continuation or escape
pub const SYSEX_ESCAPE: u8 = 0xF7;

/// A midi system exclusive event message.
///
/// The payload is length checked and skipped; no consumer observes its content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SysexEvent;

impl SysexEvent {
    /// Reads a sysex event starting at its 0xF0 or 0xF7 lead byte
    pub(crate) fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let offset = cursor.position();
        let prefix = cursor.read_u8()?;
        if prefix != SYSEX_START && prefix != SYSEX_ESCAPE {
            return Err(DecodeError::UnsupportedStatus {
                offset,
                status: prefix,
            });
        }

        let length = vlq::read(cursor)?;
        cursor.read_bytes(length as usize)?;

        Ok(SysexEvent)
    }
}
