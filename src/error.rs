//! Error types produced while decoding or loading MIDI data

use thiserror::Error;

use crate::vlq::MAX_VLQ_BYTES;

/// Error type for any structural violation found while decoding a MIDI file.
///
/// Every variant carries the absolute byte offset into the input buffer at which the problem was
/// detected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A chunk did not start with the expected 4 byte ASCII signature
    #[error(
        "Expected chunk signature `{}` at offset {offset}, found `{}`",
        String::from_utf8_lossy(.expected),
        String::from_utf8_lossy(.found)
    )]
    MalformedSignature {
        /// Offset of the signature
        offset: usize,
        /// The signature that was required here
        expected: [u8; 4],
        /// The bytes that were actually read
        found: [u8; 4],
    },
    /// The buffer ran out before a declared or required length was satisfied
    #[error("Input truncated at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedInput {
        /// Offset of the read that failed
        offset: usize,
        /// Number of bytes the read required
        needed: usize,
        /// Number of bytes that were left
        available: usize,
    },
    /// A chunk's declared length disagrees with the length its content requires
    #[error("Chunk at offset {offset} declares {declared} bytes but must hold exactly {expected}")]
    LengthMismatch {
        /// Offset of the chunk's length field
        offset: usize,
        /// Length written in the chunk
        declared: u32,
        /// Length the chunk type requires
        expected: u32,
    },
    /// A data byte appeared where a channel event was expected, but no running status exists yet
    #[error("Channel event at offset {offset} starts with data byte {byte:#04x} and no running status")]
    UnknownEventLead {
        /// Offset of the lead byte
        offset: usize,
        /// The data byte found
        byte: u8,
    },
    /// A status byte reached the channel event decoder that does not name a channel event
    #[error("Status byte {status:#04x} at offset {offset} is not a channel event")]
    UnsupportedStatus {
        /// Offset of the status byte
        offset: usize,
        /// The offending status byte
        status: u8,
    },
    /// A variable-length quantity kept its continuation bit set for too many bytes
    #[error(
        "Variable-length quantity at offset {offset} is longer than {max} bytes",
        max = MAX_VLQ_BYTES
    )]
    VlqTooLong {
        /// Offset of the first byte of the quantity
        offset: usize,
    },
    /// Bytes remain after every declared track was decoded
    #[error("{count} unconsumed bytes remain after the last track at offset {offset}")]
    TrailingBytes {
        /// Offset of the first unconsumed byte
        offset: usize,
        /// Number of unconsumed bytes
        count: usize,
    },
}

impl DecodeError {
    /// Byte offset in the input at which the error was detected
    pub fn offset(&self) -> usize {
        match *self {
            Self::MalformedSignature { offset, .. }
            | Self::TruncatedInput { offset, .. }
            | Self::LengthMismatch { offset, .. }
            | Self::UnknownEventLead { offset, .. }
            | Self::UnsupportedStatus { offset, .. }
            | Self::VlqTooLong { offset }
            | Self::TrailingBytes { offset, .. } => offset,
        }
    }
}

/// Error type for reading a MIDI file from a source and decoding it
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source could not be read
    #[error("Failed to read MIDI source")]
    Io(#[from] std::io::Error),
    /// The bytes were read but are not a well formed MIDI file
    #[error("Failed to decode MIDI data: {0}")]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::DecodeError;

    #[test]
    fn signature_error_displays_ascii_tags() {
        let err = DecodeError::MalformedSignature {
            offset: 14,
            expected: *b"MTrk",
            found: *b"RIFF",
        };

        assert_eq!(
            err.to_string(),
            "Expected chunk signature `MTrk` at offset 14, found `RIFF`"
        );
        assert_eq!(err.offset(), 14)
    }

    #[test]
    fn every_variant_reports_its_offset() {
        let errors = [
            DecodeError::TruncatedInput {
                offset: 3,
                needed: 4,
                available: 1,
            },
            DecodeError::LengthMismatch {
                offset: 3,
                declared: 7,
                expected: 6,
            },
            DecodeError::UnknownEventLead { offset: 3, byte: 0x3C },
            DecodeError::UnsupportedStatus {
                offset: 3,
                status: 0xF2,
            },
            DecodeError::VlqTooLong { offset: 3 },
            DecodeError::TrailingBytes {
                offset: 3,
                count: 2,
            },
        ];

        assert!(errors.iter().all(|err| err.offset() == 3))
    }
}
