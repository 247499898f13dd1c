//! Header Chunk Enum and Struct Definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{error::DecodeError, reader::ByteCursor};

/// Number of bytes in the body of every header chunk
pub const HEADER_LENGTH: u32 = 6;

/// Header chunk data, including format, track count and division as 3 16 bit unsigned integers.
///
/// The raw values are kept as read; [`MidiHeader::format_kind`] and [`MidiHeader::timing`]
/// give typed views over them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MidiHeader {
    /// The MIDI format
    format: u16,
    /// Number of tracks
    track_count: u16,
    /// Time division
    division: u16,
}

impl MidiHeader {
    /// Creates a header from its three raw fields
    pub fn new(format: u16, track_count: u16, division: u16) -> Self {
        Self {
            format,
            track_count,
            division,
        }
    }

    /// Reads the 6 byte body of a header chunk
    pub(crate) fn read(body: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let format = body.read_u16_be()?;
        let track_count = body.read_u16_be()?;
        let division = body.read_u16_be()?;

        Ok(Self::new(format, track_count, division))
    }

    /// Raw format field
    pub fn format(&self) -> u16 {
        self.format
    }

    /// The format field as one of the three defined organizations
    pub fn format_kind(&self) -> Result<Format, InvalidFormat> {
        Format::try_from(self.format)
    }

    /// Number of track chunks the file declares
    pub fn track_count(&self) -> u16 {
        self.track_count
    }

    /// Raw division field
    pub fn division(&self) -> u16 {
        self.division
    }

    /// The division field interpreted as either metrical or timecode timing
    pub fn timing(&self) -> Division {
        self.division.into()
    }
}

impl From<(u16, u16, u16)> for MidiHeader {
    fn from(value: (u16, u16, u16)) -> Self {
        let (format, track_count, division) = value;
        Self::new(format, track_count, division)
    }
}

/// The overall organization of the MIDI file. Only three values are valid, making most of the 16
/// bits irrelevant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Format {
    /// The file contains a single multi-channel track
    Zero,
    /// The file contains one or more simultaneous tracks (or MIDI outputs) of a sequence
    One,
    /// The file contains one or more sequentially independent single-track patterns
    Two,
}

/// Error struct representing an invalid format specifier
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid header format {0}")]
pub struct InvalidFormat(pub u16);

impl TryFrom<u16> for Format {
    type Error = InvalidFormat;
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Format::Zero),
            1 => Ok(Format::One),
            2 => Ok(Format::Two),
            _ => Err(InvalidFormat(value)),
        }
    }
}

/// The meaning of the delta-times in the MIDI sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Division {
    /// When bit 15 is a 0, bits 14-0 represent ticks per quarter note
    Metrical(u16),
    /// When bit 15 is 1, bits 14-8 hold the negative SMPTE frame rate,
    /// and bits 7-0 represent ticks per frame
    TimeCode(SmpteDivision),
}

/// Division defined by time-code-based time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmpteDivision {
    /// Frame rate code, one of 24, 25, 29 (drop frame) or 30 in conforming files
    frame_code: u8,
    /// Ticks per frame
    ticks_per_frame: u8,
}

/// NTSC drop-frame rate used when the frame code is 29
const DROP_FRAME_FPS: f64 = 29.97;

impl SmpteDivision {
    /// Creates a timecode division from a positive frame code and ticks per frame
    pub fn new(frame_code: u8, ticks_per_frame: u8) -> Self {
        Self {
            frame_code,
            ticks_per_frame,
        }
    }

    /// The frame rate code as stored (negated) in the header
    pub fn frame_code(&self) -> u8 {
        self.frame_code
    }

    /// Frames per second, with code 29 meaning 29.97 drop-frame
    pub fn frames_per_second(&self) -> f64 {
        match self.frame_code {
            29 => DROP_FRAME_FPS,
            code => f64::from(code),
        }
    }

    /// Ticks per frame
    pub fn ticks_per_frame(&self) -> u8 {
        self.ticks_per_frame
    }
}

impl From<u16> for Division {
    fn from(value: u16) -> Self {
        const MASK: u16 = 0x7FFF;

        if value >> 15 == 0 {
            return Division::Metrical(value & MASK);
        }

        let [high, ticks_per_frame] = value.to_be_bytes();
        // The high byte is the frame rate in two's complement, -24 is stored as 0xE8
        let frame_code = (high as i8).unsigned_abs();

        Division::TimeCode(SmpteDivision {
            frame_code,
            ticks_per_frame,
        })
    }
}
