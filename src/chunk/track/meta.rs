//! Meta Event Structs and Parsing

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{error::DecodeError, reader::ByteCursor, vlq};

/// Lead byte of every meta event
pub const META_PREFIX: u8 = 0xFF;

/// Meta event type of a tempo change
pub const TEMPO: u8 = 0x51;

/// Meta event type of a text event
pub const TEXT: u8 = 0x01;

/// A meta level event, kept as its type byte and raw payload.
///
/// [`MetaEvent::message`] interprets the payload for the well known types.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetaEvent {
    /// Meta event type byte
    pub kind: u8,
    /// Payload bytes
    pub data: Vec<u8>,
}

impl MetaEvent {
    /// Creates a meta event from its type and payload
    pub fn new(kind: u8, data: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    /// Reads a meta event, starting at its 0xFF lead byte
    pub(crate) fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let offset = cursor.position();
        let prefix = cursor.read_u8()?;
        if prefix != META_PREFIX {
            return Err(DecodeError::UnsupportedStatus {
                offset,
                status: prefix,
            });
        }

        let kind = cursor.read_u8()?;
        let length = vlq::read(cursor)?;
        let data = cursor.read_bytes(length as usize)?.to_vec();

        Ok(Self { kind, data })
    }

    /// Returns the tempo in microseconds per quarter note if this is a well formed tempo event
    pub fn tempo(&self) -> Option<u32> {
        match self.message() {
            Ok(MetaMessage::Tempo(tempo)) => Some(tempo),
            _ => None,
        }
    }

    /// Interprets the payload according to the event type
    pub fn message(&self) -> Result<MetaMessage<'_>, MetaError> {
        let data = self.data.as_slice();

        macro_rules! meta_event {
            ($len: expr_2021, $name: expr_2021, $value: expr_2021) => {{
                if data.len() != $len {
                    return Err(MetaError {
                        kind: self.kind,
                        expected: $len,
                        found: data.len(),
                    });
                }
                Ok($name($value))
            }};
        }

        match self.kind {
            0x00 => meta_event!(
                2,
                MetaMessage::SequenceNumber,
                u16::from_be_bytes([data[0], data[1]])
            ),
            TEXT => Ok(MetaMessage::Text(data)),
            0x02 => Ok(MetaMessage::Copyright(data)),
            0x03 => Ok(MetaMessage::TrackName(data)),
            0x04 => Ok(MetaMessage::InstrumentName(data)),
            0x05 => Ok(MetaMessage::Lyric(data)),
            0x06 => Ok(MetaMessage::Marker(data)),
            0x07 => Ok(MetaMessage::CuePoint(data)),

            0x20 => meta_event!(1, MetaMessage::MidiChannelPrefix, data[0]),
            0x2F => Ok(MetaMessage::EndOfTrack),

            TEMPO => meta_event!(
                3,
                MetaMessage::Tempo,
                (u32::from(data[0]) << 16) | (u32::from(data[1]) << 8) | u32::from(data[2])
            ),
            0x54 => meta_event!(
                5,
                MetaMessage::SmpteOffset,
                SmpteOffset {
                    hours: data[0],
                    minutes: data[1],
                    seconds: data[2],
                    frames: data[3],
                    subframes: data[4]
                }
            ),
            0x58 => meta_event!(
                4,
                MetaMessage::TimeSignature,
                TimeSignature {
                    numerator: data[0],
                    denominator_power: data[1],
                    clocks_per_click: data[2],
                    thirty_second_notes_per_quarter: data[3],
                }
            ),
            0x59 => meta_event!(
                2,
                MetaMessage::KeySignature,
                KeySignature {
                    sharps_flats: data[0] as i8,
                    minor: data[1] != 0
                }
            ),

            0x7F => Ok(MetaMessage::SequencerSpecific(data)),

            kind => Ok(MetaMessage::Unknown(kind, data)),
        }
    }
}

/// Error for a known meta event type whose payload has the wrong length
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Meta event {kind:#04x} needs {expected} payload bytes, found {found}")]
pub struct MetaError {
    /// Meta event type
    pub kind: u8,
    /// Payload length the type requires
    pub expected: usize,
    /// Payload length present
    pub found: usize,
}

/// A meta event's payload interpreted by type. Text kinds borrow their raw bytes, since files
/// use whatever encoding the authoring tool chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaMessage<'a> {
    /// Sequence Number, tag 0x00
    SequenceNumber(u16),
    /// Text metadata, tag 0x01
    Text(&'a [u8]),
    /// Copyright, tag 0x02
    Copyright(&'a [u8]),
    /// Track name, tag 0x03
    TrackName(&'a [u8]),
    /// Instrument name, tag 0x04
    InstrumentName(&'a [u8]),
    /// Lyric, tag 0x05
    Lyric(&'a [u8]),
    /// Marker, tag 0x06
    Marker(&'a [u8]),
    /// Cue Point, tag 0x07
    CuePoint(&'a [u8]),
    /// Midi Channel Prefix, tag 0x20
    MidiChannelPrefix(u8),
    /// End of Track Identifier, tag 0x2F
    EndOfTrack,
    /// Tempo in microseconds per quarter note, tag 0x51
    Tempo(u32),
    /// Smpte Offset, tag 0x54
    SmpteOffset(SmpteOffset),
    /// Time signature, tag 0x58
    TimeSignature(TimeSignature),
    /// Key Signature, tag 0x59
    KeySignature(KeySignature),
    /// Sequencer Specific, tag 0x7f
    SequencerSpecific(&'a [u8]),
    /// Any other meta event type
    Unknown(u8, &'a [u8]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// A key signature
pub struct KeySignature {
    /// Sharps when positive, flats when negative
    pub sharps_flats: i8,
    /// True if in minor, false if in major
    pub minor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// An SMPTE Offset
pub struct SmpteOffset {
    /// Hours of offset
    pub hours: u8,
    /// Minutes of offset
    pub minutes: u8,
    /// Seconds of offset
    pub seconds: u8,
    /// Frames of offset
    pub frames: u8,
    /// Subframes of offset
    pub subframes: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// A Time Signature
pub struct TimeSignature {
    /// The time signature's numerator
    pub numerator: u8,
    /// The denominator as a power of two
    pub denominator_power: u8,
    /// MIDI clocks per metronome click
    pub clocks_per_click: u8,
    /// Thirty second notes per quarter
    pub thirty_second_notes_per_quarter: u8,
}

impl TimeSignature {
    /// The time signature's denominator, or `None` if the power is too large to represent
    pub fn denominator(&self) -> Option<u32> {
        2u32.checked_pow(u32::from(self.denominator_power))
    }
}
