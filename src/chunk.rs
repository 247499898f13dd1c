//! Chunk framing and whole-file decoding

use header::{MidiHeader, HEADER_LENGTH};
use log::{debug, warn};
use track::{channel::RunningStatus, Track};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    chunk::chunk_types::{HEADER_CHUNK, TRACK_DATA_CHUNK},
    config::{DecoderConfig, RunningStatusScope, TrailingBytes},
    error::DecodeError,
    reader::ByteCursor,
    MidiFile,
};

pub mod chunk_types;
pub mod header;
pub mod track;

/// Represents a raw MIDI Chunk header.
/// A MIDI Chunk consists of a 4-character ASCII type identifier and a 32-bit unsigned integer
/// specifying the length of its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Chunk {
    /// 4 character ASCII chunk type
    pub chunk_type: [u8; 4],
    /// Length of the data that follows
    length: u32,
}

impl Chunk {
    /// Gets the length of the chunk as a usize
    pub fn len(&self) -> usize {
        self.length as usize
    }

    /// Returns if the chunk has no attributed data
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Reads an 8 byte chunk header and checks its type against `expected`
    pub fn read(cursor: &mut ByteCursor<'_>, expected: [u8; 4]) -> Result<Self, DecodeError> {
        let offset = cursor.position();
        let raw = u64::from_be_bytes(cursor.read_array()?);
        let chunk = Chunk::from(raw);

        if chunk.chunk_type != expected {
            return Err(DecodeError::MalformedSignature {
                offset,
                expected,
                found: chunk.chunk_type,
            });
        }

        Ok(chunk)
    }
}

impl From<u64> for Chunk {
    fn from(value: u64) -> Self {
        let [a, b, c, d, ..] = value.to_be_bytes();

        Self {
            chunk_type: [a, b, c, d],
            length: value as u32,
        }
    }
}

/// Reads the header chunk, which must hold exactly 6 bytes
fn read_header(cursor: &mut ByteCursor<'_>) -> Result<MidiHeader, DecodeError> {
    let chunk = Chunk::read(cursor, HEADER_CHUNK)?;

    if chunk.length != HEADER_LENGTH {
        return Err(DecodeError::LengthMismatch {
            offset: cursor.position() - 4,
            declared: chunk.length,
            expected: HEADER_LENGTH,
        });
    }

    let mut body = cursor.sub_cursor(chunk.len())?;
    MidiHeader::read(&mut body)
}

/// Reads one track chunk, bounding event decoding to the chunk's declared length
fn read_track(
    cursor: &mut ByteCursor<'_>,
    running_status: &mut RunningStatus,
) -> Result<Track, DecodeError> {
    let chunk = Chunk::read(cursor, TRACK_DATA_CHUNK)?;
    let mut body = cursor.sub_cursor(chunk.len())?;

    Track::read(&mut body, running_status)
}

/// Decodes a header chunk followed by the declared number of track chunks
pub(crate) fn decode_file(bytes: &[u8], config: &DecoderConfig) -> Result<MidiFile, DecodeError> {
    let mut cursor = ByteCursor::new(bytes);
    let header = read_header(&mut cursor)?;
    debug!(
        "MIDI header: format {}, {} tracks, division {:#06x}",
        header.format(),
        header.track_count(),
        header.division()
    );

    let mut running_status = RunningStatus::new();
    let mut tracks = Vec::with_capacity(usize::from(header.track_count()));

    for index in 0..header.track_count() {
        match config.running_status {
            RunningStatusScope::PerTrack => running_status = RunningStatus::new(),
            RunningStatusScope::File => {
                if let Some(status) = running_status.current() {
                    warn!("Carrying running status {status:#04x} into track {index}");
                }
            }
        }

        let offset = cursor.position();
        let track = read_track(&mut cursor, &mut running_status)?;
        debug!(
            "Track {index} at offset {offset}: {} events, {} ticks",
            track.len(),
            track.duration_ticks()
        );
        tracks.push(track);
    }

    if !cursor.is_empty() {
        match config.trailing_bytes {
            TrailingBytes::Reject => {
                return Err(DecodeError::TrailingBytes {
                    offset: cursor.position(),
                    count: cursor.remaining(),
                })
            }
            TrailingBytes::Ignore => debug!(
                "Ignoring {} trailing bytes at offset {}",
                cursor.remaining(),
                cursor.position()
            ),
        }
    }

    Ok(MidiFile::new(header, tracks))
}
