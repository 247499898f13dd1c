//! # midimux
//!
//! A Standard MIDI File decoder that replays every track of a file as one chronologically
//! ordered event stream, with an optional tempo clock converting ticks into seconds.
//!
//! ## Overview
//!
//! MIDI files are structured as a series of chunks. Each chunk contains a 4-character ASCII
//! type identifier and a 32-bit length that specifies how many bytes of data follow. A file is
//! one `MThd` header chunk followed by `MTrk` track chunks, and every event in a track is timed
//! relative to the event before it in the same track.
//!
//! - **Strict decoding**: Every length, signature and event boundary is checked, and failures
//!   report the absolute byte offset they were found at. Opt in to serde support and only
//!   require `thiserror` and `log` by default
//! - **Multiplexing**: [`multiplex::Multiplexer`] merges the tracks of a file into a single lazy
//!   iterator whose delta times are relative to the previous event of any track.
//! - **Dispatch**: [`visitor::Dispatcher`] routes events to typed [`visitor::EventHandler`]
//!   callbacks, keeping track of ticks, channel and, with a [`clock::TempoClock`], seconds.
//!
//! ## Example Usage
//!
//! ```rust
//! use midimux::{text::TextExtractor, visitor::Dispatcher};
//!
//! let mut bytes = b"MThd\0\0\0\x06\0\0\0\x01\0\x60".to_vec();
//! let track = [0x00, 0xFF, 0x01, 0x03, b'/', b'L', b'a', 0x60, 0xFF, 0x01, 0x02, b'l', b'a'];
//! bytes.extend(b"MTrk\0\0\0");
//! bytes.push(track.len() as u8);
//! bytes.extend(track);
//!
//! let file = midimux::decode(&bytes).expect("Decode MIDI bytes");
//! let mut dispatcher = Dispatcher::with_clock(TextExtractor::new(), file.header());
//! dispatcher.run(file.into_events());
//!
//! assert_eq!(dispatcher.handler().render(), "\nLala");
//! ```
//!
//! ## Library Structure
//!
//! - **[`chunk`]**: Chunk framing, the header chunk and the track chunk event model.
//! - **[`reader`]**: The bounds-checked [`reader::ByteCursor`] and the
//!   [`reader::MidiReadable`] trait for turning file paths into bytes.
//! - **[`vlq`]**: Variable length quantity decoding.
//! - **[`config`]**: Decoder settings for running status scope and trailing bytes.
//! - **[`multiplex`]**, **[`visitor`]**, **[`clock`]** and **[`text`]**: Replaying a decoded
//!   file in global time order.
//!

use chunk::{
    header::MidiHeader,
    track::{TimedEvent, Track},
};
use config::DecoderConfig;
use error::{DecodeError, LoadError};
use multiplex::Multiplexer;
use reader::MidiReadable;
use visitor::{Dispatcher, EventHandler};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod chunk;
pub mod clock;
pub mod config;
pub mod error;
pub mod multiplex;
pub mod reader;
pub mod text;
pub mod visitor;
pub mod vlq;

/// A decoded MIDI file: its header and every track in file order
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MidiFile {
    /// The header chunk
    header: MidiHeader,
    /// One entry per track chunk
    tracks: Vec<Track>,
}

impl MidiFile {
    /// Creates a file from a header and its tracks
    pub fn new(header: MidiHeader, tracks: Vec<Track>) -> Self {
        Self { header, tracks }
    }

    /// The header chunk
    pub fn header(&self) -> &MidiHeader {
        &self.header
    }

    /// The tracks, in file order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Consumes the file, returning its tracks
    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }

    /// Consumes the file, returning every event of every track in global time order
    pub fn into_events(self) -> Multiplexer {
        Multiplexer::new(self.tracks)
    }

    /// Replays the whole file through `handler` with a tempo clock, returning the handler
    pub fn replay<H: EventHandler>(self, handler: H) -> H {
        let mut dispatcher = Dispatcher::with_clock(handler, &self.header);
        dispatcher.run(self.into_events());
        dispatcher.into_handler()
    }
}

impl IntoIterator for MidiFile {
    type Item = TimedEvent;
    type IntoIter = Multiplexer;

    fn into_iter(self) -> Self::IntoIter {
        self.into_events()
    }
}

/// Decodes a complete MIDI file held in memory using the default [`DecoderConfig`]
pub fn decode(bytes: &[u8]) -> Result<MidiFile, DecodeError> {
    DecoderConfig::default().decode(bytes)
}

/// Reads and decodes a MIDI file from `source`, such as a file path
pub fn load<R>(source: R) -> Result<MidiFile, LoadError>
where
    R: MidiReadable<Error = std::io::Error>,
{
    let bytes = source.get_midi_bytes()?;
    Ok(decode(&bytes)?)
}
