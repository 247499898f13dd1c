//! Decoder settings

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{chunk, error::DecodeError, MidiFile};

/// How far a channel event's running status reaches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RunningStatusScope {
    /// Every track starts without a running status, as the file format specifies
    #[default]
    PerTrack,
    /// The status of one track's last channel event carries into the next track. Some older
    /// readers behave this way and a few files depend on it.
    File,
}

/// What to do with bytes left over after the last declared track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TrailingBytes {
    /// Fail with [`DecodeError::TrailingBytes`]
    #[default]
    Reject,
    /// Decode the declared tracks and disregard the rest
    Ignore,
}

/// Settings for decoding a MIDI file. The default is strict and conforming: per-track running
/// status and no trailing bytes.
///
/// ```rust
/// use midimux::config::{DecoderConfig, TrailingBytes};
///
/// let config = DecoderConfig::default().with_trailing_bytes(TrailingBytes::Ignore);
/// assert!(config.decode(b"MThd").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecoderConfig {
    /// Scope of the running status state
    pub running_status: RunningStatusScope,
    /// Handling of bytes after the last track
    pub trailing_bytes: TrailingBytes,
}

impl DecoderConfig {
    /// Sets the running status scope
    pub fn with_running_status(mut self, scope: RunningStatusScope) -> Self {
        self.running_status = scope;
        self
    }

    /// Sets the trailing byte policy
    pub fn with_trailing_bytes(mut self, policy: TrailingBytes) -> Self {
        self.trailing_bytes = policy;
        self
    }

    /// Decodes a complete file held in memory with these settings
    pub fn decode(&self, bytes: &[u8]) -> Result<MidiFile, DecodeError> {
        chunk::decode_file(bytes, self)
    }
}
