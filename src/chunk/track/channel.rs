//! Channel events and the running status decoder

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::DecodeError, reader::ByteCursor, vlq::msb_is_one};

/// A channel event: a message addressed to one of the 16 MIDI channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelEvent {
    /// Channel number, 0-15
    pub channel: u8,
    /// The typed message payload
    pub message: ChannelMessage,
}

impl ChannelEvent {
    /// Creates a channel event, keeping only the low nibble of `channel`
    pub fn new(channel: u8, message: ChannelMessage) -> Self {
        Self {
            channel: channel & 0x0F,
            message,
        }
    }
}

/// The seven kinds of channel voice message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChannelMessage {
    /// Turn Off event
    /// This message is sent when a note is released
    NoteOff(Note),
    /// Turn On event
    /// This message is sent when a note is depressed
    NoteOn(Note),
    /// Polyphonic Key Pressure
    /// This message is most often sent by pressing down a key after it "bottoms out"
    NoteAftertouch(Note),
    /// Control change
    /// This message is sent when a controller value changes. Controllers include devices such as
    /// pedals and levers. Certain controller numbers are reserved.
    Controller(Controller),
    /// Program change.
    /// This message is sent when the patch number changes
    ProgramChange(u8),
    /// Channel Pressure
    /// This message is most often sent by pressing down on a key after it "bottoms out"
    ChannelAftertouch(u8),
    /// Pitch Wheel Change
    /// This message is sent to indicate a change in the pitch wheel as measured by a fourteen bit
    /// value.
    PitchBend(u16),
}

/// A note's key and velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Note {
    /// Note key
    pub key: u8,
    /// Note velocity
    pub velocity: u8,
}

/// Metadata for changing a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Controller {
    /// Controller number
    pub number: u8,
    /// New value
    pub value: u8,
}

/// Decoder state for channel events, remembering the last status byte seen.
///
/// Channel events may omit their status byte when it equals the previous one. The decoder
/// peeks at the next byte: a byte with the high bit set is a new status and is consumed, anything
/// else is the first data byte of an event that reuses the stored status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningStatus {
    /// Last status byte consumed, if any
    status: Option<u8>,
}

impl RunningStatus {
    /// Creates a decoder with no status established
    pub fn new() -> Self {
        Self::default()
    }

    /// The status byte currently in effect
    pub fn current(&self) -> Option<u8> {
        self.status
    }

    /// Decodes one channel event, applying the running status rule
    pub fn decode(&mut self, cursor: &mut ByteCursor<'_>) -> Result<ChannelEvent, DecodeError> {
        let offset = cursor.position();
        let lead = cursor.peek().ok_or(DecodeError::TruncatedInput {
            offset,
            needed: 1,
            available: 0,
        })?;

        let status = if msb_is_one(lead) {
            cursor.read_u8()?;
            self.status = Some(lead);
            lead
        } else {
            self.status
                .ok_or(DecodeError::UnknownEventLead { offset, byte: lead })?
        };

        let channel = status & 0x0F;

        let message = match status >> 4 {
            0x8 => ChannelMessage::NoteOff(read_note(cursor)?),
            0x9 => ChannelMessage::NoteOn(read_note(cursor)?),
            0xA => ChannelMessage::NoteAftertouch(read_note(cursor)?),
            0xB => {
                let [number, value] = cursor.read_array()?;
                ChannelMessage::Controller(Controller { number, value })
            }
            0xC => ChannelMessage::ProgramChange(cursor.read_u8()?),
            0xD => ChannelMessage::ChannelAftertouch(cursor.read_u8()?),
            0xE => {
                // Least significant 7 bits come first
                let [lsb, msb] = cursor.read_array()?;
                let value = (u16::from(msb & 0x7F) << 7) | u16::from(lsb & 0x7F);
                ChannelMessage::PitchBend(value)
            }
            _ => {
                return Err(DecodeError::UnsupportedStatus {
                    offset,
                    status,
                })
            }
        };

        Ok(ChannelEvent { channel, message })
    }
}

/// Reads the key and velocity pair shared by the note messages
fn read_note(cursor: &mut ByteCursor<'_>) -> Result<Note, DecodeError> {
    let [key, velocity] = cursor.read_array()?;
    Ok(Note { key, velocity })
}
