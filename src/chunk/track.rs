//! Track chunk data enums and structs

use channel::{ChannelEvent, RunningStatus};
use meta::{MetaEvent, META_PREFIX};
use sysex::{SysexEvent, SYSEX_ESCAPE, SYSEX_START};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::DecodeError, reader::ByteCursor, vlq};

pub mod channel;
pub mod meta;
pub mod sysex;

/// A track: the events of one track chunk, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Track {
    /// All events in this track, each timed relative to the previous one
    events: Vec<TimedEvent>,
}

impl Track {
    /// Creates a track from events already in order
    pub fn new(events: Vec<TimedEvent>) -> Self {
        Self { events }
    }

    /// Decodes every event in a track chunk body.
    ///
    /// The body must be consumed exactly: an event that would read past its end fails instead of
    /// yielding a short track.
    pub(crate) fn read(
        body: &mut ByteCursor<'_>,
        running_status: &mut RunningStatus,
    ) -> Result<Self, DecodeError> {
        let mut events = vec![];

        while !body.is_empty() {
            events.push(TimedEvent::read(body, running_status)?);
        }

        Ok(Self { events })
    }

    /// The events of this track
    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    /// Consumes the track, returning its events
    pub fn into_events(self) -> Vec<TimedEvent> {
        self.events
    }

    /// Number of events in the track
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns if the track holds no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total ticks from the start of the track to its last event
    pub fn duration_ticks(&self) -> u64 {
        self.events
            .iter()
            .map(|event| u64::from(event.delta_time))
            .sum()
    }
}

impl From<Vec<TimedEvent>> for Track {
    fn from(events: Vec<TimedEvent>) -> Self {
        Self::new(events)
    }
}

impl FromIterator<TimedEvent> for Track {
    fn from_iter<T: IntoIterator<Item = TimedEvent>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A MIDI Event with a DeltaTime and an attached Event
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimedEvent {
    /// Ticks to wait after the previous event before this one occurs
    pub delta_time: u32,
    /// The event that occurs after the delta time is waited for
    pub event: Event,
}

impl TimedEvent {
    /// Pairs an event with its delta time
    pub fn new(delta_time: u32, event: impl Into<Event>) -> Self {
        Self {
            delta_time,
            event: event.into(),
        }
    }

    /// Reads a delta time followed by one event
    pub(crate) fn read(
        cursor: &mut ByteCursor<'_>,
        running_status: &mut RunningStatus,
    ) -> Result<Self, DecodeError> {
        let delta_time = vlq::read(cursor)?;
        let event = Event::read(cursor, running_status)?;

        Ok(Self { delta_time, event })
    }
}

/// Any event that may occur
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Event {
    /// Specifies non-MIDI information useful to this format or to sequencers
    Meta(MetaEvent),
    /// A system exclusive event
    Sysex(SysexEvent),
    /// A message for one MIDI channel
    Channel(ChannelEvent),
}

impl Event {
    /// Reads one event, choosing its kind from the lead byte
    pub(crate) fn read(
        cursor: &mut ByteCursor<'_>,
        running_status: &mut RunningStatus,
    ) -> Result<Self, DecodeError> {
        let lead = cursor.peek().ok_or(DecodeError::TruncatedInput {
            offset: cursor.position(),
            needed: 1,
            available: 0,
        })?;

        match lead {
            META_PREFIX => Ok(Event::Meta(MetaEvent::read(cursor)?)),
            SYSEX_START | SYSEX_ESCAPE => Ok(Event::Sysex(SysexEvent::read(cursor)?)),
            _ => Ok(Event::Channel(running_status.decode(cursor)?)),
        }
    }
}

impl From<MetaEvent> for Event {
    fn from(value: MetaEvent) -> Self {
        Self::Meta(value)
    }
}

impl From<SysexEvent> for Event {
    fn from(value: SysexEvent) -> Self {
        Self::Sysex(value)
    }
}

impl From<ChannelEvent> for Event {
    fn from(value: ChannelEvent) -> Self {
        Self::Channel(value)
    }
}
