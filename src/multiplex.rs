//! Merging of independently timed tracks into one chronological event stream

use std::{iter::FusedIterator, vec};

use log::trace;

use crate::chunk::track::{TimedEvent, Track};

/// A lazy, single pass iterator over the events of several tracks in global time order.
///
/// Each yielded [`TimedEvent`] has its `delta_time` rewritten to the ticks since the previously
/// yielded event, whichever track that came from. Events keep their order within a track, ties
/// between tracks go to the track listed first, and a run of zero-delay events within one track
/// is always yielded without events from other tracks in between.
///
/// ```rust
/// use midimux::{
///     chunk::track::{meta::MetaEvent, TimedEvent, Track},
///     multiplex::Multiplexer,
/// };
///
/// let marker = |delta, name: &str| TimedEvent::new(delta, MetaEvent::new(0x06, name));
/// let a = Track::new(vec![marker(0, "X"), marker(10, "Y")]);
/// let b = Track::new(vec![marker(5, "Z")]);
///
/// let deltas: Vec<u32> = Multiplexer::new(vec![a, b]).map(|e| e.delta_time).collect();
/// assert_eq!(deltas, vec![0, 5, 5]);
/// ```
#[derive(Debug, Clone)]
pub struct Multiplexer {
    /// Tracks that still have events, in their original order
    lanes: Vec<Lane>,
    /// Index of the lane whose zero-delay run is being drained
    burst: Option<usize>,
    /// Events not yet yielded
    remaining: usize,
}

/// A track's unconsumed events plus the ticks already charged against its next one
#[derive(Debug, Clone)]
struct Lane {
    /// Ticks that elapsed globally since this lane last yielded
    offset: u32,
    /// Events left in this lane
    events: vec::IntoIter<TimedEvent>,
}

impl Lane {
    /// The lane's next event, if any
    fn peek(&self) -> Option<&TimedEvent> {
        self.events.as_slice().first()
    }

    /// Ticks from now until the lane's next event
    fn time(&self) -> Option<u32> {
        // Offsets never exceed the pending delta, since the minimum is always chosen
        self.peek()
            .map(|event| event.delta_time.saturating_sub(self.offset))
    }
}

impl Multiplexer {
    /// Creates a multiplexer over `tracks`. Empty tracks are dropped up front.
    pub fn new(tracks: impl IntoIterator<Item = Track>) -> Self {
        let lanes: Vec<Lane> = tracks
            .into_iter()
            .filter(|track| !track.is_empty())
            .map(|track| Lane {
                offset: 0,
                events: track.into_events().into_iter(),
            })
            .collect();

        let remaining = lanes.iter().map(|lane| lane.events.len()).sum();

        Self {
            lanes,
            burst: None,
            remaining,
        }
    }

    /// Pushes every event, in global time order, into `visitor`
    pub fn accept<F>(self, mut visitor: F)
    where
        F: FnMut(&TimedEvent),
    {
        for event in self {
            visitor(&event);
        }
    }

    /// Finds the lane with the earliest next event, preferring the first on ties
    fn earliest(&self) -> Option<(usize, u32)> {
        let mut earliest: Option<(usize, u32)> = None;

        for (index, lane) in self.lanes.iter().enumerate() {
            if let Some(time) = lane.time() {
                if earliest.map_or(true, |(_, best)| time < best) {
                    earliest = Some((index, time));
                }
            }
        }

        earliest
    }
}

impl Iterator for Multiplexer {
    type Item = TimedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(index) = self.burst {
            let lane = &mut self.lanes[index];

            if lane.peek().is_some_and(|event| event.delta_time == 0) {
                self.remaining -= 1;
                return lane.events.next();
            }

            self.burst = None;
            if lane.peek().is_none() {
                self.lanes.remove(index);
            }
        }

        let (index, time) = self.earliest()?;
        trace!("Track lane {index} wins after {time} ticks");

        for lane in &mut self.lanes {
            lane.offset += time;
        }

        let lane = &mut self.lanes[index];
        let mut event = lane.events.next()?;
        lane.offset = 0;
        event.delta_time = time;

        self.burst = Some(index);
        self.remaining -= 1;

        Some(event)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Multiplexer {}

impl FusedIterator for Multiplexer {}
