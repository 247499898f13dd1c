//! Hand built Standard MIDI File fixtures shared by the integration tests

#![allow(dead_code)]

/// Encodes `value` as a variable length quantity
pub fn vlq(mut value: u32) -> Vec<u8> {
    let mut bytes = vec![(value & 0x7F) as u8];
    value >>= 7;

    while value > 0 {
        bytes.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }

    bytes.reverse();
    bytes
}

/// Builds the events of one track chunk body
#[derive(Debug, Default, Clone)]
pub struct TrackBuilder {
    body: Vec<u8>,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a delta time followed by raw event bytes, status included or elided
    pub fn raw(mut self, delta_time: u32, event: &[u8]) -> Self {
        self.body.extend(vlq(delta_time));
        self.body.extend(event);
        self
    }

    pub fn note_on(self, delta_time: u32, channel: u8, key: u8, velocity: u8) -> Self {
        self.raw(delta_time, &[0x90 | channel, key, velocity])
    }

    pub fn note_off(self, delta_time: u32, channel: u8, key: u8, velocity: u8) -> Self {
        self.raw(delta_time, &[0x80 | channel, key, velocity])
    }

    pub fn meta(self, delta_time: u32, kind: u8, data: &[u8]) -> Self {
        let mut event = vec![0xFF, kind];
        event.extend(vlq(data.len() as u32));
        event.extend(data);
        self.raw(delta_time, &event)
    }

    pub fn text(self, delta_time: u32, text: &str) -> Self {
        self.meta(delta_time, 0x01, text.as_bytes())
    }

    pub fn tempo(self, delta_time: u32, micros_per_quarter: u32) -> Self {
        let [_, a, b, c] = micros_per_quarter.to_be_bytes();
        self.meta(delta_time, 0x51, &[a, b, c])
    }

    pub fn sysex(self, delta_time: u32, data: &[u8]) -> Self {
        let mut event = vec![0xF0];
        event.extend(vlq(data.len() as u32));
        event.extend(data);
        self.raw(delta_time, &event)
    }

    pub fn end_of_track(self, delta_time: u32) -> Self {
        self.meta(delta_time, 0x2F, &[])
    }

    /// The body bytes without a chunk header
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The complete `MTrk` chunk
    pub fn chunk(&self) -> Vec<u8> {
        let mut bytes = b"MTrk".to_vec();
        bytes.extend((self.body.len() as u32).to_be_bytes());
        bytes.extend(&self.body);
        bytes
    }
}

/// A complete file with the given format and division and one chunk per track
pub fn smf(format: u16, division: u16, tracks: &[TrackBuilder]) -> Vec<u8> {
    let mut bytes = b"MThd".to_vec();
    bytes.extend(6u32.to_be_bytes());
    bytes.extend(format.to_be_bytes());
    bytes.extend((tracks.len() as u16).to_be_bytes());
    bytes.extend(division.to_be_bytes());

    for track in tracks {
        bytes.extend(track.chunk());
    }

    bytes
}
