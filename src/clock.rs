//! Conversion of tick based delta times into elapsed seconds

use log::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::chunk::{
    header::{Division, MidiHeader},
    track::meta::{MetaEvent, TEMPO},
};

/// Tempo assumed until the first tempo event, in microseconds per quarter note (120 BPM)
pub const DEFAULT_TEMPO: u32 = 500_000;

/// Microseconds in a second
const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// How ticks relate to time, taken from the header division
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
enum Mode {
    /// Ticks are fractions of a quarter note, so tempo events change their length
    Metrical {
        /// Ticks per quarter note
        ticks_per_quarter: u16,
    },
    /// Ticks are fractions of a timecode frame and have a fixed length
    TimeCode,
}

/// Accumulates elapsed seconds over a stream of delta times.
///
/// Every delta is charged at the rate in effect before the event it precedes is observed, so a
/// tempo change only affects the events after it.
///
/// ```rust
/// use midimux::{chunk::header::Division, clock::TempoClock};
///
/// let mut clock = TempoClock::new(Division::Metrical(96));
/// clock.advance(96);
/// assert!((clock.seconds() - 0.5).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TempoClock {
    /// Seconds since time zero
    seconds: f64,
    /// Length of one tick at the current tempo
    seconds_per_tick: f64,
    /// Length of one tick when the clock was created
    initial_seconds_per_tick: f64,
    /// Whether tempo events apply
    mode: Mode,
}

impl TempoClock {
    /// Creates a clock at time zero for the given division
    pub fn new(division: Division) -> Self {
        let (mode, seconds_per_tick) = match division {
            Division::Metrical(ticks_per_quarter) => (
                Mode::Metrical { ticks_per_quarter },
                quarter_note_rate(DEFAULT_TEMPO, ticks_per_quarter),
            ),
            Division::TimeCode(smpte) => {
                let ticks_per_second =
                    smpte.frames_per_second() * f64::from(smpte.ticks_per_frame());
                let rate = if ticks_per_second > 0.0 {
                    1.0 / ticks_per_second
                } else {
                    warn!(
                        "Timecode division with {} fps and {} ticks per frame never advances",
                        smpte.frame_code(),
                        smpte.ticks_per_frame()
                    );
                    0.0
                };

                (Mode::TimeCode, rate)
            }
        };

        Self {
            seconds: 0.0,
            seconds_per_tick,
            initial_seconds_per_tick: seconds_per_tick,
            mode,
        }
    }

    /// Creates a clock at time zero for the division in `header`
    pub fn from_header(header: &MidiHeader) -> Self {
        Self::new(header.timing())
    }

    /// Moves the clock forward by `ticks` at the current rate
    pub fn advance(&mut self, ticks: u32) {
        self.seconds += f64::from(ticks) * self.seconds_per_tick;
    }

    /// Reacts to a meta event, picking up tempo changes. Other meta events are ignored.
    pub fn observe(&mut self, event: &MetaEvent) {
        if event.kind != TEMPO {
            return;
        }

        match event.tempo() {
            Some(tempo) => self.set_tempo(tempo),
            None => warn!(
                "Ignoring tempo event with {} byte payload, expected 3",
                event.data.len()
            ),
        }
    }

    /// Sets the tempo in microseconds per quarter note. Has no effect in timecode mode.
    pub fn set_tempo(&mut self, micros_per_quarter: u32) {
        match self.mode {
            Mode::Metrical { ticks_per_quarter } => {
                self.seconds_per_tick = quarter_note_rate(micros_per_quarter, ticks_per_quarter)
            }
            Mode::TimeCode => {
                warn!("Ignoring tempo {micros_per_quarter}us per quarter note in timecode mode")
            }
        }
    }

    /// Seconds elapsed since time zero
    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    /// Length of one tick at the current rate
    pub fn seconds_per_tick(&self) -> f64 {
        self.seconds_per_tick
    }

    /// Returns if tick length is fixed by a timecode division
    pub fn is_timecode(&self) -> bool {
        self.mode == Mode::TimeCode
    }

    /// Rewinds to time zero and restores the starting tempo
    pub fn reset(&mut self) {
        self.seconds = 0.0;
        self.seconds_per_tick = self.initial_seconds_per_tick;
    }
}

/// Seconds per tick for a tempo and a metrical division
fn quarter_note_rate(micros_per_quarter: u32, ticks_per_quarter: u16) -> f64 {
    if ticks_per_quarter == 0 {
        warn!("Metrical division of 0 ticks per quarter note never advances");
        return 0.0;
    }

    f64::from(micros_per_quarter) / MICROS_PER_SECOND / f64::from(ticks_per_quarter)
}

#[cfg(test)]
mod tests {
    use super::TempoClock;
    use crate::chunk::{
        header::{Division, MidiHeader, SmpteDivision},
        track::meta::MetaEvent,
    };

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        )
    }

    #[test]
    fn default_tempo_is_120_bpm() {
        let mut clock = TempoClock::new(Division::Metrical(96));
        clock.advance(96);

        assert_close(clock.seconds(), 0.5)
    }

    #[test]
    fn tempo_event_changes_rate_for_later_ticks() {
        let mut clock = TempoClock::from_header(&MidiHeader::new(1, 1, 96));
        clock.advance(48);
        clock.observe(&MetaEvent::new(0x51, [0x07, 0xA1, 0x20]));
        assert_close(clock.seconds_per_tick(), 500_000.0 / 1e6 / 96.0);
        assert_close(clock.seconds(), 0.25);

        clock.observe(&MetaEvent::new(0x51, [0x0F, 0x42, 0x40]));
        clock.advance(96);
        assert_close(clock.seconds(), 1.25)
    }

    #[test]
    fn malformed_tempo_and_other_meta_are_ignored() {
        let mut clock = TempoClock::new(Division::Metrical(480));
        let rate = clock.seconds_per_tick();

        clock.observe(&MetaEvent::new(0x51, [0x07, 0xA1]));
        clock.observe(&MetaEvent::new(0x01, [0x07, 0xA1, 0x20]));

        assert_eq!(clock.seconds_per_tick(), rate)
    }

    #[test]
    fn timecode_rate_is_fixed() {
        let mut clock = TempoClock::new(Division::TimeCode(SmpteDivision::new(25, 40)));
        assert!(clock.is_timecode());
        assert_close(clock.seconds_per_tick(), 1.0 / 1000.0);

        clock.observe(&MetaEvent::new(0x51, [0x0F, 0x42, 0x40]));
        clock.advance(1000);
        assert_close(clock.seconds(), 1.0)
    }

    #[test]
    fn drop_frame_timecode_uses_29_97() {
        let clock = TempoClock::from_header(&MidiHeader::new(0, 1, 0xE350));

        assert_close(clock.seconds_per_tick(), 1.0 / (29.97 * 80.0))
    }

    #[test]
    fn zero_division_does_not_advance() {
        let mut clock = TempoClock::new(Division::Metrical(0));
        clock.advance(1000);

        assert_eq!(clock.seconds(), 0.0)
    }

    #[test]
    fn reset_restores_time_and_tempo() {
        let mut clock = TempoClock::new(Division::Metrical(96));
        clock.set_tempo(1_000_000);
        clock.advance(96);
        clock.reset();

        assert_eq!(clock.seconds(), 0.0);
        assert_close(clock.seconds_per_tick(), 0.5 / 96.0)
    }
}
