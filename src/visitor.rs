//! Typed event callbacks and the dispatcher that drives them

use crate::{
    chunk::{
        header::MidiHeader,
        track::{
            channel::{ChannelEvent, ChannelMessage, Controller, Note},
            meta::MetaEvent,
            sysex::SysexEvent,
            Event, TimedEvent,
        },
    },
    clock::TempoClock,
};

/// What a handler knows about the moment an event occurs
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Context {
    /// Channel of the last channel event
    channel: u8,
    /// Accumulated delta times
    ticks: u64,
    /// Clock time, if any
    seconds: Option<f64>,
}

impl Context {
    /// Channel of the most recent channel event
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Ticks since the start of the stream
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Seconds since the start of the stream, when the dispatcher runs a tempo clock
    pub fn seconds(&self) -> Option<f64> {
        self.seconds
    }
}

/// Receives decoded events one kind at a time. Every method defaults to doing nothing, so
/// implementors only override what they care about.
#[allow(unused_variables)]
pub trait EventHandler {
    /// A meta event
    fn meta(&mut self, ctx: &Context, event: &MetaEvent) {}
    /// A system exclusive event
    fn sysex(&mut self, ctx: &Context, event: &SysexEvent) {}
    /// Note off on `ctx.channel()`
    fn note_off(&mut self, ctx: &Context, note: &Note) {}
    /// Note on on `ctx.channel()`
    fn note_on(&mut self, ctx: &Context, note: &Note) {}
    /// Polyphonic key pressure
    fn note_aftertouch(&mut self, ctx: &Context, note: &Note) {}
    /// Control change
    fn controller(&mut self, ctx: &Context, controller: &Controller) {}
    /// Program change
    fn program_change(&mut self, ctx: &Context, program: u8) {}
    /// Channel pressure
    fn channel_aftertouch(&mut self, ctx: &Context, pressure: u8) {}
    /// Pitch wheel, 14 bits with 0x2000 at center
    fn pitch_bend(&mut self, ctx: &Context, value: u16) {}
}

impl<H> EventHandler for &mut H
where
    H: EventHandler + ?Sized,
{
    fn meta(&mut self, ctx: &Context, event: &MetaEvent) {
        (**self).meta(ctx, event)
    }

    fn sysex(&mut self, ctx: &Context, event: &SysexEvent) {
        (**self).sysex(ctx, event)
    }

    fn note_off(&mut self, ctx: &Context, note: &Note) {
        (**self).note_off(ctx, note)
    }

    fn note_on(&mut self, ctx: &Context, note: &Note) {
        (**self).note_on(ctx, note)
    }

    fn note_aftertouch(&mut self, ctx: &Context, note: &Note) {
        (**self).note_aftertouch(ctx, note)
    }

    fn controller(&mut self, ctx: &Context, controller: &Controller) {
        (**self).controller(ctx, controller)
    }

    fn program_change(&mut self, ctx: &Context, program: u8) {
        (**self).program_change(ctx, program)
    }

    fn channel_aftertouch(&mut self, ctx: &Context, pressure: u8) {
        (**self).channel_aftertouch(ctx, pressure)
    }

    fn pitch_bend(&mut self, ctx: &Context, value: u16) {
        (**self).pitch_bend(ctx, value)
    }
}

/// Routes events to the matching [`EventHandler`] method while keeping the [`Context`] current.
///
/// ```rust
/// use midimux::{
///     chunk::track::{
///         channel::{ChannelEvent, ChannelMessage, Note},
///         TimedEvent,
///     },
///     visitor::{Context, Dispatcher, EventHandler},
/// };
///
/// #[derive(Default)]
/// struct NoteCounter(usize);
///
/// impl EventHandler for NoteCounter {
///     fn note_on(&mut self, _ctx: &Context, _note: &Note) {
///         self.0 += 1;
///     }
/// }
///
/// let note = ChannelMessage::NoteOn(Note { key: 60, velocity: 100 });
/// let mut dispatcher = Dispatcher::new(NoteCounter::default());
/// dispatcher.dispatch(&TimedEvent::new(10, ChannelEvent::new(3, note)));
///
/// assert_eq!(dispatcher.handler().0, 1);
/// assert_eq!(dispatcher.context().ticks(), 10);
/// assert_eq!(dispatcher.context().channel(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher<H> {
    /// Receiver of every event
    handler: H,
    /// Time and channel state shown to the handler
    context: Context,
    /// Present when seconds are tracked
    clock: Option<TempoClock>,
}

impl<H: EventHandler> Dispatcher<H> {
    /// Creates a dispatcher that counts ticks but not seconds
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            context: Context::default(),
            clock: None,
        }
    }

    /// Creates a dispatcher that also tracks seconds using the division in `header`
    pub fn with_clock(handler: H, header: &MidiHeader) -> Self {
        Self {
            handler,
            context: Context {
                seconds: Some(0.0),
                ..Context::default()
            },
            clock: Some(TempoClock::from_header(header)),
        }
    }

    /// Advances time by the event's delta, then delivers the event
    pub fn dispatch(&mut self, timed: &TimedEvent) {
        self.context.ticks += u64::from(timed.delta_time);

        if let Some(clock) = &mut self.clock {
            clock.advance(timed.delta_time);
            self.context.seconds = Some(clock.seconds());
        }

        self.dispatch_event(&timed.event);
    }

    /// Delivers an event without moving time
    pub fn dispatch_event(&mut self, event: &Event) {
        match event {
            Event::Meta(meta) => {
                self.handler.meta(&self.context, meta);
                if let Some(clock) = &mut self.clock {
                    clock.observe(meta);
                }
            }
            Event::Sysex(sysex) => self.handler.sysex(&self.context, sysex),
            Event::Channel(channel) => self.dispatch_channel(channel),
        }
    }

    /// Records the event's channel in the context, then delivers its message
    pub fn dispatch_channel(&mut self, event: &ChannelEvent) {
        self.context.channel = event.channel;
        let ctx = &self.context;

        match &event.message {
            ChannelMessage::NoteOff(note) => self.handler.note_off(ctx, note),
            ChannelMessage::NoteOn(note) => self.handler.note_on(ctx, note),
            ChannelMessage::NoteAftertouch(note) => self.handler.note_aftertouch(ctx, note),
            ChannelMessage::Controller(controller) => self.handler.controller(ctx, controller),
            ChannelMessage::ProgramChange(program) => self.handler.program_change(ctx, *program),
            ChannelMessage::ChannelAftertouch(pressure) => {
                self.handler.channel_aftertouch(ctx, *pressure)
            }
            ChannelMessage::PitchBend(value) => self.handler.pitch_bend(ctx, *value),
        }
    }

    /// Dispatches every event in order
    pub fn run(&mut self, events: impl IntoIterator<Item = TimedEvent>) {
        for event in events {
            self.dispatch(&event);
        }
    }

    /// Returns to time zero, keeping the handler as is
    pub fn reset(&mut self) {
        self.context = Context {
            seconds: self.clock.map(|_| 0.0),
            ..Context::default()
        };

        if let Some(clock) = &mut self.clock {
            clock.reset();
        }
    }

    /// The current context
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The tempo clock, if this dispatcher tracks seconds
    pub fn clock(&self) -> Option<&TempoClock> {
        self.clock.as_ref()
    }

    /// The handler
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The handler, mutably
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consumes the dispatcher, returning the handler
    pub fn into_handler(self) -> H {
        self.handler
    }
}

#[cfg(test)]
mod tests {
    use super::{Context, Dispatcher, EventHandler};
    use crate::chunk::{
        header::MidiHeader,
        track::{
            channel::{ChannelEvent, ChannelMessage, Controller, Note},
            meta::MetaEvent,
            sysex::SysexEvent,
            TimedEvent,
        },
    };

    /// Records every callback as a readable line
    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl EventHandler for Recorder {
        fn meta(&mut self, ctx: &Context, event: &MetaEvent) {
            self.0
                .push(format!("{} meta {:#04x}", ctx.ticks(), event.kind));
        }

        fn sysex(&mut self, ctx: &Context, _event: &SysexEvent) {
            self.0.push(format!("{} sysex", ctx.ticks()));
        }

        fn note_on(&mut self, ctx: &Context, note: &Note) {
            self.0
                .push(format!("{} on {} ch{}", ctx.ticks(), note.key, ctx.channel()));
        }

        fn controller(&mut self, ctx: &Context, controller: &Controller) {
            self.0.push(format!(
                "{} cc{}={} ch{}",
                ctx.ticks(),
                controller.number,
                controller.value,
                ctx.channel()
            ));
        }

        fn pitch_bend(&mut self, ctx: &Context, value: u16) {
            self.0
                .push(format!("{} bend {value} ch{}", ctx.ticks(), ctx.channel()));
        }
    }

    /// Remembers the seconds reported with each note on
    #[derive(Default)]
    struct Stamps(Vec<f64>);

    impl EventHandler for Stamps {
        fn note_on(&mut self, ctx: &Context, _note: &Note) {
            self.0.push(ctx.seconds().unwrap_or(f64::NAN));
        }
    }

    fn channel(delta_time: u32, channel: u8, message: ChannelMessage) -> TimedEvent {
        TimedEvent::new(delta_time, ChannelEvent::new(channel, message))
    }

    fn note(delta_time: u32) -> TimedEvent {
        channel(
            delta_time,
            0,
            ChannelMessage::NoteOn(Note {
                key: 60,
                velocity: 100,
            }),
        )
    }

    #[test]
    fn events_reach_their_handlers_with_context() {
        let mut dispatcher = Dispatcher::new(Recorder::default());
        dispatcher.run(vec![
            TimedEvent::new(0, MetaEvent::new(0x03, *b"piano")),
            channel(
                10,
                2,
                ChannelMessage::NoteOn(Note {
                    key: 64,
                    velocity: 90,
                }),
            ),
            channel(
                0,
                9,
                ChannelMessage::Controller(Controller {
                    number: 7,
                    value: 127,
                }),
            ),
            TimedEvent::new(5, SysexEvent),
            channel(1, 4, ChannelMessage::PitchBend(0x2000)),
            // Unhandled kinds fall through to the no-op defaults
            channel(1, 4, ChannelMessage::ProgramChange(3)),
        ]);

        assert_eq!(
            dispatcher.handler().0,
            vec![
                "0 meta 0x03",
                "10 on 64 ch2",
                "10 cc7=127 ch9",
                "15 sysex",
                "16 bend 8192 ch4",
            ]
        );
        assert_eq!(dispatcher.context().ticks(), 17)
    }

    #[test]
    fn seconds_are_absent_without_a_clock() {
        let mut dispatcher = Dispatcher::new(Stamps::default());
        dispatcher.dispatch(&note(96));

        assert_eq!(dispatcher.context().seconds(), None);
        assert!(dispatcher.handler().0[0].is_nan())
    }

    #[test]
    fn tempo_change_applies_from_the_next_event() {
        let header = MidiHeader::new(0, 1, 96);
        let mut dispatcher = Dispatcher::with_clock(Stamps::default(), &header);
        dispatcher.run(vec![
            note(96),
            // Half speed from here on, the delta before it still runs at 120 BPM
            TimedEvent::new(96, MetaEvent::new(0x51, [0x0F, 0x42, 0x40])),
            note(96),
        ]);

        let stamps = &dispatcher.handler().0;
        assert!((stamps[0] - 0.5).abs() < 1e-9);
        assert!((stamps[1] - 2.0).abs() < 1e-9)
    }

    #[test]
    fn borrowed_handlers_can_be_dispatched_to() {
        let mut recorder = Recorder::default();
        {
            let mut dispatcher = Dispatcher::new(&mut recorder);
            dispatcher.dispatch(&note(3));
        }

        assert_eq!(recorder.0, vec!["3 on 60 ch0"])
    }

    #[test]
    fn reset_returns_to_time_zero() {
        let header = MidiHeader::new(0, 1, 96);
        let mut dispatcher = Dispatcher::with_clock(Stamps::default(), &header);
        dispatcher.dispatch(&TimedEvent::new(0, MetaEvent::new(0x51, [0x0F, 0x42, 0x40])));
        dispatcher.dispatch(&note(96));
        dispatcher.reset();
        dispatcher.dispatch(&note(96));

        assert_eq!(dispatcher.context().ticks(), 96);
        assert!((dispatcher.handler().0[1] - 0.5).abs() < 1e-9)
    }
}
