//! Extraction of song text from text meta events
//!
//! Karaoke style files spread their words over many small text events. A fragment starting
//! with `/` or `\` begins a new line, and fragments starting with `@` carry file information
//! rather than words.

use crate::{
    chunk::track::meta::{MetaEvent, TEXT},
    visitor::{Context, EventHandler},
};

/// Marks a fragment as header information such as title or language
const INFO_PREFIX: u8 = b'@';

/// One piece of text and the moment it occurs
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    /// Ticks since the start of the stream
    pub ticks: u64,
    /// Seconds since the start of the stream, if a tempo clock was running
    pub seconds: Option<f64>,
    /// Whether this fragment starts a new line
    pub new_line: bool,
    /// The text with any line marker removed
    pub text: String,
}

/// An [`EventHandler`] collecting the text fragments of a stream in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextExtractor {
    /// Fragments seen so far
    fragments: Vec<TextFragment>,
}

impl TextExtractor {
    /// Creates an empty extractor
    pub fn new() -> Self {
        Self::default()
    }

    /// The fragments collected so far
    pub fn fragments(&self) -> &[TextFragment] {
        &self.fragments
    }

    /// Consumes the extractor, returning its fragments
    pub fn into_fragments(self) -> Vec<TextFragment> {
        self.fragments
    }

    /// Joins the fragments into running text, breaking lines where fragments ask for it
    pub fn render(&self) -> String {
        let mut output = String::new();

        for fragment in &self.fragments {
            if fragment.new_line {
                output.push('\n');
            }
            output.push_str(&fragment.text);
        }

        output
    }
}

impl EventHandler for TextExtractor {
    fn meta(&mut self, ctx: &Context, event: &MetaEvent) {
        // Lyric events (0x05) repeat the words without the line markers
        if event.kind != TEXT {
            return;
        }

        let (new_line, text) = match event.data.split_first() {
            None | Some((&INFO_PREFIX, _)) => return,
            Some((b'/' | b'\\', rest)) => (true, rest),
            Some(_) => (false, event.data.as_slice()),
        };

        self.fragments.push(TextFragment {
            ticks: ctx.ticks(),
            seconds: ctx.seconds(),
            new_line,
            text: String::from_utf8_lossy(text).into_owned(),
        });
    }
}
