//! Example program that prints the song text of a karaoke style MIDI file, with the text events
//! of every track merged in playing order

use std::{env, process};

use midimux::text::TextExtractor;

fn main() {
    let mut args = env::args().skip(1);
    let (Some(path), None) = (args.next(), args.next()) else {
        eprintln!("usage: lyrics <midi file name>");
        process::exit(2);
    };

    let midi = match midimux::load(&path) {
        Ok(midi) => midi,
        Err(e) => {
            eprintln!("Failed to read `{path}` as a MIDI file: {e}");
            process::exit(1);
        }
    };

    let text = midi.replay(TextExtractor::new());
    println!("{}", text.render())
}
