// Notes and motifs.
//
// A `Note` is a plain value: a MIDI-style pitch and a duration in beats. A
// motif is just an ordered slice of notes; the tree never edits one in place,
// so `Vec<Note>` / `&[Note]` are used directly rather than a wrapper type.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const PITCH_MIN: u8 = 0;
pub const PITCH_MAX: u8 = 127;
pub const DURATION_MIN: f64 = 0.1;
pub const DURATION_MAX: f64 = 0.7;

/// A single note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// MIDI pitch number, 0-127.
    pub pitch: u8,
    /// Duration in beats, nominally 0.1-0.7.
    pub duration: f64,
}

impl Note {
    pub const fn new(pitch: u8, duration: f64) -> Self {
        Note { pitch, duration }
    }

    /// Pitch class (pitch mod 12), collapsing octaves.
    pub fn pitch_class(self) -> u8 {
        self.pitch % 12
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.pitch, self.duration)
    }
}

/// The motif used to seed a tree when the caller has none of its own.
pub fn default_seed_motif() -> Vec<Note> {
    vec![
        Note::new(50, 0.1),
        Note::new(78, 0.7),
        Note::new(84, 0.7),
        Note::new(61, 0.4),
        Note::new(67, 0.1),
        Note::new(78, 0.1),
    ]
}

/// Space-separated `pitch-duration` tokens, for progress output.
pub fn format_motif(motif: &[Note]) -> String {
    motif
        .iter()
        .map(Note::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
