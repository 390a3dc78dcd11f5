//! Pitches, pitch classes and the names and scales built on them

mod naming;
mod note_set;
mod scale;

pub use naming::{note_name, octave_of, parse_pitch_class, Notation};
pub use note_set::{HandRange, KeySelection, NoteSet};
pub use scale::{derive_note_set, Scale};

/// MIDI note number, 60 = middle C
pub type Pitch = u8;

/// Pitch modulo 12, 0 = C
pub type PitchClass = u8;

pub fn pitch_class(pitch: Pitch) -> PitchClass {
    pitch % 12
}
