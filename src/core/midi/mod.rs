mod input;
mod output;

pub use input::{parse_note_on, MidiInputHandler};
pub use output::{note_off, note_on, program_change, MidiToneOutput};
