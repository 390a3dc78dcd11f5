//! Tone output: the capability the trainer uses to make sound

mod output;
mod sample;
mod voice;
mod waveform;

pub use output::{AudioOutput, ToneEngine};
pub use sample::{PianoSample, SAMPLE_ROOT};
pub use voice::{DecayEnvelope, ToneVoice};
pub use waveform::Waveform;

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::core::theory::Pitch;

/// Instrument voice used for every tone the trainer plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timbre {
    #[default]
    Piano,
    Guitar,
    Sine,
}

impl fmt::Display for Timbre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Timbre::Piano => "piano",
            Timbre::Guitar => "guitar",
            Timbre::Sine => "sine",
        };
        f.write_str(name)
    }
}

impl FromStr for Timbre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "piano" => Ok(Timbre::Piano),
            "guitar" => Ok(Timbre::Guitar),
            "sine" | "synth" => Ok(Timbre::Sine),
            other => Err(format!("unknown timbre '{}'", other)),
        }
    }
}

/// Fire-and-forget tone playback.
///
/// Implementations must return immediately; callers never wait on the audio.
pub trait ToneOutput {
    fn play_tone(&mut self, pitch: Pitch, duration: Duration, timbre: Timbre);

    fn set_volume(&mut self, _volume: f32) {}

    /// Short label for status output
    fn describe(&self) -> String;
}

/// Used when no audio backend could be opened
#[derive(Debug, Default)]
pub struct SilentOutput;

impl ToneOutput for SilentOutput {
    fn play_tone(&mut self, pitch: Pitch, duration: Duration, timbre: Timbre) {
        debug!("(silent) {} {} for {:?}", timbre, pitch, duration);
    }

    fn describe(&self) -> String {
        "silent".to_string()
    }
}
