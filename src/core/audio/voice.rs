use std::sync::Arc;
use std::time::Duration;

use super::sample::{PianoSample, SAMPLE_ROOT};
use super::waveform::Waveform;
use super::Timbre;
use crate::core::theory::Pitch;
use crate::utils::helpers::{midi_note_to_freq, semitone_ratio};

/// Exponential ramp from `start` to `end` gain over the voice's lifetime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayEnvelope {
    pub start: f32,
    pub end: f32,
}

impl DecayEnvelope {
    pub fn gain_at(&self, progress: f32) -> f32 {
        let progress = progress.clamp(0.0, 1.0);
        self.start * (self.end / self.start).powf(progress)
    }
}

#[derive(Debug, Clone)]
enum Source {
    Oscillator { waveform: Waveform, phase: f32, phase_increment: f32 },
    Sample { sample: Arc<PianoSample>, position: f64, step: f64 },
}

/// One sounding note
#[derive(Debug, Clone)]
pub struct ToneVoice {
    pub pitch: Pitch,
    source: Source,
    envelope: DecayEnvelope,
    elapsed: usize,
    length: usize,
}

impl ToneVoice {
    /// Build the voice for `timbre`; piano uses `piano` when one was loaded
    pub fn new(
        pitch: Pitch,
        duration: Duration,
        timbre: Timbre,
        piano: Option<&Arc<PianoSample>>,
        sample_rate: f32,
    ) -> Self {
        let seconds = duration.as_secs_f32();
        let (source, envelope, seconds) = match (timbre, piano) {
            (Timbre::Piano, Some(sample)) => {
                let step = sample.sample_rate as f64 / sample_rate as f64
                    * semitone_ratio(pitch as i32 - SAMPLE_ROOT as i32) as f64;
                (
                    Source::Sample { sample: Arc::clone(sample), position: 0.0, step },
                    DecayEnvelope { start: 0.6, end: 0.01 },
                    seconds.max(1.0),
                )
            }
            (Timbre::Piano, None) => (
                Self::oscillator(Waveform::Triangle, pitch, sample_rate),
                DecayEnvelope { start: 0.4, end: 0.001 },
                seconds,
            ),
            (Timbre::Guitar, _) => (
                Self::oscillator(Waveform::Saw, pitch, sample_rate),
                DecayEnvelope { start: 0.3, end: 0.001 },
                seconds * 1.5,
            ),
            (Timbre::Sine, _) => (
                Self::oscillator(Waveform::Sine, pitch, sample_rate),
                DecayEnvelope { start: 0.3, end: 0.01 },
                seconds,
            ),
        };

        Self {
            pitch,
            source,
            envelope,
            elapsed: 0,
            length: (seconds * sample_rate).round() as usize,
        }
    }

    fn oscillator(waveform: Waveform, pitch: Pitch, sample_rate: f32) -> Source {
        Source::Oscillator {
            waveform,
            phase: 0.0,
            phase_increment: midi_note_to_freq(pitch) / sample_rate,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.length
    }

    /// Length in output frames
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn next_sample(&mut self) -> Option<f32> {
        if self.is_finished() {
            return None;
        }
        let gain = self.envelope.gain_at(self.elapsed as f32 / self.length as f32);
        self.elapsed += 1;

        let value = match &mut self.source {
            Source::Oscillator { waveform, phase, phase_increment } => {
                let value = waveform.sample(*phase);
                *phase = (*phase + *phase_increment) % 1.0;
                value
            }
            Source::Sample { sample, position, step } => match sample.frame_at(*position) {
                Some(value) => {
                    *position += *step;
                    value
                }
                None => {
                    // Recording ran out before the envelope did
                    self.elapsed = self.length;
                    return None;
                }
            },
        };
        Some(value * gain)
    }
}
