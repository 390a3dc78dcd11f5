use crate::core::theory::Pitch;

/// Normalize a vector of audio samples to the range [-1.0, 1.0]
pub fn normalize_samples(samples: &mut [f32]) {
    let max_abs = samples.iter().fold(0.0f32, |max, &sample| max.max(sample.abs()));

    if max_abs > 0.0 {
        for sample in samples.iter_mut() {
            *sample /= max_abs;
        }
    }
}

/// Frequency ratio of an interval of `semitones` in equal temperament
pub fn semitone_ratio(semitones: i32) -> f32 {
    2.0f32.powf(semitones as f32 / 12.0)
}

/// Convert a MIDI note number to its frequency in Hz
pub fn midi_note_to_freq(note: Pitch) -> f32 {
    // A4 (note 69) is 440 Hz
    440.0 * semitone_ratio(note as i32 - 69)
}
