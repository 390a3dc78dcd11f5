use log::info;
use std::path::Path;

use crate::core::error::{Result, TrainerError};
use crate::core::theory::Pitch;
use crate::utils::helpers::normalize_samples;

/// Pitch of the recorded piano note
pub const SAMPLE_ROOT: Pitch = 69;

/// A mono recording of a single piano note, repitched on playback
#[derive(Debug, Clone)]
pub struct PianoSample {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl PianoSample {
    /// Load a WAV file, mixing down to mono and normalising to -1..=1
    pub fn load(path: &Path) -> Result<Self> {
        let reader = hound::WavReader::open(path)
            .map_err(|e| TrainerError::AudioInit(format!("{}: {}", path.display(), e)))?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.into_samples::<f32>().filter_map(|s| s.ok()).collect(),
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .into_samples::<i32>()
                    .filter_map(|s| s.ok())
                    .map(|s| s as f32 / scale)
                    .collect()
            }
        };

        let mut samples: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();
        if samples.is_empty() {
            return Err(TrainerError::AudioInit(format!("{} contains no audio", path.display())));
        }
        normalize_samples(&mut samples);

        info!(
            "loaded piano sample {} ({} frames at {} Hz)",
            path.display(),
            samples.len(),
            spec.sample_rate
        );
        Ok(Self { samples, sample_rate: spec.sample_rate })
    }

    /// Linear interpolation at a fractional frame position
    pub fn frame_at(&self, position: f64) -> Option<f32> {
        let index = position.floor() as usize;
        let current = *self.samples.get(index)?;
        let next = self.samples.get(index + 1).copied().unwrap_or(0.0);
        let fraction = (position - position.floor()) as f32;
        Some(current * (1.0 - fraction) + next * fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, frames: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in frames {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn loads_and_normalises_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a4.wav");
        write_wav(&path, 1, &[0, 8192, -16384, 4096]);

        let sample = PianoSample::load(&path).unwrap();
        assert_eq!(sample.sample_rate, 22_050);
        assert_eq!(sample.samples, vec![0.0, 0.5, -1.0, 0.25]);
    }

    #[test]
    fn mixes_stereo_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, &[16384, 0, 0, -16384]);

        let sample = PianoSample::load(&path).unwrap();
        assert_eq!(sample.samples.len(), 2);
        assert_eq!(sample.samples, vec![1.0, -1.0]);
    }

    #[test]
    fn missing_file_is_an_audio_error() {
        let err = PianoSample::load(Path::new("/definitely/not/here.wav")).unwrap_err();
        assert!(matches!(err, TrainerError::AudioInit(_)));
    }

    #[test]
    fn interpolates_between_frames() {
        let sample = PianoSample { samples: vec![0.0, 1.0], sample_rate: 44_100 };
        assert_eq!(sample.frame_at(0.5), Some(0.5));
        assert_eq!(sample.frame_at(1.0), Some(1.0));
        assert_eq!(sample.frame_at(2.0), None);
    }
}
