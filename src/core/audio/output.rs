use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, Stream};
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::sample::PianoSample;
use super::voice::ToneVoice;
use super::{Timbre, ToneOutput};
use crate::core::error::{Result, TrainerError};
use crate::core::theory::Pitch;

/// Voices above this are dropped oldest-first
const MAX_VOICES: usize = 32;

/// Mixer shared between the trainer and the audio callback
pub struct ToneEngine {
    sample_rate: f32,
    volume: f32,
    voices: Vec<ToneVoice>,
    piano: Option<Arc<PianoSample>>,
}

impl ToneEngine {
    pub fn new(sample_rate: f32, volume: f32, piano: Option<PianoSample>) -> Self {
        Self {
            sample_rate,
            volume: volume.clamp(0.0, 1.0),
            voices: Vec::new(),
            piano: piano.map(Arc::new),
        }
    }

    pub fn has_piano_sample(&self) -> bool {
        self.piano.is_some()
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn trigger(&mut self, pitch: Pitch, duration: Duration, timbre: Timbre) {
        if self.voices.len() >= MAX_VOICES {
            self.voices.remove(0);
        }
        let voice = ToneVoice::new(pitch, duration, timbre, self.piano.as_ref(), self.sample_rate);
        self.voices.push(voice);
    }

    /// Mix one output frame and drop voices that have finished
    pub fn next_sample(&mut self) -> f32 {
        let mut mixed = 0.0;
        self.voices.retain_mut(|voice| match voice.next_sample() {
            Some(value) => {
                mixed += value;
                true
            }
            None => false,
        });
        (mixed * self.volume).clamp(-1.0, 1.0)
    }
}

/// Plays tones on the default cpal output device
pub struct AudioOutput {
    engine: Arc<Mutex<ToneEngine>>,
    device_name: String,
    _stream: Stream,
}

impl AudioOutput {
    pub fn new(volume: f32, piano: Option<PianoSample>) -> Result<Self> {
        let host = cpal::default_host();
        debug!("using audio host {}", host.id().name());

        let device = host
            .default_output_device()
            .ok_or_else(|| TrainerError::AudioInit("no output device available".to_string()))?;
        let device_name = device.name().unwrap_or_else(|_| "unknown device".to_string());

        let config = device
            .default_output_config()
            .map_err(|e| TrainerError::AudioInit(e.to_string()))?;
        let sample_format = config.sample_format();
        let config = cpal::StreamConfig::from(config);
        let sample_rate = config.sample_rate.0 as f32;
        info!("audio output {} at {} Hz ({:?})", device_name, sample_rate, sample_format);

        let engine = Arc::new(Mutex::new(ToneEngine::new(sample_rate, volume, piano)));

        let stream = match sample_format {
            SampleFormat::F32 => create_stream::<f32>(&device, &config, Arc::clone(&engine)),
            SampleFormat::I16 => create_stream::<i16>(&device, &config, Arc::clone(&engine)),
            SampleFormat::U16 => create_stream::<u16>(&device, &config, Arc::clone(&engine)),
            other => Err(TrainerError::AudioInit(format!("unsupported sample format {:?}", other))),
        }?;
        stream.play().map_err(|e| TrainerError::AudioInit(e.to_string()))?;

        Ok(Self { engine, device_name, _stream: stream })
    }
}

impl ToneOutput for AudioOutput {
    fn play_tone(&mut self, pitch: Pitch, duration: Duration, timbre: Timbre) {
        match self.engine.lock() {
            Ok(mut engine) => engine.trigger(pitch, duration, timbre),
            Err(_) => warn!("audio engine lock poisoned, dropping tone {}", pitch),
        }
    }

    fn set_volume(&mut self, volume: f32) {
        if let Ok(mut engine) = self.engine.lock() {
            engine.set_volume(volume);
        }
    }

    fn describe(&self) -> String {
        let sampled = self.engine.lock().map(|engine| engine.has_piano_sample()).unwrap_or(false);
        let piano = if sampled { "sampled" } else { "synthesized" };
        format!("audio: {} ({} piano)", self.device_name, piano)
    }
}

fn create_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    engine: Arc<Mutex<ToneEngine>>,
) -> Result<Stream>
where
    T: Sample + Send + 'static + cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    let err_fn = |err| error!("an error occurred on the audio stream: {}", err);

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // A poisoned lock renders silence rather than tearing down the stream
                let mut guard = engine.lock().ok();
                for frame in data.chunks_mut(channels) {
                    let value = guard.as_mut().map(|e| e.next_sample()).unwrap_or(0.0);
                    let value_t = T::from_sample(value);
                    for sample in frame.iter_mut() {
                        *sample = value_t;
                    }
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| TrainerError::AudioInit(e.to_string()))?;

    Ok(stream)
}
