use log::{info, warn};
use midir::{MidiOutput, MidiOutputConnection};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::core::audio::{Timbre, ToneOutput};
use crate::core::error::{Result, TrainerError};
use crate::core::theory::Pitch;

const CLIENT_NAME: &str = "melody-trainer output";
const NOTE_VELOCITY: u8 = 96;

/// General MIDI programs for each timbre
fn program_for(timbre: Timbre) -> u8 {
    match timbre {
        Timbre::Piano => 0,   // Acoustic Grand Piano
        Timbre::Guitar => 24, // Acoustic Guitar (nylon)
        Timbre::Sine => 80,   // Lead 1 (square)
    }
}

pub fn note_on(channel: u8, note: Pitch, velocity: u8) -> [u8; 3] {
    [0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
}

pub fn note_off(channel: u8, note: Pitch) -> [u8; 3] {
    [0x80 | (channel & 0x0F), note & 0x7F, 0]
}

pub fn program_change(channel: u8, program: u8) -> [u8; 2] {
    [0xC0 | (channel & 0x0F), program & 0x7F]
}

/// Plays tones on an external MIDI instrument
pub struct MidiToneOutput {
    connection: Arc<Mutex<MidiOutputConnection>>,
    port_name: String,
    channel: u8,
    current_program: Option<u8>,
}

impl MidiToneOutput {
    /// List all available MIDI output ports
    pub fn list_ports() -> Result<Vec<String>> {
        let midi_out = MidiOutput::new(CLIENT_NAME)
            .map_err(|err| TrainerError::DeviceUnavailable(format!("MIDI unavailable: {}", err)))?;
        Ok(midi_out
            .ports()
            .iter()
            .filter_map(|port| midi_out.port_name(port).ok())
            .collect())
    }

    pub fn connect(port_name: &str, channel: u8) -> Result<Self> {
        let midi_out = MidiOutput::new(CLIENT_NAME)
            .map_err(|err| TrainerError::DeviceUnavailable(format!("MIDI unavailable: {}", err)))?;

        let port = midi_out
            .ports()
            .into_iter()
            .find(|port| midi_out.port_name(port).map(|name| name == port_name).unwrap_or(false))
            .ok_or_else(|| {
                TrainerError::DeviceUnavailable(format!("MIDI port '{}' not found", port_name))
            })?;

        let connection = midi_out.connect(&port, "melody-trainer-write").map_err(|err| {
            TrainerError::DeviceUnavailable(format!("failed to connect to '{}': {}", port_name, err))
        })?;
        info!("MIDI output connected: {}", port_name);

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            port_name: port_name.to_string(),
            channel: channel & 0x0F,
            current_program: None,
        })
    }

    fn send(&self, message: &[u8]) {
        match self.connection.lock() {
            Ok(mut conn) => {
                if let Err(err) = conn.send(message) {
                    warn!("failed to send MIDI message: {}", err);
                }
            }
            Err(_) => warn!("MIDI output lock poisoned"),
        }
    }
}

impl ToneOutput for MidiToneOutput {
    fn play_tone(&mut self, pitch: Pitch, duration: Duration, timbre: Timbre) {
        let program = program_for(timbre);
        if self.current_program != Some(program) {
            self.send(&program_change(self.channel, program));
            self.current_program = Some(program);
        }
        self.send(&note_on(self.channel, pitch, NOTE_VELOCITY));

        // The note off has to wait; the caller must not.
        let connection = Arc::clone(&self.connection);
        let off = note_off(self.channel, pitch);
        thread::spawn(move || {
            thread::sleep(duration);
            if let Ok(mut conn) = connection.lock() {
                conn.send(&off).ok();
            }
        });
    }

    fn describe(&self) -> String {
        format!("MIDI out: {} (channel {})", self.port_name, self.channel + 1)
    }
}
