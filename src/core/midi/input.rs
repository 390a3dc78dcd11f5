use crossbeam_channel::Sender;
use log::{debug, info, warn};
use midir::{Ignore, MidiInput, MidiInputConnection};

use crate::core::error::{Result, TrainerError};
use crate::messaging::TrainerMessage;

const CLIENT_NAME: &str = "melody-trainer input";

/// Turn a raw MIDI message into a key press, if it is one.
///
/// Only Note On (0x90..=0x9F) with non-zero velocity counts; Note On with
/// velocity 0 is a Note Off by convention.
pub fn parse_note_on(message: &[u8], timestamp_us: u64) -> Option<TrainerMessage> {
    let &[status, note, velocity, ..] = message else {
        return None;
    };
    if status & 0xF0 != 0x90 || velocity == 0 {
        return None;
    }
    Some(TrainerMessage::NotePressed { pitch: note & 0x7F, velocity, timestamp_us })
}

/// Listens on one or more MIDI input ports and forwards key presses
pub struct MidiInputHandler {
    connections: Vec<MidiInputConnection<()>>,
    port_names: Vec<String>,
    message_sender: Sender<TrainerMessage>,
}

impl MidiInputHandler {
    pub fn new(message_sender: Sender<TrainerMessage>) -> Self {
        Self { connections: Vec::new(), port_names: Vec::new(), message_sender }
    }

    /// Names of every available input port
    pub fn list_ports() -> Result<Vec<String>> {
        let midi_in = Self::open()?;
        Ok(midi_in
            .ports()
            .iter()
            .filter_map(|port| midi_in.port_name(port).ok())
            .collect())
    }

    /// Connect to `port_name`, or to every port when `None`.
    ///
    /// Fails with [`TrainerError::DeviceUnavailable`] when nothing could be
    /// connected.
    pub fn connect(&mut self, port_name: Option<&str>) -> Result<Vec<String>> {
        self.disconnect();

        let wanted: Vec<String> = match port_name {
            Some(name) => vec![name.to_string()],
            None => Self::list_ports()?,
        };
        if wanted.is_empty() {
            return Err(TrainerError::DeviceUnavailable("no MIDI input devices found".to_string()));
        }

        for name in &wanted {
            match self.connect_to_port(name) {
                Ok(()) => info!("MIDI input connected: {}", name),
                Err(err) => warn!("{}", err),
            }
        }

        if self.connections.is_empty() {
            return Err(TrainerError::DeviceUnavailable(format!(
                "could not connect to {}",
                wanted.join(", ")
            )));
        }
        Ok(self.port_names.clone())
    }

    fn connect_to_port(&mut self, port_name: &str) -> Result<()> {
        let midi_in = Self::open()?;

        let port = midi_in
            .ports()
            .into_iter()
            .find(|port| midi_in.port_name(port).map(|name| name == port_name).unwrap_or(false))
            .ok_or_else(|| {
                TrainerError::DeviceUnavailable(format!("MIDI port '{}' not found", port_name))
            })?;

        let sender = self.message_sender.clone();
        let connection = midi_in
            .connect(
                &port,
                "melody-trainer-read",
                move |stamp, message, _| {
                    if let Some(msg) = parse_note_on(message, stamp) {
                        debug!("key press {:?}", msg);
                        sender.send(msg).ok();
                    }
                },
                (),
            )
            .map_err(|err| {
                TrainerError::DeviceUnavailable(format!("failed to connect to '{}': {}", port_name, err))
            })?;

        self.connections.push(connection);
        self.port_names.push(port_name.to_string());
        Ok(())
    }

    pub fn disconnect(&mut self) {
        for connection in self.connections.drain(..) {
            connection.close();
        }
        self.port_names.clear();
    }

    fn open() -> Result<MidiInput> {
        let mut midi_in = MidiInput::new(CLIENT_NAME)
            .map_err(|err| TrainerError::DeviceUnavailable(format!("MIDI unavailable: {}", err)))?;
        midi_in.ignore(Ignore::All);
        Ok(midi_in)
    }
}
