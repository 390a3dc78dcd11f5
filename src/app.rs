use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};
use std::io::{self, BufRead, ErrorKind, Write};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use melody_trainer::core::audio::{AudioOutput, PianoSample, SilentOutput, ToneOutput};
use melody_trainer::core::melody::MelodyGenerator;
use melody_trainer::core::midi::{MidiInputHandler, MidiToneOutput};
use melody_trainer::core::settings::TrainerSettings;
use melody_trainer::core::Trainer;
use melody_trainer::messaging::{DeviceStatus, MessageBus, Notice, TrainerEvent, TrainerMessage};
use melody_trainer::ui::{parse_command, Command, ConsoleDisplay, DisplaySink, HELP};

/// How long the loop sleeps when nothing is scheduled
const IDLE_WAIT: Duration = Duration::from_millis(250);
/// Upper bound on messages handled between two scheduler ticks
const MAX_MESSAGES_PER_TURN: usize = 64;
const MIDI_OUT_CHANNEL: u8 = 0;

pub struct AppOptions {
    pub settings: TrainerSettings,
    pub midi_out: Option<String>,
    pub seed: Option<u64>,
    /// Problems found before the trainer existed, shown first
    pub startup_notices: Vec<Notice>,
}

// Main app state
pub struct TrainerApp {
    trainer: Trainer,
    message_bus: MessageBus,
    events: Receiver<TrainerEvent>,
    display: ConsoleDisplay<io::Stdout>,
    _midi_input: MidiInputHandler,
}

impl TrainerApp {
    pub fn new(options: AppOptions) -> Result<Self> {
        let AppOptions { settings, midi_out, seed, mut startup_notices } = options;

        let tone = open_tone_output(&settings, midi_out.as_deref(), &mut startup_notices);
        info!("tone output: {}", tone.describe());

        let generator = match seed {
            Some(seed) => MelodyGenerator::seeded(seed),
            None => MelodyGenerator::from_os_rng(),
        };
        let midi_port = settings.midi_input.clone();
        let mut trainer = Trainer::new(settings, tone, generator);
        let events = trainer.subscribe();

        for notice in startup_notices {
            trainer.publish(TrainerEvent::Notice(notice));
        }

        let message_bus = MessageBus::new();
        let mut midi_input = MidiInputHandler::new(message_bus.sender());
        match midi_input.connect(midi_port.as_deref()) {
            Ok(ports) => trainer.publish(TrainerEvent::DeviceStatus(DeviceStatus::Connected(ports))),
            Err(err) => {
                warn!("{}", err);
                trainer.publish(TrainerEvent::Notice(Notice::error(err.to_string())));
                trainer.publish(TrainerEvent::DeviceStatus(DeviceStatus::Disconnected(err.to_string())));
            }
        }

        Ok(Self {
            trainer,
            message_bus,
            events,
            display: ConsoleDisplay::stdout(),
            _midi_input: midi_input,
        })
    }

    /// Run until the player quits or stdin closes
    pub fn run(mut self) -> Result<()> {
        spawn_stdin_reader(self.message_bus.sender());
        println!("type `help` for commands");

        // A refused first melody is already on screen as a notice
        self.trainer.new_melody(Instant::now()).ok();
        self.drain_events();

        loop {
            let timeout = self
                .trainer
                .next_deadline()
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(IDLE_WAIT);

            if let Some(msg) = self.message_bus.wait(timeout)? {
                if self.message_bus.handle_message(&mut self.trainer, msg, Instant::now()).is_break() {
                    break;
                }
                if self
                    .message_bus
                    .process_messages(&mut self.trainer, MAX_MESSAGES_PER_TURN)
                    .is_break()
                {
                    break;
                }
            }

            self.trainer.tick(Instant::now());
            self.drain_events();
        }

        self.drain_events();
        info!("shutting down");
        Ok(())
    }

    fn drain_events(&mut self) {
        for event in self.events.try_iter() {
            self.display.handle(&event);
        }
    }
}

fn open_tone_output(
    settings: &TrainerSettings,
    midi_out: Option<&str>,
    notices: &mut Vec<Notice>,
) -> Box<dyn ToneOutput> {
    if let Some(port) = midi_out {
        match MidiToneOutput::connect(port, MIDI_OUT_CHANNEL) {
            Ok(output) => return Box::new(output),
            Err(err) => {
                warn!("{}", err);
                notices.push(Notice::warning(format!("{}, using audio output instead", err)));
            }
        }
    }

    let piano = settings
        .piano_sample_path()
        .and_then(|path| load_piano_sample(&path, notices));

    match AudioOutput::new(settings.volume, piano) {
        Ok(output) => Box::new(output),
        Err(err) => {
            warn!("{}", err);
            notices.push(Notice::error(format!("{}; continuing without sound", err)));
            Box::new(SilentOutput)
        }
    }
}

fn load_piano_sample(path: &Path, notices: &mut Vec<Notice>) -> Option<PianoSample> {
    match PianoSample::load(path) {
        Ok(sample) => Some(sample),
        Err(err) => {
            warn!("{}", err);
            notices.push(Notice::warning(format!("{}; using the synthesized piano", err)));
            None
        }
    }
}

fn spawn_stdin_reader(sender: Sender<TrainerMessage>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        let mut out = io::stdout();
        read_commands(stdin.lock(), &mut out, &sender);
    });
}

/// Forward parsed commands until `quit` or end of input. Replies go to `out`.
fn read_commands<R: BufRead, W: Write>(input: R, out: &mut W, sender: &Sender<TrainerMessage>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            // The bad line is already consumed, so reading can go on
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                writeln!(out, "could not read that line: {}", err).ok();
                continue;
            }
            Err(err) => {
                warn!("stdin failed: {}", err);
                break;
            }
        };
        match parse_command(&line) {
            Ok(Some(Command::Send(msg))) => {
                let quit = msg == TrainerMessage::Quit;
                if sender.send(msg).is_err() || quit {
                    return;
                }
            }
            Ok(Some(Command::Help)) => {
                writeln!(out, "{}", HELP).ok();
            }
            Ok(None) => {}
            Err(err) => {
                writeln!(out, "{}", err).ok();
            }
        }
    }
    debug!("stdin closed");
    sender.send(TrainerMessage::Quit).ok();
}

/// Print every MIDI port the system knows about
pub fn list_ports() -> Result<()> {
    let show = |title: &str, ports: melody_trainer::core::Result<Vec<String>>| match ports {
        Ok(ports) if ports.is_empty() => println!("{}: none", title),
        Ok(ports) => {
            println!("{}:", title);
            for port in ports {
                println!("  {}", port);
            }
        }
        Err(err) => println!("{}: {}", title, err),
    };
    show("MIDI inputs", MidiInputHandler::list_ports());
    show("MIDI outputs", MidiToneOutput::list_ports());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::io::Cursor;

    #[test]
    fn undecodable_line_is_skipped() {
        let (sender, receiver) = unbounded();
        let input = Cursor::new(b"play\n\xff\xfe\nnew\n".to_vec());
        let mut out = Vec::new();
        read_commands(input, &mut out, &sender);

        let sent: Vec<TrainerMessage> = receiver.try_iter().collect();
        assert_eq!(
            sent,
            vec![TrainerMessage::PlayDemo, TrainerMessage::NewMelody, TrainerMessage::Quit]
        );
        assert!(String::from_utf8_lossy(&out).contains("could not read that line"));
    }

    #[test]
    fn quit_stops_reading() {
        let (sender, receiver) = unbounded();
        let mut out = Vec::new();
        read_commands(Cursor::new(b"quit\nplay\n".to_vec()), &mut out, &sender);
        assert_eq!(receiver.try_iter().collect::<Vec<_>>(), vec![TrainerMessage::Quit]);
    }
}
