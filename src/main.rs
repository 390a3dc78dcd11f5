use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use melody_trainer::core::audio::Timbre;
use melody_trainer::core::settings::TrainerSettings;
use melody_trainer::core::theory::{parse_pitch_class, HandRange, KeySelection, Notation, Scale};
use melody_trainer::messaging::Notice;

mod app;

/// Ear training on a MIDI keyboard: listen to a short melody, play it back.
#[derive(Parser, Debug)]
#[command(name = "melody-trainer", version)]
struct Cli {
    /// Notes per melody
    #[arg(long)]
    length: Option<usize>,

    /// Largest jump between neighbouring notes, in semitones
    #[arg(long)]
    max_interval: Option<i32>,

    /// western, solfege or japanese
    #[arg(long)]
    notation: Option<Notation>,

    /// Scale to draw notes from, e.g. major, minor, blues
    #[arg(long)]
    scale: Option<Scale>,

    /// Scale root, e.g. C, F#, Bb
    #[arg(long, requires = "scale")]
    root: Option<String>,

    /// left, right or both
    #[arg(long)]
    hand: Option<HandRange>,

    /// piano, guitar or sine
    #[arg(long)]
    timbre: Option<Timbre>,

    /// MIDI input port; all ports when omitted
    #[arg(long)]
    midi_in: Option<String>,

    /// Play tones on this MIDI output port instead of the sound card
    #[arg(long)]
    midi_out: Option<String>,

    /// WAV recording of A4 used for the piano timbre
    #[arg(long)]
    sample: Option<PathBuf>,

    /// Fixed seed for reproducible melodies
    #[arg(long)]
    seed: Option<u64>,

    /// Print MIDI ports and exit
    #[arg(long)]
    list_ports: bool,
}

impl Cli {
    fn apply_to(&self, settings: &mut TrainerSettings) -> Result<()> {
        if let Some(length) = self.length {
            settings.melody_length = length;
        }
        if let Some(interval) = self.max_interval {
            settings.max_interval = interval;
        }
        if let Some(notation) = self.notation {
            settings.notation = notation;
        }
        if let Some(scale) = self.scale {
            let root = match &self.root {
                Some(name) => parse_pitch_class(name)
                    .with_context(|| format!("unknown root note '{}'", name))?,
                None => 0,
            };
            settings.keys = KeySelection::Scale { root, scale };
        }
        if let Some(hand) = self.hand {
            settings.hand_range = hand;
        }
        if let Some(timbre) = self.timbre {
            settings.timbre = timbre;
        }
        if let Some(port) = &self.midi_in {
            settings.midi_input = Some(port.clone());
        }
        if let Some(path) = &self.sample {
            settings.piano_sample = Some(path.clone());
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list_ports {
        return app::list_ports();
    }

    let (mut settings, load_error) = TrainerSettings::load_or_default();
    cli.apply_to(&mut settings)?;
    let startup_notices = load_error
        .map(|err| {
            Notice::warning(format!(
                "could not load settings ({}); using defaults, `save` will overwrite the file",
                err
            ))
        })
        .into_iter()
        .collect();

    let app = app::TrainerApp::new(app::AppOptions {
        settings,
        midi_out: cli.midi_out.clone(),
        seed: cli.seed,
        startup_notices,
    })?;
    app.run()
}
