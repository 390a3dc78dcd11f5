use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::core::audio::Timbre;
use crate::core::error::{Result, TrainerError};
use crate::core::theory::{HandRange, KeySelection, Notation, NoteSet};

const SETTINGS_DIR: &str = "melody-trainer";
const SETTINGS_FILE: &str = "settings.json";
const PIANO_SAMPLE_FILE: &str = "piano_a4.wav";

/// Everything the player can change between (or during) rounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerSettings {
    pub melody_length: usize,
    /// Largest allowed jump between neighbouring notes, in semitones
    pub max_interval: i32,
    pub notation: Notation,
    pub keys: KeySelection,
    pub hand_range: HandRange,
    pub timbre: Timbre,
    pub volume: f32,
    /// Input port to listen on; every port when unset
    pub midi_input: Option<String>,
    /// WAV recording of A4 used for the piano timbre; see
    /// [`TrainerSettings::piano_sample_path`] for the default
    pub piano_sample: Option<PathBuf>,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            melody_length: 4,
            max_interval: 4,
            notation: Notation::Western,
            keys: KeySelection::default(),
            hand_range: HandRange::Right,
            timbre: Timbre::Piano,
            volume: 0.8,
            midi_input: None,
            piano_sample: None,
        }
    }
}

/// A single edit to [`TrainerSettings`]
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsChange {
    MelodyLength(usize),
    MaxInterval(i32),
    Notation(Notation),
    Keys(KeySelection),
    HandRange(HandRange),
    Timbre(Timbre),
    Volume(f32),
}

impl SettingsChange {
    /// Changes that alter which melodies can be generated
    pub fn affects_melody(&self) -> bool {
        matches!(
            self,
            SettingsChange::MelodyLength(_)
                | SettingsChange::MaxInterval(_)
                | SettingsChange::Keys(_)
                | SettingsChange::HandRange(_)
        )
    }
}

impl TrainerSettings {
    /// Pool for the next melody, derived fresh from the current selection
    pub fn note_set(&self) -> NoteSet {
        NoteSet::from_selection(&self.keys, self.hand_range)
    }

    pub fn apply(&mut self, change: SettingsChange) {
        debug!("applying settings change {:?}", change);
        match change {
            SettingsChange::MelodyLength(length) => self.melody_length = length,
            SettingsChange::MaxInterval(interval) => self.max_interval = interval,
            SettingsChange::Notation(notation) => self.notation = notation,
            SettingsChange::Keys(keys) => self.keys = keys,
            SettingsChange::HandRange(hand) => self.hand_range = hand,
            SettingsChange::Timbre(timbre) => self.timbre = timbre,
            SettingsChange::Volume(volume) => self.volume = volume.clamp(0.0, 1.0),
        }
    }

    pub fn settings_dir() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| TrainerError::Settings("could not find config directory".to_string()))?;
        path.push(SETTINGS_DIR);
        Ok(path)
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::settings_dir()?.join(SETTINGS_FILE))
    }

    /// Load from the config directory. An unreadable file yields defaults
    /// together with the error, which the caller has to show to the player.
    pub fn load_or_default() -> (Self, Option<TrainerError>) {
        match Self::default_path() {
            Ok(path) => Self::load_or_default_from(&path),
            Err(err) => (Self::default(), Some(err)),
        }
    }

    pub fn load_or_default_from(path: &Path) -> (Self, Option<TrainerError>) {
        match Self::load_from(path) {
            Ok(settings) => (settings, None),
            Err(err) => {
                error!("could not load settings from {}: {}", path.display(), err);
                (Self::default(), Some(err))
            }
        }
    }

    /// The configured sample, else `piano_a4.wav` next to the settings file
    pub fn piano_sample_path(&self) -> Option<PathBuf> {
        self.piano_sample
            .clone()
            .or_else(|| Self::settings_dir().ok().map(|dir| dir.join(PIANO_SAMPLE_FILE)))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let file = File::open(path)?;
        let settings: Self = serde_json::from_reader(file)?;
        info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::default_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        info!("saved settings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::theory::Scale;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_through_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);

        let mut settings = TrainerSettings::default();
        settings.apply(SettingsChange::MelodyLength(7));
        settings.apply(SettingsChange::Keys(KeySelection::Scale { root: 9, scale: Scale::Blues }));
        settings.apply(SettingsChange::Notation(Notation::Solfege));
        settings.midi_input = Some("Keystation 49".to_string());
        settings.save_to(&path).unwrap();

        assert_eq!(TrainerSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = TrainerSettings::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, TrainerSettings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{ "melody_length": 6, "keys": { "manual": [0, 4, 7] } }"#).unwrap();

        let loaded = TrainerSettings::load_from(&path).unwrap();
        assert_eq!(loaded.melody_length, 6);
        assert_eq!(loaded.note_set().to_vec(), vec![60, 64, 67, 72]);
        assert_eq!(loaded.max_interval, 4);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "not json").unwrap();
        assert!(matches!(TrainerSettings::load_from(&path), Err(TrainerError::Json(_))));
    }

    #[test]
    fn corrupt_file_falls_back_but_reports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "{ \"melody_length\": ").unwrap();

        let (settings, err) = TrainerSettings::load_or_default_from(&path);
        assert_eq!(settings, TrainerSettings::default());
        assert!(matches!(err, Some(TrainerError::Json(_))));

        let (_, err) = TrainerSettings::load_or_default_from(&dir.path().join("absent.json"));
        assert!(err.is_none());
    }

    #[test]
    fn piano_sample_defaults_to_the_config_dir() {
        let mut settings = TrainerSettings::default();
        if let Some(path) = settings.piano_sample_path() {
            assert!(path.ends_with(Path::new(SETTINGS_DIR).join(PIANO_SAMPLE_FILE)));
        }

        settings.piano_sample = Some(PathBuf::from("/samples/grand.wav"));
        assert_eq!(settings.piano_sample_path(), Some(PathBuf::from("/samples/grand.wav")));
    }

    #[test]
    fn volume_is_clamped() {
        let mut settings = TrainerSettings::default();
        settings.apply(SettingsChange::Volume(3.0));
        assert_eq!(settings.volume, 1.0);
    }

    #[test]
    fn only_pool_changes_affect_melody() {
        assert!(SettingsChange::MaxInterval(2).affects_melody());
        assert!(SettingsChange::HandRange(HandRange::Left).affects_melody());
        assert!(!SettingsChange::Notation(Notation::Japanese).affects_melody());
        assert!(!SettingsChange::Timbre(Timbre::Sine).affects_melody());
    }
}
