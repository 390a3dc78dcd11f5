use crate::core::scheduler::SequenceKind;
use crate::core::session::RoundView;
use crate::core::settings::SettingsChange;
use crate::core::theory::Pitch;

/// Everything that can drive the trainer, from devices or the player
#[derive(Debug, Clone, PartialEq)]
pub enum TrainerMessage {
    /// Note On with non-zero velocity from an input device
    NotePressed { pitch: Pitch, velocity: u8, timestamp_us: u64 },
    PlayDemo,
    NewMelody,
    RestartRound,
    ResetStatistics,
    CancelPlayback,
    ChangeSettings(SettingsChange),
    SaveSettings,
    Quit,
}

/// Result of matching one key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Correct { pitch: Pitch, label: String },
    Wrong { played: Pitch, label: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Started(SequenceKind),
    Finished(SequenceKind),
    Cancelled(SequenceKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceStatus {
    Connected(Vec<String>),
    Disconnected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Something the player has to be told about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Everything subscribers get told about
#[derive(Debug, Clone, PartialEq)]
pub enum TrainerEvent {
    /// Current melody, cursor and counters; sent whenever any of them changes
    Round(RoundView),
    Feedback(Feedback),
    RoundComplete,
    /// Fanfare finished; the next melody follows shortly
    Celebrate,
    Playback(PlaybackEvent),
    DeviceStatus(DeviceStatus),
    Notice(Notice),
}
