use thiserror::Error;

/// Reasons a melody cannot be generated from the current settings
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("no notes are selected for melody generation")]
    EmptyNoteSet,

    #[error("melody length must be at least one note")]
    ZeroLength,
}

#[derive(Error, Debug)]
pub enum TrainerError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    #[error("MIDI device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Audio initialization failed: {0}")]
    AudioInit(String),

    #[error("Invalid setting: {0}")]
    Settings(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings file error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
