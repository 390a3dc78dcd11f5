mod bus;
mod types;

pub use bus::MessageBus;
pub use types::{DeviceStatus, Feedback, Notice, NoticeLevel, PlaybackEvent, TrainerEvent, TrainerMessage};
