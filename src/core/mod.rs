pub mod audio;
pub mod error;
pub mod melody;
pub mod midi;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod theory;
pub mod trainer;

pub use error::{Result, TrainerError};
pub use trainer::Trainer;
