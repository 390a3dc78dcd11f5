pub mod commands;
pub mod console;

pub use commands::{parse_command, Command, HELP};
pub use console::ConsoleDisplay;

use crate::messaging::TrainerEvent;

/// Receives everything the trainer reports and shows it to the player
pub trait DisplaySink {
    fn handle(&mut self, event: &TrainerEvent);
}
