//! Melody ear-training: hear a short random melody, then play it back on a
//! MIDI keyboard.

pub mod core;
pub mod messaging;
pub mod ui;
pub mod utils;
