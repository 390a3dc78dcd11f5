//! Round progress and the session-wide counters

mod stats;
mod tracker;
mod view;

pub use stats::SessionStats;
pub use tracker::{IgnoreReason, ProgressTracker, RoundState, Submission};
pub use view::{NoteMark, NoteView, RoundView};
