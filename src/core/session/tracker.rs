use super::stats::SessionStats;
use crate::core::melody::Melody;
use crate::core::theory::Pitch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Idle,
    InProgress { cursor: usize },
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Playback is running and input is gated
    Suspended,
    /// Every note of the round has already been matched
    AlreadyComplete,
    NoMelody,
}

/// What a single key press did to the round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Ignored(IgnoreReason),
    Correct { pitch: Pitch, cursor: usize },
    Wrong { played: Pitch, expected: Pitch },
    /// The last note was matched; the round is over
    Completed { pitch: Pitch },
}

/// Compares played pitches against the current melody.
///
/// The cursor only moves forward on an exact match and only goes back to zero
/// through [`start_round`](Self::start_round) or [`restart`](Self::restart).
#[derive(Debug, Default)]
pub struct ProgressTracker {
    melody: Melody,
    cursor: usize,
    suspended: bool,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn melody(&self) -> &Melody {
        &self.melody
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn state(&self) -> RoundState {
        match self.cursor {
            0 => RoundState::Idle,
            c if c >= self.melody.len() => RoundState::Complete,
            cursor => RoundState::InProgress { cursor },
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.melody.is_empty() && self.cursor >= self.melody.len()
    }

    /// Replace the melody and rewind. Counters are untouched.
    pub fn start_round(&mut self, melody: Melody) {
        self.melody = melody;
        self.cursor = 0;
    }

    /// Rewind the current melody. Counters are untouched.
    pub fn restart(&mut self) {
        self.cursor = 0;
    }

    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    pub fn submit(&mut self, stats: &mut SessionStats, pitch: Pitch) -> Submission {
        if self.suspended {
            return Submission::Ignored(IgnoreReason::Suspended);
        }
        if self.melody.is_empty() {
            return Submission::Ignored(IgnoreReason::NoMelody);
        }
        let Some(expected) = self.melody.get(self.cursor) else {
            return Submission::Ignored(IgnoreReason::AlreadyComplete);
        };

        if pitch == expected {
            stats.record_hit();
            self.cursor += 1;
            if self.cursor == self.melody.len() {
                Submission::Completed { pitch }
            } else {
                Submission::Correct { pitch, cursor: self.cursor }
            }
        } else {
            stats.record_miss();
            Submission::Wrong { played: pitch, expected }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_with(notes: Vec<Pitch>) -> ProgressTracker {
        let mut tracker = ProgressTracker::new();
        tracker.start_round(Melody::new(notes));
        tracker
    }

    #[test]
    fn wrong_note_keeps_cursor_and_breaks_streak() {
        let mut tracker = tracker_with(vec![60, 64, 67]);
        let mut stats = SessionStats { correct: 3, wrong: 0, streak: 3 };
        let result = tracker.submit(&mut stats, 64);
        assert_eq!(result, Submission::Wrong { played: 64, expected: 60 });
        assert_eq!(tracker.cursor(), 0);
        assert_eq!(stats, SessionStats { correct: 3, wrong: 1, streak: 0 });
    }

    #[test]
    fn right_note_advances() {
        let mut tracker = tracker_with(vec![60, 64, 67]);
        let mut stats = SessionStats::new();
        assert_eq!(tracker.submit(&mut stats, 60), Submission::Correct { pitch: 60, cursor: 1 });
        assert_eq!(tracker.state(), RoundState::InProgress { cursor: 1 });
        assert_eq!(stats, SessionStats { correct: 1, wrong: 0, streak: 1 });
    }

    #[test]
    fn full_melody_completes_the_round() {
        let mut tracker = tracker_with(vec![60, 64, 67]);
        let mut stats = SessionStats::new();
        assert_eq!(tracker.state(), RoundState::Idle);
        tracker.submit(&mut stats, 60);
        tracker.submit(&mut stats, 64);
        assert_eq!(tracker.submit(&mut stats, 67), Submission::Completed { pitch: 67 });
        assert_eq!(tracker.cursor(), 3);
        assert_eq!(tracker.state(), RoundState::Complete);
        assert_eq!(stats.wrong, 0);
        assert_eq!(stats.streak, 3);
    }

    #[test]
    fn input_after_completion_is_a_no_op() {
        let mut tracker = tracker_with(vec![60]);
        let mut stats = SessionStats::new();
        tracker.submit(&mut stats, 60);
        let before = stats;
        assert_eq!(
            tracker.submit(&mut stats, 61),
            Submission::Ignored(IgnoreReason::AlreadyComplete)
        );
        assert_eq!(stats, before);
        assert_eq!(tracker.cursor(), 1);
    }

    #[test]
    fn suspended_tracker_ignores_everything() {
        let mut tracker = tracker_with(vec![60, 64]);
        let mut stats = SessionStats::new();
        tracker.set_suspended(true);
        assert_eq!(tracker.submit(&mut stats, 60), Submission::Ignored(IgnoreReason::Suspended));
        assert_eq!(tracker.submit(&mut stats, 1), Submission::Ignored(IgnoreReason::Suspended));
        assert_eq!(tracker.cursor(), 0);
        assert_eq!(stats, SessionStats::new());
    }

    #[test]
    fn restart_rewinds_but_keeps_counters() {
        let mut tracker = tracker_with(vec![60, 64, 67]);
        let mut stats = SessionStats::new();
        tracker.submit(&mut stats, 60);
        tracker.submit(&mut stats, 64);
        tracker.restart();
        assert_eq!(tracker.cursor(), 0);
        assert_eq!(stats.correct, 2);
        tracker.start_round(Melody::new(vec![72]));
        assert_eq!(tracker.cursor(), 0);
        assert_eq!(stats.streak, 2);
    }

    #[test]
    fn no_melody_ignores_input() {
        let mut tracker = ProgressTracker::new();
        let mut stats = SessionStats::new();
        assert_eq!(tracker.submit(&mut stats, 60), Submission::Ignored(IgnoreReason::NoMelody));
    }
}
