use super::stats::SessionStats;
use super::tracker::ProgressTracker;
use crate::core::theory::{note_name, Notation, Pitch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteMark {
    Correct,
    Current,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteView {
    pub pitch: Pitch,
    pub label: String,
    pub mark: NoteMark,
}

/// Everything a display needs to draw the round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundView {
    pub notes: Vec<NoteView>,
    pub cursor: usize,
    pub stats: SessionStats,
    pub notation: Notation,
}

impl RoundView {
    pub fn build(tracker: &ProgressTracker, stats: &SessionStats, notation: Notation) -> Self {
        let cursor = tracker.cursor();
        let notes = tracker
            .melody()
            .notes()
            .iter()
            .enumerate()
            .map(|(index, &pitch)| NoteView {
                pitch,
                label: note_name(pitch, notation),
                mark: if index < cursor {
                    NoteMark::Correct
                } else if index == cursor {
                    NoteMark::Current
                } else {
                    NoteMark::Pending
                },
            })
            .collect();

        Self { notes, cursor, stats: *stats, notation }
    }

    pub fn is_complete(&self) -> bool {
        !self.notes.is_empty() && self.cursor >= self.notes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::melody::Melody;

    #[test]
    fn marks_follow_the_cursor() {
        let mut tracker = ProgressTracker::new();
        let mut stats = SessionStats::new();
        tracker.start_round(Melody::new(vec![60, 64, 67]));
        tracker.submit(&mut stats, 60);

        let view = RoundView::build(&tracker, &stats, Notation::Western);
        let marks: Vec<_> = view.notes.iter().map(|n| n.mark).collect();
        assert_eq!(marks, vec![NoteMark::Correct, NoteMark::Current, NoteMark::Pending]);
        let labels: Vec<_> = view.notes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["C4", "E4", "G4"]);
        assert_eq!(view.stats.correct, 1);
    }

    #[test]
    fn notation_changes_labels_only() {
        let mut tracker = ProgressTracker::new();
        tracker.start_round(Melody::new(vec![67]));
        let stats = SessionStats::new();
        let view = RoundView::build(&tracker, &stats, Notation::Solfege);
        assert_eq!(view.notes[0].label, "Sol4");
        assert_eq!(view.notes[0].mark, NoteMark::Current);
    }
}
