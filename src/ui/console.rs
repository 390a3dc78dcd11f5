use log::warn;
use std::io::{self, Write};

use super::DisplaySink;
use crate::core::session::{NoteMark, RoundView};
use crate::messaging::{DeviceStatus, Feedback, NoticeLevel, PlaybackEvent, TrainerEvent};

/// Line-oriented renderer for a terminal
pub struct ConsoleDisplay<W: Write> {
    out: W,
    /// Repeated under every round so a lost keyboard stays visible
    device: Option<DeviceStatus>,
}

impl ConsoleDisplay<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out, device: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, event: &TrainerEvent) -> io::Result<()> {
        match event {
            TrainerEvent::Round(view) => {
                writeln!(self.out, "{}", melody_line(view))?;
                writeln!(
                    self.out,
                    "correct {}  wrong {}  streak {}",
                    view.stats.correct, view.stats.wrong, view.stats.streak
                )?;
                if let Some(DeviceStatus::Disconnected(_)) = &self.device {
                    writeln!(self.out, "MIDI: disconnected")?;
                }
            }
            TrainerEvent::Feedback(Feedback::Correct { .. }) => writeln!(self.out, "✓ correct")?,
            TrainerEvent::Feedback(Feedback::Wrong { label, .. }) => {
                writeln!(self.out, "✗ wrong (you played {})", label)?
            }
            TrainerEvent::RoundComplete => writeln!(self.out, "melody complete!")?,
            TrainerEvent::Celebrate => writeln!(self.out, "well done, next melody coming up")?,
            TrainerEvent::Playback(PlaybackEvent::Started(kind)) => {
                writeln!(self.out, "♪ {:?} playing...", kind)?
            }
            TrainerEvent::Playback(PlaybackEvent::Cancelled(kind)) => {
                writeln!(self.out, "♪ {:?} stopped", kind)?
            }
            TrainerEvent::Playback(PlaybackEvent::Finished(_)) => {}
            TrainerEvent::DeviceStatus(status) => {
                match status {
                    DeviceStatus::Connected(ports) => {
                        writeln!(self.out, "MIDI connected: {}", ports.join(", "))?
                    }
                    DeviceStatus::Disconnected(reason) => {
                        writeln!(self.out, "MIDI disconnected: {}", reason)?
                    }
                }
                self.device = Some(status.clone());
            }
            TrainerEvent::Notice(notice) => {
                let prefix = match notice.level {
                    NoticeLevel::Info => "note",
                    NoticeLevel::Warning => "warning",
                    NoticeLevel::Error => "error",
                };
                writeln!(self.out, "{}: {}", prefix, notice.message)?
            }
        }
        self.out.flush()
    }
}

impl<W: Write> DisplaySink for ConsoleDisplay<W> {
    fn handle(&mut self, event: &TrainerEvent) {
        if let Err(err) = self.render(event) {
            warn!("failed to write to console: {}", err);
        }
    }
}

/// `[C4] >D4< E4`: bracketed notes are done, the arrowed one is next
fn melody_line(view: &RoundView) -> String {
    if view.notes.is_empty() {
        return "(no melody)".to_string();
    }
    view.notes
        .iter()
        .map(|note| match note.mark {
            NoteMark::Correct => format!("[{}]", note.label),
            NoteMark::Current => format!(">{}<", note.label),
            NoteMark::Pending => note.label.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::melody::Melody;
    use crate::core::session::{ProgressTracker, SessionStats};
    use crate::core::theory::Notation;
    use crate::messaging::Notice;
    use pretty_assertions::assert_eq;

    fn rendered(events: &[TrainerEvent]) -> String {
        let mut display = ConsoleDisplay::new(Vec::new());
        for event in events {
            display.handle(event);
        }
        String::from_utf8(display.into_inner()).unwrap()
    }

    #[test]
    fn round_shows_marks_and_counters() {
        let mut tracker = ProgressTracker::new();
        let mut stats = SessionStats::new();
        tracker.start_round(Melody::new(vec![60, 62, 64]));
        tracker.submit(&mut stats, 60);

        let view = RoundView::build(&tracker, &stats, Notation::Western);
        assert_eq!(
            rendered(&[TrainerEvent::Round(view)]),
            "[C4] >D4< E4\ncorrect 1  wrong 0  streak 1\n"
        );
    }

    #[test]
    fn wrong_feedback_names_the_played_key() {
        let out = rendered(&[
            TrainerEvent::Feedback(Feedback::Wrong { played: 61, label: "C#4".into() }),
            TrainerEvent::Notice(Notice::error("no notes are selected")),
        ]);
        assert_eq!(out, "✗ wrong (you played C#4)\nerror: no notes are selected\n");
    }

    #[test]
    fn lost_keyboard_is_repeated_with_every_round() {
        let view = RoundView::build(&ProgressTracker::new(), &SessionStats::new(), Notation::Western);
        let out = rendered(&[
            TrainerEvent::DeviceStatus(DeviceStatus::Disconnected("no MIDI input devices found".into())),
            TrainerEvent::Round(view.clone()),
            TrainerEvent::Round(view),
        ]);
        assert_eq!(out.matches("MIDI: disconnected").count(), 2);
    }

    #[test]
    fn connected_keyboard_is_not_repeated() {
        let view = RoundView::build(&ProgressTracker::new(), &SessionStats::new(), Notation::Western);
        let out = rendered(&[
            TrainerEvent::DeviceStatus(DeviceStatus::Connected(vec!["Keystation".into()])),
            TrainerEvent::Round(view),
        ]);
        assert_eq!(out, "MIDI connected: Keystation\n(no melody)\ncorrect 0  wrong 0  streak 0\n");
    }

    #[test]
    fn empty_round() {
        let view = RoundView::build(&ProgressTracker::new(), &SessionStats::new(), Notation::Western);
        assert!(rendered(&[TrainerEvent::Round(view)]).starts_with("(no melody)\n"));
    }
}
