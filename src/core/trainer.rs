//! The game engine
//!
//! `Trainer` owns the session counters, the current round and the playback
//! scheduler. It is driven from a single thread: messages come in through
//! the methods below, time advances through [`Trainer::tick`], and everything
//! observable goes out as [`TrainerEvent`]s to subscribers.

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

use crate::core::audio::ToneOutput;
use crate::core::error::{Result, TrainerError};
use crate::core::melody::MelodyGenerator;
use crate::core::scheduler::{Cue, Fired, Scheduler, Sequence, SequenceKind};
use crate::core::session::{ProgressTracker, RoundView, SessionStats, Submission};
use crate::core::settings::{SettingsChange, TrainerSettings};
use crate::core::theory::{note_name, Pitch};
use crate::messaging::{Feedback, Notice, PlaybackEvent, TrainerEvent};

/// How long a played key sounds
pub const KEY_ECHO: Duration = Duration::from_millis(300);

pub struct Trainer {
    settings: TrainerSettings,
    stats: SessionStats,
    tracker: ProgressTracker,
    scheduler: Scheduler,
    generator: MelodyGenerator,
    tone: Box<dyn ToneOutput>,
    subscribers: Vec<Sender<TrainerEvent>>,
}

impl Trainer {
    pub fn new(settings: TrainerSettings, tone: Box<dyn ToneOutput>, generator: MelodyGenerator) -> Self {
        Self {
            settings,
            stats: SessionStats::new(),
            tracker: ProgressTracker::new(),
            scheduler: Scheduler::new(),
            generator,
            tone,
            subscribers: Vec::new(),
        }
    }

    /// New event stream; dropped receivers are forgotten on the next event
    pub fn subscribe(&mut self) -> Receiver<TrainerEvent> {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        receiver
    }

    pub fn publish(&mut self, event: TrainerEvent) {
        self.subscribers.retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    pub fn settings(&self) -> &TrainerSettings {
        &self.settings
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn view(&self) -> RoundView {
        RoundView::build(&self.tracker, &self.stats, self.settings.notation)
    }

    /// True while demo or fanfare playback is running
    pub fn is_input_gated(&self) -> bool {
        self.tracker.is_suspended()
    }

    pub fn running_sequence(&self) -> Option<SequenceKind> {
        self.scheduler.running()
    }

    /// When [`tick`](Self::tick) next has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Generate a fresh melody from the current settings and queue its demo.
    ///
    /// On invalid settings nothing changes: the previous round, the counters
    /// and any running playback are left as they are.
    pub fn new_melody(&mut self, now: Instant) -> Result<()> {
        let note_set = self.settings.note_set();
        let melody = match self.generator.generate(
            &note_set,
            self.settings.melody_length,
            self.settings.max_interval,
        ) {
            Ok(melody) => melody,
            Err(err) => {
                warn!("melody generation refused: {}", err);
                self.publish(TrainerEvent::Notice(Notice::error(err.to_string())));
                return Err(TrainerError::from(err));
            }
        };

        self.cancel_playback();
        info!(
            "new melody: {}",
            melody
                .notes()
                .iter()
                .map(|&p| note_name(p, self.settings.notation))
                .collect::<Vec<_>>()
                .join(" ")
        );
        self.tracker.start_round(melody);
        self.publish_round();
        self.start_sequence(Sequence::lead_in(), now);
        Ok(())
    }

    /// Play the current melody. Refused while any gated playback is running.
    pub fn play_demo(&mut self, now: Instant) -> bool {
        self.tick(now);
        self.start_demo(now)
    }

    fn start_demo(&mut self, now: Instant) -> bool {
        if self.scheduler.gates_input() {
            debug!("playback already running, demo request ignored");
            return false;
        }
        if self.tracker.melody().is_empty() {
            return false;
        }
        let sequence = Sequence::demo(self.tracker.melody().notes());
        self.start_sequence(sequence, now);
        true
    }

    /// Stop whatever is playing and reopen input
    pub fn cancel_playback(&mut self) -> bool {
        let cancelled = self.scheduler.cancel();
        if let Some(kind) = cancelled {
            debug!("cancelled {:?}", kind);
            if kind != SequenceKind::LeadIn {
                self.publish(TrainerEvent::Playback(PlaybackEvent::Cancelled(kind)));
            }
        }
        self.sync_gate();
        cancelled.is_some()
    }

    /// Match one key press against the expected note
    pub fn submit_pitch(&mut self, pitch: Pitch, now: Instant) -> Submission {
        // Catch up first so the gate reflects `now`, not the last tick
        self.tick(now);
        if self.tracker.is_suspended() {
            debug!("ignoring {} during playback", pitch);
            return self.tracker.submit(&mut self.stats, pitch);
        }

        self.tone.play_tone(pitch, KEY_ECHO, self.settings.timbre);
        let result = self.tracker.submit(&mut self.stats, pitch);
        let label = note_name(pitch, self.settings.notation);

        match result {
            Submission::Correct { .. } => {
                self.publish(TrainerEvent::Feedback(Feedback::Correct { pitch, label }));
                self.publish_round();
            }
            Submission::Wrong { played, .. } => {
                self.publish(TrainerEvent::Feedback(Feedback::Wrong { played, label }));
                self.publish_round();
            }
            Submission::Completed { .. } => {
                info!("round complete, streak {}", self.stats.streak);
                self.publish(TrainerEvent::Feedback(Feedback::Correct { pitch, label }));
                self.publish_round();
                self.publish(TrainerEvent::RoundComplete);
                self.start_sequence(Sequence::fanfare(), now);
            }
            Submission::Ignored(reason) => debug!("key {} ignored: {:?}", pitch, reason),
        }
        result
    }

    /// Rewind the current melody without touching the counters
    pub fn restart_round(&mut self) {
        self.tracker.restart();
        self.publish_round();
    }

    /// Zero the counters without touching the round
    pub fn reset_statistics(&mut self) {
        self.stats.reset();
        self.publish_round();
    }

    /// Apply a settings edit. Pool-affecting edits regenerate the melody
    /// when the player has not started on the current one yet.
    pub fn change_settings(&mut self, change: SettingsChange, now: Instant) -> Result<()> {
        let regenerate = change.affects_melody() && self.tracker.cursor() == 0;
        let relabel = matches!(change, SettingsChange::Notation(_));
        let volume = matches!(change, SettingsChange::Volume(_));

        self.settings.apply(change);

        if volume {
            self.tone.set_volume(self.settings.volume);
        }
        if regenerate {
            self.new_melody(now)?;
        } else if relabel {
            self.publish_round();
        }
        Ok(())
    }

    /// Run every playback step due at `now`
    pub fn tick(&mut self, now: Instant) {
        for fired in self.scheduler.poll(now) {
            match fired {
                Fired::Tone { pitch, duration } => {
                    self.tone.play_tone(pitch, duration, self.settings.timbre)
                }
                Fired::Cue(Cue::PlayDemo) => {
                    self.start_demo(now);
                }
                Fired::Cue(Cue::Celebrate) => self.publish(TrainerEvent::Celebrate),
                Fired::Cue(Cue::NewMelody) => {
                    // Failure is already reported through a notice
                    self.new_melody(now).ok();
                }
                Fired::Finished(SequenceKind::LeadIn) => {}
                Fired::Finished(kind) => {
                    self.publish(TrainerEvent::Playback(PlaybackEvent::Finished(kind)))
                }
            }
        }
        self.sync_gate();
    }

    fn start_sequence(&mut self, sequence: Sequence, now: Instant) {
        let kind = sequence.kind();
        if let Some(replaced) = self.scheduler.start(sequence, now) {
            if replaced != SequenceKind::LeadIn {
                self.publish(TrainerEvent::Playback(PlaybackEvent::Cancelled(replaced)));
            }
        }
        if kind != SequenceKind::LeadIn {
            self.publish(TrainerEvent::Playback(PlaybackEvent::Started(kind)));
        }
        self.sync_gate();
        self.tick(now);
    }

    // The gate is derived from the scheduler so it cannot outlive the sequence
    fn sync_gate(&mut self) {
        self.tracker.set_suspended(self.scheduler.gates_input());
    }

    fn publish_round(&mut self) {
        let view = self.view();
        self.publish(TrainerEvent::Round(view));
    }
}
