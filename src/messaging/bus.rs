use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info};
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use super::{Notice, TrainerEvent, TrainerMessage};
use crate::core::trainer::Trainer;

/// Carries device and player input to the trainer
pub struct MessageBus {
    pub(crate) sender: Sender<TrainerMessage>,
    pub(crate) receiver: Receiver<TrainerMessage>,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBus {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        MessageBus { sender, receiver }
    }

    /// Get a sender that can be cloned and handed to input sources
    pub fn sender(&self) -> Sender<TrainerMessage> {
        self.sender.clone()
    }

    /// Handle messages until none is ready or `max_messages` were handled
    pub fn process_messages(&self, trainer: &mut Trainer, max_messages: usize) -> ControlFlow<()> {
        for _ in 0..max_messages {
            let Ok(msg) = self.receiver.try_recv() else {
                break;
            };
            self.handle_message(trainer, msg, Instant::now())?;
        }
        ControlFlow::Continue(())
    }

    /// Block for the next message, but no longer than `timeout`
    pub fn wait(&self, timeout: Duration) -> Result<Option<TrainerMessage>, RecvTimeoutError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(msg) => Ok(Some(msg)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Dispatch a single message. `Break` means the player asked to quit.
    pub fn handle_message(&self, trainer: &mut Trainer, msg: TrainerMessage, now: Instant) -> ControlFlow<()> {
        debug!("handling {:?}", msg);
        match msg {
            TrainerMessage::NotePressed { pitch, .. } => {
                trainer.submit_pitch(pitch, now);
            }
            TrainerMessage::PlayDemo => {
                if trainer.tracker().melody().is_empty() {
                    trainer.publish(TrainerEvent::Notice(Notice::info("no melody to play yet")));
                } else if !trainer.play_demo(now) {
                    trainer.publish(TrainerEvent::Notice(Notice::info("playback already in progress")));
                }
            }
            TrainerMessage::NewMelody => {
                // Rejections are reported as notices by the trainer itself
                trainer.new_melody(now).ok();
            }
            TrainerMessage::RestartRound => trainer.restart_round(),
            TrainerMessage::ResetStatistics => trainer.reset_statistics(),
            TrainerMessage::CancelPlayback => {
                trainer.cancel_playback();
            }
            TrainerMessage::ChangeSettings(change) => {
                trainer.change_settings(change, now).ok();
            }
            TrainerMessage::SaveSettings => match trainer.settings().save() {
                Ok(path) => {
                    info!("settings saved to {}", path.display());
                    trainer.publish(TrainerEvent::Notice(Notice::info(format!(
                        "settings saved to {}",
                        path.display()
                    ))));
                }
                Err(err) => {
                    error!("could not save settings: {}", err);
                    trainer.publish(TrainerEvent::Notice(Notice::error(format!(
                        "could not save settings: {}",
                        err
                    ))));
                }
            },
            TrainerMessage::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Public method to send a message
    pub fn send(&self, msg: TrainerMessage) -> Result<(), crossbeam_channel::SendError<TrainerMessage>> {
        self.sender.send(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audio::SilentOutput;
    use crate::core::melody::MelodyGenerator;
    use crate::core::settings::TrainerSettings;

    #[test]
    fn quit_breaks_and_later_messages_stay_queued() {
        let bus = MessageBus::new();
        let mut trainer =
            Trainer::new(TrainerSettings::default(), Box::new(SilentOutput), MelodyGenerator::seeded(2));
        bus.send(TrainerMessage::ResetStatistics).unwrap();
        bus.send(TrainerMessage::Quit).unwrap();
        bus.send(TrainerMessage::NewMelody).unwrap();

        assert_eq!(bus.process_messages(&mut trainer, 10), ControlFlow::Break(()));
        assert_eq!(bus.receiver.len(), 1);
    }

    #[test]
    fn wait_times_out_quietly() {
        let bus = MessageBus::new();
        assert_eq!(bus.wait(Duration::from_millis(1)), Ok(None));
    }

    fn notices(events: &crossbeam_channel::Receiver<TrainerEvent>) -> Vec<String> {
        events
            .try_iter()
            .filter_map(|e| match e {
                TrainerEvent::Notice(notice) => Some(notice.message),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn demo_without_a_melody_says_so() {
        let bus = MessageBus::new();
        let mut trainer =
            Trainer::new(TrainerSettings::default(), Box::new(SilentOutput), MelodyGenerator::seeded(2));
        let events = trainer.subscribe();
        bus.handle_message(&mut trainer, TrainerMessage::PlayDemo, Instant::now());
        assert_eq!(notices(&events), vec!["no melody to play yet".to_string()]);
    }

    #[test]
    fn demo_during_playback_says_so() {
        let bus = MessageBus::new();
        let mut trainer =
            Trainer::new(TrainerSettings::default(), Box::new(SilentOutput), MelodyGenerator::seeded(2));
        let events = trainer.subscribe();
        let t0 = Instant::now();
        trainer.new_melody(t0).unwrap();
        trainer.tick(t0 + Duration::from_millis(200));
        events.try_iter().count();

        bus.handle_message(&mut trainer, TrainerMessage::PlayDemo, t0 + Duration::from_millis(300));
        assert_eq!(notices(&events), vec!["playback already in progress".to_string()]);
    }
}
