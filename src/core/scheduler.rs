//! Timed playback sequences
//!
//! A sequence is a flat list of steps executed strictly in order by whoever
//! owns the [`Scheduler`]. Waits are measured from when the previous wait
//! expired, not from when `poll` happened to run, so late polling does not
//! stretch the rhythm. Only one sequence runs at a time; starting another one
//! cancels the current one.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::core::theory::Pitch;

pub const LEAD_IN: Duration = Duration::from_millis(200);
pub const DEMO_NOTE: Duration = Duration::from_millis(500);
pub const DEMO_SPACING: Duration = Duration::from_millis(450);
pub const FANFARE_NOTES: [Pitch; 4] = [60, 64, 67, 72];
pub const FANFARE_NOTE: Duration = Duration::from_millis(200);
pub const FANFARE_SPACING: Duration = Duration::from_millis(150);
pub const CELEBRATION_HOLD: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    /// Short pause between a new melody and its demo
    LeadIn,
    /// The melody played back for the user to memorise
    Demo,
    /// Jingle after a finished round, followed by the next melody
    Fanfare,
}

/// Hooks back into the owner of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    PlayDemo,
    Celebrate,
    NewMelody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Tone { pitch: Pitch, duration: Duration },
    Wait(Duration),
    Cue(Cue),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    kind: SequenceKind,
    steps: Vec<Step>,
    gates_input: bool,
}

impl Sequence {
    pub fn new(kind: SequenceKind) -> Self {
        Self { kind, steps: Vec::new(), gates_input: false }
    }

    /// Player input is ignored while this sequence runs
    pub fn gated(mut self) -> Self {
        self.gates_input = true;
        self
    }

    pub fn tone(mut self, pitch: Pitch, duration: Duration) -> Self {
        self.steps.push(Step::Tone { pitch, duration });
        self
    }

    pub fn wait(mut self, duration: Duration) -> Self {
        self.steps.push(Step::Wait(duration));
        self
    }

    pub fn cue(mut self, cue: Cue) -> Self {
        self.steps.push(Step::Cue(cue));
        self
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn lead_in() -> Self {
        Self::new(SequenceKind::LeadIn).wait(LEAD_IN).cue(Cue::PlayDemo)
    }

    pub fn demo(melody: &[Pitch]) -> Self {
        melody.iter().fold(Self::new(SequenceKind::Demo).gated(), |seq, &pitch| {
            seq.tone(pitch, DEMO_NOTE).wait(DEMO_SPACING)
        })
    }

    pub fn fanfare() -> Self {
        FANFARE_NOTES
            .iter()
            .fold(Self::new(SequenceKind::Fanfare).gated(), |seq, &pitch| {
                seq.tone(pitch, FANFARE_NOTE).wait(FANFARE_SPACING)
            })
            .cue(Cue::Celebrate)
            .wait(CELEBRATION_HOLD)
            .cue(Cue::NewMelody)
    }
}

/// Something the owner has to act on, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fired {
    Tone { pitch: Pitch, duration: Duration },
    Cue(Cue),
    Finished(SequenceKind),
}

struct Running {
    kind: SequenceKind,
    steps: VecDeque<Step>,
    gates_input: bool,
    clock: Instant,
    resume_at: Option<Instant>,
}

#[derive(Default)]
pub struct Scheduler {
    active: Option<Running>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `sequence` at `now`, returning the kind of any sequence it replaced
    pub fn start(&mut self, sequence: Sequence, now: Instant) -> Option<SequenceKind> {
        let replaced = self.cancel();
        self.active = Some(Running {
            kind: sequence.kind,
            steps: sequence.steps.into(),
            gates_input: sequence.gates_input,
            clock: now,
            resume_at: None,
        });
        replaced
    }

    pub fn cancel(&mut self) -> Option<SequenceKind> {
        self.active.take().map(|running| running.kind)
    }

    pub fn running(&self) -> Option<SequenceKind> {
        self.active.as_ref().map(|running| running.kind)
    }

    pub fn is_running(&self, kind: SequenceKind) -> bool {
        self.running() == Some(kind)
    }

    /// True while a gated sequence has steps left
    pub fn gates_input(&self) -> bool {
        self.active.as_ref().is_some_and(|running| running.gates_input)
    }

    /// When the current wait expires, if the sequence is waiting
    pub fn next_deadline(&self) -> Option<Instant> {
        let running = self.active.as_ref()?;
        Some(running.resume_at.unwrap_or(running.clock))
    }

    /// Execute every step that is due at `now`
    pub fn poll(&mut self, now: Instant) -> Vec<Fired> {
        let mut fired = Vec::new();
        let Some(running) = self.active.as_mut() else {
            return fired;
        };

        loop {
            if let Some(at) = running.resume_at {
                if now < at {
                    return fired;
                }
                running.clock = at;
                running.resume_at = None;
            }

            match running.steps.pop_front() {
                Some(Step::Wait(duration)) => running.resume_at = Some(running.clock + duration),
                Some(Step::Tone { pitch, duration }) => fired.push(Fired::Tone { pitch, duration }),
                Some(Step::Cue(cue)) => fired.push(Fired::Cue(cue)),
                None => {
                    let kind = running.kind;
                    self.active = None;
                    fired.push(Fired::Finished(kind));
                    return fired;
                }
            }
        }
    }
}
