mod generator;

pub use generator::{generate, MelodyGenerator};

use crate::core::theory::Pitch;

/// An ordered sequence of pitches the player has to reproduce
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Melody {
    notes: Vec<Pitch>,
}

impl Melody {
    pub fn new(notes: Vec<Pitch>) -> Self {
        Self { notes }
    }

    pub fn notes(&self) -> &[Pitch] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Pitch> {
        self.notes.get(index).copied()
    }
}

impl From<Vec<Pitch>> for Melody {
    fn from(notes: Vec<Pitch>) -> Self {
        Self::new(notes)
    }
}
