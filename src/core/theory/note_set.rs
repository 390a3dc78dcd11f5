use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use super::scale::Scale;
use super::{pitch_class, Pitch, PitchClass};

/// Which part of the keyboard melodies are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandRange {
    /// C4..=C5
    #[default]
    Right,
    /// C3..=B3
    Left,
    Both,
}

impl HandRange {
    pub const RIGHT: RangeInclusive<Pitch> = 60..=72;
    pub const LEFT: RangeInclusive<Pitch> = 48..=59;

    pub fn ranges(self) -> Vec<RangeInclusive<Pitch>> {
        match self {
            HandRange::Right => vec![Self::RIGHT],
            HandRange::Left => vec![Self::LEFT],
            HandRange::Both => vec![Self::LEFT, Self::RIGHT],
        }
    }
}

impl fmt::Display for HandRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandRange::Right => "right",
            HandRange::Left => "left",
            HandRange::Both => "both",
        };
        f.write_str(name)
    }
}

impl FromStr for HandRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "right" | "r" => Ok(HandRange::Right),
            "left" | "l" => Ok(HandRange::Left),
            "both" | "b" => Ok(HandRange::Both),
            other => Err(format!("unknown hand range '{}'", other)),
        }
    }
}

/// How the user picked the active keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySelection {
    Scale { root: PitchClass, scale: Scale },
    Manual(BTreeSet<PitchClass>),
}

impl Default for KeySelection {
    fn default() -> Self {
        KeySelection::Scale { root: 0, scale: Scale::Major }
    }
}

impl KeySelection {
    pub fn pitch_classes(&self) -> BTreeSet<PitchClass> {
        match self {
            KeySelection::Scale { root, scale } => scale.pitch_classes(*root),
            KeySelection::Manual(classes) => classes.iter().map(|&pc| pc % 12).collect(),
        }
    }
}

/// Concrete pitches eligible for melody generation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteSet {
    pitches: BTreeSet<Pitch>,
}

impl NoteSet {
    pub fn new(pitches: impl IntoIterator<Item = Pitch>) -> Self {
        Self { pitches: pitches.into_iter().collect() }
    }

    /// Every pitch in `range` whose pitch class is selected
    pub fn from_pitch_classes(classes: &BTreeSet<PitchClass>, range: RangeInclusive<Pitch>) -> Self {
        Self::new(range.filter(|&p| classes.contains(&pitch_class(p))))
    }

    /// Re-derive the pool from the current selection and hand range
    pub fn from_selection(keys: &KeySelection, hand: HandRange) -> Self {
        let classes = keys.pitch_classes();
        let pitches = hand
            .ranges()
            .into_iter()
            .flat_map(|range| Self::from_pitch_classes(&classes, range).pitches);
        Self::new(pitches)
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn contains(&self, pitch: Pitch) -> bool {
        self.pitches.contains(&pitch)
    }

    /// Pitches in ascending order
    pub fn to_vec(&self) -> Vec<Pitch> {
        self.pitches.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = Pitch> + '_ {
        self.pitches.iter().copied()
    }
}

impl FromIterator<Pitch> for NoteSet {
    fn from_iter<I: IntoIterator<Item = Pitch>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_is_c_major_over_one_octave() {
        let set = NoteSet::from_selection(&KeySelection::default(), HandRange::Right);
        assert_eq!(set.to_vec(), vec![60, 62, 64, 65, 67, 69, 71, 72]);
    }

    #[test]
    fn left_hand_range_is_disjoint() {
        let left = NoteSet::from_selection(&KeySelection::default(), HandRange::Left);
        let right = NoteSet::from_selection(&KeySelection::default(), HandRange::Right);
        assert_eq!(left.to_vec(), vec![48, 50, 52, 53, 55, 57, 59]);
        assert!(left.iter().all(|p| !right.contains(p)));
    }

    #[test]
    fn both_hands_union() {
        let both = NoteSet::from_selection(&KeySelection::default(), HandRange::Both);
        assert_eq!(both.len(), 15);
        assert!(both.contains(48));
        assert!(both.contains(72));
    }

    #[test]
    fn manual_selection_reduces_mod_12() {
        let keys = KeySelection::Manual([0, 19].into_iter().collect());
        let set = NoteSet::from_selection(&keys, HandRange::Right);
        assert_eq!(set.to_vec(), vec![60, 67, 72]);
    }

    #[test]
    fn empty_manual_selection_gives_empty_pool() {
        let keys = KeySelection::Manual(BTreeSet::new());
        assert!(NoteSet::from_selection(&keys, HandRange::Both).is_empty());
    }
}
