use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::PitchClass;

/// Named scales available for bulk key selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    #[default]
    Major,
    NaturalMinor,
    HarmonicMinor,
    MelodicMinor,
    MajorPentatonic,
    MinorPentatonic,
    Blues,
    Chromatic,
}

impl Scale {
    pub const ALL: [Scale; 8] = [
        Scale::Major,
        Scale::NaturalMinor,
        Scale::HarmonicMinor,
        Scale::MelodicMinor,
        Scale::MajorPentatonic,
        Scale::MinorPentatonic,
        Scale::Blues,
        Scale::Chromatic,
    ];

    /// Semitone offsets from the root
    pub fn offsets(self) -> &'static [u8] {
        match self {
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            Scale::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            Scale::MajorPentatonic => &[0, 2, 4, 7, 9],
            Scale::MinorPentatonic => &[0, 3, 5, 7, 10],
            Scale::Blues => &[0, 3, 5, 6, 7, 10],
            Scale::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::NaturalMinor => "minor",
            Scale::HarmonicMinor => "harmonic-minor",
            Scale::MelodicMinor => "melodic-minor",
            Scale::MajorPentatonic => "pentatonic",
            Scale::MinorPentatonic => "minor-pentatonic",
            Scale::Blues => "blues",
            Scale::Chromatic => "chromatic",
        }
    }

    /// Pitch classes of this scale built on `root`
    pub fn pitch_classes(self, root: PitchClass) -> BTreeSet<PitchClass> {
        derive_note_set(root, self.offsets())
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase().replace('_', "-");
        match wanted.as_str() {
            "natural-minor" => return Ok(Scale::NaturalMinor),
            "major-pentatonic" => return Ok(Scale::MajorPentatonic),
            _ => {}
        }
        Scale::ALL
            .into_iter()
            .find(|scale| scale.name() == wanted)
            .ok_or_else(|| format!("unknown scale '{}'", s))
    }
}

/// `{ (root + o) mod 12 : o in offsets }`
pub fn derive_note_set(root: PitchClass, offsets: &[u8]) -> BTreeSet<PitchClass> {
    offsets
        .iter()
        .map(|&offset| ((root as u16 + offset as u16) % 12) as PitchClass)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_major_is_the_white_keys() {
        let set = derive_note_set(0, Scale::Major.offsets());
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![0, 2, 4, 5, 7, 9, 11]);
    }

    #[test]
    fn roots_wrap_around_the_octave() {
        // G major: G A B C D E F#
        let set = Scale::Major.pitch_classes(7);
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![0, 2, 4, 6, 7, 9, 11]);
    }

    #[test]
    fn a_minor_pentatonic() {
        let set = Scale::MinorPentatonic.pitch_classes(9);
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![0, 2, 4, 7, 9]);
    }

    #[test]
    fn chromatic_covers_every_class() {
        for root in 0..12 {
            assert_eq!(Scale::Chromatic.pitch_classes(root).len(), 12);
        }
    }

    #[test]
    fn duplicate_offsets_collapse() {
        let set = derive_note_set(0, &[0, 12, 24, 7]);
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![0, 7]);
    }

    #[test]
    fn scale_names_round_trip() {
        for scale in Scale::ALL {
            assert_eq!(scale.name().parse::<Scale>(), Ok(scale));
        }
        assert_eq!("natural_minor".parse::<Scale>(), Ok(Scale::NaturalMinor));
        assert!("lydian".parse::<Scale>().is_err());
    }
}
