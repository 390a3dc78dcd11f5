use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{pitch_class, Pitch};

const WESTERN_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
const SOLFEGE_NAMES: [&str; 12] = [
    "Do", "Do#", "Re", "Re#", "Mi", "Fa", "Fa#", "Sol", "Sol#", "La", "La#", "Si",
];
const JAPANESE_NAMES: [&str; 12] = [
    "ド", "ド#", "レ", "レ#", "ミ", "ファ", "ファ#", "ソ", "ソ#", "ラ", "ラ#", "シ",
];

/// Naming scheme applied to pitch classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    #[default]
    Western,
    Solfege,
    Japanese,
}

impl Notation {
    /// Names indexed by pitch class, C first
    pub fn table(self) -> &'static [&'static str; 12] {
        match self {
            Notation::Western => &WESTERN_NAMES,
            Notation::Solfege => &SOLFEGE_NAMES,
            Notation::Japanese => &JAPANESE_NAMES,
        }
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Notation::Western => "western",
            Notation::Solfege => "solfege",
            Notation::Japanese => "japanese",
        };
        f.write_str(name)
    }
}

impl FromStr for Notation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "western" | "en" | "letters" => Ok(Notation::Western),
            "solfege" | "solfège" => Ok(Notation::Solfege),
            "japanese" | "ja" | "jp" => Ok(Notation::Japanese),
            other => Err(format!("unknown notation '{}'", other)),
        }
    }
}

/// Octave number in scientific pitch notation (middle C = 60 = C4)
pub fn octave_of(pitch: Pitch) -> i32 {
    pitch as i32 / 12 - 1
}

/// Human-readable label for a pitch, e.g. `C4` or `Sol#3`
pub fn note_name(pitch: Pitch, notation: Notation) -> String {
    let label = notation.table()[pitch_class(pitch) as usize];
    format!("{}{}", label, octave_of(pitch))
}

/// Parse a western pitch-class name such as `C`, `F#` or `Bb`
pub fn parse_pitch_class(name: &str) -> Option<u8> {
    let name = name.trim();
    let mut chars = name.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let base: i32 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let accidental: i32 = match chars.as_str() {
        "" => 0,
        "#" | "s" => 1,
        "b" => -1,
        _ => return None,
    };
    Some((base + accidental).rem_euclid(12) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_c_is_c4() {
        assert_eq!(note_name(60, Notation::Western), "C4");
        assert_eq!(note_name(60, Notation::Solfege), "Do4");
        assert_eq!(note_name(60, Notation::Japanese), "ド4");
    }

    #[test]
    fn a440_is_a4() {
        assert_eq!(note_name(69, Notation::Western), "A4");
        assert_eq!(note_name(69, Notation::Solfege), "La4");
    }

    #[test]
    fn lowest_octave_is_negative() {
        assert_eq!(note_name(0, Notation::Western), "C-1");
        assert_eq!(note_name(11, Notation::Western), "B-1");
        assert_eq!(note_name(127, Notation::Western), "G9");
    }

    #[test]
    fn sharps_follow_table_order() {
        assert_eq!(note_name(61, Notation::Western), "C#4");
        assert_eq!(note_name(66, Notation::Solfege), "Fa#4");
        assert_eq!(note_name(71, Notation::Solfege), "Si4");
    }

    #[test]
    fn naming_is_pure() {
        for pitch in 0..=127u8 {
            for notation in [Notation::Western, Notation::Solfege, Notation::Japanese] {
                assert_eq!(note_name(pitch, notation), note_name(pitch, notation));
            }
        }
    }

    #[test]
    fn parses_pitch_classes() {
        assert_eq!(parse_pitch_class("C"), Some(0));
        assert_eq!(parse_pitch_class("f#"), Some(6));
        assert_eq!(parse_pitch_class("Bb"), Some(10));
        assert_eq!(parse_pitch_class("Cb"), Some(11));
        assert_eq!(parse_pitch_class("H"), None);
        assert_eq!(parse_pitch_class(""), None);
    }

    #[test]
    fn notation_from_str() {
        assert_eq!("Solfege".parse::<Notation>(), Ok(Notation::Solfege));
        assert_eq!("japanese".parse::<Notation>(), Ok(Notation::Japanese));
        assert!("klingon".parse::<Notation>().is_err());
    }
}
