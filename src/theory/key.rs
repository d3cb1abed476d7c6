//! Key context — decides sharp vs flat spelling for chord roots.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::note::{parse_spelling, Letter, NoteName};
use super::PitchClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    Major,
    Minor,
}

/// A key: spelled tonic plus mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Key {
    pub tonic: NoteName,
    pub mode: KeyMode,
}

impl Key {
    pub fn major(tonic: NoteName) -> Self {
        Self {
            tonic,
            mode: KeyMode::Major,
        }
    }

    pub fn minor(tonic: NoteName) -> Self {
        Self {
            tonic,
            mode: KeyMode::Minor,
        }
    }

    /// Position on the circle of fifths: negative = flats, positive = sharps.
    ///
    /// C major and A minor are 0, F major is -1, E minor is +1.
    pub fn fifths(&self) -> i32 {
        let letter_fifths = match self.tonic.letter {
            Letter::F => -1,
            Letter::C => 0,
            Letter::G => 1,
            Letter::D => 2,
            Letter::A => 3,
            Letter::E => 4,
            Letter::B => 5,
        };
        let major = letter_fifths + 7 * self.tonic.accidental as i32;
        match self.mode {
            KeyMode::Major => major,
            KeyMode::Minor => major - 3,
        }
    }

    pub fn prefers_flats(&self) -> bool {
        self.fifths() < 0
    }

    pub fn prefers_sharps(&self) -> bool {
        self.fifths() > 0
    }

    pub fn tonic_class(&self) -> PitchClass {
        self.tonic.pitch_class()
    }

    /// Parse "Bb", "F#m", "Ebmin", "A minor", "D major".
    pub fn parse(text: &str) -> Option<Self> {
        let (tonic, rest) = parse_spelling(text.trim())?;
        let mode = match rest.trim().to_ascii_lowercase().as_str() {
            "" | "maj" | "major" => KeyMode::Major,
            "m" | "min" | "minor" => KeyMode::Minor,
            _ => return None,
        };
        Some(Self { tonic, mode })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            KeyMode::Major => write!(f, "{}", self.tonic),
            KeyMode::Minor => write!(f, "{}m", self.tonic),
        }
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for Key {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Key::parse(&value).ok_or_else(|| format!("invalid key '{value}'"))
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::parse(s).ok_or_else(|| format!("invalid key '{s}'"))
    }
}
