//! Note names — spelled pitch classes ("Eb", "F#", "Bbb") and note parsing ("C2", "Eb4").

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::PitchClass;

/// A natural note letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    const ORDER: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    /// Pitch class of the natural (unaltered) letter.
    pub fn natural_class(self) -> u8 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    /// Position in the C..B letter cycle.
    pub fn index(self) -> usize {
        Self::ORDER.iter().position(|&l| l == self).unwrap_or(0)
    }

    /// The letter `steps` letter-names above this one (wrapping B -> C).
    pub fn offset(self, steps: usize) -> Letter {
        Self::ORDER[(self.index() + steps) % 7]
    }

    pub fn from_char(c: char) -> Option<Letter> {
        match c {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }
}

/// A spelled pitch class: letter plus accidental (-2 = double flat .. +2 = double sharp).
///
/// Octave-free; the octave of a sounding note is derived from its MIDI number
/// with [`NoteName::octave_for`], so octave transposition never needs respelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct NoteName {
    pub letter: Letter,
    pub accidental: i8,
}

impl NoteName {
    pub fn new(letter: Letter, accidental: i8) -> Self {
        Self { letter, accidental }
    }

    pub fn natural(letter: Letter) -> Self {
        Self::new(letter, 0)
    }

    /// Pitch class this spelling sounds as.
    pub fn pitch_class(self) -> PitchClass {
        PitchClass::new((self.letter.natural_class() as i32 + self.accidental as i32).rem_euclid(12) as u8)
    }

    /// Scientific-pitch octave of this spelling at `midi` (C4 = 60).
    ///
    /// The octave follows the letter, so B#3 is MIDI 60 and Cb4 is MIDI 59.
    pub fn octave_for(self, midi: u8) -> i32 {
        (midi as i32 - self.accidental as i32).div_euclid(12) - 1
    }

    /// Full label with octave, e.g. "Eb4".
    pub fn label(self, midi: u8) -> String {
        format!("{self}{}", self.octave_for(midi))
    }

    /// Parse an octave-free name like "Eb", "F#" or "Bbb".
    pub fn parse(name: &str) -> Option<Self> {
        let (note, rest) = parse_spelling(name)?;
        if rest.is_empty() {
            Some(note)
        } else {
            None
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter.as_char())?;
        let symbol = if self.accidental < 0 { "b" } else { "#" };
        for _ in 0..self.accidental.unsigned_abs() {
            f.write_str(symbol)?;
        }
        Ok(())
    }
}

impl From<NoteName> for String {
    fn from(name: NoteName) -> Self {
        name.to_string()
    }
}

impl TryFrom<String> for NoteName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        NoteName::parse(&value).ok_or_else(|| format!("invalid note name '{value}'"))
    }
}

impl FromStr for NoteName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NoteName::parse(s).ok_or_else(|| format!("invalid note name '{s}'"))
    }
}

/// Split a leading spelled note (letter + up to two accidentals) off `text`.
///
/// A `b` straight after the letter is always read as a flat.
pub(crate) fn parse_spelling(text: &str) -> Option<(NoteName, &str)> {
    let mut chars = text.char_indices();
    let (_, first) = chars.next()?;
    let letter = Letter::from_char(first.to_ascii_uppercase())?;

    let mut accidental: i8 = 0;
    let mut consumed = first.len_utf8();
    for (idx, c) in chars {
        let step = match c {
            '#' if accidental >= 0 => 1,
            'b' if accidental <= 0 => -1,
            _ => break,
        };
        if accidental.abs() == 2 {
            break;
        }
        accidental += step;
        consumed = idx + c.len_utf8();
    }

    Some((NoteName::new(letter, accidental), &text[consumed..]))
}

/// Parse a note name string into a MIDI note number.
///
/// Format: `<letter><optional accidentals><octave>`
/// - Letter: C, D, E, F, G, A, B
/// - Accidentals: up to two `#` (sharp) or `b` (flat)
/// - Octave: -1 to 9 (C4 = middle C = MIDI 60)
pub fn parse_note_name(name: &str) -> Option<u8> {
    if !name.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }
    let (note, octave_str) = parse_spelling(name)?;
    let octave: i32 = octave_str.parse().ok()?;

    // MIDI note = (octave + 1) * 12 + base + accidental
    // C-1 = 0, C4 = 60, A4 = 69
    let midi = (octave + 1) * 12 + note.letter.natural_class() as i32 + note.accidental as i32;

    if !(0..=127).contains(&midi) {
        None
    } else {
        Some(midi as u8)
    }
}
