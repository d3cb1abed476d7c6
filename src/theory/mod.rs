//! Music theory provider — chord interval tables and key-aware note spelling.
//!
//! The voicing engine only talks to theory through the [`Theory`] trait, so a
//! caller can plug in its own chord dictionary. [`StandardTheory`] is the
//! built-in table.

pub mod intervals;
pub mod key;
pub mod note;
pub mod spelling;
pub mod symbol;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use intervals::IntervalSet;
pub use key::{Key, KeyMode};
pub use note::{parse_note_name, Letter, NoteName};
pub use spelling::SpellingContext;
pub use symbol::{parse_chord_symbol, ChordSymbol};

/// A pitch class 0-11 (C = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PitchClass(u8);

impl PitchClass {
    pub fn new(value: u8) -> Self {
        Self(value % 12)
    }

    pub fn of_midi(midi: u8) -> Self {
        Self::new(midi)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Pitch class `semitones` above (or below, if negative) this one.
    pub fn transpose(self, semitones: i32) -> Self {
        Self((self.0 as i32 + semitones).rem_euclid(12) as u8)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", spelling::plain_name(*self, None))
    }
}

/// The theory lookups the voicing engine consumes.
pub trait Theory {
    /// Interval set for a chord-type id, or `None` if the type is unknown.
    fn intervals_for(&self, chord_type: &str) -> Option<IntervalSet>;

    /// Spell `pitch_class`, sounding `interval_from_root` semitones above the root.
    fn spell_note(
        &self,
        pitch_class: PitchClass,
        interval_from_root: u8,
        ctx: &SpellingContext<'_>,
    ) -> NoteName;
}

/// Built-in chord table and spelling rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTheory;

impl Theory for StandardTheory {
    fn intervals_for(&self, chord_type: &str) -> Option<IntervalSet> {
        intervals::lookup(chord_type)
    }

    fn spell_note(
        &self,
        pitch_class: PitchClass,
        interval_from_root: u8,
        ctx: &SpellingContext<'_>,
    ) -> NoteName {
        spelling::spell(pitch_class, interval_from_root, ctx)
    }
}
