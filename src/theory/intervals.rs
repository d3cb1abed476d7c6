//! Chord-type interval table.
//!
//! Each chord type maps to an ordered set of semitone offsets from the root. The
//! order defines the chord's stacked structure: index 0 is the root, index 1 the
//! 3rd (or its sus substitute), and so on. That index is a tone's *degree*.

use std::ops::Index;

use serde::{Deserialize, Serialize};

/// Ordered semitone offsets from the root defining a chord type's stacked structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalSet(Vec<u8>);

impl IntervalSet {
    pub fn new(intervals: Vec<u8>) -> Self {
        Self(intervals)
    }

    /// Number of chord tones (N).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Degree of the tone whose interval reduces to `class` (0-11) above the root.
    pub fn degree_of_class(&self, class: u8) -> Option<usize> {
        self.0.iter().position(|&i| i % 12 == class % 12)
    }

    /// First degree whose interval class is one of `wanted`, honoring `wanted`'s order.
    pub fn find_first(&self, wanted: &[u8]) -> Option<usize> {
        wanted.iter().find_map(|&w| self.degree_of_class(w))
    }
}

impl Index<usize> for IntervalSet {
    type Output = u8;

    fn index(&self, degree: usize) -> &u8 {
        &self.0[degree]
    }
}

/// Built-in chord types: (canonical id, aliases, intervals).
const CHORD_TYPES: &[(&str, &[&str], &[u8])] = &[
    ("maj", &["", "M", "major"], &[0, 4, 7]),
    ("m", &["min", "minor", "-"], &[0, 3, 7]),
    ("dim", &["o", "°"], &[0, 3, 6]),
    ("aug", &["+"], &[0, 4, 8]),
    ("sus2", &[], &[0, 2, 7]),
    ("sus4", &["sus"], &[0, 5, 7]),
    ("5", &["power"], &[0, 7]),
    ("6", &["maj6", "M6"], &[0, 4, 7, 9]),
    ("m6", &["min6", "-6"], &[0, 3, 7, 9]),
    ("7", &["dom7"], &[0, 4, 7, 10]),
    ("maj7", &["M7", "Δ7", "Δ", "ma7"], &[0, 4, 7, 11]),
    ("m7", &["min7", "-7"], &[0, 3, 7, 10]),
    ("mmaj7", &["mM7", "m(maj7)", "minmaj7"], &[0, 3, 7, 11]),
    ("m7b5", &["ø", "ø7", "min7b5", "-7b5"], &[0, 3, 6, 10]),
    ("dim7", &["o7", "°7"], &[0, 3, 6, 9]),
    ("7sus4", &["7sus"], &[0, 5, 7, 10]),
    ("aug7", &["7#5", "+7"], &[0, 4, 8, 10]),
    ("9", &["dom9"], &[0, 4, 7, 10, 14]),
    ("maj9", &["M9", "Δ9"], &[0, 4, 7, 11, 14]),
    ("m9", &["min9", "-9"], &[0, 3, 7, 10, 14]),
    ("add9", &["add2"], &[0, 4, 7, 14]),
];

/// Resolve a chord-type id or alias to its canonical id.
pub fn canonical_type(chord_type: &str) -> Option<&'static str> {
    let id = chord_type.trim();
    CHORD_TYPES
        .iter()
        .find(|(canonical, aliases, _)| *canonical == id || aliases.contains(&id))
        .map(|(canonical, _, _)| *canonical)
}

/// Interval set for a chord type, if the table knows it.
pub fn lookup(chord_type: &str) -> Option<IntervalSet> {
    let canonical = canonical_type(chord_type)?;
    CHORD_TYPES
        .iter()
        .find(|(id, _, _)| *id == canonical)
        .map(|(_, _, intervals)| IntervalSet::new(intervals.to_vec()))
}

/// All canonical chord-type ids in table order.
pub fn known_types() -> impl Iterator<Item = &'static str> {
    CHORD_TYPES.iter().map(|(id, _, _)| *id)
}

/// Suspended chords replace the 3rd; re-inverting them loses their character.
pub fn is_sus(chord_type: &str) -> bool {
    chord_type.contains("sus")
}

pub fn is_sus2(chord_type: &str) -> bool {
    matches!(canonical_type(chord_type), Some("sus2"))
}

/// Chords whose 5th is diminished (spelled as a 5th, not a #4).
pub fn has_diminished_fifth(chord_type: &str) -> bool {
    matches!(canonical_type(chord_type), Some("dim" | "m7b5" | "dim7"))
}

/// Chords whose 5th is augmented (spelled as a #5, not a b6).
pub fn has_augmented_fifth(chord_type: &str) -> bool {
    matches!(canonical_type(chord_type), Some("aug" | "aug7"))
}

/// Chords whose 7th is diminished (spelled bb7, not a 6th).
pub fn has_diminished_seventh(chord_type: &str) -> bool {
    matches!(canonical_type(chord_type), Some("dim7"))
}
