//! Note spelling — picks letter names for chord tones.
//!
//! The root is spelled from the key (flat keys get flat names) and every other
//! tone takes the letter its interval implies, so a C diminished triad reads
//! C-Eb-Gb rather than C-D#-F#.

use super::intervals::{has_augmented_fifth, has_diminished_fifth, has_diminished_seventh};
use super::note::{Letter, NoteName};
use super::{Key, PitchClass};

const SHARP_NAMES: [(Letter, i8); 12] = [
    (Letter::C, 0),
    (Letter::C, 1),
    (Letter::D, 0),
    (Letter::D, 1),
    (Letter::E, 0),
    (Letter::F, 0),
    (Letter::F, 1),
    (Letter::G, 0),
    (Letter::G, 1),
    (Letter::A, 0),
    (Letter::A, 1),
    (Letter::B, 0),
];

const FLAT_NAMES: [(Letter, i8); 12] = [
    (Letter::C, 0),
    (Letter::D, -1),
    (Letter::D, 0),
    (Letter::E, -1),
    (Letter::E, 0),
    (Letter::F, 0),
    (Letter::G, -1),
    (Letter::G, 0),
    (Letter::A, -1),
    (Letter::A, 0),
    (Letter::B, -1),
    (Letter::B, 0),
];

/// Spelling used when there is no key: flats except F#.
const DEFAULT_NAMES: [(Letter, i8); 12] = [
    (Letter::C, 0),
    (Letter::D, -1),
    (Letter::D, 0),
    (Letter::E, -1),
    (Letter::E, 0),
    (Letter::F, 0),
    (Letter::F, 1),
    (Letter::G, 0),
    (Letter::A, -1),
    (Letter::A, 0),
    (Letter::B, -1),
    (Letter::B, 0),
];

/// Everything a spelling decision depends on, passed explicitly per call.
#[derive(Debug, Clone, Copy)]
pub struct SpellingContext<'a> {
    pub root: PitchClass,
    /// Root spelling chosen by the caller (e.g. from a chord symbol "A#7").
    pub spelled_root: Option<NoteName>,
    pub key: Option<Key>,
    pub chord_type: &'a str,
}

fn from_table(table: &[(Letter, i8); 12], class: PitchClass) -> NoteName {
    let (letter, accidental) = table[class.value() as usize];
    NoteName::new(letter, accidental)
}

/// Spell a bare pitch class with no chord context.
pub fn plain_name(class: PitchClass, key: Option<Key>) -> NoteName {
    match key {
        Some(k) if k.prefers_flats() => from_table(&FLAT_NAMES, class),
        Some(k) if k.prefers_sharps() => from_table(&SHARP_NAMES, class),
        _ => from_table(&DEFAULT_NAMES, class),
    }
}

/// Spell the chord root.
pub fn root_name(ctx: &SpellingContext<'_>) -> NoteName {
    ctx.spelled_root
        .filter(|name| name.pitch_class() == ctx.root)
        .unwrap_or_else(|| plain_name(ctx.root, ctx.key))
}

/// Number of letter names between the root and a tone `interval` semitones above it.
pub fn letter_steps(interval: u8, chord_type: &str) -> usize {
    match interval % 12 {
        0 => 0,
        1 | 2 => 1,
        3 | 4 => 2,
        5 => 3,
        6 if has_diminished_fifth(chord_type) => 4,
        6 => 3,
        7 => 4,
        8 if has_augmented_fifth(chord_type) => 4,
        8 => 5,
        9 if has_diminished_seventh(chord_type) => 6,
        9 => 5,
        _ => 6,
    }
}

/// Spell `class`, which sits `interval` semitones above the root.
pub fn spell(class: PitchClass, interval: u8, ctx: &SpellingContext<'_>) -> NoteName {
    let root = root_name(ctx);
    let letter = root.letter.offset(letter_steps(interval, ctx.chord_type));
    let diff = (class.value() as i32 - letter.natural_class() as i32).rem_euclid(12);
    let accidental = if diff > 6 { diff - 12 } else { diff };

    if accidental.abs() > 2 {
        return plain_name(class, ctx.key);
    }
    NoteName::new(letter, accidental as i8)
}
