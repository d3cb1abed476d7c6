//! Chord symbol parsing — "Bbm7" -> (Bb, "m7").

use super::note::{parse_spelling, NoteName};

/// A parsed chord symbol: spelled root plus the raw chord-type suffix.
///
/// The suffix is not validated here; unknown types surface when the engine asks
/// the theory provider for intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordSymbol {
    pub root: NoteName,
    pub chord_type: String,
}

/// Parse a chord symbol such as "C", "F#m7b5", "Ebmaj7" or "Bb".
///
/// Root letters must be uppercase so "bb" style typos are rejected instead of
/// silently read as a chord type.
pub fn parse_chord_symbol(symbol: &str) -> Option<ChordSymbol> {
    let symbol = symbol.trim();
    if !symbol.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }
    let (root, suffix) = parse_spelling(symbol)?;
    Some(ChordSymbol {
        root,
        chord_type: suffix.trim().to_string(),
    })
}
