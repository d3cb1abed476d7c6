//! Voice-leading optimizer — pick the candidate that moves least from the previous voicing.

use log::debug;

use crate::theory::intervals::is_sus;

use super::{Voicing, VoicingError, VoicingStyle};

/// Total absolute semitone movement between two pitch sets.
///
/// Both sides are sorted; the shorter one is padded with its own highest pitch.
pub fn movement(from: &[i32], to: &[i32]) -> i32 {
    let mut a = from.to_vec();
    let mut b = to.to_vec();
    a.sort_unstable();
    b.sort_unstable();

    let len = a.len().max(b.len());
    let pad = |v: &mut Vec<i32>| {
        if let Some(&last) = v.last() {
            v.resize(len, last);
        }
    };
    pad(&mut a);
    pad(&mut b);

    a.iter().zip(&b).map(|(x, y)| (x - y).abs()).sum()
}

/// Movement between two voicings.
pub fn voicing_movement(from: &Voicing, to: &Voicing) -> i32 {
    movement(&from.pitches(), &to.pitches())
}

/// Whether a candidate may be re-inverted while searching for smoother motion.
///
/// Drop and shell voicings are defined by their shape, and sus chords lose their
/// character when another degree takes the bass, so only close voicings of
/// non-sus chords qualify.
pub fn reinvertible(style: VoicingStyle, chord_type: &str) -> bool {
    style == VoicingStyle::Close && !is_sus(chord_type)
}

/// Every inversion of a close candidate, built by `build_at`.
///
/// Inversions that fail to build (e.g. do not fit the range) are skipped.
pub fn reinversions<F>(tones: usize, mut build_at: F) -> Vec<Voicing>
where
    F: FnMut(usize) -> Result<Voicing, VoicingError>,
{
    (0..tones).filter_map(|inversion| build_at(inversion).ok()).collect()
}

/// The minimum-movement candidate; ties keep the earlier candidate.
///
/// Without a previous voicing the first candidate wins.
pub fn choose(candidates: Vec<Voicing>, previous: Option<&Voicing>) -> Option<Voicing> {
    let Some(prev) = previous else {
        return candidates.into_iter().next();
    };

    let best = candidates
        .into_iter()
        .enumerate()
        .min_by_key(|(i, v)| (voicing_movement(prev, v), *i))
        .map(|(_, v)| v);
    if let Some(v) = &best {
        debug!(
            "voice leading picked {} inv {} (movement {})",
            v.style,
            v.inversion,
            voicing_movement(prev, v)
        );
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::theory::{PitchClass, StandardTheory};
    use crate::voicing::{close, ChordSpec};

    fn close_at(root: u8, chord_type: &str, inversion: usize) -> Voicing {
        let chord = ChordSpec::new(PitchClass::new(root), chord_type).with_inversion(inversion);
        close::build(&StandardTheory, &chord, None, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn identical_sets_do_not_move() {
        assert_eq!(movement(&[60, 64, 67], &[67, 60, 64]), 0);
    }

    #[test]
    fn sums_sorted_differences() {
        assert_eq!(movement(&[60, 64, 67], &[59, 65, 67]), 2);
    }

    #[test]
    fn pads_shorter_with_its_last_pitch() {
        // [60, 64] padded to [60, 64, 64]
        assert_eq!(movement(&[60, 64], &[60, 64, 67]), 3);
        assert_eq!(movement(&[60, 64, 67], &[60, 64]), 3);
    }

    #[test]
    fn empty_sets() {
        assert_eq!(movement(&[], &[]), 0);
        assert_eq!(movement(&[], &[60]), 0);
    }

    #[test]
    fn reinvertible_styles() {
        assert!(reinvertible(VoicingStyle::Close, "maj7"));
        assert!(!reinvertible(VoicingStyle::Close, "sus4"));
        assert!(!reinvertible(VoicingStyle::Drop2, "maj7"));
        assert!(!reinvertible(VoicingStyle::Shell, "m7"));
    }

    #[test]
    fn choose_without_previous_takes_first() {
        let a = close_at(0, "maj", 0);
        let b = close_at(0, "maj", 1);
        let chosen = choose(vec![a.clone(), b], None).unwrap();
        assert_eq!(chosen, a);
    }

    #[test]
    fn choose_minimum_movement() {
        // previous C major root position: C4 E4 G4
        let prev = close_at(0, "maj", 0);
        // F major: F4 A4 C5 (moves 5+5+5) vs C4 F4 A4 (0+1+2)
        let candidates: Vec<Voicing> = (0..3).map(|i| close_at(5, "maj", i)).collect();
        let chosen = choose(candidates, Some(&prev)).unwrap();
        assert_eq!(chosen.inversion, 2);
        assert_eq!(voicing_movement(&prev, &chosen), 3);
    }

    #[test]
    fn reinversions_skip_failures() {
        let built = reinversions(3, |i| {
            if i == 1 {
                Err(VoicingError::NoCandidates)
            } else {
                Ok(close_at(0, "maj", i))
            }
        });
        assert_eq!(built.len(), 2);
    }

    #[test]
    fn choose_empty() {
        assert!(choose(Vec::new(), None).is_none());
    }
}
