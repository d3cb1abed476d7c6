//! Close voicing builder — chord tones stacked tightly from a chosen bass degree.
//!
//! The interval set is rotated so the requested inversion's degree becomes the
//! bass, then each following tone is raised by octaves until it sits strictly
//! above the previous one. The finished stack is placed in the octave whose
//! center lies nearest the hint range's center.

use log::debug;

use crate::config::EngineConfig;
use crate::theory::{IntervalSet, PitchClass, Theory};

use super::{ChordSpec, PitchRange, Tone, Voicing, VoicingError, VoicingStyle};

/// A close voicing must stay within two octaves.
pub const MAX_CLOSE_SPAN: i32 = 24;

/// Lowest and highest bass octave considered when centering on a range.
const BASS_OCTAVES: std::ops::RangeInclusive<i32> = -1..=9;

/// Stack the chord tones starting at degree `inversion`, each strictly above the last.
///
/// Pitches are relative to the root pitch class at octave zero.
pub(crate) fn stack(intervals: &IntervalSet, inversion: usize) -> Vec<Tone> {
    let n = intervals.len();
    let mut tones: Vec<Tone> = Vec::with_capacity(n);
    for step in 0..n {
        let degree = (inversion + step) % n;
        let mut pitch = intervals[degree] as i32;
        if let Some(prev) = tones.last() {
            while pitch <= prev.pitch {
                pitch += 12;
            }
        }
        tones.push(Tone { degree, pitch });
    }
    tones
}

/// Transpose a relative stack so its bass lands in `octave` (C4 = 60).
pub(crate) fn anchor_bass(tones: &[Tone], root: PitchClass, octave: i32) -> Vec<Tone> {
    let Some(bass) = tones.first() else {
        return Vec::new();
    };
    let bass_class = (root.value() as i32 + bass.pitch).rem_euclid(12);
    let offset = (octave + 1) * 12 + bass_class - bass.pitch;
    tones
        .iter()
        .map(|t| Tone {
            degree: t.degree,
            pitch: t.pitch + offset,
        })
        .collect()
}

/// Place a relative stack in the bass octave whose center is nearest the range center.
fn center_on(tones: &[Tone], root: PitchClass, range: PitchRange) -> Option<Vec<Tone>> {
    BASS_OCTAVES
        .map(|octave| anchor_bass(tones, root, octave))
        .filter(|placed| placed.iter().all(|t| (0..=127).contains(&t.pitch)))
        .min_by_key(|placed| {
            let lo = placed.first().map_or(0, |t| t.pitch);
            let hi = placed.last().map_or(0, |t| t.pitch);
            (lo + hi - range.center2()).abs()
        })
}

/// Build a close voicing of `chord` at its requested inversion (root position by default).
///
/// With a hint range the stack is centered on it; without one the bass sits in
/// the configured default octave. No range fitting happens here.
pub fn build(
    theory: &impl Theory,
    chord: &ChordSpec,
    hint: Option<PitchRange>,
    config: &EngineConfig,
) -> Result<Voicing, VoicingError> {
    let intervals = chord.intervals(theory)?;
    let n = intervals.len();
    let inversion = chord.target_inversion.unwrap_or(0);
    if inversion >= n {
        return Err(VoicingError::InvalidInversion {
            inversion,
            tones: n,
        });
    }

    let stacked = stack(&intervals, inversion);
    let span = stacked.last().map_or(0, |t| t.pitch) - stacked[0].pitch;
    if span > MAX_CLOSE_SPAN {
        return Err(VoicingError::SpanTooWide(span));
    }

    let placed = match hint {
        Some(range) => center_on(&stacked, chord.root, range)
            .ok_or(VoicingError::RangeUnsatisfiable {
                min: range.min,
                max: range.max,
            })?,
        None => anchor_bass(&stacked, chord.root, config.default_octave),
    };
    debug!(
        "close {}{} inv {inversion}: bass at {}",
        chord.root, chord.chord_type, placed[0].pitch
    );

    Voicing::from_tones(
        VoicingStyle::Close,
        chord,
        &intervals,
        &placed,
        hint,
        theory,
        &config.quality,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::intervals::lookup;
    use crate::theory::StandardTheory;

    fn pitches(tones: &[Tone]) -> Vec<i32> {
        tones.iter().map(|t| t.pitch).collect()
    }

    fn spec(root: u8, chord_type: &str) -> ChordSpec {
        ChordSpec::new(PitchClass::new(root), chord_type)
    }

    #[test]
    fn stack_root_position() {
        let tones = stack(&lookup("maj7").unwrap(), 0);
        assert_eq!(pitches(&tones), [0, 4, 7, 11]);
    }

    #[test]
    fn stack_second_inversion_wraps_root_up() {
        let tones = stack(&lookup("maj7").unwrap(), 2);
        assert_eq!(pitches(&tones), [7, 11, 12, 16]);
        assert_eq!(tones.iter().map(|t| t.degree).collect::<Vec<_>>(), [2, 3, 0, 1]);
    }

    #[test]
    fn stack_keeps_extensions_above() {
        let tones = stack(&lookup("9").unwrap(), 0);
        assert_eq!(pitches(&tones), [0, 4, 7, 10, 14]);
    }

    #[test]
    fn anchor_bass_in_octave() {
        let tones = stack(&lookup("m7").unwrap(), 1);
        // D minor 7, first inversion: F in octave 4
        let placed = anchor_bass(&tones, PitchClass::new(2), 4);
        assert_eq!(pitches(&placed), [65, 69, 72, 74]);
    }

    #[test]
    fn close_major_seventh_root_position() {
        let range = PitchRange::new(60, 84).unwrap();
        let v = build(&StandardTheory, &spec(0, "maj7"), Some(range), &EngineConfig::default()).unwrap();
        let base = v.notes[0].midi as i32;
        let rel: Vec<i32> = v.notes.iter().map(|n| n.midi as i32 - base).collect();
        assert_eq!(rel, [0, 4, 7, 11]);
        assert_eq!(base % 12, 0);
        assert!(v.span() <= MAX_CLOSE_SPAN);
        assert_eq!(v.inversion, 0);
    }

    #[test]
    fn every_inversion_puts_that_degree_in_the_bass() {
        let config = EngineConfig::default();
        for chord_type in ["maj", "m", "dim", "maj7", "m7", "7", "m7b5", "dim7", "9"] {
            let n = lookup(chord_type).unwrap().len();
            for inversion in 0..n {
                let chord = spec(5, chord_type).with_inversion(inversion);
                let v = build(&StandardTheory, &chord, None, &config).unwrap();
                assert_eq!(v.inversion, inversion, "{chord_type} inv {inversion}");
                assert!(v.midi().windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn centers_on_hint_range() {
        let range = PitchRange::new(36, 52).unwrap();
        let v = build(&StandardTheory, &spec(0, "maj"), Some(range), &EngineConfig::default()).unwrap();
        // range center 44: C2 stack centers at 39.5, C3 stack at 51.5
        assert_eq!(v.midi(), vec![36, 40, 43]);
    }

    #[test]
    fn default_octave_without_hint() {
        let v = build(&StandardTheory, &spec(7, "7"), None, &EngineConfig::default()).unwrap();
        assert_eq!(v.midi(), vec![67, 71, 74, 77]);
        assert_eq!(v.labels(), ["G4", "B4", "D5", "F5"]);
    }

    #[test]
    fn invalid_inversion() {
        let chord = spec(0, "maj").with_inversion(3);
        let err = build(&StandardTheory, &chord, None, &EngineConfig::default()).unwrap_err();
        assert_eq!(
            err,
            VoicingError::InvalidInversion {
                inversion: 3,
                tones: 3
            }
        );
    }

    #[test]
    fn unknown_type() {
        let err = build(&StandardTheory, &spec(0, "maj13#11"), None, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, VoicingError::UnknownChordType(_)));
    }
}
