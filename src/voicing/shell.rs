//! Shell voicing builder — root plus guide tones.
//!
//! The guide tones are the 3rd (or a sus substitute) and, for chords with four
//! or more tones, the 7th (or a 6th substitute). Two arrangements are offered
//! for each chord and both are fitted to the target range before choosing: the
//! one moving least from the previous voicing wins, and without a previous
//! voicing a seeded choice keyed on the chord decides.

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::EngineConfig;
use crate::theory::intervals::is_sus2;
use crate::theory::{IntervalSet, Theory};

use super::{leading, range};
use super::{ChordSpec, PitchRange, Tone, Voicing, VoicingError, VoicingStyle};

/// The guide tones of a chord, as (degree, semitones above root within the octave).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideTones {
    pub primary: Option<(usize, i32)>,
    pub secondary: Option<(usize, i32)>,
}

/// Pick the guide tones from an interval set.
pub fn guide_tones(intervals: &IntervalSet) -> GuideTones {
    let with_offset = |degree: usize| (degree, (intervals[degree] % 12) as i32);

    let primary = intervals
        .find_first(&[3, 4])
        .or_else(|| intervals.find_first(&[5, 2]))
        .map(with_offset);
    let secondary = if intervals.len() >= 4 {
        intervals
            .find_first(&[10, 11])
            .or_else(|| intervals.find_first(&[9]))
            .map(with_offset)
    } else {
        None
    };

    GuideTones { primary, secondary }
}

/// Candidate arrangements above `root` (an absolute pitch).
pub(crate) fn candidates(root_degree: usize, root: i32, guides: GuideTones, sus2: bool) -> Vec<Vec<Tone>> {
    let r = Tone {
        degree: root_degree,
        pitch: root,
    };
    let at = |(degree, offset): (usize, i32), octave: i32| Tone {
        degree,
        pitch: root + offset + 12 * octave,
    };

    match (guides.primary, guides.secondary) {
        (Some(g1), Some(g2)) => {
            let (low, high) = if g1.1 <= g2.1 { (g1, g2) } else { (g2, g1) };
            vec![vec![r, at(low, 0), at(high, 0)], vec![r, at(high, 0), at(low, 1)]]
        }
        (Some(g), None) | (None, Some(g)) => {
            let root_up = Tone {
                degree: root_degree,
                pitch: root + 12,
            };
            let mut out = vec![vec![r, root_up, at(g, 1)]];
            if !sus2 {
                out.push(vec![r, at(g, 0), root_up]);
            }
            out
        }
        (None, None) => Vec::new(),
    }
}

/// Add the chord's 5th at the lowest free pitch above the root.
fn add_filler_fifth(tones: &mut Vec<Tone>, intervals: &IntervalSet) {
    let Some(degree) = intervals.find_first(&[7, 6, 8]) else {
        return;
    };
    let root = tones[0].pitch;
    let mut pitch = root + (intervals[degree] % 12) as i32;
    while tones.iter().any(|t| t.pitch == pitch) {
        pitch += 12;
    }
    tones.push(Tone { degree, pitch });
    tones.sort_by_key(|t| t.pitch);
}

/// Seed for the arrangement choice: the caller's seed mixed with (root, type).
fn tie_break_seed(seed: u64, chord: &ChordSpec) -> u64 {
    chord
        .chord_type
        .bytes()
        .fold(seed ^ (chord.root.value() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15), |acc, b| {
            (acc ^ b as u64).wrapping_mul(0x0100_0000_01B3)
        })
}

/// Every shell arrangement of `chord`, anchored at the configured shell octave.
///
/// A requested inversion must exist in the chord, but shells always keep the
/// root in the bass.
pub fn arrangements(
    theory: &impl Theory,
    chord: &ChordSpec,
    config: &EngineConfig,
) -> Result<Vec<Voicing>, VoicingError> {
    let intervals = chord.intervals(theory)?;
    if let Some(inversion) = chord.target_inversion.filter(|&i| i >= intervals.len()) {
        return Err(VoicingError::InvalidInversion {
            inversion,
            tones: intervals.len(),
        });
    }

    let guides = guide_tones(&intervals);
    let root_degree = intervals.degree_of_class(0).unwrap_or(0);
    let root = (config.shell_octave + 1) * 12 + chord.root.value() as i32;

    let mut options = candidates(root_degree, root, guides, is_sus2(&chord.chord_type));
    if options.is_empty() {
        return Err(VoicingError::NoGuideTones(chord.chord_type.clone()));
    }
    if config.shell_filler_fifth && guides.primary.is_some() && guides.secondary.is_some() {
        for option in &mut options {
            add_filler_fifth(option, &intervals);
        }
    }

    options
        .iter()
        .map(|tones| Voicing::from_tones(VoicingStyle::Shell, chord, &intervals, tones, None, theory, &config.quality))
        .collect()
}

/// Build a shell voicing of `chord` fitted to `range`.
pub fn build(
    theory: &impl Theory,
    chord: &ChordSpec,
    range: PitchRange,
    previous: Option<&Voicing>,
    config: &EngineConfig,
) -> Result<Voicing, VoicingError> {
    let options = arrangements(theory, chord, config)?;

    let mut first_error = None;
    let mut fitted: Vec<(usize, Voicing)> = Vec::with_capacity(options.len());
    for (i, option) in options.iter().enumerate() {
        match range::resolve(option, range, &config.quality) {
            Ok(v) => fitted.push((i, v)),
            Err(e) => {
                debug!("shell arrangement {i} of {}{} does not fit {range}: {e}", chord.root, chord.chord_type);
                first_error.get_or_insert(e);
            }
        }
    }
    if fitted.is_empty() {
        return Err(first_error.unwrap_or(VoicingError::NoCandidates));
    }

    let chosen = match previous {
        Some(prev) => leading::choose(fitted.into_iter().map(|(_, v)| v).collect(), Some(prev)),
        None => {
            let mut rng = ChaCha8Rng::seed_from_u64(tie_break_seed(config.seed, chord));
            let index = rng.gen_range(0..options.len());
            debug!(
                "shell {}{}: seeded arrangement {index} of {}",
                chord.root,
                chord.chord_type,
                options.len()
            );
            let pick = fitted.iter().position(|(i, _)| *i == index).unwrap_or(0);
            Some(fitted.swap_remove(pick).1)
        }
    };
    chosen.ok_or(VoicingError::NoCandidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::intervals::lookup;
    use crate::theory::{PitchClass, StandardTheory};

    fn spec(root: u8, chord_type: &str) -> ChordSpec {
        ChordSpec::new(PitchClass::new(root), chord_type)
    }

    /// Wide enough that shells anchored at octave 3 stay where they are.
    fn anchor() -> PitchRange {
        PitchRange::new(43, 79).unwrap()
    }

    fn shell_of(chord: &ChordSpec, previous: Option<&Voicing>) -> Voicing {
        build(&StandardTheory, chord, anchor(), previous, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn seventh_chord_guides() {
        let guides = guide_tones(&lookup("m7").unwrap());
        assert_eq!(guides.primary, Some((1, 3)));
        assert_eq!(guides.secondary, Some((3, 10)));
    }

    #[test]
    fn sus_and_sixth_substitutes() {
        let guides = guide_tones(&lookup("7sus4").unwrap());
        assert_eq!(guides.primary, Some((1, 5)));
        let guides = guide_tones(&lookup("6").unwrap());
        assert_eq!(guides.secondary, Some((3, 9)));
    }

    #[test]
    fn triads_have_one_guide() {
        let guides = guide_tones(&lookup("maj").unwrap());
        assert_eq!(guides.primary, Some((1, 4)));
        assert_eq!(guides.secondary, None);
    }

    #[test]
    fn two_guide_candidates() {
        let guides = guide_tones(&lookup("maj7").unwrap());
        let options = candidates(0, 48, guides, false);
        let pitches: Vec<Vec<i32>> = options
            .iter()
            .map(|o| o.iter().map(|t| t.pitch).collect())
            .collect();
        assert_eq!(pitches, vec![vec![48, 52, 59], vec![48, 59, 64]]);
    }

    #[test]
    fn triad_candidates() {
        let guides = guide_tones(&lookup("m").unwrap());
        let options = candidates(0, 48, guides, false);
        let pitches: Vec<Vec<i32>> = options
            .iter()
            .map(|o| o.iter().map(|t| t.pitch).collect())
            .collect();
        assert_eq!(pitches, vec![vec![48, 60, 63], vec![48, 51, 60]]);
    }

    #[test]
    fn sus2_suppresses_second_triad_arrangement() {
        let guides = guide_tones(&lookup("sus2").unwrap());
        let options = candidates(0, 48, guides, true);
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn power_chord_has_no_guides() {
        let err = build(&StandardTheory, &spec(0, "5"), anchor(), None, &EngineConfig::default()).unwrap_err();
        assert_eq!(err, VoicingError::NoGuideTones("5".into()));
    }

    #[test]
    fn shell_is_three_distinct_notes_rooted_low() {
        for chord_type in ["maj7", "m7", "7", "m", "sus4", "6", "dim7"] {
            let v = shell_of(&spec(7, chord_type), None);
            assert_eq!(v.notes.len(), 3, "{chord_type}");
            assert_eq!(v.inversion, 0);
            assert_eq!(v.notes[0].midi, 55);
            assert!(v.midi().windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn seeded_choice_is_reproducible() {
        let chord = spec(2, "m7");
        let config = EngineConfig {
            seed: 7,
            ..EngineConfig::default()
        };
        let a = build(&StandardTheory, &chord, anchor(), None, &config).unwrap();
        let b = build(&StandardTheory, &chord, anchor(), None, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn previous_voicing_steers_choice() {
        let config = EngineConfig::default();
        // G7 shell options: G B F  /  G F B'
        let g7 = spec(7, "7");
        let low = Voicing::from_tones(
            VoicingStyle::Shell,
            &g7,
            &lookup("7").unwrap(),
            &[Tone { degree: 0, pitch: 55 }, Tone { degree: 1, pitch: 59 }, Tone { degree: 3, pitch: 65 }],
            None,
            &StandardTheory,
            &config.quality,
        )
        .unwrap();
        let v = build(&StandardTheory, &g7, anchor(), Some(&low), &config).unwrap();
        assert_eq!(v.midi(), vec![55, 59, 65]);

        let high = Voicing::from_tones(
            VoicingStyle::Shell,
            &g7,
            &lookup("7").unwrap(),
            &[Tone { degree: 0, pitch: 55 }, Tone { degree: 3, pitch: 65 }, Tone { degree: 1, pitch: 71 }],
            None,
            &StandardTheory,
            &config.quality,
        )
        .unwrap();
        let v = build(&StandardTheory, &g7, anchor(), Some(&high), &config).unwrap();
        assert_eq!(v.midi(), vec![55, 65, 71]);
    }

    #[test]
    fn filler_fifth_makes_four_notes() {
        let config = EngineConfig {
            shell_filler_fifth: true,
            ..EngineConfig::default()
        };
        let v = build(&StandardTheory, &spec(0, "maj7"), anchor(), None, &config).unwrap();
        assert_eq!(v.notes.len(), 4);
        assert!(v.notes.iter().any(|n| n.degree == 2 && n.midi % 12 == 7));
    }

    #[test]
    fn filler_fifth_skipped_for_triads() {
        let config = EngineConfig {
            shell_filler_fifth: true,
            ..EngineConfig::default()
        };
        let v = build(&StandardTheory, &spec(0, "maj"), anchor(), None, &config).unwrap();
        assert_eq!(v.notes.len(), 3);
    }

    #[test]
    fn choice_is_made_after_range_fitting() {
        let config = EngineConfig::default();
        let c = spec(0, "maj");
        // C4 E4 C5
        let previous = Voicing::from_tones(
            VoicingStyle::Shell,
            &c,
            &lookup("maj").unwrap(),
            &[Tone { degree: 0, pitch: 60 }, Tone { degree: 1, pitch: 64 }, Tone { degree: 0, pitch: 72 }],
            None,
            &StandardTheory,
            &config.quality,
        )
        .unwrap();

        // Ab6 at the anchor: Ab3 C4 F4 / Ab3 F4 C5. Fitted into 60..=72 the first
        // becomes C4 F4 Ab4 (moves 5), the second F4 Ab4 C5 (moves 9).
        let ab6 = spec(8, "6");
        let r = PitchRange::new(60, 72).unwrap();
        let v = build(&StandardTheory, &ab6, r, Some(&previous), &config).unwrap();
        assert_eq!(v.midi(), vec![60, 65, 68]);
        assert_eq!(leading::voicing_movement(&previous, &v), 5);

        let best = arrangements(&StandardTheory, &ab6, &config)
            .unwrap()
            .iter()
            .filter_map(|a| range::resolve(a, r, &config.quality).ok())
            .map(|a| leading::voicing_movement(&previous, &a))
            .min()
            .unwrap();
        assert_eq!(best, 5);
    }

    #[test]
    fn inversion_must_exist() {
        let err = build(&StandardTheory, &spec(0, "maj").with_inversion(7), anchor(), None, &EngineConfig::default())
            .unwrap_err();
        assert_eq!(err, VoicingError::InvalidInversion { inversion: 7, tones: 3 });

        let v = shell_of(&spec(0, "maj").with_inversion(1), None);
        assert_eq!(v.inversion, 0);
    }

    #[test]
    fn octave_outside_midi_is_reported() {
        let config = EngineConfig {
            shell_octave: 12,
            ..EngineConfig::default()
        };
        let err = build(&StandardTheory, &spec(0, "maj7"), anchor(), None, &config).unwrap_err();
        assert_eq!(err, VoicingError::PitchOutOfMidi(156));
    }
}
