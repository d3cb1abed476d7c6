//! Drop transform — Drop2 and Drop3 voicings derived from close stacks.
//!
//! Dropping a tone changes which degree ends up in the bass, so the close
//! voicing fed into the transform is built at a remapped inversion:
//! `close = (target + depth) mod N`. For 3- and 4-note chords this is exact.
//! Chords with extensions above the octave can miss; the remaining close
//! inversions are then scanned for one whose drop yields the target.

use log::debug;

use crate::config::EngineConfig;
use crate::theory::Theory;

use super::close::{anchor_bass, stack};
use super::{ChordSpec, PitchRange, Tone, Voicing, VoicingError, VoicingStyle};

/// Close inversion whose drop lands `target` in the bass.
pub fn close_inversion_for(target: usize, depth: usize, tones: usize) -> usize {
    (target + depth) % tones
}

/// Lower the `depth`-th highest tone by an octave and return the tones ascending.
pub(crate) fn apply_drop(tones: &[Tone], depth: usize) -> Vec<Tone> {
    let mut ordered = tones.to_vec();
    ordered.sort_by(|a, b| b.pitch.cmp(&a.pitch));
    if let Some(dropped) = ordered.get_mut(depth - 1) {
        dropped.pitch -= 12;
    }
    ordered.sort_by_key(|t| t.pitch);
    ordered
}

/// Shift by whole octaves so every tone lies within `range`.
///
/// Among the shifts that fit, the one centering the voicing best wins, then the
/// smallest shift.
pub(crate) fn fit_whole_octaves(tones: &[Tone], range: PitchRange) -> Result<Vec<Tone>, VoicingError> {
    let unsatisfiable = VoicingError::RangeUnsatisfiable {
        min: range.min,
        max: range.max,
    };
    let (Some(lo), Some(hi)) = (tones.first().map(|t| t.pitch), tones.last().map(|t| t.pitch)) else {
        return Err(unsatisfiable);
    };

    let min_shift = (range.min as i32 - lo).div_euclid(12) + i32::from((range.min as i32 - lo).rem_euclid(12) != 0);
    let max_shift = (range.max as i32 - hi).div_euclid(12);

    let shift = (min_shift..=max_shift)
        .min_by_key(|k| ((lo + hi + 24 * k - range.center2()).abs(), k.abs()))
        .ok_or(unsatisfiable)?;

    Ok(tones
        .iter()
        .map(|t| Tone {
            degree: t.degree,
            pitch: t.pitch + 12 * shift,
        })
        .collect())
}

/// Build a Drop2 or Drop3 voicing of `chord` whose bass is its target inversion.
pub fn build(
    theory: &impl Theory,
    chord: &ChordSpec,
    style: VoicingStyle,
    range: PitchRange,
    config: &EngineConfig,
) -> Result<Voicing, VoicingError> {
    let intervals = chord.intervals(theory)?;
    let n = intervals.len();
    let Some(depth) = style.drop_depth() else {
        return Err(VoicingError::StyleUnsupported {
            style,
            required: 0,
            tones: n,
        });
    };
    if n < depth + 1 {
        return Err(VoicingError::StyleUnsupported {
            style,
            required: depth + 1,
            tones: n,
        });
    }

    let target = chord.target_inversion.unwrap_or(0);
    if target >= n {
        return Err(VoicingError::InvalidInversion {
            inversion: target,
            tones: n,
        });
    }

    let remapped = close_inversion_for(target, depth, n);
    let fallbacks = (0..n).filter(|&c| c != remapped);

    for close_inversion in std::iter::once(remapped).chain(fallbacks) {
        let close = anchor_bass(&stack(&intervals, close_inversion), chord.root, config.default_octave);
        let dropped = apply_drop(&close, depth);
        if dropped[0].degree != target {
            continue;
        }
        if close_inversion != remapped {
            debug!(
                "{style} {}{}: remap to close inv {remapped} missed, using {close_inversion}",
                chord.root, chord.chord_type
            );
        }

        let fitted = fit_whole_octaves(&dropped, range)?;
        let voicing = Voicing::from_tones(style, chord, &intervals, &fitted, Some(range), theory, &config.quality)?;
        debug_assert_eq!(voicing.inversion, target);
        return Ok(voicing);
    }

    Err(VoicingError::DropInversionUnreachable {
        style,
        inversion: target,
    })
}
