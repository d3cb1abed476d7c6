//! Range resolver — octave-shifts (and, for drop/shell styles, clamps) a voicing into bounds.
//!
//! Shifts of -4..=+4 octaves are scored by, in order: notes inside the range,
//! distance between the voicing's center and the range's center, and size of
//! the shift. Close voicings must fit whole; drop and shell voicings may take
//! the best partial fit and pull stray notes in by octaves.

use std::cmp::Reverse;

use log::debug;

use super::{PitchRange, QualityThresholds, VoicedNote, Voicing, VoicingError};

pub const OCTAVE_SEARCH: i32 = 4;

/// Outcome of scoring one octave shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftFit {
    pub octaves: i32,
    pub in_range: usize,
    /// |voicing center - range center|, doubled to stay integral.
    pub center_distance: i32,
}

/// Best whole-octave shift of `pitches` toward `range`, or `None` if every shift leaves MIDI.
pub fn best_shift(pitches: &[i32], range: PitchRange) -> Option<ShiftFit> {
    let lo = pitches.iter().copied().min()?;
    let hi = pitches.iter().copied().max()?;

    (-OCTAVE_SEARCH..=OCTAVE_SEARCH)
        .filter(|k| lo + 12 * k >= 0 && hi + 12 * k <= 127)
        .map(|k| ShiftFit {
            octaves: k,
            in_range: pitches.iter().filter(|&&p| range.contains(p + 12 * k)).count(),
            center_distance: (lo + hi + 24 * k - range.center2()).abs(),
        })
        .min_by_key(|fit| (Reverse(fit.in_range), fit.center_distance, fit.octaves.abs(), fit.octaves))
}

fn shifted(notes: &[VoicedNote], octaves: i32) -> Vec<VoicedNote> {
    notes
        .iter()
        .map(|n| VoicedNote {
            midi: (n.midi as i32 + 12 * octaves) as u8,
            ..*n
        })
        .collect()
}

/// Pull every out-of-range note to the nearest free same-pitch-class pitch inside `range`.
fn clamp_into(notes: &[VoicedNote], range: PitchRange, too_narrow: &VoicingError) -> Result<Vec<VoicedNote>, VoicingError> {
    let mut taken: Vec<i32> = notes
        .iter()
        .map(|n| n.midi as i32)
        .filter(|&p| range.contains(p))
        .collect();

    let mut out = Vec::with_capacity(notes.len());
    for note in notes {
        let pitch = note.midi as i32;
        if range.contains(pitch) {
            out.push(*note);
            continue;
        }

        let same_class: Vec<i32> = (range.min as i32..=range.max as i32)
            .filter(|p| (p - pitch).rem_euclid(12) == 0)
            .collect();
        if same_class.is_empty() {
            return Err(too_narrow.clone());
        }
        let target = same_class
            .iter()
            .copied()
            .filter(|p| !taken.contains(p))
            .min_by_key(|p| ((p - pitch).abs(), *p))
            .ok_or_else(|| too_narrow.clone())?;

        debug!("clamped {} from {pitch} to {target}", note.name);
        taken.push(target);
        out.push(VoicedNote {
            midi: target as u8,
            ..*note
        });
    }
    Ok(out)
}

/// Fit `voicing` into `range`, returning a new voicing.
///
/// Reapplying the resolver to its own output leaves it unchanged.
pub fn resolve(voicing: &Voicing, range: PitchRange, thresholds: &QualityThresholds) -> Result<Voicing, VoicingError> {
    let too_narrow = VoicingError::RangeTooNarrowForStructure {
        style: voicing.style,
        min: range.min,
        max: range.max,
    };

    let fit = best_shift(&voicing.pitches(), range).ok_or_else(|| too_narrow.clone())?;
    let mut notes = shifted(&voicing.notes, fit.octaves);

    if fit.in_range < notes.len() {
        if !voicing.style.allows_partial_fit() {
            return Err(too_narrow);
        }
        debug!(
            "{} fits {}/{} notes in {range}, clamping",
            voicing.style,
            fit.in_range,
            notes.len()
        );
        notes = clamp_into(&notes, range, &too_narrow)?;

        // Clamping changes the shape, so settle the new shape at its best octave.
        let pitches: Vec<i32> = notes.iter().map(|n| n.midi as i32).collect();
        if let Some(refit) = best_shift(&pitches, range) {
            notes = shifted(&notes, refit.octaves);
        }
    }

    Voicing::from_notes(voicing.style, voicing.chord.clone(), notes, Some(range), thresholds)
}
