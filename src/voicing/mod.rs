//! Voicing engine — chord descriptor → concrete, octave-placed pitches.
//!
//! Pipeline per request: build the style's arrangement (close, drop or shell),
//! fit it to the requested range, evaluate its spacing, and (when a previous
//! voicing is supplied) prefer the candidate with the least voice movement.

pub mod close;
pub mod drop;
pub mod engine;
pub mod error;
pub mod leading;
pub mod quality;
pub mod range;
pub mod session;
pub mod shell;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::theory::{
    parse_chord_symbol, parse_note_name, IntervalSet, Key, NoteName, PitchClass, SpellingContext,
    Theory,
};

pub use engine::VoicingEngine;
pub use error::VoicingError;
pub use quality::{QualityReport, QualityThresholds};
pub use session::VoicingSession;

/// Arrangement style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoicingStyle {
    Close,
    Drop2,
    Drop3,
    Shell,
}

impl VoicingStyle {
    pub const ALL: [VoicingStyle; 4] = [
        VoicingStyle::Close,
        VoicingStyle::Drop2,
        VoicingStyle::Drop3,
        VoicingStyle::Shell,
    ];

    /// Which tone (counting from the top, 1-based) a drop style lowers.
    pub fn drop_depth(self) -> Option<usize> {
        match self {
            VoicingStyle::Drop2 => Some(2),
            VoicingStyle::Drop3 => Some(3),
            _ => None,
        }
    }

    /// Whether the range resolver may clamp individual notes of this style.
    pub fn allows_partial_fit(self) -> bool {
        !matches!(self, VoicingStyle::Close)
    }

    pub fn name(self) -> &'static str {
        match self {
            VoicingStyle::Close => "close",
            VoicingStyle::Drop2 => "drop2",
            VoicingStyle::Drop3 => "drop3",
            VoicingStyle::Shell => "shell",
        }
    }
}

impl fmt::Display for VoicingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VoicingStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "close" => Ok(VoicingStyle::Close),
            "drop2" | "drop-2" => Ok(VoicingStyle::Drop2),
            "drop3" | "drop-3" => Ok(VoicingStyle::Drop3),
            "shell" => Ok(VoicingStyle::Shell),
            other => Err(format!("unknown voicing style '{other}'")),
        }
    }
}

/// Inclusive MIDI pitch bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchRange {
    pub min: u8,
    pub max: u8,
}

impl PitchRange {
    pub fn new(min: i32, max: i32) -> Result<Self, VoicingError> {
        if min > max || min < 0 || max > 127 {
            return Err(VoicingError::InvalidRange { min, max });
        }
        Ok(Self {
            min: min as u8,
            max: max as u8,
        })
    }

    pub fn contains(&self, pitch: i32) -> bool {
        (self.min as i32..=self.max as i32).contains(&pitch)
    }

    /// Twice the center, kept integral so centers compare exactly.
    pub fn center2(&self) -> i32 {
        self.min as i32 + self.max as i32
    }

    pub fn width(&self) -> i32 {
        self.max as i32 - self.min as i32
    }
}

impl fmt::Display for PitchRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

impl FromStr for PitchRange {
    type Err = String;

    /// Parse "C3:C6" or "48:84".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lo, hi) = s
            .split_once(':')
            .ok_or_else(|| format!("range '{s}' must look like C3:C6 or 48:84"))?;
        let pitch = |text: &str| -> Result<i32, String> {
            let text = text.trim();
            text.parse::<i32>()
                .ok()
                .or_else(|| parse_note_name(text).map(i32::from))
                .ok_or_else(|| format!("invalid pitch '{text}'"))
        };
        PitchRange::new(pitch(lo)?, pitch(hi)?).map_err(|e| e.to_string())
    }
}

/// An abstract chord request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordSpec {
    pub root: PitchClass,
    pub chord_type: String,
    pub target_inversion: Option<usize>,
    pub key: Option<Key>,
    /// Root spelling from the caller, e.g. "A#" rather than the default "Bb".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spelled_root: Option<NoteName>,
}

impl ChordSpec {
    pub fn new(root: PitchClass, chord_type: impl Into<String>) -> Self {
        Self {
            root,
            chord_type: chord_type.into(),
            target_inversion: None,
            key: None,
            spelled_root: None,
        }
    }

    /// Build from a chord symbol such as "Ebmaj7", keeping the symbol's root spelling.
    pub fn from_symbol(symbol: &str) -> Result<Self, VoicingError> {
        let parsed = parse_chord_symbol(symbol).ok_or_else(|| VoicingError::InvalidSymbol(symbol.to_string()))?;
        let mut spec = Self::new(parsed.root.pitch_class(), parsed.chord_type);
        spec.spelled_root = Some(parsed.root);
        Ok(spec)
    }

    pub fn with_inversion(mut self, inversion: usize) -> Self {
        self.target_inversion = Some(inversion);
        self
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    pub fn spelling_context(&self) -> SpellingContext<'_> {
        SpellingContext {
            root: self.root,
            spelled_root: self.spelled_root,
            key: self.key,
            chord_type: &self.chord_type,
        }
    }

    /// Look up this chord's intervals.
    pub(crate) fn intervals(&self, theory: &impl Theory) -> Result<IntervalSet, VoicingError> {
        theory
            .intervals_for(&self.chord_type)
            .filter(|set| !set.is_empty())
            .ok_or_else(|| VoicingError::UnknownChordType(self.chord_type.clone()))
    }
}

/// One sounding note of a voicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoicedNote {
    pub name: NoteName,
    pub midi: u8,
    /// Index of this tone in the chord's interval set (0 = root).
    pub degree: usize,
}

impl VoicedNote {
    /// Name with octave, e.g. "Eb4".
    pub fn label(&self) -> String {
        self.name.label(self.midi)
    }
}

impl fmt::Display for VoicedNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A chord tone during construction: degree plus a possibly out-of-MIDI pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Tone {
    pub degree: usize,
    pub pitch: i32,
}

/// A concrete voicing. Notes are sorted ascending and never share a MIDI value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Voicing {
    pub style: VoicingStyle,
    pub chord: ChordSpec,
    pub notes: Vec<VoicedNote>,
    /// Degree of the lowest note, derived from the notes themselves.
    pub inversion: usize,
    pub range: Option<PitchRange>,
    pub quality: QualityReport,
    pub quality_warning: bool,
}

impl Voicing {
    /// Spell and assemble tones into a voicing.
    pub(crate) fn from_tones(
        style: VoicingStyle,
        chord: &ChordSpec,
        intervals: &IntervalSet,
        tones: &[Tone],
        range: Option<PitchRange>,
        theory: &impl Theory,
        thresholds: &QualityThresholds,
    ) -> Result<Self, VoicingError> {
        let ctx = chord.spelling_context();
        let mut notes = Vec::with_capacity(tones.len());
        for tone in tones {
            if !(0..=127).contains(&tone.pitch) {
                return Err(VoicingError::PitchOutOfMidi(tone.pitch));
            }
            let interval = intervals[tone.degree];
            let class = chord.root.transpose(interval as i32);
            notes.push(VoicedNote {
                name: theory.spell_note(class, interval, &ctx),
                midi: tone.pitch as u8,
                degree: tone.degree,
            });
        }
        Self::from_notes(style, chord.clone(), notes, range, thresholds)
    }

    /// Sort, validate and score already-spelled notes.
    pub(crate) fn from_notes(
        style: VoicingStyle,
        chord: ChordSpec,
        mut notes: Vec<VoicedNote>,
        range: Option<PitchRange>,
        thresholds: &QualityThresholds,
    ) -> Result<Self, VoicingError> {
        notes.sort_by_key(|n| n.midi);
        let pitches: Vec<i32> = notes.iter().map(|n| n.midi as i32).collect();
        let quality = quality::evaluate(&pitches, thresholds)?;
        let inversion = notes.first().map(|n| n.degree).unwrap_or(0);

        Ok(Self {
            style,
            chord,
            notes,
            inversion,
            range,
            quality,
            quality_warning: !quality.acceptable,
        })
    }

    pub fn midi(&self) -> Vec<u8> {
        self.notes.iter().map(|n| n.midi).collect()
    }

    pub(crate) fn pitches(&self) -> Vec<i32> {
        self.notes.iter().map(|n| n.midi as i32).collect()
    }

    pub fn lowest(&self) -> Option<&VoicedNote> {
        self.notes.first()
    }

    pub fn highest(&self) -> Option<&VoicedNote> {
        self.notes.last()
    }

    pub fn span(&self) -> i32 {
        match (self.lowest(), self.highest()) {
            (Some(lo), Some(hi)) => hi.midi as i32 - lo.midi as i32,
            _ => 0,
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.notes.iter().map(VoicedNote::label).collect()
    }
}

impl fmt::Display for Voicing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.style, self.labels().join(" "))?;
        if self.quality_warning {
            f.write_str(" (spacing warning)")?;
        }
        Ok(())
    }
}
