//! Error types for voicing generation.

use super::VoicingStyle;

/// A voicing request that could not be satisfied.
///
/// Quality problems are not errors: a playable but awkward voicing is returned
/// with `quality_warning` set instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoicingError {
    #[error("unknown chord type '{0}'")]
    UnknownChordType(String),

    #[error("inversion {inversion} is out of range for a {tones}-note chord")]
    InvalidInversion { inversion: usize, tones: usize },

    #[error("no guide tones resolve for chord type '{0}'")]
    NoGuideTones(String),

    #[error("MIDI note {0} appears more than once")]
    DuplicateNote(i32),

    #[error("no whole-octave shift fits the voicing into {min}..={max}")]
    RangeUnsatisfiable { min: u8, max: u8 },

    #[error("range {min}..={max} is too narrow for a {style} voicing")]
    RangeTooNarrowForStructure { style: VoicingStyle, min: u8, max: u8 },

    #[error("close voicing spans {0} semitones, more than two octaves")]
    SpanTooWide(i32),

    #[error("{style} needs at least {required} chord tones, chord has {tones}")]
    StyleUnsupported {
        style: VoicingStyle,
        required: usize,
        tones: usize,
    },

    #[error("no {style} voicing of this chord has inversion {inversion}")]
    DropInversionUnreachable { style: VoicingStyle, inversion: usize },

    #[error("pitch {0} lies outside MIDI 0..=127; check the configured octaves")]
    PitchOutOfMidi(i32),

    #[error("invalid pitch range {min}..={max}")]
    InvalidRange { min: i32, max: i32 },

    #[error("invalid chord symbol '{0}'")]
    InvalidSymbol(String),

    #[error("no voicing style enabled")]
    NoCandidates,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = VoicingError::InvalidInversion {
            inversion: 4,
            tones: 4,
        };
        assert_eq!(err.to_string(), "inversion 4 is out of range for a 4-note chord");

        let err = VoicingError::RangeTooNarrowForStructure {
            style: VoicingStyle::Close,
            min: 60,
            max: 64,
        };
        assert_eq!(err.to_string(), "range 60..=64 is too narrow for a close voicing");
    }

    #[test]
    fn unsupported_style_message() {
        let err = VoicingError::StyleUnsupported {
            style: VoicingStyle::Drop3,
            required: 4,
            tones: 3,
        };
        assert_eq!(err.to_string(), "drop3 needs at least 4 chord tones, chord has 3");
    }

    #[test]
    fn out_of_midi_message() {
        let err = VoicingError::PitchOutOfMidi(156);
        assert_eq!(err.to_string(), "pitch 156 lies outside MIDI 0..=127; check the configured octaves");
    }
}
