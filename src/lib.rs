//! chordvoice — turns chord symbols into playable close, drop and shell voicings.

pub mod config;
pub mod theory;
pub mod voicing;

pub use config::EngineConfig;
pub use voicing::{
    ChordSpec, PitchRange, VoicedNote, Voicing, VoicingEngine, VoicingError, VoicingSession, VoicingStyle,
};
