//! Voicing session — carries the previous voicing through a chord sequence.
//!
//! The engine itself is stateless; a session owns the "previous voicing" of one
//! progression and must be reset between unrelated progressions.

use crate::theory::Theory;

use super::leading::voicing_movement;
use super::{ChordSpec, PitchRange, Voicing, VoicingEngine, VoicingError, VoicingStyle};

/// One voiced chord of a sequence.
#[derive(Debug, Clone)]
pub struct SessionStep {
    pub voicing: Voicing,
    /// Semitone movement from the previous voicing (None for the first chord).
    pub movement: Option<i32>,
}

/// Voices a progression chord by chord, keeping voice leading continuous.
#[derive(Debug)]
pub struct VoicingSession<'e, T: Theory> {
    engine: &'e VoicingEngine<T>,
    styles: Vec<VoicingStyle>,
    range: PitchRange,
    previous: Option<Voicing>,
}

impl<'e, T: Theory> VoicingSession<'e, T> {
    /// Create a session over the enabled `styles` and target `range`.
    pub fn new(engine: &'e VoicingEngine<T>, styles: Vec<VoicingStyle>, range: PitchRange) -> Self {
        Self {
            engine,
            styles,
            range,
            previous: None,
        }
    }

    /// Voice the next chord. On failure the previous voicing is kept.
    pub fn next(&mut self, chord: &ChordSpec) -> Result<SessionStep, VoicingError> {
        let voicing = self
            .engine
            .generate_best(chord, &self.styles, self.range, self.previous.as_ref())?;
        let movement = self.previous.as_ref().map(|prev| voicing_movement(prev, &voicing));
        self.previous = Some(voicing.clone());
        Ok(SessionStep { voicing, movement })
    }

    /// Voice a whole progression, stopping at the first chord that cannot be voiced.
    pub fn voice_all(&mut self, chords: &[ChordSpec]) -> Result<Vec<SessionStep>, VoicingError> {
        chords.iter().map(|chord| self.next(chord)).collect()
    }

    /// The last emitted voicing.
    pub fn previous(&self) -> Option<&Voicing> {
        self.previous.as_ref()
    }

    /// Forget the previous voicing before starting an unrelated sequence.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn range(&self) -> PitchRange {
        self.range
    }

    pub fn styles(&self) -> &[VoicingStyle] {
        &self.styles
    }
}
