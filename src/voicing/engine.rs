//! The voicing engine — entry point tying builders, range fitting and voice leading together.

use log::{debug, warn};

use crate::config::EngineConfig;
use crate::theory::{StandardTheory, Theory};

use super::{close, drop, leading, range, shell};
use super::{ChordSpec, PitchRange, Voicing, VoicingError, VoicingStyle};

/// Stateless voicing generator over a theory provider.
///
/// Holds only immutable theory and configuration; the previous voicing of a
/// running sequence is passed in per call (see [`super::VoicingSession`]).
#[derive(Debug, Clone, Default)]
pub struct VoicingEngine<T: Theory = StandardTheory> {
    theory: T,
    config: EngineConfig,
}

impl VoicingEngine<StandardTheory> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            theory: StandardTheory,
            config,
        }
    }
}

impl<T: Theory> VoicingEngine<T> {
    pub fn with_theory(theory: T, config: EngineConfig) -> Self {
        Self { theory, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn theory(&self) -> &T {
        &self.theory
    }

    /// Voice `chord` in `style`, fitted to `range`.
    ///
    /// `previous` is the last voicing of the current sequence, if any. It steers
    /// the shell arrangement choice and, for close voicings without an explicit
    /// inversion, which inversion is used.
    pub fn generate_voicing(
        &self,
        chord: &ChordSpec,
        style: VoicingStyle,
        range: PitchRange,
        previous: Option<&Voicing>,
    ) -> Result<Voicing, VoicingError> {
        let voicing = match style {
            VoicingStyle::Close => self.close_voicing(chord, range, previous)?,
            VoicingStyle::Drop2 | VoicingStyle::Drop3 => drop::build(&self.theory, chord, style, range, &self.config)?,
            VoicingStyle::Shell => shell::build(&self.theory, chord, range, previous, &self.config)?,
        };

        if voicing.quality_warning {
            warn!(
                "{} voicing of {}{} has awkward spacing (max gap {}, spread {})",
                style, chord.root, chord.chord_type, voicing.quality.max_gap, voicing.quality.total_spread
            );
        }
        debug!("{}{} -> {}", chord.root, chord.chord_type, voicing);
        Ok(voicing)
    }

    /// Voice `chord` in each enabled style and return the smoothest continuation.
    ///
    /// Styles that fail for this chord are skipped. Without a previous voicing
    /// the first style that succeeds wins.
    pub fn generate_best(
        &self,
        chord: &ChordSpec,
        styles: &[VoicingStyle],
        range: PitchRange,
        previous: Option<&Voicing>,
    ) -> Result<Voicing, VoicingError> {
        let mut candidates = Vec::with_capacity(styles.len());
        let mut first_error = None;
        for &style in styles {
            match self.generate_voicing(chord, style, range, previous) {
                Ok(v) => candidates.push(v),
                Err(e) => {
                    warn!("{style} unavailable for {}{}: {e}", chord.root, chord.chord_type);
                    first_error.get_or_insert(e);
                }
            }
        }

        leading::choose(candidates, previous).ok_or_else(|| first_error.unwrap_or(VoicingError::NoCandidates))
    }

    /// Re-fit an existing voicing to a new range.
    pub fn fit_to_range(&self, voicing: &Voicing, range: PitchRange) -> Result<Voicing, VoicingError> {
        range::resolve(voicing, range, &self.config.quality)
    }

    fn close_in_range(&self, chord: &ChordSpec, range: PitchRange) -> Result<Voicing, VoicingError> {
        let built = close::build(&self.theory, chord, Some(range), &self.config)?;
        range::resolve(&built, range, &self.config.quality)
    }

    fn close_voicing(
        &self,
        chord: &ChordSpec,
        range: PitchRange,
        previous: Option<&Voicing>,
    ) -> Result<Voicing, VoicingError> {
        let search = previous.is_some()
            && chord.target_inversion.is_none()
            && leading::reinvertible(VoicingStyle::Close, &chord.chord_type);
        if !search {
            return self.close_in_range(chord, range);
        }

        let tones = chord.intervals(&self.theory)?.len();
        let options = leading::reinversions(tones, |inversion| {
            self.close_in_range(&chord.clone().with_inversion(inversion), range)
        });
        match leading::choose(options, previous) {
            Some(mut best) => {
                // The inversion was the engine's choice, not the caller's.
                best.chord.target_inversion = None;
                Ok(best)
            }
            None => self.close_in_range(chord, range),
        }
    }
}
