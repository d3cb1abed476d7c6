//! Engine configuration — octave anchors, tie-break seed and quality thresholds,
//! optionally loaded from ~/.chordvoice/engine.yaml.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::voicing::QualityThresholds;

/// Tunables for the voicing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Spacing limits used by the quality evaluator.
    pub quality: QualityThresholds,
    /// Bass octave for close and drop stacks built without a hint range (C4 = 60).
    pub default_octave: i32,
    /// Octave of the root in shell voicings.
    pub shell_octave: i32,
    /// Add the chord's 5th to shells that have two guide tones.
    pub shell_filler_fifth: bool,
    /// Seed for arrangement tie-breaks, so identical requests voice identically.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quality: QualityThresholds::default(),
            default_octave: 4,
            shell_octave: 3,
            shell_filler_fifth: false,
            seed: 42,
        }
    }
}

impl EngineConfig {
    /// Default config path (~/.chordvoice/engine.yaml).
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".chordvoice");
        path.push("engine.yaml");
        path
    }

    /// Load config from the standard path.
    /// Returns None if the file doesn't exist or can't be parsed.
    pub fn load() -> Option<Self> {
        let content = std::fs::read_to_string(Self::default_path()).ok()?;
        serde_yaml::from_str(&content).ok()
    }

    /// Load config from a YAML file. Missing fields take their defaults.
    pub fn load_from(path: &Path) -> Result<Self, io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save config as YAML, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self).map_err(io::Error::other)?;
        std::fs::write(path, yaml)
    }
}
