//! # Configuration Module
//!
//! Engine settings with JSON file loading. Every field has a default, so a
//! config file only needs to mention what it overrides:
//!
//! ```json
//! { "chunk_edge": 64, "seed": 7, "generation": { "flat": { "height": 20 } } }
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::terrain::{GenerationMethod, TerrainParams};

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cube edge length of every chunk, in blocks.
    pub chunk_edge: i32,
    /// World-space radius of the visibility traversal.
    pub visibility_radius: f32,
    /// Nodes farther than this from the observer are evicted each frame.
    /// Zero or negative disables reclamation.
    pub reclaim_radius: f32,
    /// Seed for the terrain noise field.
    pub seed: u32,
    /// How chunk volumes are filled.
    pub generation: GenerationMethod,
    /// Tunables for the noise generation method.
    pub terrain: TerrainParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_edge: 128,
            visibility_radius: 384.0,
            reclaim_radius: 768.0,
            seed: 0,
            generation: GenerationMethod::Noise,
            terrain: TerrainParams::default(),
        }
    }
}

impl EngineConfig {
    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Failure to load a configuration file.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read config file: {err}"),
            ConfigError::Parse(err) => write!(f, "failed to parse config file: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}
