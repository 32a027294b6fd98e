use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::Canvas;
use crate::state::GameState;

pub const DEFAULT_CANVAS_ID: &str = "renderCanvas";

/// Which scenes a flow visits and how large its canvas starts out.
///
/// `sequence` is the whole chain in order; each scene advances to the next
/// entry and the last entry has no successor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowConfig {
    pub initial_state: GameState,
    pub sequence: Vec<GameState>,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            initial_state: GameState::Start,
            sequence: GameState::ALL.to_vec(),
            canvas_width: 1280,
            canvas_height: 720,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read flow config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid flow config {path} at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("scene sequence is empty")]
    EmptySequence,
    #[error("scene {0} appears more than once in the sequence")]
    DuplicateState(GameState),
    #[error("initial scene {0} is not part of the sequence")]
    InitialNotInSequence(GameState),
    #[error("canvas size {width}x{height} must be non-zero")]
    ZeroCanvas { width: u32, height: u32 },
}

impl FlowConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw, path)
    }

    /// Parses and validates `raw`; `origin` is only used in error messages.
    pub fn parse(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config: FlowConfig = serde_path_to_error::deserialize(&mut deserializer).map_err(
            |error| {
                let field = error.path().to_string();
                ConfigError::Parse {
                    path: origin.to_path_buf(),
                    field,
                    source: error.into_inner(),
                }
            },
        )?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sequence.is_empty() {
            return Err(ConfigError::EmptySequence);
        }
        let mut seen = HashSet::with_capacity(self.sequence.len());
        for state in &self.sequence {
            if !seen.insert(*state) {
                return Err(ConfigError::DuplicateState(*state));
            }
        }
        if !seen.contains(&self.initial_state) {
            return Err(ConfigError::InitialNotInSequence(self.initial_state));
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::ZeroCanvas {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }
        Ok(())
    }

    pub fn successor_of(&self, state: GameState) -> Option<GameState> {
        let index = self.sequence.iter().position(|entry| *entry == state)?;
        self.sequence.get(index + 1).copied()
    }

    pub fn canvas(&self) -> Canvas {
        Canvas::new(DEFAULT_CANVAS_ID, self.canvas_width, self.canvas_height)
    }
}
