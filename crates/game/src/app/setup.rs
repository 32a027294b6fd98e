use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use async_trait::async_trait;
use scene_flow::{AuxiliarySetup, SetupError};
use serde::{Deserialize, Serialize};
use tracing::info;

const STARTING_LEVEL: u32 = 1;
const STARTING_LIVES: u32 = 3;
const SESSION_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct GameSession {
    pub(crate) format_version: u32,
    pub(crate) seed: u64,
    pub(crate) level: u32,
    pub(crate) lives: u32,
}

impl GameSession {
    fn fresh(seed: u64) -> Self {
        Self {
            format_version: SESSION_FORMAT_VERSION,
            seed,
            level: STARTING_LEVEL,
            lives: STARTING_LIVES,
        }
    }
}

pub(crate) type SessionHandle = Rc<RefCell<Option<GameSession>>>;

/// Prepares a new game session while the story scene is on screen,
/// optionally writing it to `save_path` as JSON.
pub(crate) struct GameSetup {
    seed: u64,
    save_path: Option<PathBuf>,
    session: SessionHandle,
}

impl GameSetup {
    pub(crate) fn new(seed: u64, save_path: Option<PathBuf>) -> Self {
        Self {
            seed,
            save_path,
            session: SessionHandle::default(),
        }
    }

    pub(crate) fn session(&self) -> SessionHandle {
        self.session.clone()
    }
}

#[async_trait(?Send)]
impl AuxiliarySetup for GameSetup {
    fn name(&self) -> &str {
        "game_setup"
    }

    async fn run(&mut self) -> Result<(), SetupError> {
        let session = GameSession::fresh(self.seed);

        if let Some(path) = &self.save_path {
            let encoded = serde_json::to_string_pretty(&session)
                .map_err(|error| SetupError::new(format!("failed to encode session: {error}")))?;
            fs::write(path, encoded).map_err(|error| {
                SetupError::new(format!(
                    "failed to write session to {}: {error}",
                    path.display()
                ))
            })?;
        }

        info!(
            seed = session.seed,
            level = session.level,
            lives = session.lives,
            "game_session_prepared"
        );
        *self.session.borrow_mut() = Some(session);
        Ok(())
    }
}
