use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of scene states an application can be in.
///
/// Values are copied and compared, never mutated. The flow driver keys its
/// controller table on them and every transition result carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    Start,
    Story,
    Game,
}

impl GameState {
    pub const ALL: [GameState; 3] = [GameState::Start, GameState::Story, GameState::Game];

    pub fn label(self) -> &'static str {
        match self {
            GameState::Start => "START",
            GameState::Story => "STORY",
            GameState::Game => "GAME",
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown game state '{0}'")]
pub struct UnknownGameState(pub String);

impl FromStr for GameState {
    type Err = UnknownGameState;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        GameState::ALL
            .into_iter()
            .find(|state| state.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownGameState(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_unique() {
        let mut labels: Vec<&str> = GameState::ALL.iter().map(|state| state.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), GameState::ALL.len());
    }

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        assert_eq!(" story ".parse::<GameState>(), Ok(GameState::Story));
        assert_eq!("GAME".parse::<GameState>(), Ok(GameState::Game));
        assert_eq!(
            "credits".parse::<GameState>(),
            Err(UnknownGameState("credits".to_string()))
        );
    }

    #[test]
    fn serde_uses_upper_case_labels() {
        let encoded = serde_json::to_string(&GameState::Start).expect("encode");
        assert_eq!(encoded, "\"START\"");
        let decoded: GameState = serde_json::from_str("\"STORY\"").expect("decode");
        assert_eq!(decoded, GameState::Story);
    }
}
