//! The persisted unit: lifecycle phase plus full game context.
//!
//! A snapshot is the only artifact the engine ever hands to the outside
//! world, and the round-trip through JSON must be lossless for every
//! reachable state.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{EngineError, InfraErrorKind};
use crate::domain::state::{GameContext, GamePhase};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: GamePhase,
    pub context: GameContext,
}

impl Snapshot {
    /// A fresh room: no players, waiting for joins.
    pub fn new() -> Self {
        Self {
            state: GamePhase::WaitingForPlayers,
            context: GameContext::empty(),
        }
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(self)
            .map_err(|e| EngineError::infra(InfraErrorKind::DataCorruption, e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json)
            .map_err(|e| EngineError::infra(InfraErrorKind::DataCorruption, e.to_string()))
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}
