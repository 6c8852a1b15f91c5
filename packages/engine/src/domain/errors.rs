//! Error split: fatal invariant violations versus game-rule rejections.
//!
//! Rule rejections are data, not control flow. They are returned to the
//! caller so a UI can surface them to the player, and they never mutate
//! the game context beyond the rejection message. Only `EngineError`
//! aborts an `apply` call.

use thiserror::Error;

use crate::domain::hands::HandType;
use crate::domain::state::GamePhase;

/// Infrastructure failure kinds reported by port implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Unavailable,
    DataCorruption,
    Other(String),
}

/// Fatal engine errors. These indicate a bug upstream of normal user
/// input (or a failing collaborator) and never occur under correct
/// guard enforcement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("turn index {index} out of range for {players} players")]
    TurnOutOfRange { index: usize, players: usize },
    #[error("invariant violated: {0}")]
    Invariant(String),
    #[error("unrecognized card token: {0}")]
    ParseCard(String),
    #[error("infra {kind:?}: {detail}")]
    Infra { kind: InfraErrorKind, detail: String },
}

impl EngineError {
    pub fn invariant(detail: impl Into<String>) -> Self {
        Self::Invariant(detail.into())
    }

    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra {
            kind,
            detail: detail.into(),
        }
    }
}

/// A rejected action. The `Display` strings are shown to players verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("{action} is not allowed while {state}")]
    WrongState {
        action: &'static str,
        state: GamePhase,
    },
    #[error("the room is full")]
    RoomFull,
    #[error("player is already seated")]
    AlreadySeated,
    #[error("at least 2 players are needed to start")]
    NotEnoughPlayers,
    #[error("invalid hand was played")]
    InvalidHand,
    #[error("you must play {0}")]
    WrongHandType(HandType),
    #[error("not big enough")]
    NotBigEnough,
    #[error("played cards are not in your hand")]
    CardsNotInHand,
}
