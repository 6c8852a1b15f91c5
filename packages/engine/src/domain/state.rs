//! Game phases, players, the shared context, and turn rotation.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::domain::cards::Card;
use crate::domain::errors::EngineError;
use crate::domain::hands::HandType;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;
pub const DECK_SIZE: usize = 52;

/// Lifecycle phases. A closed enum so the machine's dispatch is
/// exhaustive; wire values match the persisted snapshot documents.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    WaitingForPlayers,
    RoundFirstMove,
    NextPlayerTurn,
    PlayNewRound,
    GameEnd,
}

impl Display for GamePhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = match self {
            GamePhase::WaitingForPlayers => "WAITING_FOR_PLAYERS",
            GamePhase::RoundFirstMove => "ROUND_FIRST_MOVE",
            GamePhase::NextPlayerTurn => "NEXT_PLAYER_TURN",
            GamePhase::PlayNewRound => "PLAY_NEW_ROUND",
            GamePhase::GameEnd => "GAME_END",
        };
        write!(f, "{s}")
    }
}

/// A seated player. Ids come from the external identity provider and are
/// opaque, unique, and stable for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub hand: Vec<Card>,
}

/// One turn's move: a non-empty ordered card list pushed onto the pile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Play(pub Vec<Card>);

impl Play {
    pub fn cards(&self) -> &[Card] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The canonical game context. Seating order is turn order; the card
/// pile is the append-only full-game play log and its last entry is the
/// hand to beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameContext {
    pub players: Vec<Player>,
    pub current_player_index: usize,
    pub round_mode: Option<HandType>,
    pub card_pile: Vec<Play>,
    pub consecutive_passes: u8,
    pub winner: Option<Player>,
    pub rejection_message: Option<String>,
}

impl GameContext {
    pub fn empty() -> Self {
        Self {
            players: Vec::new(),
            current_player_index: 0,
            round_mode: None,
            card_pile: Vec::new(),
            consecutive_passes: 0,
            winner: None,
            rejection_message: None,
        }
    }

    /// Total cards across hands and pile; 52 from the deal onwards.
    pub fn cards_in_play(&self) -> usize {
        let in_hands: usize = self.players.iter().map(|p| p.hand.len()).sum();
        let in_pile: usize = self.card_pile.iter().map(Play::len).sum();
        in_hands + in_pile
    }

    pub fn current_player(&self) -> Result<&Player, EngineError> {
        self.players
            .get(self.current_player_index)
            .ok_or(EngineError::TurnOutOfRange {
                index: self.current_player_index,
                players: self.players.len(),
            })
    }
}

/// Next seat clockwise, wrapping to 0. An out-of-range `current` means a
/// prior transition broke the index invariant, not a user error.
pub fn next_player_index(current: usize, total: usize) -> Result<usize, EngineError> {
    if current >= total {
        return Err(EngineError::TurnOutOfRange {
            index: current,
            players: total,
        });
    }
    Ok((current + 1) % total)
}
