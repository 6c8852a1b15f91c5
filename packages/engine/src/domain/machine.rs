//! The game state machine: validates player actions against the current
//! snapshot and produces the next one.
//!
//! `apply` is pure and synchronous. Guards are predicates over the input
//! snapshot; a handler only builds a new context once every guard has
//! passed, so a rejected action can never leave a partial mutation
//! behind. Randomness enters exclusively through the injected `Rng`
//! used for the opening shuffle.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::cards::Card;
use crate::domain::dealing::{deal, shuffle, standard_deck};
use crate::domain::errors::{EngineError, Rejection};
use crate::domain::hands::{beats, classify};
use crate::domain::snapshot::Snapshot;
use crate::domain::state::{
    next_player_index, GameContext, GamePhase, Play, Player, MAX_PLAYERS, MIN_PLAYERS,
};

/// Player actions, encoded the way clients submit them: internally
/// tagged events with SCREAMING_SNAKE_CASE types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all_fields = "camelCase")]
pub enum Action {
    JoinGame {
        player_id: String,
        player_name: String,
    },
    StartGame,
    PlayFirstMove {
        cards: Vec<Card>,
    },
    PlayNewRoundFirstMove {
        cards: Vec<Card>,
    },
    PlayCards {
        cards: Vec<Card>,
    },
    PassTurn,
    ResetGame,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::JoinGame { .. } => "JOIN_GAME",
            Action::StartGame => "START_GAME",
            Action::PlayFirstMove { .. } => "PLAY_FIRST_MOVE",
            Action::PlayNewRoundFirstMove { .. } => "PLAY_NEW_ROUND_FIRST_MOVE",
            Action::PlayCards { .. } => "PLAY_CARDS",
            Action::PassTurn => "PASS_TURN",
            Action::ResetGame => "RESET_GAME",
        }
    }
}

/// Result of one `apply` call. On rejection the snapshot equals the
/// input except for `rejection_message`.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub snapshot: Snapshot,
    pub rejection: Option<Rejection>,
}

enum Step {
    Accepted { state: GamePhase, context: GameContext },
    Rejected(Rejection),
}

/// Apply one action to a snapshot. Rule violations come back as
/// `Outcome::rejection`; only internal invariant breaks are `Err`.
pub fn apply(
    snapshot: &Snapshot,
    action: &Action,
    rng: &mut impl Rng,
) -> Result<Outcome, EngineError> {
    match dispatch(snapshot, action, rng)? {
        Step::Accepted { state, mut context } => {
            context.rejection_message = None;
            debug!(action = action.name(), state = %state, "action applied");
            Ok(Outcome {
                snapshot: Snapshot { state, context },
                rejection: None,
            })
        }
        Step::Rejected(rejection) => {
            warn!(action = action.name(), state = %snapshot.state, %rejection, "action rejected");
            let mut next = snapshot.clone();
            next.context.rejection_message = Some(rejection.to_string());
            Ok(Outcome {
                snapshot: next,
                rejection: Some(rejection),
            })
        }
    }
}

fn dispatch(
    snapshot: &Snapshot,
    action: &Action,
    rng: &mut impl Rng,
) -> Result<Step, EngineError> {
    use GamePhase::{GameEnd, NextPlayerTurn, PlayNewRound, RoundFirstMove, WaitingForPlayers};

    let context = &snapshot.context;
    match (snapshot.state, action) {
        (
            WaitingForPlayers,
            Action::JoinGame {
                player_id,
                player_name,
            },
        ) => Ok(join_game(context, player_id, player_name)),
        (WaitingForPlayers, Action::StartGame) => start_game(context, rng),
        (RoundFirstMove, Action::PlayFirstMove { cards })
        | (PlayNewRound, Action::PlayNewRoundFirstMove { cards }) => open_round(context, cards),
        (NextPlayerTurn, Action::PlayCards { cards }) => play_cards(context, cards),
        (NextPlayerTurn, Action::PassTurn) => pass_turn(context),
        (RoundFirstMove | NextPlayerTurn | PlayNewRound | GameEnd, Action::ResetGame) => {
            Ok(reset_game(context))
        }
        (state, action) => Ok(Step::Rejected(Rejection::WrongState {
            action: action.name(),
            state,
        })),
    }
}

fn join_game(context: &GameContext, player_id: &str, player_name: &str) -> Step {
    if context.players.len() >= MAX_PLAYERS {
        return Step::Rejected(Rejection::RoomFull);
    }
    if context.players.iter().any(|p| p.id == player_id) {
        return Step::Rejected(Rejection::AlreadySeated);
    }

    let mut context = context.clone();
    context.players.push(Player {
        id: player_id.to_string(),
        name: player_name.to_string(),
        hand: Vec::new(),
    });
    Step::Accepted {
        state: GamePhase::WaitingForPlayers,
        context,
    }
}

fn start_game(context: &GameContext, rng: &mut impl Rng) -> Result<Step, EngineError> {
    if context.players.len() < MIN_PLAYERS {
        return Ok(Step::Rejected(Rejection::NotEnoughPlayers));
    }

    let mut deck = standard_deck();
    shuffle(&mut deck, rng);
    let hands = deal(&deck, context.players.len())?;
    debug!(players = context.players.len(), "dealing cards");

    let mut context = context.clone();
    for (player, mut hand) in context.players.iter_mut().zip(hands) {
        hand.sort();
        player.hand = hand;
    }
    Ok(Step::Accepted {
        state: GamePhase::RoundFirstMove,
        context,
    })
}

/// First move of a round: any legal meld sets the round mode.
/// Shared by ROUND_FIRST_MOVE and PLAY_NEW_ROUND, whose contracts are
/// identical.
fn open_round(context: &GameContext, cards: &[Card]) -> Result<Step, EngineError> {
    let Some(hand_type) = classify(cards) else {
        return Ok(Step::Rejected(Rejection::InvalidHand));
    };
    let player = context.current_player()?;
    let Some(remaining) = hand_without(&player.hand, cards) else {
        return Ok(Step::Rejected(Rejection::CardsNotInHand));
    };

    let mut context = context.clone();
    context.round_mode = Some(hand_type);
    context.consecutive_passes = 0;
    settle_play(context, cards, remaining)
}

/// A follow-up play must match the round mode and beat the pile top.
fn play_cards(context: &GameContext, cards: &[Card]) -> Result<Step, EngineError> {
    let Some(hand_type) = classify(cards) else {
        return Ok(Step::Rejected(Rejection::InvalidHand));
    };
    let Some(round_mode) = context.round_mode else {
        return Err(EngineError::invariant(
            "round mode unset in NEXT_PLAYER_TURN",
        ));
    };
    if hand_type != round_mode {
        return Ok(Step::Rejected(Rejection::WrongHandType(round_mode)));
    }

    let player = context.current_player()?;
    let Some(remaining) = hand_without(&player.hand, cards) else {
        return Ok(Step::Rejected(Rejection::CardsNotInHand));
    };

    let to_beat = context
        .card_pile
        .last()
        .ok_or_else(|| EngineError::invariant("empty pile in NEXT_PLAYER_TURN"))?;
    if !beats(cards, to_beat.cards(), round_mode)? {
        return Ok(Step::Rejected(Rejection::NotBigEnough));
    }

    let mut context = context.clone();
    context.consecutive_passes = 0;
    settle_play(context, cards, remaining)
}

/// Commit an accepted play: move the cards to the pile, advance the
/// turn, and end the game if the hand emptied.
fn settle_play(
    mut context: GameContext,
    cards: &[Card],
    remaining: Vec<Card>,
) -> Result<Step, EngineError> {
    let index = context.current_player_index;
    let won = remaining.is_empty();
    context.players[index].hand = remaining;
    context.card_pile.push(Play(cards.to_vec()));
    context.current_player_index = next_player_index(index, context.players.len())?;

    let state = if won {
        context.winner = Some(context.players[index].clone());
        GamePhase::GameEnd
    } else {
        GamePhase::NextPlayerTurn
    };
    Ok(Step::Accepted { state, context })
}

fn pass_turn(context: &GameContext) -> Result<Step, EngineError> {
    let mut context = context.clone();
    context.consecutive_passes += 1;
    context.current_player_index =
        next_player_index(context.current_player_index, context.players.len())?;

    // The round is won once every seated player except the one who made
    // the last play has passed; rotation has then come back around to
    // that player, who leads the new round.
    let state = if context.consecutive_passes as usize == context.players.len() - 1 {
        context.consecutive_passes = 0;
        context.round_mode = None;
        GamePhase::PlayNewRound
    } else {
        GamePhase::NextPlayerTurn
    };
    Ok(Step::Accepted { state, context })
}

/// Back to the lobby: identities are retained, everything else clears.
fn reset_game(context: &GameContext) -> Step {
    let mut context = context.clone();
    for player in &mut context.players {
        player.hand.clear();
    }
    context.current_player_index = 0;
    context.round_mode = None;
    context.card_pile.clear();
    context.consecutive_passes = 0;
    context.winner = None;
    Step::Accepted {
        state: GamePhase::WaitingForPlayers,
        context,
    }
}

/// The hand left after removing `played`, or `None` if `played` is not a
/// duplicate-free subset of `hand` (cards must never be conjured).
fn hand_without(hand: &[Card], played: &[Card]) -> Option<Vec<Card>> {
    let mut remaining = hand.to_vec();
    for card in played {
        let pos = remaining.iter().position(|c| c == card)?;
        remaining.remove(pos);
    }
    Some(remaining)
}
