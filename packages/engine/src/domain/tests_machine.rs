use rand_chacha::ChaCha12Rng;

use crate::domain::cards::parse_cards;
use crate::domain::dealing::seeded_rng;
use crate::domain::errors::Rejection;
use crate::domain::hands::HandType;
use crate::domain::machine::{apply, Action, Outcome};
use crate::domain::snapshot::Snapshot;
use crate::domain::state::{GameContext, GamePhase, Play, Player};

fn rng() -> ChaCha12Rng {
    seeded_rng(42)
}

fn join(id: &str, name: &str) -> Action {
    Action::JoinGame {
        player_id: id.into(),
        player_name: name.into(),
    }
}

fn play(cards: &[&str]) -> Action {
    Action::PlayCards {
        cards: parse_cards(cards),
    }
}

/// Apply an action that must be accepted.
fn accept(snapshot: &Snapshot, action: &Action) -> Snapshot {
    let outcome = apply(snapshot, action, &mut rng()).unwrap();
    assert_eq!(outcome.rejection, None, "expected acceptance");
    outcome.snapshot
}

/// Apply an action that must be rejected; checks the context is
/// untouched apart from the rejection message.
fn reject(snapshot: &Snapshot, action: &Action, expected: Rejection) -> Snapshot {
    let outcome = apply(snapshot, action, &mut rng()).unwrap();
    assert_eq!(outcome.rejection, Some(expected.clone()));
    assert_eq!(outcome.snapshot.state, snapshot.state);
    let mut unchanged = outcome.snapshot.clone();
    unchanged.context.rejection_message = snapshot.context.rejection_message.clone();
    assert_eq!(unchanged, *snapshot);
    assert_eq!(
        outcome.snapshot.context.rejection_message,
        Some(expected.to_string())
    );
    outcome.snapshot
}

/// Lobby with `count` seated players p1..pN.
fn lobby(count: usize) -> Snapshot {
    let mut snapshot = Snapshot::new();
    for i in 1..=count {
        snapshot = accept(&snapshot, &join(&format!("p{i}"), &format!("Player {i}")));
    }
    snapshot
}

/// Hand-built table for targeted mid-game scenarios.
fn table(state: GamePhase, hands: &[&[&str]], index: usize) -> Snapshot {
    let players = hands
        .iter()
        .enumerate()
        .map(|(i, tokens)| Player {
            id: format!("p{}", i + 1),
            name: format!("Player {}", i + 1),
            hand: parse_cards(tokens),
        })
        .collect();
    Snapshot {
        state,
        context: GameContext {
            players,
            current_player_index: index,
            round_mode: None,
            card_pile: Vec::new(),
            consecutive_passes: 0,
            winner: None,
            rejection_message: None,
        },
    }
}

fn singles_round(hands: &[&[&str]], index: usize, pile: &[&[&str]]) -> Snapshot {
    let mut snapshot = table(GamePhase::NextPlayerTurn, hands, index);
    snapshot.context.round_mode = Some(HandType::Single);
    snapshot.context.card_pile = pile.iter().map(|p| Play(parse_cards(p))).collect();
    snapshot
}

#[test]
fn four_players_join_and_start_with_13_cards_each() {
    let snapshot = lobby(4);
    assert_eq!(snapshot.state, GamePhase::WaitingForPlayers);
    assert_eq!(snapshot.context.players.len(), 4);
    assert!(snapshot.context.players.iter().all(|p| p.hand.is_empty()));

    let started = accept(&snapshot, &Action::StartGame);
    assert_eq!(started.state, GamePhase::RoundFirstMove);
    for player in &started.context.players {
        assert_eq!(player.hand.len(), 13);
    }
    assert_eq!(started.context.cards_in_play(), 52);
    assert_eq!(started.context.round_mode, None);
    assert_eq!(started.context.current_player_index, 0);
}

#[test]
fn dealt_hands_are_sorted_ascending() {
    let started = accept(&lobby(4), &Action::StartGame);
    for player in &started.context.players {
        let mut sorted = player.hand.clone();
        sorted.sort();
        assert_eq!(player.hand, sorted);
    }
}

#[test]
fn fifth_join_is_rejected() {
    let snapshot = lobby(4);
    reject(&snapshot, &join("p5", "Player 5"), Rejection::RoomFull);
}

#[test]
fn rejoining_the_same_id_is_rejected() {
    let snapshot = lobby(2);
    reject(&snapshot, &join("p1", "Copycat"), Rejection::AlreadySeated);
}

#[test]
fn start_needs_at_least_two_players() {
    let snapshot = lobby(1);
    reject(&snapshot, &Action::StartGame, Rejection::NotEnoughPlayers);
    assert_eq!(snapshot.context.players[0].hand.len(), 0);
}

#[test]
fn start_is_deterministic_for_a_fixed_seed() {
    let snapshot = lobby(4);
    let a = apply(&snapshot, &Action::StartGame, &mut seeded_rng(7)).unwrap();
    let b = apply(&snapshot, &Action::StartGame, &mut seeded_rng(7)).unwrap();
    assert_eq!(a, b);
    let c = apply(&snapshot, &Action::StartGame, &mut seeded_rng(8)).unwrap();
    assert_ne!(a, c);
}

#[test]
fn first_move_sets_round_mode_and_advances_turn() {
    let snapshot = table(
        GamePhase::RoundFirstMove,
        &[&["3H", "7S"], &["4D", "9C"], &["5H", "JC"], &["6S", "QD"]],
        0,
    );
    let next = accept(
        &snapshot,
        &Action::PlayFirstMove {
            cards: parse_cards(&["3H"]),
        },
    );
    assert_eq!(next.state, GamePhase::NextPlayerTurn);
    assert_eq!(next.context.current_player_index, 1);
    assert_eq!(next.context.round_mode, Some(HandType::Single));
    assert_eq!(next.context.card_pile.len(), 1);
    assert_eq!(next.context.card_pile[0].len(), 1);
    assert_eq!(next.context.players[0].hand, parse_cards(&["7S"]));
    assert_eq!(next.context.consecutive_passes, 0);
}

#[test]
fn first_move_rejects_illegal_hand_shapes() {
    let snapshot = table(GamePhase::RoundFirstMove, &[&["3H", "7S"], &["4D"]], 0);
    reject(
        &snapshot,
        &Action::PlayFirstMove {
            cards: parse_cards(&["3H", "7S"]),
        },
        Rejection::InvalidHand,
    );
}

#[test]
fn first_move_rejects_cards_the_player_does_not_hold() {
    let snapshot = table(GamePhase::RoundFirstMove, &[&["3H", "7S"], &["4D"]], 0);
    reject(
        &snapshot,
        &Action::PlayFirstMove {
            cards: parse_cards(&["4D"]),
        },
        Rejection::CardsNotInHand,
    );
}

#[test]
fn pairs_are_rejected_in_a_singles_round() {
    let snapshot = singles_round(
        &[&["3H"], &["5H", "5S", "9C"], &["4D"], &["8C"]],
        1,
        &[&["3D"]],
    );
    let rejected = reject(
        &snapshot,
        &play(&["5H", "5S"]),
        Rejection::WrongHandType(HandType::Single),
    );
    assert_eq!(
        rejected.context.rejection_message.as_deref(),
        Some("you must play a single card")
    );
}

#[test]
fn follow_up_play_must_beat_the_pile_top() {
    let snapshot = singles_round(&[&["3H"], &["5H", "9S"], &["4D"], &["8C"]], 1, &[&["9H"]]);
    reject(&snapshot, &play(&["5H"]), Rejection::NotBigEnough);
    // Same rank, higher suit wins.
    let next = accept(&snapshot, &play(&["9S"]));
    assert_eq!(next.state, GamePhase::NextPlayerTurn);
    assert_eq!(next.context.current_player_index, 2);
    assert_eq!(next.context.card_pile.last().unwrap().cards(), parse_cards(&["9S"]));
}

#[test]
fn duplicated_cards_in_a_play_are_rejected() {
    let snapshot = singles_round(&[&["3H"], &["5H", "9C"], &["4D"], &["8C"]], 1, &[&["3D"]]);
    reject(
        &snapshot,
        &Action::PlayCards {
            cards: parse_cards(&["5H", "5H"]),
        },
        Rejection::InvalidHand,
    );
}

#[test]
fn round_ends_after_all_but_the_last_player_pass() {
    // p1 played the pile top; p2, p3, p4 all pass in a row.
    let mut snapshot = singles_round(
        &[&["3H"], &["5H"], &["4D"], &["8C"]],
        1,
        &[&["9H"]],
    );

    snapshot = accept(&snapshot, &Action::PassTurn);
    assert_eq!(snapshot.state, GamePhase::NextPlayerTurn);
    assert_eq!(snapshot.context.consecutive_passes, 1);
    assert_eq!(snapshot.context.current_player_index, 2);

    snapshot = accept(&snapshot, &Action::PassTurn);
    assert_eq!(snapshot.state, GamePhase::NextPlayerTurn);
    assert_eq!(snapshot.context.consecutive_passes, 2);

    snapshot = accept(&snapshot, &Action::PassTurn);
    assert_eq!(snapshot.state, GamePhase::PlayNewRound);
    // Entry housekeeping: passes reset, round mode cleared, and rotation
    // has come back to the round winner.
    assert_eq!(snapshot.context.consecutive_passes, 0);
    assert_eq!(snapshot.context.round_mode, None);
    assert_eq!(snapshot.context.current_player_index, 0);
}

#[test]
fn two_player_round_ends_after_one_pass() {
    let mut snapshot = singles_round(&[&["3H", "4H"], &["5H", "6H"]], 1, &[&["9H"]]);
    snapshot = accept(&snapshot, &Action::PassTurn);
    assert_eq!(snapshot.state, GamePhase::PlayNewRound);
    assert_eq!(snapshot.context.current_player_index, 0);
}

#[test]
fn new_round_opener_can_switch_the_meld_type() {
    let mut snapshot = table(
        GamePhase::PlayNewRound,
        &[&["5H", "5S", "9C"], &["4D", "4C"], &["8C"], &["TD"]],
        0,
    );
    snapshot.context.card_pile = vec![Play(parse_cards(&["3D"])), Play(parse_cards(&["9H"]))];

    let next = accept(
        &snapshot,
        &Action::PlayNewRoundFirstMove {
            cards: parse_cards(&["5H", "5S"]),
        },
    );
    assert_eq!(next.state, GamePhase::NextPlayerTurn);
    assert_eq!(next.context.round_mode, Some(HandType::Pair));
    assert_eq!(next.context.card_pile.len(), 3);
}

#[test]
fn playing_the_last_card_wins_the_game() {
    let snapshot = singles_round(&[&["9H"], &["5H", "6H"], &["4D"], &["8C"]], 0, &[&["3D"]]);
    let next = accept(&snapshot, &play(&["9H"]));
    assert_eq!(next.state, GamePhase::GameEnd);
    let winner = next.context.winner.as_ref().unwrap();
    assert_eq!(winner.id, "p1");
    assert!(winner.hand.is_empty());
    assert!(next.context.players[0].hand.is_empty());
}

#[test]
fn a_new_round_opener_can_also_win() {
    let snapshot = table(
        GamePhase::PlayNewRound,
        &[&["5H", "6H"], &["9H"], &["4D", "8C"]],
        1,
    );
    let next = accept(
        &snapshot,
        &Action::PlayNewRoundFirstMove {
            cards: parse_cards(&["9H"]),
        },
    );
    assert_eq!(next.state, GamePhase::GameEnd);
    assert_eq!(next.context.winner.as_ref().unwrap().id, "p2");
}

#[test]
fn finished_game_only_accepts_reset() {
    let mut snapshot = singles_round(&[&["9H"], &["5H"], &["4D"], &["8C"]], 0, &[&["3D"]]);
    snapshot = accept(&snapshot, &play(&["9H"]));
    assert_eq!(snapshot.state, GamePhase::GameEnd);

    reject(
        &snapshot,
        &play(&["5H"]),
        Rejection::WrongState {
            action: "PLAY_CARDS",
            state: GamePhase::GameEnd,
        },
    );
    reject(
        &snapshot,
        &Action::PassTurn,
        Rejection::WrongState {
            action: "PASS_TURN",
            state: GamePhase::GameEnd,
        },
    );

    let reset = accept(&snapshot, &Action::ResetGame);
    assert_eq!(reset.state, GamePhase::WaitingForPlayers);
    assert_eq!(reset.context.players.len(), 4);
    assert!(reset.context.players.iter().all(|p| p.hand.is_empty()));
    assert_eq!(reset.context.players[0].id, "p1");
    assert_eq!(reset.context.current_player_index, 0);
    assert!(reset.context.card_pile.is_empty());
    assert_eq!(reset.context.consecutive_passes, 0);
    assert_eq!(reset.context.round_mode, None);
    assert_eq!(reset.context.winner, None);
}

#[test]
fn reset_works_mid_game() {
    let snapshot = singles_round(&[&["3H"], &["5H"], &["4D"], &["8C"]], 1, &[&["9H"]]);
    let reset = accept(&snapshot, &Action::ResetGame);
    assert_eq!(reset.state, GamePhase::WaitingForPlayers);
    assert!(reset.context.card_pile.is_empty());
}

#[test]
fn actions_in_the_wrong_state_are_rejected() {
    let lobby = lobby(2);
    reject(
        &lobby,
        &play(&["3H"]),
        Rejection::WrongState {
            action: "PLAY_CARDS",
            state: GamePhase::WaitingForPlayers,
        },
    );
    reject(
        &lobby,
        &Action::ResetGame,
        Rejection::WrongState {
            action: "RESET_GAME",
            state: GamePhase::WaitingForPlayers,
        },
    );

    let mid_game = singles_round(&[&["3H"], &["5H"]], 0, &[&["4D"]]);
    reject(
        &mid_game,
        &join("p9", "Latecomer"),
        Rejection::WrongState {
            action: "JOIN_GAME",
            state: GamePhase::NextPlayerTurn,
        },
    );
    reject(
        &mid_game,
        &Action::StartGame,
        Rejection::WrongState {
            action: "START_GAME",
            state: GamePhase::NextPlayerTurn,
        },
    );
    // The two opener actions are state-specific and not interchangeable.
    reject(
        &mid_game,
        &Action::PlayFirstMove {
            cards: parse_cards(&["3H"]),
        },
        Rejection::WrongState {
            action: "PLAY_FIRST_MOVE",
            state: GamePhase::NextPlayerTurn,
        },
    );
}

#[test]
fn accepted_action_clears_a_stale_rejection_message() {
    let mut snapshot = singles_round(&[&["3H"], &["5H", "9S"], &["4D"], &["8C"]], 1, &[&["9H"]]);
    snapshot = reject(&snapshot, &play(&["5H"]), Rejection::NotBigEnough);
    let next = accept(&snapshot, &play(&["9S"]));
    assert_eq!(next.context.rejection_message, None);
}

/// Greedy two-player game driven to completion: every intermediate
/// snapshot conserves all 52 cards and the game terminates with a
/// winner holding an empty hand.
#[test]
fn full_two_player_game_reaches_game_end() {
    let mut rng = seeded_rng(99);
    let mut snapshot = lobby(2);
    snapshot = accept(&snapshot, &Action::StartGame);

    for _ in 0..500 {
        if snapshot.state == GamePhase::GameEnd {
            break;
        }
        let player = snapshot.context.current_player().unwrap();
        let action = match snapshot.state {
            GamePhase::RoundFirstMove => Action::PlayFirstMove {
                cards: vec![player.hand[0]],
            },
            GamePhase::PlayNewRound => Action::PlayNewRoundFirstMove {
                cards: vec![player.hand[0]],
            },
            GamePhase::NextPlayerTurn => {
                let top = snapshot.context.card_pile.last().unwrap().cards()[0];
                match player.hand.iter().find(|c| **c > top) {
                    Some(card) => Action::PlayCards { cards: vec![*card] },
                    None => Action::PassTurn,
                }
            }
            _ => panic!("unexpected state {}", snapshot.state),
        };
        let Outcome {
            snapshot: next,
            rejection,
        } = apply(&snapshot, &action, &mut rng).unwrap();
        assert_eq!(rejection, None);
        assert_eq!(next.context.cards_in_play(), 52);
        snapshot = next;
    }

    assert_eq!(snapshot.state, GamePhase::GameEnd);
    let winner = snapshot.context.winner.as_ref().unwrap();
    assert!(winner.hand.is_empty());
}
