//! Deck construction, shuffling, and round-robin dealing.
//!
//! Shuffling is the engine's only non-determinism source, so the random
//! source is injected by the caller. `seeded_rng` gives a reproducible
//! generator for replaying a game from a seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

use crate::domain::cards::{Card, Rank, Suit};
use crate::domain::errors::EngineError;
use crate::domain::state::{DECK_SIZE, MAX_PLAYERS, MIN_PLAYERS};

/// Full 52-card deck, one of each (suit, rank), in suit-major order.
pub fn standard_deck() -> Vec<Card> {
    let suits = [Suit::Diamonds, Suit::Clubs, Suit::Hearts, Suit::Spades];
    let ranks = [
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
        Rank::Two,
    ];

    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in suits {
        for rank in ranks {
            deck.push(Card { suit, rank });
        }
    }
    deck
}

/// Unbiased Fisher-Yates shuffle: walk from the last index down to 1,
/// swapping each position with a uniformly random earlier-or-equal one.
pub fn shuffle(deck: &mut [Card], rng: &mut impl Rng) {
    for i in (1..deck.len()).rev() {
        let j = rng.random_range(0..=i);
        deck.swap(i, j);
    }
}

/// Deal round-robin: card `i` goes to hand `i % player_count`, so
/// earlier-indexed players receive the extras when the deck does not
/// divide evenly. This exact distribution is part of the wire contract.
pub fn deal(deck: &[Card], player_count: usize) -> Result<Vec<Vec<Card>>, EngineError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
        return Err(EngineError::invariant(format!(
            "cannot deal to {player_count} players"
        )));
    }

    let mut hands = vec![Vec::with_capacity(deck.len() / player_count + 1); player_count];
    for (i, card) in deck.iter().enumerate() {
        hands[i % player_count].push(*card);
    }
    Ok(hands)
}

/// Deterministic generator for seeded shuffles and tests.
pub fn seeded_rng(seed: u64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(seed)
}
