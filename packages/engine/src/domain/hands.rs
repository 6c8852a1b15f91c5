//! Hand classification and comparison.
//!
//! `classify` is total: any card list that is not a legal single, pair,
//! or five-card combo classifies to `None` rather than an error.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::domain::cards::{Card, Rank};
use crate::domain::errors::EngineError;

/// The meld type that a round is locked to. Wire values match the
/// persisted snapshot documents ("single" / "pairs" / "combo").
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum HandType {
    #[serde(rename = "single")]
    Single,
    #[serde(rename = "pairs")]
    Pair,
    #[serde(rename = "combo")]
    Combo,
}

// Display feeds the "you must play {}" rejection message.
impl Display for HandType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            HandType::Single => write!(f, "a single card"),
            HandType::Pair => write!(f, "pairs"),
            HandType::Combo => write!(f, "a combo"),
        }
    }
}

/// Five-card combo subtypes; `Ord` is the fixed game hierarchy.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum ComboKind {
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

/// A validated five-card combo with its representative high card.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Combo {
    pub kind: ComboKind,
    pub high_card: Card,
}

/// Classify a played card list, or `None` if it is not a legal meld.
pub fn classify(cards: &[Card]) -> Option<HandType> {
    match cards.len() {
        1 => Some(HandType::Single),
        2 if cards[0].rank == cards[1].rank && cards[0] != cards[1] => Some(HandType::Pair),
        5 if validate_combo(cards).is_some() => Some(HandType::Combo),
        _ => None,
    }
}

/// Validate a five-card combo. A hand matching several subtypes (e.g. a
/// straight flush) classifies as the highest one.
///
/// Straights are five consecutive ranks in the big-two order with no
/// wrap-around, so Two never continues a run that starts at Three.
pub fn validate_combo(cards: &[Card]) -> Option<Combo> {
    if cards.len() != 5 {
        return None;
    }
    let mut sorted = cards.to_vec();
    sorted.sort();
    // A physical deck has no duplicate cards; reject them outright.
    if sorted.windows(2).any(|w| w[0] == w[1]) {
        return None;
    }

    let flush = sorted.iter().all(|c| c.suit == sorted[0].suit);
    let straight = sorted
        .windows(2)
        .all(|w| w[1].rank.order() == w[0].rank.order() + 1);

    let mut by_rank = [0u8; 13];
    for c in &sorted {
        by_rank[c.rank.order() as usize] += 1;
    }
    let rank_with_count = |n: u8| {
        by_rank
            .iter()
            .position(|&count| count == n)
            .map(|i| Rank::from_order(i as u8))
    };

    let kind = if straight && flush {
        ComboKind::StraightFlush
    } else if rank_with_count(4).is_some() {
        ComboKind::FourOfAKind
    } else if rank_with_count(3).is_some() && rank_with_count(2).is_some() {
        ComboKind::FullHouse
    } else if flush {
        ComboKind::Flush
    } else if straight {
        ComboKind::Straight
    } else {
        return None;
    };

    let high_card = match kind {
        ComboKind::Straight | ComboKind::Flush | ComboKind::StraightFlush => sorted[4],
        ComboKind::FourOfAKind => highest_of_rank(&sorted, rank_with_count(4)?),
        ComboKind::FullHouse => highest_of_rank(&sorted, rank_with_count(3)?),
    };

    Some(Combo { kind, high_card })
}

fn highest_of_rank(sorted: &[Card], rank: Rank) -> Card {
    // sorted is ascending, so the last match is the highest.
    sorted
        .iter()
        .rev()
        .find(|c| c.rank == rank)
        .copied()
        .unwrap_or(sorted[4])
}

/// Whether `played` outranks `to_beat`. Both sides must already have
/// classified as `hand_type`; a combo that fails re-validation here means
/// the round-mode invariant was broken upstream, so the play is refused
/// loudly instead of corrupting state.
pub fn beats(played: &[Card], to_beat: &[Card], hand_type: HandType) -> Result<bool, EngineError> {
    match hand_type {
        HandType::Single => {
            let (Some(p), Some(b)) = (played.first(), to_beat.first()) else {
                return Err(EngineError::invariant("single comparison on empty play"));
            };
            Ok(p > b)
        }
        HandType::Pair => {
            let (Some(p), Some(b)) = (played.iter().max(), to_beat.iter().max()) else {
                return Err(EngineError::invariant("pair comparison on empty play"));
            };
            Ok(p > b)
        }
        HandType::Combo => {
            let p = validate_combo(played)
                .ok_or_else(|| EngineError::invariant("played combo failed re-validation"))?;
            let b = validate_combo(to_beat)
                .ok_or_else(|| EngineError::invariant("pile combo failed re-validation"))?;
            if p.kind != b.kind {
                Ok(p.kind > b.kind)
            } else {
                Ok(p.high_card > b.high_card)
            }
        }
    }
}
