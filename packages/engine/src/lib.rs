#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

//! Pure, deterministic rules engine for four-player Big Two.
//!
//! The engine ingests a persisted [`Snapshot`] plus one player
//! [`Action`] and produces the next snapshot, enforcing hand legality,
//! turn order, round structure, and win conditions. It performs no I/O;
//! persistence, realtime fan-out, and identity are external
//! collaborators behind the traits in [`ports`].

pub mod domain;
pub mod ports;

pub use domain::cards::{Card, Rank, Suit};
pub use domain::dealing::{deal, seeded_rng, shuffle, standard_deck};
pub use domain::errors::{EngineError, InfraErrorKind, Rejection};
pub use domain::hands::{beats, classify, validate_combo, Combo, ComboKind, HandType};
pub use domain::machine::{apply, Action, Outcome};
pub use domain::snapshot::Snapshot;
pub use domain::state::{next_player_index, GameContext, GamePhase, Play, Player};
pub use ports::{Broadcaster, RoomService, RoomStore};


// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
