//! Domain layer: pure game rules, no I/O.

pub mod cards;
pub mod dealing;
pub mod errors;
pub mod hands;
pub mod machine;
pub mod snapshot;
pub mod state;

#[cfg(test)]
mod tests_machine;

// Re-exports for ergonomics
pub use cards::{Card, Rank, Suit};
pub use errors::{EngineError, InfraErrorKind, Rejection};
pub use hands::{Combo, ComboKind, HandType};
pub use machine::{apply, Action, Outcome};
pub use snapshot::Snapshot;
pub use state::{GameContext, GamePhase, Play, Player};
