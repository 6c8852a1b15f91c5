//! Integration seams. Persistence, realtime fan-out, and identity live
//! outside the engine; these traits are the whole surface it sees.
//!
//! The engine provides no locking or versioning. For a given room the
//! integrator must run actions as a strict linear sequence (load, apply,
//! persist, only then accept the next action); concurrent calls for
//! different rooms are trivially safe.

use rand::Rng;

use crate::domain::errors::{EngineError, Rejection};
use crate::domain::machine::{apply, Action};
use crate::domain::snapshot::Snapshot;

/// Loads and saves snapshots keyed by an opaque room identifier.
pub trait RoomStore {
    fn load(&self, room_id: &str) -> Result<Option<Snapshot>, EngineError>;
    fn save(&mut self, room_id: &str, snapshot: &Snapshot) -> Result<(), EngineError>;
}

/// Fans a saved snapshot out to the room's subscribers.
pub trait Broadcaster {
    fn publish(&mut self, room_id: &str, snapshot: &Snapshot) -> Result<(), EngineError>;
}

/// The integrator loop: load the latest snapshot (a missing room starts
/// fresh), apply one action, persist, broadcast.
///
/// Rejected actions are persisted and broadcast too — the snapshot is
/// unchanged apart from the rejection message, and subscribers render it
/// to the acting player.
pub struct RoomService<S, B> {
    store: S,
    broadcaster: B,
}

impl<S: RoomStore, B: Broadcaster> RoomService<S, B> {
    pub fn new(store: S, broadcaster: B) -> Self {
        Self { store, broadcaster }
    }

    pub fn handle(
        &mut self,
        room_id: &str,
        action: &Action,
        rng: &mut impl Rng,
    ) -> Result<(Snapshot, Option<Rejection>), EngineError> {
        let current = self.store.load(room_id)?.unwrap_or_default();
        let outcome = apply(&current, action, rng)?;
        self.store.save(room_id, &outcome.snapshot)?;
        self.broadcaster.publish(room_id, &outcome.snapshot)?;
        Ok((outcome.snapshot, outcome.rejection))
    }
}
