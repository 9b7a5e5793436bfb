//! In-memory world snapshot

use hashbrown::HashMap;
use waymark_types::MAX_PARTY_SLOTS;

use super::{Actor, ActorId, WorldState};

/// A self-contained snapshot of the world, rebuilt or patched each tick by
/// whoever drives the engine.
#[derive(Debug, Clone, Default)]
pub struct WorldSnapshot {
    actors: HashMap<ActorId, Actor>,
    party: [Option<ActorId>; MAX_PARTY_SLOTS],
    primary: Option<ActorId>,
}

impl WorldSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an actor
    pub fn upsert(&mut self, actor: Actor) {
        self.actors.insert(actor.id, actor);
    }

    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.upsert(actor);
        self
    }

    /// Insert an actor and bind it to a party slot
    pub fn with_party_member(mut self, slot: usize, actor: Actor) -> Self {
        self.set_party_slot(slot, Some(actor.id));
        self.upsert(actor);
        self
    }

    pub fn with_primary(mut self, actor: Actor) -> Self {
        self.primary = Some(actor.id);
        self.upsert(actor);
        self
    }

    pub fn set_party_slot(&mut self, slot: usize, id: Option<ActorId>) {
        if let Some(entry) = self.party.get_mut(slot) {
            *entry = id;
        }
    }

    pub fn set_primary(&mut self, id: Option<ActorId>) {
        self.primary = id;
    }

    /// Remove an actor. Party bindings are kept so the slot resolves to
    /// `None` rather than shifting other members.
    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        self.actors.remove(&id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

impl WorldState for WorldSnapshot {
    fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    fn actors(&self) -> Vec<&Actor> {
        let mut actors: Vec<&Actor> = self.actors.values().collect();
        actors.sort_by_key(|a| a.id);
        actors
    }

    fn party_slot(&self, slot: usize) -> Option<ActorId> {
        self.party.get(slot).copied().flatten()
    }

    fn primary(&self) -> Option<ActorId> {
        self.primary
    }
}
