//! World state contract
//!
//! The actor feed is owned by an external collaborator. The core only reads
//! it through the [`WorldState`] trait, once per tick. Every lookup by id
//! returns an `Option`: actors leave, die and despawn between ticks, and
//! mechanics must degrade rather than assume presence.
//!
//! [`WorldSnapshot`] is a plain in-memory implementation used by the replay
//! driver and by tests.

mod actor;
mod snapshot;

pub use actor::{Actor, ActorId, ActorStatus, CastInfo, Hp};
pub use snapshot::WorldSnapshot;

use glam::Vec2;
use waymark_types::{MAX_PARTY_SLOTS, SlotMask};

pub type ActionId = u32;
pub type StatusId = u32;
pub type IconId = u32;
pub type FeatureId = u32;
/// Object kind id (which enemy type an actor is)
pub type Oid = u32;

/// Read-only view of the world for one tick.
pub trait WorldState {
    /// Look up an actor by id. `None` once the actor left the world.
    fn actor(&self, id: ActorId) -> Option<&Actor>;

    /// All known actors, in no particular order
    fn actors(&self) -> Vec<&Actor>;

    /// Actor bound to a party slot
    fn party_slot(&self, slot: usize) -> Option<ActorId>;

    /// The encounter's primary enemy (the boss), if spawned
    fn primary(&self) -> Option<ActorId>;

    // ─── Provided helpers ────────────────────────────────────────────────────

    fn primary_actor(&self) -> Option<&Actor> {
        self.primary().and_then(|id| self.actor(id))
    }

    /// Party members that currently resolve, with their slot index
    fn party(&self) -> Vec<(usize, &Actor)> {
        (0..MAX_PARTY_SLOTS)
            .filter_map(|slot| {
                self.party_slot(slot)
                    .and_then(|id| self.actor(id))
                    .map(|actor| (slot, actor))
            })
            .collect()
    }

    /// Living party members
    fn alive_party(&self) -> Vec<(usize, &Actor)> {
        self.party().into_iter().filter(|(_, a)| !a.dead).collect()
    }

    fn party_member(&self, slot: usize) -> Option<&Actor> {
        self.party_slot(slot).and_then(|id| self.actor(id))
    }

    fn slot_of(&self, id: ActorId) -> Option<usize> {
        (0..MAX_PARTY_SLOTS).find(|&slot| self.party_slot(slot) == Some(id))
    }

    /// Actors of a given kind
    fn enemies(&self, oid: Oid) -> Vec<&Actor> {
        self.actors().into_iter().filter(|a| a.oid == oid).collect()
    }

    /// Party members within `radius` of `center`, excluding `exclude`
    fn party_in_radius_excluding(&self, exclude: ActorId, center: Vec2, radius: f32) -> Vec<(usize, &Actor)> {
        self.alive_party()
            .into_iter()
            .filter(|(_, a)| a.id != exclude && a.position.distance(center) <= radius)
            .collect()
    }

    /// Living party members whose slot is in `mask`
    fn party_in_mask(&self, mask: SlotMask) -> Vec<(usize, &Actor)> {
        mask.included(self.alive_party()).collect()
    }

    /// Living party members whose slot is not in `mask`
    fn party_outside_mask(&self, mask: SlotMask) -> Vec<(usize, &Actor)> {
        mask.excluded(self.alive_party()).collect()
    }

    /// True when at least one party slot is bound and every bound member is dead
    fn party_wiped(&self) -> bool {
        let party = self.party();
        !party.is_empty() && party.iter().all(|(_, a)| a.dead)
    }
}
