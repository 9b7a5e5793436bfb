//! Component contract
//!
//! A component owns the state of one mechanic for one activation. The
//! registry recreates it from its factory on every activation and drops it on
//! deactivation, so nothing carries over between phases or attempts.
//!
//! Per tick the module drives components in a fixed order: event handlers,
//! then [`Component::update`], then the per-actor queries. Queries take
//! `&self` and must return the same output when called twice in a tick.

mod registry;


pub use registry::{ComponentEntry, ComponentFactory, ComponentRegistry};

use crate::arena::ArenaBounds;
use crate::config::EngineConfig;
use crate::draw::DrawIntent;
use crate::error::MechanicError;
use crate::events::{CastEvent, EnvControlEvent, IconEvent, StatusEvent};
use crate::hints::{ForbiddenZone, TargetHint};
use crate::world::{Actor, ActorId, WorldState};

/// Published completion state of a mechanic. This is the only thing the
/// phase machine reads from a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub resolved: bool,
    /// Mechanic-defined counter (resolves, hits, casts seen)
    pub count: u32,
}

impl Progress {
    pub fn counting(count: u32, expected: u32) -> Self {
        Self {
            resolved: expected > 0 && count >= expected,
            count,
        }
    }
}

/// Read-only view handed to components for one tick.
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    pub world: &'a dyn WorldState,
    pub arena: &'a ArenaBounds,
    pub config: &'a EngineConfig,
    /// Seconds since encounter start
    pub time: f32,
}

impl<'a> TickContext<'a> {
    pub fn new(world: &'a dyn WorldState, arena: &'a ArenaBounds, config: &'a EngineConfig, time: f32) -> Self {
        Self {
            world,
            arena,
            config,
            time,
        }
    }

    pub fn actor(&self, id: ActorId) -> Option<&'a Actor> {
        self.world.actor(id)
    }

    /// Like [`actor`](Self::actor), for `update` paths that report absence
    pub fn require(&self, id: ActorId) -> Result<&'a Actor, MechanicError> {
        self.world.actor(id).ok_or(MechanicError::MissingActor(id))
    }

    pub fn primary(&self) -> Option<&'a Actor> {
        self.world.primary_actor()
    }
}

/// A mechanic tracked by the engine. Every method has a no-op default so a
/// component only implements the events and outputs it cares about.
pub trait Component {
    /// Recompute derived state from the current snapshot
    fn update(&mut self, _ctx: &TickContext<'_>) -> Result<(), MechanicError> {
        Ok(())
    }

    /// Advisory strings for one party member
    fn text_hints(&self, _ctx: &TickContext<'_>, _slot: usize, _actor: &Actor) -> Vec<String> {
        Vec::new()
    }

    /// Regions this party member should stay out of
    fn forbidden_zones(&self, _ctx: &TickContext<'_>, _slot: usize, _actor: &Actor) -> Vec<ForbiddenZone> {
        Vec::new()
    }

    /// How this party member should treat enemies
    fn target_hints(&self, _ctx: &TickContext<'_>, _slot: usize, _actor: &Actor) -> Vec<TargetHint> {
        Vec::new()
    }

    /// Overlay primitives as seen by `pov`
    fn draw_intents(&self, _ctx: &TickContext<'_>, _pov: &Actor) -> Vec<DrawIntent> {
        Vec::new()
    }

    fn on_cast(&mut self, _ctx: &TickContext<'_>, _event: &CastEvent) {}

    fn on_status(&mut self, _ctx: &TickContext<'_>, _event: &StatusEvent) {}

    fn on_icon(&mut self, _ctx: &TickContext<'_>, _event: &IconEvent) {}

    fn on_env_control(&mut self, _ctx: &TickContext<'_>, _event: &EnvControlEvent) {}

    /// The actor left the world; drop every reference to it
    fn on_actor_removed(&mut self, _actor: ActorId) {}

    fn progress(&self) -> Progress {
        Progress::default()
    }
}
