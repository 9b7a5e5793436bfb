//! Shared fixtures for mechanic tests

use glam::Vec2;
use waymark_types::Role;

use crate::arena::ArenaBounds;
use crate::components::{Component, TickContext};
use crate::config::EngineConfig;
use crate::events::{CastEvent, CastKind, IconEvent, StatusChange, StatusEvent};
use crate::hints::ForbiddenZone;
use crate::world::{ActionId, Actor, ActorId, CastInfo, WorldSnapshot, WorldState};

pub const BOSS: ActorId = ActorId(0x4000_0001);

/// Party member id for a slot
pub fn member(slot: usize) -> ActorId {
    ActorId(0x1000_0000 + slot as u64)
}

pub struct Harness {
    pub world: WorldSnapshot,
    pub arena: ArenaBounds,
    pub config: EngineConfig,
}

impl Harness {
    /// Empty world in a radius-20 arena at the origin
    pub fn new() -> Self {
        Self {
            world: WorldSnapshot::new(),
            arena: ArenaBounds::circle(Vec2::ZERO, 20.0).unwrap(),
            config: EngineConfig::default(),
        }
    }

    pub fn with_arena(mut self, arena: ArenaBounds) -> Self {
        self.arena = arena;
        self
    }

    /// Bind a party member at `pos`
    pub fn party(mut self, slot: usize, pos: Vec2, role: Role) -> Self {
        self.world = self
            .world
            .with_party_member(slot, Actor::new(member(slot), pos).with_role(role));
        self
    }

    pub fn boss(mut self, pos: Vec2) -> Self {
        self.world = self.world.with_primary(Actor::new(BOSS, pos).with_oid(1));
        self
    }

    pub fn enemy(mut self, actor: Actor) -> Self {
        self.world.upsert(actor);
        self
    }

    pub fn actor_mut(&mut self, id: ActorId) -> &mut Actor {
        self.world.actor_mut(id).unwrap()
    }

    pub fn move_to(&mut self, id: ActorId, pos: Vec2) {
        self.actor_mut(id).position = pos;
    }

    /// Start a cast on the boss so `is_casting` style checks see it
    pub fn boss_casting(&mut self, action: ActionId, total: f32, elapsed: f32) {
        self.actor_mut(BOSS).cast = Some(CastInfo {
            action,
            target: None,
            location: None,
            total,
            elapsed,
        });
    }

    pub fn ctx(&self, time: f32) -> TickContext<'_> {
        TickContext::new(&self.world, &self.arena, &self.config, time)
    }

    pub fn hints(&self, component: &dyn Component, time: f32, slot: usize) -> Vec<String> {
        let actor = self.world.party_member(slot).unwrap();
        component.text_hints(&self.ctx(time), slot, actor)
    }

    pub fn zones(&self, component: &dyn Component, time: f32, slot: usize) -> Vec<ForbiddenZone> {
        let actor = self.world.party_member(slot).unwrap();
        component.forbidden_zones(&self.ctx(time), slot, actor)
    }
}

pub fn cast(caster: ActorId, action: ActionId, kind: CastKind) -> CastEvent {
    CastEvent {
        caster,
        action,
        kind,
        target: None,
        location: None,
        duration: None,
        sequence: None,
    }
}

/// Completion of an instant cast carrying its effect sequence number
pub fn instant(caster: ActorId, action: ActionId, sequence: u32) -> CastEvent {
    CastEvent {
        sequence: Some(sequence),
        ..cast(caster, action, CastKind::Completed)
    }
}

pub fn cast_at(caster: ActorId, action: ActionId, target: ActorId, duration: f32) -> CastEvent {
    CastEvent {
        target: Some(target),
        duration: Some(duration),
        ..cast(caster, action, CastKind::Started)
    }
}

pub fn status(actor: ActorId, status: u32, change: StatusChange, duration: Option<f32>) -> StatusEvent {
    StatusEvent {
        actor,
        status,
        change,
        stacks: 0,
        duration,
    }
}

pub fn icon(actor: ActorId, icon: u32) -> IconEvent {
    IconEvent { actor, icon }
}
