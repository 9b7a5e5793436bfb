//! AOEs announced by a cast bar
//!
//! Each matching cast is tracked from start to completion or interruption.
//! Self-targeted AOEs follow their caster; location-targeted ones stay where
//! the cast put them.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;
use waymark_types::ColorRole;

use crate::components::{Component, Progress, TickContext};
use crate::draw::DrawIntent;
use crate::error::MechanicError;
use crate::events::{CastEvent, CastKind};
use crate::geometry::{Angle, Shape};
use crate::hints::ForbiddenZone;
use crate::world::{ActionId, Actor, ActorId};

use super::{AoeShape, SeenCasts};

const HINT_GTFO: &str = "GTFO from aoe!";

/// Where the AOE is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AoeTargeting {
    /// On the caster, along its facing
    #[default]
    #[serde(rename = "self")]
    Caster,
    /// On the cast's target location (or target actor)
    Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastAoeConfig {
    pub actions: Vec<ActionId>,
    pub shape: AoeShape,
    #[serde(default)]
    pub targeting: AoeTargeting,
    /// Completed casts until resolved; 0 never resolves
    #[serde(default)]
    pub expected: u32,
}

#[derive(Debug, Clone)]
struct ActiveCast {
    caster: ActorId,
    action: ActionId,
    shape: Shape,
    started: f32,
    duration: Option<f32>,
}

impl ActiveCast {
    fn zone(&self) -> ForbiddenZone {
        match self.duration {
            Some(d) => ForbiddenZone::at(self.shape.clone(), self.started + d, self.started),
            None => ForbiddenZone::always(self.shape.clone()),
        }
    }
}

pub struct CastAoe {
    config: CastAoeConfig,
    casts: Vec<ActiveCast>,
    completed: u32,
    seen: SeenCasts,
}

impl CastAoe {
    pub fn new(config: CastAoeConfig) -> Self {
        Self {
            config,
            casts: Vec::new(),
            completed: 0,
            seen: SeenCasts::default(),
        }
    }

    pub fn active_casts(&self) -> usize {
        self.casts.len()
    }

    fn anchor(&self, ctx: &TickContext<'_>, event: &CastEvent) -> Option<(Vec2, Angle)> {
        let caster = ctx.actor(event.caster);
        match self.config.targeting {
            AoeTargeting::Caster => caster.map(|c| (c.position, c.rotation)),
            AoeTargeting::Location => {
                let at = event
                    .location
                    .or_else(|| event.target.and_then(|t| ctx.actor(t)).map(|t| t.position))?;
                let rotation = caster.map_or(Angle::ZERO, |c| Angle::from_direction(at - c.position));
                Some((at, rotation))
            }
        }
    }
}

impl Component for CastAoe {
    fn update(&mut self, ctx: &TickContext<'_>) -> Result<(), MechanicError> {
        if self.config.targeting != AoeTargeting::Caster {
            return Ok(());
        }
        for cast in &mut self.casts {
            let caster = ctx.require(cast.caster)?;
            cast.shape = self.config.shape.at(caster.position, caster.rotation);
        }
        Ok(())
    }

    fn text_hints(&self, _ctx: &TickContext<'_>, _slot: usize, actor: &Actor) -> Vec<String> {
        if self.casts.iter().any(|c| c.shape.contains(actor.position)) {
            vec![HINT_GTFO.to_string()]
        } else {
            Vec::new()
        }
    }

    fn forbidden_zones(&self, _ctx: &TickContext<'_>, _slot: usize, _actor: &Actor) -> Vec<ForbiddenZone> {
        self.casts.iter().map(ActiveCast::zone).collect()
    }

    fn draw_intents(&self, _ctx: &TickContext<'_>, _pov: &Actor) -> Vec<DrawIntent> {
        self.casts
            .iter()
            .flat_map(|c| DrawIntent::zone(&c.shape, ColorRole::Aoe))
            .collect()
    }

    fn on_cast(&mut self, ctx: &TickContext<'_>, event: &CastEvent) {
        if !event.is_action(&self.config.actions) {
            return;
        }
        let fresh = self.seen.completion(event);
        match event.kind {
            CastKind::Started => {
                if self
                    .casts
                    .iter()
                    .any(|c| c.caster == event.caster && c.action == event.action)
                {
                    return;
                }
                let Some((origin, rotation)) = self.anchor(ctx, event) else {
                    debug!(caster = ?event.caster, action = event.action, "AOE cast without an anchor");
                    return;
                };
                self.casts.push(ActiveCast {
                    caster: event.caster,
                    action: event.action,
                    shape: self.config.shape.at(origin, rotation),
                    started: ctx.time,
                    duration: event.duration,
                });
            }
            CastKind::Completed | CastKind::Interrupted => {
                self.casts
                    .retain(|c| !(c.caster == event.caster && c.action == event.action));
                if fresh {
                    self.completed += 1;
                }
            }
        }
    }

    fn on_actor_removed(&mut self, actor: ActorId) {
        self.casts.retain(|c| c.caster != actor);
    }

    fn progress(&self) -> Progress {
        Progress::counting(self.completed, self.config.expected)
    }
}
