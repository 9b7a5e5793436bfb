//! Charge at a targeted player, which that player must bait away
//!
//! The lane runs from the caster to its cast target. The target is told to
//! take the lane away from the raid; everybody else keeps out of it.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use waymark_types::ColorRole;

use crate::components::{Component, Progress, TickContext};
use crate::draw::DrawIntent;
use crate::events::{CastEvent, CastKind};
use crate::geometry::Shape;
use crate::hints::ForbiddenZone;
use crate::world::{ActionId, Actor, ActorId};

use super::SeenCasts;

const HINT_BAIT_AWAY: &str = "Bait away from raid!";
const HINT_GTFO_CHARGE: &str = "GTFO from charge!";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaitAwayChargeConfig {
    pub actions: Vec<ActionId>,
    #[serde(default = "default_half_width")]
    pub half_width: f32,
    /// Completed charges until resolved; 0 never resolves
    #[serde(default)]
    pub expected: u32,
}

fn default_half_width() -> f32 {
    7.0
}

#[derive(Debug, Clone, Copy)]
struct Bait {
    caster: ActorId,
    target: ActorId,
    started: f32,
    duration: Option<f32>,
}

pub struct BaitAwayCharge {
    config: BaitAwayChargeConfig,
    baits: Vec<Bait>,
    completed: u32,
    seen: SeenCasts,
}

impl BaitAwayCharge {
    pub fn new(config: BaitAwayChargeConfig) -> Self {
        Self {
            config,
            baits: Vec::new(),
            completed: 0,
            seen: SeenCasts::default(),
        }
    }

    /// Lanes that currently resolve, with their bait
    fn lanes(&self, ctx: &TickContext<'_>) -> Vec<(Bait, Shape)> {
        self.baits
            .iter()
            .filter_map(|b| {
                let from = ctx.actor(b.caster)?.position;
                let to = ctx.actor(b.target)?.position;
                Some((*b, self.lane(from, to)))
            })
            .collect()
    }

    fn lane(&self, from: Vec2, to: Vec2) -> Shape {
        Shape::rect(from, to, self.config.half_width)
    }
}

impl Component for BaitAwayCharge {
    fn text_hints(&self, ctx: &TickContext<'_>, _slot: usize, actor: &Actor) -> Vec<String> {
        let mut hints = Vec::new();
        for (bait, lane) in self.lanes(ctx) {
            if bait.target == actor.id {
                let others_inside = ctx
                    .world
                    .alive_party()
                    .into_iter()
                    .any(|(_, p)| p.id != actor.id && lane.contains(p.position));
                if others_inside {
                    hints.push(HINT_BAIT_AWAY.to_string());
                }
            } else if lane.contains(actor.position) {
                hints.push(HINT_GTFO_CHARGE.to_string());
            }
        }
        hints.dedup();
        hints
    }

    fn forbidden_zones(&self, ctx: &TickContext<'_>, _slot: usize, actor: &Actor) -> Vec<ForbiddenZone> {
        self.lanes(ctx)
            .into_iter()
            .filter(|(bait, _)| bait.target != actor.id)
            .map(|(bait, lane)| match bait.duration {
                Some(d) => ForbiddenZone::at(lane, bait.started + d, bait.started),
                None => ForbiddenZone::always(lane),
            })
            .collect()
    }

    fn draw_intents(&self, ctx: &TickContext<'_>, _pov: &Actor) -> Vec<DrawIntent> {
        self.lanes(ctx)
            .iter()
            .flat_map(|(_, lane)| DrawIntent::zone(lane, ColorRole::Aoe))
            .collect()
    }

    fn on_cast(&mut self, ctx: &TickContext<'_>, event: &CastEvent) {
        if !event.is_action(&self.config.actions) {
            return;
        }
        let fresh = self.seen.completion(event);
        match (event.kind, event.target) {
            (CastKind::Started, Some(target)) => {
                self.baits.retain(|b| b.caster != event.caster);
                self.baits.push(Bait {
                    caster: event.caster,
                    target,
                    started: ctx.time,
                    duration: event.duration,
                });
            }
            // charge without a target cannot be baited
            (CastKind::Started, None) => {}
            (CastKind::Completed | CastKind::Interrupted, _) => {
                self.baits.retain(|b| b.caster != event.caster);
                if fresh {
                    self.completed += 1;
                }
            }
        }
    }

    fn on_actor_removed(&mut self, actor: ActorId) {
        self.baits.retain(|b| b.caster != actor && b.target != actor);
    }

    fn progress(&self) -> Progress {
        Progress::counting(self.completed, self.config.expected)
    }
}
