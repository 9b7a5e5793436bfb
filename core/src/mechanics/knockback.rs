//! Knockback followed by an AOE on the primary enemy's target
//!
//! The primary enemy knocks one player back, then drops an AOE on whoever it
//! is targeting. In stack mode the raid shares the AOE with the tank; in
//! spread mode everybody stays away from the tank. When the knocked-back
//! player is the tank itself, the raid never stacks (the tank is assumed to
//! use an invulnerability instead).

use glam::Vec2;
use serde::{Deserialize, Serialize};
use waymark_types::ColorRole;

use crate::components::{Component, Progress, TickContext};
use crate::draw::DrawIntent;
use crate::error::MechanicError;
use crate::events::{CastEvent, CastKind, IconEvent};
use crate::geometry::Shape;
use crate::hints::ForbiddenZone;
use crate::world::{ActionId, Actor, ActorId, IconId};

use super::SeenCasts;

const HINT_WALL: &str = "About to be knocked into wall!";
const HINT_CO_TANK: &str = "GTFO from co-tank!";
const HINT_STACK_RAID: &str = "Stack with raid!";
const HINT_INVUL: &str = "Press invul!";
const HINT_GTFO_RAID: &str = "GTFO from raid!";
const HINT_STACK_TARGET: &str = "Stack with target!";
const HINT_GTFO_TARGET: &str = "GTFO from target!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnockbackMode {
    /// Raid stacks on the tank
    Stack,
    /// Raid stays away from the tank
    Spread,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnockbackConfig {
    /// Knockback casts that pick stack mode and name the target
    #[serde(default)]
    pub stack_actions: Vec<ActionId>,

    /// Knockback casts that pick spread mode and name the target
    #[serde(default)]
    pub spread_actions: Vec<ActionId>,

    /// Icons that mark the knockback target
    #[serde(default)]
    pub target_icons: Vec<IconId>,

    /// AOE casts whose completion resolves the mechanic
    #[serde(default)]
    pub resolve_actions: Vec<ActionId>,

    #[serde(default = "default_distance")]
    pub distance: f32,

    #[serde(default = "default_stack_radius")]
    pub stack_radius: f32,

    /// Falloff AOE; this is how far is "far enough"
    #[serde(default = "default_spread_radius")]
    pub spread_radius: f32,

    /// Players that must share the stack, including the tank
    #[serde(default = "default_party_size")]
    pub party_size: usize,
}

fn default_distance() -> f32 {
    15.0
}

fn default_stack_radius() -> f32 {
    6.0
}

fn default_spread_radius() -> f32 {
    20.0
}

fn default_party_size() -> usize {
    8
}

/// Where a knockback of `distance` away from `source` lands `target`.
/// A target standing on the source is not moved.
pub fn predict_landing(source: Vec2, target: Vec2, distance: f32) -> Vec2 {
    target + (target - source).normalize_or_zero() * distance
}

pub struct Knockback {
    config: KnockbackConfig,
    mode: Option<KnockbackMode>,
    target: Option<ActorId>,
    /// Where the target ends up: predicted while the source casts
    landing: Option<Vec2>,
    source_casting: bool,
    resolves: u32,
    seen: SeenCasts,
}

impl Knockback {
    pub fn new(config: KnockbackConfig) -> Self {
        Self {
            config,
            mode: None,
            target: None,
            landing: None,
            source_casting: false,
            resolves: 0,
            seen: SeenCasts::default(),
        }
    }

    /// Start with a known target and mode
    pub fn with_target(mut self, target: ActorId, mode: KnockbackMode) -> Self {
        self.target = Some(target);
        self.mode = Some(mode);
        self
    }

    pub fn landing(&self) -> Option<Vec2> {
        self.landing
    }

    fn aoe_radius(&self, mode: KnockbackMode) -> f32 {
        match mode {
            KnockbackMode::Stack => self.config.stack_radius,
            KnockbackMode::Spread => self.config.spread_radius,
        }
    }

    fn is_target(&self, id: ActorId) -> bool {
        self.target == Some(id)
    }

    fn raid_should_stack(&self, boss_target: ActorId) -> bool {
        self.mode == Some(KnockbackMode::Stack) && !self.is_target(boss_target)
    }

    /// Position the AOE will be centered on
    fn aoe_center(&self, tank: &Actor) -> Vec2 {
        if self.is_target(tank.id) {
            self.landing.unwrap_or(tank.position)
        } else {
            tank.position
        }
    }
}

impl Component for Knockback {
    fn update(&mut self, ctx: &TickContext<'_>) -> Result<(), MechanicError> {
        self.landing = None;
        self.source_casting = false;
        let Some(target_id) = self.target else {
            return Ok(());
        };
        let target = ctx.require(target_id)?;

        let mut landing = target.position;
        if let Some(source) = ctx.primary()
            && source.cast.is_some()
        {
            self.source_casting = true;
            landing = predict_landing(source.position, target.position, self.config.distance);
        }
        self.landing = Some(landing);
        Ok(())
    }

    fn text_hints(&self, ctx: &TickContext<'_>, _slot: usize, actor: &Actor) -> Vec<String> {
        let mut hints = Vec::new();
        let Some(boss) = ctx.primary() else {
            return hints;
        };

        if self.source_casting
            && self.is_target(actor.id)
            && self.landing.is_some_and(|p| !ctx.arena.in_bounds(p))
        {
            hints.push(HINT_WALL.to_string());
        }

        let Some(mode) = self.mode else {
            return hints;
        };
        let radius = self.aoe_radius(mode);

        if boss.target == Some(actor.id) {
            let near = ctx.world.party_in_radius_excluding(actor.id, actor.position, radius);
            if self.raid_should_stack(actor.id) {
                if self.landing.is_some_and(|p| actor.position.distance(p) <= radius) {
                    hints.push(HINT_CO_TANK.to_string());
                }
                if near.len() + 1 < self.config.party_size {
                    hints.push(HINT_STACK_RAID.to_string());
                }
            } else {
                if self.is_target(actor.id) {
                    hints.push(HINT_INVUL.to_string());
                }
                if !near.is_empty() {
                    hints.push(HINT_GTFO_RAID.to_string());
                }
            }
        } else {
            let Some(tank) = boss.target.and_then(|id| ctx.actor(id)) else {
                return hints;
            };
            if self.raid_should_stack(tank.id) && !self.is_target(actor.id) {
                if actor.position.distance(tank.position) > radius {
                    hints.push(HINT_STACK_TARGET.to_string());
                }
            } else {
                let pos = if self.is_target(actor.id) {
                    self.landing.unwrap_or(actor.position)
                } else {
                    actor.position
                };
                if pos.distance(tank.position) <= radius {
                    hints.push(HINT_GTFO_TARGET.to_string());
                }
            }
        }
        hints
    }

    fn forbidden_zones(&self, ctx: &TickContext<'_>, _slot: usize, actor: &Actor) -> Vec<ForbiddenZone> {
        let (Some(boss), Some(mode)) = (ctx.primary(), self.mode) else {
            return Vec::new();
        };
        let Some(tank) = boss.target.and_then(|id| ctx.actor(id)) else {
            return Vec::new();
        };
        if tank.id == actor.id {
            return Vec::new();
        }

        let center = self.aoe_center(tank);
        let radius = self.aoe_radius(mode);
        let shape = if self.raid_should_stack(tank.id) && !self.is_target(actor.id) {
            Shape::inverted_circle(center, radius)
        } else {
            Shape::circle(center, radius)
        };
        let zone = match &boss.cast {
            Some(cast) => ForbiddenZone::at(shape, ctx.time + cast.remaining(), ctx.time),
            None => ForbiddenZone::always(shape),
        };
        vec![zone]
    }

    fn draw_intents(&self, ctx: &TickContext<'_>, pov: &Actor) -> Vec<DrawIntent> {
        let mut intents = Vec::new();
        let Some(boss) = ctx.primary() else {
            return intents;
        };

        if self.source_casting
            && self.is_target(pov.id)
            && let Some(landing) = self.landing
            && landing != pov.position
        {
            intents.push(DrawIntent::line(pov.position, landing, ColorRole::Danger));
            intents.push(DrawIntent::marker(landing, ColorRole::Danger));
        }

        let Some(tank) = boss.target.and_then(|id| ctx.actor(id)) else {
            return intents;
        };
        let Some(mode) = self.mode else {
            return intents;
        };
        let center = self.aoe_center(tank);
        let radius = self.aoe_radius(mode);

        if tank.id == pov.id {
            // AOE lands on us: show who is inside it
            for (_, player) in ctx.world.party() {
                let color = if player.position.distance(center) <= radius {
                    ColorRole::PlayerInteresting
                } else {
                    ColorRole::PlayerGeneric
                };
                intents.push(DrawIntent::marker(player.position, color));
            }
        } else {
            intents.push(DrawIntent::marker(center, ColorRole::AoeTarget));
        }
        intents.push(DrawIntent::circle(center, radius, ColorRole::Danger));

        if let Some(target) = self.target.and_then(|id| ctx.actor(id))
            && target.id != pov.id
            && target.id != tank.id
        {
            intents.push(DrawIntent::marker(target.position, ColorRole::Vulnerable));
        }
        intents
    }

    fn on_cast(&mut self, ctx: &TickContext<'_>, event: &CastEvent) {
        let fresh = event.is_action(&self.config.resolve_actions) && self.seen.completion(event);
        match event.kind {
            CastKind::Started if ctx.world.primary() == Some(event.caster) => {
                let mode = if event.is_action(&self.config.stack_actions) {
                    KnockbackMode::Stack
                } else if event.is_action(&self.config.spread_actions) {
                    KnockbackMode::Spread
                } else {
                    return;
                };
                self.mode = Some(mode);
                if let Some(target) = event.target {
                    self.target = Some(target);
                }
            }
            CastKind::Completed if fresh => self.resolves += 1,
            _ => {}
        }
    }

    fn on_icon(&mut self, _ctx: &TickContext<'_>, event: &IconEvent) {
        if self.config.target_icons.contains(&event.icon) {
            self.target = Some(event.actor);
        }
    }

    fn on_actor_removed(&mut self, actor: ActorId) {
        if self.is_target(actor) {
            self.target = None;
            self.landing = None;
        }
    }

    fn progress(&self) -> Progress {
        Progress {
            resolved: self.resolves > 0,
            count: self.resolves,
        }
    }
}
