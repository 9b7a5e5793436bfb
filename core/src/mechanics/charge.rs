//! Charge sequences along the arena rim
//!
//! Each charger dashes from its spawn position to a point on the rim along
//! its facing, then around the rim in fixed angular steps. Spheres are left
//! behind along every lane and explode in order. Both sequences are
//! predicted once, when the mechanic triggers, and consumed as casts land.
//!
//! With `safe_spot_oid` set, the direction from the center to that actor is
//! recorded at the trigger. When every charger turns the same way, two safe
//! spots are drawn on opposite sides of the rim, rotated from that direction
//! toward the way the charges turn.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;
use waymark_types::ColorRole;

use crate::components::{Component, Progress, TickContext};
use crate::draw::DrawIntent;
use crate::error::MechanicError;
use crate::events::{CastEvent, IconEvent};
use crate::geometry::{Angle, Shape, almost_equal};
use crate::hints::ForbiddenZone;
use crate::world::{ActionId, Actor, ActorId, IconId, Oid};

use super::SeenCasts;

const HINT_CHARGE: &str = "GTFO from charge!";
const HINT_SPHERE: &str = "GTFO from sphere!";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeLanesConfig {
    /// Enemy kinds that charge; one path per kind
    pub charger_oids: Vec<Oid>,

    /// Completion of one of these by a charger ends its current segment
    pub charge_actions: Vec<ActionId>,

    /// Sphere explosions; empty disables sphere prediction
    #[serde(default)]
    pub sphere_actions: Vec<ActionId>,

    /// Icons that trigger path prediction. Empty predicts on the first tick
    /// the chargers are present.
    #[serde(default)]
    pub trigger_icons: Vec<IconId>,

    #[serde(default = "default_half_width")]
    pub half_width: f32,
    #[serde(default = "default_sphere_radius")]
    pub sphere_radius: f32,
    /// How far an exploding sphere may be from a predicted one
    #[serde(default = "default_sphere_tolerance")]
    pub sphere_tolerance: f32,
    /// Spheres per path that are shown at once
    #[serde(default = "default_imminent_spheres")]
    pub imminent_spheres: usize,

    #[serde(default = "default_rim_radius")]
    pub rim_radius: f32,
    /// Angle between consecutive rim points
    #[serde(default = "default_step_deg")]
    pub step_deg: f32,
    /// Spheres between the ends of each segment; also fixes the segment count
    #[serde(default = "default_spheres_per_segment")]
    pub spheres_per_segment: Vec<usize>,

    /// Actor whose bearing from the center anchors the safe spots
    #[serde(default)]
    pub safe_spot_oid: Option<Oid>,
    #[serde(default = "default_safe_spot_offset_deg")]
    pub safe_spot_offset_deg: f32,
    #[serde(default = "default_safe_spot_distance")]
    pub safe_spot_distance: f32,
}

fn default_half_width() -> f32 {
    3.0
}

fn default_sphere_radius() -> f32 {
    9.0
}

fn default_sphere_tolerance() -> f32 {
    3.0
}

fn default_imminent_spheres() -> usize {
    6
}

fn default_rim_radius() -> f32 {
    21.0
}

fn default_step_deg() -> f32 {
    112.5
}

fn default_spheres_per_segment() -> Vec<usize> {
    vec![1, 2, 2]
}

fn default_safe_spot_offset_deg() -> f32 {
    22.5
}

fn default_safe_spot_distance() -> f32 {
    20.0
}

const SAFE_SPOT_RADIUS: f32 = 2.0;

// ═══════════════════════════════════════════════════════════════════════════
// Charge Path
// ═══════════════════════════════════════════════════════════════════════════

/// Predicted charge of one actor. `positions[0]` is where the charger is
/// now; each consecutive pair is a lane still to come.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargePath {
    pub source: ActorId,
    pub positions: Vec<Vec2>,
    /// Sphere positions in explosion order
    pub spheres: Vec<Vec2>,
    pub clockwise: bool,
}

impl ChargePath {
    /// Lanes that have not been charged yet
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.positions.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn is_finished(&self) -> bool {
        self.positions.len() < 2
    }
}

/// Builds a [`ChargePath`] segment by segment
#[derive(Debug, Clone)]
pub struct ChargePathBuilder {
    path: ChargePath,
    with_spheres: bool,
}

impl ChargePathBuilder {
    /// Start at `start`, leaving a sphere there
    pub fn start(source: ActorId, start: Vec2) -> Self {
        Self {
            path: ChargePath {
                source,
                positions: vec![start],
                spheres: vec![start],
                clockwise: false,
            },
            with_spheres: true,
        }
    }

    /// Predict lanes only
    pub fn without_spheres(mut self) -> Self {
        self.with_spheres = false;
        self.path.spheres.clear();
        self
    }

    pub fn clockwise(mut self, clockwise: bool) -> Self {
        self.path.clockwise = clockwise;
        self
    }

    /// Charge on to `pos`, leaving `interior_spheres` evenly spaced spheres
    /// along the lane and one at its end
    pub fn then(mut self, pos: Vec2, interior_spheres: usize) -> Self {
        let from = self.path.positions.last().copied().unwrap_or(pos);
        if self.with_spheres {
            let parts = (interior_spheres + 1) as f32;
            for i in 1..=interior_spheres {
                self.path.spheres.push(from.lerp(pos, i as f32 / parts));
            }
            self.path.spheres.push(pos);
        }
        self.path.positions.push(pos);
        self
    }

    /// Extra sphere outside the regular pattern
    pub fn sphere(mut self, pos: Vec2) -> Self {
        self.path.spheres.push(pos);
        self
    }

    pub fn build(self) -> ChargePath {
        self.path
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Component
// ═══════════════════════════════════════════════════════════════════════════

pub struct ChargeLanes {
    config: ChargeLanesConfig,
    paths: Vec<ChargePath>,
    /// Charger kinds whose path has been predicted
    built: Vec<Oid>,
    triggered: bool,
    charges_done: u32,
    /// Bearing of the safe spot anchor when the mechanic triggered
    safe_start: Option<Angle>,
    seen: SeenCasts,
}

impl ChargeLanes {
    pub fn new(config: ChargeLanesConfig) -> Self {
        let triggered = config.trigger_icons.is_empty();
        Self {
            config,
            paths: Vec::new(),
            built: Vec::new(),
            triggered,
            charges_done: 0,
            safe_start: None,
            seen: SeenCasts::default(),
        }
    }

    pub fn paths(&self) -> &[ChargePath] {
        &self.paths
    }

    /// Predict the path of a charger standing at its start position
    pub fn predict(&self, charger: &Actor, center: Vec2) -> ChargePath {
        let offset = charger.position - center;
        let forward = charger.forward();
        // moving left around the center means counter-clockwise
        let clockwise = offset.perp_dot(forward) < 0.0;
        let sign = if clockwise { -1.0 } else { 1.0 };
        let step = Angle::degrees(self.config.step_deg * sign);

        let mut builder = ChargePathBuilder::start(charger.id, charger.position).clockwise(clockwise);
        if self.config.sphere_actions.is_empty() {
            builder = builder.without_spheres();
        }
        let mut dir = charger.rotation;
        for &interior in &self.config.spheres_per_segment {
            builder = builder.then(center + dir.to_direction() * self.config.rim_radius, interior);
            dir = dir + step;
        }
        builder.build()
    }

    fn build_paths(&mut self, ctx: &TickContext<'_>) {
        let center = ctx.arena.center();
        if self.safe_start.is_none()
            && let Some(oid) = self.config.safe_spot_oid
            && let Some(anchor) = ctx.world.enemies(oid).into_iter().find(|a| !a.dead)
        {
            self.safe_start = Some(Angle::from_direction(anchor.position - center));
        }
        for &oid in &self.config.charger_oids {
            if self.built.contains(&oid) {
                continue;
            }
            let Some(charger) = ctx.world.enemies(oid).into_iter().find(|a| !a.dead) else {
                continue;
            };
            let path = self.predict(charger, center);
            debug!(
                charger = ?charger.id,
                clockwise = path.clockwise,
                segments = path.positions.len() - 1,
                "Predicted charge path"
            );
            self.paths.push(path);
            self.built.push(oid);
        }
    }

    /// Safe spots on opposite sides of the rim, once every path is known
    /// and all of them turn the same way
    pub fn safe_spots(&self, center: Vec2) -> Vec<Vec2> {
        let Some(start) = self.safe_start else {
            return Vec::new();
        };
        let Some(first) = self.paths.first() else {
            return Vec::new();
        };
        let complete = self.paths.len() == self.config.charger_oids.len();
        let same_way = self.paths.iter().all(|p| p.clockwise == first.clockwise);
        let finished = self.paths.iter().all(ChargePath::is_finished);
        if !complete || !same_way || finished {
            return Vec::new();
        }
        let sign = if first.clockwise { -1.0 } else { 1.0 };
        let dir = start + Angle::degrees(sign * self.config.safe_spot_offset_deg);
        let distance = self.config.safe_spot_distance;
        vec![
            center + dir.to_direction() * distance,
            center - dir.to_direction() * distance,
        ]
    }

    fn imminent_charges(&self) -> impl Iterator<Item = Shape> + '_ {
        let half_width = self.config.half_width;
        self.paths
            .iter()
            .flat_map(move |p| p.segments().map(move |(from, to)| Shape::rect(from, to, half_width)))
    }

    fn imminent_spheres(&self) -> impl Iterator<Item = Shape> + '_ {
        let radius = self.config.sphere_radius;
        let take = self.config.imminent_spheres;
        self.paths
            .iter()
            .flat_map(move |p| p.spheres.iter().take(take).map(move |s| Shape::circle(*s, radius)))
    }
}

impl Component for ChargeLanes {
    fn update(&mut self, ctx: &TickContext<'_>) -> Result<(), MechanicError> {
        if self.triggered && self.built.len() < self.config.charger_oids.len() {
            self.build_paths(ctx);
        }
        Ok(())
    }

    fn text_hints(&self, _ctx: &TickContext<'_>, _slot: usize, actor: &Actor) -> Vec<String> {
        let mut hints = Vec::new();
        if self.imminent_charges().any(|s| s.contains(actor.position)) {
            hints.push(HINT_CHARGE.to_string());
        }
        if self.imminent_spheres().any(|s| s.contains(actor.position)) {
            hints.push(HINT_SPHERE.to_string());
        }
        hints
    }

    fn forbidden_zones(&self, _ctx: &TickContext<'_>, _slot: usize, _actor: &Actor) -> Vec<ForbiddenZone> {
        self.imminent_charges()
            .chain(self.imminent_spheres())
            .map(ForbiddenZone::always)
            .collect()
    }

    fn draw_intents(&self, ctx: &TickContext<'_>, _pov: &Actor) -> Vec<DrawIntent> {
        let mut intents: Vec<DrawIntent> = self
            .imminent_charges()
            .chain(self.imminent_spheres())
            .flat_map(|s| DrawIntent::zone(&s, ColorRole::Aoe))
            .collect();
        for path in &self.paths {
            if let Some(charger) = ctx.actor(path.source) {
                intents.push(DrawIntent::marker(charger.position, ColorRole::Enemy));
            }
        }
        for spot in self.safe_spots(ctx.arena.center()) {
            intents.push(DrawIntent::circle(spot, SAFE_SPOT_RADIUS, ColorRole::Safe));
        }
        intents
    }

    fn on_cast(&mut self, ctx: &TickContext<'_>, event: &CastEvent) {
        let watched = event.is_action(&self.config.charge_actions) || event.is_action(&self.config.sphere_actions);
        if !watched || !self.seen.completion(event) {
            return;
        }

        if event.is_action(&self.config.charge_actions) {
            if let Some(path) = self.paths.iter_mut().find(|p| p.source == event.caster)
                && !path.is_finished()
            {
                path.positions.remove(0);
                self.charges_done += 1;
            }
        } else if event.is_action(&self.config.sphere_actions) {
            let Some(at) = ctx.actor(event.caster).map(|a| a.position).or(event.location) else {
                debug!(caster = ?event.caster, "Sphere explosion from unknown position");
                return;
            };
            let tolerance = self.config.sphere_tolerance;
            for path in &mut self.paths {
                path.spheres.retain(|s| !almost_equal(*s, at, tolerance));
            }
        }
    }

    fn on_icon(&mut self, ctx: &TickContext<'_>, event: &IconEvent) {
        if self.config.trigger_icons.contains(&event.icon) {
            self.triggered = true;
            self.build_paths(ctx);
        }
    }

    fn on_actor_removed(&mut self, actor: ActorId) {
        self.paths.retain(|p| p.source != actor);
    }

    fn progress(&self) -> Progress {
        Progress {
            resolved: !self.paths.is_empty() && self.paths.iter().all(ChargePath::is_finished),
            count: self.charges_done,
        }
    }
}
