//! Gaze from an eye on the arena rim
//!
//! An environment control places the eye at one of eight rim positions,
//! index 0 being north and the rest following clockwise. Anyone facing the
//! eye (or the primary enemy, which gazes along with it) when it resolves is
//! hit.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;
use waymark_types::ColorRole;

use crate::components::{Component, Progress, TickContext};
use crate::draw::DrawIntent;
use crate::events::{CastEvent, CastKind, EnvControlEvent};
use crate::geometry::Angle;
use crate::world::{ActionId, Actor, FeatureId};

const HINT_TURN_AWAY: &str = "Turn away from gaze!";

/// Highest env control index naming a rim position
const MAX_EYE_INDEX: u8 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazeConfig {
    /// Env control feature that places the eye
    pub feature: FeatureId,
    /// State value meaning "eye appears"
    pub state: u32,

    #[serde(default = "default_rim_radius")]
    pub rim_radius: f32,

    /// Casts that resolve the gaze
    #[serde(default)]
    pub resolve_actions: Vec<ActionId>,

    /// The primary enemy gazes too
    #[serde(default = "crate::serde_defaults::default_true")]
    pub also_primary: bool,
}

fn default_rim_radius() -> f32 {
    40.0
}

/// Rim position for an env control index
fn eye_position(center: Vec2, rim_radius: f32, index: u8) -> Vec2 {
    let dir = Angle::degrees(90.0 - f32::from(index) * 45.0);
    center + dir.to_direction() * rim_radius
}

/// True when `target` is in the forward half-plane
fn facing(position: Vec2, forward: Vec2, target: Vec2) -> bool {
    (target - position).dot(forward) >= 0.0
}

pub struct Gaze {
    config: GazeConfig,
    eye: Option<Vec2>,
    done: bool,
}

impl Gaze {
    pub fn new(config: GazeConfig) -> Self {
        Self {
            config,
            eye: None,
            done: false,
        }
    }

    pub fn eye(&self) -> Option<Vec2> {
        self.eye
    }

    /// Positions the actor must not face
    fn sources(&self, ctx: &TickContext<'_>) -> Vec<Vec2> {
        let Some(eye) = self.eye else {
            return Vec::new();
        };
        let mut sources = vec![eye];
        if self.config.also_primary
            && let Some(primary) = ctx.primary()
        {
            sources.push(primary.position);
        }
        sources
    }
}

impl Component for Gaze {
    fn text_hints(&self, ctx: &TickContext<'_>, _slot: usize, actor: &Actor) -> Vec<String> {
        let forward = actor.forward();
        if self
            .sources(ctx)
            .into_iter()
            .any(|s| facing(actor.position, forward, s))
        {
            vec![HINT_TURN_AWAY.to_string()]
        } else {
            Vec::new()
        }
    }

    fn draw_intents(&self, ctx: &TickContext<'_>, _pov: &Actor) -> Vec<DrawIntent> {
        self.sources(ctx)
            .into_iter()
            .map(|s| DrawIntent::marker(s, ColorRole::Enemy))
            .collect()
    }

    fn on_cast(&mut self, _ctx: &TickContext<'_>, event: &CastEvent) {
        if event.kind == CastKind::Completed && event.is_action(&self.config.resolve_actions) {
            self.eye = None;
            self.done = true;
        }
    }

    fn on_env_control(&mut self, ctx: &TickContext<'_>, event: &EnvControlEvent) {
        if event.feature != self.config.feature || event.state != self.config.state {
            return;
        }
        if event.index > MAX_EYE_INDEX {
            debug!(index = event.index, "Ignoring out of range eye index");
            return;
        }
        self.eye = Some(eye_position(ctx.arena.center(), self.config.rim_radius, event.index));
    }

    fn progress(&self) -> Progress {
        Progress {
            resolved: self.done,
            count: u32::from(self.done),
        }
    }
}
