//! Kill order for adds
//!
//! Adds are listed by kind in kill order. The next add to kill is the one
//! closest to the primary among the first listed kind with a live,
//! targetable actor. Everything else is held off, except adds of a kind with
//! `keep_above` whose predicted HP is still above that fraction.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use waymark_types::ColorRole;

use crate::components::{Component, Progress, TickContext};
use crate::draw::DrawIntent;
use crate::error::{EngineError, MechanicError};
use crate::hints::{PRIORITY_FORBIDDEN, TargetHint};
use crate::world::{Actor, ActorId, Oid};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddRule {
    pub oid: Oid,
    /// Keep attacking adds of this kind while their HP fraction, after
    /// pending damage, is above this
    #[serde(default)]
    pub keep_above: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddPriorityConfig {
    /// In kill order
    pub adds: Vec<AddRule>,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    2
}

impl AddPriorityConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.adds.is_empty() {
            return Err(EngineError::malformed("add_priority needs at least one add kind"));
        }
        for rule in &self.adds {
            if let Some(t) = rule.keep_above
                && !(0.0..=1.0).contains(&t)
            {
                return Err(EngineError::malformed(format!(
                    "add_priority keep_above must be within 0-1, got {}",
                    t
                )));
            }
        }
        Ok(())
    }
}

pub struct AddPriority {
    config: AddPriorityConfig,
    seen: HashSet<ActorId>,
    killed: HashSet<ActorId>,
}

impl AddPriority {
    pub fn new(config: AddPriorityConfig) -> Self {
        Self {
            config,
            seen: HashSet::new(),
            killed: HashSet::new(),
        }
    }

    fn attackable<'a>(ctx: &TickContext<'a>, oid: Oid) -> impl Iterator<Item = &'a Actor> {
        ctx.world
            .enemies(oid)
            .into_iter()
            .filter(|a| !a.dead && a.targetable)
    }

    /// Add everybody should attack next
    pub fn next_add<'a>(&self, ctx: &TickContext<'a>) -> Option<&'a Actor> {
        let origin = ctx.primary().map(|p| p.position).unwrap_or_else(|| ctx.arena.center());
        self.config.adds.iter().find_map(|rule| {
            Self::attackable(ctx, rule.oid).min_by(|a, b| {
                let da = a.position.distance_squared(origin);
                let db = b.position.distance_squared(origin);
                da.total_cmp(&db)
            })
        })
    }
}

impl Component for AddPriority {
    fn update(&mut self, ctx: &TickContext<'_>) -> Result<(), MechanicError> {
        for rule in &self.config.adds {
            for add in ctx.world.enemies(rule.oid) {
                self.seen.insert(add.id);
                if add.dead {
                    self.killed.insert(add.id);
                }
            }
        }
        Ok(())
    }

    fn target_hints(&self, ctx: &TickContext<'_>, _slot: usize, _actor: &Actor) -> Vec<TargetHint> {
        let next = self.next_add(ctx).map(|a| a.id);
        let mut hints = Vec::new();
        for rule in &self.config.adds {
            for add in Self::attackable(ctx, rule.oid) {
                let healthy = rule.keep_above.is_some_and(|t| add.hp.predicted_fraction() > t);
                let priority = if next == Some(add.id) || healthy {
                    self.config.priority
                } else {
                    PRIORITY_FORBIDDEN
                };
                hints.push(TargetHint::new(add.id, priority));
            }
        }
        hints
    }

    fn draw_intents(&self, ctx: &TickContext<'_>, _pov: &Actor) -> Vec<DrawIntent> {
        self.next_add(ctx)
            .map(|a| DrawIntent::marker(a.position, ColorRole::Enemy))
            .into_iter()
            .collect()
    }

    fn on_actor_removed(&mut self, actor: ActorId) {
        if self.seen.contains(&actor) {
            self.killed.insert(actor);
        }
    }

    fn progress(&self) -> Progress {
        Progress {
            resolved: !self.seen.is_empty() && self.killed.len() == self.seen.len(),
            count: self.killed.len() as u32,
        }
    }
}
