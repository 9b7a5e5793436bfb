//! Status-marked players that explode on expiry
//!
//! Marked and unmarked players keep apart: the explosion hits everyone
//! within the radius of a marked player when the status runs out.

use serde::{Deserialize, Serialize};
use waymark_types::{ColorRole, MAX_PARTY_SLOTS, SlotMask};

use crate::components::{Component, Progress, TickContext};
use crate::draw::DrawIntent;
use crate::events::{StatusChange, StatusEvent};
use crate::geometry::Shape;
use crate::hints::ForbiddenZone;
use crate::world::{Actor, StatusId};

const HINT_SPREAD: &str = "Spread!";
const HINT_GTFO_MARKED: &str = "GTFO from marked player!";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkedSpreadConfig {
    pub statuses: Vec<StatusId>,
    #[serde(default = "default_radius")]
    pub radius: f32,
}

fn default_radius() -> f32 {
    6.0
}

/// Creation time and expiry of a mark
#[derive(Debug, Clone, Copy)]
struct Expiry {
    created: f32,
    at: Option<f32>,
}

pub struct MarkedSpread {
    config: MarkedSpreadConfig,
    marked: SlotMask,
    expiry: [Option<Expiry>; MAX_PARTY_SLOTS],
    applied: u32,
}

impl MarkedSpread {
    pub fn new(config: MarkedSpreadConfig) -> Self {
        Self {
            config,
            marked: SlotMask::EMPTY,
            expiry: [None; MAX_PARTY_SLOTS],
            applied: 0,
        }
    }

    pub fn marked(&self) -> SlotMask {
        self.marked
    }

    fn zone(&self, marked_slot: usize, shape: Shape) -> ForbiddenZone {
        match self.expiry[marked_slot] {
            Some(Expiry { created, at: Some(at) }) => ForbiddenZone::at(shape, at, created),
            _ => ForbiddenZone::always(shape),
        }
    }
}

impl Component for MarkedSpread {
    fn text_hints(&self, ctx: &TickContext<'_>, slot: usize, actor: &Actor) -> Vec<String> {
        let radius = self.config.radius;
        let near = |others: Vec<(usize, &Actor)>| {
            others
                .iter()
                .any(|(s, p)| *s != slot && p.position.distance(actor.position) <= radius)
        };
        if self.marked.contains(slot) {
            if near(ctx.world.party_outside_mask(self.marked)) {
                return vec![HINT_SPREAD.to_string()];
            }
        } else if near(ctx.world.party_in_mask(self.marked)) {
            return vec![HINT_GTFO_MARKED.to_string()];
        }
        Vec::new()
    }

    fn forbidden_zones(&self, ctx: &TickContext<'_>, slot: usize, _actor: &Actor) -> Vec<ForbiddenZone> {
        let radius = self.config.radius;
        if self.marked.contains(slot) {
            ctx.world
                .party_outside_mask(self.marked)
                .into_iter()
                .map(|(_, p)| self.zone(slot, Shape::circle(p.position, radius)))
                .collect()
        } else {
            ctx.world
                .party_in_mask(self.marked)
                .into_iter()
                .map(|(s, p)| self.zone(s, Shape::circle(p.position, radius)))
                .collect()
        }
    }

    fn draw_intents(&self, ctx: &TickContext<'_>, _pov: &Actor) -> Vec<DrawIntent> {
        let mut intents = Vec::new();
        for (_, player) in ctx.world.party_in_mask(self.marked) {
            intents.push(DrawIntent::marker(player.position, ColorRole::Vulnerable));
            intents.push(DrawIntent::circle(player.position, self.config.radius, ColorRole::Danger));
        }
        intents
    }

    fn on_status(&mut self, ctx: &TickContext<'_>, event: &StatusEvent) {
        if !self.config.statuses.contains(&event.status) {
            return;
        }
        let Some(slot) = ctx.world.slot_of(event.actor) else {
            return;
        };
        match event.change {
            StatusChange::Applied => {
                if !self.marked.contains(slot) {
                    self.applied += 1;
                }
                self.marked.insert(slot);
                self.expiry[slot] = Some(Expiry {
                    created: ctx.time,
                    at: event.duration.map(|d| ctx.time + d),
                });
            }
            StatusChange::Removed => {
                self.marked.remove(slot);
                self.expiry[slot] = None;
            }
        }
    }

    fn progress(&self) -> Progress {
        Progress {
            resolved: self.applied > 0 && self.marked.is_empty(),
            count: self.applied,
        }
    }
}
