//! Tethered players that must stay close to each other
//!
//! A status links party members; each of them stays within the radius of its
//! partner (the first other linked member) until the status is removed.

use serde::{Deserialize, Serialize};
use waymark_types::{ColorRole, SlotMask};

use crate::components::{Component, Progress, TickContext};
use crate::draw::DrawIntent;
use crate::events::{StatusChange, StatusEvent};
use crate::geometry::Shape;
use crate::hints::ForbiddenZone;
use crate::world::{Actor, StatusId};

const HINT_STAY_NEAR: &str = "Stay near partner!";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TetherConfig {
    pub statuses: Vec<StatusId>,
    #[serde(default = "default_radius")]
    pub radius: f32,
}

fn default_radius() -> f32 {
    5.0
}

pub struct Tether {
    config: TetherConfig,
    members: SlotMask,
    linked: u32,
}

impl Tether {
    pub fn new(config: TetherConfig) -> Self {
        Self {
            config,
            members: SlotMask::EMPTY,
            linked: 0,
        }
    }

    pub fn members(&self) -> SlotMask {
        self.members
    }

    fn partner<'a>(&self, ctx: &TickContext<'a>, slot: usize) -> Option<&'a Actor> {
        if !self.members.contains(slot) {
            return None;
        }
        ctx.world
            .party_in_mask(self.members)
            .into_iter()
            .find(|(s, _)| *s != slot)
            .map(|(_, p)| p)
    }
}

impl Component for Tether {
    fn text_hints(&self, ctx: &TickContext<'_>, slot: usize, actor: &Actor) -> Vec<String> {
        match self.partner(ctx, slot) {
            Some(partner) if partner.position.distance(actor.position) > self.config.radius => {
                vec![HINT_STAY_NEAR.to_string()]
            }
            _ => Vec::new(),
        }
    }

    fn forbidden_zones(&self, ctx: &TickContext<'_>, slot: usize, _actor: &Actor) -> Vec<ForbiddenZone> {
        self.partner(ctx, slot)
            .map(|p| ForbiddenZone::always(Shape::inverted_circle(p.position, self.config.radius)))
            .into_iter()
            .collect()
    }

    fn draw_intents(&self, ctx: &TickContext<'_>, _pov: &Actor) -> Vec<DrawIntent> {
        let linked = ctx.world.party_in_mask(self.members);
        linked
            .windows(2)
            .map(|w| DrawIntent::line(w[0].1.position, w[1].1.position, ColorRole::Danger))
            .collect()
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
                if !self.members.contains(slot) {
                    self.linked += 1;
                }
                self.members.insert(slot);
            }
            StatusChange::Removed => self.members.remove(slot),
        }
    }

    fn progress(&self) -> Progress {
        Progress {
            resolved: self.linked > 0 && self.members.is_empty(),
            count: self.linked,
        }
    }
}
