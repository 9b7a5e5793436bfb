//! Raid-wide damage announced by a cast bar
//!
//! Nothing to dodge; every party member is told while the cast is running.
//! A cast already on the primary's bar counts too, so activating the
//! component mid-cast still warns.

use serde::{Deserialize, Serialize};

use crate::components::{Component, Progress, TickContext};
use crate::events::{CastEvent, CastKind};
use crate::world::{ActionId, Actor, ActorId};

use super::SeenCasts;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaidwideConfig {
    pub actions: Vec<ActionId>,
    #[serde(default = "default_hint")]
    pub hint: String,
    /// Completed casts until resolved; 0 never resolves
    #[serde(default)]
    pub expected: u32,
}

fn default_hint() -> String {
    "Raidwide".to_string()
}

pub struct Raidwide {
    config: RaidwideConfig,
    casting: Vec<ActorId>,
    completed: u32,
    seen: SeenCasts,
}

impl Raidwide {
    pub fn new(config: RaidwideConfig) -> Self {
        Self {
            config,
            casting: Vec::new(),
            completed: 0,
            seen: SeenCasts::default(),
        }
    }
}

impl Component for Raidwide {
    fn text_hints(&self, ctx: &TickContext<'_>, _slot: usize, _actor: &Actor) -> Vec<String> {
        let primary_casting = ctx.primary().is_some_and(|p| p.is_casting(&self.config.actions));
        if self.casting.is_empty() && !primary_casting {
            Vec::new()
        } else {
            vec![self.config.hint.clone()]
        }
    }

    fn on_cast(&mut self, _ctx: &TickContext<'_>, event: &CastEvent) {
        if !event.is_action(&self.config.actions) {
            return;
        }
        let fresh = self.seen.completion(event);
        match event.kind {
            CastKind::Started => {
                if !self.casting.contains(&event.caster) {
                    self.casting.push(event.caster);
                }
            }
            CastKind::Completed | CastKind::Interrupted => {
                self.casting.retain(|c| *c != event.caster);
                if fresh {
                    self.completed += 1;
                }
            }
        }
    }

    fn on_actor_removed(&mut self, actor: ActorId) {
        self.casting.retain(|c| *c != actor);
    }

    fn progress(&self) -> Progress {
        Progress::counting(self.completed, self.config.expected)
    }
}
