//! Tank swap driven by vulnerability stacks
//!
//! The primary's current target keeps tanking. The other tank takes over,
//! by provoking, once the current tank carries `swap_at` stacks of a
//! vulnerability status while the other tank carries none. Every party
//! member is also told to attack the primary at the configured priority.

use serde::{Deserialize, Serialize};
use tracing::debug;
use waymark_types::{ColorRole, Role};

use crate::components::{Component, Progress, TickContext};
use crate::draw::DrawIntent;
use crate::error::{EngineError, MechanicError};
use crate::hints::TargetHint;
use crate::world::{Actor, ActorId, StatusId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankSwapConfig {
    pub vuln_statuses: Vec<StatusId>,
    /// Stacks on the current tank that call for a swap
    #[serde(default = "default_swap_at")]
    pub swap_at: u16,
    /// Attack priority of the primary for the whole party
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_hint")]
    pub hint: String,
}

fn default_swap_at() -> u16 {
    2
}

fn default_priority() -> i32 {
    1
}

fn default_hint() -> String {
    "Provoke!".to_string()
}

impl TankSwapConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.vuln_statuses.is_empty() {
            return Err(EngineError::malformed("tank_swap needs at least one vulnerability status"));
        }
        if self.swap_at == 0 {
            return Err(EngineError::malformed("tank_swap swap_at must be at least 1"));
        }
        Ok(())
    }
}

pub struct TankSwap {
    config: TankSwapConfig,
    tank: Option<ActorId>,
    swaps: u32,
}

impl TankSwap {
    pub fn new(config: TankSwapConfig) -> Self {
        Self {
            config,
            tank: None,
            swaps: 0,
        }
    }

    /// Vulnerability stacks on `actor`. A status without a stack count is one stack.
    pub fn vuln_stacks(&self, actor: &Actor) -> u16 {
        self.config
            .vuln_statuses
            .iter()
            .filter_map(|id| actor.find_status(*id))
            .map(|s| s.stacks.max(1))
            .max()
            .unwrap_or(0)
    }

    /// Whether `actor` should provoke the primary away from the current tank
    fn should_take_over(&self, ctx: &TickContext<'_>, actor: &Actor) -> bool {
        let Some(primary) = ctx.primary() else {
            return false;
        };
        actor.role == Role::Tank
            && primary.target != Some(actor.id)
            && self.vuln_stacks(actor) == 0
            && primary
                .target
                .and_then(|id| ctx.actor(id))
                .is_some_and(|tank| self.vuln_stacks(tank) >= self.config.swap_at)
    }
}

impl Component for TankSwap {
    fn update(&mut self, ctx: &TickContext<'_>) -> Result<(), MechanicError> {
        let tank = ctx
            .primary()
            .and_then(|p| p.target)
            .filter(|id| ctx.actor(*id).is_some_and(|a| a.role == Role::Tank));
        if let (Some(previous), Some(current)) = (self.tank, tank)
            && previous != current
        {
            self.swaps += 1;
            debug!(from = %previous, to = %current, swaps = self.swaps, "Tank swapped");
        }
        if tank.is_some() {
            self.tank = tank;
        }
        Ok(())
    }

    fn text_hints(&self, ctx: &TickContext<'_>, _slot: usize, actor: &Actor) -> Vec<String> {
        if self.should_take_over(ctx, actor) {
            vec![self.config.hint.clone()]
        } else {
            Vec::new()
        }
    }

    fn target_hints(&self, ctx: &TickContext<'_>, _slot: usize, actor: &Actor) -> Vec<TargetHint> {
        let Some(primary) = ctx.primary() else {
            return Vec::new();
        };
        let mut hint = TargetHint::new(primary.id, self.config.priority);
        if actor.role == Role::Tank {
            let take_over = self.should_take_over(ctx, actor);
            // keep tanking until the other tank provokes
            hint.should_tank = primary.target == Some(actor.id) || take_over;
            hint.prefer_provoking = take_over;
        }
        vec![hint]
    }

    fn draw_intents(&self, ctx: &TickContext<'_>, _pov: &Actor) -> Vec<DrawIntent> {
        ctx.primary()
            .and_then(|p| p.target)
            .and_then(|id| ctx.actor(id))
            .filter(|tank| self.vuln_stacks(tank) >= self.config.swap_at)
            .map(|tank| DrawIntent::marker(tank.position, ColorRole::Vulnerable))
            .into_iter()
            .collect()
    }

    fn on_actor_removed(&mut self, actor: ActorId) {
        if self.tank == Some(actor) {
            self.tank = None;
        }
    }

    fn progress(&self) -> Progress {
        Progress {
            resolved: false,
            count: self.swaps,
        }
    }
}
