//! Transition guards
//!
//! Guards read three things only: encounter/phase timers, the published
//! [`Progress`](crate::components::Progress) of components, and
//! the read-only world.

use serde::{Deserialize, Serialize};

use crate::components::ComponentRegistry;
use crate::world::WorldState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Guard {
    // ─── Timers ────────────────────────────────────────────────────────────

    /// Seconds since the current phase was entered
    PhaseTimeAtLeast { secs: f32 },

    /// Seconds since encounter start
    EncounterTimeAtLeast { secs: f32 },

    // ─── Component completion ──────────────────────────────────────────────

    /// Named component reports resolved
    ComponentResolved { component: String },

    /// Named component's counter reached `count`
    ComponentCountAtLeast { component: String, count: u32 },

    // ─── External / world ──────────────────────────────────────────────────

    /// Explicit force-advance signal from the driver
    ForceAdvance,

    /// Primary enemy is dead
    PrimaryDead,

    /// Every bound party member is dead
    PartyDead,

    // ─── Composition ───────────────────────────────────────────────────────

    /// Any condition suffices (OR logic)
    AnyOf { conditions: Vec<Guard> },

    /// Every condition must hold (AND logic)
    AllOf { conditions: Vec<Guard> },
}

/// Everything a guard may look at for one evaluation
pub struct GuardInput<'a> {
    pub encounter_time: f32,
    pub time_in_phase: f32,
    pub force_advance: bool,
    pub registry: &'a ComponentRegistry,
    pub world: &'a dyn WorldState,
}

impl Guard {
    pub fn is_satisfied(&self, input: &GuardInput<'_>) -> bool {
        match self {
            Self::PhaseTimeAtLeast { secs } => input.time_in_phase >= *secs,
            Self::EncounterTimeAtLeast { secs } => input.encounter_time >= *secs,
            Self::ComponentResolved { component } => input
                .registry
                .progress(component)
                .is_some_and(|p| p.resolved),
            Self::ComponentCountAtLeast { component, count } => input
                .registry
                .progress(component)
                .is_some_and(|p| p.count >= *count),
            Self::ForceAdvance => input.force_advance,
            Self::PrimaryDead => input.world.primary_actor().is_some_and(|a| a.dead),
            Self::PartyDead => input.world.party_wiped(),
            Self::AnyOf { conditions } => conditions.iter().any(|c| c.is_satisfied(input)),
            Self::AllOf { conditions } => {
                !conditions.is_empty() && conditions.iter().all(|c| c.is_satisfied(input))
            }
        }
    }

    /// Component tags this guard reads, including nested conditions
    pub fn referenced_components(&self) -> Vec<&str> {
        match self {
            Self::ComponentResolved { component } | Self::ComponentCountAtLeast { component, .. } => {
                vec![component.as_str()]
            }
            Self::AnyOf { conditions } | Self::AllOf { conditions } => conditions
                .iter()
                .flat_map(|c| c.referenced_components())
                .collect(),
            _ => Vec::new(),
        }
    }
}
