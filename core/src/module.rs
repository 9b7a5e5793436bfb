//! Encounter module: the per-tick driver
//!
//! Owns the component registry and the phase machine built from one
//! [`EncounterDefinition`]. Every tick runs in a fixed order:
//!
//! 1. dispatch the tick's events to active components
//! 2. `update` every active component
//! 3. query hints for every party slot and draw intents for the point of view
//! 4. evaluate the phase machine
//!
//! Hints therefore describe the phase the tick started in; components a
//! transition activates contribute from the next tick on.

use serde::Serialize;
use tracing::{debug, info};

use crate::arena::ArenaBounds;
use crate::components::{ComponentEntry, ComponentRegistry, TickContext};
use crate::config::EngineConfig;
use crate::draw::DrawIntent;
use crate::dsl::EncounterDefinition;
use crate::error::EngineError;
use crate::events::{EncounterEvent, dispatch};
use crate::hints::{self, ActorHints};
use crate::phase::{Outcome, PhaseChange, PhaseMachine};
use crate::world::{Oid, WorldState};

// ═══════════════════════════════════════════════════════════════════════════
// Tick Input / Output
// ═══════════════════════════════════════════════════════════════════════════

/// Everything the driver hands the module for one tick
#[derive(Debug, Clone, Copy)]
pub struct TickInput<'a> {
    /// Encounter-relative time in seconds
    pub time: f32,
    /// Events observed since the previous tick, in arrival order
    pub events: &'a [EncounterEvent],
    /// Party slot whose view the draw intents are produced for
    pub pov: Option<usize>,
}

impl<'a> TickInput<'a> {
    pub fn new(time: f32, events: &'a [EncounterEvent]) -> Self {
        Self {
            time,
            events,
            pov: None,
        }
    }

    pub fn with_pov(mut self, slot: usize) -> Self {
        self.pov = Some(slot);
        self
    }
}

/// Outputs of one tick
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    pub time: f32,
    /// Hints per bound party slot, ascending by slot
    pub hints: Vec<(usize, ActorHints)>,
    pub draw_intents: Vec<DrawIntent>,
    /// Phase after this tick's evaluation
    pub phase: String,
    pub time_in_phase: f32,
    pub outcome: Option<Outcome>,
    /// Transitions taken this tick (at most one)
    pub phase_changes: Vec<PhaseChange>,
}

impl TickReport {
    pub fn hints_for_slot(&self, slot: usize) -> Option<&ActorHints> {
        self.hints.iter().find(|(s, _)| *s == slot).map(|(_, h)| h)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Encounter Module
// ═══════════════════════════════════════════════════════════════════════════

pub struct EncounterModule {
    id: String,
    name: String,
    primary_oid: Oid,
    arena: ArenaBounds,
    config: EngineConfig,
    registry: ComponentRegistry,
    machine: PhaseMachine,
}

impl EncounterModule {
    /// Validate and build a module. Arena, mechanic tunables, component tags
    /// and the phase graph are all checked here; nothing is checked later.
    /// The module starts in its initial phase at time 0.
    pub fn from_definition(def: EncounterDefinition, config: EngineConfig) -> Result<Self, EngineError> {
        def.arena.validate()?;

        let mut registry = ComponentRegistry::new();
        for component in &def.components {
            component.mechanic.validate().map_err(|e| match e {
                EngineError::MalformedConfiguration { reason } => {
                    EngineError::malformed(format!("component '{}': {}", component.tag, reason))
                }
                other => other,
            })?;
            registry.register(
                ComponentEntry::new(component.tag.clone(), component.mechanic.factory())
                    .persistent(component.persistent)
                    .active_at_start(component.active_at_start),
            )?;
        }

        let mut machine = PhaseMachine::new(def.phases, &registry)?;
        machine.start(&mut registry, 0.0);

        info!(
            id = %def.id,
            components = registry.len(),
            phases = machine.phases().len(),
            initial = machine.current_name(),
            "Encounter module built"
        );

        Ok(Self {
            name: if def.name.is_empty() { def.id.clone() } else { def.name },
            id: def.id,
            primary_oid: def.primary_oid,
            arena: def.arena,
            config,
            registry,
            machine,
        })
    }

    /// Run one tick
    pub fn tick(&mut self, world: &dyn WorldState, input: &TickInput<'_>) -> TickReport {
        let ctx = TickContext::new(world, &self.arena, &self.config, input.time);

        for event in input.events {
            dispatch(event, &mut self.registry, &ctx);
        }
        self.registry.update_all(&ctx);

        let hints = world
            .party()
            .into_iter()
            .map(|(slot, actor)| (slot, hints::hints_for(&self.registry, &ctx, slot, actor)))
            .collect();

        let draw_intents = match input.pov.and_then(|slot| world.party_member(slot)) {
            Some(pov) => self
                .registry
                .contributing()
                .flat_map(|(_, component)| component.draw_intents(&ctx, pov))
                .collect(),
            None => Vec::new(),
        };

        let phase_changes: Vec<PhaseChange> = self
            .machine
            .evaluate(&mut self.registry, world, input.time)
            .into_iter()
            .collect();

        TickReport {
            time: input.time,
            hints,
            draw_intents,
            phase: self.machine.current_name().to_string(),
            time_in_phase: self.machine.time_in_phase(input.time),
            outcome: self.machine.outcome(),
            phase_changes,
        }
    }

    /// Hints for one party slot against the current component state, outside
    /// the tick loop. `None` if the slot is not bound.
    pub fn hints_for(&self, world: &dyn WorldState, slot: usize, time: f32) -> Option<ActorHints> {
        let actor = world.party_member(slot)?;
        let ctx = TickContext::new(world, &self.arena, &self.config, time);
        Some(hints::hints_for(&self.registry, &ctx, slot, actor))
    }

    /// Draw intents as seen by `pov`
    pub fn draw_intents(&self, world: &dyn WorldState, pov: usize, time: f32) -> Vec<DrawIntent> {
        let Some(actor) = world.party_member(pov) else {
            return Vec::new();
        };
        let ctx = TickContext::new(world, &self.arena, &self.config, time);
        self.registry
            .contributing()
            .flat_map(|(_, component)| component.draw_intents(&ctx, actor))
            .collect()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_oid(&self) -> Oid {
        self.primary_oid
    }

    pub fn arena(&self) -> &ArenaBounds {
        &self.arena
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn phase_name(&self) -> &str {
        self.machine.current_name()
    }

    pub fn time_in_phase(&self, now: f32) -> f32 {
        self.machine.time_in_phase(now)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.machine.outcome()
    }

    pub fn history(&self) -> &[PhaseChange] {
        self.machine.history()
    }

    /// Raise the external force-advance signal for the next tick
    pub fn force_advance(&mut self) {
        self.machine.force_advance();
    }

    /// Start a new attempt at `time`: every component state is discarded
    pub fn reset(&mut self, time: f32) {
        debug!(id = %self.id, time, "Encounter reset");
        self.machine.start(&mut self.registry, time);
    }
}
