use std::collections::VecDeque;

use hashbrown::HashMap;
use serde::Serialize;

use super::{GuardInput, Outcome, PhaseDefinition};
use crate::components::ComponentRegistry;
use crate::error::EngineError;
use crate::world::WorldState;

/// One taken transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseChange {
    pub from: String,
    pub to: String,
    /// Encounter time of the transition
    pub at: f32,
}

#[derive(Debug, Clone)]
pub struct PhaseMachine {
    phases: Vec<PhaseDefinition>,
    initial: usize,
    current: usize,
    entered_at: f32,
    force_advance: bool,
    history: Vec<PhaseChange>,
}

impl PhaseMachine {
    /// Validate the phase graph against the registry. The machine is not
    /// started; call [`start`](Self::start) before the first tick.
    pub fn new(phases: Vec<PhaseDefinition>, registry: &ComponentRegistry) -> Result<Self, EngineError> {
        let initial = validate(&phases, registry)?;
        Ok(Self {
            phases,
            initial,
            current: initial,
            entered_at: 0.0,
            force_advance: false,
            history: Vec::new(),
        })
    }

    /// Enter the initial phase at `time`, discarding all component state and
    /// history from a previous attempt.
    pub fn start(&mut self, registry: &mut ComponentRegistry, time: f32) {
        registry.restart();
        self.current = self.initial;
        self.entered_at = time;
        self.force_advance = false;
        self.history.clear();
        self.enter(registry);
    }

    pub fn current(&self) -> &PhaseDefinition {
        &self.phases[self.current]
    }

    pub fn current_name(&self) -> &str {
        &self.phases[self.current].name
    }

    pub fn time_in_phase(&self, now: f32) -> f32 {
        (now - self.entered_at).max(0.0)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.current().terminal
    }

    pub fn is_terminal(&self) -> bool {
        self.current().is_terminal()
    }

    pub fn history(&self) -> &[PhaseChange] {
        &self.history
    }

    pub fn phases(&self) -> &[PhaseDefinition] {
        &self.phases
    }

    /// Raise the external force-advance signal for the next evaluation
    pub fn force_advance(&mut self) {
        self.force_advance = true;
    }

    /// Check the current phase's transitions in declared order and take the
    /// first whose guard holds. The force-advance signal is consumed.
    pub fn evaluate(
        &mut self,
        registry: &mut ComponentRegistry,
        world: &dyn WorldState,
        now: f32,
    ) -> Option<PhaseChange> {
        let force_advance = std::mem::take(&mut self.force_advance);
        if self.is_terminal() {
            return None;
        }

        let input = GuardInput {
            encounter_time: now,
            time_in_phase: self.time_in_phase(now),
            force_advance,
            registry,
            world,
        };
        let dest = self
            .current()
            .transitions
            .iter()
            .find(|t| t.guard.is_satisfied(&input))
            .and_then(|t| self.index_of(&t.to))?;

        Some(self.transition(registry, dest, now))
    }

    fn transition(&mut self, registry: &mut ComponentRegistry, dest: usize, now: f32) -> PhaseChange {
        // Exit: phase-activated components stop unless persistent
        for tag in &self.phases[self.current].activate {
            if !registry.is_persistent(tag) {
                registry.deactivate(tag);
            }
        }

        let change = PhaseChange {
            from: self.phases[self.current].name.clone(),
            to: self.phases[dest].name.clone(),
            at: now,
        };
        tracing::debug!(from = %change.from, to = %change.to, at = now, "Phase transition");

        self.current = dest;
        self.entered_at = now;
        self.enter(registry);
        self.history.push(change.clone());
        change
    }

    fn enter(&self, registry: &mut ComponentRegistry) {
        let phase = &self.phases[self.current];
        if let Some(outcome) = phase.terminal {
            registry.deactivate_all();
            tracing::info!(phase = %phase.name, ?outcome, "Encounter ended");
            return;
        }
        for tag in &phase.deactivate {
            registry.deactivate(tag);
        }
        for tag in &phase.activate {
            registry.activate(tag);
        }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.phases.iter().position(|p| p.name == name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Validation
// ═══════════════════════════════════════════════════════════════════════════

/// Check the phase graph and return the index of the initial phase.
fn validate(phases: &[PhaseDefinition], registry: &ComponentRegistry) -> Result<usize, EngineError> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, phase) in phases.iter().enumerate() {
        if index.insert(phase.name.as_str(), i).is_some() {
            return Err(EngineError::malformed(format!("duplicate phase name '{}'", phase.name)));
        }
    }

    let initials: Vec<usize> = phases
        .iter()
        .enumerate()
        .filter(|(_, p)| p.initial)
        .map(|(i, _)| i)
        .collect();
    let initial = match initials.as_slice() {
        [only] => *only,
        [] => return Err(EngineError::malformed("no initial phase")),
        _ => {
            return Err(EngineError::malformed(format!(
                "{} phases are marked initial",
                initials.len()
            )));
        }
    };

    for phase in phases {
        if phase.is_terminal() && !phase.transitions.is_empty() {
            return Err(EngineError::malformed(format!(
                "terminal phase '{}' declares transitions",
                phase.name
            )));
        }

        let guard_tags = phase
            .transitions
            .iter()
            .flat_map(|t| t.guard.referenced_components());
        let tags = phase
            .activate
            .iter()
            .chain(&phase.deactivate)
            .map(String::as_str)
            .chain(guard_tags);
        for tag in tags {
            if !registry.contains(tag) {
                return Err(EngineError::malformed(format!(
                    "phase '{}' references unknown component '{}'",
                    phase.name, tag
                )));
            }
        }

        for transition in &phase.transitions {
            if !index.contains_key(transition.to.as_str()) {
                return Err(EngineError::malformed(format!(
                    "phase '{}' transitions to unknown phase '{}'",
                    phase.name, transition.to
                )));
            }
        }
    }

    // Reverse BFS from every terminal phase
    let mut reaches_terminal = vec![false; phases.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();
    for (i, phase) in phases.iter().enumerate() {
        if phase.is_terminal() {
            reaches_terminal[i] = true;
            queue.push_back(i);
        }
    }
    if queue.is_empty() {
        return Err(EngineError::malformed("no terminal phase"));
    }
    while let Some(target) = queue.pop_front() {
        for (i, phase) in phases.iter().enumerate() {
            if !reaches_terminal[i] && phase.transitions.iter().any(|t| index.get(t.to.as_str()) == Some(&target)) {
                reaches_terminal[i] = true;
                queue.push_back(i);
            }
        }
    }
    if let Some(stuck) = phases.iter().zip(&reaches_terminal).find(|(_, ok)| !**ok) {
        return Err(EngineError::malformed(format!(
            "phase '{}' cannot reach a terminal phase",
            stuck.0.name
        )));
    }

    Ok(initial)
}
