//! Component registry
//!
//! Holds every component of an encounter in registration order, active or
//! not. Order matters: events, updates and hint queries all walk entries in
//! the order they were registered.

use hashbrown::{HashMap, HashSet};

use super::{Component, Progress, TickContext};
use crate::error::{EngineError, MechanicError};
use crate::events::EncounterEvent;
use crate::world::ActorId;

/// Builds a fresh component. Called on every activation.
pub type ComponentFactory = Box<dyn Fn() -> Box<dyn Component>>;

/// Registration record: tag, factory and activation flags.
pub struct ComponentEntry {
    tag: String,
    factory: ComponentFactory,
    persistent: bool,
    active_at_start: bool,

    // Runtime state
    instance: Option<Box<dyn Component>>,
    faulted: bool,
    /// Missing actors already reported for this entry
    warned: HashSet<ActorId>,
}

impl ComponentEntry {
    pub fn new(tag: impl Into<String>, factory: ComponentFactory) -> Self {
        Self {
            tag: tag.into(),
            factory,
            persistent: false,
            active_at_start: false,
            instance: None,
            faulted: false,
            warned: HashSet::new(),
        }
    }

    /// Entry whose factory builds a concrete component type
    pub fn from_fn<C, F>(tag: impl Into<String>, make: F) -> Self
    where
        C: Component + 'static,
        F: Fn() -> C + 'static,
    {
        Self::new(tag, Box::new(move || Box::new(make()) as Box<dyn Component>))
    }

    /// Survive the exit of the phase that activated it
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// Active from the first tick, before any phase entry action
    pub fn active_at_start(mut self, active: bool) -> Self {
        self.active_at_start = active;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn is_active(&self) -> bool {
        self.instance.is_some()
    }

    fn activate(&mut self) {
        self.instance = Some((self.factory)());
        self.faulted = false;
        self.warned.clear();
    }

    fn deactivate(&mut self) {
        self.instance = None;
        self.faulted = false;
    }
}

impl std::fmt::Debug for ComponentEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentEntry")
            .field("tag", &self.tag)
            .field("persistent", &self.persistent)
            .field("active_at_start", &self.active_at_start)
            .field("active", &self.is_active())
            .field("faulted", &self.faulted)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct ComponentRegistry {
    entries: Vec<ComponentEntry>,
    index: HashMap<String, usize>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component. Tags are unique per encounter.
    pub fn register(&mut self, entry: ComponentEntry) -> Result<(), EngineError> {
        if self.index.contains_key(&entry.tag) {
            return Err(EngineError::malformed(format!(
                "duplicate component tag '{}'",
                entry.tag
            )));
        }
        self.index.insert(entry.tag.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.index.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, tag: &str) -> Option<&ComponentEntry> {
        self.index.get(tag).map(|&i| &self.entries[i])
    }

    fn entry_mut(&mut self, tag: &str) -> Option<&mut ComponentEntry> {
        self.index.get(tag).map(|&i| &mut self.entries[i])
    }

    pub fn is_active(&self, tag: &str) -> bool {
        self.entry(tag).is_some_and(ComponentEntry::is_active)
    }

    pub fn is_persistent(&self, tag: &str) -> bool {
        self.entry(tag).is_some_and(ComponentEntry::is_persistent)
    }

    /// Whether the component failed its update this tick
    pub fn is_faulted(&self, tag: &str) -> bool {
        self.entry(tag).is_some_and(|e| e.faulted)
    }

    /// Start a fresh instance. An already active component is recreated.
    /// Returns false for unknown tags.
    pub fn activate(&mut self, tag: &str) -> bool {
        match self.entry_mut(tag) {
            Some(entry) => {
                entry.activate();
                tracing::debug!(tag, "Component activated");
                true
            }
            None => false,
        }
    }

    /// Drop the instance and its state. Returns false for unknown tags.
    pub fn deactivate(&mut self, tag: &str) -> bool {
        match self.entry_mut(tag) {
            Some(entry) => {
                if entry.is_active() {
                    tracing::debug!(tag, "Component deactivated");
                }
                entry.deactivate();
                true
            }
            None => false,
        }
    }

    pub fn deactivate_all(&mut self) {
        for entry in &mut self.entries {
            entry.deactivate();
        }
    }

    /// Discard all state and activate the start set, as for a new attempt
    pub fn restart(&mut self) {
        for entry in &mut self.entries {
            if entry.active_at_start {
                entry.activate();
            } else {
                entry.deactivate();
            }
        }
    }

    /// Progress of an active component; `None` when unknown or inactive
    pub fn progress(&self, tag: &str) -> Option<Progress> {
        self.entry(tag)
            .and_then(|e| e.instance.as_ref())
            .map(|c| c.progress())
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.tag.as_str())
    }

    pub fn active_tags(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.is_active())
            .map(|e| e.tag.as_str())
            .collect()
    }

    // ─── Per-tick driving ────────────────────────────────────────────────────

    /// Deliver one event to every active component, in registration order.
    /// Returns the number of active components it reached.
    pub(crate) fn deliver(&mut self, event: &EncounterEvent, ctx: &TickContext<'_>) -> usize {
        let mut receivers = 0;
        for entry in &mut self.entries {
            let Some(component) = entry.instance.as_mut() else {
                continue;
            };
            receivers += 1;
            match event {
                EncounterEvent::Cast(cast) => component.on_cast(ctx, cast),
                EncounterEvent::Status(status) => component.on_status(ctx, status),
                EncounterEvent::Icon(icon) => component.on_icon(ctx, icon),
                EncounterEvent::EnvControl(env) => component.on_env_control(ctx, env),
                EncounterEvent::ActorRemoved { actor } => component.on_actor_removed(*actor),
            }
        }
        receivers
    }

    /// Run `update` on every active component. A failing component is
    /// faulted for the rest of the tick and contributes no output.
    pub fn update_all(&mut self, ctx: &TickContext<'_>) {
        for entry in &mut self.entries {
            entry.faulted = false;
            let Some(component) = entry.instance.as_mut() else {
                continue;
            };
            let Err(err) = component.update(ctx) else {
                continue;
            };
            entry.faulted = true;
            match err {
                MechanicError::MissingActor(id) => {
                    if entry.warned.insert(id) && ctx.config.warn_missing_actors {
                        tracing::warn!(tag = %entry.tag, actor = %id, "Component lost track of actor");
                    }
                }
                MechanicError::Inconsistent(reason) => {
                    tracing::warn!(tag = %entry.tag, reason, "Component state inconsistent");
                }
            }
        }
    }

    /// Active, non-faulted components with their tags, in registration order
    pub fn contributing(&self) -> impl Iterator<Item = (&str, &dyn Component)> {
        self.entries.iter().filter(|e| !e.faulted).filter_map(|e| {
            e.instance
                .as_deref()
                .map(|component| (e.tag.as_str(), component as &dyn Component))
        })
    }
}
