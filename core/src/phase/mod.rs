//! Phase state machine
//!
//! Phases are named nodes with an entry action (components to activate and
//! deactivate) and ordered, guarded transitions. Each tick the current
//! phase's transitions are checked in declared order and the first whose
//! guard holds is taken. At most one transition happens per tick.
//!
//! Terminal phases end the attempt: entering one deactivates every
//! component, and no transition is evaluated afterwards.

mod guard;
mod machine;

#[cfg(test)]
mod machine_tests;

pub use guard::{Guard, GuardInput};
pub use machine::{PhaseChange, PhaseMachine};

use serde::{Deserialize, Serialize};

/// How a terminal phase ends the encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Cleared,
    Wiped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Destination phase name
    pub to: String,
    pub guard: Guard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    /// Unique within the encounter
    pub name: String,

    /// The encounter starts here. Exactly one phase must set this.
    #[serde(default)]
    pub initial: bool,

    #[serde(default)]
    pub terminal: Option<Outcome>,

    /// Component tags started on entry. Non-persistent ones stop on exit.
    #[serde(default)]
    pub activate: Vec<String>,

    /// Component tags stopped on entry
    #[serde(default)]
    pub deactivate: Vec<String>,

    #[serde(default, rename = "transition")]
    pub transitions: Vec<Transition>,
}

impl PhaseDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial: false,
            terminal: None,
            activate: Vec::new(),
            deactivate: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn initial(mut self) -> Self {
        self.initial = true;
        self
    }

    pub fn terminal(mut self, outcome: Outcome) -> Self {
        self.terminal = Some(outcome);
        self
    }

    pub fn activating(mut self, tag: impl Into<String>) -> Self {
        self.activate.push(tag.into());
        self
    }

    pub fn deactivating(mut self, tag: impl Into<String>) -> Self {
        self.deactivate.push(tag.into());
        self
    }

    pub fn transition(mut self, to: impl Into<String>, guard: Guard) -> Self {
        self.transitions.push(Transition { to: to.into(), guard });
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }
}
