pub mod arena;
pub mod components;
pub mod config;
pub mod draw;
pub mod dsl;
pub mod error;
pub mod events;
pub mod geometry;
pub mod hints;
pub mod mechanics;
pub mod module;
pub mod phase;
pub mod serde_defaults;
pub mod world;

#[cfg(test)]
mod module_tests;

// Re-exports for convenience
pub use arena::ArenaBounds;
pub use components::{Component, ComponentEntry, ComponentRegistry, Progress, TickContext};
pub use config::{ConfigError, EngineConfig, EngineConfigExt};
pub use draw::DrawIntent;
pub use dsl::{ComponentDefinition, DslError, EncounterDefinition, load_encounters};
pub use error::{EngineError, MechanicError};
pub use events::{CastEvent, CastKind, EncounterEvent, EnvControlEvent, IconEvent, StatusChange, StatusEvent};
pub use geometry::{Angle, Shape};
pub use hints::{Activation, ActorHints, ForbiddenZone, TargetHint, ZoneStatus};
pub use mechanics::MechanicConfig;
pub use module::{EncounterModule, TickInput, TickReport};
pub use phase::{Guard, Outcome, PhaseChange, PhaseDefinition, PhaseMachine};
pub use world::{Actor, ActorId, WorldSnapshot, WorldState};
