//! Encounter events
//!
//! Events are transient: each one is delivered once per tick to every active
//! component and is not retained afterwards. Components that need a field
//! later copy it into their own state.

mod dispatch;

pub use dispatch::dispatch;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::world::{ActionId, ActorId, FeatureId, IconId, StatusId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastKind {
    Started,
    Completed,
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastEvent {
    pub caster: ActorId,
    pub action: ActionId,
    pub kind: CastKind,
    #[serde(default)]
    pub target: Option<ActorId>,
    #[serde(default)]
    pub location: Option<Vec2>,
    /// Cast time in seconds, for started casts
    #[serde(default)]
    pub duration: Option<f32>,
    /// Sequence number of the cast's effect, shared by redeliveries of it.
    /// Instant casts repeated by one caster need it to count separately.
    #[serde(default)]
    pub sequence: Option<u32>,
}

impl CastEvent {
    pub fn is_action(&self, actions: &[ActionId]) -> bool {
        actions.contains(&self.action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusChange {
    Applied,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub actor: ActorId,
    pub status: StatusId,
    pub change: StatusChange,
    #[serde(default)]
    pub stacks: u16,
    /// Seconds until the status expires, for applied statuses
    #[serde(default)]
    pub duration: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconEvent {
    pub actor: ActorId,
    pub icon: IconId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvControlEvent {
    pub feature: FeatureId,
    #[serde(default)]
    pub index: u8,
    pub state: u32,
}

/// Everything a component can react to besides the per-tick snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum EncounterEvent {
    Cast(CastEvent),
    Status(StatusEvent),
    Icon(IconEvent),
    EnvControl(EnvControlEvent),
    /// The actor left the world; components drop any reference to it
    ActorRemoved { actor: ActorId },
}

impl EncounterEvent {
    /// Short name for logging
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Cast(_) => "cast",
            Self::Status(_) => "status",
            Self::Icon(_) => "icon",
            Self::EnvControl(_) => "env_control",
            Self::ActorRemoved { .. } => "actor_removed",
        }
    }
}
