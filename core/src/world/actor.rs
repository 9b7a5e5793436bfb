//! Actor snapshot types

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use waymark_types::Role;

use super::{ActionId, Oid, StatusId};
use crate::geometry::Angle;

/// Stable numeric identity of an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

/// Hit points, including damage/healing already in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hp {
    pub current: i64,
    pub max: i64,
    /// Sum of pending deltas (negative for incoming damage)
    #[serde(default)]
    pub pending: i64,
}

impl Hp {
    pub fn new(current: i64, max: i64) -> Self {
        Self {
            current,
            max,
            pending: 0,
        }
    }

    /// HP fraction (0.0-1.0) after pending deltas land
    pub fn predicted_fraction(&self) -> f32 {
        if self.max > 0 {
            ((self.current + self.pending) as f32 / self.max as f32).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorStatus {
    pub id: StatusId,
    #[serde(default)]
    pub stacks: u16,
    /// Seconds left, 0 for permanent statuses
    #[serde(default)]
    pub remaining: f32,
}

/// Cast in progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastInfo {
    pub action: ActionId,
    #[serde(default)]
    pub target: Option<ActorId>,
    #[serde(default)]
    pub location: Option<Vec2>,
    #[serde(default)]
    pub total: f32,
    #[serde(default)]
    pub elapsed: f32,
}

impl CastInfo {
    pub fn remaining(&self) -> f32 {
        (self.total - self.elapsed).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    #[serde(default)]
    pub oid: Oid,
    #[serde(default)]
    pub name: String,
    pub position: Vec2,
    /// Facing
    #[serde(default)]
    pub rotation: Angle,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub hp: Hp,
    #[serde(default)]
    pub statuses: Vec<ActorStatus>,
    #[serde(default)]
    pub target: Option<ActorId>,
    #[serde(default = "crate::serde_defaults::default_true")]
    pub targetable: bool,
    #[serde(default)]
    pub dead: bool,
    #[serde(default)]
    pub hitbox_radius: f32,
    #[serde(default)]
    pub cast: Option<CastInfo>,
}

impl Actor {
    pub fn new(id: ActorId, position: Vec2) -> Self {
        Self {
            id,
            oid: 0,
            name: String::new(),
            position,
            rotation: Angle::ZERO,
            role: Role::None,
            hp: Hp::default(),
            statuses: Vec::new(),
            target: None,
            targetable: true,
            dead: false,
            hitbox_radius: 0.0,
            cast: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_oid(mut self, oid: Oid) -> Self {
        self.oid = oid;
        self
    }

    pub fn with_rotation(mut self, rotation: Angle) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_target(mut self, target: ActorId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_cast(mut self, cast: CastInfo) -> Self {
        self.cast = Some(cast);
        self
    }

    pub fn find_status(&self, id: StatusId) -> Option<&ActorStatus> {
        self.statuses.iter().find(|s| s.id == id)
    }

    pub fn is_casting(&self, actions: &[ActionId]) -> bool {
        self.cast.as_ref().is_some_and(|c| actions.contains(&c.action))
    }

    /// Unit vector the actor is facing
    pub fn forward(&self) -> Vec2 {
        self.rotation.to_direction()
    }
}
