//! Per-actor hints and forbidden zones
//!
//! The aggregator unions every contributing component's output for one party
//! member. Union, not override: overlapping or identical zones from
//! independent components are all returned, in registration order. Target
//! hints are the exception: several components rating the same enemy merge
//! into one entry.

mod aggregator;

pub use aggregator::hints_for;

use serde::{Deserialize, Serialize};

use crate::geometry::Shape;
use crate::world::ActorId;

/// When a zone starts to hurt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Dangerous for as long as the owning component reports it
    Always,
    /// Resolves at this encounter time (seconds)
    At(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneStatus {
    /// Deadline still ahead
    #[default]
    Imminent,
    /// Deadline passed; the owning component has not dropped it yet
    Expired,
    /// Never expires
    Persistent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForbiddenZone {
    pub shape: Shape,
    pub activation: Activation,
    /// Tag of the component that produced the zone
    pub source: String,
    pub status: ZoneStatus,
}

impl ForbiddenZone {
    /// Zone resolving at `deadline`, for a hazard first seen at `created_at`.
    /// The deadline is clamped so it never precedes the creation time.
    pub fn at(shape: Shape, deadline: f32, created_at: f32) -> Self {
        Self {
            shape,
            activation: Activation::At(deadline.max(created_at)),
            source: String::new(),
            status: ZoneStatus::Imminent,
        }
    }

    pub fn always(shape: Shape) -> Self {
        Self {
            shape,
            activation: Activation::Always,
            source: String::new(),
            status: ZoneStatus::Persistent,
        }
    }

    pub fn deadline(&self) -> Option<f32> {
        match self.activation {
            Activation::Always => None,
            Activation::At(t) => Some(t),
        }
    }

    pub fn status_at(&self, now: f32) -> ZoneStatus {
        match self.activation {
            Activation::Always => ZoneStatus::Persistent,
            Activation::At(t) if t < now => ZoneStatus::Expired,
            Activation::At(_) => ZoneStatus::Imminent,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.status == ZoneStatus::Expired
    }
}

/// Priority below which an enemy should not be attacked at all
pub const PRIORITY_FORBIDDEN: i32 = -1;

/// How one party member should treat one enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHint {
    pub actor: ActorId,
    /// Higher is attacked first; [`PRIORITY_FORBIDDEN`] means hold off
    pub priority: i32,
    /// This member should hold the enemy's attention
    #[serde(default)]
    pub should_tank: bool,
    /// Take the enemy over with a provoke rather than waiting for it
    #[serde(default)]
    pub prefer_provoking: bool,
}

impl TargetHint {
    pub fn new(actor: ActorId, priority: i32) -> Self {
        Self {
            actor,
            priority,
            should_tank: false,
            prefer_provoking: false,
        }
    }

    /// Combine with another rating of the same enemy
    pub fn merge(&mut self, other: &TargetHint) {
        self.priority = self.priority.max(other.priority);
        self.should_tank |= other.should_tank;
        self.prefer_provoking |= other.prefer_provoking;
    }
}

/// Everything one party member is told this tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorHints {
    pub text: Vec<String>,
    pub zones: Vec<ForbiddenZone>,
    /// One entry per rated enemy, in first-rated order
    #[serde(default)]
    pub targets: Vec<TargetHint>,
}

impl ActorHints {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.zones.is_empty() && self.targets.is_empty()
    }

    pub fn target(&self, actor: ActorId) -> Option<&TargetHint> {
        self.targets.iter().find(|t| t.actor == actor)
    }

    /// Whether `point` lies in any zone that has not expired
    pub fn is_forbidden(&self, point: glam::Vec2) -> bool {
        self.zones
            .iter()
            .any(|z| !z.is_expired() && z.shape.contains(point))
    }
}
