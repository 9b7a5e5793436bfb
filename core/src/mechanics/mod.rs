//! Library of generic mechanic components
//!
//! Each mechanic is a plain config struct (deserialized from the encounter
//! definition) plus a component built from it. Every tunable lives in the
//! config instance; two encounters using the same mechanic never share state.

mod add_priority;
mod bait_away;
mod cast_aoe;
mod charge;
mod gaze;
mod knockback;
mod marked_spread;
mod raidwide;
mod role_spots;
mod stack_spread;
mod tank_swap;
mod tether;

#[cfg(test)]
mod test_support;

pub use add_priority::{AddPriority, AddPriorityConfig, AddRule};
pub use bait_away::{BaitAwayCharge, BaitAwayChargeConfig};
pub use cast_aoe::{AoeTargeting, CastAoe, CastAoeConfig};
pub use charge::{ChargeLanes, ChargeLanesConfig, ChargePath, ChargePathBuilder};
pub use gaze::{Gaze, GazeConfig};
pub use knockback::{Knockback, KnockbackConfig, KnockbackMode, predict_landing};
pub use marked_spread::{MarkedSpread, MarkedSpreadConfig};
pub use raidwide::{Raidwide, RaidwideConfig};
pub use role_spots::{RoleSpot, RoleSpots, RoleSpotsConfig};
pub use stack_spread::{StackSpread, StackSpreadConfig};
pub use tank_swap::{TankSwap, TankSwapConfig};
pub use tether::{Tether, TetherConfig};

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::{Component, ComponentFactory};
use crate::error::EngineError;
use crate::events::{CastEvent, CastKind};
use crate::geometry::{Angle, Shape};
use crate::world::{ActionId, ActorId};

// ═══════════════════════════════════════════════════════════════════════════
// Mechanic Config
// ═══════════════════════════════════════════════════════════════════════════

/// Any mechanic the engine knows how to build, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MechanicConfig {
    Knockback(KnockbackConfig),
    StackSpread(StackSpreadConfig),
    ChargeLanes(ChargeLanesConfig),
    Gaze(GazeConfig),
    CastAoe(CastAoeConfig),
    BaitAwayCharge(BaitAwayChargeConfig),
    MarkedSpread(MarkedSpreadConfig),
    Tether(TetherConfig),
    Raidwide(RaidwideConfig),
    TankSwap(TankSwapConfig),
    AddPriority(AddPriorityConfig),
    RoleSpots(RoleSpotsConfig),
}

impl MechanicConfig {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Knockback(_) => "knockback",
            Self::StackSpread(_) => "stack_spread",
            Self::ChargeLanes(_) => "charge_lanes",
            Self::Gaze(_) => "gaze",
            Self::CastAoe(_) => "cast_aoe",
            Self::BaitAwayCharge(_) => "bait_away_charge",
            Self::MarkedSpread(_) => "marked_spread",
            Self::Tether(_) => "tether",
            Self::Raidwide(_) => "raidwide",
            Self::TankSwap(_) => "tank_swap",
            Self::AddPriority(_) => "add_priority",
            Self::RoleSpots(_) => "role_spots",
        }
    }

    /// Reject tunables no mechanic can work with
    pub fn validate(&self) -> Result<(), EngineError> {
        let lengths: &[(&str, f32)] = match self {
            Self::Knockback(c) => &[
                ("distance", c.distance),
                ("stack_radius", c.stack_radius),
                ("spread_radius", c.spread_radius),
            ],
            Self::StackSpread(c) => &[("stack_radius", c.stack_radius), ("spread_radius", c.spread_radius)],
            Self::ChargeLanes(c) => &[
                ("half_width", c.half_width),
                ("sphere_radius", c.sphere_radius),
                ("rim_radius", c.rim_radius),
            ],
            Self::Gaze(c) => &[("rim_radius", c.rim_radius)],
            Self::CastAoe(c) => return c.shape.validate(),
            Self::BaitAwayCharge(c) => &[("half_width", c.half_width)],
            Self::MarkedSpread(c) => &[("radius", c.radius)],
            Self::Tether(c) => &[("radius", c.radius)],
            Self::Raidwide(_) => &[],
            Self::TankSwap(c) => return c.validate(),
            Self::AddPriority(c) => return c.validate(),
            Self::RoleSpots(c) => {
                c.validate()?;
                &[("radius", c.radius)]
            }
        };
        for (name, value) in lengths {
            if !(value.is_finite() && *value > 0.0) {
                return Err(EngineError::malformed(format!(
                    "{} {} must be positive, got {}",
                    self.kind_name(),
                    name,
                    value
                )));
            }
        }
        Ok(())
    }

    /// Factory producing a fresh component from a copy of this config
    pub fn factory(&self) -> ComponentFactory {
        fn boxed<C: Component + 'static>(c: C) -> Box<dyn Component> {
            Box::new(c)
        }

        match self.clone() {
            Self::Knockback(c) => Box::new(move || boxed(Knockback::new(c.clone()))),
            Self::StackSpread(c) => Box::new(move || boxed(StackSpread::new(c.clone()))),
            Self::ChargeLanes(c) => Box::new(move || boxed(ChargeLanes::new(c.clone()))),
            Self::Gaze(c) => Box::new(move || boxed(Gaze::new(c.clone()))),
            Self::CastAoe(c) => Box::new(move || boxed(CastAoe::new(c.clone()))),
            Self::BaitAwayCharge(c) => Box::new(move || boxed(BaitAwayCharge::new(c.clone()))),
            Self::MarkedSpread(c) => Box::new(move || boxed(MarkedSpread::new(c.clone()))),
            Self::Tether(c) => Box::new(move || boxed(Tether::new(c.clone()))),
            Self::Raidwide(c) => Box::new(move || boxed(Raidwide::new(c.clone()))),
            Self::TankSwap(c) => Box::new(move || boxed(TankSwap::new(c.clone()))),
            Self::AddPriority(c) => Box::new(move || boxed(AddPriority::new(c.clone()))),
            Self::RoleSpots(c) => Box::new(move || boxed(RoleSpots::new(c.clone()))),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// AOE Shapes
// ═══════════════════════════════════════════════════════════════════════════

/// Shape of an AOE relative to its origin and facing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum AoeShape {
    Circle { radius: f32 },
    Donut { inner: f32, outer: f32 },
    Cone { length: f32, half_angle_deg: f32 },
    /// Lane starting at the origin along the facing
    Rect { length: f32, half_width: f32 },
}

impl AoeShape {
    /// Concrete hazard at `origin` facing `rotation`
    pub fn at(&self, origin: Vec2, rotation: Angle) -> Shape {
        match *self {
            Self::Circle { radius } => Shape::circle(origin, radius),
            Self::Donut { inner, outer } => Shape::donut(origin, inner, outer),
            Self::Cone { length, half_angle_deg } => {
                Shape::cone(origin, rotation, Angle::degrees(half_angle_deg), length)
            }
            Self::Rect { length, half_width } => {
                Shape::rect(origin, origin + rotation.to_direction() * length, half_width)
            }
        }
    }

    fn validate(&self) -> Result<(), EngineError> {
        let ok = match *self {
            Self::Circle { radius } => radius > 0.0,
            Self::Donut { inner, outer } => inner >= 0.0 && outer > inner,
            Self::Cone { length, half_angle_deg } => length > 0.0 && half_angle_deg > 0.0 && half_angle_deg <= 180.0,
            Self::Rect { length, half_width } => length > 0.0 && half_width > 0.0,
        };
        if ok {
            Ok(())
        } else {
            Err(EngineError::malformed(format!("degenerate aoe shape {:?}", self)))
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Redelivery Guard
// ═══════════════════════════════════════════════════════════════════════════

const SEEN_CAPACITY: usize = 64;

/// Remembers counted cast completions so a redelivered event is not counted
/// twice, on the same tick or a later one.
///
/// A completion is keyed by caster, action and sequence number. Without a
/// sequence number the key stays until the caster starts that action again.
#[derive(Debug, Clone, Default)]
struct SeenCasts {
    counted: VecDeque<(ActorId, ActionId, Option<u32>)>,
}

impl SeenCasts {
    /// Feed every cast event; true only for a completion not counted before
    fn completion(&mut self, event: &CastEvent) -> bool {
        match event.kind {
            CastKind::Started => {
                self.counted.retain(|&(caster, action, sequence)| {
                    caster != event.caster || action != event.action || sequence.is_some()
                });
                false
            }
            CastKind::Interrupted => false,
            CastKind::Completed => {
                let key = (event.caster, event.action, event.sequence);
                if self.counted.contains(&key) {
                    return false;
                }
                if self.counted.len() == SEEN_CAPACITY {
                    self.counted.pop_front();
                }
                self.counted.push_back(key);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configs_parse_by_kind() {
        let config: MechanicConfig = toml::from_str(
            r#"
            kind = "cast_aoe"
            actions = [12205]
            targeting = "self"
            shape = { type = "cone", length = 15.0, half_angle_deg = 45.0 }
            "#,
        )
        .unwrap();
        assert_eq!(config.kind_name(), "cast_aoe");
        assert!(config.validate().is_ok());

        let bad: MechanicConfig = toml::from_str(
            r#"
            kind = "tether"
            statuses = [1]
            radius = 0.0
            "#,
        )
        .unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn targeting_mechanics_parse_by_kind() {
        let swap: MechanicConfig = toml::from_str(
            r#"
            kind = "tank_swap"
            vuln_statuses = [0x18E]
            "#,
        )
        .unwrap();
        assert_eq!(swap.kind_name(), "tank_swap");
        assert!(swap.validate().is_ok());

        let adds: MechanicConfig = toml::from_str(
            r#"
            kind = "add_priority"
            adds = [{ oid = 0x4E1, keep_above = 0.5 }, { oid = 0x4E2 }]
            "#,
        )
        .unwrap();
        assert_eq!(adds.kind_name(), "add_priority");
        assert!(adds.validate().is_ok());

        let spots: MechanicConfig = toml::from_str(
            r#"
            kind = "role_spots"
            radius = 0.0
            spots = [{ roles = ["healer"], inward = 11.5 }]
            "#,
        )
        .unwrap();
        assert!(spots.validate().is_err());
    }

    #[test]
    fn rect_aoe_extends_along_facing() {
        let shape = AoeShape::Rect {
            length: 10.0,
            half_width: 2.0,
        }
        .at(Vec2::new(1.0, 1.0), Angle::degrees(90.0));
        assert!(shape.contains(Vec2::new(1.0, 10.0)));
        assert!(!shape.contains(Vec2::new(1.0, -1.0)));
    }

    fn completed(caster: u64, action: ActionId, sequence: Option<u32>) -> CastEvent {
        CastEvent {
            caster: ActorId(caster),
            action,
            kind: CastKind::Completed,
            target: None,
            location: None,
            duration: None,
            sequence,
        }
    }

    #[test]
    fn redelivered_completion_counted_once() {
        let mut seen = SeenCasts::default();
        assert!(seen.completion(&completed(1, 5, None)));
        assert!(!seen.completion(&completed(1, 5, None)));
        assert!(seen.completion(&completed(2, 5, None)));
        // a later redelivery is still the same completion
        assert!(!seen.completion(&completed(1, 5, None)));

        // the next cast of the action counts again
        let started = CastEvent {
            kind: CastKind::Started,
            ..completed(1, 5, None)
        };
        assert!(!seen.completion(&started));
        assert!(seen.completion(&completed(1, 5, None)));
    }

    #[test]
    fn sequenced_completions_count_separately() {
        let mut seen = SeenCasts::default();
        assert!(seen.completion(&completed(1, 5, Some(10))));
        assert!(seen.completion(&completed(1, 5, Some(11))));
        assert!(!seen.completion(&completed(1, 5, Some(10))));

        let interrupted = CastEvent {
            kind: CastKind::Interrupted,
            ..completed(1, 5, Some(12))
        };
        assert!(!seen.completion(&interrupted));
        assert!(seen.completion(&completed(1, 5, Some(12))));
    }
}
