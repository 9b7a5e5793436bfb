//! Default positions by role around the primary
//!
//! The current tank is expected to hold the primary facing along the line
//! from the arena center; every other party member gets a spot placed
//! relative to that line and must stay within `radius` of it. The tank is
//! shown a small cone in front of the primary instead.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use waymark_types::{ColorRole, Role};

use crate::components::{Component, TickContext};
use crate::draw::DrawIntent;
use crate::error::EngineError;
use crate::geometry::{Angle, Shape};
use crate::hints::ForbiddenZone;
use crate::world::Actor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSpot {
    pub roles: Vec<Role>,
    /// Distance from the primary
    #[serde(default)]
    pub distance: f32,
    /// Offset from the center-to-primary direction, counterclockwise
    #[serde(default)]
    pub angle_deg: f32,
    /// Extra distance back toward the arena center
    #[serde(default)]
    pub inward: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSpotsConfig {
    /// First spot listing a member's role wins
    pub spots: Vec<RoleSpot>,
    #[serde(default = "default_radius")]
    pub radius: f32,
    /// Length of the facing cone past the primary's hitbox; 0 draws none
    #[serde(default = "default_tank_cone")]
    pub tank_cone: f32,
}

fn default_radius() -> f32 {
    2.0
}

fn default_tank_cone() -> f32 {
    2.0
}

impl RoleSpotsConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        let finite = self
            .spots
            .iter()
            .all(|s| s.distance.is_finite() && s.angle_deg.is_finite() && s.inward.is_finite());
        if !finite || !(self.tank_cone.is_finite() && self.tank_cone >= 0.0) {
            return Err(EngineError::malformed("role_spots offsets must be finite"));
        }
        Ok(())
    }
}

pub struct RoleSpots {
    config: RoleSpotsConfig,
}

impl RoleSpots {
    pub fn new(config: RoleSpotsConfig) -> Self {
        Self { config }
    }

    /// Direction from the arena center to `primary`
    fn facing(ctx: &TickContext<'_>, primary: &Actor) -> Angle {
        Angle::from_direction(primary.position - ctx.arena.center())
    }

    /// Where `actor` should stand, if anywhere. The primary's target has no spot.
    pub fn spot_for(&self, ctx: &TickContext<'_>, actor: &Actor) -> Option<Vec2> {
        let primary = ctx.primary()?;
        if primary.target == Some(actor.id) {
            return None;
        }
        let spot = self.config.spots.iter().find(|s| s.roles.contains(&actor.role))?;
        let facing = Self::facing(ctx, primary);
        Some(
            primary.position + spot.distance * (facing + Angle::degrees(spot.angle_deg)).to_direction()
                - spot.inward * facing.to_direction(),
        )
    }
}

impl Component for RoleSpots {
    fn forbidden_zones(&self, ctx: &TickContext<'_>, _slot: usize, actor: &Actor) -> Vec<ForbiddenZone> {
        self.spot_for(ctx, actor)
            .map(|spot| ForbiddenZone::always(Shape::inverted_circle(spot, self.config.radius)))
            .into_iter()
            .collect()
    }

    fn draw_intents(&self, ctx: &TickContext<'_>, pov: &Actor) -> Vec<DrawIntent> {
        let Some(primary) = ctx.primary() else {
            return Vec::new();
        };
        if primary.target == Some(pov.id) {
            if self.config.tank_cone <= 0.0 {
                return Vec::new();
            }
            return vec![DrawIntent::Cone {
                apex: primary.position,
                direction: Self::facing(ctx, primary),
                half_angle: Angle::degrees(60.0),
                length: primary.hitbox_radius + self.config.tank_cone,
                color: ColorRole::Safe,
            }];
        }
        self.spot_for(ctx, pov)
            .map(|spot| DrawIntent::circle(spot, self.config.radius, ColorRole::Safe))
            .into_iter()
            .collect()
    }
}
