//! Arena bounds
//!
//! Encounter-space geometry used by mechanics ("about to be knocked into a
//! wall") and by the hint aggregator (zones that leave no safe spot).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::geometry::Shape;

/// Finest grid spacing used when sampling for safe spots
pub const MIN_SAMPLE_STEP: f32 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ArenaBounds {
    Circle {
        center: Vec2,
        radius: f32,
    },
    /// Axis-aligned rectangle
    Rect {
        center: Vec2,
        half_width: f32,
        half_height: f32,
    },
}

impl ArenaBounds {
    /// Circular arena. Fails on non-positive or non-finite radius.
    pub fn circle(center: Vec2, radius: f32) -> Result<Self, EngineError> {
        let bounds = Self::Circle { center, radius };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Rectangular arena. Fails on non-positive or non-finite extents.
    pub fn rect(center: Vec2, half_width: f32, half_height: f32) -> Result<Self, EngineError> {
        let bounds = Self::Rect {
            center,
            half_width,
            half_height,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Check extents. Deserialized bounds must pass this before use.
    pub fn validate(&self) -> Result<(), EngineError> {
        let ok = match self {
            Self::Circle { center, radius } => center.is_finite() && radius.is_finite() && *radius > 0.0,
            Self::Rect {
                center,
                half_width,
                half_height,
            } => {
                center.is_finite()
                    && half_width.is_finite()
                    && half_height.is_finite()
                    && *half_width > 0.0
                    && *half_height > 0.0
            }
        };
        if ok {
            Ok(())
        } else {
            Err(EngineError::InvalidArena {
                reason: format!("{:?}", self),
            })
        }
    }

    pub fn center(&self) -> Vec2 {
        match self {
            Self::Circle { center, .. } | Self::Rect { center, .. } => *center,
        }
    }

    pub fn in_bounds(&self, point: Vec2) -> bool {
        match self {
            Self::Circle { center, radius } => point.distance_squared(*center) <= radius * radius,
            Self::Rect {
                center,
                half_width,
                half_height,
            } => {
                let off = point - *center;
                off.x.abs() <= *half_width && off.y.abs() <= *half_height
            }
        }
    }

    /// Nearest in-bounds point
    pub fn clamp_to_bounds(&self, point: Vec2) -> Vec2 {
        match self {
            Self::Circle { center, radius } => {
                let off = point - *center;
                if off.length_squared() <= radius * radius {
                    point
                } else {
                    *center + off.normalize_or_zero() * *radius
                }
            }
            Self::Rect {
                center,
                half_width,
                half_height,
            } => {
                let off = point - *center;
                *center
                    + Vec2::new(
                        off.x.clamp(-half_width, *half_width),
                        off.y.clamp(-half_height, *half_height),
                    )
            }
        }
    }

    /// Shape covering the arena interior
    pub fn as_shape(&self) -> Shape {
        match self {
            Self::Circle { center, radius } => Shape::circle(*center, *radius),
            Self::Rect {
                center,
                half_width,
                half_height,
            } => Shape::rect(
                *center - Vec2::new(*half_width, 0.0),
                *center + Vec2::new(*half_width, 0.0),
                *half_height,
            ),
        }
    }

    /// In-bounds grid points spaced `step` apart, centered on the arena.
    /// Steps finer than [`MIN_SAMPLE_STEP`] are raised to it.
    pub fn sample_points(&self, step: f32) -> Vec<Vec2> {
        if !(step > 0.0) {
            return vec![self.center()];
        }
        let step = step.max(MIN_SAMPLE_STEP);
        let (hx, hy) = match self {
            Self::Circle { radius, .. } => (*radius, *radius),
            Self::Rect {
                half_width,
                half_height,
                ..
            } => (*half_width, *half_height),
        };
        let nx = (hx / step).floor() as i32;
        let ny = (hy / step).floor() as i32;
        let center = self.center();
        let mut points = Vec::new();
        for ix in -nx..=nx {
            for iy in -ny..=ny {
                let p = center + Vec2::new(ix as f32 * step, iy as f32 * step);
                if self.in_bounds(p) {
                    points.push(p);
                }
            }
        }
        points
    }

    /// Whether some in-bounds point lies outside `shape`.
    ///
    /// Checks the sample grid, then the anchor of an inverted shape's inner
    /// shape (clamped into the arena), so a small "stay inside" zone that
    /// falls between grid points still counts as safe.
    pub fn has_safe_complement(&self, shape: &Shape, step: f32) -> bool {
        let is_safe = |p: Vec2| self.in_bounds(p) && !shape.contains(p);
        if self.sample_points(step).into_iter().any(is_safe) {
            return true;
        }
        match shape {
            Shape::Inverted(inner) => {
                let anchor = inner.anchor();
                is_safe(anchor) || is_safe(self.clamp_to_bounds(anchor))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_bounds() {
        let arena = ArenaBounds::circle(Vec2::new(100.0, 100.0), 20.0).unwrap();
        assert_eq!(arena.center(), Vec2::new(100.0, 100.0));
        assert!(arena.in_bounds(Vec2::new(119.0, 100.0)));
        assert!(!arena.in_bounds(Vec2::new(121.0, 100.0)));

        let clamped = arena.clamp_to_bounds(Vec2::new(130.0, 100.0));
        assert!((clamped - Vec2::new(120.0, 100.0)).length() < 1e-4);
        assert_eq!(arena.clamp_to_bounds(Vec2::new(105.0, 95.0)), Vec2::new(105.0, 95.0));
    }

    #[test]
    fn rect_bounds() {
        let arena = ArenaBounds::rect(Vec2::ZERO, 10.0, 5.0).unwrap();
        assert!(arena.in_bounds(Vec2::new(9.0, -4.0)));
        assert!(!arena.in_bounds(Vec2::new(9.0, -6.0)));
        assert_eq!(arena.clamp_to_bounds(Vec2::new(15.0, -6.0)), Vec2::new(10.0, -5.0));
    }

    #[test]
    fn invalid_bounds_rejected() {
        assert!(ArenaBounds::circle(Vec2::ZERO, 0.0).is_err());
        assert!(ArenaBounds::circle(Vec2::ZERO, f32::NAN).is_err());
        assert!(ArenaBounds::rect(Vec2::ZERO, 5.0, -1.0).is_err());
    }

    #[test]
    fn safe_complement_detection() {
        let arena = ArenaBounds::circle(Vec2::ZERO, 10.0).unwrap();
        assert!(arena.has_safe_complement(&Shape::circle(Vec2::ZERO, 5.0), 1.0));
        assert!(!arena.has_safe_complement(&Shape::circle(Vec2::ZERO, 15.0), 1.0));
        // inverted circle bigger than the arena forbids nothing inside it
        assert!(arena.has_safe_complement(&Shape::inverted_circle(Vec2::ZERO, 15.0), 1.0));
    }

    #[test]
    fn small_inside_zone_between_grid_points_is_safe() {
        let arena = ArenaBounds::circle(Vec2::ZERO, 20.0).unwrap();
        // no grid point at step 1.0 lies within 0.6 of (0.5, 0.5)
        let zone = Shape::inverted_circle(Vec2::new(0.5, 0.5), 0.6);
        assert!(arena.sample_points(1.0).iter().all(|p| zone.contains(*p)));
        assert!(arena.has_safe_complement(&zone, 1.0));

        // out of reach of the arena entirely
        assert!(!arena.has_safe_complement(&Shape::inverted_circle(Vec2::new(30.0, 0.0), 0.5), 1.0));
    }

    #[test]
    fn sample_step_has_floor() {
        let arena = ArenaBounds::circle(Vec2::ZERO, 2.0).unwrap();
        assert_eq!(arena.sample_points(0.01).len(), arena.sample_points(MIN_SAMPLE_STEP).len());
        assert_eq!(arena.sample_points(0.0), vec![Vec2::ZERO]);
    }
}
