//! Hazard shapes and their containment predicates
//!
//! Every shape answers two questions about a point: is it inside
//! (`contains`), and how far is it from the boundary (`signed_distance`,
//! negative inside). Both are pure and never panic. Degenerate shapes
//! (zero radius, zero-length lanes, empty donuts, zero-width cones) contain
//! no points and report an infinite distance.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::Angle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Circle {
        center: Vec2,
        radius: f32,
    },
    /// Ring between `inner` (exclusive) and `outer` (inclusive)
    Donut {
        center: Vec2,
        inner: f32,
        outer: f32,
    },
    /// Circular sector around `direction`, spanning `±half_angle`
    Cone {
        apex: Vec2,
        direction: Angle,
        half_angle: Angle,
        length: f32,
    },
    /// Lane of width `2 * half_width` along the segment `from -> to`
    Rect {
        from: Vec2,
        to: Vec2,
        half_width: f32,
    },
    /// Everything outside the wrapped shape
    Inverted(Box<Shape>),
}

impl Shape {
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self::Circle { center, radius }
    }

    pub fn donut(center: Vec2, inner: f32, outer: f32) -> Self {
        Self::Donut {
            center,
            inner,
            outer,
        }
    }

    pub fn cone(apex: Vec2, direction: Angle, half_angle: Angle, length: f32) -> Self {
        Self::Cone {
            apex,
            direction,
            half_angle,
            length,
        }
    }

    pub fn rect(from: Vec2, to: Vec2, half_width: f32) -> Self {
        Self::Rect {
            from,
            to,
            half_width,
        }
    }

    /// "Must stay inside" circle: everything outside `radius` is forbidden
    pub fn inverted_circle(center: Vec2, radius: f32) -> Self {
        Self::circle(center, radius).inverted()
    }

    /// Complement of this shape. Inverting twice yields the original.
    pub fn inverted(self) -> Self {
        match self {
            Self::Inverted(inner) => *inner,
            other => Self::Inverted(Box::new(other)),
        }
    }

    pub fn is_inverted(&self) -> bool {
        matches!(self, Self::Inverted(_))
    }

    /// Shape with no area. Inverting a degenerate shape gives the whole plane.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Self::Circle { radius, .. } => !(*radius > 0.0),
            Self::Donut { inner, outer, .. } => !(*outer > 0.0) || !(inner < outer),
            Self::Cone {
                half_angle, length, ..
            } => !(*length > 0.0) || !(half_angle.0 > 0.0),
            Self::Rect {
                from,
                to,
                half_width,
            } => !(*half_width > 0.0) || !((*to - *from).length_squared() > 0.0),
            Self::Inverted(_) => false,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Self::Inverted(inner) => !inner.contains(point),
            _ if self.is_degenerate() => false,
            Self::Circle { center, radius } => point.distance(*center) <= *radius,
            Self::Donut {
                center,
                inner,
                outer,
            } => {
                let d = point.distance(*center);
                d > *inner && d <= *outer
            }
            Self::Cone {
                apex,
                direction,
                half_angle,
                length,
            } => {
                let off = point - *apex;
                let len = off.length();
                if len > *length {
                    return false;
                }
                if len == 0.0 {
                    return true;
                }
                Angle::from_direction(off).diff(*direction).0.abs() <= half_angle.0
            }
            Self::Rect {
                from,
                to,
                half_width,
            } => {
                let seg = *to - *from;
                let seg_len = seg.length();
                let dir = seg / seg_len;
                let off = point - *from;
                let along = off.dot(dir);
                let across = off.dot(dir.perp()).abs();
                along >= 0.0 && along <= seg_len && across <= *half_width
            }
        }
    }

    /// Signed distance to the boundary, negative inside.
    ///
    /// Exact for circles, donuts and lanes (corners included). Cones combine
    /// the radial distance with the distance to the edge half-planes, which
    /// keeps the sign exact and the magnitude a lower bound.
    pub fn signed_distance(&self, point: Vec2) -> f32 {
        match self {
            Self::Inverted(inner) => -inner.signed_distance(point),
            _ if self.is_degenerate() => f32::INFINITY,
            Self::Circle { center, radius } => point.distance(*center) - *radius,
            Self::Donut {
                center,
                inner,
                outer,
            } => {
                let d = point.distance(*center);
                (d - *outer).max(*inner - d)
            }
            Self::Cone {
                apex,
                direction,
                half_angle,
                length,
            } => {
                let off = point - *apex;
                let radial = off.length() - *length;
                let left = (*direction + *half_angle).to_direction().perp();
                let right = -(*direction - *half_angle).to_direction().perp();
                let (dl, dr) = (off.dot(left), off.dot(right));
                // Wedges wider than a half-plane are a union of the two edge half-planes
                let angular = if half_angle.0 <= std::f32::consts::FRAC_PI_2 {
                    dl.max(dr)
                } else {
                    dl.min(dr)
                };
                radial.max(angular)
            }
            Self::Rect {
                from,
                to,
                half_width,
            } => {
                let seg = *to - *from;
                let seg_len = seg.length();
                let dir = seg / seg_len;
                let off = point - *from;
                let along = off.dot(dir);
                let across = off.dot(dir.perp()).abs();
                let outside = Vec2::new((-along).max(along - seg_len), across - *half_width);
                outside.max(Vec2::ZERO).length() + outside.max_element().min(0.0)
            }
        }
    }

    /// The same shape moved by `offset`
    pub fn translated(&self, offset: Vec2) -> Self {
        match self {
            Self::Circle { center, radius } => Self::circle(*center + offset, *radius),
            Self::Donut {
                center,
                inner,
                outer,
            } => Self::donut(*center + offset, *inner, *outer),
            Self::Cone {
                apex,
                direction,
                half_angle,
                length,
            } => Self::cone(*apex + offset, *direction, *half_angle, *length),
            Self::Rect {
                from,
                to,
                half_width,
            } => Self::rect(*from + offset, *to + offset, *half_width),
            Self::Inverted(inner) => Self::Inverted(Box::new(inner.translated(offset))),
        }
    }

    /// Reference point used for labels and drawing
    pub fn anchor(&self) -> Vec2 {
        match self {
            Self::Circle { center, .. } | Self::Donut { center, .. } => *center,
            Self::Cone { apex, .. } => *apex,
            Self::Rect { from, .. } => *from,
            Self::Inverted(inner) => inner.anchor(),
        }
    }
}
