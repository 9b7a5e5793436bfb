//! Abstract arena-overlay primitives
//!
//! Components describe what to draw; a renderer outside the engine decides
//! how. Colors are semantic roles resolved through `arena_colors`.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use waymark_types::{Color, ColorRole, arena_colors};

use crate::geometry::{Angle, Shape};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum DrawIntent {
    Circle {
        center: Vec2,
        radius: f32,
        color: ColorRole,
        /// Filled area rather than outline
        #[serde(default)]
        filled: bool,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: ColorRole,
    },
    Cone {
        apex: Vec2,
        direction: Angle,
        half_angle: Angle,
        length: f32,
        color: ColorRole,
    },
    Rect {
        from: Vec2,
        to: Vec2,
        half_width: f32,
        color: ColorRole,
    },
    Marker {
        position: Vec2,
        color: ColorRole,
        #[serde(default)]
        label: Option<String>,
    },
}

impl DrawIntent {
    pub fn circle(center: Vec2, radius: f32, color: ColorRole) -> Self {
        Self::Circle {
            center,
            radius,
            color,
            filled: false,
        }
    }

    pub fn line(from: Vec2, to: Vec2, color: ColorRole) -> Self {
        Self::Line { from, to, color }
    }

    pub fn marker(position: Vec2, color: ColorRole) -> Self {
        Self::Marker {
            position,
            color,
            label: None,
        }
    }

    /// Filled area for a hazard shape. Inverted shapes draw their boundary
    /// as a safe outline; donuts draw both rings.
    pub fn zone(shape: &Shape, color: ColorRole) -> Vec<Self> {
        match shape {
            Shape::Circle { center, radius } => vec![Self::Circle {
                center: *center,
                radius: *radius,
                color,
                filled: true,
            }],
            Shape::Donut {
                center,
                inner,
                outer,
            } => vec![
                Self::circle(*center, *outer, color),
                Self::circle(*center, *inner, color),
            ],
            Shape::Cone {
                apex,
                direction,
                half_angle,
                length,
            } => vec![Self::Cone {
                apex: *apex,
                direction: *direction,
                half_angle: *half_angle,
                length: *length,
                color,
            }],
            Shape::Rect {
                from,
                to,
                half_width,
            } => vec![Self::Rect {
                from: *from,
                to: *to,
                half_width: *half_width,
                color,
            }],
            Shape::Inverted(inner) => Self::zone(inner, ColorRole::Safe)
                .into_iter()
                .map(Self::outlined)
                .collect(),
        }
    }

    pub fn color_role(&self) -> ColorRole {
        match self {
            Self::Circle { color, .. }
            | Self::Line { color, .. }
            | Self::Cone { color, .. }
            | Self::Rect { color, .. }
            | Self::Marker { color, .. } => *color,
        }
    }

    pub fn rgba(&self) -> Color {
        arena_colors::for_role(self.color_role())
    }

    fn outlined(self) -> Self {
        match self {
            Self::Circle {
                center,
                radius,
                color,
                ..
            } => Self::Circle {
                center,
                radius,
                color,
                filled: false,
            },
            other => other,
        }
    }
}
