//! Geometry primitives for hazard containment
//!
//! - **angle**: radian angles with wrapped differences
//! - **shape**: circle, donut, cone, lane and inverted shapes
//!
//! All positions are 2D points on the arena floor.

mod angle;
mod shape;


pub use angle::{Angle, rotate_around};
pub use glam::Vec2;
pub use shape::Shape;

/// Approximate equality for positions
pub fn almost_equal(a: Vec2, b: Vec2, eps: f32) -> bool {
    (a - b).length_squared() <= eps * eps
}
