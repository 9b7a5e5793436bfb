//! Angles in radians
//!
//! Directions use the standard math convention: angle 0 points along +X and
//! angles grow counter-clockwise, so `to_direction` is `(cos, sin)`.

use std::f32::consts::{PI, TAU};
use std::ops::{Add, Neg, Sub};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An angle in radians. Not normalized unless `wrapped` is called.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Angle(pub f32);

impl Angle {
    pub const ZERO: Self = Self(0.0);

    pub const fn radians(rad: f32) -> Self {
        Self(rad)
    }

    pub fn degrees(deg: f32) -> Self {
        Self(deg.to_radians())
    }

    pub fn rad(self) -> f32 {
        self.0
    }

    pub fn deg(self) -> f32 {
        self.0.to_degrees()
    }

    /// Angle of a direction vector. The zero vector maps to angle 0.
    pub fn from_direction(dir: Vec2) -> Self {
        if dir == Vec2::ZERO {
            return Self::ZERO;
        }
        Self(dir.y.atan2(dir.x))
    }

    /// Unit vector pointing along this angle
    pub fn to_direction(self) -> Vec2 {
        Vec2::new(self.0.cos(), self.0.sin())
    }

    /// Same angle normalized into [-π, π]
    pub fn wrapped(self) -> Self {
        if !self.0.is_finite() {
            return self;
        }
        Self((self.0 + PI).rem_euclid(TAU) - PI)
    }

    /// Signed shortest difference `self - other`, in [-π, π]
    pub fn diff(self, other: Self) -> Self {
        Self(self.0 - other.0).wrapped()
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Approximate equality with a tolerance in radians
    pub fn almost_equal(self, other: Self, eps: f32) -> bool {
        self.diff(other).0.abs() <= eps
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Angle) -> Angle {
        Angle(self.0 + rhs.0)
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, rhs: Angle) -> Angle {
        Angle(self.0 - rhs.0)
    }
}

impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle(-self.0)
    }
}

/// Rotate `point` around `pivot` by `angle`
pub fn rotate_around(point: Vec2, pivot: Vec2, angle: Angle) -> Vec2 {
    let (sin, cos) = angle.0.sin_cos();
    let off = point - pivot;
    pivot + Vec2::new(off.x * cos - off.y * sin, off.x * sin + off.y * cos)
}
