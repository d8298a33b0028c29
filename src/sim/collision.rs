//! Collision detection
//!
//! Everything in the game is an axis-aligned rectangle, so one overlap test
//! covers player/obstacle and projectile/obstacle contacts.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box (top-left corner + size, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Strict overlap: boxes that only share an edge don't collide
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x
            && a_max.x > other.min.x
            && self.min.y < b_max.y
            && a_max.y > other.min.y
    }
}

/// Check if two boxes overlap
#[inline]
pub fn aabb_overlap(a: &Aabb, b: &Aabb) -> bool {
    a.overlaps(b)
}
