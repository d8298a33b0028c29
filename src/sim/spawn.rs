//! Obstacle spawning
//!
//! Picks one archetype uniformly from a fixed catalog and places it at the
//! right edge of the viewport, standing on the ground line.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::state::{Obstacle, ObstacleKind};
use crate::settings::GameConfig;

/// Template for a spawnable obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Archetype {
    pub kind: ObstacleKind,
    pub width: f32,
    pub height: f32,
    pub sprite: &'static str,
}

/// The obstacles the game spawns
pub const CATALOG: [Archetype; 3] = [
    Archetype {
        kind: ObstacleKind::Car,
        width: 90.0,
        height: 60.0,
        sprite: "car_animated.gif",
    },
    Archetype {
        kind: ObstacleKind::Bike,
        width: 40.0,
        height: 40.0,
        sprite: "bike_sprite_flipped.png",
    },
    Archetype {
        kind: ObstacleKind::Cat,
        width: 40.0,
        height: 40.0,
        sprite: "cat_sprite_flipped.png",
    },
];

impl Archetype {
    /// Instantiate at the right edge, bottom on the ground line
    pub fn instantiate(&self, config: &GameConfig) -> Obstacle {
        Obstacle {
            pos: Vec2::new(config.view_width, config.ground_y(self.height)),
            size: Vec2::new(self.width, self.height),
            speed: config.obstacle_speed,
            kind: self.kind,
            sprite: self.sprite.to_string(),
        }
    }
}

/// Spawn a random obstacle from `catalog` (None if the catalog is empty)
pub fn spawn_obstacle<R: Rng + ?Sized>(
    catalog: &[Archetype],
    config: &GameConfig,
    rng: &mut R,
) -> Option<Obstacle> {
    catalog.choose(rng).map(|archetype| archetype.instantiate(config))
}
