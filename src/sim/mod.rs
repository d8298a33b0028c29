//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One tick per display frame, no wall-clock time
//! - Injected RNG only
//! - Stable iteration order (spawn/firing order)
//! - No rendering, network or platform dependencies

pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Aabb, aabb_overlap};
pub use spawn::{Archetype, CATALOG, spawn_obstacle};
pub use state::{GameEvent, GameState, Obstacle, ObstacleKind, Player, Projectile};
pub use tick::{TickInput, tick};
