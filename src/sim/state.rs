//! Game state and core simulation types
//!
//! Everything a run needs lives in `GameState`; the tick function is the
//! only thing that mutates it during play.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::settings::GameConfig;

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Car,
    Bike,
    /// Can be shot for a bonus
    Cat,
}

impl ObstacleKind {
    /// True for the kind projectiles can remove
    pub fn is_destructible(&self) -> bool {
        matches!(self, ObstacleKind::Cat)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Car => "car",
            ObstacleKind::Bike => "bike",
            ObstacleKind::Cat => "cat",
        }
    }
}

/// The player's dog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Vertical velocity (positive is down)
    pub vy: f32,
    pub jump_power: f32,
    pub grounded: bool,
    pub lives: i32,
}

impl Player {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            pos: config.player_start,
            size: config.player_size,
            vy: 0.0,
            jump_power: config.jump_power,
            grounded: false,
            lives: config.start_lives,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    /// Jump if standing on the ground. Returns whether the jump happened.
    pub fn jump(&mut self) -> bool {
        if !self.grounded {
            return false;
        }
        self.vy = self.jump_power;
        self.grounded = false;
        true
    }

    /// Integrate gravity and land on the ground line.
    ///
    /// Gravity is added every tick, grounded or not; landing cancels it.
    pub fn apply_gravity(&mut self, gravity: f32, ground_y: f32) {
        self.vy += gravity;
        self.pos.y += self.vy;
        if self.pos.y >= ground_y {
            self.pos.y = ground_y;
            self.vy = 0.0;
            self.grounded = true;
        }
    }

    /// Keep the player inside `[0, view_width - width]`
    pub fn clamp_x(&mut self, view_width: f32) {
        self.pos.x = self.pos.x.max(0.0).min(view_width - self.size.x);
    }

    /// Spawn point for a projectile: front edge, vertical center
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size.x, self.pos.y + self.size.y / 2.0)
    }
}

/// A projectile fired by the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub size: Vec2,
    /// Rightward speed per tick
    pub speed: f32,
}

impl Projectile {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// An obstacle running toward the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
    pub size: Vec2,
    /// Leftward speed per tick
    pub speed: f32,
    pub kind: ObstacleKind,
    /// Sprite handle for the renderer
    pub sprite: String,
}

impl Obstacle {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Things that happened during a tick, drained by the session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An obstacle hit the player
    PlayerHit { kind: ObstacleKind, lives_left: i32 },
    /// A projectile destroyed an obstacle
    ObstacleDestroyed { kind: ObstacleKind },
    ObstacleSpawned { kind: ObstacleKind },
    /// Lives ran out; score is floored
    GameOver { final_score: u64 },
}

/// Complete run state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub player: Player,
    /// Live projectiles in firing order
    pub projectiles: Vec<Projectile>,
    /// Live obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Fractional score; displayed floored
    pub score: f64,
    /// Ticks run so far
    pub frame: u64,
    /// Terminal: once set, ticks do nothing
    pub game_over: bool,
    /// Events from the last tick(s), not yet drained
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh run from the configured start values
    pub fn new(config: &GameConfig) -> Self {
        Self {
            player: Player::new(config),
            projectiles: Vec::new(),
            obstacles: Vec::new(),
            score: 0.0,
            frame: 0,
            game_over: false,
            events: Vec::new(),
        }
    }

    /// Score as shown to the player and sent to the leaderboard
    pub fn display_score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }

    /// Fire a projectile from the player's muzzle
    pub fn shoot(&mut self, config: &GameConfig) {
        self.projectiles.push(Projectile {
            pos: self.player.muzzle(),
            size: config.projectile_size,
            speed: config.projectile_speed,
        });
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
