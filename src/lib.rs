//! Dog Runner - A side-scrolling runner with a wallet leaderboard
//!
//! Core modules:
//! - `sim`: Per-frame simulation (physics, collisions, spawning, run state)
//! - `session`: Run lifecycle around the simulation (start, reset, game over)
//! - `input`: Keyboard actions and the between-tick input latch
//! - `records`: Score reporting client for the leaderboard service
//! - `leaderboard`: The leaderboard service (score book + HTTP server)
//! - `platform`: Frame scheduling and identity providers
//! - `settings`: Data-driven game tuning
//! - `autopilot`: Snapshot-driven demo player for headless runs

pub mod autopilot;
pub mod input;
pub mod leaderboard;
pub mod platform;
pub mod records;
pub mod session;
pub mod settings;
pub mod sim;

pub use records::{Records, RecordsClient, RecordsError};
pub use session::{Session, Snapshot};
pub use settings::GameConfig;

/// Game configuration constants (the values of `GameConfig::default()`)
pub mod consts {
    /// Default viewport size (the browser overrides width with `innerWidth`)
    pub const VIEW_WIDTH: f32 = 800.0;
    pub const VIEW_HEIGHT: f32 = 300.0;
    /// Height of the grass strip under the ground line
    pub const GROUND_MARGIN: f32 = 20.0;

    /// Downward acceleration per tick
    pub const GRAVITY: f32 = 1.2;
    /// Horizontal player movement per tick while an arrow key is held
    pub const MOVE_STEP: f32 = 5.0;
    /// Vertical velocity applied on jump (negative is up)
    pub const JUMP_POWER: f32 = -18.0;

    pub const PLAYER_START_X: f32 = 100.0;
    pub const PLAYER_START_Y: f32 = 0.0;
    pub const PLAYER_SIZE: f32 = 60.0;
    pub const START_LIVES: i32 = 3;

    pub const PROJECTILE_WIDTH: f32 = 10.0;
    pub const PROJECTILE_HEIGHT: f32 = 4.0;
    pub const PROJECTILE_SPEED: f32 = 10.0;

    pub const OBSTACLE_SPEED: f32 = 6.0;
    /// Frames between obstacle spawns
    pub const SPAWN_INTERVAL: u64 = 100;

    pub const SCORE_PER_FRAME: f64 = 0.1;
    /// Bonus for shooting a destructible obstacle
    pub const DESTROY_BONUS: f64 = 10.0;
}
