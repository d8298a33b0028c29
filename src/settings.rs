//! Game tuning
//!
//! Every gameplay constant lives in `GameConfig` so balance can be tweaked
//! without touching the simulation. Overrides are loaded from LocalStorage
//! on the web and from a JSON file natively.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Gameplay tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Viewport ===
    pub view_width: f32,
    pub view_height: f32,
    /// Distance between the ground line and the bottom of the viewport
    pub ground_margin: f32,

    // === Player ===
    pub gravity: f32,
    pub move_step: f32,
    pub jump_power: f32,
    pub player_start: Vec2,
    pub player_size: Vec2,
    pub start_lives: i32,

    // === Projectiles ===
    pub projectile_size: Vec2,
    pub projectile_speed: f32,

    // === Obstacles ===
    pub obstacle_speed: f32,
    pub spawn_interval: u64,

    // === Scoring ===
    pub score_per_frame: f64,
    pub destroy_bonus: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            view_width: VIEW_WIDTH,
            view_height: VIEW_HEIGHT,
            ground_margin: GROUND_MARGIN,

            gravity: GRAVITY,
            move_step: MOVE_STEP,
            jump_power: JUMP_POWER,
            player_start: Vec2::new(PLAYER_START_X, PLAYER_START_Y),
            player_size: Vec2::splat(PLAYER_SIZE),
            start_lives: START_LIVES,

            projectile_size: Vec2::new(PROJECTILE_WIDTH, PROJECTILE_HEIGHT),
            projectile_speed: PROJECTILE_SPEED,

            obstacle_speed: OBSTACLE_SPEED,
            spawn_interval: SPAWN_INTERVAL,

            score_per_frame: SCORE_PER_FRAME,
            destroy_bonus: DESTROY_BONUS,
        }
    }
}

impl GameConfig {
    /// Default tuning with a different viewport width (browser window size)
    pub fn with_view_width(view_width: f32) -> Self {
        Self {
            view_width,
            ..Self::default()
        }
    }

    /// Y of an entity's top edge when its bottom rests on the ground line
    pub fn ground_y(&self, height: f32) -> f32 {
        self.view_height - height - self.ground_margin
    }

    /// Reject values the simulation can't run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player_size.min_element() <= 0.0 || self.projectile_size.min_element() <= 0.0 {
            return Err(ConfigError::Invalid("entity sizes must be positive".into()));
        }
        if self.spawn_interval == 0 {
            return Err(ConfigError::Invalid("spawn_interval must be at least 1".into()));
        }
        if self.view_width < self.player_size.x {
            return Err(ConfigError::Invalid(format!(
                "view_width {} is narrower than the player ({})",
                self.view_width, self.player_size.x
            )));
        }
        if self.ground_y(self.player_size.y) < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "view_height {} leaves no room for the player",
                self.view_height
            )));
        }
        if self.start_lives <= 0 {
            return Err(ConfigError::Invalid("start_lives must be positive".into()));
        }
        Ok(())
    }

    /// Parse and validate a JSON config; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "dog_runner_config";

    /// Load overrides from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load(view_width: f32) -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(mut config) => {
                        config.view_width = view_width;
                        log::info!("Loaded game config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored game config: {}", e),
                }
            }
        }

        Self::with_view_width(view_width)
    }

    /// Native: defaults unless a config file is given
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let config = Self::from_json_file(path)?;
                log::info!("Loaded game config from {}", path.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }
}
