//! Per-frame simulation tick
//!
//! One call advances the run by one display frame. There is no delta time:
//! every constant is "per tick".

use rand::Rng;

use super::spawn::{CATALOG, spawn_obstacle};
use super::state::{GameEvent, GameState};
use crate::settings::GameConfig;

/// Input for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Move-left held
    pub left: bool,
    /// Move-right held
    pub right: bool,
    /// Jump pressed since the last tick
    pub jump: bool,
    /// Shoot presses since the last tick
    pub shots: u32,
}

/// Advance the game state by one frame
pub fn tick<R: Rng + ?Sized>(
    state: &mut GameState,
    input: &TickInput,
    config: &GameConfig,
    rng: &mut R,
) {
    if state.game_over {
        return;
    }

    // Key-down actions happen before the frame integrates
    if input.jump {
        state.player.jump();
    }
    for _ in 0..input.shots {
        state.shoot(config);
    }

    state.frame += 1;
    state.score += config.score_per_frame;

    // Both arrows held cancel out
    if input.right {
        state.player.pos.x += config.move_step;
    }
    if input.left {
        state.player.pos.x -= config.move_step;
    }
    state.player.clamp_x(config.view_width);

    let ground_y = config.ground_y(state.player.size.y);
    state.player.apply_gravity(config.gravity, ground_y);

    for projectile in &mut state.projectiles {
        projectile.pos.x += projectile.speed;
    }
    state.projectiles.retain(|p| p.pos.x < config.view_width);

    for obstacle in &mut state.obstacles {
        obstacle.pos.x -= obstacle.speed;
    }
    state.obstacles.retain(|o| o.pos.x + o.size.x > 0.0);

    resolve_player_hits(state);

    if state.player.lives <= 0 {
        state.game_over = true;
        let final_score = state.display_score();
        state.events.push(GameEvent::GameOver { final_score });
    }

    resolve_projectile_hits(state, config);

    if state.frame.is_multiple_of(config.spawn_interval) {
        if let Some(obstacle) = spawn_obstacle(&CATALOG, config, rng) {
            state.events.push(GameEvent::ObstacleSpawned {
                kind: obstacle.kind,
            });
            state.obstacles.push(obstacle);
        }
    }
}

/// Every obstacle touching the player is removed and costs one life
fn resolve_player_hits(state: &mut GameState) {
    let player = state.player.bounds();
    let mut hits = Vec::new();
    state.obstacles.retain(|obstacle| {
        if player.overlaps(&obstacle.bounds()) {
            hits.push(obstacle.kind);
            false
        } else {
            true
        }
    });

    for kind in hits {
        state.player.lives -= 1;
        state.events.push(GameEvent::PlayerHit {
            kind,
            lives_left: state.player.lives,
        });
    }
}

/// Projectiles against destructible obstacles.
///
/// Projectile-outer, obstacle-inner. An obstacle destroyed earlier in the
/// pass can't be matched again; one projectile may take out every cat it
/// overlaps.
fn resolve_projectile_hits(state: &mut GameState, config: &GameConfig) {
    if state.projectiles.is_empty() || state.obstacles.is_empty() {
        return;
    }

    let mut destroyed = vec![false; state.obstacles.len()];
    let mut spent = vec![false; state.projectiles.len()];

    for (pi, projectile) in state.projectiles.iter().enumerate() {
        let bounds = projectile.bounds();
        for (oi, obstacle) in state.obstacles.iter().enumerate() {
            if destroyed[oi] || !obstacle.kind.is_destructible() {
                continue;
            }
            if bounds.overlaps(&obstacle.bounds()) {
                destroyed[oi] = true;
                spent[pi] = true;
                state.score += config.destroy_bonus;
                state.events.push(GameEvent::ObstacleDestroyed {
                    kind: obstacle.kind,
                });
            }
        }
    }

    let mut spent = spent.into_iter();
    state.projectiles.retain(|_| !spent.next().unwrap_or(false));
    let mut destroyed = destroyed.into_iter();
    state.obstacles.retain(|_| !destroyed.next().unwrap_or(false));
}
