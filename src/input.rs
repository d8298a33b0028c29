//! Keyboard input
//!
//! Key events arrive between frames. Movement keys are held state; jump and
//! shoot are latched on key-down and consumed by the next tick.

use crate::sim::TickInput;

/// Game actions a key can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    Shoot,
}

impl Action {
    /// Map a browser key event (`KeyboardEvent.code`, `KeyboardEvent.key`)
    pub fn from_key(code: &str, key: &str) -> Option<Self> {
        match code {
            "ArrowLeft" => return Some(Action::MoveLeft),
            "ArrowRight" => return Some(Action::MoveRight),
            "Space" => return Some(Action::Jump),
            _ => {}
        }
        match key {
            "z" | "Z" => Some(Action::Shoot),
            _ => None,
        }
    }
}

/// Input gathered between two ticks
#[derive(Debug, Clone, Default)]
pub struct InputLatch {
    left: bool,
    right: bool,
    jump: bool,
    shots: u32,
}

impl InputLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key pressed (auto-repeat included)
    pub fn press(&mut self, action: Action) {
        match action {
            Action::MoveLeft => self.left = true,
            Action::MoveRight => self.right = true,
            Action::Jump => self.jump = true,
            Action::Shoot => self.shots = self.shots.saturating_add(1),
        }
    }

    /// Key released; jump and shoot have nothing to release
    pub fn release(&mut self, action: Action) {
        match action {
            Action::MoveLeft => self.left = false,
            Action::MoveRight => self.right = false,
            Action::Jump | Action::Shoot => {}
        }
    }

    /// Input for the next tick; clears the one-shot part, keeps held keys
    pub fn take(&mut self) -> TickInput {
        let input = TickInput {
            left: self.left,
            right: self.right,
            jump: self.jump,
            shots: self.shots,
        };
        self.jump = false;
        self.shots = 0;
        input
    }

    /// Drop everything, held keys included
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
