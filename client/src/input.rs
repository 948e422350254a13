//! Keyboard handling with edge detection.
//!
//! Arrow keys (or WASD) steer, Enter starts the round, R requests a
//! requeue. Direction keys emit one command per press; the server is
//! authoritative, so nothing is applied locally.

use macroquad::prelude::*;
use shared::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Steer(Direction),
    StartGame,
    Requeue,
}

pub struct InputManager {
    // Previous frame key states for edge detection
    prev_up: bool,
    prev_down: bool,
    prev_left: bool,
    prev_right: bool,
    prev_enter: bool,
    prev_r: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            prev_up: false,
            prev_down: false,
            prev_left: false,
            prev_right: false,
            prev_enter: false,
            prev_r: false,
        }
    }

    /// Samples the keyboard and returns the events newly pressed this frame.
    pub fn poll(&mut self) -> Vec<InputEvent> {
        let up = is_key_down(KeyCode::Up) || is_key_down(KeyCode::W);
        let down = is_key_down(KeyCode::Down) || is_key_down(KeyCode::S);
        let left = is_key_down(KeyCode::Left) || is_key_down(KeyCode::A);
        let right = is_key_down(KeyCode::Right) || is_key_down(KeyCode::D);
        let enter = is_key_down(KeyCode::Enter);
        let r = is_key_down(KeyCode::R);

        let mut events = Vec::new();
        if up && !self.prev_up {
            events.push(InputEvent::Steer(Direction::Up));
        }
        if down && !self.prev_down {
            events.push(InputEvent::Steer(Direction::Down));
        }
        if left && !self.prev_left {
            events.push(InputEvent::Steer(Direction::Left));
        }
        if right && !self.prev_right {
            events.push(InputEvent::Steer(Direction::Right));
        }
        if enter && !self.prev_enter {
            events.push(InputEvent::StartGame);
        }
        if r && !self.prev_r {
            events.push(InputEvent::Requeue);
        }

        self.prev_up = up;
        self.prev_down = down;
        self.prev_left = left;
        self.prev_right = right;
        self.prev_enter = enter;
        self.prev_r = r;

        events
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
