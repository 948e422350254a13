//! Draws the current session onto the display surface.
//!
//! Fixed z-order per frame: trail layer, static obstacles, moving
//! obstacles, players, tooltips, loader overlay. Grid coordinates scale by
//! [`BOX_SIZE`]. The renderer reads the entity model and only touches
//! presentation state (trail texture upload, tooltip fades).

use crate::entity::Player;
use crate::game::GameSession;
use macroquad::prelude::*;
use shared::{Direction, PlayerStatus, BOX_SIZE};

const BACKGROUND: Color = Color::new(0.05, 0.05, 0.08, 1.0);
const OBSTACLE_COLOR: Color = Color::new(0.5, 0.5, 0.5, 1.0);
// light core so bikes read against their own trail color
const PLAYER_CORE: Color = Color::new(0.91, 0.9, 0.9, 1.0);
const LOADER_DIM: Color = Color::new(0.0, 0.0, 0.0, 0.6);

/// Badge color for a status label; statuses we do not know have no defined
/// rendering.
pub(crate) fn status_color(status: PlayerStatus) -> Option<Color> {
    match status {
        PlayerStatus::Connected => Some(Color::new(0.0, 0.48, 1.0, 1.0)),
        PlayerStatus::Alive | PlayerStatus::Winner => Some(Color::new(0.16, 0.65, 0.27, 1.0)),
        PlayerStatus::Dead => Some(Color::new(0.86, 0.21, 0.27, 1.0)),
        PlayerStatus::Disconnected => Some(Color::new(0.42, 0.46, 0.49, 1.0)),
        PlayerStatus::Unknown => None,
    }
}

pub struct Renderer {
    trail_texture: Texture2D,
}

impl Renderer {
    pub fn new(session: &GameSession) -> Self {
        Self {
            trail_texture: Texture2D::from_image(session.trail.image()),
        }
    }

    /// Commit one render pass. Called exactly once per processed message
    /// plus once per frame tick for fades and the loader.
    pub fn render(&mut self, session: &mut GameSession, dt: f32) {
        session.fade_tooltips(dt);
        if session.trail.take_dirty() {
            self.trail_texture.update(session.trail.image());
        }

        clear_background(BACKGROUND);
        draw_texture(&self.trail_texture, 0.0, 0.0, WHITE);

        for rect in &session.obstacles {
            draw_rectangle(
                BOX_SIZE * rect.x as f32,
                BOX_SIZE * rect.y as f32,
                BOX_SIZE * rect.width as f32,
                BOX_SIZE * rect.height as f32,
                OBSTACLE_COLOR,
            );
        }
        for obstacle in &session.moving_obstacles {
            draw_rectangle(
                BOX_SIZE * obstacle.x as f32,
                BOX_SIZE * obstacle.y as f32,
                BOX_SIZE * obstacle.width as f32,
                BOX_SIZE * obstacle.height as f32,
                OBSTACLE_COLOR,
            );
        }

        for player in session.players.values() {
            if player.attached && player.visible {
                self.draw_player(player);
            }
        }
        for player in session.players.values() {
            if player.attached && player.tooltip.visible {
                self.draw_tooltip(player);
            }
        }

        if session.show_loader {
            self.draw_loader();
        }
    }

    fn draw_player(&self, player: &Player) {
        let x = BOX_SIZE * player.x as f32;
        let y = BOX_SIZE * player.y as f32;
        let w = BOX_SIZE * player.width as f32;
        let h = BOX_SIZE * player.height as f32;

        draw_rectangle(x, y, w, h, crate::trail::hex_color(&player.color));
        draw_rectangle(x + w / 4.0, y + h / 4.0, w / 2.0, h / 2.0, PLAYER_CORE);

        // nose marker on the leading edge; orientation is visual only
        let (nx, ny, nw, nh) = match player.direction {
            Direction::Up => (x + w / 4.0, y, w / 2.0, BOX_SIZE / 2.0),
            Direction::Down => (x + w / 4.0, y + h - BOX_SIZE / 2.0, w / 2.0, BOX_SIZE / 2.0),
            Direction::Left => (x, y + h / 4.0, BOX_SIZE / 2.0, h / 2.0),
            Direction::Right => (x + w - BOX_SIZE / 2.0, y + h / 4.0, BOX_SIZE / 2.0, h / 2.0),
        };
        draw_rectangle(nx, ny, nw, nh, PLAYER_CORE);
    }

    fn draw_tooltip(&self, player: &Player) {
        let alpha = player.tooltip.alpha;
        let x = BOX_SIZE * player.x as f32;
        let y = BOX_SIZE * player.y as f32 - 8.0;

        let name_color = Color::new(1.0, 1.0, 1.0, alpha);
        draw_text(&player.name, x, y, 16.0, name_color);

        if let Some(mut badge) = status_color(player.status) {
            badge.a = alpha;
            let label: String = player.status.into();
            let offset = player.name.len() as f32 * 8.0 + 6.0;
            draw_text(&label, x + offset, y, 16.0, badge);
        }
    }

    fn draw_loader(&self) {
        let w = screen_width();
        let h = screen_height();
        draw_rectangle(0.0, 0.0, w, h, LOADER_DIM);
        draw_text("Get ready...", w / 2.0 - 60.0, h / 2.0, 32.0, WHITE);
    }
}
