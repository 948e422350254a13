//! Round-scoped entities: players, their tooltips and moving obstacles.
//!
//! These are plain data. Nothing here owns a drawable; the renderer draws
//! straight from the session tables, so an obstacle's identity is simply its
//! index in the session's moving-obstacle table.

use shared::{Direction, PlayerInfo, PlayerStatus, Rect, PLAYER_FOOTPRINT};

/// Transient name/status label attached to a player. Visibility and fade
/// state are independent of the player's own visibility.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub visible: bool,
    pub alpha: f32,
}

impl Tooltip {
    pub fn new() -> Self {
        Self {
            visible: true,
            alpha: 1.0,
        }
    }

    /// Hide the label and reset the fade so a later fade-out starts from
    /// fully opaque again.
    pub fn reset_hidden(&mut self) {
        self.visible = false;
        self.alpha = 1.0;
    }

    /// Force the label fully opaque and visible (end-of-round reveal).
    pub fn reveal(&mut self) {
        self.visible = true;
        self.alpha = 1.0;
    }

    /// Advance the fade-out by `dt` seconds; hides the label once it is
    /// fully transparent.
    pub fn fade(&mut self, dt: f32) {
        if !self.visible {
            return;
        }
        self.alpha -= dt * Self::FADE_PER_SECOND;
        if self.alpha <= 0.0 {
            self.alpha = 0.0;
            self.visible = false;
        }
    }

    const FADE_PER_SECOND: f32 = 0.4;
}

impl Default for Tooltip {
    fn default() -> Self {
        Self::new()
    }
}

/// One player for the lifetime of a round. Created by the first `playerlist`
/// entry mentioning its id and mutated in place by everything after.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub color: String,
    pub status: PlayerStatus,
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
    pub width: i32,
    pub height: i32,
    /// Bot placeholders with an empty id start invisible.
    pub visible: bool,
    /// Whether the player is currently on the display list.
    pub attached: bool,
    pub tooltip: Tooltip,
}

impl Player {
    pub fn from_info(info: &PlayerInfo) -> Self {
        Self {
            id: info.id.clone(),
            name: info.name.clone(),
            color: info.color.clone(),
            status: info.status,
            x: info.x,
            y: info.y,
            direction: info.direction,
            width: PLAYER_FOOTPRINT,
            height: PLAYER_FOOTPRINT,
            visible: true,
            attached: false,
            tooltip: Tooltip::new(),
        }
    }

    pub fn set_position(&mut self, x: i32, y: i32, direction: Direction) {
        self.x = x;
        self.y = y;
        self.direction = direction;
    }

    pub fn is_bot(&self) -> bool {
        self.id.is_empty()
    }
}

/// Server-driven obstacle that repositions between ticks. Position updates
/// are index-aligned with the wire sequence (stable server ordering).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingObstacle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl MovingObstacle {
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }
}

impl From<&Rect> for MovingObstacle {
    fn from(rect: &Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}
