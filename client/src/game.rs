//! Message-driven state synchronizer.
//!
//! [`GameSession`] is the round-scoped context: every entity, the trail
//! buffer and the countdown loader live here, constructed on round join and
//! discarded wholesale on requeue. [`GameSession::apply`] interprets one
//! inbound [`ServerMessage`] and applies whatever optional fields are
//! present, in a fixed order that later fields rely on (player trail stamps
//! must land after moving obstacles erased the cells under them).

use crate::entity::{MovingObstacle, Player};
use crate::trail::{hex_color, TrailCanvas};
use log::{debug, info, warn};
use shared::{ClientCommand, PlayerInfo, PlayerStatus, PlayerUpdate, Rect, ServerMessage};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// What one applied message asks of the surrounding loop.
#[derive(Debug, Default, PartialEq)]
pub struct SyncOutcome {
    /// New round id: discard this session and reload the pipeline.
    pub requeue: Option<String>,
    /// Commands to echo back on the command channel.
    pub commands: Vec<ClientCommand>,
}

pub struct GameSession {
    pub players: HashMap<String, Player>,
    /// Static obstacles accumulate and are never cleared; a re-sent
    /// rectangle is simply painted again.
    pub obstacles: Vec<Rect>,
    pub moving_obstacles: Vec<MovingObstacle>,
    pub trail: TrailCanvas,
    pub show_loader: bool,
    loader_deadlines: Vec<Instant>,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            players: HashMap::new(),
            obstacles: Vec::new(),
            moving_obstacles: Vec::new(),
            trail: TrailCanvas::new(),
            show_loader: false,
            loader_deadlines: Vec::new(),
        }
    }

    /// Apply one inbound message. Field order is fixed and must not change;
    /// the caller commits exactly one render pass afterwards.
    pub fn apply(&mut self, msg: &ServerMessage) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();

        if let Some(round_id) = &msg.requeue {
            // The reload discards this whole session, so nothing else in
            // the message is worth applying.
            info!("requeued into round {}", round_id);
            outcome.requeue = Some(round_id.clone());
            return outcome;
        }
        if let Some(obstacles) = &msg.obstacles {
            self.obstacles.extend(obstacles.iter().copied());
        }
        if let Some(incoming) = &msg.moving_obstacles {
            self.apply_moving_obstacles(incoming);
        }
        if let Some(roster) = &msg.playerlist {
            self.apply_playerlist(roster);
        }
        if let Some(updates) = &msg.players {
            self.apply_player_updates(updates);
        }
        if let Some(seconds) = msg.countdown {
            if seconds > 0.0 {
                self.arm_countdown(seconds);
            }
        }
        if msg.keep_alive == Some(true) {
            outcome.commands.push(ClientCommand::keep_alive());
        }

        outcome
    }

    /// Grow-vs-update rule: a larger incoming set replaces the tracked set
    /// outright (initial creation and growth); otherwise positions update
    /// index-aligned and the trail is erased under each new rectangle.
    /// Index alignment trusts the server to send the set in stable order.
    fn apply_moving_obstacles(&mut self, incoming: &[Rect]) {
        if incoming.len() > self.moving_obstacles.len() {
            debug!(
                "rebuilding moving obstacles: {} -> {}",
                self.moving_obstacles.len(),
                incoming.len()
            );
            self.moving_obstacles = incoming.iter().map(MovingObstacle::from).collect();
        } else {
            for (obstacle, rect) in self.moving_obstacles.iter_mut().zip(incoming) {
                obstacle.set_position(rect.x, rect.y);
                self.trail.erase(rect);
            }
        }
    }

    fn apply_playerlist(&mut self, roster: &[PlayerInfo]) {
        for info in roster {
            let player = self
                .players
                .entry(info.id.clone())
                .or_insert_with(|| Player::from_info(info));

            if info.status != PlayerStatus::Dead {
                player.set_position(info.x, info.y, info.direction);
            }
            if player.is_bot() {
                // bot placeholders have no position until the round starts
                player.visible = false;
            }
            // re-attach in case a prior update took the player off the display
            player.attached = true;
        }
    }

    fn apply_player_updates(&mut self, updates: &[PlayerUpdate]) {
        let mut none_alive = true;
        for update in updates {
            let Some(player) = self.players.get_mut(&update.id) else {
                // contract violation by the server; recover instead of crashing
                warn!("status update for unknown player {:?}", update.id);
                continue;
            };

            if update.status == PlayerStatus::Alive {
                none_alive = false;
                player.set_position(update.x, update.y, update.direction);
                // stamp onto the trail buffer so obstacles rolling over the
                // cell can erase it later
                self.trail.stamp(
                    update.x,
                    update.y,
                    update.width,
                    update.height,
                    hex_color(&update.color),
                );
                self.trail.materialize();
            } else if !update.alive {
                // the player may die before its tooltip finished fading out
                player.tooltip.reset_hidden();
            }

            player.status = update.status;
        }

        if none_alive {
            // end-of-round reveal: show final standings on every player,
            // mentioned in this message or not
            for player in self.players.values_mut() {
                player.tooltip.reveal();
            }
        }
    }

    fn arm_countdown(&mut self, seconds: f32) {
        self.show_loader = true;
        // One-shots are never cancelled. Every pending deadline will still
        // fire and clear the shared flag, so the loader hides at the
        // earliest timer, which may be sooner than the latest countdown
        // asked for.
        self.loader_deadlines
            .push(Instant::now() + Duration::from_secs_f32(seconds));
    }

    /// Earliest pending countdown deadline, if any, for the event loop to
    /// sleep on.
    pub fn next_loader_deadline(&self) -> Option<Instant> {
        self.loader_deadlines.iter().min().copied()
    }

    /// Fire every deadline at or before `now`; any firing timer hides the
    /// loader.
    pub fn expire_loaders(&mut self, now: Instant) {
        let pending = self.loader_deadlines.len();
        self.loader_deadlines.retain(|deadline| *deadline > now);
        if self.loader_deadlines.len() < pending {
            self.show_loader = false;
        }
    }

    /// Advance tooltip fade-outs for living players. Presentation-only
    /// state; called once per frame, not per message.
    pub fn fade_tooltips(&mut self, dt: f32) {
        for player in self.players.values_mut() {
            if player.status == PlayerStatus::Alive {
                player.tooltip.fade(dt);
            }
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroquad::prelude::BLANK;
    use shared::Direction;

    fn roster_entry(id: &str, x: i32, y: i32) -> PlayerInfo {
        PlayerInfo {
            id: id.to_string(),
            name: format!("rider-{}", id),
            color: "#ABD155".to_string(),
            status: PlayerStatus::Connected,
            x,
            y,
            direction: Direction::Right,
        }
    }

    fn tick_entry(id: &str, status: PlayerStatus, alive: bool, x: i32, y: i32) -> PlayerUpdate {
        PlayerUpdate {
            id: id.to_string(),
            x,
            y,
            direction: Direction::Right,
            color: "#ABD155".to_string(),
            width: 3,
            height: 3,
            status,
            alive,
        }
    }

    fn roster_msg(entries: Vec<PlayerInfo>) -> ServerMessage {
        ServerMessage {
            playerlist: Some(entries),
            ..Default::default()
        }
    }

    fn tick_msg(entries: Vec<PlayerUpdate>) -> ServerMessage {
        ServerMessage {
            players: Some(entries),
            ..Default::default()
        }
    }

    #[test]
    fn playerlist_creates_once_then_updates_in_place() {
        let mut session = GameSession::new();
        session.apply(&roster_msg(vec![roster_entry("p1", 5, 5)]));
        assert_eq!(session.players.len(), 1);
        assert_eq!(session.players["p1"].name, "rider-p1");

        // same id again, different name: still one entity, name untouched,
        // position updated
        let mut again = roster_entry("p1", 9, 9);
        again.name = "someone-else".to_string();
        session.apply(&roster_msg(vec![again]));

        assert_eq!(session.players.len(), 1);
        let player = &session.players["p1"];
        assert_eq!(player.name, "rider-p1");
        assert_eq!((player.x, player.y), (9, 9));
    }

    #[test]
    fn dead_roster_entry_keeps_its_position() {
        let mut session = GameSession::new();
        session.apply(&roster_msg(vec![roster_entry("p1", 5, 5)]));

        let mut dead = roster_entry("p1", 50, 50);
        dead.status = PlayerStatus::Dead;
        session.apply(&roster_msg(vec![dead]));

        let player = &session.players["p1"];
        assert_eq!((player.x, player.y), (5, 5));
        assert!(player.attached);
    }

    #[test]
    fn empty_id_entry_becomes_invisible_bot() {
        let mut session = GameSession::new();
        session.apply(&roster_msg(vec![roster_entry("", 0, 0)]));

        let bot = &session.players[""];
        assert!(bot.is_bot());
        assert!(!bot.visible);
        assert!(bot.attached);
    }

    #[test]
    fn alive_update_moves_player_and_stamps_trail() {
        let mut session = GameSession::new();
        session.apply(&roster_msg(vec![roster_entry("p1", 0, 0)]));

        session.apply(&tick_msg(vec![tick_entry(
            "p1",
            PlayerStatus::Alive,
            true,
            10,
            10,
        )]));

        let player = &session.players["p1"];
        assert_eq!((player.x, player.y), (10, 10));
        assert_eq!(player.status, PlayerStatus::Alive);
        // center cell of a 3x3 footprint at (10, 10)
        assert!(session.trail.pixel(57, 57).a > 0.0);
        assert!(session.trail.take_dirty());
    }

    #[test]
    fn dead_update_resets_tooltip_and_overwrites_status_last() {
        let mut session = GameSession::new();
        session.apply(&roster_msg(vec![roster_entry("p1", 0, 0)]));
        {
            let tooltip = &mut session.players.get_mut("p1").unwrap().tooltip;
            tooltip.alpha = 0.3;
            tooltip.visible = true;
        }

        // lone dead entry also triggers the none-alive reveal afterwards,
        // so check the branch effects on a message that has a live player
        session.apply(&roster_msg(vec![roster_entry("p2", 1, 1)]));
        session.apply(&tick_msg(vec![
            tick_entry("p1", PlayerStatus::Dead, false, 0, 0),
            tick_entry("p2", PlayerStatus::Alive, true, 2, 2),
        ]));

        let p1 = &session.players["p1"];
        assert_eq!(p1.status, PlayerStatus::Dead);
        assert!(!p1.tooltip.visible);
        assert_eq!(p1.tooltip.alpha, 1.0);
    }

    #[test]
    fn round_end_reveals_every_tooltip() {
        let mut session = GameSession::new();
        session.apply(&roster_msg(vec![
            roster_entry("p1", 0, 0),
            roster_entry("p2", 1, 1),
            roster_entry("p3", 2, 2),
        ]));
        for player in session.players.values_mut() {
            player.tooltip.alpha = 0.2;
            player.tooltip.visible = false;
        }

        // p3 is not mentioned at all; the reveal must still reach it
        session.apply(&tick_msg(vec![
            tick_entry("p1", PlayerStatus::Dead, false, 0, 0),
            tick_entry("p2", PlayerStatus::Winner, false, 1, 1),
        ]));

        for player in session.players.values() {
            assert!(player.tooltip.visible, "{} not revealed", player.id);
            assert_eq!(player.tooltip.alpha, 1.0);
        }
    }

    #[test]
    fn unknown_player_update_is_a_no_op() {
        let mut session = GameSession::new();
        let outcome = session.apply(&tick_msg(vec![tick_entry(
            "ghost",
            PlayerStatus::Alive,
            true,
            5,
            5,
        )]));

        assert!(session.players.is_empty());
        assert_eq!(outcome, SyncOutcome::default());
    }

    #[test]
    fn static_obstacles_accumulate_duplicates() {
        let mut session = GameSession::new();
        let msg = ServerMessage {
            obstacles: Some(vec![Rect::new(4, 4, 2, 2)]),
            ..Default::default()
        };
        session.apply(&msg);
        session.apply(&msg);

        // re-sent rectangle paints twice, visually idempotent but stored twice
        assert_eq!(session.obstacles.len(), 2);
    }

    #[test]
    fn moving_obstacles_rebuild_only_on_growth() {
        let mut session = GameSession::new();
        let grow = ServerMessage {
            moving_obstacles: Some(vec![Rect::new(0, 0, 2, 2), Rect::new(10, 10, 2, 2)]),
            ..Default::default()
        };
        session.apply(&grow);
        assert_eq!(session.moving_obstacles.len(), 2);

        // same length: positional update in place, no rebuild
        let slide = ServerMessage {
            moving_obstacles: Some(vec![Rect::new(1, 0, 2, 2), Rect::new(10, 11, 2, 2)]),
            ..Default::default()
        };
        session.apply(&slide);
        assert_eq!(session.moving_obstacles.len(), 2);
        assert_eq!((session.moving_obstacles[0].x, session.moving_obstacles[0].y), (1, 0));
        assert_eq!((session.moving_obstacles[1].x, session.moving_obstacles[1].y), (10, 11));

        // growth rebuilds the whole set index-aligned
        let bigger = ServerMessage {
            moving_obstacles: Some(vec![
                Rect::new(5, 5, 1, 1),
                Rect::new(6, 6, 1, 1),
                Rect::new(7, 7, 1, 1),
            ]),
            ..Default::default()
        };
        session.apply(&bigger);
        assert_eq!(session.moving_obstacles.len(), 3);
        assert_eq!((session.moving_obstacles[0].x, session.moving_obstacles[0].y), (5, 5));
    }

    #[test]
    fn crossing_obstacle_erases_trail_under_it() {
        let mut session = GameSession::new();
        session.apply(&roster_msg(vec![roster_entry("p1", 0, 0)]));
        session.apply(&tick_msg(vec![tick_entry(
            "p1",
            PlayerStatus::Alive,
            true,
            10,
            10,
        )]));
        assert!(session.trail.pixel(57, 57).a > 0.0);

        // two obstacles tracked, then a same-length update drives one over
        // the stamped cell
        session.apply(&ServerMessage {
            moving_obstacles: Some(vec![Rect::new(0, 0, 4, 4), Rect::new(40, 40, 4, 4)]),
            ..Default::default()
        });
        session.apply(&ServerMessage {
            moving_obstacles: Some(vec![Rect::new(9, 9, 4, 4), Rect::new(40, 41, 4, 4)]),
            ..Default::default()
        });

        assert_eq!(session.trail.pixel(57, 57), BLANK);
    }

    #[test]
    fn shorter_moving_set_updates_index_aligned_prefix() {
        let mut session = GameSession::new();
        session.apply(&ServerMessage {
            moving_obstacles: Some(vec![Rect::new(0, 0, 1, 1), Rect::new(10, 10, 1, 1)]),
            ..Default::default()
        });
        session.apply(&ServerMessage {
            moving_obstacles: Some(vec![Rect::new(3, 3, 1, 1)]),
            ..Default::default()
        });

        assert_eq!(session.moving_obstacles.len(), 2);
        assert_eq!((session.moving_obstacles[0].x, session.moving_obstacles[0].y), (3, 3));
        assert_eq!((session.moving_obstacles[1].x, session.moving_obstacles[1].y), (10, 10));
    }

    #[test]
    fn countdown_shows_loader_until_deadline() {
        let mut session = GameSession::new();
        session.apply(&ServerMessage {
            countdown: Some(5.0),
            ..Default::default()
        });
        assert!(session.show_loader);
        let deadline = session.next_loader_deadline().unwrap();

        session.expire_loaders(deadline - Duration::from_secs(1));
        assert!(session.show_loader);

        session.expire_loaders(deadline);
        assert!(!session.show_loader);
        assert!(session.next_loader_deadline().is_none());
    }

    #[test]
    fn overlapping_countdowns_share_the_loader_flag() {
        let mut session = GameSession::new();
        session.apply(&ServerMessage {
            countdown: Some(1.0),
            ..Default::default()
        });
        session.apply(&ServerMessage {
            countdown: Some(10.0),
            ..Default::default()
        });

        // the earlier one-shot fires first and hides the loader even though
        // the later countdown is still pending
        let first = session.next_loader_deadline().unwrap();
        session.expire_loaders(first);
        assert!(!session.show_loader);
        // the later timer is still armed and will fire eventually
        assert!(session.next_loader_deadline().is_some());
    }

    #[test]
    fn zero_countdown_is_ignored() {
        let mut session = GameSession::new();
        session.apply(&ServerMessage {
            countdown: Some(0.0),
            ..Default::default()
        });
        assert!(!session.show_loader);
        assert!(session.next_loader_deadline().is_none());
    }

    #[test]
    fn keep_alive_echoes_back() {
        let mut session = GameSession::new();
        let outcome = session.apply(&ServerMessage {
            keep_alive: Some(true),
            ..Default::default()
        });
        assert_eq!(outcome.commands, vec![ClientCommand::keep_alive()]);
    }

    #[test]
    fn requeue_short_circuits_the_rest_of_the_message() {
        let mut session = GameSession::new();
        let outcome = session.apply(&ServerMessage {
            requeue: Some("round-42".to_string()),
            obstacles: Some(vec![Rect::new(1, 1, 1, 1)]),
            countdown: Some(5.0),
            ..Default::default()
        });

        assert_eq!(outcome.requeue.as_deref(), Some("round-42"));
        // the reload discards this session, so none of the other fields landed
        assert!(session.obstacles.is_empty());
        assert!(!session.show_loader);
    }

    #[test]
    fn tooltips_fade_only_while_alive() {
        let mut session = GameSession::new();
        session.apply(&roster_msg(vec![roster_entry("p1", 0, 0), roster_entry("p2", 1, 1)]));
        session.apply(&tick_msg(vec![
            tick_entry("p1", PlayerStatus::Alive, true, 0, 0),
            tick_entry("p2", PlayerStatus::Alive, true, 1, 1),
        ]));
        session.players.get_mut("p2").unwrap().status = PlayerStatus::Connected;

        session.fade_tooltips(0.5);

        assert!(session.players["p1"].tooltip.alpha < 1.0);
        assert_eq!(session.players["p2"].tooltip.alpha, 1.0);
    }
}
