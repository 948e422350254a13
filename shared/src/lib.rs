use serde::{Deserialize, Serialize};

/// Side length of one grid cell in pixels. All wire coordinates are grid
/// cells; the renderer and trail buffer scale by this constant.
pub const BOX_SIZE: f32 = 5.0;

/// Logical size of the offscreen trail surface in pixels (square).
pub const TRAIL_SIZE: u16 = 600;

/// Default player footprint in grid cells when the server does not say.
pub const PLAYER_FOOTPRINT: i32 = 3;

/// Lifecycle status of a player within one round.
///
/// The server sends these as plain strings; values we do not know are kept
/// around as [`PlayerStatus::Unknown`] instead of failing the whole message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlayerStatus {
    Connected,
    Alive,
    Dead,
    Disconnected,
    Winner,
    Unknown,
}

impl Default for PlayerStatus {
    fn default() -> Self {
        PlayerStatus::Connected
    }
}

impl From<String> for PlayerStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Connected" => PlayerStatus::Connected,
            "Alive" => PlayerStatus::Alive,
            "Dead" => PlayerStatus::Dead,
            "Disconnected" => PlayerStatus::Disconnected,
            "Winner" => PlayerStatus::Winner,
            _ => PlayerStatus::Unknown,
        }
    }
}

impl From<PlayerStatus> for String {
    fn from(value: PlayerStatus) -> Self {
        match value {
            PlayerStatus::Connected => "Connected",
            PlayerStatus::Alive => "Alive",
            PlayerStatus::Dead => "Dead",
            PlayerStatus::Disconnected => "Disconnected",
            PlayerStatus::Winner => "Winner",
            PlayerStatus::Unknown => "Unknown",
        }
        .to_string()
    }
}

/// Heading of a player on the grid. Affects visual orientation only; the
/// server is authoritative for positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Right
    }
}

/// Axis-aligned rectangle in grid-cell coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Entry of a `playerlist` roster broadcast. First mention of an id creates
/// the player; `name`, `color` and the initial status are set once here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerInfo {
    pub id: String,
    pub name: String,
    pub color: String,
    pub status: PlayerStatus,
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
}

/// Entry of a per-tick `players` update. Never creates entities; ids must
/// already be known from a prior `playerlist`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerUpdate {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
    pub color: String,
    pub width: i32,
    pub height: i32,
    pub status: PlayerStatus,
    pub alive: bool,
}

/// One inbound state-delta from the push channel. Every field is optional
/// and any subset may be present; the synchronizer applies them in the
/// declaration order below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerMessage {
    pub requeue: Option<String>,
    pub obstacles: Option<Vec<Rect>>,
    #[serde(rename = "movingObstacles")]
    pub moving_obstacles: Option<Vec<Rect>>,
    pub playerlist: Option<Vec<PlayerInfo>>,
    pub players: Option<Vec<PlayerUpdate>>,
    pub countdown: Option<f32>,
    #[serde(rename = "keepAlive")]
    pub keep_alive: Option<bool>,
}

/// Round-lifecycle actions sent on the command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameAction {
    GameStart,
    GameRequeue,
}

/// Outbound command-channel message. Serializes to the exact JSON object
/// shapes the server expects, e.g. `{"message":"GAME_START"}` or
/// `{"direction":"UP"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClientCommand {
    Action {
        message: GameAction,
    },
    Move {
        direction: Direction,
    },
    KeepAlive {
        #[serde(rename = "keepAlive")]
        keep_alive: bool,
    },
    PlayerJoined {
        playerjoined: String,
        #[serde(rename = "hasGameBoard")]
        has_game_board: String,
    },
    SpectatorJoined {
        spectatorjoined: bool,
    },
}

impl ClientCommand {
    pub fn game_start() -> Self {
        ClientCommand::Action {
            message: GameAction::GameStart,
        }
    }

    pub fn game_requeue() -> Self {
        ClientCommand::Action {
            message: GameAction::GameRequeue,
        }
    }

    pub fn direction(direction: Direction) -> Self {
        ClientCommand::Move { direction }
    }

    pub fn keep_alive() -> Self {
        ClientCommand::KeepAlive { keep_alive: true }
    }

    pub fn player_joined(user_id: &str) -> Self {
        ClientCommand::PlayerJoined {
            playerjoined: user_id.to_string(),
            has_game_board: "true".to_string(),
        }
    }

    pub fn spectator_joined() -> Self {
        ClientCommand::SpectatorJoined {
            spectatorjoined: true,
        }
    }
}

/// Event on the queue-position notification stream. Either a position
/// update or a ready signal; anything else counts as unrecognized.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueueMessage {
    #[serde(rename = "queuePosition")]
    pub queue_position: Option<u32>,
    pub requeue: Option<String>,
}
