use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque ID types for type safety
pub type RoomId = String;
pub type ConnId = String;

/// Lifecycle state of a room.
///
/// `Finished` is part of the wire contract, but the coordinator routes
/// `Playing` straight back to `Waiting` on return-to-lobby. Win events are a
/// self-loop on `Playing` so late winners can still report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    Waiting,
    Playing,
    Finished,
}

/// Maximum number of players a room will admit.
pub const MAX_PLAYERS: usize = 8;

/// Minimum roster size required to start a race.
pub const MIN_PLAYERS_TO_START: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub game_state: GameState,
    /// Set when a race starts. Stale values after return-to-lobby are
    /// harmless because `game_state` gates their use.
    pub start_article: Option<String>,
    pub target_article: Option<String>,
    /// Connection IDs in join order. The first entry is treated as host by
    /// the creating client; the server does not re-derive host status.
    pub players: Vec<ConnId>,
    /// One entry per member of `players`, created on join, removed on
    /// disconnect.
    pub player_states: HashMap<ConnId, PlayerState>,
    pub created_at: String,
}

/// Per-player race state within a room. Reset at every race start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: ConnId,
    pub name: String,
    pub clicks: u32,
    pub current_article: String,
    pub history: Vec<String>,
}

impl PlayerState {
    pub fn new(id: ConnId, name: String) -> Self {
        Self {
            id,
            name,
            clicks: 0,
            current_article: String::new(),
            history: Vec::new(),
        }
    }
}

/// Errors a room operation can produce. All are local to the triggering
/// event; none is fatal to the process.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoomError {
    #[error("Room {0} not found")]
    RoomNotFound(RoomId),

    #[error("Room {0} is full")]
    RoomFull(RoomId),

    #[error("Room {0} has already started")]
    RoomAlreadyPlaying(RoomId),

    #[error("Need at least {MIN_PLAYERS_TO_START} players to start")]
    InsufficientPlayers,

    /// Progress/win/lobby event referencing a room or player that no longer
    /// exists. Dropped without a reply.
    #[error("Stale event for room {0}")]
    StaleEvent(RoomId),
}

impl RoomError {
    /// Stable machine-readable code for error replies.
    pub fn code(&self) -> &'static str {
        match self {
            RoomError::RoomNotFound(_) => "ROOM_NOT_FOUND",
            RoomError::RoomFull(_) => "ROOM_FULL",
            RoomError::RoomAlreadyPlaying(_) => "ROOM_ALREADY_PLAYING",
            RoomError::InsufficientPlayers => "INSUFFICIENT_PLAYERS",
            RoomError::StaleEvent(_) => "STALE_EVENT",
        }
    }

    /// Whether the error is dropped instead of being reported to the caller.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            RoomError::InsufficientPlayers | RoomError::StaleEvent(_)
        )
    }
}
