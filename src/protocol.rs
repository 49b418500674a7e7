use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        username: String,
    },
    JoinRoom {
        room_id: RoomId,
        username: String,
    },
    StartGame {
        room_id: RoomId,
        start: String,
        target: String,
    },
    UpdateProgress {
        room_id: RoomId,
        current_article: String,
        clicks: u32,
    },
    GameWin {
        room_id: RoomId,
        path: Vec<String>,
    },
    ReturnToLobby {
        room_id: RoomId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once on connect so the client learns its connection ID before
    /// issuing intents.
    Welcome {
        conn_id: ConnId,
        server_now: String,
    },
    /// Direct reply to the room creator.
    RoomCreated {
        room_id: RoomId,
        players: Vec<PlayerInfo>,
    },
    /// Direct reply to a successful join.
    RoomJoined {
        room_id: RoomId,
        players: Vec<PlayerInfo>,
    },
    /// Room broadcast whenever the roster changes (join or disconnect).
    PlayersUpdated {
        players: Vec<PlayerInfo>,
    },
    /// Room broadcast announcing the chosen articles.
    GameStarted {
        start: String,
        target: String,
    },
    /// Broadcast to every room member except the reporting player.
    OpponentProgress {
        player_id: ConnId,
        name: String,
        current_article: String,
        clicks: u32,
    },
    /// Room broadcast (including the winner). Does not end the race; later
    /// winners produce further announcements.
    PlayerWon {
        winner_id: ConnId,
        winner_name: String,
        path: Vec<String>,
        finished_at: String,
    },
    /// Room broadcast telling every client to discard game state and show
    /// the lobby.
    ReturnedToLobby,
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    pub fn error(err: &RoomError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }
}

/// Roster entry as sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerInfo {
    pub id: ConnId,
    pub name: String,
}

impl From<&PlayerState> for PlayerInfo {
    fn from(p: &PlayerState) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
        }
    }
}
