use super::AppState;
use crate::types::*;

/// Post-mutation snapshot for a progress broadcast.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub members: Vec<ConnId>,
    pub name: String,
}

/// Snapshot for a win broadcast. The room stays `Playing`; other players may
/// keep racing and report their own wins.
#[derive(Debug, Clone)]
pub struct WinUpdate {
    pub members: Vec<ConnId>,
    pub winner_name: String,
}

impl AppState {
    /// `Waiting -> Playing`: store the chosen articles and reset every
    /// member's race state. Requires at least two players; the client is
    /// expected to have disabled the control below that, so the server
    /// re-validates defensively and rejects without a reply.
    pub async fn start_game(
        &self,
        room_id: &str,
        start: &str,
        target: &str,
    ) -> Result<Vec<ConnId>, RoomError> {
        let room_id = room_id.to_uppercase();
        let mut rooms = self.rooms.write().await;

        let room = rooms
            .get_mut(&room_id)
            .ok_or_else(|| RoomError::RoomNotFound(room_id.clone()))?;

        if room.game_state != GameState::Waiting {
            return Err(RoomError::StaleEvent(room_id));
        }
        if room.players.len() < MIN_PLAYERS_TO_START {
            return Err(RoomError::InsufficientPlayers);
        }

        room.game_state = GameState::Playing;
        room.start_article = Some(start.to_string());
        room.target_article = Some(target.to_string());
        for player in room.player_states.values_mut() {
            player.clicks = 0;
            player.current_article = start.to_string();
            player.history = vec![start.to_string()];
        }

        tracing::info!("Room {} racing: {} -> {}", room_id, start, target);
        Ok(room.players.clone())
    }

    /// `Playing -> Playing`: record a player's reported article and click
    /// count. Events from rooms not playing, or from connections no longer
    /// in the roster, are stale and dropped.
    pub async fn record_progress(
        &self,
        room_id: &str,
        conn_id: &ConnId,
        current_article: &str,
        clicks: u32,
    ) -> Result<ProgressUpdate, RoomError> {
        let room_id = room_id.to_uppercase();
        let mut rooms = self.rooms.write().await;

        let room = rooms
            .get_mut(&room_id)
            .ok_or_else(|| RoomError::StaleEvent(room_id.clone()))?;
        if room.game_state != GameState::Playing {
            return Err(RoomError::StaleEvent(room_id));
        }

        let player = room
            .player_states
            .get_mut(conn_id)
            .ok_or_else(|| RoomError::StaleEvent(room_id.clone()))?;
        player.current_article = current_article.to_string();
        player.clicks = clicks;
        player.history.push(current_article.to_string());

        Ok(ProgressUpdate {
            members: room.players.clone(),
            name: player.name.clone(),
        })
    }

    /// Self-loop on `Playing`: a player reports reaching the target. The
    /// room state is deliberately left untouched so later winners can also
    /// report; the UI decides how to present multiple winners.
    pub async fn record_win(
        &self,
        room_id: &str,
        conn_id: &ConnId,
    ) -> Result<WinUpdate, RoomError> {
        let room_id = room_id.to_uppercase();
        let rooms = self.rooms.read().await;

        let room = rooms
            .get(&room_id)
            .ok_or_else(|| RoomError::StaleEvent(room_id.clone()))?;
        if room.game_state != GameState::Playing {
            return Err(RoomError::StaleEvent(room_id));
        }

        let player = room
            .player_states
            .get(conn_id)
            .ok_or_else(|| RoomError::StaleEvent(room_id.clone()))?;

        tracing::info!("Player {} won in room {}", player.name, room_id);
        Ok(WinUpdate {
            members: room.players.clone(),
            winner_name: player.name.clone(),
        })
    }

    /// `Playing -> Waiting`: reset the room for another round. Any roster
    /// member may request it; by convention the host's client exposes the
    /// control.
    pub async fn return_to_lobby(
        &self,
        room_id: &str,
        conn_id: &ConnId,
    ) -> Result<Vec<ConnId>, RoomError> {
        let room_id = room_id.to_uppercase();
        let mut rooms = self.rooms.write().await;

        let room = rooms
            .get_mut(&room_id)
            .ok_or_else(|| RoomError::StaleEvent(room_id.clone()))?;
        if room.game_state != GameState::Playing {
            return Err(RoomError::StaleEvent(room_id));
        }
        if !room.players.contains(conn_id) {
            return Err(RoomError::StaleEvent(room_id));
        }

        room.game_state = GameState::Waiting;
        room.start_article = None;
        room.target_article = None;

        tracing::info!("Room {} returned to lobby", room_id);
        Ok(room.players.clone())
    }
}
