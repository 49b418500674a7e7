use super::AppState;
use crate::names;
use crate::protocol::PlayerInfo;
use crate::types::*;
use rand::Rng;
use std::collections::HashMap;

/// Safe character set for room codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 5;

/// Generate a random room code (5 characters, upper-case)
fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

impl AppState {
    /// Create a room in `Waiting` state with the creator as its first and
    /// only member. Returns the room ID and the initial roster.
    pub async fn create_room(
        &self,
        creator: &ConnId,
        requested_name: &str,
    ) -> (RoomId, Vec<PlayerInfo>) {
        let mut rooms = self.rooms.write().await;

        // The creator may still be seated somewhere; a connection appears in
        // at most one room at a time.
        self.evict_seat(&mut rooms, creator).await;

        // Collision check against live rooms (extremely rare with ~29M codes)
        let room_id = loop {
            let code = generate_room_code();
            if !rooms.contains_key(&code) {
                break code;
            }
        };

        let name = names::resolve_name(requested_name);
        let player = PlayerState::new(creator.clone(), name);
        let roster = vec![PlayerInfo::from(&player)];

        let room = Room {
            id: room_id.clone(),
            game_state: GameState::Waiting,
            start_article: None,
            target_article: None,
            players: vec![creator.clone()],
            player_states: HashMap::from([(creator.clone(), player)]),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        rooms.insert(room_id.clone(), room);

        tracing::info!("Room {} created by {}", room_id, creator);
        (room_id, roster)
    }

    /// Snapshot of a room by code (case-normalized to upper).
    pub async fn get_room(&self, room_id: &str) -> Result<Room, RoomError> {
        let rooms = self.rooms.read().await;
        rooms
            .get(&room_id.to_uppercase())
            .cloned()
            .ok_or_else(|| RoomError::RoomNotFound(room_id.to_string()))
    }

    /// Remove a room from the registry.
    pub async fn delete_room(&self, room_id: &RoomId) {
        if self.rooms.write().await.remove(room_id).is_some() {
            tracing::info!("Room {} deleted", room_id);
        }
    }
}
