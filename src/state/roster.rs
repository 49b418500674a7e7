use super::AppState;
use crate::names;
use crate::protocol::{PlayerInfo, ServerMessage};
use crate::types::*;
use std::collections::HashMap;

/// Post-mutation roster snapshot for broadcasting.
#[derive(Debug, Clone)]
pub struct RosterUpdate {
    pub room_id: RoomId,
    pub members: Vec<ConnId>,
    pub players: Vec<PlayerInfo>,
}

fn roster_of(room: &Room) -> Vec<PlayerInfo> {
    // Iterate `players` rather than the map so join order is preserved.
    room.players
        .iter()
        .filter_map(|id| room.player_states.get(id))
        .map(PlayerInfo::from)
        .collect()
}

/// Pull a connection out of whichever room holds it. A connection sits in at
/// most one room at a time, so the first match is the only match. Deletes
/// the room when the last player leaves; returns the remaining roster
/// otherwise.
pub(super) fn remove_seat(
    rooms: &mut HashMap<RoomId, Room>,
    conn_id: &ConnId,
) -> Option<RosterUpdate> {
    let room_id = rooms
        .values()
        .find(|r| r.players.contains(conn_id))
        .map(|r| r.id.clone())?;

    let room = rooms.get_mut(&room_id)?;
    room.players.retain(|id| id != conn_id);
    room.player_states.remove(conn_id);
    tracing::info!("Player {} left room {}", conn_id, room_id);

    if room.players.is_empty() {
        rooms.remove(&room_id);
        tracing::info!("Room {} deleted", room_id);
        return None;
    }

    Some(RosterUpdate {
        room_id: room.id.clone(),
        members: room.players.clone(),
        players: roster_of(room),
    })
}

impl AppState {
    /// Enforce the one-room-per-connection invariant before seating a
    /// player somewhere new: remove the connection from the room it
    /// occupies, if any, and tell the survivors.
    pub(super) async fn evict_seat(
        &self,
        rooms: &mut HashMap<RoomId, Room>,
        conn_id: &ConnId,
    ) {
        if let Some(vacated) = remove_seat(rooms, conn_id) {
            self.broadcast(
                &vacated.members,
                ServerMessage::PlayersUpdated {
                    players: vacated.players,
                },
            )
            .await;
        }
    }

    /// Admit a player into a waiting room. Fails with a distinct error the
    /// caller can relay to the rejected client; a rejected join leaves the
    /// player seated wherever they already were.
    pub async fn join_room(
        &self,
        room_id: &str,
        conn_id: &ConnId,
        requested_name: &str,
    ) -> Result<RosterUpdate, RoomError> {
        let room_id = room_id.to_uppercase();
        let mut rooms = self.rooms.write().await;

        {
            let room = rooms
                .get(&room_id)
                .ok_or_else(|| RoomError::RoomNotFound(room_id.clone()))?;

            if room.game_state != GameState::Waiting {
                return Err(RoomError::RoomAlreadyPlaying(room_id));
            }
            if room.players.contains(conn_id) {
                // Already seated here; re-joining is a no-op.
                return Ok(RosterUpdate {
                    room_id,
                    members: room.players.clone(),
                    players: roster_of(room),
                });
            }
            if room.players.len() >= MAX_PLAYERS {
                return Err(RoomError::RoomFull(room_id));
            }
        }

        // The join is going through: vacate any previous seat so the
        // connection never appears in two rooms.
        self.evict_seat(&mut rooms, conn_id).await;

        let room = rooms
            .get_mut(&room_id)
            .ok_or_else(|| RoomError::RoomNotFound(room_id.clone()))?;

        let name = names::resolve_name(requested_name);
        room.players.push(conn_id.clone());
        room.player_states
            .insert(conn_id.clone(), PlayerState::new(conn_id.clone(), name));

        tracing::info!("Player {} joined room {}", conn_id, room_id);
        Ok(RosterUpdate {
            room_id,
            members: room.players.clone(),
            players: roster_of(room),
        })
    }

    /// Remove a player from whichever room holds it. Deletes the room when
    /// the last player leaves; returns the remaining roster otherwise.
    pub async fn leave_room(&self, conn_id: &ConnId) -> Option<RosterUpdate> {
        let mut rooms = self.rooms.write().await;
        remove_seat(&mut rooms, conn_id)
    }
}
