//! Event Router: binds inbound per-connection intents to the room state
//! machine and roster, and computes the outbound fan-out for each.
//!
//! Three fan-out patterns: direct reply (create/join acks and errors), room
//! broadcast (start, win, roster change, return-to-lobby), and room broadcast
//! excluding the sender (progress). Broadcast payloads are computed from the
//! post-mutation snapshot the state methods return, never re-read afterwards.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use crate::types::{ConnId, RoomError};
use std::sync::Arc;

/// Handle one client intent to completion and return the optional direct
/// reply. Broadcasts to other room members are delivered through the
/// connection senders as a side effect.
pub async fn handle_message(
    msg: ClientMessage,
    conn_id: &ConnId,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::CreateRoom { username } => {
            let (room_id, players) = state.create_room(conn_id, &username).await;
            Some(ServerMessage::RoomCreated { room_id, players })
        }

        ClientMessage::JoinRoom { room_id, username } => {
            match state.join_room(&room_id, conn_id, &username).await {
                Ok(update) => {
                    // Tell the rest of the room first; the joiner gets the
                    // roster in its ack.
                    state
                        .broadcast_except(
                            &update.members,
                            conn_id,
                            ServerMessage::PlayersUpdated {
                                players: update.players.clone(),
                            },
                        )
                        .await;
                    Some(ServerMessage::RoomJoined {
                        room_id: update.room_id,
                        players: update.players,
                    })
                }
                Err(err) => reject(conn_id, &err),
            }
        }

        ClientMessage::StartGame {
            room_id,
            start,
            target,
        } => match state.start_game(&room_id, &start, &target).await {
            Ok(members) => {
                state
                    .broadcast(&members, ServerMessage::GameStarted { start, target })
                    .await;
                None
            }
            Err(err) => reject(conn_id, &err),
        },

        ClientMessage::UpdateProgress {
            room_id,
            current_article,
            clicks,
        } => {
            match state
                .record_progress(&room_id, conn_id, &current_article, clicks)
                .await
            {
                Ok(update) => {
                    state
                        .broadcast_except(
                            &update.members,
                            conn_id,
                            ServerMessage::OpponentProgress {
                                player_id: conn_id.clone(),
                                name: update.name,
                                current_article,
                                clicks,
                            },
                        )
                        .await;
                    None
                }
                Err(err) => reject(conn_id, &err),
            }
        }

        ClientMessage::GameWin { room_id, path } => {
            match state.record_win(&room_id, conn_id).await {
                Ok(update) => {
                    state
                        .broadcast(
                            &update.members,
                            ServerMessage::PlayerWon {
                                winner_id: conn_id.clone(),
                                winner_name: update.winner_name,
                                path,
                                finished_at: chrono::Utc::now().to_rfc3339(),
                            },
                        )
                        .await;
                    None
                }
                Err(err) => reject(conn_id, &err),
            }
        }

        ClientMessage::ReturnToLobby { room_id } => {
            match state.return_to_lobby(&room_id, conn_id).await {
                Ok(members) => {
                    state
                        .broadcast(&members, ServerMessage::ReturnedToLobby)
                        .await;
                    None
                }
                Err(err) => reject(conn_id, &err),
            }
        }
    }
}

/// A closing connection is an event like any other: remove the player and
/// tell the survivors. The room is deleted as a side effect when the last
/// player leaves.
pub async fn handle_disconnect(conn_id: &ConnId, state: &Arc<AppState>) {
    if let Some(update) = state.leave_room(conn_id).await {
        state
            .broadcast(
                &update.members,
                ServerMessage::PlayersUpdated {
                    players: update.players,
                },
            )
            .await;
    }
    state.unregister_connection(conn_id).await;
}

fn reject(conn_id: &ConnId, err: &RoomError) -> Option<ServerMessage> {
    if err.is_silent() {
        tracing::debug!("Dropping event from {}: {}", conn_id, err);
        None
    } else {
        Some(ServerMessage::error(err))
    }
}
