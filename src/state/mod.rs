mod game;
mod room;
mod roster;

pub use game::{ProgressUpdate, WinUpdate};
pub use roster::RosterUpdate;

use crate::protocol::ServerMessage;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc::UnboundedSender, RwLock};

/// Shared application state: the room registry plus the outbound sender for
/// every live connection.
///
/// Each intent handler takes the `rooms` write lock for the whole
/// mutate-and-snapshot section, so broadcasts always reflect post-mutation
/// state. Delivery goes through unbounded senders and never blocks a handler.
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RwLock<HashMap<RoomId, Room>>>,
    pub connections: Arc<RwLock<HashMap<ConnId, UnboundedSender<ServerMessage>>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a connection's outbound channel. Called once at socket
    /// upgrade, before any intent from that connection is processed.
    pub async fn register_connection(
        &self,
        conn_id: &ConnId,
        tx: UnboundedSender<ServerMessage>,
    ) {
        self.connections.write().await.insert(conn_id.clone(), tx);
    }

    /// Drop a connection's outbound channel.
    pub async fn unregister_connection(&self, conn_id: &ConnId) {
        self.connections.write().await.remove(conn_id);
    }

    /// Direct reply to a single connection.
    pub async fn send_to(&self, conn_id: &ConnId, msg: ServerMessage) {
        let connections = self.connections.read().await;
        if let Some(tx) = connections.get(conn_id) {
            // A send error means the socket task already exited; the
            // disconnect event will clean up.
            let _ = tx.send(msg);
        }
    }

    /// Fire-and-forget broadcast to every listed room member.
    pub async fn broadcast(&self, members: &[ConnId], msg: ServerMessage) {
        let connections = self.connections.read().await;
        for conn_id in members {
            if let Some(tx) = connections.get(conn_id) {
                let _ = tx.send(msg.clone());
            }
        }
    }

    /// Broadcast to every listed room member except `sender`, so a player
    /// never re-receives their own progress echo.
    pub async fn broadcast_except(
        &self,
        members: &[ConnId],
        sender: &ConnId,
        msg: ServerMessage,
    ) {
        let connections = self.connections.read().await;
        for conn_id in members.iter().filter(|id| *id != sender) {
            if let Some(tx) = connections.get(conn_id) {
                let _ = tx.send(msg.clone());
            }
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
