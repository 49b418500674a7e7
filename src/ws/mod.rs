pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one WebSocket connection for its whole lifetime.
///
/// The connection ID doubles as the player identifier for the room it joins;
/// both end when the socket closes.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let conn_id: String = ulid::Ulid::new().to_string();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.register_connection(&conn_id, tx).await;

    tracing::info!("WebSocket connected: {}", conn_id);

    let welcome = ServerMessage::Welcome {
        conn_id: conn_id.clone(),
        server_now: chrono::Utc::now().to_rfc3339(),
    };
    if let Ok(msg) = serde_json::to_string(&welcome) {
        if sender.send(Message::Text(msg.into())).await.is_err() {
            tracing::error!("Failed to send welcome message");
            handlers::handle_disconnect(&conn_id, &state).await;
            return;
        }
    }

    loop {
        tokio::select! {
            // Outbound: direct replies and room broadcasts routed to this
            // connection.
            outbound = rx.recv() => {
                match outbound {
                    Some(msg) => {
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    None => break,
                }
            }

            // Inbound: client intents, handled to completion one at a time.
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if let Some(response) =
                                    handlers::handle_message(client_msg, &conn_id, &state).await
                                {
                                    if let Ok(json) = serde_json::to_string(&response) {
                                        if sender.send(Message::Text(json.into())).await.is_err() {
                                            break;
                                        }
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                };
                                if let Ok(json) = serde_json::to_string(&error) {
                                    let _ = sender.send(Message::Text(json.into())).await;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed: {}", conn_id);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error on {}: {}", conn_id, e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    handlers::handle_disconnect(&conn_id, &state).await;
    tracing::info!("WebSocket connection closed: {}", conn_id);
}
